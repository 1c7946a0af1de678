//! Cluster client interface.
//!
//! The crate never talks to a cluster directly; it consumes the
//! [`ClusterClient`] trait. Production implementations wrap a real
//! OpenShift/Kubernetes client, tests use an in-memory fake.
//!
//! The call pattern per metadata resolution is one write
//! ([`create_image_stream`]) followed by one or more reads
//! ([`get_image_stream_tag`]). Implementations must be safe for that
//! pattern under shared use; the crate performs no locking around the
//! handle.
//!
//! [`create_image_stream`]: ClusterClient::create_image_stream
//! [`get_image_stream_tag`]: ClusterClient::get_image_stream_tag

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Resolved image carried by an image stream tag.
///
/// `docker_image_metadata` is the raw container-runtime configuration
/// document as produced by the cluster's image inspection; it is handed
/// to [`ImageMetadata`] unparsed.
///
/// [`ImageMetadata`]: crate::metadata::ImageMetadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedImage {
    /// Pull spec the cluster resolved the image to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image_reference: Option<String>,
    /// Raw runtime-config document. `Null` while the cluster is still
    /// downloading metadata.
    #[serde(default)]
    pub docker_image_metadata: serde_json::Value,
}

/// Image stream tag resource: a named tag plus the image it resolved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamTag {
    /// Tag name in `"<repo>:<tag>"` form.
    pub name: String,
    /// The resolved image.
    pub image: ResolvedImage,
}

/// Minimal cluster surface needed for image metadata resolution.
///
/// Errors from either call surface to the caller as
/// [`Error::Cluster`](crate::error::Error::Cluster); the crate does not
/// retry failed calls.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Requests creation of an image stream named `name`.
    ///
    /// The cluster begins downloading image metadata asynchronously; this
    /// call returns before that completes.
    async fn create_image_stream(&self, name: &str) -> Result<()>;

    /// Fetches the image stream tag `name` (`"<repo>:<tag>"` form).
    ///
    /// Returns `None` while the cluster has not materialized the tag.
    async fn get_image_stream_tag(&self, name: &str) -> Result<Option<ImageStreamTag>>;
}
