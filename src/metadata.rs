//! Image metadata resolution and accessors.
//!
//! [`ImageMetadata::prepare`] registers an image stream on the cluster,
//! waits for the cluster to materialize the image's metadata, fetches the
//! corresponding image stream tag, and wraps the embedded runtime-config
//! document in an immutable snapshot. The snapshot's accessors recover
//! strongly-typed facts from the semi-structured document:
//!
//! | Accessor | Path | Absent path |
//! |----------|------|-------------|
//! | [`labels`] | `Config.Labels` | empty map |
//! | [`command`] | `Config.Cmd` | error |
//! | [`envs`] | `Config.Env` | error |
//! | [`exposed_ports`] | `Config.ExposedPorts` | empty set |
//!
//! # Waiting
//!
//! The cluster offers no completion signal for metadata download. By
//! default the resolver polls for the tag with backoff until it exists
//! with a populated document ([`WaitStrategy::Poll`]); the historical
//! single fixed sleep survives as [`WaitStrategy::FixedDelay`] for
//! callers that depend on its exact timing.
//!
//! [`labels`]: ImageMetadata::labels
//! [`command`]: ImageMetadata::command
//! [`envs`]: ImageMetadata::envs
//! [`exposed_ports`]: ImageMetadata::exposed_ports

use crate::cluster::{ClusterClient, ImageStreamTag};
use crate::constants::{
    METADATA_POLL_INTERVAL, METADATA_POLL_MAX_INTERVAL, METADATA_POLL_TIMEOUT,
};
use crate::error::{Error, Result};
use crate::image::ImageRef;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

// =============================================================================
// Document Paths
// =============================================================================
//
// Segment constants for navigating the runtime-config block. Accessors go
// through these, never ad hoc literals, so a typo fails to compile instead
// of silently reading an absent path.
// =============================================================================

const CONFIG: &str = "Config";
const LABELS: &str = "Labels";
const CMD: &str = "Cmd";
const ENV: &str = "Env";
const EXPOSED_PORTS: &str = "ExposedPorts";

// =============================================================================
// Wait Strategy
// =============================================================================

/// How [`ImageMetadata::prepare_with`] waits for the cluster to finish
/// materializing image metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Re-fetch the tag until it exists with a populated metadata
    /// document. The interval doubles on each miss up to
    /// [`METADATA_POLL_MAX_INTERVAL`]; exceeding `timeout` fails with
    /// [`Error::Timeout`]. This is the default.
    Poll {
        /// Initial interval between fetches.
        interval: Duration,
        /// Total time budget.
        timeout: Duration,
    },
    /// Sleep once, then fetch the tag exactly once. An absent tag fails
    /// with [`Error::TagNotFound`]. Race-prone; kept for parity with
    /// callers tuned to the historical fixed delay.
    FixedDelay(Duration),
}

impl Default for WaitStrategy {
    fn default() -> Self {
        Self::Poll {
            interval: METADATA_POLL_INTERVAL,
            timeout: METADATA_POLL_TIMEOUT,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable snapshot of a resolved image's runtime configuration.
///
/// Holds exactly one raw metadata document, owned exclusively for the
/// snapshot's lifetime. All accessors are pure reads; the snapshot is safe
/// for unsynchronized concurrent reads.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    metadata: Value,
}

impl ImageMetadata {
    /// Resolves metadata for an image given by URL.
    ///
    /// Parses the URL and delegates to [`prepare`](Self::prepare).
    pub async fn prepare_from_url(url: &str, cluster: &dyn ClusterClient) -> Result<Self> {
        let image = ImageRef::parse(url)?;
        Self::prepare(&image, cluster).await
    }

    /// Resolves metadata for an image with the default wait strategy.
    ///
    /// Creates an image stream named after the image's repository, waits
    /// for the cluster to populate it, fetches the
    /// `"<repo>:<major_tag>"` stream tag, and snapshots its runtime-config
    /// document.
    ///
    /// # Errors
    ///
    /// - [`Error::Cluster`] if any cluster call fails
    /// - [`Error::Timeout`] if the tag never becomes ready in time
    pub async fn prepare(image: &ImageRef, cluster: &dyn ClusterClient) -> Result<Self> {
        Self::prepare_with(image, cluster, WaitStrategy::default()).await
    }

    /// Resolves metadata for an image with an explicit wait strategy.
    ///
    /// Side effects: one cluster write (image stream creation), one or
    /// more blocking waits, one cluster read per fetch. No internal
    /// parallelism; a caller needing cancellation wraps the whole call in
    /// its own cancellable task.
    pub async fn prepare_with(
        image: &ImageRef,
        cluster: &dyn ClusterClient,
        wait: WaitStrategy,
    ) -> Result<Self> {
        cluster.create_image_stream(image.repo()).await?;

        let tag_name = image.stream_tag_name();
        info!(
            "created image stream '{}', waiting for tag '{}'",
            image.repo(),
            tag_name
        );

        let tag = match wait {
            WaitStrategy::FixedDelay(delay) => {
                debug!("sleeping {:?} before fetching tag '{}'", delay, tag_name);
                sleep(delay).await;
                cluster
                    .get_image_stream_tag(&tag_name)
                    .await?
                    .ok_or_else(|| Error::TagNotFound(tag_name.clone()))?
            }
            WaitStrategy::Poll { interval, timeout } => {
                poll_stream_tag(cluster, &tag_name, interval, timeout).await?
            }
        };

        debug!("tag '{}' resolved", tag_name);
        Ok(Self::from_document(tag.image.docker_image_metadata))
    }

    /// Wraps an already-materialized runtime-config document.
    pub fn from_document(document: Value) -> Self {
        Self { metadata: document }
    }

    /// Labels at `Config.Labels`.
    ///
    /// An absent or non-object path yields an empty map, never an error.
    /// Scalar non-string values render to their string form; nested
    /// values are skipped.
    pub fn labels(&self) -> HashMap<String, String> {
        let Some(labels) = self.config_field(LABELS).and_then(Value::as_object) else {
            return HashMap::new();
        };

        labels
            .iter()
            .filter_map(|(name, value)| scalar_string(value).map(|v| (name.clone(), v)))
            .collect()
    }

    /// Default container command: the first element of `Config.Cmd`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingField`] if `Cmd` is absent, empty, or its first
    /// element is not a string. An image with no command defined fails
    /// here.
    pub fn command(&self) -> Result<String> {
        self.config_field(CMD)
            .and_then(Value::as_array)
            .and_then(|cmd| cmd.first())
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingField {
                path: format!("{}.{}[0]", CONFIG, CMD),
            })
    }

    /// Image environment variables from `Config.Env`.
    ///
    /// Entries are `KEY=VALUE` strings, split on the first `=` only, so
    /// values may themselves contain `=`. Duplicate keys: last occurrence
    /// wins.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] if `Env` is absent or not a sequence
    /// - [`Error::MalformedField`] for a non-string entry or one
    ///   lacking `=`
    pub fn envs(&self) -> Result<HashMap<String, String>> {
        let path = format!("{}.{}", CONFIG, ENV);
        let entries = self
            .config_field(ENV)
            .and_then(Value::as_array)
            .ok_or_else(|| Error::MissingField { path: path.clone() })?;

        let mut envs = HashMap::new();
        for entry in entries {
            let entry = entry.as_str().ok_or_else(|| Error::MalformedField {
                path: path.clone(),
                value: entry.to_string(),
                reason: "expected a string entry".to_string(),
            })?;

            let (key, value) = entry.split_once('=').ok_or_else(|| Error::MalformedField {
                path: path.clone(),
                value: entry.to_string(),
                reason: "expected KEY=VALUE".to_string(),
            })?;

            envs.insert(key.to_string(), value.to_string());
        }

        Ok(envs)
    }

    /// Ports exposed by the image, optionally filtered by protocol.
    ///
    /// Keys of `Config.ExposedPorts` are `PORT/PROTOCOL` (e.g.
    /// `"8080/tcp"`). A port is included when `protocol` is `None` or
    /// blank, or matches the key's protocol case-insensitively. An absent
    /// path yields an empty set, never an error. The result is a set:
    /// the same port exposed under several protocols appears once.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedField`] for a key without `/` or with a
    /// non-integer port.
    pub fn exposed_ports(&self, protocol: Option<&str>) -> Result<HashSet<u16>> {
        let Some(ports) = self.config_field(EXPOSED_PORTS).and_then(Value::as_object) else {
            return Ok(HashSet::new());
        };

        let path = format!("{}.{}", CONFIG, EXPOSED_PORTS);
        let mut result = HashSet::new();
        for port_def in ports.keys() {
            let (port, port_protocol) =
                port_def.split_once('/').ok_or_else(|| Error::MalformedField {
                    path: path.clone(),
                    value: port_def.clone(),
                    reason: "expected PORT/PROTOCOL".to_string(),
                })?;

            let port: u16 = port.parse().map_err(|_| Error::MalformedField {
                path: path.clone(),
                value: port_def.clone(),
                reason: "port is not an integer".to_string(),
            })?;

            let wanted = match protocol {
                None => true,
                Some(p) if p.trim().is_empty() => true,
                Some(p) => p.eq_ignore_ascii_case(port_protocol),
            };
            if wanted {
                result.insert(port);
            }
        }

        Ok(result)
    }

    fn config_field(&self, field: &str) -> Option<&Value> {
        self.metadata.get(CONFIG).and_then(|config| config.get(field))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Renders a scalar document value to its string form.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// True once the tag carries a usable metadata document.
fn has_metadata(tag: &ImageStreamTag) -> bool {
    match &tag.image.docker_image_metadata {
        Value::Null => false,
        Value::Object(fields) => !fields.is_empty(),
        _ => true,
    }
}

/// Polls for a stream tag until it is ready or `timeout` elapses.
async fn poll_stream_tag(
    cluster: &dyn ClusterClient,
    tag_name: &str,
    interval: Duration,
    timeout: Duration,
) -> Result<ImageStreamTag> {
    let deadline = Instant::now() + timeout;
    let mut interval = interval;

    loop {
        if let Some(tag) = cluster.get_image_stream_tag(tag_name).await? {
            if has_metadata(&tag) {
                return Ok(tag);
            }
            debug!("tag '{}' exists but metadata is not populated yet", tag_name);
        }

        if Instant::now() >= deadline {
            return Err(Error::Timeout {
                operation: format!("resolve image stream tag '{}'", tag_name),
                duration: timeout,
            });
        }

        debug!("tag '{}' not ready, retrying in {:?}", tag_name, interval);
        sleep(interval).await;
        interval = (interval * 2).min(METADATA_POLL_MAX_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_string_renders_scalars_only() {
        assert_eq!(scalar_string(&json!("x")), Some("x".to_string()));
        assert_eq!(scalar_string(&json!(8080)), Some("8080".to_string()));
        assert_eq!(scalar_string(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_string(&json!(null)), None);
        assert_eq!(scalar_string(&json!({"nested": 1})), None);
        assert_eq!(scalar_string(&json!([1])), None);
    }

    #[test]
    fn has_metadata_requires_populated_document() {
        let tag = |metadata| ImageStreamTag {
            name: "app:1".to_string(),
            image: crate::cluster::ResolvedImage {
                docker_image_reference: None,
                docker_image_metadata: metadata,
            },
        };

        assert!(!has_metadata(&tag(json!(null))));
        assert!(!has_metadata(&tag(json!({}))));
        assert!(has_metadata(&tag(json!({"Config": {}}))));
    }
}
