//! # imagespect
//!
//! **Cluster test support for containerized workloads.**
//!
//! Two independent pieces:
//!
//! - **Image metadata introspection**: [`ImageMetadata::prepare`] asks the
//!   cluster to resolve a container image through an image stream, waits
//!   for the cluster to materialize its metadata, and exposes the image's
//!   runtime configuration (labels, default command, environment
//!   variables, exposed ports) through typed accessors.
//! - **Secret volume building**: [`SecretVolume`] assembles a pod volume
//!   specification fragment backed by a cluster Secret.
//!
//! # Resolution Flow
//!
//! ```text
//! ImageRef ──► create_image_stream(repo) ──► wait ──► get_image_stream_tag("repo:major")
//!                                                              │
//!                              ImageMetadata snapshot ◄────────┘
//!                              labels() command() envs() exposed_ports()
//! ```
//!
//! The cluster handle is an injected [`ClusterClient`] trait object, never
//! a process-wide singleton, so the resolver tests against a fake client.
//!
//! # Example
//!
//! ```rust,ignore
//! use imagespect::{ImageMetadata, SecretVolume};
//!
//! # async fn run(cluster: &dyn imagespect::ClusterClient) -> imagespect::Result<()> {
//! let metadata = ImageMetadata::prepare_from_url("nginx:1.25", cluster).await?;
//! let ports = metadata.exposed_ports(Some("tcp"))?;
//!
//! let volume = SecretVolume::new("certs", "tls-secret")?
//!     .add_item("tls.crt", "cert.pem")
//!     .build();
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod constants;
pub mod error;
pub mod image;
pub mod metadata;
pub mod volume;

// Re-exports
pub use cluster::{ClusterClient, ImageStreamTag, ResolvedImage};
pub use constants::*;
pub use error::{Error, Result};
pub use image::ImageRef;
pub use metadata::{ImageMetadata, WaitStrategy};
pub use volume::{KeyToPath, SecretVolume, SecretVolumeSource, VolumeSpec};
