//! Design constants for image metadata resolution.
//!
//! Single source of truth for wait intervals, timeouts, and reference
//! limits used throughout the crate.

use std::time::Duration;

// =============================================================================
// Image Reference Limits
// =============================================================================

/// Maximum image reference length in bytes.
///
/// References longer than this are rejected before parsing. Registry
/// implementations may enforce lower limits.
pub const MAX_IMAGE_REF_LEN: usize = 512;

// =============================================================================
// Metadata Wait Tuning
// =============================================================================
//
// After an image stream is created, the cluster downloads and inspects the
// image asynchronously. There is no completion signal; the resolver either
// polls for the tag (default) or sleeps a fixed interval (compatibility).
// =============================================================================

/// Fixed interval slept by [`WaitStrategy::FixedDelay`] compatibility mode
/// before the single tag fetch.
///
/// [`WaitStrategy::FixedDelay`]: crate::metadata::WaitStrategy::FixedDelay
pub const METADATA_FIXED_DELAY: Duration = Duration::from_secs(10);

/// Initial interval between readiness polls for an image stream tag.
pub const METADATA_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Upper bound on the poll interval as backoff doubles it.
pub const METADATA_POLL_MAX_INTERVAL: Duration = Duration::from_secs(4);

/// Total time budget for the readiness poll before it fails with
/// [`Error::Timeout`].
///
/// Covers a cold image pull on a loaded cluster; test clusters usually
/// resolve well under this.
///
/// [`Error::Timeout`]: crate::error::Error::Timeout
pub const METADATA_POLL_TIMEOUT: Duration = Duration::from_secs(120);
