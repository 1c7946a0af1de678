//! Secret-backed pod volume building.
//!
//! [`SecretVolume`] collects a volume name, the backing Secret's name, and
//! optional key-to-path item mappings, then compiles them into the
//! cluster-facing [`VolumeSpec`] fragment consumed by whatever assembles
//! the full pod specification.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Maximum length for volume names (RFC 1123 DNS label).
const MAX_NAME_LEN: usize = 63;

/// Maximum length for Secret names (RFC 1123 DNS subdomain).
const MAX_SECRET_NAME_LEN: usize = 253;

// =============================================================================
// Validation Helpers
// =============================================================================

/// Validates an RFC 1123 DNS label (volume names).
fn validate_label(name: &str, what: &str) -> Result<()> {
    validate(name, what, MAX_NAME_LEN, |c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
    })
}

/// Validates an RFC 1123 DNS subdomain (Secret names; dots allowed).
fn validate_subdomain(name: &str, what: &str) -> Result<()> {
    validate(name, what, MAX_SECRET_NAME_LEN, |c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.'
    })
}

fn validate(name: &str, what: &str, max_len: usize, allowed: fn(char) -> bool) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput(format!("{} cannot be empty", what)));
    }

    if name.len() > max_len {
        return Err(Error::InvalidInput(format!(
            "{} '{}' exceeds maximum length of {}",
            what, name, max_len
        )));
    }

    if !name.chars().all(allowed) {
        return Err(Error::InvalidInput(format!(
            "{} '{}' contains invalid characters",
            what, name
        )));
    }

    if name.starts_with(['-', '.']) || name.ends_with(['-', '.']) {
        return Err(Error::InvalidInput(format!(
            "{} '{}' cannot start or end with '-' or '.'",
            what, name
        )));
    }

    Ok(())
}

// =============================================================================
// Builder
// =============================================================================

/// Declarative builder for a Secret-backed pod volume.
///
/// Items map Secret keys to file paths inside the mounted volume and are
/// emitted in insertion order. A volume with no items projects the whole
/// Secret.
#[derive(Debug, Clone)]
pub struct SecretVolume {
    name: String,
    secret_name: String,
    items: Vec<(String, String)>,
}

impl SecretVolume {
    /// Creates a builder for a volume `name` backed by Secret
    /// `secret_name`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if `name` is not a DNS label or
    /// `secret_name` is not a DNS subdomain.
    pub fn new(name: &str, secret_name: &str) -> Result<Self> {
        validate_label(name, "volume name")?;
        validate_subdomain(secret_name, "secret name")?;

        Ok(Self {
            name: name.to_string(),
            secret_name: secret_name.to_string(),
            items: Vec::new(),
        })
    }

    /// Appends one key-to-path item.
    pub fn add_item(mut self, key: &str, path: &str) -> Self {
        self.items.push((key.to_string(), path.to_string()));
        self
    }

    /// Appends items from an iterator, preserving its order.
    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.items.extend(items);
        self
    }

    /// Volume name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the backing Secret.
    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    /// Compiles the cluster-facing volume fragment.
    ///
    /// Each configured item becomes one `{key, path}` pair, in insertion
    /// order. With no items configured, the fragment references the
    /// Secret by name and carries no item list.
    pub fn build(&self) -> VolumeSpec {
        let items = if self.items.is_empty() {
            None
        } else {
            Some(
                self.items
                    .iter()
                    .map(|(key, path)| KeyToPath {
                        key: key.clone(),
                        path: path.clone(),
                    })
                    .collect(),
            )
        };

        VolumeSpec {
            name: self.name.clone(),
            secret: SecretVolumeSource {
                secret_name: self.secret_name.clone(),
                items,
            },
        }
    }
}

// =============================================================================
// Volume Fragment Types
// =============================================================================

/// Pod volume specification fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSpec {
    /// Volume name (referenced by volume mounts).
    pub name: String,
    /// Secret volume source.
    pub secret: SecretVolumeSource,
}

/// Secret reference within a volume specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVolumeSource {
    /// Name of the Secret to project.
    pub secret_name: String,
    /// Optional key-to-path projections; absent projects every key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<KeyToPath>>,
}

/// Projection of one Secret key to a file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyToPath {
    /// Secret key to project.
    pub key: String,
    /// Relative file path to project the key to.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_name_rejects_dots() {
        assert!(SecretVolume::new("certs.v1", "tls-secret").is_err());
    }

    #[test]
    fn secret_name_allows_dots() {
        assert!(SecretVolume::new("certs", "tls.example.com").is_ok());
    }

    #[test]
    fn names_cannot_be_empty() {
        assert!(SecretVolume::new("", "tls-secret").is_err());
        assert!(SecretVolume::new("certs", "").is_err());
    }
}
