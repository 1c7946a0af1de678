//! Container image references.
//!
//! An [`ImageRef`] identifies an image by repository and tag. The short
//! repository name doubles as the image-stream name on the cluster, and
//! `"<repo>:<major_tag>"` is the image-stream-tag lookup key.

use crate::constants::MAX_IMAGE_REF_LEN;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Reference to a container image by repository and tag.
///
/// Immutable once parsed. Tags are version labels; digest references
/// (`@sha256:...`) are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Full repository path, e.g. `registry.example.com/library/nginx`.
    repository: String,
    /// Tag, e.g. `1.25`. Defaults to `latest` when the reference has none.
    tag: String,
}

impl ImageRef {
    /// Parses an image URL into a reference.
    ///
    /// The tag is the part after the last `:` that follows the last `/`,
    /// so registry ports (`registry.example.com:5000/app`) are not
    /// mistaken for tags.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidImageReference`] if the URL is empty, exceeds
    /// [`MAX_IMAGE_REF_LEN`], contains characters outside the allowlist
    /// (alphanumeric plus `/:.-_@`), is a digest reference, or has an
    /// empty repository or tag component.
    pub fn parse(url: &str) -> Result<Self> {
        if url.is_empty() {
            return Err(Error::InvalidImageReference {
                reference: url.to_string(),
                reason: "empty image reference".to_string(),
            });
        }

        if url.len() > MAX_IMAGE_REF_LEN {
            return Err(Error::InvalidImageReference {
                reference: url.chars().take(50).collect::<String>() + "...",
                reason: format!("exceeds maximum length of {} bytes", MAX_IMAGE_REF_LEN),
            });
        }

        if !url.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || c == '/'
                || c == ':'
                || c == '.'
                || c == '-'
                || c == '_'
                || c == '@'
        }) {
            return Err(Error::InvalidImageReference {
                reference: url.to_string(),
                reason: "contains invalid characters".to_string(),
            });
        }

        if url.contains('@') {
            return Err(Error::InvalidImageReference {
                reference: url.to_string(),
                reason: "digest references are not supported".to_string(),
            });
        }

        // A ':' only separates the tag when it comes after the last '/'.
        let (repository, tag) = match url.rsplit_once(':') {
            Some((repo, tag)) if !tag.contains('/') => (repo, tag),
            _ => (url, "latest"),
        };

        if repository.is_empty() || repository.ends_with('/') {
            return Err(Error::InvalidImageReference {
                reference: url.to_string(),
                reason: "empty repository".to_string(),
            });
        }

        if tag.is_empty() {
            return Err(Error::InvalidImageReference {
                reference: url.to_string(),
                reason: "empty tag".to_string(),
            });
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
        })
    }

    /// Full repository path as given in the reference.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Short repository name (final path segment); names the image stream.
    pub fn repo(&self) -> &str {
        self.repository
            .rsplit('/')
            .next()
            .unwrap_or(&self.repository)
    }

    /// Tag as given in the reference.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Major version label of the tag: everything before the first `.`,
    /// or the whole tag when it has none (`"1.25"` → `"1"`, `"latest"`
    /// stays `"latest"`).
    pub fn major_tag(&self) -> &str {
        self.tag.split('.').next().unwrap_or(&self.tag)
    }

    /// Image-stream-tag lookup key: `"<repo>:<major_tag>"`.
    pub fn stream_tag_name(&self) -> String {
        format!("{}:{}", self.repo(), self.major_tag())
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_is_final_path_segment() {
        let image = ImageRef::parse("registry.example.com/library/nginx:1.25").unwrap();
        assert_eq!(image.repo(), "nginx");
        assert_eq!(image.repository(), "registry.example.com/library/nginx");
    }

    #[test]
    fn registry_port_is_not_a_tag() {
        let image = ImageRef::parse("registry.example.com:5000/app").unwrap();
        assert_eq!(image.repository(), "registry.example.com:5000/app");
        assert_eq!(image.tag(), "latest");
    }

    #[test]
    fn major_tag_stops_at_first_dot() {
        let image = ImageRef::parse("nginx:1.25.3").unwrap();
        assert_eq!(image.major_tag(), "1");
    }
}
