use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaValidationError {
    #[error("Media URI cannot be empty.")]
    EmptyMediaUri,

    #[error("Media URI is not a valid absolute URI: {0}")]
    InvalidMediaUri(String),
}

//
// ─── MEDIA URI ─────────────────────────────────────────────────────────────────
//

/// Absolute URI of a media asset or a finished recording.
///
/// Asset URLs delivered protocol-relative (`//host/path`) or without a scheme are
/// normalized to `https:`. Device-local recordings keep their own scheme (`file:`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaUri(Url);

impl MediaUri {
    /// Parse a raw URI, normalizing protocol-relative URLs to `https:`.
    ///
    /// # Errors
    ///
    /// Returns `MediaValidationError::EmptyMediaUri` for blank input and
    /// `MediaValidationError::InvalidMediaUri` when the result is not a valid URI.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MediaValidationError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }

        let normalized = if s.starts_with("//") {
            format!("https:{s}")
        } else if s.contains("://") || s.starts_with("file:") || s.starts_with("data:") {
            s.to_string()
        } else {
            format!("https://{s}")
        };

        Url::parse(&normalized)
            .map(Self)
            .map_err(|_| MediaValidationError::InvalidMediaUri(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// True for recordings captured on the device.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }
}

impl fmt::Debug for MediaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaUri({})", self.0)
    }
}

impl fmt::Display for MediaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for MediaUri {
    type Error = MediaValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MediaUri> for String {
    fn from(value: MediaUri) -> Self {
        value.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_relative_urls_become_https() {
        let uri = MediaUri::parse("//assets.ctfassets.net/space/abc/hello.mp3").unwrap();
        assert_eq!(uri.as_str(), "https://assets.ctfassets.net/space/abc/hello.mp3");
        assert!(!uri.is_local());
    }

    #[test]
    fn absolute_urls_are_kept() {
        let uri = MediaUri::parse("http://example.com/a.png").unwrap();
        assert_eq!(uri.as_str(), "http://example.com/a.png");
    }

    #[test]
    fn recordings_keep_file_scheme() {
        let uri = MediaUri::parse("file:///data/recording-1.m4a").unwrap();
        assert!(uri.is_local());
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(
            MediaUri::parse("   ").unwrap_err(),
            MediaValidationError::EmptyMediaUri
        );
    }
}
