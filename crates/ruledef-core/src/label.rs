//! # Labels
//!
//! A [`Label`] names a target or a source file in a build description, e.g.
//! `//objc/resources:assets` or `a.bundle/x.png`. Label-typed attributes
//! only accept text that parses as a label, so a stray space or an empty
//! string is caught as a type mismatch rather than surfacing later as a
//! missing file.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A validated reference to a target or file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// Parse a label, rejecting empty strings, whitespace and NUL bytes.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if s.is_empty() {
            return Err(CoreError::InvalidLabel {
                label: s.to_string(),
                reason: "label is empty".to_string(),
            });
        }
        if let Some(c) = s.chars().find(|c| c.is_whitespace() || *c == '\0') {
            return Err(CoreError::InvalidLabel {
                label: s.to_string(),
                reason: format!("label contains forbidden character {c:?}"),
            });
        }
        Ok(Self(s.to_string()))
    }

    /// Access the label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path component of the label: the target name after `:`,
    /// or the file name after the final `/`.
    pub fn name(&self) -> &str {
        let tail = self.0.rsplit(':').next().unwrap_or(&self.0);
        tail.rsplit('/').next().unwrap_or(tail)
    }
}

impl TryFrom<String> for Label {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_target_and_file_labels() {
        assert!(Label::parse("//objc/resources:assets").is_ok());
        assert!(Label::parse("a.bundle/x.png").is_ok());
        assert!(Label::parse(":local").is_ok());
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = Label::parse("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_parse_rejects_whitespace() {
        assert!(Label::parse("a b").is_err());
        assert!(Label::parse("tab\there").is_err());
        assert!(Label::parse("nul\0").is_err());
    }

    #[test]
    fn test_name_component() {
        assert_eq!(Label::parse("//pkg:target").unwrap().name(), "target");
        assert_eq!(Label::parse("a.bundle/x.png").unwrap().name(), "x.png");
        assert_eq!(Label::parse("//pkg:dir/file.txt").unwrap().name(), "file.txt");
        assert_eq!(Label::parse("plain").unwrap().name(), "plain");
    }

    #[test]
    fn test_serde_rejects_invalid_label() {
        let ok: Label = serde_json::from_str("\"//a:b\"").unwrap();
        assert_eq!(ok.as_str(), "//a:b");
        assert!(serde_json::from_str::<Label>("\"\"").is_err());
    }
}
