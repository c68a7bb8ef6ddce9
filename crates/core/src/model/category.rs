use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Practice category an exercise (or lesson) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Writing,
    Speaking,
    Listening,
}

impl Category {
    /// Categories in the order the mixed quiz concatenates them before shuffling.
    pub const ALL: [Category; 3] = [Category::Writing, Category::Speaking, Category::Listening];

    /// Label used by the content provider (`typeOfExercise` / `typeOfLesson`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Writing => "Writing",
            Category::Speaking => "Speaking",
            Category::Listening => "Listening",
        }
    }

    /// Writing and Listening questions are answered by picking one of the choices.
    #[must_use]
    pub fn is_choice_based(self) -> bool {
        matches!(self, Category::Writing | Category::Listening)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a `Category` from a provider label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError {
    raw: String,
}

impl ParseCategoryError {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown exercise category: {}", self.raw)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "writing" => Ok(Category::Writing),
            "speaking" => Ok(Category::Speaking),
            "listening" => Ok(Category::Listening),
            _ => Err(ParseCategoryError { raw: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_labels_case_insensitively() {
        assert_eq!("Writing".parse::<Category>().unwrap(), Category::Writing);
        assert_eq!(" speaking ".parse::<Category>().unwrap(), Category::Speaking);
        assert_eq!("LISTENING".parse::<Category>().unwrap(), Category::Listening);
    }

    #[test]
    fn rejects_unknown_label() {
        let err = "Reading".parse::<Category>().unwrap_err();
        assert_eq!(err.raw(), "Reading");
    }

    #[test]
    fn only_speaking_is_not_choice_based() {
        assert!(Category::Writing.is_choice_based());
        assert!(Category::Listening.is_choice_based());
        assert!(!Category::Speaking.is_choice_based());
    }
}
