//! Institution classification.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Category of an educational institution, derived from its name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InstitutionType {
    College,
    University,
    Institute,
}

impl InstitutionType {
    /// Markers in match priority order. A name carrying several markers is
    /// reported as the earliest one here.
    pub const PRIORITY: &'static [InstitutionType] =
        &[InstitutionType::College, InstitutionType::University, InstitutionType::Institute];

    /// Value stored in the `type` column; also the substring searched for.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::College => "College",
            Self::University => "University",
            Self::Institute => "Institute",
        }
    }
}

impl std::fmt::Display for InstitutionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstitutionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "College" => Ok(Self::College),
            "University" => Ok(Self::University),
            "Institute" => Ok(Self::Institute),
            other => Err(CoreError::InvalidInstitutionType(other.to_owned())),
        }
    }
}

/// Classify an institution by the first marker its name contains.
///
/// Matching is case-sensitive. Missing or empty names, and names with no
/// marker, yield `None`.
#[must_use]
pub fn classify(name: Option<&str>) -> Option<InstitutionType> {
    let name = name.filter(|n| !n.is_empty())?;
    InstitutionType::PRIORITY.iter().copied().find(|t| name.contains(t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_name_is_unclassified() {
        assert_eq!(classify(None), None);
        assert_eq!(classify(Some("")), None);
    }

    #[test]
    fn college_wins_over_university() {
        assert_eq!(classify(Some("X College University")), Some(InstitutionType::College));
        assert_eq!(classify(Some("University College London")), Some(InstitutionType::College));
    }

    #[test]
    fn university_wins_over_institute() {
        assert_eq!(
            classify(Some("Institute of Technology University")),
            Some(InstitutionType::University)
        );
    }

    #[test]
    fn single_markers() {
        assert_eq!(classify(Some("Springfield Institute")), Some(InstitutionType::Institute));
        assert_eq!(classify(Some("Example University")), Some(InstitutionType::University));
        assert_eq!(classify(Some("Middlebury College")), Some(InstitutionType::College));
    }

    #[test]
    fn no_marker_is_unclassified() {
        assert_eq!(classify(Some("No Markers Here")), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(classify(Some("middle college of arts")), None);
        assert_eq!(classify(Some("UNIVERSITY OF SOMEWHERE")), None);
    }

    #[test]
    fn marker_may_be_embedded_in_a_longer_word() {
        assert_eq!(classify(Some("Collegeville Academy")), Some(InstitutionType::College));
    }

    #[test]
    fn column_value_round_trips_through_from_str() {
        for t in InstitutionType::PRIORITY {
            assert_eq!(t.as_str().parse::<InstitutionType>(), Ok(*t));
        }
        assert_eq!(
            "college".parse::<InstitutionType>(),
            Err(CoreError::InvalidInstitutionType("college".to_owned()))
        );
    }
}
