//! Core domain types for the Monotone tutorial viewer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MonotoneError;

// ---------------------------------------------------------------------------
// TutorialId
// ---------------------------------------------------------------------------

/// Stable numeric identifier of a tutorial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TutorialId(pub u32);

impl std::fmt::Display for TutorialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TutorialId {
    type Err = MonotoneError;

    /// Accepts ASCII decimal digits only; signs and whitespace are rejected.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MonotoneError::parse(format!("'{s}' is not a tutorial id")));
        }
        s.parse::<u32>()
            .map(Self)
            .map_err(|e| MonotoneError::parse(format!("tutorial id '{s}': {e}")))
    }
}

impl From<u32> for TutorialId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// RouteParam
// ---------------------------------------------------------------------------

/// The raw identifier segment taken from the current route.
///
/// Never validated on construction: a route may carry an id that is not in
/// the index, or one that is not an id at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParam(String);

impl RouteParam {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the parameter as a tutorial id, if it is one.
    pub fn tutorial_id(&self) -> Option<TutorialId> {
        self.0.parse().ok()
    }
}

impl From<TutorialId> for RouteParam {
    fn from(id: TutorialId) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for RouteParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// TutorialSummary
// ---------------------------------------------------------------------------

/// One entry of the tutorial index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialSummary {
    /// Unique, stable identifier.
    pub id: TutorialId,
    /// Display title.
    pub title: String,
    /// One-line description shown under the title.
    pub description: String,
    /// When the tutorial was written.
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutorial_id_parses_decimal() {
        let id: TutorialId = "42".parse().expect("parse id");
        assert_eq!(id, TutorialId(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn tutorial_id_rejects_garbage() {
        assert!("".parse::<TutorialId>().is_err());
        assert!("-1".parse::<TutorialId>().is_err());
        assert!("+1".parse::<TutorialId>().is_err());
        assert!("1a".parse::<TutorialId>().is_err());
        assert!("../etc/passwd".parse::<TutorialId>().is_err());
        assert!(" 5".parse::<TutorialId>().is_err());
        assert!("4294967296".parse::<TutorialId>().is_err());
    }

    #[test]
    fn tutorial_id_rejects_sign_with_parse_error() {
        let err = "+5".parse::<TutorialId>().unwrap_err();
        assert!(matches!(err, MonotoneError::Parse { .. }));
        assert!(err.to_string().contains("'+5' is not a tutorial id"));
        assert_eq!(RouteParam::new("+5").tutorial_id(), None);
        assert_eq!("007".parse::<TutorialId>().unwrap(), TutorialId(7));
    }

    #[test]
    fn route_param_keeps_raw_value() {
        let param = RouteParam::new("abc");
        assert_eq!(param.as_str(), "abc");
        assert_eq!(param.tutorial_id(), None);

        let param = RouteParam::from(TutorialId(7));
        assert_eq!(param.tutorial_id(), Some(TutorialId(7)));
    }

    #[test]
    fn summary_accepts_camel_case_created_at() {
        let json = r#"{
            "id": 1,
            "title": "Indexes",
            "description": "Using indexes in PostgreSQL",
            "createdAt": "2022-03-01T00:00:00Z"
        }"#;
        let parsed: TutorialSummary = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.id, TutorialId(1));
        assert_eq!(parsed.created_at.to_rfc3339(), "2022-03-01T00:00:00+00:00");
    }
}
