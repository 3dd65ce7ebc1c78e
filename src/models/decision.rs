use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of validating one distinct candidate venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Decision {
    Accepted {
        canonical_name: String,
        map_url: String,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl Decision {
    pub fn rejected(reason: RejectReason) -> Self {
        Decision::Rejected { reason }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted { .. })
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Decision::Rejected { reason } => Some(*reason),
            Decision::Accepted { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Unresolved,
    NonVenueLabel,
    WrongLocality,
    CategoryNotAllowed,
    CategoryDenied,
    InsufficientReviews,
    NameMismatch,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Unresolved => "unresolved",
            RejectReason::NonVenueLabel => "non_venue_label",
            RejectReason::WrongLocality => "wrong_locality",
            RejectReason::CategoryNotAllowed => "category_not_allowed",
            RejectReason::CategoryDenied => "category_denied",
            RejectReason::InsufficientReviews => "insufficient_reviews",
            RejectReason::NameMismatch => "name_mismatch",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision paired with the candidate name it was made for, in the order
/// the candidates first appeared in the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueDecision {
    pub name: String,
    #[serde(flatten)]
    pub decision: Decision,
}
