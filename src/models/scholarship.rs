//! Scholarship and competition catalog entities.

use serde::{Deserialize, Serialize};

/// One catalog entry — a scholarship or a competition listing.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Scholarship {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub organization: String,

    /// Award amount as display text (e.g. "최대 300만원").
    pub amount: String,

    /// Application deadline as `YYYY-MM-DD` display text.
    pub deadline: String,

    pub application_link: String,
    pub conditions: ScholarshipConditions,
    pub category: Category,

    /// Where the listing was sourced from.
    pub source: String,

    pub is_new: bool,
    pub view_count: u32,
}

/// Eligibility conditions; every field is optional and serialized as
/// `null` when unset.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ScholarshipConditions {
    pub grade: Option<Vec<String>>,
    pub major: Option<Vec<String>>,
    pub gpa: Option<f64>,
    pub income: Option<String>,
    pub certificates: Option<Vec<String>>,
}

/// Catalog entry kind.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Scholarship,
    Competition,
}

impl Category {
    /// Parse the query-string form; `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scholarship" => Some(Self::Scholarship),
            "competition" => Some(Self::Competition),
            _ => None,
        }
    }
}

/// Response body for save/unsave bookmark operations.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub scholarship_id: String,
}
