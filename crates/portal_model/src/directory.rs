use crate::locale::LocalizedText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuperCategory {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub ministries: Vec<Ministry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Admin-side name for a super-category document.
pub type ServiceRecord = SuperCategory;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ministry {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub subservices: Vec<Subservice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subservice {
    pub id: String,
    pub name: LocalizedText,
    pub brief: LocalizedText,
    pub eligibility: LocalizedText,
    pub documents: LocalizedText,
    pub fees: LocalizedText,
    pub application_steps: LocalizedText,
    pub contact: LocalizedText,
    pub office_hours: LocalizedText,
    pub location: LocalizedText,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    pub q: LocalizedText,
    pub answer: LocalizedText,
    pub downloads: Vec<String>,
    #[serde(deserialize_with = "crate::scalar::opt_text")]
    pub location: Option<String>,
    pub instructions: LocalizedText,
}

/// Item returned by `GET /api/search/autosuggest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestion {
    #[serde(deserialize_with = "crate::scalar::opt_text")]
    pub id: Option<String>,
    #[serde(rename = "type", deserialize_with = "crate::scalar::opt_text")]
    pub kind: Option<String>,
    pub name: LocalizedText,
    #[serde(deserialize_with = "crate::scalar::opt_text")]
    pub super_category_id: Option<String>,
    pub super_category_name: LocalizedText,
    #[serde(deserialize_with = "crate::scalar::opt_text")]
    pub ministry_id: Option<String>,
    pub ministry_name: LocalizedText,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Suggestion {
    /// The group label shown next to a suggestion.
    pub fn group(&self) -> &LocalizedText {
        if self.super_category_name.is_empty() {
            &self.ministry_name
        } else {
            &self.super_category_name
        }
    }
}
