//! Records managed through the admin CRUD endpoints. Unknown fields are kept
//! in `extra` so that a fetch, edit, save cycle does not drop data.

use crate::locale::LocalizedText;
use crate::scalar;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    #[serde(default, deserialize_with = "scalar::text_or_empty")]
    pub id: String,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub body: LocalizedText,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "scalar::text_or_empty")]
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficerContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    #[serde(default, deserialize_with = "scalar::text_or_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ministry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<OfficerContact>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Officer {
    /// Flat `email` wins over the nested contact block.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .or_else(|| self.contact.as_ref().and_then(|c| c.email.as_deref()))
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .or_else(|| self.contact.as_ref().and_then(|c| c.phone.as_deref()))
    }
}
