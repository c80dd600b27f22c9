//! Input checks done before anything is sent: the citizen profile form and
//! the admin record editors.

use once_cell::sync::Lazy;
use portal_model::{Ad, Category, LocalizedText, Officer, ProfileSubmission, ServiceRecord};
use regex_lite::Regex;
use serde_json::Value;
use thiserror::Error;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-\s()]{6,20}$").expect("phone pattern"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("All fields are required. Please fill out every detail. (missing: {})", .0.join(", "))]
    MissingProfileFields(Vec<&'static str>),
    #[error("Name and Age are required.")]
    NameAndAgeRequired,
    #[error("ID and Title are required.")]
    AdIdAndTitle,
    #[error("ID and Name are required.")]
    IdAndName,
    #[error("Service ID and English Name are required.")]
    ServiceIdAndName,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter a valid phone number (6-20 digits, can include +, -, spaces).")]
    InvalidPhone,
    #[error("Invalid JSON for subservices. Please check the format. Error: {0}")]
    InvalidSubservices(String),
}

/// The three-step citizen profile. Every field is mandatory on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub age: String,
    pub email: String,
    pub phone: String,
    pub job: String,
    pub desire: String,
}

impl ProfileForm {
    /// Check run when leaving the first step.
    pub fn check_first_step(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() || self.age.trim().is_empty() {
            return Err(FormError::NameAndAgeRequired);
        }
        Ok(())
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("age", &self.age),
            ("email", &self.email),
            ("phone", &self.phone),
            ("job", &self.job),
            ("desire", &self.desire),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    pub fn validate(&self) -> Result<ProfileSubmission, FormError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FormError::MissingProfileFields(missing));
        }
        Ok(ProfileSubmission {
            name: self.name.trim().to_string(),
            age: self.age.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            job: self.job.trim().to_string(),
            desires: vec![self.desire.trim().to_string()],
        })
    }
}

fn blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

pub fn ad(id: &str, title: &str, body: &str) -> Result<Ad, FormError> {
    if blank(id) || blank(title) {
        return Err(FormError::AdIdAndTitle);
    }
    Ok(Ad {
        id: id.trim().to_string(),
        title: title.trim().into(),
        body: body.trim().into(),
        ..Default::default()
    })
}

pub fn category(id: &str, name: &str) -> Result<Category, FormError> {
    if blank(id) || blank(name) {
        return Err(FormError::IdAndName);
    }
    Ok(Category {
        id: id.trim().to_string(),
        name: name.trim().into(),
        ..Default::default()
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficerForm {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
}

impl OfficerForm {
    pub fn validate(&self) -> Result<Officer, FormError> {
        if blank(&self.id) || blank(&self.name) {
            return Err(FormError::IdAndName);
        }
        let email = optional(&self.email);
        if matches!(&email, Some(email) if !EMAIL.is_match(email)) {
            return Err(FormError::InvalidEmail);
        }
        let phone = optional(&self.phone);
        if matches!(&phone, Some(phone) if !PHONE.is_match(phone)) {
            return Err(FormError::InvalidPhone);
        }
        Ok(Officer {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            role: optional(&self.role),
            email,
            phone,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceForm {
    pub id: String,
    pub name_en: String,
    pub name_si: String,
    pub name_ta: String,
    /// JSON array of subservices; blank means none.
    pub subservices_json: String,
}

impl ServiceForm {
    pub fn validate(&self) -> Result<ServiceRecord, FormError> {
        if blank(&self.id) || blank(&self.name_en) {
            return Err(FormError::ServiceIdAndName);
        }
        let subservices = if blank(&self.subservices_json) {
            Value::Array(Vec::new())
        } else {
            let parsed: Value = serde_json::from_str(self.subservices_json.trim())
                .map_err(|err| FormError::InvalidSubservices(err.to_string()))?;
            if !parsed.is_array() {
                return Err(FormError::InvalidSubservices(
                    "Subservices must be a JSON array.".to_string(),
                ));
            }
            parsed
        };

        let mut record = ServiceRecord {
            id: self.id.trim().to_string(),
            name: LocalizedText::translations([
                ("en", self.name_en.trim()),
                ("si", self.name_si.trim()),
                ("ta", self.name_ta.trim()),
            ]),
            ..Default::default()
        };
        record.extra.insert("subservices".to_string(), subservices);
        Ok(record)
    }
}
