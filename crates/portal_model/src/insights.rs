use crate::scalar;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::formats::PreferMany;
use serde_with::{serde_as, DefaultOnNull, OneOrMany};
use std::fmt;
use std::str::FromStr;

/// Body of `GET /api/admin/insights`. Every field defaults to empty so the
/// default value doubles as the placeholder used when the endpoint fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insights {
    pub age_groups: Map<String, Value>,
    pub jobs: Map<String, Value>,
    pub services: Map<String, Value>,
    pub questions: Map<String, Value>,
    pub premium_suggestions: Vec<PremiumSuggestion>,
    pub ads_clicked: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumSuggestion {
    #[serde(default, deserialize_with = "scalar::opt_text")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "scalar::text_or_empty")]
    pub question: String,
    #[serde(default, deserialize_with = "scalar::count_or_zero")]
    pub count: u64,
}

impl PremiumSuggestion {
    pub fn user_label(&self) -> &str {
        self.user.as_deref().unwrap_or("Unknown")
    }
}

/// Label/value pairs of a counter map, in server order. Non-numeric values
/// count as zero.
pub fn counts(map: &Map<String, Value>) -> Vec<(String, f64)> {
    map.iter()
        .map(|(label, value)| {
            let n = match value {
                Value::Number(n) => n.as_f64().unwrap_or(0.0),
                Value::String(s) => s.parse().unwrap_or(0.0),
                _ => 0.0,
            };
            (label.clone(), n)
        })
        .collect()
}

/// Body of `GET /api/dashboard/analytics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardAnalytics {
    pub user_metrics: Option<Map<String, Value>>,
    pub engagement_metrics: Option<Map<String, Value>>,
    pub store_metrics: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatCards {
    pub total_users: u64,
    pub total_engagements: u64,
    pub total_orders: u64,
    pub ai_searches: u64,
}

impl DashboardAnalytics {
    pub fn stat_cards(&self) -> StatCards {
        StatCards {
            total_users: metric(&self.user_metrics, "total_users"),
            total_engagements: metric(&self.engagement_metrics, "total_engagements"),
            total_orders: metric(&self.store_metrics, "total_orders"),
            ai_searches: metric(&self.engagement_metrics, "recent_engagements"),
        }
    }
}

fn metric(group: &Option<Map<String, Value>>, key: &str) -> u64 {
    group
        .as_ref()
        .and_then(|map| map.get(key))
        .and_then(|value| match value {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .unwrap_or(0)
}

/// Window applied to the engagement and profile listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Today,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl Timeframe {
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Today => "today",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
            Timeframe::All => "all",
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Timeframe::Today),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "year" => Ok(Timeframe::Year),
            "all" | "" => Ok(Timeframe::All),
            other => Err(format!("unknown timeframe '{}'", other)),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of `GET /api/admin/engagements`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engagement {
    #[serde(deserialize_with = "scalar::opt_text")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub user: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub age: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub job: Option<String>,
    #[serde_as(as = "DefaultOnNull<OneOrMany<_, PreferMany>>")]
    pub desires: Vec<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub question_clicked: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub question: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub service: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub ad: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub source: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub timestamp: Option<String>,
}

impl Engagement {
    pub fn user_label(&self) -> &str {
        self.user_id
            .as_deref()
            .or(self.user.as_deref())
            .unwrap_or("N/A")
    }

    pub fn question_label(&self) -> &str {
        self.question_clicked
            .as_deref()
            .or(self.question.as_deref())
            .unwrap_or("")
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    #[serde(deserialize_with = "scalar::opt_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub age: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub job: Option<String>,
    #[serde_as(as = "DefaultOnNull<OneOrMany<_, PreferMany>>")]
    pub desires: Vec<String>,
}

/// Row of `GET /api/admin/profiles`. Profile details may sit in the nested
/// `profile` object or at the top level; the nested copy wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(rename = "_id", deserialize_with = "scalar::opt_text")]
    pub id: Option<String>,
    pub profile: Option<ProfileFields>,
    #[serde(flatten)]
    pub top_level: ProfileFields,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub created: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub updated: Option<String>,
}

impl UserProfile {
    fn pick<'a>(&'a self, field: impl Fn(&'a ProfileFields) -> Option<&'a String>) -> &'a str {
        self.profile
            .as_ref()
            .and_then(&field)
            .or_else(|| field(&self.top_level))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn id_label(&self) -> &str {
        self.id.as_deref().unwrap_or("N/A")
    }

    pub fn name(&self) -> &str {
        self.pick(|p| p.name.as_ref())
    }

    pub fn age(&self) -> &str {
        self.pick(|p| p.age.as_ref())
    }

    pub fn job(&self) -> &str {
        self.pick(|p| p.job.as_ref())
    }

    pub fn desires(&self) -> String {
        match &self.profile {
            Some(profile) if !profile.desires.is_empty() => profile.desires.join(", "),
            _ => self.top_level.desires.join(", "),
        }
    }
}

/// Payload of `POST /api/engagement`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementEvent {
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(default)]
    pub desires: Vec<String>,
    pub question_clicked: Option<String>,
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad: Option<String>,
    pub source: String,
}

/// Data collected by the progressive profile form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSubmission {
    pub name: String,
    pub age: String,
    pub email: String,
    pub phone: String,
    pub job: String,
    pub desires: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSearchRequest {
    pub query: String,
    pub top_k: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSearchReply {
    pub query: String,
    pub answer: String,
    pub sources: Vec<Value>,
    pub hits_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stat_cards_default_to_zero() {
        let analytics: DashboardAnalytics = serde_json::from_value(json!({
            "user_metrics": {"total_users": 12},
            "engagement_metrics": {"total_engagements": "40"}
        }))
        .unwrap();
        let cards = analytics.stat_cards();
        assert_eq!(cards.total_users, 12);
        assert_eq!(cards.total_engagements, 40);
        assert_eq!(cards.total_orders, 0);
        assert_eq!(cards.ai_searches, 0);
    }

    #[test]
    fn nested_profile_fields_win() {
        let profile: UserProfile = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Top",
            "job": "Clerk",
            "desires": "travel",
            "profile": {"name": "Nested", "age": 31}
        }))
        .unwrap();
        assert_eq!(profile.name(), "Nested");
        assert_eq!(profile.age(), "31");
        assert_eq!(profile.job(), "Clerk");
        assert_eq!(profile.desires(), "travel");
    }

    #[test]
    fn timeframe_defaults_to_all() {
        assert_eq!(Timeframe::default(), Timeframe::All);
        assert_eq!("Week".parse::<Timeframe>().unwrap(), Timeframe::Week);
        assert!("fortnight".parse::<Timeframe>().is_err());
    }

    #[test]
    fn engagement_labels_fall_back() {
        let row: Engagement = serde_json::from_value(json!({
            "user": "u9", "question": "How?", "desires": ["a", "b"], "age": null
        }))
        .unwrap();
        assert_eq!(row.user_label(), "u9");
        assert_eq!(row.question_label(), "How?");
        assert_eq!(row.desires, vec!["a", "b"]);
    }
}
