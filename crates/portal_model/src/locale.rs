use serde::de::{Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Languages the portal publishes content in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Si,
    Ta,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Si => "si",
            Language::Ta => "ta",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "si" | "sinhala" => Ok(Language::Si),
            "ta" | "tamil" => Ok(Language::Ta),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A display string that is either plain text or a per-language map.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalizedText {
    Plain(String),
    Translations(Map<String, Value>),
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}

impl LocalizedText {
    pub fn translations<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        LocalizedText::Translations(
            pairs
                .into_iter()
                .map(|(lang, text)| (lang.to_string(), Value::String(text.to_string())))
                .collect(),
        )
    }

    /// Requested language, then English, then whatever translation comes
    /// first, then the empty string.
    pub fn localized(&self, lang: Language) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Translations(map) => [lang.code(), "en"]
                .iter()
                .filter_map(|code| map.get(*code))
                .chain(map.values())
                .filter_map(Value::as_str)
                .find(|text| !text.is_empty())
                .unwrap_or(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.localized(Language::En).is_empty()
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        LocalizedText::Plain(value.to_string())
    }
}

impl From<String> for LocalizedText {
    fn from(value: String) -> Self {
        LocalizedText::Plain(value)
    }
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LocalizedText::Plain(text) => serializer.serialize_str(text),
            LocalizedText::Translations(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => LocalizedText::default(),
            Value::String(text) => LocalizedText::Plain(text),
            Value::Object(map) => LocalizedText::Translations(map),
            other => LocalizedText::Plain(other.to_string()),
        })
    }
}
