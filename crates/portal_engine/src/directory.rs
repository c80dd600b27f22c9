//! Cascading selection over the service hierarchy
//! (super-category, ministry, subservice, question).

use portal_model::{
    EngagementEvent, Language, Ministry, Question, Subservice, SuperCategory, Suggestion,
};
use serde::Serialize;
use thiserror::Error;

use crate::engagement;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("no service category '{0}'")]
    UnknownSuperCategory(String),
    #[error("no ministry '{0}' in the selected category")]
    UnknownMinistry(String),
    #[error("no service '{0}' under the selected ministry")]
    UnknownSubservice(String),
    #[error("no question #{0} for the selected service")]
    UnknownQuestion(usize),
    #[error("select a {0} first")]
    NothingSelected(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Download {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerView {
    pub question: String,
    pub answer: String,
    pub downloads: Vec<Download>,
    pub location: Option<String>,
    pub instructions: Option<String>,
    pub subservice: String,
    pub ministry: String,
    pub ministry_link: String,
}

#[derive(Debug, Clone, Default)]
pub struct DirectoryState {
    categories: Vec<SuperCategory>,
    language: Language,
    super_category: Option<usize>,
    ministry: Option<usize>,
    subservice: Option<usize>,
    question: Option<usize>,
}

impl DirectoryState {
    pub fn new(categories: Vec<SuperCategory>) -> Self {
        Self {
            categories,
            ..Default::default()
        }
    }

    /// Replaces the hierarchy; any selection is dropped.
    pub fn set_categories(&mut self, categories: Vec<SuperCategory>) {
        self.categories = categories;
        self.super_category = None;
        self.reset_below_super_category();
    }

    pub fn categories(&self) -> &[SuperCategory] {
        &self.categories
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn text<'a>(&self, text: &'a portal_model::LocalizedText) -> &'a str {
        text.localized(self.language)
    }

    pub fn select_super_category(&mut self, id: &str) -> Result<&SuperCategory, NavError> {
        let idx = self
            .categories
            .iter()
            .position(|sc| sc.id == id)
            .ok_or_else(|| NavError::UnknownSuperCategory(id.to_string()))?;
        self.super_category = Some(idx);
        self.reset_below_super_category();
        Ok(&self.categories[idx])
    }

    pub fn select_ministry(&mut self, id: &str) -> Result<&Ministry, NavError> {
        let idx = self
            .ministries()
            .ok_or(NavError::NothingSelected("service category"))?
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| NavError::UnknownMinistry(id.to_string()))?;
        self.ministry = Some(idx);
        self.subservice = None;
        self.question = None;
        self.selected_ministry()
            .ok_or(NavError::NothingSelected("ministry"))
    }

    pub fn select_subservice(&mut self, id: &str) -> Result<&Subservice, NavError> {
        let idx = self
            .subservices()
            .ok_or(NavError::NothingSelected("ministry"))?
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| NavError::UnknownSubservice(id.to_string()))?;
        self.subservice = Some(idx);
        self.question = None;
        self.selected_subservice()
            .ok_or(NavError::NothingSelected("service"))
    }

    pub fn select_question(&mut self, idx: usize) -> Result<&Question, NavError> {
        let questions = self.questions().ok_or(NavError::NothingSelected("service"))?;
        if idx >= questions.len() {
            return Err(NavError::UnknownQuestion(idx));
        }
        self.question = Some(idx);
        self.selected_question()
            .ok_or(NavError::NothingSelected("question"))
    }

    /// Follows an autosuggest hit down to the ministry or subservice it
    /// names.
    pub fn select_suggestion(&mut self, suggestion: &Suggestion) -> Result<(), NavError> {
        let sc_id = suggestion
            .super_category_id
            .clone()
            .ok_or(NavError::NothingSelected("service category"))?;
        self.select_super_category(&sc_id)?;
        let id = suggestion.id.clone().unwrap_or_default();
        match suggestion.kind.as_deref() {
            Some("ministry") => {
                self.select_ministry(&id)?;
            }
            _ => {
                if let Some(ministry_id) = suggestion.ministry_id.clone() {
                    self.select_ministry(&ministry_id)?;
                    self.select_subservice(&id)?;
                }
            }
        }
        Ok(())
    }

    pub fn selected_super_category(&self) -> Option<&SuperCategory> {
        self.super_category.and_then(|idx| self.categories.get(idx))
    }

    pub fn selected_ministry(&self) -> Option<&Ministry> {
        let idx = self.ministry?;
        self.selected_super_category()?.ministries.get(idx)
    }

    pub fn selected_subservice(&self) -> Option<&Subservice> {
        let idx = self.subservice?;
        self.selected_ministry()?.subservices.get(idx)
    }

    pub fn selected_question(&self) -> Option<&Question> {
        let idx = self.question?;
        self.selected_subservice()?.questions.get(idx)
    }

    pub fn ministries(&self) -> Option<&[Ministry]> {
        self.selected_super_category()
            .map(|sc| sc.ministries.as_slice())
    }

    pub fn subservices(&self) -> Option<&[Subservice]> {
        self.selected_ministry().map(|m| m.subservices.as_slice())
    }

    pub fn questions(&self) -> Option<&[Question]> {
        self.selected_subservice().map(|s| s.questions.as_slice())
    }

    /// The answer panel for the selected question and the engagement event
    /// that records the click.
    pub fn answer_view(
        &self,
        profile_id: Option<&str>,
    ) -> Result<(AnswerView, EngagementEvent), NavError> {
        let ministry = self
            .selected_ministry()
            .ok_or(NavError::NothingSelected("ministry"))?;
        let subservice = self
            .selected_subservice()
            .ok_or(NavError::NothingSelected("service"))?;
        let question = self
            .selected_question()
            .ok_or(NavError::NothingSelected("question"))?;
        let lang = self.language;

        let question_text = question.q.localized(lang).to_string();
        let subservice_name = subservice.name.localized(lang).to_string();
        let instructions = question.instructions.localized(lang);

        let view = AnswerView {
            question: question_text.clone(),
            answer: question.answer.localized(lang).to_string(),
            downloads: question
                .downloads
                .iter()
                .map(|url| Download {
                    url: url.clone(),
                    file_name: url.rsplit('/').next().unwrap_or(url).to_string(),
                })
                .collect(),
            location: question.location.clone(),
            instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
            subservice: subservice_name.clone(),
            ministry: ministry.name.localized(lang).to_string(),
            ministry_link: format!("/ministry/{}", ministry.id),
        };
        let event = engagement::direct_click(question_text, subservice_name, profile_id);
        Ok((view, event))
    }

    fn reset_below_super_category(&mut self) {
        self.ministry = None;
        self.subservice = None;
        self.question = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hierarchy() -> Vec<SuperCategory> {
        serde_json::from_value(json!([{
            "id": "health",
            "name": {"en": "Health", "si": "සෞඛ්‍ය"},
            "ministries": [{
                "id": "moh",
                "name": {"en": "Ministry of Health"},
                "subservices": [{
                    "id": "vacc",
                    "name": {"en": "Vaccination"},
                    "questions": [{
                        "q": {"en": "Where do I get vaccinated?", "si": "එන්නත ලබා ගන්නේ කොහෙද?"},
                        "answer": {"en": "At your MOH office."},
                        "downloads": ["https://files.gov.lk/forms/vaccine-card.pdf"],
                        "location": "https://maps.example/moh"
                    }]
                }, {
                    "id": "cert",
                    "name": "Medical certificates",
                    "questions": []
                }]
            }]
        }]))
        .unwrap()
    }

    #[test]
    fn selecting_a_level_clears_the_ones_below() {
        let mut state = DirectoryState::new(hierarchy());
        state.select_super_category("health").unwrap();
        state.select_ministry("moh").unwrap();
        state.select_subservice("vacc").unwrap();
        state.select_question(0).unwrap();

        state.select_ministry("moh").unwrap();
        assert!(state.selected_subservice().is_none());
        assert!(state.selected_question().is_none());

        state.select_subservice("vacc").unwrap();
        state.select_super_category("health").unwrap();
        assert!(state.selected_ministry().is_none());
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut state = DirectoryState::new(hierarchy());
        assert_eq!(
            state.select_ministry("moh").unwrap_err(),
            NavError::NothingSelected("service category")
        );
        state.select_super_category("health").unwrap();
        assert_eq!(
            state.select_ministry("nope").unwrap_err(),
            NavError::UnknownMinistry("nope".into())
        );
        state.select_ministry("moh").unwrap();
        state.select_subservice("cert").unwrap();
        assert_eq!(state.select_question(0).unwrap_err(), NavError::UnknownQuestion(0));
    }

    #[test]
    fn answer_view_is_localized_and_logs_direct_click() {
        let mut state = DirectoryState::new(hierarchy());
        state.select_super_category("health").unwrap();
        state.select_ministry("moh").unwrap();
        state.select_subservice("vacc").unwrap();
        state.select_question(0).unwrap();
        state.set_language(Language::Si);

        let (view, event) = state.answer_view(Some("p-1")).unwrap();
        assert_eq!(view.question, "එන්නත ලබා ගන්නේ කොහෙද?");
        assert_eq!(view.answer, "At your MOH office.");
        assert_eq!(view.downloads[0].file_name, "vaccine-card.pdf");
        assert_eq!(view.ministry_link, "/ministry/moh");
        assert_eq!(view.instructions, None);
        assert_eq!(event.source, engagement::DIRECT_CLICK);
        assert_eq!(event.user_id.as_deref(), Some("p-1"));
        assert_eq!(event.service.as_deref(), Some("Vaccination"));
    }

    #[test]
    fn suggestion_selects_subservice() {
        let mut state = DirectoryState::new(hierarchy());
        let suggestion: Suggestion = serde_json::from_value(json!({
            "id": "vacc",
            "type": "subservice",
            "name": {"en": "Vaccination"},
            "super_category_id": "health",
            "ministry_id": "moh"
        }))
        .unwrap();
        state.select_suggestion(&suggestion).unwrap();
        assert_eq!(state.selected_subservice().unwrap().id, "vacc");
    }
}
