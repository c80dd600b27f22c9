use portal_model::insights::counts;
use portal_model::Insights;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TOP_QUESTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    AgeGroups,
    Jobs,
    Services,
    Questions,
    AdClicks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    Pie,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub series: Vec<(String, f64)>,
}

impl Chart {
    fn new(kind: ChartKind, title: &str, series: Vec<(String, f64)>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            series,
        }
    }

    pub fn max_value(&self) -> f64 {
        self.series.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }
}

/// Live chart instances. Every dashboard load clears the registry before
/// drawing so nothing from a previous load lingers.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<ChartId, Chart>,
}

impl ChartRegistry {
    pub fn clear(&mut self) {
        self.charts.clear();
    }

    pub fn insert(&mut self, id: ChartId, chart: Chart) {
        self.charts.insert(id, chart);
    }

    pub fn get(&self, id: ChartId) -> Option<&Chart> {
        self.charts.get(&id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChartId, &Chart)> {
        self.charts.iter()
    }

    /// Replaces every chart with ones drawn from `insights`.
    pub fn render(&mut self, insights: &Insights) {
        self.clear();
        self.insert(
            ChartId::AgeGroups,
            Chart::new(ChartKind::Bar, "Engagement by Age Group", counts(&insights.age_groups)),
        );
        self.insert(
            ChartId::Jobs,
            Chart::new(ChartKind::Pie, "Engagement by Job", counts(&insights.jobs)),
        );
        self.insert(
            ChartId::Services,
            Chart::new(
                ChartKind::Doughnut,
                "Service Engagement",
                counts(&insights.services),
            ),
        );
        let mut questions = counts(&insights.questions);
        questions.truncate(TOP_QUESTIONS);
        self.insert(
            ChartId::Questions,
            Chart::new(
                ChartKind::HorizontalBar,
                "Most Clicked Questions (Top 10)",
                questions,
            ),
        );
        if !insights.ads_clicked.is_empty() {
            self.insert(
                ChartId::AdClicks,
                Chart::new(ChartKind::Bar, "Ad Clicks", counts(&insights.ads_clicked)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_replaces_previous_charts() {
        let mut registry = ChartRegistry::default();
        let with_ads: Insights = serde_json::from_value(json!({
            "ads_clicked": {"ad-1": 3}
        }))
        .unwrap();
        registry.render(&with_ads);
        assert!(registry.get(ChartId::AdClicks).is_some());

        registry.render(&Insights::default());
        assert!(registry.get(ChartId::AdClicks).is_none());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn questions_keep_first_ten_in_server_order() {
        let questions: serde_json::Map<String, serde_json::Value> =
            (0..15).map(|i| (format!("q{:02}", i), json!(15 - i))).collect();
        let insights = Insights {
            questions,
            ..Default::default()
        };
        let mut registry = ChartRegistry::default();
        registry.render(&insights);
        let chart = registry.get(ChartId::Questions).unwrap();
        assert_eq!(chart.series.len(), TOP_QUESTIONS);
        assert_eq!(chart.series[0], ("q00".to_string(), 15.0));
        assert_eq!(chart.max_value(), 15.0);
    }
}
