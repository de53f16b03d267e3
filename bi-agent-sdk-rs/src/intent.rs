use crate::error::AgentError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

const CHART_KEYWORDS: &[&str] = &[
    "chart",
    "graph",
    "plot",
    "bar",
    "line",
    "pie",
    "compare",
    "trend",
    "distribution",
];
const LINE_KEYWORDS: &[&str] = &["line", "trend", "over time"];
const PIE_KEYWORDS: &[&str] = &["pie", "distribution", "breakdown"];
const MAP_KEYWORDS: &[&str] = &["map", "location", "geographic", "region", "territory"];
const TABLE_KEYWORDS: &[&str] = &["table", "list", "top", "bottom", "ranking"];
const BUSINESS_KEYWORDS: &[&str] = &[
    "sales",
    "revenue",
    "profit",
    "customer",
    "product",
    "performance",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Visualization,
    Information,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentKind::Visualization => write!(f, "visualization"),
            IntentKind::Information => write!(f, "information"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationType {
    Chart,
    Table,
    Map,
}

impl VisualizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualizationType::Chart => "chart",
            VisualizationType::Table => "table",
            VisualizationType::Map => "map",
        }
    }
}

/// Chart sub-type. Names other than `line` and `pie` parse as `Bar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
}

impl From<&str> for ChartType {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "line" => ChartType::Line,
            "pie" => ChartType::Pie,
            _ => ChartType::Bar,
        }
    }
}

impl From<String> for ChartType {
    fn from(name: String) -> Self {
        ChartType::from(name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(rename = "type")]
    pub kind: IntentKind,
    pub requires_visualization: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_type: Option<VisualizationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
}

impl Intent {
    pub fn information() -> Self {
        Self {
            kind: IntentKind::Information,
            requires_visualization: false,
            visualization_type: None,
            chart_type: None,
        }
    }

    pub fn visualization(
        visualization_type: VisualizationType,
        chart_type: Option<ChartType>,
    ) -> Self {
        Self {
            kind: IntentKind::Visualization,
            requires_visualization: true,
            visualization_type: Some(visualization_type),
            chart_type,
        }
    }
}

/// Maps a query to an [`Intent`].
///
/// Implementations may be backed by remote calls and are therefore async and fallible; the
/// orchestrator bounds each call with its own timeout.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, query: &str) -> Result<Intent, AgentError>;
}

/// Rule-based classifier. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, query: &str) -> Result<Intent, AgentError> {
        Ok(classify(query))
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Case-insensitive keyword classification. The first matching category wins:
/// chart, then map, then table, then business terms, then information.
pub fn classify(query: &str) -> Intent {
    let query = query.to_lowercase();

    if contains_any(&query, CHART_KEYWORDS) {
        let chart_type = if contains_any(&query, LINE_KEYWORDS) {
            ChartType::Line
        } else if contains_any(&query, PIE_KEYWORDS) {
            ChartType::Pie
        } else {
            ChartType::Bar
        };
        Intent::visualization(VisualizationType::Chart, Some(chart_type))
    } else if contains_any(&query, MAP_KEYWORDS) {
        Intent::visualization(VisualizationType::Map, None)
    } else if contains_any(&query, TABLE_KEYWORDS) {
        Intent::visualization(VisualizationType::Table, None)
    } else if contains_any(&query, BUSINESS_KEYWORDS) {
        // chart type left implicit; generation treats it as bar
        Intent::visualization(VisualizationType::Chart, None)
    } else {
        Intent::information()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(chart_type: ChartType) -> Intent {
        Intent::visualization(VisualizationType::Chart, Some(chart_type))
    }

    #[test]
    fn test_bar_chart_query() {
        assert_eq!(classify("show me a bar chart of sales by region"), chart(ChartType::Bar));
    }

    #[test]
    fn test_table_query() {
        assert_eq!(
            classify("what is our top customer list"),
            Intent::visualization(VisualizationType::Table, None)
        );
    }

    #[test]
    fn test_information_fallback() {
        let intent = classify("hello");
        assert_eq!(intent.kind, IntentKind::Information);
        assert!(!intent.requires_visualization);
        assert_eq!(intent.visualization_type, None);
        assert_eq!(intent.chart_type, None);
    }

    #[test]
    fn test_chart_rule_beats_business_rule() {
        assert_eq!(classify("sales pie chart"), chart(ChartType::Pie));
    }

    #[test]
    fn test_chart_subtype_resolution_order() {
        // line wins over pie when both appear
        assert_eq!(classify("pie or line?"), chart(ChartType::Line));
        assert_eq!(classify("revenue trend"), chart(ChartType::Line));
        assert_eq!(classify("plot revenue over time"), chart(ChartType::Line));
        assert_eq!(classify("distribution of orders"), chart(ChartType::Pie));
        assert_eq!(classify("graph the breakdown"), chart(ChartType::Pie));
        assert_eq!(classify("compare stores"), chart(ChartType::Bar));
    }

    #[test]
    fn test_map_beats_table_and_business() {
        assert_eq!(
            classify("list customers per territory"),
            Intent::visualization(VisualizationType::Map, None)
        );
    }

    #[test]
    fn test_table_beats_business() {
        assert_eq!(
            classify("bottom product ranking"),
            Intent::visualization(VisualizationType::Table, None)
        );
    }

    #[test]
    fn test_business_terms_yield_implicit_chart() {
        assert_eq!(
            classify("How is PROFIT doing?"),
            Intent::visualization(VisualizationType::Chart, None)
        );
    }

    #[test]
    fn test_substring_matching() {
        // "timeline" contains "line"
        assert_eq!(classify("project timeline"), chart(ChartType::Line));
        // "regional" contains "region"
        assert_eq!(
            classify("regional numbers"),
            Intent::visualization(VisualizationType::Map, None)
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let q = "Compare revenue by product";
        assert_eq!(classify(q), classify(q));
    }

    #[test]
    fn test_intent_wire_format() {
        let value = serde_json::to_value(chart(ChartType::Pie)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "visualization",
                "requiresVisualization": true,
                "visualizationType": "chart",
                "chartType": "pie"
            })
        );
        let info = serde_json::to_value(Intent::information()).unwrap();
        assert_eq!(
            info,
            serde_json::json!({"type": "information", "requiresVisualization": false})
        );
    }

    #[test]
    fn test_unknown_chart_type_parses_as_bar() {
        let raw = r#"{"type":"visualization","requiresVisualization":true,"visualizationType":"chart","chartType":"scatter"}"#;
        let intent: Intent = serde_json::from_str(raw).unwrap();
        assert_eq!(intent.chart_type, Some(ChartType::Bar));
        assert_eq!(ChartType::from("LINE"), ChartType::Line);
    }

    #[tokio::test]
    async fn test_keyword_classifier_never_fails() {
        let classifier = KeywordClassifier;
        for q in ["", "hello", "map of stores", "top 10"] {
            assert!(classifier.classify(q).await.is_ok());
        }
    }
}
