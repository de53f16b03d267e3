mod chart;
mod map;
mod table;

pub use chart::{
    generate_bar, generate_chart, generate_line, generate_pie, generate_pie_for, CategoryValue,
    ChartData, ChartOptions, ChartPayload, Point, Series, MONTHS, PRODUCTS, REGIONS,
};
pub use map::{generate_map, Location, MapOptions, MapPayload};
pub use table::{generate_table, CustomerRecord, TableOptions, TablePayload};

use crate::intent::{Intent, VisualizationType};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Arguments of a visualization tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VisualizationPayload {
    Chart(ChartPayload),
    Table(TablePayload),
    Map(MapPayload),
}

/// Builds the payload matching the intent. Intents without a visualization type get a chart.
pub fn generate<R: Rng + ?Sized>(intent: &Intent, rng: &mut R) -> VisualizationPayload {
    match intent.visualization_type.unwrap_or(VisualizationType::Chart) {
        VisualizationType::Chart => {
            VisualizationPayload::Chart(generate_chart(intent.chart_type.unwrap_or_default(), rng))
        }
        VisualizationType::Table => VisualizationPayload::Table(generate_table()),
        VisualizationType::Map => VisualizationPayload::Map(generate_map()),
    }
}
