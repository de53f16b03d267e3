use crate::intent::ChartType;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
pub const PRODUCTS: [&str; 4] = ["Electronics", "Clothing", "Food", "Home Goods"];
pub const MONTHS: [&str; 6] = ["January", "February", "March", "April", "May", "June"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub chart_type: ChartType,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartData {
    Categories(Vec<CategoryValue>),
    Series(Vec<Series>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub category: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: String,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
}

impl ChartOptions {
    fn categorical(title: &str) -> Self {
        Self {
            title: title.to_string(),
            x_axis: "category".to_string(),
            y_axis: "value".to_string(),
        }
    }
}

fn pick_categories<R: Rng + ?Sized>(rng: &mut R) -> &'static [&'static str] {
    if rng.random_bool(0.5) {
        &REGIONS
    } else {
        &PRODUCTS
    }
}

pub fn generate_chart<R: Rng + ?Sized>(chart_type: ChartType, rng: &mut R) -> ChartPayload {
    match chart_type {
        ChartType::Bar => generate_bar(rng),
        ChartType::Line => generate_line(rng),
        ChartType::Pie => generate_pie(rng),
    }
}

/// Regions or products, each with a value in `[10, 110)`.
pub fn generate_bar<R: Rng + ?Sized>(rng: &mut R) -> ChartPayload {
    let data = pick_categories(rng)
        .iter()
        .map(|category| CategoryValue {
            category: category.to_string(),
            value: rng.random_range(10..110),
        })
        .collect();

    ChartPayload {
        chart_type: ChartType::Bar,
        data: ChartData::Categories(data),
        options: ChartOptions::categorical("Business Data Comparison"),
    }
}

/// "Sales" in `[20, 120)` plus "Revenue" or "Orders" in `[10, 90)`, one point per month.
pub fn generate_line<R: Rng + ?Sized>(rng: &mut R) -> ChartPayload {
    let second = if rng.random_bool(0.5) { "Revenue" } else { "Orders" };

    let mut series_over = |name: &str, low: u32, high: u32| Series {
        name: name.to_string(),
        data: MONTHS
            .iter()
            .map(|month| Point {
                x: month.to_string(),
                y: rng.random_range(low..high),
            })
            .collect(),
    };
    let sales = series_over("Sales", 20, 120);
    let other = series_over(second, 10, 90);

    ChartPayload {
        chart_type: ChartType::Line,
        data: ChartData::Series(vec![sales, other]),
        options: ChartOptions {
            title: "Business Data Trend".to_string(),
            x_axis: "x".to_string(),
            y_axis: "y".to_string(),
        },
    }
}

pub fn generate_pie<R: Rng + ?Sized>(rng: &mut R) -> ChartPayload {
    let categories = pick_categories(rng);
    generate_pie_for(categories, rng)
}

/// Percentage shares over `categories` that always sum to 100.
///
/// Each category but the last takes a random slice of at most half the remaining budget; the
/// last one absorbs whatever is left.
pub fn generate_pie_for<R: Rng + ?Sized>(categories: &[&str], rng: &mut R) -> ChartPayload {
    let mut remaining: u32 = 100;
    let last = categories.len().saturating_sub(1);

    let data = categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let value = if index == last {
                remaining
            } else {
                let draw = (rng.random::<f64>() * (remaining as f64 / 2.0)).floor() as u32 + 1;
                draw.min(remaining)
            };
            remaining -= value;
            CategoryValue {
                category: category.to_string(),
                value,
            }
        })
        .collect();

    ChartPayload {
        chart_type: ChartType::Pie,
        data: ChartData::Categories(data),
        options: ChartOptions::categorical("Business Data Distribution"),
    }
}
