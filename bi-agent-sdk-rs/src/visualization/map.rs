use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPayload {
    pub data: Vec<Location>,
    pub options: MapOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub title: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
}

const CITIES: [(&str, f64, f64, u32); 5] = [
    ("New York", 40.7128, -74.0060, 235),
    ("Los Angeles", 34.0522, -118.2437, 187),
    ("Chicago", 41.8781, -87.6298, 156),
    ("Houston", 29.7604, -95.3698, 142),
    ("Phoenix", 33.4484, -112.0740, 128),
];

/// Fixed US city sample centered on the continental US.
pub fn generate_map() -> MapPayload {
    MapPayload {
        data: CITIES
            .iter()
            .map(|&(name, lat, lng, value)| Location {
                name: name.to_string(),
                lat,
                lng,
                value,
            })
            .collect(),
        options: MapOptions {
            title: "Location Data".to_string(),
            center_lat: 39.8283,
            center_lng: -98.5795,
            zoom: 4,
        },
    }
}
