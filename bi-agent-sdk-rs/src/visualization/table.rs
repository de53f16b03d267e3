use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub data: Vec<CustomerRecord>,
    pub options: TableOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: String,
    pub revenue: u64,
    pub orders: u32,
    pub satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    pub title: String,
}

const CUSTOMERS: [(&str, u64, u32, f64); 5] = [
    ("Acme Corp", 125_000, 45, 4.8),
    ("Globex Inc", 98_000, 32, 4.5),
    ("Initech", 145_000, 52, 4.2),
    ("Umbrella Corp", 210_000, 78, 4.7),
    ("Stark Industries", 180_000, 65, 4.9),
];

/// Fixed customer sample; identical on every call.
pub fn generate_table() -> TablePayload {
    TablePayload {
        data: CUSTOMERS
            .iter()
            .map(|&(name, revenue, orders, satisfaction)| CustomerRecord {
                name: name.to_string(),
                revenue,
                orders,
                satisfaction,
            })
            .collect(),
        options: TableOptions {
            title: "Customer Data".to_string(),
        },
    }
}
