use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Court {
    pub id: i64,
    pub name: String,
    pub court_type: Option<String>,
    pub venue: Option<String>,
    pub hourly_rate: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourt {
    pub name: String,
    pub court_type: Option<String>,
    pub venue: Option<String>,
    #[serde(default)]
    pub hourly_rate: f64,
}
