use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub tags: Vec<i8>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePet {
    pub name: String,
    /// Bound from the query string
    #[serde(skip)]
    pub dry_run: Option<bool>,
}

#[derive(Debug, Default)]
pub struct GetPet {
    pub id: i64,
    pub tags: Vec<i8>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct Counters {
    pub small: u8,
    pub medium: i16,
    pub large: u32,
    pub ratio: Option<f32>,
    pub label: Option<String>,
    pub tenant: String,
}
