use crate::common::Audit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    /// Unique identifier
    pub id: i64,
    pub name: String,
    pub status: Status,
    pub tags: Vec<String>,
    pub owner: Option<Owner>,
    pub attributes: HashMap<String, f64>,
    #[serde(skip)]
    pub internal_score: i32,
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Available,
    Sold,
}

pub type PetList = Vec<Pet>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PetId(pub i64);
