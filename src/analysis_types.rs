use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuePrecision {
    Float,
    Integer,
}

/// One titled block of the report, entries already in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub precision: ValuePrecision,
    pub entries: Vec<RankedEntry>,
}

impl Category {
    pub fn new(title: impl Into<String>, precision: ValuePrecision) -> Self {
        Self {
            title: title.into(),
            precision,
            entries: Vec::new(),
        }
    }
}
