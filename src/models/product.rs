use serde::{Deserialize, Serialize};

/// One crediting index offered by a product. Indexes without a ticker are proprietary
/// and need a manually supplied return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ticker: Option<String>,
}

impl IndexDefinition {
    pub fn new(id: &str, name: &str, ticker: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ticker: ticker.map(str::to_string),
        }
    }

    pub fn is_fetchable(&self) -> bool {
        self.ticker.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnuityProduct {
    pub id: String,
    pub name: String,
    pub carrier: String,
    pub indexes: Vec<IndexDefinition>,
}

impl AnnuityProduct {
    pub fn index(&self, index_id: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|i| i.id == index_id)
    }
}
