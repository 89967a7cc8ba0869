//! Trip snapshot files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tripbudget_core::{BudgetDefinition, CostItem, Destination, DestinationDirectory};
use tripbudget_shared::{AppError, AppResult};

/// Everything the engine needs about one trip, as exported by the planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Saved budget, if the trip has one.
    #[serde(default)]
    pub budget: Option<BudgetDefinition>,
    /// Recorded and estimated costs.
    #[serde(default)]
    pub cost_items: Vec<CostItem>,
    /// Trip stops.
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl Snapshot {
    /// Reads a snapshot from a JSON file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound(path.display().to_string()),
            _ => AppError::Internal(format!("{}: {err}", path.display())),
        })?;
        Self::from_json(&contents)
    }

    /// Parses a snapshot from JSON text.
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|err| AppError::Serialization(err.to_string()))
    }

    /// Directory over the snapshot's destinations.
    pub fn directory(&self) -> DestinationDirectory {
        self.destinations.iter().cloned().collect()
    }
}
