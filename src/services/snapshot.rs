use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Context;

use crate::errors::AppError;
use crate::models::session::ChartStateSnapshot;

/// Key under which the dashboard hands its chart state to the detailed view
pub const CHART_STATE_KEY: &str = "chartState";

/// Key-value store shared by the dashboard and the detailed view
pub trait SnapshotStore: Send + Sync {
    fn save(&self, key: &str, value: String) -> Result<(), AppError>;

    fn load(&self, key: &str) -> Result<Option<String>, AppError>;

    fn save_chart_state(&self, snapshot: &ChartStateSnapshot) -> Result<(), AppError> {
        let value =
            serde_json::to_string(snapshot).map_err(|err| AppError::Internal(err.to_string()))?;
        self.save(CHART_STATE_KEY, value)
    }

    fn load_chart_state(&self) -> Result<ChartStateSnapshot, AppError> {
        let value = self
            .load(CHART_STATE_KEY)?
            .ok_or_else(|| AppError::NotFound("No saved chart state".to_string()))?;
        let snapshot: ChartStateSnapshot =
            serde_json::from_str(&value).context("Failed to read saved chart state")?;
        Ok(snapshot)
    }
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, key: &str, value: String) -> Result<(), AppError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal("snapshot store poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, AppError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal("snapshot store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }
}

/// Detailed-view location for a saved chart
pub fn detailed_location(ticker: &str, period: &str) -> String {
    format!("/detailed-graph/{ticker}?period={period}")
}
