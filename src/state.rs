use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, warn};

pub const HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<i64>,
}

impl HistoryEntry {
    fn now(total: u64, change: Option<i64>) -> Self {
        HistoryEntry {
            timestamp: Local::now().to_rfc3339(),
            total,
            change,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorState {
    pub last_total: u64,
    pub last_check: Option<String>,
    pub history: Vec<HistoryEntry>,
    // Reserved in the persisted shape; round-trips through load/save
    pub seen_car_ids: Vec<String>,
}

impl MonitorState {
    /// Load previous monitoring data. A missing or unreadable file yields
    /// the zero-valued default so a run can always proceed.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("No previous state at {}: {}", path.display(), e);
                return MonitorState::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(state) => state,
            Err(e) => {
                warn!("Could not parse state file {}: {}", path.display(), e);
                MonitorState::default()
            }
        }
    }

    /// Stamp `last_check` and overwrite the state file. Best-effort: a
    /// failed save is logged and never fails the run.
    pub fn save(&mut self, path: &Path) {
        self.last_check = Some(Local::now().to_rfc3339());

        let data = match serde_json::to_string_pretty(self) {
            Ok(data) => data,
            Err(e) => {
                error!("Could not serialize state: {}", e);
                return;
            }
        };

        if let Err(e) = std::fs::write(path, data) {
            error!("Could not save state to {}: {}", path.display(), e);
        }
    }

    pub fn is_first_run(&self) -> bool {
        self.last_total == 0
    }

    pub fn initialize(&mut self, total: u64) {
        self.last_total = total;
        self.history.push(HistoryEntry::now(total, None));
    }

    pub fn record_change(&mut self, total: u64, diff: i64) {
        self.history.push(HistoryEntry::now(total, Some(diff)));
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }
        self.last_total = total;
    }

    pub fn check_count(&self) -> usize {
        self.history.len()
    }
}
