use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::state::persistence::config_dir;

const MAX_RECENT: usize = 10;

/// Briefings opened in this client, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct History {
    #[serde(default)]
    pub briefings: Vec<RecentBriefing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentBriefing {
    pub id: String,
    pub opened_at: DateTime<Utc>,
    pub open_count: u32,
}

impl History {
    pub fn history_path() -> PathBuf {
        config_dir().join("history.json")
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Self::default(),
            }
        } else {
            Self::default()
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn record_open(&mut self, briefing_id: &str) {
        let open_count = match self.briefings.iter().position(|b| b.id == briefing_id) {
            Some(idx) => self.briefings.remove(idx).open_count,
            None => 0,
        };
        self.briefings.insert(
            0,
            RecentBriefing {
                id: briefing_id.to_string(),
                opened_at: Utc::now(),
                open_count: open_count + 1,
            },
        );
        self.briefings.truncate(MAX_RECENT);
    }

    pub fn last_opened(&self) -> Option<&str> {
        self.briefings.first().map(|b| b.id.as_str())
    }
}
