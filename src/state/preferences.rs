use crate::state::app_settings::config_dir;
use crate::state::calendar::Projection;
use crate::state::filter::FilterSelection;
use draco_api::FilterType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The parts of the view restored on the next start, kept per account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPreferences {
    pub projection: Projection,
    pub filter_type: FilterType,
    #[serde(default)]
    pub filter: FilterSelection,
}

impl ViewPreferences {
    pub fn load(account_id: &str) -> Result<Self, String> {
        Self::load_from(&preferences_path(account_id))
    }

    pub fn save(&self, account_id: &str) -> Result<(), String> {
        self.save_to(&preferences_path(account_id))
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read preferences failed: {e}"))?;
        serde_json::from_str(&content).map_err(|e| format!("parse preferences failed: {e}"))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
        }
        let payload = serde_json::to_string_pretty(self)
            .map_err(|e| format!("serialize preferences failed: {e}"))?;
        std::fs::write(path, payload).map_err(|e| format!("write preferences failed: {e}"))
    }
}

fn preferences_path(account_id: &str) -> PathBuf {
    let account: String = account_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    config_dir().join(format!("view_{account}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_preferences_load_back() {
        let dir = std::env::temp_dir().join(format!("draco-prefs-{}", std::process::id()));
        let path = dir.join("view_7.json");

        let mut filter = FilterSelection::default();
        filter.set_league(Some("ls1".into()));
        filter.set_team(Some("t1".into()));
        let prefs = ViewPreferences { projection: Projection::List, filter_type: FilterType::Week, filter };

        prefs.save_to(&path).unwrap();
        assert_eq!(ViewPreferences::load_from(&path).unwrap(), prefs);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_filter_defaults_to_everything() {
        let prefs: ViewPreferences =
            serde_json::from_str(r#"{"projection": "year", "filter_type": "year"}"#).unwrap();
        assert_eq!(prefs.projection, Projection::Year);
        assert!(prefs.filter.is_empty());
    }

    #[test]
    fn account_id_is_sanitised_in_file_name() {
        let path = preferences_path("../12");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("view_12.json"));
    }
}
