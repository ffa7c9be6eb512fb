use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    api::DEFAULT_API_BASE,
    core::KanjiError,
    navigation::DEFAULT_PAGE_SIZE,
    persistence::DataStore,
    validation::AttemptPolicy,
};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: usize,
    pub request_timeout_secs: u64,
    pub hint_after: u32,
    pub reveal_after: u32,
    pub sound_enabled: bool,
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let policy = AttemptPolicy::default();
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            hint_after: policy.hint_after,
            reveal_after: policy.reveal_after,
            sound_enabled: true,
            volume: 0.5,
        }
    }
}

impl Settings {
    pub const KEYS: [&'static str; 7] = [
        "api_base_url",
        "page_size",
        "request_timeout_secs",
        "hint_after",
        "reveal_after",
        "sound_enabled",
        "volume",
    ];

    pub fn load(store: &DataStore) -> Self {
        store.load_json_or_default::<Settings>(SETTINGS_FILE).sanitized()
    }

    pub fn save(&self, store: &DataStore) -> Result<(), KanjiError> {
        store.save_json(self, SETTINGS_FILE)
    }

    pub fn reset(store: &DataStore) -> Result<(), KanjiError> {
        store.delete_data_file(SETTINGS_FILE)
    }

    /// Clamps values a hand-edited file could get wrong.
    pub fn sanitized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.reveal_after = self.reveal_after.max(1);
        self.hint_after = self.hint_after.clamp(1, self.reveal_after);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        self.volume = if self.volume.is_finite() { self.volume.clamp(0.0, 1.0) } else { 0.5 };
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = DEFAULT_API_BASE.to_string();
        }
        self
    }

    pub fn policy(&self) -> AttemptPolicy {
        AttemptPolicy { hint_after: self.hint_after, reveal_after: self.reveal_after }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "api_base_url" => self.api_base_url.clone(),
            "page_size" => self.page_size.to_string(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            "hint_after" => self.hint_after.to_string(),
            "reveal_after" => self.reveal_after.to_string(),
            "sound_enabled" => self.sound_enabled.to_string(),
            "volume" => self.volume.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), KanjiError> {
        let invalid = |e: &dyn std::fmt::Display| {
            KanjiError::Custom(format!("Invalid value {:?} for {}: {}", value, key, e))
        };

        match key {
            "api_base_url" => self.api_base_url = value.trim().to_string(),
            "page_size" => self.page_size = value.parse().map_err(|e| invalid(&e))?,
            "request_timeout_secs" => self.request_timeout_secs = value.parse().map_err(|e| invalid(&e))?,
            "hint_after" => self.hint_after = value.parse().map_err(|e| invalid(&e))?,
            "reveal_after" => self.reveal_after = value.parse().map_err(|e| invalid(&e))?,
            "sound_enabled" => self.sound_enabled = value.parse().map_err(|e| invalid(&e))?,
            "volume" => self.volume = value.parse().map_err(|e| invalid(&e))?,
            _ => {
                return Err(KanjiError::Custom(format!(
                    "Unknown setting {}, expected one of: {}",
                    key,
                    Self::KEYS.join(", ")
                )))
            }
        }

        *self = std::mem::take(self).sanitized();
        Ok(())
    }
}
