use std::{
    fs,
    path::PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::KanjiError;

const APP_NAME: &str = "kanji-drill";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join(APP_NAME)
    } else {
        PathBuf::from(".")
    }
}

/// JSON files under one directory. The application uses the platform data
/// directory; tests point it somewhere temporary.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn app_default() -> Self {
        Self::at(get_app_data_dir())
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn get_data_file_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub fn save_json<T: Serialize>(&self, data: &T, filename: &str) -> Result<(), KanjiError> {
        fs::create_dir_all(&self.root)?;
        let file_path = self.get_data_file_path(filename);
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&file_path, json)?;
        log::debug!("Data saved to: {}", file_path.display());
        Ok(())
    }

    pub fn load_json<T: for<'de> Deserialize<'de> + Default>(&self, filename: &str) -> Result<T, KanjiError> {
        let file_path = self.get_data_file_path(filename);

        if !file_path.exists() {
            return Ok(T::default());
        }

        let json = fs::read_to_string(&file_path)?;
        let data: T = serde_json::from_str(&json)?;
        log::debug!("Data loaded from: {}", file_path.display());
        Ok(data)
    }

    pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(&self, filename: &str) -> T {
        match self.load_json::<T>(filename) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to load {}: {}. Using defaults.", filename, e);
                T::default()
            }
        }
    }

    pub fn delete_data_file(&self, filename: &str) -> Result<(), KanjiError> {
        let file_path = self.get_data_file_path(filename);
        if file_path.exists() {
            fs::remove_file(&file_path)?;
            log::debug!("Deleted: {}", file_path.display());
        }
        Ok(())
    }

    pub fn data_file_exists(&self, filename: &str) -> bool {
        self.get_data_file_path(filename).exists()
    }
}
