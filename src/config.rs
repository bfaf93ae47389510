use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

/// Comparison and playback options for a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "caseInsensitive")]
    pub case_insensitive: bool,
    #[serde(alias = "trimSpaces")]
    pub trim_spaces: bool,
    #[serde(alias = "autoSpeakWord", alias = "autoSpeak")]
    pub auto_speak_word: bool,
    #[serde(alias = "autoSpeakSentence")]
    pub auto_speak_sentence: bool,
    #[serde(alias = "repeatMissesSooner")]
    pub repeat_misses_sooner: bool,
    #[serde(alias = "voiceURI")]
    pub voice: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            trim_spaces: true,
            auto_speak_word: true,
            auto_speak_sentence: false,
            repeat_misses_sooner: true,
            voice: None,
        }
    }
}

/// Supplies the settings snapshot a session runs with.
pub trait SettingsProvider {
    fn get(&self) -> Settings;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_file("settings.json"),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Settings {
        let Ok(bytes) = fs::read(&self.path) else {
            return Settings::default();
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "ignoring malformed settings file {}: {e}",
                    self.path.display()
                );
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    pub fn reset(&self) -> Result<Settings, StoreError> {
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsProvider for FileSettingsStore {
    fn get(&self) -> Settings {
        self.load()
    }
}

impl SettingsProvider for Settings {
    fn get(&self) -> Settings {
        self.clone()
    }
}
