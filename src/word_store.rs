use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::entry::{default_pool, Entry, WordPool};
use crate::error::StoreError;

/// Supplies the practice list and persists edits to it.
pub trait WordStore {
    /// Always usable: falls back to the default list when nothing is stored.
    fn current_pool(&self) -> WordPool;
    fn save(&self, pool: &WordPool) -> Result<(), StoreError>;

    fn reset_to_default(&self) -> Result<WordPool, StoreError> {
        let pool = default_pool();
        self.save(&pool)?;
        Ok(pool)
    }

    /// Replaces the stored list with the one read from `path`.
    fn import_file(&self, path: &Path) -> Result<WordPool, StoreError> {
        let pool = read_list_file(path)?;
        self.save(&pool)?;
        Ok(pool)
    }
}

#[derive(Debug, Clone)]
pub struct FileWordStore {
    path: PathBuf,
}

impl FileWordStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_file("words.json"),
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
}

impl Default for FileWordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WordStore for FileWordStore {
    fn current_pool(&self) -> WordPool {
        let Ok(bytes) = fs::read(&self.path) else {
            return default_pool();
        };
        match serde_json::from_slice::<WordPool>(&bytes) {
            Ok(pool) if !pool.is_empty() => pool,
            Ok(_) => {
                warn!("stored word list {} is empty", self.path.display());
                default_pool()
            }
            Err(e) => {
                warn!(
                    "ignoring malformed word list {}: {e}",
                    self.path.display()
                );
                default_pool()
            }
        }
    }

    fn save(&self, pool: &WordPool) -> Result<(), StoreError> {
        if pool.is_empty() {
            return Err(StoreError::EmptyList);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(pool)?;
        fs::write(&self.path, data)?;
        info!("saved {} words to {}", pool.len(), self.path.display());
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryWordStore {
    pool: RefCell<Option<WordPool>>,
}

impl MemoryWordStore {
    pub fn new(pool: WordPool) -> Self {
        Self {
            pool: RefCell::new(Some(pool)),
        }
    }
}

impl WordStore for MemoryWordStore {
    fn current_pool(&self) -> WordPool {
        self.pool.borrow().clone().unwrap_or_else(default_pool)
    }

    fn save(&self, pool: &WordPool) -> Result<(), StoreError> {
        if pool.is_empty() {
            return Err(StoreError::EmptyList);
        }
        *self.pool.borrow_mut() = Some(pool.clone());
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    word: String,
    #[serde(default)]
    sentence: Option<String>,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Reads a list from a `.csv` (`word,sentence` with header) or a plain text
/// file (one `word` or `word | sentence` per line).
///
/// # Errors
///
/// Fails on I/O or CSV errors, and with `StoreError::EmptyList` when the file
/// holds no usable words.
pub fn read_list_file(path: &Path) -> Result<WordPool, StoreError> {
    let pool = if is_csv(path) {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let rows = reader
            .deserialize::<CsvRow>()
            .collect::<Result<Vec<_>, _>>()?;
        WordPool::from_entries(rows.into_iter().map(|row| Entry {
            word: row.word,
            sentence: row.sentence,
        }))
    } else {
        WordPool::parse_lines(&fs::read_to_string(path)?)
    };

    if pool.is_empty() {
        return Err(StoreError::EmptyList);
    }
    Ok(pool)
}

/// Writes `pool` to `path` in the format implied by its extension.
///
/// # Errors
///
/// Fails on I/O or CSV errors.
pub fn write_list_file(path: &Path, pool: &WordPool) -> Result<(), StoreError> {
    if is_csv(path) {
        let mut writer = csv::Writer::from_path(path)?;
        for entry in pool {
            writer.serialize(CsvRow {
                word: entry.word.clone(),
                sentence: entry.sentence.clone(),
            })?;
        }
        writer.flush()?;
    } else {
        let mut text = pool.to_lines();
        text.push('\n');
        fs::write(path, text)?;
    }
    Ok(())
}
