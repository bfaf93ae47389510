//! Teacher lock.
//!
//! A PIN gate that keeps learners out of list editing. It is a low-stakes
//! parental control, not a security boundary: the PIN hash is djb2 so that
//! hashes persisted by earlier versions keep working.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::{LockError, StoreError};

pub const MIN_PIN_DIGITS: usize = 4;

/// djb2 over UTF-16 code units with 32-bit wraparound, as an unsigned decimal string.
pub fn hash_pin(pin: &str) -> String {
    let hash = pin.encode_utf16().fold(5381u32, |h, unit| {
        (h << 5).wrapping_add(h).wrapping_add(u32::from(unit))
    });
    hash.to_string()
}

fn is_valid_pin(pin: &str) -> bool {
    pin.len() >= MIN_PIN_DIGITS && pin.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherLock {
    pub enabled: bool,
    #[serde(alias = "pinHash")]
    pub pin_hash: Option<String>,
}

impl TeacherLock {
    pub fn is_locked(&self) -> bool {
        self.enabled
    }

    /// Locks with a new PIN, which must be entered twice.
    ///
    /// # Errors
    ///
    /// `AlreadyLocked`, `InvalidPin` (fewer than four digits or non-digits) or
    /// `PinMismatch`.
    pub fn enable(&mut self, pin: &str, confirm: &str) -> Result<(), LockError> {
        if self.enabled {
            return Err(LockError::AlreadyLocked);
        }
        if !is_valid_pin(pin) {
            return Err(LockError::InvalidPin);
        }
        if pin != confirm {
            return Err(LockError::PinMismatch);
        }
        self.enabled = true;
        self.pin_hash = Some(hash_pin(pin));
        Ok(())
    }

    /// Unlocks when `pin` matches. The hash is kept.
    ///
    /// # Errors
    ///
    /// `NotLocked` or `IncorrectPin`.
    pub fn unlock(&mut self, pin: &str) -> Result<(), LockError> {
        if !self.enabled {
            return Err(LockError::NotLocked);
        }
        self.verify(pin)?;
        self.enabled = false;
        Ok(())
    }

    /// Checks `pin` without changing the lock state.
    ///
    /// # Errors
    ///
    /// `IncorrectPin` on mismatch or when no PIN was ever set.
    pub fn verify(&self, pin: &str) -> Result<(), LockError> {
        match &self.pin_hash {
            Some(hash) if *hash == hash_pin(pin) => Ok(()),
            _ => Err(LockError::IncorrectPin),
        }
    }

    /// Passes when unlocked, or when locked and `pin` is correct.
    ///
    /// # Errors
    ///
    /// `StoreError::Locked` when locked and the PIN is missing or wrong.
    pub fn authorize(&self, pin: Option<&str>) -> Result<(), StoreError> {
        if !self.enabled {
            return Ok(());
        }
        match pin {
            Some(pin) if self.verify(pin).is_ok() => Ok(()),
            _ => Err(StoreError::Locked),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileLockStore {
    path: PathBuf,
}

impl FileLockStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_file("lock.json"),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Missing or malformed files load as unlocked.
    pub fn load(&self) -> TeacherLock {
        let Ok(bytes) = fs::read(&self.path) else {
            return TeacherLock::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("ignoring malformed lock file {}: {e}", self.path.display());
            TeacherLock::default()
        })
    }

    pub fn save(&self, lock: &TeacherLock) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(lock)?)?;
        info!(
            "teacher lock {}",
            if lock.enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }
}

impl Default for FileLockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn hash_matches_previously_stored_values() {
        assert_eq!(hash_pin(""), "5381");
        assert_eq!(hash_pin("1234"), "2088290703");
        assert_eq!(hash_pin("0000"), "2088252485");
        assert_eq!(hash_pin("98765"), "203823928");
    }

    #[test]
    fn enable_requires_four_digits() {
        let mut lock = TeacherLock::default();
        assert_matches!(lock.enable("123", "123"), Err(LockError::InvalidPin));
        assert_matches!(lock.enable("12a4", "12a4"), Err(LockError::InvalidPin));
        assert!(!lock.is_locked());
    }

    #[test]
    fn enable_requires_matching_confirmation() {
        let mut lock = TeacherLock::default();
        assert_matches!(lock.enable("1234", "1243"), Err(LockError::PinMismatch));
        assert!(!lock.is_locked());
    }

    #[test]
    fn enable_then_unlock() {
        let mut lock = TeacherLock::default();
        lock.enable("1234", "1234").unwrap();
        assert!(lock.is_locked());
        assert_matches!(lock.enable("5678", "5678"), Err(LockError::AlreadyLocked));

        assert_matches!(lock.unlock("4321"), Err(LockError::IncorrectPin));
        assert!(lock.is_locked());

        lock.unlock("1234").unwrap();
        assert!(!lock.is_locked());
        assert_eq!(lock.pin_hash.as_deref(), Some("2088290703"));
        assert_matches!(lock.unlock("1234"), Err(LockError::NotLocked));
    }

    #[test]
    fn authorize_gates_only_when_locked() {
        let mut lock = TeacherLock::default();
        assert!(lock.authorize(None).is_ok());
        lock.enable("2468", "2468").unwrap();
        assert_matches!(lock.authorize(None), Err(StoreError::Locked));
        assert_matches!(lock.authorize(Some("0000")), Err(StoreError::Locked));
        assert!(lock.authorize(Some("2468")).is_ok());
    }

    #[test]
    fn store_roundtrip_and_legacy_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lock.json");
        let store = FileLockStore::with_path(&path);
        assert_eq!(store.load(), TeacherLock::default());

        let mut lock = TeacherLock::default();
        lock.enable("1234", "1234").unwrap();
        store.save(&lock).unwrap();
        assert_eq!(store.load(), lock);

        fs::write(&path, r#"{"enabled": true, "pinHash": "2088290703"}"#).unwrap();
        let legacy = store.load();
        assert!(legacy.is_locked());
        assert!(legacy.verify("1234").is_ok());

        fs::write(&path, b"garbage").unwrap();
        assert_eq!(store.load(), TeacherLock::default());
    }
}
