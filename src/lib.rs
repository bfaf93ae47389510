// Library surface for the binary, headless integration tests and reuse.
// Terminal rendering stays in the binary.
pub mod app_dirs;
pub mod config;
pub mod entry;
pub mod error;
pub mod lock;
pub mod normalize;
pub mod runtime;
pub mod scheduler;
pub mod speech;
pub mod word_store;

pub use config::{FileSettingsStore, Settings, SettingsProvider};
pub use entry::{default_pool, Entry, WordPool};
pub use error::{LockError, QuizError, StoreError};
pub use scheduler::{AnswerOutcome, FinalStats, Progress, QuizScheduler, SkipOutcome};
pub use word_store::{FileWordStore, WordStore};
