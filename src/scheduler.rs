//! Practice-queue scheduling.
//!
//! A session asks every word of the pool until each one has been spelled
//! correctly once. Misses and skips put the word back into the queue, either a
//! few slots ahead (near-term requeue) or at the tail. The scheduler also
//! tracks which words were mastered without any prior miss.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::Settings;
use crate::entry::{Entry, WordPool};
use crate::error::QuizError;
use crate::normalize::{identity_key, normalize, NormalizeOptions};

pub const FEEDBACK_CORRECT: &str = "Correct!";
pub const FEEDBACK_RETRY: &str = "Try again ⟲";
pub const FEEDBACK_SKIPPED: &str = "No problem — it will come back later.";

/// A missed word is reinserted somewhere in the next this-many slots.
pub const REQUEUE_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptStats {
    pub total: usize,
    pub first_try_correct: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub mastered_count: usize,
    pub total_count: usize,
}

impl Progress {
    pub fn percent(&self) -> u16 {
        if self.total_count == 0 {
            return 0;
        }
        ((self.mastered_count as f64 / self.total_count as f64) * 100.0).round() as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalStats {
    pub total: usize,
    pub first_try_correct: usize,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStarted {
    pub first: Entry,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub feedback: &'static str,
    pub session_finished: bool,
    /// Word now being asked; on a miss this is the same word again.
    pub next: Option<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipOutcome {
    pub feedback: &'static str,
    pub session_finished: bool,
    pub next: Option<Entry>,
}

/// Result of moving to the next word.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Advance {
    Next(usize),
    Finished(FinalStats),
}

/// Per-session state. Queue and current hold indices into the pool.
#[derive(Debug, Default)]
struct Session {
    pool: WordPool,
    queue: VecDeque<usize>,
    mastered: HashSet<String>,
    current: Option<usize>,
    first_try: HashMap<String, bool>,
    stats: AttemptStats,
    finished: bool,
}

impl Session {
    fn key_of(&self, idx: usize) -> String {
        self.pool.entries()[idx].key()
    }

    fn final_stats(&self) -> FinalStats {
        FinalStats {
            total: self.stats.total,
            first_try_correct: self.stats.first_try_correct,
            pool_size: self.pool.len(),
        }
    }
}

/// Owns one practice session at a time and decides what is asked next.
#[derive(Debug)]
pub struct QuizScheduler<R: Rng = StdRng> {
    settings: Settings,
    session: Session,
    rng: R,
}

impl QuizScheduler<StdRng> {
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }
}

impl<R: Rng> QuizScheduler<R> {
    pub fn with_rng(settings: Settings, rng: R) -> Self {
        Self {
            settings,
            session: Session::default(),
            rng,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Takes effect from the next answer or requeue.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Starts a fresh session over `pool`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyPool` without touching any state when the pool
    /// has no entries.
    pub fn start_session(&mut self, pool: WordPool) -> Result<SessionStarted, QuizError> {
        if pool.is_empty() {
            return Err(QuizError::EmptyPool);
        }

        let mut queue: Vec<usize> = (0..pool.len()).collect();
        queue.shuffle(&mut self.rng);

        info!("starting session with {} words", pool.len());
        self.session = Session {
            pool,
            queue: queue.into(),
            ..Session::default()
        };

        match self.advance() {
            Advance::Next(idx) => Ok(SessionStarted {
                first: self.session.pool.entries()[idx].clone(),
                pool_size: self.session.pool.len(),
            }),
            // a non-empty pool always yields a first word
            Advance::Finished(_) => Err(QuizError::EmptyPool),
        }
    }

    /// Starts again over the current pool.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyPool` when no session was ever started.
    pub fn restart(&mut self) -> Result<SessionStarted, QuizError> {
        let pool = self.session.pool.clone();
        self.start_session(pool)
    }

    fn advance(&mut self) -> Advance {
        let session = &mut self.session;
        session.current = None;

        if session.mastered.len() >= session.pool.len() {
            return self.finish();
        }

        if session.queue.is_empty() {
            let mut remaining: Vec<usize> = (0..session.pool.len())
                .filter(|&idx| !session.mastered.contains(&session.key_of(idx)))
                .collect();
            remaining.shuffle(&mut self.rng);
            debug!("refilling queue with {} unmastered words", remaining.len());
            session.queue = remaining.into();
        }

        let Some(idx) = session.queue.pop_front() else {
            return self.finish();
        };

        let key = session.key_of(idx);
        session.first_try.entry(key).or_insert(true);
        session.current = Some(idx);
        debug!("asking {:?}", session.pool.entries()[idx].word);
        Advance::Next(idx)
    }

    fn finish(&mut self) -> Advance {
        let session = &mut self.session;
        session.current = None;
        session.queue.clear();
        if !session.finished {
            session.finished = true;
            info!(
                "session finished: {} words, {} attempts, {} first try",
                session.pool.len(),
                session.stats.total,
                session.stats.first_try_correct
            );
        }
        Advance::Finished(session.final_stats())
    }

    /// Puts the current word back: a few slots ahead, or at the tail.
    fn requeue(&mut self, idx: usize) {
        let queue = &mut self.session.queue;
        if self.settings.repeat_misses_sooner {
            let pos = queue.len().min(self.rng.gen_range(1..=REQUEUE_WINDOW));
            debug!("requeueing at position {pos} of {}", queue.len());
            queue.insert(pos, idx);
        } else {
            queue.push_back(idx);
        }
    }

    fn next_entry(&self, advance: &Advance) -> Option<Entry> {
        match advance {
            Advance::Next(idx) => self.session.pool.get(*idx).cloned(),
            Advance::Finished(_) => None,
        }
    }

    /// Checks a typed answer against the current word.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveWord` when no word is being asked.
    pub fn submit_answer(&mut self, guess: &str) -> Result<AnswerOutcome, QuizError> {
        let idx = self.session.current.ok_or(QuizError::NoActiveWord)?;
        let options = NormalizeOptions::from(&self.settings);
        let target = &self.session.pool.entries()[idx].word;
        let correct = normalize(guess, &options) == normalize(target, &options);
        let key = self.session.key_of(idx);

        self.session.stats.total += 1;

        if !correct {
            self.session.first_try.insert(key, false);
            self.requeue(idx);
            return Ok(AnswerOutcome {
                correct: false,
                feedback: FEEDBACK_RETRY,
                session_finished: false,
                next: self.current_word().cloned(),
            });
        }

        let session = &mut self.session;
        if session.first_try.get(&key) == Some(&true) {
            session.stats.first_try_correct += 1;
        }
        // mastered words never come back, so every pending copy goes
        let pool = &session.pool;
        session.queue.retain(|&queued| pool.entries()[queued].key() != key);
        session.mastered.insert(key);

        let advance = self.advance();
        Ok(AnswerOutcome {
            correct: true,
            feedback: FEEDBACK_CORRECT,
            session_finished: matches!(advance, Advance::Finished(_)),
            next: self.next_entry(&advance),
        })
    }

    /// "Don't know": the word comes back later and loses first-try credit.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveWord` when no word is being asked.
    pub fn skip(&mut self) -> Result<SkipOutcome, QuizError> {
        let idx = self.session.current.ok_or(QuizError::NoActiveWord)?;
        let key = self.session.key_of(idx);
        self.session.first_try.insert(key, false);
        self.requeue(idx);

        let advance = self.advance();
        Ok(SkipOutcome {
            feedback: FEEDBACK_SKIPPED,
            session_finished: matches!(advance, Advance::Finished(_)),
            next: self.next_entry(&advance),
        })
    }

    pub fn current_word(&self) -> Option<&Entry> {
        self.session
            .current
            .and_then(|idx| self.session.pool.get(idx))
    }

    pub fn progress(&self) -> Progress {
        Progress {
            mastered_count: self.session.mastered.len(),
            total_count: self.session.pool.len(),
        }
    }

    /// Only available once the session has finished.
    pub fn final_stats(&self) -> Option<FinalStats> {
        self.session
            .finished
            .then(|| self.session.final_stats())
    }

    pub fn stats(&self) -> AttemptStats {
        self.session.stats
    }

    pub fn is_finished(&self) -> bool {
        self.session.finished
    }

    pub fn is_active(&self) -> bool {
        self.session.current.is_some()
    }

    pub fn pool(&self) -> &WordPool {
        &self.session.pool
    }

    /// Queued entries, next to be asked first.
    pub fn upcoming(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.session
            .queue
            .iter()
            .filter_map(|&idx| self.session.pool.get(idx))
    }

    pub fn is_mastered(&self, word: &str) -> bool {
        self.session
            .mastered
            .contains(&identity_key(word))
    }
}
