use log::{debug, warn};
use std::cell::RefCell;
use std::io;
use std::process::{Child, Command, Stdio};
use std::rc::Rc;

use crate::config::Settings;
use crate::entry::Entry;

/// Programs tried in order when no TTS command is configured.
pub const DEFAULT_TTS_PROGRAMS: &[&str] = &["espeak-ng", "espeak", "say"];

/// Words per minute: slightly slower than the usual 175 default for clarity.
pub const SPEECH_RATE_WPM: u32 = 166;

/// Text-to-speech sink. `say` is fire-and-forget and supersedes any utterance
/// still playing.
pub trait Speaker {
    fn say(&mut self, text: &str);
    fn cancel(&mut self);
}

/// What to read aloud for an entry, if anything.
pub fn utterance(entry: &Entry, speak_word: bool, speak_sentence: bool) -> Option<String> {
    let sentence = entry.sentence.as_deref().filter(|_| speak_sentence);
    match (speak_word, sentence) {
        (true, Some(sentence)) => Some(format!("{}. {}", entry.word, sentence)),
        (true, None) => Some(entry.word.clone()),
        (false, Some(sentence)) => Some(sentence.to_string()),
        (false, None) => None,
    }
}

/// Utterance played automatically when `entry` becomes the current word.
pub fn speech_plan(entry: &Entry, settings: &Settings) -> Option<String> {
    utterance(
        entry,
        settings.auto_speak_word,
        settings.auto_speak_sentence,
    )
}

/// Speaks through a system TTS program run as a child process.
#[derive(Debug)]
pub struct CommandSpeaker {
    programs: Vec<String>,
    /// Built-in programs get rate and voice flags; a custom one gets the text only.
    builtin: bool,
    voice: Option<String>,
    rate: u32,
    child: Option<Child>,
    unavailable: bool,
}

impl CommandSpeaker {
    pub fn new(program: Option<String>, voice: Option<String>) -> Self {
        let builtin = program.is_none();
        let programs = match program {
            Some(p) => vec![p],
            None => DEFAULT_TTS_PROGRAMS.iter().map(|p| p.to_string()).collect(),
        };
        Self {
            programs,
            builtin,
            voice,
            rate: SPEECH_RATE_WPM,
            child: None,
            unavailable: false,
        }
    }

    fn command(&self, program: &str, text: &str) -> Command {
        let mut cmd = Command::new(program);
        if self.builtin {
            let rate_flag = if program == "say" { "-r" } else { "-s" };
            cmd.arg(rate_flag).arg(self.rate.to_string());
            if let Some(voice) = &self.voice {
                cmd.arg("-v").arg(voice);
            }
        }
        cmd.arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    /// Spawns the first program that exists and keeps it first for next time.
    fn spawn(&mut self, text: &str) -> io::Result<Child> {
        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "no TTS program configured");
        for i in 0..self.programs.len() {
            match self.command(&self.programs[i], text).spawn() {
                Ok(child) => {
                    if i > 0 {
                        self.programs.swap(0, i);
                    }
                    return Ok(child);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => last_err = e,
                Err(e) => return Err(e),
            }
        }
        Err(last_err)
    }
}

impl Speaker for CommandSpeaker {
    fn say(&mut self, text: &str) {
        self.cancel();
        if self.unavailable {
            return;
        }
        match self.spawn(text) {
            Ok(child) => {
                debug!("speaking {text:?} with {}", self.programs[0]);
                self.child = Some(child);
            }
            Err(e) => {
                warn!("speaker unavailable, continuing without audio: {e}");
                self.unavailable = true;
            }
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            // already-exited children report an error here; nothing to do
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Silent speaker for `--no-speak` and headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn say(&mut self, _text: &str) {}
    fn cancel(&mut self) {}
}

/// Records what would have been spoken. Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct RecordingSpeaker {
    spoken: Rc<RefCell<Vec<String>>>,
    cancels: Rc<RefCell<usize>>,
}

impl RecordingSpeaker {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.borrow().clone()
    }

    pub fn cancels(&self) -> usize {
        *self.cancels.borrow()
    }
}

impl Speaker for RecordingSpeaker {
    fn say(&mut self, text: &str) {
        self.cancel();
        self.spoken.borrow_mut().push(text.to_string());
    }

    fn cancel(&mut self) {
        *self.cancels.borrow_mut() += 1;
    }
}
