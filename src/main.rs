mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{debug, LevelFilter};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin, BufRead, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use spelldrill::{
    app_dirs::AppDirs,
    config::{FileSettingsStore, Settings},
    entry::{Entry, WordPool},
    error::{QuizError, StoreError},
    lock::{FileLockStore, TeacherLock},
    runtime::{CrosstermEventSource, FeedbackDelay, QuizEvent, Runner},
    scheduler::{FinalStats, Progress, QuizScheduler},
    speech::{speech_plan, utterance, CommandSpeaker, Speaker},
    word_store::{write_list_file, FileWordStore, WordStore},
};

const TICK_RATE_MS: u64 = 100;
const FEEDBACK_DELAY_MS: u64 = 250;

/// spelling practice: hear a word, type it, missed words come back sooner
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Spelling practice in the terminal. Each word is read aloud; type it and press Enter. Missed and skipped words come back a few words later until every word has been spelled correctly once."
)]
pub struct Cli {
    /// practise these comma-separated words instead of the saved list (not saved)
    #[clap(short = 'w', long, value_delimiter = ',')]
    words: Vec<String>,

    /// treat upper and lower case as different letters
    #[clap(long)]
    case_sensitive: bool,

    /// do not ignore leading and trailing spaces in answers
    #[clap(long)]
    keep_spaces: bool,

    /// do not read words aloud automatically
    #[clap(long)]
    no_speak: bool,

    /// also read the example sentence when a word comes up
    #[clap(long)]
    speak_sentences: bool,

    /// send missed words to the end of the round instead of a few words later
    #[clap(long)]
    repeat_at_end: bool,

    /// persist the effective settings (teacher only when locked)
    #[clap(long)]
    save_settings: bool,

    /// voice name passed to espeak-ng/espeak/say
    #[clap(long)]
    voice: Option<String>,

    /// speech program to run instead of espeak-ng/espeak/say, called as `<TTS> <text>`
    #[clap(long)]
    tts: Option<String>,

    /// replace the saved word list with a text (word | sentence per line) or .csv file
    #[clap(short = 'i', long)]
    import: Option<PathBuf>,

    /// write the saved word list to a text or .csv file
    #[clap(short = 'e', long)]
    export: Option<PathBuf>,

    /// restore the sample word list
    #[clap(long)]
    reset_words: bool,

    /// print the saved word list
    #[clap(short = 'l', long)]
    list: bool,

    /// enable the teacher lock (PIN read twice from stdin)
    #[clap(long)]
    lock: bool,

    /// disable the teacher lock
    #[clap(long)]
    unlock: bool,

    /// teacher PIN for locked operations
    #[clap(long)]
    pin: Option<String>,

    /// directory for the word list, settings and lock files
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags layered over the persisted settings.
    fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if self.case_sensitive {
            settings.case_insensitive = false;
        }
        if self.keep_spaces {
            settings.trim_spaces = false;
        }
        if self.no_speak {
            settings.auto_speak_word = false;
            settings.auto_speak_sentence = false;
        }
        if self.speak_sentences {
            settings.auto_speak_sentence = true;
        }
        if self.repeat_at_end {
            settings.repeat_misses_sooner = false;
        }
        if self.voice.is_some() {
            settings.voice = self.voice.clone();
        }
        settings
    }

    fn has_list_command(&self) -> bool {
        self.import.is_some()
            || self.export.is_some()
            || self.reset_words
            || self.list
            || self.lock
            || self.unlock
            || self.save_settings
    }
}

/// File-backed stores, under `--data-dir` when given.
pub struct Stores {
    pub words: FileWordStore,
    pub settings: FileSettingsStore,
    pub lock: FileLockStore,
}

impl Stores {
    pub fn open(data_dir: Option<&Path>) -> Self {
        match data_dir {
            Some(dir) => Self {
                words: FileWordStore::with_path(dir.join("words.json")),
                settings: FileSettingsStore::with_path(dir.join("settings.json")),
                lock: FileLockStore::with_path(dir.join("lock.json")),
            },
            None => Self {
                words: FileWordStore::new(),
                settings: FileSettingsStore::new(),
                lock: FileLockStore::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AppState {
    Ready,
    Asking,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Ok,
    Retry,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
    pub kind: FeedbackKind,
}

impl Feedback {
    fn new(text: impl Into<String>, kind: FeedbackKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub scheduler: QuizScheduler,
    pub pool: WordPool,
    pub state: AppState,
    pub input: String,
    pub feedback: Option<Feedback>,
    pub next_word: FeedbackDelay,
    speaker: Box<dyn Speaker>,
    tick: Duration,
}

impl App {
    pub fn new(
        scheduler: QuizScheduler,
        pool: WordPool,
        speaker: Box<dyn Speaker>,
        tick: Duration,
    ) -> Self {
        Self {
            scheduler,
            pool,
            state: AppState::Ready,
            input: String::new(),
            feedback: None,
            next_word: FeedbackDelay::default(),
            speaker,
            tick,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.scheduler.settings()
    }

    pub fn progress(&self) -> Progress {
        self.scheduler.progress()
    }

    pub fn final_stats(&self) -> Option<FinalStats> {
        self.scheduler.final_stats()
    }

    pub fn current_word(&self) -> Option<&Entry> {
        self.scheduler.current_word()
    }

    /// Starts (or restarts) a session over the loaded pool.
    pub fn start(&mut self) {
        self.input.clear();
        self.next_word.clear();
        match self.scheduler.start_session(self.pool.clone()) {
            Ok(_) => {
                self.feedback = None;
                self.state = AppState::Asking;
                self.speak_current();
            }
            Err(e) => {
                debug!("cannot start: {e}");
                self.feedback = Some(Feedback::new(
                    "No words found. Add words first.",
                    FeedbackKind::Retry,
                ));
                self.state = AppState::Ready;
            }
        }
    }

    fn speak_current(&mut self) {
        let plan = self
            .scheduler
            .current_word()
            .and_then(|entry| speech_plan(entry, self.scheduler.settings()));
        if let Some(text) = plan {
            self.speaker.say(&text);
        }
    }

    /// Reads the current word again, whatever the auto-speak settings.
    pub fn repeat(&mut self) {
        let text = self.scheduler.current_word().and_then(|entry| {
            utterance(entry, true, self.scheduler.settings().auto_speak_sentence)
        });
        if let Some(text) = text {
            self.speaker.say(&text);
        }
    }

    pub fn submit(&mut self) {
        if self.next_word.is_pending() {
            return;
        }
        match self.scheduler.submit_answer(&self.input) {
            Ok(outcome) => {
                self.input.clear();
                if outcome.correct {
                    self.feedback = Some(Feedback::new(outcome.feedback, FeedbackKind::Ok));
                    self.next_word = FeedbackDelay::start(
                        Duration::from_millis(FEEDBACK_DELAY_MS),
                        self.tick,
                    );
                } else {
                    self.feedback = Some(Feedback::new(outcome.feedback, FeedbackKind::Retry));
                }
            }
            Err(QuizError::NoActiveWord) => debug!("answer ignored: no active word"),
            Err(e) => debug!("answer ignored: {e}"),
        }
    }

    pub fn skip(&mut self) {
        if self.next_word.is_pending() {
            return;
        }
        match self.scheduler.skip() {
            Ok(outcome) => {
                self.input.clear();
                self.feedback = Some(Feedback::new(outcome.feedback, FeedbackKind::Info));
                self.show_next();
            }
            Err(e) => debug!("skip ignored: {e}"),
        }
    }

    /// Moves the screen on to whatever the scheduler is asking now.
    fn show_next(&mut self) {
        if self.scheduler.is_finished() {
            self.speaker.cancel();
            self.state = AppState::Results;
        } else {
            self.speak_current();
        }
    }

    pub fn on_tick(&mut self) {
        if self.next_word.on_tick() {
            self.feedback = None;
            self.show_next();
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Flow::Quit;
        }

        match self.state {
            AppState::Ready => {
                if key.code == KeyCode::Enter {
                    self.start();
                }
            }
            AppState::Asking => match key.code {
                KeyCode::Enter => self.submit(),
                KeyCode::Tab => self.skip(),
                KeyCode::F(5) => self.repeat(),
                KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.repeat()
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.input.push(c);
                }
                _ => {}
            },
            AppState::Results => {
                if matches!(key.code, KeyCode::Char('r') | KeyCode::Enter) {
                    self.start();
                }
            }
        }
        Flow::Continue
    }
}

fn read_line(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut line = String::new();
    stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Runs the non-interactive list and lock commands. Returns whether any ran.
fn run_commands(cli: &Cli, stores: &Stores) -> Result<bool, Box<dyn Error>> {
    if !cli.has_list_command() {
        return Ok(false);
    }

    let mut lock: TeacherLock = stores.lock.load();

    if cli.lock {
        let pin = match &cli.pin {
            Some(pin) => pin.clone(),
            None => read_line("Set a 4+ digit PIN: ")?,
        };
        let confirm = read_line("Confirm PIN: ")?;
        lock.enable(&pin, &confirm)?;
        stores.lock.save(&lock)?;
        println!("Lock enabled. Keep your PIN safe.");
    }

    if cli.unlock {
        let pin = match &cli.pin {
            Some(pin) => pin.clone(),
            None => read_line("Enter PIN to disable lock: ")?,
        };
        lock.unlock(&pin)?;
        stores.lock.save(&lock)?;
        println!("Lock disabled.");
    }

    let edits = cli.import.is_some()
        || cli.export.is_some()
        || cli.reset_words
        || cli.list
        || cli.save_settings;
    if edits {
        lock.authorize(cli.pin.as_deref())?;
    }

    if cli.reset_words {
        let pool = stores.words.reset_to_default()?;
        println!("Reset to sample list ({} words).", pool.len());
    }

    if let Some(path) = &cli.import {
        let pool = stores.words.import_file(path)?;
        println!("Imported {} words.", pool.len());
    }

    if let Some(path) = &cli.export {
        let pool = stores.words.current_pool();
        write_list_file(path, &pool)?;
        println!("Exported {} words to {}.", pool.len(), path.display());
    }

    if cli.list {
        println!("{}", stores.words.current_pool().to_lines());
    }

    if cli.save_settings {
        let settings = cli.apply_overrides(stores.settings.load());
        stores.settings.save(&settings)?;
        println!("Settings saved.");
    }

    Ok(true)
}

fn init_logging(tui: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if tui {
        // stderr would draw over the alternate screen
        let file = std::env::var_os("RUST_LOG").and(AppDirs::log_path()).and_then(|path| {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).ok()?;
            }
            OpenOptions::new().create(true).append(true).open(path).ok()
        });
        match file {
            Some(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            None => {
                builder.filter_level(LevelFilter::Off);
            }
        }
    }
    let _ = builder.try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let stores = Stores::open(cli.data_dir.as_deref());

    if cli.has_list_command() {
        init_logging(false);
        if let Err(e) = run_commands(&cli, &stores) {
            let mut cmd = Cli::command();
            let kind = match e.downcast_ref::<StoreError>() {
                Some(StoreError::Locked) => ErrorKind::InvalidValue,
                _ => ErrorKind::Io,
            };
            cmd.error(kind, e.to_string()).exit();
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }
    init_logging(true);

    let settings = cli.apply_overrides(stores.settings.load());
    let pool = if cli.words.is_empty() {
        stores.words.current_pool()
    } else {
        WordPool::from_words(cli.words.iter().cloned())
    };
    // --no-speak only stops automatic speech; Ctrl-R still reads the word
    let speaker: Box<dyn Speaker> =
        Box::new(CommandSpeaker::new(cli.tts.clone(), settings.voice.clone()));

    let tick = Duration::from_millis(TICK_RATE_MS);
    let mut app = App::new(QuizScheduler::new(settings), pool, speaker, tick);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick: Duration,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), tick);
    app.start();
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            QuizEvent::Tick => {
                if app.next_word.is_pending() {
                    app.on_tick();
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            QuizEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            QuizEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}
