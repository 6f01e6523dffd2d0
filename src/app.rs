use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::{
    config::{Config, ConfigStore, SecretMode},
    game::{Feedback, GameSession, GuessError, Outcome, MAX_NUMBER, MIN_NUMBER},
    history::{GameRecord, HistoryDb},
};

/// Longest input the number pad accepts
pub const MAX_INPUT_LEN: usize = 2;

/// Settings in effect for this run: the config file overlaid with CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub secret_mode: SecretMode,
    pub record_history: bool,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Settings {
    fn from(cfg: &Config) -> Self {
        Self {
            secret_mode: cfg.secret_mode,
            record_history: cfg.record_history,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Setup,
    Guessing,
    Won,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Hint,
    Error,
    Success,
}

/// Feedback line shown under the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct HistoryView {
    pub scroll_offset: usize,
    pub return_to: AppState,
}

impl Default for HistoryView {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            return_to: AppState::Setup,
        }
    }
}

/// Controller owning the game session and everything the screens display
pub struct App {
    pub session: GameSession,
    pub state: AppState,
    pub input: String,
    pub message: Option<Message>,
    pub settings: Settings,
    pub history: Option<HistoryDb>,
    pub history_view: HistoryView,
    config_store: Option<Box<dyn ConfigStore>>,
    started_at: Option<DateTime<Local>>,
}

impl App {
    pub fn new(settings: Settings, history: Option<HistoryDb>) -> Self {
        let session = match settings.seed {
            Some(seed) => GameSession::seeded(seed),
            None => GameSession::new(),
        };

        Self {
            session,
            state: AppState::Setup,
            input: String::new(),
            message: None,
            settings,
            history,
            history_view: HistoryView::default(),
            config_store: None,
            started_at: None,
        }
    }

    /// Persist setting changes made from inside the app through `store`
    pub fn with_config_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        match self.state {
            AppState::Setup => self.on_setup_key(key.code),
            AppState::Guessing => self.on_guessing_key(key.code),
            AppState::Won => self.on_won_key(key.code),
            AppState::History => self.on_history_key(key.code),
        }

        Control::Continue
    }

    fn on_setup_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.start_game(),
            KeyCode::Char('m') => self.toggle_secret_mode(),
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Char(c) if self.settings.secret_mode == SecretMode::Chosen => {
                self.push_digit(c)
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Delete => self.input.clear(),
            _ => {}
        }
    }

    fn on_guessing_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => self.push_digit(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Delete => self.input.clear(),
            _ => {}
        }
    }

    fn on_won_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Char('n') => self.play_again(),
            KeyCode::Char('h') => self.open_history(),
            _ => {}
        }
    }

    fn on_history_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('b') | KeyCode::Backspace => {
                self.state = self.history_view.return_to;
            }
            KeyCode::Up => {
                self.history_view.scroll_offset = self.history_view.scroll_offset.saturating_sub(1);
            }
            KeyCode::Down => {
                // clamped when rendering
                self.history_view.scroll_offset += 1;
            }
            KeyCode::Home => self.history_view.scroll_offset = 0,
            KeyCode::Char('c') => self.clear_history(),
            _ => {}
        }
    }

    fn push_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.input.len() < MAX_INPUT_LEN {
            self.input.push(c);
        }
    }

    pub fn start_game(&mut self) {
        let result = match self.settings.secret_mode {
            SecretMode::Random => self.session.start(None),
            SecretMode::Chosen => self.session.start_from_input(&self.input),
        };
        self.input.clear();

        match result {
            Ok(()) => {
                self.started_at = Some(Local::now());
                self.state = AppState::Guessing;
                self.message = Some(Message::new(
                    MessageKind::Info,
                    format!("Guess my number! It is between {MIN_NUMBER} and {MAX_NUMBER}."),
                ));
                info!(mode = %self.settings.secret_mode, "game started");
            }
            Err(e) => {
                self.message = Some(Message::new(
                    MessageKind::Error,
                    format!("Invalid number! Pick a number from {MIN_NUMBER} to {MAX_NUMBER}."),
                ));
                info!(reason = e.reason(), "secret rejected");
            }
        }
    }

    pub fn submit(&mut self) {
        let raw = std::mem::take(&mut self.input);

        match self.session.submit_guess(&raw) {
            Ok(feedback) => self.on_feedback(feedback),
            Err(e) => {
                self.message = Some(Message::new(MessageKind::Error, error_text(e)));
                info!(reason = e.reason(), "guess rejected");
            }
        }
    }

    fn on_feedback(&mut self, feedback: Feedback) {
        let message = match feedback.outcome {
            Outcome::TooLow => Message::new(MessageKind::Hint, "Too low! Try a larger number."),
            Outcome::TooHigh => Message::new(MessageKind::Hint, "Too high! Try a smaller number."),
            Outcome::Correct => Message::new(
                MessageKind::Success,
                format!(
                    "Correct! Solved in {} {}.",
                    feedback.guess_count,
                    if feedback.guess_count == 1 {
                        "guess"
                    } else {
                        "guesses"
                    }
                ),
            ),
        };
        self.message = Some(message);

        if feedback.outcome == Outcome::Correct {
            self.state = AppState::Won;
            info!(guesses = feedback.guess_count, "game won");
            self.record_win();
        }
    }

    fn record_win(&mut self) {
        if !self.settings.record_history {
            return;
        }
        let (Some(db), Some(target)) = (self.history.as_ref(), self.session.target()) else {
            return;
        };

        let finished_at = Local::now();
        let record = GameRecord {
            target,
            guesses: self.session.guesses().to_vec(),
            secret_mode: self.settings.secret_mode,
            started_at: self.started_at.unwrap_or(finished_at),
            finished_at,
        };

        if let Err(e) = db.record_game(&record) {
            warn!(error = %e, "failed to record game");
        }
    }

    /// Back to the setup screen with a fresh session
    pub fn play_again(&mut self) {
        self.session.reset();
        self.input.clear();
        self.message = None;
        self.started_at = None;
        self.state = AppState::Setup;
    }

    fn toggle_secret_mode(&mut self) {
        self.settings.secret_mode = self.settings.secret_mode.toggled();
        self.input.clear();
        self.message = None;

        if let Some(store) = &self.config_store {
            let mut cfg = store.load();
            cfg.secret_mode = self.settings.secret_mode;
            if let Err(e) = store.save(&cfg) {
                warn!(error = %e, "failed to save config");
            }
        }
    }

    fn open_history(&mut self) {
        self.history_view = HistoryView {
            scroll_offset: 0,
            return_to: self.state,
        };
        self.state = AppState::History;
    }

    fn clear_history(&mut self) {
        if let Some(db) = &self.history {
            match db.clear_all() {
                Ok(()) => info!("history cleared"),
                Err(e) => warn!(error = %e, "failed to clear history"),
            }
        }
        self.history_view.scroll_offset = 0;
    }
}

fn error_text(e: GuessError) -> String {
    match e {
        GuessError::NotANumber => {
            format!("That is not a number. Enter a number from {MIN_NUMBER} to {MAX_NUMBER}.")
        }
        GuessError::OutOfRange => {
            format!("Invalid number! Enter a number from {MIN_NUMBER} to {MAX_NUMBER}.")
        }
        GuessError::InvalidState => "No game in progress.".to_string(),
    }
}
