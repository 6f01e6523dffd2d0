use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use guessr::{
    app::{App, Control, Settings},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, SecretMode},
    history::HistoryDb,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, GuessrEvent, Runner},
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
};
use tracing::{info, warn};

/// guess-the-number tui with high/low feedback
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guess a secret number from 1 to 99 with too-high/too-low feedback. Finished games are kept in a local history."
)]
pub struct Cli {
    /// who picks the secret number (defaults to the saved setting)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<SecretMode>,

    /// seed for the random number generator, for reproducible games
    #[clap(long)]
    seed: Option<u64>,

    /// do not read or write the game history database
    #[clap(long)]
    no_history: bool,

    /// print a summary of past games and exit
    #[clap(long)]
    history: bool,
}

impl Cli {
    /// Overlay CLI flags on the saved config
    fn to_settings(&self, cfg: &Config) -> Settings {
        let mut settings = Settings::from(cfg);
        if let Some(mode) = self.mode {
            settings.secret_mode = mode;
        }
        if self.no_history {
            settings.record_history = false;
        }
        settings.seed = self.seed;
        settings
    }

    /// `--history` only reads, so just `--no-history` turns it off
    fn history_enabled(&self, settings: &Settings) -> bool {
        if self.history {
            !self.no_history
        } else {
            settings.record_history
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _log_guard = AppDirs::log_dir().and_then(|dir| logging::init(&dir).ok());

    let store = FileConfigStore::new();
    let settings = cli.to_settings(&store.load());
    let history = open_history(cli.history_enabled(&settings));

    if cli.history {
        print_history(&mut io::stdout().lock(), history.as_ref())?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    info!(?settings, "starting guessr");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, history).with_config_store(Box::new(store));
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn open_history(enabled: bool) -> Option<HistoryDb> {
    if !enabled {
        return None;
    }
    match HistoryDb::new() {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(error = %e, "history unavailable");
            None
        }
    }
}

fn print_history<W: Write>(out: &mut W, history: Option<&HistoryDb>) -> Result<(), Box<dyn Error>> {
    let Some(db) = history else {
        writeln!(out, "History is disabled.")?;
        return Ok(());
    };

    writeln!(out, "{}", ui::history::summary_text(db.summary()?.as_ref()))?;
    for game in db.recent_games(10)? {
        writeln!(
            out,
            "{}  target {:>2}  {} guesses  [{}]",
            game.finished_at.format("%Y-%m-%d %H:%M"),
            game.target,
            game.guess_count(),
            game.secret_mode
        )?;
    }
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            GuessrEvent::Tick => {}
            GuessrEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            GuessrEvent::Key(key) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    info!("quitting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use guessr::history::GameRecord;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["guessr"]);

        assert_eq!(cli.mode, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.no_history);
        assert!(!cli.history);
    }

    #[test]
    fn test_cli_mode() {
        let cli = Cli::parse_from(["guessr", "-m", "chosen"]);
        assert_eq!(cli.mode, Some(SecretMode::Chosen));

        let cli = Cli::parse_from(["guessr", "--mode", "random"]);
        assert_eq!(cli.mode, Some(SecretMode::Random));

        assert!(Cli::try_parse_from(["guessr", "--mode", "both"]).is_err());
    }

    #[test]
    fn test_cli_seed_and_flags() {
        let cli = Cli::parse_from(["guessr", "--seed", "42", "--no-history", "--history"]);
        assert_eq!(cli.seed, Some(42));
        assert!(cli.no_history);
        assert!(cli.history);
    }

    #[test]
    fn test_to_settings_uses_config_when_flags_absent() {
        let cfg = Config {
            secret_mode: SecretMode::Chosen,
            record_history: true,
        };
        let settings = Cli::parse_from(["guessr"]).to_settings(&cfg);

        assert_eq!(settings.secret_mode, SecretMode::Chosen);
        assert!(settings.record_history);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_to_settings_flags_override_config() {
        let cfg = Config {
            secret_mode: SecretMode::Chosen,
            record_history: true,
        };
        let settings =
            Cli::parse_from(["guessr", "-m", "random", "--no-history", "--seed", "7"])
                .to_settings(&cfg);

        assert_eq!(settings.secret_mode, SecretMode::Random);
        assert!(!settings.record_history);
        assert_eq!(settings.seed, Some(7));
    }

    #[test]
    fn test_open_history_respects_setting() {
        assert!(open_history(false).is_none());
    }

    #[test]
    fn test_history_summary_ignores_record_setting() {
        let cfg = Config {
            secret_mode: SecretMode::Random,
            record_history: false,
        };

        let cli = Cli::parse_from(["guessr", "--history"]);
        assert!(cli.history_enabled(&cli.to_settings(&cfg)));

        let cli = Cli::parse_from(["guessr", "--history", "--no-history"]);
        assert!(!cli.history_enabled(&cli.to_settings(&cfg)));

        let cli = Cli::parse_from(["guessr"]);
        assert!(!cli.history_enabled(&cli.to_settings(&cfg)));
        assert!(cli.history_enabled(&cli.to_settings(&Config::default())));
    }

    #[test]
    fn test_print_history() {
        let db = HistoryDb::open_in_memory().unwrap();
        let mut out = Vec::new();
        print_history(&mut out, Some(&db)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No games played yet\n");

        let now = Local::now();
        db.record_game(&GameRecord {
            target: 42,
            guesses: vec![10, 50, 42],
            secret_mode: SecretMode::Random,
            started_at: now,
            finished_at: now,
        })
        .unwrap();

        let mut out = Vec::new();
        print_history(&mut out, Some(&db)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Games: 1   Best: 3   Average: 3.0   Last: "));
        assert!(text.contains("target 42  3 guesses  [random]"));
    }

    #[test]
    fn test_print_history_disabled() {
        let mut out = Vec::new();
        print_history(&mut out, None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "History is disabled.\n");
    }

    #[test]
    fn test_ui_draws_setup_screen() {
        use ratatui::backend::TestBackend;

        let mut app = App::new(Settings::default(), None);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui::draw(&mut app, f)).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("Start a New Game"));
    }
}
