pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState, MessageKind},
    config::SecretMode,
    game::{MAX_NUMBER, MIN_NUMBER},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const INPUT_BOX_WIDTH: u16 = 12;

/// Draw whatever screen the app is currently on
pub fn draw(app: &mut App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let title_style = Style::default().patch(bold_style).fg(Color::Magenta);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // subtitle
                Constraint::Length(3), // input box
                Constraint::Length(2), // message
                Constraint::Min(0),    // guess list
                Constraint::Length(1), // legend
            ])
            .split(area);

        let (title, subtitle, legend) = match self.state {
            AppState::Setup => match self.settings.secret_mode {
                SecretMode::Random => (
                    "Start a New Game".to_string(),
                    format!("I will pick a number from {MIN_NUMBER} to {MAX_NUMBER}"),
                    "(enter) start / (m)ode: random / (h)istory / (esc)ape",
                ),
                SecretMode::Chosen => (
                    "Start a New Game".to_string(),
                    format!("Player one: enter a secret from {MIN_NUMBER} to {MAX_NUMBER}"),
                    "(enter) confirm / (del) reset / (m)ode: chosen / (h)istory / (esc)ape",
                ),
            },
            AppState::Guessing => {
                let hint = match self.session.bounds() {
                    Some((low, high)) if self.session.guess_count() > 0 => {
                        format!("   somewhere in {low}..={high}")
                    }
                    _ => String::new(),
                };
                (
                    "Guess My Number!".to_string(),
                    format!("Guesses: {}{}", self.session.guess_count(), hint),
                    "(enter) guess / (del) clear / (esc)ape",
                )
            }
            // History renders through its own screen
            AppState::Won | AppState::History => (
                "You Got It!".to_string(),
                match self.session.target() {
                    Some(target) => format!(
                        "The number was {target}. Guesses: {}",
                        self.session.guess_count()
                    ),
                    None => format!("Guesses: {}", self.session.guess_count()),
                },
                "(enter) play again / (h)istory / (esc)ape",
            ),
        };

        Paragraph::new(Span::styled(title, title_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(Span::styled(subtitle, bold_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        if self.accepts_input() {
            let shown = match self.state {
                // keep the secret hidden from the guessing player
                AppState::Setup => "*".repeat(self.input.len()),
                _ => self.input.clone(),
            };
            let box_area = centered_width(INPUT_BOX_WIDTH, chunks[2]);
            Paragraph::new(Line::from(vec![
                Span::styled(shown, bold_style),
                Span::styled("_", dim_style),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(box_area, buf);
        }

        if let Some(message) = &self.message {
            let color = match message.kind {
                MessageKind::Info => Color::Cyan,
                MessageKind::Hint => Color::Yellow,
                MessageKind::Error => Color::Red,
                MessageKind::Success => Color::Green,
            };
            Paragraph::new(Span::styled(
                message.text.as_str(),
                Style::default().patch(bold_style).fg(color),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);
        }

        let lines = guess_lines(self.session.guesses());
        let list_width = lines
            .iter()
            .map(|l| l.width() as u16)
            .max()
            .unwrap_or(0)
            .saturating_add(4);
        Paragraph::new(
            lines
                .into_iter()
                .map(|l| Line::from(Span::raw(l)))
                .collect::<Vec<_>>(),
        )
        .alignment(Alignment::Left)
        .render(centered_width(list_width, chunks[4]), buf);

        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

impl App {
    fn accepts_input(&self) -> bool {
        match self.state {
            AppState::Setup => self.settings.secret_mode == SecretMode::Chosen,
            AppState::Guessing => true,
            AppState::Won | AppState::History => false,
        }
    }
}

/// Guess history rows, most recent first
pub fn guess_lines(guesses: &[u8]) -> Vec<String> {
    guesses
        .iter()
        .enumerate()
        .rev()
        .map(|(idx, guess)| format!("Guess #{}: {}", idx + 1, guess))
        .collect()
}

fn centered_width(width: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Settings;
    use crate::history::HistoryDb;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn chosen_app() -> App {
        App::new(
            Settings {
                secret_mode: SecretMode::Chosen,
                record_history: true,
                seed: Some(3),
            },
            Some(HistoryDb::open_in_memory().unwrap()),
        )
    }

    #[test]
    fn test_guess_lines_most_recent_first() {
        assert_eq!(
            guess_lines(&[10, 50, 42]),
            vec!["Guess #3: 42", "Guess #2: 50", "Guess #1: 10"]
        );
        assert!(guess_lines(&[]).is_empty());
    }

    #[test]
    fn test_centered_width() {
        let area = Rect::new(0, 0, 20, 3);
        assert_eq!(centered_width(10, area), Rect::new(5, 0, 10, 3));
        assert_eq!(centered_width(40, area), area);
    }

    #[test]
    fn test_setup_screen_random_mode() {
        let app = App::new(Settings::default(), None);
        let content = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(content.contains("Start a New Game"));
        assert!(content.contains("(m)ode: random"));
    }

    #[test]
    fn test_setup_screen_masks_secret() {
        let mut app = chosen_app();
        app.input = "42".to_string();
        let content = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(content.contains("**"));
        assert!(!content.contains("42"));
    }

    #[test]
    fn test_guessing_screen_shows_history_and_hint() {
        let mut app = chosen_app();
        app.session.start(Some(42)).unwrap();
        app.state = AppState::Guessing;
        app.session.submit_guess("10").unwrap();
        app.session.submit_guess("50").unwrap();
        app.input = "4".to_string();

        let content = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(content.contains("Guess My Number!"));
        assert!(content.contains("Guesses: 2"));
        assert!(content.contains("11..=49"));
        assert!(content.contains("Guess #2: 50"));
        assert!(content.contains("Guess #1: 10"));
        assert!(content.contains("4_"));
    }

    #[test]
    fn test_won_screen_reveals_target() {
        let mut app = chosen_app();
        app.input = "42".to_string();
        app.start_game();
        app.input = "42".to_string();
        app.submit();
        assert_eq!(app.state, AppState::Won);

        let content = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(content.contains("You Got It!"));
        assert!(content.contains("The number was 42"));
        assert!(content.contains("Correct! Solved in 1 guess."));
        assert!(content.contains("play again"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let mut app = chosen_app();
        app.session.start(Some(5)).unwrap();
        app.state = AppState::Guessing;
        for g in ["1", "2", "3", "4"] {
            app.session.submit_guess(g).unwrap();
        }
        let area = Rect::new(0, 0, 10, 4);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn test_draw_every_state() {
        let mut app = chosen_app();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        for state in [
            AppState::Setup,
            AppState::Guessing,
            AppState::Won,
            AppState::History,
        ] {
            app.state = state;
            terminal.draw(|f| draw(&mut app, f)).unwrap();
        }
    }
}
