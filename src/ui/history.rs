use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{
    app::App,
    history::{GameRecord, HistorySummary},
};

/// How many past games the history screen loads
pub const HISTORY_LIMIT: usize = 500;

/// Pure presenter for a single history row
pub fn present_row(record: &GameRecord) -> Row<'static> {
    let count = record.guess_count();
    // a binary search never needs more than 7 guesses over 1..=99
    let count_color = if count <= 3 {
        Color::Green
    } else if count <= 7 {
        Color::Yellow
    } else {
        Color::Red
    };

    Row::new(vec![
        Cell::from(record.finished_at.format("%Y-%m-%d %H:%M").to_string()),
        Cell::from(record.target.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(count.to_string()).style(Style::default().fg(count_color)),
        Cell::from(record.secret_mode.to_string()),
        Cell::from(record.guesses.iter().join(" ")),
    ])
}

pub fn summary_text(summary: Option<&HistorySummary>) -> String {
    match summary {
        Some(s) => {
            let mut text = format!(
                "Games: {}   Best: {}   Average: {:.1}",
                s.games, s.best, s.average
            );
            if let Some(last) = s.last {
                text.push_str(&format!("   Last: {}", last.format("%Y-%m-%d %H:%M")));
            }
            text
        }
        None => "No games played yet".to_string(),
    }
}

pub fn render_history(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title + summary
            Constraint::Min(0),    // Games table
            Constraint::Length(3), // Instructions
        ])
        .split(area);

    let (summary, games) = match &app.history {
        Some(db) => {
            let summary = db.summary().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to read history summary");
                None
            });
            let games = db.recent_games(HISTORY_LIMIT).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to read recent games");
                Vec::new()
            });
            (summary, games)
        }
        None => (None, Vec::new()),
    };

    let title = Paragraph::new(summary_text(summary.as_ref()))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if games.is_empty() {
        let text = if app.history.is_some() {
            "No finished games yet.\nWin a game to see it here!"
        } else {
            "History is disabled for this run."
        };
        let no_data = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("No Data"))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(no_data, chunks[1]);
    } else {
        // borders and header
        let table_height = chunks[1].height.saturating_sub(3) as usize;
        let total_rows = games.len();
        let max_scroll = total_rows.saturating_sub(table_height);

        if app.history_view.scroll_offset > max_scroll {
            app.history_view.scroll_offset = max_scroll;
        }

        let header = Row::new(vec![
            Cell::from("Finished"),
            Cell::from("Target"),
            Cell::from("Guesses"),
            Cell::from("Mode"),
            Cell::from("Sequence"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows: Vec<Row> = games
            .iter()
            .skip(app.history_view.scroll_offset)
            .take(table_height)
            .map(present_row)
            .collect();

        let scroll_info = if total_rows > table_height {
            format!(
                " ({}/{} games)",
                app.history_view.scroll_offset + visible_rows.len(),
                total_rows
            )
        } else {
            String::new()
        };

        let table = Table::new(
            visible_rows,
            &[
                Constraint::Length(17),
                Constraint::Length(7),
                Constraint::Length(8),
                Constraint::Length(7),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Recent Games{}", scroll_info)),
        );

        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("↑/↓ scroll | (c)lear history | (b)ack | (esc)ape")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppState, Settings};
    use crate::config::SecretMode;
    use crate::history::HistoryDb;
    use chrono::{Duration, Local, TimeZone};
    use ratatui::{backend::TestBackend, Terminal};

    fn record(target: u8, guesses: &[u8], minutes_ago: i64) -> GameRecord {
        let finished_at = Local::now() - Duration::minutes(minutes_ago);
        GameRecord {
            target,
            guesses: guesses.to_vec(),
            secret_mode: SecretMode::Random,
            started_at: finished_at,
            finished_at,
        }
    }

    fn screen_text(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render_history(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(summary_text(None), "No games played yet");
        let s = HistorySummary {
            games: 4,
            best: 2,
            average: 4.4,
            last: None,
        };
        assert_eq!(summary_text(Some(&s)), "Games: 4   Best: 2   Average: 4.4");

        let last = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 0).unwrap();
        let s = HistorySummary {
            last: Some(last),
            ..s
        };
        assert_eq!(
            summary_text(Some(&s)),
            "Games: 4   Best: 2   Average: 4.4   Last: 2026-03-14 09:26"
        );
    }

    #[test]
    fn test_render_empty_history() {
        let mut app = App::new(
            Settings::default(),
            Some(HistoryDb::open_in_memory().unwrap()),
        );
        app.state = AppState::History;
        let text = screen_text(&mut app, 80, 24);
        assert!(text.contains("No games played yet"));
        assert!(text.contains("No finished games yet."));
    }

    #[test]
    fn test_render_disabled_history() {
        let mut app = App::new(Settings::default(), None);
        let text = screen_text(&mut app, 80, 24);
        assert!(text.contains("History is disabled"));
    }

    #[test]
    fn test_render_games_and_clamp_scroll() {
        let db = HistoryDb::open_in_memory().unwrap();
        for i in 0..30u8 {
            db.record_game(&record(i + 1, &[50, i + 1], i64::from(i))).unwrap();
        }
        let mut app = App::new(Settings::default(), Some(db));
        app.history_view.scroll_offset = 1000;

        let text = screen_text(&mut app, 100, 24);
        assert!(text.contains("Games: 30"));
        assert!(text.contains("Recent Games"));
        assert!(text.contains("games)"));
        // 24 rows - 4 margin - 6 chrome - 3 table chrome
        assert_eq!(app.history_view.scroll_offset, 30 - 11);
    }
}
