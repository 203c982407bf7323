//! Main layout orchestration.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  MIR-DASH v0.1.0  demo cluster  Last refresh: 12:00:01  [?]Help │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  NODE CARDS (one per replica)                                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  SEQUENCES (aligned matrix)                                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  [1-9] Details  [E] All  [←→] Select  [P]rocess  [N] Propose ... │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{App, AppState};

use super::{matrix_table, node_cards, widgets};

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                      // Header
            Constraint::Length(node_cards::CARD_HEIGHT), // Node cards
            Constraint::Min(6),                         // Matrix
            Constraint::Length(3),                      // Footer (keybinds)
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    node_cards::render(frame, chunks[1], app);
    matrix_table::render(frame, chunks[2], app);
    render_footer(frame, chunks[3], app);

    if app.state == AppState::Help {
        widgets::render_help_overlay(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = vec![
        Span::styled(
            " MIR-DASH ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION"), " "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!(" {} ", app.source), Style::default().fg(Color::White)),
    ];

    // Errors win over the refresh time; the matrix below may be stale
    let status = if let Some(err) = &app.error_message {
        Span::styled(format!(" ⚠ {} ", err), Style::default().fg(Color::Red))
    } else if let Some(time) = app.last_refresh {
        Span::styled(
            format!(" Last refresh: {} ", time.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(" No data ", Style::default().fg(Color::DarkGray))
    };

    let hints = vec![
        Span::styled("[A]", Style::default().fg(Color::Yellow)),
        Span::raw(format!("uto:{} ", app.auto_process)),
        Span::styled("[Q]", Style::default().fg(Color::Yellow)),
        Span::raw("uit "),
        Span::styled("[?]", Style::default().fg(Color::Yellow)),
        Span::raw("Help "),
    ];

    let title_width: usize = title.iter().map(|s| s.width()).sum();
    let hints_width: usize = hints.iter().map(|s| s.width()).sum();
    let padding = (area.width as usize)
        .saturating_sub(title_width + status.width() + hints_width + 2);

    let mut spans = title;
    spans.push(status);
    spans.push(Span::raw(" ".repeat(padding)));
    spans.extend(hints);

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(header, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let selected = app
        .selected_node_id()
        .map(|id| format!("Node-{id}"))
        .unwrap_or_else(|| "-".to_string());

    let keybinds = vec![
        Span::styled("[1-9]", Style::default().fg(Color::Yellow)),
        Span::raw(" Details  "),
        Span::styled("[E]", Style::default().fg(Color::Yellow)),
        Span::raw(" All  "),
        Span::styled("[←→]", Style::default().fg(Color::Yellow)),
        Span::raw(format!(" Select ({selected})  ")),
        Span::styled("[P]", Style::default().fg(Color::Yellow)),
        Span::raw("rocess  "),
        Span::styled("[N]", Style::default().fg(Color::Yellow)),
        Span::raw(" Propose  "),
        Span::styled("[T]", Style::default().fg(Color::Yellow)),
        Span::raw("ick  "),
        Span::styled("[R]", Style::default().fg(Color::Yellow)),
        Span::raw("efresh  "),
    ];

    let footer = Paragraph::new(Line::from(keybinds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .centered();

    frame.render_widget(footer, area);
}
