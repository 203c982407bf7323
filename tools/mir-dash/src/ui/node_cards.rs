//! Node cards: one box per replica with its pending action counters.
//!
//! ```text
//! ┌ Node-0 ──────────┐┌ Node-1 ⟳ ────────┐
//! │ Broadcasts     1 ││ Broadcasts     0 │
//! │ ...              ││ ...              │
//! │ Total          4 ││ Total          2 │
//! │ Committed  1.2 KB││ Committed  980 B │
//! └──────────────────┘└──────────────────┘
//! ```

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use mir_status_types::NodeSnapshot;

use crate::domain::App;

/// Rows in a card including its border.
pub const CARD_HEIGHT: u16 = 11;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    if app.nodes.is_empty() {
        let empty = Paragraph::new(" Waiting for first status poll...")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .title(" NODES ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(empty, area);
        return;
    }

    let count = app.nodes.len() as u32;
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (index, (node, chunk)) in app.nodes.iter().zip(chunks.iter()).enumerate() {
        let selected = index == app.selected;
        let processing = app.processing.contains(&node.id);
        render_card(frame, *chunk, node, selected, processing);
    }
}

fn render_card(frame: &mut Frame, area: Rect, node: &NodeSnapshot, selected: bool, processing: bool) {
    let mut lines: Vec<Line> = node
        .actions
        .named()
        .iter()
        .map(|(label, count)| counter_line(label, *count))
        .collect();

    let total = node.actions.total();
    lines.push(Line::from(vec![
        Span::styled(format!(" {:<11}", "Total"), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("{:>6}", total),
            Style::default()
                .fg(if total > 0 { Color::Yellow } else { Color::Green })
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::raw(format!(" {:<11}", "Committed")),
        Span::styled(
            format!("{:>6}", format_bytes(node.log.total_bytes)),
            Style::default().fg(Color::Cyan),
        ),
    ]));

    let title = if processing {
        format!(" Node-{} ⟳ ", node.id)
    } else {
        format!(" Node-{} ", node.id)
    };
    let border = if selected { Color::Yellow } else { Color::DarkGray };

    let card = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(card, area);
}

fn counter_line(label: &str, count: u64) -> Line<'static> {
    let style = if count > 0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(vec![
        Span::raw(format!(" {:<11}", label)),
        Span::styled(format!("{:>6}", count), style),
    ])
}

/// Format bytes as human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1_024 {
        format!("{:.1} KB", bytes as f64 / 1_024.0)
    } else {
        format!("{} B", bytes)
    }
}
