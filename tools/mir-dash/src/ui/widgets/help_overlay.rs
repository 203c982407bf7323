//! Help overlay widget.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const KEYS: [(&str, &str); 10] = [
    ("  1-9    ", "Toggle peer rows of node 1-9"),
    ("  E      ", "Toggle peer rows of every node"),
    ("  ←/→    ", "Select node"),
    ("  P      ", "Process selected node's actions"),
    ("  N      ", "Propose a random request on selected node"),
    ("  T      ", "Tick selected node"),
    ("  A      ", "Cycle auto-process: manual, 0, 50, 500, 1500 ms"),
    ("  R      ", "Refresh now"),
    ("  Q/Esc  ", "Quit"),
    ("  ?      ", "Toggle this help"),
];

const LEGEND: [(&str, Color, &str); 8] = [
    ("  Q D V  ", Color::Yellow, "Queued, digested, validated"),
    ("  P      ", Color::Yellow, "Prepared"),
    ("  C      ", Color::Green, "Committed"),
    ("  I      ", Color::Red, "Invalid"),
    ("  ?      ", Color::Magenta, "Unknown state code"),
    ("  ✔ N L  ", Color::Cyan, "Checkpoint agreed, network quorum only, local only"),
    ("  X C P  ", Color::Cyan, "Peer's last checkpoint, commit, prepare"),
    ("  █      ", Color::DarkGray, "Outside this node's watermark window"),
];

/// Render a centered help overlay.
pub fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(64, 80, frame.area());
    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
    };

    let mut help_text = vec![
        Line::from(Span::styled(
            "MIR-DASH HELP",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        heading("Keys"),
        Line::raw(""),
    ];
    help_text.extend(KEYS.iter().map(|(key, text)| {
        Line::from(vec![
            Span::styled(*key, Style::default().fg(Color::Yellow)),
            Span::raw(*text),
        ])
    }));
    help_text.push(Line::raw(""));
    help_text.push(heading("Legend"));
    help_text.push(Line::raw(""));
    help_text.extend(LEGEND.iter().map(|(glyph, color, text)| {
        Line::from(vec![
            Span::styled(*glyph, Style::default().fg(*color)),
            Span::raw(*text),
        ])
    }));
    help_text.push(Line::raw(""));
    help_text.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(help_text).block(
        Block::default()
            .title(" Help ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
