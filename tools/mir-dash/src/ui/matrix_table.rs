//! Sequence matrix table.
//!
//! Terminal tables have no row or column spans, so spans are drawn instead:
//! the node label appears on the first bucket row only, and a checkpoint
//! cell covering `n` columns is drawn as `n - 1` rule cells followed by the
//! status glyph.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell as TableCell, Paragraph, Row, Table},
    Frame,
};

use mir_matrix::{AlignedMatrix, Cell, CheckpointRow, CheckpointStatus, NodeGroup, SymbolColor};

use crate::domain::App;

const NODE_LABEL_WIDTH: u16 = 22;
const ROW_LABEL_WIDTH: u16 = 12;
const SEQ_WIDTH: u16 = 3;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" SEQUENCES ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(matrix) = &app.matrix else {
        let empty = Paragraph::new(" No watermark window to display")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let inner_width = area.width.saturating_sub(2);
    let visible = visible_columns(inner_width, matrix.width());
    let selected = app.selected_node_id();

    let mut rows = Vec::new();
    for group in &matrix.groups {
        rows.extend(group_rows(group, visible, selected == Some(group.node_id)));
    }

    let mut widths = vec![
        Constraint::Length(NODE_LABEL_WIDTH),
        Constraint::Length(ROW_LABEL_WIDTH),
    ];
    widths.extend(std::iter::repeat(Constraint::Length(SEQ_WIDTH)).take(visible));

    let table = Table::new(rows, widths)
        .header(header_row(matrix, visible))
        .column_spacing(0)
        .block(block);
    frame.render_widget(table, area);
}

/// Sequence columns that fit next to the two label columns.
fn visible_columns(width: u16, total: usize) -> usize {
    let available = width.saturating_sub(NODE_LABEL_WIDTH + ROW_LABEL_WIDTH) / SEQ_WIDTH;
    total.min(available as usize)
}

fn header_row(matrix: &AlignedMatrix, visible: usize) -> Row<'static> {
    let mut cells = vec![TableCell::from(""), TableCell::from("")];
    cells.extend(
        matrix
            .header
            .sequence_numbers
            .iter()
            .take(visible)
            .map(|seq| TableCell::from(format!("{:>2}", seq % 100))),
    );
    Row::new(cells).style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD))
}

fn group_rows(group: &NodeGroup, visible: usize, selected: bool) -> Vec<Row<'static>> {
    let label_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let mut rows = Vec::new();
    for (i, bucket) in group.bucket_rows.iter().enumerate() {
        let node_label = if i == 0 { group.label.clone() } else { String::new() };
        rows.push(sequence_row(
            Span::styled(node_label, label_style),
            bucket.label.clone(),
            &bucket.cells,
            visible,
        ));
    }

    let mut checkpoint = vec![TableCell::from(""), TableCell::from("Checkpoints")];
    checkpoint.extend(
        checkpoint_cells(&group.checkpoint_row, visible)
            .into_iter()
            .map(|(text, style)| TableCell::from(text).style(style)),
    );
    rows.push(Row::new(checkpoint).style(Style::default().fg(Color::DarkGray)));

    for block in group.peer_blocks.iter().flatten() {
        for (i, peer_row) in block.rows.iter().enumerate() {
            let peer_label = if i == 0 { format!("  {}", block.label) } else { String::new() };
            rows.push(sequence_row(
                Span::styled(peer_label, Style::default().fg(Color::DarkGray)),
                peer_row.label.clone(),
                &peer_row.cells,
                visible,
            ));
        }
    }

    rows
}

fn sequence_row(label: Span<'static>, row_label: String, cells: &[Cell], visible: usize) -> Row<'static> {
    let mut out = vec![TableCell::from(label), TableCell::from(row_label)];
    out.extend(
        cells
            .iter()
            .take(visible)
            .map(|cell| TableCell::from(format!(" {}", cell.text())).style(cell_style(cell))),
    );
    Row::new(out)
}

/// Style for a matrix cell.
pub fn cell_style(cell: &Cell) -> Style {
    match cell {
        Cell::Offset => Style::default().bg(Color::Black),
        Cell::Padding => Style::default().bg(Color::DarkGray),
        Cell::Sequence(symbol) => match symbol.color {
            SymbolColor::Blank => Style::default(),
            SymbolColor::Progress => Style::default().fg(Color::Yellow),
            SymbolColor::Invalid => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            SymbolColor::Committed => Style::default().fg(Color::Green),
            SymbolColor::Unknown => Style::default().fg(Color::Magenta),
        },
        Cell::Peer { .. } => Style::default().fg(Color::Cyan),
    }
}

fn checkpoint_style(status: &CheckpointStatus) -> Style {
    match status {
        CheckpointStatus::Agreed => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        CheckpointStatus::NetworkQuorumOnly => Style::default().fg(Color::Cyan),
        CheckpointStatus::LocalOnly => Style::default().fg(Color::Yellow),
        CheckpointStatus::Pending { .. } => Style::default().fg(Color::DarkGray),
    }
}

/// One `(text, style)` per visible column for a checkpoint row.
pub fn checkpoint_cells(row: &CheckpointRow, visible: usize) -> Vec<(String, Style)> {
    let mut out = Vec::with_capacity(visible);
    for cell in &row.cells {
        let rule = cell.col_span.saturating_sub(1);
        out.extend(std::iter::repeat(("───".to_string(), Style::default().fg(Color::DarkGray))).take(rule));
        out.push((format!("{:>2}", cell.status.label()), checkpoint_style(&cell.status)));
    }
    out.truncate(visible);
    out
}
