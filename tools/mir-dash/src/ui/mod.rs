//! UI module - TUI rendering components.
//!
//! - `layout.rs`: header, body and footer
//! - `node_cards.rs`: per-node action counters
//! - `matrix_table.rs`: the aligned sequence matrix
//! - `widgets/`: reusable UI components

mod layout;
mod matrix_table;
mod node_cards;

pub mod widgets;

pub use layout::render;
pub use matrix_table::{cell_style, checkpoint_cells};
