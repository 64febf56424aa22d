//! `ratatui-vtable-core` renders large record collections as virtualized tables in a terminal.
//!
//! Only the rows intersecting the viewport are composed and painted, so the cost of a frame
//! depends on the viewport height, not on the number of rows.
//!
//! ## Pipeline
//!
//! Every frame runs the same steps:
//! - [`autosize::AutoSizer`] measures the area and reports size changes.
//! - A [`window::Windowing`] delegate decides which row indices are mounted and where.
//! - [`row::compose_row`] and [`cell::compose_cell`] turn each record into styled cells, unless a
//!   custom row or cell renderer takes over.
//! - [`layout::place_row`] splits each row among its cells in proportion to the column widths.
//! - [`paint`] writes the result into a ratatui [`Buffer`](ratatui::buffer::Buffer).
//!
//! [`view::TableView`] wires these together and owns the scroll state.
//!
//! ## Overrides
//!
//! [`table::TableProps`] accepts three hooks, checked in this order:
//! - `custom_row_renderer`: replaces the whole row; no cells are composed for it.
//! - `custom_cell_renderer`: replaces each cell; values are not coerced.
//! - `primitize_cell`: converts each value into a string or number before the default cell.
//!
//! Without any of them, a value that is neither a string nor a number fails the render with
//! [`TableError::UncoercibleCellValue`].
pub mod autosize;
pub mod cell;
pub mod column;
#[cfg(feature = "crossterm")]
pub mod crossterm_input;
pub mod error;
pub mod input;
pub mod layout;
pub mod paint;
pub mod row;
pub mod style;
pub mod table;
pub mod theme;
pub mod value;
pub mod view;
pub mod window;

pub use cell::CellBody;
pub use cell::CellElement;
pub use column::Column;
pub use error::Result;
pub use error::TableError;
pub use row::CellProps;
pub use row::RowElement;
pub use row::RowProps;
pub use style::AttributeBag;
pub use style::BoxStyle;
pub use style::TextAlign;
pub use table::TableProps;
pub use theme::Theme;
pub use value::CellValue;
pub use value::Primitive;
pub use value::Record;
pub use view::Hit;
pub use view::TableAction;
pub use view::TableView;
pub use view::TableViewOptions;
pub use virtualizer::Align;
pub use window::ItemSize;
pub use window::VirtualWindow;
pub use window::VirtualWindowOptions;
pub use window::Windowing;
