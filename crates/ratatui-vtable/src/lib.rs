//! Virtualized tables for ratatui.
//!
//! Rows are composed from plain Rust values through [`Column`] accessors, split across the
//! width in proportion to each column's weight, and only drawn while they intersect the
//! viewport. See [`TableView`] for the entry point and [`TableProps`] for the render hooks.
pub use ratatui_vtable_core::*;

/// The types most tables need.
pub mod prelude {
    pub use ratatui_vtable_core::AttributeBag;
    pub use ratatui_vtable_core::BoxStyle;
    pub use ratatui_vtable_core::CellElement;
    pub use ratatui_vtable_core::CellProps;
    pub use ratatui_vtable_core::CellValue;
    pub use ratatui_vtable_core::Column;
    pub use ratatui_vtable_core::Primitive;
    pub use ratatui_vtable_core::Record;
    pub use ratatui_vtable_core::RowElement;
    pub use ratatui_vtable_core::RowProps;
    pub use ratatui_vtable_core::TableError;
    pub use ratatui_vtable_core::TableProps;
    pub use ratatui_vtable_core::TableView;
    pub use ratatui_vtable_core::TableViewOptions;
    pub use ratatui_vtable_core::TextAlign;
    pub use ratatui_vtable_core::Theme;
}
