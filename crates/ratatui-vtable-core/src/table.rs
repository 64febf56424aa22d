//! Table composition: binds the windowing delegate to the row composer.

use crate::cell::CellElement;
use crate::cell::compose_cell;
use crate::column::Column;
use crate::error::Result;
use crate::error::TableError;
use crate::row::CellProps;
use crate::row::CellRenderer;
use crate::row::CellStrategy;
use crate::row::Primitize;
use crate::row::RowElement;
use crate::row::RowOptions;
use crate::row::RowProps;
use crate::row::RowRenderStrategy;
use crate::row::RowRenderer;
use crate::row::compose_row;
use crate::row::default_row_style;
use crate::style::AttributeBag;
use crate::style::BoxStyle;
use crate::value::Primitive;
use crate::window::ItemSize;
use crate::window::ListChildProps;
use crate::window::WindowConfig;
use crate::window::WindowMetrics;
use crate::window::Windowing;
use ratatui::layout::Size;
use ratatui::style::Style;

pub type ResizeCallback<'a> = Box<dyn FnMut(Size) + 'a>;

/// Everything a table is configured with.
///
/// Only `rows`, `columns` and `item_size` are required; every hook is optional and falls back
/// to the default pipeline.
pub struct TableProps<'a, T> {
    pub rows: &'a [T],
    pub columns: &'a [Column<T>],
    pub item_size: ItemSize,
    pub custom_row_renderer: Option<RowRenderer<'a, T>>,
    pub custom_cell_renderer: Option<CellRenderer<'a, T>>,
    pub primitize_cell: Option<Primitize<'a, T>>,
    pub row_props: Option<AttributeBag>,
    pub cell_props: Option<AttributeBag>,
    pub on_resize: Option<ResizeCallback<'a>>,
    /// Base style of the table container.
    pub style: Style,
}

impl<'a, T> TableProps<'a, T> {
    pub fn new(rows: &'a [T], columns: &'a [Column<T>]) -> Self {
        Self {
            rows,
            columns,
            item_size: ItemSize::default(),
            custom_row_renderer: None,
            custom_cell_renderer: None,
            primitize_cell: None,
            row_props: None,
            cell_props: None,
            on_resize: None,
            style: Style::default(),
        }
    }

    pub fn item_size(mut self, size: u32) -> Self {
        self.item_size = ItemSize::Fixed(size);
        self
    }

    /// Per-index row height. The windowing delegate caches the answers for as long as
    /// `generation` stays the same, so pass a new generation whenever the heights change.
    pub fn item_size_fn(
        mut self,
        generation: u64,
        f: impl Fn(usize) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.item_size = ItemSize::variable(generation, f);
        self
    }

    pub fn item_size_with(mut self, size: ItemSize) -> Self {
        self.item_size = size;
        self
    }

    pub fn custom_row_renderer(
        mut self,
        f: impl Fn(&RowProps<'_, T>, &[Column<T>]) -> RowElement + 'a,
    ) -> Self {
        self.custom_row_renderer = Some(Box::new(f));
        self
    }

    pub fn custom_cell_renderer(mut self, f: impl Fn(&CellProps<'_, T>) -> CellElement + 'a) -> Self {
        self.custom_cell_renderer = Some(Box::new(f));
        self
    }

    pub fn primitize_cell(mut self, f: impl Fn(&CellProps<'_, T>) -> Primitive + 'a) -> Self {
        self.primitize_cell = Some(Box::new(f));
        self
    }

    pub fn row_props(mut self, bag: AttributeBag) -> Self {
        self.row_props = Some(bag);
        self
    }

    pub fn cell_props(mut self, bag: AttributeBag) -> Self {
        self.cell_props = Some(bag);
        self
    }

    pub fn on_resize(mut self, f: impl FnMut(Size) + 'a) -> Self {
        self.on_resize = Some(Box::new(f));
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// The override precedence for this configuration.
    pub fn strategy(&self) -> RowRenderStrategy<'_, 'a, T> {
        RowRenderStrategy::resolve(
            self.custom_row_renderer.as_ref(),
            self.custom_cell_renderer.as_ref(),
            self.primitize_cell.as_ref(),
        )
    }
}

/// The mounted slice of a table for one render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct MountedTable {
    /// Size of the list viewport (rows area, excluding header and scrollbar).
    pub viewport: Size,
    pub header: Option<RowElement>,
    pub rows: Vec<RowElement>,
    pub metrics: WindowMetrics,
}

/// Composes the rows that `window` mounts for a list viewport of `viewport` cells.
///
/// Every mounted index resolves its record, gets the window's placement, and goes to the custom
/// row renderer when one is configured, otherwise to [`compose_row`]. The first failing row
/// aborts the pass.
pub fn compose_rows<T, W: Windowing>(
    props: &TableProps<'_, T>,
    window: &mut W,
    viewport: Size,
) -> Result<Vec<RowElement>> {
    let config = WindowConfig {
        item_count: props.rows.len(),
        item_extent: props.item_size.clone(),
        viewport_width: viewport.width,
        viewport_height: viewport.height,
    };
    let row_props = |child: ListChildProps| RowProps {
        index: child.index,
        style: child.style,
        data: &props.rows[child.index],
        is_scrolling: child.is_scrolling,
    };

    let cells = match props.strategy() {
        RowRenderStrategy::CustomRow(render) => {
            return window.window(&config, |child| {
                Ok::<_, TableError>(render(&row_props(child), props.columns))
            });
        }
        RowRenderStrategy::CustomCell(render) => CellStrategy::Custom(render),
        RowRenderStrategy::Default { primitize } => CellStrategy::Default { primitize },
    };
    let options = RowOptions {
        cells,
        row_attributes: props.row_props.as_ref(),
        cell_attributes: props.cell_props.as_ref(),
    };
    window.window(&config, |child| {
        compose_row(&row_props(child), props.columns, &options).inspect_err(|err| {
            tracing::warn!(%err, "row composition aborted");
        })
    })
}

/// Builds the header row from the columns' `header_name`s.
pub fn compose_header<T>(columns: &[Column<T>], width: u16, style: Style) -> RowElement {
    let cells = columns
        .iter()
        .map(|col| {
            compose_cell(Primitive::Text(col.header_name.clone()), col.width, None)
                .with_key(format!("header{}", col.field))
        })
        .collect();
    RowElement {
        index: 0,
        key: Some("header".to_string()),
        style: default_row_style().merge(
            &BoxStyle::new()
                .top(0)
                .left(0)
                .width(width as u32)
                .height(1)
                .paint(style),
        ),
        attributes: Default::default(),
        cells,
    }
}

/// Composes a full table pass for a container of `size`.
///
/// The header (when shown) takes the first line and the scrollbar (when shown) the last
/// column; the rest is the list viewport handed to the windowing delegate.
pub fn compose_table<T, W: Windowing>(
    props: &TableProps<'_, T>,
    window: &mut W,
    size: Size,
    layout: TableLayout,
) -> Result<MountedTable> {
    let list_w = if layout.scrollbar && size.width >= 2 {
        size.width - 1
    } else {
        size.width
    };
    let header_h = if layout.header { size.height.min(1) } else { 0 };
    let viewport = Size::new(list_w, size.height - header_h);

    let header = (header_h > 0).then(|| compose_header(props.columns, list_w, layout.header_style));
    let rows = compose_rows(props, window, viewport)?;
    Ok(MountedTable {
        viewport,
        header,
        rows,
        metrics: window.metrics(),
    })
}

/// Chrome around the list viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableLayout {
    pub header: bool,
    pub scrollbar: bool,
    pub header_style: Style,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellBody;
    use crate::style::TextAlign;
    use crate::window::VirtualWindow;
    use crate::window::VirtualWindowOptions;
    use std::cell::Cell;

    struct Rec {
        id: u32,
        name: String,
    }

    fn rows(n: u32) -> Vec<Rec> {
        (0..n)
            .map(|i| Rec {
                id: i,
                name: format!("user{i}"),
            })
            .collect()
    }

    fn columns() -> Vec<Column<Rec>> {
        vec![
            Column::new("id", "ID", 1.0, |r: &Rec| r.id.into()),
            Column::new("name", "Name", 2.0, |r: &Rec| r.name.as_str().into()),
        ]
    }

    fn window() -> VirtualWindow {
        VirtualWindow::with_options(VirtualWindowOptions {
            overscan: 0,
            ..Default::default()
        })
    }

    #[test]
    fn mounts_only_visible_rows_with_their_records() {
        let data = rows(1_000);
        let cols = columns();
        let props = TableProps::new(&data, &cols);
        let mut w = window();
        let out = compose_rows(&props, &mut w, Size::new(30, 4)).unwrap();
        assert!((4..=5).contains(&out.len()));
        assert_eq!(out[2].index, 2);
        assert_eq!(out[2].cells[1].body, CellBody::Value(Primitive::from("user2")));
        assert_eq!(out[2].style.top, Some(2));
        assert_eq!(w.metrics().total, 1_000);
    }

    #[test]
    fn custom_row_renderer_bypasses_cells_and_coercion() {
        let data = rows(10);
        let cols = columns();
        let coerced = Cell::new(0usize);
        let props = TableProps::new(&data, &cols)
            .primitize_cell(|_| {
                coerced.set(coerced.get() + 1);
                Primitive::from("?")
            })
            .custom_cell_renderer(|_| CellElement::text("cell"))
            .custom_row_renderer(|p, cols| {
                RowElement::from_props(p).with_cells(vec![CellElement::text(format!(
                    "{} of {}",
                    p.data.name,
                    cols.len()
                ))])
            });
        let out = compose_rows(&props, &mut window(), Size::new(30, 3)).unwrap();
        assert_eq!(coerced.get(), 0);
        assert_eq!(out[1].cells.len(), 1);
        assert_eq!(out[1].cells[0].body, CellBody::Value(Primitive::from("user1 of 2")));
        assert_eq!(out[1].style.top, Some(1));
    }

    #[test]
    fn uncoercible_values_abort_the_pass() {
        struct Tagged {
            tags: Vec<&'static str>,
        }
        let data = vec![Tagged { tags: vec!["a"] }];
        let cols = vec![Column::new("tags", "Tags", 1.0, |r: &Tagged| r.tags.clone().into())];
        let props = TableProps::new(&data, &cols);
        let err = compose_rows(&props, &mut window(), Size::new(10, 3)).unwrap_err();
        assert!(matches!(
            err,
            TableError::UncoercibleCellValue { row: 0, column: 0, .. }
        ));
    }

    #[test]
    fn header_and_scrollbar_shrink_the_list_viewport() {
        let data = rows(3);
        let cols = columns();
        let props = TableProps::new(&data, &cols);
        let mounted = compose_table(
            &props,
            &mut window(),
            Size::new(31, 5),
            TableLayout {
                header: true,
                scrollbar: true,
                header_style: Style::default(),
            },
        )
        .unwrap();
        assert_eq!(mounted.viewport, Size::new(30, 4));
        let header = mounted.header.unwrap();
        assert_eq!(header.cells[0].body, CellBody::Value(Primitive::from("ID")));
        assert_eq!(header.cells[0].text_align(), TextAlign::Left);
        assert_eq!(header.style.width, Some(30));
        assert_eq!(mounted.rows.len(), 3);
        assert_eq!(mounted.rows[0].style.width, Some(30));
    }
}
