use crate::autosize::AutoSizer;
use crate::error::Result;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEventKind;
use crate::layout::place_row;
use crate::paint;
use crate::table::TableLayout;
use crate::table::TableProps;
use crate::table::compose_table;
use crate::theme::Theme;
use crate::window::VirtualWindow;
use crate::window::VirtualWindowOptions;
use crate::window::WindowMetrics;
use crate::window::Windowing;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use std::collections::BTreeMap;
use virtualizer::Align;

#[derive(Clone, Debug)]
pub struct TableViewOptions {
    /// Draw a header line with each column's `header_name`.
    pub show_header: bool,
    pub show_scrollbar: bool,
    pub header_style: Style,
    pub scrollbar_style: Style,
    pub window: VirtualWindowOptions,
}

impl Default for TableViewOptions {
    fn default() -> Self {
        Self {
            show_header: false,
            show_scrollbar: true,
            header_style: Style::default().add_modifier(Modifier::BOLD),
            scrollbar_style: Style::default(),
            window: VirtualWindowOptions::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableAction {
    None,
    Redraw,
    /// A left click landed on a mounted row.
    Clicked { row: usize, col: Option<usize> },
}

/// Result of [`TableView::hit_test`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit<'a> {
    pub row: usize,
    /// Column under the point, or `None` for row space between cells.
    pub col: Option<usize>,
    pub row_attributes: &'a BTreeMap<String, String>,
    pub cell_attributes: Option<&'a BTreeMap<String, String>>,
}

#[derive(Clone, Debug)]
struct HitRow {
    index: usize,
    rect: Rect,
    attributes: BTreeMap<String, String>,
    cells: Vec<HitCell>,
}

#[derive(Clone, Debug)]
struct HitCell {
    col: usize,
    rect: Rect,
    attributes: BTreeMap<String, String>,
}

/// A virtualized table drawn into a ratatui buffer.
///
/// The view owns the scroll state and the size tracker; rows, columns and renderer hooks come
/// in through [`TableProps`] on every frame, so the data never has to be copied into the view.
///
/// ```no_run
/// # use ratatui::{buffer::Buffer, layout::Rect};
/// # use ratatui_vtable_core::{Column, TableProps, TableView, Theme};
/// struct User { name: String, age: u32 }
///
/// let users = vec![User { name: "Ada".into(), age: 36 }];
/// let columns = vec![
///     Column::new("name", "Name", 2.0, |u: &User| u.name.as_str().into()),
///     Column::new("age", "Age", 1.0, |u: &User| u.age.into()),
/// ];
/// let mut view = TableView::new();
/// let mut buf = Buffer::empty(Rect::new(0, 0, 40, 10));
/// view.render(buf.area, &mut buf, &Theme::default(), &mut TableProps::new(&users, &columns))
///     .unwrap();
/// ```
pub struct TableView {
    options: TableViewOptions,
    window: VirtualWindow,
    sizer: AutoSizer,
    hits: Vec<HitRow>,
}

impl Default for TableView {
    fn default() -> Self {
        Self::with_options(TableViewOptions::default())
    }
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TableViewOptions) -> Self {
        Self {
            window: VirtualWindow::with_options(options.window.clone()),
            options,
            sizer: AutoSizer::new(),
            hits: Vec::new(),
        }
    }

    pub fn options(&self) -> &TableViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TableViewOptions) {
        self.window.set_options(options.window.clone());
        self.options = options;
    }

    pub fn window(&self) -> &VirtualWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut VirtualWindow {
        &mut self.window
    }

    pub fn metrics(&self) -> WindowMetrics {
        self.window.metrics()
    }

    pub fn scroll_offset(&self) -> u64 {
        self.window.scroll_offset()
    }

    pub fn scroll_to(&mut self, offset: u64) {
        self.window.scroll_to(offset);
    }

    pub fn scroll_by(&mut self, delta: i64) {
        self.window.scroll_by(delta);
    }

    pub fn page_up(&mut self) {
        self.window.page_up();
    }

    pub fn page_down(&mut self) {
        self.window.page_down();
    }

    pub fn to_top(&mut self) {
        self.window.to_top();
    }

    pub fn to_bottom(&mut self) {
        self.window.to_bottom();
    }

    pub fn scroll_to_item(&mut self, index: usize, align: Align) {
        self.window.scroll_to_item(index, align);
    }

    pub fn handle_event(&mut self, event: InputEvent) -> TableAction {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(m) => match m.kind {
                MouseEventKind::ScrollDown => self.scrolled(|v| v.scroll_by(3)),
                MouseEventKind::ScrollUp => self.scrolled(|v| v.scroll_by(-3)),
                MouseEventKind::Down(MouseButton::Left) => match self.hit_test(m.x, m.y) {
                    Some(hit) => TableAction::Clicked {
                        row: hit.row,
                        col: hit.col,
                    },
                    None => TableAction::None,
                },
                MouseEventKind::Down(_) => TableAction::None,
            },
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> TableAction {
        let half_page = (self.window.metrics().viewport / 2).max(1) as i64;
        if key.modifiers.ctrl && !key.modifiers.alt {
            return match key.code {
                KeyCode::Char('d') => self.scrolled(|v| v.scroll_by(half_page)),
                KeyCode::Char('u') => self.scrolled(|v| v.scroll_by(-half_page)),
                _ => TableAction::None,
            };
        }
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.scrolled(|v| v.scroll_by(1)),
            KeyCode::Up | KeyCode::Char('k') => self.scrolled(|v| v.scroll_by(-1)),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scrolled(VirtualWindow::page_down),
            KeyCode::PageUp => self.scrolled(VirtualWindow::page_up),
            KeyCode::Home | KeyCode::Char('g') => self.scrolled(VirtualWindow::to_top),
            KeyCode::End | KeyCode::Char('G') => self.scrolled(VirtualWindow::to_bottom),
            _ => TableAction::None,
        }
    }

    fn scrolled(&mut self, f: impl FnOnce(&mut VirtualWindow)) -> TableAction {
        let before = self.window.scroll_offset();
        f(&mut self.window);
        if self.window.scroll_offset() == before {
            TableAction::None
        } else {
            TableAction::Redraw
        }
    }

    /// Measures `area`, composes the visible rows and paints them.
    ///
    /// Composition finishes before anything is written, so on error `buf` is left as it was.
    pub fn render<T>(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        theme: &Theme,
        props: &mut TableProps<'_, T>,
    ) -> Result<()> {
        let _span = tracing::debug_span!(
            "table_render",
            rows = props.rows.len(),
            columns = props.columns.len()
        )
        .entered();

        let on_resize = &mut props.on_resize;
        let size = self.sizer.measure(area, |size| {
            if let Some(cb) = on_resize.as_mut() {
                cb(size);
            }
        });
        if size.width == 0 || size.height == 0 {
            self.hits.clear();
            return Ok(());
        }

        let mounted = compose_table(
            props,
            &mut self.window,
            size,
            TableLayout {
                header: self.options.show_header,
                scrollbar: self.options.show_scrollbar,
                header_style: self.options.header_style,
            },
        )?;

        let base_style = if props.style == Style::default() {
            theme.text_primary
        } else {
            props.style
        };
        let header_h = size.height - mounted.viewport.height;
        let header_area = Rect::new(area.x, area.y, mounted.viewport.width, header_h);
        let body_area = Rect::new(
            area.x,
            area.y + header_h,
            mounted.viewport.width,
            mounted.viewport.height,
        );
        buf.set_style(area, base_style);

        if let Some(header) = &mounted.header {
            let header_base = base_style.patch(theme.accent);
            if let Some(placed) = place_row(header, header_area) {
                paint::paint_row(header, &placed, buf, header_base);
            }
        }

        self.hits.clear();
        for row in &mounted.rows {
            let Some(placed) = place_row(row, body_area) else {
                continue;
            };
            paint::paint_row(row, &placed, buf, base_style);
            self.hits.push(HitRow {
                index: row.index,
                rect: placed.rect,
                attributes: row.attributes.clone(),
                cells: placed
                    .cells
                    .iter()
                    .map(|pc| HitCell {
                        col: pc.col,
                        rect: pc.rect,
                        attributes: row
                            .cells
                            .get(pc.col)
                            .map(|c| c.attributes.clone())
                            .unwrap_or_default(),
                    })
                    .collect(),
            });
        }

        if self.options.show_scrollbar && mounted.viewport.width < size.width {
            let scrollbar_style = if self.options.scrollbar_style == Style::default() {
                theme.text_muted
            } else {
                self.options.scrollbar_style
            };
            paint::paint_scrollbar(
                Rect::new(
                    area.x + mounted.viewport.width,
                    body_area.y,
                    1,
                    body_area.height,
                ),
                buf,
                &mounted.metrics,
                scrollbar_style,
            );
        }
        Ok(())
    }

    /// Resolves a screen position against the last rendered frame.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<Hit<'_>> {
        let pos = ratatui::layout::Position::new(x, y);
        let row = self.hits.iter().rev().find(|r| r.rect.contains(pos))?;
        let cell = row.cells.iter().find(|c| c.rect.contains(pos));
        Some(Hit {
            row: row.index,
            col: cell.map(|c| c.col),
            row_attributes: &row.attributes,
            cell_attributes: cell.map(|c| &c.attributes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::style::AttributeBag;
    use crate::value::CellValue;
    use ratatui::layout::Size;

    struct Rec {
        id: u32,
        tags: Vec<&'static str>,
    }

    fn data(n: u32) -> Vec<Rec> {
        (0..n).map(|id| Rec { id, tags: vec!["a", "b"] }).collect()
    }

    fn columns() -> Vec<Column<Rec>> {
        vec![
            Column::new("id", "ID", 1.0, |r: &Rec| r.id.into()),
            Column::new("tags", "Tags", 1.0, |r: &Rec| r.tags.clone().into()),
        ]
    }

    fn line_of(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn error_leaves_buffer_untouched() {
        let rows = data(5);
        let cols = columns();
        let mut view = TableView::new();
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 3));
        let before = buf.clone();
        let err = view
            .render(buf.area, &mut buf, &Theme::default(), &mut TableProps::new(&rows, &cols))
            .unwrap_err();
        assert!(err.to_string().contains("row 0, column 1"));
        assert_eq!(buf, before);
    }

    #[test]
    fn renders_header_rows_and_scrollbar() {
        let rows = data(50);
        let cols = columns();
        let mut view = TableView::with_options(TableViewOptions {
            show_header: true,
            ..Default::default()
        });
        let mut buf = Buffer::empty(Rect::new(0, 0, 11, 4));
        let mut props = TableProps::new(&rows, &cols).primitize_cell(|p| match p.cell_data {
            CellValue::List(items) => items
                .iter()
                .filter_map(CellValue::as_str)
                .collect::<Vec<_>>()
                .join(",")
                .into(),
            other => other.as_primitive().unwrap_or_else(|| "".into()),
        });
        view.render(buf.area, &mut buf, &Theme::default(), &mut props)
            .unwrap();
        assert_eq!(line_of(&buf, 0), "ID   Tags  ");
        assert_eq!(line_of(&buf, 1), "  0  a,b  █");
        assert_eq!(line_of(&buf, 3), "  2  a,b   ");

        view.scroll_by(10);
        view.render(buf.area, &mut buf, &Theme::default(), &mut props)
            .unwrap();
        assert_eq!(line_of(&buf, 1), " 10  a,b  █");
    }

    #[test]
    fn resize_callback_fires_once_per_distinct_size() {
        let rows = data(3);
        let cols = columns();
        let mut seen = Vec::new();
        {
            let mut props = TableProps::new(&rows, &cols)
                .primitize_cell(|p| p.cell_data.as_primitive().unwrap_or_else(|| "".into()))
                .on_resize(|s| seen.push(s));
            let mut view = TableView::new();
            let mut buf = Buffer::empty(Rect::new(0, 0, 20, 5));
            for area in [
                Rect::new(0, 0, 20, 5),
                Rect::new(0, 0, 20, 5),
                Rect::new(0, 0, 10, 5),
            ] {
                view.render(area, &mut buf, &Theme::default(), &mut props)
                    .unwrap();
            }
        }
        assert_eq!(seen, vec![Size::new(20, 5), Size::new(10, 5)]);
    }

    #[test]
    fn keys_scroll_and_clicks_resolve_rows() {
        use crate::input::MouseEvent;

        let rows = data(100);
        let cols = columns();
        let mut view = TableView::new();
        let mut buf = Buffer::empty(Rect::new(0, 0, 11, 10));
        let mut props = TableProps::new(&rows, &cols)
            .primitize_cell(|p| p.cell_data.as_primitive().unwrap_or_else(|| "".into()));
        view.render(buf.area, &mut buf, &Theme::default(), &mut props)
            .unwrap();

        let key = |code| InputEvent::Key(KeyEvent::new(code));
        assert_eq!(view.handle_event(key(KeyCode::Up)), TableAction::None);
        assert_eq!(view.handle_event(key(KeyCode::Char('j'))), TableAction::Redraw);
        assert_eq!(view.handle_event(key(KeyCode::PageDown)), TableAction::Redraw);
        assert_eq!(view.scroll_offset(), 1 + 9);
        assert_eq!(view.handle_event(key(KeyCode::End)), TableAction::Redraw);
        assert_eq!(view.scroll_offset(), 90);

        view.handle_event(key(KeyCode::Home));
        view.render(buf.area, &mut buf, &Theme::default(), &mut props)
            .unwrap();
        let click = InputEvent::Mouse(MouseEvent {
            x: 1,
            y: 2,
            kind: MouseEventKind::Down(MouseButton::Left),
        });
        assert_eq!(
            view.handle_event(click),
            TableAction::Clicked {
                row: 2,
                col: Some(0)
            }
        );
    }

    #[test]
    fn hit_test_reports_indices_and_attributes() {
        let rows = data(10);
        let cols = columns();
        let mut view = TableView::with_options(TableViewOptions {
            show_scrollbar: false,
            ..Default::default()
        });
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 3));
        let mut props = TableProps::new(&rows, &cols)
            .primitize_cell(|p| p.cell_data.as_primitive().unwrap_or_else(|| "".into()))
            .row_props(AttributeBag::new().attribute("role", "row"))
            .cell_props(AttributeBag::new().attribute("role", "cell"));
        view.scroll_to(4);
        view.render(buf.area, &mut buf, &Theme::default(), &mut props)
            .unwrap();
        // Nothing is scrollable before the first render.
        view.scroll_to(4);
        view.render(buf.area, &mut buf, &Theme::default(), &mut props)
            .unwrap();

        let hit = view.hit_test(7, 1).unwrap();
        assert_eq!(hit.row, 5);
        assert_eq!(hit.col, Some(1));
        assert_eq!(hit.row_attributes.get("role").map(String::as_str), Some("row"));
        assert_eq!(
            hit.cell_attributes
                .and_then(|a| a.get("role"))
                .map(String::as_str),
            Some("cell")
        );
        assert!(view.hit_test(20, 1).is_none());
    }
}
