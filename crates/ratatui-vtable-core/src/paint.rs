use crate::cell::CellBody;
use crate::cell::CellElement;
use crate::layout::PlacedCell;
use crate::layout::PlacedRow;
use crate::row::RowElement;
use crate::style::TextAlign;
use crate::window::WindowMetrics;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

/// Paints a placed row: row background, then each cell's background and content.
pub fn paint_row(row: &RowElement, placed: &PlacedRow, buf: &mut Buffer, base: Style) {
    let row_style = patched(base, row.style.paint);
    buf.set_style(placed.rect, row_style);
    for pc in &placed.cells {
        if let Some(cell) = row.cells.get(pc.col) {
            paint_cell(cell, pc, buf, row_style);
        }
    }
}

fn patched(base: Style, paint: Option<Style>) -> Style {
    match paint {
        Some(paint) => base.patch(paint),
        None => base,
    }
}

fn paint_cell(cell: &CellElement, placed: &PlacedCell, buf: &mut Buffer, base: Style) {
    let style = patched(base, cell.style.paint);
    buf.set_style(placed.rect, style);
    // Content sits on the first line of the box; nothing to draw once that line is scrolled off.
    if placed.clip_top > 0 || placed.rect.width == 0 {
        return;
    }

    let content_w = cell.body.width().min(u16::MAX as usize) as u16;
    let align_off = match cell.text_align() {
        TextAlign::Left => 0,
        TextAlign::Center => placed.width.saturating_sub(content_w) / 2,
        TextAlign::Right => placed.width.saturating_sub(content_w),
    } as u32;

    let (x, start_col, max_cols) = if align_off >= placed.clip_left {
        let dx = align_off - placed.clip_left;
        if dx >= placed.rect.width as u32 {
            return;
        }
        (
            placed.rect.x + dx as u16,
            0,
            placed.rect.width - dx as u16,
        )
    } else {
        (
            placed.rect.x,
            placed.clip_left - align_off,
            placed.rect.width,
        )
    };

    match &cell.body {
        CellBody::Value(v) => {
            draw_str_clipped(x, placed.rect.y, start_col, max_cols, buf, &v.to_string(), style)
        }
        CellBody::Line(line) => {
            let style = style.patch(line.style);
            draw_spans_clipped(x, placed.rect.y, start_col, max_cols, buf, &line.spans, style)
        }
    }
}

/// Draws `input` starting `start_col` columns into the string, writing at most `max_cols`.
/// Wide characters cut by either edge are skipped.
pub fn draw_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    let mut cursor = ClipCursor::new(x, start_col, max_cols);
    for ch in input.chars() {
        if !cursor.put(buf, y, ch, style) {
            return;
        }
    }
}

pub fn draw_spans_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'_>],
    fallback_style: Style,
) {
    let mut cursor = ClipCursor::new(x, start_col, max_cols);
    for span in spans {
        let style = fallback_style.patch(span.style);
        for ch in span.content.chars() {
            if !cursor.put(buf, y, ch, style) {
                return;
            }
        }
    }
}

struct ClipCursor {
    x: u16,
    start_col: usize,
    max_cols: usize,
    col: usize,
    out_cols: usize,
}

impl ClipCursor {
    fn new(x: u16, start_col: u32, max_cols: u16) -> Self {
        Self {
            x,
            start_col: start_col as usize,
            max_cols: max_cols as usize,
            col: 0,
            out_cols: 0,
        }
    }

    /// Writes one char; returns `false` once the right edge is reached.
    fn put(&mut self, buf: &mut Buffer, y: u16, ch: char, style: Style) -> bool {
        let ch = if ch == '\t' || ch == '\n' { ' ' } else { ch };
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            return true;
        }
        if self.col < self.start_col {
            self.col += w;
            return true;
        }
        if self.out_cols + w > self.max_cols {
            return false;
        }

        let mut tmp = [0u8; 4];
        let dx = self.out_cols as u16;
        if let Some(cell) = buf.cell_mut((self.x + dx, y)) {
            cell.set_style(style);
            cell.set_symbol(ch.encode_utf8(&mut tmp));
        }
        if w == 2 {
            if let Some(cell) = buf.cell_mut((self.x + dx + 1, y)) {
                cell.set_style(style);
                cell.set_symbol("");
            }
        }
        self.out_cols += w;
        self.col += w;
        true
    }
}

/// One-column scrollbar beside the list viewport. The track stays blank when every row fits.
pub fn paint_scrollbar(area: Rect, buf: &mut Buffer, metrics: &WindowMetrics, style: Style) {
    buf.set_style(area, style);
    let thumb = metrics.thumb(area.height).unwrap_or(0..0);
    for dy in 0..area.height {
        let symbol = if thumb.contains(&dy) { "█" } else { " " };
        if let Some(cell) = buf.cell_mut((area.x, area.y + dy)) {
            cell.set_symbol(symbol);
        }
    }
}
