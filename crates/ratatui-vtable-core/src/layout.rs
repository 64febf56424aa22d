//! Flex distribution and placement of composed rows on the terminal grid.
//!
//! Sizes are worked out in real numbers first and only then rounded to whole cells, so a row of
//! cells with weights `w_i` always ends up within one cell of `available * w_i / Σw`.

use crate::cell::CellElement;
use crate::row::RowElement;
use crate::style::AlignItems;
use crate::style::FlexDirection;
use crate::style::JustifyContent;
use ratatui::layout::Rect;

/// Flex factors of one item along the main axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlexItem {
    pub grow: f64,
    pub shrink: f64,
    pub basis: f64,
}

impl FlexItem {
    pub fn new(grow: f64, shrink: f64, basis: f64) -> Self {
        Self {
            grow: sanitize(grow),
            shrink: sanitize(shrink),
            basis: sanitize(basis),
        }
    }

    /// Factors of a cell. Unset factors fall back to grow 0, shrink 1 and a basis equal to the
    /// content size along the main axis.
    pub fn of_cell(cell: &CellElement, direction: FlexDirection) -> Self {
        let content = match direction {
            FlexDirection::Row => cell.body.width() as f64,
            FlexDirection::Column => 1.0,
        };
        Self::new(
            cell.style.flex_grow.unwrap_or(0.0),
            cell.style.flex_shrink.unwrap_or(1.0),
            cell.style.flex_basis.unwrap_or(content),
        )
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Splits `available` among `items` and returns real-valued sizes.
///
/// Positive free space is shared by `grow`, negative free space is taken back by `shrink`.
/// Shrinking is weighted by the shrink factor alone, which keeps items whose grow, shrink and
/// basis are equal strictly proportional in both directions. Sizes never go below zero.
pub fn distribute_exact(items: &[FlexItem], available: f64) -> Vec<f64> {
    let basis_total: f64 = items.iter().map(|i| i.basis).sum();
    let free = available - basis_total;

    if free > 0.0 {
        let grow_total: f64 = items.iter().map(|i| i.grow).sum();
        if grow_total > 0.0 {
            return items
                .iter()
                .map(|i| i.basis + free * i.grow / grow_total)
                .collect();
        }
    } else if free < 0.0 {
        let shrink_total: f64 = items.iter().map(|i| i.shrink).sum();
        if shrink_total > 0.0 {
            return items
                .iter()
                .map(|i| (i.basis + free * i.shrink / shrink_total).max(0.0))
                .collect();
        }
    }
    items.iter().map(|i| i.basis).collect()
}

/// Like [`distribute_exact`], rounded to whole cells.
///
/// Uses the largest-remainder method: every item gets the floor of its size, then the cells
/// left over go to the largest fractional parts (ties to the lower index). The result never
/// exceeds `available`.
pub fn distribute(items: &[FlexItem], available: u16) -> Vec<u16> {
    let exact = distribute_exact(items, available as f64);
    let target = (exact.iter().sum::<f64>().round() as u64).min(available as u64);

    let mut sizes: Vec<u64> = exact.iter().map(|v| v.floor() as u64).collect();
    let assigned: u64 = sizes.iter().sum();
    let mut leftover = target.saturating_sub(assigned);

    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for i in order {
        if leftover == 0 {
            break;
        }
        sizes[i] += 1;
        leftover -= 1;
    }

    sizes
        .into_iter()
        .map(|s| s.min(u16::MAX as u64) as u16)
        .collect()
}

/// Offsets of consecutive items of `sizes` within `available`, per `justify`.
pub fn justify_offsets(sizes: &[u16], available: u16, justify: JustifyContent) -> Vec<u16> {
    let used: u32 = sizes.iter().map(|&s| s as u32).sum();
    let extra = (available as u32).saturating_sub(used);
    let n = sizes.len() as u32;

    let (start, between) = match justify {
        JustifyContent::Start => (0, 0),
        JustifyContent::End => (extra, 0),
        JustifyContent::Center => (extra / 2, 0),
        JustifyContent::SpaceBetween if n > 1 => (0, extra / (n - 1)),
        JustifyContent::SpaceBetween => (0, 0),
        JustifyContent::SpaceAround if n > 0 => {
            let spacing = extra / n;
            (spacing / 2, spacing)
        }
        JustifyContent::SpaceAround => (0, 0),
    };

    let mut offsets = Vec::with_capacity(sizes.len());
    let mut at = start;
    for &size in sizes {
        offsets.push(at.min(u16::MAX as u32) as u16);
        at += size as u32 + between;
    }
    offsets
}

/// A row as it lands on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedRow {
    /// Visible part of the row box.
    pub rect: Rect,
    /// Lines of the row hidden above the viewport.
    pub clip_top: u32,
    pub cells: Vec<PlacedCell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedCell {
    /// Column position of the cell within its row.
    pub col: usize,
    /// Visible part of the cell box.
    pub rect: Rect,
    /// Full width of the cell box before clipping.
    pub width: u16,
    pub clip_top: u32,
    pub clip_left: u32,
}

/// Box in viewport-relative coordinates; may extend past any edge.
#[derive(Clone, Copy, Debug)]
struct Frame {
    x: i64,
    y: i64,
    w: i64,
    h: i64,
}

impl Frame {
    /// Intersects with `area` and converts to absolute coordinates, returning the clipped
    /// rect plus the amount cut from the left and top.
    fn clip(self, area: Rect) -> Option<(Rect, u32, u32)> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = (self.x + self.w).min(area.width as i64);
        let y1 = (self.y + self.h).min(area.height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let rect = Rect::new(
            area.x + x0 as u16,
            area.y + y0 as u16,
            (x1 - x0) as u16,
            (y1 - y0) as u16,
        );
        Some((rect, (x0 - self.x) as u32, (y0 - self.y) as u32))
    }
}

/// Places `row` inside `area` using its positioning style and lays its cells out.
///
/// Missing placement falls back to the top-left corner, full width and one line. Returns `None`
/// when no part of the row is visible.
pub fn place_row(row: &RowElement, area: Rect) -> Option<PlacedRow> {
    let style = &row.style;
    let frame = Frame {
        x: style.left.unwrap_or(0),
        y: style.top.unwrap_or(0),
        w: style.width.map(i64::from).unwrap_or(area.width as i64),
        h: style.height.map(i64::from).unwrap_or(1),
    };
    let (rect, _, clip_top) = frame.clip(area)?;

    let direction = style.flex_direction.unwrap_or(FlexDirection::Row);
    let justify = style.justify_content.unwrap_or(JustifyContent::Start);
    let align = style.align_items.unwrap_or(AlignItems::Stretch);

    let (main, cross) = match direction {
        FlexDirection::Row => (frame.w, frame.h),
        FlexDirection::Column => (frame.h, frame.w),
    };
    let main = main.clamp(0, u16::MAX as i64) as u16;

    let items: Vec<FlexItem> = row
        .cells
        .iter()
        .map(|c| FlexItem::of_cell(c, direction))
        .collect();
    let sizes = distribute(&items, main);
    let offsets = justify_offsets(&sizes, main, justify);

    let mut cells = Vec::with_capacity(row.cells.len());
    for (col, cell) in row.cells.iter().enumerate() {
        let size = sizes[col] as i64;
        let offset = offsets[col] as i64;
        let content_cross = match direction {
            FlexDirection::Row => 1,
            FlexDirection::Column => cell.body.width() as i64,
        };
        let (cross_offset, cross_size) = match align {
            AlignItems::Stretch => (0, cross),
            AlignItems::Start => (0, content_cross.min(cross)),
            AlignItems::Center => {
                let s = content_cross.min(cross);
                ((cross - s) / 2, s)
            }
            AlignItems::End => {
                let s = content_cross.min(cross);
                (cross - s, s)
            }
        };
        let cell_frame = match direction {
            FlexDirection::Row => Frame {
                x: frame.x + offset,
                y: frame.y + cross_offset,
                w: size,
                h: cross_size,
            },
            FlexDirection::Column => Frame {
                x: frame.x + cross_offset,
                y: frame.y + offset,
                w: cross_size,
                h: size,
            },
        };
        if let Some((rect, clip_left, clip_top)) = cell_frame.clip(area) {
            cells.push(PlacedCell {
                col,
                rect,
                width: cell_frame.w.clamp(0, u16::MAX as i64) as u16,
                clip_top,
                clip_left,
            });
        }
    }

    Some(PlacedRow {
        rect,
        clip_top,
        cells,
    })
}
