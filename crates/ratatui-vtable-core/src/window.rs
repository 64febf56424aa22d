//! The windowing delegate: decides which row indices are mounted for the current scroll
//! position and where each of them sits.

use crate::style::BoxStyle;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use virtualizer::Align;
use virtualizer::VirtualItem;
use virtualizer::Virtualizer;
use virtualizer::VirtualizerOptions;

type ExtentFn = Arc<dyn Fn(usize) -> u32 + Send + Sync>;

/// Extent (height in lines) of each row.
///
/// A variable extent carries a caller-chosen `generation`. Two variable sizes with the same
/// generation are treated as the same function, so props rebuilt every frame keep the cached
/// extents; bump the generation when the heights change.
#[derive(Clone)]
pub enum ItemSize {
    Fixed(u32),
    Variable { generation: u64, extent: ExtentFn },
}

impl ItemSize {
    pub fn fixed(size: u32) -> Self {
        ItemSize::Fixed(size)
    }

    pub fn variable(generation: u64, f: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        ItemSize::Variable {
            generation,
            extent: Arc::new(f),
        }
    }

    /// Resolves to a per-index function. A fixed size answers the same extent for every index.
    pub fn resolve(&self) -> ExtentFn {
        match self {
            ItemSize::Fixed(size) => {
                let size = *size;
                Arc::new(move |_: usize| size)
            }
            ItemSize::Variable { extent, .. } => extent.clone(),
        }
    }

    /// Whether two sizes would produce the same extents without calling them.
    pub fn same_as(&self, other: &ItemSize) -> bool {
        match (self, other) {
            (ItemSize::Fixed(a), ItemSize::Fixed(b)) => a == b,
            (
                ItemSize::Variable { generation: a, .. },
                ItemSize::Variable { generation: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

impl Default for ItemSize {
    fn default() -> Self {
        ItemSize::Fixed(1)
    }
}

impl From<u32> for ItemSize {
    fn from(size: u32) -> Self {
        ItemSize::Fixed(size)
    }
}

impl fmt::Debug for ItemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSize::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            ItemSize::Variable { generation, .. } => f
                .debug_struct("Variable")
                .field("generation", generation)
                .finish_non_exhaustive(),
        }
    }
}

/// Input of a windowing pass.
#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub item_count: usize,
    pub item_extent: ItemSize,
    pub viewport_width: u16,
    pub viewport_height: u16,
}

/// Per-item props handed to the render callback for each mounted index.
#[derive(Clone, Debug, PartialEq)]
pub struct ListChildProps {
    pub index: usize,
    /// Placement of the item: `top`/`height` on the scroll axis, `left`/`width` across it.
    pub style: BoxStyle,
    pub is_scrolling: Option<bool>,
}

/// Scroll geometry after a windowing pass, in lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowMetrics {
    pub offset: u64,
    pub viewport: u32,
    pub total: u64,
}

impl WindowMetrics {
    pub fn max_offset(&self) -> u64 {
        self.total.saturating_sub(self.viewport as u64)
    }

    /// Percentage of content scrolled past the bottom of the viewport, or `None` if everything
    /// fits.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 || self.viewport == 0 || self.total <= self.viewport as u64 {
            return None;
        }
        let bottom = self.offset.saturating_add(self.viewport as u64) as f64;
        Some((bottom / self.total as f64 * 100.0).round().clamp(0.0, 100.0) as u8)
    }

    /// Lines of a `track`-line scrollbar covered by the thumb, or `None` if everything fits.
    ///
    /// The thumb is at least one line long and sits at the bottom once the offset reaches
    /// [`WindowMetrics::max_offset`].
    pub fn thumb(&self, track: u16) -> Option<Range<u16>> {
        let viewport = self.viewport as u64;
        if track == 0 || self.total <= viewport {
            return None;
        }
        let track = track as u64;
        let len = ((viewport * track + self.total / 2) / self.total).clamp(1, track);
        let free = track - len;
        let max = self.max_offset();
        let start = (self.offset.min(max) * free + max / 2) / max;
        Some(start as u16..(start + len) as u16)
    }
}

/// Something that can window a list: given a config, call `render_item` once per mounted index.
///
/// A failing `render_item` stops the pass and its error is returned.
pub trait Windowing {
    fn window<R, E>(
        &mut self,
        config: &WindowConfig,
        render_item: impl FnMut(ListChildProps) -> Result<R, E>,
    ) -> Result<Vec<R>, E>;

    fn metrics(&self) -> WindowMetrics;
}

#[derive(Clone, Debug)]
pub struct VirtualWindowOptions {
    /// Extra items mounted beyond each edge of the viewport.
    pub overscan: usize,
    /// Report `is_scrolling` to row renderers. Off means rows see `None`.
    pub use_is_scrolling: bool,
    /// How long after the last scroll the window still counts as scrolling.
    pub scroll_debounce: Duration,
}

impl Default for VirtualWindowOptions {
    fn default() -> Self {
        Self {
            overscan: 2,
            use_is_scrolling: false,
            scroll_debounce: Duration::from_millis(150),
        }
    }
}

/// [`Windowing`] backed by the `virtualizer` crate.
///
/// Extents are estimated through the configured [`ItemSize`]; the virtualizer keeps its own
/// prefix sums, so a variable extent function is only consulted again after its generation
/// changes or [`VirtualWindow::reset_item_sizes`] is called.
pub struct VirtualWindow {
    options: VirtualWindowOptions,
    virtualizer: Virtualizer,
    item_size: ItemSize,
    offset: u64,
    viewport: u32,
    last_scroll: Option<Instant>,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self::with_options(VirtualWindowOptions::default())
    }
}

impl VirtualWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: VirtualWindowOptions) -> Self {
        let item_size = ItemSize::default();
        let virtualizer = Self::make_virtualizer(0, &item_size, options.overscan);
        Self {
            options,
            virtualizer,
            item_size,
            offset: 0,
            viewport: 0,
            last_scroll: None,
        }
    }

    pub fn options(&self) -> &VirtualWindowOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: VirtualWindowOptions) {
        self.virtualizer.set_overscan(options.overscan);
        self.options = options;
    }

    pub fn scroll_offset(&self) -> u64 {
        self.offset
    }

    /// Jumps to `offset`, clamped to the scrollable range.
    pub fn scroll_to(&mut self, offset: u64) {
        let next = offset.min(self.max_offset());
        if next != self.offset {
            self.offset = next;
            self.last_scroll = Some(Instant::now());
        }
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let next = (self.offset as i64).saturating_add(delta).max(0) as u64;
        self.scroll_to(next);
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.viewport.saturating_sub(1).max(1) as i64);
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.viewport.saturating_sub(1).max(1) as i64));
    }

    pub fn to_top(&mut self) {
        self.scroll_to(0);
    }

    pub fn to_bottom(&mut self) {
        self.scroll_to(u64::MAX);
    }

    /// Scrolls just enough to bring `index` into view, as of the last windowing pass.
    pub fn scroll_to_item(&mut self, index: usize, align: Align) {
        if self.virtualizer.count() == 0 {
            return;
        }
        self.virtualizer.set_scroll_offset(self.offset);
        self.virtualizer.scroll_to_index(index, align);
        self.scroll_to(self.virtualizer.scroll_offset());
    }

    /// Index of the row at the top of the viewport.
    pub fn first_visible(&self) -> Option<usize> {
        self.virtualizer.index_at_offset(self.offset)
    }

    pub fn is_scrolling(&self) -> bool {
        self.last_scroll
            .is_some_and(|t| t.elapsed() < self.options.scroll_debounce)
    }

    /// Drops every cached extent so the next pass asks the item size again.
    pub fn reset_item_sizes(&mut self) {
        self.virtualizer = Self::make_virtualizer(
            self.virtualizer.count(),
            &self.item_size,
            self.options.overscan,
        );
    }

    fn max_offset(&self) -> u64 {
        self.virtualizer
            .total_size()
            .saturating_sub(self.viewport as u64)
    }

    fn sync(&mut self, config: &WindowConfig) {
        if !self.item_size.same_as(&config.item_extent) {
            tracing::debug!(item_size = ?config.item_extent, "rebuilding item extent estimator");
            self.item_size = config.item_extent.clone();
            self.virtualizer =
                Self::make_virtualizer(config.item_count, &self.item_size, self.options.overscan);
        }
        self.virtualizer.set_count(config.item_count);
        self.virtualizer.set_overscan(self.options.overscan);
        self.viewport = config.viewport_height as u32;
        self.virtualizer.set_viewport_size(self.viewport);
        self.offset = self.offset.min(self.max_offset());
        self.virtualizer.set_scroll_offset(self.offset);
    }

    fn make_virtualizer(count: usize, item_size: &ItemSize, overscan: usize) -> Virtualizer {
        let extent = item_size.resolve();
        let mut opts = VirtualizerOptions::new(count, move |i| extent(i));
        opts.overscan = overscan;
        Virtualizer::new(opts)
    }
}

impl Windowing for VirtualWindow {
    fn window<R, E>(
        &mut self,
        config: &WindowConfig,
        mut render_item: impl FnMut(ListChildProps) -> Result<R, E>,
    ) -> Result<Vec<R>, E> {
        self.sync(config);
        let is_scrolling = self
            .options
            .use_is_scrolling
            .then(|| self.is_scrolling());

        let mut items: Vec<VirtualItem> = Vec::new();
        self.virtualizer.collect_virtual_items(&mut items);
        if let (Some(first), Some(last)) = (items.first(), items.last()) {
            tracing::trace!(
                first = first.index,
                last = last.index,
                offset = self.offset,
                "mounting rows"
            );
        }

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let style = BoxStyle::new()
                .top(item.start as i64 - self.offset as i64)
                .left(0)
                .width(config.viewport_width as u32)
                .height(item.size);
            out.push(render_item(ListChildProps {
                index: item.index,
                style,
                is_scrolling,
            })?);
        }
        Ok(out)
    }

    fn metrics(&self) -> WindowMetrics {
        WindowMetrics {
            offset: self.offset,
            viewport: self.viewport,
            total: self.virtualizer.total_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn config(count: usize, size: ItemSize, h: u16) -> WindowConfig {
        WindowConfig {
            item_count: count,
            item_extent: size,
            viewport_width: 20,
            viewport_height: h,
        }
    }

    fn mounted(w: &mut VirtualWindow, cfg: &WindowConfig) -> Vec<ListChildProps> {
        w.window(cfg, Ok::<_, Infallible>).unwrap_or_default()
    }

    #[test]
    fn fixed_size_mounts_visible_rows_plus_overscan() {
        let mut w = VirtualWindow::with_options(VirtualWindowOptions {
            overscan: 0,
            ..Default::default()
        });
        let cfg = config(100, ItemSize::fixed(1), 5);
        let items = mounted(&mut w, &cfg);
        let indices: Vec<usize> = items.iter().map(|i| i.index).collect();
        assert_eq!(&indices[..5], &[0, 1, 2, 3, 4]);
        assert!(indices.len() <= 6);
        assert_eq!(items[3].style.top, Some(3));
        assert_eq!(items[3].style.height, Some(1));
        assert_eq!(items[3].style.width, Some(20));
        assert_eq!(items[3].style.left, Some(0));
        assert_eq!(items[0].is_scrolling, None);
        assert_eq!(w.metrics().total, 100);
    }

    #[test]
    fn scrolling_shifts_tops_and_clamps() {
        let mut w = VirtualWindow::with_options(VirtualWindowOptions {
            overscan: 0,
            ..Default::default()
        });
        let cfg = config(10, ItemSize::fixed(2), 4);
        mounted(&mut w, &cfg);
        w.scroll_by(3);
        let items = mounted(&mut w, &cfg);
        assert_eq!(items.first().map(|i| i.index), Some(1));
        assert_eq!(items.first().and_then(|i| i.style.top), Some(-1));

        w.scroll_by(1_000);
        assert_eq!(w.scroll_offset(), 16);
        w.scroll_by(-1_000);
        assert_eq!(w.scroll_offset(), 0);
    }

    #[test]
    fn variable_sizes_are_asked_per_index() {
        let mut w = VirtualWindow::with_options(VirtualWindowOptions {
            overscan: 0,
            ..Default::default()
        });
        let size = ItemSize::variable(0, |i| if i % 2 == 0 { 1 } else { 3 });
        let cfg = config(4, size, 10);
        let items = mounted(&mut w, &cfg);
        let tops: Vec<Option<i64>> = items.iter().map(|i| i.style.top).collect();
        assert_eq!(tops, vec![Some(0), Some(1), Some(4), Some(5)]);
        assert_eq!(w.metrics().total, 8);
    }

    #[test]
    fn render_errors_stop_the_pass() {
        let mut w = VirtualWindow::new();
        let cfg = config(10, ItemSize::fixed(1), 5);
        let mut seen = 0;
        let res: Result<Vec<()>, &str> = w.window(&cfg, |p| {
            seen += 1;
            if p.index == 1 { Err("boom") } else { Ok(()) }
        });
        assert_eq!(res, Err("boom"));
        assert_eq!(seen, 2);
    }

    #[test]
    fn is_scrolling_is_reported_only_when_enabled() {
        let mut w = VirtualWindow::with_options(VirtualWindowOptions {
            use_is_scrolling: true,
            scroll_debounce: Duration::from_secs(60),
            ..Default::default()
        });
        let cfg = config(100, ItemSize::fixed(1), 5);
        let items = mounted(&mut w, &cfg);
        assert_eq!(items[0].is_scrolling, Some(false));
        w.scroll_by(2);
        let items = mounted(&mut w, &cfg);
        assert_eq!(items[0].is_scrolling, Some(true));
    }

    #[test]
    fn item_size_identity() {
        let f = ItemSize::variable(1, |_| 2);
        assert!(f.same_as(&f.clone()));
        assert!(f.same_as(&ItemSize::variable(1, |_| 5)));
        assert!(!f.same_as(&ItemSize::variable(2, |_| 2)));
        assert!(!f.same_as(&ItemSize::fixed(2)));
        assert!(ItemSize::fixed(3).same_as(&ItemSize::from(3)));
        assert_eq!((ItemSize::fixed(3).resolve())(99), 3);
    }

    #[test]
    fn extents_survive_a_fresh_size_with_the_same_generation() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::atomic::Ordering;

        const N: usize = 10_000;
        let calls = Arc::new(AtomicUsize::new(0));
        let size = |generation: u64, height: u32| {
            let calls = calls.clone();
            ItemSize::variable(generation, move |_| {
                calls.fetch_add(1, Ordering::Relaxed);
                height
            })
        };
        let mut w = VirtualWindow::new();

        mounted(&mut w, &config(N, size(0, 2), 10));
        let first = calls.load(Ordering::Relaxed);
        for _ in 0..3 {
            mounted(&mut w, &config(N, size(0, 2), 10));
        }
        assert!(calls.load(Ordering::Relaxed) - first < N);
        assert_eq!(w.metrics().total, 2 * N as u64);

        mounted(&mut w, &config(N, size(1, 3), 10));
        assert_eq!(w.metrics().total, 3 * N as u64);
    }

    #[test]
    fn metrics_percent() {
        let m = WindowMetrics {
            offset: 0,
            viewport: 10,
            total: 100,
        };
        assert_eq!(m.percent(), Some(10));
        assert_eq!(m.max_offset(), 90);
        let fits = WindowMetrics {
            offset: 0,
            viewport: 10,
            total: 5,
        };
        assert_eq!(fits.percent(), None);
        assert_eq!(fits.thumb(10), None);

        assert_eq!(m.thumb(10), Some(0..1));
        assert_eq!(m.thumb(0), None);
        let bottom = WindowMetrics { offset: 90, ..m };
        assert_eq!(bottom.thumb(10), Some(9..10));
        let half = WindowMetrics {
            offset: 20,
            viewport: 50,
            total: 100,
        };
        assert_eq!(half.thumb(4), Some(1..3));
    }
}
