use ratatui::layout::Rect;
use ratatui::layout::Size;

/// Measures the area a table is given and reports size changes.
#[derive(Clone, Debug, Default)]
pub struct AutoSizer {
    last: Option<Size>,
}

impl AutoSizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the size of `area`, calling `on_resize` when it differs from the previous
    /// measurement. The first measurement counts as a change.
    pub fn measure(&mut self, area: Rect, on_resize: impl FnOnce(Size)) -> Size {
        let size = area.as_size();
        if self.last != Some(size) {
            tracing::debug!(width = size.width, height = size.height, "table resized");
            self.last = Some(size);
            on_resize(size);
        }
        size
    }

    pub fn last_size(&self) -> Option<Size> {
        self.last
    }
}
