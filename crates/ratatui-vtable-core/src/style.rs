//! Box styles and attribute bags.
//!
//! Every layer of the pipeline computes a [`BoxStyle`] and then lets a caller-supplied style sit
//! on top of it. Merging is always per field: a field set by the overlay replaces the computed
//! one, fields the overlay leaves unset keep their computed value. Nothing is ever dropped by
//! merging, which is what keeps the windowing positions intact under a caller's row style.

use ratatui::style::Style;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    Center,
    End,
    Stretch,
}

/// Layout and paint properties of a row or cell box.
///
/// Positions (`top`, `left`) are relative to the list viewport and may be negative for rows
/// scrolled partially out of view. `width: None` means "fill the container".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoxStyle {
    pub top: Option<i64>,
    pub left: Option<i64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub flex_direction: Option<FlexDirection>,
    pub justify_content: Option<JustifyContent>,
    pub align_items: Option<AlignItems>,
    pub flex_grow: Option<f64>,
    pub flex_shrink: Option<f64>,
    pub flex_basis: Option<f64>,
    pub text_align: Option<TextAlign>,
    pub paint: Option<Style>,
}

impl BoxStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `self` with every field that `overlay` sets replaced by the overlay's value.
    ///
    /// `paint` is merged with [`Style::patch`], so foreground, background and modifiers are
    /// also resolved individually.
    pub fn merge(&self, overlay: &BoxStyle) -> BoxStyle {
        BoxStyle {
            top: overlay.top.or(self.top),
            left: overlay.left.or(self.left),
            width: overlay.width.or(self.width),
            height: overlay.height.or(self.height),
            flex_direction: overlay.flex_direction.or(self.flex_direction),
            justify_content: overlay.justify_content.or(self.justify_content),
            align_items: overlay.align_items.or(self.align_items),
            flex_grow: overlay.flex_grow.or(self.flex_grow),
            flex_shrink: overlay.flex_shrink.or(self.flex_shrink),
            flex_basis: overlay.flex_basis.or(self.flex_basis),
            text_align: overlay.text_align.or(self.text_align),
            paint: match (self.paint, overlay.paint) {
                (Some(base), Some(over)) => Some(base.patch(over)),
                (base, over) => over.or(base),
            },
        }
    }

    pub fn top(mut self, top: i64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn left(mut self, left: i64) -> Self {
        self.left = Some(left);
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn flex_direction(mut self, direction: FlexDirection) -> Self {
        self.flex_direction = Some(direction);
        self
    }

    pub fn justify_content(mut self, justify: JustifyContent) -> Self {
        self.justify_content = Some(justify);
        self
    }

    pub fn align_items(mut self, align: AlignItems) -> Self {
        self.align_items = Some(align);
        self
    }

    /// Sets grow, shrink and basis to the same factor.
    pub fn flex(mut self, factor: f64) -> Self {
        self.flex_grow = Some(factor);
        self.flex_shrink = Some(factor);
        self.flex_basis = Some(factor);
        self
    }

    pub fn flex_grow(mut self, grow: f64) -> Self {
        self.flex_grow = Some(grow);
        self
    }

    pub fn flex_shrink(mut self, shrink: f64) -> Self {
        self.flex_shrink = Some(shrink);
        self
    }

    pub fn flex_basis(mut self, basis: f64) -> Self {
        self.flex_basis = Some(basis);
        self
    }

    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    pub fn paint(mut self, style: Style) -> Self {
        self.paint = Some(style);
        self
    }
}

/// Caller-supplied overrides for a row or cell container.
///
/// `style` is merged over the computed style; `attributes` are carried through untouched and
/// surface again through hit testing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeBag {
    pub style: BoxStyle,
    pub attributes: BTreeMap<String, String>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Applies an optional attribute bag on top of a computed style.
///
/// Returns the merged style and the pass-through attributes.
pub fn merge_attributes(
    computed: &BoxStyle,
    overrides: Option<&AttributeBag>,
) -> (BoxStyle, BTreeMap<String, String>) {
    match overrides {
        Some(bag) => (computed.merge(&bag.style), bag.attributes.clone()),
        None => (computed.clone(), BTreeMap::new()),
    }
}
