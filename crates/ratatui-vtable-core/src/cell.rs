//! Cell composition: box model and content of a single cell.

use crate::style::AttributeBag;
use crate::style::BoxStyle;
use crate::style::TextAlign;
use crate::style::merge_attributes;
use crate::value::Primitive;
use ratatui::text::Line;
use std::collections::BTreeMap;
use unicode_width::UnicodeWidthStr;

/// What a cell draws.
#[derive(Clone, Debug, PartialEq)]
pub enum CellBody {
    Value(Primitive),
    /// Pre-styled content, typically produced by a custom cell renderer.
    Line(Line<'static>),
}

impl CellBody {
    /// Display width of the content in terminal columns.
    pub fn width(&self) -> usize {
        match self {
            CellBody::Value(Primitive::Text(s)) => UnicodeWidthStr::width(s.as_str()),
            CellBody::Value(v) => v.to_string().width(),
            CellBody::Line(line) => line.width(),
        }
    }
}

/// A composed cell, ready for layout and painting.
#[derive(Clone, Debug, PartialEq)]
pub struct CellElement {
    pub key: Option<String>,
    pub body: CellBody,
    pub style: BoxStyle,
    pub attributes: BTreeMap<String, String>,
}

impl CellElement {
    /// A bare cell with no computed layout: it is sized by its content unless a style says
    /// otherwise.
    pub fn new(body: CellBody) -> Self {
        Self {
            key: None,
            body,
            style: BoxStyle::default(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(CellBody::Value(Primitive::Text(text.into())))
    }

    pub fn line(line: impl Into<Line<'static>>) -> Self {
        Self::new(CellBody::Line(line.into()))
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Effective text alignment (left unless a style says otherwise).
    pub fn text_align(&self) -> TextAlign {
        self.style.text_align.unwrap_or(TextAlign::Left)
    }
}

/// Composes the default cell for `content`.
///
/// Grow, shrink and basis are all set to `width`, so sibling cells end up sharing the row in
/// proportion to their widths. Numbers are centered and strings left-aligned; any field set in
/// `overrides.style` replaces the computed one and the remaining computed fields stay.
pub fn compose_cell(content: Primitive, width: f64, overrides: Option<&AttributeBag>) -> CellElement {
    let align = if content.is_number() {
        TextAlign::Center
    } else {
        TextAlign::Left
    };
    let computed = BoxStyle::new().flex(width).text_align(align);
    let (style, attributes) = merge_attributes(&computed, overrides);
    CellElement {
        key: None,
        body: CellBody::Value(content),
        style,
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_align_left_and_numbers_center() {
        let s = compose_cell(Primitive::from("Alice"), 2.0, None);
        assert_eq!(s.text_align(), TextAlign::Left);
        assert_eq!(s.style.flex_grow, Some(2.0));
        assert_eq!(s.style.flex_shrink, Some(2.0));
        assert_eq!(s.style.flex_basis, Some(2.0));

        let n = compose_cell(Primitive::from(42), 1.0, None);
        assert_eq!(n.text_align(), TextAlign::Center);
    }

    #[test]
    fn caller_alignment_overrides_but_keeps_flex() {
        let bag = AttributeBag::new()
            .style(BoxStyle::new().text_align(TextAlign::Right))
            .attribute("title", "total");
        let cell = compose_cell(Primitive::from(7), 3.0, Some(&bag));
        assert_eq!(cell.text_align(), TextAlign::Right);
        assert_eq!(cell.style.flex_grow, Some(3.0));
        assert_eq!(cell.style.flex_basis, Some(3.0));
        assert_eq!(cell.attributes.get("title").map(String::as_str), Some("total"));
    }

    #[test]
    fn body_width_counts_wide_chars() {
        assert_eq!(CellBody::Value(Primitive::from("你好")).width(), 4);
        assert_eq!(CellBody::Value(Primitive::from(1.5)).width(), 3);
        assert_eq!(CellBody::Line(Line::from("abc")).width(), 3);
    }
}
