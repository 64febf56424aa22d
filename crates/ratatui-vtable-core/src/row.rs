//! Row composition: turns one record plus the column schema into a horizontal run of cells.

use crate::cell::CellElement;
use crate::cell::compose_cell;
use crate::column::Column;
use crate::error::Result;
use crate::error::TableError;
use crate::style::AlignItems;
use crate::style::AttributeBag;
use crate::style::BoxStyle;
use crate::style::FlexDirection;
use crate::style::JustifyContent;
use crate::value::CellValue;
use crate::value::Primitive;
use std::collections::BTreeMap;

/// What a row renderer receives.
///
/// `index` is the position in the full row sequence. `style` carries the placement assigned by
/// the windowing delegate and must end up in the rendered row, or rows will overlap.
#[derive(Debug)]
pub struct RowProps<'a, T> {
    pub index: usize,
    pub style: BoxStyle,
    pub data: &'a T,
    pub is_scrolling: Option<bool>,
}

/// What a custom cell renderer and the coercion function receive.
#[derive(Debug)]
pub struct CellProps<'a, T> {
    pub data_key: &'a str,
    pub cell_data: &'a CellValue,
    pub row_index: usize,
    pub col_index: usize,
    pub row_data: &'a T,
}

pub type RowRenderer<'a, T> = Box<dyn Fn(&RowProps<'_, T>, &[Column<T>]) -> RowElement + 'a>;
pub type CellRenderer<'a, T> = Box<dyn Fn(&CellProps<'_, T>) -> CellElement + 'a>;
pub type Primitize<'a, T> = Box<dyn Fn(&CellProps<'_, T>) -> Primitive + 'a>;

/// A composed row: container style plus its cells in column order.
#[derive(Clone, Debug, PartialEq)]
pub struct RowElement {
    pub index: usize,
    pub key: Option<String>,
    pub style: BoxStyle,
    pub attributes: BTreeMap<String, String>,
    pub cells: Vec<CellElement>,
}

impl RowElement {
    /// Starts a row from the props handed to a custom row renderer, keeping the windowing
    /// placement.
    pub fn from_props<T>(props: &RowProps<'_, T>) -> Self {
        Self {
            index: props.index,
            key: Some(props.index.to_string()),
            style: default_row_style().merge(&props.style),
            attributes: BTreeMap::new(),
            cells: Vec::new(),
        }
    }

    pub fn with_cells(mut self, cells: Vec<CellElement>) -> Self {
        self.cells = cells;
        self
    }

    pub fn push(&mut self, cell: CellElement) {
        self.cells.push(cell);
    }
}

/// How cells of a row are produced once the row itself is not overridden.
pub enum CellStrategy<'r, 'a, T> {
    Default {
        primitize: Option<&'r Primitize<'a, T>>,
    },
    Custom(&'r CellRenderer<'a, T>),
}

/// Pass-through options for [`compose_row`].
pub struct RowOptions<'r, 'a, T> {
    pub cells: CellStrategy<'r, 'a, T>,
    pub row_attributes: Option<&'r AttributeBag>,
    pub cell_attributes: Option<&'r AttributeBag>,
}

/// The resolved precedence of the three override points.
///
/// A custom row renderer short-circuits everything; otherwise a custom cell renderer
/// short-circuits each column; otherwise the default pipeline runs with optional coercion.
pub enum RowRenderStrategy<'r, 'a, T> {
    Default {
        primitize: Option<&'r Primitize<'a, T>>,
    },
    CustomRow(&'r RowRenderer<'a, T>),
    CustomCell(&'r CellRenderer<'a, T>),
}

impl<'r, 'a, T> RowRenderStrategy<'r, 'a, T> {
    pub fn resolve(
        custom_row: Option<&'r RowRenderer<'a, T>>,
        custom_cell: Option<&'r CellRenderer<'a, T>>,
        primitize: Option<&'r Primitize<'a, T>>,
    ) -> Self {
        match (custom_row, custom_cell) {
            (Some(row), _) => RowRenderStrategy::CustomRow(row),
            (None, Some(cell)) => RowRenderStrategy::CustomCell(cell),
            (None, None) => RowRenderStrategy::Default { primitize },
        }
    }

    /// The per-cell strategy, or `None` when a custom row renderer takes over.
    pub fn cell_strategy(&self) -> Option<CellStrategy<'r, 'a, T>> {
        match *self {
            RowRenderStrategy::Default { primitize } => Some(CellStrategy::Default { primitize }),
            RowRenderStrategy::CustomCell(f) => Some(CellStrategy::Custom(f)),
            RowRenderStrategy::CustomRow(_) => None,
        }
    }
}

/// Layout every row container starts from: a single horizontal line, cells stretched to the
/// row height, spare space spread around the cells.
pub fn default_row_style() -> BoxStyle {
    BoxStyle::new()
        .flex_direction(FlexDirection::Row)
        .justify_content(JustifyContent::SpaceAround)
        .align_items(AlignItems::Stretch)
}

/// Composes one row.
///
/// Each column is resolved independently: a custom cell renderer's output is used as-is;
/// otherwise the value is read, coerced when a coercion function exists (even if it is already
/// a string or number), and handed to [`compose_cell`]. A non-primitive value without a
/// coercion function fails the whole row before anything is returned.
pub fn compose_row<T>(
    props: &RowProps<'_, T>,
    columns: &[Column<T>],
    options: &RowOptions<'_, '_, T>,
) -> Result<RowElement> {
    let computed = default_row_style().merge(&props.style);
    let (style, attributes) = match options.row_attributes {
        Some(bag) => (computed.merge(&bag.style), bag.attributes.clone()),
        None => (computed, BTreeMap::new()),
    };

    let mut cells = Vec::with_capacity(columns.len());
    for (col_index, col) in columns.iter().enumerate() {
        let cell_data = col.value(props.data);
        let cell_props = CellProps {
            data_key: &col.field,
            cell_data: &cell_data,
            row_index: props.index,
            col_index,
            row_data: props.data,
        };
        let key = format!("{}{}", props.index, col.field);

        let cell = match options.cells {
            CellStrategy::Custom(render) => render(&cell_props),
            CellStrategy::Default { primitize } => {
                let content = match primitize {
                    Some(primitize) => primitize(&cell_props),
                    None => cell_data.as_primitive().ok_or_else(|| {
                        TableError::UncoercibleCellValue {
                            row: props.index,
                            column: col_index,
                            field: col.field.clone(),
                            kind: cell_data.kind(),
                        }
                    })?,
                };
                compose_cell(content, col.width, options.cell_attributes)
            }
        };
        cells.push(if cell.key.is_some() {
            cell
        } else {
            cell.with_key(key)
        });
    }

    Ok(RowElement {
        index: props.index,
        key: Some(props.index.to_string()),
        style,
        attributes,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellBody;
    use crate::style::TextAlign;
    use std::cell::Cell;

    struct Rec {
        id: u32,
        name: &'static str,
        tags: Vec<&'static str>,
    }

    fn columns() -> Vec<Column<Rec>> {
        vec![
            Column::new("id", "ID", 1.0, |r: &Rec| r.id.into()),
            Column::new("name", "Name", 2.0, |r: &Rec| r.name.into()),
            Column::new("tags", "Tags", 1.0, |r: &Rec| r.tags.clone().into()),
        ]
    }

    fn rec() -> Rec {
        Rec {
            id: 1,
            name: "Alice",
            tags: vec!["a", "b"],
        }
    }

    fn props(data: &Rec, index: usize) -> RowProps<'_, Rec> {
        RowProps {
            index,
            style: BoxStyle::new().top(3).left(0).width(40).height(1),
            data,
            is_scrolling: None,
        }
    }

    fn default_options<'r>() -> RowOptions<'r, 'static, Rec> {
        RowOptions {
            cells: CellStrategy::Default { primitize: None },
            row_attributes: None,
            cell_attributes: None,
        }
    }

    #[test]
    fn primitive_columns_render_without_coercion() {
        let data = rec();
        let cols = columns();
        let row = compose_row(&props(&data, 0), &cols[..2], &default_options()).unwrap();
        assert_eq!(row.cells.len(), 2);
        assert_eq!(
            row.cells[1].body,
            CellBody::Value(Primitive::from("Alice"))
        );
        assert_eq!(row.cells[1].text_align(), TextAlign::Left);
        assert_eq!(row.cells[1].style.flex_grow, Some(2.0));
        assert_eq!(row.cells[0].text_align(), TextAlign::Center);
        assert_eq!(row.cells[1].key.as_deref(), Some("0name"));
    }

    #[test]
    fn non_primitive_without_coercion_fails_with_location() {
        let data = rec();
        let cols = columns();
        let err = compose_row(&props(&data, 5), &cols, &default_options()).unwrap_err();
        assert_eq!(
            err,
            TableError::UncoercibleCellValue {
                row: 5,
                column: 2,
                field: "tags".to_string(),
                kind: "list",
            }
        );
    }

    #[test]
    fn coercion_is_authoritative_even_for_primitives() {
        let data = rec();
        let cols = columns();
        let primitize: Primitize<'_, Rec> = Box::new(|p: &CellProps<'_, Rec>| {
            if p.data_key == "tags" {
                Primitive::from(p.row_data.tags.join(","))
            } else {
                Primitive::from(format!("<{}>", p.col_index))
            }
        });
        let options = RowOptions {
            cells: CellStrategy::Default {
                primitize: Some(&primitize),
            },
            row_attributes: None,
            cell_attributes: None,
        };
        let row = compose_row(&props(&data, 0), &cols, &options).unwrap();
        assert_eq!(row.cells[0].body, CellBody::Value(Primitive::from("<0>")));
        assert_eq!(row.cells[2].body, CellBody::Value(Primitive::from("a,b")));
    }

    #[test]
    fn custom_cell_renderer_skips_coercion() {
        let data = rec();
        let cols = columns();
        let calls = Cell::new(0usize);
        let primitize: Primitize<'_, Rec> = Box::new(|_: &CellProps<'_, Rec>| {
            calls.set(calls.get() + 1);
            Primitive::from("x")
        });
        let render: CellRenderer<'_, Rec> =
            Box::new(|p: &CellProps<'_, Rec>| CellElement::text(p.cell_data.kind()));
        let strategy = RowRenderStrategy::resolve(None, Some(&render), Some(&primitize));
        let options = RowOptions {
            cells: strategy.cell_strategy().unwrap(),
            row_attributes: None,
            cell_attributes: None,
        };
        let row = compose_row(&props(&data, 0), &cols, &options).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(row.cells[2].body, CellBody::Value(Primitive::from("list")));
        assert_eq!(row.cells[2].style, BoxStyle::default());
    }

    #[test]
    fn row_style_keeps_window_placement_under_caller_style() {
        let data = rec();
        let cols = columns();
        let bag = AttributeBag::new()
            .style(BoxStyle::new().justify_content(JustifyContent::Start))
            .attribute("role", "row");
        let options = RowOptions {
            cells: CellStrategy::Default { primitize: None },
            row_attributes: Some(&bag),
            cell_attributes: None,
        };
        let row = compose_row(&props(&data, 2), &cols[..2], &options).unwrap();
        assert_eq!(row.style.top, Some(3));
        assert_eq!(row.style.width, Some(40));
        assert_eq!(row.style.height, Some(1));
        assert_eq!(row.style.flex_direction, Some(FlexDirection::Row));
        assert_eq!(row.style.align_items, Some(AlignItems::Stretch));
        assert_eq!(row.style.justify_content, Some(JustifyContent::Start));
        assert_eq!(row.attributes.get("role").map(String::as_str), Some("row"));
    }

    #[test]
    fn custom_row_renderer_wins_over_everything() {
        let render_row: RowRenderer<'_, Rec> =
            Box::new(|p: &RowProps<'_, Rec>, _: &[Column<Rec>]| RowElement::from_props(p));
        let render_cell: CellRenderer<'_, Rec> =
            Box::new(|_: &CellProps<'_, Rec>| CellElement::text("cell"));
        let strategy = RowRenderStrategy::resolve(Some(&render_row), Some(&render_cell), None);
        assert!(matches!(strategy, RowRenderStrategy::CustomRow(_)));
        assert!(strategy.cell_strategy().is_none());
    }
}
