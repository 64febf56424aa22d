use crate::value::CellValue;
use crate::value::Record;
use std::fmt;
use std::sync::Arc;

type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// One column of the table schema.
///
/// `width` is a relative weight: cells of a row share the row's width in proportion to their
/// column weights. The table never checks that weights add up to anything in particular.
pub struct Column<T> {
    pub field: String,
    pub header_name: String,
    pub width: f64,
    accessor: Accessor<T>,
}

impl<T> Column<T> {
    /// Creates a column whose value is read by `accessor`.
    pub fn new(
        field: impl Into<String>,
        header_name: impl Into<String>,
        width: f64,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            field: field.into(),
            header_name: header_name.into(),
            width,
            accessor: Arc::new(accessor),
        }
    }

    /// Reads this column's value out of `row`.
    pub fn value(&self, row: &T) -> CellValue {
        (self.accessor)(row)
    }
}

impl<T: Record> Column<T> {
    /// Creates a column that looks `field` up by name on each row.
    pub fn keyed(field: impl Into<String>, header_name: impl Into<String>, width: f64) -> Self {
        let field = field.into();
        let key = field.clone();
        Self {
            field,
            header_name: header_name.into(),
            width,
            accessor: Arc::new(move |row: &T| row.field(&key)),
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            header_name: self.header_name.clone(),
            width: self.width,
            accessor: self.accessor.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("field", &self.field)
            .field("header_name", &self.header_name)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct User {
        id: u32,
        name: String,
    }

    #[test]
    fn accessor_reads_typed_rows() {
        let id = Column::new("id", "ID", 1.0, |u: &User| u.id.into());
        let name = Column::new("name", "Name", 2.0, |u: &User| u.name.as_str().into());
        let row = User {
            id: 1,
            name: "Alice".to_string(),
        };
        assert_eq!(id.value(&row), CellValue::Number(1.0));
        assert_eq!(name.value(&row), CellValue::from("Alice"));
    }

    #[test]
    fn keyed_columns_read_records_by_field() {
        let col: Column<BTreeMap<String, CellValue>> = Column::keyed("name", "Name", 2.0);
        let mut row = BTreeMap::new();
        row.insert("name".to_string(), CellValue::from("Bob"));
        assert_eq!(col.value(&row), CellValue::from("Bob"));
        assert_eq!(col.clone().field, "name");
    }
}
