use thiserror::Error;

/// Errors raised while composing a table.
///
/// There is exactly one failure mode: a column resolved to a value that cannot be drawn as
/// text and no coercion function was configured. This is a caller configuration defect, so it
/// is surfaced immediately instead of rendering a partial row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error(
        "cannot render a non-primitive ({kind}) cell in row {row}, column {column} (field `{field}`); \
         supply `primitize_cell` to convert it into a string or number"
    )]
    UncoercibleCellValue {
        row: usize,
        column: usize,
        field: String,
        kind: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_row_and_column() {
        let err = TableError::UncoercibleCellValue {
            row: 3,
            column: 1,
            field: "tags".to_string(),
            kind: "list",
        };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("column 1"));
        assert!(msg.contains("`tags`"));
    }
}
