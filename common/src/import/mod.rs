pub mod csv_import;
pub mod inference;

pub use csv_import::{import_csv, table_name_for, ImportReport};
pub use inference::{infer_column_types, ColumnType};
