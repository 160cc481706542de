pub mod csv;

pub use self::csv::{csv_file_name, write_table_csv, write_tables_csv};
