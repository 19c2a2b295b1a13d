//! Reading simulation results tables.

pub mod table;

pub use table::{read_table, read_table_from, table_path};
