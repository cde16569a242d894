pub mod result_set;
pub mod row;

pub use result_set::ResultSet;
pub use row::{KeyedRows, Record, RowKey, build_record, key_rows};
