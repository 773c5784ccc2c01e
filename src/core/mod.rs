pub mod error;
pub mod types;
pub mod value;

pub use error::{BoxError, Error, Result};
pub use types::{Column, ColumnRole, Predicate, RawClause, ResourceDescriptor, Row};
pub use value::{DataType, Value};
