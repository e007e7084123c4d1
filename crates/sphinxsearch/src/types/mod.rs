//! Core types for index fields, filter values and lookup operators.

mod field;
mod lookup;
mod value;

pub use field::{AttrType, FieldDescriptor, FieldKind};
pub use lookup::{LOOKUP_SEP, LookupOp};
pub use value::{LookupValue, Value};
