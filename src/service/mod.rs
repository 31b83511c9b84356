//! Request validation: rule engine and per-payload rule tables.

pub mod schema;
mod validation;
pub use validation::{is_date, parse_date, FieldKind, RequestValidator, ValidationRule};
