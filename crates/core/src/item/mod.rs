//! Tracked items: the records list views are built from.

mod sanitize;
mod types;

pub use sanitize::{decode_records, sanitize_records, DataShapeError};
pub use types::*;
