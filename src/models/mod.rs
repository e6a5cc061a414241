pub mod case;
pub mod enums;
pub mod report;
pub mod score;

pub use case::*;
pub use enums::*;
pub use report::*;
pub use score::*;

use thiserror::Error;

/// Raised when a stored string does not map to an enum variant.
#[derive(Error, Debug)]
#[error("invalid {field} value: {value}")]
pub struct InvalidEnumValue {
    pub field: String,
    pub value: String,
}
