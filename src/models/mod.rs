//! Domain value types shared by the services.
pub mod attribute_value;

pub use attribute_value::{AttributeValue, ValidatedValue, ValueCandidate};
