// Value rules shared by every write path
pub mod attribute_validator;

// Catalog structure
pub mod attributes;
pub mod categories;

// Products and their attribute values
pub mod products;
