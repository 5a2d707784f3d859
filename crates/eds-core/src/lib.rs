//! EDS Core Types and Definitions
//!
//! This crate provides the data model shared by both conversion directions
//! of single-line diagram (EDS) documents. It includes:
//!
//! - **Attributes**: Loosely typed attribute values ([`attribute::AttrValue`])
//! - **Packed form**: The flat element list stored in `.eds` files ([`packed`] module)
//! - **Tree form**: The nested, human-editable document ([`tree`] module)
//! - **Schema**: Attribute defaults per element type ([`schema::Schema`])
//! - **Circuits**: Positional circuit labels and the reference label map ([`circuit`] module)

pub mod attribute;
pub mod circuit;
pub mod packed;
pub mod schema;
pub mod tree;

pub use attribute::{AttrValue, Attributes};
