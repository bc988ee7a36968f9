//! The two invoice-generation engines (`spec.md` §4.C5).

pub mod generator;
pub mod overwrite;

pub use generator::{generate_from_schema, GenerateOptions};
pub use overwrite::{overwrite_invoice, OverwriteResult};
