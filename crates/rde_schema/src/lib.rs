//! Schema parsing and invoice/metadata validation (`spec.md` §4.C2).
//!
//! # Modules
//!
//! - [`node`]: the schema walker's tagged variant (`SchemaNode`)
//! - [`schema`]: `InvoiceSchema`, parsed from `invoice.schema.json`
//! - [`metadata`]: `MetadataDocument`/`MetadataDefinition`, `MAX_VALUE_SIZE`
//! - [`validator`]: `validate_invoice`/`validate_metadata`

pub mod metadata;
pub mod node;
pub mod schema;
pub mod validator;

pub use metadata::{MetadataDefinition, MetadataDocument, MetadataFieldDef, MetadataValue, MAX_VALUE_SIZE};
pub use node::{FieldType, SchemaNode};
pub use schema::InvoiceSchema;
pub use validator::{merged_metadata_values, metadata_keys, validate_invoice, validate_metadata};
