//! Magic-variable `${...}` substitution (`spec.md` §4.C10).

pub mod context;
pub mod pattern;
pub mod substitute;

pub use context::MagicContext;
pub use pattern::MagicPattern;
pub use substitute::{substitute_document, substitute_string};
