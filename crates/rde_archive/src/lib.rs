//! Archive expansion and OS-noise filtering (`spec.md` §4 C3).

pub mod cleaner;
pub mod expander;

pub use cleaner::is_noise;
pub use expander::{expand, is_archive, supported_extensions};
