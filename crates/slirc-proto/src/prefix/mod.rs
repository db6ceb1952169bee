//! Message source prefixes.

mod types;

pub use self::types::Source;
