mod error;
mod loader;
pub mod tle;
mod types;

pub use error::ElementSetError;
pub use loader::{parse_element_sets, parse_tle_lines, ElementCatalog};
pub use tle::parse;
pub use types::{Classification, OrbitalElementSet};
