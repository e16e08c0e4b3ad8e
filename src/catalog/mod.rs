mod error;
mod loader;
#[cfg(test)]
pub mod testing;
mod types;

pub use error::CatalogError;
pub use loader::Catalog;
pub use types::{CatalogRecord, TrackTarget};
