pub mod catalog_file;
pub mod global;
pub mod loader;
pub mod service;

pub use catalog_file::{CatalogEntry, CatalogFile};
pub use global::GlobalConfig;
pub use loader::{ConfigLoader, GLOBAL_CONFIG_FILE};
pub use service::ServiceSection;
