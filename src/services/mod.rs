pub mod catalog_agent;
pub mod library_scanner;

pub use catalog_agent::{BatchFailure, BatchReport, CatalogAgent, CatalogError};
pub use library_scanner::{LibraryError, LibraryScanner, TitleDir, query_title};
