pub mod client;
pub mod error;
pub mod filter;
pub mod retry;
pub mod types;

pub use client::SearchClient;
pub use error::CatalogError;
pub use filter::project_results;
pub use types::{Pagination, SearchResponse, SearchResult};
