pub mod repository;

pub use repository::{HistoryRepository, RepositoryError};
