pub mod calculations;
pub mod db;
pub mod models;
pub mod quota;
pub mod validation;

pub use db::repository::{HistoryRepository, RepositoryError};
pub use models::*;
