pub mod container;
pub mod database;
pub mod external_services;

pub use container::AppContainer;
pub use database::{DbPool, create_connection_pool};
pub use external_services::OllamaClient;
