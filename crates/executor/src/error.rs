use thiserror::Error;

use common::error::Error as ExchangeError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigLoadError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("User {user_id} wishes for unknown item {item_id}.")]
    MissingItem { user_id: String, item_id: String },

    #[error("Item {item_id} is owned by unknown user {owner_id}.")]
    MissingOwner { item_id: String, owner_id: String },

    #[error("Graph processing error: {0}")]
    GraphError(#[from] ExchangeError),

    #[error("Search worker failed: {0}")]
    WorkerFailed(String),
}
