// std imports
use std::sync::Arc;

// internal imports
use crate::database::client::Client;

/// Shared state of the web server
///
pub struct AppState {
    db_client: Arc<Client>,
}

impl AppState {
    pub fn new(db_client: Client) -> Self {
        Self {
            db_client: Arc::new(db_client),
        }
    }

    /// Returns a reference to the db client
    ///
    pub fn get_db_client_as_ref(&self) -> &Client {
        self.db_client.as_ref()
    }
}
