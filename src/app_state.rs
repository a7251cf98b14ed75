//! Implements a struct that holds the state of the server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, config::SiteConfig, db::initialize, invoice::AttachmentStore};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The settings read from the site configuration file.
    pub site_config: Arc<SiteConfig>,

    /// Where invoice attachments are stored.
    pub attachments: AttachmentStore,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        site_config: SiteConfig,
        attachments: AttachmentStore,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            site_config: Arc::new(site_config),
            attachments,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
