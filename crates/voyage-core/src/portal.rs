//! Application context
//!
//! Constructed once at start-up; every component that needs to know who is
//! logged in borrows the session manager from here.

use voyage_session::{AuthApi, SessionManager};
use voyage_storage::Database;

use crate::config::Config;
use crate::Result;

pub struct Portal {
    config: Config,
    db: Database,
    session_manager: SessionManager,
}

impl Portal {
    pub fn new(config: Config) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db)
    }

    /// Build around an already opened database (used by tests).
    pub fn with_database(config: Config, db: Database) -> Result<Self> {
        let api = AuthApi::new(config.api_base_url.clone());
        let session_manager = SessionManager::new(db.clone(), api)?;

        tracing::info!(
            api = %config.api_base_url,
            authenticated = session_manager.is_authenticated(),
            "Portal initialized"
        );

        Ok(Self {
            config,
            db,
            session_manager,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_session::UserProfile;

    #[test]
    fn test_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().join("data"));

        {
            let portal = Portal::new(config.clone()).unwrap();
            assert!(!portal.session_manager().is_authenticated());
            portal
                .session_manager()
                .set_auth_data(
                    "tok".to_string(),
                    UserProfile {
                        email: Some("ana@example.com".to_string()),
                        ..Default::default()
                    },
                    None,
                )
                .unwrap();
        }

        let portal = Portal::new(config).unwrap();
        assert!(portal.session_manager().is_authenticated());
        assert_eq!(portal.session_manager().token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_clones_share_state() {
        let portal = Portal::with_database(
            Config::new(std::path::PathBuf::from("/unused")),
            Database::open_in_memory().unwrap(),
        )
        .unwrap();

        let header_view = portal.session_manager().clone();
        portal
            .session_manager()
            .set_auth_data("tok".to_string(), UserProfile::default(), None)
            .unwrap();

        assert!(header_view.is_authenticated());
        assert_eq!(portal.database().get_entry("authToken").unwrap().as_deref(), Some("tok"));
    }
}
