//! Configuration for Annuaire
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Annuaire - member/project/skill directory API
#[derive(Parser, Debug, Clone)]
#[command(name = "annuaire")]
#[command(about = "Member, project and skill directory API backed by MongoDB")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    ///
    /// No default: when absent, the service still starts and every data
    /// endpoint reports the missing configuration in the response body.
    #[arg(long, env = "MONGODB_URI")]
    pub mongodb_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB")]
    pub mongodb_db: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Fixed per-operation timeout in milliseconds, baked into the MongoDB
    /// connection URI (server selection and connect timeouts)
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
    pub request_timeout_ms: u64,
}

impl Args {
    /// Database configuration, if both the URI and database name are present
    pub fn database_config(&self) -> Option<(&str, &str)> {
        match (self.mongodb_uri.as_deref(), self.mongodb_db.as_deref()) {
            (Some(uri), Some(db)) if !uri.is_empty() && !db.is_empty() => Some((uri, db)),
            _ => None,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with(uri: Option<&str>, db: Option<&str>) -> Args {
        Args {
            node_id: Uuid::new_v4(),
            listen: "127.0.0.1:8080".parse().unwrap(),
            mongodb_uri: uri.map(String::from),
            mongodb_db: db.map(String::from),
            log_level: "info".to_string(),
            request_timeout_ms: 10_000,
        }
    }

    #[test]
    fn test_database_config_requires_both_values() {
        assert!(args_with(None, None).database_config().is_none());
        assert!(args_with(Some("mongodb://localhost:27017"), None)
            .database_config()
            .is_none());
        assert!(args_with(None, Some("annuaire")).database_config().is_none());
        assert!(args_with(Some(""), Some("annuaire"))
            .database_config()
            .is_none());

        let args = args_with(Some("mongodb://localhost:27017"), Some("annuaire"));
        assert_eq!(
            args.database_config(),
            Some(("mongodb://localhost:27017", "annuaire"))
        );
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut args = args_with(None, None);
        args.request_timeout_ms = 0;
        assert!(args.validate().is_err());
    }
}
