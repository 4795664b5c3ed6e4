use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub environment: Environment,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    pub session_cleanup_interval: Duration,
    pub dev_server_url: String,
    pub client_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub admin: Option<AdminSeed>,
}

/// Credentials for the admin account ensured at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

/// Deployment environment, read from `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    /// Unset means production. Unknown values behave like `Test`: static
    /// assets are served but cookies are not marked secure.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("production") => Environment::Production,
            Some("development") => Environment::Development,
            Some(_) => Environment::Test,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let session_secret = env_required("SESSION_SECRET")?;

        let environment = Environment::parse(std::env::var("NODE_ENV").ok().as_deref());

        let host: IpAddr = env_or("HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid HOST: {e}"))?;

        let port: u16 = env_or("PORT", "5000")
            .parse()
            .map_err(|e| format!("Invalid PORT: {e}"))?;

        let log_level = env_or("LOG_LEVEL", "info");

        let max_body_size: usize = env_or("MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid MAX_BODY_SIZE: {e}"))?;

        let cleanup_secs: u64 = env_or("SESSION_CLEANUP_INTERVAL_SECS", "600")
            .parse()
            .map_err(|e| format!("Invalid SESSION_CLEANUP_INTERVAL_SECS: {e}"))?;
        if cleanup_secs == 0 {
            return Err("SESSION_CLEANUP_INTERVAL_SECS must be greater than zero".to_string());
        }

        let dev_server_url = env_or("DEV_SERVER_URL", "http://localhost:5173")
            .trim_end_matches('/')
            .to_string();

        let admin = match (
            std::env::var("ADMIN_EMAIL").ok(),
            std::env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            _ => {
                return Err(
                    "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
                );
            }
        };

        Ok(Config {
            database_url,
            session_secret,
            environment,
            host,
            port,
            log_level,
            max_body_size,
            session_cleanup_interval: Duration::from_secs(cleanup_secs),
            dev_server_url,
            client_dir: PathBuf::from(env_or("CLIENT_DIR", "client")),
            dist_dir: PathBuf::from(env_or("DIST_DIR", "dist")),
            admin,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_node_env_is_production() {
        assert_eq!(Environment::parse(None), Environment::Production);
        assert_eq!(Environment::parse(Some("")), Environment::Production);
        assert!(Environment::parse(Some("production")).is_production());
    }

    #[test]
    fn development_is_recognised() {
        let env = Environment::parse(Some("development"));
        assert!(env.is_development());
        assert!(!env.is_production());
    }

    #[test]
    fn other_values_are_neither_dev_nor_prod() {
        let env = Environment::parse(Some("staging"));
        assert_eq!(env, Environment::Test);
        assert!(!env.is_development());
        assert!(!env.is_production());
    }
}
