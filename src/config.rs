use std::net::{IpAddr, SocketAddr};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection string. Absence is not a startup error: the
    /// connection cache surfaces it as a fatal error on every data
    /// operation instead.
    pub mongodb_url: Option<String>,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    /// Secret the identity provider signs session tokens with. An empty
    /// secret verifies nothing (every request reads as signed out).
    pub session_secret: String,
    /// Provider-hosted sign-in flow the sign-in affordance links to.
    pub sign_in_url: String,
    /// Primary accent color injected into the document shell.
    pub theme_color_primary: String,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything is optional with defaults; `MONGODB_URL` in particular is
    /// read here but only enforced when a data operation first needs it.
    ///
    /// On managed platforms, `PORT` overrides `SERVER_PORT` and host
    /// defaults to `0.0.0.0` in production.
    ///
    /// # Errors
    ///
    /// Returns an error if `SERVER_HOST` / `SERVER_PORT` contain invalid
    /// values.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mongodb_url = std::env::var("MONGODB_URL").ok();

        let environment = match std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        // Managed platforms provide PORT; fall back to SERVER_PORT, then 3000
        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        // In production, default to 0.0.0.0 so the platform can route traffic
        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = std::env::var("SERVER_HOST")
            .unwrap_or_else(|_| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let session_secret = std::env::var("SESSION_SECRET").unwrap_or_default();

        let sign_in_url = std::env::var("SIGN_IN_URL").unwrap_or_else(|_| "/sign-in".to_string());

        let theme_color_primary =
            std::env::var("THEME_COLOR_PRIMARY").unwrap_or_else(|_| "#624CF5".to_string());

        Ok(Self {
            mongodb_url,
            server_host,
            server_port,
            environment,
            log_level,
            session_secret,
            sign_in_url,
            theme_color_primary,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}
