use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
}

impl AppConfig {
    pub fn from_env(default_port: u16) -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let database_name =
            env::var("DATABASE_NAME").unwrap_or_else(|_| "marketplace".to_string());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(default_port);
        Ok(Self {
            host,
            port,
            database_url,
            database_name,
        })
    }
}

// The discovery service keeps no database; it only needs an address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env(default_port: u16) -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(default_port);
        Self { host, port }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub base_url: String,
    pub api_key: String,
    pub bucket: String,
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("STORAGE_URL")?;
        let api_key = env::var("STORAGE_API_KEY")?;
        let bucket = env::var("STORAGE_BUCKET")?;
        Ok(Self {
            base_url,
            api_key,
            bucket,
        })
    }
}
