use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use clap::{Parser, ValueEnum};

use kiku::errors::StoreError;

use crate::store::{FileSessionStore, InMemorySessionStore, SessionStore};

/// Where session documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// One JSON file per session in the data directory
    File,
    /// Process memory only, lost on restart
    Memory,
}

/// Server configuration, from command line flags or `KIKU_*` environment variables.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "KIKU_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "KIKU_PORT", default_value_t = 8081)]
    pub port: u16,

    /// Directory holding the session documents
    #[arg(long, env = "KIKU_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Storage backend
    #[arg(long, env = "KIKU_STORAGE", value_enum, default_value_t = StorageKind::File)]
    pub storage: StorageKind,

    /// Origin allowed to call the API with credentials (repeatable)
    #[arg(
        long = "allowed-origin",
        env = "KIKU_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub allowed_origins: Vec<String>,

    /// Mark the identity cookie `Secure` (serve over HTTPS)
    #[arg(long, env = "KIKU_SECURE_COOKIES")]
    pub secure_cookies: bool,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn cors_origins(&self) -> Result<Vec<HeaderValue>, InvalidHeaderValue> {
        self.allowed_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin.trim()))
            .collect()
    }

    /// Builds the configured store, creating the data directory if needed.
    pub async fn open_store(&self) -> Result<Arc<dyn SessionStore>, StoreError> {
        let store: Arc<dyn SessionStore> = match self.storage {
            StorageKind::File => Arc::new(FileSessionStore::open(&self.data_dir).await?),
            StorageKind::Memory => Arc::new(InMemorySessionStore::new()),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["kiku-backend"]).unwrap();
        assert_eq!(config.socket_addr(), "127.0.0.1:8081".parse().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.allowed_origins, vec!["http://localhost:5173"]);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "kiku-backend",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--storage",
            "memory",
            "--allowed-origin",
            "https://a.example,https://b.example",
            "--secure-cookies",
        ])
        .unwrap();
        assert_eq!(config.socket_addr(), "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.cors_origins().unwrap().len(), 2);
        assert!(config.secure_cookies);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::try_parse_from(["kiku-backend", "--port", "http"]).is_err());
        assert!(Config::try_parse_from(["kiku-backend", "--storage", "s3"]).is_err());

        let config =
            Config::try_parse_from(["kiku-backend", "--allowed-origin", "bad\norigin"]).unwrap();
        assert!(config.cors_origins().is_err());
    }

    #[tokio::test]
    async fn opens_configured_store() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("sessions");
        let data_dir_arg = data_dir.to_str().unwrap();

        let config =
            Config::try_parse_from(["kiku-backend", "--data-dir", data_dir_arg]).unwrap();
        assert_eq!(config.open_store().await.unwrap().backend(), "file");
        assert!(data_dir.is_dir());

        let config = Config::try_parse_from(["kiku-backend", "--storage", "memory"]).unwrap();
        assert_eq!(config.open_store().await.unwrap().backend(), "memory");
    }
}
