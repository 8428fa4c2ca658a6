//! Application configuration.
//!
//! Settings are read once at startup from a JSON file (path taken from the
//! `ORDER_PDF_CONFIG` environment variable, `config.json` otherwise), with
//! `ORDER_PDF__<SECTION>__<KEY>` environment variables layered on top, e.g.
//! `ORDER_PDF__SERVER__PORT=9000`. Every section and key is optional;
//! anything missing falls back to the defaults below. The configuration is
//! shared read-only with the handlers as `web::Data<AppConfig>` and is never
//! written back.

use crate::error::ConfigError;
use actix_web::{web, HttpResponse, Responder};
use common::model::pdf::{BackendKind, PdfOptions};
use log::info;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "ORDER_PDF_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.json";
const ENV_PREFIX: &str = "ORDER_PDF";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub pdf_settings: PdfOptions,
    pub browser: BrowserConfig,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Chrome or Chromium executable used by every backend.
    pub chrome_path: PathBuf,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            chrome_path: default_chrome_path(),
            template_path: PathBuf::from("template.html"),
            output_dir: PathBuf::from("finished"),
        }
    }
}

fn default_chrome_path() -> PathBuf {
    if cfg!(target_os = "windows") {
        PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe")
    } else if cfg!(target_os = "macos") {
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome")
    } else {
        PathBuf::from("/usr/bin/google-chrome")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    #[serde(rename = "type")]
    pub kind: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Column whose value names each output file.
    pub id_field: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        // Order number column of the marketplace exports the tool was built for.
        Self {
            id_field: "平台订单号".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from `$ORDER_PDF_CONFIG` or `config.json`.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(path: &Path, env: Environment) -> Result<Self, ConfigError> {
        if path.exists() {
            info!("Loading config from {}", path.display());
        } else {
            info!("No config file at {}, using defaults", path.display());
        }

        config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Json).required(false))
            .add_source(env.prefix_separator("__").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|source| ConfigError::Load {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Actix handler for `GET /api/config`: the effective configuration, so a
/// front end can prefill its file pickers and print settings.
pub async fn process(config: web::Data<AppConfig>) -> impl Responder {
    HttpResponse::Ok().json(config.get_ref())
}
