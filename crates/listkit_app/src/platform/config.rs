use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use listkit_core::{ListConfig, DEFAULT_PAGE_SIZE, DEFAULT_RELEASE_DELAY, DEFAULT_START_PAGE};
use listkit_engine::{ApiSettings, HttpMethod, PageLayout};
use listkit_logging::{listkit_info, listkit_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unsupported HTTP method {0:?}")]
    InvalidMethod(String),
}

/// Everything the binary needs to page through one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub list_path: String,
    /// Endpoint for keyword searches; the listing path when absent.
    pub search_path: Option<String>,
    pub method: String,
    pub headers: Vec<(String, String)>,
    /// Send parameters as a signed token and decode token answers.
    pub signed: bool,
    pub jwt_secret: Option<String>,
    pub start_page: u32,
    pub page_size: u32,
    pub release_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub validate_status_below: u16,
    pub page_param: String,
    pub page_size_param: String,
    pub keyword_param: String,
    pub items_key: String,
    pub total_path: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let layout = PageLayout::default();
        let api = ApiSettings::default();
        Self {
            base_url: "http://localhost:8080".to_string(),
            list_path: "/items".to_string(),
            search_path: None,
            method: "GET".to_string(),
            headers: Vec::new(),
            signed: false,
            jwt_secret: None,
            start_page: DEFAULT_START_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            release_delay_ms: DEFAULT_RELEASE_DELAY.as_millis() as u64,
            request_timeout_secs: api.request_timeout.as_secs(),
            validate_status_below: api.validate_status_below,
            page_param: layout.page_param,
            page_size_param: layout.page_size_param,
            keyword_param: layout.keyword_param,
            items_key: layout.items_key,
            total_path: layout.total_path,
        }
    }
}

impl AppConfig {
    pub fn http_method(&self) -> Result<HttpMethod, ConfigError> {
        match self.method.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ConfigError::InvalidMethod(self.method.clone())),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout(),
            default_headers: self.headers.clone(),
            validate_status_below: self.validate_status_below,
            jwt_secret: self.jwt_secret.clone(),
            ..ApiSettings::default()
        }
    }

    pub fn list_config(&self) -> ListConfig {
        ListConfig {
            start_page: self.start_page,
            page_size: self.page_size,
            release_delay: Duration::from_millis(self.release_delay_ms),
            ..ListConfig::default()
        }
    }

    pub fn page_layout(&self) -> PageLayout {
        PageLayout {
            page_param: self.page_param.clone(),
            page_size_param: self.page_size_param.clone(),
            keyword_param: self.keyword_param.clone(),
            items_key: self.items_key.clone(),
            total_path: self.total_path.clone(),
        }
    }
}

/// Loads the configuration, falling back to defaults when the file is absent.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            listkit_warn!("No config at {:?}; using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    listkit_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listkit.ron");
        fs::write(
            &path,
            r#"(
                base_url: "https://api.example.com",
                list_path: "/repos",
                method: "post",
                page_size: 25,
                headers: [("Authorization", "Bearer abc")],
            )"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.start_page, DEFAULT_START_PAGE);
        assert_eq!(config.http_method().unwrap(), HttpMethod::Post);
        assert_eq!(
            config.api_settings().default_headers,
            vec![("Authorization".to_string(), "Bearer abc".to_string())]
        );
        assert_eq!(config.list_config().page_size, 25);
    }

    #[test]
    fn written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listkit.ron");
        let config = AppConfig {
            search_path: Some("/search".to_string()),
            signed: true,
            jwt_secret: Some("s".to_string()),
            ..AppConfig::default()
        };
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new()).unwrap();
        fs::write(&path, text).unwrap();

        assert_eq!(load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listkit.ron");
        fs::write(&path, "(page_size: \"ten\")").unwrap();
        assert!(matches!(load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let config = AppConfig {
            method: "FETCH".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.http_method(),
            Err(ConfigError::InvalidMethod(method)) if method == "FETCH"
        ));
    }

    #[test]
    fn layout_follows_config() {
        let config = AppConfig {
            items_key: "data".to_string(),
            total_path: vec!["total".to_string()],
            ..AppConfig::default()
        };
        let layout = config.page_layout();
        assert_eq!(layout.items_key, "data");
        assert_eq!(layout.total_path, vec!["total".to_string()]);
        assert_eq!(layout.page_param, "page");
    }
}
