use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    // ── Database ───────────────────────────────────────────────────
    #[serde(default)]
    pub database_url: String,

    #[serde(default)]
    pub db_host: Option<String>,

    #[serde(default)]
    pub db_port: Option<u16>,

    #[serde(default)]
    pub db_user: Option<String>,

    #[serde(default)]
    pub db_password: Option<String>,

    #[serde(default)]
    pub db_name: Option<String>,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_acquire_timeout")]
    pub db_acquire_timeout_secs: u64,

    // ── HTTP surface ───────────────────────────────────────────────
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub admin_token: Option<String>,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    // ── Files ──────────────────────────────────────────────────────
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_fallback_projects_path")]
    pub fallback_projects_path: PathBuf,

    #[serde(default = "default_max_resume_bytes")]
    pub max_resume_bytes: usize,

    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    // ── Mail ───────────────────────────────────────────────────────
    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    #[serde(default)]
    pub mail_from: Option<String>,

    #[serde(default)]
    pub admin_email: Option<String>,

    #[serde(default = "default_owner_name")]
    pub owner_name: String,

    // ── GitHub ─────────────────────────────────────────────────────
    #[serde(default = "default_github_username")]
    pub github_username: String,

    #[serde(default)]
    pub github_token: Option<String>,

    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    #[serde(default = "default_github_per_page")]
    pub github_per_page: u8,

    #[serde(default = "default_github_cache_ttl")]
    pub github_cache_ttl_secs: u64,

    #[serde(default = "default_github_refresh")]
    pub github_refresh_secs: u64,

    #[serde(default = "default_github_refresh_max")]
    pub github_refresh_max_secs: u64,

    #[serde(default = "default_github_timeout")]
    pub github_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub github_auto_refresh: bool,

    // ── Contact form ───────────────────────────────────────────────
    #[serde(default = "default_contact_rate_limit")]
    pub contact_rate_limit: u64,

    #[serde(default = "default_contact_rate_window")]
    pub contact_rate_window_secs: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-Site".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_acquire_timeout() -> u64 {
    5
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_fallback_projects_path() -> PathBuf {
    PathBuf::from("public/projects.json")
}
fn default_max_resume_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_max_image_bytes() -> usize {
    5 * 1024 * 1024
}
fn default_smtp_port() -> u16 {
    465
}
fn default_owner_name() -> String {
    "Anita".to_string()
}
fn default_github_username() -> String {
    "Anita-Boke".to_string()
}
fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_github_per_page() -> u8 {
    10
}
fn default_github_cache_ttl() -> u64 {
    5 * 60
}
fn default_github_refresh() -> u64 {
    5 * 60
}
fn default_github_refresh_max() -> u64 {
    30 * 60
}
fn default_github_timeout() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_contact_rate_limit() -> u64 {
    5
}
fn default_contact_rate_window() -> u64 {
    60 * 60
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            database_url: String::new(),
            db_host: None,
            db_port: None,
            db_user: None,
            db_password: None,
            db_name: None,
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_secs: default_db_acquire_timeout(),
            cors_allowed_origins: default_cors_origins(),
            admin_token: None,
            trust_x_forwarded_for: false,
            public_base_url: default_public_base_url(),
            upload_dir: default_upload_dir(),
            fallback_projects_path: default_fallback_projects_path(),
            max_resume_bytes: default_max_resume_bytes(),
            max_image_bytes: default_max_image_bytes(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            mail_from: None,
            admin_email: None,
            owner_name: default_owner_name(),
            github_username: default_github_username(),
            github_token: None,
            github_api_url: default_github_api_url(),
            github_per_page: default_github_per_page(),
            github_cache_ttl_secs: default_github_cache_ttl(),
            github_refresh_secs: default_github_refresh(),
            github_refresh_max_secs: default_github_refresh_max(),
            github_timeout_secs: default_github_timeout(),
            github_auto_refresh: true,
            contact_rate_limit: default_contact_rate_limit(),
            contact_rate_window_secs: default_contact_rate_window(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        if config.database_url.trim().is_empty() {
            if let Some(url) = config.compose_database_url() {
                config.database_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Builds a Postgres URL from the discrete `db_*` settings when no full URL is given.
    pub fn compose_database_url(&self) -> Option<String> {
        let host = self.db_host.as_deref()?.trim();
        if host.is_empty() {
            return None;
        }
        let user = self.db_user.as_deref().unwrap_or("postgres");
        let name = self.db_name.as_deref().unwrap_or("portfolio_db");
        let port = self.db_port.unwrap_or(5432);

        let mut url = Url::parse(&format!("postgres://{host}:{port}/{name}")).ok()?;
        url.set_username(user).ok()?;
        if let Some(password) = self.db_password.as_deref().filter(|p| !p.is_empty()) {
            url.set_password(Some(password)).ok()?;
        }
        Some(url.to_string())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL (or DB_HOST) must be set");
        }
        if Url::parse(&self.public_base_url).is_err() {
            errors.push("PUBLIC_BASE_URL must be an absolute URL");
        }
        if Url::parse(&self.github_api_url).is_err() {
            errors.push("GITHUB_API_URL must be an absolute URL");
        }
        if self.github_per_page == 0 || self.github_per_page > 100 {
            errors.push("GITHUB_PER_PAGE must be between 1 and 100");
        }
        if self.github_refresh_max_secs < self.github_refresh_secs {
            errors.push("GITHUB_REFRESH_MAX_SECS must not be below GITHUB_REFRESH_SECS");
        }
        if self.contact_rate_limit == 0 {
            errors.push("CONTACT_RATE_LIMIT must be positive");
        }
        if self.is_production() {
            if self.admin_token.as_deref().map_or(true, |t| t.len() < 16) {
                errors.push("ADMIN_TOKEN of at least 16 characters is required in production");
            }
            if self.cors_origins().iter().any(|o| o == "*") {
                errors.push("Wildcard CORS (*) is not allowed in production");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn smtp_configured(&self) -> bool {
        self.smtp_host.as_deref().is_some_and(|h| !h.is_empty())
            && self.smtp_username.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn github_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.github_cache_ttl_secs)
    }

    pub fn github_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.github_refresh_secs)
    }

    pub fn github_refresh_max_interval(&self) -> Duration {
        Duration::from_secs(self.github_refresh_max_secs)
    }

    pub fn contact_rate_window(&self) -> Duration {
        Duration::from_secs(self.contact_rate_window_secs)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self {
            Some(value) => value.redact(),
            None => "[MISSING]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("db_host", &self.db_host)
            .field("db_user", &self.db_user)
            .field("db_password", &self.db_password.redact())
            .field("db_name", &self.db_name)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("admin_token", &self.admin_token.redact())
            .field("public_base_url", &self.public_base_url)
            .field("upload_dir", &self.upload_dir)
            .field("fallback_projects_path", &self.fallback_projects_path)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.redact())
            .field("admin_email", &self.admin_email)
            .field("github_username", &self.github_username)
            .field("github_token", &self.github_token.redact())
            .field("github_cache_ttl_secs", &self.github_cache_ttl_secs)
            .field("github_refresh_secs", &self.github_refresh_secs)
            .field("contact_rate_limit", &self.contact_rate_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/portfolio_db".into(),
            ..Default::default()
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AppConfig {
            smtp_password: Some("hunter2-hunter2".into()),
            admin_token: Some("super-secret-admin-token".into()),
            ..base()
        };
        let printed = format!("{:?}", config);

        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("super-secret-admin-token"));
        assert!(!printed.contains("postgres://localhost"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn composes_url_from_discrete_parts() {
        let config = AppConfig {
            db_host: Some("db.internal".into()),
            db_user: Some("site".into()),
            db_password: Some("p@ss".into()),
            db_name: Some("portfolio".into()),
            ..Default::default()
        };

        let url = config.compose_database_url().unwrap();
        assert!(url.starts_with("postgres://site:"));
        assert!(url.ends_with("@db.internal:5432/portfolio"));
    }

    #[test]
    fn no_host_means_no_composed_url() {
        assert!(AppConfig::default().compose_database_url().is_none());
    }

    #[test]
    fn production_requires_admin_token_and_strict_cors() {
        let config = AppConfig {
            env: AppEnvironment::Production,
            ..base()
        };
        let err = config.validate().unwrap_err().to_string();

        assert!(err.contains("ADMIN_TOKEN"));
        assert!(err.contains("Wildcard CORS"));
    }

    #[test]
    fn development_defaults_validate() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let config = AppConfig {
            cors_allowed_origins: vec!["https://a.dev, https://b.dev".into(), " ".into()],
            ..base()
        };
        assert_eq!(config.cors_origins(), vec!["https://a.dev", "https://b.dev"]);
    }
}
