use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_FROM: &str = "onboarding@resend.dev";
pub const DEFAULT_ADMIN_TO: &str = "bestellungen@example.com";

/// Runtime configuration, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP port (default: 3000)
    pub port: u16,

    /// Bearer token for the email API. Without it no email can be sent.
    pub api_key: Option<String>,

    /// Email API endpoint (default: Resend)
    pub api_url: String,

    /// Sender address for both emails
    pub from: String,

    /// Recipient of the admin notification
    pub admin_to: String,

    /// Per-request timeout for outbound email calls (default: 30s)
    pub email_timeout: Duration,

    /// Directory holding the shop front end (default: working directory)
    pub static_dir: PathBuf,

    /// Maximum request body in bytes; `None` leaves uploads unbounded
    pub max_upload_size: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            from: DEFAULT_FROM.to_string(),
            admin_to: DEFAULT_ADMIN_TO.to_string(),
            email_timeout: Duration::from_secs(30),
            static_dir: PathBuf::from("."),
            max_upload_size: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let default = Self::default();

        Self {
            port: get("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            api_key: get("RESEND_API_KEY"),

            api_url: get("RESEND_API_URL").unwrap_or(default.api_url),

            from: get("RESEND_FROM").unwrap_or(default.from),

            admin_to: get("RESEND_TO").unwrap_or(default.admin_to),

            email_timeout: get("RESEND_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.email_timeout),

            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.static_dir),

            max_upload_size: get("MAX_UPLOAD_SIZE").and_then(|v| v.parse().ok()),
        }
    }
}
