//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Application name, also used as the data/config directory name
pub const APP_NAME: &str = "dispatch";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version string reported by development builds; update checks are skipped for it
pub const DEV_VERSION: &str = "dev";

/// File holding the request document inside the data dir
pub const DOCUMENT_FILE: &str = "requests.http";

/// Configuration file inside the config dir
pub const CONFIG_FILE: &str = "config.yaml";

/// Log file inside the data dir
pub const LOG_FILE: &str = "dispatch.log";

/// Request timeout shared by every execution
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Release feed queried by the update check
pub const DEFAULT_RELEASES_URL: &str =
    "https://api.github.com/repos/mortensieker/dispatch-http/releases/latest";

/// Content type attached to every request that carries a body
pub const JSON_CONTENT_TYPE: &str = "application/json";
