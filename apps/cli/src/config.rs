use std::path::PathBuf;
use std::time::Duration;

pub struct Config {
    pub providers_file: PathBuf,
    /// Read the request from stdin when unset
    pub request_file: Option<PathBuf>,
    pub provider_filter: Option<Vec<String>>,
    pub group_symbols: bool,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let providers_file = lookup("BV_PROVIDERS_FILE")
            .unwrap_or_else(|| "providers.json".into())
            .into();
        let request_file = lookup("BV_REQUEST_FILE")
            .filter(|s| !s.trim().is_empty() && s.trim() != "-")
            .map(PathBuf::from);
        let provider_filter = lookup("BV_PROVIDERS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|ids| !ids.is_empty());
        let group_symbols = lookup("BV_GROUP_SYMBOLS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let timeout_ms: u64 = lookup("BV_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .unwrap_or(30000);

        Self {
            providers_file,
            request_file,
            provider_filter,
            group_symbols,
            request_timeout: Duration::from_millis(timeout_ms),
        }
    }
}
