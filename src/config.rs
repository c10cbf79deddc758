use std::env;

/// Runtime configuration for the console.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Timetrax REST backend, including the `/api` prefix.
    pub api_base_url: String,
    /// Path of the YAML file the signed-in session is persisted to.
    pub session_file: String,
    /// Timeout applied to every HTTP request, in seconds.
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: "http://localhost:8080/api".to_string(),
            session_file: "timetrax-session.yaml".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Default configuration with `TIMETRAX_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = AppConfig::default();
        if let Ok(url) = env::var("TIMETRAX_API_URL") {
            if !url.is_empty() {
                config.api_base_url = url.trim_end_matches('/').to_string();
            }
        }
        if let Ok(path) = env::var("TIMETRAX_SESSION_FILE") {
            if !path.is_empty() {
                config.session_file = path;
            }
        }
        if let Ok(secs) = env::var("TIMETRAX_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.http_timeout_secs = secs;
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.session_file, "timetrax-session.yaml");
        assert_eq!(config.http_timeout_secs, 30);
    }
}
