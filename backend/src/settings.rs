//! Process settings read from the environment.

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Overrides `mondrianRestUrl` from the dashboard configuration when set.
    pub mondrian_rest_url: Option<String>,
    pub clickhouse_url: String,
    pub clickhouse_user: String,
    pub clickhouse_password: String,
    pub clickhouse_database: String,
    pub config_file: String,
    pub listen_addr: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or(default.to_string());
        Self {
            mondrian_rest_url: lookup("MONDRIAN_REST_URL").filter(|url| !url.is_empty()),
            clickhouse_url: var("CLICKHOUSE_URL", "http://localhost:8123"),
            clickhouse_user: var("CLICKHOUSE_USER", "dashboard"),
            clickhouse_password: var("CLICKHOUSE_PASSWORD", "dashboard"),
            clickhouse_database: var("CLICKHOUSE_DATABASE", "Dashboard_State"),
            config_file: var("DASHBOARD_CONFIG_FILE", "dashboard-config.json"),
            listen_addr: var("DASHBOARD_LISTEN_ADDR", "127.0.0.1:8080"),
        }
    }

    pub fn mondrian_rest_url_or<'a>(&'a self, configured: &'a str) -> &'a str {
        self.mondrian_rest_url.as_deref().unwrap_or(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.clickhouse_url, "http://localhost:8123");
        assert_eq!(settings.listen_addr, "127.0.0.1:8080");
        assert_eq!(settings.mondrian_rest_url_or("http://configured"), "http://configured");
    }

    #[test]
    fn environment_overrides_the_configured_backend() {
        let settings = Settings::from_lookup(|key| match key {
            "MONDRIAN_REST_URL" => Some("http://mondrian:8080".to_string()),
            _ => None,
        });
        assert_eq!(settings.mondrian_rest_url_or("http://configured"), "http://mondrian:8080");
    }
}
