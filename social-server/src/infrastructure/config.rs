use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub media_root: PathBuf,
    pub page_cache_ttl: Duration,
    pub page_cache_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            lookup("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let media_root = lookup("MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("media"));
        let page_cache_ttl = lookup("PAGE_CACHE_TTL_SECS")
            .unwrap_or_else(|| "20".into())
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| anyhow::anyhow!("invalid PAGE_CACHE_TTL_SECS: {}", e))?;
        let page_cache_capacity = lookup("PAGE_CACHE_CAPACITY")
            .unwrap_or_else(|| "256".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PAGE_CACHE_CAPACITY: {}", e))?;

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            cors_origins,
            media_root,
            page_cache_ttl,
            page_cache_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/social"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.page_cache_ttl, Duration::from_secs(20));
        assert_eq!(config.page_cache_capacity, 256);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/social"),
            ("JWT_SECRET", "secret"),
            ("PORT", "9000"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("MEDIA_ROOT", "/srv/media"),
            ("PAGE_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.page_cache_ttl, Duration::ZERO);
    }

    #[test]
    fn required_vars_are_enforced() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "secret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/social"),
            ("JWT_SECRET", "secret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("invalid PORT"));
    }
}
