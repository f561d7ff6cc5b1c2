use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_EMBED_BASE_URL: &str = "https://vidsrc.to";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_rps: u32,
    pub database_url: String,
    pub embed_base_url: String,
    pub image_base_url: String,
    pub seed_on_start: bool,
    pub seed_limit: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. `from_env` is the
    /// only production caller; tests feed a map.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT").unwrap_or_else(|| "3000".to_string()).parse().context("PORT")?;

        let tmdb_api_key = var("TMDB_API_KEY").map(|k| k.trim().to_string()).unwrap_or_default();
        if tmdb_api_key.is_empty() {
            anyhow::bail!("TMDB_API_KEY must be set");
        }

        let tmdb_base_url = var("TMDB_BASE_URL").unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string());

        let tmdb_rps: u32 = var("TMDB_RPS").and_then(|s| s.parse().ok()).unwrap_or(40);

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://cinestream.db?mode=rwc".to_string());

        let embed_base_url =
            var("EMBED_BASE_URL").unwrap_or_else(|| DEFAULT_EMBED_BASE_URL.to_string());
        let image_base_url =
            var("IMAGE_BASE_URL").unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string());

        let seed_on_start = var("SEED_ON_START")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let seed_limit: usize = var("SEED_LIMIT").and_then(|s| s.parse().ok()).unwrap_or(20);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            tmdb_api_key,
            tmdb_base_url,
            tmdb_rps,
            database_url,
            embed_base_url,
            image_base_url,
            seed_on_start,
            seed_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("TMDB_API_KEY"));

        let err = Config::from_lookup(lookup(&[("TMDB_API_KEY", "   ")])).unwrap_err();
        assert!(err.to_string().contains("TMDB_API_KEY"));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("TMDB_API_KEY", "abc")])).unwrap();
        assert_eq!(config.tmdb_api_key, "abc");
        assert_eq!(config.tmdb_base_url, DEFAULT_TMDB_BASE_URL);
        assert_eq!(config.embed_base_url, DEFAULT_EMBED_BASE_URL);
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.tmdb_rps, 40);
        assert!(!config.seed_on_start);
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("TMDB_API_KEY", "abc"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("SEED_ON_START", "true"),
            ("SEED_LIMIT", "40"),
        ]))
        .unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert!(config.seed_on_start);
        assert_eq!(config.seed_limit, 40);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = Config::from_lookup(lookup(&[("TMDB_API_KEY", "abc"), ("PORT", "nope")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
