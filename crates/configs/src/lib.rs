use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// Where the catalog lives and how generated image URLs look.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            assets_dir: default_assets_dir(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    3000
}

fn default_data_file() -> String {
    "data/pokemons.json".into()
}

fn default_assets_dir() -> String {
    "assets".into()
}

fn default_public_base_url() -> String {
    "http://localhost:3000".into()
}

/// `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if present, otherwise defaults overridden by environment variables.
    /// A config file that exists but does not parse is still an error.
    pub fn load_or_env() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            Self::from_env_with(|k| std::env::var(k).ok())
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `SERVER_HOST`, `SERVER_PORT`, `TOKIO_WORKER_THREADS`,
    /// `POKEMONS_FILE`, `ASSETS_DIR` and `PUBLIC_BASE_URL`.
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(host) = get("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = get("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = get("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if let Some(f) = get("POKEMONS_FILE") {
            cfg.catalog.data_file = f;
        }
        if let Some(d) = get("ASSETS_DIR") {
            cfg.catalog.assets_dir = d;
        }
        if let Some(u) = get("PUBLIC_BASE_URL") {
            cfg.catalog.public_base_url = u;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        self.catalog.normalize()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 {
                self.worker_threads = Some(4);
            }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl CatalogConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.data_file.trim().is_empty() {
            return Err(anyhow!("catalog.data_file is empty"));
        }
        let lower = self.public_base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("catalog.public_base_url must start with http:// or https://"));
        }
        // 去掉末尾的 `/`，拼接图片路径时避免出现 `//`
        let trimmed = self.public_base_url.trim_end_matches('/').len();
        self.public_base_url.truncate(trimmed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_yields_defaults() {
        let mut cfg = parse("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.catalog.data_file, "data/pokemons.json");
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn parses_sections_and_normalizes() {
        let mut cfg = parse(
            r#"
            [server]
            host = " "
            port = 8080
            worker_threads = 0

            [catalog]
            data_file = "/srv/pokemons.json"
            public_base_url = "https://pokedex.example.com/"
            "#,
        )
        .unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.catalog.data_file, "/srv/pokemons.json");
        assert_eq!(cfg.catalog.assets_dir, "assets");
        assert_eq!(cfg.catalog.public_base_url, "https://pokedex.example.com");
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = parse("[server]\nport = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = parse("[catalog]\npublic_base_url = \"ftp://x\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = parse("[catalog]\ndata_file = \"\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn env_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            ("SERVER_HOST", "0.0.0.0"),
            ("SERVER_PORT", "4000"),
            ("POKEMONS_FILE", "/tmp/p.json"),
            ("PUBLIC_BASE_URL", "http://example.com"),
        ]
        .into_iter()
        .collect();
        let cfg = AppConfig::from_env_with(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.bind_addr(), "0.0.0.0:4000");
        assert_eq!(cfg.catalog.data_file, "/tmp/p.json");
        assert_eq!(cfg.catalog.assets_dir, "assets");
        assert_eq!(cfg.catalog.public_base_url, "http://example.com");
    }

    #[test]
    fn unparsable_port_in_env_keeps_default() {
        let cfg =
            AppConfig::from_env_with(|k| (k == "SERVER_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(cfg.server.port, 3000);
    }
}
