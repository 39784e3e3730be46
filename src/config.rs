use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub lookup_path: PathBuf,
    pub source_path: PathBuf,
    pub document_path: PathBuf,
    /// Country every interactive add is filed under.
    pub country_id: String,
    pub country_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_value("CLIMBING_ATLAS_BIND_ADDR")
            .and_then(|v| v.parse::<SocketAddr>().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

        let lookup_path = PathBuf::from(
            env_value("CLIMBING_ATLAS_LOOKUP_PATH")
                .unwrap_or_else(|| "regions_and_provinces.csv".to_string()),
        );
        let source_path = PathBuf::from(
            env_value("CLIMBING_ATLAS_SOURCE_PATH")
                .unwrap_or_else(|| "climbing_spots.csv".to_string()),
        );
        let document_path = PathBuf::from(
            env_value("CLIMBING_ATLAS_DOCUMENT_PATH")
                .unwrap_or_else(|| "climbing_spots.json".to_string()),
        );

        let country_id =
            env_value("CLIMBING_ATLAS_COUNTRY_ID").unwrap_or_else(|| "ITA".to_string());
        let country_name =
            env_value("CLIMBING_ATLAS_COUNTRY_NAME").unwrap_or_else(|| "Italia".to_string());

        Ok(Self {
            bind_addr,
            lookup_path,
            source_path,
            document_path,
            country_id,
            country_name,
        })
    }
}

/// Trimmed of whitespace and surrounding quotes; empty counts as unset.
fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| normalize(&raw))
        .filter(|v| !v.is_empty())
}

fn normalize(raw: &str) -> String {
    raw.trim().trim_matches('"').trim_matches('\'').to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalize_strips_quotes_and_whitespace() {
        assert_eq!(normalize("  \"127.0.0.1:9000\" "), "127.0.0.1:9000");
        assert_eq!(normalize("'data/out.json'"), "data/out.json");
        assert_eq!(normalize("   "), "");
    }
}
