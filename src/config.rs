use crate::field_mapping::FieldMapping;
use std::time::Duration;

pub const DEFAULT_ATTIO_BASE_URL: &str = "https://api.attio.com";
pub const DEFAULT_DOMAIN_ATTRIBUTE: &str = "domains";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub attio_api_key: String,
    pub attio_base_url: String,
    pub attio_list_id: String,
    pub attio_domain_attribute: String,
    pub attio_timeout: Duration,
    pub domain_field_id: String,
    pub field_mappings: FieldMapping,
    /// Answer GET on the webhook routes with 200 instead of 405.
    pub allow_get_probe: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Attio Base URL: {}", config.attio_base_url);
        tracing::debug!("Attio List ID: {}", config.attio_list_id);
        tracing::debug!("Domain attribute: {}", config.attio_domain_attribute);
        tracing::debug!("Domain field ID: {}", config.domain_field_id);
        tracing::debug!("Field mappings: {} entries", config.field_mappings.len());
        tracing::debug!("Server Port: {}", config.port);
        if config.allow_get_probe {
            tracing::info!("GET probe enabled on webhook routes");
        }

        Ok(config)
    }

    /// Builds the configuration from any key lookup, so tests never touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> anyhow::Result<String> {
            lookup(key)
                .ok_or_else(|| anyhow::anyhow!("{} environment variable required", key))
                .and_then(|value| {
                    if value.trim().is_empty() {
                        anyhow::bail!("{} cannot be empty", key);
                    }
                    Ok(value.trim().to_string())
                })
        };
        let optional = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let attio_base_url = optional("ATTIO_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ATTIO_BASE_URL.to_string());
        let parsed = url::Url::parse(&attio_base_url)
            .map_err(|e| anyhow::anyhow!("ATTIO_BASE_URL is not a valid URL: {}", e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("ATTIO_BASE_URL must start with http:// or https://");
        }

        let field_mappings = match optional("FILLOUT_FIELD_MAPPINGS") {
            Some(raw) => FieldMapping::parse(&raw)
                .map_err(|e| anyhow::anyhow!("FILLOUT_FIELD_MAPPINGS is invalid: {}", e))?,
            None => FieldMapping::default(),
        };

        Ok(Self {
            port: optional("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            attio_api_key: required("ATTIO_API_KEY")?,
            attio_base_url: attio_base_url.trim_end_matches('/').to_string(),
            attio_list_id: required("ATTIO_LIST_ID")?,
            attio_domain_attribute: optional("ATTIO_DOMAIN_ATTRIBUTE")
                .unwrap_or_else(|| DEFAULT_DOMAIN_ATTRIBUTE.to_string()),
            attio_timeout: Duration::from_secs(
                optional("ATTIO_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .map_err(|_| {
                        anyhow::anyhow!("ATTIO_TIMEOUT_SECS must be a whole number of seconds")
                    })?,
            ),
            domain_field_id: required("FILLOUT_DOMAIN_FIELD_ID")?,
            field_mappings,
            allow_get_probe: optional("ALLOW_GET_PROBE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("ATTIO_API_KEY", "secret"),
        ("ATTIO_LIST_ID", "list-1"),
        ("FILLOUT_DOMAIN_FIELD_ID", "6aYW"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.attio_base_url, DEFAULT_ATTIO_BASE_URL);
        assert_eq!(config.attio_domain_attribute, "domains");
        assert_eq!(config.attio_timeout, Duration::from_secs(30));
        assert!(config.field_mappings.is_empty());
        assert!(!config.allow_get_probe);
    }

    #[test]
    fn test_missing_required_value_fails() {
        let err = Config::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("FILLOUT_DOMAIN_FIELD_ID"));
    }

    #[test]
    fn test_blank_required_value_fails() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("ATTIO_API_KEY", "   ");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_overrides_and_mappings() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("ATTIO_BASE_URL", "http://localhost:9999/"),
            ("ATTIO_DOMAIN_ATTRIBUTE", "website"),
            ("FILLOUT_FIELD_MAPPINGS", "wrV6:hdd_evaluation_1,6rxp:hdd_evaluation_2"),
            ("ALLOW_GET_PROBE", "true"),
            ("PORT", "8080"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.attio_base_url, "http://localhost:9999");
        assert_eq!(config.attio_domain_attribute, "website");
        assert_eq!(config.field_mappings.len(), 2);
        assert!(config.allow_get_probe);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ATTIO_BASE_URL", "ftp://attio"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }
}
