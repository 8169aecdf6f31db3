use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub translit: TranslitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origin allowed on the WebSocket/CORS handshake.
    /// Any origin is accepted when unset.
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

/// Settings for the streaming recognition session.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Recognition service API key. Absence is checked when a session opens,
    /// not at startup, so the rest of the service stays inspectable without
    /// credentials.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Language mode; `multi` enables automatic language detection.
    #[serde(default = "default_language")]
    pub language: String,

    /// Silence threshold after which the service finalizes an utterance.
    #[serde(default = "default_endpointing_ms")]
    pub endpointing_ms: u32,

    #[serde(default = "default_utterance_end_ms")]
    pub utterance_end_ms: u32,

    /// Keep-alive cadence while the session is open. Must stay below the
    /// service's idle timeout.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslitConfig {
    /// Path to a lexicon JSON file. The built-in lexicon is used when unset.
    #[serde(default)]
    pub lexicon_path: Option<String>,
}

fn default_service_name() -> String {
    "lipi-relay".to_string()
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_endpoint() -> String {
    "wss://api.deepgram.com/v1/listen".to_string()
}

fn default_model() -> String {
    "nova-3".to_string()
}

fn default_language() -> String {
    "multi".to_string()
}

fn default_endpointing_ms() -> u32 {
    400
}

fn default_utterance_end_ms() -> u32 {
    1000
}

fn default_keep_alive_secs() -> u64 {
    8
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            allowed_origin: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            language: default_language(),
            endpointing_ms: default_endpointing_ms(),
            utterance_end_ms: default_utterance_end_ms(),
            keep_alive_secs: default_keep_alive_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file, then `LIPI_*` environment
    /// variables (e.g. `LIPI_SERVICE__HTTP__PORT=8080`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("LIPI").separator("__"))
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;

        // DEEPGRAM_API_KEY is honored for compatibility with existing
        // deployments when no key was set through the file or LIPI_* vars.
        if cfg.upstream.api_key.is_none() {
            if let Ok(key) = std::env::var("DEEPGRAM_API_KEY") {
                if !key.is_empty() {
                    cfg.upstream.api_key = Some(key);
                }
            }
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.service.name, "lipi-relay");
        assert_eq!(cfg.service.http.port, 3000);
        assert_eq!(cfg.upstream.model, "nova-3");
        assert_eq!(cfg.upstream.language, "multi");
        assert_eq!(cfg.upstream.endpointing_ms, 400);
        assert_eq!(cfg.upstream.utterance_end_ms, 1000);
        assert_eq!(cfg.upstream.keep_alive_secs, 8);
        assert!(cfg.upstream.api_key.is_none());
        assert!(cfg.translit.lexicon_path.is_none());
    }
}
