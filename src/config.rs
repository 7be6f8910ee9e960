//! Configuration management for the NOVOYAZ server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the PaddleOCR sidecar.
    pub endpoint: String,
    /// Per-call recognition timeout in seconds.
    pub timeout_secs: u64,
    /// Detection box threshold forwarded to the engine. Degraded historical
    /// scans need a lower value than the engine default.
    pub det_box_thresh: f32,
    /// Ask the sidecar to run inference on GPU.
    pub use_gpu: bool,
    /// Construct the engine during startup instead of on the first request.
    pub warmup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            engine: EngineConfig {
                endpoint: "http://localhost:8866".to_string(),
                timeout_secs: 30,
                det_box_thresh: 0.3,
                use_gpu: false,
                warmup: false,
            },
        }
    }
}

impl Config {
    /// Build configuration from `NOVOYAZ_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            server: ServerConfig {
                host: env::var("NOVOYAZ_HOST").unwrap_or(defaults.server.host),
                port: env::var("NOVOYAZ_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            engine: EngineConfig {
                endpoint: env::var("NOVOYAZ_ENGINE_ENDPOINT").unwrap_or(defaults.engine.endpoint),
                timeout_secs: env::var("NOVOYAZ_ENGINE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.engine.timeout_secs),
                det_box_thresh: env::var("NOVOYAZ_ENGINE_DET_BOX_THRESH")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.engine.det_box_thresh),
                use_gpu: env::var("NOVOYAZ_ENGINE_USE_GPU")
                    .ok()
                    .map(|v| is_truthy(&v))
                    .unwrap_or(defaults.engine.use_gpu),
                warmup: env::var("NOVOYAZ_ENGINE_WARMUP")
                    .ok()
                    .map(|v| is_truthy(&v))
                    .unwrap_or(defaults.engine.warmup),
            },
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
