use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::application::detection::{
    AggregationPolicy, ControllerSettings, LabelMergePolicy, MergeMode,
};
use crate::application::detection::label_merge::DEFAULT_DENYLIST;

pub const DEFAULT_CONFIG_FILE: &str = "trashcam.toml";
const ENV_PREFIX: &str = "TRASHCAM";

/// Full runtime configuration: defaults, then `trashcam.toml` (or the file
/// named by `TRASHCAM_CONFIG`), then `TRASHCAM_<SECTION>__<KEY>` variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub leaderboard: LeaderboardConfig,
    pub kiosk: KioskConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Empty disables `POST /api/score`.
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".into(),
            endpoint: "https://generativelanguage.googleapis.com".into(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Postgres URL; the in-memory store is used when unset.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tick_ms: u64,
    pub confidence_threshold: f32,
    pub exclusions: Vec<String>,
    pub min_dwell_ms: u64,
    pub classification_timeout_ms: u64,
    pub merge_mode: MergeMode,
    pub denylist: Vec<String>,
    pub secondary_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            confidence_threshold: 0.6,
            exclusions: vec!["wine glass".into()],
            min_dwell_ms: 0,
            classification_timeout_ms: 15_000,
            merge_mode: MergeMode::Union,
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            secondary_threshold: 0.5,
        }
    }
}

impl PipelineConfig {
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            tick: Duration::from_millis(self.tick_ms),
            min_dwell: Duration::from_millis(self.min_dwell_ms),
            aggregation: AggregationPolicy::new(
                self.confidence_threshold,
                self.exclusions.iter().cloned(),
            ),
        }
    }

    pub fn merge_policy(&self) -> LabelMergePolicy {
        LabelMergePolicy::new(self.merge_mode, self.denylist.iter().cloned())
    }

    pub fn classification_timeout(&self) -> Duration {
        Duration::from_millis(self.classification_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Settings for the `trashcam-kiosk` binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub server_url: String,
    /// Directory holding `front/` and `back/` image folders.
    pub frames_dir: PathBuf,
    /// Bearer token for score credits; no credit is sent when unset.
    pub token: Option<String>,
    /// Actor id the token was issued for.
    pub actor_id: Option<String>,
    /// Also run recognition on the frozen frame at finalization.
    pub secondary_recognition: bool,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            frames_dir: PathBuf::from("frames"),
            token: None,
            actor_id: None,
            secondary_recognition: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = std::env::var("TRASHCAM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        let config = Config::builder()
            .add_source(File::from(Path::new(&path)).required(false))
            .add_source(environment())
            .build()
            .with_context(|| format!("failed to read configuration (file: {})", path))?;
        Self::finish(config)
    }

    /// Parse a TOML document on top of the defaults. Environment is ignored.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .context("invalid configuration")?;
        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self> {
        let cfg: Self = config
            .try_deserialize()
            .context("invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let pipeline = &self.pipeline;
        if !(0.0..=1.0).contains(&pipeline.confidence_threshold) {
            return Err(anyhow!(
                "pipeline.confidence_threshold must be within [0, 1], got {}",
                pipeline.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&pipeline.secondary_threshold) {
            return Err(anyhow!(
                "pipeline.secondary_threshold must be within [0, 1], got {}",
                pipeline.secondary_threshold
            ));
        }
        if pipeline.tick_ms == 0 {
            return Err(anyhow!("pipeline.tick_ms must be greater than zero"));
        }
        if pipeline.classification_timeout_ms == 0 {
            return Err(anyhow!("pipeline.classification_timeout_ms must be greater than zero"));
        }
        if self.leaderboard.limit == 0 {
            return Err(anyhow!("leaderboard.limit must be greater than zero"));
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("pipeline.exclusions")
        .with_list_parse_key("pipeline.denylist")
        .try_parsing(true)
}
