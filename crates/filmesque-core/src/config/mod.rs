//! Engine configuration management.
//!
//! Configuration is read from the first YAML file found among:
//! 1. an explicit path passed to [`load_engine_config`]
//! 2. `$FILMESQUE_CONFIG`
//! 3. `./config/filmesque.yml` and `./filmesque.yml` (or `.yaml`)
//! 4. `<config dir>/filmesque/filmesque.yml`
//!
//! Problems along the way are collected as warnings; loading never fails.

mod defaults;


pub use defaults::{
    EngineConfig, DEFAULT_GRAIN_SEED, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_THUMBNAIL_SIZE,
};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use crate::error::Result;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV_VAR: &str = "FILMESQUE_CONFIG";

const CONFIG_FILENAMES: &[&str] = &["filmesque.yml", "filmesque.yaml"];

/// Loaded configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct EngineConfigHandle {
    pub config: EngineConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Parse and sanitize a YAML document.
pub fn parse_engine_config(contents: &str) -> Result<EngineConfig> {
    let config: EngineConfig = serde_yaml::from_str(contents)?;
    Ok(config.sanitized())
}

/// Load configuration from disk, optionally trying `custom_path` first.
pub fn load_engine_config(custom_path: Option<&Path>) -> EngineConfigHandle {
    let mut warnings = Vec::new();

    for candidate in config_candidates(custom_path) {
        if !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(&candidate) {
            Ok(contents) => match parse_engine_config(&contents) {
                Ok(config) => {
                    let source = fs::canonicalize(&candidate).unwrap_or(candidate);
                    return EngineConfigHandle {
                        config,
                        source: Some(source),
                        warnings,
                    };
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse engine config {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read engine config {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    warnings.push("No engine config found; using built-in defaults.".to_string());
    EngineConfigHandle {
        config: EngineConfig::default(),
        source: None,
        warnings,
    }
}

fn config_candidates(custom_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        candidates.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join("config").join(name));
            candidates.push(cwd.join(name));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("filmesque").join(CONFIG_FILENAMES[0]));
    }

    candidates
}

static ENGINE_CONFIG_HANDLE: OnceLock<EngineConfigHandle> = OnceLock::new();
static LOG_CONFIG_ONCE: Once = Once::new();

/// Process-wide configuration, loaded on first access.
pub fn engine_config_handle() -> &'static EngineConfigHandle {
    ENGINE_CONFIG_HANDLE.get_or_init(|| load_engine_config(None))
}

/// Process-wide configuration values. Logs where they came from on first use.
pub fn global_engine_config() -> &'static EngineConfig {
    log_config_usage();
    &engine_config_handle().config
}

/// Log the config source and any warnings, once per process.
pub fn log_config_usage() {
    LOG_CONFIG_ONCE.call_once(|| {
        let handle = engine_config_handle();
        match &handle.source {
            Some(source) => log::info!("loaded engine config from {}", source.display()),
            None => log::info!("using built-in engine defaults"),
        }
        for warning in &handle.warnings {
            log::warn!("config: {}", warning);
        }
    });
}
