//! File logging. The terminal belongs to the UI, so records go to the cache dir.

use std::fs::File;
use std::path::PathBuf;

use color_eyre::Result;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::cache::CacheManager;
use crate::config::LoggingConfig;

/// Install the global logger. Returns the log path, or `None` when disabled.
pub fn init(config: &LoggingConfig, debug: bool, cache: &CacheManager) -> Result<Option<PathBuf>> {
    let level = config.level_filter(debug);
    if !config.enabled || level == LevelFilter::Off {
        return Ok(None);
    }

    cache.ensure_cache_dir()?;
    let path = cache.log_path();
    let file = File::create(&path)?;
    let log_config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .add_filter_allow_str("npl_dash")
        .build();
    WriteLogger::init(level, log_config, file)?;
    Ok(Some(path))
}
