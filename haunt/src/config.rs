use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Context;
use wraith::WatchConfig;

/// Where the config is looked for when `--config` isn't given.
pub(crate) static CONFIG_PATH: LazyLock<PathBuf> = LazyLock::new(|| PathBuf::from("haunt.toml"));

/// Reads the config. An explicitly given path must exist; the default path may be absent, in
/// which case the built-in Tetris config is used.
pub fn load(path: Option<&Path>) -> anyhow::Result<WatchConfig> {
    match path {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("could not read config at {path:?}"))?;
            WatchConfig::from_toml(&data).with_context(|| format!("in config {path:?}"))
        }
        None => WatchConfig::read(&CONFIG_PATH)
            .with_context(|| format!("in config {:?}", *CONFIG_PATH)),
    }
}
