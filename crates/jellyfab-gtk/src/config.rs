use crate::events::AppEvent;
use async_channel::Sender;
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use jellyfab::{FabOptions, FabState, HexColor};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Display, Deref, From, Into, AsRef)]
#[serde(transparent)]
pub struct ShellCommand(String);

jellyfab::impl_string_newtype!(ShellCommand);

#[derive(Debug, Clone, Deserialize)]
pub struct ItemConfig {
    pub icon: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub exec: Option<ShellCommand>,
}

impl ItemConfig {
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.icon)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub main_diameter: f64,
    pub item_diameter: f64,
    pub main_color: HexColor,
    pub item_color: HexColor,
    pub margin: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            main_diameter: 56.0,
            item_diameter: 40.0,
            main_color: HexColor::new(0.38, 0.0, 0.93, 1.0),
            item_color: HexColor::new(0.01, 0.85, 0.77, 1.0),
            margin: 24.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_true")]
    pub show_overlay: bool,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub options: FabOptions,
    #[serde(default)]
    pub initial_state: FabState,
    #[serde(default)]
    pub primary: Vec<ItemConfig>,
    #[serde(default)]
    pub secondary: Vec<ItemConfig>,
}

fn default_true() -> bool {
    true
}

/// Command-line adjustments applied on top of every loaded config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub primary: Option<usize>,
    pub secondary: Option<usize>,
    pub no_overlay: bool,
}

impl Overrides {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(n) = self.primary {
            config.primary.truncate(n);
        }
        if let Some(n) = self.secondary {
            config.secondary.truncate(n);
        }
        if self.no_overlay {
            config.show_overlay = false;
        }
        config
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "jellyfab", "jellyfab").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix("JELLYFAB")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Layers the bundled defaults, then `user`, then `env`.
fn build<S>(user: S, env: config::Environment) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let s = config::Config::builder()
        .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
        .add_source(user)
        .add_source(env)
        .build()?;
    Ok(s.try_deserialize()?)
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    build(config::File::from(path).required(false), env_source())
}

pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => load_from(p),
        None => load_from(&get_config_path()?),
    }
}

pub fn load_or_default(path: Option<&Path>) -> Config {
    match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using bundled defaults: {}", e);
            bundled_defaults()
        }
    }
}

fn empty_toml() -> config::File<config::FileSourceString, config::FileFormat> {
    config::File::from_str("", config::FileFormat::Toml)
}

fn bundled_defaults() -> Config {
    build(empty_toml(), env_source().source(Some(config::Map::new()))).unwrap_or_else(|e| {
        log::error!("Bundled config is invalid: {}", e);
        Config {
            show_overlay: true,
            style: StyleConfig::default(),
            options: FabOptions::default(),
            initial_state: FabState::default(),
            primary: Vec::new(),
            secondary: Vec::new(),
        }
    })
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let relevant = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if relevant
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
