//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shop_sdk::config::LogConfig;
use shop_sdk::data::notify::SilentNotifier;
use shop_sdk::data::Notifier;
use shop_sdk::{logging, ClientConfig, Storefront};

use crate::output::Output;

/// File names searched for, in order, from the working directory up.
pub const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// Execution context for CLI commands.
pub struct Context {
    pub config: ClientConfig,
    /// Where the config was loaded from, if anywhere.
    pub config_path: Option<PathBuf>,
    pub output: Output,
    pub cwd: PathBuf,
    pub app: Storefront,
}

impl Context {
    /// Load the config, set up logging and build the client.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                let config = ClientConfig::load(&path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?;
                (config, Some(path))
            }
            None => match find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (ClientConfig::default(), None),
            },
        };
        config.apply_env();
        if config.storage.path.is_none() {
            config.storage.path = Some(default_session_path());
        }

        init_logging(&config.log, &output);
        if let Some(path) = &config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        let notifier: Arc<dyn Notifier> = if config.notifications.enabled {
            Arc::new(output.clone())
        } else {
            Arc::new(SilentNotifier)
        };
        let app = Storefront::builder()
            .config(config.clone())
            .notifier(notifier)
            .build()
            .context("Failed to open session storage")?;

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
            app,
        })
    }

    /// Fail unless someone is logged in.
    pub fn require_login(&self) -> Result<()> {
        if !self.app.auth().is_logged_in() {
            anyhow::bail!("Not logged in, run `shop login` first");
        }
        Ok(())
    }
}

/// Log to stderr only when asked to, so regular output stays clean.
fn init_logging(config: &LogConfig, output: &Output) {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    if !output.is_verbose() && !from_env {
        return;
    }
    let mut config = config.clone();
    if output.is_verbose() {
        config.level = "debug".to_string();
    }
    if let Err(e) = logging::init(&config) {
        output.debug(&format!("Logging not initialized: {}", e));
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<(ClientConfig, PathBuf)> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                if let Ok(config) = ClientConfig::load(&path) {
                    return Some((config, path));
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// `~/.local/share/shop/session.json`.
fn default_session_path() -> PathBuf {
    let base = match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local").join("share"),
        None => std::env::temp_dir(),
    };
    base.join("shop").join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let nested = dir.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.join(".shop.toml"),
            "[api]\nbase_url = \"http://example.test/api\"\n",
        )
        .unwrap();

        let (config, path) = find_config(&nested).unwrap();
        assert_eq!(config.api.base_url, "http://example.test/api");
        assert_eq!(path, dir.join(".shop.toml"));
    }
}
