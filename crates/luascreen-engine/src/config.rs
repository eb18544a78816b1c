//! Screen configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. Built-in defaults (600x400 window, scale 2, vsync on)
//! 2. An optional TOML file
//! 3. Environment variables (`LUASCREEN_SECTION__KEY`)

use figment::{Figment, providers::{Env, Format, Serialized, Toml}};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix; `LUASCREEN_RENDER__SCALE=3` sets `render.scale`.
pub const ENV_PREFIX: &str = "LUASCREEN_";

/// Main screen configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowSection,
    /// Rendering configuration
    #[serde(default)]
    pub render: RenderSection,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ScreenConfig {
    /// Load configuration from defaults, `path` (if given and present) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ScreenConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError {
                    message: format!("config file {} does not exist", path.display()),
                });
            }
            figment = figment.merge(Toml::file(path));
        }

        // LUASCREEN_WINDOW__TITLE=Demo -> window.title = "Demo"
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: ScreenConfig = figment.extract().map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the screen cannot be opened with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError {
                message: format!(
                    "window size must be positive, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }
        if self.render.scale == 0 {
            return Err(ConfigError {
                message: "render scale must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    /// Window title
    pub title: String,
    /// Initial width in physical pixels
    pub width: u32,
    /// Initial height in physical pixels
    pub height: u32,
    /// Allow the user to resize the window
    pub resizable: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "luascreen".to_string(),
            width: 600,
            height: 400,
            resizable: true,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    /// Initial integer render scale
    pub scale: u32,
    /// Block presentation on vertical sync
    pub vsync: bool,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self { scale: 2, vsync: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `env_logger` filter; falls back to `RUST_LOG`
    pub filter: Option<String>,
}

/// Configuration loading error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = ScreenConfig::default();
        assert_eq!(config.window.width, 600);
        assert_eq!(config.window.height, 400);
        assert_eq!(config.render.scale, 2);
        assert!(config.render.vsync);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = ScreenConfig::load(None).expect("defaults load");
            assert_eq!(config, ScreenConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "screen.toml",
                r#"
                    [window]
                    title = "demo"

                    [render]
                    scale = 4
                "#,
            )?;
            let config = ScreenConfig::load(Some(Path::new("screen.toml"))).expect("file loads");
            assert_eq!(config.window.title, "demo");
            assert_eq!(config.window.width, 600);
            assert_eq!(config.render.scale, 4);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("screen.toml", "[render]\nscale = 4\n")?;
            jail.set_env("LUASCREEN_RENDER__SCALE", "3");
            jail.set_env("LUASCREEN_WINDOW__WIDTH", "320");
            let config = ScreenConfig::load(Some(Path::new("screen.toml"))).expect("env loads");
            assert_eq!(config.render.scale, 3);
            assert_eq!(config.window.width, 320);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(ScreenConfig::load(Some(Path::new("nope.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_zero_scale_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("LUASCREEN_RENDER__SCALE", "0");
            let err = ScreenConfig::load(None).unwrap_err();
            assert!(err.to_string().contains("scale"));
            Ok(())
        });
    }
}
