use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use snake_tester_rendering::{Color, Palette};

/// Configuration file picked up from the working directory when present.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "tester.toml";

/// Snake server used when neither the flag nor the file names one.
pub(crate) const DEFAULT_SERVER: &str = "http://localhost:8080";

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 1000;

/// Settings read from `tester.toml`.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TesterConfig {
    pub(crate) server: String,
    pub(crate) request_timeout_ms: u64,
    pub(crate) assets: Option<PathBuf>,
    pub(crate) palette: PaletteConfig,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_owned(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            assets: None,
            palette: PaletteConfig::default(),
        }
    }
}

impl TesterConfig {
    /// Loads the file at `path`, or `tester.toml` when it exists, or the defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => Path::new(DEFAULT_CONFIG_PATH),
            None => return Ok(Self::default()),
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Anchors a relative `assets` path at the directory holding the file.
    fn relative_to(mut self, base: &Path) -> Self {
        self.assets = self.assets.map(|assets| base.join(assets));
        self
    }

    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Board colours as written in the config file.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PaletteConfig {
    overlap: String,
    food: String,
    hazard: String,
    hazard_opacity: f32,
    cell_background: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            overlap: palette.overlap.to_hex(),
            food: palette.food.to_hex(),
            hazard: palette.hazard.to_hex(),
            hazard_opacity: palette.hazard_opacity,
            cell_background: palette.cell_background.to_hex(),
        }
    }
}

impl PaletteConfig {
    pub(crate) fn to_palette(&self) -> Result<Palette> {
        let color = |name: &str, value: &str| {
            Color::from_hex(value).with_context(|| format!("palette.{name} is not a colour"))
        };
        Ok(Palette {
            overlap: color("overlap", &self.overlap)?,
            food: color("food", &self.food)?,
            hazard: color("hazard", &self.hazard)?,
            hazard_opacity: self.hazard_opacity.clamp(0.0, 1.0),
            cell_background: color("cell_background", &self.cell_background)?,
        })
    }
}
