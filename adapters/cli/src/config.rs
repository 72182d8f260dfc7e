use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use moodfield_rendering::CanvasSize;
use serde::Deserialize;

/// Configuration file picked up from the working directory when present.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "moodfield.toml";

const DEFAULT_NAME_PREFIX: &str = "Moodfield";
const DEFAULT_DESCRIPTION: &str =
    "A generative artwork grown from a mood phrase and an activity count.";

/// Settings read from `moodfield.toml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// Raster settings.
    pub(crate) render: RenderConfig,
    /// Metadata document settings.
    pub(crate) metadata: MetadataConfig,
}

/// `[render]` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RenderConfig {
    /// Side length of generated artifacts in pixels.
    pub(crate) canvas_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas_size: CanvasSize::DEFAULT.side(),
        }
    }
}

/// `[metadata]` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MetadataConfig {
    /// Description shared by every metadata document.
    pub(crate) description: String,
    /// Collection landing page.
    pub(crate) external_url: Option<String>,
    /// Text placed before the seed in token names.
    pub(crate) name_prefix: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_owned(),
            external_url: None,
            name_prefix: DEFAULT_NAME_PREFIX.to_owned(),
        }
    }
}

impl CliConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read when present and defaults are used otherwise.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parses configuration from TOML text and checks value ranges.
    pub(crate) fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        let side = config.render.canvas_size;
        ensure!(
            (1..=CanvasSize::MAX_SIDE).contains(&side),
            "render.canvas_size must be between 1 and {}, got {side}",
            CanvasSize::MAX_SIDE
        );
        Ok(config)
    }

    /// Canvas size the engine should render with.
    pub(crate) fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.render.canvas_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CliConfig::from_toml("").expect("parse");
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.canvas(), CanvasSize::DEFAULT);
        assert_eq!(config.metadata.name_prefix, "Moodfield");
    }

    #[test]
    fn tables_override_individual_fields() {
        let config = CliConfig::from_toml(
            r#"
            [render]
            canvas_size = 800

            [metadata]
            external_url = "https://example.org"
            "#,
        )
        .expect("parse");

        assert_eq!(config.canvas(), CanvasSize::new(800));
        assert_eq!(
            config.metadata.external_url.as_deref(),
            Some("https://example.org")
        );
        assert_eq!(config.metadata.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::from_toml("[render]\ncanvas = 10\n").is_err());
    }

    #[test]
    fn canvas_size_outside_surface_bounds_is_rejected() {
        let zero = CliConfig::from_toml("[render]\ncanvas_size = 0\n").expect_err("zero side");
        assert!(zero.to_string().contains("render.canvas_size must be between 1 and 4096"));

        let huge = CliConfig::from_toml("[render]\ncanvas_size = 5000\n").expect_err("huge side");
        assert!(huge.to_string().contains("got 5000"));

        let edge = CliConfig::from_toml("[render]\ncanvas_size = 4096\n").expect("largest side");
        assert_eq!(edge.canvas(), CanvasSize::new(CanvasSize::MAX_SIDE));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let error = CliConfig::load(Some(Path::new("/nonexistent/moodfield.toml")))
            .expect_err("missing file");
        assert!(error.to_string().contains("failed to read config file"));
    }
}
