use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::LintwatchConfig;
use super::smart_load;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Values supplied on the command line; they beat every configuration layer
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_dir: Option<PathBuf>,
}

impl LintwatchConfig {
    /// Load from the standard locations relative to the current directory
    pub fn load(custom_config: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_from(
            custom_config,
            Path::new("."),
            Self::user_config_dir().as_deref(),
            overrides,
        )
    }

    /// Load with explicit project and user directories.
    ///
    /// Priority, lowest first: embedded defaults, user config, project config
    /// (both replaced by `custom_config` when given), `LINTWATCH_*` environment
    /// variables, command-line overrides.
    pub fn load_from(
        custom_config: Option<&Path>,
        project_dir: &Path,
        user_dir: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            if !custom_path.exists() {
                anyhow::bail!("Config file not found: {}", custom_path.display());
            }
            tracing::debug!("Using config file {}", custom_path.display());
            figment = figment.merge(smart_load::auto(custom_path));
        } else {
            if let Some(user_dir) = user_dir {
                figment = Self::merge_all_formats(figment, &user_dir.join("config"));
            }
            figment = Self::merge_all_formats(figment, &project_dir.join(".lintwatch"));
        }

        // Environment variables override files, CLI flags override everything
        figment = figment
            .merge(Env::prefixed("LINTWATCH_"))
            .merge(Serialized::defaults(overrides));

        let config: LintwatchConfig = figment
            .extract()
            .context("Failed to parse lintwatch configuration")?;

        tracing::trace!("CONFIG LOAD: linters = {:?}", config.linters);
        Ok(config)
    }

    /// `<config dir>/lintwatch`, e.g. `~/.config/lintwatch` on Linux
    pub fn user_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lintwatch"))
    }

    /// Render the merged configuration in the given format
    pub fn to_format(&self, format: &str) -> Result<String> {
        let rendered = match format {
            "toml" => toml::to_string_pretty(self)?,
            "yaml" | "yml" => serde_yml::to_string(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            other => anyhow::bail!("Unsupported format '{other}' (expected toml, yaml or json)"),
        };
        Ok(rendered)
    }

    fn merge_all_formats(figment: Figment, stem: &Path) -> Figment {
        figment
            .merge(Toml::file(stem.with_extension("toml")))
            .merge(Json::file(stem.with_extension("json")))
            .merge(Yaml::file(stem.with_extension("yaml")))
            .merge(Yaml::file(stem.with_extension("yml")))
    }
}
