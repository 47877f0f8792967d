use crate::{EmoteError, MatchPolicy, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_EMOTE_SET_ID: &str = "01FE9DRF000009TR6M9N941CYW";
pub const DEFAULT_API_BASE_URL: &str = "https://api.7tv.app/v3";

pub const MIN_DISPLAY_SIZE: u32 = 16;
pub const MAX_DISPLAY_SIZE: u32 = 128;

/// How asset URLs are derived from a host base URL: `<base>/<scale>.<extension>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetFormat {
    /// Scale used for inline images
    pub display_scale: String,

    /// Scale used for hover previews
    pub preview_scale: String,

    pub extension: String,
}

impl Default for AssetFormat {
    fn default() -> Self {
        Self {
            display_scale: "2x".to_string(),
            preview_scale: "3x".to_string(),
            extension: "webp".to_string(),
        }
    }
}

impl AssetFormat {
    pub fn url_for(&self, base_url: &str, scale: &str) -> String {
        format!("{}/{}.{}", base_url.trim_end_matches('/'), scale, self.extension)
    }

    pub fn display_url(&self, base_url: &str) -> String {
        self.url_for(base_url, &self.display_scale)
    }

    pub fn preview_url(&self, base_url: &str) -> String {
        self.url_for(base_url, &self.preview_scale)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        for (key, value) in [
            ("display_scale", &self.display_scale),
            ("preview_scale", &self.preview_scale),
            ("extension", &self.extension),
        ] {
            if value.trim().is_empty() {
                return Err(format!("asset.{key} must not be empty"));
            }
            if value.contains('/') {
                return Err(format!("asset.{key} must not contain '/'"));
            }
        }
        Ok(())
    }
}

/// User-facing options for emote loading and rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmoteConfig {
    /// Remote emote set to load
    pub emote_set_id: String,

    /// Root of the emote-set API
    pub api_base_url: String,

    pub match_policy: MatchPolicy,

    /// Inline image height in pixels
    pub emote_display_size: u32,

    pub show_preview_on_hover: bool,

    /// Raise log verbosity to debug
    pub debug_mode: bool,

    pub asset: AssetFormat,
}

impl Default for EmoteConfig {
    fn default() -> Self {
        Self {
            emote_set_id: DEFAULT_EMOTE_SET_ID.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            match_policy: MatchPolicy::Word,
            emote_display_size: 32,
            show_preview_on_hover: true,
            debug_mode: false,
            asset: AssetFormat::default(),
        }
    }
}

impl EmoteConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.emote_set_id.trim().is_empty() {
            return Err("emote_set_id must not be empty".to_string());
        }

        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"))
        {
            return Err(format!(
                "api_base_url ({}) must be an http(s) URL",
                self.api_base_url
            ));
        }

        if !(MIN_DISPLAY_SIZE..=MAX_DISPLAY_SIZE).contains(&self.emote_display_size) {
            return Err(format!(
                "emote_display_size ({}) must be within {}..={}",
                self.emote_display_size, MIN_DISPLAY_SIZE, MAX_DISPLAY_SIZE
            ));
        }

        self.asset.validate()
    }

    /// Read a TOML config; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate().map_err(EmoteError::InvalidConfig)?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate().map_err(EmoteError::InvalidConfig)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Whether switching from `self` to `next` requires recompiling matchers
    pub fn invalidates_matchers(&self, next: &EmoteConfig) -> bool {
        self.match_policy != next.match_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_valid() {
        let config = EmoteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.match_policy, MatchPolicy::Word);
        assert_eq!(config.emote_display_size, 32);
        assert!(config.show_preview_on_hover);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EmoteConfig {
            emote_display_size: 8,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.emote_display_size = 200;
        assert!(config.validate().is_err());

        config.emote_display_size = 48;
        config.emote_set_id = "  ".to_string();
        assert!(config.validate().is_err());

        config.emote_set_id = DEFAULT_EMOTE_SET_ID.to_string();
        config.asset.extension = String::new();
        assert!(config.validate().is_err());

        config.asset.extension = "avif".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EmoteConfig::from_toml(
            r#"
            match_policy = "colon"

            [asset]
            extension = "gif"
            "#,
        )
        .unwrap();
        assert_eq!(config.match_policy, MatchPolicy::Colon);
        assert_eq!(config.asset.extension, "gif");
        assert_eq!(config.asset.display_scale, "2x");
        assert_eq!(config.emote_set_id, DEFAULT_EMOTE_SET_ID);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            EmoteConfig::from_toml("emote_display_size = 4"),
            Err(EmoteError::InvalidConfig(_))
        ));
        assert!(matches!(
            EmoteConfig::from_toml("match_policy = \"regex\""),
            Err(EmoteError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("emotes.toml");

        assert_eq!(EmoteConfig::load(&path).unwrap(), EmoteConfig::default());

        let config = EmoteConfig {
            match_policy: MatchPolicy::CaseInsensitive,
            emote_display_size: 64,
            debug_mode: true,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EmoteConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_only_policy_change_invalidates_matchers() {
        let base = EmoteConfig::default();
        let resized = EmoteConfig {
            emote_display_size: 96,
            show_preview_on_hover: false,
            ..Default::default()
        };
        assert!(!base.invalidates_matchers(&resized));

        let colon = EmoteConfig {
            match_policy: MatchPolicy::Colon,
            ..Default::default()
        };
        assert!(base.invalidates_matchers(&colon));
    }

    #[test]
    fn test_asset_urls() {
        let format = AssetFormat::default();
        let base = "https://cdn.7tv.app/emote/abc";
        assert_eq!(format.display_url(base), "https://cdn.7tv.app/emote/abc/2x.webp");
        assert_eq!(
            format.preview_url("https://cdn.7tv.app/emote/abc/"),
            "https://cdn.7tv.app/emote/abc/3x.webp"
        );
    }
}
