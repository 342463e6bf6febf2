//! Configuration management for anitui
//!
//! Handles config file loading/saving.
//! Config is stored at ~/.config/anitui/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{AudioVariant, MirrorServer};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local proxy base URL, tried before the upstreams when set
    pub proxy_url: Option<String>,
    /// Override for the metadata upstream
    pub jikan_url: Option<String>,
    /// Override for the streaming-aggregator upstream
    pub consumet_url: Option<String>,
    /// Preferred audio variant ("sub" or "dub")
    pub preferred_audio: Option<String>,
    /// Preferred mirror server ("gogocdn", "vidstreaming", "streamsb")
    pub preferred_server: Option<String>,
    /// Local player command ("mpv" or "vlc")
    pub player: Option<String>,
}

impl Config {
    /// Get config file path (~/.config/anitui/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("anitui").join("config.toml"))
    }

    /// Load config from the default location, or return default if not found
    pub fn load() -> Self {
        Self::load_from(None)
    }

    /// Load config from an explicit path (`--config`), falling back to the
    /// default location when none is given
    pub fn load_from(path: Option<&Path>) -> Self {
        path.map(Path::to_path_buf)
            .or_else(Self::path)
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path =
            Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Proxy base with an environment override (ANITUI_PROXY_URL)
    pub fn proxy_base(&self) -> Option<String> {
        std::env::var("ANITUI_PROXY_URL")
            .ok()
            .or_else(|| self.proxy_url.clone())
    }

    /// Preferred audio variant, defaulting to subtitled
    pub fn audio_variant(&self) -> AudioVariant {
        match self.preferred_audio.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("dub") => AudioVariant::Dub,
            _ => AudioVariant::Sub,
        }
    }

    /// Preferred mirror server, defaulting to gogocdn
    pub fn mirror_server(&self) -> MirrorServer {
        self.preferred_server
            .as_deref()
            .and_then(MirrorServer::from_str_loose)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.proxy_url.is_none());
        assert_eq!(config.audio_variant(), AudioVariant::Sub);
        assert_eq!(config.mirror_server(), MirrorServer::GogoCdn);
    }

    #[test]
    fn test_audio_variant_parse() {
        let config = Config {
            preferred_audio: Some("DUB".into()),
            ..Default::default()
        };
        assert_eq!(config.audio_variant(), AudioVariant::Dub);
    }

    #[test]
    fn test_mirror_server_parse() {
        let config = Config {
            preferred_server: Some("vidstreaming".into()),
            ..Default::default()
        };
        assert_eq!(config.mirror_server(), MirrorServer::Vidstreaming);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let path = std::env::temp_dir().join("anitui-config-load-test.toml");
        std::fs::write(&path, "preferred_audio = \"dub\"\nplayer = \"vlc\"\n").unwrap();

        let config = Config::load_from(Some(&path));
        assert_eq!(config.audio_variant(), AudioVariant::Dub);
        assert_eq!(config.player.as_deref(), Some("vlc"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_from_missing_path_defaults() {
        let config = Config::load_from(Some(Path::new("/nonexistent/anitui.toml")));
        assert!(config.proxy_url.is_none());
        assert_eq!(config.audio_variant(), AudioVariant::Sub);
    }

    #[test]
    fn test_mirror_server_unknown_falls_back() {
        let config = Config {
            preferred_server: Some("bogus".into()),
            ..Default::default()
        };
        assert_eq!(config.mirror_server(), MirrorServer::GogoCdn);
    }
}
