//! Local Player - mpv/VLC playback support
//!
//! Opens resolved stream URLs directly in mpv or VLC.

use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::models::{PlayableSource, SubtitleTrack};

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// mpv media player (default, best HLS support)
    #[default]
    Mpv,
    /// VLC media player
    Vlc,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors from local player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
}

/// Local player for resolved streams
pub struct LocalPlayer {
    player_type: PlayerType,
}

impl LocalPlayer {
    /// Create a new local player with the specified type
    pub fn new(player_type: PlayerType) -> Self {
        Self { player_type }
    }

    /// Create an mpv player
    pub fn mpv() -> Self {
        Self::new(PlayerType::Mpv)
    }

    /// Create a VLC player
    pub fn vlc() -> Self {
        Self::new(PlayerType::Vlc)
    }

    /// Get the player type
    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.player_type.command();

        // If it's a full path (macOS app bundle), check if it exists
        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        // Otherwise use 'which' to find in PATH
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Launch the player on a resolved source with optional subtitle tracks
    ///
    /// Subtitle tracks are remote URLs; mpv takes any number, VLC only
    /// accepts one external slave so the first track wins.
    ///
    /// # Returns
    /// The spawned child process
    pub async fn play(
        &self,
        source: &PlayableSource,
        subtitles: &[SubtitleTrack],
    ) -> Result<Child, PlayerError> {
        let mut cmd = Command::new(self.player_type.command());

        match self.player_type {
            PlayerType::Mpv => {
                cmd.arg(&source.url);
                for track in subtitles {
                    cmd.arg(format!("--sub-file={}", track.url));
                }
                cmd.arg("--force-window=immediate");
            }
            PlayerType::Vlc => {
                cmd.arg(&source.url);
                if let Some(track) = subtitles.first() {
                    cmd.arg("--input-slave").arg(&track.url);
                }
                cmd.arg("--no-video-title-show");
            }
        }

        // Don't capture output - let it display normally
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.player_type.command().to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })
    }

    /// Play a source and wait for the player to close
    pub async fn play_and_wait(
        &self,
        source: &PlayableSource,
        subtitles: &[SubtitleTrack],
    ) -> Result<(), PlayerError> {
        let mut child = self.play(source, subtitles).await?;
        let _ = child.wait().await;
        Ok(())
    }
}
