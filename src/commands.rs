//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the appropriate backend services.
//! Each handler takes CLI args, the loaded Config, and Output, returns
//! ExitCode.

use serde::Serialize;

use crate::api::{ConsumetClient, JikanClient};
use crate::cli::{
    EpisodesCmd, ExitCode, InfoCmd, Output, PlayerChoice, ResolveCmd, SearchCmd, ServeCmd,
    TrendingCmd, WatchCmd,
};
use crate::config::Config;
use crate::models::{AudioVariant, MirrorServer, PlayableSource, SubtitleTrack};
use crate::proxy::{self, ProxyState};
use crate::resolve::StreamResolver;
use crate::stream::{LocalPlayer, PlayerType};

fn jikan_client(config: &Config) -> JikanClient {
    let direct = config
        .jikan_url
        .clone()
        .unwrap_or_else(|| crate::api::jikan::JIKAN_URL.to_string());
    JikanClient::with_bases(config.proxy_base(), direct)
}

fn consumet_client(config: &Config) -> ConsumetClient {
    let direct = config
        .consumet_url
        .clone()
        .unwrap_or_else(|| crate::api::consumet::CONSUMET_URL.to_string());
    ConsumetClient::with_bases(config.proxy_base(), direct)
}

// =============================================================================
// Catalog Commands
// =============================================================================

pub async fn search_cmd(cmd: SearchCmd, config: &Config, output: &Output) -> ExitCode {
    let client = jikan_client(config);

    output.info(format!("Searching for: {}", cmd.query));

    match client.search(&cmd.query).await {
        Ok(mut results) => {
            results.truncate(cmd.limit);
            if let Err(e) = output.print(&results) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Search failed: {}", e), ExitCode::NetworkError),
    }
}

pub async fn trending_cmd(cmd: TrendingCmd, config: &Config, output: &Output) -> ExitCode {
    let client = jikan_client(config);

    output.info("Fetching trending...");

    match client.trending().await {
        Ok(mut results) => {
            results.truncate(cmd.limit);
            if let Err(e) = output.print(&results) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(
            format!("Trending fetch failed: {}", e),
            ExitCode::NetworkError,
        ),
    }
}

pub async fn popular_cmd(cmd: TrendingCmd, config: &Config, output: &Output) -> ExitCode {
    let client = jikan_client(config);

    output.info("Fetching popular...");

    match client.popular().await {
        Ok(mut results) => {
            results.truncate(cmd.limit);
            if let Err(e) = output.print(&results) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(
            format!("Popular fetch failed: {}", e),
            ExitCode::NetworkError,
        ),
    }
}

pub async fn latest_cmd(cmd: TrendingCmd, config: &Config, output: &Output) -> ExitCode {
    let client = jikan_client(config);

    output.info("Fetching latest season...");

    match client.latest().await {
        Ok(mut results) => {
            results.truncate(cmd.limit);
            if let Err(e) = output.print(&results) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(
            format!("Latest fetch failed: {}", e),
            ExitCode::NetworkError,
        ),
    }
}

pub async fn info_cmd(cmd: InfoCmd, config: &Config, output: &Output) -> ExitCode {
    let client = jikan_client(config);

    output.info(format!("Getting info for MAL id: {}", cmd.mal_id));

    match client.info(cmd.mal_id).await {
        Ok(detail) => {
            if let Err(e) = output.print(&detail) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Info fetch failed: {}", e), ExitCode::NetworkError),
    }
}

// =============================================================================
// Streaming Commands
// =============================================================================

pub async fn episodes_cmd(cmd: EpisodesCmd, config: &Config, output: &Output) -> ExitCode {
    let mut resolver = StreamResolver::new(consumet_client(config));

    output.info(format!("Listing episodes for: {}", cmd.title));

    // Unknown MAL id never matches a hit, so the first result wins
    let set = resolver
        .episodes_for(&cmd.title, cmd.mal_id.unwrap_or(0))
        .await;
    if set.is_empty() {
        return output.error("No episodes found", ExitCode::NoEpisodes);
    }

    let variant = if cmd.dub {
        AudioVariant::Dub
    } else {
        AudioVariant::Sub
    };
    let episodes = set.filtered(variant);
    if episodes.is_empty() {
        return output.error(
            format!("No {} episodes found", variant),
            ExitCode::NoEpisodes,
        );
    }

    if let Err(e) = output.print(&episodes) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

#[derive(Serialize)]
struct ResolvedOutput {
    episode_id: String,
    episode_number: u32,
    source: PlayableSource,
    subtitles: Vec<SubtitleTrack>,
}

/// Run the full resolution pipeline and return a playable source.
///
/// Shared between `resolve` and `watch`.
async fn do_resolve(
    cmd: &ResolveCmd,
    config: &Config,
    output: &Output,
) -> Result<ResolvedOutput, ExitCode> {
    let mut resolver = StreamResolver::new(consumet_client(config));

    output.info(format!(
        "Resolving episode {} of: {}",
        cmd.episode, cmd.title
    ));

    let set = resolver
        .episodes_for(&cmd.title, cmd.mal_id.unwrap_or(0))
        .await;
    if set.is_empty() {
        return Err(output.error("No episodes found", ExitCode::NoEpisodes));
    }

    let variant = if cmd.dub {
        AudioVariant::Dub
    } else {
        config.audio_variant()
    };
    let episodes = set.filtered(variant);
    let episode = match episodes.iter().find(|e| e.number == cmd.episode) {
        Some(ep) => ep,
        None => {
            return Err(output.error(
                format!("Episode {} not found ({})", cmd.episode, variant),
                ExitCode::NoEpisodes,
            ))
        }
    };

    let server = cmd
        .server
        .as_deref()
        .and_then(MirrorServer::from_str_loose)
        .unwrap_or_else(|| config.mirror_server());

    let resolved = resolver.sources_for(&episode.id, server).await;
    match resolved.source {
        Some(source) => Ok(ResolvedOutput {
            episode_id: episode.id.clone(),
            episode_number: episode.number,
            source,
            subtitles: resolved.subtitles,
        }),
        None => Err(output.error("No playable source found", ExitCode::NoSource)),
    }
}

pub async fn resolve_cmd(cmd: ResolveCmd, config: &Config, output: &Output) -> ExitCode {
    match do_resolve(&cmd, config, output).await {
        Ok(resolved) => {
            if let Err(e) = output.print(&resolved) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(code) => code,
    }
}

pub async fn watch_cmd(cmd: WatchCmd, config: &Config, output: &Output) -> ExitCode {
    let resolved = match do_resolve(&cmd.resolve, config, output).await {
        Ok(r) => r,
        Err(code) => return code,
    };

    let player_type = match cmd.player {
        PlayerChoice::Mpv => PlayerType::Mpv,
        PlayerChoice::Vlc => PlayerType::Vlc,
    };
    let player = LocalPlayer::new(player_type);

    output.info(format!("Playing: {}", resolved.source.url));

    match player.play_and_wait(&resolved.source, &resolved.subtitles).await {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Player failed: {}", e), ExitCode::Error),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

pub async fn serve_cmd(cmd: ServeCmd, config: &Config, output: &Output) -> ExitCode {
    let state = ProxyState::with_bases(
        config
            .jikan_url
            .as_deref()
            .unwrap_or(crate::api::jikan::JIKAN_URL),
        config
            .consumet_url
            .as_deref()
            .unwrap_or(crate::api::consumet::CONSUMET_URL),
    );

    let addr = match format!("{}:{}", cmd.host, cmd.port).parse() {
        Ok(addr) => addr,
        Err(e) => return output.error(format!("Invalid bind address: {}", e), ExitCode::InvalidArgs),
    };

    output.info(format!("Serving API proxy on http://{}", addr));

    match proxy::serve(addr, state).await {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Server error: {}", e), ExitCode::Error),
    }
}
