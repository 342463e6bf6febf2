//! anitui - Terminal browser for anime discovery and streaming
//!
//! A terminal interface for browsing seasonal and trending anime, reading
//! details, and resolving playable episode streams from a streaming
//! aggregator. Also ships a small HTTP proxy that normalizes both upstreams
//! behind one local API surface.
//!
//! # Modules
//!
//! - `models` - Catalog entries, episodes, stream sources
//! - `api` - Upstream clients (metadata + streaming aggregator)
//! - `resolve` - Title-to-stream reconciliation pipeline
//! - `proxy` - Local HTTP API proxy
//! - `stream` - Local playback (mpv/VLC)
//! - `ui` - TUI components
//! - `app` - Application state and navigation
//! - `cli`/`commands` - Scriptable command surface

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod proxy;
pub mod resolve;
pub mod stream;
pub mod ui;

// Re-export commonly used types
pub use models::{
    AudioVariant, CatalogEntry, DetailRecord, EpisodeMeta, EpisodePage, MirrorServer,
    PlayableSource, StreamCandidate, StreamEpisode, SubtitleTrack,
};

pub use api::{ConsumetClient, JikanClient};
pub use app::{App, AppState};
pub use proxy::ProxyState;
pub use resolve::StreamResolver;
