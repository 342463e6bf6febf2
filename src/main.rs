//! anitui - Terminal browser for anime discovery and streaming
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! anitui
//!
//! # CLI mode (for automation)
//! anitui search "cowboy bebop"
//! anitui resolve "One Piece" --mal-id 21 --episode 1
//! anitui serve --port 3001
//! ```

use std::io::{stdout, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use anitui::api::{consumet, jikan, ConsumetClient, JikanClient};
use anitui::app::{App, AppState, HomeRail, InputMode, LoadingState, WatchState};
use anitui::cli::{Cli, Command, ExitCode, Output};
use anitui::commands;
use anitui::config::Config;
use anitui::models::{CatalogEntry, DetailRecord};
use anitui::resolve::{EpisodeSet, ResolvedSource, StreamResolver};
use anitui::stream::LocalPlayer;

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --config overrides the default location for both modes
    let config = Config::load_from(cli.config.as_deref());

    if cli.is_cli_mode() {
        // CLI mode: execute command and exit
        let exit_code = run_cli(cli, &config).await;
        std::process::exit(exit_code.into());
    } else {
        // TUI mode: launch interactive interface
        run_tui(config).await
    }
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli, config: &Config) -> ExitCode {
    let output = Output::new(&cli);

    match cli.command {
        Some(Command::Search(cmd)) => commands::search_cmd(cmd, config, &output).await,
        Some(Command::Trending(cmd)) => commands::trending_cmd(cmd, config, &output).await,
        Some(Command::Popular(cmd)) => commands::popular_cmd(cmd, config, &output).await,
        Some(Command::Latest(cmd)) => commands::latest_cmd(cmd, config, &output).await,
        Some(Command::Info(cmd)) => commands::info_cmd(cmd, config, &output).await,
        Some(Command::Episodes(cmd)) => commands::episodes_cmd(cmd, config, &output).await,
        Some(Command::Resolve(cmd)) => commands::resolve_cmd(cmd, config, &output).await,
        Some(Command::Watch(cmd)) => commands::watch_cmd(cmd, config, &output).await,
        Some(Command::Serve(cmd)) => {
            init_tracing();
            commands::serve_cmd(cmd, config, &output).await
        }
        None => ExitCode::Success,
    }
}

/// Structured logging for server mode (RUST_LOG controls the filter)
fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anitui=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Completed async work, applied to the app state on arrival
enum AppEvent {
    Entries(HomeRail, Vec<CatalogEntry>),
    SearchResults(Vec<CatalogEntry>),
    // Carries the memoized dub availability for the title, if known
    Detail(Box<DetailRecord>, Option<bool>),
    Recommendations(u64, Vec<CatalogEntry>),
    // Tagged with the watch generation; stale results are dropped
    Episodes(u64, EpisodeSet),
    Resolved(u64, ResolvedSource),
    Error(String),
}

struct Backend {
    jikan: JikanClient,
    resolver: Arc<tokio::sync::Mutex<StreamResolver>>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(config: Config) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();

    let jikan_direct = config
        .jikan_url
        .clone()
        .unwrap_or_else(|| jikan::JIKAN_URL.to_string());
    let consumet_direct = config
        .consumet_url
        .clone()
        .unwrap_or_else(|| consumet::CONSUMET_URL.to_string());

    let backend = Backend {
        jikan: JikanClient::with_bases(config.proxy_base(), jikan_direct),
        resolver: Arc::new(tokio::sync::Mutex::new(StreamResolver::new(
            ConsumetClient::with_bases(config.proxy_base(), consumet_direct),
        ))),
        tx,
    };

    let mut terminal = init_terminal()?;
    let mut app = App::new();

    // Kick off the initial rail load
    app.home.loading = LoadingState::Loading(None);
    spawn_rail_fetch(&backend, app.home.rail);

    let result = run_event_loop(&mut terminal, &mut app, &backend, rx, &config).await;

    // Always restore terminal, even on error
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop - handles input, applies async results, renders UI
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    backend: &Backend,
    mut rx: mpsc::UnboundedReceiver<AppEvent>,
    config: &Config,
) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    while app.running {
        terminal.draw(|frame| anitui::ui::render(frame, app))?;

        // Drain completed async work before blocking on input
        while let Ok(ev) = rx.try_recv() {
            apply_event(app, backend, ev, config);
        }

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore releases on Windows)
                if key.kind == KeyEventKind::Press {
                    handle_key(app, backend, config, key);
                }
            }
        }
    }

    Ok(())
}

/// Route a keypress: let the app mutate its state, then start any async
/// work the transition calls for
fn handle_key(app: &mut App, backend: &Backend, config: &Config, key: KeyEvent) {
    let was_editing = app.input_mode == InputMode::Editing;
    let rail_before = app.home.rail;

    app.handle_key(key);

    match key.code {
        KeyCode::Enter if was_editing => {
            // Search submitted from the input box
            let query = app.search.query.trim().to_string();
            if !query.is_empty() {
                app.search.loading = LoadingState::Loading(None);
                spawn_search(backend, query);
            }
        }
        KeyCode::Tab if app.state == AppState::Home && app.home.rail != rail_before => {
            spawn_rail_fetch(backend, app.home.rail);
        }
        KeyCode::Enter => match app.state {
            AppState::Home => {
                if let Some(entry) = app.home.selected_entry() {
                    open_detail(app, backend, entry.mal_id);
                }
            }
            AppState::Search => {
                if let Some(entry) = app.search.selected_result() {
                    open_detail(app, backend, entry.mal_id);
                }
            }
            AppState::Detail => open_watch(app, backend, config),
            AppState::Watch => resolve_selected(app, backend),
        },
        KeyCode::Char('w') if app.state == AppState::Detail => {
            open_watch(app, backend, config);
        }
        _ => {}
    }
}

fn open_detail(app: &mut App, backend: &Backend, mal_id: u64) {
    app.detail = None;
    app.navigate(AppState::Detail);

    let jikan = backend.jikan.clone();
    let resolver = backend.resolver.clone();
    let tx = backend.tx.clone();
    tokio::spawn(async move {
        match jikan.info(mal_id).await {
            Ok(record) => {
                let hint = resolver.lock().await.dub_hint(record.search_title());
                let _ = tx.send(AppEvent::Detail(Box::new(record), hint));
            }
            Err(e) => {
                let _ = tx.send(AppEvent::Error(format!("Failed to load title: {}", e)));
            }
        }
        if let Ok(recs) = jikan.recommendations(mal_id).await {
            let _ = tx.send(AppEvent::Recommendations(mal_id, recs));
        }
    });
}

fn open_watch(app: &mut App, backend: &Backend, config: &Config) {
    let Some(detail) = &app.detail else {
        return;
    };
    let title = detail.record.search_title().to_string();
    let mal_id = detail.mal_id();

    app.watch = WatchState::new(
        detail.title().to_string(),
        mal_id,
        config.audio_variant(),
        config.mirror_server(),
    );
    let generation = app.watch.bump_generation();
    app.navigate(AppState::Watch);

    let resolver = backend.resolver.clone();
    let tx = backend.tx.clone();
    tokio::spawn(async move {
        let set = resolver.lock().await.episodes_for(&title, mal_id).await;
        let _ = tx.send(AppEvent::Episodes(generation, set));
    });
}

fn resolve_selected(app: &mut App, backend: &Backend) {
    let Some(episode) = app.watch.selected_episode() else {
        return;
    };
    let server = app.watch.server;
    let generation = app.watch.bump_generation();
    app.watch.loading = LoadingState::Loading(Some("Resolving stream...".into()));

    let resolver = backend.resolver.clone();
    let tx = backend.tx.clone();
    tokio::spawn(async move {
        let resolved = resolver.lock().await.sources_for(&episode.id, server).await;
        let _ = tx.send(AppEvent::Resolved(generation, resolved));
    });
}

fn spawn_rail_fetch(backend: &Backend, rail: HomeRail) {
    let jikan = backend.jikan.clone();
    let tx = backend.tx.clone();
    tokio::spawn(async move {
        let result = match rail {
            HomeRail::Trending => jikan.trending().await,
            HomeRail::Popular => jikan.popular().await,
            HomeRail::Latest => jikan.latest().await,
        };
        let ev = match result {
            Ok(entries) => AppEvent::Entries(rail, entries),
            Err(e) => AppEvent::Error(format!("Failed to load {}: {}", rail.title(), e)),
        };
        let _ = tx.send(ev);
    });
}

fn spawn_search(backend: &Backend, query: String) {
    let jikan = backend.jikan.clone();
    let tx = backend.tx.clone();
    tokio::spawn(async move {
        let ev = match jikan.search(&query).await {
            Ok(results) => AppEvent::SearchResults(results),
            Err(e) => AppEvent::Error(format!("Search failed: {}", e)),
        };
        let _ = tx.send(ev);
    });
}

/// Fold one completed async result into the app state
fn apply_event(app: &mut App, backend: &Backend, event: AppEvent, config: &Config) {
    match event {
        AppEvent::Entries(rail, entries) => {
            // A rail switch may have raced the fetch
            if app.home.rail == rail {
                app.home.set_entries(entries);
            }
        }
        AppEvent::SearchResults(results) => {
            app.search.set_results(results);
        }
        AppEvent::Detail(record, dub_hint) => {
            let mut detail = anitui::app::DetailState::new(*record);
            detail.dub_hint = dub_hint;
            app.detail = Some(detail);
        }
        AppEvent::Recommendations(mal_id, recs) => {
            if let Some(detail) = &mut app.detail {
                if detail.mal_id() == mal_id {
                    detail.set_recommendations(recs);
                }
            }
        }
        AppEvent::Episodes(generation, set) => {
            if app.watch.generation == generation {
                app.watch.set_episode_set(set);
            }
        }
        AppEvent::Resolved(generation, resolved) => {
            if app.watch.generation != generation {
                return;
            }
            app.watch.loading = LoadingState::Idle;
            if let Some(source) = resolved.source.clone() {
                let subtitles = resolved.subtitles.clone();
                let player = LocalPlayer::new(match config.player.as_deref() {
                    Some("vlc") => anitui::stream::PlayerType::Vlc,
                    _ => anitui::stream::PlayerType::Mpv,
                });
                let tx = backend.tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = player.play(&source, &subtitles).await {
                        let _ = tx.send(AppEvent::Error(format!("Player failed: {}", e)));
                    }
                });
            } else {
                app.set_error("No playable source on this server");
            }
            app.watch.resolved = Some(resolved);
        }
        AppEvent::Error(msg) => {
            app.set_error(msg);
            if app.home.loading.is_loading() {
                app.home.loading = LoadingState::Idle;
            }
            if app.search.loading.is_loading() {
                app.search.loading = LoadingState::Idle;
            }
            if app.watch.loading.is_loading() {
                app.watch.loading = LoadingState::Idle;
            }
        }
    }
}
