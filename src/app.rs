//! App state and core application logic
//!
//! Manages the application state machine, navigation stack,
//! and coordinates between UI and backend services.

use crate::models::*;
use crate::resolve::{EpisodeSet, ResolvedSource};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// =============================================================================
// App State Enum
// =============================================================================

/// Application state enum representing current screen
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    /// Home screen with catalog rails
    Home,
    /// Search results view
    Search,
    /// Detail view for a title
    Detail,
    /// Episode list and stream resolution
    Watch,
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Home
    }
}

// =============================================================================
// Input Mode
// =============================================================================

/// Current input mode for keyboard handling
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Text input mode (search box focused)
    Editing,
}

// =============================================================================
// Loading State
// =============================================================================

/// Loading state for async operations
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState {
    /// Idle - no loading in progress
    Idle,
    /// Loading with optional message
    Loading(Option<String>),
    /// Error with message
    Error(String),
}

impl Default for LoadingState {
    fn default() -> Self {
        LoadingState::Idle
    }
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingState::Error(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadingState::Loading(Some(msg)) => Some(msg),
            LoadingState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

// =============================================================================
// Selection State (per-view)
// =============================================================================

/// Selection state for list views
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Scroll offset for viewport
    pub offset: usize,
    /// Total number of items
    pub len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            offset: 0,
            len,
        }
    }

    /// Move selection up
    pub fn up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.offset {
                self.offset = self.selected;
            }
        }
    }

    /// Move selection down
    pub fn down(&mut self) {
        if self.len > 0 && self.selected < self.len - 1 {
            self.selected += 1;
        }
    }

    /// Move selection up by a page
    pub fn page_up(&mut self, page_size: usize) {
        self.selected = self.selected.saturating_sub(page_size);
        if self.selected < self.offset {
            self.offset = self.selected;
        }
    }

    /// Move selection down by a page
    pub fn page_down(&mut self, page_size: usize) {
        if self.len > 0 {
            self.selected = (self.selected + page_size).min(self.len - 1);
        }
    }

    /// Jump to first item
    pub fn first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    /// Jump to last item
    pub fn last(&mut self) {
        if self.len > 0 {
            self.selected = self.len - 1;
        }
    }

    /// Update offset to keep selected item visible
    pub fn scroll_into_view(&mut self, visible_height: usize) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible_height {
            self.offset = self.selected - visible_height + 1;
        }
    }

    /// Reset selection
    pub fn reset(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    /// Update length (e.g., when new results come in)
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

// =============================================================================
// View-Specific State
// =============================================================================

/// Catalog rail shown on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeRail {
    /// Currently-airing titles by popularity
    #[default]
    Trending,
    /// All-time popular TV titles
    Popular,
    /// Current seasonal chart
    Latest,
}

impl HomeRail {
    pub fn next(self) -> Self {
        match self {
            HomeRail::Trending => HomeRail::Popular,
            HomeRail::Popular => HomeRail::Latest,
            HomeRail::Latest => HomeRail::Trending,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            HomeRail::Trending => "Trending",
            HomeRail::Popular => "Popular",
            HomeRail::Latest => "This Season",
        }
    }
}

/// Home view state
#[derive(Debug, Clone, Default)]
pub struct HomeState {
    /// Active rail
    pub rail: HomeRail,
    /// Entries for the active rail
    pub entries: Vec<CatalogEntry>,
    /// Entry list state
    pub list: ListState,
    /// Loading state
    pub loading: LoadingState,
}

impl HomeState {
    /// Set entries and update list state
    pub fn set_entries(&mut self, entries: Vec<CatalogEntry>) {
        self.list.set_len(entries.len());
        self.entries = entries;
        self.loading = LoadingState::Idle;
    }

    /// Switch to the next rail, dropping current entries
    pub fn cycle_rail(&mut self) {
        self.rail = self.rail.next();
        self.entries.clear();
        self.list.reset();
        self.list.set_len(0);
        self.loading = LoadingState::Loading(None);
    }

    /// Get currently selected entry
    pub fn selected_entry(&self) -> Option<&CatalogEntry> {
        self.entries.get(self.list.selected)
    }
}

/// Search view state
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Search query
    pub query: String,
    /// Cursor byte offset into `query`, always on a char boundary
    pub cursor: usize,
    /// Search results
    pub results: Vec<CatalogEntry>,
    /// Results list state
    pub list: ListState,
    /// Loading state
    pub loading: LoadingState,
}

impl SearchState {
    /// Insert character at cursor
    pub fn insert(&mut self, c: char) {
        self.query.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.query.remove(prev);
            self.cursor = prev;
        }
    }

    /// Delete character at cursor
    pub fn delete(&mut self) {
        if self.cursor < self.query.len() {
            self.query.remove(self.cursor);
        }
    }

    /// Move cursor left one char
    pub fn cursor_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    /// Move cursor right one char
    pub fn cursor_right(&mut self) {
        if let Some(c) = self.query[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Byte offset of the char preceding the cursor, if any
    fn prev_boundary(&self) -> Option<usize> {
        self.query[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    /// Move cursor to start
    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end
    pub fn cursor_end(&mut self) {
        self.cursor = self.query.len();
    }

    /// Clear query
    pub fn clear(&mut self) {
        self.query.clear();
        self.cursor = 0;
    }

    /// Set results and update list state
    pub fn set_results(&mut self, results: Vec<CatalogEntry>) {
        self.list.set_len(results.len());
        self.results = results;
        self.loading = LoadingState::Idle;
    }

    /// Get currently selected result
    pub fn selected_result(&self) -> Option<&CatalogEntry> {
        self.results.get(self.list.selected)
    }
}

/// Detail view state
#[derive(Debug, Clone)]
pub struct DetailState {
    /// Full record for the title
    pub record: DetailRecord,
    /// Recommendations shown below the synopsis
    pub recommendations: Vec<CatalogEntry>,
    /// Recommendation list state
    pub rec_list: ListState,
    /// Memoized dub availability from a prior episode fetch, shown in the
    /// header before anything resolves
    pub dub_hint: Option<bool>,
    /// Loading state
    pub loading: LoadingState,
}

impl DetailState {
    pub fn new(record: DetailRecord) -> Self {
        Self {
            record,
            recommendations: Vec::new(),
            rec_list: ListState::new(0),
            dub_hint: None,
            loading: LoadingState::Idle,
        }
    }

    pub fn set_recommendations(&mut self, recs: Vec<CatalogEntry>) {
        self.rec_list.set_len(recs.len());
        self.recommendations = recs;
    }

    pub fn mal_id(&self) -> u64 {
        self.record.entry.mal_id
    }

    pub fn title(&self) -> &str {
        &self.record.entry.title
    }
}

/// Watch view state: episode listing plus stream resolution
#[derive(Debug, Clone, Default)]
pub struct WatchState {
    /// Title being watched (for display and re-resolution)
    pub title: String,
    /// MAL id of the title
    pub mal_id: u64,
    /// Full episode set from the resolver
    pub episode_set: EpisodeSet,
    /// Active audio variant
    pub variant: AudioVariant,
    /// Active mirror server
    pub server: MirrorServer,
    /// Episode list state (over the filtered view)
    pub list: ListState,
    /// Resolved source for the selected episode, if any
    pub resolved: Option<ResolvedSource>,
    /// Loading state
    pub loading: LoadingState,
    /// Monotonic counter; stale async results are dropped on arrival
    pub generation: u64,
}

impl WatchState {
    pub fn new(title: String, mal_id: u64, variant: AudioVariant, server: MirrorServer) -> Self {
        Self {
            title,
            mal_id,
            variant,
            server,
            loading: LoadingState::Loading(Some("Fetching episodes...".into())),
            ..Default::default()
        }
    }

    /// Episodes visible under the active variant
    pub fn episodes(&self) -> Vec<StreamEpisode> {
        self.episode_set.filtered(self.variant)
    }

    /// Install a fresh episode set, keeping the variant viable
    pub fn set_episode_set(&mut self, set: EpisodeSet) {
        // Dub requested but unavailable: fall back to sub
        if self.variant.is_dub() && !set.has_dub {
            self.variant = AudioVariant::Sub;
        }
        self.episode_set = set;
        self.list = ListState::new(self.episodes().len());
        self.loading = LoadingState::Idle;
    }

    /// Switch audio variant; selection always restarts at the top because
    /// the filtered list has different members
    pub fn set_variant(&mut self, variant: AudioVariant) {
        if self.variant == variant {
            return;
        }
        if variant.is_dub() && !self.episode_set.has_dub {
            return;
        }
        self.variant = variant;
        self.resolved = None;
        self.list = ListState::new(self.episodes().len());
    }

    /// Toggle between sub and dub
    pub fn toggle_variant(&mut self) {
        self.set_variant(self.variant.toggled());
    }

    /// Cycle to the next mirror server and drop the stale resolution
    pub fn cycle_server(&mut self) {
        let servers = MirrorServer::all();
        let pos = servers.iter().position(|s| *s == self.server).unwrap_or(0);
        self.server = servers[(pos + 1) % servers.len()];
        self.resolved = None;
    }

    /// Get currently selected episode
    pub fn selected_episode(&self) -> Option<StreamEpisode> {
        self.episodes().get(self.list.selected).cloned()
    }

    /// Bump the generation counter, invalidating in-flight requests
    pub fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug, Default)]
pub struct App {
    /// Current state/screen
    pub state: AppState,
    /// Navigation history stack
    pub nav_stack: Vec<AppState>,
    /// Whether the app is running
    pub running: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Global error message
    pub error: Option<String>,

    // View-specific states
    pub home: HomeState,
    pub search: SearchState,
    pub detail: Option<DetailState>,
    pub watch: WatchState,
}

impl App {
    /// Create a new App instance
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Navigate to a new state, pushing current to stack
    pub fn navigate(&mut self, state: AppState) {
        if self.state != state {
            self.nav_stack.push(self.state.clone());
            self.state = state;
        }
        self.input_mode = InputMode::Normal;
    }

    /// Go back to previous state
    pub fn back(&mut self) -> bool {
        // If in editing mode, exit editing first
        if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
            return true;
        }

        if let Some(prev) = self.nav_stack.pop() {
            self.state = prev;
            true
        } else {
            false
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Clear error message
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    /// Focus search input
    pub fn focus_search(&mut self) {
        if self.state == AppState::Home || self.state == AppState::Search {
            self.input_mode = InputMode::Editing;
            if self.state == AppState::Home {
                self.navigate(AppState::Search);
                self.input_mode = InputMode::Editing;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returns true if event was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Clear error on any keypress
        self.error = None;

        // Global quit shortcut (Ctrl+C or q in normal mode)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return true;
        }

        if self.input_mode == InputMode::Editing {
            self.handle_editing_key(key)
        } else {
            self.handle_normal_key(key)
        }
    }

    /// Handle keys in editing (text input) mode
    fn handle_editing_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                true
            }
            KeyCode::Enter => {
                // Submit search; the event loop triggers the fetch
                self.input_mode = InputMode::Normal;
                true
            }
            KeyCode::Char(c) => {
                self.search.insert(c);
                true
            }
            KeyCode::Backspace => {
                self.search.backspace();
                true
            }
            KeyCode::Delete => {
                self.search.delete();
                true
            }
            KeyCode::Left => {
                self.search.cursor_left();
                true
            }
            KeyCode::Right => {
                self.search.cursor_right();
                true
            }
            KeyCode::Home => {
                self.search.cursor_home();
                true
            }
            KeyCode::End => {
                self.search.cursor_end();
                true
            }
            _ => false,
        }
    }

    /// Handle keys in normal navigation mode
    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        // Global shortcuts
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return true;
            }
            KeyCode::Char('/') => {
                self.focus_search();
                return true;
            }
            KeyCode::Esc => {
                return self.back();
            }
            _ => {}
        }

        // State-specific handling
        match &self.state {
            AppState::Home => self.handle_home_key(key),
            AppState::Search => self.handle_search_key(key),
            AppState::Detail => self.handle_detail_key(key),
            AppState::Watch => self.handle_watch_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.home.list.up();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.home.list.down();
                true
            }
            KeyCode::Tab => {
                self.home.cycle_rail();
                true
            }
            KeyCode::Enter => {
                // Open detail view for selected entry; the event loop fetches
                true
            }
            _ => false,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.search.list.up();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.search.list.down();
                true
            }
            KeyCode::Enter => {
                // Open detail view for selected result
                true
            }
            KeyCode::PageUp => {
                self.search.list.page_up(10);
                true
            }
            KeyCode::PageDown => {
                self.search.list.page_down(10);
                true
            }
            KeyCode::Home => {
                self.search.list.first();
                true
            }
            KeyCode::End => {
                self.search.list.last();
                true
            }
            _ => false,
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(detail) = &mut self.detail {
                    detail.rec_list.up();
                }
                true
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if let Some(detail) = &mut self.detail {
                    detail.rec_list.down();
                }
                true
            }
            KeyCode::Enter | KeyCode::Char('w') => {
                // Go to episode list; the event loop starts resolution
                true
            }
            _ => false,
        }
    }

    fn handle_watch_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.watch.list.up();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.watch.list.down();
                true
            }
            KeyCode::Char('d') => {
                self.watch.toggle_variant();
                true
            }
            KeyCode::Char('m') => {
                self.watch.cycle_server();
                true
            }
            KeyCode::PageUp => {
                self.watch.list.page_up(10);
                true
            }
            KeyCode::PageDown => {
                self.watch.list.page_down(10);
                true
            }
            KeyCode::Enter => {
                // Resolve and play the selected episode; handled by the loop
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
