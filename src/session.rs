//! One editing session over one note.
//!
//! A [`Session`] owns everything the editing handlers need: the text buffer,
//! the user's preferences, the configuration, the suggestion on display, the
//! two debounce timers and the model host. The editing surface forwards its
//! events to it:
//!
//! | surface event          | session call                         |
//! |------------------------|--------------------------------------|
//! | key down               | [`Session::key_down`]                |
//! | timer / idle callback  | [`Session::tick`]                    |
//! | context menu           | [`Session::context_menu`]            |
//! | window resize          | [`Session::resize`]                  |
//! | storage changed        | [`Session::apply_external_change`], [`Session::reload_preferences`] |
//!
//! # Timing
//!
//! Every input restarts two independent debounce timers. When the model timer
//! fires, the full text is handed to the model host; when the persist timer
//! fires, the note is written to storage. Predictions always use the newest
//! finished model, which may trail the buffer by one quiet period.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::assist::{
    self, EditCommand, Key, KeyOutcome, Modifiers, Suggestion, SuggestionPosition, TextMetrics,
};
use crate::buffer::TextBuffer;
use crate::config::Config;
use crate::debounce::{Debouncer, Throttle};
use crate::model::Model;
use crate::note::{new_id, now_millis, Note, Notebook};
use crate::predictor::predict;
use crate::preferences::Preferences;
use crate::refresh::{ModelHost, ModelSlot};
use crate::storage::Storage;

/// Editing context for one open note.
#[derive(Debug)]
pub struct Session<S: Storage> {
    note_id: String,
    buffer: TextBuffer,
    prefs: Preferences,
    config: Config,
    suggestion: Option<Suggestion>,
    host: ModelHost,
    model_timer: Debouncer,
    persist_timer: Debouncer,
    resize_throttle: Throttle,
    metrics: TextMetrics,
    rng: StdRng,
    focused: bool,
    storage: S,
}

impl<S: Storage> Session<S> {
    /// Open the note `note_id`, or a new empty note when `None`.
    ///
    /// Storage failures are logged and the session starts from defaults.
    /// An initial model build is requested right away.
    ///
    /// # Arguments
    /// * `storage` - Where notes and preferences live
    /// * `note_id` - The note to edit; `None` starts a note with a fresh id
    /// * `config` - Timing, sampling policy and layout metrics
    ///
    /// # Example
    /// ```rust
    /// use noteassist::{Config, MemoryStore, Session};
    ///
    /// let config = Config { background_model: false, ..Config::default() };
    /// let session = Session::open(MemoryStore::new(), Some("todo"), config);
    /// assert_eq!(session.note_id(), "todo");
    /// assert!(session.text().is_empty());
    /// ```
    pub fn open(storage: S, note_id: Option<&str>, config: Config) -> Self {
        let note_id = note_id.map_or_else(new_id, str::to_string);
        let prefs = Preferences::load(&storage);

        let mut buffer = TextBuffer::default();
        match Notebook::load(&storage) {
            Ok(notebook) => {
                if let Some(note) = notebook.find(&note_id) {
                    buffer.set_text(&note.text);
                    buffer.set_caret(note.caret);
                }
            }
            Err(err) => warn!(note_id = %note_id, "failed to load notes: {err}"),
        }

        let slot = ModelSlot::new();
        let host = if config.background_model {
            ModelHost::worker(slot)
        } else {
            ModelHost::inline(slot)
        };

        let mut session = Self {
            note_id,
            buffer,
            prefs,
            model_timer: Debouncer::new(config.debounce()),
            persist_timer: Debouncer::new(config.debounce()),
            resize_throttle: Throttle::new(config.resize_throttle()),
            metrics: TextMetrics {
                line_height: config.line_height_px,
                char_width: config.char_width_px,
            },
            config,
            suggestion: None,
            host,
            rng: StdRng::from_entropy(),
            focused: true,
            storage,
        };
        session.rebuild_model();
        session
    }

    /// Use `rng` for prediction sampling.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.suggestion.as_ref()
    }

    /// The newest finished model.
    pub fn model(&self) -> Option<Arc<Model>> {
        self.host.slot().snapshot()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Move the selection, as a click or arrow key would.
    ///
    /// The suggestion belonged to the old caret and is dropped.
    pub fn select(&mut self, start: usize, end: usize) {
        self.buffer.select(start, end);
        self.suggestion = None;
    }

    /// Handle a key press at time `now`.
    ///
    /// Keys no assist claims get their ordinary effect, so the buffer always
    /// reflects the key afterwards. The returned outcome tells the surface
    /// whether an assist took over.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers, now: Instant) -> KeyOutcome {
        let outcome = match EditCommand::from_key(key, modifiers, &self.prefs) {
            Some(command) => {
                let pending = self.suggestion.as_ref().map(|s| s.text.as_str());
                assist::apply(command, &mut self.buffer, pending)
            }
            None => KeyOutcome::Default,
        };

        if outcome == KeyOutcome::Default {
            assist::apply_default(key, &mut self.buffer);
        }

        self.on_input(now);
        outcome
    }

    /// Type every character of `text`, one key press each.
    pub fn type_text(&mut self, text: &str, now: Instant) {
        for ch in text.chars() {
            let key = match ch {
                '\n' => Key::Enter,
                '\t' => Key::Tab,
                other => Key::Char(other),
            };
            self.key_down(key, Modifiers::NONE, now);
        }
    }

    fn on_input(&mut self, now: Instant) {
        self.refresh_suggestion();
        self.model_timer.trigger(now);
        self.persist_timer.trigger(now);
    }

    /// Recompute the suggestion for the word at the caret.
    fn refresh_suggestion(&mut self) {
        self.suggestion = None;

        if !self.prefs.predictive || !self.buffer.is_caret_at_end_of_line() {
            return;
        }
        let Some(model) = self.model() else {
            return;
        };

        let prefix = self.buffer.word_at_caret().word;
        if let Some(candidate) = predict(&prefix, &model, self.config.policy, &mut self.rng) {
            self.suggestion = Some(Suggestion::new(&candidate.word, self.suggestion_position()));
        }
    }

    fn suggestion_position(&self) -> SuggestionPosition {
        SuggestionPosition::at_caret(self.buffer.caret_position(), self.metrics)
    }

    /// Run whatever debounced work is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.model_timer.poll(now) {
            self.rebuild_model();
        }
        if self.persist_timer.poll(now) {
            self.persist();
        }
    }

    /// Run all pending debounced work immediately.
    pub fn flush(&mut self) {
        if self.model_timer.is_pending() {
            self.model_timer.cancel();
            self.rebuild_model();
        }
        if self.persist_timer.is_pending() {
            self.persist_timer.cancel();
            self.persist();
        }
    }

    fn rebuild_model(&mut self) {
        let seq = self.host.submit(self.buffer.text());
        debug!(seq, "model rebuild requested");
    }

    /// Write the note to storage.
    ///
    /// On failure the note stays unsaved until the next successful persist.
    pub fn persist(&mut self) -> bool {
        let mut notebook = match Notebook::load(&self.storage) {
            Ok(notebook) => notebook,
            Err(err) => {
                warn!(note_id = %self.note_id, "failed to load notes, not saving: {err}");
                return false;
            }
        };

        notebook.upsert(
            &self.note_id,
            &self.buffer.text(),
            self.buffer.caret(),
            self.config.title_max_chars,
            now_millis(),
        );

        match notebook.save(&self.storage) {
            Ok(()) => {
                debug!(note_id = %self.note_id, "note saved");
                true
            }
            Err(err) => {
                warn!(note_id = %self.note_id, "failed to save note: {err}");
                false
            }
        }
    }

    /// Handle a context-menu request: select the URL under the caret.
    pub fn context_menu(&mut self) -> bool {
        let selected = assist::select_url_at_caret(&mut self.buffer);
        if selected {
            self.suggestion = None;
        }
        selected
    }

    /// The surface was resized and now lays text out with `metrics`.
    ///
    /// The new metrics are kept for later suggestions. The current one is
    /// repositioned at most once per throttle interval; the new position is
    /// returned when it was.
    pub fn resize(&mut self, metrics: TextMetrics, now: Instant) -> Option<SuggestionPosition> {
        self.metrics = metrics;
        if self.suggestion.is_none() || !self.resize_throttle.ready(now) {
            return None;
        }

        let position = self.suggestion_position();
        if let Some(suggestion) = self.suggestion.as_mut() {
            suggestion.position = position;
        }
        Some(position)
    }

    /// Apply and store new preferences.
    pub fn set_preferences(&mut self, prefs: Preferences) {
        if let Err(err) = prefs.save(&self.storage) {
            warn!("failed to save preferences: {err}");
        }
        self.apply_preferences(prefs);
    }

    /// Pick up preferences changed elsewhere.
    pub fn reload_preferences(&mut self) {
        let prefs = Preferences::load(&self.storage);
        self.apply_preferences(prefs);
    }

    fn apply_preferences(&mut self, prefs: Preferences) {
        if !prefs.predictive {
            self.suggestion = None;
        }
        self.prefs = prefs;
    }

    /// Take over a version of this note saved by another editor.
    ///
    /// Ignored while this session has focus, for other notes, and when the
    /// text is unchanged. Returns whether the buffer was replaced.
    pub fn apply_external_change(&mut self, note: &Note) -> bool {
        if self.focused || note.id != self.note_id || note.text == self.buffer.text() {
            return false;
        }

        info!(note_id = %self.note_id, "note changed elsewhere, reloading");
        self.buffer.set_text(&note.text);
        self.buffer.set_caret(note.caret);
        self.suggestion = None;
        true
    }
}
