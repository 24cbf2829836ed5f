//! Noteassist - on-device next-word prediction and editing assist for notes.
//!
//! # Overview
//!
//! The engine learns word pairs from the note being edited and offers the
//! most likely next word while the user types. It also takes care of the
//! small structural chores of a plain-text editor:
//! - Closing brackets and quotes, and stepping over closers already there
//! - Continuing checklists, bullet lists and numbered lists on Enter
//! - Accepting a suggestion, indenting or outdenting with Tab
//! - Selecting a URL under the caret for the context menu
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Key press      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     debounced      ┌─────────────────┐
//! │  Session        │ ─────────────────▶ │  ModelHost      │ ← inline or worker (refresh.rs)
//! │  (session.rs)   │ ◀── Arc<Model> ─── │  + ModelSlot    │
//! └────────┬────────┘                    └────────┬────────┘
//!          │                                      │
//!          ▼                                      ▼
//! ┌─────────────────┐                    ┌─────────────────┐
//! │  Assist         │ ← closure, lists,  │  Model          │ ← bigram counts (model.rs)
//! │  (assist.rs)    │   Tab (buffer.rs)  │  + Tokenizer    │
//! └────────┬────────┘                    └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Predictor      │ ← max-frequency or Laplace sampling (predictor.rs)
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - `tokenizer`: word tokens
//! - `model`: bigram frequency model
//! - `predictor`: sampling policies
//! - `buffer`: text, caret and selection
//! - `closure`, `list`, `assist`: editing assists and key dispatch
//! - `debounce`, `refresh`: timers and background model builds
//! - `session`: per-note editing context
//! - `note`, `preferences`, `storage`, `config`: persistence and settings

pub mod assist;
pub mod buffer;
pub mod closure;
pub mod config;
pub mod debounce;
pub mod list;
pub mod model;
pub mod note;
pub mod predictor;
pub mod preferences;
pub mod refresh;
pub mod session;
pub mod storage;
pub mod tokenizer;

pub use assist::{Key, KeyOutcome, Modifiers, Suggestion};
pub use config::Config;
pub use model::{Candidate, Model};
pub use predictor::{predict, SamplingPolicy};
pub use preferences::Preferences;
pub use session::Session;
pub use storage::{FileStore, MemoryStore, Storage, StorageError};
