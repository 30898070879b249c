//! Pacing and navigation engine for timed chunked reading.
//!
//! Text splits into paragraphs and character-budgeted word chunks; a play
//! loop advances through them at a words-per-minute rate with pause,
//! navigation, and live settings that rebuild the document in place while
//! preserving the reading position.

pub mod chunk;
pub mod document;
pub mod pacing;
pub mod range;
pub mod session;
pub mod settings;
pub mod storage;
pub mod text;
pub mod walker;

pub use chunk::ChunkText;
pub use document::{Document, Paragraph};
pub use range::{WordRange, find_index_in_ranges};
pub use session::{ChunkPosition, SessionEvent, SessionPhase, SpeedReader};
pub use settings::{
    AcceptAllStyles, Settings, SettingsBounds, SettingsPatch, StyleProperty, StyleValidator,
    TextAlign,
};
pub use storage::{KeyValueStore, MemoryStore, load_settings, save_settings};
pub use walker::{CursorChange, Walker};
