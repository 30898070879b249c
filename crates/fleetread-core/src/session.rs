//! Reading session: settings, pause state, and the paced play loop.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use log::{debug, info, warn};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    time::sleep,
};

use crate::{
    document::{Document, Paragraph},
    pacing,
    settings::{Settings, SettingsBounds, SettingsPatch, StyleValidator},
};

/// Two-level cursor position; `-1` marks a before-first sentinel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChunkPosition {
    pub paragraph: isize,
    pub chunk: isize,
}

impl ChunkPosition {
    pub const fn rewound() -> Self {
        Self {
            paragraph: -1,
            chunk: -1,
        }
    }
}

/// Change notification delivered to subscribers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    PauseChanged {
        paused: bool,
    },
    RateChanged {
        words_per_minute: u16,
    },
    /// The current position moved; `text` is the new current chunk's display
    /// text, absent at a sentinel position.
    PositionChanged {
        old: ChunkPosition,
        new: ChunkPosition,
        text: Option<String>,
    },
}

/// Coarse lifecycle phase, derived for logging and hosts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionPhase {
    Idle,
    Ready,
    Reading,
    Paused,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionError {
    StatePoisoned,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LoopExit {
    Exhausted,
    Superseded,
}

struct Session {
    text: String,
    document: Document,
    settings: Settings,
    bounds: SettingsBounds,
    characters_per_second: f32,
    chunk_target_chars: f32,
    paused: bool,
    reading: bool,
    generation: u64,
    subscribers: Vec<UnboundedSender<SessionEvent>>,
}

impl Session {
    fn emit(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn position(&self) -> ChunkPosition {
        ChunkPosition {
            paragraph: self.document.paragraph_index(),
            chunk: self
                .document
                .current_paragraph()
                .map_or(-1, Paragraph::chunk_index),
        }
    }

    fn current_chunk_text(&self) -> Option<String> {
        self.document
            .current_chunk()
            .map(|chunk| chunk.text().to_string())
    }

    /// Run `op` and emit one `PositionChanged` if the two-level position
    /// moved.
    fn with_position_events<R>(&mut self, op: impl FnOnce(&mut Self) -> R) -> R {
        let old = self.position();
        let result = op(self);
        let new = self.position();
        if old != new {
            let text = self.current_chunk_text();
            self.emit(SessionEvent::PositionChanged { old, new, text });
        }
        result
    }

    fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            debug!("session: paused={paused}");
            self.emit(SessionEvent::PauseChanged { paused });
        }
    }

    fn update_rate(&mut self, words_per_minute: u16) {
        let clamped = words_per_minute.clamp(
            self.bounds.min_words_per_minute,
            self.bounds.max_words_per_minute,
        );
        self.settings.words_per_minute = clamped;
        self.characters_per_second = pacing::characters_per_second(clamped);
        self.emit(SessionEvent::RateChanged {
            words_per_minute: clamped,
        });
    }

    fn load_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.generation += 1;
        self.with_position_events(|session| {
            session.document = Document::build(&session.text, session.chunk_target_chars);
        });
        self.set_paused(true);
        info!(
            "session: text loaded paragraphs={} total_words={}",
            self.document.paragraph_count(),
            self.document.total_words()
        );
    }

    fn apply_settings(&mut self, patch: &SettingsPatch, validator: &dyn StyleValidator) {
        self.settings = self.settings.merged(patch, self.bounds, validator);
        self.update_rate(self.settings.words_per_minute);

        let target = self.settings.chunk_target_chars();
        let rechunk = (target - self.chunk_target_chars).abs() > f32::EPSILON;
        self.chunk_target_chars = target;
        if rechunk && !self.text.is_empty() {
            let was_paused = self.paused;
            self.set_paused(true);
            let offset = self.document.word_offset();
            self.with_position_events(|session| {
                session.document = Document::build(&session.text, session.chunk_target_chars);
                session.document.set_word_offset(offset);
            });
            self.set_paused(was_paused);
            info!(
                "session: rechunked words_per_chunk={} restored_offset={}",
                self.settings.words_per_chunk, offset
            );
        }
    }

    /// Advance one chunk for the play loop and report how long to display
    /// it. `None` means the document is exhausted.
    fn reading_step(&mut self) -> Option<u64> {
        self.with_position_events(|session| {
            let mut wait = 0u64;
            let advance_paragraph = !session
                .document
                .current_paragraph()
                .is_some_and(Paragraph::has_next_chunk);
            if advance_paragraph {
                let _ = session.document.next_paragraph();
                if session.settings.slight_pause {
                    wait += pacing::PARAGRAPH_PAUSE_MS;
                }
            }
            let chunk_chars = session
                .document
                .current_paragraph_mut()
                .and_then(Paragraph::next_chunk)
                .map(crate::chunk::ChunkText::len)?;
            Some(wait + pacing::chunk_milliseconds(chunk_chars, session.characters_per_second))
        })
    }

    fn finish_reading(&mut self) {
        self.with_position_events(|session| session.document.rewind());
        self.set_paused(true);
        info!("session: reading complete; rewound to start");
    }

    fn phase(&self) -> SessionPhase {
        if self.document.is_empty() {
            SessionPhase::Idle
        } else if self.reading && !self.paused {
            SessionPhase::Reading
        } else if self.reading {
            SessionPhase::Paused
        } else {
            SessionPhase::Ready
        }
    }
}

/// Cloneable handle over one reading session. All state lives behind a
/// single lock; every mutation completes between the play loop's
/// suspension points.
#[derive(Clone)]
pub struct SpeedReader {
    inner: Arc<Mutex<Session>>,
}

impl Default for SpeedReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedReader {
    pub fn new() -> Self {
        Self::with_settings(Settings::default(), SettingsBounds::default())
    }

    pub fn with_settings(mut settings: Settings, bounds: SettingsBounds) -> Self {
        settings.words_per_minute = settings.words_per_minute.clamp(
            bounds.min_words_per_minute,
            bounds.max_words_per_minute,
        );
        settings.words_per_chunk = settings
            .words_per_chunk
            .clamp(bounds.min_words_per_chunk, bounds.max_words_per_chunk);

        let characters_per_second = pacing::characters_per_second(settings.words_per_minute);
        let chunk_target_chars = settings.chunk_target_chars();
        let session = Session {
            text: String::new(),
            document: Document::build("", chunk_target_chars),
            settings,
            bounds,
            characters_per_second,
            chunk_target_chars,
            paused: true,
            reading: false,
            generation: 0,
            subscribers: Vec::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn state(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_state(&self) -> Result<MutexGuard<'_, Session>, SessionError> {
        self.inner.lock().map_err(|_| SessionError::StatePoisoned)
    }

    /// Register for change notifications.
    pub fn subscribe(&self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().subscribers.push(tx);
        rx
    }

    /// Replace the loaded text. The session lands paused at the start; any
    /// in-flight play loop observes the replacement and exits.
    pub fn load_text(&self, text: &str) {
        self.state().load_text(text);
    }

    pub fn text(&self) -> String {
        self.state().text.clone()
    }

    pub fn words_per_minute(&self) -> u16 {
        self.state().settings.words_per_minute
    }

    pub fn set_words_per_minute(&self, words_per_minute: u16) {
        self.state().update_rate(words_per_minute);
    }

    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    pub fn set_paused(&self, paused: bool) {
        self.state().set_paused(paused);
    }

    pub fn toggle_paused(&self) -> bool {
        let mut session = self.state();
        let paused = !session.paused;
        session.set_paused(paused);
        paused
    }

    pub fn settings(&self) -> Settings {
        self.state().settings.clone()
    }

    /// Merge a partial settings update. A chunk-size change rebuilds the
    /// document in place, preserving the reading position through the
    /// word-offset round trip.
    pub fn apply_settings(&self, patch: &SettingsPatch, validator: &dyn StyleValidator) {
        self.state().apply_settings(patch, validator);
    }

    pub fn total_words(&self) -> u32 {
        self.state().document.total_words()
    }

    pub fn paragraph_count(&self) -> usize {
        self.state().document.paragraph_count()
    }

    pub fn word_offset(&self) -> u32 {
        self.state().document.word_offset()
    }

    pub fn set_word_offset(&self, offset: u32) {
        let mut session = self.state();
        session.with_position_events(|session| {
            session.document.set_word_offset(offset);
        });
    }

    pub fn current_chunk_text(&self) -> Option<String> {
        self.state().current_chunk_text()
    }

    pub fn position(&self) -> ChunkPosition {
        self.state().position()
    }

    pub fn to_next_chunk(&self) {
        let mut session = self.state();
        session.with_position_events(|session| {
            let _ = session.document.to_next_chunk();
        });
    }

    pub fn to_previous_chunk(&self) {
        let mut session = self.state();
        session.with_position_events(|session| {
            let _ = session.document.to_previous_chunk();
        });
    }

    pub fn rewind(&self) {
        let mut session = self.state();
        session.with_position_events(|session| session.document.rewind());
    }

    pub fn has_next_paragraph(&self) -> bool {
        self.state().document.has_next_paragraph()
    }

    pub fn has_previous_paragraph(&self) -> bool {
        self.state().document.has_previous_paragraph()
    }

    pub fn has_next_chunk(&self) -> bool {
        self.state().document.has_next_chunk()
    }

    pub fn has_previous_chunk(&self) -> bool {
        self.state().document.has_previous_chunk()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state().phase()
    }

    /// Drive the play loop until the document is exhausted or the text is
    /// replaced. Refuses to run when a loop is already active; pausing is
    /// the only way to stop an active loop short of replacing the text.
    pub async fn start_reading(&self) {
        let generation = {
            let mut session = self.state();
            if session.reading {
                debug!("session: reading loop already active");
                return;
            }
            session.reading = true;
            session.generation
        };

        match self.reading_loop(generation).await {
            Ok(LoopExit::Exhausted) => {}
            Ok(LoopExit::Superseded) => {
                debug!("session: reading loop superseded by new text");
            }
            Err(err) => warn!("session: reading loop terminated: {err:?}"),
        }
        self.state().reading = false;
    }

    async fn reading_loop(&self, generation: u64) -> Result<LoopExit, SessionError> {
        loop {
            let wait = {
                let mut session = self.try_state()?;
                if session.generation != generation {
                    return Ok(LoopExit::Superseded);
                }
                session.reading_step()
            };
            let Some(wait_ms) = wait else {
                break;
            };
            sleep(Duration::from_millis(wait_ms)).await;

            loop {
                let (paused, superseded) = {
                    let session = self.try_state()?;
                    (session.paused, session.generation != generation)
                };
                if superseded {
                    return Ok(LoopExit::Superseded);
                }
                if !paused {
                    break;
                }
                sleep(Duration::from_millis(pacing::PAUSE_POLL_MS)).await;
            }
        }

        self.try_state()?.finish_reading();
        Ok(LoopExit::Exhausted)
    }
}
