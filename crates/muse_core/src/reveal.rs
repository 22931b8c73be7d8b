//! Progressive reveal of content blocks.
//!
//! [`Reveal`] is the explicit state machine behind the "AI typing" effect. It
//! owns the block sequence and the reveal cursor and advances one step per
//! [`Reveal::tick`]. It holds no timers itself: a scheduler (see
//! [`crate::typing::TypingSession`]) asks for the delay until the next tick and
//! tags every tick with the [`Generation`] it was scheduled under, so ticks
//! scheduled before a reset, pause or dispose are ignored.

use crate::blocks::{BlockKind, ContentBlock};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cancellation token for scheduled ticks.
pub type Generation = u64;

/// Timing and presentation knobs of the reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealOptions {
    /// Delay per revealed character.
    pub speed: Duration,
    /// Fixed delay between finishing a block and starting the next one.
    pub block_delay: Duration,
    /// Text shown when there is nothing to reveal.
    pub placeholder: String,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            speed: Duration::from_millis(20),
            block_delay: Duration::from_millis(500),
            placeholder: String::from("No content to display yet."),
        }
    }
}

/// Where the reveal currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// No blocks loaded.
    Idle,
    /// Revealing characters of `block`; `offset` characters are visible.
    Typing { block: usize, offset: usize },
    /// Waiting before `next` starts typing.
    PausingBetweenBlocks { next: usize },
    /// Every block is fully visible.
    Complete,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Progress was made; tick again after this delay.
    Next(Duration),
    /// The last block just finished. Returned exactly once per run.
    Completed,
    /// Nothing happened: stale generation, paused, idle, complete or disposed.
    Stopped,
}

/// A block as it should currently be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Revealed prefix of the block content.
    pub text: String,
    /// Whether this block is the one actively typing.
    pub typing: bool,
}

/// Snapshot of the reveal for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Frame {
    /// Empty block sequence: render the placeholder instead of nothing.
    Empty { placeholder: String },
    Blocks {
        blocks: Vec<VisibleBlock>,
        paused: bool,
        complete: bool,
    },
}

impl Frame {
    /// Concatenated visible text, blocks separated by blank lines.
    pub fn text(&self) -> String {
        match self {
            Self::Empty { placeholder } => placeholder.clone(),
            Self::Blocks { blocks, .. } => blocks
                .iter()
                .map(|block| block.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Blocks { complete: true, .. })
    }
}

type CompletionCallback = Box<dyn FnMut() + Send>;

/// Reveal state of one renderer instance.
pub struct Reveal {
    blocks: Vec<ContentBlock>,
    /// Character count of each block, cached at load time.
    lengths: Vec<usize>,
    phase: RevealPhase,
    paused: bool,
    disposed: bool,
    completed: bool,
    generation: Generation,
    options: RevealOptions,
    on_complete: Option<CompletionCallback>,
}

impl std::fmt::Debug for Reveal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reveal")
            .field("blocks", &self.blocks.len())
            .field("phase", &self.phase)
            .field("paused", &self.paused)
            .field("disposed", &self.disposed)
            .field("generation", &self.generation)
            .finish()
    }
}

impl Reveal {
    pub fn new(options: RevealOptions) -> Self {
        Self {
            blocks: Vec::new(),
            lengths: Vec::new(),
            phase: RevealPhase::Idle,
            paused: false,
            disposed: false,
            completed: false,
            generation: 0,
            options,
            on_complete: None,
        }
    }

    pub fn with_blocks(blocks: Vec<ContentBlock>, options: RevealOptions) -> Self {
        let mut reveal = Self::new(options);
        reveal.load(blocks);
        reveal
    }

    /// Registers the callback fired when the last block finishes.
    pub fn on_complete(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Replaces the block sequence and restarts from the first block.
    pub fn load(&mut self, blocks: Vec<ContentBlock>) {
        if self.disposed {
            return;
        }
        self.lengths = blocks.iter().map(ContentBlock::char_len).collect();
        self.blocks = blocks;
        self.reset();
    }

    /// Discards all progress and restarts from the first block.
    pub fn reset(&mut self) {
        if self.disposed {
            return;
        }
        self.generation += 1;
        self.paused = false;
        self.completed = false;
        self.phase = if self.blocks.is_empty() {
            RevealPhase::Idle
        } else {
            RevealPhase::Typing {
                block: 0,
                offset: 0,
            }
        };
        tracing::debug!(
            blocks = self.blocks.len(),
            generation = self.generation,
            "Reset reveal"
        );
    }

    /// Freezes the reveal. Ticks scheduled before the pause become stale.
    ///
    /// Only a reveal that is still typing or between blocks can be paused.
    pub fn pause(&mut self) {
        if self.disposed
            || self.paused
            || matches!(self.phase, RevealPhase::Idle | RevealPhase::Complete)
        {
            return;
        }
        self.paused = true;
        self.generation += 1;
    }

    /// Continues from the exact position the reveal was paused at.
    pub fn resume(&mut self) {
        if self.disposed {
            return;
        }
        self.paused = false;
    }

    /// Flips between playing and paused, returning whether it is now paused.
    pub fn toggle_play(&mut self) -> bool {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        self.paused
    }

    /// Changes the per-character delay for subsequent ticks.
    pub fn set_speed(&mut self, speed: Duration) {
        self.options.speed = speed;
    }

    /// Permanently stops the reveal. Every later call is a silent no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.generation += 1;
        self.on_complete = None;
        tracing::debug!(generation = self.generation, "Disposed reveal");
    }

    /// Delay until the next tick, or `None` when no tick should be scheduled.
    pub fn next_delay(&self) -> Option<Duration> {
        if self.disposed || self.paused {
            return None;
        }
        match self.phase {
            RevealPhase::Typing { .. } => Some(self.options.speed),
            RevealPhase::PausingBetweenBlocks { .. } => Some(self.options.block_delay),
            RevealPhase::Idle | RevealPhase::Complete => None,
        }
    }

    /// Advances by one step if `generation` is still current.
    pub fn tick(&mut self, generation: Generation) -> Tick {
        if self.disposed || self.paused || generation != self.generation {
            tracing::trace!(
                generation,
                current = self.generation,
                paused = self.paused,
                disposed = self.disposed,
                "Ignoring tick"
            );
            return Tick::Stopped;
        }

        match self.phase {
            RevealPhase::Idle | RevealPhase::Complete => Tick::Stopped,
            RevealPhase::PausingBetweenBlocks { next } => {
                self.phase = RevealPhase::Typing {
                    block: next,
                    offset: 0,
                };
                Tick::Next(self.options.speed)
            }
            RevealPhase::Typing { block, offset } => {
                let len = self.lengths[block];
                let offset = (offset + 1).min(len);

                if offset < len {
                    self.phase = RevealPhase::Typing { block, offset };
                    return Tick::Next(self.options.speed);
                }

                if block + 1 < self.blocks.len() {
                    self.phase = RevealPhase::PausingBetweenBlocks { next: block + 1 };
                    Tick::Next(self.options.block_delay)
                } else {
                    self.complete()
                }
            }
        }
    }

    fn complete(&mut self) -> Tick {
        self.phase = RevealPhase::Complete;
        if self.completed {
            return Tick::Stopped;
        }
        self.completed = true;
        tracing::debug!(blocks = self.blocks.len(), "Reveal complete");
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
        Tick::Completed
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_complete(&self) -> bool {
        self.phase == RevealPhase::Complete
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    /// Revealed and total character counts.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.lengths.iter().sum();
        let revealed = match self.phase {
            RevealPhase::Idle => 0,
            RevealPhase::Complete => total,
            RevealPhase::Typing { block, offset } => self.lengths[..block].iter().sum::<usize>() + offset,
            RevealPhase::PausingBetweenBlocks { next } => self.lengths[..next].iter().sum(),
        };
        (revealed, total)
    }

    /// Snapshot of what should be on screen.
    pub fn frame(&self) -> Frame {
        if self.blocks.is_empty() {
            return Frame::Empty {
                placeholder: self.options.placeholder.clone(),
            };
        }

        let full = |block: &ContentBlock| VisibleBlock {
            id: block.id.clone(),
            kind: block.kind,
            text: block.content.clone(),
            typing: false,
        };

        let blocks = match self.phase {
            RevealPhase::Idle => Vec::new(),
            RevealPhase::Complete => self.blocks.iter().map(full).collect(),
            RevealPhase::PausingBetweenBlocks { next } => {
                self.blocks[..next].iter().map(full).collect()
            }
            RevealPhase::Typing { block, offset } => {
                let mut visible: Vec<_> = self.blocks[..block].iter().map(full).collect();
                let current = &self.blocks[block];
                visible.push(VisibleBlock {
                    id: current.id.clone(),
                    kind: current.kind,
                    text: char_prefix(&current.content, offset).to_string(),
                    typing: true,
                });
                visible
            }
        };

        Frame::Blocks {
            blocks,
            paused: self.paused,
            complete: self.phase == RevealPhase::Complete,
        }
    }
}

/// The first `chars` characters of `text`, never splitting a code point.
fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
