//! Timer-driven typing session.
//!
//! A [`TypingSession`] owns one [`Reveal`] and a tokio task that ticks it. The
//! handle mutates the reveal directly and nudges the task, which re-arms its
//! single timer whenever the reveal's generation changes. Frames are published
//! on a `watch` channel after every change.
//!
//! Disposing the session (explicitly or by dropping it) disposes the reveal
//! and aborts the task, so a tick that was already due never touches the view.

use crate::blocks::ContentBlock;
use crate::reveal::{Frame, Generation, Reveal, RevealOptions, Tick};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::Instant;

/// If the timer isn't armed it expires "never", which is actually one year away.
const NEVER: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug)]
enum SessionEvent {
    /// The reveal changed outside the task, re-arm the timer if needed.
    StateChanged,
    Terminate,
}

type CompletionCallback = Box<dyn FnMut() + Send>;

struct SessionLoop {
    reveal: Arc<Mutex<Reveal>>,
    event_recv: UnboundedReceiver<SessionEvent>,
    frame_sender: watch::Sender<Frame>,
    on_complete: Option<CompletionCallback>,
}

impl SessionLoop {
    async fn run(mut self) {
        let timer = tokio::time::sleep(NEVER);
        tokio::pin!(timer);

        let mut armed: Option<Generation> = None;
        self.rearm(timer.as_mut(), &mut armed);

        loop {
            tokio::select! {
                maybe_event = self.event_recv.recv() => {
                    match maybe_event {
                        Some(SessionEvent::StateChanged) => {
                            self.rearm(timer.as_mut(), &mut armed);
                            self.publish();
                        }
                        Some(SessionEvent::Terminate) | None => break,
                    }
                }
                _ = timer.as_mut(), if armed.is_some() => {
                    let generation = armed.take().unwrap_or_default();

                    let tick = {
                        let mut reveal = self.reveal.lock();
                        if reveal.is_disposed() {
                            break;
                        }
                        reveal.tick(generation)
                    };

                    match tick {
                        Tick::Next(delay) => {
                            timer.as_mut().reset(Instant::now() + delay);
                            armed = Some(generation);
                        }
                        Tick::Completed => {
                            timer.as_mut().reset(Instant::now() + NEVER);
                            if let Some(callback) = self.on_complete.as_mut() {
                                callback();
                            }
                        }
                        Tick::Stopped => {
                            // The generation moved on, pick up the current one.
                            self.rearm(timer.as_mut(), &mut armed);
                        }
                    }

                    self.publish();
                }
            }
        }

        tracing::debug!("Typing session loop exited");
    }

    fn rearm(&self, timer: std::pin::Pin<&mut tokio::time::Sleep>, armed: &mut Option<Generation>) {
        let reveal = self.reveal.lock();
        let generation = reveal.generation();

        if *armed == Some(generation) {
            return;
        }

        match reveal.next_delay() {
            Some(delay) => {
                timer.reset(Instant::now() + delay);
                *armed = Some(generation);
            }
            None => {
                timer.reset(Instant::now() + NEVER);
                *armed = None;
            }
        }
    }

    fn publish(&self) {
        let frame = {
            let reveal = self.reveal.lock();
            if reveal.is_disposed() {
                return;
            }
            reveal.frame()
        };
        self.frame_sender.send_replace(frame);
    }
}

/// Handle to a running typing reveal.
///
/// Must be created inside a tokio runtime.
pub struct TypingSession {
    reveal: Arc<Mutex<Reveal>>,
    event_sender: UnboundedSender<SessionEvent>,
    frame_recv: watch::Receiver<Frame>,
    join_handle: Option<tokio::task::JoinHandle<()>>,
}

impl std::fmt::Debug for TypingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingSession")
            .field("reveal", &*self.reveal.lock())
            .field("running", &self.join_handle.is_some())
            .finish()
    }
}

impl TypingSession {
    /// Starts revealing `blocks` immediately.
    pub fn start(blocks: Vec<ContentBlock>, options: RevealOptions) -> Self {
        Self::spawn(blocks, options, None)
    }

    /// Starts revealing `blocks`, calling `on_complete` each time a run finishes.
    pub fn start_with_completion(
        blocks: Vec<ContentBlock>,
        options: RevealOptions,
        on_complete: impl FnMut() + Send + 'static,
    ) -> Self {
        Self::spawn(blocks, options, Some(Box::new(on_complete)))
    }

    fn spawn(
        blocks: Vec<ContentBlock>,
        options: RevealOptions,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        let reveal = Reveal::with_blocks(blocks, options);
        let (frame_sender, frame_recv) = watch::channel(reveal.frame());
        let (event_sender, event_recv) = unbounded_channel();
        let reveal = Arc::new(Mutex::new(reveal));

        let session_loop = SessionLoop {
            reveal: reveal.clone(),
            event_recv,
            frame_sender,
            on_complete,
        };

        tracing::debug!("Spawning a new typing session task");
        let join_handle = tokio::spawn(session_loop.run());

        Self {
            reveal,
            event_sender,
            frame_recv,
            join_handle: Some(join_handle),
        }
    }

    /// Receiver of every frame the session publishes.
    pub fn subscribe(&self) -> watch::Receiver<Frame> {
        self.frame_recv.clone()
    }

    /// Current frame, read straight from the reveal.
    pub fn frame(&self) -> Frame {
        self.reveal.lock().frame()
    }

    /// Runs `f` against the reveal state.
    pub fn inspect<R>(&self, f: impl FnOnce(&Reveal) -> R) -> R {
        f(&*self.reveal.lock())
    }

    /// Restarts from the first block of the current sequence.
    pub fn reset(&self) {
        self.update(Reveal::reset);
    }

    /// Replaces the content being revealed and restarts.
    pub fn load(&self, blocks: Vec<ContentBlock>) {
        self.update(move |reveal| reveal.load(blocks));
    }

    /// Flips play/pause, returning whether the session is now paused.
    pub fn toggle_play(&self) -> bool {
        let mut paused = false;
        self.update(|reveal| paused = reveal.toggle_play());
        paused
    }

    pub fn pause(&self) {
        self.update(Reveal::pause);
    }

    pub fn resume(&self) {
        self.update(Reveal::resume);
    }

    /// Changes the per-character delay; the pending tick keeps its delay.
    pub fn set_speed(&self, speed: Duration) {
        self.update(|reveal| reveal.set_speed(speed));
    }

    pub fn is_disposed(&self) -> bool {
        self.join_handle.is_none()
    }

    /// Cancels all pending ticks and stops the session for good.
    pub fn dispose(&mut self) {
        let Some(join_handle) = self.join_handle.take() else {
            return;
        };
        self.reveal.lock().dispose();
        let _ = self.event_sender.send(SessionEvent::Terminate);
        join_handle.abort();
    }

    fn update(&self, f: impl FnOnce(&mut Reveal)) {
        if self.join_handle.is_none() {
            return;
        }
        f(&mut *self.reveal.lock());
        let _ = self.event_sender.send(SessionEvent::StateChanged);
    }
}

impl Drop for TypingSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockKind;
    use crate::reveal::RevealPhase;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn blocks(contents: &[&str]) -> Vec<ContentBlock> {
        contents
            .iter()
            .map(|c| ContentBlock::new(BlockKind::Paragraph, *c))
            .collect()
    }

    fn options() -> RevealOptions {
        RevealOptions {
            speed: Duration::from_millis(10),
            block_delay: Duration::from_millis(50),
            ..Default::default()
        }
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_runs_to_completion() {
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = completions.clone();
        let session = TypingSession::start_with_completion(blocks(&["ab", "cd"]), options(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let frames = session.subscribe();

        sleep_ms(1_000).await;

        assert!(session.frame().is_complete());
        assert_eq!(completions.load(Ordering::SeqCst), 1);

        let frame = frames.borrow().clone();
        assert!(frame.is_complete());
        assert_eq!(frame.text(), "ab\n\ncd");
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_pause_resume_continues_from_offset() {
        let session = TypingSession::start(blocks(&["abcdefgh"]), options());

        sleep_ms(25).await;
        session.pause();
        let paused_at = session.inspect(|reveal| reveal.phase());
        assert_eq!(paused_at, RevealPhase::Typing { block: 0, offset: 2 });

        sleep_ms(500).await;
        assert_eq!(session.inspect(|reveal| reveal.phase()), paused_at);

        session.resume();
        sleep_ms(15).await;
        assert_eq!(
            session.inspect(|reveal| reveal.phase()),
            RevealPhase::Typing { block: 0, offset: 3 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_reset_restarts() {
        let session = TypingSession::start(blocks(&["abcdefgh"]), options());
        sleep_ms(45).await;
        session.reset();
        assert_eq!(
            session.inspect(|reveal| reveal.phase()),
            RevealPhase::Typing { block: 0, offset: 0 }
        );
        sleep_ms(15).await;
        assert_eq!(
            session.inspect(|reveal| reveal.phase()),
            RevealPhase::Typing { block: 0, offset: 1 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_empty_blocks_show_placeholder() {
        let session = TypingSession::start(Vec::new(), options());
        sleep_ms(100).await;
        assert!(matches!(session.frame(), Frame::Empty { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_mid_reveal_freezes_state() {
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = completions.clone();
        let mut session = TypingSession::start_with_completion(blocks(&["abcdefgh"]), options(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sleep_ms(25).await;
        session.dispose();
        let frozen = session.frame();

        sleep_ms(1_000).await;
        assert!(session.is_disposed());
        assert_eq!(session.frame(), frozen);
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        // Controls after dispose are ignored.
        session.reset();
        session.toggle_play();
        assert_eq!(session.frame(), frozen);
    }
}
