//! Picker application state for the TUI

use std::collections::VecDeque;

use crossterm::event::KeyEvent;
use sift::session::RankRequest;
use sift::{InputEvent, RankedMatch, SessionController};
use tokio::sync::mpsc;
use tracing::debug;

use super::event::input_for_key;

/// Candidate count above which ranking moves off the UI task
pub const OFFLOAD_THRESHOLD: usize = 10_000;

/// Ranking computed on a blocking task
#[derive(Debug)]
pub struct RankResult {
    pub generation: u64,
    pub ranked: Vec<RankedMatch>,
}

/// TUI state: the session plus view state
pub struct App {
    pub session: SessionController,
    pub rule_name: String,
    /// First list row on screen
    pub scroll: usize,
    offload_threshold: usize,
    /// Generation of the offloaded ranking still in flight
    pending: Option<u64>,
    /// Input waiting for the ranking in flight, in arrival order
    queued: VecDeque<InputEvent>,
    rank_tx: mpsc::UnboundedSender<RankResult>,
    rank_rx: mpsc::UnboundedReceiver<RankResult>,
}

impl App {
    pub fn new(session: SessionController, rule_name: impl Into<String>) -> Self {
        let (rank_tx, rank_rx) = mpsc::unbounded_channel();
        Self {
            session,
            rule_name: rule_name.into(),
            scroll: 0,
            offload_threshold: OFFLOAD_THRESHOLD,
            pending: None,
            queued: VecDeque::new(),
            rank_tx,
            rank_rx,
        }
    }

    #[cfg(test)]
    pub fn with_offload_threshold(mut self, threshold: usize) -> Self {
        self.offload_threshold = threshold;
        self
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// True while an offloaded ranking is outstanding.
    pub fn is_ranking(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(input) = input_for_key(key) {
            self.handle_input(input);
        }
    }

    /// Apply one input in order.
    ///
    /// While an offloaded ranking is in flight every input except Cancel
    /// waits in `queued`, so a cursor move or confirm always acts on the
    /// list produced by the edits typed before it.
    pub fn handle_input(&mut self, input: InputEvent) {
        if input == InputEvent::Cancel {
            self.queued.clear();
            self.session.apply(input);
            return;
        }
        self.queued.push_back(input);
        self.drain_queued();
    }

    /// Replay queued input until it runs out or a ranking goes off-thread.
    ///
    /// Back-to-back edits share one ranking: only the last query is ranked.
    fn drain_queued(&mut self) {
        let mut request = None;
        while self.pending.is_none() {
            let Some(&input) = self.queued.front() else {
                break;
            };
            if !edits_query(input) {
                if let Some(request) = request.take() {
                    self.schedule(request);
                    continue;
                }
            }
            self.queued.pop_front();
            if let Some(next) = self.session.apply(input) {
                request = Some(next);
            }
        }
        if let Some(request) = request {
            self.schedule(request);
        }
    }

    fn schedule(&mut self, request: RankRequest) {
        let candidates = self.session.candidates().clone();
        let matcher = self.session.matcher();

        if candidates.len() <= self.offload_threshold {
            let ranked = matcher.rank(&request.query, &candidates);
            self.session.apply_ranking(request.generation, ranked);
            self.pending = None;
            return;
        }

        self.pending = Some(request.generation);
        let tx = self.rank_tx.clone();
        tokio::task::spawn_blocking(move || {
            let ranked = matcher.rank(&request.query, &candidates);
            // The receiver is gone once the picker has exited.
            let _ = tx.send(RankResult {
                generation: request.generation,
                ranked,
            });
        });
    }

    /// Wait for the next offloaded ranking.
    pub async fn next_ranking(&mut self) -> Option<RankResult> {
        self.rank_rx.recv().await
    }

    /// Install a ranking if it is still current, then replay queued input.
    pub fn apply_ranking(&mut self, result: RankResult) {
        if !self.session.apply_ranking(result.generation, result.ranked) {
            return;
        }
        self.pending = None;
        self.scroll = 0;

        debug!(count = self.queued.len(), "replaying queued input");
        self.drain_queued();
    }

    /// Adjust `scroll` so the cursor row is inside a window of `height` rows.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        let cursor = self.session.cursor();
        if height == 0 {
            self.scroll = cursor;
            return;
        }
        if cursor < self.scroll {
            self.scroll = cursor;
        } else if cursor >= self.scroll + height {
            self.scroll = cursor + 1 - height;
        }
        let max_scroll = self.session.ranked().len().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
    }

    /// Consume the app, yielding the confirmed selection.
    pub fn into_result(self) -> Option<String> {
        self.session.into_result()
    }
}

fn edits_query(input: InputEvent) -> bool {
    matches!(
        input,
        InputEvent::Char(_) | InputEvent::Backspace | InputEvent::ClearQuery
    )
}
