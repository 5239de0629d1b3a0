//! Interactive picker state machine.
//!
//! The controller owns the query, the current ranking and the cursor. Input
//! events are applied one at a time. Every query change bumps a generation
//! counter; a ranking computed elsewhere is only accepted for the current
//! generation, so a slow rank for an older query can never overwrite a
//! newer one.

use crate::candidates::CandidateList;
use crate::matcher::{Matcher, RankedMatch};
use tracing::debug;

/// Discrete input understood by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Backspace,
    ClearQuery,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Confirm,
    Cancel,
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Confirmed,
    Cancelled,
}

/// Ranking work needed after a query change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankRequest {
    pub generation: u64,
    pub query: String,
}

/// Owns the interaction state for one picker run.
#[derive(Debug)]
pub struct SessionController {
    matcher: Matcher,
    candidates: CandidateList,
    query: String,
    generation: u64,
    ranked: Vec<RankedMatch>,
    cursor: usize,
    page_size: usize,
    status: SessionStatus,
    result: Option<String>,
}

impl SessionController {
    /// Start a session; the initial ranking (empty query) is computed here.
    pub fn new(candidates: CandidateList, matcher: Matcher) -> Self {
        let ranked = matcher.rank("", &candidates);
        Self {
            matcher,
            candidates,
            query: String::new(),
            generation: 0,
            ranked,
            cursor: 0,
            page_size: 10,
            status: SessionStatus::Running,
            result: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn ranked(&self) -> &[RankedMatch] {
        &self.ranked
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn matcher(&self) -> Matcher {
        self.matcher
    }

    /// The entry under the cursor, if any.
    pub fn selected(&self) -> Option<&RankedMatch> {
        self.ranked.get(self.cursor)
    }

    /// Rows moved by PageUp/PageDown; the TUI keeps this equal to the list height.
    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    /// Selected text on confirmation, empty otherwise.
    pub fn result(&self) -> &str {
        self.result.as_deref().unwrap_or("")
    }

    /// Consume the session, yielding the selection (`None` when cancelled).
    pub fn into_result(self) -> Option<String> {
        self.result
    }

    /// Apply an event and re-rank inline when the query changed.
    pub fn handle(&mut self, event: InputEvent) {
        if let Some(request) = self.apply(event) {
            let ranked = self.matcher.rank(&request.query, &self.candidates);
            self.apply_ranking(request.generation, ranked);
        }
    }

    /// Apply an event without ranking. Returns the ranking the new query
    /// needs, to be fed back through [`apply_ranking`](Self::apply_ranking).
    pub fn apply(&mut self, event: InputEvent) -> Option<RankRequest> {
        if !self.is_running() {
            return None;
        }

        match event {
            InputEvent::Char(c) => {
                self.query.push(c);
                Some(self.next_request())
            }
            InputEvent::Backspace => self.query.pop().map(|_| self.next_request()),
            InputEvent::ClearQuery => {
                if self.query.is_empty() {
                    None
                } else {
                    self.query.clear();
                    Some(self.next_request())
                }
            }
            InputEvent::Up => {
                self.move_cursor(-1);
                None
            }
            InputEvent::Down => {
                self.move_cursor(1);
                None
            }
            InputEvent::PageUp => {
                self.move_cursor(-(self.page_size as isize));
                None
            }
            InputEvent::PageDown => {
                self.move_cursor(self.page_size as isize);
                None
            }
            InputEvent::Home => {
                self.cursor = 0;
                None
            }
            InputEvent::End => {
                self.cursor = self.ranked.len().saturating_sub(1);
                None
            }
            InputEvent::Confirm => {
                if let Some(selected) = self.ranked.get(self.cursor) {
                    self.result = Some(selected.candidate.trim().to_string());
                    self.status = SessionStatus::Confirmed;
                    debug!(index = selected.index, "selection confirmed");
                }
                None
            }
            InputEvent::Cancel => {
                self.result = None;
                self.status = SessionStatus::Cancelled;
                debug!("session cancelled");
                None
            }
        }
    }

    /// Install a ranking for `generation`. Returns `false` and leaves the
    /// state untouched when the ranking is stale.
    pub fn apply_ranking(&mut self, generation: u64, ranked: Vec<RankedMatch>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale ranking");
            return false;
        }
        self.ranked = ranked;
        self.cursor = 0;
        true
    }

    fn next_request(&mut self) -> RankRequest {
        self.generation += 1;
        RankRequest {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.ranked.len().saturating_sub(1);
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, last as isize) as usize;
    }
}
