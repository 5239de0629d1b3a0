//! Fuzzy subsequence matching and ranking.
//!
//! A query matches a candidate when every query character appears in the
//! candidate in order, ignoring case. Among all such alignments the matcher
//! picks the one with the best score:
//!
//! ```text
//! score = Σ (match + boundary bonus at each position)
//!       + contiguous bonus for each adjacent pair of positions
//!       − gap penalty × characters skipped between positions
//!       + exact bonus when the candidate equals the query
//! ```
//!
//! Leading characters before the first match cost nothing, so a hit at a
//! path component boundary beats the same hit in the middle of a word, and
//! a contiguous run beats a scattered one. Ties are broken by shorter
//! candidate, then by listing order.

use crate::candidates::Candidate;
use std::cmp::{Ordering, Reverse};

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoring {
    /// Per matched character
    pub match_score: i64,
    /// Match at the start, after a separator, or at a camelCase hump
    pub boundary_bonus: i64,
    /// Per pair of adjacent matched characters
    pub contiguous_bonus: i64,
    /// Per character skipped between two matched characters
    pub gap_penalty: i64,
}

impl Default for Scoring {
    fn default() -> Self {
        // contiguous_bonus >= boundary_bonus keeps the exact text of a
        // candidate ranked at or above any scattered alignment of it.
        Self {
            match_score: 16,
            boundary_bonus: 8,
            contiguous_bonus: 10,
            gap_penalty: 1,
        }
    }
}

/// Score and positions of one successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScore {
    pub score: i64,
    /// Character indices into the candidate, ascending
    pub positions: Vec<usize>,
}

/// A candidate that matched the current query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMatch {
    /// Position in the original candidate list
    pub index: usize,
    pub candidate: Candidate,
    pub score: i64,
    pub positions: Vec<usize>,
}

/// Stateless fuzzy matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    scoring: Scoring,
}

const SEPARATORS: &[char] = &['/', '\\', '_', '-', '.', ':', ' '];
const UNREACHABLE: i64 = i64::MIN / 4;
/// Largest query × candidate table the optimal alignment may allocate.
/// Longer lines are scored on their leftmost greedy alignment instead.
const MAX_ALIGN_CELLS: usize = 1 << 18;

impl Matcher {
    pub fn new(scoring: Scoring) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    /// Score `candidate` against `query`; `None` when it does not match.
    ///
    /// An empty query matches everything with score 0 and no positions.
    pub fn score(&self, query: &str, candidate: &str) -> Option<MatchScore> {
        if query.is_empty() {
            return Some(MatchScore {
                score: 0,
                positions: Vec::new(),
            });
        }
        if !is_subsequence(query, candidate) {
            return None;
        }

        let query_chars: Vec<char> = query.chars().map(fold).collect();
        let chars: Vec<char> = candidate.chars().collect();
        let (mut score, positions) = if query_chars.len() * chars.len() > MAX_ALIGN_CELLS {
            self.align_greedy(&query_chars, &chars)?
        } else {
            self.align(&query_chars, &chars)?
        };

        if candidate == query {
            score += self.scoring.boundary_bonus * (query_chars.len() as i64 + 1);
        }

        Some(MatchScore { score, positions })
    }

    /// Matched candidates in rank order.
    ///
    /// With an empty query every candidate is returned in listing order.
    pub fn rank(&self, query: &str, candidates: &[Candidate]) -> Vec<RankedMatch> {
        let mut ranked: Vec<RankedMatch> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                self.score(query, candidate).map(|m| RankedMatch {
                    index,
                    candidate: candidate.clone(),
                    score: m.score,
                    positions: m.positions,
                })
            })
            .collect();

        if !query.is_empty() {
            ranked.sort_by_cached_key(|m| (Reverse(m.score), m.candidate.chars().count(), m.index));
        }
        ranked
    }

    /// Rank ordering: higher score, then shorter candidate, then listing order.
    pub fn compare(a: &RankedMatch, b: &RankedMatch) -> Ordering {
        b.score
            .cmp(&a.score)
            .then_with(|| a.candidate.chars().count().cmp(&b.candidate.chars().count()))
            .then_with(|| a.index.cmp(&b.index))
    }

    /// Best-scoring alignment of `query` (already case-folded) in `chars`.
    ///
    /// `best[i][j]` is the best score for `query[..=i]` with `query[i]` placed
    /// at `chars[j]`. The gapped transition keeps a running maximum of
    /// `best[i-1][k] + gap * k`, which makes each row linear.
    fn align(&self, query: &[char], chars: &[char]) -> Option<(i64, Vec<usize>)> {
        let n = query.len();
        let m = chars.len();
        if n == 0 || n > m {
            return None;
        }

        let s = self.scoring;
        let folded: Vec<char> = chars.iter().copied().map(fold).collect();
        let bonus: Vec<i64> = (0..m)
            .map(|j| {
                let prev = if j == 0 { None } else { Some(chars[j - 1]) };
                if is_boundary(prev, chars[j]) {
                    s.boundary_bonus
                } else {
                    0
                }
            })
            .collect();

        let mut best = vec![UNREACHABLE; n * m];
        let mut from = vec![usize::MAX; n * m];

        for j in 0..m {
            if folded[j] == query[0] {
                best[j] = s.match_score + bonus[j];
            }
        }

        for i in 1..n {
            let prev_row = (i - 1) * m;
            let row = i * m;
            // Running max over k <= j - 2 of best[i-1][k] + gap * k.
            let mut gapped: Option<(i64, usize)> = None;

            for j in i..m {
                if j >= 2 {
                    let k = j - 2;
                    let value = best[prev_row + k];
                    if value > UNREACHABLE {
                        let shifted = value + s.gap_penalty * k as i64;
                        if gapped.map_or(true, |(g, _)| shifted > g) {
                            gapped = Some((shifted, k));
                        }
                    }
                }

                if folded[j] != query[i] {
                    continue;
                }

                let contiguous = best[prev_row + j - 1];
                let mut choice: Option<(i64, usize)> = None;
                if contiguous > UNREACHABLE {
                    choice = Some((contiguous + s.contiguous_bonus, j - 1));
                }
                if let Some((g, k)) = gapped {
                    let value = g - s.gap_penalty * (j as i64 - 1);
                    if choice.map_or(true, |(c, _)| value > c) {
                        choice = Some((value, k));
                    }
                }

                if let Some((value, k)) = choice {
                    best[row + j] = value + s.match_score + bonus[j];
                    from[row + j] = k;
                }
            }
        }

        let last_row = (n - 1) * m;
        let mut end: Option<(i64, usize)> = None;
        for j in (n - 1)..m {
            let value = best[last_row + j];
            if value > UNREACHABLE && end.map_or(true, |(e, _)| value > e) {
                end = Some((value, j));
            }
        }
        let (score, mut j) = end?;

        let mut positions = vec![0; n];
        for i in (0..n).rev() {
            positions[i] = j;
            if i > 0 {
                j = from[i * m + j];
            }
        }

        Some((score, positions))
    }

    /// Leftmost alignment of `query` in `chars`, scored with the same weights.
    fn align_greedy(&self, query: &[char], chars: &[char]) -> Option<(i64, Vec<usize>)> {
        let mut positions = Vec::with_capacity(query.len());
        let mut rest = chars.iter().enumerate();
        for &q in query {
            let (j, _) = rest.by_ref().find(|&(_, &c)| fold(c) == q)?;
            positions.push(j);
        }

        let s = self.scoring;
        let mut score = 0;
        for (i, &j) in positions.iter().enumerate() {
            let prev = if j == 0 { None } else { Some(chars[j - 1]) };
            score += s.match_score;
            if is_boundary(prev, chars[j]) {
                score += s.boundary_bonus;
            }
            if i > 0 {
                let skipped = j - positions[i - 1] - 1;
                if skipped == 0 {
                    score += s.contiguous_bonus;
                } else {
                    score -= s.gap_penalty * skipped as i64;
                }
            }
        }
        Some((score, positions))
    }
}

/// Cheap case-insensitive subsequence test used to reject before scoring.
pub fn is_subsequence(query: &str, candidate: &str) -> bool {
    let mut haystack = candidate.chars().map(fold);
    query
        .chars()
        .map(fold)
        .all(|q| haystack.any(|c| c == q))
}

fn fold(c: char) -> char {
    if c.is_ascii() {
        c.to_ascii_lowercase()
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

fn is_boundary(prev: Option<char>, current: char) -> bool {
    match prev {
        None => true,
        Some(p) => SEPARATORS.contains(&p) || (p.is_lowercase() && current.is_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn list(items: &[&str]) -> Vec<Candidate> {
        items.iter().map(|s| Arc::from(*s)).collect()
    }

    fn names(ranked: &[RankedMatch]) -> Vec<&str> {
        ranked.iter().map(|m| &*m.candidate).collect()
    }

    fn score(query: &str, candidate: &str) -> Option<MatchScore> {
        Matcher::default().score(query, candidate)
    }

    #[test]
    fn test_subsequence_matching_is_case_insensitive() {
        assert!(score("MaIn", "src/main.rs").is_some());
        assert!(score("smr", "src/main.rs").is_some());
        assert!(score("rsm", "src/main.rs").is_none());
        assert!(score("mainx", "main").is_none());
    }

    #[test]
    fn test_empty_query_is_neutral() {
        let m = score("", "anything").unwrap();
        assert_eq!(m.score, 0);
        assert!(m.positions.is_empty());
    }

    #[test]
    fn test_very_long_candidate_uses_greedy_alignment() {
        let gap = 200_000;
        let candidate = format!("a{}b", "x".repeat(gap));
        let m = score("ab", &candidate).unwrap();
        assert_eq!(m.positions, vec![0, gap + 1]);
        // boundary match at 0, plain match after the gap
        assert_eq!(m.score, 16 + 8 + 16 - gap as i64);
    }

    #[test]
    fn test_positions_are_char_indices() {
        let m = score("éb", "aéb").unwrap();
        assert_eq!(m.positions, vec![1, 2]);
    }

    #[test]
    fn test_ordering_law() {
        let ranked = Matcher::default().rank("main", &list(&["domain.py", "mainframe.c", "main.py"]));
        assert_eq!(names(&ranked), vec!["main.py", "mainframe.c", "domain.py"]);
    }

    #[test]
    fn test_boundary_beats_mid_word() {
        let boundary = score("main", "src/main").unwrap();
        let mid_word = score("main", "srcxmain").unwrap();
        assert!(boundary.score > mid_word.score);

        let camel = score("b", "fooBar").unwrap();
        let plain = score("b", "foobar").unwrap();
        assert!(camel.score > plain.score);
    }

    #[test]
    fn test_contiguous_beats_scattered() {
        let exact = score("abcd", "abcd").unwrap();
        let scattered = score("abcd", "axbxcxd").unwrap();
        assert!(exact.score > scattered.score);

        let run = score("abc", "xabcx").unwrap();
        let spread = score("abc", "xaxbc").unwrap();
        assert!(run.score > spread.score);
    }

    #[test]
    fn test_alignment_is_optimal_not_greedy() {
        // Greedy would take f@0 and b@4; the contiguous boundary run is better.
        let m = score("fb", "foo/bar/fb").unwrap();
        assert_eq!(m.positions, vec![8, 9]);
    }

    #[test]
    fn test_gap_penalty_counts_skipped_chars() {
        let near = score("ac", "xabcxxxx").unwrap();
        let far = score("ac", "xabbbbcx").unwrap();
        assert_eq!(near.score - far.score, 3);
    }

    #[test]
    fn test_exact_text_is_top_match() {
        let candidates = list(&["a/b", "aB", "ab", "xab", "ab/ab"]);
        let ranked = Matcher::default().rank("ab", &candidates);
        assert_eq!(&*ranked[0].candidate, "ab");
    }

    #[test]
    fn test_round_trip_for_every_candidate() {
        let candidates = list(&[
            "src/main.rs",
            "src/matcher.rs",
            "src/MainWindow.cpp",
            "docs/main.md",
            "main",
            "m/a/i/n",
        ]);
        let matcher = Matcher::default();
        for candidate in candidates.iter() {
            let ranked = matcher.rank(candidate, &candidates);
            assert_eq!(&ranked[0].candidate, candidate, "query {:?}", candidate);
        }
    }

    #[test]
    fn test_rank_is_idempotent() {
        let candidates = list(&["b.rs", "a.rs", "ab.rs", "ba.rs", "c.rs"]);
        let matcher = Matcher::default();
        assert_eq!(matcher.rank("a", &candidates), matcher.rank("a", &candidates));
    }

    #[test]
    fn test_longer_query_narrows() {
        let candidates = list(&["main.rs", "mod.rs", "lib.rs", "matcher.rs", "mem.rs"]);
        let matcher = Matcher::default();
        let mut previous: Vec<usize> = (0..candidates.len()).collect();
        for query in ["", "m", "ma", "mat", "matc"] {
            let current: Vec<usize> = matcher.rank(query, &candidates).iter().map(|m| m.index).collect();
            assert!(current.iter().all(|i| previous.contains(i)), "query {:?}", query);
            previous = current;
        }
        assert_eq!(previous, vec![3]);
    }

    #[test]
    fn test_empty_query_keeps_listing_order() {
        let candidates = list(&["long/path/name.rs", "b", "a"]);
        let ranked = Matcher::default().rank("", &candidates);
        assert_eq!(names(&ranked), vec!["long/path/name.rs", "b", "a"]);
    }

    #[test]
    fn test_ties_break_by_length_then_order() {
        let candidates = list(&["x/ab-long", "y/ab", "z/ab"]);
        let ranked = Matcher::default().rank("ab", &candidates);
        assert_eq!(names(&ranked), vec!["y/ab", "z/ab", "x/ab-long"]);
    }

    #[test]
    fn test_compare_agrees_with_rank() {
        let candidates = list(&["foo/bar", "fb", "f-b", "xfxb", "foobar"]);
        let ranked = Matcher::default().rank("fb", &candidates);
        for pair in ranked.windows(2) {
            assert_ne!(Matcher::compare(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_custom_scoring() {
        let flat = Matcher::new(Scoring {
            match_score: 1,
            boundary_bonus: 0,
            contiguous_bonus: 0,
            gap_penalty: 0,
        });
        assert_eq!(flat.score("ab", "a---b").unwrap().score, 2);
    }
}
