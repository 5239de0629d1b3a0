//! Sift: a rule-driven fuzzy picker for files and lines.
//!
//! A [`rules::RuleSet`] describes how to list candidates for different kinds
//! of directories. The [`rules::RuleSelector`] picks the rule that applies to
//! the working directory, [`candidates::CandidateSource`] produces its
//! candidate lines (from cache or by running the listing command),
//! [`matcher::Matcher`] ranks them against a query and
//! [`session::SessionController`] drives the interactive selection.

pub mod candidates;
pub mod error;
pub mod exec;
pub mod matcher;
pub mod paths;
pub mod rules;
pub mod session;

pub use candidates::{CachePolicy, Candidate, CandidateList, CandidateSource};
pub use error::{Result, SiftError};
pub use exec::{CommandOutput, CommandRunner, ShellRunner};
pub use matcher::{Matcher, RankedMatch, Scoring};
pub use rules::{Rule, RuleSelector, RuleSet, Selection};
pub use session::{InputEvent, SessionController, SessionStatus};
