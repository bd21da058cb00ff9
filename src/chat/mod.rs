//! Chat assistant core.
//!
//! A message is classified into an [`Intent`], then answered by one of:
//! - action handlers, which write attendance and leave records;
//! - navigation help;
//! - local query handlers, which read employee data and never leave the
//!   process;
//! - the language model, which only sees settings and aggregate company
//!   facts.
//!
//! [`ChatEngine`] runs that pipeline and returns the reply with a trace of
//! the steps taken.

mod actions;
mod dates;
mod delegate;
mod engine;
mod intent;
mod names;
mod navigation;
mod queries;
mod trace;

pub use actions::AttendanceDirection;
pub use dates::{LeaveDraft, infer_leave_type, next_monday};
pub use delegate::{CompanySnapshot, forwardable_history, system_prompt};
pub use engine::{ChatEngine, ChatInput, ChatReply};
pub use intent::{Intent, Lexicon, Predicate, ROUTES, classify};
pub use names::{NameMatch, clarification, resolve_employee};
pub use navigation::help;
pub use queries::{Query, QueryContext, answer as answer_query, on_leave_on, tenure_ranking, tenure_years};
pub use trace::ChatTrace;
