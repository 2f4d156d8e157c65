//! Lunaris client core: pure state machine and view-model helpers.
mod effect;
mod filter;
mod msg;
mod schema;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use filter::{FilterExpr, FilterGroup, FilterTriple, Operator, ParseOperatorError};
pub use msg::Msg;
pub use schema::normalize_field_names;
pub use state::{AppState, JobId, LocalId, SessionState, Submission, SubmissionSnapshot};
pub use status::JobStatus;
pub use update::update;
pub use view_model::{AppViewModel, SubmissionRowView};
