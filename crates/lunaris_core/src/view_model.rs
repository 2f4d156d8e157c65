use crate::state::{LocalId, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub filter: String,
    pub active_mask: Option<String>,
    pub field_count: Option<usize>,
    pub schema_error: Option<String>,
    pub pending_count: usize,
    pub rows: Vec<SubmissionRowView>,
    pub dirty: bool,
}

/// One line of the status area, mirroring the per-job paragraph the
/// original front end rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRowView {
    pub local_id: LocalId,
    pub file_name: String,
    pub job_id: Option<String>,
    pub line: String,
    pub completed: bool,
    pub succeeded: bool,
    pub snag_messages: Vec<String>,
    pub result_path: Option<String>,
}
