use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::status::JobStatus;
use crate::view_model::{AppViewModel, SubmissionRowView};

/// Client-assigned id for a submission, allocated before the server
/// responds with a job id.
pub type LocalId = u64;

/// Opaque server-assigned job id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// No new intake; drain the remaining pending jobs.
    Finishing,
    Finished,
}

/// One submitted input file and everything the client knows about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub file_name: String,
    pub path: String,
    pub job_id: Option<JobId>,
    pub status: Option<JobStatus>,
    pub error: Option<String>,
    pub result_path: Option<String>,
}

impl Submission {
    fn new(file_name: String, path: String) -> Self {
        Self {
            file_name,
            path,
            job_id: None,
            status: None,
            error: None,
            result_path: None,
        }
    }
}

/// Restore record for a job submitted in an earlier run or saved in a
/// server-side session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSnapshot {
    pub job_id: JobId,
    pub file_name: String,
}

/// What applying a fetched status changed.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StatusApplied {
    /// The id was removed from the pending list by this status.
    pub(crate) newly_completed: bool,
    /// A results download should be started for this job.
    pub(crate) start_download: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    submissions: BTreeMap<LocalId, Submission>,
    next_local_id: LocalId,
    by_job: BTreeMap<JobId, LocalId>,
    ids_pending: Vec<JobId>,
    in_flight: BTreeSet<JobId>,
    downloads_requested: BTreeSet<JobId>,
    downloads_in_flight: BTreeSet<JobId>,
    filter: String,
    active_mask: Option<String>,
    field_names: Vec<String>,
    schema_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Pending ids, in submission order. A job id stays in this list until
    /// its last fetched status reports completed.
    pub fn ids_pending(&self) -> &[JobId] {
        &self.ids_pending
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            filter: self.filter.clone(),
            active_mask: self.active_mask.clone(),
            field_count: if self.field_names.is_empty() {
                None
            } else {
                Some(self.field_names.len())
            },
            schema_error: self.schema_error.clone(),
            pending_count: self.ids_pending.len(),
            rows: self.submissions.iter().map(row_view).collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a re-render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    /// Snapshot of jobs that have a server id and are not yet completed.
    pub fn pending_snapshot(&self) -> Vec<SubmissionSnapshot> {
        self.ids_pending
            .iter()
            .filter_map(|job_id| {
                let local_id = self.by_job.get(job_id)?;
                let submission = self.submissions.get(local_id)?;
                Some(SubmissionSnapshot {
                    job_id: job_id.clone(),
                    file_name: submission.file_name.clone(),
                })
            })
            .collect()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn start_session(&mut self) {
        self.session = SessionState::Running;
        self.mark_dirty();
    }

    pub(crate) fn finish_intake(&mut self) {
        if self.session == SessionState::Running {
            self.session = SessionState::Finishing;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_filter(&mut self, text: String) {
        self.filter = text;
        self.active_mask = None;
        self.mark_dirty();
    }

    pub(crate) fn set_mask(&mut self, name: String, text: String) {
        self.filter = text;
        self.active_mask = Some(name);
        self.mark_dirty();
    }

    pub(crate) fn set_field_names(&mut self, names: Vec<String>) {
        self.field_names = names;
        self.schema_error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_schema_error(&mut self, message: String) {
        self.schema_error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn add_submission(&mut self, path: String) -> LocalId {
        self.next_local_id += 1;
        let local_id = self.next_local_id;
        let file_name = base_name(&path).to_string();
        self.submissions
            .insert(local_id, Submission::new(file_name, path));
        self.mark_dirty();
        local_id
    }

    pub(crate) fn record_upload_accepted(&mut self, local_id: LocalId, job_id: JobId) {
        let Some(submission) = self.submissions.get_mut(&local_id) else {
            return;
        };
        submission.job_id = Some(job_id.clone());
        self.by_job.insert(job_id.clone(), local_id);
        if !self.ids_pending.contains(&job_id) {
            self.ids_pending.push(job_id);
        }
        self.mark_dirty();
    }

    pub(crate) fn record_upload_failed(&mut self, local_id: LocalId, message: &str) {
        let Some(submission) = self.submissions.get_mut(&local_id) else {
            return;
        };
        submission.error = Some(format!(
            "Could not submit {}: {}",
            submission.file_name, message
        ));
        self.mark_dirty();
    }

    /// Applies a fetched status. Removes the id from the pending list once
    /// the status reports completed.
    pub(crate) fn apply_status(&mut self, job_id: &JobId, status: JobStatus) -> StatusApplied {
        self.in_flight.remove(job_id);
        let Some(local_id) = self.by_job.get(job_id) else {
            return StatusApplied::default();
        };
        let completed = status.completed;
        let succeeded = status.succeeded;
        if let Some(submission) = self.submissions.get_mut(local_id) {
            submission.status = Some(status);
        }
        let was_pending = self.ids_pending.contains(job_id);
        if completed {
            self.ids_pending.retain(|id| id != job_id);
        }
        self.mark_dirty();

        let start_download = succeeded && !self.downloads_requested.contains(job_id);
        if start_download {
            self.downloads_requested.insert(job_id.clone());
            self.downloads_in_flight.insert(job_id.clone());
        }
        StatusApplied {
            newly_completed: completed && was_pending,
            start_download,
        }
    }

    pub(crate) fn record_status_failure(&mut self, job_id: &JobId) {
        // The id stays pending; the next tick retries.
        self.in_flight.remove(job_id);
    }

    pub(crate) fn record_results_saved(&mut self, job_id: &JobId, path: String) {
        self.downloads_in_flight.remove(job_id);
        if let Some(local_id) = self.by_job.get(job_id) {
            if let Some(submission) = self.submissions.get_mut(local_id) {
                submission.result_path = Some(path);
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn record_results_failed(&mut self, job_id: &JobId, message: &str) {
        self.downloads_in_flight.remove(job_id);
        if let Some(local_id) = self.by_job.get(job_id) {
            if let Some(submission) = self.submissions.get_mut(local_id) {
                submission.error = Some(format!("Could not download results: {message}"));
            }
        }
        self.mark_dirty();
    }

    /// Pending ids that have no status fetch outstanding; marks them
    /// in flight so a tick never double-issues a fetch.
    pub(crate) fn take_poll_targets(&mut self) -> Vec<JobId> {
        let targets: Vec<JobId> = self
            .ids_pending
            .iter()
            .filter(|id| !self.in_flight.contains(*id))
            .cloned()
            .collect();
        for id in &targets {
            self.in_flight.insert(id.clone());
        }
        targets
    }

    pub(crate) fn mark_in_flight(&mut self, job_id: &JobId) {
        self.in_flight.insert(job_id.clone());
    }

    pub(crate) fn file_name_for(&self, job_id: &JobId) -> Option<&str> {
        let local_id = self.by_job.get(job_id)?;
        self.submissions
            .get(local_id)
            .map(|submission| submission.file_name.as_str())
    }

    pub(crate) fn restore_submission(&mut self, snapshot: SubmissionSnapshot) -> bool {
        if self.by_job.contains_key(&snapshot.job_id) {
            return false;
        }
        let local_id = self.add_submission(snapshot.file_name);
        self.record_upload_accepted(local_id, snapshot.job_id);
        true
    }

    /// Moves the session to Finished once nothing is outstanding.
    pub(crate) fn maybe_finish(&mut self) {
        if !matches!(
            self.session,
            SessionState::Running | SessionState::Finishing
        ) {
            return;
        }
        let uploads_outstanding = self
            .submissions
            .values()
            .any(|submission| submission.job_id.is_none() && submission.error.is_none());
        if self.ids_pending.is_empty()
            && !uploads_outstanding
            && self.downloads_in_flight.is_empty()
        {
            self.session = SessionState::Finished;
            self.mark_dirty();
        }
    }
}

fn row_view((local_id, submission): (&LocalId, &Submission)) -> SubmissionRowView {
    let line = if let Some(error) = &submission.error {
        error.clone()
    } else if let Some(status) = &submission.status {
        format!("{}: {}", submission.file_name, status.message)
    } else {
        format!("Submitted {}, waiting for result.", submission.file_name)
    };
    SubmissionRowView {
        local_id: *local_id,
        file_name: submission.file_name.clone(),
        job_id: submission.job_id.as_ref().map(|id| id.to_string()),
        line,
        completed: submission
            .status
            .as_ref()
            .is_some_and(|status| status.completed),
        succeeded: submission
            .status
            .as_ref()
            .is_some_and(|status| status.succeeded),
        snag_messages: submission
            .status
            .as_ref()
            .map(|status| status.snag_messages.clone())
            .unwrap_or_default(),
        result_path: submission.result_path.clone(),
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
