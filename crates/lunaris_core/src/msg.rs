#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted one or more input file paths for upload.
    FilesSubmitted(Vec<String>),
    /// User edited the filter expression text.
    FilterChanged(String),
    /// User picked a named server-side mask preset.
    MaskSelected(String),
    /// Mask text arrived from the server; becomes the active filter.
    MaskLoaded { name: String, text: String },
    /// Ask the server for the available field names.
    SchemaRequested,
    /// Schema fetch finished: raw column names, or an error message.
    SchemaLoaded(Result<Vec<String>, String>),
    /// Upload finished; the server assigned a job id.
    UploadAccepted {
        local_id: crate::LocalId,
        job_id: crate::JobId,
    },
    /// Upload was rejected or failed in transit.
    UploadFailed {
        local_id: crate::LocalId,
        message: String,
    },
    /// A status fetch for a pending job came back.
    StatusFetched {
        job_id: crate::JobId,
        status: crate::JobStatus,
    },
    /// A status fetch failed; the job stays pending and is retried.
    StatusFetchFailed { job_id: crate::JobId, message: String },
    /// Results download finished and was written to disk.
    ResultsSaved { job_id: crate::JobId, path: String },
    /// Results download failed.
    ResultsFailed { job_id: crate::JobId, message: String },
    /// Fixed-interval poll tick.
    PollTick,
    /// Stop intake and drain the remaining pending jobs.
    StopFinishRequested,
    /// Restore previously submitted jobs from a persisted snapshot.
    RestoreSubmissions(Vec<crate::SubmissionSnapshot>),
    /// Fallback for placeholder wiring.
    NoOp,
}
