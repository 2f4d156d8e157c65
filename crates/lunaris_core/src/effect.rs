#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Upload {
        local_id: crate::LocalId,
        path: String,
        filter: Option<String>,
    },
    FetchStatus(crate::JobId),
    DownloadResults {
        job_id: crate::JobId,
        file_name: String,
    },
    FetchSchema,
    FetchMask(String),
    SaveSession,
}
