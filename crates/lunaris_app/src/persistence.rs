use std::fs;
use std::path::Path;

use client_logging::{client_error, client_info, client_warn};
use lunaris_core::{JobId, SubmissionSnapshot};
use lunaris_engine::{ensure_output_dir, AtomicFileWriter};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = ".lunaris_session.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedJob {
    job_id: String,
    file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedSession {
    #[serde(default)]
    saved_utc: String,
    #[serde(default)]
    filter: String,
    #[serde(default)]
    pending: Vec<PersistedJob>,
}

/// Loads the filter and still-pending jobs left behind by an earlier run.
pub(crate) fn load_session(output_dir: &Path) -> (String, Vec<SubmissionSnapshot>) {
    let path = output_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return (String::new(), Vec::new());
        }
        Err(err) => {
            client_warn!("Failed to read session snapshot from {:?}: {}", path, err);
            return (String::new(), Vec::new());
        }
    };

    let session: PersistedSession = match ron::from_str(&content) {
        Ok(session) => session,
        Err(err) => {
            client_warn!("Failed to parse session snapshot from {:?}: {}", path, err);
            return (String::new(), Vec::new());
        }
    };

    let pending = session
        .pending
        .into_iter()
        .map(|job| SubmissionSnapshot {
            job_id: JobId::new(job.job_id),
            file_name: job.file_name,
        })
        .collect();

    client_info!(
        "Loaded session snapshot from {:?} (saved {})",
        path,
        session.saved_utc
    );
    (session.filter, pending)
}

/// Writes the pending jobs and the active filter atomically, so a later
/// `watch` can pick them back up.
pub(crate) fn save_session(output_dir: &Path, filter: &str, pending: &[SubmissionSnapshot]) {
    if let Err(err) = ensure_output_dir(output_dir) {
        client_error!("Failed to ensure output dir {:?}: {}", output_dir, err);
        return;
    }

    let session = PersistedSession {
        saved_utc: chrono::Utc::now().to_rfc3339(),
        filter: filter.to_string(),
        pending: pending
            .iter()
            .map(|snapshot| PersistedJob {
                job_id: snapshot.job_id.as_str().to_string(),
                file_name: snapshot.file_name.clone(),
            })
            .collect(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&session, pretty) {
        Ok(text) => text,
        Err(err) => {
            client_error!("Failed to serialize session snapshot: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    if let Err(err) = writer.write(STATE_FILENAME, &content) {
        client_error!(
            "Failed to write session snapshot to {:?}: {}",
            output_dir,
            err
        );
    }
}
