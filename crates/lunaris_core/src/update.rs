use crate::{normalize_field_names, AppState, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSubmitted(paths) => {
            let paths = clean_paths(paths);
            if paths.is_empty() {
                return (state, Vec::new());
            }
            match state.session() {
                SessionState::Finishing | SessionState::Finished => {
                    return (state, Vec::new());
                }
                SessionState::Idle | SessionState::Running => {}
            }
            if state.session() == SessionState::Idle {
                state.start_session();
            }

            let filter = if state.filter().is_empty() {
                None
            } else {
                Some(state.filter().to_string())
            };
            let mut effects = Vec::with_capacity(paths.len());
            for path in paths {
                let local_id = state.add_submission(path.clone());
                effects.push(Effect::Upload {
                    local_id,
                    path,
                    filter: filter.clone(),
                });
            }
            effects
        }
        Msg::FilterChanged(text) => {
            state.set_filter(text);
            Vec::new()
        }
        Msg::MaskSelected(name) => {
            vec![Effect::FetchMask(name)]
        }
        Msg::MaskLoaded { name, text } => {
            state.set_mask(name, text);
            Vec::new()
        }
        Msg::SchemaRequested => {
            vec![Effect::FetchSchema]
        }
        Msg::SchemaLoaded(Ok(raw_names)) => {
            state.set_field_names(normalize_field_names(&raw_names));
            Vec::new()
        }
        Msg::SchemaLoaded(Err(message)) => {
            state.set_schema_error(message);
            Vec::new()
        }
        Msg::UploadAccepted { local_id, job_id } => {
            state.record_upload_accepted(local_id, job_id.clone());
            // Fetch the first status right away instead of waiting a tick.
            state.mark_in_flight(&job_id);
            vec![Effect::FetchStatus(job_id), Effect::SaveSession]
        }
        Msg::UploadFailed { local_id, message } => {
            state.record_upload_failed(local_id, &message);
            Vec::new()
        }
        Msg::StatusFetched { job_id, status } => {
            let applied = state.apply_status(&job_id, status);
            let mut effects = Vec::new();
            if applied.start_download {
                if let Some(file_name) = state.file_name_for(&job_id) {
                    effects.push(Effect::DownloadResults {
                        job_id: job_id.clone(),
                        file_name: file_name.to_string(),
                    });
                }
            }
            if applied.newly_completed {
                effects.push(Effect::SaveSession);
            }
            effects
        }
        Msg::StatusFetchFailed { job_id, message: _ } => {
            state.record_status_failure(&job_id);
            Vec::new()
        }
        Msg::ResultsSaved { job_id, path } => {
            state.record_results_saved(&job_id, path);
            Vec::new()
        }
        Msg::ResultsFailed { job_id, message } => {
            state.record_results_failed(&job_id, &message);
            Vec::new()
        }
        Msg::PollTick => state
            .take_poll_targets()
            .into_iter()
            .map(Effect::FetchStatus)
            .collect(),
        Msg::StopFinishRequested => {
            state.finish_intake();
            Vec::new()
        }
        Msg::RestoreSubmissions(snapshots) => {
            if snapshots.is_empty() {
                return (state, Vec::new());
            }
            if state.session() == SessionState::Idle {
                state.start_session();
            }
            let mut effects = Vec::new();
            for snapshot in snapshots {
                let job_id = snapshot.job_id.clone();
                if state.restore_submission(snapshot) {
                    state.mark_in_flight(&job_id);
                    effects.push(Effect::FetchStatus(job_id));
                }
            }
            effects
        }
        Msg::NoOp => Vec::new(),
    };

    state.maybe_finish();
    (state, effects)
}

fn clean_paths(paths: Vec<String>) -> Vec<String> {
    paths
        .into_iter()
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .collect()
}
