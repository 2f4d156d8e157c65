use std::sync::Once;

use lunaris_core::{update, AppState, Effect, JobId, JobStatus, Msg, SessionState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn accepted(paths: &[&str]) -> AppState {
    let msg = Msg::FilesSubmitted(paths.iter().map(|p| p.to_string()).collect());
    let (mut state, _) = update(AppState::new(), msg);
    for local_id in 1..=paths.len() as u64 {
        let (next, _) = update(
            state,
            Msg::UploadAccepted {
                local_id,
                job_id: JobId::new(format!("job-{local_id}")),
            },
        );
        state = next;
    }
    state
}

#[test]
fn upload_accepted_fetches_status_immediately() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FilesSubmitted(vec!["a.vcf".to_string()]),
    );
    let (state, effects) = update(
        state,
        Msg::UploadAccepted {
            local_id: 1,
            job_id: JobId::new("job-1"),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::FetchStatus(JobId::new("job-1")),
            Effect::SaveSession,
        ]
    );
    assert_eq!(state.ids_pending(), [JobId::new("job-1")]);

    // The immediate fetch is still in flight, so a tick must not re-issue it.
    let (_state, effects) = update(state, Msg::PollTick);
    assert!(effects.is_empty());
}

#[test]
fn poll_tick_fetches_each_pending_job_once() {
    init_logging();
    let mut state = accepted(&["a.vcf", "b.vcf"]);
    // Resolve the immediate fetches so both ids are pollable again.
    for id in ["job-1", "job-2"] {
        let (next, _) = update(
            state,
            Msg::StatusFetched {
                job_id: JobId::new(id),
                status: JobStatus::running("Job is running"),
            },
        );
        state = next;
    }

    let (state, effects) = update(state, Msg::PollTick);
    assert_eq!(
        effects,
        vec![
            Effect::FetchStatus(JobId::new("job-1")),
            Effect::FetchStatus(JobId::new("job-2")),
        ]
    );

    // Idempotent per tick: nothing new while those fetches are outstanding.
    let (_state, effects) = update(state, Msg::PollTick);
    assert!(effects.is_empty());
}

#[test]
fn job_stays_pending_until_status_reports_completed() {
    init_logging();
    let state = accepted(&["a.vcf"]);
    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            job_id: JobId::new("job-1"),
            status: JobStatus::running("Job is running"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.ids_pending(), [JobId::new("job-1")]);
    assert_eq!(state.view().rows[0].line, "a.vcf: Job is running");

    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            job_id: JobId::new("job-1"),
            status: JobStatus::failed(
                "Job failed",
                vec!["unrecognized chromosome".to_string()],
            ),
        },
    );
    assert_eq!(effects, vec![Effect::SaveSession]);
    assert!(state.ids_pending().is_empty());

    let view = state.view();
    assert_eq!(view.rows[0].line, "a.vcf: Job failed");
    assert!(view.rows[0].completed);
    assert!(!view.rows[0].succeeded);
    assert_eq!(
        view.rows[0].snag_messages,
        ["unrecognized chromosome".to_string()]
    );
    assert_eq!(view.session, SessionState::Finished);
}

#[test]
fn succeeded_status_triggers_exactly_one_download() {
    init_logging();
    let state = accepted(&["a.vcf"]);
    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            job_id: JobId::new("job-1"),
            status: JobStatus::succeeded("Done"),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::DownloadResults {
                job_id: JobId::new("job-1"),
                file_name: "a.vcf".to_string(),
            },
            Effect::SaveSession,
        ]
    );
    // Download still outstanding, so the session is not finished yet.
    assert_eq!(state.view().session, SessionState::Running);

    // A repeated succeeded status must not start a second download.
    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            job_id: JobId::new("job-1"),
            status: JobStatus::succeeded("Done"),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::ResultsSaved {
            job_id: JobId::new("job-1"),
            path: "output/a.vcf.results.tsv".to_string(),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(
        view.rows[0].result_path.as_deref(),
        Some("output/a.vcf.results.tsv")
    );
    assert_eq!(view.session, SessionState::Finished);
}

#[test]
fn failed_download_still_finishes_the_session() {
    init_logging();
    let state = accepted(&["a.vcf"]);
    let (state, _) = update(
        state,
        Msg::StatusFetched {
            job_id: JobId::new("job-1"),
            status: JobStatus::succeeded("Done"),
        },
    );
    let (state, effects) = update(
        state,
        Msg::ResultsFailed {
            job_id: JobId::new("job-1"),
            message: "connection reset".to_string(),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(
        view.rows[0].line,
        "Could not download results: connection reset"
    );
    assert_eq!(view.session, SessionState::Finished);
}

#[test]
fn status_fetch_failure_retries_on_the_next_tick() {
    init_logging();
    let state = accepted(&["a.vcf"]);
    let (state, effects) = update(
        state,
        Msg::StatusFetchFailed {
            job_id: JobId::new("job-1"),
            message: "timeout".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.ids_pending(), [JobId::new("job-1")]);

    let (_state, effects) = update(state, Msg::PollTick);
    assert_eq!(effects, vec![Effect::FetchStatus(JobId::new("job-1"))]);
}
