use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use client_logging::{client_info, client_warn};
use lunaris_core::{Effect, JobId, JobStatus, Msg};
use lunaris_engine::{EngineCommand, EngineEvent, EngineHandle};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Upload {
                    local_id,
                    path,
                    filter,
                } => {
                    client_info!("Upload local_id={} path={}", local_id, path);
                    self.engine.send(EngineCommand::Upload {
                        local_id,
                        path: path.into(),
                        filter,
                    });
                }
                Effect::FetchStatus(job_id) => {
                    self.engine.send(EngineCommand::FetchStatus {
                        job_id: job_id.as_str().to_string(),
                    });
                }
                Effect::DownloadResults { job_id, file_name } => {
                    client_info!("Download results job_id={} file={}", job_id, file_name);
                    self.engine.send(EngineCommand::DownloadResults {
                        job_id: job_id.as_str().to_string(),
                        file_name,
                    });
                }
                Effect::FetchSchema => {
                    self.engine.send(EngineCommand::FetchSchema);
                }
                Effect::FetchMask(name) => {
                    self.engine.send(EngineCommand::FetchMask { name });
                }
                Effect::SaveSession => {
                    // Persisted by the watch loop, which owns the state.
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadFinished { local_id, result } => match result {
            Ok(job_id) => Msg::UploadAccepted {
                local_id,
                job_id: JobId::new(job_id),
            },
            Err(err) => {
                client_warn!("Upload {} failed: {}", local_id, err);
                Msg::UploadFailed {
                    local_id,
                    message: err.status_text(),
                }
            }
        },
        EngineEvent::StatusFetched { job_id, result } => match result {
            Ok(status) => Msg::StatusFetched {
                job_id: JobId::new(job_id),
                status: map_status(status),
            },
            Err(err) => {
                client_warn!("Status fetch for {} failed: {}", job_id, err);
                Msg::StatusFetchFailed {
                    job_id: JobId::new(job_id),
                    message: err.to_string(),
                }
            }
        },
        EngineEvent::ResultsDownloaded { job_id, result } => match result {
            Ok(path) => Msg::ResultsSaved {
                job_id: JobId::new(job_id),
                path: path.display().to_string(),
            },
            Err(err) => {
                client_warn!("Results download for {} failed: {}", job_id, err);
                Msg::ResultsFailed {
                    job_id: JobId::new(job_id),
                    message: err.to_string(),
                }
            }
        },
        EngineEvent::SchemaFetched { result } => {
            Msg::SchemaLoaded(result.map_err(|err| err.to_string()))
        }
        EngineEvent::MaskFetched { name, result } => match result {
            Ok(text) => Msg::MaskLoaded { name, text },
            Err(err) => {
                client_warn!("Mask {} fetch failed: {}", name, err);
                Msg::NoOp
            }
        },
        // One-shot command flows consume these before the watch loop runs.
        EngineEvent::MaskListFetched { .. }
        | EngineEvent::SessionFetched { .. }
        | EngineEvent::QueryLine(_)
        | EngineEvent::QueryFinished { .. } => Msg::NoOp,
    }
}

fn map_status(status: lunaris_engine::JobStatus) -> JobStatus {
    JobStatus {
        message: status.message,
        succeeded: status.succeeded,
        completed: status.completed,
        snag_messages: status.snag_messages,
    }
}
