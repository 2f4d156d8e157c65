use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use client_logging::client_debug;

use crate::client::PredictorClient;
use crate::lines::LineSink;
use crate::types::{ClientError, ClientSettings, JobId, JobStatus, SessionData};

/// Configuration for the engine thread.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub settings: ClientSettings,
    /// Directory results downloads are written into.
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub enum EngineCommand {
    Upload {
        local_id: u64,
        path: PathBuf,
        filter: Option<String>,
    },
    FetchStatus {
        job_id: JobId,
    },
    DownloadResults {
        job_id: JobId,
        file_name: String,
    },
    FetchSchema,
    FetchMaskList,
    FetchMask {
        name: String,
    },
    FetchSession {
        session_id: String,
    },
    RunQuery {
        request: String,
    },
}

#[derive(Debug)]
pub enum EngineEvent {
    UploadFinished {
        local_id: u64,
        result: Result<JobId, ClientError>,
    },
    StatusFetched {
        job_id: JobId,
        result: Result<JobStatus, ClientError>,
    },
    ResultsDownloaded {
        job_id: JobId,
        result: Result<PathBuf, ClientError>,
    },
    SchemaFetched {
        result: Result<Vec<String>, ClientError>,
    },
    MaskListFetched {
        result: Result<Vec<String>, ClientError>,
    },
    MaskFetched {
        name: String,
        result: Result<String, ClientError>,
    },
    SessionFetched {
        session_id: String,
        result: Result<SessionData, ClientError>,
    },
    QueryLine(String),
    QueryFinished {
        result: Result<(), ClientError>,
    },
}

/// Handle to the background IO thread. Commands go in over a channel and
/// events come back out; nothing here blocks the caller.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ClientError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let client = Arc::new(PredictorClient::new(config.settings.clone())?);
        let output_dir = config.output_dir;

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    client_logging::client_error!("failed to start engine runtime: {err}");
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                let output_dir = output_dir.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, &output_dir, event_tx).await;
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx
            .lock()
            .ok()
            .and_then(|rx| rx.try_recv().ok())
    }

    /// Blocking receive with a deadline, for one-shot command flows.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx
            .lock()
            .ok()
            .and_then(|rx| rx.recv_timeout(timeout).ok())
    }
}

struct ChannelLineSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl LineSink for ChannelLineSink {
    fn line(&self, line: &str) {
        let _ = self.tx.send(EngineEvent::QueryLine(line.to_string()));
    }
}

async fn handle_command(
    client: &PredictorClient,
    command: EngineCommand,
    output_dir: &std::path::Path,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Upload {
            local_id,
            path,
            filter,
        } => {
            client_debug!("upload local_id={local_id} path={path:?}");
            let result = client.upload(&path, filter.as_deref()).await;
            let _ = event_tx.send(EngineEvent::UploadFinished { local_id, result });
        }
        EngineCommand::FetchStatus { job_id } => {
            let result = client.status(&job_id).await;
            let _ = event_tx.send(EngineEvent::StatusFetched { job_id, result });
        }
        EngineCommand::DownloadResults { job_id, file_name } => {
            let result = client
                .download_results(&job_id, &file_name, output_dir)
                .await;
            let _ = event_tx.send(EngineEvent::ResultsDownloaded { job_id, result });
        }
        EngineCommand::FetchSchema => {
            let result = client.schema().await;
            let _ = event_tx.send(EngineEvent::SchemaFetched { result });
        }
        EngineCommand::FetchMaskList => {
            let result = client.mask_list().await;
            let _ = event_tx.send(EngineEvent::MaskListFetched { result });
        }
        EngineCommand::FetchMask { name } => {
            let result = client.mask(&name).await;
            let _ = event_tx.send(EngineEvent::MaskFetched { name, result });
        }
        EngineCommand::FetchSession { session_id } => {
            let result = client.session(&session_id).await;
            let _ = event_tx.send(EngineEvent::SessionFetched { session_id, result });
        }
        EngineCommand::RunQuery { request } => {
            let sink = ChannelLineSink {
                tx: event_tx.clone(),
            };
            let result = client.query(&request, &sink).await;
            let _ = event_tx.send(EngineEvent::QueryFinished { result });
        }
    }
}
