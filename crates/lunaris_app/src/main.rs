mod app;
mod effects;
mod logging;
mod persistence;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use lunaris_core::{normalize_field_names, JobId, Msg, SubmissionSnapshot};
use lunaris_engine::{ClientSettings, EngineCommand, EngineConfig, EngineEvent, EngineHandle};

use crate::app::WatchOptions;
use crate::logging::LogDestination;

/// Upper bound on waiting for a single one-shot server response.
const ONE_SHOT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Parser)]
#[command(
    name = "lunaris_app",
    about = "Command-line client for a Lunaris variant-predictor server"
)]
struct Cli {
    /// Base URL of the Lunaris server.
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,
    /// Directory results and the session snapshot are written to.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
    /// Poll interval for pending job statuses, in milliseconds.
    #[arg(long, default_value_t = 700)]
    poll_interval_ms: u64,
    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    log: LogDestination,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload input files and watch them to completion.
    Submit {
        /// Input files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Filter expression sent along with each upload.
        #[arg(long, conflicts_with = "mask")]
        filter: Option<String>,
        /// Named server-side mask preset applied as the filter.
        #[arg(long)]
        mask: Option<String>,
    },
    /// Resume watching jobs recorded in the local session snapshot.
    Watch,
    /// Fetch a saved server-side session and watch its jobs.
    Resume {
        session_id: String,
    },
    /// Print the status of one job.
    Status {
        job_id: String,
    },
    /// Download the results of one job.
    Results {
        job_id: String,
        /// Local name the results file is derived from; without it the
        /// file is named after the job id alone.
        #[arg(long)]
        file_name: Option<String>,
    },
    /// Print the available field names.
    Schema,
    /// List mask presets, or print one mask's filter text.
    Masks {
        name: Option<String>,
    },
    /// Stream the response to a JSON query request file.
    Query {
        request_file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log);

    let config = EngineConfig {
        settings: ClientSettings {
            base_url: cli.base_url.clone(),
            ..ClientSettings::default()
        },
        output_dir: cli.output_dir.clone(),
    };
    let engine = match EngineHandle::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let options = WatchOptions {
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        output_dir: cli.output_dir,
    };

    let outcome = match cli.command {
        Command::Submit {
            files,
            filter,
            mask,
        } => run_submit(engine, options, files, filter, mask),
        Command::Watch => run_local_watch(engine, options),
        Command::Resume { session_id } => run_resume(engine, options, session_id),
        Command::Status { job_id } => run_status(&engine, job_id),
        Command::Results { job_id, file_name } => run_results(&engine, job_id, file_name),
        Command::Schema => run_schema(&engine),
        Command::Masks { name } => run_masks(&engine, name),
        Command::Query { request_file } => run_query(&engine, request_file),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn next_event(engine: &EngineHandle) -> Result<EngineEvent, String> {
    engine
        .recv_timeout(ONE_SHOT_TIMEOUT)
        .ok_or_else(|| "timed out waiting for the server".to_string())
}

fn run_submit(
    engine: EngineHandle,
    options: WatchOptions,
    files: Vec<PathBuf>,
    filter: Option<String>,
    mask: Option<String>,
) -> Result<(), String> {
    let mut initial = Vec::new();
    if let Some(name) = mask {
        // Resolve the mask before anything is uploaded, so the filter is
        // in force for every submission.
        engine.send(EngineCommand::FetchMask { name: name.clone() });
        match next_event(&engine)? {
            EngineEvent::MaskFetched { name, result } => {
                let text = result.map_err(|err| err.to_string())?;
                initial.push(Msg::MaskLoaded { name, text });
            }
            other => return Err(format!("unexpected engine event: {other:?}")),
        }
    } else if let Some(filter) = filter {
        initial.push(Msg::FilterChanged(filter));
    }

    initial.push(Msg::SchemaRequested);
    initial.push(Msg::FilesSubmitted(
        files
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    ));

    app::run_watch(engine, initial, options);
    Ok(())
}

fn run_local_watch(engine: EngineHandle, options: WatchOptions) -> Result<(), String> {
    let (filter, pending) = persistence::load_session(&options.output_dir);
    if pending.is_empty() {
        println!("No pending jobs to watch.");
        return Ok(());
    }
    let mut initial = Vec::new();
    if !filter.is_empty() {
        initial.push(Msg::FilterChanged(filter));
    }
    initial.push(Msg::RestoreSubmissions(pending));
    app::run_watch(engine, initial, options);
    Ok(())
}

fn run_resume(
    engine: EngineHandle,
    options: WatchOptions,
    session_id: String,
) -> Result<(), String> {
    engine.send(EngineCommand::FetchSession {
        session_id: session_id.clone(),
    });
    let session = match next_event(&engine)? {
        EngineEvent::SessionFetched { result, .. } => result.map_err(|err| err.to_string())?,
        other => return Err(format!("unexpected engine event: {other:?}")),
    };

    let pending: Vec<SubmissionSnapshot> = session
        .jobs
        .into_iter()
        .map(|job| SubmissionSnapshot {
            job_id: JobId::new(job.id),
            file_name: job.input_file_name,
        })
        .collect();
    if pending.is_empty() {
        println!("Session {session_id} has no jobs.");
        return Ok(());
    }

    let mut initial = Vec::new();
    if let Some(filter) = session.filter {
        initial.push(Msg::FilterChanged(filter));
    }
    initial.push(Msg::RestoreSubmissions(pending));
    app::run_watch(engine, initial, options);
    Ok(())
}

fn run_status(engine: &EngineHandle, job_id: String) -> Result<(), String> {
    engine.send(EngineCommand::FetchStatus { job_id });
    match next_event(engine)? {
        EngineEvent::StatusFetched { job_id, result } => {
            let status = result.map_err(|err| err.to_string())?;
            println!("job:       {job_id}");
            println!("message:   {}", status.message);
            println!("completed: {}", status.completed);
            println!("succeeded: {}", status.succeeded);
            for snag in &status.snag_messages {
                println!("snag:      {snag}");
            }
            Ok(())
        }
        other => Err(format!("unexpected engine event: {other:?}")),
    }
}

fn run_results(
    engine: &EngineHandle,
    job_id: String,
    file_name: Option<String>,
) -> Result<(), String> {
    let file_name = file_name.unwrap_or_default();
    engine.send(EngineCommand::DownloadResults { job_id, file_name });
    match next_event(engine)? {
        EngineEvent::ResultsDownloaded { result, .. } => {
            let path = result.map_err(|err| err.to_string())?;
            println!("Results saved to {}.", path.display());
            Ok(())
        }
        other => Err(format!("unexpected engine event: {other:?}")),
    }
}

fn run_schema(engine: &EngineHandle) -> Result<(), String> {
    engine.send(EngineCommand::FetchSchema);
    match next_event(engine)? {
        EngineEvent::SchemaFetched { result } => {
            let raw = result
                .map_err(|err| format!("Unable to load available fields: {err}"))?;
            let names = normalize_field_names(&raw);
            println!("Available fields: {}", names.join(", "));
            Ok(())
        }
        other => Err(format!("unexpected engine event: {other:?}")),
    }
}

fn run_masks(engine: &EngineHandle, name: Option<String>) -> Result<(), String> {
    match name {
        Some(name) => {
            engine.send(EngineCommand::FetchMask { name });
            match next_event(engine)? {
                EngineEvent::MaskFetched { result, .. } => {
                    println!("{}", result.map_err(|err| err.to_string())?);
                    Ok(())
                }
                other => Err(format!("unexpected engine event: {other:?}")),
            }
        }
        None => {
            engine.send(EngineCommand::FetchMaskList);
            match next_event(engine)? {
                EngineEvent::MaskListFetched { result } => {
                    for name in result.map_err(|err| err.to_string())? {
                        println!("{name}");
                    }
                    Ok(())
                }
                other => Err(format!("unexpected engine event: {other:?}")),
            }
        }
    }
}

fn run_query(engine: &EngineHandle, request_file: PathBuf) -> Result<(), String> {
    let request = std::fs::read_to_string(&request_file)
        .map_err(|err| format!("could not read {}: {err}", request_file.display()))?;
    engine.send(EngineCommand::RunQuery { request });
    loop {
        match next_event(engine)? {
            EngineEvent::QueryLine(line) => println!("{line}"),
            EngineEvent::QueryFinished { result } => {
                return result.map_err(|err| err.to_string());
            }
            other => return Err(format!("unexpected engine event: {other:?}")),
        }
    }
}
