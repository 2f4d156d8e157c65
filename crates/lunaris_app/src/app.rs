use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use lunaris_core::{update, AppState, Effect, Msg, SessionState};
use lunaris_engine::EngineHandle;

use crate::effects::EffectRunner;
use crate::persistence;
use crate::render::StatusPrinter;

pub struct WatchOptions {
    pub poll_interval: Duration,
    pub output_dir: PathBuf,
}

/// Runs the polling loop until every tracked job has completed and its
/// results (if any) are on disk.
pub fn run_watch(engine: EngineHandle, initial_msgs: Vec<Msg>, options: WatchOptions) {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, msg_tx.clone());

    // Fixed-interval poll driving status fetches for pending jobs.
    let interval = options.poll_interval;
    thread::spawn(move || {
        while msg_tx.send(Msg::PollTick).is_ok() {
            thread::sleep(interval);
        }
    });

    let mut printer = StatusPrinter::new();
    let mut state = AppState::new();
    for msg in initial_msgs {
        state = dispatch(state, msg, &runner, &options, &mut printer);
    }

    while state.session() != SessionState::Finished {
        match msg_rx.recv_timeout(Duration::from_secs(1)) {
            Ok(msg) => {
                state = dispatch(state, msg, &runner, &options, &mut printer);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    // Leave an up-to-date (now empty) pending list behind.
    persistence::save_session(&options.output_dir, state.filter(), &state.pending_snapshot());
    printer.summary(&state.view());
}

fn dispatch(
    state: AppState,
    msg: Msg,
    runner: &EffectRunner,
    options: &WatchOptions,
    printer: &mut StatusPrinter,
) -> AppState {
    let (mut state, effects) = update(state, msg);
    if effects.contains(&Effect::SaveSession) {
        persistence::save_session(&options.output_dir, state.filter(), &state.pending_snapshot());
    }
    runner.enqueue(effects);
    if state.consume_dirty() {
        printer.render(&state.view());
    }
    state
}
