//! Async lane that owns a [`GridEngine`] and serializes every reconciliation
//! request through the [`UpdateScheduler`].
//!
//! # Flow
//! ```text
//! session events ─┐
//!                 ├─► scheduler.request() ─► sleep(delay) ─► engine.run_pass()
//! handle.request ─┘          ▲                                    │
//!                            └── drain requests seen meanwhile ◄──┘
//!                                 scheduler.complete()
//! ```
//! The pass is awaited inline, so the identity map is never touched by two
//! passes at once. Requests that arrive while a pass is running wait in the
//! channels and are folded into the scheduler before completion is recorded.

use std::sync::Arc;

use callgrid_core::CallGridError;
use callgrid_renderer::PresentationSink;
use callgrid_session::{CallSession, SessionEvent};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::engine::{GridEngine, PassReport};
use crate::scheduler::{SchedulerStats, UpdateScheduler};

const REPORT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Request,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// What the driver hands back when it stops.
#[derive(Debug)]
pub struct DriverExit<S> {
    pub sink:   S,
    pub passes: u64,
    pub stats:  SchedulerStats,
}

// ── ReconcileHandle ───────────────────────────────────────────────────────────

/// Control handle of a running driver task.
pub struct ReconcileHandle<S> {
    commands: mpsc::UnboundedSender<Command>,
    reports:  broadcast::Sender<PassReport>,
    task:     JoinHandle<Result<DriverExit<S>, CallGridError>>,
}

impl<S: PresentationSink + 'static> ReconcileHandle<S> {
    /// Spawns the driver. An initial pass is requested immediately.
    pub fn spawn(engine: GridEngine, session: Arc<dyn CallSession>, sink: S) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (reports, _) = broadcast::channel(REPORT_CAPACITY);
        let events = session.subscribe();
        let task = tokio::spawn(run(engine, session, sink, events, command_rx, reports.clone()));
        Self { commands, reports, task }
    }
}

impl<S> ReconcileHandle<S> {
    /// Asks for a resync. Merged with any pending request.
    pub fn request(&self) {
        let _ = self.commands.send(Command::Request);
    }

    /// Receives a [`PassReport`] for every pass completed from now on.
    pub fn subscribe_reports(&self) -> broadcast::Receiver<PassReport> {
        self.reports.subscribe()
    }

    /// Stops the driver, tearing the engine down, and returns the sink.
    pub async fn shutdown(self) -> Result<DriverExit<S>, CallGridError> {
        let _ = self.commands.send(Command::Shutdown);
        self.join().await
    }

    /// Waits for the driver to stop on its own (call ended or fatal error).
    pub async fn join(self) -> Result<DriverExit<S>, CallGridError> {
        self.task
            .await
            .map_err(|e| CallGridError::Driver { reason: e.to_string() })?
    }
}

// ── Driver loop ───────────────────────────────────────────────────────────────

async fn run<S: PresentationSink>(
    mut engine: GridEngine,
    session: Arc<dyn CallSession>,
    mut sink: S,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    reports: broadcast::Sender<PassReport>,
) -> Result<DriverExit<S>, CallGridError> {
    let mut scheduler = UpdateScheduler::new(engine.config().min_interval());
    engine.attach(&mut sink);
    info!(
        "[Driver] started (min interval {:?}, orientation {:?})",
        scheduler.min_interval(),
        engine.config().orientation
    );

    let mut deadline = schedule(&mut scheduler, Instant::now());

    let outcome: Result<(), CallGridError> = loop {
        tokio::select! {
            command = commands.recv() => {
                let flow = on_command(command, &mut scheduler, &mut deadline);
                if flow == Flow::Stop {
                    break Ok(());
                }
            }

            event = events.recv() => {
                let flow = on_event(event, &mut engine, &mut scheduler, &mut deadline);
                if flow == Flow::Stop {
                    break Ok(());
                }
            }

            _ = sleep_until(deadline), if deadline.is_some() => {
                deadline = None;
                let report = match engine.run_pass(session.as_ref(), &mut sink).await {
                    Ok(report) => report,
                    Err(e) => {
                        error!("[Driver] presentation sink rejected pass: {}", e);
                        break Err(e.into());
                    }
                };
                let _ = reports.send(report);

                // Fold in everything that arrived while the pass was running.
                let mut flow = Flow::Continue;
                while let Ok(command) = commands.try_recv() {
                    if on_command(Some(command), &mut scheduler, &mut deadline) == Flow::Stop {
                        flow = Flow::Stop;
                    }
                }
                while let Ok(event) = events.try_recv() {
                    if on_event(Some(event), &mut engine, &mut scheduler, &mut deadline) == Flow::Stop {
                        flow = Flow::Stop;
                    }
                }
                if flow == Flow::Stop {
                    break Ok(());
                }

                let now = Instant::now();
                if let Some(delay) = scheduler.complete(now) {
                    debug!("[Driver] follow-up pass in {:?}", delay);
                    deadline = Some(now + delay);
                }
            }
        }
    };

    engine.teardown(&mut sink);
    let stats = scheduler.stats();
    info!(
        "[Driver] stopped after {} pass(es) ({} request(s), {} coalesced)",
        engine.passes(),
        stats.requests,
        stats.coalesced
    );
    outcome.map(|()| DriverExit { sink, passes: engine.passes(), stats })
}

fn schedule(scheduler: &mut UpdateScheduler, now: Instant) -> Option<Instant> {
    scheduler.request(now).map(|delay| now + delay)
}

/// Records a request; only an `Idle` scheduler yields a new deadline.
fn request(scheduler: &mut UpdateScheduler, deadline: &mut Option<Instant>) {
    if let Some(at) = schedule(scheduler, Instant::now()) {
        *deadline = Some(at);
    }
}

fn on_command(
    command: Option<Command>,
    scheduler: &mut UpdateScheduler,
    deadline: &mut Option<Instant>,
) -> Flow {
    match command {
        Some(Command::Request) => {
            request(scheduler, deadline);
            Flow::Continue
        }
        Some(Command::Shutdown) | None => Flow::Stop,
    }
}

fn on_event(
    event: Option<SessionEvent>,
    engine: &mut GridEngine,
    scheduler: &mut UpdateScheduler,
    deadline: &mut Option<Instant>,
) -> Flow {
    let Some(event) = event else {
        debug!("[Driver] session observer channel closed");
        return Flow::Stop;
    };
    match event {
        SessionEvent::CallEnded => return Flow::Stop,
        SessionEvent::AppBackgrounded => engine.set_video_suspended(true),
        SessionEvent::AppForegrounded => engine.set_video_suspended(false),
        SessionEvent::RosterChanged
        | SessionEvent::ParticipantStateChanged
        | SessionEvent::LocalMediaChanged => {}
    }
    debug!("[Driver] {:?} → resync requested", event);
    request(scheduler, deadline);
    Flow::Continue
}

async fn sleep_until(deadline: Option<Instant>) {
    if let Some(at) = deadline {
        tokio::time::sleep_until(at).await;
    }
}
