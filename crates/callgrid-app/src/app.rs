use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use callgrid_core::{GridConfig, LocalMediaState, Participant, ParticipantId};
use callgrid_engine::{GridEngine, PassReport, ReconcileHandle};
use callgrid_renderer::{TracingSink, TracingViewFactory};
use callgrid_session::SimulatedSession;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

/// Runs a scripted call against the reconciliation driver.
///
/// # Script
/// 1. Two guests join and Ada's camera comes on, then a burst of joins and mute toggles
/// 2. One guest shares their screen, then stops
/// 3. The app goes to the background and comes back
/// 4. Everyone but one guest leaves (one-on-one), then the call ends
pub async fn run(config: GridConfig) -> Result<()> {
    let pace = config.min_interval() + Duration::from_millis(250);

    let session = Arc::new(SimulatedSession::new("You"));
    session.set_local_media(LocalMediaState { is_muted: false, camera_enabled: true });

    let views = TracingViewFactory::new();
    let engine = GridEngine::new(config, Box::new(views.clone()));
    let handle = ReconcileHandle::spawn(engine, session.clone(), TracingSink::new());
    let reports = tokio::spawn(log_reports(handle.subscribe_reports()));

    script(&session, pace).await;

    let exit = handle.join().await.context("reconcile driver")?;
    let stats = exit.stats;
    info!(
        "{} pass(es) for {} request(s): {} coalesced, {} follow-up(s); final grid {}",
        exit.passes,
        stats.requests,
        stats.coalesced,
        stats.follow_ups,
        exit.sink.shape()
    );
    if views.live_views() != 0 {
        warn!("{} tile view(s) leaked", views.live_views());
    }
    reports.await.context("report logger")?;
    Ok(())
}

async fn script(session: &SimulatedSession, pace: Duration) {
    let ada = ParticipantId::new("ada");
    session.join(Participant::new(ada.clone(), "Ada"));
    session.set_camera(&ada, true);
    let bo = session.join_guest("Bo");
    tokio::time::sleep(pace).await;

    // Burst: all of this collapses into at most one follow-up pass.
    let guests: Vec<_> = (1..=4).map(|i| session.join_guest(format!("Guest {i}"))).collect();
    for guest in &guests {
        session.set_muted(guest, true);
        session.set_speaking(&bo, true);
        session.set_speaking(&bo, false);
    }
    tokio::time::sleep(pace * 2).await;

    session.start_screen_share(&ada);
    tokio::time::sleep(pace).await;
    session.stop_screen_share(&ada);
    tokio::time::sleep(pace).await;

    session.background();
    tokio::time::sleep(pace).await;
    session.foreground();
    tokio::time::sleep(pace).await;

    for guest in guests.iter().chain([&bo]) {
        session.leave(guest);
    }
    tokio::time::sleep(pace).await;

    session.end_call();
}

async fn log_reports(mut reports: broadcast::Receiver<PassReport>) {
    loop {
        match reports.recv().await {
            Ok(r) => info!(
                "pass #{}: -{} ~{} +{} | {} remote(s), local {}, grid {}{}",
                r.pass,
                r.deletes,
                r.moves,
                r.inserts,
                r.remote_count,
                r.placement,
                r.shape,
                if r.screen_share { ", screen share" } else { "" }
            ),
            Err(RecvError::Lagged(n)) => warn!("report logger lagged by {} pass(es)", n),
            Err(RecvError::Closed) => break,
        }
    }
}
