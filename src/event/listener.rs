use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::events::GameEvent;
use crate::stats::StatsService;

/// Consumes host-delivered game events and drives the stats service.
///
/// Storage-touching handlers (connect, disconnect, round flush) are spawned
/// as independent tasks so the delivery loop returns to the channel
/// immediately and never blocks on I/O. Death events are pure cache work and
/// are handled inline. `Shutdown` runs the bounded final flush and then ends
/// the loop.
pub async fn run_event_loop(service: Arc<StatsService>, mut events: mpsc::Receiver<GameEvent>) {
    info!("Stats event loop started");

    while let Some(event) = events.recv().await {
        debug!(kind = event.kind(), "Dispatching game event");

        match event {
            GameEvent::PlayerConnected { steam_id, name } => {
                let service = service.clone();
                tokio::spawn(async move {
                    service.handle_connect(steam_id, &name).await;
                });
            }
            GameEvent::PlayerDeath(death) => {
                service.handle_death(&death);
            }
            GameEvent::PlayerDisconnected { steam_id } => {
                let service = service.clone();
                tokio::spawn(async move {
                    service.handle_disconnect(steam_id).await;
                });
            }
            GameEvent::RoundStart => {
                let service = service.clone();
                tokio::spawn(async move {
                    service.flush_all().await;
                });
            }
            GameEvent::Shutdown => {
                service.shutdown().await;
                break;
            }
        }
    }

    info!("Stats event loop stopped");
}
