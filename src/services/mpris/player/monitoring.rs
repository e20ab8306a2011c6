use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle, time};
use tracing::{debug, instrument};

use crate::services::mpris::{MediaBus, SessionKey, engine::EngineEvent};

/// Spawn the task that connects to one player and follows its property pushes.
///
/// The connection attempt starts after `delay`.
/// The task reports the connection, then one refresh immediately and one more
/// per property push, each tagged with `key` so the engine can drop reports
/// for sessions that were removed in the meantime. Aborting the returned
/// handle releases the subscription.
pub(crate) fn spawn_monitor(
    bus: Arc<dyn MediaBus>,
    key: SessionKey,
    events: mpsc::UnboundedSender<EngineEvent>,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            time::sleep(delay).await;
        }
        monitor_player(bus, key, events).await;
    })
}

#[instrument(skip_all, fields(bus_name = %key.id))]
async fn monitor_player(
    bus: Arc<dyn MediaBus>,
    key: SessionKey,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    let connection = match bus.connect_player(key.id.bus_name()).await {
        Ok(connection) => connection,
        Err(error) => {
            let _ = events.send(EngineEvent::AttachFailed { key, error });
            return;
        }
    };

    let transport = Arc::clone(&connection.transport);
    let mut changes = transport.property_changes().await;

    if events
        .send(EngineEvent::Attached {
            key: key.clone(),
            connection,
        })
        .is_err()
    {
        return;
    }

    loop {
        let report = match transport.properties().await {
            Ok(properties) => EngineEvent::Refreshed {
                key: key.clone(),
                properties,
            },
            Err(error) => EngineEvent::RefreshFailed {
                key: key.clone(),
                error,
            },
        };

        if events.send(report).is_err() {
            return;
        }

        if changes.next().await.is_none() {
            debug!("Property updates stopped");
            return;
        }
    }
}
