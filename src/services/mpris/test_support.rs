//! Helpers shared by the unit tests of the mpris modules.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{broadcast, mpsc};

use super::{
    MediaBus, MediaError, NameOwnerChange, PlaybackStatus, PlayerConnection, PlayerProperties,
    SessionId, SessionRegistry, engine::EngineEvent,
};

/// Bus on which no player can be reached.
pub(crate) struct OfflineBus;

#[async_trait]
impl MediaBus for OfflineBus {
    async fn list_names(&self) -> Result<Vec<String>, MediaError> {
        Ok(Vec::new())
    }

    async fn name_owner_changes(&self) -> Result<BoxStream<'static, NameOwnerChange>, MediaError> {
        Ok(stream::empty().boxed())
    }

    async fn connect_player(&self, bus_name: &str) -> Result<PlayerConnection, MediaError> {
        Err(MediaError::InitializationFailed(format!("{bus_name} is offline")))
    }
}

pub(crate) fn offline_registry() -> (SessionRegistry, mpsc::UnboundedReceiver<EngineEvent>) {
    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let (events_tx, _) = broadcast::channel(64);
    (
        SessionRegistry::new(
            Arc::new(OfflineBus),
            engine_tx,
            events_tx,
            Duration::from_millis(100),
        ),
        engine_rx,
    )
}

pub(crate) fn player_id(name: &str) -> SessionId {
    SessionId::from_bus_name(&format!("org.mpris.MediaPlayer2.{name}"))
}

pub(crate) fn with_status(status: PlaybackStatus) -> PlayerProperties {
    PlayerProperties {
        status,
        ..Default::default()
    }
}
