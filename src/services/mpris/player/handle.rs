use std::{fmt, sync::Arc};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::control::toggle_method;
use crate::services::mpris::{
    Capabilities, MediaError, MediaEvent, MediaEventSender, PlaybackStatus, PlayerConnection,
    PlayerMethod, PlayerProperties, PlayerTransport, RawMetadata, SessionId,
};

/// Remote call started by a control method.
///
/// The call runs to completion whether or not the handle is awaited; failures
/// are logged and broadcast as diagnostics either way.
pub type ControlCall = JoinHandle<Result<(), MediaError>>;

/// One player service: cached properties plus fire-and-forget control.
///
/// The transport is attached once the monitor task has connected; until then
/// control calls fail with a diagnostic. The monitor task is the
/// property-change subscription and is aborted on [`teardown`](Self::teardown).
pub struct PlayerHandle {
    id: SessionId,
    identity: String,
    transport: Option<Arc<dyn PlayerTransport>>,
    properties: PlayerProperties,
    monitor: Option<JoinHandle<()>>,
    events_tx: MediaEventSender,
}

impl PlayerHandle {
    pub(crate) fn new(id: SessionId, monitor: JoinHandle<()>, events_tx: MediaEventSender) -> Self {
        let identity = id.short_name().to_string();

        Self {
            id,
            identity,
            transport: None,
            properties: PlayerProperties::default(),
            monitor: Some(monitor),
            events_tx,
        }
    }

    /// Replace the monitor task, dropping any half-built connection.
    pub(crate) fn restart(&mut self, monitor: JoinHandle<()>) {
        if let Some(previous) = self.monitor.replace(monitor) {
            previous.abort();
        }
        self.transport = None;
    }

    pub(crate) fn attach(&mut self, connection: PlayerConnection) {
        self.identity = connection.identity;
        self.transport = Some(connection.transport);
    }

    /// Replace the cached properties. Returns `true` when the playback status
    /// changed value.
    pub(crate) fn apply(&mut self, properties: PlayerProperties) -> bool {
        let status_changed = self.properties.status != properties.status;
        self.properties = properties;
        status_changed
    }

    /// Bus identity of the player.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Human-readable player name.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Whether the bus client has been built.
    pub fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// Last known playback status.
    pub fn status(&self) -> PlaybackStatus {
        self.properties.status
    }

    /// Last known raw metadata dictionary.
    pub fn metadata(&self) -> &RawMetadata {
        &self.properties.metadata
    }

    /// Last known control capabilities.
    pub fn capabilities(&self) -> Capabilities {
        self.properties.capabilities
    }

    /// Invoke `PlayPause`.
    pub fn play_pause(&self) -> ControlCall {
        self.invoke(PlayerMethod::PlayPause)
    }

    /// Invoke `Play`.
    pub fn play(&self) -> ControlCall {
        self.invoke(PlayerMethod::Play)
    }

    /// Invoke `Stop`.
    pub fn stop(&self) -> ControlCall {
        self.invoke(PlayerMethod::Stop)
    }

    /// Invoke `Next`.
    pub fn next(&self) -> ControlCall {
        self.invoke(PlayerMethod::Next)
    }

    /// Invoke `Previous`.
    pub fn previous(&self) -> ControlCall {
        self.invoke(PlayerMethod::Previous)
    }

    /// Toggle playback using [`toggle_method`]. Returns the method invoked and
    /// its call, or `None` when the player offers nothing to invoke.
    pub fn toggle_status(&self) -> Option<(PlayerMethod, ControlCall)> {
        let Some(method) = toggle_method(self.capabilities(), self.status()) else {
            debug!(bus_name = %self.id, status = %self.status(), "Toggle has nothing to invoke");
            return None;
        };

        Some((method, self.invoke(method)))
    }

    /// Release the property-change subscription. Safe to call repeatedly.
    pub(crate) fn teardown(&mut self) {
        match self.monitor.take() {
            Some(monitor) => monitor.abort(),
            None => debug!(bus_name = %self.id, "Subscription already released"),
        }
        self.transport = None;
    }

    fn invoke(&self, method: PlayerMethod) -> ControlCall {
        let transport = self.transport.clone();
        let player = self.id.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = match transport {
                Some(transport) => {
                    debug!(bus_name = %player, %method, "Invoking player method");
                    transport.invoke(method).await.map_err(|e| e.to_string())
                }
                None => Err(String::from("player is not connected yet")),
            };

            result.map_err(|reason| {
                let error = MediaError::ControlFailed {
                    player,
                    method,
                    reason,
                };
                warn!("{error}");
                let _ = events_tx.send(MediaEvent::Diagnostic(error.to_string()));
                error
            })
        })
    }
}

impl fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("status", &self.properties.status)
            .field("capabilities", &self.properties.capabilities)
            .field("attached", &self.transport.is_some())
            .finish()
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.abort();
        }
    }
}
