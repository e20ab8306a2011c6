use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, info, instrument};

use super::{
    Capabilities, MediaBus, MediaEvent, MediaEventSender, PlaybackStatus, PlayerConnection,
    PlayerHandle, PlayerProperties, SessionId, SessionKey, TrackInfo, engine::EngineEvent,
    metadata, player::monitoring::spawn_monitor,
};

/// Upper bound of the delay between connection attempts to one player.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Tracking record for one player service.
#[derive(Debug)]
pub struct MediaSession {
    handle: PlayerHandle,
    track: TrackInfo,
    last_status_change_at: Instant,
    seq: u64,
    refreshing: bool,
    connect_failures: u32,
}

impl MediaSession {
    /// Bus identity.
    pub fn id(&self) -> &SessionId {
        self.handle.id()
    }

    /// Player handle for control dispatch.
    pub fn handle(&self) -> &PlayerHandle {
        &self.handle
    }

    /// Last known playback status.
    pub fn status(&self) -> PlaybackStatus {
        self.handle.status()
    }

    /// Last known capabilities.
    pub fn capabilities(&self) -> Capabilities {
        self.handle.capabilities()
    }

    /// Extracted track descriptor.
    pub fn track(&self) -> &TrackInfo {
        &self.track
    }

    /// When the playback status last changed value (or the insertion time).
    pub fn last_status_change_at(&self) -> Instant {
        self.last_status_change_at
    }

    /// Insertion sequence number; lower means registered earlier.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// `true` until the first refresh after insertion completed or failed.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub(crate) fn key(&self) -> SessionKey {
        SessionKey {
            id: self.id().clone(),
            seq: self.seq,
        }
    }
}

/// Owns every tracked session, keyed by bus name.
///
/// Entries are created only from observed appearances and destroyed only from
/// observed disappearances or [`teardown`](Self::teardown). Reports from
/// monitor tasks are matched on `(id, seq)`, so nothing touches an entry after
/// its removal even if the same name re-appears.
pub struct SessionRegistry {
    sessions: HashMap<SessionId, MediaSession>,
    next_seq: u64,
    reconnect_delay: Duration,
    bus: Arc<dyn MediaBus>,
    engine_tx: mpsc::UnboundedSender<EngineEvent>,
    events_tx: MediaEventSender,
}

impl SessionRegistry {
    /// `reconnect_delay` is the wait before the first new connection attempt
    /// to a player whose connect failed.
    pub(crate) fn new(
        bus: Arc<dyn MediaBus>,
        engine_tx: mpsc::UnboundedSender<EngineEvent>,
        events_tx: MediaEventSender,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            next_seq: 0,
            reconnect_delay,
            bus,
            engine_tx,
            events_tx,
        }
    }

    /// Start tracking `id`. Returns `false` if it was already tracked.
    ///
    /// The entry is inserted in the refreshing state (status `Unknown`) and its
    /// monitor task immediately connects and reads the current properties.
    #[instrument(skip(self), fields(bus_name = %id))]
    pub fn on_appeared(&mut self, id: SessionId) -> bool {
        if self.sessions.contains_key(&id) {
            debug!("Player already tracked");
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let key = SessionKey {
            id: id.clone(),
            seq,
        };
        let monitor = spawn_monitor(Arc::clone(&self.bus), key, self.engine_tx.clone(), Duration::ZERO);
        let handle = PlayerHandle::new(id.clone(), monitor, self.events_tx.clone());

        self.sessions.insert(
            id.clone(),
            MediaSession {
                handle,
                track: TrackInfo::default(),
                last_status_change_at: Instant::now(),
                seq,
                refreshing: true,
                connect_failures: 0,
            },
        );

        info!(seq, "Player session added");
        let _ = self.events_tx.send(MediaEvent::SessionAdded(id));
        true
    }

    /// Stop tracking `id`. Returns `false` if it was not tracked.
    ///
    /// The property subscription is released before the entry is dropped,
    /// whatever the session's last status was.
    #[instrument(skip(self), fields(bus_name = %id))]
    pub fn on_disappeared(&mut self, id: &SessionId) -> bool {
        let Some(mut session) = self.sessions.remove(id) else {
            debug!("Player was not tracked");
            return false;
        };

        session.handle.teardown();
        info!("Player session removed");
        let _ = self.events_tx.send(MediaEvent::SessionRemoved(id.clone()));
        true
    }

    pub(crate) fn attach(&mut self, key: &SessionKey, connection: PlayerConnection) -> bool {
        let Some(session) = self.live_mut(key) else {
            return false;
        };

        debug!(bus_name = %key.id, identity = %connection.identity, "Player connected");
        session.connect_failures = 0;
        session.handle.attach(connection);
        true
    }

    /// Start a new monitor for a session whose connect failed, after a delay
    /// that doubles with each consecutive failure up to a minute. The session
    /// keeps its key. Returns the delay, or `None` for a stale report.
    pub(crate) fn reconnect(&mut self, key: &SessionKey) -> Option<Duration> {
        if !self.is_live(key) {
            return None;
        }

        let bus = Arc::clone(&self.bus);
        let engine_tx = self.engine_tx.clone();
        let base = self.reconnect_delay;
        let session = self.sessions.get_mut(&key.id)?;

        let delay = base
            .saturating_mul(1 << session.connect_failures.min(6))
            .min(MAX_RECONNECT_DELAY);
        session.connect_failures = session.connect_failures.saturating_add(1);

        debug!(
            bus_name = %key.id,
            attempt = session.connect_failures,
            retry_ms = delay.as_millis(),
            "Scheduling player reconnect"
        );
        let monitor = spawn_monitor(bus, key.clone(), engine_tx, delay);
        session.handle.restart(monitor);
        Some(delay)
    }

    /// Apply a refresh. `lastStatusChangeAt` moves only when the status value
    /// changed. Returns the updated session, or `None` for a stale report.
    pub(crate) fn apply_refresh(
        &mut self,
        key: &SessionKey,
        properties: PlayerProperties,
        now: Instant,
    ) -> Option<&MediaSession> {
        let events_tx = self.events_tx.clone();
        let session = self.live_mut(key)?;

        session.track = metadata::extract(&properties.metadata);
        if session.handle.apply(properties) {
            session.last_status_change_at = now;
        }
        session.refreshing = false;

        let _ = events_tx.send(MediaEvent::SessionUpdated {
            id: key.id.clone(),
            status: session.status(),
            track: session.track.clone(),
        });

        Some(session)
    }

    /// Leave the refreshing state without new data. Returns `false` for a
    /// stale report.
    pub(crate) fn settle_failed(&mut self, key: &SessionKey) -> bool {
        match self.live_mut(key) {
            Some(session) => {
                session.refreshing = false;
                true
            }
            None => false,
        }
    }

    /// Look up a tracked session.
    pub fn get(&self, id: &SessionId) -> Option<&MediaSession> {
        self.sessions.get(id)
    }

    /// Whether `id` is tracked.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// All tracked sessions, in no particular order.
    pub fn sessions(&self) -> impl Iterator<Item = &MediaSession> {
        self.sessions.values()
    }

    /// Release every subscription and forget every session.
    #[instrument(skip(self))]
    pub fn teardown(&mut self) {
        for (_, mut session) in self.sessions.drain() {
            session.handle.teardown();
        }
        info!("All player sessions torn down");
    }

    pub(crate) fn is_live(&self, key: &SessionKey) -> bool {
        self.sessions
            .get(&key.id)
            .is_some_and(|session| session.seq == key.seq)
    }

    fn live_mut(&mut self, key: &SessionKey) -> Option<&mut MediaSession> {
        match self.sessions.get_mut(&key.id) {
            Some(session) if session.seq == key.seq => Some(session),
            _ => {
                debug!(bus_name = %key.id, seq = key.seq, "Dropping report for removed session");
                None
            }
        }
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        for session in self.sessions.values_mut() {
            session.handle.teardown();
        }
    }
}
