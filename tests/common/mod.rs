//! In-memory message bus for driving the media engine in tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::{
    collections::HashMap,
    future::ready,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use dockmedia::services::mpris::{
    Capabilities, MediaBus, MediaError, MediaEvent, MediaOptions, MediaService, NameOwnerChange,
    PlaybackStatus, PlayerConnection, PlayerMethod, PlayerProperties, PlayerTransport,
    PresentationState, Presenter, RawMetadata, TrackInfo,
};
use futures::{Stream, StreamExt, stream::BoxStream};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::{BroadcastStream, UnboundedReceiverStream};
use zbus::zvariant::{ObjectPath, OwnedValue, Value};

pub const PREFIX: &str = "org.mpris.MediaPlayer2.";

#[derive(Default)]
struct BusState {
    players: HashMap<String, FakePlayer>,
    watchers: Vec<mpsc::UnboundedSender<NameOwnerChange>>,
    failing_enumerations: usize,
}

/// Bus whose players and presence signals are scripted by the test.
#[derive(Clone, Default)]
pub struct FakeBus {
    state: Arc<Mutex<BusState>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player without a presence signal, as if it was running
    /// before the engine started.
    pub fn add_player(&self, name: &str, identity: &str) -> FakePlayer {
        let player = FakePlayer::new(name, identity);
        self.state
            .lock()
            .unwrap()
            .players
            .insert(player.bus_name(), player.clone());
        player
    }

    /// Register a player and announce it.
    pub fn appear(&self, name: &str, identity: &str) -> FakePlayer {
        let player = self.add_player(name, identity);
        self.signal(player.bus_name(), None, Some(":1.100"));
        player
    }

    /// Unregister a player and announce it.
    pub fn disappear(&self, name: &str) {
        let bus_name = format!("{PREFIX}{name}");
        self.state.lock().unwrap().players.remove(&bus_name);
        self.signal(bus_name, Some(":1.100"), None);
    }

    /// Announce an arbitrary owner change.
    pub fn signal(&self, name: String, old_owner: Option<&str>, new_owner: Option<&str>) {
        let change = NameOwnerChange {
            name,
            old_owner: old_owner.map(str::to_string),
            new_owner: new_owner.map(str::to_string),
        };

        let mut state = self.state.lock().unwrap();
        state
            .watchers
            .retain(|watcher| watcher.send(change.clone()).is_ok());
    }

    /// Make the next `count` `ListNames` calls fail.
    pub fn fail_enumerations(&self, count: usize) {
        self.state.lock().unwrap().failing_enumerations = count;
    }

    pub fn watcher_count(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        state.watchers.retain(|watcher| !watcher.is_closed());
        state.watchers.len()
    }
}

#[async_trait]
impl MediaBus for FakeBus {
    async fn list_names(&self) -> Result<Vec<String>, MediaError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_enumerations > 0 {
            state.failing_enumerations -= 1;
            return Err(MediaError::EnumerationFailed("bus unavailable".to_string()));
        }

        let mut names: Vec<String> = state.players.keys().cloned().collect();
        names.push("org.freedesktop.Notifications".to_string());
        names.sort();
        Ok(names)
    }

    async fn name_owner_changes(&self) -> Result<BoxStream<'static, NameOwnerChange>, MediaError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().unwrap().watchers.push(tx);
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn connect_player(&self, bus_name: &str) -> Result<PlayerConnection, MediaError> {
        let player = self
            .state
            .lock()
            .unwrap()
            .players
            .get(bus_name)
            .cloned()
            .ok_or_else(|| MediaError::InitializationFailed(format!("{bus_name} is gone")))?;

        let identity = player.identity.clone();
        Ok(PlayerConnection {
            transport: Arc::new(player),
            identity,
        })
    }
}

#[derive(Debug)]
struct PlayerState {
    status: &'static str,
    title: String,
    artist: String,
    capabilities: Capabilities,
    calls: Vec<PlayerMethod>,
    reject_calls: bool,
}

/// One scripted player. Clones share state.
#[derive(Clone)]
pub struct FakePlayer {
    name: String,
    identity: String,
    state: Arc<Mutex<PlayerState>>,
    changes: broadcast::Sender<()>,
}

impl FakePlayer {
    fn new(name: &str, identity: &str) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            name: name.to_string(),
            identity: identity.to_string(),
            state: Arc::new(Mutex::new(PlayerState {
                status: "Stopped",
                title: String::new(),
                artist: String::new(),
                capabilities: Capabilities::all(),
                calls: Vec::new(),
                reject_calls: false,
            })),
            changes,
        }
    }

    pub fn bus_name(&self) -> String {
        format!("{PREFIX}{}", self.name)
    }

    /// Change the reported status and push a property change.
    pub fn set_status(&self, status: &'static str) {
        self.state.lock().unwrap().status = status;
        self.push();
    }

    pub fn set_track(&self, title: &str, artist: &str) {
        {
            let mut state = self.state.lock().unwrap();
            state.title = title.to_string();
            state.artist = artist.to_string();
        }
        self.push();
    }

    pub fn set_capabilities(&self, capabilities: Capabilities) {
        self.state.lock().unwrap().capabilities = capabilities;
        self.push();
    }

    pub fn reject_calls(&self) {
        self.state.lock().unwrap().reject_calls = true;
    }

    pub fn calls(&self) -> Vec<PlayerMethod> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn subscribers(&self) -> usize {
        self.changes.receiver_count()
    }

    fn push(&self) {
        let _ = self.changes.send(());
    }
}

fn owned(value: Value<'_>) -> OwnedValue {
    OwnedValue::try_from(value).unwrap()
}

#[async_trait]
impl PlayerTransport for FakePlayer {
    async fn properties(&self) -> Result<PlayerProperties, MediaError> {
        let state = self.state.lock().unwrap();

        let mut metadata = RawMetadata::new();
        metadata.insert(
            "mpris:trackid".to_string(),
            owned(Value::from(
                ObjectPath::try_from(format!("/org/mpris/track/{}", self.name.replace('.', "_")))
                    .unwrap(),
            )),
        );
        if !state.title.is_empty() {
            metadata.insert("xesam:title".to_string(), owned(Value::from(state.title.as_str())));
        }
        if !state.artist.is_empty() {
            metadata.insert(
                "xesam:artist".to_string(),
                owned(Value::from(vec![state.artist.as_str()])),
            );
        }

        Ok(PlayerProperties {
            status: PlaybackStatus::from(state.status),
            metadata,
            capabilities: state.capabilities,
        })
    }

    async fn invoke(&self, method: PlayerMethod) -> Result<(), MediaError> {
        let mut state = self.state.lock().unwrap();
        if state.reject_calls {
            return Err(MediaError::InitializationFailed(format!("{method} rejected")));
        }
        state.calls.push(method);
        Ok(())
    }

    async fn property_changes(&self) -> BoxStream<'static, ()> {
        BroadcastStream::new(self.changes.subscribe())
            .filter_map(|change| ready(change.ok()))
            .boxed()
    }
}

/// Everything the engine told its presenter, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Presented {
    Session(TrackInfo, PlaybackStatus),
    State(PresentationState, u32),
}

/// Presenter that records its calls.
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    log: Arc<Mutex<Vec<Presented>>>,
}

impl RecordingPresenter {
    pub fn log(&self) -> Vec<Presented> {
        self.log.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<(PresentationState, u32)> {
        self.log()
            .into_iter()
            .filter_map(|entry| match entry {
                Presented::State(state, size) => Some((state, size)),
                Presented::Session(..) => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn on_session_update(&mut self, track: &TrackInfo, status: PlaybackStatus) {
        self.log
            .lock()
            .unwrap()
            .push(Presented::Session(track.clone(), status));
    }

    fn on_presentation_state_change(&mut self, state: PresentationState, target_size: u32) {
        self.log.lock().unwrap().push(Presented::State(state, target_size));
    }

    fn natural_width(&self, _track: &TrackInfo) -> u32 {
        250
    }
}

pub fn options() -> MediaOptions {
    MediaOptions {
        enumeration_retry: Duration::from_millis(100),
        ..MediaOptions::default()
    }
}

pub fn start(bus: &FakeBus, options: MediaOptions) -> (MediaService, RecordingPresenter) {
    let presenter = RecordingPresenter::default();
    let service = MediaService::start(options, Arc::new(bus.clone()), Box::new(presenter.clone()));
    (service, presenter)
}

/// Wait for the first event matching `predicate`, failing after a generous
/// (virtual) timeout.
pub async fn wait_for<S, F>(events: &mut S, mut predicate: F) -> MediaEvent
where
    S: Stream<Item = MediaEvent> + Unpin,
    F: FnMut(&MediaEvent) -> bool,
{
    let found = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(event) = events.next().await {
            if predicate(&event) {
                return Some(event);
            }
        }
        None
    })
    .await;

    match found {
        Ok(Some(event)) => event,
        Ok(None) => panic!("event stream ended"),
        Err(_) => panic!("timed out waiting for event"),
    }
}

/// Poll `condition` until it holds, failing after a generous (virtual) timeout.
pub async fn eventually<F: FnMut() -> bool>(mut condition: F) {
    let reached = tokio::time::timeout(Duration::from_secs(10), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    assert!(reached.is_ok(), "condition never became true");
}
