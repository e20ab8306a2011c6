use std::{sync::Arc, time::Duration};

use async_stream::stream;
use futures::Stream;
use serde::Serialize;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

use super::{
    Capabilities, ControlRequest, DbusMediaBus, MediaBus, MediaError, MediaEvent, PlaybackStatus,
    PlayerMethod, PresentationState, Selection, SessionId, TrackInfo,
    engine::{Dispatched, Engine, EngineEvent, EngineOutputs},
};
use crate::services::common::Property;

/// Approximate rendered width of one character of track text.
const CHAR_WIDTH: u32 = 7;
/// Width taken by the album art, padding and control buttons.
const CHROME_WIDTH: u32 = 96;

/// The UI layer the engine drives.
///
/// All methods are called from the engine task, one at a time.
pub trait Presenter: Send + 'static {
    /// The selected session, its track or its status changed.
    fn on_session_update(&mut self, track: &TrackInfo, status: PlaybackStatus);

    /// The presentation started or finished a transition.
    fn on_presentation_state_change(&mut self, state: PresentationState, target_size: u32);

    /// Width the widget would like to show `track` at. The engine clamps it to
    /// the configured bounds.
    fn natural_width(&self, track: &TrackInfo) -> u32 {
        let longest = track
            .title
            .chars()
            .count()
            .max(track.artist.chars().count());
        let text = u32::try_from(longest).unwrap_or(u32::MAX);

        text.saturating_mul(CHAR_WIDTH).saturating_add(CHROME_WIDTH)
    }
}

/// Presenter that only logs.
#[derive(Debug, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn on_session_update(&mut self, track: &TrackInfo, status: PlaybackStatus) {
        info!(
            title = %track.title,
            artist = %track.artist,
            album = %track.album,
            %status,
            "Now showing"
        );
    }

    fn on_presentation_state_change(&mut self, state: PresentationState, target_size: u32) {
        info!(%state, target_size, "Presentation");
    }
}

/// Runtime knobs for the media engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaOptions {
    /// Bus name substrings that are never tracked
    pub ignored_players: Vec<String>,
    /// Delay before retrying a failed enumeration
    pub enumeration_retry: Duration,
    /// Duration of one expand or collapse animation
    pub animation: Duration,
    /// Lower bound of the expanded size
    pub min_width: u32,
    /// Upper bound of the expanded size
    pub max_width: u32,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            ignored_players: Vec::new(),
            enumeration_retry: Duration::from_millis(2000),
            animation: Duration::from_millis(300),
            min_width: 180,
            max_width: 300,
        }
    }
}

/// Point-in-time view of one tracked session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Bus identity
    pub id: SessionId,
    /// Human-readable player name
    pub identity: String,
    /// Last known status
    pub status: PlaybackStatus,
    /// Last known capabilities
    pub capabilities: Capabilities,
    /// Current track
    pub track: TrackInfo,
    /// Whether the first refresh is still outstanding
    pub refreshing: bool,
    /// Whether this is the active selection
    pub selected: bool,
}

/// Handle to a running media engine.
///
/// The engine runs on its own task and owns every session. This handle
/// forwards requests to it and exposes its outputs. Dropping the handle stops
/// the engine.
pub struct MediaService {
    engine_tx: mpsc::UnboundedSender<EngineEvent>,
    events_tx: broadcast::Sender<MediaEvent>,
    selection: Property<Option<Selection>>,
    presentation: Property<PresentationState>,
    settled: watch::Receiver<bool>,
    engine: Option<JoinHandle<()>>,
}

impl MediaService {
    /// Connect to the session bus and start the engine.
    ///
    /// # Errors
    /// Returns error if the session bus connection cannot be established
    pub async fn connect(
        options: MediaOptions,
        presenter: Box<dyn Presenter>,
    ) -> Result<Self, MediaError> {
        let bus = DbusMediaBus::session().await?;
        Ok(Self::start(options, Arc::new(bus), presenter))
    }

    /// Start the engine over `bus`. Must be called within a tokio runtime.
    #[instrument(skip_all)]
    pub fn start(options: MediaOptions, bus: Arc<dyn MediaBus>, presenter: Box<dyn Presenter>) -> Self {
        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(1024);
        let (settled_tx, settled) = watch::channel(false);
        let selection = Property::new(None);
        let presentation = Property::new(PresentationState::Hidden);

        let outputs = EngineOutputs {
            events_tx: events_tx.clone(),
            selection: selection.clone(),
            presentation: presentation.clone(),
            settled: settled_tx,
        };
        let engine = Engine::new(options, bus, presenter, engine_tx.clone(), outputs);
        let engine = tokio::spawn(engine.run(engine_rx));

        Self {
            engine_tx,
            events_tx,
            selection,
            presentation,
            settled,
            engine: Some(engine),
        }
    }

    /// Stream of engine events from now on.
    pub fn events(&self) -> impl Stream<Item = MediaEvent> + Send + 'static {
        let mut rx = self.events_tx.subscribe();

        stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Media event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    /// Current active selection.
    pub fn selection(&self) -> Option<Selection> {
        self.selection.get()
    }

    /// Active selection, yielding the current value first.
    pub fn watch_selection(&self) -> impl Stream<Item = Option<Selection>> + Send {
        self.selection.watch()
    }

    /// Current presentation state.
    pub fn presentation(&self) -> PresentationState {
        self.presentation.get()
    }

    /// Presentation state, yielding the current value first.
    pub fn watch_presentation(&self) -> impl Stream<Item = PresentationState> + Send {
        self.presentation.watch()
    }

    /// Toggle playback on the active session.
    ///
    /// # Errors
    /// Returns error if the engine has stopped
    pub fn request_toggle(&self) -> Result<(), MediaError> {
        self.request(ControlRequest::Toggle)
    }

    /// Skip forward on the active session, if it can.
    ///
    /// # Errors
    /// Returns error if the engine has stopped
    pub fn request_next(&self) -> Result<(), MediaError> {
        self.request(ControlRequest::Next)
    }

    /// Skip backward on the active session, if it can.
    ///
    /// # Errors
    /// Returns error if the engine has stopped
    pub fn request_previous(&self) -> Result<(), MediaError> {
        self.request(ControlRequest::Previous)
    }

    /// Apply `request` to `target` (or the active session) and wait for the
    /// remote call to finish.
    ///
    /// Returns the method invoked, or `None` when there was nothing to control
    /// or the player lacks the capability.
    ///
    /// # Errors
    /// Returns error if the target is not tracked, the remote call failed or
    /// the engine has stopped
    pub async fn control(
        &self,
        target: Option<SessionId>,
        request: ControlRequest,
    ) -> Result<Option<PlayerMethod>, MediaError> {
        let (reply, response) = oneshot::channel();
        self.send(EngineEvent::Control {
            target,
            request,
            reply: Some(reply),
        })?;

        let Some(Dispatched {
            player,
            method,
            call,
        }) = response.await.map_err(|_| MediaError::EngineStopped)??
        else {
            return Ok(None);
        };

        call.await
            .map_err(|e| MediaError::ControlFailed {
                player,
                method,
                reason: e.to_string(),
            })??;

        Ok(Some(method))
    }

    /// Snapshot of every tracked session, in registration order.
    ///
    /// # Errors
    /// Returns error if the engine has stopped
    pub async fn sessions(&self) -> Result<Vec<SessionSnapshot>, MediaError> {
        let (reply, response) = oneshot::channel();
        self.send(EngineEvent::Query(reply))?;
        response.await.map_err(|_| MediaError::EngineStopped)
    }

    /// Wait until every session found by the initial enumeration finished its
    /// first refresh, or the enumeration failed.
    pub async fn wait_settled(&self) {
        let mut settled = self.settled.clone();
        if settled.wait_for(|settled| *settled).await.is_err() {
            debug!("Engine stopped before settling");
        }
    }

    /// Stop the engine and wait until every subscription is released.
    #[instrument(skip_all)]
    pub async fn shutdown(mut self) {
        let _ = self.engine_tx.send(EngineEvent::Shutdown);

        if let Some(engine) = self.engine.take() {
            if let Err(e) = engine.await {
                warn!(error = %e, "Media engine task failed");
            }
        }
    }

    fn request(&self, request: ControlRequest) -> Result<(), MediaError> {
        self.send(EngineEvent::Control {
            target: None,
            request,
            reply: None,
        })
    }

    fn send(&self, event: EngineEvent) -> Result<(), MediaError> {
        self.engine_tx
            .send(event)
            .map_err(|_| MediaError::EngineStopped)
    }
}

impl Drop for MediaService {
    fn drop(&mut self) {
        if self.engine.is_some() {
            let _ = self.engine_tx.send(EngineEvent::Shutdown);
        }
    }
}
