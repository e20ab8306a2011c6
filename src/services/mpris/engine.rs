use std::{collections::HashSet, sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, info, instrument, warn};

use super::{
    BusEvent, BusWatcher, Capabilities, ControlCall, ControlRequest, MediaBus, MediaError,
    MediaEvent, MediaEventSender, MediaOptions, NameFilter, PlayerConnection, PlayerMethod,
    PlayerProperties, PresentationState, PresentationStateMachine, Presenter, Selection,
    SessionId, SessionKey, SessionRegistry, SessionSnapshot, Transition, selector,
};
use crate::services::common::Property;

/// Shortest wait between two enumeration or connection attempts.
const MIN_RETRY: Duration = Duration::from_millis(50);

/// A control request that reached a player.
#[derive(Debug)]
pub(crate) struct Dispatched {
    pub(crate) player: SessionId,
    pub(crate) method: PlayerMethod,
    pub(crate) call: ControlCall,
}

/// Reply to a control request; `None` when nothing was invoked.
pub(crate) type ControlReply = Result<Option<Dispatched>, MediaError>;

/// Everything the engine task reacts to. Monitor tasks, the presence listener,
/// timers and the public handle only ever talk to the engine through these.
#[derive(Debug)]
pub(crate) enum EngineEvent {
    Bus(BusEvent),
    Attached {
        key: SessionKey,
        connection: PlayerConnection,
    },
    AttachFailed {
        key: SessionKey,
        error: MediaError,
    },
    Refreshed {
        key: SessionKey,
        properties: PlayerProperties,
    },
    RefreshFailed {
        key: SessionKey,
        error: MediaError,
    },
    AnimationComplete {
        generation: u64,
    },
    Control {
        target: Option<SessionId>,
        request: ControlRequest,
        reply: Option<oneshot::Sender<ControlReply>>,
    },
    Query(oneshot::Sender<Vec<SessionSnapshot>>),
    Rescan,
    Shutdown,
}

/// Observable outputs of the engine, shared with the public handle.
pub(crate) struct EngineOutputs {
    pub(crate) events_tx: MediaEventSender,
    pub(crate) selection: Property<Option<Selection>>,
    pub(crate) presentation: Property<PresentationState>,
    pub(crate) settled: watch::Sender<bool>,
}

/// Single owner of the registry, the selection and the presentation machine.
///
/// Events are handled one at a time; after each one the selection is
/// recomputed and fed to the state machine.
pub(crate) struct Engine {
    options: MediaOptions,
    watcher: BusWatcher,
    registry: SessionRegistry,
    machine: PresentationStateMachine,
    presenter: Box<dyn Presenter>,
    selection: Option<Selection>,
    target_size: u32,
    pending: HashSet<SessionId>,
    animation: Option<JoinHandle<()>>,
    retry: Option<JoinHandle<()>>,
    engine_tx: mpsc::UnboundedSender<EngineEvent>,
    outputs: EngineOutputs,
}

impl Engine {
    pub(crate) fn new(
        options: MediaOptions,
        bus: Arc<dyn MediaBus>,
        presenter: Box<dyn Presenter>,
        engine_tx: mpsc::UnboundedSender<EngineEvent>,
        outputs: EngineOutputs,
    ) -> Self {
        let filter = NameFilter::new(options.ignored_players.clone());

        Self {
            watcher: BusWatcher::new(Arc::clone(&bus), filter),
            registry: SessionRegistry::new(
                bus,
                engine_tx.clone(),
                outputs.events_tx.clone(),
                options.enumeration_retry.max(MIN_RETRY),
            ),
            machine: PresentationStateMachine::new(),
            presenter,
            selection: None,
            target_size: 0,
            pending: HashSet::new(),
            animation: None,
            retry: None,
            engine_tx,
            outputs,
            options,
        }
    }

    /// Run until [`EngineEvent::Shutdown`], then release every subscription.
    #[instrument(skip_all, name = "media_engine")]
    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<EngineEvent>) {
        info!("Media engine started");
        self.scan(true).await;
        self.publish();

        while let Some(event) = rx.recv().await {
            match event {
                EngineEvent::Shutdown => break,
                EngineEvent::Rescan => self.scan(false).await,
                event => self.handle(event),
            }
            self.publish();
        }

        self.teardown();
        info!("Media engine stopped");
    }

    fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Bus(BusEvent::Appeared(id)) => {
                self.registry.on_appeared(id);
            }
            EngineEvent::Bus(BusEvent::Disappeared(id)) => {
                self.registry.on_disappeared(&id);
                self.settle(&id);
            }
            EngineEvent::Attached { key, connection } => {
                self.registry.attach(&key, connection);
            }
            EngineEvent::AttachFailed { key, error } => {
                let first_failure = self
                    .registry
                    .get(&key.id)
                    .is_some_and(|session| session.is_refreshing());

                if self.registry.settle_failed(&key) {
                    if first_failure {
                        self.diagnostic(&error);
                    } else {
                        debug!(bus_name = %key.id, %error, "Player still unreachable");
                    }
                    self.settle(&key.id);
                    self.registry.reconnect(&key);
                }
            }
            EngineEvent::Refreshed { key, properties } => {
                if self.registry.apply_refresh(&key, properties, Instant::now()).is_some() {
                    self.settle(&key.id);
                }
            }
            EngineEvent::RefreshFailed { key, error } => {
                if self.registry.settle_failed(&key) {
                    self.diagnostic(&error);
                    self.settle(&key.id);
                }
            }
            EngineEvent::AnimationComplete { generation } => self.complete_animation(generation),
            EngineEvent::Control {
                target,
                request,
                reply,
            } => {
                let result = self.dispatch(target, request);
                match reply {
                    Some(reply) => {
                        let _ = reply.send(result);
                    }
                    None => {
                        if let Err(error) = result {
                            self.diagnostic(&error);
                        }
                    }
                }
            }
            EngineEvent::Query(reply) => {
                let _ = reply.send(self.snapshot());
            }
            EngineEvent::Rescan | EngineEvent::Shutdown => {}
        }
    }

    /// Subscribe (if needed) and enumerate. On failure a retry is scheduled;
    /// the initial scan counts as settled either way.
    async fn scan(&mut self, initial: bool) {
        self.retry = None;

        match self.watcher.start(self.engine_tx.clone()).await {
            Ok(ids) => {
                for id in ids {
                    if self.registry.on_appeared(id.clone()) && initial {
                        self.pending.insert(id);
                    }
                }
                if initial && self.pending.is_empty() {
                    self.mark_settled();
                }
            }
            Err(error) => {
                self.diagnostic(&error);
                self.schedule_retry();
                if initial {
                    self.mark_settled();
                }
            }
        }
    }

    fn schedule_retry(&mut self) {
        let delay = self.options.enumeration_retry.max(MIN_RETRY);
        let engine_tx = self.engine_tx.clone();

        debug!(retry_ms = delay.as_millis(), "Scheduling enumeration retry");
        self.retry = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = engine_tx.send(EngineEvent::Rescan);
        }));
    }

    fn settle(&mut self, id: &SessionId) {
        if self.pending.remove(id) && self.pending.is_empty() {
            self.mark_settled();
        }
    }

    fn mark_settled(&self) {
        if !*self.outputs.settled.borrow() {
            debug!(sessions = self.registry.len(), "Initial enumeration settled");
            self.outputs.settled.send_replace(true);
        }
    }

    /// Recompute the selection and drive the presentation from it.
    fn publish(&mut self) {
        let selection = selector::select(&self.registry);

        if selection != self.selection {
            match &selection {
                Some(selected) => {
                    debug!(bus_name = %selected.id, title = %selected.track.title, "Selection changed");
                    self.presenter.on_session_update(&selected.track, selected.status);
                }
                None => debug!("Selection cleared"),
            }

            self.outputs.selection.set(selection.clone());
            let _ = self
                .outputs
                .events_tx
                .send(MediaEvent::SelectionChanged(selection.clone()));
            self.selection = selection;
        }

        let expand_size = self.expand_size();
        if let Some(transition) = self.machine.on_selection(self.selection.is_some(), expand_size) {
            self.begin_animation(transition);
        }
    }

    fn expand_size(&self) -> u32 {
        self.selection.as_ref().map_or(self.options.min_width, |selected| {
            self.presenter
                .natural_width(&selected.track)
                .clamp(self.options.min_width, self.options.max_width)
        })
    }

    fn begin_animation(&mut self, transition: Transition) {
        if let Some(timer) = self.animation.take() {
            timer.abort();
        }

        let generation = transition.generation;
        let duration = self.options.animation;
        let engine_tx = self.engine_tx.clone();
        self.animation = Some(tokio::spawn(async move {
            time::sleep(duration).await;
            let _ = engine_tx.send(EngineEvent::AnimationComplete { generation });
        }));

        self.target_size = transition.target_size;
        self.present(transition.state);
    }

    fn complete_animation(&mut self, generation: u64) {
        let Some(state) = self.machine.on_animation_complete(generation) else {
            return;
        };

        self.animation = None;
        self.present(state);
    }

    fn present(&mut self, state: PresentationState) {
        let target_size = self.target_size;

        info!(%state, target_size, "Presentation state changed");
        self.presenter.on_presentation_state_change(state, target_size);
        self.outputs.presentation.set(state);
        let _ = self
            .outputs
            .events_tx
            .send(MediaEvent::PresentationChanged { state, target_size });
    }

    fn dispatch(&self, target: Option<SessionId>, request: ControlRequest) -> ControlReply {
        let id = match target {
            Some(id) => id,
            None => match &self.selection {
                Some(selected) => selected.id.clone(),
                None => {
                    debug!(?request, "No active session to control");
                    return Ok(None);
                }
            },
        };

        let session = self
            .registry
            .get(&id)
            .ok_or_else(|| MediaError::PlayerNotFound(id.clone()))?;
        let handle = session.handle();
        let capabilities = handle.capabilities();

        let dispatched = match request {
            ControlRequest::Toggle => handle.toggle_status(),
            ControlRequest::Next if capabilities.contains(Capabilities::CAN_GO_NEXT) => {
                Some((PlayerMethod::Next, handle.next()))
            }
            ControlRequest::Previous if capabilities.contains(Capabilities::CAN_GO_PREVIOUS) => {
                Some((PlayerMethod::Previous, handle.previous()))
            }
            ControlRequest::Next | ControlRequest::Previous => {
                debug!(bus_name = %id, ?request, "Player cannot skip in that direction");
                None
            }
        };

        Ok(dispatched.map(|(method, call)| Dispatched {
            player: id,
            method,
            call,
        }))
    }

    fn snapshot(&self) -> Vec<SessionSnapshot> {
        let selected = self.selection.as_ref().map(|selection| &selection.id);

        let mut sessions: Vec<_> = self.registry.sessions().collect();
        sessions.sort_by_key(|session| session.seq());

        sessions
            .into_iter()
            .map(|session| SessionSnapshot {
                id: session.id().clone(),
                identity: session.handle().identity().to_string(),
                status: session.status(),
                capabilities: session.capabilities(),
                track: session.track().clone(),
                refreshing: session.is_refreshing(),
                selected: selected == Some(session.id()),
            })
            .collect()
    }

    fn diagnostic(&self, error: &MediaError) {
        warn!("{error}");
        let _ = self
            .outputs
            .events_tx
            .send(MediaEvent::Diagnostic(error.to_string()));
    }

    fn teardown(&mut self) {
        if let Some(timer) = self.animation.take() {
            timer.abort();
        }
        if let Some(retry) = self.retry.take() {
            retry.abort();
        }
        self.watcher.stop();
        self.registry.teardown();
        self.mark_settled();
    }
}
