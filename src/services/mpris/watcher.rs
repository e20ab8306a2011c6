use std::sync::Arc;

use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument};

use super::{
    MPRIS_BUS_PREFIX, MediaBus, MediaError, NameOwnerChange, SessionId, engine::EngineEvent,
};

/// Presence change of a player service on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// A player name gained an owner
    Appeared(SessionId),
    /// A player name lost its owner
    Disappeared(SessionId),
}

/// Decides which bus names are tracked players.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    ignored: Vec<String>,
}

impl NameFilter {
    /// Create a filter that additionally skips names containing any of `ignored`.
    pub fn new(ignored: Vec<String>) -> Self {
        Self { ignored }
    }

    /// Whether `name` is an MPRIS player that should be tracked.
    pub fn accepts(&self, name: &str) -> bool {
        name.starts_with(MPRIS_BUS_PREFIX) && !self.ignored.iter().any(|p| name.contains(p.as_str()))
    }

    /// Map one `NameOwnerChanged` signal to a presence event.
    ///
    /// Only owner acquisition (`None -> Some`) and loss (`Some -> None`) of an
    /// accepted name produce an event; owner handovers are ignored.
    pub fn classify(&self, change: &NameOwnerChange) -> Option<BusEvent> {
        if !self.accepts(&change.name) {
            return None;
        }

        let id = SessionId::from_bus_name(&change.name);
        match (change.old_owner.as_deref(), change.new_owner.as_deref()) {
            (None, Some(_)) => Some(BusEvent::Appeared(id)),
            (Some(_), None) => Some(BusEvent::Disappeared(id)),
            _ => None,
        }
    }
}

/// Watches the bus name registry for player services.
pub struct BusWatcher {
    bus: Arc<dyn MediaBus>,
    filter: NameFilter,
    listener: Option<JoinHandle<()>>,
}

impl BusWatcher {
    /// Create a watcher over `bus`.
    pub fn new(bus: Arc<dyn MediaBus>, filter: NameFilter) -> Self {
        Self {
            bus,
            filter,
            listener: None,
        }
    }

    /// Subscribe to presence changes and enumerate current players.
    ///
    /// The subscription is made before the enumeration so no name can slip
    /// between the two; a name seen by both yields a duplicate `Appeared`,
    /// which the registry ignores. Presence events are forwarded to `events`.
    /// Calling `start` again on a started watcher only re-enumerates.
    ///
    /// # Errors
    /// Returns error if the subscription or the enumeration fails. A failed
    /// enumeration leaves the subscription in place; retry with [`enumerate`](Self::enumerate).
    #[instrument(skip_all)]
    pub(crate) async fn start(
        &mut self,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<Vec<SessionId>, MediaError> {
        if !self.is_listening() {
            let mut changes = self.bus.name_owner_changes().await?;
            let filter = self.filter.clone();

            self.listener = Some(tokio::spawn(async move {
                while let Some(change) = changes.next().await {
                    let Some(event) = filter.classify(&change) else {
                        continue;
                    };

                    debug!(?event, "Player presence changed");
                    if events.send(EngineEvent::Bus(event)).is_err() {
                        break;
                    }
                }
                debug!("Presence signal stream ended");
            }));
            info!("Listening for MPRIS player presence changes");
        }

        self.enumerate().await
    }

    /// List the currently registered player names.
    ///
    /// # Errors
    /// Returns error if `ListNames` fails
    pub async fn enumerate(&self) -> Result<Vec<SessionId>, MediaError> {
        let names = self.bus.list_names().await?;

        let players: Vec<SessionId> = names
            .iter()
            .filter(|name| self.filter.accepts(name))
            .map(|name| SessionId::from_bus_name(name))
            .collect();

        info!(total = names.len(), players = players.len(), "Enumerated bus names");
        Ok(players)
    }

    /// Release the presence subscription. Idempotent.
    pub fn stop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            debug!("Presence subscription released");
        }
    }

    /// Whether the presence subscription is active.
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }
}

impl Drop for BusWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mpris::test_support::OfflineBus;

    fn change(name: &str, old: Option<&str>, new: Option<&str>) -> NameOwnerChange {
        NameOwnerChange {
            name: name.to_string(),
            old_owner: old.map(str::to_string),
            new_owner: new.map(str::to_string),
        }
    }

    #[test]
    fn appearance_and_disappearance_are_classified() {
        let filter = NameFilter::default();
        let name = "org.mpris.MediaPlayer2.vlc";

        assert_eq!(
            filter.classify(&change(name, None, Some(":1.42"))),
            Some(BusEvent::Appeared(SessionId::from_bus_name(name)))
        );
        assert_eq!(
            filter.classify(&change(name, Some(":1.42"), None)),
            Some(BusEvent::Disappeared(SessionId::from_bus_name(name)))
        );
    }

    #[test]
    fn owner_handover_is_ignored() {
        let filter = NameFilter::default();
        let handover = change("org.mpris.MediaPlayer2.vlc", Some(":1.1"), Some(":1.2"));
        assert_eq!(filter.classify(&handover), None);

        let nothing = change("org.mpris.MediaPlayer2.vlc", None, None);
        assert_eq!(filter.classify(&nothing), None);
    }

    #[test]
    fn non_player_names_are_ignored() {
        let filter = NameFilter::default();
        assert_eq!(filter.classify(&change("org.freedesktop.Notifications", None, Some(":1.3"))), None);
        assert_eq!(filter.classify(&change(":1.77", None, Some(":1.77"))), None);
        assert!(!filter.accepts("org.mpris.MediaPlayer2"));
    }

    #[test]
    fn ignored_patterns_are_skipped() {
        let filter = NameFilter::new(vec!["chromium".to_string()]);
        assert!(!filter.accepts("org.mpris.MediaPlayer2.chromium.instance123"));
        assert!(filter.accepts("org.mpris.MediaPlayer2.spotify"));
    }

    #[tokio::test]
    async fn start_subscribes_until_stopped() {
        let (events, _rx) = mpsc::unbounded_channel();
        let mut watcher = BusWatcher::new(Arc::new(OfflineBus), NameFilter::default());
        assert!(!watcher.is_listening());

        assert!(watcher.start(events.clone()).await.is_ok_and(|ids| ids.is_empty()));
        assert!(watcher.is_listening());
        assert!(watcher.start(events).await.is_ok());
        assert!(watcher.is_listening());

        watcher.stop();
        assert!(!watcher.is_listening());
        watcher.stop();
    }
}
