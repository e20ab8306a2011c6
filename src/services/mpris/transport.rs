use std::{fmt, sync::Arc};

use async_trait::async_trait;
use futures::{
    StreamExt,
    stream::{self, BoxStream},
};
use tracing::debug;
use zbus::{Connection, fdo, names::UniqueName, zvariant::Optional};

use super::{
    Capabilities, MPRIS_OBJECT_PATH, MediaError, MediaPlayer2PlayerProxy, MediaPlayer2Proxy, PlaybackStatus,
    PlayerMethod, PlayerProperties, SessionId,
};

/// One `NameOwnerChanged` signal. Empty owner strings are represented as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameOwnerChange {
    /// Bus name whose owner changed
    pub name: String,
    /// Previous unique owner
    pub old_owner: Option<String>,
    /// New unique owner
    pub new_owner: Option<String>,
}

/// A player reached through the bus.
pub struct PlayerConnection {
    /// Handle used for property reads and method calls
    pub transport: Arc<dyn PlayerTransport>,
    /// Human-readable player name (`Identity`)
    pub identity: String,
}

impl fmt::Debug for PlayerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerConnection")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Access to the message bus: name registry plus player construction.
#[async_trait]
pub trait MediaBus: Send + Sync + 'static {
    /// `org.freedesktop.DBus.ListNames`
    async fn list_names(&self) -> Result<Vec<String>, MediaError>;

    /// Subscribe to `org.freedesktop.DBus.NameOwnerChanged`.
    async fn name_owner_changes(&self) -> Result<BoxStream<'static, NameOwnerChange>, MediaError>;

    /// Build a client for the player registered under `bus_name`.
    async fn connect_player(&self, bus_name: &str) -> Result<PlayerConnection, MediaError>;
}

/// Client for one player's `org.mpris.MediaPlayer2.Player` interface.
#[async_trait]
pub trait PlayerTransport: Send + Sync + 'static {
    /// Read status, metadata and capabilities.
    async fn properties(&self) -> Result<PlayerProperties, MediaError>;

    /// Invoke a control method.
    async fn invoke(&self, method: PlayerMethod) -> Result<(), MediaError>;

    /// Stream that yields once per property push from the player.
    async fn property_changes(&self) -> BoxStream<'static, ()>;
}

/// [`MediaBus`] over a zbus session connection.
#[derive(Clone)]
pub struct DbusMediaBus {
    connection: Connection,
}

impl DbusMediaBus {
    /// Connect to the session bus.
    ///
    /// # Errors
    /// Returns `MediaError::InitializationFailed` if the session bus is unreachable
    pub async fn session() -> Result<Self, MediaError> {
        let connection = Connection::session().await.map_err(|e| {
            MediaError::InitializationFailed(format!("D-Bus connection failed: {e}"))
        })?;

        Ok(Self { connection })
    }

    /// Wrap an existing connection.
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    async fn dbus_proxy(&self) -> Result<fdo::DBusProxy<'static>, MediaError> {
        fdo::DBusProxy::new(&self.connection)
            .await
            .map_err(|e| MediaError::InitializationFailed(format!("DBus proxy failed: {e}")))
    }
}

#[async_trait]
impl MediaBus for DbusMediaBus {
    async fn list_names(&self) -> Result<Vec<String>, MediaError> {
        let names = self
            .dbus_proxy()
            .await?
            .list_names()
            .await
            .map_err(|e| MediaError::EnumerationFailed(e.to_string()))?;

        Ok(names.into_iter().map(|name| name.to_string()).collect())
    }

    async fn name_owner_changes(&self) -> Result<BoxStream<'static, NameOwnerChange>, MediaError> {
        let signals = self.dbus_proxy().await?.receive_name_owner_changed().await?;

        let changes = signals.filter_map(|signal| async move {
            let args = match signal.args() {
                Ok(args) => args,
                Err(e) => {
                    debug!("Dropping malformed NameOwnerChanged signal: {e}");
                    return None;
                }
            };

            Some(NameOwnerChange {
                name: args.name().to_string(),
                old_owner: owner_string(args.old_owner()),
                new_owner: owner_string(args.new_owner()),
            })
        });

        Ok(changes.boxed())
    }

    async fn connect_player(&self, bus_name: &str) -> Result<PlayerConnection, MediaError> {
        let base_proxy = MediaPlayer2Proxy::builder(&self.connection)
            .destination(bus_name.to_string())?
            .path(MPRIS_OBJECT_PATH)?
            .build()
            .await?;

        let player_proxy = MediaPlayer2PlayerProxy::builder(&self.connection)
            .destination(bus_name.to_string())?
            .path(MPRIS_OBJECT_PATH)?
            .build()
            .await?;

        let identity = match base_proxy.identity().await {
            Ok(identity) if !identity.is_empty() => identity,
            _ => base_proxy
                .desktop_entry()
                .await
                .ok()
                .filter(|entry| !entry.is_empty())
                .unwrap_or_else(|| SessionId::from_bus_name(bus_name).short_name().to_string()),
        };

        Ok(PlayerConnection {
            transport: Arc::new(DbusPlayer {
                proxy: player_proxy,
            }),
            identity,
        })
    }
}

fn owner_string(owner: &Optional<UniqueName<'_>>) -> Option<String> {
    Option::as_ref(&**owner).map(ToString::to_string)
}

/// [`PlayerTransport`] over a generated zbus proxy.
struct DbusPlayer {
    proxy: MediaPlayer2PlayerProxy<'static>,
}

#[async_trait]
impl PlayerTransport for DbusPlayer {
    async fn properties(&self) -> Result<PlayerProperties, MediaError> {
        let status = self.proxy.playback_status().await?;

        let metadata = self.proxy.metadata().await.unwrap_or_else(|e| {
            debug!("Metadata unreadable, treating as empty: {e}");
            Default::default()
        });

        let capabilities = Capabilities::from_flags(
            self.proxy.can_play().await.unwrap_or(false),
            self.proxy.can_pause().await.unwrap_or(false),
            self.proxy.can_go_next().await.unwrap_or(false),
            self.proxy.can_go_previous().await.unwrap_or(false),
        );

        Ok(PlayerProperties {
            status: PlaybackStatus::from(status.as_str()),
            metadata,
            capabilities,
        })
    }

    async fn invoke(&self, method: PlayerMethod) -> Result<(), MediaError> {
        let result = match method {
            PlayerMethod::Play => self.proxy.play().await,
            PlayerMethod::Pause => self.proxy.pause().await,
            PlayerMethod::PlayPause => self.proxy.play_pause().await,
            PlayerMethod::Stop => self.proxy.stop().await,
            PlayerMethod::Next => self.proxy.next().await,
            PlayerMethod::Previous => self.proxy.previous().await,
        };

        Ok(result?)
    }

    async fn property_changes(&self) -> BoxStream<'static, ()> {
        let streams: Vec<BoxStream<'static, ()>> = vec![
            self.proxy
                .receive_playback_status_changed()
                .await
                .map(|_| ())
                .boxed(),
            self.proxy.receive_metadata_changed().await.map(|_| ()).boxed(),
            self.proxy.receive_can_play_changed().await.map(|_| ()).boxed(),
            self.proxy.receive_can_pause_changed().await.map(|_| ()).boxed(),
            self.proxy
                .receive_can_go_next_changed()
                .await
                .map(|_| ())
                .boxed(),
            self.proxy
                .receive_can_go_previous_changed()
                .await
                .map(|_| ())
                .boxed(),
        ];

        stream::select_all(streams).boxed()
    }
}
