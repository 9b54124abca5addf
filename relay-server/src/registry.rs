use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use relay_types::{BrowserId, ConnectionStatus, PushEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one registry entry. Entries only change state through
/// registry methods; there are no cleanup callbacks. Closing is immediate
/// because a closed entry leaves the map in the same write-lock scope, so
/// there is no intermediate state to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Active,
    Closed,
}

/// One live outbound event sink bound to a player identity.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub browser_id: BrowserId,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub state: ConnectionState,
    sender: mpsc::UnboundedSender<PushEvent>,
}

impl Connection {
    fn new(browser_id: BrowserId) -> (Self, mpsc::UnboundedReceiver<PushEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let now = Instant::now();
        let connection = Self {
            id: ConnectionId::new(),
            browser_id,
            connected_at: now,
            last_activity: now,
            state: ConnectionState::Active,
            sender,
        };
        (connection, receiver)
    }

    /// Queue an event for the transport task. Never blocks; fails once the
    /// receiving side is gone.
    fn push(&self, event: PushEvent) -> Result<(), ()> {
        if self.state != ConnectionState::Active {
            return Err(());
        }
        self.sender.send(event).map_err(|_| ())
    }

    fn is_stale(&self, threshold: Duration) -> bool {
        self.last_activity.elapsed() > threshold
    }

    /// Dropping the sender ends the transport task's receive loop, which
    /// closes the underlying socket.
    fn close(&mut self) {
        self.state = ConnectionState::Closed;
    }
}

/// What `register` hands back to the transport: the entry's id plus the
/// receiving end the transport task drains.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub events: mpsc::UnboundedReceiver<PushEvent>,
}

/// Process-local registry of live connections, at most one per player
/// identity. Sweeps and request handlers only ever communicate through
/// this map.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<BrowserId, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a fresh connection for `browser_id`, superseding and
    /// closing any existing one.
    pub async fn register(&self, browser_id: &str) -> ConnectionHandle {
        let (connection, receiver) = Connection::new(browser_id.to_string());
        let id = connection.id;

        let mut connections = self.connections.write().await;
        if let Some(mut previous) = connections.insert(browser_id.to_string(), connection) {
            tracing::info!(browser_id, previous = %previous.id, "superseding existing connection");
            previous.close();
        }
        drop(connections);

        tracing::info!(browser_id, connection = %id, "connection registered");
        ConnectionHandle {
            id,
            events: receiver,
        }
    }

    /// Idempotent close-and-discard.
    pub async fn remove(&self, browser_id: &str) {
        let mut connections = self.connections.write().await;
        if let Some(mut connection) = connections.remove(browser_id) {
            connection.close();
            tracing::info!(
                browser_id,
                connection = %connection.id,
                uptime = ?connection.connected_at.elapsed(),
                "connection removed"
            );
        }
    }

    /// Remove only while the entry still belongs to `id`. Used by a
    /// transport task on teardown so it never tears down a connection that
    /// superseded its own.
    pub async fn remove_exact(&self, browser_id: &str, id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if connections.get(browser_id).is_some_and(|c| c.id == id) {
            if let Some(mut connection) = connections.remove(browser_id) {
                connection.close();
                tracing::info!(
                    browser_id,
                    connection = %connection.id,
                    uptime = ?connection.connected_at.elapsed(),
                    "connection removed"
                );
            }
        }
    }

    /// Refresh the activity clock; no-op for unknown ids.
    pub async fn touch(&self, browser_id: &str) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(browser_id) {
            connection.last_activity = Instant::now();
        }
    }

    /// Point-in-time view of who is connected.
    pub async fn snapshot(&self) -> ConnectionStatus {
        let connections = self.connections.read().await;
        ConnectionStatus {
            active_connections: connections.len(),
            connected_clients: connections.keys().cloned().collect(),
        }
    }

    pub async fn contains(&self, browser_id: &str) -> bool {
        self.connections.read().await.contains_key(browser_id)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Push one event to one connection. A failed push means the receiver
    /// is gone, so the entry is torn down. Returns whether delivery was
    /// attempted on a live connection.
    pub async fn send(&self, browser_id: &str, event: PushEvent) -> bool {
        let mut connections = self.connections.write().await;
        let Some(connection) = connections.get_mut(browser_id) else {
            return false;
        };

        if connection.push(event).is_ok() {
            connection.last_activity = Instant::now();
            true
        } else {
            if let Some(mut dead) = connections.remove(browser_id) {
                dead.close();
            }
            tracing::warn!(browser_id, "push failed, connection removed");
            false
        }
    }

    /// Best-effort fan-out. A push failure removes that entry but never
    /// aborts delivery to the rest.
    pub async fn broadcast(&self, event: PushEvent) {
        let mut connections = self.connections.write().await;
        let now = Instant::now();

        connections.retain(|browser_id, connection| {
            if connection.push(event.clone()).is_ok() {
                connection.last_activity = now;
                true
            } else {
                connection.close();
                tracing::warn!(browser_id, "push failed during broadcast, connection removed");
                false
            }
        });
    }

    /// Periodic liveness ping to every connection; failures evict.
    pub async fn heartbeat_sweep(&self) {
        let count = self.connection_count().await;
        if count == 0 {
            return;
        }
        tracing::debug!(connections = count, "sending heartbeat");
        self.broadcast(PushEvent::Heartbeat).await;
    }

    /// Evict every connection idle past `threshold`.
    pub async fn stale_sweep(&self, threshold: Duration) {
        let mut connections = self.connections.write().await;
        connections.retain(|browser_id, connection| {
            if connection.is_stale(threshold) {
                connection.close();
                tracing::info!(
                    browser_id,
                    uptime = ?connection.connected_at.elapsed(),
                    "removing stale connection"
                );
                false
            } else {
                true
            }
        });
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
