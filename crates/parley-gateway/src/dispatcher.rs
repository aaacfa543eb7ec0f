use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, mpsc};
use uuid::Uuid;

use parley_types::events::GatewayEvent;

/// Manages all connected clients. Presence events go out on a broadcast
/// channel; call signals go through per-user targeted channels only.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Broadcast channel for presence events
    broadcast_tx: broadcast::Sender<GatewayEvent>,

    /// Track online users: user_id -> username
    online_users: RwLock<HashMap<i64, String>>,

    /// Per-user targeted send channels: user_id -> (conn_id, sender)
    user_channels: RwLock<HashMap<i64, (Uuid, mpsc::UnboundedSender<GatewayEvent>)>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                online_users: RwLock::new(HashMap::new()),
                user_channels: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to broadcast events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients.
    pub fn broadcast(&self, event: GatewayEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }

    /// Register a per-user targeted channel. Returns (conn_id, receiver).
    /// A reconnect replaces the previous channel for the same user.
    pub async fn register_user_channel(
        &self,
        user_id: i64,
    ) -> (Uuid, mpsc::UnboundedReceiver<GatewayEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .user_channels
            .write()
            .await
            .insert(user_id, (conn_id, tx));
        (conn_id, rx)
    }

    /// Unregister a per-user targeted channel, but only if conn_id matches.
    pub async fn unregister_user_channel(&self, user_id: i64, conn_id: Uuid) {
        let mut channels = self.inner.user_channels.write().await;
        if let Some((stored_conn_id, _)) = channels.get(&user_id) {
            if *stored_conn_id == conn_id {
                channels.remove(&user_id);
            }
        }
    }

    /// Send a targeted event to a specific user. Unknown or offline
    /// targets are dropped silently; call signaling is fire-and-forget.
    pub async fn send_to_user(&self, user_id: i64, event: GatewayEvent) {
        let channels = self.inner.user_channels.read().await;
        if let Some((_, tx)) = channels.get(&user_id) {
            let _ = tx.send(event);
        }
    }

    /// Register a user as online.
    pub async fn user_online(&self, user_id: i64, username: String) {
        self.inner
            .online_users
            .write()
            .await
            .insert(user_id, username.clone());

        self.broadcast(GatewayEvent::PresenceUpdate {
            user_id,
            username,
            online: true,
        });
    }

    /// Register a user as offline. Only cleans up if conn_id matches.
    pub async fn user_offline(&self, user_id: i64, conn_id: Uuid) {
        // Only clean up if this connection still owns the user channel
        let is_current = {
            let channels = self.inner.user_channels.read().await;
            channels
                .get(&user_id)
                .is_some_and(|(cid, _)| *cid == conn_id)
        };

        if !is_current {
            // A newer connection has taken over
            return;
        }

        let username = self
            .inner
            .online_users
            .write()
            .await
            .remove(&user_id)
            .unwrap_or_default();

        self.unregister_user_channel(user_id, conn_id).await;

        self.broadcast(GatewayEvent::PresenceUpdate {
            user_id,
            username,
            online: false,
        });
    }

    /// Get list of online users.
    pub async fn online_users(&self) -> Vec<(i64, String)> {
        self.inner
            .online_users
            .read()
            .await
            .iter()
            .map(|(id, name)| (*id, name.clone()))
            .collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use parley_types::events::CallSignalPayload;

    use super::*;

    #[tokio::test]
    async fn targeted_send_reaches_registered_user_only() {
        let dispatcher = Dispatcher::new();
        let (_conn, mut rx) = dispatcher.register_user_channel(7).await;

        dispatcher
            .send_to_user(
                7,
                GatewayEvent::CallSignal {
                    from_user_id: 3,
                    signal: CallSignalPayload::Offer { sdp: "v=0".into() },
                },
            )
            .await;
        // Unknown target: dropped, no error.
        dispatcher
            .send_to_user(
                99,
                GatewayEvent::CallSignal {
                    from_user_id: 3,
                    signal: CallSignalPayload::Answer { sdp: "v=0".into() },
                },
            )
            .await;

        match rx.recv().await.unwrap() {
            GatewayEvent::CallSignal { from_user_id, .. } => assert_eq!(from_user_id, 3),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_disconnect_does_not_evict_newer_connection() {
        let dispatcher = Dispatcher::new();
        let (old_conn, _old_rx) = dispatcher.register_user_channel(7).await;
        dispatcher.user_online(7, "sam".into()).await;

        // Reconnect replaces the channel.
        let (_new_conn, mut new_rx) = dispatcher.register_user_channel(7).await;

        // The old connection's teardown must not take the user offline.
        dispatcher.user_offline(7, old_conn).await;
        assert_eq!(dispatcher.online_users().await.len(), 1);

        dispatcher
            .send_to_user(
                7,
                GatewayEvent::Ready {
                    user_id: 7,
                    username: "sam".into(),
                },
            )
            .await;
        assert!(new_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn offline_broadcasts_presence_update() {
        let dispatcher = Dispatcher::new();
        let (conn, _rx) = dispatcher.register_user_channel(5).await;
        dispatcher.user_online(5, "kim".into()).await;

        let mut events = dispatcher.subscribe();
        dispatcher.user_offline(5, conn).await;

        match events.recv().await.unwrap() {
            GatewayEvent::PresenceUpdate {
                user_id, online, ..
            } => {
                assert_eq!(user_id, 5);
                assert!(!online);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(dispatcher.online_users().await.is_empty());
    }
}
