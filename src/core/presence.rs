use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Redis pub/sub channel the socket gateway publishes connection lifecycle
/// events on.
pub const PRESENCE_CHANNEL: &str = "school:notify:presence";

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresenceAction {
    Connect,
    Disconnect,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEvent {
    pub user_id: String,
    pub connection_id: String,
    pub action: PresenceAction,
}

/// Which users currently hold live realtime connections, and which ones.
/// Process-local: a user connected to another instance looks offline here.
#[derive(Default)]
pub struct PresenceRegistry {
    connections: RwLock<HashMap<String, HashSet<String>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn on_connect(&self, user_id: &str, connection_id: &str) {
        let mut map = self.connections.write().await;
        map.entry(user_id.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    /// A disconnect without a matching connect is treated as a no-op; the
    /// registry must survive gateway restarts mid-session.
    pub async fn on_disconnect(&self, user_id: &str, connection_id: &str) {
        let mut map = self.connections.write().await;
        if let Some(set) = map.get_mut(user_id) {
            set.remove(connection_id);
            if set.is_empty() {
                map.remove(user_id);
            }
        }
    }

    pub async fn is_online(&self, user_id: &str) -> bool {
        let map = self.connections.read().await;
        map.contains_key(user_id)
    }

    pub async fn connections_for(&self, user_id: &str) -> HashSet<String> {
        let map = self.connections.read().await;
        map.get(user_id).cloned().unwrap_or_default()
    }

    pub async fn apply(&self, event: PresenceEvent) {
        match event.action {
            PresenceAction::Connect => {
                self.on_connect(&event.user_id, &event.connection_id).await
            }
            PresenceAction::Disconnect => {
                self.on_disconnect(&event.user_id, &event.connection_id)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracks_multiple_connections_per_user() {
        let registry = PresenceRegistry::new();

        registry.on_connect("u1", "c1").await;
        registry.on_connect("u1", "c2").await;
        registry.on_disconnect("u1", "c1").await;

        assert!(registry.is_online("u1").await);
        let remaining = registry.connections_for("u1").await;
        assert_eq!(remaining, HashSet::from(["c2".to_string()]));

        registry.on_disconnect("u1", "c2").await;
        assert!(!registry.is_online("u1").await);
        assert!(registry.connections.read().await.get("u1").is_none());
    }

    #[tokio::test]
    async fn duplicate_connects_are_collapsed() {
        let registry = PresenceRegistry::new();

        registry.on_connect("u1", "c1").await;
        registry.on_connect("u1", "c1").await;
        registry.on_disconnect("u1", "c1").await;

        assert!(!registry.is_online("u1").await);
    }

    #[tokio::test]
    async fn stray_disconnect_is_a_no_op() {
        let registry = PresenceRegistry::new();

        registry.on_disconnect("ghost", "c1").await;
        assert!(!registry.is_online("ghost").await);

        registry.on_connect("u1", "c1").await;
        registry.on_disconnect("u1", "never-seen").await;
        assert!(registry.is_online("u1").await);
    }

    #[tokio::test]
    async fn apply_routes_by_action() {
        let registry = PresenceRegistry::new();

        registry
            .apply(PresenceEvent {
                user_id: "u1".to_string(),
                connection_id: "c1".to_string(),
                action: PresenceAction::Connect,
            })
            .await;
        assert!(registry.is_online("u1").await);

        registry
            .apply(PresenceEvent {
                user_id: "u1".to_string(),
                connection_id: "c1".to_string(),
                action: PresenceAction::Disconnect,
            })
            .await;
        assert!(!registry.is_online("u1").await);
    }
}
