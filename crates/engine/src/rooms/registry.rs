//! Process-wide room registry.
//!
//! Rooms are created by explicit command and removed by explicit teardown;
//! there is no expiry. Different rooms are fully independent, so the map
//! itself is the only shared mutable state between them.

use std::sync::Arc;

use dashmap::DashMap;

use grimoire_domain::{script, GameError, RoleRegistry, RoomId};
use grimoire_shared::requests::Identity;
use grimoire_shared::views::{RoomInfo, RoomStatus};

use crate::rooms::room::GameRoom;

#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Arc<GameRoom>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn create(
        &self,
        name: String,
        script_name: Option<&str>,
        seat_count: usize,
        creator: Identity,
        roles: Arc<RoleRegistry>,
    ) -> Result<(RoomId, Arc<GameRoom>), GameError> {
        let script = script::script_for(script_name.unwrap_or("Trouble Brewing"))?;
        let gid = RoomId::new();
        let info = RoomInfo {
            gid,
            name,
            script_name: script.name.clone(),
            storyteller_id: creator.id,
            storyteller_name: creator.name,
            status: RoomStatus::Open,
        };
        let room = Arc::new(GameRoom::new(info, script, roles, seat_count));
        self.rooms.insert(gid, room.clone());
        tracing::info!(gid = %gid, "room created");
        Ok((gid, room))
    }

    pub fn get(&self, gid: RoomId) -> Result<Arc<GameRoom>, GameError> {
        self.rooms
            .get(&gid)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GameError::not_found("room", gid.to_string()))
    }

    /// Remove the room and tear it down: outstanding prompts cancel
    /// exactly once, peers detach, and later operations fail not-found.
    pub async fn teardown(&self, gid: RoomId) -> Result<(), GameError> {
        let (_, room) = self
            .rooms
            .remove(&gid)
            .ok_or_else(|| GameError::not_found("room", gid.to_string()))?;
        room.shutdown().await;
        tracing::info!(gid = %gid, "room torn down");
        Ok(())
    }

    pub async fn lobby(&self) -> Vec<RoomInfo> {
        let mut infos = Vec::with_capacity(self.rooms.len());
        let rooms: Vec<Arc<GameRoom>> =
            self.rooms.iter().map(|e| e.value().clone()).collect();
        for room in rooms {
            infos.push(room.info().await);
        }
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grimoire_domain::PlayerId;

    fn storyteller() -> Identity {
        Identity {
            id: PlayerId::new(),
            name: "Otto".to_string(),
        }
    }

    #[tokio::test]
    async fn create_get_teardown_lifecycle() {
        let registry = RoomRegistry::new();
        let roles = Arc::new(RoleRegistry::standard());

        let (gid, _) = registry
            .create("Table".into(), None, 8, storyteller(), roles)
            .expect("create");
        assert!(registry.get(gid).is_ok());
        assert_eq!(registry.lobby().await.len(), 1);

        registry.teardown(gid).await.expect("teardown");
        assert!(matches!(
            registry.get(gid),
            Err(GameError::NotFound { .. })
        ));
        assert!(matches!(
            registry.teardown(gid).await,
            Err(GameError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_script_fails_room_creation() {
        let registry = RoomRegistry::new();
        let roles = Arc::new(RoleRegistry::standard());
        let err = registry
            .create("Table".into(), Some("Ravenswood"), 8, storyteller(), roles)
            .expect_err("unknown script");
        assert!(matches!(err, GameError::NotFound { .. }));
    }
}
