//! Recluse: a good outsider with no active ability.

use async_trait::async_trait;

use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Recluse {
    owner: Option<PlayerId>,
}

impl Recluse {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Recluse {
    fn id(&self) -> &'static str {
        "Recluse"
    }

    fn team(&self) -> Team {
        Team::Good
    }

    fn role_type(&self) -> RoleType {
        RoleType::Outsider
    }

    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
    }
}
