//! Drunk: thinks they are a townsfolk; treated as permanently poisoned-like
//! by every information check.

use async_trait::async_trait;

use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Drunk {
    owner: Option<PlayerId>,
}

impl Drunk {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Drunk {
    fn id(&self) -> &'static str {
        "Drunk"
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
