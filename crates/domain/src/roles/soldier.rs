//! Soldier: immune to the demon's attack. The immunity is checked where
//! the attack resolves.

use async_trait::async_trait;

use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Soldier {
    owner: Option<PlayerId>,
}

impl Soldier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Soldier {
    fn id(&self) -> &'static str {
        "Soldier"
    }

    fn team(&self) -> Team {
        Team::Good
    }

    fn role_type(&self) -> RoleType {
        RoleType::Townsfolk
    }

    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
    }
}
