//! Scarlet Woman: no night action. The promotion to the demon role when
//! the demon dies with five or more players alive is resolved by the death
//! path, not here.

use async_trait::async_trait;

use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct ScarletWoman {
    owner: Option<PlayerId>,
}

impl ScarletWoman {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for ScarletWoman {
    fn id(&self) -> &'static str {
        "Scarlet Woman"
    }

    fn team(&self) -> Team {
        Team::Evil
    }

    fn role_type(&self) -> RoleType {
        RoleType::Minion
    }

    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
    }
}
