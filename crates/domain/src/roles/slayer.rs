//! Slayer: a once-per-game public day action. Firing it at the demon kills
//! the demon; anything else is a miss. The shot itself is resolved by
//! [`crate::game::Game::slayer_shot`].

use async_trait::async_trait;

use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Slayer {
    owner: Option<PlayerId>,
    used: bool,
}

impl Slayer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Slayer {
    fn id(&self) -> &'static str {
        "Slayer"
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

    fn consume_day_ability(&mut self) -> bool {
        if self.used {
            return false;
        }
        self.used = true;
        true
    }
}
