//! Baron: no ability after setup; his presence shifts the outsider count.

use async_trait::async_trait;

use crate::game::Game;
use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Baron {
    owner: Option<PlayerId>,
}

impl Baron {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Baron {
    fn id(&self) -> &'static str {
        "Baron"
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

    fn on_setup(&mut self, game: &mut Game) {
        game.log
            .push("Baron in play (setup note: +2 Outsiders)".to_string());
    }
}
