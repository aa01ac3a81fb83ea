//! Virgin: no night action. The nomination trigger (a healthy Townsfolk
//! nominating a healthy Virgin executes the Virgin on the spot) is resolved
//! where nominations open.

use async_trait::async_trait;

use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Virgin {
    owner: Option<PlayerId>,
}

impl Virgin {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Virgin {
    fn id(&self) -> &'static str {
        "Virgin"
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
