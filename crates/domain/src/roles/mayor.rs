//! Mayor: no night ability. The execution redirect (the Mayor dies to no
//! one at dusk) is resolved by the execution path itself.

use async_trait::async_trait;

use crate::ids::PlayerId;
use crate::role::{Role, RoleType, Team};

#[derive(Debug, Default)]
pub struct Mayor {
    owner: Option<PlayerId>,
}

impl Mayor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Role for Mayor {
    fn id(&self) -> &'static str {
        "Mayor"
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
