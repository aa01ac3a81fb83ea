//! Shared helpers for in-crate tests.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game::{Game, Player};
use crate::ids::PlayerId;
use crate::script::{trouble_brewing, RoleRegistry};

/// Build a seated game with the given roles dealt in seat order. The rng
/// is seed-fixed so random effects are reproducible.
pub(crate) fn game_with_roles(role_ids: &[&str]) -> (Game, Vec<PlayerId>) {
    let registry = Arc::new(RoleRegistry::standard());
    let players: Vec<Player> = (0..role_ids.len())
        .map(|i| Player::new(PlayerId::new(), format!("P{}", i + 1), Some(i + 1)))
        .collect();
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();

    let mut game = Game::new(
        players,
        trouble_brewing(),
        registry.clone(),
        StdRng::seed_from_u64(7),
    );
    for (pid, role_id) in ids.iter().zip(role_ids) {
        let role = registry.build(role_id).expect("built-in role");
        game.assign_role(*pid, role).expect("seated player");
    }
    (game, ids)
}
