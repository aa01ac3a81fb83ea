//! Concrete role variants for the Trouble Brewing script.

pub mod baron;
pub mod butler;
pub mod chef;
pub mod drunk;
pub mod empath;
pub mod fortune_teller;
pub mod imp;
pub mod investigator;
pub mod librarian;
pub mod mayor;
pub mod monk;
pub mod poisoner;
pub mod ravenkeeper;
pub mod recluse;
pub mod saint;
pub mod scarlet_woman;
pub mod slayer;
pub mod soldier;
pub mod spy;
pub mod undertaker;
pub mod virgin;
pub mod washerwoman;

use crate::script::RoleFactory;

/// Factory table consumed by [`crate::script::RoleRegistry::standard`].
pub fn builtin_factories() -> Vec<(&'static str, RoleFactory)> {
    vec![
        ("Washerwoman", || Box::new(washerwoman::Washerwoman::new())),
        ("Librarian", || Box::new(librarian::Librarian::new())),
        ("Investigator", || Box::new(investigator::Investigator::new())),
        ("Chef", || Box::new(chef::Chef::new())),
        ("Empath", || Box::new(empath::Empath::new())),
        ("Fortune Teller", || Box::new(fortune_teller::FortuneTeller::new())),
        ("Undertaker", || Box::new(undertaker::Undertaker::new())),
        ("Monk", || Box::new(monk::Monk::new())),
        ("Ravenkeeper", || Box::new(ravenkeeper::Ravenkeeper::new())),
        ("Virgin", || Box::new(virgin::Virgin::new())),
        ("Slayer", || Box::new(slayer::Slayer::new())),
        ("Soldier", || Box::new(soldier::Soldier::new())),
        ("Mayor", || Box::new(mayor::Mayor::new())),
        ("Butler", || Box::new(butler::Butler::new())),
        ("Drunk", || Box::new(drunk::Drunk::new())),
        ("Recluse", || Box::new(recluse::Recluse::new())),
        ("Saint", || Box::new(saint::Saint::new())),
        ("Poisoner", || Box::new(poisoner::Poisoner::new())),
        ("Spy", || Box::new(spy::Spy::new())),
        ("Scarlet Woman", || Box::new(scarlet_woman::ScarletWoman::new())),
        ("Baron", || Box::new(baron::Baron::new())),
        ("Imp", || Box::new(imp::Imp::new())),
    ]
}
