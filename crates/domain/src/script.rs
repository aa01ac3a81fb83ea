//! Ruleset data and the role registry.
//!
//! A [`Script`] fully describes a game variant: night orders, the legal
//! role pool, role grouping and the headcount composition table. Scripts
//! are read-only once constructed. The [`RoleRegistry`] maps stable role
//! ids to factories and is append-only after startup.

use std::collections::HashMap;

use crate::error::GameError;
use crate::role::{Role, RoleType};
use crate::roles;

/// Per-group role counts for one supported headcount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCounts {
    pub townsfolk: usize,
    pub outsiders: usize,
    pub minions: usize,
    pub demons: usize,
}

impl GroupCounts {
    pub fn total(&self) -> usize {
        self.townsfolk + self.outsiders + self.minions + self.demons
    }

    pub fn for_group(&self, group: RoleType) -> usize {
        match group {
            RoleType::Townsfolk => self.townsfolk,
            RoleType::Outsider => self.outsiders,
            RoleType::Minion => self.minions,
            RoleType::Demon => self.demons,
        }
    }
}

/// Immutable ruleset data for one game variant.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    /// Role ids in first-night acting order.
    pub first_night: Vec<&'static str>,
    /// Role ids in acting order for every later night.
    pub other_nights: Vec<&'static str>,
    /// The legal role pool for the bag.
    pub roles: Vec<&'static str>,
    pub role_groups: HashMap<RoleType, Vec<&'static str>>,
    pub role_counts: HashMap<usize, GroupCounts>,
}

impl Script {
    pub fn night_order(&self, night: u32) -> &[&'static str] {
        if night == 1 {
            &self.first_night
        } else {
            &self.other_nights
        }
    }

    pub fn group(&self, group: RoleType) -> &[&'static str] {
        self.role_groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn counts_for(&self, player_count: usize) -> Option<&GroupCounts> {
        self.role_counts.get(&player_count)
    }
}

/// Resolve a built-in script by name.
pub fn script_for(name: &str) -> Result<Script, GameError> {
    match name {
        "trouble_brewing" | "Trouble Brewing" => Ok(trouble_brewing()),
        other => Err(GameError::not_found("script", other)),
    }
}

/// The standard introductory script.
pub fn trouble_brewing() -> Script {
    let townsfolk = vec![
        "Washerwoman",
        "Librarian",
        "Investigator",
        "Chef",
        "Empath",
        "Fortune Teller",
        "Undertaker",
        "Monk",
        "Ravenkeeper",
        "Virgin",
        "Slayer",
        "Soldier",
        "Mayor",
    ];
    let outsiders = vec!["Butler", "Drunk", "Recluse", "Saint"];
    let minions = vec!["Poisoner", "Spy", "Scarlet Woman", "Baron"];
    let demons = vec!["Imp"];

    let mut role_groups = HashMap::new();
    role_groups.insert(RoleType::Townsfolk, townsfolk.clone());
    role_groups.insert(RoleType::Outsider, outsiders.clone());
    role_groups.insert(RoleType::Minion, minions.clone());
    role_groups.insert(RoleType::Demon, demons.clone());

    let mut roles: Vec<&'static str> = Vec::new();
    roles.extend(&townsfolk);
    roles.extend(&outsiders);
    roles.extend(&minions);
    roles.extend(&demons);

    let counts = [
        (5, GroupCounts { townsfolk: 3, outsiders: 0, minions: 1, demons: 1 }),
        (6, GroupCounts { townsfolk: 3, outsiders: 1, minions: 1, demons: 1 }),
        (7, GroupCounts { townsfolk: 5, outsiders: 0, minions: 1, demons: 1 }),
        (8, GroupCounts { townsfolk: 5, outsiders: 1, minions: 1, demons: 1 }),
        (9, GroupCounts { townsfolk: 5, outsiders: 2, minions: 1, demons: 1 }),
        (10, GroupCounts { townsfolk: 7, outsiders: 0, minions: 2, demons: 1 }),
        (11, GroupCounts { townsfolk: 7, outsiders: 1, minions: 2, demons: 1 }),
        (12, GroupCounts { townsfolk: 7, outsiders: 2, minions: 2, demons: 1 }),
        (13, GroupCounts { townsfolk: 9, outsiders: 0, minions: 3, demons: 1 }),
        (14, GroupCounts { townsfolk: 9, outsiders: 1, minions: 3, demons: 1 }),
        (15, GroupCounts { townsfolk: 9, outsiders: 2, minions: 3, demons: 1 }),
    ];

    Script {
        name: "Trouble Brewing".to_string(),
        first_night: vec![
            "Poisoner",
            "Spy",
            "Washerwoman",
            "Librarian",
            "Investigator",
            "Chef",
            "Empath",
            "Fortune Teller",
            "Butler",
        ],
        other_nights: vec![
            "Poisoner",
            "Monk",
            "Spy",
            "Scarlet Woman",
            "Imp",
            "Ravenkeeper",
            "Undertaker",
            "Empath",
            "Fortune Teller",
            "Butler",
        ],
        roles,
        role_groups,
        role_counts: counts.into_iter().collect(),
    }
}

pub type RoleFactory = fn() -> Box<dyn Role>;

/// Process-wide role factory table. Registration happens before deck
/// building; the registry is append-only after startup.
#[derive(Debug, Default)]
pub struct RoleRegistry {
    factories: HashMap<&'static str, RoleFactory>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in role.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (id, factory) in roles::builtin_factories() {
            // Built-in ids are distinct; a clash here is a programming error
            // surfaced by the registry tests.
            let _ = registry.register(id, factory);
        }
        registry
    }

    pub fn register(&mut self, id: &'static str, factory: RoleFactory) -> Result<(), GameError> {
        if self.factories.contains_key(id) {
            return Err(GameError::invalid_operation(format!(
                "role already registered: {id}"
            )));
        }
        self.factories.insert(id, factory);
        Ok(())
    }

    pub fn factory(&self, id: &str) -> Result<RoleFactory, GameError> {
        self.factories
            .get(id)
            .copied()
            .ok_or_else(|| GameError::UnknownRole(id.to_string()))
    }

    /// Construct a fresh, unowned role instance.
    pub fn build(&self, id: &str) -> Result<Box<dyn Role>, GameError> {
        Ok(self.factory(id)?())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trouble_brewing_groups_cover_the_pool() {
        let script = trouble_brewing();
        let grouped: usize = [
            RoleType::Townsfolk,
            RoleType::Outsider,
            RoleType::Minion,
            RoleType::Demon,
        ]
        .iter()
        .map(|g| script.group(*g).len())
        .sum();
        assert_eq!(grouped, script.roles.len());
    }

    #[test]
    fn headcount_table_totals_match_player_count() {
        let script = trouble_brewing();
        for (count, groups) in &script.role_counts {
            assert_eq!(groups.total(), *count, "headcount {count}");
        }
    }

    #[test]
    fn standard_registry_covers_the_script_pool() {
        let registry = RoleRegistry::standard();
        let script = trouble_brewing();
        for id in &script.roles {
            assert!(registry.contains(id), "missing factory for {id}");
        }
    }

    #[test]
    fn unknown_role_lookup_fails() {
        let registry = RoleRegistry::standard();
        assert!(matches!(
            registry.factory("Harpy"),
            Err(GameError::UnknownRole(_))
        ));
    }

    #[test]
    fn double_registration_is_rejected() {
        let mut registry = RoleRegistry::standard();
        let err = registry.register("Imp", || Box::new(crate::roles::imp::Imp::new()));
        assert!(matches!(err, Err(GameError::InvalidOperation(_))));
    }

    #[test]
    fn unknown_script_name_is_not_found() {
        assert!(matches!(
            script_for("ravenswood_bluff"),
            Err(GameError::NotFound { .. })
        ));
    }
}
