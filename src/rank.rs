//! Staff rank hierarchy and external role resolution
//!
//! Ranks are a typed, ordered enum. External platforms identify staff by
//! opaque role ids; a [`RoleMap`] is built once from configuration and turns
//! a member's role-id list into a [`RankSet`]. Rank is never inferred from a
//! display name at decision time.

use std::collections::{BTreeSet, HashMap};

/// Position in the staff hierarchy. The derived `Ord` is the authority
/// ordering used by the policy module.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StaffRank {
    Trainee,
    JuniorMechanic,
    Mechanic,
    SeniorMechanic,
    HeadMechanic,
    Owner,
}

impl StaffRank {
    pub const ALL: [StaffRank; 6] = [
        StaffRank::Trainee,
        StaffRank::JuniorMechanic,
        StaffRank::Mechanic,
        StaffRank::SeniorMechanic,
        StaffRank::HeadMechanic,
        StaffRank::Owner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StaffRank::Trainee => "trainee",
            StaffRank::JuniorMechanic => "junior mechanic",
            StaffRank::Mechanic => "mechanic",
            StaffRank::SeniorMechanic => "senior mechanic",
            StaffRank::HeadMechanic => "head mechanic",
            StaffRank::Owner => "owner",
        }
    }
}

impl std::fmt::Display for StaffRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of ranks an actor holds. Empty for non-staff.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RankSet(BTreeSet<StaffRank>);

impl RankSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rank: StaffRank) {
        self.0.insert(rank);
    }

    pub fn contains(&self, rank: StaffRank) -> bool {
        self.0.contains(&rank)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The actor's highest-authority rank, if any.
    pub fn highest(&self) -> Option<StaffRank> {
        self.0.iter().next_back().copied()
    }
}

impl FromIterator<StaffRank> for RankSet {
    fn from_iter<I: IntoIterator<Item = StaffRank>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Mapping from external role identifiers to ranks, resolved once at
/// construction and consulted on every action event.
#[derive(Debug, Default, Clone)]
pub struct RoleMap {
    ranks: HashMap<String, StaffRank>,
}

impl RoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role_id: impl Into<String>, rank: StaffRank) -> Self {
        self.ranks.insert(role_id.into(), rank);
        self
    }

    /// Turn a member's role-id list into the ranks it grants. Unknown role
    /// ids are ignored; they belong to the rest of the community.
    pub fn resolve(&self, role_ids: &[String]) -> RankSet {
        role_ids
            .iter()
            .filter_map(|id| self.ranks.get(id).copied())
            .collect()
    }
}

impl FromIterator<(String, StaffRank)> for RoleMap {
    fn from_iter<I: IntoIterator<Item = (String, StaffRank)>>(iter: I) -> Self {
        Self {
            ranks: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_ordering_follows_hierarchy() {
        for pair in StaffRank::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn resolve_ignores_unknown_roles() {
        let map = RoleMap::new()
            .with_role("role-mech", StaffRank::Mechanic)
            .with_role("role-owner", StaffRank::Owner);

        let ranks = map.resolve(&["role-vip".into(), "role-mech".into()]);

        assert!(ranks.contains(StaffRank::Mechanic));
        assert!(!ranks.contains(StaffRank::Owner));
        assert_eq!(ranks.highest(), Some(StaffRank::Mechanic));
    }

    #[test]
    fn highest_picks_the_top_rank() {
        let ranks: RankSet = [StaffRank::Trainee, StaffRank::SeniorMechanic]
            .into_iter()
            .collect();

        assert_eq!(ranks.highest(), Some(StaffRank::SeniorMechanic));
    }
}
