//! Authorization rules for repair handling and staff management
//!
//! Pure functions over [`RankSet`]s; no I/O. The lifecycle service consults
//! `can_handle` before committing a repair transition. The staff-management
//! rules are consumed by the external roster collaborator.

use crate::rank::{RankSet, StaffRank};
use crate::repair::ComplexityTier;

/// The lowest rank that qualifies for work of the given complexity.
pub fn minimum_rank(tier: ComplexityTier) -> StaffRank {
    match tier {
        ComplexityTier::Simple => StaffRank::Trainee,
        ComplexityTier::Medium => StaffRank::JuniorMechanic,
        ComplexityTier::Complex => StaffRank::Mechanic,
        ComplexityTier::VeryComplex => StaffRank::SeniorMechanic,
    }
}

/// Head mechanics and the owner bypass the complexity gate entirely.
pub fn is_privileged(ranks: &RankSet) -> bool {
    ranks.contains(StaffRank::HeadMechanic) || ranks.contains(StaffRank::Owner)
}

/// Whether an actor with `ranks` may handle a repair of the given tier.
/// Monotonic in rank: qualifying for a tier qualifies for every lower one.
pub fn can_handle(ranks: &RankSet, tier: ComplexityTier) -> bool {
    if is_privileged(ranks) {
        return true;
    }

    ranks
        .highest()
        .is_some_and(|rank| rank >= minimum_rank(tier))
}

/// Whether an actor may appoint (hire or promote) someone to `target`.
/// Only the owner may appoint a head mechanic; every other rank can be
/// appointed by the owner or a head mechanic.
pub fn can_appoint(actor: &RankSet, target: StaffRank) -> bool {
    if actor.contains(StaffRank::Owner) {
        return true;
    }

    target < StaffRank::HeadMechanic && actor.contains(StaffRank::HeadMechanic)
}

/// Whether an actor may demote or dismiss someone currently holding
/// `target`. The owner is unconstrained; otherwise the target's rank must
/// sit strictly below the actor's authority.
pub fn can_dismiss(actor: &RankSet, target: StaffRank) -> bool {
    if actor.contains(StaffRank::Owner) {
        return true;
    }

    actor
        .highest()
        .is_some_and(|rank| rank >= StaffRank::HeadMechanic && target < rank)
}
