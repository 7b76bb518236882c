//! Repair request record and its state machine

use chrono::Utc;

use crate::error::IdError;
use crate::record::{MessageRef, TimeStamp};
use crate::utils;

/// Declared difficulty of a repair, fixed at creation. Gates which ranks may
/// handle the request (see the policy module).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    minicbor::Encode,
    minicbor::Decode,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    #[n(0)]
    Simple,
    #[n(1)]
    #[default]
    Medium,
    #[n(2)]
    Complex,
    #[n(3)]
    VeryComplex,
}

impl ComplexityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplexityTier::Simple => "simple",
            ComplexityTier::Medium => "medium",
            ComplexityTier::Complex => "complex",
            ComplexityTier::VeryComplex => "very complex",
        }
    }
}

/// A staff-initiated transition on a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairAction {
    Accept,
    Reject,
    Progress,
    Complete,
}

impl RepairAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RepairAction::Accept => "accept",
            RepairAction::Reject => "reject",
            RepairAction::Progress => "progress",
            RepairAction::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum RepairStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Accepted,
    #[n(2)]
    Rejected,
    #[n(3)]
    InProgress,
    #[n(4)]
    Completed,
}

impl RepairStatus {
    /// The successor status for `action`, or `None` when the edge does not
    /// exist. The edge set is exhaustive: Pending may be accepted, rejected
    /// or taken straight into progress; only an active request completes.
    pub fn apply(self, action: RepairAction) -> Option<RepairStatus> {
        match (self, action) {
            (RepairStatus::Pending, RepairAction::Accept) => Some(RepairStatus::Accepted),
            (RepairStatus::Pending, RepairAction::Reject) => Some(RepairStatus::Rejected),
            (RepairStatus::Pending, RepairAction::Progress) => Some(RepairStatus::InProgress),
            (RepairStatus::Accepted, RepairAction::Complete)
            | (RepairStatus::InProgress, RepairAction::Complete) => Some(RepairStatus::Completed),
            _ => None,
        }
    }

    /// Rejected and Completed accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, RepairStatus::Rejected | RepairStatus::Completed)
    }

    /// The affordance set rendered with a request in this status. Derived
    /// from status alone, so re-rendering without a transition is
    /// idempotent. The intake render deliberately offers the whole set; the
    /// state machine remains the gate for which presses actually commit.
    pub fn offered_actions(self) -> &'static [RepairAction] {
        match self {
            RepairStatus::Pending => &[
                RepairAction::Accept,
                RepairAction::Reject,
                RepairAction::Progress,
                RepairAction::Complete,
            ],
            RepairStatus::Accepted | RepairStatus::InProgress => &[RepairAction::Complete],
            RepairStatus::Rejected | RepairStatus::Completed => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepairStatus::Pending => "pending",
            RepairStatus::Accepted => "accepted",
            RepairStatus::Rejected => "rejected",
            RepairStatus::InProgress => "in progress",
            RepairStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client's repair request. Created once, mutated only by the lifecycle
/// service, never deleted; the stored set is the garage's audit trail.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct RepairRequest {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub requester_id: String,
    #[n(2)]
    pub vehicle: String,
    #[n(3)]
    pub problem: String,
    #[n(4)]
    pub tier: ComplexityTier,
    #[n(5)]
    pub status: RepairStatus,
    #[n(6)]
    pub assigned_to: Option<String>,
    #[n(7)]
    pub created_at: TimeStamp<Utc>,
    #[n(8)]
    pub last_updated_at: TimeStamp<Utc>,
    #[n(9)]
    pub message_ref: Option<MessageRef>,
}

impl RepairRequest {
    /// New pending request with a freshly generated id. Any client may file
    /// one; there is no authorization gate on creation.
    pub fn new(
        requester_id: String,
        vehicle: String,
        problem: String,
        tier: Option<ComplexityTier>,
    ) -> Result<Self, IdError> {
        let created_at = TimeStamp::now();

        Ok(Self {
            id: utils::new_repair_id()?,
            requester_id,
            vehicle,
            problem,
            tier: tier.unwrap_or_default(),
            status: RepairStatus::Pending,
            assigned_to: None,
            created_at: created_at.clone(),
            last_updated_at: created_at,
            message_ref: None,
        })
    }
}
