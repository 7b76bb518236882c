//! Presentation gateway contract and inbound action events
//!
//! The chat host implements [`PresentationGateway`]; the core calls it to
//! render records with their affordances and to deliver direct messages.
//! Everything platform-specific (embeds, buttons, channel lookup) lives on
//! the other side of this trait.

use crate::invoice::{Invoice, InvoiceAction};
use crate::notify::Notification;
use crate::record::{MessageRef, Surface};
use crate::repair::{RepairAction, RepairRequest};

/// A user-initiated action arriving from the platform, either a button press
/// or a command. Role ids are opaque; the service resolves them to ranks.
#[derive(Debug, Clone)]
pub struct ActionEvent {
    pub actor_id: String,
    pub actor_roles: Vec<String>,
    pub record_id: String,
    pub action: ActionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Accept,
    Reject,
    Progress,
    Complete,
    Pay,
    Dispute,
}

/// A record plus the affordance set for its current status, handed to the
/// gateway for rendering. The affordances are derived solely from status, so
/// rendering twice without an intervening transition is identical.
#[derive(Debug, Clone, Copy)]
pub enum RecordView<'a> {
    Repair {
        record: &'a RepairRequest,
        actions: &'a [RepairAction],
    },
    Invoice {
        record: &'a Invoice,
        actions: &'a [InvoiceAction],
    },
}

impl<'a> RecordView<'a> {
    pub fn repair(record: &'a RepairRequest) -> Self {
        RecordView::Repair {
            record,
            actions: record.status.offered_actions(),
        }
    }

    pub fn invoice(record: &'a Invoice) -> Self {
        RecordView::Invoice {
            record,
            actions: record.status.offered_actions(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("recipient {0} is unreachable")]
    Undeliverable(String),
    #[error("failed to render on {surface:?}: {reason}")]
    Render { surface: Surface, reason: String },
}

/// The host-side presentation surface. All methods are best-effort from the
/// core's point of view: a committed transition stands even when a render or
/// message fails afterwards.
pub trait PresentationGateway: Send + Sync {
    /// Render a record on a surface, returning where it landed.
    fn render(&self, surface: Surface, view: RecordView<'_>) -> Result<MessageRef, GatewayError>;

    /// Re-render a record in place.
    fn update(&self, at: &MessageRef, view: RecordView<'_>) -> Result<(), GatewayError>;

    /// Move a record's artifact to another surface, returning the new
    /// location. The old artifact is removed by the host.
    fn relocate(
        &self,
        from: &MessageRef,
        to: Surface,
        view: RecordView<'_>,
    ) -> Result<MessageRef, GatewayError>;

    /// Deliver a direct message to one recipient.
    fn direct_message(&self, recipient: &str, note: &Notification) -> Result<(), GatewayError>;

    /// Identities currently holding Owner rank, for dispute escalation.
    fn owner_ids(&self) -> Vec<String>;
}
