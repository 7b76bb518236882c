//! Invoice record and its state machine

use chrono::Utc;

use crate::error::LifecycleError;
use crate::record::{MessageRef, TimeStamp};
use crate::utils;

/// A payer-initiated transition on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceAction {
    Pay,
    Dispute,
}

impl InvoiceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceAction::Pay => "pay",
            InvoiceAction::Dispute => "dispute",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum InvoiceStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Paid,
    #[n(2)]
    Disputed,
}

impl InvoiceStatus {
    /// Paid and Disputed are both terminal. A disputed invoice is resolved
    /// manually, out of band; no further transition is defined on it.
    pub fn is_terminal(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Disputed)
    }

    /// Affordances rendered with an invoice in this status. Terminal
    /// statuses render read-only.
    pub fn offered_actions(self) -> &'static [InvoiceAction] {
        match self {
            InvoiceStatus::Pending => &[InvoiceAction::Pay, InvoiceAction::Dispute],
            InvoiceStatus::Paid | InvoiceStatus::Disputed => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Disputed => "disputed",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An invoice issued by a mechanic to a client. Amount is integer currency
/// units, fixed at issuance and never recomputed.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct Invoice {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub issuer_id: String,
    #[n(2)]
    pub payer_id: String,
    #[n(3)]
    pub vehicle: String,
    #[n(4)]
    pub description: String,
    #[n(5)]
    pub amount: u64,
    #[n(6)]
    pub status: InvoiceStatus,
    #[n(7)]
    pub created_at: TimeStamp<Utc>,
    #[n(8)]
    pub paid_at: Option<TimeStamp<Utc>>,
    #[n(9)]
    pub disputed_at: Option<TimeStamp<Utc>>,
    #[n(10)]
    pub resolved_by: Option<String>,
    #[n(11)]
    pub message_ref: Option<MessageRef>,
}

impl Invoice {
    /// New pending invoice with a freshly generated id. Rejects a zero
    /// amount; amounts are unsigned so nothing below zero is expressible.
    pub fn new(
        issuer_id: String,
        payer_id: String,
        vehicle: String,
        description: String,
        amount: u64,
    ) -> Result<Self, LifecycleError> {
        if amount == 0 {
            return Err(LifecycleError::InvalidAmount);
        }

        Ok(Self {
            id: utils::new_invoice_id()?,
            issuer_id,
            payer_id,
            vehicle,
            description,
            amount,
            status: InvoiceStatus::Pending,
            created_at: TimeStamp::now(),
            paid_at: None,
            disputed_at: None,
            resolved_by: None,
            message_ref: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_is_rejected() {
        let result = Invoice::new(
            "mech1".into(),
            "client1".into(),
            "Banshee".into(),
            "turbo swap".into(),
            0,
        );

        assert!(matches!(result, Err(LifecycleError::InvalidAmount)));
    }

    #[test]
    fn new_invoice_is_pending() {
        let invoice = Invoice::new(
            "mech1".into(),
            "client1".into(),
            "Banshee".into(),
            "turbo swap".into(),
            8_500,
        )
        .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.amount, 8_500);
        assert!(invoice.paid_at.is_none());
        assert!(invoice.resolved_by.is_none());
        assert!(invoice.id.starts_with("inv1"));
    }

    #[test]
    fn invoice_encoding() {
        let original = Invoice::new(
            "mech1".into(),
            "client1".into(),
            "Comet".into(),
            "brake overhaul".into(),
            1_200,
        )
        .unwrap();

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: Invoice = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }
}
