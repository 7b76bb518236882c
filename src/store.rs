//! Durable keyed storage for repair requests and invoices
//!
//! Two sled trees, one per record kind, values minicbor-encoded and keyed by
//! record id. Every mutation is a per-key compare-and-swap: read the current
//! bytes, re-validate the requested change against the decoded record, and
//! swap. When two transitions race on the same id exactly one swap lands;
//! the loser re-reads the committed record and re-validates, so a transition
//! that is no longer legal surfaces as `InvalidTransition` instead of
//! silently overwriting. Records are never deleted.

use std::sync::Arc;

use sled::Tree;

use crate::error::{LifecycleError, StoreError};
use crate::invoice::Invoice;
use crate::repair::RepairRequest;

pub struct RecordStore {
    repairs: Tree,
    invoices: Tree,
}

impl RecordStore {
    pub fn open(db: &Arc<sled::Db>) -> Result<Self, StoreError> {
        Ok(Self {
            repairs: db.open_tree("repairs")?,
            invoices: db.open_tree("invoices")?,
        })
    }

    pub fn insert_repair(&self, repair: &RepairRequest) -> Result<(), StoreError> {
        insert_record(&self.repairs, &repair.id, repair)
    }

    pub fn repair(&self, id: &str) -> Result<Option<RepairRequest>, StoreError> {
        load_record(&self.repairs, id)
    }

    /// Apply `mutate` to the stored repair under a compare-and-swap loop.
    /// The closure runs against the freshest copy on every attempt and may
    /// veto the change by returning an error.
    pub fn update_repair<F>(&self, id: &str, mutate: F) -> Result<RepairRequest, LifecycleError>
    where
        F: FnMut(RepairRequest) -> Result<RepairRequest, LifecycleError>,
    {
        update_record(&self.repairs, id, mutate)
    }

    pub fn repairs(&self) -> Result<Vec<RepairRequest>, StoreError> {
        scan_records(&self.repairs)
    }

    pub fn insert_invoice(&self, invoice: &Invoice) -> Result<(), StoreError> {
        insert_record(&self.invoices, &invoice.id, invoice)
    }

    pub fn invoice(&self, id: &str) -> Result<Option<Invoice>, StoreError> {
        load_record(&self.invoices, id)
    }

    pub fn update_invoice<F>(&self, id: &str, mutate: F) -> Result<Invoice, LifecycleError>
    where
        F: FnMut(Invoice) -> Result<Invoice, LifecycleError>,
    {
        update_record(&self.invoices, id, mutate)
    }

    pub fn invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        scan_records(&self.invoices)
    }
}

fn encode_record<T: minicbor::Encode<()>>(record: &T) -> Result<Vec<u8>, StoreError> {
    minicbor::to_vec(record).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode_record<T>(id: &str, bytes: &[u8]) -> Result<T, StoreError>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    minicbor::decode(bytes).map_err(|e| StoreError::Corrupt {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

// Insert swaps against absence, so a duplicate id can never clobber an
// existing record.
fn insert_record<T: minicbor::Encode<()>>(
    tree: &Tree,
    id: &str,
    record: &T,
) -> Result<(), StoreError> {
    let bytes = encode_record(record)?;

    match tree.compare_and_swap(id.as_bytes(), None::<&[u8]>, Some(bytes))? {
        Ok(()) => {
            tree.flush()?;
            Ok(())
        }
        Err(_) => Err(StoreError::DuplicateId { id: id.to_string() }),
    }
}

fn load_record<T>(tree: &Tree, id: &str) -> Result<Option<T>, StoreError>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    match tree.get(id.as_bytes())? {
        Some(bytes) => Ok(Some(decode_record(id, &bytes)?)),
        None => Ok(None),
    }
}

fn update_record<T, F>(tree: &Tree, id: &str, mut mutate: F) -> Result<T, LifecycleError>
where
    T: minicbor::Encode<()> + for<'b> minicbor::Decode<'b, ()>,
    F: FnMut(T) -> Result<T, LifecycleError>,
{
    loop {
        let current = tree
            .get(id.as_bytes())
            .map_err(StoreError::from)?
            .ok_or_else(|| LifecycleError::NotFound(id.to_string()))?;

        let record: T = decode_record(id, &current)?;
        let updated = mutate(record)?;
        let bytes = encode_record(&updated)?;

        match tree
            .compare_and_swap(id.as_bytes(), Some(&current), Some(bytes))
            .map_err(StoreError::from)?
        {
            Ok(()) => {
                tree.flush().map_err(StoreError::from)?;
                return Ok(updated);
            }
            // another transition landed first; re-read and re-validate
            Err(_) => continue,
        }
    }
}

fn scan_records<T>(tree: &Tree) -> Result<Vec<T>, StoreError>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    let mut records = Vec::new();

    for entry in tree.iter() {
        let (key, bytes) = entry?;
        let id = String::from_utf8_lossy(&key);
        records.push(decode_record(&id, &bytes)?);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::{ComplexityTier, RepairStatus};

    fn test_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(sled::open(dir.path().join("store.db")).unwrap());
        let store = RecordStore::open(&db).unwrap();
        (dir, store)
    }

    fn sample_repair() -> RepairRequest {
        RepairRequest::new(
            "client1".into(),
            "Elegy".into(),
            "misfire under load".into(),
            Some(ComplexityTier::Simple),
        )
        .unwrap()
    }

    #[test]
    fn insert_then_load_round_trips() {
        let (_dir, store) = test_store();
        let repair = sample_repair();

        store.insert_repair(&repair).unwrap();

        let loaded = store.repair(&repair.id).unwrap().unwrap();
        assert_eq!(loaded, repair);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let (_dir, store) = test_store();
        let repair = sample_repair();

        store.insert_repair(&repair).unwrap();
        let second = store.insert_repair(&repair);

        assert!(matches!(second, Err(StoreError::DuplicateId { .. })));
    }

    #[test]
    fn update_missing_record_is_not_found() {
        let (_dir, store) = test_store();

        let result = store.update_repair("rep1missing", Ok);

        assert!(matches!(result, Err(LifecycleError::NotFound(_))));
    }

    #[test]
    fn vetoed_update_leaves_the_record_unchanged() {
        let (_dir, store) = test_store();
        let repair = sample_repair();
        store.insert_repair(&repair).unwrap();

        let result = store.update_repair(&repair.id, |_| {
            Err(LifecycleError::InvalidTransition {
                action: "complete",
                status: "pending",
            })
        });

        assert!(result.is_err());
        assert_eq!(store.repair(&repair.id).unwrap().unwrap(), repair);
    }

    #[test]
    fn update_persists_the_mutation() {
        let (_dir, store) = test_store();
        let repair = sample_repair();
        store.insert_repair(&repair).unwrap();

        store
            .update_repair(&repair.id, |mut r| {
                r.status = RepairStatus::Accepted;
                r.assigned_to = Some("mech1".into());
                Ok(r)
            })
            .unwrap();

        let loaded = store.repair(&repair.id).unwrap().unwrap();
        assert_eq!(loaded.status, RepairStatus::Accepted);
        assert_eq!(loaded.assigned_to.as_deref(), Some("mech1"));
    }
}
