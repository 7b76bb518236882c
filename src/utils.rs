//! Identifier generation helpers

use bech32::Bech32m;
use uuid7::uuid7;

use crate::error::IdError;

// construct a unique id then encode using bech32. uuid7 is time-ordered with
// a random suffix, so ids sort by creation time within a kind.
pub fn new_uuid_to_bech32(hrp: &str) -> Result<String, IdError> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Fresh repair request id, e.g. `rep1...`.
pub fn new_repair_id() -> Result<String, IdError> {
    new_uuid_to_bech32("rep")
}

/// Fresh invoice id, e.g. `inv1...`.
pub fn new_invoice_id() -> Result<String, IdError> {
    new_uuid_to_bech32("inv")
}
