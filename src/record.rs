//! Shared record primitives: timestamps, render surfaces, message references

use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl<T: TimeZone> PartialEq for TimeStamp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: TimeZone> Eq for TimeStamp<T> {}

impl<T: TimeZone> PartialOrd for TimeStamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl<T: TimeZone> Ord for TimeStamp<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn now() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// A rendering destination a record's presentation artifact can live on.
///
/// Repairs enter on `Intake`, move to `InProgress` when a mechanic takes
/// them and `Completed` when finished; rejected requests stay on `Intake`,
/// terminally marked. Invoices render on `Billing` and relocate to
/// `Disputed` on dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum Surface {
    #[n(0)]
    Intake,
    #[n(1)]
    InProgress,
    #[n(2)]
    Completed,
    #[n(3)]
    Billing,
    #[n(4)]
    Disputed,
}

/// Opaque reference to a rendered presentation artifact: which surface it is
/// on and the platform message id there. Overwritten whenever a transition
/// relocates the artifact.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct MessageRef {
    #[n(0)]
    pub surface: Surface,
    #[n(1)]
    pub message_id: String,
}

impl MessageRef {
    pub fn new(surface: Surface, message_id: String) -> Self {
        Self {
            surface,
            message_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::now();

        let encoding = minicbor::to_vec(original.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn timestamps_order_chronologically() {
        let earlier = TimeStamp::new_with(2024, 6, 1, 9, 0, 0);
        let later = TimeStamp::new_with(2024, 6, 1, 17, 30, 0);

        assert!(earlier < later);
    }

    #[test]
    fn message_ref_encoding() {
        let original = MessageRef::new(Surface::Intake, "msg-1042".into());

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: MessageRef = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }
}
