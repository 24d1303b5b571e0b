use std::time::Duration;

///
/// FieldModel
/// Runtime field metadata used by encoding and validation.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field name as used in hash cells (after prefixing).
    pub name: &'static str,
    /// Runtime type shape (a lossy projection of the Rust type).
    pub kind: FieldKind,
}

///
/// FieldKind
///
/// Minimal type surface needed for diagnostics and model validation.
/// Aligned with the [`FieldValue`](crate::value::FieldValue) impls; any
/// type outside the builtin menu projects to `Other`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Bool,
    Float,
    Int,
    Map,
    Other,
    Text,
    Uint,
}

///
/// Ttl
///
/// Declared record lifetime as (amount, unit). Absence on the model
/// means records never expire.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ttl {
    pub amount: u64,
    pub unit: TimeUnit,
}

impl Ttl {
    #[must_use]
    pub const fn new(amount: u64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    /// Resolve the declared pair into a concrete duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        match self.unit {
            TimeUnit::Millis => Duration::from_millis(self.amount),
            TimeUnit::Seconds => Duration::from_secs(self.amount),
            TimeUnit::Minutes => Duration::from_secs(self.amount * 60),
            TimeUnit::Hours => Duration::from_secs(self.amount * 60 * 60),
            TimeUnit::Days => Duration::from_secs(self.amount * 60 * 60 * 24),
        }
    }
}

///
/// TimeUnit
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeUnit {
    Days,
    Hours,
    Millis,
    Minutes,
    Seconds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_units_resolve_to_expected_durations() {
        assert_eq!(Ttl::new(250, TimeUnit::Millis).duration(), Duration::from_millis(250));
        assert_eq!(Ttl::new(30, TimeUnit::Seconds).duration(), Duration::from_secs(30));
        assert_eq!(Ttl::new(5, TimeUnit::Minutes).duration(), Duration::from_secs(300));
        assert_eq!(Ttl::new(2, TimeUnit::Hours).duration(), Duration::from_secs(7200));
        assert_eq!(Ttl::new(1, TimeUnit::Days).duration(), Duration::from_secs(86_400));
    }
}
