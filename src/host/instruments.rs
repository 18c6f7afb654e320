// Live instrument interfaces exposed by the host environment
// The timeline is handed an explicit source of instrument handles instead of
// scanning an ambient namespace; handles are host-owned live objects that may
// change shape or disappear between calls

use std::sync::{Arc, Mutex, Weak};

/// Failure while probing a property on a live object.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("property `{0}` is not readable")]
    Unreadable(&'static str),

    #[error("live object is gone")]
    Gone,

    #[error("host error: {0}")]
    Host(String),
}

/// The instrument's output-volume control.
///
/// The host audio API represents gain either as a bare number or as an object
/// exposing a `.value` field, interchangeably. The variant tags which shape
/// the live object uses so writes go back through the same shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainRef {
    /// Bare numeric gain property.
    Direct(f64),
    /// Gain object with a `.value` field.
    Indirect(f64),
}

impl GainRef {
    pub fn value(&self) -> f64 {
        match self {
            GainRef::Direct(v) | GainRef::Indirect(v) => *v,
        }
    }

    /// Same shape, new value.
    pub fn with_value(self, value: f64) -> GainRef {
        match self {
            GainRef::Direct(_) => GainRef::Direct(value),
            GainRef::Indirect(_) => GainRef::Indirect(value),
        }
    }

    /// A gain of exactly zero is treated as muted.
    pub fn is_muted(&self) -> bool {
        self.value() == 0.0
    }
}

/// Note-sequencing facet of an instrument.
pub trait NoteSequencer {
    /// Whether the sequencing method is actually callable on this object.
    fn has_seq(&self) -> bool;

    /// Current pattern values.
    ///
    /// `Ok(None)` means the object has no values field at all (not an error);
    /// `Err` means the field exists but reading it failed.
    fn values(&self) -> Result<Option<Vec<f64>>, ProbeError>;

    /// Current pattern timings; absent timings read as `None`.
    fn timings(&self) -> Option<Vec<f64>>;
}

/// A live audio object in the host environment.
///
/// Every accessor is best-effort: the underlying object is mutated freely by
/// user code and may stop answering between one call and the next.
pub trait Instrument: Send {
    /// Declared kind name of the wrapped audio node.
    ///
    /// `Ok(None)` means the object is not a wrapped audio node (and therefore
    /// not an instrument); `Err` means the object cannot be inspected at all.
    fn wrapped_kind(&self) -> Result<Option<String>, ProbeError>;

    /// Note facet, present only on sequenceable instruments.
    fn note(&self) -> Option<&dyn NoteSequencer>;

    /// Gain property in whichever shape the object carries, if any.
    fn gain(&self) -> Option<GainRef>;

    /// Write the gain back through the shape carried by `gain`.
    fn set_gain(&mut self, gain: GainRef) -> Result<(), ProbeError>;
}

/// Host-owned live instrument handle.
pub type SharedInstrument = Arc<Mutex<dyn Instrument>>;

/// Non-owning reference kept by the registry; the referent may be dropped by
/// the host at any time.
pub type InstrumentRef = Weak<Mutex<dyn Instrument>>;

/// Capability handed to the timeline at init: enumerate the host's current
/// instrument bindings. Names are binding names and may be rebound between
/// calls; the same name is not guaranteed to refer to the same object twice.
pub trait InstrumentSource: Send + Sync {
    fn list(&self) -> Vec<(String, SharedInstrument)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_ref_reads_either_shape() {
        assert_eq!(GainRef::Direct(0.8).value(), 0.8);
        assert_eq!(GainRef::Indirect(0.3).value(), 0.3);
    }

    #[test]
    fn test_with_value_preserves_shape() {
        assert_eq!(GainRef::Direct(0.5).with_value(0.0), GainRef::Direct(0.0));
        assert_eq!(
            GainRef::Indirect(0.5).with_value(1.0),
            GainRef::Indirect(1.0)
        );
    }

    #[test]
    fn test_only_zero_counts_as_muted() {
        assert!(GainRef::Direct(0.0).is_muted());
        assert!(GainRef::Indirect(0.0).is_muted());
        assert!(!GainRef::Direct(0.001).is_muted());
        assert!(!GainRef::Indirect(1.0).is_muted());
    }
}
