// Mute toggling through an instrument's gain, whichever shape it exposes

use crate::timeline::TimelineError;
use crate::timeline::registry::InstrumentRecord;

/// Flip the instrument between muted (gain 0) and unity gain.
///
/// Un-muting always restores gain 1, not the previous value; any non-unity
/// gain the user had set is lost. No-op when the live object is gone or has
/// no gain-like property. The caller re-renders afterwards.
pub fn toggle_mute(record: &InstrumentRecord) -> Result<(), TimelineError> {
    let Some(handle) = record.handle.upgrade() else {
        // The host dropped the object since the last scan.
        return Ok(());
    };
    let mut guard = handle.lock().map_err(|_| TimelineError::Poisoned)?;

    let Some(gain) = guard.gain() else {
        return Ok(());
    };
    let next = if gain.is_muted() { 1.0 } else { 0.0 };
    guard.set_gain(gain.with_value(next))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::instruments::{GainRef, InstrumentSource};
    use crate::sim::{SimInstrument, SimRig};
    use crate::timeline::registry::Registry;

    fn record_for(rig: &SimRig, id: &str) -> InstrumentRecord {
        let mut registry = Registry::new();
        registry.collect(rig as &dyn InstrumentSource);
        registry.get(id).unwrap().clone()
    }

    #[test]
    fn test_toggle_is_involution_on_zero_one() {
        let rig = SimRig::new();
        let handle = rig.insert("lead", SimInstrument::new("Synth").with_gain(GainRef::Direct(0.7)));
        let record = record_for(&rig, "lead");

        // First toggle mutes, regardless of the starting value.
        toggle_mute(&record).unwrap();
        assert_eq!(handle.lock().unwrap().gain(), Some(GainRef::Direct(0.0)));

        // Second toggle restores unity gain, not the original 0.7.
        toggle_mute(&record).unwrap();
        assert_eq!(handle.lock().unwrap().gain(), Some(GainRef::Direct(1.0)));
    }

    #[test]
    fn test_writes_back_through_indirect_shape() {
        let rig = SimRig::new();
        let handle = rig.insert("pad", SimInstrument::new("Synth").with_gain(GainRef::Indirect(0.4)));
        let record = record_for(&rig, "pad");

        toggle_mute(&record).unwrap();
        assert_eq!(handle.lock().unwrap().gain(), Some(GainRef::Indirect(0.0)));

        toggle_mute(&record).unwrap();
        assert_eq!(handle.lock().unwrap().gain(), Some(GainRef::Indirect(1.0)));
    }

    #[test]
    fn test_no_gain_property_is_a_noop() {
        let rig = SimRig::new();
        rig.insert("odd", SimInstrument::new("Synth").without_gain());
        let record = record_for(&rig, "odd");

        assert!(toggle_mute(&record).is_ok());
    }

    #[test]
    fn test_dropped_instrument_is_a_noop() {
        let rig = SimRig::new();
        rig.insert("gone", SimInstrument::new("Synth"));
        let record = record_for(&rig, "gone");

        rig.remove("gone");

        assert!(toggle_mute(&record).is_ok());
    }

    #[test]
    fn test_failing_gain_write_propagates() {
        let rig = SimRig::new();
        rig.insert("hostile", SimInstrument::new("Synth").with_failing_gain_write());
        let record = record_for(&rig, "hostile");

        assert!(toggle_mute(&record).is_err());
    }
}
