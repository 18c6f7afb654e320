// Activity classification - which instruments are playing on the current beat

use crate::host::instruments::InstrumentSource;
use crate::timeline::registry::Registry;

/// Refresh the snapshot and mark active instruments for this tick.
///
/// Collection happens first so instruments created since the last tick show
/// up immediately; the source namespace cannot be observed incrementally.
pub fn update_active_states(registry: &mut Registry, source: &dyn InstrumentSource, current_beat: u32) {
    registry.collect(source);

    for record in registry.records_mut() {
        // Simplified detection: any instrument with a recorded pattern fires
        // on the downbeat. Could be enhanced with actual pattern analysis.
        record.active = !record.patterns.is_empty() && current_beat % 4 == 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimInstrument, SimRig};

    #[test]
    fn test_active_on_downbeat_only() {
        let rig = SimRig::new();
        rig.insert("kick", SimInstrument::new("Drums").with_values(vec![1.0, 0.0]));
        let mut registry = Registry::new();

        update_active_states(&mut registry, &rig, 0);
        assert!(registry.get("kick").unwrap().active);

        update_active_states(&mut registry, &rig, 1);
        assert!(!registry.get("kick").unwrap().active);

        update_active_states(&mut registry, &rig, 2);
        assert!(!registry.get("kick").unwrap().active);
    }

    #[test]
    fn test_instrument_without_pattern_is_never_active() {
        let rig = SimRig::new();
        rig.insert("pad", SimInstrument::new("Synth").without_values());
        let mut registry = Registry::new();

        update_active_states(&mut registry, &rig, 0);
        assert!(!registry.get("pad").unwrap().active);
    }

    #[test]
    fn test_update_picks_up_new_instruments() {
        let rig = SimRig::new();
        let mut registry = Registry::new();

        update_active_states(&mut registry, &rig, 0);
        assert!(registry.is_empty());

        rig.insert("lead", SimInstrument::new("Synth"));
        update_active_states(&mut registry, &rig, 0);
        assert!(registry.get("lead").is_some());
    }
}
