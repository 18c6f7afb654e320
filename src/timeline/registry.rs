// Instrument registry - best-effort discovery of live instruments
// Every collection pass rebuilds the whole snapshot from scratch; the source
// namespace is uncontrolled, so diffing against stale records is not worth it

use crate::host::instruments::{InstrumentRef, InstrumentSource, SharedInstrument};
use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Host binding names that are never instruments.
const RESERVED_BINDINGS: [&str; 3] = ["window", "document", "timeline"];

/// Instrument classification, derived from the wrapped node's kind name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    Drums,
    Synth,
    Bass,
    Effect,
    Default,
}

impl InstrumentKind {
    /// Case-insensitive substring rules. First match wins; anything
    /// unrecognized falls back to `Default`.
    pub fn classify(kind_name: &str) -> Self {
        let name = kind_name.to_lowercase();
        if name.contains("drum") {
            InstrumentKind::Drums
        } else if name.contains("bass") || name == "mono" {
            InstrumentKind::Bass
        } else if name.contains("synth") || name.contains("fm") {
            InstrumentKind::Synth
        } else if name.contains("delay") || name.contains("reverb") || name.contains("chorus") {
            InstrumentKind::Effect
        } else {
            InstrumentKind::Default
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstrumentKind::Drums => "drums",
            InstrumentKind::Synth => "synth",
            InstrumentKind::Bass => "bass",
            InstrumentKind::Effect => "effect",
            InstrumentKind::Default => "default",
        }
    }
}

/// Minimal summary of one sequenced pattern on an instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSummary {
    /// Property the sequence drives (currently always "note").
    pub property: String,
    pub values: Vec<f64>,
    pub timings: Vec<f64>,
}

/// One discovered instrument.
#[derive(Debug, Clone)]
pub struct InstrumentRecord {
    /// Binding name the object was found under. Unique within a scan, not
    /// stable across scans.
    pub id: String,
    pub kind: InstrumentKind,
    pub patterns: Vec<PatternSummary>,
    /// Recomputed every tick; never persisted.
    pub active: bool,
    /// Non-owning reference to the live object.
    pub handle: InstrumentRef,
}

/// Snapshot of all discovered instruments, keyed by binding name.
#[derive(Default)]
pub struct Registry {
    records: BTreeMap<String, InstrumentRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the snapshot from the source. Never fails outward: any object
    /// that cannot be inspected is silently omitted.
    pub fn collect(&mut self, source: &dyn InstrumentSource) {
        self.records.clear();

        for (name, handle) in source.list() {
            if Self::is_reserved(&name) {
                continue;
            }
            if let Some(record) = Self::inspect(&name, &handle) {
                self.records.insert(name, record);
            }
        }
    }

    fn is_reserved(name: &str) -> bool {
        name.starts_with('_') || RESERVED_BINDINGS.contains(&name)
    }

    /// Qualify and summarize a single live object. `None` means the object is
    /// not an instrument or could not be inspected; either way it is skipped.
    fn inspect(name: &str, handle: &SharedInstrument) -> Option<InstrumentRecord> {
        // A poisoned lock counts as an uninspectable object.
        let guard = handle.lock().ok()?;

        // Qualification: wrapped audio node marker, a note facet, and a
        // callable sequencing method on it.
        let kind_name = guard.wrapped_kind().ok()??;
        let note = guard.note()?;
        if !note.has_seq() {
            return None;
        }

        let kind = InstrumentKind::classify(&kind_name);

        let mut patterns = Vec::new();
        match note.values() {
            Ok(Some(values)) => {
                let timings = note.timings().unwrap_or_default();
                patterns.push(PatternSummary {
                    property: "note".to_string(),
                    values,
                    timings,
                });
            }
            // No values field on the sequencer: not an error, just no pattern.
            Ok(None) => {}
            Err(err) => {
                warn!("timeline could not read pattern for {name}: {err}");
            }
        }

        drop(guard);

        Some(InstrumentRecord {
            id: name.to_string(),
            kind,
            patterns,
            active: false,
            handle: Arc::downgrade(handle),
        })
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&InstrumentRecord> {
        self.records.get(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &InstrumentRecord> {
        self.records.values()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut InstrumentRecord> {
        self.records.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimInstrument, SimRig};

    #[test]
    fn test_classify_substring_rules() {
        assert_eq!(InstrumentKind::classify("Drums"), InstrumentKind::Drums);
        assert_eq!(InstrumentKind::classify("EDrum808"), InstrumentKind::Drums);
        assert_eq!(InstrumentKind::classify("AcidBass"), InstrumentKind::Bass);
        assert_eq!(InstrumentKind::classify("Mono"), InstrumentKind::Bass);
        assert_eq!(InstrumentKind::classify("PolySynth"), InstrumentKind::Synth);
        assert_eq!(InstrumentKind::classify("FM"), InstrumentKind::Synth);
        assert_eq!(InstrumentKind::classify("Reverb"), InstrumentKind::Effect);
        assert_eq!(InstrumentKind::classify("PingPongDelay"), InstrumentKind::Effect);
        assert_eq!(InstrumentKind::classify("Chorus"), InstrumentKind::Effect);
        assert_eq!(InstrumentKind::classify("Sampler"), InstrumentKind::Default);
        assert_eq!(InstrumentKind::classify(""), InstrumentKind::Default);
    }

    #[test]
    fn test_drum_rule_wins_over_synth() {
        // "DrumSynth" contains both substrings; drum is checked first.
        assert_eq!(InstrumentKind::classify("DrumSynth"), InstrumentKind::Drums);
    }

    #[test]
    fn test_collect_keeps_only_qualifying_objects() {
        let rig = SimRig::new();
        rig.insert("kick", SimInstrument::new("Drums").with_values(vec![1.0, 0.0, 1.0, 0.0]));
        rig.insert("lead", SimInstrument::new("Synth").with_values(vec![60.0, 64.0]));
        // Not a wrapped audio node.
        rig.insert("config", SimInstrument::bare());
        // Wrapped but no note facet.
        rig.insert("verb", SimInstrument::new("Reverb").without_sequencer());
        // Note facet but the seq method is not callable.
        rig.insert("broken", SimInstrument::new("Synth").with_uncallable_seq());
        // Uninspectable object.
        rig.insert("ghost", SimInstrument::new("Synth").with_failing_probe());
        // Reserved / internal names.
        rig.insert("_internal", SimInstrument::new("Synth"));
        rig.insert("timeline", SimInstrument::new("Synth"));

        let mut registry = Registry::new();
        registry.collect(&rig);

        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["kick", "lead"]);
    }

    #[test]
    fn test_collect_replaces_previous_snapshot() {
        let rig = SimRig::new();
        rig.insert("kick", SimInstrument::new("Drums"));

        let mut registry = Registry::new();
        registry.collect(&rig);
        assert_eq!(registry.len(), 1);

        rig.remove("kick");
        rig.insert("bass", SimInstrument::new("Mono"));
        registry.collect(&rig);

        assert!(registry.get("kick").is_none());
        assert_eq!(registry.get("bass").map(|r| r.kind), Some(InstrumentKind::Bass));
    }

    #[test]
    fn test_missing_values_field_yields_no_pattern() {
        let rig = SimRig::new();
        rig.insert("lead", SimInstrument::new("Synth").without_values());

        let mut registry = Registry::new();
        registry.collect(&rig);

        let record = registry.get("lead").unwrap();
        assert!(record.patterns.is_empty());
    }

    #[test]
    fn test_failing_values_read_drops_pattern_not_instrument() {
        let rig = SimRig::new();
        rig.insert("lead", SimInstrument::new("Synth").with_failing_values());

        let mut registry = Registry::new();
        registry.collect(&rig);

        let record = registry.get("lead").unwrap();
        assert!(record.patterns.is_empty());
    }

    #[test]
    fn test_pattern_summary_contents() {
        let rig = SimRig::new();
        rig.insert(
            "lead",
            SimInstrument::new("Synth")
                .with_values(vec![0.0, 7.0, 4.0, 7.0])
                .with_timings(vec![0.125, 0.125, 0.25, 0.5]),
        );

        let mut registry = Registry::new();
        registry.collect(&rig);

        let record = registry.get("lead").unwrap();
        assert_eq!(record.patterns.len(), 1);
        let pattern = &record.patterns[0];
        assert_eq!(pattern.property, "note");
        assert_eq!(pattern.values, vec![0.0, 7.0, 4.0, 7.0]);
        assert_eq!(pattern.timings, vec![0.125, 0.125, 0.25, 0.5]);
    }

    #[test]
    fn test_missing_timings_read_as_empty() {
        let rig = SimRig::new();
        rig.insert("lead", SimInstrument::new("Synth").with_values(vec![1.0]).without_timings());

        let mut registry = Registry::new();
        registry.collect(&rig);

        let record = registry.get("lead").unwrap();
        assert_eq!(record.patterns.len(), 1);
        assert!(record.patterns[0].timings.is_empty());
    }

    #[test]
    fn test_empty_values_still_counts_as_pattern() {
        // A present-but-empty values field records an empty pattern summary.
        let rig = SimRig::new();
        rig.insert("lead", SimInstrument::new("Synth").with_values(Vec::new()));

        let mut registry = Registry::new();
        registry.collect(&rig);

        let record = registry.get("lead").unwrap();
        assert_eq!(record.patterns.len(), 1);
        assert!(record.patterns[0].values.is_empty());
    }
}
