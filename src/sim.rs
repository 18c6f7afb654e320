// Simulated host environment
// Stands in for the live-coding host in the demo binary and in tests:
// scriptable instruments, an in-memory project store, a beat clock, and the
// built-in starter templates

use crate::host::auth::{AuthClient, AuthError, Session};
use crate::host::instruments::{
    GainRef, Instrument, InstrumentSource, NoteSequencer, ProbeError, SharedInstrument,
};
use crate::host::storage::{ProjectMeta, ProjectStore, StorageKind, StoreError};
use crate::host::templates::{Template, TemplateCatalog};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How the simulated sequencer answers a values read.
#[derive(Debug, Clone)]
enum ValuesBehavior {
    Present(Vec<f64>),
    Absent,
    Failing,
}

/// Scriptable note-sequencing facet.
#[derive(Debug, Clone)]
pub struct SimSequencer {
    callable: bool,
    values: ValuesBehavior,
    timings: Option<Vec<f64>>,
}

impl Default for SimSequencer {
    fn default() -> Self {
        Self {
            callable: true,
            values: ValuesBehavior::Present(Vec::new()),
            timings: Some(Vec::new()),
        }
    }
}

impl NoteSequencer for SimSequencer {
    fn has_seq(&self) -> bool {
        self.callable
    }

    fn values(&self) -> Result<Option<Vec<f64>>, ProbeError> {
        match &self.values {
            ValuesBehavior::Present(values) => Ok(Some(values.clone())),
            ValuesBehavior::Absent => Ok(None),
            ValuesBehavior::Failing => Err(ProbeError::Unreadable("values")),
        }
    }

    fn timings(&self) -> Option<Vec<f64>> {
        self.timings.clone()
    }
}

/// Scriptable instrument. `new` builds a fully qualifying instrument with an
/// empty pattern; the builder methods degrade individual facets to exercise
/// the discovery edge cases.
#[derive(Debug, Clone)]
pub struct SimInstrument {
    kind: Option<String>,
    seq: Option<SimSequencer>,
    gain: Option<GainRef>,
    probe_fails: bool,
    gain_write_fails: bool,
}

impl SimInstrument {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            seq: Some(SimSequencer::default()),
            gain: Some(GainRef::Direct(1.0)),
            probe_fails: false,
            gain_write_fails: false,
        }
    }

    /// A plain object that is not a wrapped audio node.
    pub fn bare() -> Self {
        Self {
            kind: None,
            seq: None,
            gain: None,
            probe_fails: false,
            gain_write_fails: false,
        }
    }

    /// Wrapped node without a note facet.
    pub fn without_sequencer(mut self) -> Self {
        self.seq = None;
        self
    }

    /// Note facet whose sequencing method is not callable.
    pub fn with_uncallable_seq(mut self) -> Self {
        self.seq_mut().callable = false;
        self
    }

    /// Object that cannot be inspected at all.
    pub fn with_failing_probe(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        self.seq_mut().values = ValuesBehavior::Present(values);
        self
    }

    /// Sequencer with no values field.
    pub fn without_values(mut self) -> Self {
        self.seq_mut().values = ValuesBehavior::Absent;
        self
    }

    /// Sequencer whose values field errors when read.
    pub fn with_failing_values(mut self) -> Self {
        self.seq_mut().values = ValuesBehavior::Failing;
        self
    }

    pub fn with_timings(mut self, timings: Vec<f64>) -> Self {
        self.seq_mut().timings = Some(timings);
        self
    }

    pub fn without_timings(mut self) -> Self {
        self.seq_mut().timings = None;
        self
    }

    pub fn with_gain(mut self, gain: GainRef) -> Self {
        self.gain = Some(gain);
        self
    }

    pub fn without_gain(mut self) -> Self {
        self.gain = None;
        self
    }

    /// Instrument whose gain rejects writes.
    pub fn with_failing_gain_write(mut self) -> Self {
        self.gain_write_fails = true;
        self
    }

    fn seq_mut(&mut self) -> &mut SimSequencer {
        self.seq.get_or_insert_with(SimSequencer::default)
    }
}

impl Instrument for SimInstrument {
    fn wrapped_kind(&self) -> Result<Option<String>, ProbeError> {
        if self.probe_fails {
            return Err(ProbeError::Host("object refused inspection".to_string()));
        }
        Ok(self.kind.clone())
    }

    fn note(&self) -> Option<&dyn NoteSequencer> {
        self.seq.as_ref().map(|seq| seq as &dyn NoteSequencer)
    }

    fn gain(&self) -> Option<GainRef> {
        self.gain
    }

    fn set_gain(&mut self, gain: GainRef) -> Result<(), ProbeError> {
        if self.gain_write_fails {
            return Err(ProbeError::Unreadable("gain"));
        }
        if self.gain.is_some() {
            self.gain = Some(gain);
        }
        Ok(())
    }
}

/// A mutable set of named live instruments, playing the part of the host's
/// binding namespace.
#[derive(Default)]
pub struct SimRig {
    bindings: Mutex<Vec<(String, SharedInstrument)>>,
}

impl SimRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an instrument under a name, returning the shared handle so tests
    /// and the demo can mutate the live object afterwards.
    pub fn insert(&self, name: &str, instrument: SimInstrument) -> SharedInstrument {
        let handle: SharedInstrument = Arc::new(Mutex::new(instrument));
        let mut bindings = self.bindings.lock().unwrap_or_else(|e| e.into_inner());
        bindings.retain(|(bound, _)| bound != name);
        bindings.push((name.to_string(), handle.clone()));
        handle
    }

    /// Drop a binding; the live object dies with it unless a handle is held.
    pub fn remove(&self, name: &str) {
        let mut bindings = self.bindings.lock().unwrap_or_else(|e| e.into_inner());
        bindings.retain(|(bound, _)| bound != name);
    }

    pub fn clear(&self) {
        let mut bindings = self.bindings.lock().unwrap_or_else(|e| e.into_inner());
        bindings.clear();
    }
}

impl InstrumentSource for SimRig {
    fn list(&self) -> Vec<(String, SharedInstrument)> {
        let bindings = self.bindings.lock().unwrap_or_else(|e| e.into_inner());
        bindings.clone()
    }
}

/// Wall-clock metronome for the demo binary. `poll` returns the next beat
/// index once its time has come, already wrapped to the measure.
pub struct BeatClock {
    interval: Duration,
    beats_per_measure: u32,
    beat: u32,
    next_due: Instant,
}

impl BeatClock {
    pub fn new(bpm: u32, beats_per_measure: u32) -> Self {
        let interval = Duration::from_secs_f64(60.0 / f64::from(bpm.max(1)));
        Self {
            interval,
            beats_per_measure: beats_per_measure.max(1),
            beat: 0,
            next_due: Instant::now(),
        }
    }

    pub fn poll(&mut self) -> Option<u32> {
        if Instant::now() < self.next_due {
            return None;
        }
        let beat = self.beat;
        self.beat = (self.beat + 1) % self.beats_per_measure;
        self.next_due += self.interval;
        Some(beat)
    }
}

/// In-memory project store, the local half of the host's persistence.
#[derive(Default)]
pub struct MemoryStore {
    projects: BTreeMap<String, StoredProject>,
}

struct StoredProject {
    code: String,
    updated_at: DateTime<Utc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    fn save(&mut self, name: &str, code: &str) -> Result<(), StoreError> {
        self.projects.insert(
            name.to_string(),
            StoredProject {
                code: code.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn load(&self, name: &str) -> Result<String, StoreError> {
        self.projects
            .get(name)
            .map(|project| project.code.clone())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<ProjectMeta>, StoreError> {
        let mut entries: Vec<ProjectMeta> = self
            .projects
            .iter()
            .map(|(name, project)| ProjectMeta {
                name: name.clone(),
                updated_at: project.updated_at,
                storage: StorageKind::Local,
            })
            .collect();
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.projects
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

/// In-memory email/password auth, enough to drive the sign-in panel.
#[derive(Default)]
pub struct SimAuth {
    accounts: BTreeMap<String, String>,
    session: Option<Session>,
}

impl SimAuth {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthClient for SimAuth {
    fn sign_up(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        if self.accounts.contains_key(email) {
            return Err(AuthError::Backend(format!("account `{email}` exists")));
        }
        self.accounts.insert(email.to_string(), password.to_string());
        self.sign_in(email, password)
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        match self.accounts.get(email) {
            Some(stored) if stored == password => {
                let session = Session {
                    user_id: format!("sim-{email}"),
                    email: email.to_string(),
                    signed_in_at: Utc::now(),
                };
                self.session = Some(session.clone());
                Ok(session)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        self.session = None;
        Ok(())
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

/// The built-in starter snippets shown by the template picker.
pub struct BuiltinTemplates {
    templates: Vec<Template>,
}

impl Default for BuiltinTemplates {
    fn default() -> Self {
        Self {
            templates: vec![
                Template::new(
                    "Basic Beat",
                    "Four-on-the-floor drums with a simple bassline",
                    "drums = EDrum808()\n\
                     drums.note.seq([1, 0, 1, 0], [1/4])\n\
                     \n\
                     bass = Mono()\n\
                     bass.note.seq([0, 0, 7, 5], [1/4])\n",
                ),
                Template::new(
                    "Ambient Pad",
                    "Slow synth chords through a long reverb",
                    "pad = PolySynth()\n\
                     pad.note.seq([[0, 4, 7], [0, 5, 9]], [2])\n\
                     \n\
                     verb = Reverb(0.8)\n\
                     pad.connect(verb)\n",
                ),
                Template::new(
                    "Acid Line",
                    "Resonant bass arpeggio with a ping-pong delay",
                    "acid = AcidBass()\n\
                     acid.note.seq([0, 12, 3, 7, 0, 10, 3, 5], [1/8])\n\
                     \n\
                     echo = PingPongDelay(3/8)\n\
                     acid.connect(echo)\n",
                ),
            ],
        }
    }
}

impl BuiltinTemplates {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateCatalog for BuiltinTemplates {
    fn templates(&self) -> &[Template] {
        &self.templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_insert_rebinds_existing_name() {
        let rig = SimRig::new();
        rig.insert("lead", SimInstrument::new("Synth"));
        rig.insert("lead", SimInstrument::new("Mono"));

        let bindings = rig.list();
        assert_eq!(bindings.len(), 1);
        let kind = bindings[0].1.lock().unwrap().wrapped_kind().unwrap();
        assert_eq!(kind.as_deref(), Some("Mono"));
    }

    #[test]
    fn test_memory_store_round_trip_and_delete() {
        let mut store = MemoryStore::new();
        store.save("jam", "drums = EDrum808()").unwrap();

        assert_eq!(store.load("jam").unwrap(), "drums = EDrum808()");
        assert!(matches!(store.load("nope"), Err(StoreError::NotFound(_))));

        store.delete("jam").unwrap();
        assert!(matches!(store.delete("jam"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_memory_store_lists_newest_first() {
        let mut store = MemoryStore::new();
        store.save("older", "a = Mono()").unwrap();
        store.save("newer", "b = Mono()").unwrap();
        // Re-saving bumps the timestamp.
        store.save("older", "a = Mono(0.5)").unwrap();

        let names: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|meta| meta.name)
            .collect();
        assert_eq!(names, vec!["older", "newer"]);
    }

    #[test]
    fn test_beat_clock_wraps_at_measure() {
        let mut clock = BeatClock::new(120, 4);

        let mut beats = Vec::new();
        for _ in 0..6 {
            // Force each beat due instead of sleeping through the interval.
            clock.next_due = Instant::now();
            beats.push(clock.poll().unwrap());
        }
        assert_eq!(beats, vec![0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn test_beat_clock_is_quiet_between_beats() {
        let mut clock = BeatClock::new(60, 4);
        assert_eq!(clock.poll(), Some(0));
        // A second past the first beat has not elapsed.
        assert_eq!(clock.poll(), None);
    }

    #[test]
    fn test_auth_sign_in_requires_matching_password() {
        let mut auth = SimAuth::new();
        auth.sign_up("a@example.com", "secret").unwrap();
        assert!(auth.is_logged_in());

        auth.sign_out().unwrap();
        assert!(!auth.is_logged_in());

        assert!(matches!(
            auth.sign_in("a@example.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(auth.sign_in("a@example.com", "secret").is_ok());
    }

    #[test]
    fn test_builtin_templates_are_distinctly_named() {
        let catalog = BuiltinTemplates::new();
        let templates = catalog.templates();
        assert!(templates.len() >= 3);

        let mut names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), templates.len());
        assert!(templates.iter().all(|t| !t.code.is_empty()));
    }
}
