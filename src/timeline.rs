//! Declarative tween sequences.
//!
//! A [`Sequence`] is an ordered list of steps, each placed at an explicit
//! offset from the sequence start:
//!
//! - **tweens** interpolate one [`Param`](crate::param::Param) towards a
//!   target along an [`Ease`] curve,
//! - **cues** fire an instantaneous side effect ([`Cue`]).
//!
//! Steps may overlap; that is how layered effects are built (portal scale,
//! progress and camera depth all moving at once). The [`TimelineScheduler`]
//! owns the running sequences and advances them from the frame loop with
//! [`TimelineScheduler::tick`]. It has no thread or timer of its own.
//!
//! ```ignore
//! let seq = Sequence::new("flash")
//!     .to(&flash, 0.0, 1.0, 1.0, Ease::PowerIn(2))
//!     .to(&flash, 1.2, 2.5, 0.0, Ease::PowerOut(2))
//!     .on_complete([Cue::Ui(UiCue::ShowDownload)]);
//! let id = scheduler.play(seq);
//! for event in scheduler.tick(dt) { /* dispatch */ }
//! ```
//!
//! Once started a sequence runs to completion. The only early exit is when a
//! target param has been dropped: the rest of that sequence is abandoned and
//! [`SchedulerEvent::Aborted`] is reported.

use crate::audio::AudioCue;
use crate::easing::Ease;
use crate::param::ParamRef;
use crate::ui::UiCue;

/// Instantaneous side effect scheduled inside a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    Ui(UiCue),
    Audio(AudioCue),
}

impl From<UiCue> for Cue {
    fn from(cue: UiCue) -> Self {
        Cue::Ui(cue)
    }
}

impl From<AudioCue> for Cue {
    fn from(cue: AudioCue) -> Self {
        Cue::Audio(cue)
    }
}

/// Identifier of a sequence handed out by [`TimelineScheduler::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceId(u64);

/// Something that happened during a scheduler tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// A cue step (or completion cue) fired.
    Cue(Cue),
    /// The sequence ran every step.
    Completed(SequenceId),
    /// A target was torn down; the remaining steps were dropped.
    Aborted(SequenceId),
}

/// Timing of a single tween: where it starts, how long it runs, where it
/// ends up and how it gets there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelinePhase {
    /// Offset from the sequence start, in seconds.
    pub start: f32,
    /// Length in seconds. Zero snaps to the target.
    pub duration: f32,
    /// Value reached at the end of the phase.
    pub target: f32,
    /// Curve applied to normalized time.
    pub ease: Ease,
    /// Explicit start value; `None` starts from whatever the param holds
    /// when the phase begins.
    pub from: Option<f32>,
}

impl TimelinePhase {
    /// Relative tween to `target`.
    pub fn new(start: f32, duration: f32, target: f32, ease: Ease) -> Self {
        Self {
            start,
            duration,
            target,
            ease,
            from: None,
        }
    }

    /// Same phase with an explicit start value.
    pub fn from(mut self, from: f32) -> Self {
        self.from = Some(from);
        self
    }

    /// Offset at which the phase reaches its target.
    pub fn end(&self) -> f32 {
        self.start + self.duration.max(0.0)
    }

    fn value_at(&self, origin: f32, local: f32) -> f32 {
        if local >= 1.0 {
            self.target
        } else {
            origin + (self.target - origin) * self.ease.apply(local)
        }
    }
}

#[derive(Debug)]
struct Tween {
    target: ParamRef,
    phase: TimelinePhase,
    origin: Option<f32>,
    done: bool,
}

#[derive(Debug)]
enum Step {
    Tween(Tween),
    Cue { at: f32, cue: Cue, fired: bool },
}

impl Step {
    fn is_done(&self) -> bool {
        match self {
            Step::Tween(t) => t.done,
            Step::Cue { fired, .. } => *fired,
        }
    }

    fn end(&self) -> f32 {
        match self {
            Step::Tween(t) => t.phase.end(),
            Step::Cue { at, .. } => *at,
        }
    }

    fn shift(&mut self, offset: f32) {
        match self {
            Step::Tween(t) => t.phase.start += offset,
            Step::Cue { at, .. } => *at += offset,
        }
    }
}

/// Progress of a sequence after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Running,
    Completed,
    Aborted,
}

/// A set of time-offset steps built up front and then played.
#[derive(Debug)]
pub struct Sequence {
    label: &'static str,
    steps: Vec<Step>,
    on_complete: Vec<Cue>,
    elapsed: f32,
}

impl Sequence {
    /// Create an empty sequence. The label only shows up in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            steps: Vec::new(),
            on_complete: Vec::new(),
            elapsed: 0.0,
        }
    }

    /// Add a tween with explicit phase timing.
    pub fn phase(mut self, target: ParamRef, phase: TimelinePhase) -> Self {
        self.steps.push(Step::Tween(Tween {
            target,
            phase,
            origin: None,
            done: false,
        }));
        self
    }

    /// Tween `target` from its current value to `to`.
    pub fn to(self, target: &ParamRef, at: f32, duration: f32, to: f32, ease: Ease) -> Self {
        self.phase(target.clone(), TimelinePhase::new(at, duration, to, ease))
    }

    /// Tween `target` from `from` to `to`.
    pub fn from_to(
        self,
        target: &ParamRef,
        at: f32,
        duration: f32,
        from: f32,
        to: f32,
        ease: Ease,
    ) -> Self {
        self.phase(
            target.clone(),
            TimelinePhase::new(at, duration, to, ease).from(from),
        )
    }

    /// Fire `cue` once the sequence reaches `at`.
    pub fn cue(mut self, at: f32, cue: impl Into<Cue>) -> Self {
        self.steps.push(Step::Cue {
            at,
            cue: cue.into(),
            fired: false,
        });
        self
    }

    /// Splice another sequence in, shifted by `at`.
    ///
    /// The nested sequence's completion cues fire at its own end, as plain
    /// cue steps of this sequence.
    pub fn nest(mut self, at: f32, other: Sequence) -> Self {
        let end = other.duration();
        for mut step in other.steps {
            step.shift(at);
            self.steps.push(step);
        }
        for cue in other.on_complete {
            self.steps.push(Step::Cue {
                at: at + end,
                cue,
                fired: false,
            });
        }
        self
    }

    /// Add the same choreography for several items, each delayed by
    /// `each` seconds relative to the previous one.
    ///
    /// `add` receives the sequence, the item's start offset and the item.
    pub fn stagger<T>(
        mut self,
        at: f32,
        each: f32,
        items: &[T],
        mut add: impl FnMut(Sequence, f32, &T) -> Sequence,
    ) -> Self {
        for (i, item) in items.iter().enumerate() {
            self = add(self, at + each * i as f32, item);
        }
        self
    }

    /// Cues fired once, after the last step, when the sequence completes.
    pub fn on_complete(mut self, cues: impl IntoIterator<Item = Cue>) -> Self {
        self.on_complete.extend(cues);
        self
    }

    /// Offset of the last step's end.
    pub fn duration(&self) -> f32 {
        self.steps.iter().map(Step::end).fold(0.0, f32::max)
    }

    /// Label given at construction.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Number of steps (tweens and cues).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Time since the sequence started playing.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn advance(&mut self, dt: f32, events: &mut Vec<SchedulerEvent>) -> Status {
        if dt.is_finite() {
            self.elapsed += dt.max(0.0);
        }
        let now = self.elapsed;

        for step in &mut self.steps {
            match step {
                Step::Tween(tween) => {
                    if tween.done || now < tween.phase.start {
                        continue;
                    }
                    let origin = match tween.origin {
                        Some(origin) => origin,
                        None => match tween.phase.from.or_else(|| tween.target.get()) {
                            Some(origin) => {
                                tween.origin = Some(origin);
                                origin
                            }
                            None => return Status::Aborted,
                        },
                    };
                    let local = if tween.phase.duration <= 0.0 {
                        1.0
                    } else {
                        ((now - tween.phase.start) / tween.phase.duration).clamp(0.0, 1.0)
                    };
                    if !tween.target.set(tween.phase.value_at(origin, local)) {
                        return Status::Aborted;
                    }
                    tween.done = local >= 1.0;
                }
                Step::Cue { at, cue, fired } => {
                    if !*fired && now >= *at {
                        *fired = true;
                        events.push(SchedulerEvent::Cue(*cue));
                    }
                }
            }
        }

        if self.steps.iter().all(Step::is_done) {
            events.extend(self.on_complete.drain(..).map(SchedulerEvent::Cue));
            Status::Completed
        } else {
            Status::Running
        }
    }
}

/// Runs sequences on the frame loop's timebase.
#[derive(Debug, Default)]
pub struct TimelineScheduler {
    next_id: u64,
    active: Vec<(SequenceId, Sequence)>,
}

impl TimelineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a sequence. Its first steps apply on the next [`tick`](Self::tick).
    pub fn play(&mut self, sequence: Sequence) -> SequenceId {
        let id = SequenceId(self.next_id);
        self.next_id += 1;
        log::debug!(
            "timeline: play '{}' ({} steps, {:.2}s)",
            sequence.label,
            sequence.len(),
            sequence.duration()
        );
        self.active.push((id, sequence));
        id
    }

    /// Advance every active sequence by `dt` seconds.
    ///
    /// Sequences advance in the order they were started, steps in the order
    /// they were added, so a later write to the same param wins. Finished
    /// and aborted sequences are discarded.
    pub fn tick(&mut self, dt: f32) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        self.active.retain_mut(|(id, sequence)| match sequence.advance(dt, &mut events) {
            Status::Running => true,
            Status::Completed => {
                log::debug!("timeline: '{}' completed", sequence.label);
                events.push(SchedulerEvent::Completed(*id));
                false
            }
            Status::Aborted => {
                log::warn!(
                    "timeline: '{}' abandoned at {:.2}s, a target was dropped",
                    sequence.label,
                    sequence.elapsed
                );
                events.push(SchedulerEvent::Aborted(*id));
                false
            }
        });
        events
    }

    /// Whether the sequence is still running.
    pub fn is_active(&self, id: SequenceId) -> bool {
        self.active.iter().any(|(active, _)| *active == id)
    }

    /// Number of running sequences.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether nothing is running.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Param;

    const DT: f32 = 0.1;

    fn run(scheduler: &mut TimelineScheduler, seconds: f32) -> Vec<SchedulerEvent> {
        let frames = (seconds / DT).round() as usize;
        (0..frames).flat_map(|_| scheduler.tick(DT)).collect()
    }

    #[test]
    fn test_relative_tween_reaches_target() {
        let p = Param::new(2.0);
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(Sequence::new("t").to(&p.handle(), 0.0, 1.0, 4.0, Ease::Linear));

        run(&mut scheduler, 0.5);
        assert!((p.get() - 3.0).abs() < 1e-4);
        run(&mut scheduler, 0.6);
        assert_eq!(p.get(), 4.0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_start_value_captured_when_phase_begins() {
        let p = Param::new(0.0);
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(Sequence::new("t").to(&p.handle(), 1.0, 1.0, 10.0, Ease::Linear));

        run(&mut scheduler, 0.5);
        assert_eq!(p.get(), 0.0);
        // Changed before the phase starts: the tween picks it up
        p.set(5.0);
        run(&mut scheduler, 1.0);
        assert!((p.get() - 7.5).abs() < 1e-3);
    }

    #[test]
    fn test_from_to_overrides_current_value() {
        let p = Param::new(9.0);
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(Sequence::new("t").from_to(&p.handle(), 0.0, 2.0, 0.0, 1.0, Ease::Linear));

        scheduler.tick(0.0);
        assert_eq!(p.get(), 0.0);
        run(&mut scheduler, 1.0);
        assert!((p.get() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_overlapping_phases_layer() {
        let a = Param::new(0.0);
        let b = Param::new(0.0);
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(
            Sequence::new("layers")
                .to(&a.handle(), 0.0, 2.0, 1.0, Ease::Linear)
                .to(&b.handle(), 1.0, 2.0, 1.0, Ease::Linear),
        );

        run(&mut scheduler, 1.5);
        assert!((a.get() - 0.75).abs() < 1e-4);
        assert!((b.get() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_cues_fire_once_at_offset() {
        let mut scheduler = TimelineScheduler::new();
        let id = scheduler.play(
            Sequence::new("cues")
                .cue(0.5, UiCue::ShowDownload)
                .cue(1.0, UiCue::HideIntro)
                .on_complete([Cue::Ui(UiCue::ShowSoundToggle)]),
        );

        let early = run(&mut scheduler, 0.3);
        assert!(early.is_empty());

        let events = run(&mut scheduler, 1.0);
        assert_eq!(
            events,
            vec![
                SchedulerEvent::Cue(Cue::Ui(UiCue::ShowDownload)),
                SchedulerEvent::Cue(Cue::Ui(UiCue::HideIntro)),
                SchedulerEvent::Cue(Cue::Ui(UiCue::ShowSoundToggle)),
                SchedulerEvent::Completed(id),
            ]
        );
    }

    #[test]
    fn test_stagger_offsets() {
        let items: Vec<Param> = (0..3).map(|_| Param::new(0.0)).collect();
        let seq = Sequence::new("stagger").stagger(1.0, 0.5, &items, |seq, at, p| {
            seq.to(&p.handle(), at, 1.0, 1.0, Ease::Linear)
        });
        assert_eq!(seq.len(), 3);
        assert!((seq.duration() - 3.0).abs() < 1e-6);

        let mut scheduler = TimelineScheduler::new();
        scheduler.play(seq);
        run(&mut scheduler, 1.5);
        assert!((items[0].get() - 0.5).abs() < 1e-4);
        assert!(items[1].get().abs() < 1e-4);
        assert_eq!(items[2].get(), 0.0);
    }

    #[test]
    fn test_nest_shifts_steps_and_completion_cues() {
        let p = Param::new(0.0);
        let inner = Sequence::new("inner")
            .to(&p.handle(), 0.0, 1.0, 1.0, Ease::Linear)
            .on_complete([Cue::Ui(UiCue::HideDownload)]);
        let outer = Sequence::new("outer").nest(2.0, inner);
        assert!((outer.duration() - 3.0).abs() < 1e-6);

        let mut scheduler = TimelineScheduler::new();
        scheduler.play(outer);
        let events = run(&mut scheduler, 1.9);
        assert!(events.is_empty());
        assert_eq!(p.get(), 0.0);

        let events = run(&mut scheduler, 1.2);
        assert!(events.contains(&SchedulerEvent::Cue(Cue::Ui(UiCue::HideDownload))));
        assert_eq!(p.get(), 1.0);
    }

    #[test]
    fn test_dropped_target_aborts_remaining_steps() {
        let keep = Param::new(0.0);
        let gone = Param::new(0.0);
        let mut scheduler = TimelineScheduler::new();
        let id = scheduler.play(
            Sequence::new("abort")
                .to(&keep.handle(), 0.0, 1.0, 1.0, Ease::Linear)
                .to(&gone.handle(), 0.5, 1.0, 1.0, Ease::Linear)
                .cue(2.0, UiCue::ShowDownload),
        );

        run(&mut scheduler, 0.2);
        drop(gone);
        let events = run(&mut scheduler, 3.0);
        assert_eq!(events, vec![SchedulerEvent::Aborted(id)]);
        assert!(!scheduler.is_active(id));
        assert!(keep.get() < 1.0);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let p = Param::new(0.0);
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(Sequence::new("snap").to(&p.handle(), 0.0, 0.0, 1.0, Ease::Linear));
        scheduler.tick(0.0);
        assert_eq!(p.get(), 1.0);
    }
}
