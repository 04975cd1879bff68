//! Interaction state machine.
//!
//! Four states in a fixed cycle:
//!
//! ```text
//! Idle --enter--> Entering --(sequence done)--> Entered
//!  ^                                               |
//!  +--(sequence done)-- Returning <----return------+
//! ```
//!
//! A trigger is accepted only from the state that precedes it in the cycle,
//! and only while no transition sequence is in flight. Every other trigger
//! is ignored. The machine owns the `progress` param; nothing outside a
//! scheduled tween can write to it.

use crate::param::{Param, ParamRef};
use crate::timeline::{SchedulerEvent, Sequence, SequenceId, TimelineScheduler};

/// Where the experience is in its enter/return cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionState {
    /// Calm resting state before entry.
    #[default]
    Idle,
    /// Enter sequence running.
    Entering,
    /// Through the portal.
    Entered,
    /// Return sequence running.
    Returning,
}

impl InteractionState {
    /// Whether a transition is running in this state.
    pub fn is_transition(self) -> bool {
        matches!(self, InteractionState::Entering | InteractionState::Returning)
    }
}

/// Builds the sequences played on each transition.
///
/// The sequence receives a handle to the progress param and is expected to
/// tween it (towards 1 on enter, towards 0 on return). It may animate any
/// other param as well.
pub trait TransitionScript {
    fn enter_sequence(&self, progress: ParamRef) -> Sequence;
    fn return_sequence(&self, progress: ParamRef) -> Sequence;
}

/// Discrete state plus the continuous progress scalar.
#[derive(Debug)]
pub struct InteractionStateMachine {
    state: InteractionState,
    progress: Param,
    in_flight: Option<SequenceId>,
}

impl InteractionStateMachine {
    /// Idle, progress 0.
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            progress: Param::bounded(0.0, 0.0, 1.0),
            in_flight: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Progress in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress.get()
    }

    /// Read-only handle to progress (writes are crate-private).
    pub fn progress_handle(&self) -> ParamRef {
        self.progress.handle()
    }

    /// Whether a transition sequence is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start the enter transition. Returns `false` if the trigger was ignored.
    pub fn trigger_enter<S>(&mut self, scheduler: &mut TimelineScheduler, script: &S) -> bool
    where
        S: TransitionScript + ?Sized,
    {
        if !self.accepts(InteractionState::Idle, "enter") {
            return false;
        }
        let sequence = script.enter_sequence(self.progress.handle());
        self.begin(InteractionState::Entering, scheduler.play(sequence));
        true
    }

    /// Start the return transition. Returns `false` if the trigger was ignored.
    pub fn trigger_return<S>(&mut self, scheduler: &mut TimelineScheduler, script: &S) -> bool
    where
        S: TransitionScript + ?Sized,
    {
        if !self.accepts(InteractionState::Entered, "return") {
            return false;
        }
        let sequence = script.return_sequence(self.progress.handle());
        self.begin(InteractionState::Returning, scheduler.play(sequence));
        true
    }

    /// Finalize the running transition when its sequence ends.
    ///
    /// Events for other sequences are ignored. Returns the new state if the
    /// event finalized a transition.
    pub fn on_scheduler_event(&mut self, event: &SchedulerEvent) -> Option<InteractionState> {
        let (id, aborted) = match event {
            SchedulerEvent::Completed(id) => (*id, false),
            SchedulerEvent::Aborted(id) => (*id, true),
            SchedulerEvent::Cue(_) => return None,
        };
        if self.in_flight != Some(id) {
            return None;
        }

        let next = match self.state {
            InteractionState::Entering => InteractionState::Entered,
            InteractionState::Returning => InteractionState::Idle,
            // in_flight is only set alongside a transition state
            other => other,
        };
        if aborted {
            log::warn!(
                "interaction: {:?} sequence aborted, finalizing to {:?}",
                self.state,
                next
            );
        } else {
            log::info!("interaction: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        self.in_flight = None;
        Some(next)
    }

    fn accepts(&self, from: InteractionState, trigger: &str) -> bool {
        if self.in_flight.is_some() || self.state != from {
            log::debug!(
                "interaction: {} ignored in {:?}{}",
                trigger,
                self.state,
                if self.in_flight.is_some() {
                    " (transition in flight)"
                } else {
                    ""
                }
            );
            return false;
        }
        true
    }

    fn begin(&mut self, state: InteractionState, id: SequenceId) {
        log::info!("interaction: {:?} -> {:?}", self.state, state);
        self.state = state;
        self.in_flight = Some(id);
    }
}

impl Default for InteractionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Ease;
    use crate::param::Param;

    struct Linear {
        duration: f32,
    }

    impl TransitionScript for Linear {
        fn enter_sequence(&self, progress: ParamRef) -> Sequence {
            Sequence::new("enter").to(&progress, 0.0, self.duration, 1.0, Ease::Linear)
        }

        fn return_sequence(&self, progress: ParamRef) -> Sequence {
            Sequence::new("return").to(&progress, 0.0, self.duration, 0.0, Ease::Linear)
        }
    }

    fn pump(
        machine: &mut InteractionStateMachine,
        scheduler: &mut TimelineScheduler,
        seconds: f32,
    ) {
        for _ in 0..(seconds * 10.0).round() as usize {
            for event in scheduler.tick(0.1) {
                machine.on_scheduler_event(&event);
            }
        }
    }

    #[test]
    fn test_full_cycle() {
        let script = Linear { duration: 1.0 };
        let mut machine = InteractionStateMachine::new();
        let mut scheduler = TimelineScheduler::new();

        assert!(machine.trigger_enter(&mut scheduler, &script));
        assert_eq!(machine.state(), InteractionState::Entering);
        pump(&mut machine, &mut scheduler, 1.2);
        assert_eq!(machine.state(), InteractionState::Entered);
        assert_eq!(machine.progress(), 1.0);

        assert!(machine.trigger_return(&mut scheduler, &script));
        assert_eq!(machine.state(), InteractionState::Returning);
        pump(&mut machine, &mut scheduler, 1.2);
        assert_eq!(machine.state(), InteractionState::Idle);
        assert_eq!(machine.progress(), 0.0);
    }

    #[test]
    fn test_triggers_outside_their_state_are_ignored() {
        let script = Linear { duration: 1.0 };
        let mut machine = InteractionStateMachine::new();
        let mut scheduler = TimelineScheduler::new();

        assert!(!machine.trigger_return(&mut scheduler, &script));
        assert!(scheduler.is_empty());

        assert!(machine.trigger_enter(&mut scheduler, &script));
        assert!(!machine.trigger_enter(&mut scheduler, &script));
        assert!(!machine.trigger_return(&mut scheduler, &script));
        assert_eq!(scheduler.len(), 1);

        pump(&mut machine, &mut scheduler, 1.2);
        assert!(!machine.trigger_enter(&mut scheduler, &script));
        assert_eq!(machine.state(), InteractionState::Entered);
    }

    #[test]
    fn test_foreign_completion_is_ignored() {
        let script = Linear { duration: 1.0 };
        let mut machine = InteractionStateMachine::new();
        let mut scheduler = TimelineScheduler::new();

        let other = Param::new(0.0);
        scheduler.play(Sequence::new("other").to(&other.handle(), 0.0, 0.1, 1.0, Ease::Linear));
        machine.trigger_enter(&mut scheduler, &script);

        pump(&mut machine, &mut scheduler, 0.5);
        assert_eq!(machine.state(), InteractionState::Entering);
        assert!(machine.is_transitioning());
    }

    #[test]
    fn test_aborted_transition_still_finalizes() {
        struct Fragile(std::cell::RefCell<Option<Param>>);

        impl TransitionScript for Fragile {
            fn enter_sequence(&self, progress: ParamRef) -> Sequence {
                let victim = Param::new(0.0);
                let seq = Sequence::new("enter")
                    .to(&progress, 0.0, 1.0, 1.0, Ease::Linear)
                    .to(&victim.handle(), 0.5, 1.0, 1.0, Ease::Linear);
                *self.0.borrow_mut() = Some(victim);
                seq
            }

            fn return_sequence(&self, progress: ParamRef) -> Sequence {
                Sequence::new("return").to(&progress, 0.0, 1.0, 0.0, Ease::Linear)
            }
        }

        let script = Fragile(std::cell::RefCell::new(None));
        let mut machine = InteractionStateMachine::new();
        let mut scheduler = TimelineScheduler::new();
        machine.trigger_enter(&mut scheduler, &script);

        pump(&mut machine, &mut scheduler, 0.2);
        script.0.borrow_mut().take();
        pump(&mut machine, &mut scheduler, 1.0);

        assert_eq!(machine.state(), InteractionState::Entered);
        assert!(!machine.is_transitioning());
        let p = machine.progress();
        assert!((0.0..=1.0).contains(&p));
    }
}
