//! Per-widget confirmation state machine
//! States: Unconfirmed { Idle, AwaitingAck }, Confirmed

use super::guard::GuardTimer;
use embassy_time::{Duration, Instant};
use heapless::Vec;
use log::{debug, info, warn};
use serde::Serialize;
use statig::prelude::*;

// Input events to the state machine
#[derive(Debug, Clone)]
pub enum ConfirmationInput {
    // User changed intensity or mode locally
    LocalChange { at: Instant },
    // Initial fetch race settled (remote answer or fallback)
    SnapshotArrived,
    // Guard deadline may have passed
    GuardTick { now: Instant },
}

// Output events from the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationOutput {
    GuardArmed { deadline: Instant },
    GuardCancelled,
    ApplySnapshot,
    DiscardSnapshot,
    ForceFailSafe,
    PhaseChanged {
        from: ConfirmationPhase,
        to: ConfirmationPhase,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationPhase {
    Idle,
    AwaitingAck,
    Confirmed,
}

impl ConfirmationPhase {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmationPhase::Confirmed)
    }
}

pub const OUTPUT_CAPACITY: usize = 4;
pub type ConfirmationOutputs = Vec<ConfirmationOutput, OUTPUT_CAPACITY>;

#[derive(Debug)]
pub struct ConfirmationContext {
    guard: GuardTimer,
    guard_timeout: Duration,
    // Set when the guard forces the fail-safe state, cleared by the next change
    fail_safe_engaged: bool,
    outputs: ConfirmationOutputs,
}

impl ConfirmationContext {
    pub fn new(guard_timeout: Duration) -> Self {
        Self {
            guard: GuardTimer::new(),
            guard_timeout,
            fail_safe_engaged: false,
            outputs: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfirmationMachine;

#[state_machine(
    initial = "State::idle()",
    state(derive(Debug)),
    on_transition = "Self::on_transition"
)]
impl ConfirmationMachine {
    /// No local change is waiting for the backend
    #[state(superstate = "unconfirmed")]
    fn idle(context: &mut ConfirmationContext, event: &ConfirmationInput) -> Response<State> {
        use Response::*;

        match event {
            ConfirmationInput::LocalChange { at } => {
                Self::arm_guard(context, *at);
                Transition(State::awaiting_ack())
            }
            _ => Super,
        }
    }

    /// A local change is pending; the guard decays it to the fail-safe state
    #[state(superstate = "unconfirmed")]
    fn awaiting_ack(context: &mut ConfirmationContext, event: &ConfirmationInput) -> Response<State> {
        use Response::*;

        match event {
            ConfirmationInput::LocalChange { at } => {
                // Last write wins: the previous deadline is dropped
                Self::arm_guard(context, *at);
                Handled
            }
            ConfirmationInput::GuardTick { now } => {
                if context.guard.expired(*now) {
                    context.guard.cancel();
                    context.fail_safe_engaged = true;
                    warn!("Local change never confirmed - forcing fail-safe state");
                    let _ = context.outputs.push(ConfirmationOutput::ForceFailSafe);
                    Transition(State::idle())
                } else {
                    Handled
                }
            }
            _ => Super,
        }
    }

    #[superstate]
    fn unconfirmed(context: &mut ConfirmationContext, event: &ConfirmationInput) -> Response<State> {
        use Response::*;

        match event {
            ConfirmationInput::SnapshotArrived => {
                if context.guard.cancel() {
                    let _ = context.outputs.push(ConfirmationOutput::GuardCancelled);
                }
                if context.fail_safe_engaged {
                    // The fail-safe write already landed; no retroactive undo
                    let _ = context.outputs.push(ConfirmationOutput::DiscardSnapshot);
                } else {
                    let _ = context.outputs.push(ConfirmationOutput::ApplySnapshot);
                }
                Transition(State::confirmed())
            }
            _ => Handled,
        }
    }

    /// Terminal. Local changes apply directly and arm nothing.
    #[state]
    fn confirmed(event: &ConfirmationInput) -> Response<State> {
        use Response::*;

        if let ConfirmationInput::SnapshotArrived = event {
            debug!("Snapshot after confirmation ignored");
        }
        Handled
    }
}

impl ConfirmationMachine {
    fn on_transition(&mut self, source: &State, target: &State) {
        let source_phase = Self::state_to_phase(source);
        let target_phase = Self::state_to_phase(target);

        if source_phase != target_phase {
            debug!("Confirmation transition: {:?} -> {:?}", source_phase, target_phase);
        }
    }

    fn state_to_phase(state: &State) -> ConfirmationPhase {
        match state {
            State::Idle {} => ConfirmationPhase::Idle,
            State::AwaitingAck {} => ConfirmationPhase::AwaitingAck,
            State::Confirmed {} => ConfirmationPhase::Confirmed,
        }
    }

    fn arm_guard(context: &mut ConfirmationContext, at: Instant) {
        // A fresh pending change is confirmable again
        context.fail_safe_engaged = false;
        let deadline = context.guard.arm(at, context.guard_timeout);
        debug!("Guard armed for {}ms", context.guard_timeout.as_millis());
        let _ = context
            .outputs
            .push(ConfirmationOutput::GuardArmed { deadline });
    }
}

/// Owns the machine and its context for one widget.
pub struct ConfirmationController {
    machine: statig::prelude::StateMachine<ConfirmationMachine>,
    context: ConfirmationContext,
}

impl ConfirmationController {
    pub fn new(guard_timeout: Duration) -> Self {
        Self {
            machine: ConfirmationMachine::default().state_machine(),
            context: ConfirmationContext::new(guard_timeout),
        }
    }

    /// Process an input event and return output events
    pub fn handle_input(&mut self, input: ConfirmationInput) -> ConfirmationOutputs {
        self.context.outputs.clear();

        let previous_phase = self.phase();
        let _ = self.machine.handle_with_context(&input, &mut self.context);
        let new_phase = self.phase();

        if previous_phase != new_phase {
            info!("Confirmation phase: {:?} -> {:?}", previous_phase, new_phase);
            let _ = self.context.outputs.push(ConfirmationOutput::PhaseChanged {
                from: previous_phase,
                to: new_phase,
            });
        }

        std::mem::take(&mut self.context.outputs)
    }

    pub fn local_change(&mut self, at: Instant) -> ConfirmationOutputs {
        self.handle_input(ConfirmationInput::LocalChange { at })
    }

    pub fn snapshot_arrived(&mut self) -> ConfirmationOutputs {
        self.handle_input(ConfirmationInput::SnapshotArrived)
    }

    pub fn guard_tick(&mut self, now: Instant) -> ConfirmationOutputs {
        self.handle_input(ConfirmationInput::GuardTick { now })
    }

    pub fn phase(&self) -> ConfirmationPhase {
        ConfirmationMachine::state_to_phase(self.machine.state())
    }

    pub fn is_confirmed(&self) -> bool {
        self.phase().is_confirmed()
    }

    pub fn guard_deadline(&self) -> Option<Instant> {
        self.context.guard.deadline()
    }

    pub fn fail_safe_engaged(&self) -> bool {
        self.context.fail_safe_engaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn at(secs: u64) -> Instant {
        Instant::from_secs(secs)
    }

    #[test]
    fn test_starts_idle_without_guard() {
        let controller = ConfirmationController::new(TIMEOUT);
        assert_eq!(controller.phase(), ConfirmationPhase::Idle);
        assert_eq!(controller.guard_deadline(), None);
    }

    #[test]
    fn test_local_change_arms_guard() {
        let mut controller = ConfirmationController::new(TIMEOUT);
        let outputs = controller.local_change(at(1));

        assert!(outputs.contains(&ConfirmationOutput::GuardArmed { deadline: at(6) }));
        assert_eq!(controller.phase(), ConfirmationPhase::AwaitingAck);
        assert_eq!(controller.guard_deadline(), Some(at(6)));
    }

    #[test]
    fn test_rearm_keeps_single_deadline() {
        let mut controller = ConfirmationController::new(TIMEOUT);
        controller.local_change(at(1));
        controller.local_change(at(3));

        assert_eq!(controller.guard_deadline(), Some(at(8)));
        // The first deadline no longer fires
        let outputs = controller.guard_tick(at(6));
        assert!(!outputs.contains(&ConfirmationOutput::ForceFailSafe));
        assert_eq!(controller.phase(), ConfirmationPhase::AwaitingAck);
    }

    #[test]
    fn test_guard_expiry_forces_fail_safe() {
        let mut controller = ConfirmationController::new(TIMEOUT);
        controller.local_change(at(0));
        let outputs = controller.guard_tick(at(5));

        assert!(outputs.contains(&ConfirmationOutput::ForceFailSafe));
        assert_eq!(controller.phase(), ConfirmationPhase::Idle);
        assert_eq!(controller.guard_deadline(), None);
        assert!(controller.fail_safe_engaged());
    }

    #[test]
    fn test_snapshot_before_guard_cancels_it() {
        let mut controller = ConfirmationController::new(TIMEOUT);
        controller.local_change(at(0));
        let outputs = controller.snapshot_arrived();

        assert!(outputs.contains(&ConfirmationOutput::GuardCancelled));
        assert!(outputs.contains(&ConfirmationOutput::ApplySnapshot));
        assert!(controller.is_confirmed());
        assert_eq!(controller.guard_deadline(), None);

        let outputs = controller.guard_tick(at(10));
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_snapshot_after_fail_safe_is_discarded() {
        let mut controller = ConfirmationController::new(TIMEOUT);
        controller.local_change(at(0));
        controller.guard_tick(at(5));
        let outputs = controller.snapshot_arrived();

        assert!(outputs.contains(&ConfirmationOutput::DiscardSnapshot));
        assert!(!outputs.contains(&ConfirmationOutput::ApplySnapshot));
        assert!(controller.is_confirmed());
    }

    #[test]
    fn test_new_change_after_fail_safe_is_confirmable() {
        let mut controller = ConfirmationController::new(TIMEOUT);
        controller.local_change(at(0));
        controller.guard_tick(at(5));
        controller.local_change(at(6));
        assert!(!controller.fail_safe_engaged());

        let outputs = controller.snapshot_arrived();
        assert!(outputs.contains(&ConfirmationOutput::GuardCancelled));
        assert!(outputs.contains(&ConfirmationOutput::ApplySnapshot));
        assert!(!outputs.contains(&ConfirmationOutput::DiscardSnapshot));
    }

    #[test]
    fn test_confirmed_is_absorbing() {
        let mut controller = ConfirmationController::new(TIMEOUT);
        controller.snapshot_arrived();

        let outputs = controller.local_change(at(20));
        assert!(outputs.is_empty());
        assert_eq!(controller.guard_deadline(), None);

        let outputs = controller.snapshot_arrived();
        assert!(outputs.is_empty());
        assert!(controller.is_confirmed());
    }

    #[test]
    fn test_phase_change_reported() {
        let mut controller = ConfirmationController::new(TIMEOUT);
        let outputs = controller.snapshot_arrived();
        assert!(outputs.contains(&ConfirmationOutput::PhaseChanged {
            from: ConfirmationPhase::Idle,
            to: ConfirmationPhase::Confirmed,
        }));
    }
}
