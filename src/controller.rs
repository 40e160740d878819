use crate::{
    confirmation::{
        fetch_with_fallback, wait_for_deadline, ConfirmationController, ConfirmationOutput,
        ConfirmationPhase, FetchOutcome,
    },
    levels::{step_down, step_up},
    metrics::remaining_time,
    provider::SnapshotProvider,
    safety::force_fail_safe,
    state::WidgetStore,
    system::{ViewChannel, WidgetCommand, WidgetCommandChannel},
    types::{Mode, WidgetId},
    view::WidgetView,
};
use core::pin::pin;
use embassy_futures::select::{select3, Either3};
use embassy_time::{Duration, Instant};
use log::{debug, info, warn};

/// Where the remaining-time label comes from
#[derive(Debug, Clone, PartialEq)]
pub enum TimeLeftDisplay {
    // Coarse estimate from the current intensity
    Estimate,
    // Hours reported by the last adopted snapshot
    Reported(f32),
    // Fail-safe engaged, nothing trustworthy to show
    Unavailable,
}

/// Applies user actions for one widget against the shared store and feeds
/// them to the widget's confirmation state machine.
pub struct WidgetController {
    id: WidgetId,
    store: WidgetStore,
    confirmation: ConfirmationController,
    time_left: TimeLeftDisplay,
    fetch_timeout: Duration,
}

impl WidgetController {
    pub fn new(
        id: WidgetId,
        store: WidgetStore,
        fetch_timeout: Duration,
        guard_timeout: Duration,
    ) -> Self {
        Self {
            id,
            store,
            confirmation: ConfirmationController::new(guard_timeout),
            time_left: TimeLeftDisplay::Estimate,
            fetch_timeout,
        }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn phase(&self) -> ConfirmationPhase {
        self.confirmation.phase()
    }

    pub fn guard_deadline(&self) -> Option<Instant> {
        self.confirmation.guard_deadline()
    }

    pub fn time_left(&self) -> &TimeLeftDisplay {
        &self.time_left
    }

    /// Steps up to the next breakpoint, saturating at 100.
    pub async fn increase(&mut self) {
        let current = self.store.get_intensity(&self.id).await;
        let target = step_up(current);
        info!("{}: increasing intensity to {}", self.id, target);
        self.apply_intensity(current, target).await;
        self.local_change();
    }

    /// Steps down to the previous breakpoint, saturating at 0.
    pub async fn decrease(&mut self) {
        let current = self.store.get_intensity(&self.id).await;
        let target = step_down(current);
        info!("{}: decreasing intensity to {}", self.id, target);
        self.apply_intensity(current, target).await;
        self.local_change();
    }

    /// Returns false when ignored: modes are disabled at zero intensity.
    pub async fn toggle_mode_request(&mut self, mode: Mode) -> bool {
        if self.store.get_intensity(&self.id).await == 0 {
            debug!("{}: ignoring {} toggle at zero intensity", self.id, mode.display_name());
            return false;
        }

        self.store.toggle_mode(&self.id, mode).await;
        self.local_change();
        true
    }

    pub async fn handle_command(&mut self, command: WidgetCommand) {
        match command {
            WidgetCommand::Increase => self.increase().await,
            WidgetCommand::Decrease => self.decrease().await,
            WidgetCommand::ToggleMode(mode) => {
                self.toggle_mode_request(mode).await;
            }
        }
    }

    /// Adopts the winner of the initial fetch race.
    pub async fn adopt_snapshot(&mut self, outcome: FetchOutcome) {
        for output in self.confirmation.snapshot_arrived() {
            match output {
                ConfirmationOutput::ApplySnapshot => {
                    let snapshot = &outcome.snapshot;
                    info!(
                        "{}: adopting {:?} snapshot ({}%, {}h left)",
                        self.id, outcome.source, snapshot.brightness, snapshot.time_left
                    );
                    self.store.set_intensity(&self.id, snapshot.brightness).await;
                    self.store.set_mode_state(&self.id, snapshot.modes()).await;
                    self.time_left = TimeLeftDisplay::Reported(snapshot.time_left);
                }
                ConfirmationOutput::DiscardSnapshot => {
                    warn!(
                        "{}: {:?} snapshot arrived after fail-safe, keeping fail-safe state",
                        self.id, outcome.source
                    );
                }
                ConfirmationOutput::GuardCancelled => {
                    debug!("{}: pending local change confirmed", self.id);
                }
                _ => {}
            }
        }
    }

    /// Checks the guard deadline against `now`; forces the fail-safe state
    /// when it has passed.
    pub async fn poll_guard(&mut self, now: Instant) {
        for output in self.confirmation.guard_tick(now) {
            if let ConfirmationOutput::ForceFailSafe = output {
                force_fail_safe(&self.store, &self.id).await;
                self.time_left = TimeLeftDisplay::Unavailable;
            }
        }
    }

    pub fn remaining_time_label(&self, intensity: u8) -> String {
        match self.time_left {
            TimeLeftDisplay::Estimate => remaining_time(intensity).label().to_string(),
            TimeLeftDisplay::Reported(hours) => format!("{} hours", hours),
            TimeLeftDisplay::Unavailable => "N/A".to_string(),
        }
    }

    pub async fn view(&self) -> WidgetView {
        let record = self.store.get(&self.id).await;
        WidgetView::new(
            self.id.clone(),
            record,
            self.remaining_time_label(record.intensity),
            self.phase(),
        )
    }

    /// Runs the unconfirmed phase: races the initial fetch against its
    /// fallback while applying user commands and guard expiries. Returns once
    /// the fetch race has settled.
    pub async fn run_until_confirmed<P: SnapshotProvider>(
        &mut self,
        provider: &P,
        commands: &WidgetCommandChannel,
        views: &ViewChannel,
    ) {
        let mut initial = pin!(fetch_with_fallback(provider, self.fetch_timeout));

        loop {
            let deadline = self.confirmation.guard_deadline();

            match select3(initial.as_mut(), commands.receive(), wait_for_deadline(deadline)).await {
                Either3::First(outcome) => {
                    self.adopt_snapshot(outcome).await;
                    self.publish(views).await;
                    return;
                }
                Either3::Second(command) => {
                    self.handle_command(command).await;
                    self.publish(views).await;
                }
                Either3::Third(now) => {
                    self.poll_guard(now).await;
                    self.publish(views).await;
                }
            }
        }
    }

    /// Widget lifecycle. The fetch race runs once; afterwards commands are
    /// applied directly.
    pub async fn run<P: SnapshotProvider>(
        &mut self,
        provider: &P,
        commands: &WidgetCommandChannel,
        views: &ViewChannel,
    ) -> ! {
        self.publish(views).await;
        self.run_until_confirmed(provider, commands, views).await;

        info!("{}: confirmed, applying changes directly", self.id);
        loop {
            let command = commands.receive().await;
            self.handle_command(command).await;
            self.publish(views).await;
        }
    }

    // Zero intensity clears modes, but only on the nonzero -> zero edge.
    // A saturated step leaves the remaining-time source alone.
    async fn apply_intensity(&mut self, current: u8, target: u8) {
        self.store.set_intensity(&self.id, target).await;
        if current == target {
            return;
        }
        if current != 0 && target == 0 {
            self.store.reset_modes(&self.id).await;
        }
        self.time_left = TimeLeftDisplay::Estimate;
    }

    fn local_change(&mut self) {
        for output in self.confirmation.local_change(Instant::now()) {
            if let ConfirmationOutput::GuardArmed { deadline } = output {
                debug!(
                    "{}: awaiting confirmation until {}ms",
                    self.id,
                    deadline.as_millis()
                );
            }
        }
    }

    async fn publish(&self, views: &ViewChannel) {
        let view = self.view().await;
        if views.try_send(view).is_err() {
            debug!("{}: view queue full, dropping update", self.id);
        }
    }
}
