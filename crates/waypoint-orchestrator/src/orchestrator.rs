//! The phase orchestrator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use waypoint_core::error::NavigationError;
use waypoint_core::phase::{NavigationPhase, PageContext};
use waypoint_preferences::PreferenceStore;
use waypoint_timing::{CompletionSignal, TimerScope, arm_fail_open};

use crate::transition::{NavigationCommand, next_phase};

/// Orchestrator timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrchestratorTimings {
    /// `Preload` is forced forward after this long if the intro never
    /// reports completion.
    #[serde(with = "waypoint_timing::millis")]
    pub preload_safety_timeout: Duration,
}

impl Default for OrchestratorTimings {
    fn default() -> Self {
        Self {
            preload_safety_timeout: Duration::from_secs(7),
        }
    }
}

/// What dependent views render from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationSnapshot {
    /// Current phase.
    pub phase: NavigationPhase,
    /// Section to scroll to once the fly-out finishes.
    pub pending_target: Option<String>,
    /// Current route context.
    pub context: PageContext,
}

/// Chooses the phase a page load starts in.
///
/// Only a first visit to the home route without a deep link plays the intro.
#[must_use]
pub fn initial_phase(context: PageContext, docked: bool, has_deep_link: bool) -> NavigationPhase {
    if !context.is_home_route || docked || has_deep_link {
        NavigationPhase::Docked
    } else {
        NavigationPhase::Preload
    }
}

#[derive(Debug)]
struct OrchestratorState {
    phase: NavigationPhase,
    pending_target: Option<String>,
    context: PageContext,
}

struct OrchestratorInner {
    state: Mutex<OrchestratorState>,
    snapshots: watch::Sender<NavigationSnapshot>,
    preferences: Arc<PreferenceStore>,
    intro_done: CompletionSignal,
    timers: TimerScope,
    timings: OrchestratorTimings,
}

/// The navigation state machine.
///
/// Cloning yields another handle to the same instance. Every operation is
/// synchronous and never fails: calls the transition table rejects are
/// ignored (and logged in debug builds).
#[derive(Clone)]
pub struct PhaseOrchestrator {
    inner: Arc<OrchestratorInner>,
}

impl PhaseOrchestrator {
    /// Creates the orchestrator for a page load.
    #[must_use]
    pub fn new(
        context: PageContext,
        has_deep_link: bool,
        preferences: Arc<PreferenceStore>,
        timings: OrchestratorTimings,
    ) -> Self {
        let docked = preferences.is_docked();
        let phase = initial_phase(context, docked, has_deep_link);
        info!(
            %phase,
            docked,
            has_deep_link,
            home = context.is_home_route,
            "navigation initialised"
        );

        let intro_done = CompletionSignal::new();
        if phase != NavigationPhase::Preload {
            intro_done.complete();
        }
        let state = OrchestratorState {
            phase,
            pending_target: None,
            context,
        };
        let (snapshots, _rx) = watch::channel(snapshot_of(&state));
        Self {
            inner: Arc::new(OrchestratorInner {
                state: Mutex::new(state),
                snapshots,
                preferences,
                intro_done,
                timers: TimerScope::new(),
                timings,
            }),
        }
    }

    /// Arms the preload safety timeout. If it cannot be armed the intro is
    /// skipped rather than risk a page stuck on it.
    pub fn activate(&self) {
        if self.phase() != NavigationPhase::Preload {
            return;
        }
        let weak: Weak<OrchestratorInner> = Arc::downgrade(&self.inner);
        let armed = arm_fail_open(
            &self.inner.timers,
            &self.inner.intro_done,
            self.inner.timings.preload_safety_timeout,
            "preload",
            move || {
                if let Some(inner) = weak.upgrade() {
                    PhaseOrchestrator { inner }.finish_intro();
                }
            },
        );
        if let Err(error) = armed {
            warn!(%error, "preload safety timeout unavailable; skipping intro");
            self.finish_intro();
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> NavigationPhase {
        self.lock().phase
    }

    /// Section to scroll to once the fly-out finishes.
    #[must_use]
    pub fn pending_target(&self) -> Option<String> {
        self.lock().pending_target.clone()
    }

    /// Current route context.
    #[must_use]
    pub fn context(&self) -> PageContext {
        self.lock().context
    }

    /// Current phase, pending target and context together.
    #[must_use]
    pub fn snapshot(&self) -> NavigationSnapshot {
        snapshot_of(&self.lock())
    }

    /// Receives a snapshot after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NavigationSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// `Preload → TableOfContents`. Idempotent.
    pub fn finish_intro(&self) {
        self.dispatch(NavigationCommand::FinishIntro, None);
    }

    /// `TableOfContents → Transitioning`, recording `target` as the pending
    /// scroll target (replacing any previous one).
    pub fn begin_transition(&self, target: Option<&str>) {
        self.dispatch(NavigationCommand::BeginTransition, target.map(str::to_owned));
    }

    /// `Transitioning → Docked`, persisting the docked flag.
    pub fn finish_transition(&self) {
        if self
            .dispatch(NavigationCommand::FinishTransition, None)
            .is_some()
        {
            self.inner.preferences.set_docked(true);
        }
    }

    /// Direct docked toggle for flows outside the intro. Always persists;
    /// undocking shows the table of contents again only on the home route.
    pub fn set_docked(&self, docked: bool) {
        self.inner.preferences.set_docked(docked);
        self.dispatch(NavigationCommand::SetDocked(docked), None);
    }

    /// Applies a route change. Leaving home docks immediately from any
    /// phase and drops the pending target.
    #[instrument(skip(self))]
    pub fn route_changed(&self, context: PageContext) {
        let snapshot = {
            let mut state = self.lock();
            if state.context == context {
                return;
            }
            state.context = context;
            snapshot_of(&state)
        };
        if context.is_home_route {
            self.inner.snapshots.send_replace(snapshot);
        } else {
            self.dispatch(NavigationCommand::LeaveHome, None);
        }
    }

    /// Clears the pending target if it is `id`. Returns whether it was.
    pub fn consume_pending_target(&self, id: &str) -> bool {
        let snapshot = {
            let mut state = self.lock();
            if state.pending_target.as_deref() != Some(id) {
                return false;
            }
            state.pending_target = None;
            snapshot_of(&state)
        };
        self.inner.snapshots.send_replace(snapshot);
        true
    }

    /// Runs `command` through the transition table. Returns the new phase,
    /// or `None` if the command was rejected.
    fn dispatch(
        &self,
        command: NavigationCommand,
        target: Option<String>,
    ) -> Option<NavigationPhase> {
        let (from, to, snapshot) = {
            let mut state = self.lock();
            let from = state.phase;
            let to = match next_phase(from, command, state.context.is_home_route) {
                Ok(to) => to,
                Err(error) => {
                    drop(state);
                    log_rejected(&error);
                    return None;
                }
            };
            state.phase = to;
            // Only a finished fly-out hands its target on; every other
            // accepted command drops it.
            match command {
                NavigationCommand::BeginTransition => state.pending_target = target,
                NavigationCommand::FinishTransition => {}
                _ => state.pending_target = None,
            }
            (from, to, snapshot_of(&state))
        };

        if from == NavigationPhase::Preload && to != NavigationPhase::Preload {
            self.inner.intro_done.complete();
            self.inner.timers.cancel_all();
        }
        if from != to {
            info!(%from, %to, operation = command.operation(), "navigation phase changed");
        }
        self.inner.snapshots.send_replace(snapshot);
        Some(to)
    }

    fn lock(&self) -> MutexGuard<'_, OrchestratorState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PhaseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseOrchestrator")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

fn snapshot_of(state: &OrchestratorState) -> NavigationSnapshot {
    NavigationSnapshot {
        phase: state.phase,
        pending_target: state.pending_target.clone(),
        context: state.context,
    }
}

fn log_rejected(error: &NavigationError) {
    if cfg!(debug_assertions) {
        debug!(%error, "ignoring navigation command");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use waypoint_preferences::DOCKED_KEY;
    use waypoint_test_support::RecordingStore;

    use super::*;

    const HOME: PageContext = PageContext {
        is_home_route: true,
        supports_overlay_nav: true,
    };
    const GUIDE: PageContext = PageContext {
        is_home_route: false,
        supports_overlay_nav: true,
    };

    fn orchestrator_with(
        backend: &Arc<RecordingStore>,
        context: PageContext,
        deep_link: bool,
    ) -> PhaseOrchestrator {
        PhaseOrchestrator::new(
            context,
            deep_link,
            Arc::new(PreferenceStore::new(backend.clone())),
            OrchestratorTimings::default(),
        )
    }

    fn fresh_home() -> (PhaseOrchestrator, Arc<RecordingStore>) {
        let backend = Arc::new(RecordingStore::new());
        (orchestrator_with(&backend, HOME, false), backend)
    }

    #[test]
    fn test_initial_phase_selection() {
        assert_eq!(initial_phase(HOME, false, false), NavigationPhase::Preload);
        assert_eq!(initial_phase(HOME, true, false), NavigationPhase::Docked);
        assert_eq!(initial_phase(HOME, false, true), NavigationPhase::Docked);
        assert_eq!(initial_phase(GUIDE, false, false), NavigationPhase::Docked);
    }

    #[test]
    fn test_persisted_docked_skips_intro() {
        let backend = Arc::new(RecordingStore::with_entries(&[(DOCKED_KEY, "1")]));

        let orchestrator = orchestrator_with(&backend, HOME, false);
        orchestrator.finish_intro();
        orchestrator.begin_transition(Some("overview"));

        assert_eq!(orchestrator.phase(), NavigationPhase::Docked);
        assert_eq!(orchestrator.pending_target(), None);
    }

    #[test]
    fn test_finish_intro_is_idempotent() {
        let (orchestrator, _) = fresh_home();

        orchestrator.finish_intro();
        orchestrator.finish_intro();

        assert_eq!(orchestrator.phase(), NavigationPhase::TableOfContents);
    }

    #[test]
    fn test_selection_then_fly_out_docks_and_persists() {
        // Arrange
        let (orchestrator, backend) = fresh_home();
        orchestrator.finish_intro();

        // Act
        orchestrator.begin_transition(Some("overview"));
        let during = orchestrator.snapshot();
        orchestrator.finish_transition();

        // Assert
        assert_eq!(during.phase, NavigationPhase::Transitioning);
        assert_eq!(during.pending_target.as_deref(), Some("overview"));
        assert_eq!(orchestrator.phase(), NavigationPhase::Docked);
        assert_eq!(backend.value(DOCKED_KEY).as_deref(), Some("1"));
        assert_eq!(orchestrator.pending_target().as_deref(), Some("overview"));
    }

    #[test]
    fn test_begin_transition_ignored_outside_toc() {
        let (orchestrator, _) = fresh_home();

        orchestrator.begin_transition(Some("overview"));

        assert_eq!(orchestrator.phase(), NavigationPhase::Preload);
        assert_eq!(orchestrator.pending_target(), None);
    }

    #[test]
    fn test_finish_transition_ignored_outside_transitioning() {
        let (orchestrator, backend) = fresh_home();
        orchestrator.finish_intro();

        orchestrator.finish_transition();

        assert_eq!(orchestrator.phase(), NavigationPhase::TableOfContents);
        assert!(backend.writes_to(DOCKED_KEY).is_empty());
    }

    #[test]
    fn test_leaving_home_mid_transition_docks_and_drops_target() {
        // Arrange
        let (orchestrator, backend) = fresh_home();
        orchestrator.finish_intro();
        orchestrator.begin_transition(Some("overview"));

        // Act
        orchestrator.route_changed(GUIDE);

        // Assert
        assert_eq!(orchestrator.phase(), NavigationPhase::Docked);
        assert_eq!(orchestrator.pending_target(), None);
        assert!(backend.writes_to(DOCKED_KEY).is_empty());
    }

    #[test]
    fn test_leaving_home_from_every_phase_docks_synchronously() {
        for steps in 0..4 {
            let (orchestrator, _) = fresh_home();
            if steps >= 1 {
                orchestrator.finish_intro();
            }
            if steps >= 2 {
                orchestrator.begin_transition(Some("a"));
            }
            if steps >= 3 {
                orchestrator.finish_transition();
            }

            orchestrator.route_changed(GUIDE);

            assert_eq!(orchestrator.phase(), NavigationPhase::Docked);
        }
    }

    #[test]
    fn test_returning_home_stays_docked() {
        let (orchestrator, _) = fresh_home();
        orchestrator.route_changed(GUIDE);

        orchestrator.route_changed(HOME);

        assert_eq!(orchestrator.phase(), NavigationPhase::Docked);
        assert!(orchestrator.context().is_home_route);
    }

    #[test]
    fn test_new_selection_overwrites_pending_target() {
        let (orchestrator, _) = fresh_home();
        orchestrator.finish_intro();
        orchestrator.begin_transition(Some("a"));
        orchestrator.set_docked(false);
        orchestrator.set_docked(true);
        orchestrator.set_docked(false);

        orchestrator.begin_transition(Some("b"));

        assert_eq!(orchestrator.pending_target().as_deref(), Some("b"));
    }

    #[test]
    fn test_docking_mid_transition_drops_target() {
        let (orchestrator, _) = fresh_home();
        orchestrator.finish_intro();
        orchestrator.begin_transition(Some("overview"));

        orchestrator.set_docked(true);

        assert_eq!(orchestrator.phase(), NavigationPhase::Docked);
        assert_eq!(orchestrator.pending_target(), None);
        assert_eq!(orchestrator.snapshot().pending_target, None);
    }

    #[test]
    fn test_undock_to_toc_drops_unconsumed_target() {
        // Arrange
        let (orchestrator, _) = fresh_home();
        orchestrator.finish_intro();
        orchestrator.begin_transition(Some("overview"));
        orchestrator.finish_transition();
        let after_fly_out = orchestrator.pending_target();

        // Act
        orchestrator.set_docked(false);

        // Assert
        assert_eq!(after_fly_out.as_deref(), Some("overview"));
        assert_eq!(orchestrator.phase(), NavigationPhase::TableOfContents);
        assert_eq!(orchestrator.pending_target(), None);
    }

    #[test]
    fn test_set_docked_persists_and_undock_returns_to_toc_on_home() {
        let (orchestrator, backend) = fresh_home();

        orchestrator.set_docked(true);
        let docked_phase = orchestrator.phase();
        orchestrator.set_docked(false);

        assert_eq!(docked_phase, NavigationPhase::Docked);
        assert_eq!(orchestrator.phase(), NavigationPhase::TableOfContents);
        assert_eq!(
            backend.writes_to(DOCKED_KEY),
            vec![Some("1".to_owned()), None]
        );
    }

    #[test]
    fn test_undock_off_home_only_persists() {
        let backend = Arc::new(RecordingStore::new());
        let orchestrator = orchestrator_with(&backend, GUIDE, false);

        orchestrator.set_docked(false);

        assert_eq!(orchestrator.phase(), NavigationPhase::Docked);
        assert_eq!(backend.writes_to(DOCKED_KEY), vec![None]);
    }

    #[test]
    fn test_consume_pending_target_only_matching_id() {
        let (orchestrator, _) = fresh_home();
        orchestrator.finish_intro();
        orchestrator.begin_transition(Some("overview"));

        assert!(!orchestrator.consume_pending_target("other"));
        assert!(orchestrator.consume_pending_target("overview"));
        assert_eq!(orchestrator.pending_target(), None);
    }

    #[test]
    fn test_subscribers_observe_each_phase() {
        let (orchestrator, _) = fresh_home();
        let rx = orchestrator.subscribe();

        orchestrator.finish_intro();

        assert_eq!(rx.borrow().phase, NavigationPhase::TableOfContents);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safety_timeout_forces_toc_when_intro_never_reports() {
        // Arrange
        let (orchestrator, _) = fresh_home();
        orchestrator.activate();

        // Act
        tokio::time::sleep(Duration::from_millis(6_990)).await;
        let before = orchestrator.phase();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Assert
        assert_eq!(before, NavigationPhase::Preload);
        assert_eq!(orchestrator.phase(), NavigationPhase::TableOfContents);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safety_timeout_stands_down_after_intro() {
        let (orchestrator, _) = fresh_home();
        orchestrator.activate();
        let rx = orchestrator.subscribe();

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        orchestrator.finish_intro();
        orchestrator.begin_transition(Some("a"));
        orchestrator.finish_transition();
        orchestrator.set_docked(false);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(orchestrator.phase(), NavigationPhase::TableOfContents);
        assert_eq!(rx.borrow().pending_target, None);
    }

    #[test]
    fn test_activate_without_runtime_skips_intro() {
        let (orchestrator, _) = fresh_home();

        orchestrator.activate();

        assert_eq!(orchestrator.phase(), NavigationPhase::TableOfContents);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            FinishIntro,
            Select(u8),
            FinishTransition,
            SetDocked(bool),
            Route(bool),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::FinishIntro),
                (0u8..3).prop_map(Op::Select),
                Just(Op::FinishTransition),
                any::<bool>().prop_map(Op::SetDocked),
                any::<bool>().prop_map(Op::Route),
            ]
        }

        proptest! {
            #[test]
            fn phase_and_target_invariants_hold(
                docked in any::<bool>(),
                ops in prop::collection::vec(op(), 0..40),
            ) {
                let entries: &[(&str, &str)] = if docked { &[(DOCKED_KEY, "1")] } else { &[] };
                let backend = Arc::new(RecordingStore::with_entries(entries));
                let orchestrator = orchestrator_with(&backend, HOME, false);
                let mut seen = vec![orchestrator.phase()];

                for op in ops {
                    let before = orchestrator.phase();
                    match &op {
                        Op::FinishIntro => orchestrator.finish_intro(),
                        Op::Select(n) => orchestrator.begin_transition(Some(&format!("s{n}"))),
                        Op::FinishTransition => orchestrator.finish_transition(),
                        Op::SetDocked(d) => orchestrator.set_docked(*d),
                        Op::Route(home) => orchestrator.route_changed(if *home { HOME } else { GUIDE }),
                    }
                    let after = orchestrator.phase();
                    seen.push(after);

                    if after == NavigationPhase::Transitioning && before != NavigationPhase::Transitioning {
                        prop_assert_eq!(before, NavigationPhase::TableOfContents);
                        prop_assert!(matches!(op, Op::Select(_)));
                    }
                    if !orchestrator.context().is_home_route {
                        prop_assert!(!after.is_home_only());
                    }
                    if after == NavigationPhase::TableOfContents || matches!(op, Op::SetDocked(true)) {
                        prop_assert_eq!(orchestrator.pending_target(), None);
                    }
                }

                if docked {
                    prop_assert!(!seen.contains(&NavigationPhase::Preload));
                }
            }
        }
    }
}
