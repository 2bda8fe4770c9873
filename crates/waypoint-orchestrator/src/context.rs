//! The navigation context handed to dependent views.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, trace, warn};
use waypoint_core::phase::NavigationPhase;
use waypoint_preferences::{LastSection, PreferenceStore};
use waypoint_sections::{ScrollSpy, SectionRegistry};
use waypoint_timing::CompletionSignal;

use crate::orchestrator::PhaseOrchestrator;
use crate::views::{MenuKind, MenuView};

/// What a menu selection did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The table of contents started flying out toward the section.
    TransitionStarted,
    /// The page scrolled to the section.
    Scrolled,
    /// Nothing happened.
    Ignored,
}

/// Everything a menu needs, owned by the page shell and shared with views.
///
/// Views read from here and call back into it; they never touch the phase
/// directly.
#[derive(Clone)]
pub struct NavigationContext {
    orchestrator: PhaseOrchestrator,
    spy: ScrollSpy,
    preferences: Arc<PreferenceStore>,
    menu_ready: Arc<Mutex<Option<CompletionSignal>>>,
}

impl NavigationContext {
    /// Shares `orchestrator` and `spy` with the views. The overlay menu
    /// starts enabled.
    #[must_use]
    pub fn new(
        orchestrator: PhaseOrchestrator,
        spy: ScrollSpy,
        preferences: Arc<PreferenceStore>,
    ) -> Self {
        Self {
            orchestrator,
            spy,
            preferences,
            menu_ready: Arc::new(Mutex::new(None)),
        }
    }

    /// The phase orchestrator.
    #[must_use]
    pub fn orchestrator(&self) -> &PhaseOrchestrator {
        &self.orchestrator
    }

    /// The scroll-spy tracking the active section.
    #[must_use]
    pub fn spy(&self) -> &ScrollSpy {
        &self.spy
    }

    /// Sections mounted by the current page.
    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        self.spy.registry()
    }

    /// Disables the overlay menu until `ready` completes. Replaces any
    /// previous signal.
    pub fn attach_menu_ready(&self, ready: CompletionSignal) {
        *self.lock_menu_ready() = Some(ready);
    }

    /// Drops the overlay's readiness gate.
    pub fn detach_menu_ready(&self) {
        *self.lock_menu_ready() = None;
    }

    /// Whether the overlay menu is still waiting on its boot text.
    #[must_use]
    pub fn menu_disabled(&self) -> bool {
        self.lock_menu_ready()
            .as_ref()
            .is_some_and(|ready| !ready.is_complete())
    }

    /// Routes a menu selection.
    ///
    /// In the table of contents a selection starts the fly-out; once docked
    /// it scrolls directly. Unregistered ids and selections made while the
    /// menu is disabled or mid-transition are ignored.
    pub fn select(&self, id: &str) -> SelectOutcome {
        if !self.registry().contains(id) {
            warn!(section_id = id, "selection of unregistered section ignored");
            return SelectOutcome::Ignored;
        }
        match self.orchestrator.phase() {
            NavigationPhase::TableOfContents if self.menu_disabled() => {
                debug!(section_id = id, "menu still booting; selection ignored");
                SelectOutcome::Ignored
            }
            NavigationPhase::TableOfContents => {
                self.orchestrator.begin_transition(Some(id));
                SelectOutcome::TransitionStarted
            }
            NavigationPhase::Docked => match self.spy.scroll_to_section(id) {
                Ok(()) => SelectOutcome::Scrolled,
                Err(_) => SelectOutcome::Ignored,
            },
            phase => {
                debug!(section_id = id, %phase, "selection ignored in this phase");
                SelectOutcome::Ignored
            }
        }
    }

    /// Called when the fly-out animation finishes: docks, then scrolls to the
    /// pending target. The target is cleared whether or not the scroll
    /// succeeds.
    pub fn complete_transition(&self) {
        if self.orchestrator.phase() != NavigationPhase::Transitioning {
            debug!("no transition in flight");
            return;
        }
        self.orchestrator.finish_transition();
        let Some(target) = self.orchestrator.pending_target() else {
            return;
        };
        match self.spy.scroll_to_section(&target) {
            Ok(()) => {
                self.orchestrator.consume_pending_target(&target);
                info!(section_id = %target, "pending target reached");
            }
            Err(error) => {
                self.orchestrator.consume_pending_target(&target);
                warn!(section_id = %target, %error, "pending target unreachable; dropped");
            }
        }
    }

    /// Hover feedback. Cosmetic only.
    pub fn hover(&self, kind: MenuKind, id: &str) {
        trace!(?kind, section_id = id, "menu hover");
    }

    /// The last persisted section, if it belongs to the mounted page.
    #[must_use]
    pub fn continue_target(&self) -> Option<LastSection> {
        self.preferences
            .last_section()
            .filter(|last| self.registry().contains(&last.id))
    }

    /// Renders the props for one menu.
    #[must_use]
    pub fn menu_view(&self, kind: MenuKind) -> MenuView {
        let snapshot = self.orchestrator.snapshot();
        let active = self.spy.active_section_id();
        let registry = self.registry();
        MenuView::build(
            kind,
            &snapshot,
            registry.sections(),
            &active,
            self.menu_disabled(),
            self.continue_target(),
        )
    }

    fn lock_menu_ready(&self) -> std::sync::MutexGuard<'_, Option<CompletionSignal>> {
        self.menu_ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationContext")
            .field("orchestrator", &self.orchestrator)
            .field("spy", &self.spy)
            .finish_non_exhaustive()
    }
}
