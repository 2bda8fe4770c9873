//! The page shell: one navigation context per app load, pages mounted on
//! route changes, intro and boot controllers started from phase changes.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, instrument};
use waypoint_core::animation::RevealAnimation;
use waypoint_core::clock::{Clock, SystemClock};
use waypoint_core::error::NavigationError;
use waypoint_core::location::Location;
use waypoint_core::phase::{NavigationPhase, RoutePolicy};
use waypoint_core::store::KeyValueStore;
use waypoint_core::viewport::{MotionPreference, Viewport, VisibilityObserver};
use waypoint_intro::{BootSequence, IntroController, IntroStage};
use waypoint_orchestrator::{
    MenuKind, MenuView, NavigationContext, NavigationSnapshot, PhaseOrchestrator, SelectOutcome,
};
use waypoint_preferences::PreferenceStore;
use waypoint_sections::{
    ScrollSpy, ScrollSpyConfig, SectionMount, SectionRegistry, ViewportPorts, VisibilityBatch,
    VisibilityEntry,
};

use crate::command::ShellCommand;
use crate::config::{ShellConfig, Timings};
use crate::error::ShellError;
use crate::headless::{HeadlessMotion, HeadlessObserver, HeadlessViewport, TracingAnimation};
use crate::pages::PageCatalog;

/// Host collaborators the shell is wired to.
pub struct ShellPorts {
    /// Backing store for preferences.
    pub store: Arc<dyn KeyValueStore>,
    /// Timestamps for persisted sections.
    pub clock: Arc<dyn Clock>,
    /// Plays intro and boot-text cues.
    pub animation: Arc<dyn RevealAnimation>,
    /// Scrolls and rewrites the location fragment.
    pub viewport: Arc<dyn Viewport>,
    /// Reports which sections intersect the viewport.
    pub observer: Arc<dyn VisibilityObserver>,
    /// Motion preference; running controllers follow its changes.
    pub motion: Arc<HeadlessMotion>,
}

impl ShellPorts {
    /// Headless ports over `store`.
    #[must_use]
    pub fn headless(store: Arc<dyn KeyValueStore>, reduced_motion: bool) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            animation: Arc::new(TracingAnimation),
            viewport: Arc::new(HeadlessViewport::new()),
            observer: Arc::new(HeadlessObserver::new()),
            motion: Arc::new(HeadlessMotion::new(reduced_motion)),
        }
    }
}

/// Output of the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Current route.
    pub path: String,
    /// Current navigation phase.
    pub phase: NavigationPhase,
    /// Section the fly-out will scroll to.
    pub pending_target: Option<String>,
    /// Active section, or empty.
    pub active_section_id: String,
    /// Props for every menu.
    pub menus: Vec<MenuView>,
    /// Intro stage while the intro runs.
    pub intro: Option<IntroStage>,
    /// Boot lines typed so far.
    pub boot_lines: Vec<String>,
    /// Whether preferences survive a restart.
    pub persistent: bool,
}

/// Owns the navigation state for one app load.
pub struct PageShell {
    routes: RoutePolicy,
    catalog: PageCatalog,
    timings: Timings,
    animation: Arc<dyn RevealAnimation>,
    motion: Arc<HeadlessMotion>,
    preferences: Arc<PreferenceStore>,
    navigation: NavigationContext,
    path: String,
    mount: Option<SectionMount>,
    intro: Option<IntroController>,
    boot: Option<BootSequence>,
}

impl PageShell {
    /// Wires the shell for a load at `config.start_location`. Nothing runs
    /// until [`start`](Self::start).
    #[must_use]
    pub fn new(config: &ShellConfig, catalog: PageCatalog, ports: ShellPorts) -> Self {
        let preferences = Arc::new(PreferenceStore::new(ports.store));
        let location = &config.start_location;
        let context = config.routes.context_for(&location.path);

        let motion: Arc<dyn MotionPreference> = ports.motion.clone();
        let orchestrator = PhaseOrchestrator::new(
            context,
            location.has_deep_link(),
            Arc::clone(&preferences),
            config.timings.orchestrator,
        );
        let spy = ScrollSpy::new(
            SectionRegistry::new(),
            ViewportPorts {
                viewport: ports.viewport,
                observer: ports.observer,
                motion,
            },
            Arc::clone(&preferences),
            ports.clock,
            ScrollSpyConfig {
                persist_debounce: config.timings.persist_debounce,
                ..ScrollSpyConfig::default()
            },
        );
        spy.set_deep_link(location.fragment.clone());

        Self {
            routes: config.routes.clone(),
            catalog,
            timings: config.timings,
            animation: ports.animation,
            motion: ports.motion,
            navigation: NavigationContext::new(orchestrator, spy, Arc::clone(&preferences)),
            preferences,
            path: location.path.clone(),
            mount: None,
            intro: None,
            boot: None,
        }
    }

    /// Attaches the scroll-spy, arms the preload safety timeout and mounts
    /// the start page.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Navigation` outside a tokio runtime and
    /// `ShellError::PageNotFound` if the start page does not exist.
    pub fn start(&mut self) -> Result<(), ShellError> {
        self.navigation.spy().attach()?;
        self.navigation.orchestrator().activate();
        let path = self.path.clone();
        self.mount_page(&path)?;
        self.sync_controllers();
        info!(
            path = %self.path,
            phase = %self.navigation.orchestrator().phase(),
            persistent = self.preferences.is_persistent(),
            "page shell started"
        );
        Ok(())
    }

    /// Route change: unmounts the current page, updates the page context
    /// (docking immediately when leaving home) and mounts the new page.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::PageNotFound` for an unknown path; nothing
    /// changes in that case.
    #[instrument(skip(self))]
    pub fn navigate(&mut self, raw: &str) -> Result<(), ShellError> {
        let location = Location::parse(raw);
        if self.catalog.get(&location.path).is_none() {
            return Err(ShellError::PageNotFound(location.path));
        }

        self.mount = None;
        self.path.clone_from(&location.path);
        self.navigation
            .orchestrator()
            .route_changed(self.routes.context_for(&location.path));
        self.navigation.spy().set_deep_link(location.fragment);
        self.mount_page(&location.path)?;
        self.sync_controllers();
        Ok(())
    }

    /// Starts or tears down the intro and boot controllers to match the
    /// current phase. Call after every phase change.
    pub fn sync_controllers(&mut self) {
        let phase = self.navigation.orchestrator().phase();

        if phase == NavigationPhase::Preload {
            if self.intro.is_none() {
                let orchestrator = self.navigation.orchestrator().clone();
                self.intro = Some(IntroController::start(
                    Arc::clone(&self.animation),
                    self.motion.as_ref(),
                    self.timings.intro,
                    move || orchestrator.finish_intro(),
                ));
            }
        } else if let Some(intro) = self.intro.take() {
            intro.teardown();
            debug!("intro controller released");
        }

        let overlay_open = matches!(
            phase,
            NavigationPhase::TableOfContents | NavigationPhase::Transitioning
        );
        if overlay_open {
            if self.boot.is_none() {
                let boot = BootSequence::start(
                    self.overlay_boot_lines(),
                    Arc::clone(&self.animation),
                    self.motion.as_ref(),
                    self.timings.boot,
                );
                self.navigation.attach_menu_ready(boot.ready_signal());
                self.boot = Some(boot);
            }
        } else if let Some(boot) = self.boot.take() {
            boot.teardown();
            self.navigation.detach_menu_ready();
            debug!("boot sequence released");
        }
    }

    /// Runs one command and returns its output line, if any.
    ///
    /// # Errors
    ///
    /// Returns the command's failure; the shell stays usable.
    pub fn execute(&mut self, command: ShellCommand) -> Result<Option<String>, ShellError> {
        let output = match command {
            ShellCommand::Goto(raw) => {
                self.navigate(&raw)?;
                None
            }
            ShellCommand::Select(id) => Some(outcome_label(self.navigation.select(&id)).to_owned()),
            ShellCommand::Transitioned => {
                self.navigation.complete_transition();
                None
            }
            ShellCommand::Visible(ids) => {
                self.report_visible(&ids);
                None
            }
            ShellCommand::Scroll(id) => {
                self.navigation.spy().scroll_to_section(&id)?;
                None
            }
            ShellCommand::Dock => {
                self.navigation.orchestrator().set_docked(true);
                None
            }
            ShellCommand::Undock => {
                self.navigation.orchestrator().set_docked(false);
                None
            }
            ShellCommand::Motion { reduced } => {
                self.motion.set_reduced(reduced);
                None
            }
            ShellCommand::Forget => {
                self.preferences.forget();
                None
            }
            ShellCommand::Status => Some(
                serde_json::to_string(&self.status())
                    .map_err(|e| NavigationError::Serialization(e.to_string()))?,
            ),
            ShellCommand::Quit => None,
        };
        self.sync_controllers();
        Ok(output)
    }

    /// Feeds one visibility batch: `ids` intersect the band, every other
    /// registered section does not.
    pub fn report_visible(&self, ids: &[String]) {
        let registry = self.navigation.registry();
        let entries = registry
            .sections()
            .into_iter()
            .map(|section| {
                let intersecting = ids.contains(&section.id);
                VisibilityEntry::new(section.id, intersecting)
            })
            .collect();
        self.navigation
            .spy()
            .handle_visibility(&VisibilityBatch::new(registry.generation(), entries));
    }

    #[must_use]
    pub fn status(&self) -> StatusReport {
        let snapshot = self.navigation.orchestrator().snapshot();
        StatusReport {
            path: self.path.clone(),
            phase: snapshot.phase,
            pending_target: snapshot.pending_target,
            active_section_id: self.navigation.spy().active_section_id(),
            menus: MenuKind::ALL
                .into_iter()
                .map(|kind| self.navigation.menu_view(kind))
                .collect(),
            intro: self.intro.as_ref().map(IntroController::stage),
            boot_lines: self
                .boot
                .as_ref()
                .map(BootSequence::visible_lines)
                .unwrap_or_default(),
            persistent: self.preferences.is_persistent(),
        }
    }

    /// Receives a snapshot after every navigation change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NavigationSnapshot> {
        self.navigation.orchestrator().subscribe()
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationContext {
        &self.navigation
    }

    #[must_use]
    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stops every controller and unmounts the page.
    pub fn shutdown(&mut self) {
        if let Some(intro) = self.intro.take() {
            intro.teardown();
        }
        if let Some(boot) = self.boot.take() {
            boot.teardown();
        }
        self.navigation.spy().detach();
        self.mount = None;
        info!("page shell stopped");
    }

    fn mount_page(&mut self, path: &str) -> Result<(), ShellError> {
        let page = self
            .catalog
            .get(path)
            .ok_or_else(|| ShellError::PageNotFound(path.to_owned()))?;
        self.mount = Some(self.navigation.registry().mount(page.sections.clone()));
        self.navigation.spy().sync_registry();
        debug!(path, sections = page.sections.len(), "page mounted");
        Ok(())
    }

    /// The overlay belongs to the home page, so its boot text does too.
    fn overlay_boot_lines(&self) -> Vec<String> {
        self.catalog
            .get(self.routes.home_route())
            .map(|page| page.boot_lines.clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for PageShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageShell")
            .field("path", &self.path)
            .field("navigation", &self.navigation)
            .finish_non_exhaustive()
    }
}

fn outcome_label(outcome: SelectOutcome) -> &'static str {
    match outcome {
        SelectOutcome::TransitionStarted => "transition_started",
        SelectOutcome::Scrolled => "scrolled",
        SelectOutcome::Ignored => "ignored",
    }
}
