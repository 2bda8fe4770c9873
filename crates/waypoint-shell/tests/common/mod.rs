//! Shared helpers for shell integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use waypoint_core::animation::RevealAnimation;
use waypoint_core::location::Location;
use waypoint_core::phase::RoutePolicy;
use waypoint_core::store::KeyValueStore;
use waypoint_shell::{
    HeadlessMotion, HeadlessObserver, Page, PageCatalog, PageShell, ShellConfig, ShellPorts,
};
use waypoint_test_support::{RecordingAnimation, RecordingViewport, fixed_clock};

/// Home page with three sections and no boot text, plus a guide page.
pub fn catalog() -> PageCatalog {
    let mut catalog = PageCatalog::new();
    catalog.insert(Page::from_markdown("/", "## Overview\n\n## Setup\n\n## Reference\n").unwrap());
    catalog.insert(Page::from_markdown("/guide", "## Install\n\n## Usage\n").unwrap());
    catalog
}

/// Same pages, but the overlay types two boot lines.
pub fn catalog_with_boot_text() -> PageCatalog {
    let mut catalog = catalog();
    catalog.insert(
        Page::from_markdown(
            "/",
            "---\nboot:\n  - one\n  - two\n---\n## Overview\n\n## Setup\n",
        )
        .unwrap(),
    );
    catalog
}

pub struct Harness {
    pub shell: PageShell,
    pub animation: Arc<RecordingAnimation>,
    pub viewport: Arc<RecordingViewport>,
    pub motion: Arc<HeadlessMotion>,
}

pub struct HarnessBuilder {
    start: String,
    reduced_motion: bool,
    catalog: PageCatalog,
    store: Arc<dyn KeyValueStore>,
    animation: Option<Arc<dyn RevealAnimation>>,
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        start: "/".to_owned(),
        reduced_motion: false,
        catalog: catalog(),
        store: Arc::new(waypoint_preferences::MemoryStore::new()),
        animation: None,
    }
}

impl HarnessBuilder {
    pub fn start_at(mut self, location: &str) -> Self {
        self.start = location.to_owned();
        self
    }

    pub fn reduced_motion(mut self) -> Self {
        self.reduced_motion = true;
        self
    }

    pub fn catalog(mut self, catalog: PageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = store;
        self
    }

    pub fn animation(mut self, animation: Arc<dyn RevealAnimation>) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Builds and starts the shell. Must run inside a tokio runtime.
    pub fn start(self) -> Harness {
        let config = ShellConfig {
            routes: RoutePolicy::new("/", &["/", "/guide"]),
            start_location: Location::parse(&self.start),
            reduced_motion: self.reduced_motion,
            ..ShellConfig::default()
        };
        let recording = Arc::new(RecordingAnimation::new());
        let animation: Arc<dyn RevealAnimation> = match self.animation {
            Some(animation) => animation,
            None => recording.clone(),
        };
        let viewport = Arc::new(RecordingViewport::new());
        let motion = Arc::new(HeadlessMotion::new(self.reduced_motion));
        let ports = ShellPorts {
            store: self.store,
            clock: Arc::new(fixed_clock()),
            animation,
            viewport: viewport.clone(),
            observer: Arc::new(HeadlessObserver::new()),
            motion: motion.clone(),
        };

        let mut shell = PageShell::new(&config, self.catalog, ports);
        shell.start().unwrap();
        Harness {
            shell,
            animation: recording,
            viewport,
            motion,
        }
    }
}

/// Advances paused time, then lets the shell react to phase changes the
/// way the event loop does.
pub async fn settle(shell: &mut PageShell, millis: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
    shell.sync_controllers();
}
