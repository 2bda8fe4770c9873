//! Scroll-spy: tracks the active section and scrolls on request.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use waypoint_core::clock::Clock;
use waypoint_core::error::NavigationError;
use waypoint_core::section::Section;
use waypoint_core::viewport::{MotionPreference, ScrollBehavior, Viewport, VisibilityObserver};
use waypoint_preferences::{LastSection, PreferenceStore};
use waypoint_timing::{Debouncer, TimerScope};

use crate::registry::SectionRegistry;
use crate::visibility::{ActiveBand, VisibilityBatch};

/// Scroll-spy tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSpyConfig {
    /// How long the active section must stay put before it is persisted.
    pub persist_debounce: Duration,
    /// The band observations are made against.
    pub band: ActiveBand,
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            persist_debounce: Duration::from_millis(600),
            band: ActiveBand::default(),
        }
    }
}

/// Host collaborators the scroll-spy drives.
#[derive(Clone)]
pub struct ViewportPorts {
    /// The scrollable document.
    pub viewport: Arc<dyn Viewport>,
    /// The host's visibility observer.
    pub observer: Arc<dyn VisibilityObserver>,
    /// The reader's motion preference.
    pub motion: Arc<dyn MotionPreference>,
}

#[derive(Debug, Default)]
struct SpyState {
    observed_generation: Option<u64>,
    deep_link: Option<String>,
}

struct SpyInner {
    registry: SectionRegistry,
    ports: ViewportPorts,
    config: ScrollSpyConfig,
    active: watch::Sender<String>,
    state: Mutex<SpyState>,
    persist: Debouncer<LastSection>,
    preferences: Arc<PreferenceStore>,
    clock: Arc<dyn Clock>,
    tasks: TimerScope,
}

/// Determines which registered section is active and scrolls to sections on
/// request.
///
/// The active id has two writers: the optimistic write in
/// [`scroll_to_section`](Self::scroll_to_section) and visibility batches.
/// The last write wins.
#[derive(Clone)]
pub struct ScrollSpy {
    inner: Arc<SpyInner>,
}

impl ScrollSpy {
    /// Creates a scroll-spy over `registry`. Call [`attach`](Self::attach)
    /// (or [`sync_registry`](Self::sync_registry) after every change) to keep
    /// observations in step with the registry.
    #[must_use]
    pub fn new(
        registry: SectionRegistry,
        ports: ViewportPorts,
        preferences: Arc<PreferenceStore>,
        clock: Arc<dyn Clock>,
        config: ScrollSpyConfig,
    ) -> Self {
        let sink = Arc::clone(&preferences);
        let persist = Debouncer::new(config.persist_debounce, move |record: LastSection| {
            sink.record_last_section(&record);
        });
        let (active, _rx) = watch::channel(String::new());
        Self {
            inner: Arc::new(SpyInner {
                registry,
                ports,
                config,
                active,
                state: Mutex::new(SpyState::default()),
                persist,
                preferences,
                clock,
                tasks: TimerScope::new(),
            }),
        }
    }

    /// The band observations should be made against.
    #[must_use]
    pub fn band(&self) -> ActiveBand {
        self.inner.config.band
    }

    /// The registry this spy tracks.
    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        &self.inner.registry
    }

    /// The active section id, or `""` when none is active.
    #[must_use]
    pub fn active_section_id(&self) -> String {
        self.inner.active.borrow().clone()
    }

    /// Receives the active section id after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.inner.active.subscribe()
    }

    /// Remembers the fragment the page was loaded with. It is scrolled to
    /// once a registry containing it is observed.
    pub fn set_deep_link(&self, fragment: Option<String>) {
        self.lock_state().deep_link = fragment;
    }

    /// Follows registry changes from a background task until the spy is
    /// detached.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Scheduling` without a tokio runtime.
    pub fn attach(&self) -> Result<(), NavigationError> {
        self.sync_registry();
        let mut changes = self.inner.registry.subscribe();
        let weak: Weak<SpyInner> = Arc::downgrade(&self.inner);
        self.inner.tasks.spawn(async move {
            while changes.changed().await.is_ok() {
                let Some(inner) = weak.upgrade() else { break };
                ScrollSpy { inner }.sync_registry();
            }
        })
    }

    /// Re-registers observations if the registry changed since the last
    /// call. All previous observations are dropped first.
    pub fn sync_registry(&self) {
        let generation = self.inner.registry.generation();
        {
            let mut state = self.lock_state();
            if state.observed_generation == Some(generation) {
                return;
            }
            state.observed_generation = Some(generation);
        }

        let observer = &self.inner.ports.observer;
        observer.disconnect();
        let sections = self.inner.registry.sections();
        for section in &sections {
            observer.observe(&section.id);
        }
        debug!(generation, count = sections.len(), "observing sections");

        let active = self.active_section_id();
        if !active.is_empty() && !sections.iter().any(|s| s.id == active) {
            self.inner.active.send_replace(String::new());
        }

        if !sections.is_empty() {
            self.schedule_deep_link();
        }
    }

    /// Applies a batch of visibility notifications.
    ///
    /// The first registered section (document order) reported as
    /// intersecting the band becomes active. Batches observed under an older
    /// registry generation, or arriving while the registry is empty, are
    /// ignored; a batch with no intersecting entry changes nothing.
    pub fn handle_visibility(&self, batch: &VisibilityBatch) {
        let observed = self.lock_state().observed_generation;
        let current = self.inner.registry.generation();
        if Some(batch.generation) != observed || batch.generation != current {
            debug!(
                batch_generation = batch.generation,
                current, "ignoring stale visibility batch"
            );
            return;
        }

        let sections = self.inner.registry.sections();
        if sections.is_empty() {
            return;
        }
        let intersecting: HashSet<&str> = batch
            .entries
            .iter()
            .filter(|entry| entry.is_intersecting)
            .map(|entry| entry.section_id.as_str())
            .collect();
        if let Some(section) = sections
            .iter()
            .find(|section| intersecting.contains(section.id.as_str()))
        {
            self.set_active(section);
        }
    }

    /// Scrolls to a registered section, rewrites the URL fragment and marks
    /// the section active without waiting for the observer.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::SectionNotFound` if `id` is not registered
    /// or the viewport has no such element; nothing changes in that case.
    #[instrument(skip(self))]
    pub fn scroll_to_section(&self, id: &str) -> Result<(), NavigationError> {
        let Some(section) = self.inner.registry.get(id) else {
            warn!(section_id = id, "cannot scroll to unregistered section");
            return Err(NavigationError::SectionNotFound(id.to_owned()));
        };

        let behavior = if self.inner.ports.motion.prefers_reduced_motion() {
            ScrollBehavior::Instant
        } else {
            ScrollBehavior::Smooth
        };
        if let Err(error) = self.inner.ports.viewport.scroll_to(id, behavior) {
            warn!(section_id = id, %error, "viewport rejected scroll");
            return Err(error);
        }
        self.inner.ports.viewport.replace_fragment(id);
        self.set_active(&section);
        info!(section_id = id, ?behavior, "scrolled to section");
        Ok(())
    }

    /// Stops observing, cancels background work and drops any pending
    /// persistence write.
    pub fn detach(&self) {
        self.inner.tasks.close();
        self.inner.persist.cancel();
        self.inner.ports.observer.disconnect();
        self.lock_state().observed_generation = None;
    }

    fn set_active(&self, section: &Section) {
        let changed = self.inner.active.send_if_modified(|active| {
            if *active == section.id {
                false
            } else {
                active.clone_from(&section.id);
                true
            }
        });
        if !changed {
            return;
        }
        debug!(section_id = %section.id, "active section changed");

        let record = LastSection {
            id: section.id.clone(),
            label: section.title.clone(),
            ts: self.inner.clock.now_millis(),
        };
        if let Err(error) = self.inner.persist.push(record.clone()) {
            debug!(%error, "debounce unavailable; persisting immediately");
            self.inner.preferences.record_last_section(&record);
        }
    }

    fn schedule_deep_link(&self) {
        let target = {
            let mut state = self.lock_state();
            match state.deep_link.take() {
                Some(id) if self.inner.registry.contains(&id) => id,
                Some(id) => {
                    debug!(section_id = %id, "deep link does not match a registered section");
                    return;
                }
                None => return,
            }
        };

        // Defer one turn of the event loop so the page has laid out.
        let spy = self.clone();
        let deferred = target.clone();
        let scheduled = self.inner.tasks.spawn(async move {
            tokio::task::yield_now().await;
            let _ = spy.scroll_to_section(&deferred);
        });
        if scheduled.is_err() {
            let _ = self.scroll_to_section(&target);
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SpyState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ScrollSpy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSpy")
            .field("active", &self.active_section_id())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
