//! The mounted page's ordered section list.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tracing::{debug, warn};
use waypoint_core::section::Section;

#[derive(Debug, Default)]
struct RegistryState {
    sections: Vec<Section>,
    generation: u64,
}

/// Shared handle to the section list of the currently mounted page.
///
/// Every registration or clear bumps a generation counter; consumers use it
/// to recognise work queued against a registry that has since been replaced,
/// and can [`subscribe`](Self::subscribe) to be told about each bump.
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    state: Arc<RwLock<RegistryState>>,
    changes: Arc<watch::Sender<u64>>,
}

impl Default for SectionRegistry {
    fn default() -> Self {
        let (changes, _rx) = watch::channel(0);
        Self {
            state: Arc::default(),
            changes: Arc::new(changes),
        }
    }
}

impl SectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives the generation after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Replaces the registry wholesale and returns the new generation.
    ///
    /// Ids must be unique within a page; later duplicates are dropped.
    pub fn register_sections(&self, sections: Vec<Section>) -> u64 {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(sections.len());
        for section in sections {
            if seen.insert(section.id.clone()) {
                unique.push(section);
            } else {
                warn!(section_id = %section.id, "dropping duplicate section id");
            }
        }

        let generation = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.generation += 1;
            debug!(
                count = unique.len(),
                generation = state.generation,
                "registering sections"
            );
            state.sections = unique;
            state.generation
        };
        self.changes.send_replace(generation);
        generation
    }

    /// Empties the registry.
    pub fn clear_sections(&self) {
        let generation = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.generation += 1;
            state.sections.clear();
            state.generation
        };
        self.changes.send_replace(generation);
    }

    /// Registers `sections` and returns a guard that clears them when the
    /// page unmounts.
    #[must_use = "dropping the mount immediately clears the sections"]
    pub fn mount(&self, sections: Vec<Section>) -> SectionMount {
        let generation = self.register_sections(sections);
        SectionMount {
            registry: self.clone(),
            generation,
        }
    }

    /// A copy of the current section list, in document order.
    #[must_use]
    pub fn sections(&self) -> Vec<Section> {
        self.read().sections.clone()
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.read().sections.iter().any(|s| s.id == id)
    }

    /// Looks up a registered section.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Section> {
        self.read().sections.iter().find(|s| s.id == id).cloned()
    }

    /// The current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Whether no page has registered sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().sections.is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_if_current(&self, generation: u64) -> bool {
        let cleared = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.generation != generation {
                return false;
            }
            state.generation += 1;
            state.sections.clear();
            state.generation
        };
        self.changes.send_replace(cleared);
        true
    }
}

/// Scoped registration owned by a mounted page. Dropping it clears the
/// registry, unless another page has registered since.
#[derive(Debug)]
pub struct SectionMount {
    registry: SectionRegistry,
    generation: u64,
}

impl SectionMount {
    /// The generation this mount registered.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for SectionMount {
    fn drop(&mut self) {
        if !self.registry.clear_if_current(self.generation) {
            debug!(
                generation = self.generation,
                "stale unmount; registry already replaced"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<Section> {
        vec![
            Section::new("a", "Alpha"),
            Section::new("b", "Beta"),
            Section::new("c", "Gamma"),
        ]
    }

    #[test]
    fn test_register_replaces_wholesale() {
        let registry = SectionRegistry::new();
        registry.register_sections(abc());

        registry.register_sections(vec![Section::new("z", "Zeta")]);

        assert_eq!(registry.sections(), vec![Section::new("z", "Zeta")]);
        assert!(!registry.contains("a"));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let registry = SectionRegistry::new();

        registry.register_sections(vec![
            Section::new("a", "First"),
            Section::new("a", "Second"),
            Section::new("b", "Beta"),
        ]);

        assert_eq!(
            registry.sections(),
            vec![Section::new("a", "First"), Section::new("b", "Beta")]
        );
    }

    #[test]
    fn test_every_change_bumps_generation() {
        let registry = SectionRegistry::new();
        let start = registry.generation();

        let registered = registry.register_sections(abc());
        registry.clear_sections();

        assert_eq!(registered, start + 1);
        assert_eq!(registry.generation(), start + 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_mount_clears_on_drop() {
        let registry = SectionRegistry::new();

        {
            let _mount = registry.mount(abc());
            assert_eq!(registry.sections().len(), 3);
        }

        assert!(registry.is_empty());
    }

    #[test]
    fn test_stale_unmount_keeps_newer_page() {
        // Arrange
        let registry = SectionRegistry::new();
        let old_page = registry.mount(abc());

        // Act
        let new_page = registry.mount(vec![Section::new("x", "Next page")]);
        drop(old_page);

        // Assert
        assert_eq!(registry.sections(), vec![Section::new("x", "Next page")]);
        drop(new_page);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_subscribers_see_latest_generation() {
        let registry = SectionRegistry::new();
        let rx = registry.subscribe();

        let generation = registry.register_sections(abc());

        assert_eq!(*rx.borrow(), generation);
    }

    #[test]
    fn test_get_returns_registered_section() {
        let registry = SectionRegistry::new();
        registry.register_sections(abc());

        assert_eq!(registry.get("b"), Some(Section::new("b", "Beta")));
        assert_eq!(registry.get("q"), None);
    }
}
