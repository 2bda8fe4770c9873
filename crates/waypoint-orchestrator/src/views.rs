//! Props for the overlay, dock and mobile menus.

use serde::Serialize;
use waypoint_core::phase::NavigationPhase;
use waypoint_core::section::Section;
use waypoint_preferences::LastSection;

use crate::orchestrator::NavigationSnapshot;

/// The three menus that render navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    /// Full-screen table of contents on the home route.
    Overlay,
    /// Persistent side menu.
    Dock,
    /// Compact menu for narrow viewports.
    Mobile,
}

impl MenuKind {
    /// Every menu, in render order.
    pub const ALL: [Self; 3] = [Self::Overlay, Self::Dock, Self::Mobile];
}

/// What one menu renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuView {
    /// Which menu these props are for.
    pub kind: MenuKind,
    /// Whether the menu is shown in the current phase.
    pub visible: bool,
    /// Registered sections, in document order.
    pub sections: Vec<Section>,
    /// Empty unless the active id is registered.
    pub active_section_id: String,
    /// Set while the overlay's boot text is still typing.
    pub disabled: bool,
    /// Phase the props were derived from.
    pub phase: NavigationPhase,
    /// Last persisted section, offered as "continue reading".
    pub continue_target: Option<LastSection>,
}

impl MenuView {
    /// Derives a menu's props. Ids that are not in `sections` never leak
    /// into the view.
    #[must_use]
    pub fn build(
        kind: MenuKind,
        snapshot: &NavigationSnapshot,
        sections: Vec<Section>,
        active_section_id: &str,
        overlay_booting: bool,
        continue_target: Option<LastSection>,
    ) -> Self {
        let registered = |id: &str| sections.iter().any(|s| s.id == id);
        let active_section_id = if registered(active_section_id) {
            active_section_id.to_owned()
        } else {
            String::new()
        };
        let continue_target = continue_target.filter(|last| registered(&last.id));

        Self {
            kind,
            visible: is_visible(kind, snapshot),
            disabled: kind == MenuKind::Overlay && overlay_booting,
            phase: snapshot.phase,
            sections,
            active_section_id,
            continue_target,
        }
    }
}

fn is_visible(kind: MenuKind, snapshot: &NavigationSnapshot) -> bool {
    match kind {
        MenuKind::Overlay => matches!(
            snapshot.phase,
            NavigationPhase::TableOfContents | NavigationPhase::Transitioning
        ),
        MenuKind::Dock => {
            snapshot.phase == NavigationPhase::Docked && snapshot.context.supports_overlay_nav
        }
        MenuKind::Mobile => snapshot.phase == NavigationPhase::Docked,
    }
}
