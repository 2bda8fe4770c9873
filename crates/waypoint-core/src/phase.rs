//! Navigation phases and the route-derived page context.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four mutually exclusive navigation states of a page context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPhase {
    /// The intro animation is running.
    Preload,
    /// The table-of-contents overlay is shown.
    TableOfContents,
    /// The overlay is flying out towards the docked position.
    Transitioning,
    /// Primary navigation is docked alongside content.
    Docked,
}

impl NavigationPhase {
    /// Every phase, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Preload,
        Self::TableOfContents,
        Self::Transitioning,
        Self::Docked,
    ];

    /// Whether this phase may only exist on the home route.
    #[must_use]
    pub fn is_home_only(self) -> bool {
        matches!(self, Self::Preload | Self::TableOfContents)
    }
}

impl fmt::Display for NavigationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preload => "preload",
            Self::TableOfContents => "table_of_contents",
            Self::Transitioning => "transitioning",
            Self::Docked => "docked",
        };
        f.write_str(name)
    }
}

/// Context derived from the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// Whether the current route is the designated home route.
    pub is_home_route: bool,
    /// Whether the docked side/overlay menu is rendered on this route.
    pub supports_overlay_nav: bool,
}

/// Maps route paths to page contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    home_route: String,
    overlay_routes: Vec<String>,
}

impl RoutePolicy {
    /// Creates a policy with the given home route and overlay allow-list.
    ///
    /// Paths are normalised, so `"guide/"` and `"/guide"` name the same route.
    #[must_use]
    pub fn new(home_route: &str, overlay_routes: &[&str]) -> Self {
        Self {
            home_route: normalize_path(home_route),
            overlay_routes: overlay_routes.iter().map(|r| normalize_path(r)).collect(),
        }
    }

    /// Returns the normalised home route.
    #[must_use]
    pub fn home_route(&self) -> &str {
        &self.home_route
    }

    /// Derives the page context for a route path.
    #[must_use]
    pub fn context_for(&self, path: &str) -> PageContext {
        let path = normalize_path(path);
        PageContext {
            is_home_route: path == self.home_route,
            supports_overlay_nav: self.overlay_routes.iter().any(|r| *r == path),
        }
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new("/", &["/"])
    }
}

/// Normalises a route path: leading slash, no trailing slash (except root).
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{trimmed}")
}
