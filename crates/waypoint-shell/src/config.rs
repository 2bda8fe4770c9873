//! Shell configuration from environment variables and an optional YAML
//! timing file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use waypoint_core::location::Location;
use waypoint_core::phase::RoutePolicy;
use waypoint_intro::{BootTimings, IntroTimings};
use waypoint_orchestrator::OrchestratorTimings;

use crate::error::ShellError;

/// Every tunable delay. Missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Intro animation delays.
    pub intro: IntroTimings,
    /// Boot-text delays for the table of contents.
    pub boot: BootTimings,
    /// Orchestrator safety timeout.
    pub orchestrator: OrchestratorTimings,
    /// How long the active section must settle before it is persisted.
    #[serde(with = "waypoint_timing::millis")]
    pub persist_debounce: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            intro: IntroTimings::default(),
            boot: BootTimings::default(),
            orchestrator: OrchestratorTimings::default(),
            persist_debounce: Duration::from_millis(600),
        }
    }
}

impl Timings {
    /// Parses a YAML timing document.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Yaml` if the document is malformed.
    pub fn from_yaml(source: &str) -> Result<Self, ShellError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    /// Reads and parses a YAML timing file.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Io` if the file cannot be read and
    /// `ShellError::Yaml` if it is malformed.
    pub fn load(path: &Path) -> Result<Self, ShellError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }
}

/// Page shell configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Which paths count as home and support the overlay.
    pub routes: RoutePolicy,
    /// Durable preference file; `None` keeps preferences in memory.
    pub preferences_path: Option<PathBuf>,
    /// Directory of markdown pages; `None` serves the built-in pages.
    pub pages_dir: Option<PathBuf>,
    /// Initial motion preference; `motion on|off` changes it at runtime.
    pub reduced_motion: bool,
    /// Where the app loads.
    pub start_location: Location,
    /// Every tunable delay.
    pub timings: Timings,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            routes: RoutePolicy::default(),
            preferences_path: None,
            pages_dir: None,
            reduced_motion: false,
            start_location: Location::parse("/"),
            timings: Timings::default(),
        }
    }
}

impl ShellConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`from_lookup`](Self::from_lookup).
    pub fn from_env() -> Result<Self, ShellError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`:
    ///
    /// - `WAYPOINT_HOME_ROUTE` (default `/`)
    /// - `WAYPOINT_OVERLAY_ROUTES`, comma separated (default: the home route)
    /// - `WAYPOINT_PREFERENCES_PATH`
    /// - `WAYPOINT_PAGES_DIR`
    /// - `WAYPOINT_REDUCED_MOTION`, a boolean (default `false`)
    /// - `WAYPOINT_START_LOCATION` (default: the home route)
    /// - `WAYPOINT_CONFIG`, a YAML timing file
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Config` for an unparseable value, and the errors
    /// of [`Timings::load`] for the timing file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ShellError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let home = non_empty("WAYPOINT_HOME_ROUTE").unwrap_or_else(|| "/".to_owned());
        let overlay = non_empty("WAYPOINT_OVERLAY_ROUTES").unwrap_or_else(|| home.clone());
        let overlay: Vec<&str> = overlay
            .split(',')
            .map(str::trim)
            .filter(|route| !route.is_empty())
            .collect();
        let routes = RoutePolicy::new(&home, &overlay);

        let reduced_motion = match non_empty("WAYPOINT_REDUCED_MOTION") {
            Some(value) => parse_flag(&value).ok_or_else(|| {
                ShellError::Config(format!(
                    "WAYPOINT_REDUCED_MOTION must be a boolean, got {value:?}"
                ))
            })?,
            None => false,
        };

        let start_location = Location::parse(
            &non_empty("WAYPOINT_START_LOCATION")
                .unwrap_or_else(|| routes.home_route().to_owned()),
        );

        let timings = match non_empty("WAYPOINT_CONFIG") {
            Some(path) => Timings::load(Path::new(&path))?,
            None => Timings::default(),
        };

        Ok(Self {
            routes,
            preferences_path: non_empty("WAYPOINT_PREFERENCES_PATH").map(PathBuf::from),
            pages_dir: non_empty("WAYPOINT_PAGES_DIR").map(PathBuf::from),
            reduced_motion,
            start_location,
            timings,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
