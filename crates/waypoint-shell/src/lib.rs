//! Waypoint Shell — owns the navigation state for one app load and drives
//! it from route changes and reader input.

pub mod command;
pub mod config;
pub mod error;
pub mod headless;
pub mod pages;
pub mod session;
pub mod shell;

pub use command::ShellCommand;
pub use config::{ShellConfig, Timings};
pub use error::ShellError;
pub use pages::{Page, PageCatalog};
pub use session::run_session;
pub use shell::{PageShell, ShellPorts, StatusReport};
pub use headless::{HeadlessMotion, HeadlessObserver, HeadlessViewport, TracingAnimation};
