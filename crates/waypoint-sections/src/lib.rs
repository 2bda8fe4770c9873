//! Waypoint Sections — which sections the mounted page has, and which one
//! the reader is looking at.

pub mod markdown;
pub mod registry;
pub mod spy;
pub mod visibility;

pub use markdown::sections_from_markdown;
pub use registry::{SectionMount, SectionRegistry};
pub use spy::{ScrollSpy, ScrollSpyConfig, ViewportPorts};
pub use visibility::{ActiveBand, VisibilityBatch, VisibilityEntry};
