//! Visibility notifications and the active viewport band.

/// The horizontal band of the viewport whose contents count as "active".
///
/// Expressed as insets from the top and bottom edge, as fractions of the
/// viewport height. The default band sits in the upper middle of the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBand {
    /// Fraction of the viewport height excluded at the top.
    pub top_inset: f64,
    /// Fraction of the viewport height excluded at the bottom.
    pub bottom_inset: f64,
}

impl Default for ActiveBand {
    fn default() -> Self {
        Self {
            top_inset: 0.40,
            bottom_inset: 0.55,
        }
    }
}

impl ActiveBand {
    /// The band as an observer root margin, e.g. `"-40% 0px -55% 0px"`.
    #[must_use]
    pub fn root_margin(&self) -> String {
        format!(
            "-{}% 0px -{}% 0px",
            (self.top_inset * 100.0).round(),
            (self.bottom_inset * 100.0).round()
        )
    }

    /// Band edges in pixels for a viewport of `viewport_height`.
    #[must_use]
    pub fn edges(&self, viewport_height: f64) -> (f64, f64) {
        (
            viewport_height * self.top_inset,
            viewport_height * (1.0 - self.bottom_inset),
        )
    }

    /// Whether an element spanning `top..bottom` (viewport coordinates)
    /// overlaps the band.
    #[must_use]
    pub fn intersects(&self, top: f64, bottom: f64, viewport_height: f64) -> bool {
        let (band_top, band_bottom) = self.edges(viewport_height);
        top < band_bottom && bottom > band_top
    }
}

/// One observed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityEntry {
    /// Section id of the observed element.
    pub section_id: String,
    /// Whether the element intersects the active band.
    pub is_intersecting: bool,
}

impl VisibilityEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(section_id: impl Into<String>, is_intersecting: bool) -> Self {
        Self {
            section_id: section_id.into(),
            is_intersecting,
        }
    }

    /// Builds an entry from element geometry, for hosts without a native
    /// observer.
    #[must_use]
    pub fn from_geometry(
        section_id: impl Into<String>,
        band: &ActiveBand,
        top: f64,
        bottom: f64,
        viewport_height: f64,
    ) -> Self {
        Self::new(section_id, band.intersects(top, bottom, viewport_height))
    }
}

/// A batch of notifications, tagged with the registry generation the
/// observations were registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityBatch {
    /// Registry generation at observation time.
    pub generation: u64,
    /// Observed entries, in any order.
    pub entries: Vec<VisibilityEntry>,
}

impl VisibilityBatch {
    /// Creates a batch.
    #[must_use]
    pub fn new(generation: u64, entries: Vec<VisibilityEntry>) -> Self {
        Self {
            generation,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root_margin() {
        assert_eq!(ActiveBand::default().root_margin(), "-40% 0px -55% 0px");
    }

    #[test]
    fn test_band_edges_for_1000px_viewport() {
        let (top, bottom) = ActiveBand::default().edges(1000.0);

        assert!((top - 400.0).abs() < 1e-9);
        assert!((bottom - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersects_only_elements_overlapping_band() {
        let band = ActiveBand::default();

        assert!(band.intersects(300.0, 420.0, 1000.0));
        assert!(band.intersects(0.0, 2000.0, 1000.0));
        assert!(!band.intersects(0.0, 400.0, 1000.0));
        assert!(!band.intersects(450.0, 900.0, 1000.0));
    }

    #[test]
    fn test_entry_from_geometry() {
        let entry = VisibilityEntry::from_geometry("a", &ActiveBand::default(), 410.0, 600.0, 1000.0);

        assert_eq!(entry, VisibilityEntry::new("a", true));
    }
}
