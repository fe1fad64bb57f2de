// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use peniko::kurbo::{BezPath, Size};
use text_primitives::FontMetrics;

/// The ellipsis used when no truncation text is configured.
pub const DEFAULT_TRUNCATION_TEXT: &str = "\u{2026}";

/// Everything besides the text that determines a layout.
#[derive(Clone, Debug)]
pub struct LayoutConstraints {
    /// Width to break lines at and height to stop at. Either may be infinite.
    pub size: Size,
    /// Regions glyphs must avoid. Each path's bounding box is excluded.
    pub exclusion_paths: Vec<BezPath>,
    /// Maximum number of line fragments, or 0 for no limit.
    pub maximum_number_of_lines: usize,
    /// Text replacing the tail of the last line when the text does not fit.
    pub truncation_text: String,
    /// Metrics used for every line when automatic metrics are off and no fixed metrics are set.
    pub baseline_metrics: FontMetrics,
    /// Metrics used for every line when automatic metrics are off.
    pub fixed_metrics: FontMetrics,
    /// Whether lines report the metrics of their own content.
    pub retrieve_font_metrics_automatically: bool,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            size: Size::new(f64::INFINITY, f64::INFINITY),
            exclusion_paths: Vec::new(),
            maximum_number_of_lines: 0,
            truncation_text: DEFAULT_TRUNCATION_TEXT.into(),
            baseline_metrics: FontMetrics::NULL,
            fixed_metrics: FontMetrics::NULL,
            retrieve_font_metrics_automatically: true,
        }
    }
}

impl LayoutConstraints {
    /// The metrics every line is forced to, if any.
    pub fn forced_metrics(&self) -> Option<FontMetrics> {
        if self.retrieve_font_metrics_automatically {
            return None;
        }
        [self.fixed_metrics, self.baseline_metrics]
            .into_iter()
            .find(|metrics| !metrics.is_null())
    }

    /// Compares all fields, treating two null metrics as equal.
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        self.size == other.size
            && self.exclusion_paths == other.exclusion_paths
            && self.maximum_number_of_lines == other.maximum_number_of_lines
            && self.truncation_text == other.truncation_text
            && same_metrics(&self.baseline_metrics, &other.baseline_metrics)
            && same_metrics(&self.fixed_metrics, &other.fixed_metrics)
            && self.retrieve_font_metrics_automatically == other.retrieve_font_metrics_automatically
    }
}

fn same_metrics(a: &FontMetrics, b: &FontMetrics) -> bool {
    (a.is_null() && b.is_null()) || a == b
}

/// Caps the width of individual lines, by line index.
pub type LineWidthOverride = Arc<dyn Fn(usize) -> Option<f64> + Send + Sync>;

#[cfg(test)]
mod tests {
    use text_primitives::FontMetrics;

    use super::LayoutConstraints;

    #[test]
    fn null_metrics_compare_equal() {
        let a = LayoutConstraints::default();
        let b = LayoutConstraints::default();
        assert!(a.same_as(&b));
        let mut c = LayoutConstraints::default();
        c.fixed_metrics = FontMetrics::new(10.0, 2.0, 0.0);
        assert!(!a.same_as(&c));
    }

    #[test]
    fn forced_metrics_prefer_fixed() {
        let mut constraints = LayoutConstraints::default();
        constraints.baseline_metrics = FontMetrics::new(8.0, 2.0, 0.0);
        assert_eq!(constraints.forced_metrics(), None);
        constraints.retrieve_font_metrics_automatically = false;
        assert_eq!(constraints.forced_metrics(), Some(FontMetrics::new(8.0, 2.0, 0.0)));
        constraints.fixed_metrics = FontMetrics::new(12.0, 4.0, 1.0);
        assert_eq!(constraints.forced_metrics(), Some(FontMetrics::new(12.0, 4.0, 1.0)));
    }
}
