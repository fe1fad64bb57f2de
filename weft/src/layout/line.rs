// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use attributed_text::Attributes;
use peniko::kurbo::Point;
use smallvec::SmallVec;
use text_primitives::{Font, FontMetrics};

use crate::{LayoutPoint, LayoutRect};

/// What a cluster holds, as far as breaking and alignment care.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClusterKind {
    /// Visible text.
    Text,
    /// Spaces and other breaking whitespace.
    Whitespace,
    /// A hard line break.
    LineSeparator,
    /// An inline attachment placeholder.
    Attachment,
}

/// A cluster positioned within its line fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedCluster {
    /// Byte range in the text.
    pub range: Range<usize>,
    /// Offset from the fragment's origin.
    pub x: f64,
    /// Horizontal advance.
    pub advance: f64,
    /// Kind of content.
    pub kind: ClusterKind,
}

/// A run of clusters in one line sharing the same attributes.
#[derive(Clone, Debug)]
pub struct LineRun {
    /// Byte range in the text.
    pub range: Range<usize>,
    /// Offset of the first cluster from the fragment's origin.
    pub x: f64,
    /// Total advance.
    pub advance: f64,
    /// The resolved font.
    pub font: Font,
    /// Natural metrics of the run.
    pub metrics: FontMetrics,
    /// Attributes in effect over the run.
    pub attributes: Attributes,
}

/// The text drawn in place of content removed by truncation.
#[derive(Clone, Debug)]
pub struct TruncationToken {
    /// The replacement text.
    pub text: String,
    /// Offset from the fragment's origin.
    pub x: f64,
    /// Total advance.
    pub advance: f64,
    /// Byte index the token stands at: where the hidden text starts.
    pub index: usize,
    /// Font the token is drawn with.
    pub font: Font,
    /// Attributes of the text next to the token.
    pub attributes: Attributes,
}

/// One positioned line of text.
///
/// Fragments are immutable and live as long as the layout result that produced them.
#[derive(Clone, Debug)]
pub struct LineFragment {
    pub(crate) index: usize,
    pub(crate) range: Range<usize>,
    pub(crate) origin: LayoutPoint,
    pub(crate) width: f64,
    pub(crate) metrics: FontMetrics,
    pub(crate) original_metrics: FontMetrics,
    pub(crate) edges: Range<f64>,
    pub(crate) clusters: Vec<PositionedCluster>,
    pub(crate) runs: SmallVec<[LineRun; 2]>,
    pub(crate) token: Option<TruncationToken>,
}

impl LineFragment {
    /// Index of the fragment in its layout.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte range of the text the fragment covers.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Whether the end of the fragment was replaced by truncation text.
    pub fn is_truncated(&self) -> bool {
        self.token.is_some()
    }

    /// Metrics the fragment is laid out with.
    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Metrics of the fragment's own content, before any forced metrics.
    pub fn original_metrics(&self) -> FontMetrics {
        self.original_metrics
    }

    /// The fragment's rect.
    pub fn rect(&self) -> LayoutRect {
        self.rect_with(&self.metrics)
    }

    /// The fragment's rect sized by its content's own metrics.
    pub fn original_rect(&self) -> LayoutRect {
        self.rect_with(&self.original_metrics)
    }

    fn rect_with(&self, metrics: &FontMetrics) -> LayoutRect {
        let LayoutPoint(Point { x, y }) = self.origin;
        LayoutRect::new(x, y, x + self.width, y + f64::from(metrics.line_height()))
    }

    /// Start of the baseline.
    pub fn baseline_origin(&self) -> LayoutPoint {
        LayoutPoint::new(self.origin.x(), self.origin.y() + f64::from(self.metrics.ascent))
    }

    /// Start of the baseline under the content's own metrics.
    pub fn original_baseline_origin(&self) -> LayoutPoint {
        LayoutPoint::new(
            self.origin.x(),
            self.origin.y() + f64::from(self.original_metrics.ascent),
        )
    }

    /// The horizontal extent a selection may stretch to on this fragment's row.
    pub fn edges(&self) -> Range<f64> {
        self.edges.clone()
    }

    /// Positioned clusters, in visual order.
    pub fn clusters(&self) -> &[PositionedCluster] {
        &self.clusters
    }

    /// Runs of uniformly attributed clusters.
    pub fn runs(&self) -> impl Iterator<Item = &LineRun> + '_ {
        self.runs.iter()
    }

    /// The truncation text, if the fragment was truncated.
    pub fn truncation_token(&self) -> Option<&TruncationToken> {
        self.token.as_ref()
    }

    /// Offset from the fragment's origin of the caret position before `index`.
    ///
    /// Indices hidden by truncation map to the truncation text.
    pub(crate) fn offset_for_index(&self, index: usize) -> f64 {
        for cluster in &self.clusters {
            if cluster.range.start >= index {
                return cluster.x;
            }
            if index < cluster.range.end {
                return cluster.x + cluster.advance;
            }
        }
        match &self.token {
            Some(token) if index >= token.index => token.x,
            _ => self
                .clusters
                .last()
                .map_or(0.0, |cluster| cluster.x + cluster.advance),
        }
    }

    /// Where the baseline meets the caret position before `index`.
    pub fn baseline_origin_for_character(&self, index: usize) -> LayoutPoint {
        let baseline = self.baseline_origin();
        LayoutPoint::new(baseline.x() + self.offset_for_index(index), baseline.y())
    }

    /// The caret position nearest to `position`'s horizontal coordinate.
    pub fn character_index_for_position(&self, position: LayoutPoint) -> usize {
        let x = position.x() - self.origin.x();
        let mut stops: SmallVec<[(f64, f64, usize, usize); 32]> = self
            .clusters
            .iter()
            .map(|c| (c.x, c.advance, c.range.start, c.range.end))
            .collect();
        if let Some(token) = &self.token {
            stops.push((token.x, token.advance, token.index, token.index));
            stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        let mut last_end = self.range.start;
        for &(start_x, advance, start, end) in &stops {
            if x < start_x + advance / 2.0 {
                return start;
            }
            last_end = end;
        }
        match self.clusters.last() {
            Some(last) if last.kind == ClusterKind::LineSeparator && last_end == last.range.end => {
                last.range.start
            }
            _ => last_end,
        }
    }

    /// Center of the cluster holding `index`.
    pub(crate) fn cluster_center(&self, index: usize) -> Option<f64> {
        self.clusters
            .iter()
            .find(|c| c.range.contains(&index))
            .map(|c| c.x + c.advance / 2.0)
    }
}
