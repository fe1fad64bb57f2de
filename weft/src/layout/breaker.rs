// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shaping attributed text into clusters and greedily breaking the clusters into line fragments.

use core::ops::Range;

use attributed_text::{AttributedText, Attributes};
use peniko::kurbo::{Rect, Shape};
use smallvec::{smallvec, SmallVec};
use text_primitives::{Font, FontMetrics, LineBreakMode, ParagraphStyle, TextAlignment};

use super::alignment::{align, AlignInfo};
use super::line::{ClusterKind, LineFragment, LineRun, PositionedCluster, TruncationToken};
use super::{LayoutConstraints, LineWidthOverride};
use crate::segment::line_break_opportunities;
use crate::shape::{is_line_separator, ShapedCluster, Shaper};
use crate::LayoutPoint;

#[derive(Clone, Debug)]
pub(crate) struct Cluster {
    pub(crate) range: Range<usize>,
    pub(crate) advance: f64,
    pub(crate) kind: ClusterKind,
    /// Index into [`ShapedText::runs`].
    pub(crate) run: usize,
}

/// A maximal run of uniformly attributed text.
#[derive(Clone, Debug)]
pub(crate) struct ShapedRun {
    pub(crate) font: Font,
    pub(crate) metrics: FontMetrics,
    pub(crate) line_height: Option<f32>,
    pub(crate) style: ParagraphStyle,
    pub(crate) attributes: Attributes,
}

/// The whole text, shaped once per layout.
#[derive(Clone, Debug, Default)]
pub(crate) struct ShapedText {
    pub(crate) clusters: Vec<Cluster>,
    pub(crate) runs: Vec<ShapedRun>,
    /// Whether word wrapping may end a line after each cluster.
    break_after: Vec<bool>,
    /// Whether any line may end after each cluster; false inside composed sequences.
    split_after: Vec<bool>,
}

impl ShapedText {
    pub(crate) fn new(text: &AttributedText, shaper: &dyn Shaper) -> Self {
        let source = text.text();
        let mut shaped = Self::default();
        let mut scratch: Vec<ShapedCluster> = Vec::new();
        for (range, attributes) in text.attribute_runs(0..text.len()) {
            let run = shaped.runs.len();
            let font = attributes.font.clone().unwrap_or_default();
            let mut metrics = shaper.metrics(&font);
            if let Some(attachment) = &attributes.attachment {
                // The whole run is one placeholder glyph.
                metrics = FontMetrics::new(
                    attachment.ascent_for_layout(),
                    attachment.descent_for_layout(),
                    0.0,
                );
                shaped.clusters.push(Cluster {
                    range: range.clone(),
                    advance: attachment.placeholder_size.width,
                    kind: ClusterKind::Attachment,
                    run,
                });
            } else {
                scratch.clear();
                shaper.shape(&source[range.clone()], &font, &mut scratch);
                let kerning = f64::from(attributes.kerning.unwrap_or(0.0));
                for cluster in &scratch {
                    let cluster_range =
                        range.start + cluster.range.start..range.start + cluster.range.end;
                    let content = &source[cluster_range.clone()];
                    let (kind, advance) = if is_line_separator(content) {
                        (ClusterKind::LineSeparator, 0.0)
                    } else if content.chars().all(char::is_whitespace) {
                        (ClusterKind::Whitespace, f64::from(cluster.advance) + kerning)
                    } else {
                        (ClusterKind::Text, f64::from(cluster.advance) + kerning)
                    };
                    shaped.clusters.push(Cluster {
                        range: cluster_range,
                        advance,
                        kind,
                        run,
                    });
                }
            }
            shaped.runs.push(ShapedRun {
                font,
                metrics,
                line_height: attributes.line_height,
                style: attributes.paragraph_style(),
                attributes,
            });
        }

        let opportunities = line_break_opportunities(source);
        let sequences = text.composed_sequences();
        for cluster in &shaped.clusters {
            let end = cluster.range.end;
            let splittable = sequences.is_boundary(end);
            shaped.split_after.push(splittable);
            shaped
                .break_after
                .push(splittable && opportunities.binary_search(&end).is_ok());
        }
        shaped
    }

    fn style_at(&self, cluster: usize) -> ParagraphStyle {
        self.clusters
            .get(cluster)
            .map_or_else(ParagraphStyle::default, |c| self.runs[c.run].style)
    }
}

/// A line fragment under construction.
#[derive(Debug)]
struct Draft {
    range: Range<usize>,
    clusters: Vec<PositionedCluster>,
    /// Run index of each entry in `clusters`.
    cluster_runs: Vec<usize>,
    token: Option<TruncationToken>,
    edges: Range<f64>,
    available: f64,
    alignment: TextAlignment,
    ends_paragraph: bool,
    y: f64,
    /// Metrics of the draft's own content.
    natural: FontMetrics,
    /// Metrics of the row the draft sits in.
    metrics: FontMetrics,
}

impl Draft {
    fn new(range: Range<usize>) -> Self {
        Self {
            range,
            clusters: Vec::new(),
            cluster_runs: Vec::new(),
            token: None,
            edges: 0.0..0.0,
            available: f64::INFINITY,
            alignment: TextAlignment::Left,
            ends_paragraph: false,
            y: 0.0,
            natural: FontMetrics::NULL,
            metrics: FontMetrics::NULL,
        }
    }

    /// Distance from the start to the end of the last cluster or the token.
    fn width(&self) -> f64 {
        let clusters = self.clusters.last().map_or(0.0, |c| c.x + c.advance);
        let token = self.token.as_ref().map_or(0.0, |t| t.x + t.advance);
        clusters.max(token)
    }

    fn trailing_whitespace(&self) -> f64 {
        self.clusters
            .iter()
            .rev()
            .take_while(|c| matches!(c.kind, ClusterKind::Whitespace | ClusterKind::LineSeparator))
            .map(|c| c.advance)
            .sum()
    }
}

/// Breaks shaped text into line fragments under a set of constraints.
pub(crate) struct LineBreaker<'a> {
    shaped: &'a ShapedText,
    shaper: &'a dyn Shaper,
    constraints: &'a LayoutConstraints,
    width_override: Option<&'a LineWidthOverride>,
    exclusions: Vec<Rect>,
    text_len: usize,
}

impl<'a> LineBreaker<'a> {
    pub(crate) fn new(
        shaped: &'a ShapedText,
        shaper: &'a dyn Shaper,
        constraints: &'a LayoutConstraints,
        width_override: Option<&'a LineWidthOverride>,
        text_len: usize,
    ) -> Self {
        let exclusions = constraints
            .exclusion_paths
            .iter()
            .map(Shape::bounding_box)
            .collect();
        Self {
            shaped,
            shaper,
            constraints,
            width_override,
            exclusions,
            text_len,
        }
    }

    /// Breaks as much of the text as the constraints allow.
    pub(crate) fn break_lines(&self) -> Vec<LineFragment> {
        let clusters = &self.shaped.clusters;
        let width = self.constraints.size.width.max(0.0);
        let height = self.constraints.size.height;
        let max_lines = self.constraints.maximum_number_of_lines;
        let forced = self.constraints.forced_metrics();

        let mut drafts: Vec<Draft> = Vec::new();
        let mut cursor = 0;
        let mut y = 0.0;
        while cursor < clusters.len() {
            let guess = forced.unwrap_or_else(|| self.natural_metrics(&[clusters[cursor].run]));
            let guess_bottom = y + f64::from(guess.line_height());
            let intervals = self.free_intervals(y, guess_bottom, width);
            if intervals.is_empty() {
                match self.skip_exclusions(y, guess_bottom) {
                    Some(next) if next > y => {
                        y = next;
                        continue;
                    }
                    _ => break,
                }
            }

            let row_start = cursor;
            let mut row: Vec<Draft> = Vec::new();
            for (i, interval) in intervals.iter().enumerate() {
                if cursor >= clusters.len()
                    || (max_lines != 0 && drafts.len() + row.len() >= max_lines)
                {
                    break;
                }
                let line_index = drafts.len() + row.len();
                let mut available = interval.end - interval.start;
                if let Some(cap) = self.width_override.and_then(|f| f(line_index)) {
                    available = available.min(cap.max(0.0));
                }
                // The last interval always takes at least one cluster, so breaking progresses.
                let force = i + 1 == intervals.len();
                let Some(end) = self.fit_line(cursor, available, force) else {
                    continue;
                };
                row.push(self.draft(cursor..end, interval.clone(), available));
                cursor = end;
            }
            if row.is_empty() {
                break;
            }

            let natural = row
                .iter()
                .fold(FontMetrics::NULL, |acc, draft| acc.max(&draft.natural));
            let metrics = forced.unwrap_or(natural);
            let row_height = f64::from(metrics.line_height());
            if y + row_height > height {
                cursor = row_start;
                break;
            }
            for mut draft in row {
                draft.y = y;
                draft.metrics = metrics;
                tracing::trace!(line = drafts.len(), range = ?draft.range, y, "line fragment");
                drafts.push(draft);
            }
            y += row_height;
            if max_lines != 0 && drafts.len() >= max_lines {
                break;
            }
        }

        if cursor < clusters.len() && max_lines != 0 {
            if let Some(last) = drafts.last_mut() {
                self.truncate_last(last);
            }
        }

        self.finish(drafts)
    }

    /// Free horizontal intervals of the row spanning `top..bottom`, left to right.
    fn free_intervals(&self, top: f64, bottom: f64, width: f64) -> SmallVec<[Range<f64>; 4]> {
        let mut intervals: SmallVec<[Range<f64>; 4]> = smallvec![0.0..width];
        let mut blocked = false;
        for rect in &self.exclusions {
            if rect.y0 >= bottom || rect.y1 <= top || rect.x0 >= width || rect.x1 <= 0.0 {
                continue;
            }
            blocked = true;
            let mut next: SmallVec<[Range<f64>; 4]> = SmallVec::new();
            for interval in intervals {
                if rect.x1 <= interval.start || rect.x0 >= interval.end {
                    next.push(interval);
                    continue;
                }
                if rect.x0 > interval.start {
                    next.push(interval.start..rect.x0);
                }
                if rect.x1 < interval.end {
                    next.push(rect.x1..interval.end);
                }
            }
            intervals = next;
        }
        if blocked {
            intervals.retain(|interval| interval.end > interval.start);
        }
        intervals
    }

    /// The nearest bottom edge among exclusions overlapping `top..bottom`.
    fn skip_exclusions(&self, top: f64, bottom: f64) -> Option<f64> {
        self.exclusions
            .iter()
            .filter(|rect| rect.y0 < bottom && rect.y1 > top)
            .map(|rect| rect.y1)
            .min_by(f64::total_cmp)
    }

    /// Finds where the line starting at cluster `start` ends, as an exclusive cluster index.
    ///
    /// Returns `None` when not even the first cluster fits and `force` is off.
    fn fit_line(&self, start: usize, available: f64, force: bool) -> Option<usize> {
        let clusters = &self.shaped.clusters;
        let mode = self.shaped.style_at(start).line_break_mode;
        let mut x = 0.0;
        let mut last_break = None;
        for (i, cluster) in clusters.iter().enumerate().skip(start) {
            if cluster.kind == ClusterKind::LineSeparator {
                return Some(i + 1);
            }
            // Whitespace hangs past the edge.
            let overflows = mode.wraps()
                && cluster.kind != ClusterKind::Whitespace
                && x + cluster.advance > available;
            if overflows {
                if i > start {
                    if mode == LineBreakMode::WordWrap {
                        if let Some(end) = last_break {
                            return Some(end);
                        }
                    }
                    return Some(self.split_before(start, i));
                }
                if !force {
                    return None;
                }
            }
            x += cluster.advance;
            if self.shaped.break_after[i] {
                last_break = Some(i + 1);
            }
        }
        Some(clusters.len())
    }

    /// The last legal line end at or before cluster `i`, or failing that the first one after it.
    fn split_before(&self, start: usize, i: usize) -> usize {
        let split_after = &self.shaped.split_after;
        (start + 1..=i)
            .rev()
            .find(|&end| split_after[end - 1])
            .or_else(|| (i..split_after.len()).find(|&k| split_after[k]).map(|k| k + 1))
            .unwrap_or(split_after.len())
    }

    fn draft(&self, clusters: Range<usize>, edges: Range<f64>, available: f64) -> Draft {
        let all = &self.shaped.clusters;
        let style = self.shaped.style_at(clusters.start);
        let text_range = all[clusters.start].range.start..all[clusters.end - 1].range.end;
        let mut draft = Draft::new(text_range);
        self.push_clusters(&mut draft, clusters.clone(), 0.0);
        let content = draft.width() - draft.trailing_whitespace();
        let truncates = matches!(
            style.line_break_mode,
            LineBreakMode::HeadTruncation
                | LineBreakMode::TailTruncation
                | LineBreakMode::MiddleTruncation
        );
        if truncates && content > available {
            draft = self.truncate(clusters.clone(), style.line_break_mode, available, true);
        } else {
            draft.natural = self.natural_metrics(&draft.cluster_runs);
        }
        draft.edges = edges;
        draft.available = available;
        draft.alignment = style.alignment;
        draft.ends_paragraph =
            clusters.end == all.len() || all[clusters.end - 1].kind == ClusterKind::LineSeparator;
        draft
    }

    /// Replaces the last line with a tail-truncated rendition of the rest of its paragraph.
    fn truncate_last(&self, last: &mut Draft) {
        let clusters = &self.shaped.clusters;
        let start = clusters.partition_point(|c| c.range.start < last.range.start);
        let paragraph_end = (start..clusters.len())
            .find(|&i| clusters[i].kind == ClusterKind::LineSeparator)
            .map_or(clusters.len(), |i| i + 1);
        let mut truncated = self.truncate(
            start..paragraph_end,
            LineBreakMode::TailTruncation,
            last.available,
            false,
        );
        truncated.edges = last.edges.clone();
        truncated.available = last.available;
        truncated.alignment = last.alignment;
        truncated.ends_paragraph = true;
        truncated.y = last.y;
        truncated.metrics = match self.constraints.forced_metrics() {
            Some(forced) => forced,
            None => last.metrics.max(&truncated.natural),
        };
        tracing::trace!(range = ?truncated.range, "truncated last line");
        *last = truncated;
    }

    /// Positions clusters one after the other starting at `x`, returning the end position.
    fn push_clusters(&self, draft: &mut Draft, clusters: Range<usize>, mut x: f64) -> f64 {
        for cluster in &self.shaped.clusters[clusters] {
            draft.clusters.push(PositionedCluster {
                range: cluster.range.clone(),
                x,
                advance: cluster.advance,
                kind: cluster.kind,
            });
            draft.cluster_runs.push(cluster.run);
            x += cluster.advance;
        }
        x
    }

    /// Fits `clusters` into `available` by hiding content behind the truncation text.
    ///
    /// With `keep_range` the draft still covers all of `clusters`. Otherwise it ends where the
    /// visible text ends, and everything after belongs to no line.
    fn truncate(
        &self,
        clusters: Range<usize>,
        mode: LineBreakMode,
        available: f64,
        keep_range: bool,
    ) -> Draft {
        let all = &self.shaped.clusters;
        let split = &self.shaped.split_after;
        let separator = (all[clusters.end - 1].kind == ClusterKind::LineSeparator)
            .then_some(clusters.end - 1);
        let content = clusters.start..separator.unwrap_or(clusters.end);
        let first_run = all[clusters.start].run;
        let budget = (available - self.token_advance(first_run)).max(0.0);

        // Longest prefix of the content within `width`, ending on a legal split and not on
        // whitespace.
        let head = |width: f64| -> usize {
            let mut x = 0.0;
            let mut end = content.start;
            for i in content.clone() {
                if x + all[i].advance > width {
                    break;
                }
                x += all[i].advance;
                end = i + 1;
            }
            while end > content.start
                && (!split[end - 1] || all[end - 1].kind == ClusterKind::Whitespace)
            {
                end -= 1;
            }
            end
        };
        // Longest suffix of the content after `floor` within `width`, starting on a legal split.
        let tail = |width: f64, floor: usize| -> usize {
            let mut x = 0.0;
            let mut start = content.end;
            for i in (floor..content.end).rev() {
                if x + all[i].advance > width {
                    break;
                }
                x += all[i].advance;
                start = i;
            }
            while start < content.end && start > floor && !split[start - 1] {
                start += 1;
            }
            start
        };

        let (head_end, tail_start) = match mode {
            LineBreakMode::HeadTruncation => (content.start, tail(budget, content.start)),
            LineBreakMode::MiddleTruncation => {
                let head_end = head(budget * 0.5);
                let used: f64 = all[content.start..head_end].iter().map(|c| c.advance).sum();
                (head_end, tail(budget - used, head_end))
            }
            _ => (head(budget), content.end),
        };

        let range_start = all[clusters.start].range.start;
        let range_end = if keep_range {
            all[clusters.end - 1].range.end
        } else if head_end > content.start {
            all[head_end - 1].range.end
        } else {
            range_start
        };
        let mut draft = Draft::new(range_start..range_end);
        let x = self.push_clusters(&mut draft, content.start..head_end, 0.0);
        let token_run = draft.cluster_runs.last().copied().unwrap_or(first_run);
        let hidden_start = all.get(head_end).map_or(self.text_len, |c| c.range.start);
        let token = self.token(token_run, x, hidden_start);
        let after_token = x + token.advance;
        draft.token = Some(token);
        if keep_range {
            let x = self.push_clusters(&mut draft, tail_start..content.end, after_token);
            if let Some(separator) = separator {
                self.push_clusters(&mut draft, separator..separator + 1, x);
            }
        }
        let mut runs = draft.cluster_runs.clone();
        runs.push(token_run);
        draft.natural = self.natural_metrics(&runs);
        draft
    }

    fn token_advance(&self, run: usize) -> f64 {
        let mut clusters = Vec::new();
        self.shaper.shape(
            &self.constraints.truncation_text,
            &self.shaped.runs[run].font,
            &mut clusters,
        );
        clusters.iter().map(|c| f64::from(c.advance)).sum()
    }

    fn token(&self, run: usize, x: f64, index: usize) -> TruncationToken {
        let shaped_run = &self.shaped.runs[run];
        TruncationToken {
            text: self.constraints.truncation_text.clone(),
            x,
            advance: self.token_advance(run),
            index,
            font: shaped_run.font.clone(),
            attributes: shaped_run.attributes.clone(),
        }
    }

    /// Metrics of a line holding clusters of the given runs, line height attributes applied.
    fn natural_metrics(&self, runs: &[usize]) -> FontMetrics {
        let mut metrics = FontMetrics::NULL;
        let mut line_height: Option<f32> = None;
        for &run in runs {
            let run = &self.shaped.runs[run];
            metrics = metrics.max(&run.metrics);
            if let Some(height) = run.line_height {
                line_height = Some(line_height.map_or(height, |h| h.max(height)));
            }
        }
        if metrics.is_null() {
            metrics = self.shaper.metrics(&Font::default());
        }
        match line_height {
            Some(height) => metrics.with_target_line_height(height),
            None => metrics,
        }
    }

    /// Turns drafts into fragments: aligns them, then groups their clusters into runs.
    fn finish(&self, drafts: Vec<Draft>) -> Vec<LineFragment> {
        let fallback_width = drafts
            .iter()
            .map(|draft| draft.width() - draft.trailing_whitespace())
            .fold(0.0, f64::max);

        let mut lines = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let info = AlignInfo {
                available: draft.available,
                alignment: draft.alignment,
                ends_paragraph: draft.ends_paragraph,
            };
            let mut line = LineFragment {
                index,
                origin: LayoutPoint::new(draft.edges.start, draft.y),
                width: draft.width(),
                range: draft.range,
                metrics: draft.metrics,
                original_metrics: draft.natural,
                edges: draft.edges,
                clusters: draft.clusters,
                runs: SmallVec::new(),
                token: draft.token,
            };
            align(&mut line, &info, fallback_width);
            line.runs = self.runs_for(&line.clusters, &draft.cluster_runs);
            lines.push(line);
        }

        // Unbounded rows stretch selections to the widest line.
        let right = lines
            .iter()
            .map(|line| line.origin.x() + line.width)
            .fold(0.0, f64::max);
        for line in &mut lines {
            if !line.edges.end.is_finite() {
                line.edges.end = right.max(line.edges.start);
            }
        }
        lines
    }

    /// Groups adjacent clusters of the same shaped run.
    fn runs_for(
        &self,
        clusters: &[PositionedCluster],
        cluster_runs: &[usize],
    ) -> SmallVec<[LineRun; 2]> {
        let mut runs: SmallVec<[LineRun; 2]> = SmallVec::new();
        let mut current = None;
        for (cluster, &run) in clusters.iter().zip(cluster_runs) {
            match runs.last_mut() {
                Some(last) if current == Some(run) && last.range.end == cluster.range.start => {
                    last.range.end = cluster.range.end;
                    last.advance = cluster.x + cluster.advance - last.x;
                }
                _ => {
                    let shaped = &self.shaped.runs[run];
                    runs.push(LineRun {
                        range: cluster.range.clone(),
                        x: cluster.x,
                        advance: cluster.advance,
                        font: shaped.font.clone(),
                        metrics: shaped.metrics,
                        attributes: shaped.attributes.clone(),
                    });
                    current = Some(run);
                }
            }
        }
        runs
    }
}
