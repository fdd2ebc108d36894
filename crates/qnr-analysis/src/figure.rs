//! Figures as plain data
//!
//! A [`Figure`] describes what to draw, not how: axis labels, series and
//! color scaling. Rendering backends consume the serialized form; the
//! [`Display`] impl gives a terminal summary.

use crate::aggregate::{GroupSeries, ParticipantMatrix};
use crate::stats::BoxStats;
use qnr_model::RatingScale;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Colormap used when none is configured
pub const DEFAULT_COLORMAP: &str = "viridis";

/// A renderable figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Figure {
    /// One box per participant group
    BoxPlot(BoxPlot),
    /// Question × participant score grid
    Heatmap(Heatmap),
    /// One bar per label
    Bar(BarChart),
}

impl Figure {
    /// Figure title
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::BoxPlot(plot) => &plot.title,
            Self::Heatmap(map) => &map.title,
            Self::Bar(chart) => &chart.title,
        }
    }

    /// Short name of the figure kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BoxPlot(_) => "box_plot",
            Self::Heatmap(_) => "heatmap",
            Self::Bar(_) => "bar",
        }
    }
}

/// Box of one group; `stats` is `None` when every member mean is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledBox {
    /// Group label
    pub label: String,
    /// Summary of the group's participant means
    pub stats: Option<BoxStats>,
}

/// Grouped box plot of participant means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlot {
    /// Title
    pub title: String,
    /// Horizontal axis label
    pub x_label: String,
    /// Vertical axis label
    pub y_label: String,
    /// Boxes in group order
    pub boxes: Vec<LabeledBox>,
    /// Mark each group's mean on its box
    #[serde(default)]
    pub show_means: bool,
}

impl BoxPlot {
    /// Box plot over aggregated groups
    #[must_use]
    pub fn from_groups(groups: &[GroupSeries]) -> Self {
        Self {
            title: "Group ratings with outliers".to_string(),
            x_label: "groups".to_string(),
            y_label: "ratings".to_string(),
            boxes: groups
                .iter()
                .map(|group| LabeledBox {
                    label: group.label.clone(),
                    stats: BoxStats::from_values(group.present_means()),
                })
                .collect(),
            show_means: false,
        }
    }

    /// With group means marked
    #[inline]
    #[must_use]
    pub fn with_means(mut self, show_means: bool) -> Self {
        self.show_means = show_means;
        self
    }
}

/// Per-participant score grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    /// Title
    pub title: String,
    /// Colormap name understood by the renderer
    pub colormap: String,
    /// Value mapped to the low end of the colormap
    pub vmin: i64,
    /// Value mapped to the high end of the colormap
    pub vmax: i64,
    /// Participant labels, one per column
    pub x_labels: Vec<String>,
    /// Question numbers (1-based), one per row
    pub y_labels: Vec<String>,
    /// `[slot][participant]`, `None` where the score is missing
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    /// Heatmap over a score matrix, colored across the rating scale
    #[must_use]
    pub fn from_matrix(matrix: ParticipantMatrix, scale: RatingScale, colormap: &str) -> Self {
        Self {
            title: "Individual rating heatmap".to_string(),
            colormap: colormap.to_string(),
            vmin: scale.start,
            vmax: scale.end,
            y_labels: (1..=matrix.slots()).map(|n| n.to_string()).collect(),
            x_labels: matrix.participants,
            cells: matrix.cells,
        }
    }
}

/// One bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Category label
    pub label: String,
    /// Bar height; `None` leaves a gap
    pub value: Option<f64>,
}

/// Simple bar chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    /// Title
    pub title: String,
    /// Horizontal axis label
    pub x_label: String,
    /// Vertical axis label
    pub y_label: String,
    /// Bars in display order
    pub bars: Vec<Bar>,
}

fn fmt_cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

impl Display for Figure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title())?;
        match self {
            Self::BoxPlot(plot) => {
                for labeled in &plot.boxes {
                    match &labeled.stats {
                        Some(s) => writeln!(
                            f,
                            "  {:<6} n={:<3} min={:.2} q1={:.2} median={:.2} q3={:.2} max={:.2} outliers={:?}",
                            labeled.label,
                            s.count,
                            s.whisker_low,
                            s.q1,
                            s.median,
                            s.q3,
                            s.whisker_high,
                            s.outliers
                        )?,
                        None => writeln!(f, "  {:<6} no scores", labeled.label)?,
                    }
                    if let (true, Some(s)) = (plot.show_means, &labeled.stats) {
                        writeln!(f, "  {:<6} mean={:.2}", "", s.mean)?;
                    }
                }
            }
            Self::Heatmap(map) => {

                writeln!(f, "  colormap {} range {}-{}", map.colormap, map.vmin, map.vmax)?;
                write!(f, "  {:>4}", "")?;
                for label in &map.x_labels {
                    write!(f, " {label:>8}")?;
                }
                writeln!(f)?;
                for (label, row) in map.y_labels.iter().zip(&map.cells) {
                    write!(f, "  {label:>4}")?;
                    for cell in row {
                        write!(f, " {:>8}", fmt_cell(*cell))?;
                    }
                    writeln!(f)?;
                }
            }
            Self::Bar(chart) => {
                for bar in &chart.bars {
                    writeln!(f, "  {:<10} {}", bar.label, fmt_cell(bar.value))?;
                }
            }
        }
        Ok(())
    }
}
