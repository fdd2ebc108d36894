//! Aggregation of normalized scores
//!
//! Reduces stored responses into the numeric series consumed by figures:
//! per-group participant means and the `[slot][participant]` score matrix.
//! Unsaved drafts (empty participant id) never take part.

use crate::transform::ScoreTransformer;
use qnr_model::{ParticipantKey, Questionnaire, Response};
use serde::{Deserialize, Serialize};

/// Group label for identifiers without a `letters+digits` shape
pub const MALFORMED_GROUP: &str = "?";

/// Mean of the present values, `None` when all are missing
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_of_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Mean normalized score of one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantMean {
    /// Participant identifier as stored
    pub participant: String,
    /// Mean over present slots; `None` when every slot is missing
    pub mean: Option<f64>,
}

/// Participant means of one group, in participant order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSeries {
    /// Lowercased letter prefix, or [`MALFORMED_GROUP`]
    pub label: String,
    /// Members ordered by participant key
    pub participants: Vec<ParticipantMean>,
}

impl GroupSeries {
    /// Present means only
    pub fn present_means(&self) -> impl Iterator<Item = f64> + '_ {
        self.participants.iter().filter_map(|p| p.mean)
    }
}

/// Normalized scores laid out `[slot][participant]`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticipantMatrix {
    /// Column labels, ordered by participant key
    pub participants: Vec<String>,
    /// One row per configured rating question
    pub cells: Vec<Vec<Option<f64>>>,
}

impl ParticipantMatrix {
    /// Number of rows (rating slots)
    #[inline]
    #[must_use]
    pub fn slots(&self) -> usize {
        self.cells.len()
    }

    /// Cell at `slot`, `participant`; `None` when missing or out of bounds
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize, participant: usize) -> Option<f64> {
        self.cells.get(slot)?.get(participant).copied().flatten()
    }
}

/// Groups and reduces responses for visualization
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'q> {
    transformer: ScoreTransformer<'q>,
}

impl<'q> Aggregator<'q> {
    /// Create aggregator for `questionnaire`
    #[inline]
    #[must_use]
    pub fn new(questionnaire: &'q Questionnaire) -> Self {
        Self {
            transformer: ScoreTransformer::new(questionnaire),
        }
    }

    /// Per-group participant means
    ///
    /// Groups follow participant key order, so malformed identifiers form a
    /// trailing [`MALFORMED_GROUP`].
    #[must_use]
    pub fn group_scores(&self, responses: &[Response]) -> Vec<GroupSeries> {
        let mut groups: Vec<GroupSeries> = Vec::new();

        for (key, response) in sorted_saved(responses) {
            let label = key.group().unwrap_or(MALFORMED_GROUP);
            let entry = ParticipantMean {
                participant: response.participant_number.clone(),
                mean: mean_of_present(&self.transformer.normalize(response)),
            };

            match groups.last_mut() {
                Some(group) if group.label == label => group.participants.push(entry),
                _ => groups.push(GroupSeries {
                    label: label.to_string(),
                    participants: vec![entry],
                }),
            }
        }

        tracing::debug!("Aggregated {} groups", groups.len());
        groups
    }

    /// Score matrix with one row per question and one column per participant
    #[must_use]
    pub fn participant_matrix(&self, responses: &[Response]) -> ParticipantMatrix {
        let sorted = sorted_saved(responses);
        let columns: Vec<Vec<Option<f64>>> = sorted
            .iter()
            .map(|(_, response)| self.transformer.normalize(response))
            .collect();

        let cells = (0..self.transformer.questionnaire().rating_slots())
            .map(|slot| {
                columns
                    .iter()
                    .map(|column| column.get(slot).copied().flatten())
                    .collect()
            })
            .collect();

        ParticipantMatrix {
            participants: sorted
                .into_iter()
                .map(|(_, response)| response.participant_number.clone())
                .collect(),
            cells,
        }
    }
}

fn sorted_saved(responses: &[Response]) -> Vec<(ParticipantKey, &Response)> {
    let mut keyed: Vec<_> = responses
        .iter()
        .filter(|response| !response.is_draft())
        .map(|response| (response.participant_key(), response))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed
}
