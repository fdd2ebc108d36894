//! Form session
//!
//! A [`Session`] is the controller behind the entry form: it owns the
//! configuration, the validator built from it and the response store, and
//! turns form actions into validated store mutations. Every mutation that
//! succeeds is already on disk when the call returns.

use crate::config::AppConfig;
use crate::error::{QnrError, Result};
use qnr_analysis::{Aggregator, BoxPlot, Figure, Heatmap, PlotInput, PlotRegistry, PlotScript};
use qnr_model::{Questionnaire, Response};
use qnr_store::{export_to_path, DeleteOutcome, ExportFormat, ResponseStore};
use qnr_validate::Validator;
use std::path::{Path, PathBuf};

/// Raw contents of the entry form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormInput {
    /// Participant identifier field
    pub participant: String,
    /// One text field per rating question
    pub ratings: Vec<String>,
    /// One text field per open question
    pub open_answers: Vec<String>,
}

impl FormInput {
    /// Create form input
    #[must_use]
    pub fn new(
        participant: impl Into<String>,
        ratings: impl IntoIterator<Item = impl Into<String>>,
        open_answers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            participant: participant.into(),
            ratings: ratings.into_iter().map(Into::into).collect(),
            open_answers: open_answers.into_iter().map(Into::into).collect(),
        }
    }
}

/// Where a submitted form is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    /// Overwrite the response under the cursor
    Current,
    /// Overwrite the response already stored under the same participant,
    /// else fill the current draft, else append
    ByParticipant,
    /// Always append a new response
    New,
}

/// Data-entry session over one store
pub struct Session {
    config: AppConfig,
    questionnaire: Questionnaire,
    validator: Validator,
    store: ResponseStore,
    plots: PlotRegistry,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store.path())
            .field("responses", &self.store.len())
            .field("cursor", &self.store.cursor())
            .field("plots", &self.plots)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session on the store at `store_path`
    ///
    /// Loads the store (an unreadable file starts an empty list) and makes
    /// sure there is a response to edit.
    ///
    /// # Errors
    /// - `QnrError::Validation` if the identifier pattern does not compile
    /// - `QnrError::Store` if the initial blank response cannot be persisted
    pub fn open(config: AppConfig, store_path: impl Into<PathBuf>) -> Result<Self> {
        let questionnaire = config.questionnaire();
        let validator = Validator::new(
            &questionnaire,
            &config.app_settings.participant_regex,
            config.rating_settings.force_ratings,
        )?;
        let store = ResponseStore::open(
            store_path,
            questionnaire.rating_slots(),
            questionnaire.open_slots(),
        )?;

        tracing::info!(
            "Session opened on {} with {} responses",
            store.path().display(),
            store.len()
        );

        Ok(Self {
            config,
            questionnaire,
            validator,
            store,
            plots: PlotRegistry::with_defaults(),
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Active questions and scale
    #[inline]
    #[must_use]
    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    /// Underlying store (read-only)
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    /// Registered plot scripts
    #[inline]
    #[must_use]
    pub fn plots(&self) -> &PlotRegistry {
        &self.plots
    }

    /// Register an additional plot script
    pub fn register_plot<S: PlotScript + 'static>(&mut self, script: S) {
        if self.plots.register(script).is_some() {
            tracing::debug!("Replaced a plot script");
        }
    }

    /// Append a blank response and move to it
    ///
    /// # Errors
    /// Returns `QnrError::Store` if persisting fails.
    pub fn new_response(&mut self) -> Result<usize> {
        let cursor = self
            .store
            .create_blank(self.questionnaire.rating_slots(), self.questionnaire.open_slots())?;
        tracing::info!("New response at position {}", cursor);
        Ok(cursor)
    }

    /// Validate the form and overwrite the response under the cursor
    ///
    /// Nothing changes when validation fails.
    ///
    /// # Errors
    /// - `QnrError::Validation` for rejected input or a duplicate identifier
    /// - `QnrError::Store` if persisting fails
    pub fn save_current(&mut self, input: &FormInput) -> Result<usize> {
        self.submit(input, SubmitTarget::Current)
    }

    /// Validate the form and write it to `target`
    ///
    /// Validation, including the uniqueness check against the final
    /// position, completes before the store is touched.
    ///
    /// # Errors
    /// - `QnrError::Validation` for rejected input or a duplicate identifier
    /// - `QnrError::Store` if persisting fails
    pub fn submit(&mut self, input: &FormInput, target: SubmitTarget) -> Result<usize> {
        let response = self.validator.validate(
            &input.participant,
            input.ratings.as_slice(),
            input.open_answers.as_slice(),
        )?;

        let index = match target {
            SubmitTarget::Current => Some(self.store.cursor()),
            SubmitTarget::New => None,
            SubmitTarget::ByParticipant => self
                .position_of(&response.participant_number)
                .or_else(|| {
                    self.store
                        .current()
                        .filter(|current| current.is_draft())
                        .map(|_| self.store.cursor())
                }),
        };
        Validator::check_unique(&response.participant_number, self.store.responses(), index)?;

        let participant = response.participant_number.clone();
        let index = match index {
            Some(index) => {
                self.store.select(index)?;
                index
            }
            None => self.new_response()?,
        };
        self.store.update(index, response)?;

        tracing::info!("Saved response for {} at position {}", participant, index);
        Ok(index)
    }

    /// Delete the response under the cursor
    ///
    /// When the store empties a fresh blank response takes its place.
    /// Returns the new cursor.
    ///
    /// # Errors
    /// Returns `QnrError::Store` if persisting fails.
    pub fn delete_current(&mut self) -> Result<usize> {
        let index = self.store.cursor();
        let cursor = match self.store.delete(index)? {
            DeleteOutcome::Remaining { cursor } => cursor,
            DeleteOutcome::Emptied => self.new_response()?,
        };
        tracing::info!("Deleted response at position {}", index);
        Ok(cursor)
    }

    /// Delete the response stored for `participant`
    ///
    /// # Errors
    /// - `QnrError::UnknownParticipant` if no response carries the id
    /// - `QnrError::Store` if persisting fails
    pub fn delete_participant(&mut self, participant: &str) -> Result<usize> {
        self.select_participant(participant)?;
        self.delete_current()
    }

    /// Move to the previous response, stopping at the first
    #[inline]
    pub fn previous(&mut self) -> usize {
        self.store.previous()
    }

    /// Move to the next response, stopping at the last
    #[inline]
    pub fn next(&mut self) -> usize {
        self.store.next()
    }

    /// Move to the response stored for `participant`
    ///
    /// # Errors
    /// Returns `QnrError::UnknownParticipant` (cursor unchanged) if absent.
    pub fn select_participant(&mut self, participant: &str) -> Result<usize> {
        self.store
            .select_by_participant(participant)
            .ok_or_else(|| QnrError::UnknownParticipant {
                id: participant.to_string(),
            })
    }

    /// Move to position `index`
    ///
    /// # Errors
    /// Returns `QnrError::Store` if `index` is out of range.
    pub fn select(&mut self, index: usize) -> Result<usize> {
        Ok(self.store.select(index)?)
    }

    /// Position of the response being edited
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.store.cursor()
    }

    /// Response under the cursor
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&Response> {
        self.store.current()
    }

    /// Form fields for the response under the cursor
    ///
    /// One field per configured slot; slots missing from the stored response
    /// are empty.
    #[must_use]
    pub fn current_form(&self) -> FormInput {
        let Some(response) = self.store.current() else {
            return FormInput::default();
        };
        FormInput {
            participant: response.participant_number.clone(),
            ratings: (0..self.questionnaire.rating_slots())
                .map(|slot| response.rating(slot).map(ToString::to_string).unwrap_or_default())
                .collect(),
            open_answers: (0..self.questionnaire.open_slots())
                .map(|slot| response.open_answer(slot).unwrap_or_default().to_string())
                .collect(),
        }
    }

    /// Saved participant ids in participant order
    #[inline]
    #[must_use]
    pub fn participant_choices(&self) -> Vec<&str> {
        self.store.participant_choices()
    }

    /// Export every stored response to `path`
    ///
    /// # Errors
    /// Returns `QnrError::Export` if there is nothing to export or the
    /// file cannot be written.
    pub fn export(&self, path: &Path) -> Result<ExportFormat> {
        Ok(export_to_path(
            self.store.responses(),
            path,
            self.questionnaire.rating_slots(),
            self.questionnaire.open_slots(),
        )?)
    }

    /// Box plot of participant means per group
    ///
    /// # Errors
    /// Returns `QnrError::NothingToVisualize` without saved responses.
    pub fn box_plot(&self) -> Result<Figure> {
        self.ensure_saved()?;
        let groups = Aggregator::new(&self.questionnaire).group_scores(self.store.responses());
        let show_means = self.config.visualization_settings.plot_defaults.show_means_in_violin;
        Ok(Figure::BoxPlot(BoxPlot::from_groups(&groups).with_means(show_means)))
    }

    /// Heatmap of normalized scores, question × participant
    ///
    /// # Errors
    /// Returns `QnrError::NothingToVisualize` without saved responses.
    pub fn heatmap(&self) -> Result<Figure> {
        self.ensure_saved()?;
        let matrix =
            Aggregator::new(&self.questionnaire).participant_matrix(self.store.responses());
        Ok(Figure::Heatmap(Heatmap::from_matrix(
            matrix,
            self.questionnaire.scale,
            self.config.heatmap_colormap(),
        )))
    }

    /// Run the plot script registered under `name`
    ///
    /// # Errors
    /// - `QnrError::NothingToVisualize` without saved responses
    /// - `QnrError::Plot` for an unknown or failing script
    pub fn run_plot(&self, name: &str) -> Result<Figure> {
        self.ensure_saved()?;
        let input = PlotInput::new(self.store.responses(), &self.questionnaire);
        Ok(self.plots.run(name, &input)?)
    }

    fn ensure_saved(&self) -> Result<()> {
        if self.store.responses().iter().all(Response::is_draft) {
            return Err(QnrError::NothingToVisualize);
        }
        Ok(())
    }

    fn position_of(&self, participant: &str) -> Option<usize> {
        self.store
            .responses()
            .iter()
            .position(|r| r.participant_number == participant)
    }
}
