//! Application configuration
//!
//! `config.json` holds four sections. Each field is read on its own: a field
//! of the wrong shape is replaced by its default with a warning. A file that
//! is missing or not JSON is fatal, and so is a malformed question list,
//! since no default can stand in for the questions stored responses refer to.

use qnr_model::{Questionnaire, RatingQuestion, RatingScale};
use qnr_validate::{compile_participant_pattern, DEFAULT_PARTICIPANT_PATTERN};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Configuration file used when none is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Keys accepted by [`AppConfig::set`]
pub const SETTABLE_KEYS: [&str; 9] = [
    "window_title",
    "window_size",
    "participant_regex",
    "scale_start",
    "scale_end",
    "force_ratings",
    "heatmap_colormap",
    "show_means_in_violin",
    "save_plot_formats",
];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file at the path
    #[error("configuration file '{path}' not found; create one with `qnr config init`")]
    Missing { path: PathBuf },

    /// File exists but cannot be read
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed JSON with unusable content
    #[error("invalid configuration {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    /// Starter file could not be written
    #[error("failed to write configuration {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be encoded
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] serde_json::Error),

    /// Edit rejected before anything was written
    #[error("cannot set '{key}' to '{value}': {reason}")]
    BadSetting {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    fn bad_setting(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::BadSetting {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Full configuration document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Window and identifier settings
    pub app_settings: AppSettings,
    /// Rating questions and scale
    pub rating_settings: RatingSettings,
    /// Free-text questions
    pub open_questions_settings: OpenQuestionsSettings,
    /// Figure defaults
    pub visualization_settings: VisualizationSettings,
}

/// `app_settings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppSettings {
    /// Title shown above the form
    pub window_title: String,
    /// Preferred form size, `WIDTHxHEIGHT`
    ///
    /// Carried for graphical front ends; the terminal form has no window.
    /// Checked when edited through [`AppConfig::set`].
    pub window_size: String,
    /// Participant identifier pattern, matched from the start of the id
    pub participant_regex: String,
}

impl AppSettings {
    /// `window_size` as `(width, height)`, if it reads `WIDTHxHEIGHT`
    #[must_use]
    pub fn window_dimensions(&self) -> Option<(u32, u32)> {
        parse_window_size(&self.window_size)
    }
}

fn parse_window_size(raw: &str) -> Option<(u32, u32)> {
    let (width, height) = raw.trim().split_once(['x', 'X'])?;
    let width: u32 = width.trim().parse().ok().filter(|w| *w > 0)?;
    let height: u32 = height.trim().parse().ok().filter(|h| *h > 0)?;
    Some((width, height))
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_title: "Dynamic Questionnaire App".to_string(),
            window_size: "600x700".to_string(),
            participant_regex: DEFAULT_PARTICIPANT_PATTERN.to_string(),
        }
    }
}

/// `rating_settings`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RatingSettings {
    /// One entry per rating slot
    pub questions: Vec<RatingQuestion>,
    /// Inclusive `[start, end]` shared by every question
    #[schemars(with = "(i64, i64)")]
    pub default_rating_range: RatingScale,
    /// Require every rating and open answer before saving
    pub force_ratings: bool,
}

/// `open_questions_settings`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OpenQuestionsSettings {
    /// One entry per open-answer slot
    pub questions: Vec<String>,
}

/// `visualization_settings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VisualizationSettings {
    /// Per-figure defaults
    pub plot_defaults: PlotDefaults,
    /// File formats offered when saving figures
    ///
    /// Carried for renderers of the JSON figures; the terminal output is
    /// text or JSON only.
    pub save_plot_formats: Vec<String>,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            plot_defaults: PlotDefaults::default(),
            save_plot_formats: vec!["png".to_string(), "pdf".to_string()],
        }
    }
}

/// `visualization_settings.plot_defaults`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlotDefaults {
    /// Colormap name for the heatmap
    pub heatmap_colormap: String,
    /// Mark group means on the box plot
    pub show_means_in_violin: bool,
}

impl Default for PlotDefaults {
    fn default() -> Self {
        Self {
            heatmap_colormap: qnr_analysis::DEFAULT_COLORMAP.to_string(),
            show_means_in_violin: false,
        }
    }
}

impl AppConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration written by `config init`
    ///
    /// One sample question, forced answers.
    #[must_use]
    pub fn starter() -> Self {
        let mut config = Self::default();
        config.rating_settings.force_ratings = true;
        config.rating_settings.questions = vec![RatingQuestion::new(
            "I quickly understood how to interact with the installation.",
        )];
        config.visualization_settings.plot_defaults.show_means_in_violin = true;
        config
    }

    /// With rating questions
    #[inline]
    #[must_use]
    pub fn with_rating_questions(mut self, questions: Vec<RatingQuestion>) -> Self {
        self.rating_settings.questions = questions;
        self
    }

    /// With open questions
    #[inline]
    #[must_use]
    pub fn with_open_questions(mut self, questions: Vec<String>) -> Self {
        self.open_questions_settings.questions = questions;
        self
    }

    /// With rating scale
    #[inline]
    #[must_use]
    pub fn with_scale(mut self, scale: RatingScale) -> Self {
        self.rating_settings.default_rating_range = scale;
        self
    }

    /// With forced answers
    #[inline]
    #[must_use]
    pub fn with_force_ratings(mut self, force: bool) -> Self {
        self.rating_settings.force_ratings = force;
        self
    }

    /// Load configuration from `path`
    ///
    /// # Errors
    /// - `ConfigError::Missing` if there is no file
    /// - `ConfigError::Read` if it cannot be read
    /// - `ConfigError::Parse` if it is not JSON
    /// - `ConfigError::Invalid` if the top level is not an object or the
    ///   rating range is reversed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::Missing {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let config = Self::from_json(&raw).map_err(|err| match err {
            LoadIssue::Parse(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            LoadIssue::Invalid(reason) => ConfigError::invalid(path, reason),
        })?;

        tracing::info!(
            "Loaded configuration from {} ({} rating, {} open questions)",
            path.display(),
            config.rating_settings.questions.len(),
            config.open_questions_settings.questions.len()
        );
        Ok(config)
    }

    fn from_json(raw: &str) -> Result<Self, LoadIssue> {
        let document: Value = serde_json::from_str(raw).map_err(LoadIssue::Parse)?;
        let Value::Object(sections) = document else {
            return Err(LoadIssue::Invalid(
                "top level must be a JSON object".to_string(),
            ));
        };

        let mut rejected = Vec::new();
        let mut config = Self {
            app_settings: section(&sections, "app_settings", &mut rejected),
            rating_settings: section(&sections, "rating_settings", &mut rejected),
            open_questions_settings: section(&sections, "open_questions_settings", &mut rejected),
            visualization_settings: section(&sections, "visualization_settings", &mut rejected),
        };

        if let Some(field) = rejected
            .iter()
            .find(|field| REQUIRED_WHEN_PRESENT.contains(&field.as_str()))
        {
            return Err(LoadIssue::Invalid(format!(
                "'{field}' is malformed and has no default"
            )));
        }

        let pattern = &config.app_settings.participant_regex;
        if let Err(err) = compile_participant_pattern(pattern) {
            tracing::warn!("{}; using default pattern", err);
            config.app_settings.participant_regex = DEFAULT_PARTICIPANT_PATTERN.to_string();
        }

        let scale = config.rating_settings.default_rating_range;
        if !scale.is_well_formed() {
            return Err(LoadIssue::Invalid(format!(
                "default_rating_range start {} exceeds end {}",
                scale.start, scale.end
            )));
        }

        Ok(config)
    }

    /// Write the starter configuration to `path`
    ///
    /// # Errors
    /// - `ConfigError::Write` if the file cannot be written
    pub fn write_default(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::starter();
        config.write(path)?;
        Ok(config)
    }

    /// Write this configuration to `path` as pretty JSON
    ///
    /// # Errors
    /// - `ConfigError::Encode` if encoding fails
    /// - `ConfigError::Write` if the file cannot be written
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let encoded = serde_json::to_string_pretty(self)?;
        fs::write(path, encoded).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Wrote configuration to {}", path.display());
        Ok(())
    }

    /// Change one setting by key
    ///
    /// Values are checked before anything changes: sizes must read
    /// `WIDTHxHEIGHT`, patterns must compile, scale bounds must keep
    /// `start <= end`, flags read `true`/`false` (also `yes`/`no`, `on`/`off`,
    /// `1`/`0`) and formats are a comma-separated list.
    ///
    /// # Errors
    /// Returns `ConfigError::BadSetting` for an unknown key or unusable value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let bad = |reason: &str| ConfigError::bad_setting(key, value, reason);
        let trimmed = value.trim();

        match key {
            "window_title" => self.app_settings.window_title = trimmed.to_string(),
            "window_size" => {
                let (width, height) =
                    parse_window_size(trimmed).ok_or_else(|| bad("expected WIDTHxHEIGHT"))?;
                self.app_settings.window_size = format!("{width}x{height}");
            }
            "participant_regex" => {
                compile_participant_pattern(trimmed).map_err(|err| bad(&err.to_string()))?;
                self.app_settings.participant_regex = trimmed.to_string();
            }
            "scale_start" | "scale_end" => {
                let bound: i64 = trimmed.parse().map_err(|_| bad("expected an integer"))?;
                let mut scale = self.rating_settings.default_rating_range;
                if key == "scale_start" {
                    scale.start = bound;
                } else {
                    scale.end = bound;
                }
                if !scale.is_well_formed() {
                    return Err(bad("scale start must not exceed its end"));
                }
                self.rating_settings.default_rating_range = scale;
            }
            "force_ratings" => {
                self.rating_settings.force_ratings =
                    parse_flag(trimmed).ok_or_else(|| bad("expected true or false"))?;
            }
            "show_means_in_violin" => {
                self.visualization_settings.plot_defaults.show_means_in_violin =
                    parse_flag(trimmed).ok_or_else(|| bad("expected true or false"))?;
            }
            "heatmap_colormap" => {
                if trimmed.is_empty() {
                    return Err(bad("colormap name is empty"));
                }
                self.visualization_settings.plot_defaults.heatmap_colormap = trimmed.to_string();
            }
            "save_plot_formats" => {
                let formats: Vec<String> = trimmed
                    .split(',')
                    .map(|format| format.trim().trim_start_matches('.').to_ascii_lowercase())
                    .filter(|format| !format.is_empty())
                    .collect();
                if formats.is_empty() {
                    return Err(bad("expected at least one format"));
                }
                self.visualization_settings.save_plot_formats = formats;
            }
            _ => {
                return Err(bad(&format!(
                    "unknown key; expected one of {}",
                    SETTABLE_KEYS.join(", ")
                )))
            }
        }

        tracing::debug!("Set {} = {}", key, trimmed);
        Ok(())
    }

    /// Append a rating question, returning the new question count
    ///
    /// # Errors
    /// Returns `ConfigError::BadSetting` for a blank statement.
    pub fn add_rating_question(
        &mut self,
        statement: &str,
        is_negative: bool,
    ) -> Result<usize, ConfigError> {
        let statement = statement.trim();
        if statement.is_empty() {
            return Err(ConfigError::bad_setting(
                "rating_settings.questions",
                statement,
                "statement is empty",
            ));
        }
        let question = if is_negative {
            RatingQuestion::negative(statement)
        } else {
            RatingQuestion::new(statement)
        };
        self.rating_settings.questions.push(question);
        Ok(self.rating_settings.questions.len())
    }

    /// Drop the last rating question
    #[inline]
    pub fn remove_last_rating_question(&mut self) -> Option<RatingQuestion> {
        self.rating_settings.questions.pop()
    }

    /// Append an open question, returning the new question count
    ///
    /// # Errors
    /// Returns `ConfigError::BadSetting` for blank text.
    pub fn add_open_question(&mut self, question: &str) -> Result<usize, ConfigError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ConfigError::bad_setting(
                "open_questions_settings.questions",
                question,
                "question is empty",
            ));
        }
        self.open_questions_settings.questions.push(question.to_string());
        Ok(self.open_questions_settings.questions.len())
    }

    /// Drop the last open question
    #[inline]
    pub fn remove_last_open_question(&mut self) -> Option<String> {
        self.open_questions_settings.questions.pop()
    }

    /// JSON Schema of the configuration document
    #[must_use]
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AppConfig)
    }

    /// Active questions and scale
    #[must_use]
    pub fn questionnaire(&self) -> Questionnaire {
        Questionnaire::new(
            self.rating_settings.questions.clone(),
            self.open_questions_settings.questions.clone(),
            self.rating_settings.default_rating_range,
        )
    }

    /// Heatmap colormap name
    #[inline]
    #[must_use]
    pub fn heatmap_colormap(&self) -> &str {
        &self.visualization_settings.plot_defaults.heatmap_colormap
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
enum LoadIssue {
    Parse(serde_json::Error),
    Invalid(String),
}

/// Fields whose fallback would drop the meaning of stored responses
const REQUIRED_WHEN_PRESENT: [&str; 4] = [
    "rating_settings",
    "rating_settings.questions",
    "open_questions_settings",
    "open_questions_settings.questions",
];

/// Read one section, falling back field by field
///
/// Each provided field is tried on top of what has been accepted so far and
/// kept only if the section still deserializes. Nested objects are merged the
/// same way. Dotted paths of rejected fields are appended to `rejected`.
fn section<T>(sections: &Map<String, Value>, name: &str, rejected: &mut Vec<String>) -> T
where
    T: DeserializeOwned + Serialize + Default,
{
    let Some(provided) = sections.get(name) else {
        return T::default();
    };
    if let Ok(section) = serde_json::from_value(provided.clone()) {
        return section;
    }
    let Ok(mut accepted) = serde_json::to_value(T::default()) else {
        return T::default();
    };

    let mut path = vec![name.to_string()];
    merge_fields::<T>(&mut accepted, provided, &mut path, rejected);
    serde_json::from_value(accepted).unwrap_or_default()
}

fn merge_fields<T: DeserializeOwned>(
    accepted: &mut Value,
    provided: &Value,
    path: &mut Vec<String>,
    rejected: &mut Vec<String>,
) {
    let Value::Object(fields) = provided else {
        reject(path, rejected);
        return;
    };

    for (key, field) in fields {
        path.push(key.clone());
        let nested =
            field.is_object() && lookup(accepted, &path[1..]).is_some_and(Value::is_object);
        if nested {
            merge_fields::<T>(accepted, field, path, rejected);
        } else {
            let mut candidate = accepted.clone();
            if let Some(parent) = object_at(&mut candidate, &path[1..path.len() - 1]) {
                parent.insert(key.clone(), field.clone());
            }
            if serde_json::from_value::<T>(candidate.clone()).is_ok() {
                *accepted = candidate;
            } else {
                reject(path, rejected);
            }
        }
        path.pop();
    }
}

fn reject(path: &[String], rejected: &mut Vec<String>) {
    let dotted = path.join(".");
    tracing::warn!("Ignoring malformed '{}'; using its default", dotted);
    rejected.push(dotted);
}

fn lookup<'v>(root: &'v Value, keys: &[String]) -> Option<&'v Value> {
    keys.iter().try_fold(root, |node, key| node.get(key.as_str()))
}

fn object_at<'v>(root: &'v mut Value, keys: &[String]) -> Option<&'v mut Map<String, Value>> {
    keys.iter()
        .try_fold(root, |node, key| node.get_mut(key.as_str()))?
        .as_object_mut()
}
