//! Persistent response store
//!
//! [`ResponseStore`] owns the ordered response list, its backing JSON file and
//! the cursor marking the response being edited. It is the only writer of the
//! file: every successful create, update or delete rewrites the whole file
//! before returning.

use crate::error::{StoreError, StoreLoadError, StoreResult};
use qnr_model::{sort_participants, Response};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of [`ResponseStore::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Responses remain; cursor clamped to this index
    Remaining {
        /// Cursor after removal
        cursor: usize,
    },

    /// Store is now empty; the caller must create a blank response
    Emptied,
}

/// Ordered response list with its backing file and cursor
///
/// # Invariants
/// - `cursor < len()` whenever the store is non-empty
/// - memory is never behind disk; after a failed write it may be ahead
#[derive(Debug)]
pub struct ResponseStore {
    path: PathBuf,
    responses: Vec<Response>,
    cursor: usize,
    load_error: Option<StoreLoadError>,
}

impl ResponseStore {
    /// Load the store at `path`
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// also yields an empty store: the cause is logged, kept in
    /// [`load_error`](Self::load_error), and the bad file is copied aside
    /// (`<file>.corrupt`) before anything can overwrite it.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (responses, load_error) = match Self::read_responses(&path) {
            Ok(responses) => (responses, None),
            Err(err) => {
                tracing::warn!("Starting with no responses: {}", err);
                preserve_corrupt(&path);
                (Vec::new(), Some(err))
            }
        };

        tracing::debug!("Loaded {} responses from {}", responses.len(), path.display());

        Self {
            path,
            responses,
            cursor: 0,
            load_error,
        }
    }

    /// Load the store and make sure there is a response to edit
    ///
    /// Creates (and persists) a blank response when the loaded list is empty.
    ///
    /// # Errors
    /// Returns `StoreError::Write` if the blank response cannot be persisted.
    pub fn open(
        path: impl Into<PathBuf>,
        rating_slots: usize,
        open_slots: usize,
    ) -> StoreResult<Self> {
        let mut store = Self::load(path);
        if store.is_empty() {
            store.create_blank(rating_slots, open_slots)?;
        }
        Ok(store)
    }

    /// Strictly read a response file
    ///
    /// A missing file is an empty list, not an error.
    ///
    /// # Errors
    /// Returns `StoreLoadError` if the file cannot be read or decoded.
    pub fn read_responses(path: &Path) -> Result<Vec<Response>, StoreLoadError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| StoreLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overwrite the backing file with the in-memory list
    ///
    /// Writes to a sibling temporary file and renames it over the target, so
    /// an interrupted write leaves the previous file intact.
    ///
    /// # Errors
    /// Returns `StoreError::Write` on IO failure.
    pub fn save(&self) -> StoreResult<()> {
        let encoded = serde_json::to_string_pretty(&self.responses)?;
        let staging = staging_path(&self.path);

        fs::write(&staging, encoded).map_err(|e| StoreError::write_error(&staging, e))?;
        fs::rename(&staging, &self.path).map_err(|e| StoreError::write_error(&self.path, e))?;

        tracing::debug!(
            "Persisted {} responses to {}",
            self.responses.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Append a blank response and move the cursor to it
    ///
    /// # Errors
    /// Returns `StoreError::Write` if persisting fails; the blank response
    /// stays in memory.
    pub fn create_blank(&mut self, rating_slots: usize, open_slots: usize) -> StoreResult<usize> {
        self.responses.push(Response::blank(rating_slots, open_slots));
        self.cursor = self.responses.len() - 1;
        self.save()?;
        Ok(self.cursor)
    }

    /// Replace the response at `index` wholesale
    ///
    /// # Errors
    /// - `StoreError::IndexOutOfRange` (nothing changes)
    /// - `StoreError::Write` if persisting fails (memory keeps the update)
    pub fn update(&mut self, index: usize, response: Response) -> StoreResult<()> {
        let len = self.responses.len();
        let slot = self
            .responses
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        *slot = response;
        self.save()
    }

    /// Remove the response at `index`
    ///
    /// The cursor becomes `min(cursor, len - 1)`. When the last response is
    /// removed the outcome is [`DeleteOutcome::Emptied`] and the caller is
    /// expected to call [`create_blank`](Self::create_blank).
    ///
    /// # Errors
    /// - `StoreError::IndexOutOfRange` (nothing changes)
    /// - `StoreError::Write` if persisting fails (memory keeps the removal)
    pub fn delete(&mut self, index: usize) -> StoreResult<DeleteOutcome> {
        if index >= self.responses.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.responses.len(),
            });
        }

        self.responses.remove(index);
        let outcome = if self.responses.is_empty() {
            self.cursor = 0;
            DeleteOutcome::Emptied
        } else {
            self.cursor = self.cursor.min(self.responses.len() - 1);
            DeleteOutcome::Remaining {
                cursor: self.cursor,
            }
        };

        self.save()?;
        Ok(outcome)
    }

    /// Move the cursor back one position, stopping at the first response
    pub fn previous(&mut self) -> usize {
        self.cursor = self.cursor.saturating_sub(1);
        self.cursor
    }

    /// Move the cursor forward one position, stopping at the last response
    pub fn next(&mut self) -> usize {
        if self.cursor + 1 < self.responses.len() {
            self.cursor += 1;
        }
        self.cursor
    }

    /// Move the cursor to the first response with exactly this identifier
    ///
    /// Returns the new cursor, or `None` (cursor unchanged) if absent.
    pub fn select_by_participant(&mut self, participant: &str) -> Option<usize> {
        let index = self
            .responses
            .iter()
            .position(|r| r.participant_number == participant)?;
        self.cursor = index;
        Some(index)
    }

    /// Move the cursor to `index`
    ///
    /// # Errors
    /// Returns `StoreError::IndexOutOfRange` (cursor unchanged).
    pub fn select(&mut self, index: usize) -> StoreResult<usize> {
        if index >= self.responses.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.responses.len(),
            });
        }
        self.cursor = index;
        Ok(index)
    }

    /// Position of the response being edited
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Response under the cursor
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&Response> {
        self.responses.get(self.cursor)
    }

    /// Response at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Response> {
        self.responses.get(index)
    }

    /// All responses in storage order
    #[inline]
    #[must_use]
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Number of stored responses
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Whether the store holds no responses
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the last load fell back to an empty list, if it did
    #[inline]
    #[must_use]
    pub fn load_error(&self) -> Option<&StoreLoadError> {
        self.load_error.as_ref()
    }

    /// Participant identifiers ordered by participant key
    #[must_use]
    pub fn participant_choices(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .responses
            .iter()
            .map(|r| r.participant_number.as_str())
            .collect();
        sort_participants(&mut ids);
        ids
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn preserve_corrupt(path: &Path) {
    if !path.exists() {
        return;
    }
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".corrupt");
    let backup = path.with_file_name(name);
    match fs::copy(path, &backup) {
        Ok(_) => tracing::warn!("Copied unreadable response file to {}", backup.display()),
        Err(e) => tracing::warn!("Could not copy unreadable response file aside: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qnr_model::RatingValue;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ResponseStore {
        ResponseStore::load(dir.path().join("responses.json"))
    }

    fn filled(dir: &TempDir, ids: &[&str]) -> ResponseStore {
        let mut store = store_in(dir);
        for id in ids {
            store.create_blank(1, 0).unwrap();
            let response = Response::new(*id, [RatingValue::Score(3)], Vec::<String>::new());
            store.update(store.cursor(), response).unwrap();
        }
        store
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.is_empty());
        assert!(store.load_error().is_none());
    }

    #[test]
    fn malformed_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("responses.json");
        fs::write(&path, "{ not json").unwrap();

        let store = ResponseStore::load(&path);
        assert!(store.is_empty());
        assert!(matches!(store.load_error(), Some(StoreLoadError::Malformed { .. })));
        assert!(dir.path().join("responses.json.corrupt").exists());
    }

    #[test]
    fn open_creates_blank_when_empty() {
        let dir = TempDir::new().unwrap();
        let store = ResponseStore::open(dir.path().join("r.json"), 3, 2).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.cursor(), 0);
        assert_eq!(store.current(), Some(&Response::blank(3, 2)));
    }

    #[test]
    fn create_blank_moves_cursor_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = filled(&dir, &["a1", "a2"]);
        store.select(0).unwrap();

        let index = store.create_blank(1, 0).unwrap();
        assert_eq!(index, 2);
        assert_eq!(store.cursor(), 2);

        let reloaded = ResponseStore::read_responses(store.path()).unwrap();
        assert_eq!(reloaded.len(), 3);
    }

    #[test]
    fn update_out_of_range_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = filled(&dir, &["a1"]);
        let before = store.responses().to_vec();

        let err = store.update(5, Response::default()).unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { index: 5, len: 1 }));
        assert_eq!(store.responses(), before.as_slice());
    }

    #[test]
    fn delete_clamps_cursor() {
        let dir = TempDir::new().unwrap();
        let mut store = filled(&dir, &["a1", "a2", "a3"]);
        assert_eq!(store.cursor(), 2);

        let outcome = store.delete(2).unwrap();
        assert_eq!(outcome, DeleteOutcome::Remaining { cursor: 1 });

        store.select(0).unwrap();
        let outcome = store.delete(0).unwrap();
        assert_eq!(outcome, DeleteOutcome::Remaining { cursor: 0 });
        assert_eq!(store.current().unwrap().participant_number, "a2");
    }

    #[test]
    fn delete_last_reports_emptied() {
        let dir = TempDir::new().unwrap();
        let mut store = filled(&dir, &["a1"]);
        assert_eq!(store.delete(0).unwrap(), DeleteOutcome::Emptied);
        assert!(store.is_empty());
        assert!(ResponseStore::read_responses(store.path()).unwrap().is_empty());
    }

    #[test]
    fn navigation_saturates() {
        let dir = TempDir::new().unwrap();
        let mut store = filled(&dir, &["a1", "a2"]);
        assert_eq!(store.next(), 1);
        assert_eq!(store.next(), 1);
        assert_eq!(store.previous(), 0);
        assert_eq!(store.previous(), 0);
    }

    #[test]
    fn select_by_participant_is_exact() {
        let dir = TempDir::new().unwrap();
        let mut store = filled(&dir, &["a1", "A1", "b2"]);
        assert_eq!(store.select_by_participant("A1"), Some(1));
        assert_eq!(store.select_by_participant("c9"), None);
        assert_eq!(store.cursor(), 1);
    }

    #[test]
    fn participant_choices_are_sorted() {
        let dir = TempDir::new().unwrap();
        let store = filled(&dir, &["b2", "a10", "a2"]);
        assert_eq!(store.participant_choices(), vec!["a2", "a10", "b2"]);
    }

    #[test]
    fn failed_write_keeps_memory_ahead() {
        let dir = TempDir::new().unwrap();
        let mut store = ResponseStore::load(dir.path().join("missing-dir").join("r.json"));

        let err = store.create_blank(1, 0).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(store.len(), 1);
    }
}
