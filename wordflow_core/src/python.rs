//! Python bindings for a host UI

use std::time::Duration;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::catalog::Catalog;
use crate::error::WordflowError;
use crate::import::import_file;
use crate::progress::ProgressStore;
use crate::quiz::{mask_word, QuizKind};
use crate::storage::SqliteStore;
use crate::study::{StudyController, StudyMode};

impl From<WordflowError> for PyErr {
    fn from(err: WordflowError) -> PyErr {
        match err {
            WordflowError::InvalidSettings(_)
            | WordflowError::InvalidCatalog(_)
            | WordflowError::UnsupportedFormat(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn load_catalog(catalog_path: Option<&str>) -> PyResult<Catalog> {
    match catalog_path {
        Some(path) => Ok(import_file(path)?),
        None => Ok(Catalog::builtin()),
    }
}

/// Study session persisted in a SQLite file
#[pyclass(unsendable, name = "StudySession")]
pub struct PyStudySession {
    inner: StudyController<SqliteStore>,
}

#[pymethods]
impl PyStudySession {
    #[new]
    #[pyo3(signature = (db_path, catalog_path=None, mode=None))]
    fn new(db_path: &str, catalog_path: Option<&str>, mode: Option<&str>) -> PyResult<Self> {
        let catalog = load_catalog(catalog_path)?;
        let store = SqliteStore::open(db_path)?;
        let inner = StudyController::open(catalog, store, StudyMode::from_route_hint(mode))?;
        Ok(PyStudySession { inner })
    }

    fn load_next(&mut self) {
        self.inner.load_next();
    }

    fn flip(&mut self) -> bool {
        self.inner.flip()
    }

    /// Returns the correctness, or None when the round was already answered
    fn select_answer(&mut self, choice: &str) -> PyResult<Option<bool>> {
        Ok(self.inner.select_answer(choice)?.map(|o| o.correct))
    }

    fn toggle_favorite(&mut self) -> PyResult<Option<bool>> {
        Ok(self.inner.toggle_favorite()?)
    }

    fn change_quiz_kind(&mut self, kind: &str) -> PyResult<()> {
        let kind: QuizKind = kind.parse()?;
        self.inner.change_quiz_kind(kind);
        Ok(())
    }

    fn set_study_mode(&mut self, mode: &str) -> PyResult<()> {
        let mode: StudyMode = mode.parse()?;
        self.inner.set_study_mode(mode);
        Ok(())
    }

    fn reset_counters(&mut self) -> PyResult<()> {
        Ok(self.inner.reset_counters()?)
    }

    /// Feed elapsed UI time; returns True when a new word was loaded
    fn tick(&mut self, elapsed_ms: u64) -> bool {
        self.inner.tick(Duration::from_millis(elapsed_ms))
    }

    fn is_favorite(&self, word_id: &str) -> bool {
        self.inner.is_favorite(word_id)
    }

    fn is_mistake(&self, word_id: &str) -> bool {
        self.inner.is_mistake(word_id)
    }

    /// Current card state as JSON
    fn snapshot(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.snapshot())
            .map_err(|e| PyErr::from(WordflowError::from(e)))
    }

    fn dashboard(&self) -> PyResult<String> {
        let summary = self.inner.dashboard()?;
        serde_json::to_string(&summary).map_err(|e| PyErr::from(WordflowError::from(e)))
    }

    fn __repr__(&self) -> String {
        let counters = self.inner.counters();
        format!(
            "StudySession(mode='{}', kind='{}', answered={}, correct={})",
            self.inner.study_mode(),
            self.inner.quiz_kind(),
            counters.answered,
            counters.correct
        )
    }
}

/// Words in the favorites or mistakes list as JSON, filtered by `term`
#[pyfunction]
#[pyo3(name = "list_words", signature = (db_path, list, term="", catalog_path=None))]
pub fn py_list_words(
    db_path: &str,
    list: &str,
    term: &str,
    catalog_path: Option<&str>,
) -> PyResult<String> {
    let catalog = load_catalog(catalog_path)?;
    let progress = ProgressStore::new(SqliteStore::open(db_path)?);
    let words = match list {
        "favorites" => progress.favorite_words(&catalog, term)?,
        "mistakes" => progress.mistake_words(&catalog, term)?,
        other => {
            return Err(PyValueError::new_err(format!("Unknown list: '{}'", other)));
        }
    };
    serde_json::to_string(&words).map_err(|e| PyErr::from(WordflowError::from(e)))
}

/// Remove one id from the favorites or mistakes list
#[pyfunction]
#[pyo3(name = "remove_from_list")]
pub fn py_remove_from_list(db_path: &str, list: &str, word_id: &str) -> PyResult<bool> {
    let mut progress = ProgressStore::new(SqliteStore::open(db_path)?);
    match list {
        "favorites" => Ok(progress.remove_favorite(word_id)?),
        "mistakes" => Ok(progress.remove_mistake(word_id)?),
        other => Err(PyValueError::new_err(format!("Unknown list: '{}'", other))),
    }
}

#[pyfunction]
#[pyo3(name = "mask_word")]
pub fn py_mask_word(word: &str) -> String {
    mask_word(word)
}
