//! WordFlow Core - vocabulary flashcards and quizzes
//!
//! Provides the word catalog, quiz round generation, a study session
//! controller, and key-value persistence for favorites, mistakes and counters.

mod error;
mod fuzzy;

pub mod catalog;
pub mod import;
pub mod progress;
pub mod quiz;
pub mod schedule;
pub mod settings;
pub mod storage;
pub mod study;

#[cfg(feature = "python")]
mod python;

pub use catalog::{Catalog, Difficulty, Translation, Word};
pub use error::{Result, WordflowError};
pub use fuzzy::{similarity, FUZZY_THRESHOLD};
pub use import::import_file;
pub use progress::{
    Clock, Counters, DailyProgress, DashboardSummary, FixedClock, LocalClock, ProgressStore,
};
pub use quiz::{generate, mask_word, QuizKind, QuizRound, RoundKind};
pub use schedule::{AdvanceCause, RoundId, ScheduledAdvance, ADVANCE_DELAY, SETTLE_DELAY};
pub use settings::{Notifications, Settings, StudyOrder};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use study::{AnswerOutcome, StudyController, StudyMode, StudyPhase, StudySnapshot};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// WordFlow Core Python Module
#[cfg(feature = "python")]
#[pymodule]
fn wordflow_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(python::py_list_words, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_remove_from_list, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_mask_word, m)?)?;

    m.add_class::<python::PyStudySession>()?;

    Ok(())
}
