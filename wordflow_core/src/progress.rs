//! Progress tracking - typed access to persisted sets, counters and daily stats

use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::catalog::{search_words, Catalog, Word};
use crate::error::{Result, WordflowError};
use crate::settings::Settings;
use crate::storage::{
    KeyValueStore, ANSWERED_COUNT_KEY, CORRECT_COUNT_KEY, DAILY_PROGRESS_KEY, FAVORITES_KEY,
    MISTAKES_KEY, SETTINGS_KEY,
};

/// Source of "today" for daily progress
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local time zone
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Lifetime answer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub answered: u64,
    pub correct: u64,
}

impl Counters {
    pub fn record(&mut self, correct: bool) {
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
    }

    pub fn incorrect(&self) -> u64 {
        self.answered.saturating_sub(self.correct)
    }

    pub fn accuracy_percent(&self) -> f64 {
        if self.answered > 0 {
            (self.correct as f64 / self.answered as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Answers given on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub answered: u64,
    pub correct: u64,
}

impl DailyProgress {
    pub fn empty(date: NaiveDate) -> Self {
        DailyProgress {
            date,
            answered: 0,
            correct: 0,
        }
    }

    pub fn record(&mut self, correct: bool) {
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
    }
}

/// Numbers shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub studied_today: u64,
    pub daily_goal: u32,
    pub goal_percent: u32,
    pub favorites_count: usize,
    pub mistakes_count: usize,
    pub counters: Counters,
    pub accuracy_percent: f64,
}

/// Typed wrapper over a [`KeyValueStore`].
///
/// Missing keys read as first-run defaults; present but undecodable values
/// are reported as [`WordflowError::Corrupt`]. Every save is unconditional,
/// so an emptied set is written as `[]`.
pub struct ProgressStore<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(store: S) -> Self {
        ProgressStore { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn favorites(&self) -> Result<Vec<String>> {
        Ok(self.read_json(FAVORITES_KEY)?.unwrap_or_default())
    }

    pub fn save_favorites(&mut self, ids: &[String]) -> Result<()> {
        self.write_json(FAVORITES_KEY, &ids)
    }

    pub fn mistakes(&self) -> Result<Vec<String>> {
        Ok(self.read_json(MISTAKES_KEY)?.unwrap_or_default())
    }

    pub fn save_mistakes(&mut self, ids: &[String]) -> Result<()> {
        self.write_json(MISTAKES_KEY, &ids)
    }

    pub fn counters(&self) -> Result<Counters> {
        Ok(Counters {
            answered: self.read_count(ANSWERED_COUNT_KEY)?,
            correct: self.read_count(CORRECT_COUNT_KEY)?,
        })
    }

    pub fn save_counters(&mut self, counters: &Counters) -> Result<()> {
        self.store
            .write(CORRECT_COUNT_KEY, &counters.correct.to_string())?;
        self.store
            .write(ANSWERED_COUNT_KEY, &counters.answered.to_string())
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(self.read_json(SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        self.write_json(SETTINGS_KEY, settings)?;
        log::info!(
            "Settings saved (order={:?}, goal={})",
            settings.study_order,
            settings.daily_goal
        );
        Ok(())
    }

    /// Progress for `today`; a record from an earlier day reads as empty
    pub fn daily_progress(&self, today: NaiveDate) -> Result<DailyProgress> {
        let stored: Option<DailyProgress> = self.read_json(DAILY_PROGRESS_KEY)?;
        Ok(stored
            .filter(|p| p.date == today)
            .unwrap_or_else(|| DailyProgress::empty(today)))
    }

    pub fn save_daily_progress(&mut self, progress: &DailyProgress) -> Result<()> {
        self.write_json(DAILY_PROGRESS_KEY, progress)
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary> {
        let counters = self.counters()?;
        let daily = self.daily_progress(today)?;
        let daily_goal = self.settings()?.daily_goal.max(1);
        let goal_percent = ((daily.correct * 100) / u64::from(daily_goal)).min(100) as u32;

        Ok(DashboardSummary {
            studied_today: daily.correct,
            daily_goal,
            goal_percent,
            favorites_count: self.favorites()?.len(),
            mistakes_count: self.mistakes()?.len(),
            accuracy_percent: counters.accuracy_percent(),
            counters,
        })
    }

    /// Favorite words in catalog order, filtered by `term`
    pub fn favorite_words<'c>(&self, catalog: &'c Catalog, term: &str) -> Result<Vec<&'c Word>> {
        let ids = self.favorites()?;
        Ok(words_in(catalog, &ids, term))
    }

    /// Mistake words in catalog order, filtered by `term`
    pub fn mistake_words<'c>(&self, catalog: &'c Catalog, term: &str) -> Result<Vec<&'c Word>> {
        let ids = self.mistakes()?;
        Ok(words_in(catalog, &ids, term))
    }

    pub fn remove_favorite(&mut self, id: &str) -> Result<bool> {
        let mut ids = self.favorites()?;
        let removed = remove_id(&mut ids, id);
        if removed {
            self.save_favorites(&ids)?;
        }
        Ok(removed)
    }

    pub fn remove_mistake(&mut self, id: &str) -> Result<bool> {
        let mut ids = self.mistakes()?;
        let removed = remove_id(&mut ids, id);
        if removed {
            self.save_mistakes(&ids)?;
        }
        Ok(removed)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.read(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| WordflowError::corrupt(key, e)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.write(key, &raw)
    }

    fn read_count(&self, key: &str) -> Result<u64> {
        match self.store.read(key)? {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| WordflowError::corrupt(key, e)),
            None => Ok(0),
        }
    }
}

fn words_in<'c>(catalog: &'c Catalog, ids: &[String], term: &str) -> Vec<&'c Word> {
    let members = catalog.words().iter().filter(|w| ids.contains(&w.id));
    search_words(members, term)
}

/// Remove every occurrence of `id`; true when something was removed
pub(crate) fn remove_id(ids: &mut Vec<String>, id: &str) -> bool {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    ids.len() != before
}
