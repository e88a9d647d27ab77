//! Study session controller - flashcard flip, quiz rounds, scoring and bookkeeping

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Word};
use crate::error::{Result, WordflowError};
use crate::progress::{
    remove_id, Clock, Counters, DashboardSummary, LocalClock, ProgressStore,
};
use crate::quiz::{self, QuizKind, QuizRound, RoundKind};
use crate::schedule::{AdvanceCause, RoundId, ScheduledAdvance, Scheduler};
use crate::storage::KeyValueStore;

/// Which words `load_next` draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    #[default]
    Normal,
    /// Review words from the mistakes set
    Mistakes,
}

impl StudyMode {
    /// Interpret the optional `mode=` hint passed in by navigation
    pub fn from_route_hint(hint: Option<&str>) -> StudyMode {
        match hint {
            Some(h) if h.trim().eq_ignore_ascii_case("mistakes") => StudyMode::Mistakes,
            _ => StudyMode::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StudyMode::Normal => "normal",
            StudyMode::Mistakes => "mistakes",
        }
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyMode {
    type Err = WordflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(StudyMode::Normal),
            "mistakes" => Ok(StudyMode::Mistakes),
            other => Err(WordflowError::InvalidSettings(format!(
                "Unknown study mode: '{}'",
                other
            ))),
        }
    }
}

/// Answer progress of the current round; card flip is tracked separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyPhase {
    Idle,
    Presented,
    Answered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub round: u64,
    pub correct: bool,
    pub expected: String,
}

/// Everything a view needs to draw the study card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySnapshot {
    pub phase: StudyPhase,
    pub round: u64,
    pub word: Option<Word>,
    pub is_flipped: bool,
    pub options: Vec<String>,
    pub masked_word: Option<String>,
    pub selected_option: Option<String>,
    pub is_correct: Option<bool>,
    pub answered_count: u64,
    pub correct_count: u64,
    pub quiz_kind: QuizKind,
    pub resolved_kind: Option<RoundKind>,
    pub study_mode: StudyMode,
    pub is_favorite: bool,
    pub is_mistake: bool,
}

/// Stateful core of a study session.
///
/// Created at mount with [`StudyController::open`], which seeds counters and
/// the favorites/mistakes sets from the store and presents the first word.
/// Deferred transitions (auto-advance after an answer, settle delay after a
/// kind or mode switch) are driven by [`StudyController::tick`] and are bound
/// to the round that scheduled them.
pub struct StudyController<S, C = LocalClock> {
    catalog: Catalog,
    progress: ProgressStore<S>,
    clock: C,
    rng: StdRng,
    scheduler: Scheduler,
    round_id: RoundId,
    round: Option<QuizRound>,
    flipped: bool,
    selected: Option<String>,
    is_correct: Option<bool>,
    counters: Counters,
    favorites: Vec<String>,
    mistakes: Vec<String>,
    quiz_kind: QuizKind,
    mode: StudyMode,
}

impl<S: KeyValueStore> StudyController<S, LocalClock> {
    /// Mount a session on the wall clock with an entropy-seeded RNG
    pub fn open(catalog: Catalog, store: S, mode: StudyMode) -> Result<Self> {
        Self::open_with(catalog, store, mode, LocalClock, StdRng::from_entropy())
    }
}

impl<S: KeyValueStore, C: Clock> StudyController<S, C> {
    pub fn open_with(
        catalog: Catalog,
        store: S,
        mode: StudyMode,
        clock: C,
        rng: StdRng,
    ) -> Result<Self> {
        let progress = ProgressStore::new(store);
        let counters = progress.counters()?;
        let favorites = progress.favorites()?;
        let mistakes = progress.mistakes()?;
        progress.daily_progress(clock.today())?;

        let mut controller = StudyController {
            catalog,
            progress,
            clock,
            rng,
            scheduler: Scheduler::new(),
            round_id: RoundId::default(),
            round: None,
            flipped: false,
            selected: None,
            is_correct: None,
            counters,
            favorites,
            mistakes,
            quiz_kind: QuizKind::default(),
            mode,
        };
        controller.load_next();
        Ok(controller)
    }

    /// Present a new word and invalidate any pending advance
    pub fn load_next(&mut self) -> &QuizRound {
        self.scheduler.cancel();

        let word = match self.mode {
            StudyMode::Mistakes => {
                match self.catalog.random_among(&self.mistakes, &mut self.rng) {
                    Some(word) => word,
                    None => {
                        if !self.mistakes.is_empty() {
                            log::warn!(
                                "None of {} mistake ids are in the catalog, picking any word",
                                self.mistakes.len()
                            );
                        }
                        self.catalog.random(&mut self.rng)
                    }
                }
            }
            StudyMode::Normal => self.catalog.random(&mut self.rng),
        };
        let round = quiz::generate(word, &self.catalog, self.quiz_kind, &mut self.rng);

        self.round_id = self.round_id.next();
        self.flipped = false;
        self.selected = None;
        self.is_correct = None;
        log::debug!(
            "Round {}: word {} as {} ({} options)",
            self.round_id.0,
            round.word_id,
            round.kind,
            round.options.len()
        );
        self.round.insert(round)
    }

    /// Toggle the card face; answer state is untouched
    pub fn flip(&mut self) -> bool {
        self.flipped = !self.flipped;
        self.flipped
    }

    /// Score `choice` against the current round.
    ///
    /// Returns `Ok(None)` without touching any state when the round was
    /// already answered or no word is loaded. On a storage error the round
    /// stays unanswered and the in-memory counters and sets are unchanged.
    pub fn select_answer(&mut self, choice: &str) -> Result<Option<AnswerOutcome>> {
        if self.selected.is_some() {
            log::debug!("Round {} already answered, ignoring", self.round_id.0);
            return Ok(None);
        }
        let Some(round) = self.round.as_ref() else {
            return Ok(None);
        };

        let correct = round.is_correct(choice);
        let word_id = round.word_id.clone();
        let expected = round.answer.clone();

        // Nothing on self changes until every write has succeeded
        let mut daily = self.progress.daily_progress(self.clock.today())?;
        daily.record(correct);
        let mut counters = self.counters;
        counters.record(correct);

        let mut mistakes = self.mistakes.clone();
        let mistakes_changed = if !correct {
            if mistakes.contains(&word_id) {
                false
            } else {
                mistakes.push(word_id);
                true
            }
        } else if self.mode == StudyMode::Mistakes {
            remove_id(&mut mistakes, &word_id)
        } else {
            false
        };

        self.progress.save_counters(&counters)?;
        if mistakes_changed {
            self.progress.save_mistakes(&mistakes)?;
        }
        self.progress.save_daily_progress(&daily)?;

        self.counters = counters;
        self.mistakes = mistakes;
        self.selected = Some(choice.to_string());
        self.is_correct = Some(correct);
        self.scheduler.schedule(self.round_id, AdvanceCause::Answered);

        Ok(Some(AnswerOutcome {
            round: self.round_id.0,
            correct,
            expected,
        }))
    }

    /// Star or unstar the current word; returns the new membership
    pub fn toggle_favorite(&mut self) -> Result<Option<bool>> {
        let Some(word_id) = self.round.as_ref().map(|r| r.word_id.clone()) else {
            return Ok(None);
        };

        let now_favorite = !remove_id(&mut self.favorites, &word_id);
        if now_favorite {
            self.favorites.push(word_id);
        }
        self.progress.save_favorites(&self.favorites)?;
        Ok(Some(now_favorite))
    }

    /// Switch quiz kind; the next word loads after the settle delay
    pub fn change_quiz_kind(&mut self, kind: QuizKind) -> ScheduledAdvance {
        log::info!("Quiz kind {} -> {}", self.quiz_kind, kind);
        self.quiz_kind = kind;
        self.scheduler.schedule(self.round_id, AdvanceCause::KindChanged)
    }

    /// Switch between normal study and mistakes review
    pub fn set_study_mode(&mut self, mode: StudyMode) -> ScheduledAdvance {
        log::info!("Study mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.scheduler.schedule(self.round_id, AdvanceCause::ModeChanged)
    }

    /// Zero the lifetime counters; favorites and mistakes are kept
    pub fn reset_counters(&mut self) -> Result<()> {
        self.counters = Counters::default();
        self.progress.save_counters(&self.counters)?;
        log::info!("Answer counters reset");
        Ok(())
    }

    /// Let `elapsed` pass; returns true when a new word was loaded
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        match self.scheduler.advance(elapsed) {
            Some(advance) if advance.round == self.round_id => {
                self.load_next();
                true
            }
            Some(advance) => {
                log::debug!(
                    "Discarding stale {:?} advance for round {} (current {})",
                    advance.cause,
                    advance.round.0,
                    self.round_id.0
                );
                false
            }
            None => false,
        }
    }

    pub fn phase(&self) -> StudyPhase {
        match (&self.round, &self.selected) {
            (None, _) => StudyPhase::Idle,
            (Some(_), None) => StudyPhase::Presented,
            (Some(_), Some(_)) => StudyPhase::Answered,
        }
    }

    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    pub fn current_round(&self) -> Option<&QuizRound> {
        self.round.as_ref()
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.round
            .as_ref()
            .and_then(|r| self.catalog.get(&r.word_id))
    }

    pub fn options(&self) -> &[String] {
        self.round.as_ref().map(|r| r.options.as_slice()).unwrap_or(&[])
    }

    pub fn masked_word(&self) -> Option<&str> {
        self.round.as_ref().and_then(|r| r.masked_word.as_deref())
    }

    pub fn resolved_kind(&self) -> Option<RoundKind> {
        self.round.as_ref().map(|r| r.kind)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn mistakes(&self) -> &[String] {
        &self.mistakes
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    pub fn is_mistake(&self, id: &str) -> bool {
        self.mistakes.iter().any(|m| m == id)
    }

    pub fn quiz_kind(&self) -> QuizKind {
        self.quiz_kind
    }

    pub fn study_mode(&self) -> StudyMode {
        self.mode
    }

    pub fn pending_advance(&self) -> Option<&ScheduledAdvance> {
        self.scheduler.pending()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressStore<S> {
        &self.progress
    }

    pub fn dashboard(&self) -> Result<DashboardSummary> {
        self.progress.dashboard(self.clock.today())
    }

    pub fn snapshot(&self) -> StudySnapshot {
        let word_id = self.round.as_ref().map(|r| r.word_id.as_str());
        StudySnapshot {
            phase: self.phase(),
            round: self.round_id.0,
            word: self.current_word().cloned(),
            is_flipped: self.flipped,
            options: self.options().to_vec(),
            masked_word: self.masked_word().map(str::to_string),
            selected_option: self.selected.clone(),
            is_correct: self.is_correct,
            answered_count: self.counters.answered,
            correct_count: self.counters.correct,
            quiz_kind: self.quiz_kind,
            resolved_kind: self.resolved_kind(),
            study_mode: self.mode,
            is_favorite: word_id.is_some_and(|id| self.is_favorite(id)),
            is_mistake: word_id.is_some_and(|id| self.is_mistake(id)),
        }
    }

    pub fn into_store(self) -> S {
        self.progress.into_inner()
    }
}
