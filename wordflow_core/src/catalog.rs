//! Word catalog - the read-only vocabulary list the study session draws from

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WordflowError};
use crate::fuzzy::{similarity, FUZZY_THRESHOLD};

/// Difficulty tag attached to every word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = WordflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(WordflowError::InvalidCatalog(format!(
                "Unknown difficulty: '{}'",
                other
            ))),
        }
    }
}

/// One part-of-speech / meaning pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub part_of_speech: String,
    pub meaning: String,
}

/// Vocabulary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub word: String,
    pub phonetic: String,
    pub translations: Vec<Translation>,
    pub examples: Vec<String>,
    pub difficulty: Difficulty,
}

impl Word {
    /// First meaning; the canonical answer of a definition round
    pub fn first_meaning(&self) -> &str {
        self.translations
            .first()
            .map(|t| t.meaning.as_str())
            .unwrap_or_default()
    }

    /// First example; the canonical answer of a sentence round
    pub fn first_example(&self) -> &str {
        self.examples.first().map(String::as_str).unwrap_or_default()
    }

    fn matches_term(&self, term: &str) -> bool {
        self.word.to_lowercase().contains(term)
            || self
                .translations
                .iter()
                .any(|t| t.meaning.to_lowercase().contains(term))
    }
}

/// Immutable, validated word list
#[derive(Debug, Clone)]
pub struct Catalog {
    words: Vec<Word>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, duplicate ids and incomplete entries
    pub fn new(words: Vec<Word>) -> Result<Self> {
        if words.is_empty() {
            return Err(WordflowError::InvalidCatalog(
                "Catalog must contain at least one word".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for word in &words {
            if !seen.insert(word.id.as_str()) {
                return Err(WordflowError::InvalidCatalog(format!(
                    "Duplicate word id: '{}'",
                    word.id
                )));
            }
            if word.word.trim().is_empty() {
                return Err(WordflowError::InvalidCatalog(format!(
                    "Word '{}' has an empty headword",
                    word.id
                )));
            }
            if word.translations.is_empty() {
                return Err(WordflowError::InvalidCatalog(format!(
                    "Word '{}' has no translations",
                    word.word
                )));
            }
            if word.examples.is_empty() {
                return Err(WordflowError::InvalidCatalog(format!(
                    "Word '{}' has no examples",
                    word.word
                )));
            }
        }

        Ok(Catalog { words })
    }

    /// The bundled ten-word dataset
    pub fn builtin() -> Self {
        Catalog {
            words: builtin_words(),
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Uniform pick over the whole catalog
    pub fn random<R: Rng>(&self, rng: &mut R) -> &Word {
        let idx = rng.gen_range(0..self.words.len());
        &self.words[idx]
    }

    /// Uniform pick among `ids` that exist in the catalog
    pub fn random_among<R: Rng>(&self, ids: &[String], rng: &mut R) -> Option<&Word> {
        let candidates: Vec<&Word> = self
            .words
            .iter()
            .filter(|w| ids.contains(&w.id))
            .collect();
        candidates.choose(rng).copied()
    }

    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&Word> {
        self.words
            .iter()
            .filter(|w| w.difficulty == difficulty)
            .collect()
    }

    /// Case-insensitive search over headwords and meanings.
    ///
    /// An empty term matches everything. When no word contains the term, the
    /// closest headwords by fuzzy similarity are returned instead, best first.
    pub fn search(&self, term: &str) -> Vec<&Word> {
        search_words(self.words.iter(), term)
    }
}

/// Search rule shared by the catalog and the favorites/mistakes views
pub(crate) fn search_words<'a>(
    words: impl Iterator<Item = &'a Word> + Clone,
    term: &str,
) -> Vec<&'a Word> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return words.collect();
    }

    let exact: Vec<&Word> = words.clone().filter(|w| w.matches_term(&term)).collect();
    if !exact.is_empty() {
        return exact;
    }

    let mut fuzzy: Vec<(&Word, f64)> = words
        .map(|w| (w, similarity(&term, &w.word)))
        .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
        .collect();
    fuzzy.sort_by(|a, b| b.1.total_cmp(&a.1));
    fuzzy.into_iter().map(|(w, _)| w).collect()
}

fn entry(
    id: &str,
    word: &str,
    phonetic: &str,
    part_of_speech: &str,
    meaning: &str,
    examples: [&str; 2],
    difficulty: Difficulty,
) -> Word {
    Word {
        id: id.to_string(),
        word: word.to_string(),
        phonetic: phonetic.to_string(),
        translations: vec![Translation {
            part_of_speech: part_of_speech.to_string(),
            meaning: meaning.to_string(),
        }],
        examples: examples.iter().map(|s| s.to_string()).collect(),
        difficulty,
    }
}

fn builtin_words() -> Vec<Word> {
    use Difficulty::*;

    vec![
        entry("1", "aberration", "/ˌæbəˈreɪʃn/", "n.", "偏离常态；异常", [
            "His strange behavior was an aberration from his usually calm demeanor.",
            "The statistical aberration was due to a calculation error.",
        ], Hard),
        entry("2", "benevolent", "/bəˈnevələnt/", "adj.", "仁慈的；善意的", [
            "She was known for her benevolent attitude toward her employees.",
            "The benevolent organization provided food and shelter to those in need.",
        ], Medium),
        entry("3", "cacophony", "/kəˈkɒfəni/", "n.", "刺耳的声音；不和谐", [
            "The cacophony of the construction site made it impossible to concentrate.",
            "Her ears were filled with the cacophony of city traffic.",
        ], Hard),
        entry("4", "diligent", "/ˈdɪlɪdʒənt/", "adj.", "勤勉的；勤奋的", [
            "She was a diligent student who always completed her assignments on time.",
            "His diligent research led to a groundbreaking discovery.",
        ], Medium),
        entry("5", "ephemeral", "/ɪˈfemərəl/", "adj.", "短暂的；瞬息的", [
            "The beauty of cherry blossoms is ephemeral, lasting only a few days.",
            "Fame can be ephemeral, especially in the entertainment industry.",
        ], Hard),
        entry("6", "fervent", "/ˈfɜːrvənt/", "adj.", "热情的；热烈的", [
            "He was a fervent supporter of environmental causes.",
            "She expressed her fervent hope that peace would prevail.",
        ], Medium),
        entry("7", "gratitude", "/ˈɡrætɪtjuːd/", "n.", "感激；感谢", [
            "She expressed her gratitude for their help during the difficult time.",
            "The letter was filled with gratitude for the generous donation.",
        ], Easy),
        entry("8", "hesitant", "/ˈhezɪtənt/", "adj.", "犹豫的；踌躇的", [
            "He was hesitant to accept the job offer without consulting his family.",
            "She gave a hesitant smile, unsure of how to respond to the compliment.",
        ], Medium),
        entry("9", "inevitable", "/ɪnˈevɪtəbl/", "adj.", "不可避免的；必然的", [
            "Change is inevitable as we move into the digital age.",
            "It seemed inevitable that they would eventually meet, given their similar interests.",
        ], Medium),
        entry("10", "jubilant", "/ˈdʒuːbɪlənt/", "adj.", "欢呼的；喜气洋洋的", [
            "The team was jubilant after winning the championship.",
            "A jubilant crowd greeted the returning heroes.",
        ], Medium),
    ]
}
