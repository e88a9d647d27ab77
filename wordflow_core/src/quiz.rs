//! Multiple-choice round generation for the study session

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Word};
use crate::error::WordflowError;

/// Number of wrong options offered next to the correct one
pub const DISTRACTOR_COUNT: usize = 3;

/// Character standing in for hidden letters in a completion round
pub const MASK_CHAR: char = '_';

/// Quiz kind chosen by the user; `Mixed` resolves per round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    #[default]
    Definition,
    Sentence,
    Completion,
    Mixed,
}

/// Concrete kind a round is generated and scored with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundKind {
    Definition,
    Sentence,
    Completion,
}

impl RoundKind {
    pub const ALL: [RoundKind; 3] = [
        RoundKind::Definition,
        RoundKind::Sentence,
        RoundKind::Completion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundKind::Definition => "definition",
            RoundKind::Sentence => "sentence",
            RoundKind::Completion => "completion",
        }
    }

    /// The value of `word` that this kind asks about
    pub fn value_of<'a>(&self, word: &'a Word) -> &'a str {
        match self {
            RoundKind::Definition => word.first_meaning(),
            RoundKind::Sentence => word.first_example(),
            RoundKind::Completion => &word.word,
        }
    }
}

impl QuizKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizKind::Definition => "definition",
            QuizKind::Sentence => "sentence",
            QuizKind::Completion => "completion",
            QuizKind::Mixed => "mixed",
        }
    }

    /// Concrete kind for one round; `Mixed` picks uniformly among the three
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> RoundKind {
        match self {
            QuizKind::Definition => RoundKind::Definition,
            QuizKind::Sentence => RoundKind::Sentence,
            QuizKind::Completion => RoundKind::Completion,
            QuizKind::Mixed => RoundKind::ALL[rng.gen_range(0..RoundKind::ALL.len())],
        }
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizKind {
    type Err = WordflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "definition" => Ok(QuizKind::Definition),
            "sentence" => Ok(QuizKind::Sentence),
            "completion" => Ok(QuizKind::Completion),
            "mixed" => Ok(QuizKind::Mixed),
            other => Err(WordflowError::InvalidSettings(format!(
                "Unknown quiz kind: '{}'",
                other
            ))),
        }
    }
}

/// One generated question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRound {
    pub word_id: String,
    /// Resolved kind; the single source for both generation and scoring
    pub kind: RoundKind,
    pub options: Vec<String>,
    /// Only set for completion rounds
    pub masked_word: Option<String>,
    pub answer: String,
}

impl QuizRound {
    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.answer
    }
}

/// Hide every interior character, keeping the first and last visible
pub fn mask_word(word: &str) -> String {
    let len = word.chars().count();
    word.chars()
        .enumerate()
        .map(|(i, c)| if i == 0 || i + 1 == len { c } else { MASK_CHAR })
        .collect()
}

/// Generate a round for `target`.
///
/// Distractors are drawn without replacement from the other catalog entries.
/// A small catalog yields fewer options rather than an error, and entries
/// whose value duplicates an existing option are skipped.
pub fn generate<R: Rng>(
    target: &Word,
    catalog: &Catalog,
    kind: QuizKind,
    rng: &mut R,
) -> QuizRound {
    let kind = kind.resolve(rng);
    let answer = kind.value_of(target).to_string();

    let mut others: Vec<&Word> = catalog
        .words()
        .iter()
        .filter(|w| w.id != target.id)
        .collect();
    others.shuffle(rng);

    let mut options = vec![answer.clone()];
    for word in others {
        if options.len() > DISTRACTOR_COUNT {
            break;
        }
        let value = kind.value_of(word);
        if value.is_empty() || options.iter().any(|o| o == value) {
            continue;
        }
        options.push(value.to_string());
    }
    options.shuffle(rng);

    let masked_word = match kind {
        RoundKind::Completion => Some(mask_word(&target.word)),
        _ => None,
    };

    QuizRound {
        word_id: target.id.clone(),
        kind,
        options,
        masked_word,
        answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Difficulty, Translation};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn word(id: &str, text: &str, meaning: &str, example: &str) -> Word {
        Word {
            id: id.to_string(),
            word: text.to_string(),
            phonetic: String::new(),
            translations: vec![Translation {
                part_of_speech: "n.".to_string(),
                meaning: meaning.to_string(),
            }],
            examples: vec![example.to_string()],
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn test_definition_contains_first_meaning_once() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(1);

        for target in catalog.words() {
            let round = generate(target, &catalog, QuizKind::Definition, &mut rng);
            let hits = round
                .options
                .iter()
                .filter(|o| o.as_str() == target.first_meaning())
                .count();
            assert_eq!(hits, 1);
            assert_eq!(round.options.len(), 4);
            assert_eq!(round.kind, RoundKind::Definition);
            assert!(round.masked_word.is_none());
        }
    }

    #[test]
    fn test_sentence_round_scenario() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(2);
        let target = &catalog.words()[0];

        let round = generate(target, &catalog, QuizKind::Sentence, &mut rng);
        assert!(round.options.contains(&target.examples[0]));
        assert!(round.options.len() <= 4);
        assert!(round.options.iter().all(|o| !o.is_empty()));
        assert_eq!(round.answer, target.examples[0]);
    }

    #[test]
    fn test_completion_round_has_mask() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        let target = catalog.get("10").unwrap();

        let round = generate(target, &catalog, QuizKind::Completion, &mut rng);
        assert_eq!(round.masked_word.as_deref(), Some("j______t"));
        assert!(round.options.contains(&"jubilant".to_string()));
        assert!(round.is_correct("jubilant"));
        assert!(!round.is_correct("Jubilant"));
    }

    #[test]
    fn test_small_catalog_yields_fewer_options() {
        let only = word("1", "solo", "alone", "Solo trip.");
        let catalog = Catalog::new(vec![only.clone()]).unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        let round = generate(&only, &catalog, QuizKind::Definition, &mut rng);
        assert_eq!(round.options, vec!["alone".to_string()]);

        let pair = Catalog::new(vec![only.clone(), word("2", "duo", "pair", "Duo act.")]).unwrap();
        let round = generate(&only, &pair, QuizKind::Completion, &mut rng);
        assert_eq!(round.options.len(), 2);
    }

    #[test]
    fn test_duplicate_distractor_values_are_skipped() {
        let a = word("1", "big", "large", "A big dog.");
        let b = word("2", "huge", "large", "A huge dog.");
        let c = word("3", "tiny", "small", "A tiny dog.");
        let catalog = Catalog::new(vec![a.clone(), b, c]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let round = generate(&a, &catalog, QuizKind::Definition, &mut rng);
        assert_eq!(round.options.len(), 2);
        assert_eq!(round.options.iter().filter(|o| *o == "large").count(), 1);
    }

    #[test]
    fn test_mixed_resolves_to_concrete_kind() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(6);
        let target = &catalog.words()[4];
        let mut seen = std::collections::HashSet::new();

        for _ in 0..60 {
            let round = generate(target, &catalog, QuizKind::Mixed, &mut rng);
            assert_eq!(round.answer, round.kind.value_of(target));
            assert_eq!(round.masked_word.is_some(), round.kind == RoundKind::Completion);
            seen.insert(round.kind);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_mask_short_words() {
        assert_eq!(mask_word(""), "");
        assert_eq!(mask_word("a"), "a");
        assert_eq!(mask_word("ab"), "ab");
        assert_eq!(mask_word("abc"), "a_c");
    }

    #[test]
    fn test_quiz_kind_parse() {
        assert_eq!("Mixed".parse::<QuizKind>().unwrap(), QuizKind::Mixed);
        assert!("essay".parse::<QuizKind>().is_err());
    }

    proptest! {
        #[test]
        fn prop_mask_keeps_ends_and_length(w in "\\PC{1,24}") {
            let masked = mask_word(&w);
            let original: Vec<char> = w.chars().collect();
            let hidden: Vec<char> = masked.chars().collect();

            prop_assert_eq!(hidden.len(), original.len());
            prop_assert_eq!(hidden[0], original[0]);
            prop_assert_eq!(hidden[hidden.len() - 1], original[original.len() - 1]);
            for c in &hidden[1..hidden.len().saturating_sub(1).max(1)] {
                prop_assert_eq!(*c, MASK_CHAR);
            }
        }
    }
}
