//! Bigram frequency model built from the note being edited.
//!
//! The model maps a lower-cased prefix word to the words observed right after
//! it, with how often each pair occurred. It is rebuilt from scratch for every
//! text snapshot and never mutated afterwards, so a finished `Model` can be
//! shared behind an `Arc` while a newer one is being built.
//!
//! # Building
//!
//! ```text
//! "the cat sat on the mat the cat ran"
//!        │ tokenize
//!        ▼
//! [the, cat, sat, on, the, mat, the, cat, ran]
//!        │ overlapping windows of NGRAM_ORDER tokens
//!        ▼
//! "the cat" ×2, "cat sat" ×1, "sat on" ×1, "on the" ×1,
//! "the mat" ×1, "mat the" ×1, "cat ran" ×1
//!        │ split each gram into prefix + word
//!        ▼
//! the → [cat ×2, mat ×1]
//! cat → [sat ×1, ran ×1]
//! ...
//! ```
//!
//! # Casing
//!
//! Prefixes are indexed lower-cased, so `"The"` and `"the"` share one list.
//! Grams are counted on their exact text though: `"The cat"` and `"the cat"`
//! are two grams and yield two `cat` candidates under `the`, and `"the Cat"`
//! is a separate candidate from `"the cat"`.

use ahash::AHashMap;

use crate::tokenizer::tokenize;

/// Number of tokens per gram. The model is a bigram model.
pub const NGRAM_ORDER: usize = 2;

/// One possible next word for a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The next word, in its observed casing.
    pub word: String,
    /// Occurrences of the exact `prefix word` pair.
    pub count: u64,
    /// The prefix as it appeared in the text.
    pub prefix: String,
}

/// Gram occurrence counts, iterated in first-encounter order.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: AHashMap<String, u64>,
    order: Vec<String>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `gram`.
    pub fn increment(&mut self, gram: &str) {
        if let Some(count) = self.counts.get_mut(gram) {
            *count += 1;
            return;
        }

        self.counts.insert(gram.to_string(), 1);
        self.order.push(gram.to_string());
    }

    pub fn count(&self, gram: &str) -> u64 {
        self.counts.get(gram).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Grams and their counts in the order they were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.order
            .iter()
            .map(|gram| (gram.as_str(), self.counts.get(gram).copied().unwrap_or(0)))
    }
}

/// Prefix → candidates table.
///
/// Every prefix present has at least one candidate and every candidate has a
/// count of at least one.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Prefix lists in the order prefixes were first encountered.
    entries: Vec<(String, Vec<Candidate>)>,
    /// Lower-cased prefix → position in `entries`.
    index: AHashMap<String, usize>,
}

impl Model {
    /// Build a model from a token sequence.
    ///
    /// Counts every overlapping pair of tokens, then groups the pairs by
    /// their lower-cased first word in the order they were first seen.
    ///
    /// # Arguments
    /// * `tokens` - Words in document order, as produced by [`tokenize`]
    ///
    /// # Returns
    /// The model, or `None` when there are fewer than [`NGRAM_ORDER`]
    /// tokens, which means no gram can be formed and no prediction is
    /// available.
    ///
    /// # Example
    /// ```rust
    /// use noteassist::model::Model;
    ///
    /// let model = Model::build(&["the", "cat", "the", "cat", "the", "dog"]).unwrap();
    /// let the = model.candidates("The").unwrap();
    /// assert_eq!(the[0].word, "cat");
    /// assert_eq!(the[0].count, 2);
    /// assert_eq!(the[1].word, "dog");
    /// ```
    pub fn build(tokens: &[&str]) -> Option<Self> {
        if tokens.len() < NGRAM_ORDER {
            return None;
        }

        let mut frequencies = FrequencyTable::new();
        for window in tokens.windows(NGRAM_ORDER) {
            frequencies.increment(&window.join(" "));
        }

        let mut model = Model::default();
        for (gram, count) in frequencies.iter() {
            // Tokens never contain spaces, so the first space is the boundary.
            let Some((prefix, word)) = gram.split_once(' ') else {
                continue;
            };
            model.push(prefix, word, count);
        }

        Some(model)
    }

    /// Tokenize `text` and build a model from it.
    pub fn from_text(text: &str) -> Option<Self> {
        let tokens = tokenize(text)?;
        Self::build(&tokens)
    }

    fn push(&mut self, prefix: &str, word: &str, count: u64) {
        let key = prefix.to_lowercase();
        let candidate = Candidate {
            word: word.to_string(),
            count,
            prefix: prefix.to_string(),
        };

        match self.index.get(&key) {
            Some(&position) => self.entries[position].1.push(candidate),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![candidate]));
            }
        }
    }

    /// Candidates following `prefix`, looked up case-insensitively.
    pub fn candidates(&self, prefix: &str) -> Option<&[Candidate]> {
        let position = *self.index.get(&prefix.to_lowercase())?;
        Some(self.entries[position].1.as_slice())
    }

    /// Number of distinct prefixes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lower-cased prefixes with their candidates, in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Candidate])> + '_ {
        self.entries
            .iter()
            .map(|(prefix, candidates)| (prefix.as_str(), candidates.as_slice()))
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        // `index` is derived from `entries`.
        self.entries == other.entries
    }
}

impl Eq for Model {}
