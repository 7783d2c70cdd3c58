use std::borrow::Cow;

/// A labelled list of words tried in turn by
/// [`Cursor::next_word_from`](crate::Cursor::next_word_from).
///
/// Words are kept longest first, so a word that is a prefix of another can
/// never match ahead of it (`"<"` would otherwise shadow `"<<"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    label: Cow<'static, str>,
    words: Vec<Cow<'static, str>>,
}

impl WordList {
    /// Builds a list from `words`.
    pub fn new<I, W>(label: impl Into<Cow<'static, str>>, words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Cow<'static, str>>,
    {
        let mut words: Vec<Cow<'static, str>> = words.into_iter().map(Into::into).collect();
        words.sort_by_key(|w| core::cmp::Reverse(w.chars().count()));
        Self {
            label: label.into(),
            words,
        }
    }

    /// The label used in diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Words, longest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(AsRef::as_ref)
    }

    /// Length in characters of the longest word.
    pub fn max_len(&self) -> usize {
        self.words.first().map_or(0, |w| w.chars().count())
    }

    /// Length in characters of the shortest word.
    pub fn min_len(&self) -> usize {
        self.words.last().map_or(0, |w| w.chars().count())
    }

    /// Whether `word` is in the list, ignoring ASCII case.
    pub fn contains_ignore_case(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }
}
