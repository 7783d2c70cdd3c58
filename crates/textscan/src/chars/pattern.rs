use std::borrow::Cow;

use regex::Regex;

/// A labelled regular expression that must match a whole candidate string.
///
/// Used by [`Cursor::next_pattern`](crate::Cursor::next_pattern), which grows
/// a candidate one character at a time and stops at the first full match.
#[derive(Debug, Clone)]
pub struct Pattern {
    label: Cow<'static, str>,
    regex: Regex,
}

impl Pattern {
    /// Compiles `expr`, anchored at both ends.
    ///
    /// # Errors
    ///
    /// If `expr` is not a valid regular expression.
    pub fn new(label: impl Into<Cow<'static, str>>, expr: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            label: label.into(),
            regex: Regex::new(&format!(r"\A(?:{expr})\z"))?,
        })
    }

    /// The label used in diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether all of `text` matches.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A labelled list of [`Pattern`]s tried in order against the same
/// candidate.
///
/// Used by [`Cursor::next_pattern_from`](crate::Cursor::next_pattern_from)
/// and [`Cursor::next_match`](crate::Cursor::next_match).
#[derive(Debug, Clone)]
pub struct PatternList {
    label: Cow<'static, str>,
    patterns: Vec<Pattern>,
}

impl PatternList {
    /// Builds a list from already compiled patterns.
    pub fn new(label: impl Into<Cow<'static, str>>, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        Self {
            label: label.into(),
            patterns: patterns.into_iter().collect(),
        }
    }

    /// Compiles each of `exprs`, anchored at both ends.
    ///
    /// # Errors
    ///
    /// The first expression that is not a valid regular expression.
    pub fn compile<'e>(
        label: impl Into<Cow<'static, str>>,
        exprs: impl IntoIterator<Item = &'e str>,
    ) -> Result<Self, regex::Error> {
        let label = label.into();
        let patterns = exprs
            .into_iter()
            .map(|expr| Pattern::new(label.clone(), expr))
            .collect::<Result<_, _>>()?;
        Ok(Self { label, patterns })
    }

    /// The label used in diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the list has no patterns, and so matches nothing.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern matches all of `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(text))
    }

    /// The first pattern that matches all of `text`, with its groups.
    pub fn captures(&self, text: &str) -> Option<PatternMatch> {
        self.patterns.iter().enumerate().find_map(|(pattern, p)| {
            let caps = p.regex.captures(text)?;
            let groups = caps.iter().map(|g| g.map(|m| m.as_str().to_owned())).collect();
            let names = p.regex.capture_names().map(|n| n.map(str::to_owned)).collect();
            Some(PatternMatch {
                pattern,
                groups,
                names,
            })
        })
    }
}

/// A completed match from [`PatternList::captures`]: which pattern matched and
/// the text of each capture group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pattern: usize,
    groups: Vec<Option<String>>,
    names: Vec<Option<String>>,
}

impl PatternMatch {
    /// Position in the list of the pattern that matched.
    pub fn pattern(&self) -> usize {
        self.pattern
    }

    /// The whole matched text.
    pub fn as_str(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Length of the match in characters.
    pub fn char_len(&self) -> usize {
        self.as_str().chars().count()
    }

    /// Group `i`, or `None` if it does not exist or did not take part.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.groups.get(i)?.as_deref()
    }

    /// The group called `name`.
    pub fn name(&self, name: &str) -> Option<&str> {
        let i = self.names.iter().position(|n| n.as_deref() == Some(name))?;
        self.get(i)
    }

    /// Number of groups, counting the whole match as group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
