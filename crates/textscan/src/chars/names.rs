use std::{borrow::Cow, collections::HashMap};

use super::CharClass;

/// Human-readable names for characters, used when rendering diagnostics.
///
/// A table is owned by whoever builds the grammar and handed to each cursor
/// (see [`Cursor::with_names`](crate::Cursor::with_names)); there is no
/// process-wide table. [`CharNames::default`] knows the English names of the
/// ASCII control and white-space characters.
#[derive(Debug, Clone)]
pub struct CharNames {
    names: HashMap<char, Cow<'static, str>>,
    conjunction: Cow<'static, str>,
}

impl Default for CharNames {
    fn default() -> Self {
        let mut names = Self::empty();
        for (c, name) in [
            ('\u{7F}', "delete"),
            ('\u{1B}', "escape"),
            ('\u{07}', "bell"),
            ('\u{08}', "backspace"),
            ('\u{0C}', "form-feed"),
            ('\u{0B}', "vertical-tab"),
            ('\t', "tab"),
            ('\\', "backslash"),
            ('\n', "line-feed"),
            ('\r', "carriage-return"),
            (' ', "space"),
        ] {
            names.names.insert(c, Cow::Borrowed(name));
        }
        names
    }
}

impl CharNames {
    /// A table with no names; every character renders quoted.
    pub fn empty() -> Self {
        Self {
            names: HashMap::new(),
            conjunction: Cow::Borrowed("or"),
        }
    }

    /// Names `c`, replacing any previous name.
    #[must_use]
    pub fn with(mut self, c: char, name: impl Into<Cow<'static, str>>) -> Self {
        self.names.insert(c, name.into());
        self
    }

    /// Sets the word joining the last two entries of a rendered list.
    #[must_use]
    pub fn with_conjunction(mut self, conjunction: impl Into<Cow<'static, str>>) -> Self {
        self.conjunction = conjunction.into();
        self
    }

    /// Renders one character: its name if known, `null` for NUL, otherwise
    /// the character quoted as `` `c' ``.
    pub fn describe(&self, c: char) -> Cow<'_, str> {
        if let Some(name) = self.names.get(&c) {
            return Cow::Borrowed(name.as_ref());
        }
        if c == '\0' {
            return Cow::Borrowed("null");
        }
        Cow::Owned(format!("`{c}'"))
    }

    /// Renders a class: its label if it has one, otherwise every member,
    /// comma separated, with the conjunction before the last.
    pub fn describe_class(&self, class: &CharClass) -> String {
        if let Some(label) = class.label() {
            return label.to_owned();
        }
        if class.is_empty() {
            return "empty character map".to_owned();
        }
        let parts: Vec<Cow<'_, str>> = class.iter().map(|c| self.describe(c)).collect();
        self.join(&parts)
    }

    /// Joins already-rendered entries with commas and the conjunction.
    pub fn join<S: AsRef<str>>(&self, parts: &[S]) -> String {
        match parts {
            [] => String::new(),
            [one] => one.as_ref().to_owned(),
            [init @ .., last] => {
                let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
                format!("{} {} {}", head.join(", "), self.conjunction, last.as_ref())
            }
        }
    }
}
