#![allow(missing_docs)]
//! A small INI dialect built from productions and scan methods, exercised
//! end to end.

use std::sync::LazyLock;

use textscan::{
    Attempt, Boundary, CharClass, Cursor, DIGITS, Escapes, LETTERS, LINE_END, MethodBuffer, ScanError, ScanMethod,
    Production, WordList, parse, parse_many,
};
use tracing_subscriber::EnvFilter;

static KEY: LazyLock<CharClass> =
    LazyLock::new(|| CharClass::from(&LETTERS).merge(&DIGITS).merge("_-.").with_label("key character"));
static CLOSE: LazyLock<CharClass> = LazyLock::new(|| CharClass::of("]").with_label("closing bracket"));
static QUOTE: LazyLock<CharClass> = LazyLock::new(|| CharClass::of("\"").with_label("closing quote"));
static VALUE_END: LazyLock<CharClass> = LazyLock::new(|| CharClass::from(&LINE_END).merge("#\r"));
static TRUTHY: LazyLock<WordList> = LazyLock::new(|| WordList::new("true", ["true", "yes", "on"]));
static FALSY: LazyLock<WordList> = LazyLock::new(|| WordList::new("false", ["false", "no", "off"]));

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn escapes() -> Escapes {
    Escapes::new().with_fallback(|cursor: &mut Cursor| -> Result<Option<String>, ScanError> {
        Ok((cursor.current() == 's').then(|| " ".to_owned()))
    })
}

/// Whether only line space, a comment or a line end follows. Never moves.
fn at_value_end(cursor: &mut Cursor) -> Result<bool, ScanError> {
    let mark = cursor.index();
    cursor.next_line_space()?;
    let c = cursor.next()?;
    let end = cursor.end_of_source() || matches!(c, '\n' | '\r' | '#');
    cursor.walk_back(mark);
    Ok(end)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Text(String),
    Number(i64),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Blank,
    Section(String),
    Entry { key: String, value: Value },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    number: usize,
    item: Item,
    comment: Option<String>,
}

/// Digits with `_` separators dropped.
struct Digits;

impl ScanMethod for Digits {
    type Args = ();
    type Output = String;

    fn fresh(&self) -> Self {
        Digits
    }

    fn terminate(&mut self, cursor: &mut Cursor, buf: &mut MethodBuffer, ch: char) -> Result<bool, ScanError> {
        match ch {
            '_' => {
                buf.swap_str("");
                Ok(false)
            }
            '0'..='9' => Ok(false),
            _ => {
                buf.back_step(cursor);
                Ok(true)
            }
        }
    }

    fn compile(self, _: &mut Cursor, buf: MethodBuffer) -> Result<String, ScanError> {
        Ok(buf.into_string())
    }
}

struct Number(i64);

impl Production for Number {
    type Args = ();

    fn produce(cursor: &mut Cursor, attempt: &mut Attempt, (): ()) -> Result<Option<Self>, ScanError> {
        let negative = cursor.next()? == '-';
        if !negative {
            cursor.unread();
        }
        let digits = cursor.run(&Digits, ())?;
        if digits.is_empty() || !at_value_end(cursor)? {
            return Ok(None);
        }
        let Ok(n) = digits.parse::<i64>() else {
            return Err(attempt.syntax_error(cursor, format!("number `{digits}' does not fit in 64 bits")));
        };
        attempt.finish(cursor);
        Ok(Some(Number(if negative { -n } else { n })))
    }
}

struct Flag(bool);

impl Production for Flag {
    type Args = ();

    fn produce(cursor: &mut Cursor, attempt: &mut Attempt, (): ()) -> Result<Option<Self>, ScanError> {
        let word = cursor.scan_while(&LETTERS, Boundary::Retain)?;
        let flag = if TRUTHY.contains_ignore_case(&word) {
            true
        } else if FALSY.contains_ignore_case(&word) {
            false
        } else {
            return Ok(None);
        };
        if !at_value_end(cursor)? {
            return Ok(None);
        }
        attempt.finish(cursor);
        Ok(Some(Flag(flag)))
    }
}

fn value(cursor: &mut Cursor, attempt: &mut Attempt) -> Result<Value, ScanError> {
    if cursor.next()? == '"' {
        return Ok(Value::Text(cursor.next_field_expanded(&QUOTE, &escapes())?));
    }
    cursor.unread();
    if let Some(Flag(flag)) = parse::<Flag>(cursor, ())?.value() {
        return Ok(Value::Flag(flag));
    }
    if let Some(Number(n)) = parse::<Number>(cursor, ())?.value() {
        return Ok(Value::Number(n));
    }
    let bare = cursor.next_field_bounded(usize::MAX, &VALUE_END)?;
    let bare = bare.trim_end();
    if bare.is_empty() {
        return Err(attempt.syntax_error(cursor, "expected a value"));
    }
    Ok(Value::Text(bare.to_owned()))
}

struct Entry(String, Value);

impl Production for Entry {
    type Args = ();

    fn produce(cursor: &mut Cursor, attempt: &mut Attempt, (): ()) -> Result<Option<Self>, ScanError> {
        let key = cursor.scan_while(&KEY, Boundary::Retain)?;
        if key.is_empty() {
            return Ok(None);
        }
        cursor.next_line_space()?;
        if cursor.next()? != '=' {
            cursor.unread();
            return Err(attempt.syntax_error(cursor, format!("expected `=' after key `{key}'")));
        }
        cursor.next_line_space()?;
        let value = value(cursor, attempt)?;
        attempt.finish(cursor);
        Ok(Some(Entry(key, value)))
    }
}

struct Section(String);

impl Production for Section {
    type Args = ();

    fn produce(cursor: &mut Cursor, attempt: &mut Attempt, (): ()) -> Result<Option<Self>, ScanError> {
        if cursor.next()? != '[' {
            return Ok(None);
        }
        let name = cursor.next_field(&CLOSE)?;
        cursor.assert_delimited_length(&name, 1, "a section name")?;
        attempt.finish(cursor);
        Ok(Some(Section(name.trim().to_owned())))
    }
}

/// Consumes an optional comment and the line break.
fn end_of_line(cursor: &mut Cursor, attempt: &mut Attempt) -> Result<Option<String>, ScanError> {
    cursor.next_line_space()?;
    match cursor.next()? {
        '#' => Ok(Some(cursor.next_line()?.trim().to_owned())),
        '\n' => Ok(None),
        '\r' => {
            cursor.expect_char('\n')?;
            Ok(None)
        }
        _ if cursor.end_of_source() => Ok(None),
        _ => {
            cursor.unread();
            Err(attempt.syntax_error(cursor, "unexpected text at end of line"))
        }
    }
}

impl Production for Line {
    type Args = ();
    const AUTO_FLUSH: bool = true;

    fn produce(cursor: &mut Cursor, attempt: &mut Attempt, (): ()) -> Result<Option<Self>, ScanError> {
        let number = attempt.origin().line;
        cursor.next_line_space()?;
        let item = if let Some(Section(name)) = parse::<Section>(cursor, ())?.value() {
            Item::Section(name)
        } else if let Some(Entry(key, value)) = parse::<Entry>(cursor, ())?.value() {
            Item::Entry { key, value }
        } else {
            Item::Blank
        };
        let comment = end_of_line(cursor, attempt)?;
        if item == Item::Blank && comment.is_none() && cursor.end_of_source() {
            return Ok(None);
        }
        attempt.finish(cursor);
        Ok(Some(Line { number, item, comment }))
    }
}

fn parse_document(text: &str) -> Result<Vec<Line>, ScanError> {
    init_tracing();
    let mut cursor = Cursor::from_str("demo.ini", text);
    parse_many::<Line>(&mut cursor, ())
}

fn entry(number: usize, key: &str, value: Value, comment: Option<&str>) -> Line {
    Line {
        number,
        item: Item::Entry {
            key: key.to_owned(),
            value,
        },
        comment: comment.map(ToOwned::to_owned),
    }
}

fn line(number: usize, item: Item, comment: Option<&str>) -> Line {
    Line {
        number,
        item,
        comment: comment.map(ToOwned::to_owned),
    }
}

const DOCUMENT: &str = r#"# settings
[server]
host = example.org
port = 8080
debug = off

[paths]
root = "C:\\srv\tdata"
limit = -1_000 # bytes"#;

#[test]
fn parses_a_document() {
    let lines = parse_document(DOCUMENT).unwrap();
    assert_eq!(
        lines,
        [
            line(1, Item::Blank, Some("settings")),
            line(2, Item::Section("server".into()), None),
            entry(3, "host", Value::Text("example.org".into()), None),
            entry(4, "port", Value::Number(8080), None),
            entry(5, "debug", Value::Flag(false), None),
            line(6, Item::Blank, None),
            line(7, Item::Section("paths".into()), None),
            entry(8, "root", Value::Text("C:\\srv\tdata".into()), None),
            entry(9, "limit", Value::Number(-1000), Some("bytes")),
        ]
    );
}

#[test]
fn values_fall_through_alternatives() {
    let lines = parse_document("a = yes\nb = 12ab\nc = trueish\nd = \"hi\\sthere\"\r\ne = 80 80\n").unwrap();
    let values: Vec<&Item> = lines.iter().map(|l| &l.item).collect();
    assert_eq!(
        values,
        [
            &Item::Entry {
                key: "a".into(),
                value: Value::Flag(true)
            },
            &Item::Entry {
                key: "b".into(),
                value: Value::Text("12ab".into())
            },
            &Item::Entry {
                key: "c".into(),
                value: Value::Text("trueish".into())
            },
            &Item::Entry {
                key: "d".into(),
                value: Value::Text("hi there".into())
            },
            &Item::Entry {
                key: "e".into(),
                value: Value::Text("80 80".into())
            },
        ]
    );
}

#[test]
fn unterminated_section() {
    let err = parse_document("[server\nx = 1").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"expected closing bracket and found end of source at location = {line: 2, column: 5, index: 13, source: "demo.ini"};"#
    );
}

#[test]
fn empty_section_name() {
    let err = parse_document("[]").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"expected at least 1 characters of a section name and found `' at location = {line: 1, column: 1, index: 1, source: "demo.ini"};"#
    );
}

#[test]
fn missing_equals_sign() {
    let err = parse_document("name value\n").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"expected `=' after key `name' at location = {line: 1, column: 5, index: 5, source: "demo.ini"};"#
    );
}

#[test]
fn unterminated_string() {
    let err = parse_document(r#"a = "open"#).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"expected closing quote and found end of source at location = {line: 1, column: 9, index: 9, source: "demo.ini"};"#
    );
}

#[test]
fn trailing_text_after_section() {
    let mut cursor = Cursor::from_str("demo.ini", "[a] x");
    let err = parse_many::<Line>(&mut cursor, ()).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"unexpected text at end of line at location = {line: 1, column: 4, index: 4, source: "demo.ini"};"#
    );
    assert_eq!(cursor.index(), 0);
}

#[test]
fn number_out_of_range() {
    let err = parse_document("n = 99999999999999999999").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"number `99999999999999999999' does not fit in 64 bits at location = {line: 1, column: 24, index: 24, source: "demo.ini"};"#
    );
}

#[test]
fn escape_errors_surface_with_location() {
    let err = parse_document("\n\nk = \"\\0777\"").unwrap_err();
    assert!(matches!(err, ScanError::EscapeRange { .. }), "{err:?}");
    let at = err.bookmark().unwrap();
    assert_eq!((at.line, at.column, at.index), (3, 7, 9));
}

#[test]
fn history_is_released_between_lines() {
    init_tracing();
    let mut cursor = Cursor::from_str("demo.ini", "a = 1\nb = 2\n");
    let lines = parse_many::<Line>(&mut cursor, ()).unwrap();
    assert_eq!(lines.len(), 2);
    assert!(cursor.history_len() <= 1, "{}", cursor.history_len());
}
