//! Reads `key = value` pairs from a file (or a built-in sample) with a
//! two-production grammar, printing each pair as soon as its line is matched.
//!
//! Values are either bare text up to the end of the line or a double-quoted
//! string with backslash escapes. Lines starting with `#` are skipped. Every
//! matched line releases the cursor's history, so memory stays flat however
//! long the input is.
//!
//! Run with
//!
//! ```bash
//! cargo run -p textscan --example key_values [path]
//! RUST_LOG=textscan=debug cargo run -p textscan --example key_values
//! ```

use std::{process::ExitCode, sync::LazyLock};

use textscan::{
    Attempt, Boundary, CharClass, Cursor, Escapes, LETTERS, LINE_END, Parsed, Production, ScanError, parse,
};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"# a sample configuration
name = textscan
motto = "scan \"forward\",\n step back"
   retries=3
"#;

static KEY: LazyLock<CharClass> = LazyLock::new(|| CharClass::from(&LETTERS).merge("_-").with_label("key"));
static QUOTE: LazyLock<CharClass> = LazyLock::new(|| CharClass::of("\"").with_label("closing quote"));

struct Pair {
    key: String,
    value: String,
    line: usize,
}

impl Production for Pair {
    type Args = ();

    fn produce(cursor: &mut Cursor, attempt: &mut Attempt, (): ()) -> Result<Option<Self>, ScanError> {
        let key = cursor.scan_while(&KEY, Boundary::Retain)?;
        if key.is_empty() {
            return Ok(None);
        }
        let line = cursor.line();
        cursor.next_line_space()?;
        cursor.expect_char('=')?;
        cursor.next_line_space()?;
        let value = if cursor.next()? == '"' {
            let value = cursor.next_field_expanded(&QUOTE, &Escapes::default())?;
            cursor.next_line()?;
            value
        } else {
            cursor.unread();
            cursor.next_line()?.trim_end().to_owned()
        };
        attempt.finish(cursor);
        Ok(Some(Pair { key, value, line }))
    }
}

/// One line: a pair, a comment, or nothing.
struct Line(Option<Pair>);

impl Production for Line {
    type Args = ();
    const AUTO_FLUSH: bool = true;

    fn produce(cursor: &mut Cursor, attempt: &mut Attempt, (): ()) -> Result<Option<Self>, ScanError> {
        cursor.next_line_space()?;
        if let Parsed::Matched { value, .. } = parse::<Pair>(cursor, ())? {
            attempt.finish(cursor);
            return Ok(Some(Line(Some(value))));
        }
        let rest = cursor.scan_until(&LINE_END, Boundary::Eat)?;
        if !rest.trim().is_empty() && !rest.starts_with('#') {
            return Err(attempt.syntax_error(cursor, format!("cannot make sense of `{}'", rest.trim())));
        }
        attempt.finish(cursor);
        Ok(Some(Line(None)))
    }
}

fn run(mut cursor: Cursor) -> Result<usize, ScanError> {
    let mut pairs = 0;
    while let Parsed::Matched { value: Line(pair), .. } = parse::<Line>(&mut cursor, ())? {
        if let Some(Pair { key, value, line }) = pair {
            println!("{line:>4}  {key} = {value:?}");
            pairs += 1;
        }
    }
    Ok(pairs)
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cursor = match std::env::args_os().nth(1) {
        Some(path) => match Cursor::from_file(path) {
            Ok(cursor) => cursor,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Cursor::from_str("sample", SAMPLE),
    };

    match run(cursor) {
        Ok(pairs) => {
            eprintln!("{pairs} pairs");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
