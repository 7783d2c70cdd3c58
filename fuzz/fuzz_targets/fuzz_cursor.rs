#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use textscan::{Boundary, CharClass, Cursor, Escapes, LINE_END, WORD_BREAK};

/// One step of a random walk over the input.
#[derive(Debug, Arbitrary)]
enum Op {
    Next,
    Back,
    Walk(u8),
    Flush,
    Word,
    Field(char),
    Expanded(char),
    Line,
    Digits(u8, u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    tab_size: u8,
    ops: Vec<Op>,
}

type Snapshot = (usize, usize, usize, char, bool);

fn snapshot(cursor: &Cursor) -> Snapshot {
    (cursor.index(), cursor.line(), cursor.column(), cursor.current(), cursor.escape_mode())
}

fn cursor_over(input: &Input) -> Cursor {
    Cursor::from_str("fuzz", input.text.as_str()).with_tab_size(usize::from(input.tab_size % 9))
}

/// Runs the ops. Scans may fail on input; stepping never leaves the
/// retained history, and every position reached matches a forward read.
fn walk(input: Input) {
    let mut table = vec![];
    let mut forward = cursor_over(&input);
    table.push(snapshot(&forward));
    for _ in input.text.chars() {
        forward.next().unwrap();
        table.push(snapshot(&forward));
    }

    let mut cursor = cursor_over(&input);
    // Lowest index still reachable by stepping back.
    let mut floor = 0;
    for op in &input.ops {
        match *op {
            Op::Next => {
                cursor.next().unwrap();
            }
            Op::Back => {
                if cursor.end_of_source() || cursor.index() > floor {
                    cursor.back();
                }
            }
            Op::Walk(n) => {
                let to = cursor.index().saturating_sub(usize::from(n)).max(floor);
                cursor.walk_back(to);
            }
            Op::Flush => {
                // Only allowed at the tail of the history.
                if cursor.history_len() == cursor.index() - floor {
                    cursor.flush_history();
                    floor = cursor.index();
                }
            }
            Op::Word => {
                let _ = cursor.scan_until(&WORD_BREAK, Boundary::Retain);
            }
            Op::Field(c) => {
                let _ = cursor.next_field(&CharClass::from(c));
            }
            Op::Expanded(c) => {
                let _ = cursor.next_field_expanded(&CharClass::from(c).merge(&LINE_END), &Escapes::default());
            }
            Op::Line => {
                cursor.next_line().unwrap();
            }
            Op::Digits(min, max) => {
                let _ = cursor.next_digits(usize::from(min % 4), usize::from(max % 8));
            }
        }
        if cursor.end_of_source() {
            assert_eq!(cursor.index(), table.len() - 1);
            assert_eq!(cursor.current(), '\0');
        } else {
            assert_eq!(snapshot(&cursor), table[cursor.index()]);
        }
    }
}

fuzz_target!(|input: Input| walk(input));
