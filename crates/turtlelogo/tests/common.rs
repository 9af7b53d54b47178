use std::path::Path;

use turtlelogo::{DrawCommand, Error, ScriptState, Turtle};

#[derive(Default, Clone)]
pub struct TestCase {
    input: String,
    expected: String,
}

/// Submits `s` one line at a time, stopping at the first error.
fn exec_one(s: &str) -> Result<(Vec<DrawCommand>, Turtle), Error> {
    let mut state = ScriptState::default();
    for line in s.lines() {
        state = state.submit(line);
        if let Some(e) = state.error.take() {
            return Err(e);
        }
    }
    assert!(!state.is_pending(), "unfinished statement in {s:?}");
    Ok((state.draw_commands, state.turtle))
}

fn parse_loc(s: &str) -> (usize, usize, &str) {
    let mut split = s.trim().splitn(3, ' ');
    let start = split.next().unwrap().parse().unwrap();
    let end = split.next().unwrap().parse().unwrap();
    let rest = split.next().unwrap();
    (start, end, rest)
}

impl TestCase {
    fn exec(&self) {
        let a = exec_one(&self.input).unwrap();
        let b = exec_one(&self.expected).unwrap();
        assert_eq!(a, b, "{}", self.input);
    }

    fn exec_failure(&self) {
        let e = exec_one(&self.input).unwrap_err();
        let pos = e.position.expect("parse errors have positions");
        let (start, end, description) = parse_loc(&self.expected);
        assert_eq!(
            (start, end, description),
            (pos.start, pos.end, e.description().as_str()),
            "{}",
            self.input
        );
    }
}

pub fn read_tests(path: impl AsRef<Path>) -> Vec<TestCase> {
    let text = std::fs::read_to_string(path).unwrap();
    let mut ret = Vec::new();
    let mut in_input = true;
    let mut cur = TestCase::default();

    fn separator_line(line: &str, ch: u8) -> bool {
        line.trim().len() >= 2 && line.trim().bytes().all(|c| c == ch)
    }

    for line in text.split_inclusive('\n') {
        if in_input {
            if separator_line(line, b'-') {
                in_input = false;
            } else {
                cur.input += line;
            }
        } else if separator_line(line, b'=') {
            in_input = true;
            ret.push(std::mem::take(&mut cur));
        } else {
            cur.expected += line;
        }
    }
    ret
}

#[test]
fn text_tests() {
    let tests = read_tests("tests/basic.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec();
    }
}

#[test]
fn exec_failures() {
    let tests = read_tests("tests/failures.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec_failure();
    }
}
