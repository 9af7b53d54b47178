use std::collections::HashMap;

use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while},
    character::complete::{char, i64 as integer},
    combinator::{all_consuming, map, rest, verify},
    multi::many0,
    sequence::preceded,
    IResult,
};

use crate::typ::{ErrorKind, Position};

pub type Span<'a> = nom_locate::LocatedSpan<&'a str>;

/// Parameter bindings that are in scope while performing an instruction.
pub type Bindings = HashMap<String, i64>;

/// A whitespace-delimited word from a submitted line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub position: Position,
}

impl<'a> From<Span<'a>> for Token<'a> {
    fn from(sp: Span<'a>) -> Self {
        let text = *sp.fragment();
        Token {
            text,
            position: sp.into(),
        }
    }
}

impl Token<'_> {
    pub fn is(&self, word: &str) -> bool {
        self.text.eq_ignore_ascii_case(word)
    }
}

fn word(input: Span<'_>) -> IResult<Span<'_>, Token<'_>> {
    map(
        preceded(
            take_while(char::is_whitespace),
            take_till1(char::is_whitespace),
        ),
        Token::from,
    )(input)
}

/// Splits a submission into words. Newlines are just whitespace, since a statement is allowed to
/// span several lines.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    // `word` only fails at the end of the input, so `many0` can't fail either.
    many0(word)(Span::new(text))
        .map(|(_, words)| words)
        .unwrap_or_default()
}

/// A deferred integer: either a literal or a reference to a parameter, which is looked up only
/// when the value is needed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Constant(i64),
    Parameter(String),
    Negated(Box<Value>),
}

impl Value {
    pub fn get(&self, bindings: &Bindings) -> Result<i64, ErrorKind> {
        match self {
            Value::Constant(x) => Ok(*x),
            Value::Parameter(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| ErrorKind::UnknownParameter(name.clone())),
            Value::Negated(v) => Ok(v.get(bindings)?.saturating_neg()),
        }
    }

    pub fn negated(self) -> Value {
        Value::Negated(Box::new(self))
    }
}

fn parameter(input: &str) -> IResult<&str, Value> {
    map(
        preceded(char(':'), verify(rest, |s: &str| !s.is_empty())),
        |name: &str| Value::Parameter(name.to_lowercase()),
    )(input)
}

fn constant(input: &str) -> IResult<&str, Value> {
    map(integer, Value::Constant)(input)
}

/// Turns a token into a [`Value`]. Anything that isn't a `:parameter` has to be a base-10 integer.
pub fn resolve(token: &str) -> Result<Value, ErrorKind> {
    all_consuming(alt((parameter, constant)))(token)
        .map(|(_, v)| v)
        .map_err(|_| ErrorKind::NotAnInteger)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(texts("forward 10"), vec!["forward", "10"]);
        assert_eq!(texts("  repeat 2\n[ fd\t10 ]\n"), vec!["repeat", "2", "[", "fd", "10", "]"]);
        assert!(texts("").is_empty());
        assert!(texts(" \n ").is_empty());
    }

    #[test]
    fn token_positions() {
        let tokens = tokenize("unknown 90");
        assert_eq!(tokens[0].position, Position { start: 0, end: 6 });
        assert_eq!(tokens[1].position, Position { start: 8, end: 9 });

        let tokens = tokenize("fd\n  still-unknown");
        assert_eq!(tokens[1].position, Position { start: 5, end: 17 });
    }

    #[test]
    fn constants_and_parameters() {
        let bindings: Bindings = [("x".to_owned(), 25)].into_iter().collect();

        assert_eq!(resolve("10"), Ok(Value::Constant(10)));
        assert_eq!(resolve("-7"), Ok(Value::Constant(-7)));
        assert_eq!(resolve(":X"), Ok(Value::Parameter("x".to_owned())));
        assert_eq!(resolve(":X").unwrap().get(&bindings), Ok(25));
        assert_eq!(resolve(":x").unwrap().negated().get(&bindings), Ok(-25));
        assert_eq!(
            resolve(":y").unwrap().get(&bindings),
            Err(ErrorKind::UnknownParameter("y".to_owned()))
        );
    }

    #[test]
    fn not_integers() {
        for token in ["abc", "10abc", "1.5", ":", "[", ""] {
            assert_eq!(resolve(token), Err(ErrorKind::NotAnInteger), "{token:?}");
        }
    }
}
