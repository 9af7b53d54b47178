use serde::{Deserialize, Serialize};

/// A range of bytes in a submitted line. Unlike most ranges, `end` is inclusive: it points at the
/// last byte of the token, not one past it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl From<crate::parse::Span<'_>> for Position {
    fn from(sp: crate::parse::Span) -> Self {
        let start = sp.location_offset();
        Position {
            start,
            end: start + sp.fragment().len().saturating_sub(1),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Turtle {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees. This is never normalized, so rotations just accumulate.
    pub angle: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub down: bool,
}

impl Default for Pen {
    fn default() -> Pen {
        Pen { down: true }
    }
}

/// One entry in the log consumed by whatever draws the picture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "drawCommand", rename_all = "camelCase")]
pub enum DrawCommand {
    DrawLine {
        id: u64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    #[serde(rename_all = "camelCase")]
    Rotate { id: u64, angle_change: f64 },
    Wait { seconds: i64 },
}

impl DrawCommand {
    pub fn id(&self) -> Option<u64> {
        match self {
            DrawCommand::DrawLine { id, .. } | DrawCommand::Rotate { id, .. } => Some(*id),
            DrawCommand::Wait { .. } => None,
        }
    }
}

impl std::fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawCommand::DrawLine { id, x1, y1, x2, y2 } => {
                write!(f, "#{id} line ({x1:.2}, {y1:.2}) -> ({x2:.2}, {y2:.2})")
            }
            DrawCommand::Rotate { id, angle_change } => write!(f, "#{id} rotate {angle_change}"),
            DrawCommand::Wait { seconds } => write!(f, "wait {seconds}s"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Whether `left` and `right` leave a `Rotate` entry in the draw log.
    pub record_rotations: bool,
    /// How many instructions a single statement may perform (counting every repetition and
    /// every instruction inside a procedure body) before we give up on it.
    pub step_limit: u64,
    /// How deeply blocks and procedure calls may nest inside one statement.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            record_rotations: false,
            step_limit: 1_000_000,
            max_depth: 200,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    #[error("Argument is not an integer")]
    NotAnInteger,
    #[error("The last command is not complete")]
    IncompleteBlock,
    #[error("Cannot override the built-in function '{0}'")]
    ProtectedName(String),
    #[error("Expected '[' but found '{0}'")]
    ExpectedBlock(String),
    #[error("Unknown parameter: :{0}")]
    UnknownParameter(String),
    #[error("Gave up after {0} steps")]
    StepLimit(u64),
    #[error("Nested more than {0} levels deep")]
    TooDeep(usize),
}

/// An error attached to a [`ScriptState`](crate::ScriptState).
///
/// Errors are never returned across the public boundary: `submit` stores them in the state it
/// returns, alongside everything that was done before the failing statement.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    pub position: Option<Position>,
    /// The submitted text that the error was found in.
    pub line: Option<String>,
}

impl Error {
    pub fn description(&self) -> String {
        self.kind.to_string()
    }

    pub fn at(mut self, position: Position) -> Error {
        self.position = Some(position);
        self
    }

    pub fn in_line(mut self, line: &str) -> Error {
        self.line = Some(line.to_owned());
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            position: None,
            line: None,
        }
    }
}
