//! An incremental interpreter for a small turtle-graphics LOGO.
//!
//! Text is submitted a chunk at a time (usually one line from a prompt), and each submission is
//! parsed and performed against a [`ScriptState`], producing a new state with an updated turtle
//! and a log of [`DrawCommand`]s. A statement doesn't have to fit in one submission: if a chunk
//! ends in the middle of one, the returned state remembers where parsing got to.
//!
//! ```
//! use turtlelogo::ScriptState;
//!
//! let state = ScriptState::default().submit("to square :n repeat 4 [ fd :n rt 90 ] end");
//! let state = state.submit("square");
//! assert!(state.is_pending());
//! let state = state.submit("10");
//! assert_eq!(state.draw_commands.len(), 4);
//! ```

pub mod instruction;
pub mod parse;
pub mod proc;
pub mod state;
pub mod typ;

pub use instruction::{Instruction, Parser};
pub use parse::{resolve, tokenize, Bindings, Token, Value};
pub use proc::{Builtin, FunctionDefinition, Registry};
pub use state::{submit, ScriptState};
pub use typ::{Config, DrawCommand, Error, ErrorKind, Pen, Position, Turtle};
