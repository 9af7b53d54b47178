//! The incremental statement parser.
//!
//! Statements arrive one token at a time, possibly spread over several submissions, so instead of
//! parsing a whole program we keep a stack of the instructions that are still open. The bottom of
//! the stack is the top-level statement; every entry above it is nested in the block of the entry
//! below. Once the innermost instruction is complete it gets popped and either moved into its
//! parent's block or, if it was the top-level statement, handed back to be performed.

use std::rc::Rc;

use crate::{
    parse::{resolve, Token, Value},
    proc::{Behavior, Builtin, FunctionDefinition, Registry},
    typ::{Error, ErrorKind},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub instructions: Vec<Instruction>,
    pub closed: bool,
}

/// The construct-specific part of an instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Partial {
    /// Takes no tokens at all.
    Ready,
    /// Takes exactly one value.
    Single(Option<Value>),
    /// `repeat <times> [ ... ]`. The body only exists once we've seen the `[`.
    Repeat {
        times: Option<Value>,
        body: Option<Block>,
    },
    /// `to <name> :<param>... <statements> end`. The body only exists once we've finished
    /// collecting parameters.
    Define {
        name: Option<String>,
        parameters: Vec<String>,
        body: Option<Block>,
    },
    /// A call to a user-defined procedure, collecting one value per parameter.
    Call { arguments: Vec<Value> },
}

#[derive(Clone, Debug)]
pub struct Instruction {
    pub function: Rc<FunctionDefinition>,
    pub partial: Partial,
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.function, &other.function) && self.partial == other.partial
    }
}

/// What an open instruction did with a token.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Step {
    Consumed,
    /// The token starts a new statement inside this instruction's block.
    Nested,
}

impl Instruction {
    pub fn new(function: Rc<FunctionDefinition>) -> Instruction {
        let partial = match &function.behavior {
            Behavior::Builtin(b) => match b {
                Builtin::Forward
                | Builtin::Backward
                | Builtin::Left
                | Builtin::Right
                | Builtin::Wait => Partial::Single(None),
                Builtin::PenUp | Builtin::PenDown | Builtin::ClearScreen => Partial::Ready,
                Builtin::Repeat => Partial::Repeat {
                    times: None,
                    body: None,
                },
                Builtin::To => Partial::Define {
                    name: None,
                    parameters: Vec::new(),
                    body: None,
                },
            },
            Behavior::Procedure(_) => Partial::Call {
                arguments: Vec::new(),
            },
        };
        Instruction { function, partial }
    }

    pub fn is_complete(&self) -> bool {
        match &self.partial {
            Partial::Ready => true,
            Partial::Single(v) => v.is_some(),
            Partial::Repeat { body, .. } | Partial::Define { body, .. } => {
                body.as_ref().map_or(false, |b| b.closed)
            }
            Partial::Call { arguments } => arguments.len() == self.function.parameters().len(),
        }
    }

    /// The token that would finish this instruction's block, if it's ready to see one. A
    /// definition that is still collecting parameters counts, because its body may be empty.
    fn terminator(&self) -> Option<&'static str> {
        match &self.partial {
            Partial::Repeat { body: Some(b), .. } if !b.closed => Some("]"),
            Partial::Define { body: Some(b), .. } if !b.closed => Some("end"),
            Partial::Define {
                name: Some(_),
                body: None,
                ..
            } => Some("end"),
            _ => None,
        }
    }

    fn push_inner(&mut self, inner: Instruction) {
        if let Partial::Repeat { body: Some(b), .. } | Partial::Define { body: Some(b), .. } =
            &mut self.partial
        {
            b.instructions.push(inner);
        }
    }

    fn accept(&mut self, token: &Token, registry: &Registry) -> Result<Step, ErrorKind> {
        match &mut self.partial {
            // Complete instructions never stay open, so there's nothing to feed.
            Partial::Ready => {}
            Partial::Single(v) => *v = Some(resolve(token.text)?),
            Partial::Repeat {
                times: times @ None,
                ..
            } => *times = Some(resolve(token.text)?),
            Partial::Repeat {
                body: body @ None, ..
            } => {
                if token.text != "[" {
                    return Err(ErrorKind::ExpectedBlock(token.text.to_owned()));
                }
                *body = Some(Block::default());
            }
            Partial::Repeat { body: Some(b), .. } => {
                if token.text != "]" {
                    return Ok(Step::Nested);
                }
                b.closed = true;
            }
            Partial::Define { name: name @ None, .. } => {
                if registry.is_protected(token.text) {
                    return Err(ErrorKind::ProtectedName(token.text.to_lowercase()));
                }
                *name = Some(token.text.to_lowercase());
            }
            Partial::Define {
                parameters,
                body: body @ None,
                ..
            } => match token.text.strip_prefix(':') {
                Some(param) => parameters.push(param.to_lowercase()),
                None => {
                    *body = Some(Block::default());
                    return self.accept(token, registry);
                }
            },
            Partial::Define { body: Some(b), .. } => {
                if !token.is("end") {
                    return Ok(Step::Nested);
                }
                b.closed = true;
            }
            Partial::Call { arguments } => arguments.push(resolve(token.text)?),
        }
        Ok(Step::Consumed)
    }
}

/// The stack of open instructions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parser {
    open: Vec<Instruction>,
}

impl Parser {
    pub fn is_idle(&self) -> bool {
        self.open.is_empty()
    }

    /// The top-level statement that is still being parsed, if any.
    pub fn current(&self) -> Option<&Instruction> {
        self.open.first()
    }

    /// How deeply the innermost open instruction is nested.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Feeds a single token, returning the top-level statement if this token completed it.
    ///
    /// No instruction may end up nested more than `max_depth` levels deep (counting the top-level
    /// statement as one level).
    ///
    /// After an error the open statement is in an unspecified state, and the caller should
    /// abandon it by resetting the parser.
    pub fn feed(
        &mut self,
        token: &Token,
        registry: &Registry,
        max_depth: usize,
    ) -> Result<Option<Instruction>, Error> {
        let fail = |kind: ErrorKind| Error::from(kind).at(token.position);

        let Some(top) = self.open.len().checked_sub(1) else {
            self.open.push(start(token, registry).map_err(fail)?);
            return Ok(self.collapse());
        };

        // Every instruction below the top is collecting a block, so the one just below the top
        // is the innermost block we're in.
        if self.open[top].terminator().is_none() && top > 0 {
            if let Some(t) = self.open[top - 1].terminator() {
                if token.is(t) {
                    return Err(fail(ErrorKind::IncompleteBlock));
                }
            }
        }

        match self.open[top].accept(token, registry).map_err(fail)? {
            Step::Consumed => {}
            Step::Nested => {
                if self.open.len() >= max_depth {
                    return Err(fail(ErrorKind::TooDeep(max_depth)));
                }
                let inner = start(token, registry).map_err(fail)?;
                self.open.push(inner);
            }
        }
        Ok(self.collapse())
    }

    fn collapse(&mut self) -> Option<Instruction> {
        while self.open.last().map_or(false, Instruction::is_complete) {
            let done = self.open.pop()?;
            match self.open.last_mut() {
                Some(parent) => parent.push_inner(done),
                None => return Some(done),
            }
        }
        None
    }
}

fn start(token: &Token, registry: &Registry) -> Result<Instruction, ErrorKind> {
    registry
        .lookup(token.text)
        .map(Instruction::new)
        .ok_or_else(|| ErrorKind::UnknownFunction(token.text.to_owned()))
}
