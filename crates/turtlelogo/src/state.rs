use crate::{
    instruction::{Instruction, Parser, Partial},
    parse::{tokenize, Bindings, Value},
    proc::{Behavior, Builtin, FunctionDefinition, Procedure, Registry},
    typ::{Config, DrawCommand, Error, ErrorKind, Pen, Turtle},
};

/// Bookkeeping for performing a single statement.
#[derive(Debug, Default)]
struct Run {
    steps: u64,
    depth: usize,
    /// The draw log as it was when the statement first cleared the screen.
    cleared: Option<Vec<DrawCommand>>,
}

impl Run {
    fn step(&mut self, config: &Config) -> Result<(), ErrorKind> {
        self.steps += 1;
        if self.steps > config.step_limit {
            return Err(ErrorKind::StepLimit(config.step_limit));
        }
        Ok(())
    }
}

/// What a failed statement has to put back.
struct Checkpoint {
    turtle: Turtle,
    pen: Pen,
    registry: Registry,
    logged: usize,
    next_draw_command_id: u64,
}

/// Everything the prompt knows about a script.
///
/// States are values: [`ScriptState::submit`] returns a new state and leaves the old one alone, so
/// a caller can keep old states around (for undo, say) without them changing underneath it.
#[derive(Clone, Debug)]
pub struct ScriptState {
    pub turtle: Turtle,
    pub pen: Pen,
    pub draw_commands: Vec<DrawCommand>,
    pub registry: Registry,
    pub bindings: Bindings,
    pub error: Option<Error>,
    pub config: Config,
    parser: Parser,
    next_draw_command_id: u64,
    next_instruction_id: u64,
}

impl Default for ScriptState {
    fn default() -> Self {
        ScriptState::new(Config::default())
    }
}

impl ScriptState {
    pub fn new(config: Config) -> ScriptState {
        ScriptState {
            turtle: Turtle::default(),
            pen: Pen::default(),
            draw_commands: Vec::new(),
            registry: Registry::with_builtins(),
            bindings: Bindings::new(),
            error: None,
            config,
            parser: Parser::default(),
            next_draw_command_id: 0,
            next_instruction_id: 0,
        }
    }

    /// The top-level statement that is waiting for more tokens, if any.
    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.parser.current()
    }

    pub fn is_pending(&self) -> bool {
        !self.parser.is_idle()
    }

    /// The number of top-level statements performed so far.
    pub fn next_instruction_id(&self) -> u64 {
        self.next_instruction_id
    }

    /// Parses and performs a submitted chunk of text.
    ///
    /// The text doesn't need to hold whole statements: anything left unfinished at the end stays
    /// open in the returned state and picks up where it left off on the next submission. If a
    /// statement fails, it has no effect at all and the rest of the text is ignored.
    pub fn submit(&self, text: &str) -> ScriptState {
        let mut state = self.clone();
        state.error = None;

        for token in tokenize(text) {
            if state.error.is_some() {
                log::trace!("skipping {:?} after an error", token.text);
                continue;
            }
            log::debug!("token {:?}", token.text);

            let result = match state
                .parser
                .feed(&token, &state.registry, state.config.max_depth)
            {
                Ok(Some(instruction)) => state.perform_statement(&instruction),
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                log::debug!("statement failed: {e}");
                state.parser = Parser::default();
                state.error = Some(e.in_line(text));
            }
        }
        state
    }

    /// Performs a complete top-level statement. If it fails, it leaves no trace.
    fn perform_statement(&mut self, instruction: &Instruction) -> Result<(), Error> {
        let checkpoint = Checkpoint {
            turtle: self.turtle,
            pen: self.pen,
            registry: self.registry.clone(),
            logged: self.draw_commands.len(),
            next_draw_command_id: self.next_draw_command_id,
        };
        let mut run = Run::default();
        match self.perform(instruction, &mut run) {
            Ok(()) => {
                self.next_instruction_id += 1;
                Ok(())
            }
            Err(e) => {
                self.turtle = checkpoint.turtle;
                self.pen = checkpoint.pen;
                self.registry = checkpoint.registry;
                self.next_draw_command_id = checkpoint.next_draw_command_id;
                if let Some(log) = run.cleared {
                    self.draw_commands = log;
                }
                self.draw_commands.truncate(checkpoint.logged);
                Err(e)
            }
        }
    }

    /// Performs a list of complete instructions in order.
    pub fn perform_all(&self, instructions: &[Instruction]) -> Result<ScriptState, Error> {
        let mut next = self.clone();
        let mut run = Run::default();
        next.perform_each(instructions, &mut run)?;
        Ok(next)
    }

    fn perform_each(&mut self, instructions: &[Instruction], run: &mut Run) -> Result<(), Error> {
        for instruction in instructions {
            self.perform(instruction, run)?;
        }
        Ok(())
    }

    fn perform(&mut self, instruction: &Instruction, run: &mut Run) -> Result<(), Error> {
        run.step(&self.config)?;
        run.depth += 1;
        if run.depth > self.config.max_depth {
            return Err(ErrorKind::TooDeep(self.config.max_depth).into());
        }
        log::trace!("performing {}", instruction.function.name());

        match (&instruction.function.behavior, &instruction.partial) {
            (Behavior::Builtin(b), Partial::Single(Some(value))) => match b {
                Builtin::Forward => self.move_distance(value)?,
                Builtin::Backward => self.move_distance(&value.clone().negated())?,
                Builtin::Right => self.rotate(value)?,
                Builtin::Left => self.rotate(&value.clone().negated())?,
                Builtin::Wait => {
                    let seconds = value.get(&self.bindings)?;
                    self.draw_commands.push(DrawCommand::Wait { seconds });
                }
                Builtin::PenUp
                | Builtin::PenDown
                | Builtin::ClearScreen
                | Builtin::Repeat
                | Builtin::To => unreachable!("{b:?} doesn't take a single value"),
            },
            (Behavior::Builtin(b), Partial::Ready) => match b {
                Builtin::PenUp => self.pen.down = false,
                Builtin::PenDown => self.pen.down = true,
                Builtin::ClearScreen => {
                    let drawn = std::mem::take(&mut self.draw_commands);
                    if run.cleared.is_none() {
                        run.cleared = Some(drawn);
                    }
                    self.turtle = Turtle::default();
                    self.pen = Pen::default();
                }
                Builtin::Forward
                | Builtin::Backward
                | Builtin::Left
                | Builtin::Right
                | Builtin::Wait
                | Builtin::Repeat
                | Builtin::To => unreachable!("{b:?} takes arguments"),
            },
            (
                _,
                Partial::Repeat {
                    times: Some(times),
                    body: Some(body),
                },
            ) => {
                // The count is evaluated now rather than at parse time, so that `repeat :n` uses
                // whatever `:n` is bound to when it runs.
                let times = times.get(&self.bindings)?;
                for _ in 0..times.max(0) {
                    // Each pass costs a step, even with an empty body.
                    run.step(&self.config)?;
                    self.perform_each(&body.instructions, run)?;
                }
            }
            (
                _,
                Partial::Define {
                    name: Some(name),
                    parameters,
                    body: Some(body),
                },
            ) => {
                let proc = Procedure {
                    name: name.clone(),
                    parameters: parameters.clone(),
                    body: body.instructions.clone(),
                };
                log::info!("defining {name} with parameters {parameters:?}");
                self.registry = self
                    .registry
                    .clone()
                    .register(FunctionDefinition::procedure(proc))?;
            }
            (Behavior::Procedure(proc), Partial::Call { arguments }) => {
                let bindings = proc
                    .parameters
                    .iter()
                    .zip(arguments)
                    .map(|(name, value)| value.get(&self.bindings).map(|v| (name.clone(), v)))
                    .collect::<Result<Bindings, ErrorKind>>()?;
                self.scoped(bindings, |state| state.perform_each(&proc.body, run))?;
            }
            (_, partial) => unreachable!("performing an incomplete instruction: {partial:?}"),
        }
        run.depth -= 1;
        Ok(())
    }

    /// Runs `f` with `bindings` as the only parameters in scope.
    fn scoped<U>(&mut self, bindings: Bindings, f: impl FnOnce(&mut ScriptState) -> U) -> U {
        let outer = std::mem::replace(&mut self.bindings, bindings);
        let res = f(self);
        self.bindings = outer;
        res
    }

    fn move_distance(&mut self, distance: &Value) -> Result<(), ErrorKind> {
        let r = distance.get(&self.bindings)? as f64;
        let Turtle { x, y, angle } = self.turtle;
        let new_x = x + angle.to_radians().cos() * r;
        let new_y = y + angle.to_radians().sin() * r;

        if self.pen.down {
            let id = self.draw_command_id();
            self.draw_commands.push(DrawCommand::DrawLine {
                id,
                x1: x,
                y1: y,
                x2: new_x,
                y2: new_y,
            });
        }
        self.turtle.x = new_x;
        self.turtle.y = new_y;
        Ok(())
    }

    fn rotate(&mut self, angle: &Value) -> Result<(), ErrorKind> {
        let angle_change = angle.get(&self.bindings)? as f64;
        self.turtle.angle += angle_change;
        if self.config.record_rotations {
            let id = self.draw_command_id();
            self.draw_commands
                .push(DrawCommand::Rotate { id, angle_change });
        }
        Ok(())
    }

    fn draw_command_id(&mut self) -> u64 {
        let id = self.next_draw_command_id;
        self.next_draw_command_id += 1;
        id
    }
}

/// Submits `text` to `state`. See [`ScriptState::submit`].
pub fn submit(text: &str, state: &ScriptState) -> ScriptState {
    state.submit(text)
}
