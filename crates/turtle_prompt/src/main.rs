use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use turtlelogo::{Config, Error, ScriptState};

mod history;
mod render;

use history::History;

#[derive(Parser, Debug)]
struct Args {
    /// A script to submit, one line at a time, before reading from standard input.
    input: Option<PathBuf>,
    /// Rewrite this SVG file with the current drawing after every submission.
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Rewrite this file with the draw log, as JSON, after every submission.
    #[arg(long)]
    json: Option<PathBuf>,
    /// Put an entry in the draw log for every left and right turn.
    #[arg(long)]
    record_rotations: bool,
    /// Give up on a statement after performing this many instructions.
    #[arg(long, default_value_t = Config::default().step_limit)]
    step_limit: u64,
    /// How deeply blocks and procedure calls may nest.
    #[arg(long, default_value_t = Config::default().max_depth)]
    max_depth: usize,
}

struct Prompt {
    history: History,
    // How much of the draw log we've already printed.
    reported: usize,
    svg: Option<PathBuf>,
    json: Option<PathBuf>,
}

impl Prompt {
    fn new(state: ScriptState) -> Prompt {
        Prompt {
            history: History::new(state),
            reported: 0,
            svg: None,
            json: None,
        }
    }

    fn prompt(&self) -> &'static str {
        if self.history.present().is_pending() {
            ".. "
        } else {
            "> "
        }
    }

    /// Handles one line of input. Returns false if it's time to quit.
    fn handle(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<bool> {
        match line.trim() {
            ".quit" => return Ok(false),
            ".undo" => {
                if !self.history.undo() {
                    writeln!(out, "nothing to undo")?;
                }
            }
            ".redo" => {
                if !self.history.redo() {
                    writeln!(out, "nothing to redo")?;
                }
            }
            _ => self.history.submit(line.trim_end_matches(&['\r', '\n'][..])),
        }
        self.report(out)?;
        Ok(true)
    }

    fn report(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let state = self.history.present();
        let cmds = &state.draw_commands;
        if cmds.len() < self.reported {
            log::debug!("draw log shrank from {} to {}", self.reported, cmds.len());
            self.reported = 0;
        }
        for cmd in &cmds[self.reported..] {
            writeln!(out, "{cmd}")?;
        }
        self.reported = cmds.len();

        if let Some(e) = &state.error {
            write!(out, "{}", describe(e))?;
        }

        if let Some(path) = &self.svg {
            render::save_svg(path, cmds)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        if let Some(path) = &self.json {
            render::save_json(path, cmds)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

/// Formats an error with a row of carets under the part of the line it's talking about.
fn describe(e: &Error) -> String {
    let mut ret = String::new();
    if let (Some(line), Some(pos)) = (&e.line, e.position) {
        let col = |offset: usize| line.get(..offset).map_or(offset, |s| s.chars().count());
        let start = col(pos.start);
        let width = col(pos.end + 1).saturating_sub(start).max(1);
        ret += &format!("  {line}\n  {}{}\n", " ".repeat(start), "^".repeat(width));
    }
    ret += &format!("error: {}\n", e.description());
    ret
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let config = Config {
        record_rotations: args.record_rotations,
        step_limit: args.step_limit,
        max_depth: args.max_depth,
    };
    log::debug!("{config:?}");
    let mut prompt = Prompt::new(ScriptState::new(config));
    prompt.svg = args.svg;
    prompt.json = args.json;

    let mut stdout = std::io::stdout();
    if let Some(path) = &args.input {
        let script = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        for line in script.lines() {
            if !prompt.handle(line, &mut stdout)? {
                return Ok(());
            }
        }
    }

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        write!(stdout, "{}", prompt.prompt())?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if !prompt.handle(&line, &mut stdout)? {
            break;
        }
    }
    Ok(())
}
