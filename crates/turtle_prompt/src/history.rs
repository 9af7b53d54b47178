use turtlelogo::ScriptState;

/// Undo/redo for the prompt.
///
/// A submission only gets its own history entry if it actually performed a statement. Typing the
/// first half of a statement, or something that fails, just replaces the present state.
pub struct History {
    past: Vec<ScriptState>,
    present: ScriptState,
    future: Vec<ScriptState>,
}

impl History {
    pub fn new(present: ScriptState) -> History {
        History {
            past: Vec::new(),
            present,
            future: Vec::new(),
        }
    }

    pub fn present(&self) -> &ScriptState {
        &self.present
    }

    pub fn submit(&mut self, text: &str) {
        let next = self.present.submit(text);
        if next.next_instruction_id() != self.present.next_instruction_id() {
            self.past.push(std::mem::replace(&mut self.present, next));
            self.future.clear();
        } else {
            self.present = next;
        }
    }

    /// Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.past.pop() else {
            return false;
        };
        self.future.push(std::mem::replace(&mut self.present, prev));
        true
    }

    /// Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push(std::mem::replace(&mut self.present, next));
        true
    }
}
