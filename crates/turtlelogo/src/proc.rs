use std::{collections::HashMap, rc::Rc};

use crate::{instruction::Instruction, typ::ErrorKind};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Builtin {
    Forward,
    Backward,
    Left,
    Right,
    PenUp,
    PenDown,
    Wait,
    ClearScreen,
    Repeat,
    To,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Forward,
        Builtin::Backward,
        Builtin::Left,
        Builtin::Right,
        Builtin::PenUp,
        Builtin::PenDown,
        Builtin::Wait,
        Builtin::ClearScreen,
        Builtin::Repeat,
        Builtin::To,
    ];

    /// The canonical name comes first, followed by the aliases.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Builtin::Forward => &["forward", "fd"],
            Builtin::Backward => &["backward", "bd", "back", "bk"],
            Builtin::Left => &["left", "lt"],
            Builtin::Right => &["right", "rt"],
            Builtin::PenUp => &["penup", "pu"],
            Builtin::PenDown => &["pendown", "pd"],
            Builtin::Wait => &["wait", "wt"],
            Builtin::ClearScreen => &["clearscreen", "cs"],
            Builtin::Repeat => &["repeat", "rp"],
            Builtin::To => &["to"],
        }
    }

    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            Builtin::Forward | Builtin::Backward => &["distance"],
            Builtin::Left | Builtin::Right => &["angle"],
            Builtin::Wait => &["seconds"],
            Builtin::Repeat => &["times"],
            Builtin::PenUp | Builtin::PenDown | Builtin::ClearScreen | Builtin::To => &[],
        }
    }
}

/// A procedure defined at the prompt with `to ... end`.
#[derive(Clone, Debug)]
pub struct Procedure {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Vec<Instruction>,
}

#[derive(Clone, Debug)]
pub enum Behavior {
    Builtin(Builtin),
    Procedure(Procedure),
}

#[derive(Clone, Debug)]
pub struct FunctionDefinition {
    names: Vec<String>,
    parameters: Vec<String>,
    protected: bool,
    pub behavior: Behavior,
}

impl FunctionDefinition {
    pub fn builtin(builtin: Builtin) -> FunctionDefinition {
        FunctionDefinition {
            names: builtin.names().iter().map(|s| s.to_string()).collect(),
            parameters: builtin.parameters().iter().map(|s| s.to_string()).collect(),
            protected: true,
            behavior: Behavior::Builtin(builtin),
        }
    }

    pub fn procedure(proc: Procedure) -> FunctionDefinition {
        FunctionDefinition {
            names: vec![proc.name.to_lowercase()],
            parameters: proc.parameters.clone(),
            protected: false,
            behavior: Behavior::Procedure(proc),
        }
    }

    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }
}

/// Every function that can start a statement, keyed by each of its (lowercased) names.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    functions: HashMap<String, Rc<FunctionDefinition>>,
}

impl Registry {
    pub fn with_builtins() -> Registry {
        let mut functions = HashMap::new();
        for builtin in Builtin::ALL {
            let def = Rc::new(FunctionDefinition::builtin(builtin));
            for name in def.names() {
                functions.insert(name.clone(), Rc::clone(&def));
            }
        }
        Registry { functions }
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<FunctionDefinition>> {
        self.functions.get(&name.to_lowercase()).cloned()
    }

    /// Adds a definition, replacing any user-defined function with the same name.
    pub fn register(mut self, def: FunctionDefinition) -> Result<Registry, ErrorKind> {
        if let Some(name) = def.names().iter().find(|name| self.is_protected(name)) {
            return Err(ErrorKind::ProtectedName(name.to_lowercase()));
        }

        let def = Rc::new(def);
        for name in def.names() {
            self.functions.insert(name.to_lowercase(), Rc::clone(&def));
        }
        Ok(self)
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.lookup(name).map_or(false, |def| def.is_protected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(name: &str, parameters: &[&str]) -> FunctionDefinition {
        FunctionDefinition::procedure(Procedure {
            name: name.to_owned(),
            parameters: parameters.iter().map(|s| s.to_string()).collect(),
            body: Vec::new(),
        })
    }

    #[test]
    fn aliases_and_case() {
        let reg = Registry::with_builtins();
        let fd = reg.lookup("fd").unwrap();
        assert!(Rc::ptr_eq(&fd, &reg.lookup("forward").unwrap()));
        assert!(Rc::ptr_eq(&fd, &reg.lookup("FORWARD").unwrap()));
        assert!(Rc::ptr_eq(&fd, &reg.lookup("Fd").unwrap()));
        assert_eq!(fd.name(), "forward");
        assert_eq!(fd.parameters(), ["distance"]);
        assert!(reg.lookup("unknown").is_none());
    }

    #[test]
    fn every_builtin_is_protected() {
        let reg = Registry::with_builtins();
        for builtin in Builtin::ALL {
            for name in builtin.names() {
                assert!(reg.is_protected(name), "{name}");
            }
        }
    }

    #[test]
    fn cannot_replace_builtins() {
        let reg = Registry::with_builtins();
        assert_eq!(
            reg.clone().register(proc("TO", &[])).unwrap_err(),
            ErrorKind::ProtectedName("to".to_owned())
        );
        assert_eq!(
            reg.register(proc("lt", &["x"])).unwrap_err(),
            ErrorKind::ProtectedName("lt".to_owned())
        );
    }

    #[test]
    fn user_functions_can_be_replaced() {
        let reg = Registry::with_builtins()
            .register(proc("Square", &[]))
            .unwrap();
        let first = reg.lookup("square").unwrap();
        assert!(!first.is_protected());
        assert!(first.parameters().is_empty());

        let reg = reg.register(proc("square", &["size"])).unwrap();
        let second = reg.lookup("SQUARE").unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(second.parameters(), ["size"]);
    }
}
