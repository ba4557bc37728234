use std::{cell::RefCell, collections::HashMap, rc::Rc};

use scanner::Token;

use crate::{value::Value, RuntimeError, RuntimeErrorType};

/// Chain of scope frames, innermost last. The enclosing frame of `frames[i]` is `frames[i - 1]`
/// and `frames[0]` holds the globals, so the chain always mirrors the static block nesting.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<HashMap<String, Value>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self { frames: vec![HashMap::new()] }
    }
}

impl Environment {
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
        log::debug!("Entered scope, depth is now {}", self.depth());
    }

    pub fn pop_frame(&mut self) {
        debug_assert!(self.frames.len() > 1, "the global frame is never popped");
        self.frames.pop();
        log::debug!("Left scope, depth is now {}", self.depth());
    }

    /// Number of frames, including the global one.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Binds `name` in the innermost frame. Redefining an existing name just overwrites it.
    pub fn define(&mut self, name: &str, value: Value) {
        log::trace!("define {} = {}", name, value);
        self.innermost().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name.lexeme()))
            .cloned()
            .ok_or_else(|| undefined(name))
    }

    /// Overwrites the nearest existing binding of `name`. Never creates a new one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        match self.frames.iter_mut().rev().find_map(|frame| frame.get_mut(name.lexeme())) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }

    fn innermost(&mut self) -> &mut HashMap<String, Value> {
        self.frames.last_mut().expect("the global frame is never popped")
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(RuntimeErrorType::UndefinedVariable(name.lexeme().to_string()), name.line())
}

/// Pushes a frame on creation and pops it again when dropped, so the frame is gone on every
/// exit path out of a block, including errors.
pub struct Scope(Rc<RefCell<Environment>>);

impl Scope {
    pub fn new(env: Rc<RefCell<Environment>>) -> Self {
        env.borrow_mut().push_frame();
        Self(env)
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.0.borrow_mut().pop_frame();
    }
}
