use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::object::Object;

/// One scope frame. Lookups fall through to the enclosing frame.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            store: HashMap::new(),
            outer: None,
        }
    }

    /// Create a new environment that is enclosed by a given outer environment
    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Self {
        Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    pub fn get(&self, name: &str) -> Result<Object, RuntimeError> {
        match self.store.get(name) {
            Some(obj) => Ok(obj.clone()),
            // If not found in this environment, look for it in the outer environment
            None => match self.outer {
                Some(ref outer) => outer.borrow().get(name),
                None => Err(RuntimeErrorKind::UndefinedName {
                    name: name.to_owned(),
                }
                .into()),
            },
        }
    }

    /// Bind `name` in this frame, replacing any binding of the same name in this frame and
    /// shadowing the ones in outer frames.
    pub fn define(&mut self, name: String, value: Object) {
        self.store.insert(name, value);
    }

    /// Rebind `name` in the nearest frame that declares it. Never declares anything.
    pub fn assign(&mut self, name: &str, value: Object) -> Result<(), RuntimeError> {
        if let Some(slot) = self.store.get_mut(name) {
            *slot = value;
            Ok(())
        } else {
            match self.outer {
                Some(ref outer) => outer.borrow_mut().assign(name, value),
                None => Err(RuntimeErrorKind::UndefinedName {
                    name: name.to_owned(),
                }
                .into()),
            }
        }
    }

    pub fn depth(&self) -> usize {
        match &self.outer {
            // Recursively add the depth
            Some(parent_env) => 1 + parent_env.borrow().depth(),
            None => 1,
        }
    }
}
