use std::{cell::RefCell, collections::BTreeMap, fmt::Display, rc::Rc};

use crate::{builtin::Builtin, environment::Environment};

use lox_parser::ast::{FunctionDeclaration, Literal};

/// A runtime value.
///
/// Numbers, strings, booleans and nil are plain values. Functions, builtins and records are
/// shared: cloning one clones the handle, and `==` compares identity.
#[derive(Debug, Clone)]
pub enum Object {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
    Function(Rc<Function>),
    Builtin(Rc<Builtin>),
    Record(Rc<RefCell<Record>>),
}

impl Object {
    pub fn typename(&self) -> String {
        use Object::*;

        match self {
            Number(_) => "number".into(),
            String(_) => "string".into(),
            Boolean(_) => "boolean".into(),
            Nil => "nil".into(),
            Function(_) => "function".into(),
            Builtin(_) => "builtin".into(),
            Record(_) => "record".into(),
        }
    }

    /// `nil` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Nil | Object::Boolean(false))
    }

    /// A fresh record with no fields.
    pub fn new_record() -> Object {
        Object::Record(Rc::new(RefCell::new(Record::default())))
    }

    /// Converts the given value to a string (in the format of a code object).
    ///
    /// Use this anywhere a programmer expects to see the code-version of an object (e.g. in the REPL).
    /// # Examples
    /// ```rust
    /// use lox_interpreter::object::Object;
    ///
    /// let obj = Object::String("hello world".to_string());
    ///
    /// assert_eq!(obj.to_code_string(), "\"hello world\"");
    /// ```
    pub fn to_code_string(&self) -> String {
        use Object::*;

        match self {
            String(value) => format!("\"{}\"", value),
            value => value.to_string(),
        }
    }
}

impl From<&Literal> for Object {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(value) => Object::Number(*value),
            Literal::String(value) => Object::String(value.clone()),
            Literal::Boolean(value) => Object::Boolean(*value),
            Literal::Nil => Object::Nil,
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        use Object::*;

        match (self, other) {
            (Number(left), Number(right)) => left == right,
            (String(left), String(right)) => left == right,
            (Boolean(left), Boolean(right)) => left == right,
            (Nil, Nil) => true,
            (Function(left), Function(right)) => Rc::ptr_eq(left, right),
            (Builtin(left), Builtin(right)) => Rc::ptr_eq(left, right),
            (Record(left), Record(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl Display for Object {
    /// toString() form at runtime
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Object::*;

        match self {
            // Whole numbers print without a decimal point
            Number(value) if value.is_finite() && value.fract() == 0.0 => write!(f, "{:.0}", value),
            Number(value) => write!(f, "{}", ryu::Buffer::new().format(*value)),
            String(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            Nil => write!(f, "nil"),
            Function(func) => write!(f, "{}", func),
            Builtin(builtin) => write!(f, "{}", builtin),
            Record(record) => write!(f, "{}", record.borrow()),
        }
    }
}

/// A user-defined function together with the scope it was declared in.
pub struct Function {
    pub declaration: Rc<FunctionDeclaration>,
    pub closure: Rc<RefCell<Environment>>,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.declaration.name.value
    }

    pub fn arity(&self) -> usize {
        self.declaration.parameters.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

// The closure usually contains the function itself, so it is left out
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish()
    }
}

/// A bag of named, mutable fields.
#[derive(Default)]
pub struct Record {
    fields: BTreeMap<String, Object>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<Object> {
        self.fields.get(field).cloned()
    }

    pub fn set(&mut self, field: String, value: Object) {
        self.fields.insert(field, value);
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("fields", &self.fields.keys().collect::<Vec<&String>>())
            .finish()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(name, value)| match value {
                // Records may contain themselves, so nested ones are not expanded
                Object::Record(_) => format!("{}: record {{ ... }}", name),
                value => format!("{}: {}", name, value.to_code_string()),
            })
            .collect();

        if fields.is_empty() {
            write!(f, "record {{}}")
        } else {
            write!(f, "record {{ {} }}", fields.join(", "))
        }
    }
}
