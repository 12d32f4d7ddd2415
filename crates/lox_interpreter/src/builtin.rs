use std::{
    fmt::Display,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::object::Object;

type BuiltinFn = dyn Fn(&[Object]) -> Result<Object, RuntimeError>;

/// A function implemented by the host, callable from scripts like any other function.
///
/// Nothing is registered by default; hosts pick what to expose with
/// `Evaluator::define_builtin`.
pub struct Builtin {
    name: String,
    arity: usize,
    function: Box<BuiltinFn>,
}

impl Builtin {
    pub fn new<F>(name: &str, arity: usize, function: F) -> Builtin
    where
        F: Fn(&[Object]) -> Result<Object, RuntimeError> + 'static,
    {
        Builtin {
            name: name.to_owned(),
            arity,
            function: Box::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn apply(&self, args: &[Object]) -> Result<Object, RuntimeError> {
        if args.len() != self.arity {
            return Err(RuntimeErrorKind::ArityMismatch {
                expected: self.arity,
                got: args.len(),
            }
            .into());
        }

        (self.function)(args)
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<builtin fn {}>", self.name)
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// `record()`: a new record with no fields.
pub fn record() -> Builtin {
    Builtin::new("record", 0, |_| Ok(Object::new_record()))
}

/// `clock()`: seconds since the Unix epoch.
pub fn clock() -> Builtin {
    Builtin::new("clock", 0, |_| {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0);
        Ok(Object::Number(seconds))
    })
}

#[cfg(test)]
mod tests {
    use crate::builtin::{clock, record, Builtin};
    use crate::error::RuntimeErrorKind;
    use crate::object::Object;

    #[test]
    fn test_arity_is_checked() {
        let err = record().apply(&[Object::Nil]).unwrap_err();
        assert_eq!(
            err.kind,
            RuntimeErrorKind::ArityMismatch {
                expected: 0,
                got: 1
            }
        );
    }

    #[test]
    fn test_custom_builtin() {
        let double = Builtin::new("double", 1, |args| match &args[0] {
            Object::Number(value) => Ok(Object::Number(value * 2.0)),
            other => Err(RuntimeErrorKind::TypeMismatch {
                operator: "double".to_owned(),
                operands: vec![other.clone()],
            }
            .into()),
        });

        assert_eq!(double.apply(&[Object::Number(4.0)]), Ok(Object::Number(8.0)));
        assert!(double.apply(&[Object::Nil]).is_err());
        assert_eq!(double.to_string(), "<builtin fn double>");
    }

    #[test]
    fn test_provided_builtins() {
        assert!(matches!(record().apply(&[]), Ok(Object::Record(_))));
        assert!(matches!(clock().apply(&[]), Ok(Object::Number(seconds)) if seconds > 0.0));
    }
}
