//! Errors for the kernel and the syntax layer.

use crate::kernel::Type;
use std::fmt;

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can be returned from the kernel or the parser.
///
/// The error is boxed so that `Result<T>` stays one word wide.
#[derive(Debug, Clone)]
pub struct Error(Box<ErrorImpl>);

#[derive(Debug, Clone)]
pub struct ErrorImpl {
    pub kind: ErrorKind,
    pub source: Option<Error>,
}

/// The kind of an error.
#[derive(Debug, Clone)]
pub enum ErrorKind {
    EStatic(&'static str),
    EDyn(String),
    /// The type comparator rejected during construction or rule application.
    TypeMismatch {
        got: Type,
        want: Type,
        at: String,
    },
    /// A reference or type expression names an unknown identifier.
    UndefinedIdentifier { name: String },
    /// A second non-empty insertion with the same identifier in one theory.
    DuplicateName { name: String },
    /// A proof step names a rule absent from the rules theory.
    UndefinedRule { name: String },
    /// Rule premises or arguments disagree with the declared counts.
    ArityMismatch { expected: usize, got: usize },
}

mod impls {
    use super::*;

    impl std::ops::Deref for Error {
        type Target = ErrorImpl;
        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl fmt::Display for Error {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            match &self.kind {
                ErrorKind::EStatic(msg) => write!(out, "{}", msg),
                ErrorKind::EDyn(s) => write!(out, "{}", s),
                ErrorKind::TypeMismatch { got, want, at } => {
                    write!(out, "type mismatch: got {}, want {}", got, want)?;
                    if !at.is_empty() {
                        write!(out, " ({})", at)?;
                    }
                    Ok(())
                }
                ErrorKind::UndefinedIdentifier { name } => {
                    write!(out, "undeclared identifier {}", name)
                }
                ErrorKind::DuplicateName { name } => {
                    write!(out, "duplicate identifier {}", name)
                }
                ErrorKind::UndefinedRule { name } => write!(out, "undefined rule {}", name),
                ErrorKind::ArityMismatch { expected, got } => {
                    write!(out, "arity mismatch: expected {}, got {}", expected, got)
                }
            }
        }
    }

    impl std::error::Error for Error {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match &self.source {
                None => None,
                Some(p) => Some(p),
            }
        }
    }
}

impl Error {
    fn mk(kind: ErrorKind) -> Self {
        Error(Box::new(ErrorImpl { kind, source: None }))
    }

    /// Build a new error from a static message.
    pub fn new(msg: &'static str) -> Self {
        Self::mk(ErrorKind::EStatic(msg))
    }

    pub fn new_string(msg: String) -> Self {
        Self::mk(ErrorKind::EDyn(msg))
    }

    pub fn type_mismatch(got: &Type, want: &Type, at: impl Into<String>) -> Self {
        Self::mk(ErrorKind::TypeMismatch {
            got: got.clone(),
            want: want.clone(),
            at: at.into(),
        })
    }

    pub fn undefined_identifier(name: impl Into<String>) -> Self {
        Self::mk(ErrorKind::UndefinedIdentifier { name: name.into() })
    }

    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::mk(ErrorKind::DuplicateName { name: name.into() })
    }

    pub fn undefined_rule(name: impl Into<String>) -> Self {
        Self::mk(ErrorKind::UndefinedRule { name: name.into() })
    }

    pub fn arity_mismatch(expected: usize, got: usize) -> Self {
        Self::mk(ErrorKind::ArityMismatch { expected, got })
    }

    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// Change the source of this error.
    pub fn set_source(&mut self, src: Self) {
        // append at the end of the `source` linked list.
        if let Some(e2) = &mut self.0.source {
            e2.set_source(src)
        } else {
            self.0.source = Some(src);
        }
    }

    pub fn with_source(mut self, src: Self) -> Self {
        self.set_source(src);
        self
    }

    /// Display the error, along with its source if any.
    pub fn to_string_with_src(&self) -> String {
        use std::fmt::Write;

        let mut s = String::new();
        let mut e = self;
        loop {
            write!(&mut s, "{}", e).unwrap();
            if let Some(src) = &e.0.source {
                write!(&mut s, "\nin ").unwrap();
                e = src;
            } else {
                break;
            }
        }
        s
    }
}
