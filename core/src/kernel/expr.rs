//! # Expressions and types.
//!
//! Types are first-class expressions of the built-in type `type`: a type
//! position may hold a built-in, an atomic expression pointing at a node
//! declared with type `type`, or a lambda type. All expressions are
//! refcounted and thus cheaply clonable; equality is pointer identity.

use super::{node::Node, theory::Theory, typecheck::TypeComparator, Ref};
use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;

/// An expression.
#[derive(Clone)]
pub struct Expr(Ref<ExprImpl>);

/// Types and expressions share one representation; the alias is for
/// documentation.
pub type Type = Expr;

/// Small vector of expressions.
pub type Exprs = SmallVec<[Expr; 3]>;

/// The built-in types.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BuiltinType {
    Type,
    Statement,
    Rule,
    Undefined,
}

/// The binary connectives.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Connective {
    And,
    Or,
    Impl,
    Equiv,
}

/// The quantifiers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Quantifier {
    Forall,
    Exists,
}

/// The public view of an expression's root.
pub enum ExprView {
    /// A built-in type.
    Builtin(BuiltinType),
    /// Reference to a named node: an individual, a predicate, a declared type.
    Atom(Node),
    /// A named lambda applied to argument expressions.
    Call(Node, Exprs),
    /// Negation.
    Not(Expr),
    /// Binary connective.
    Connective(Connective, Expr, Expr),
    /// Quantifier over a predicate expression.
    Quantifier(Quantifier, Expr),
    /// Anonymous parametrised expression; the parameter list is a theory
    /// fragment of declared nodes.
    Lambda(Theory, Expr),
    /// A lambda type: argument types and a return type.
    LambdaType(Exprs, Expr),
}

struct ExprImpl {
    view: ExprView,
}

impl BuiltinType {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Type => "type",
            BuiltinType::Statement => "statement",
            BuiltinType::Rule => "rule",
            BuiltinType::Undefined => "undefined",
        }
    }
}

impl Connective {
    pub fn name(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
            Connective::Impl => "impl",
            Connective::Equiv => "equiv",
        }
    }
}

impl Quantifier {
    pub fn name(self) -> &'static str {
        match self {
            Quantifier::Forall => "forall",
            Quantifier::Exists => "exists",
        }
    }
}

impl Expr {
    fn make_(view: ExprView) -> Self {
        Expr(Ref::new(ExprImpl { view }))
    }

    /// View the expression's root.
    #[inline]
    pub fn view(&self) -> &ExprView {
        &self.0.view
    }

    /// A built-in type expression.
    pub fn builtin(b: BuiltinType) -> Self {
        Self::make_(ExprView::Builtin(b))
    }

    /// An atomic expression referring to `node`.
    pub fn atom(node: Node) -> Self {
        Self::make_(ExprView::Atom(node))
    }

    /// Apply the lambda node `f` to `args`.
    ///
    /// The callee must be declared with a lambda type, and the arguments
    /// must match its argument types position-wise.
    pub fn call(f: Node, args: Exprs) -> Result<Self> {
        let fty = f.ty().clone();
        let (arg_tys, _ret) = match fty.view() {
            ExprView::LambdaType(a, r) => (a, r),
            _ => {
                return Err(Error::type_mismatch(
                    &fty,
                    &Expr::builtin(BuiltinType::Type),
                    format!("{} is not a lambda", f),
                ))
            }
        };
        if arg_tys.len() != args.len() {
            return Err(Error::arity_mismatch(arg_tys.len(), args.len()));
        }
        let mut cmp = TypeComparator::new();
        for (i, (want, arg)) in arg_tys.iter().zip(args.iter()).enumerate() {
            let got = arg.ty();
            if !cmp.compare(want, &got)? {
                return Err(Error::type_mismatch(&got, want, format!("argument {}", i + 1)));
            }
        }
        Ok(Self::make_(ExprView::Call(f, args)))
    }

    /// Negate a statement.
    pub fn not(e: Expr) -> Result<Self> {
        let ty = e.ty();
        if !ty.is_statement() {
            return Err(Error::type_mismatch(
                &ty,
                &Expr::builtin(BuiltinType::Statement),
                "operand of not",
            ));
        }
        Ok(Self::make_(ExprView::Not(e)))
    }

    /// Connect two statements.
    pub fn connective(v: Connective, lhs: Expr, rhs: Expr) -> Result<Self> {
        for (e, at) in [(&lhs, "first operand"), (&rhs, "second operand")] {
            let ty = e.ty();
            if !ty.is_statement() {
                return Err(Error::type_mismatch(
                    &ty,
                    &Expr::builtin(BuiltinType::Statement),
                    at,
                ));
            }
        }
        Ok(Self::make_(ExprView::Connective(v, lhs, rhs)))
    }

    /// Quantify over a predicate expression.
    ///
    /// The operand must have a lambda type returning `statement`.
    pub fn quantifier(v: Quantifier, pred: Expr) -> Result<Self> {
        let ty = pred.ty();
        let ok = match ty.view() {
            ExprView::LambdaType(_, ret) => ret.is_statement(),
            _ => false,
        };
        if !ok {
            return Err(Error::type_mismatch(
                &ty,
                &Expr::builtin(BuiltinType::Statement),
                format!("operand of {} must be a predicate", v.name()),
            ));
        }
        Ok(Self::make_(ExprView::Quantifier(v, pred)))
    }

    /// A lambda expression over a parameter list.
    ///
    /// The parameters are well-typed by construction (a node's declared
    /// type always has type `type`), so this cannot fail.
    pub fn lambda(params: Theory, body: Expr) -> Self {
        Self::make_(ExprView::Lambda(params, body))
    }

    /// A lambda type with the given argument types and return type.
    pub fn lambda_type(args: Exprs, ret: Type) -> Result<Self> {
        let rty = ret.ty();
        if !rty.is_type() {
            return Err(Error::type_mismatch(
                &rty,
                &Expr::builtin(BuiltinType::Type),
                "return type",
            ));
        }
        for (i, a) in args.iter().enumerate() {
            let aty = a.ty();
            if !aty.is_type() {
                return Err(Error::type_mismatch(
                    &aty,
                    &Expr::builtin(BuiltinType::Type),
                    format!("argument {}", i + 1),
                ));
            }
        }
        Ok(Self::make_(ExprView::LambdaType(args, ret)))
    }

    /// The type of this expression. Total and deterministic.
    pub fn ty(&self) -> Type {
        match self.view() {
            ExprView::Builtin(_) | ExprView::LambdaType(..) => Expr::builtin(BuiltinType::Type),
            ExprView::Atom(n) => n.ty().clone(),
            ExprView::Call(f, _) => match f.ty().view() {
                ExprView::LambdaType(_, ret) => ret.clone(),
                // unreachable through the checked constructor
                _ => Expr::builtin(BuiltinType::Undefined),
            },
            ExprView::Not(..) | ExprView::Connective(..) | ExprView::Quantifier(..) => {
                Expr::builtin(BuiltinType::Statement)
            }
            ExprView::Lambda(params, body) => {
                let args: Exprs = params.nodes().iter().map(|n| n.ty().clone()).collect();
                Self::make_(ExprView::LambdaType(args, body.ty()))
            }
        }
    }

    /// Is this the built-in `type`?
    pub fn is_type(&self) -> bool {
        matches!(self.view(), ExprView::Builtin(BuiltinType::Type))
    }

    /// Is this the built-in `statement`?
    pub fn is_statement(&self) -> bool {
        matches!(self.view(), ExprView::Builtin(BuiltinType::Statement))
    }

    /// Is this the built-in `rule`?
    pub fn is_rule(&self) -> bool {
        matches!(self.view(), ExprView::Builtin(BuiltinType::Rule))
    }

    /// View as an atomic expression.
    pub fn as_atom(&self) -> Option<&Node> {
        match self.view() {
            ExprView::Atom(n) => Some(n),
            _ => None,
        }
    }

    /// View as a lambda expression.
    pub fn as_lambda(&self) -> Option<(&Theory, &Expr)> {
        match self.view() {
            ExprView::Lambda(params, body) => Some((params, body)),
            _ => None,
        }
    }

    /// View as a lambda type.
    pub fn as_lambda_type(&self) -> Option<(&[Expr], &Expr)> {
        match self.view() {
            ExprView::LambdaType(args, ret) => Some((args, ret)),
            _ => None,
        }
    }
}

mod impls {
    use super::*;

    impl Eq for Expr {}
    impl PartialEq for Expr {
        fn eq(&self, other: &Self) -> bool {
            // simple pointer equality
            Ref::ptr_eq(&self.0, &other.0)
        }
    }

    impl std::hash::Hash for Expr {
        fn hash<H: std::hash::Hasher>(&self, h: &mut H) {
            // hash the pointer
            std::ptr::hash(Ref::as_ptr(&self.0), h)
        }
    }

    impl fmt::Display for Expr {
        /// Single-line rendering in the surface syntax, used in error
        /// messages and tests. The proper writer lives in `syntax`.
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            match self.view() {
                ExprView::Builtin(b) => write!(out, "{}", b.name()),
                ExprView::Atom(n) => write!(out, "{}", n),
                ExprView::Call(f, args) => {
                    write!(out, "({}", f)?;
                    for a in args {
                        write!(out, " {}", a)?;
                    }
                    write!(out, ")")
                }
                ExprView::Not(e) => write!(out, "(not {})", e),
                ExprView::Connective(v, a, b) => write!(out, "({} {} {})", v.name(), a, b),
                ExprView::Quantifier(v, p) => write!(out, "({} {})", v.name(), p),
                ExprView::Lambda(params, body) => {
                    write!(out, "(lambda (list")?;
                    for n in params.nodes() {
                        write!(out, " ({} {})", n.ty(), n)?;
                    }
                    write!(out, ") {})", body)
                }
                ExprView::LambdaType(args, ret) => {
                    write!(out, "(lambda-type {} (list", ret)?;
                    for a in args {
                        write!(out, " {}", a)?;
                    }
                    write!(out, "))")
                }
            }
        }
    }

    impl fmt::Debug for Expr {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "{}", self)
        }
    }
}
