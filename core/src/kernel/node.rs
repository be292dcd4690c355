//! # Nodes: named declarations in a theory.
//!
//! A node couples a declared type with an identifier (possibly empty) and
//! an optional definition expression. Statements and rules are nodes with
//! an extra payload. Nodes are shared by reference; equality is pointer
//! identity, so two distinct declarations never compare equal even under
//! the same name.

use super::{
    expr::{BuiltinType, Expr, Type},
    proof::Proof,
    rule::Rule,
    symbol::Symbol,
    typecheck::TypeComparator,
    Ref,
};
use crate::error::{Error, Result};
use std::{cell::RefCell, fmt};

/// A named declaration.
#[derive(Clone)]
pub struct Node(Ref<NodeImpl>);

struct NodeImpl {
    /// Declared type; its own type is always `type`.
    ty: Type,
    /// Identifier, empty for anonymous statements.
    name: Symbol,
    /// Definition, attached at most once after construction.
    def: RefCell<Option<Expr>>,
    payload: Payload,
}

enum Payload {
    Plain,
    Statement { proof: RefCell<Option<Ref<Proof>>> },
    Rule(Rule),
}

impl Node {
    fn make_(ty: Type, name: Symbol, def: Option<Expr>, payload: Payload) -> Self {
        Node(Ref::new(NodeImpl {
            ty,
            name,
            def: RefCell::new(def),
            payload,
        }))
    }

    /// Declare a node of the given type.
    ///
    /// The declared type must itself have type `type`.
    pub fn new(ty: Type, name: impl Into<Symbol>) -> Result<Self> {
        let tyty = ty.ty();
        if !tyty.is_type() {
            return Err(Error::type_mismatch(
                &tyty,
                &Expr::builtin(BuiltinType::Type),
                "declared type of a node",
            ));
        }
        Ok(Self::make_(ty, name.into(), None, Payload::Plain))
    }

    /// Declare a statement defined by `expr`, which must have type
    /// `statement`.
    pub fn new_statement(name: impl Into<Symbol>, expr: Expr) -> Result<Self> {
        let ty = expr.ty();
        if !ty.is_statement() {
            return Err(Error::type_mismatch(
                &ty,
                &Expr::builtin(BuiltinType::Statement),
                "content of a statement",
            ));
        }
        Ok(Self::make_(
            Expr::builtin(BuiltinType::Statement),
            name.into(),
            Some(expr),
            Payload::Statement {
                proof: RefCell::new(None),
            },
        ))
    }

    /// Declare a named rule.
    pub fn new_rule(name: impl Into<Symbol>, rule: Rule) -> Self {
        Self::make_(
            Expr::builtin(BuiltinType::Rule),
            name.into(),
            None,
            Payload::Rule(rule),
        )
    }

    /// Declared type of the node.
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    /// Identifier of the node; empty for anonymous nodes.
    pub fn name(&self) -> &str {
        self.0.name.name()
    }

    pub fn symbol(&self) -> &Symbol {
        &self.0.name
    }

    /// The definition expression, if any.
    pub fn definition(&self) -> Option<Expr> {
        self.0.def.borrow().clone()
    }

    /// Attach a definition. Only allowed once, and the definition's type
    /// must be structurally equal to the declared type.
    pub fn set_definition(&self, expr: Expr) -> Result<()> {
        let got = expr.ty();
        if !TypeComparator::new().compare(&self.0.ty, &got)? {
            return Err(Error::type_mismatch(&got, &self.0.ty, format!("definition of {}", self)));
        }
        let mut slot = self.0.def.borrow_mut();
        if slot.is_some() {
            return Err(Error::new_string(format!("{} is already defined", self)));
        }
        *slot = Some(expr);
        Ok(())
    }

    /// Is this node a statement?
    pub fn is_statement(&self) -> bool {
        matches!(self.0.payload, Payload::Statement { .. })
    }

    /// The proof attached to a statement node.
    pub fn proof(&self) -> Option<Ref<Proof>> {
        match &self.0.payload {
            Payload::Statement { proof } => proof.borrow().clone(),
            _ => None,
        }
    }

    /// Attach a proof to a statement node. Re-attaching replaces the
    /// previous proof.
    pub fn attach_proof(&self, p: Proof) -> Result<()> {
        match &self.0.payload {
            Payload::Statement { proof } => {
                *proof.borrow_mut() = Some(Ref::new(p));
                Ok(())
            }
            _ => Err(Error::new_string(format!("{} is not a statement", self))),
        }
    }

    /// The rule payload of a rule node.
    pub fn rule(&self) -> Option<&Rule> {
        match &self.0.payload {
            Payload::Rule(r) => Some(r),
            _ => None,
        }
    }
}

mod impls {
    use super::*;

    impl Eq for Node {}
    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            Ref::ptr_eq(&self.0, &other.0)
        }
    }

    impl std::hash::Hash for Node {
        fn hash<H: std::hash::Hasher>(&self, h: &mut H) {
            std::ptr::hash(Ref::as_ptr(&self.0), h)
        }
    }

    impl fmt::Display for Node {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            if self.0.name.is_empty() {
                write!(out, "<anonymous>")
            } else {
                write!(out, "{}", self.0.name)
            }
        }
    }

    impl fmt::Debug for Node {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "{} : {}", self, self.0.ty)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::expr::Connective;

    #[test]
    fn test_definition_type_checked() {
        let person = Node::new(Expr::builtin(BuiltinType::Type), "person").unwrap();
        let person_ty = Expr::atom(person);
        let x = Node::new(person_ty.clone(), "x").unwrap();
        let y = Node::new(person_ty, "y").unwrap();
        let a = Node::new(Expr::builtin(BuiltinType::Statement), "a").unwrap();

        // y := x is fine, a := x is not
        y.set_definition(Expr::atom(x.clone())).unwrap();
        let err = a.set_definition(Expr::atom(x)).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ErrorKind::TypeMismatch { .. }
        ));
        // a second definition is rejected
        assert!(y.set_definition(Expr::atom(y.clone())).is_err());
    }

    #[test]
    fn test_statement_content_must_be_statement() {
        let a = Node::new(Expr::builtin(BuiltinType::Statement), "a").unwrap();
        let b = Node::new(Expr::builtin(BuiltinType::Statement), "b").unwrap();
        let e = Expr::connective(Connective::Or, Expr::atom(a), Expr::atom(b)).unwrap();
        let s = Node::new_statement("s", e).unwrap();
        assert!(s.is_statement());
        assert!(s.definition().is_some());
        assert!(s.proof().is_none());

        let person = Node::new(Expr::builtin(BuiltinType::Type), "person").unwrap();
        assert!(Node::new_statement("t", Expr::atom(person)).is_err());
    }

    #[test]
    fn test_identity() {
        let a1 = Node::new(Expr::builtin(BuiltinType::Statement), "a").unwrap();
        let a2 = Node::new(Expr::builtin(BuiltinType::Statement), "a").unwrap();
        assert_ne!(a1, a2);
        assert_eq!(a1, a1.clone());
    }
}
