//! # Structural type equality.
//!
//! A `TypeComparator` decides equality of two type expressions. Both are
//! serialised into a flat tag sequence and the sequences are compared;
//! when the comparator holds a context, atomic types that the context
//! maps are resolved through the mapping first. During rule application
//! this is what lets a parameter type like `(T y)`'s `T` stand for a
//! concrete type chosen earlier in the same application.

use super::{
    expr::{BuiltinType, Expr, Type},
    node::Node,
    visit::Visitor,
};
use crate::error::{Error, Result};
use crate::fnv::{self, FnvHashMap};
use std::fmt;

/// The substitutes chosen for rule parameters in one proof step.
#[derive(Clone, Default)]
pub struct Context {
    map: FnvHashMap<Node, Expr>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            map: fnv::new_table(),
        }
    }

    /// Record a substitute, returning the previous one if present.
    pub fn insert(&mut self, node: Node, expr: Expr) -> Option<Expr> {
        self.map.insert(node, expr)
    }

    pub fn get(&self, node: &Node) -> Option<&Expr> {
        self.map.get(node)
    }

    pub fn remove(&mut self, node: &Node) -> Option<Expr> {
        self.map.remove(node)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "(context")?;
        for (n, e) in &self.map {
            write!(out, " ({} := {})", n, e)?;
        }
        write!(out, ")")
    }
}

/// One element of the flattened encoding of a type.
#[derive(Clone, PartialEq, Eq, Debug)]
enum Tag {
    Variant(BuiltinType),
    Open,
    Close,
    /// Identity of a node the context does not resolve.
    Ident(Node),
}

/// Compares type expressions, optionally through a context.
///
/// The comparator carries its serialisation buffers across calls; it is
/// cheap to reuse but not reentrant.
pub struct TypeComparator<'a> {
    ctx: Option<&'a Context>,
    buf: [Vec<Tag>; 2],
}

impl<'a> TypeComparator<'a> {
    pub fn new() -> Self {
        TypeComparator {
            ctx: None,
            buf: [Vec::new(), Vec::new()],
        }
    }

    pub fn with_context(ctx: &'a Context) -> Self {
        TypeComparator {
            ctx: Some(ctx),
            buf: [Vec::new(), Vec::new()],
        }
    }

    /// Decide whether `a` and `b` denote the same type.
    ///
    /// Both arguments must be types (their own type is `type`).
    pub fn compare(&mut self, a: &Type, b: &Type) -> Result<bool> {
        for e in [a, b] {
            let ty = e.ty();
            if !ty.is_type() {
                return Err(Error::type_mismatch(
                    &ty,
                    &Expr::builtin(BuiltinType::Type),
                    "comparing non-types",
                ));
            }
        }

        // equal references denote equal types
        if a == b {
            return Ok(true);
        }

        let ctx = self.ctx;
        let [b0, b1] = &mut self.buf;
        b0.clear();
        b1.clear();
        a.accept(&mut Flatten { ctx, out: b0 });
        b.accept(&mut Flatten { ctx, out: b1 });
        Ok(b0 == b1)
    }
}

impl<'a> Default for TypeComparator<'a> {
    fn default() -> Self {
        Self::new()
    }
}

struct Flatten<'c, 'o> {
    ctx: Option<&'c Context>,
    out: &'o mut Vec<Tag>,
}

impl<'c, 'o> Visitor for Flatten<'c, 'o> {
    fn visit_builtin(&mut self, b: BuiltinType) {
        self.out.push(Tag::Variant(b));
    }

    fn visit_lambda_type(&mut self, args: &[Expr], ret: &Expr) {
        self.out.push(Tag::Open);
        ret.accept(self);
        for a in args {
            a.accept(self);
        }
        self.out.push(Tag::Close);
    }

    fn visit_atom(&mut self, node: &Node) {
        // resolve through the context if the node is a parameter there
        if let Some(e) = self.ctx.and_then(|c| c.get(node)) {
            e.accept(self)
        } else {
            self.out.push(Tag::Ident(node.clone()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ty_node(name: &str) -> Node {
        Node::new(Expr::builtin(BuiltinType::Type), name).unwrap()
    }

    fn pred_ty(args: &[Expr]) -> Expr {
        Expr::lambda_type(
            args.iter().cloned().collect(),
            Expr::builtin(BuiltinType::Statement),
        )
        .unwrap()
    }

    #[test]
    fn test_structural_equality() {
        let t1 = ty_node("type1");
        let t2 = ty_node("type2");
        let v0 = Expr::atom(t1.clone());
        let v1 = Expr::atom(t1);
        let v2 = Expr::atom(t2);

        let stmt = Expr::builtin(BuiltinType::Statement);
        let lam0 = pred_ty(&[stmt.clone(), v0.clone()]);
        let lam1 = Expr::lambda_type([v2.clone()].into_iter().collect(), v0.clone()).unwrap();

        let mut cmp = TypeComparator::new();
        assert!(cmp.compare(&stmt, &stmt).unwrap());
        assert!(!cmp.compare(&stmt, &v1).unwrap());
        assert!(!cmp.compare(&stmt, &lam0).unwrap());
        assert!(cmp.compare(&v0, &v1).unwrap());
        assert!(!cmp.compare(&v0, &v2).unwrap());
        assert!(cmp.compare(&v2, &v2).unwrap());
        assert!(cmp.compare(&lam1, &lam1).unwrap());
        assert!(!cmp.compare(&lam0, &lam1).unwrap());
    }

    #[test]
    fn test_equivalence_relation() {
        let t = ty_node("t");
        let a = Expr::atom(t.clone());
        let b = Expr::atom(t.clone());
        let c = Expr::atom(t);
        let mut cmp = TypeComparator::new();
        // reflexive, symmetric, transitive
        assert!(cmp.compare(&a, &a).unwrap());
        assert!(cmp.compare(&a, &b).unwrap() && cmp.compare(&b, &a).unwrap());
        assert!(
            cmp.compare(&a, &b).unwrap()
                && cmp.compare(&b, &c).unwrap()
                && cmp.compare(&a, &c).unwrap()
        );
    }

    #[test]
    fn test_context_resolution() {
        // with T mapped to person, (lambda-type statement (list T)) equals
        // (lambda-type statement (list person))
        let t = ty_node("T");
        let person = ty_node("person");
        let over_t = pred_ty(&[Expr::atom(t.clone())]);
        let over_person = pred_ty(&[Expr::atom(person.clone())]);

        let mut cmp = TypeComparator::new();
        assert!(!cmp.compare(&over_t, &over_person).unwrap());

        let mut ctx = Context::new();
        ctx.insert(t, Expr::atom(person));
        let mut cmp = TypeComparator::with_context(&ctx);
        assert!(cmp.compare(&over_t, &over_person).unwrap());
    }

    #[test]
    fn test_rejects_non_types() {
        let a = Node::new(Expr::builtin(BuiltinType::Statement), "a").unwrap();
        let e = Expr::atom(a);
        let stmt = Expr::builtin(BuiltinType::Statement);
        let mut cmp = TypeComparator::new();
        assert!(cmp.compare(&e, &stmt).is_err());
    }
}
