//! # Traversal hooks for the expression tree.
//!
//! One method per concrete variant, with no-op defaults; concrete
//! visitors override the variants they care about. The writer and the
//! type comparator are expressed this way.

use super::{
    expr::{BuiltinType, Connective, Expr, ExprView, Quantifier},
    node::Node,
    theory::Theory,
};

pub trait Visitor {
    fn visit_builtin(&mut self, _b: BuiltinType) {}
    fn visit_atom(&mut self, _node: &Node) {}
    fn visit_call(&mut self, _f: &Node, _args: &[Expr]) {}
    fn visit_not(&mut self, _inner: &Expr) {}
    fn visit_connective(&mut self, _v: Connective, _lhs: &Expr, _rhs: &Expr) {}
    fn visit_quantifier(&mut self, _v: Quantifier, _pred: &Expr) {}
    fn visit_lambda(&mut self, _params: &Theory, _body: &Expr) {}
    fn visit_lambda_type(&mut self, _args: &[Expr], _ret: &Expr) {}
}

impl Expr {
    /// Dispatch once on the root variant.
    pub fn accept<V: Visitor + ?Sized>(&self, v: &mut V) {
        match self.view() {
            ExprView::Builtin(b) => v.visit_builtin(*b),
            ExprView::Atom(n) => v.visit_atom(n),
            ExprView::Call(f, args) => v.visit_call(f, args),
            ExprView::Not(e) => v.visit_not(e),
            ExprView::Connective(c, a, b) => v.visit_connective(*c, a, b),
            ExprView::Quantifier(q, p) => v.visit_quantifier(*q, p),
            ExprView::Lambda(params, body) => v.visit_lambda(params, body),
            ExprView::LambdaType(args, ret) => v.visit_lambda_type(args, ret),
        }
    }
}
