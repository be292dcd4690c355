//! # The substitution engine.
//!
//! A `Substitution` holds a template expression and decides whether a
//! target expression equals the template with every context-mapped
//! parameter replaced by its substitute, without ever materialising the
//! substituted expression.
//!
//! The walk drives over the *target*; a stack of template frames tracks
//! the corresponding position in the template. Substitution happens at
//! push time only: an atomic template node that the context maps pushes
//! its substitute; a called lambda that the context maps binds its formal
//! parameters to the call's arguments and pushes its body (lazy
//! beta-reduction). Each frame records the bindings it introduced so that
//! popping restores the context exactly.

use super::{
    expr::{Expr, ExprView},
    node::Node,
    typecheck::{Context, TypeComparator},
};
use crate::error::{Error, Result};
use crate::logtrace;

/// Checks targets against one template expression.
pub struct Substitution {
    template: Expr,
    /// Template positions mirroring the target walk.
    frames: Vec<Frame>,
    /// First mismatching pair `(template side, target side)`.
    offender: Option<(Expr, Expr)>,
}

struct Frame {
    expr: Expr,
    /// Bindings introduced by this frame, with the values they shadowed.
    undo: Vec<(Node, Option<Expr>)>,
}

impl Substitution {
    pub fn new(template: Expr) -> Self {
        Substitution {
            template,
            frames: Vec::new(),
            offender: None,
        }
    }

    pub fn template(&self) -> &Expr {
        &self.template
    }

    /// Does `target` equal the template under `ctx`?
    ///
    /// `ctx` is only mutated transiently; it is restored before this
    /// returns, also on mismatch. An error is returned for the one
    /// unsupported substitution shape (an atomic substitute in call
    /// position); mere mismatches are recorded and reported as `false`.
    pub fn check(&mut self, target: &Expr, ctx: &mut Context) -> Result<bool> {
        self.offender = None;
        self.frames.clear();

        self.push(self.template.clone(), ctx)?;
        let res = self.walk(target, ctx);
        self.pop(ctx);
        res?;

        logtrace!(
            "match of {} against {}: {}",
            self.template,
            target,
            self.offender.is_none()
        );
        Ok(self.offender.is_none())
    }

    /// The mismatch recorded by the last failing `check`.
    pub fn last_mismatch(&self) -> Option<(&Expr, &Expr)> {
        self.offender.as_ref().map(|(a, b)| (a, b))
    }

    /// Record a binding, compressing chains: an atomic substitute that is
    /// itself bound is replaced by its binding.
    fn bind(node: &Node, mut expr: Expr, ctx: &mut Context, undo: &mut Vec<(Node, Option<Expr>)>) {
        if let ExprView::Atom(a) = expr.view() {
            if let Some(short) = ctx.get(a) {
                expr = short.clone();
            }
        }
        let prev = ctx.insert(node.clone(), expr);
        undo.push((node.clone(), prev));
    }

    fn unbind(ctx: &mut Context, undo: Vec<(Node, Option<Expr>)>) {
        for (node, prev) in undo.into_iter().rev() {
            match prev {
                Some(e) => {
                    ctx.insert(node, e);
                }
                None => {
                    ctx.remove(&node);
                }
            }
        }
    }

    /// Push a template sub-expression, substituting on the fly.
    fn push(&mut self, mut e: Expr, ctx: &mut Context) -> Result<()> {
        enum Step {
            Keep,
            /// Substitute and stop resolving.
            Swap(Expr),
            /// Beta-reduced body; resolve it in turn.
            Reduce(Expr),
        }

        let mut undo = Vec::new();
        loop {
            let step = match e.view() {
                ExprView::Atom(n) => match ctx.get(n) {
                    Some(sub) => Step::Swap(sub.clone()),
                    None => Step::Keep,
                },
                ExprView::Call(f, args) => match ctx.get(f).cloned() {
                    None => Step::Keep,
                    Some(sub) => match sub.view() {
                        // The semantics of calling a substituted atom are
                        // not settled; reject instead of guessing.
                        ExprView::Atom(_) => {
                            return Err(Error::new_string(format!(
                                "cannot substitute atomic expression {} for the called lambda {}",
                                sub, f
                            )))
                        }
                        ExprView::Lambda(params, body) => {
                            let params = params.nodes();
                            if params.len() != args.len() {
                                return Err(Error::arity_mismatch(params.len(), args.len()));
                            }
                            for (p, a) in params.iter().zip(args.iter()) {
                                Self::bind(p, a.clone(), ctx, &mut undo);
                            }
                            Step::Reduce(body.clone())
                        }
                        _ => {
                            return Err(Error::new_string(format!(
                                "substitute {} for the called lambda {} is not a lambda",
                                sub, f
                            )))
                        }
                    },
                },
                _ => Step::Keep,
            };
            match step {
                Step::Keep => break,
                Step::Swap(x) => {
                    e = x;
                    break;
                }
                Step::Reduce(x) => e = x,
            }
        }
        self.frames.push(Frame { expr: e, undo });
        Ok(())
    }

    fn pop(&mut self, ctx: &mut Context) {
        let frame = self.frames.pop().expect("unbalanced matcher stack");
        Self::unbind(ctx, frame.undo);
    }

    fn mismatch(&mut self, template: Expr, target: &Expr) {
        if self.offender.is_none() {
            self.offender = Some((template, target.clone()));
        }
    }

    /// Compare `target` with the template at the top of the stack.
    fn walk(&mut self, target: &Expr, ctx: &mut Context) -> Result<()> {
        if self.offender.is_some() {
            return Ok(());
        }
        let top = self.frames.last().expect("empty matcher stack").expr.clone();

        match (top.view(), target.view()) {
            (ExprView::Atom(e), ExprView::Atom(t)) if e == t => {}
            (ExprView::Call(ef, eargs), ExprView::Call(tf, targs))
                if ef == tf && eargs.len() == targs.len() =>
            {
                let pairs: Vec<(Expr, Expr)> = eargs
                    .iter()
                    .cloned()
                    .zip(targs.iter().cloned())
                    .collect();
                for (ea, ta) in pairs {
                    self.push(ea, ctx)?;
                    let res = self.walk(&ta, ctx);
                    self.pop(ctx);
                    res?;
                }
            }
            (ExprView::Not(ei), ExprView::Not(ti)) => {
                let (ei, ti) = (ei.clone(), ti.clone());
                self.push(ei, ctx)?;
                let res = self.walk(&ti, ctx);
                self.pop(ctx);
                res?;
            }
            (ExprView::Connective(ev, ea, eb), ExprView::Connective(tv, ta, tb)) if ev == tv => {
                let (ea, eb) = (ea.clone(), eb.clone());
                let (ta, tb) = (ta.clone(), tb.clone());
                for (e, t) in [(ea, ta), (eb, tb)] {
                    self.push(e, ctx)?;
                    let res = self.walk(&t, ctx);
                    self.pop(ctx);
                    res?;
                }
            }
            (ExprView::Quantifier(ev, ep), ExprView::Quantifier(tv, tp)) if ev == tv => {
                let (ep, tp) = (ep.clone(), tp.clone());
                self.push(ep, ctx)?;
                let res = self.walk(&tp, ctx);
                self.pop(ctx);
                res?;
            }
            (ExprView::Lambda(eparams, ebody), ExprView::Lambda(tparams, tbody)) => {
                // the signatures must agree under the current context
                let sig_eq =
                    TypeComparator::with_context(ctx).compare(&top.ty(), &target.ty())?;
                let eparams = eparams.nodes();
                let tparams = tparams.nodes();
                if !sig_eq || eparams.len() != tparams.len() {
                    self.mismatch(top.clone(), target);
                } else {
                    // alpha: template parameters stand for the target's
                    let mut undo = Vec::new();
                    for (ep, tp) in eparams.iter().zip(tparams.iter()) {
                        Self::bind(ep, Expr::atom(tp.clone()), ctx, &mut undo);
                    }
                    let (ebody, tbody) = (ebody.clone(), tbody.clone());
                    self.push(ebody, ctx)?;
                    let res = self.walk(&tbody, ctx);
                    self.pop(ctx);
                    Self::unbind(ctx, undo);
                    res?;
                }
            }
            _ => self.mismatch(top.clone(), target),
        }
        Ok(())
    }
}
