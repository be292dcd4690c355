//! # Proofs.
//!
//! A proof is either a single rule application or a sub-theory of
//! intermediate lemmas whose last statement is the proved one. Proof
//! steps resolve their rule once, at construction, against an injected
//! rules theory, and capture the chosen parameter substitutes in a
//! context.

use super::{
    expr::{BuiltinType, Expr},
    node::Node,
    subst::Substitution,
    theory::{Reference, Theory},
    typecheck::{Context, TypeComparator},
};
use crate::error::{Error, Result};
use crate::logdebug;

/// A proof of a statement.
pub enum Proof {
    Step(ProofStep),
    Long(LongProof),
}

impl Proof {
    /// Does this proof prove `stmt`?
    pub fn proves(&self, stmt: &Node) -> Result<bool> {
        match self {
            Proof::Step(s) => s.proves(stmt),
            Proof::Long(l) => l.proves(stmt),
        }
    }
}

/// A single application of one rule.
#[derive(Debug)]
pub struct ProofStep {
    rule_node: Node,
    ctx: Context,
    refs: Vec<Reference>,
}

impl ProofStep {
    /// Build a proof step: look `rule_name` up in `rules`, then pair the
    /// rule's parameters with `args` in declared order, type-checking each
    /// pair under the context built so far (so a parameter may use types
    /// substituted by earlier parameters).
    pub fn new(
        rules: &Theory,
        rule_name: &str,
        args: Vec<Expr>,
        refs: Vec<Reference>,
    ) -> Result<Self> {
        let rule_node = rules
            .get(rule_name)
            .ok_or_else(|| Error::undefined_rule(rule_name))?
            .node();
        let rule = match rule_node.rule() {
            Some(r) => r,
            None => {
                return Err(Error::type_mismatch(
                    rule_node.ty(),
                    &Expr::builtin(BuiltinType::Rule),
                    format!("{} is not a rule", rule_node),
                ))
            }
        };

        let params = rule.params().nodes();
        if params.len() != args.len() {
            return Err(Error::arity_mismatch(params.len(), args.len()));
        }

        let mut ctx = Context::new();
        for (param, arg) in params.iter().zip(args.iter()) {
            let got = arg.ty();
            let ok = TypeComparator::with_context(&ctx).compare(param.ty(), &got)?;
            if !ok {
                return Err(Error::type_mismatch(
                    &got,
                    param.ty(),
                    format!("substitute for {}", param),
                ));
            }
            ctx.insert(param.clone(), arg.clone());
        }

        Ok(ProofStep {
            rule_node,
            ctx,
            refs,
        })
    }

    pub fn rule_node(&self) -> &Node {
        &self.rule_node
    }

    pub fn references(&self) -> &[Reference] {
        &self.refs
    }

    /// The substitute chosen for a rule parameter.
    pub fn substitute(&self, param: &Node) -> Option<&Expr> {
        self.ctx.get(param)
    }

    /// The substitutes in the rule's parameter order.
    pub fn args(&self) -> Vec<Expr> {
        let rule = self.rule_node.rule().expect("proof step over a non-rule");
        rule.params()
            .nodes()
            .iter()
            .map(|p| self.ctx.get(p).expect("parameter without substitute").clone())
            .collect()
    }

    /// Does this step prove `stmt`?
    pub fn proves(&self, stmt: &Node) -> Result<bool> {
        let concl = match stmt.definition() {
            Some(e) => e,
            None => return Ok(false),
        };
        let rule = self.rule_node.rule().expect("proof step over a non-rule");
        let mut ctx = self.ctx.clone();
        rule.validate(&mut ctx, &self.refs, &concl)
    }
}

/// A proof carried out in a sub-theory of intermediate lemmas.
pub struct LongProof {
    theory: Theory,
}

impl LongProof {
    /// A new, empty sub-theory attached below `parent` at the position of
    /// the statement being proved.
    pub fn new(parent: &Theory, at: usize) -> Self {
        LongProof {
            theory: Theory::new_under(parent, at),
        }
    }

    /// The sub-theory holding the intermediate lemmas.
    pub fn theory(&self) -> &Theory {
        &self.theory
    }

    /// The sub-theory must verify, and its last statement must equal the
    /// proved statement.
    pub fn proves(&self, stmt: &Node) -> Result<bool> {
        if !self.theory.verify() {
            return Ok(false);
        }
        let last = match self.theory.nodes().last().cloned() {
            Some(n) => n,
            None => return Ok(false),
        };
        let (a, b) = match (last.definition(), stmt.definition()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Ok(false),
        };
        let mut ctx = Context::new();
        let ok = Substitution::new(a).check(&b, &mut ctx)?;
        if !ok {
            logdebug!("last lemma of the sub-theory differs from {}", stmt);
        }
        Ok(ok)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::expr::Connective;
    use crate::kernel::rule::Rule;

    fn stmt_node(name: &str) -> Node {
        Node::new(Expr::builtin(BuiltinType::Statement), name).unwrap()
    }

    fn rules_theory() -> (Theory, Node, Node) {
        // (deductionrule ponens (list (statement a) (statement b))
        //     (list (impl a b) a) b)
        let a = stmt_node("a");
        let b = stmt_node("b");
        let params = Theory::new();
        let pos = params.add(a.clone(), None).unwrap();
        params.add(b.clone(), Some(pos)).unwrap();
        let ea = Expr::atom(a.clone());
        let eb = Expr::atom(b.clone());
        let impl_ab = Expr::connective(Connective::Impl, ea.clone(), eb.clone()).unwrap();
        let ponens = Rule::deduction(params, vec![impl_ab, ea], eb).unwrap();

        let rules = Theory::new();
        rules.add(Node::new_rule("ponens", ponens), None).unwrap();
        (rules, a, b)
    }

    fn fixture() -> (Theory, Theory, Expr, Expr) {
        // theory: p, q statements; axiom p; axiom (impl p q)
        let (rules, _, _) = rules_theory();
        let th = Theory::new();
        let p = stmt_node("p");
        let q = stmt_node("q");
        let mut pos = Some(th.add(p.clone(), None).unwrap());
        pos = Some(th.add(q.clone(), pos).unwrap());
        let ep = Expr::atom(p);
        let eq = Expr::atom(q);
        let impl_pq = Expr::connective(Connective::Impl, ep.clone(), eq.clone()).unwrap();
        pos = Some(
            th.add(Node::new_statement("p_holds", ep.clone()).unwrap(), pos)
                .unwrap(),
        );
        th.add(
            Node::new_statement("p_implies_q", impl_pq.clone()).unwrap(),
            pos,
        )
        .unwrap();
        (rules, th, ep, eq)
    }

    #[test]
    fn test_modus_ponens_step() {
        let (rules, th, ep, eq) = fixture();
        let refs = vec![th.get("p_implies_q").unwrap(), th.get("p_holds").unwrap()];
        let step =
            ProofStep::new(&rules, "ponens", vec![ep.clone(), eq.clone()], refs).unwrap();

        let lemma = Node::new_statement("goal", eq.clone()).unwrap();
        assert!(step.proves(&lemma).unwrap());

        // permuting the references must fail
        let refs = vec![th.get("p_holds").unwrap(), th.get("p_implies_q").unwrap()];
        let step = ProofStep::new(&rules, "ponens", vec![ep, eq], refs).unwrap();
        assert!(!step.proves(&lemma).unwrap());
    }

    #[test]
    fn test_unknown_rule() {
        let (rules, _, ep, eq) = fixture();
        let err = ProofStep::new(&rules, "snoenp", vec![ep, eq], vec![]).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ErrorKind::UndefinedRule { .. }
        ));
    }

    #[test]
    fn test_argument_arity_and_types() {
        let (rules, _, ep, _) = fixture();
        let err = ProofStep::new(&rules, "ponens", vec![ep.clone()], vec![]).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ErrorKind::ArityMismatch { .. }
        ));

        // a person is not a statement
        let person = Node::new(Expr::builtin(BuiltinType::Type), "person").unwrap();
        let fritz = Node::new(Expr::atom(person), "fritz").unwrap();
        let err =
            ProofStep::new(&rules, "ponens", vec![ep, Expr::atom(fritz)], vec![]).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ErrorKind::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_proof_attach_is_idempotent() {
        let (rules, th, ep, eq) = fixture();
        let refs = vec![th.get("p_implies_q").unwrap(), th.get("p_holds").unwrap()];
        let step = ProofStep::new(&rules, "ponens", vec![ep.clone(), eq.clone()], refs.clone())
            .unwrap();
        let lemma = Node::new_statement("goal", eq.clone()).unwrap();
        th.add(lemma.clone(), Some(th.len() - 1)).unwrap();
        lemma.attach_proof(Proof::Step(step)).unwrap();
        assert!(th.verify());
        // attaching the same proof again leaves verify() unchanged
        let step = ProofStep::new(&rules, "ponens", vec![ep, eq], refs).unwrap();
        lemma.attach_proof(Proof::Step(step)).unwrap();
        assert!(th.verify());
    }

    #[test]
    fn test_long_proof() {
        let (rules, th, ep, eq) = fixture();
        let goal = Node::new_statement("goal", eq.clone()).unwrap();
        let at = th.add(goal.clone(), Some(th.len() - 1)).unwrap();

        let long = LongProof::new(&th, at);
        let sub = long.theory().clone();
        let refs = vec![th.get("p_implies_q").unwrap(), th.get("p_holds").unwrap()];
        let inner = Node::new_statement("", eq.clone()).unwrap();
        let step = ProofStep::new(&rules, "ponens", vec![ep, eq], refs).unwrap();
        inner.attach_proof(Proof::Step(step)).unwrap();
        sub.add(inner, None).unwrap();

        goal.attach_proof(Proof::Long(long)).unwrap();
        assert!(th.verify());
    }

    #[test]
    fn test_empty_long_proof_fails() {
        let (_, th, _, eq) = fixture();
        let goal = Node::new_statement("goal2", eq).unwrap();
        let at = th.add(goal.clone(), Some(th.len() - 1)).unwrap();
        let long = LongProof::new(&th, at);
        goal.attach_proof(Proof::Long(long)).unwrap();
        assert!(!th.verify());
    }
}
