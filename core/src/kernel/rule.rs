//! # Inference rules.
//!
//! A rule couples an ordered parameter list (a theory fragment of typed
//! nodes) with template statements. Applying a rule means choosing a
//! substitute for every parameter and matching the templates against the
//! referenced premises and the derived statement.

use super::{
    expr::{BuiltinType, Expr},
    subst::Substitution,
    theory::{Reference, Theory},
    typecheck::Context,
};
use crate::error::{Error, Result};
use crate::logdebug;

/// The three rule shapes.
pub enum RuleKind {
    /// The statement holds for every substitution of the parameters.
    Tautology { statement: Expr },
    /// The two statements are inter-derivable, in either direction.
    Equivalence { left: Expr, right: Expr },
    /// Premises matching the templates yield the conclusion.
    Deduction {
        premises: Vec<Expr>,
        conclusion: Expr,
    },
}

/// An inference rule with its parameter list.
pub struct Rule {
    params: Theory,
    kind: RuleKind,
}

fn want_statement(e: &Expr, at: &str) -> Result<()> {
    let ty = e.ty();
    if !ty.is_statement() {
        return Err(Error::type_mismatch(
            &ty,
            &Expr::builtin(BuiltinType::Statement),
            at,
        ));
    }
    Ok(())
}

impl Rule {
    /// A tautology rule.
    pub fn tautology(params: Theory, statement: Expr) -> Result<Self> {
        want_statement(&statement, "tautology")?;
        Ok(Rule {
            params,
            kind: RuleKind::Tautology { statement },
        })
    }

    /// An equivalence rule.
    pub fn equivalence(params: Theory, left: Expr, right: Expr) -> Result<Self> {
        want_statement(&left, "first statement")?;
        want_statement(&right, "second statement")?;
        Ok(Rule {
            params,
            kind: RuleKind::Equivalence { left, right },
        })
    }

    /// A deduction rule.
    pub fn deduction(params: Theory, premises: Vec<Expr>, conclusion: Expr) -> Result<Self> {
        for (i, p) in premises.iter().enumerate() {
            want_statement(p, &format!("premise {}", i + 1))?;
        }
        want_statement(&conclusion, "conclusion")?;
        Ok(Rule {
            params,
            kind: RuleKind::Deduction {
                premises,
                conclusion,
            },
        })
    }

    /// The declared parameter list.
    pub fn params(&self) -> &Theory {
        &self.params
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// How many premise references an application must supply.
    pub fn premise_count(&self) -> usize {
        match &self.kind {
            RuleKind::Tautology { .. } => 0,
            RuleKind::Equivalence { .. } => 1,
            RuleKind::Deduction { premises, .. } => premises.len(),
        }
    }

    /// Validate one application: `ctx` holds the substitutes for the
    /// parameters, `premises` the referenced statements, `conclusion` the
    /// derived statement.
    ///
    /// `ctx` is only mutated transiently by the matcher and is restored
    /// before returning.
    pub fn validate(
        &self,
        ctx: &mut Context,
        premises: &[Reference],
        conclusion: &Expr,
    ) -> Result<bool> {
        if premises.len() != self.premise_count() {
            logdebug!(
                "rule application with {} premises, wanted {}",
                premises.len(),
                self.premise_count()
            );
            return Ok(false);
        }

        match &self.kind {
            RuleKind::Tautology { statement } => {
                Substitution::new(statement.clone()).check(conclusion, ctx)
            }
            RuleKind::Equivalence { left, right } => {
                let other = match premises[0].node().definition() {
                    Some(e) => e,
                    None => return Ok(false),
                };
                // the rule may be applied in either direction
                let mut l = Substitution::new(left.clone());
                let mut r = Substitution::new(right.clone());
                let forward = l.check(&other, ctx)? && r.check(conclusion, ctx)?;
                if forward {
                    return Ok(true);
                }
                Ok(l.check(conclusion, ctx)? && r.check(&other, ctx)?)
            }
            RuleKind::Deduction {
                premises: templates,
                conclusion: concl,
            } => {
                for (tpl, reference) in templates.iter().zip(premises.iter()) {
                    let stmt = match reference.node().definition() {
                        Some(e) => e,
                        None => return Ok(false),
                    };
                    if !Substitution::new(tpl.clone()).check(&stmt, ctx)? {
                        return Ok(false);
                    }
                }
                Substitution::new(concl.clone()).check(conclusion, ctx)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::expr::Connective;
    use crate::kernel::node::Node;

    fn stmt(name: &str) -> Node {
        Node::new(Expr::builtin(BuiltinType::Statement), name).unwrap()
    }

    fn params_with(nodes: &[Node]) -> Theory {
        let th = Theory::new();
        let mut pos = None;
        for n in nodes {
            pos = Some(th.add(n.clone(), pos).unwrap());
        }
        th
    }

    fn excluded_middle(a: &Node) -> Rule {
        let ea = Expr::atom(a.clone());
        let stmt = Expr::connective(
            Connective::Or,
            ea.clone(),
            Expr::not(ea).unwrap(),
        )
        .unwrap();
        Rule::tautology(params_with(std::slice::from_ref(a)), stmt).unwrap()
    }

    #[test]
    fn test_tautology_validate() {
        let a = stmt("a");
        let rule = excluded_middle(&a);
        let p = stmt("p");
        let ep = Expr::atom(p.clone());

        let mut ctx = Context::new();
        ctx.insert(a.clone(), ep.clone());
        let goal = Expr::connective(
            Connective::Or,
            ep.clone(),
            Expr::not(ep.clone()).unwrap(),
        )
        .unwrap();
        assert!(rule.validate(&mut ctx, &[], &goal).unwrap());

        // wrong conclusion
        let bad = Expr::connective(Connective::And, ep.clone(), Expr::not(ep).unwrap()).unwrap();
        assert!(!rule.validate(&mut ctx, &[], &bad).unwrap());

        // premises where none are expected
        let th = Theory::new();
        let pos = th
            .add(Node::new_statement("x", Expr::atom(p)).unwrap(), None)
            .unwrap();
        assert!(!rule
            .validate(&mut ctx, &[Reference::new(&th, pos)], &goal)
            .unwrap());
    }

    #[test]
    fn test_rules_want_statement_templates() {
        let person = Node::new(Expr::builtin(BuiltinType::Type), "person").unwrap();
        let x = Node::new(Expr::atom(person), "x").unwrap();
        let th = params_with(&[x.clone()]);
        assert!(Rule::tautology(th, Expr::atom(x)).is_err());
    }

    #[test]
    fn test_validate_is_context_driven() {
        // validating twice with the same context gives the same answer;
        // the matcher holds no state across calls
        let a = stmt("a");
        let rule = excluded_middle(&a);
        let p = stmt("p");
        let ep = Expr::atom(p);
        let goal = Expr::connective(
            Connective::Or,
            ep.clone(),
            Expr::not(ep.clone()).unwrap(),
        )
        .unwrap();
        let mut ctx = Context::new();
        ctx.insert(a, ep);
        assert!(rule.validate(&mut ctx, &[], &goal).unwrap());
        assert!(rule.validate(&mut ctx, &[], &goal).unwrap());
        assert_eq!(ctx.len(), 1);
    }
}
