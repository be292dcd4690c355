//! End-to-end checks: parse a rules theory and a theory file, verify the
//! lemmas, and round-trip through the writer.

use theoria::{BuiltinType, Expr, ErrorKind, Node, Parser, ProofStep, Theory, Writer};

const RULES: &str = include_str!("../../basic/rules.lth");
const FRITZ: &str = include_str!("../../basic/fritz.lth");

fn load_rules() -> Theory {
    let mut p = Parser::new(RULES, "rules.lth");
    let th = p.parse_theory();
    assert_eq!(p.errors(), 0, "rules must parse: {:?}", p.messages());
    th
}

fn parse_with_rules<'a>(src: &'a str, name: &str) -> (Theory, Parser<'a>) {
    let mut p = Parser::new(src, name);
    p.set_rules(load_rules());
    let th = p.parse_theory();
    (th, p)
}

fn parse_clean(src: &str, name: &str) -> Theory {
    let (th, p) = parse_with_rules(src, name);
    assert_eq!(p.errors(), 0, "unexpected errors: {:?}", p.messages());
    th
}

#[test]
fn excluded_middle_applies() {
    let th = parse_clean(
        "(statement p)\n\
         (lemma goal (or p (not p)) (excluded_middle (list p) (list)))",
        "em.lth",
    );
    assert!(th.verify());
}

#[test]
fn excluded_middle_rejects_non_statement() {
    // a |-> q with q : person is a type error at application time
    let rules = load_rules();
    let person = Node::new(Expr::builtin(BuiltinType::Type), "person").unwrap();
    let q = Node::new(Expr::atom(person), "q").unwrap();
    let err = ProofStep::new(&rules, "excluded_middle", vec![Expr::atom(q)], vec![])
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
}

#[test]
fn double_negation_forward() {
    let th = parse_clean(
        "(statement p)\n\
         (axiom p_holds p)\n\
         (lemma goal (not (not p)) (double_negation (list p) (list p_holds)))",
        "dn.lth",
    );
    assert!(th.verify());
}

#[test]
fn double_negation_backward() {
    // the rule applies in either direction
    let th = parse_clean(
        "(statement p)\n\
         (axiom nn_holds (not (not p)))\n\
         (lemma goal p (double_negation (list p) (list nn_holds)))",
        "dn2.lth",
    );
    assert!(th.verify());
}

#[test]
fn modus_ponens_applies() {
    let th = parse_clean(
        "(statement p)\n\
         (statement q)\n\
         (axiom p_holds p)\n\
         (axiom p_implies_q (impl p q))\n\
         (lemma goal q (ponens (list p q) (list p_implies_q p_holds)))",
        "mp.lth",
    );
    assert!(th.verify());
}

#[test]
fn modus_ponens_permuted_references_fail() {
    let th = parse_clean(
        "(statement p)\n\
         (statement q)\n\
         (axiom p_holds p)\n\
         (axiom p_implies_q (impl p q))\n\
         (lemma goal q (ponens (list p q) (list p_holds p_implies_q)))",
        "mp2.lth",
    );
    assert!(!th.verify());
}

#[test]
fn fritz_verifies() {
    let th = parse_clean(FRITZ, "fritz.lth");
    assert!(th.verify());
}

#[test]
fn fritz_with_sub_theory_proof() {
    // the same argument carried out inside a (proof ...) sub-theory, with
    // position-relative references only
    let src = "\
(type person)
((lambda-type statement (list person)) schüler?)
((lambda-type statement (list person)) dumm?)
(person fritz)
(axiom (schüler? fritz))
(axiom (forall (lambda (list (person x)) (impl (schüler? x) (dumm? x)))))
(lemma (dumm? fritz)
	(proof
		(lemma (impl (schüler? fritz) (dumm? fritz))
			(specialization
				(list person (lambda (list (person x)) (impl (schüler? x) (dumm? x))) fritz)
				(list parent~1)))
		(lemma (dumm? fritz)
			(ponens (list (schüler? fritz) (dumm? fritz)) (list this~1 parent~2)))))
";
    let th = parse_clean(src, "fritz_long.lth");
    assert!(th.verify());
}

#[test]
fn fritz_round_trips_through_the_writer() {
    let th = parse_clean(FRITZ, "fritz.lth");
    assert!(th.verify());

    let mut w = Writer::with_config(80, 4, true);
    w.write_theory(&th);
    let written = w.finish();

    let th2 = parse_clean(&written, "fritz_rewritten.lth");
    assert_eq!(th2.len(), th.len());
    assert!(th2.verify());
}

#[test]
fn sub_theory_proof_round_trips() {
    let src = "\
(type person)
((lambda-type statement (list person)) p?)
(person it)
(axiom (p? it))
(axiom (forall (lambda (list (person x)) (impl (p? x) (p? x)))))
(lemma (p? it)
	(proof
		(lemma (impl (p? it) (p? it))
			(specialization
				(list person (lambda (list (person x)) (impl (p? x) (p? x))) it)
				(list parent~1)))
		(lemma (p? it)
			(ponens (list (p? it) (p? it)) (list this~1 parent~2)))))
";
    let th = parse_clean(src, "sub.lth");
    assert!(th.verify());

    let mut w = Writer::with_config(100, 2, false);
    w.write_theory(&th);
    let written = w.finish();

    // anonymous statements come back as this~k / parent~k descriptors
    assert!(written.contains("parent~1"), "written:\n{}", written);
    assert!(written.contains("this~1"), "written:\n{}", written);

    let th2 = parse_clean(&written, "sub_rewritten.lth");
    assert!(th2.verify());
}

#[test]
fn malformed_lemma_reports_one_error_and_continues() {
    let src = "(statement p)\n\
               (lemma good (or p (not p)) (excluded_middle (list p) (list)))\n\
               (lemma bad (or p (not p)) (no_such_rule (list p) (list)))\n\
               (statement q)";
    let (th, p) = parse_with_rules(src, "broken.lth");
    assert_eq!(p.errors(), 1, "messages: {:?}", p.messages());
    assert!(th.get("q").is_some());
    assert!(th.verify());
    assert!(p.summary().contains("1 errors"));
}

#[test]
fn axioms_hold_regardless_of_content() {
    let th = parse_clean(
        "(statement p)\n\
         (axiom strange (and p (not p)))",
        "ax.lth",
    );
    assert!(th.verify());
}
