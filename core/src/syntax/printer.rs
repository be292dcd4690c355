//! # Writing theories back out.
//!
//! The writer renders the same grammar the parser reads. Tokens are
//! buffered in a queue; once a whole top-level object is present (or the
//! buffer holds enough material), lines are emitted. A list is broken
//! onto separate lines only when its single-line rendering would exceed
//! the configured width, and a broken list puts its closing parenthesis
//! on a line of its own.

use crate::kernel::{Expr, Node, Proof, Reference, Rule, RuleKind, Theory, Visitor};
use crate::kernel::{BuiltinType, Connective, Quantifier};
use crate::logerr;
use std::collections::VecDeque;

#[derive(Clone, Debug)]
enum WTok {
    Word(String),
    Open,
    Close,
}

/// Line-wrapping writer for theories, nodes and expressions.
pub struct Writer {
    out: String,
    queue: VecDeque<WTok>,
    /// Parenthesis balance of the queued material.
    depth: i32,

    // pretty printing state
    max_line_length: i32,
    line_length: i32,
    tab_size: i32,
    tabs: bool,
    write_depth: i32,

    // where we are, for reference descriptors
    theory_stack: Vec<Theory>,
    cursor_stack: Vec<usize>,
}

impl Writer {
    /// A writer with the default configuration: width 80, tab indent.
    pub fn new() -> Self {
        Self::with_config(80, 4, true)
    }

    /// Configure column width, indentation size, and tabs vs. spaces.
    pub fn with_config(line_length: usize, tab_size: usize, tabs: bool) -> Self {
        Writer {
            out: String::new(),
            queue: VecDeque::new(),
            depth: 0,
            max_line_length: line_length as i32,
            line_length: 0,
            tab_size: tab_size as i32,
            tabs,
            write_depth: 0,
            theory_stack: Vec::new(),
            cursor_stack: Vec::new(),
        }
    }

    /// Flush and return the rendered text.
    pub fn finish(mut self) -> String {
        self.write_queue();
        debug_assert_eq!(self.depth, 0, "unbalanced parentheses in writer");
        self.out
    }

    // ---- rendering of the object forms ----

    /// Write every object of the theory in insertion order.
    pub fn write_theory(&mut self, theory: &Theory) {
        self.theory_stack.push(theory.clone());
        for (i, node) in theory.nodes().iter().enumerate() {
            self.cursor_stack.push(i);
            self.write_object(node);
            self.cursor_stack.pop();
        }
        self.theory_stack.pop();
    }

    /// Write one object: a statement, a rule, or a plain declaration.
    pub fn write_object(&mut self, node: &Node) {
        if node.is_statement() {
            self.write_statement(node);
        } else if let Some(rule) = node.rule() {
            self.write_rule(node.name(), rule);
        } else {
            self.write_declaration(node);
        }
    }

    /// `( type identifier [definition] )`
    fn write_declaration(&mut self, node: &Node) {
        self.add_paren(true);
        node.ty().accept(self);
        self.add_word(node.name());
        if let Some(def) = node.definition() {
            def.accept(self);
        }
        self.add_paren(false);
    }

    /// `( axiom|lemma [identifier] expression [proof] )`
    fn write_statement(&mut self, node: &Node) {
        let proof = node.proof();
        self.add_paren(true);
        self.add_word(if proof.is_some() { "lemma" } else { "axiom" });
        if !node.symbol().is_empty() {
            self.add_word(node.name());
        }
        if let Some(def) = node.definition() {
            def.accept(self);
        }
        if let Some(p) = proof {
            self.write_proof(&p);
        }
        self.add_paren(false);
    }

    fn write_var_list(&mut self, rule: &Rule) {
        self.add_paren(true);
        self.add_word("list");
        for n in rule.params().nodes() {
            self.write_declaration(&n);
        }
        self.add_paren(false);
    }

    fn write_rule(&mut self, name: &str, rule: &Rule) {
        self.add_paren(true);
        match rule.kind() {
            RuleKind::Tautology { statement } => {
                self.add_word("tautology");
                self.add_word(name);
                self.write_var_list(rule);
                statement.accept(self);
            }
            RuleKind::Equivalence { left, right } => {
                self.add_word("equivrule");
                self.add_word(name);
                self.write_var_list(rule);
                left.accept(self);
                right.accept(self);
            }
            RuleKind::Deduction {
                premises,
                conclusion,
            } => {
                self.add_word("deductionrule");
                self.add_word(name);
                self.write_var_list(rule);
                self.add_paren(true);
                self.add_word("list");
                for p in premises {
                    p.accept(self);
                }
                self.add_paren(false);
                conclusion.accept(self);
            }
        }
        self.add_paren(false);
    }

    fn write_proof(&mut self, proof: &Proof) {
        match proof {
            Proof::Step(step) => {
                self.add_paren(true);
                self.add_word(step.rule_node().name());
                self.add_paren(true);
                self.add_word("list");
                for a in step.args() {
                    a.accept(self);
                }
                self.add_paren(false);
                self.add_paren(true);
                self.add_word("list");
                for r in step.references() {
                    self.write_reference(r);
                }
                self.add_paren(false);
                self.add_paren(false);
            }
            Proof::Long(long) => {
                self.add_paren(true);
                self.add_word("proof");
                self.write_theory(long.theory());
                self.add_paren(false);
            }
        }
    }

    fn write_reference(&mut self, r: &Reference) {
        let desc = match (self.theory_stack.last(), self.cursor_stack.last()) {
            (Some(th), Some(&pos)) => r.describe(th, pos),
            _ => Err(crate::error::Error::new("reference outside a theory")),
        };
        match desc {
            Ok(d) => self.add_word(&d),
            Err(e) => {
                logerr!("cannot describe reference: {}", e);
                self.add_word("?");
            }
        }
    }

    // ---- the token queue ----

    fn add_word(&mut self, w: &str) {
        self.push_tok(WTok::Word(w.to_string()));
    }

    fn add_paren(&mut self, opening: bool) {
        self.depth += if opening { 1 } else { -1 };
        self.push_tok(if opening { WTok::Open } else { WTok::Close });

        // at level 0, or with enough material, write something
        if self.depth == 0 || self.line_length > 2 * self.max_line_length {
            self.write_queue();
        }
    }

    fn push_tok(&mut self, t: WTok) {
        self.queue.push_back(t);
        // Account for the length of the preceding token: the last one in
        // the queue cannot be measured yet, its spacing depends on what
        // follows it.
        if self.queue.len() >= 2 {
            self.line_length += self.token_length(self.queue.len() - 2);
        }
    }

    /// Length of a queued token, including the space after it.
    fn token_length(&self, index: usize) -> i32 {
        let mut length = match &self.queue[index] {
            WTok::Word(w) => w.chars().count() as i32,
            WTok::Open | WTok::Close => 1,
        };
        // no space after '(' and none before ')'
        if !matches!(self.queue[index], WTok::Open)
            && index + 1 < self.queue.len()
            && !matches!(self.queue[index + 1], WTok::Close)
        {
            length += 1;
        }
        length
    }

    /// Emit lines while the queue holds a whole object or too much
    /// material to keep buffering.
    fn write_queue(&mut self) {
        while (self.depth == 0 && !self.queue.is_empty())
            || (self.depth != 0 && self.line_length > self.max_line_length)
        {
            match self.queue[0] {
                WTok::Open => {
                    // count characters up to the matching ')'
                    let mut length = self.tab_size * self.write_depth;
                    let mut cur_depth = 1i32;
                    let mut index = 1usize;
                    while cur_depth != 0
                        && length <= self.max_line_length
                        && index < self.queue.len()
                    {
                        match self.queue[index] {
                            WTok::Open => cur_depth += 1,
                            WTok::Close => cur_depth -= 1,
                            WTok::Word(_) => {}
                        }
                        length += self.token_length(index);
                        index += 1;
                    }
                    if cur_depth != 0 && length <= self.max_line_length {
                        // undecidable yet, wait for more tokens
                        break;
                    }

                    if length <= self.max_line_length {
                        // the whole list fits on one line
                        self.write_line(index);
                    } else {
                        let n = if matches!(self.queue.get(1), Some(WTok::Open)) {
                            1
                        } else {
                            2
                        };
                        self.write_line(n);
                        // the closing parenthesis gets its own line, so it
                        // no longer counts into the pending length
                        self.line_length -= 1;
                        self.write_depth += 1;
                    }
                }
                WTok::Close => {
                    self.line_length += 1; // compensate the above
                    self.write_depth -= 1;
                    self.write_line(1);
                }
                WTok::Word(_) => self.write_line(1),
            }
        }
    }

    /// Write one indented line using the first `num_tokens` queued tokens.
    fn write_line(&mut self, mut num_tokens: usize) {
        if self.tabs {
            for _ in 0..self.write_depth {
                self.out.push('\t');
            }
        } else {
            for _ in 0..(self.tab_size * self.write_depth) {
                self.out.push(' ');
            }
        }

        while num_tokens > 0 {
            num_tokens -= 1;
            let token = self.queue.front().expect("queue underrun").clone();

            match &token {
                WTok::Word(w) => self.out.push_str(w),
                WTok::Open => self.out.push('('),
                WTok::Close => self.out.push(')'),
            }
            // the last token in the queue was never counted, see push_tok
            if self.queue.len() > 1 {
                self.line_length -= self.token_length(0);
            }
            self.queue.pop_front();

            // space after a token unless it is '(' or precedes ')', and
            // never at the end of a line
            if !matches!(token, WTok::Open)
                && !self.queue.is_empty()
                && !matches!(self.queue.front(), Some(WTok::Close))
                && num_tokens > 1
            {
                self.out.push(' ');
            }
        }

        self.out.push('\n');
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for Writer {
    fn visit_builtin(&mut self, b: BuiltinType) {
        self.add_word(b.name());
    }

    fn visit_atom(&mut self, node: &Node) {
        self.add_word(node.name());
    }

    fn visit_call(&mut self, f: &Node, args: &[Expr]) {
        self.add_paren(true);
        self.add_word(f.name());
        for a in args {
            a.accept(self);
        }
        self.add_paren(false);
    }

    fn visit_not(&mut self, inner: &Expr) {
        self.add_paren(true);
        self.add_word("not");
        inner.accept(self);
        self.add_paren(false);
    }

    fn visit_connective(&mut self, v: Connective, lhs: &Expr, rhs: &Expr) {
        self.add_paren(true);
        self.add_word(v.name());
        lhs.accept(self);
        rhs.accept(self);
        self.add_paren(false);
    }

    fn visit_quantifier(&mut self, v: Quantifier, pred: &Expr) {
        self.add_paren(true);
        self.add_word(v.name());
        pred.accept(self);
        self.add_paren(false);
    }

    fn visit_lambda(&mut self, params: &Theory, body: &Expr) {
        self.add_paren(true);
        self.add_word("lambda");
        self.add_paren(true);
        self.add_word("list");
        for n in params.nodes() {
            self.write_declaration(&n);
        }
        self.add_paren(false);
        body.accept(self);
        self.add_paren(false);
    }

    fn visit_lambda_type(&mut self, args: &[Expr], ret: &Expr) {
        self.add_paren(true);
        self.add_word("lambda-type");
        ret.accept(self);
        self.add_paren(true);
        self.add_word("list");
        for a in args {
            a.accept(self);
        }
        self.add_paren(false);
        self.add_paren(false);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::syntax::parser::Parser;

    fn rewrite(src: &str) -> String {
        let mut p = Parser::new(src, "test.lth");
        let th = p.parse_theory();
        assert_eq!(p.errors(), 0, "parse errors: {:?}", p.messages());
        let mut w = Writer::new();
        w.write_theory(&th);
        w.finish()
    }

    #[test]
    fn test_declarations_roundtrip_text() {
        let out = rewrite(
            "(type person)\n\
             ((lambda-type statement (list person)) schüler?)\n\
             (person fritz)\n\
             (axiom (schüler? fritz))",
        );
        assert_eq!(
            out,
            "(type person)\n\
             ((lambda-type statement (list person)) schüler?)\n\
             (person fritz)\n\
             (axiom (schüler? fritz))\n"
        );
    }

    #[test]
    fn test_rule_rendering() {
        let out = rewrite(
            "(tautology excluded_middle (list (statement a)) (or a (not a)))",
        );
        assert_eq!(
            out,
            "(tautology excluded_middle (list (statement a)) (or a (not a)))\n"
        );

        let out = rewrite(
            "(equivrule double_negation (list (statement a)) (not (not a)) a)",
        );
        assert_eq!(
            out,
            "(equivrule double_negation (list (statement a)) (not (not a)) a)\n"
        );

        let out = rewrite(
            "(deductionrule ponens (list (statement a) (statement b)) (list (impl a b) a) b)",
        );
        assert_eq!(
            out,
            "(deductionrule ponens (list (statement a) (statement b)) (list (impl a b) a) b)\n"
        );
    }

    #[test]
    fn test_wrapping_narrow() {
        let src = "(statement a)(statement b)(axiom (and a (not b)))";
        let mut p = Parser::new(src, "test.lth");
        let th = p.parse_theory();
        assert_eq!(p.errors(), 0);

        let mut w = Writer::with_config(10, 4, false);
        w.write_theory(&th);
        let out = w.finish();
        let expected = "\
(statement\n\
    a\n\
)\n\
(statement\n\
    b\n\
)\n\
(axiom\n\
    (and\n\
        a\n\
        (not\n\
            b\n\
        )\n\
    )\n\
)\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_wrapped_output_reparses() {
        let src = "(type person)\
            ((lambda-type statement (list person)) p?)\
            (person x)\
            (axiom long_one (forall (lambda (list (person y)) (impl (p? y) (p? x)))))";
        let mut p = Parser::new(src, "test.lth");
        let th = p.parse_theory();
        assert_eq!(p.errors(), 0);

        let mut w = Writer::with_config(24, 2, false);
        w.write_theory(&th);
        let narrow = w.finish();
        // every line respects the ragged wrap, and the text still parses
        let mut p2 = Parser::new(&narrow, "narrow.lth");
        let th2 = p2.parse_theory();
        assert_eq!(p2.errors(), 0, "messages: {:?}", p2.messages());
        assert_eq!(th2.len(), th.len());
    }
}
