//! # Parsing theories.
//!
//! A recursive-descent parser over the lexer's token stream. Errors are
//! reported with positions and counted, never thrown: unknown
//! identifiers are replaced by an `undefined` sentinel node, structural
//! errors skip ahead to the next closing parenthesis, and parsing
//! continues with the following object.

use super::{
    lexer::{Lexer, Tok},
    Position,
};
use crate::kernel::{
    BuiltinType, Connective, Expr, Exprs, LongProof, Node, Proof, ProofStep, Quantifier,
    Reference, Rule, Theory,
};
use crate::logdebug;
use std::fmt;

/// Severity of a reported problem.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Level {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::Error => write!(out, "error"),
            Level::Warning => write!(out, "warning"),
            Level::Note => write!(out, "note"),
        }
    }
}

/// Collects problems with positions; the CLI prints them.
struct Reporter {
    descriptor: String,
    messages: Vec<String>,
    errors: usize,
    warnings: usize,
}

impl Reporter {
    fn new(descriptor: String) -> Self {
        Reporter {
            descriptor,
            messages: Vec::new(),
            errors: 0,
            warnings: 0,
        }
    }

    fn report(&mut self, level: Level, pos: Position, msg: String) {
        match level {
            Level::Error => self.errors += 1,
            Level::Warning => self.warnings += 1,
            Level::Note => {}
        }
        self.messages
            .push(format!("{}:{}: {}: {}", self.descriptor, pos, level, msg));
    }
}

/// Parser for the theory grammar.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    report: Reporter,
    /// Rules theory for resolving proof steps.
    rules: Option<Theory>,
    /// Enclosing theories with their insertion cursors.
    theories: Vec<(Theory, Option<usize>)>,
    // dummies used in the case of errors
    undefined_node: Node,
    undefined_expr: Expr,
}

fn tok_name(t: Tok) -> &'static str {
    match t {
        Tok::Word(_) => "word",
        Tok::LParen => "opening parenthesis",
        Tok::RParen => "closing parenthesis",
        Tok::Eof => "end of file",
    }
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, descriptor: impl Into<String>) -> Self {
        let undefined_node = Node::new(Expr::builtin(BuiltinType::Undefined), "")
            .expect("undefined is a type");
        let undefined_expr = Expr::atom(undefined_node.clone());
        Parser {
            lexer: Lexer::new(src),
            report: Reporter::new(descriptor.into()),
            rules: None,
            theories: Vec::new(),
            undefined_node,
            undefined_expr,
        }
    }

    /// Inject the theory against which proof steps resolve their rules.
    pub fn set_rules(&mut self, rules: Theory) {
        self.rules = Some(rules);
    }

    pub fn errors(&self) -> usize {
        self.report.errors
    }

    pub fn warnings(&self) -> usize {
        self.report.warnings
    }

    pub fn messages(&self) -> &[String] {
        &self.report.messages
    }

    /// The `<descriptor>: N errors, M warnings` trailer.
    pub fn summary(&self) -> String {
        format!(
            "*** {}: {} errors, {} warnings.",
            self.report.descriptor, self.report.errors, self.report.warnings
        )
    }

    // ---- token plumbing ----

    fn cur(&mut self) -> Tok<'a> {
        self.lexer.cur()
    }

    fn advance(&mut self) {
        self.lexer.next();
    }

    fn error(&mut self, msg: String) {
        let pos = self.lexer.cur_pos();
        self.report.report(Level::Error, pos, msg);
    }

    fn warning(&mut self, msg: String) {
        let pos = self.lexer.cur_pos();
        self.report.report(Level::Warning, pos, msg);
    }

    fn note(&mut self, msg: String) {
        let pos = self.lexer.cur_pos();
        self.report.report(Level::Note, pos, msg);
    }

    /// Check the current token's type, reporting an error otherwise.
    fn expect(&mut self, want: Tok) -> bool {
        let got = self.cur();
        if std::mem::discriminant(&got) == std::mem::discriminant(&want) {
            true
        } else {
            self.error(format!(
                "expected {}, but read {}",
                tok_name(want),
                tok_name(got)
            ));
            false
        }
    }

    /// Skip everything until the next `)`, leaving it as current token.
    fn recover(&mut self) {
        loop {
            match self.cur() {
                Tok::RParen | Tok::Eof => break,
                _ => self.advance(),
            }
        }
        self.note("ignored everything until ')'".to_string());
    }

    // ---- theory stack ----

    fn cur_theory(&self) -> Theory {
        self.theories.last().expect("no enclosing theory").0.clone()
    }

    fn cursor(&self) -> Option<usize> {
        self.theories.last().expect("no enclosing theory").1
    }

    /// Add a node to the top theory at the cursor, advancing the cursor.
    fn add_node(&mut self, node: Node) -> Option<usize> {
        let (th, cursor) = self.theories.last().expect("no enclosing theory").clone();
        match th.add(node, cursor) {
            Ok(pos) => {
                self.theories.last_mut().unwrap().1 = Some(pos);
                Some(pos)
            }
            Err(e) => {
                self.error(e.to_string());
                None
            }
        }
    }

    /// Resolve the identifier or fall back to the `undefined` sentinel.
    fn get_node(&mut self, name: &str) -> Node {
        let found = self.cur_theory().get(name);
        match found {
            Some(r) => r.node(),
            None => {
                self.error(format!("undeclared identifier {}", name));
                self.undefined_node.clone()
            }
        }
    }

    // ---- grammar ----

    /// Parse a whole source file as one root theory.
    pub fn parse_theory(&mut self) -> Theory {
        let th = Theory::new();
        self.theories.push((th.clone(), None));
        loop {
            match self.cur() {
                Tok::Eof => break,
                _ => self.parse_node(),
            }
        }
        self.theories.pop();
        logdebug!("parsed theory with {} objects", th.len());
        th
    }

    /// Parse the nodes of a nested theory fragment until `)`.
    ///
    /// `standalone` fragments (rule parameter lists) do not see the
    /// enclosing theory's names.
    fn parse_theory_fragment(&mut self, standalone: bool) -> Theory {
        let th = if standalone || self.theories.is_empty() {
            Theory::new()
        } else {
            Theory::new_under(&self.cur_theory(), self.cursor().unwrap_or(0))
        };
        self.theories.push((th.clone(), None));
        loop {
            match self.cur() {
                Tok::RParen | Tok::Eof => break,
                _ => self.parse_node(),
            }
        }
        self.theories.pop();
        th
    }

    /// Parse one object and add it to the top theory.
    fn parse_node(&mut self) {
        if !self.expect(Tok::LParen) {
            // make progress even on stray tokens
            self.advance();
            return;
        }
        self.advance();

        match self.cur() {
            Tok::Word("axiom") => self.parse_statement(false),
            Tok::Word("lemma") => self.parse_statement(true),
            Tok::Word("tautology") => self.parse_tautology(),
            Tok::Word("equivrule") => self.parse_equivalence_rule(),
            Tok::Word("deductionrule") => self.parse_deduction_rule(),
            _ => self.parse_declaration(),
        }

        if self.expect(Tok::RParen) {
            self.advance();
        } else {
            self.recover();
            if self.cur() == Tok::RParen {
                self.advance();
            }
        }
    }

    /// `( type identifier [expression] )`
    fn parse_declaration(&mut self) {
        let ty = self.parse_type();

        let name = match self.cur() {
            Tok::Word(w) => {
                self.advance();
                w
            }
            _ => {
                self.expect(Tok::Word(""));
                return;
            }
        };

        let node = match Node::new(ty, name) {
            Ok(n) => n,
            Err(e) => {
                self.error(e.to_string());
                return;
            }
        };

        if self.cur() != Tok::RParen {
            let def = self.parse_expression();
            if def != self.undefined_expr {
                if let Err(e) = node.set_definition(def) {
                    self.error(e.to_string());
                }
            }
        }

        self.add_node(node);
    }

    /// A type expression: `type`, `statement`, a declared type name, or a
    /// lambda type.
    fn parse_type(&mut self) -> Expr {
        match self.cur() {
            Tok::Word(w) => {
                self.advance();
                match w {
                    "type" => Expr::builtin(BuiltinType::Type),
                    "statement" => Expr::builtin(BuiltinType::Statement),
                    _ => Expr::atom(self.get_node(w)),
                }
            }
            Tok::LParen => self.parse_lambda_type(),
            _ => {
                self.error("expected beginning of type expression".to_string());
                Expr::builtin(BuiltinType::Undefined)
            }
        }
    }

    /// `( lambda-type type ( list type* ) )`
    fn parse_lambda_type(&mut self) -> Expr {
        self.advance(); // past '('
        match self.cur() {
            Tok::Word("lambda-type") => self.advance(),
            _ => self.error("expected 'lambda-type'".to_string()),
        }

        let ret = self.parse_type();

        let mut args = Exprs::new();
        if self.expect(Tok::LParen) {
            self.advance();
            if self.cur() == Tok::Word("list") {
                self.advance();
            } else {
                // tolerated: read the arguments as if 'list' were there
                self.warning("missing 'list' keyword in argument list".to_string());
            }
            loop {
                match self.cur() {
                    Tok::RParen | Tok::Eof => break,
                    _ => args.push(self.parse_type()),
                }
            }
            self.advance(); // skip ')'
        } else {
            self.recover();
        }

        if self.expect(Tok::RParen) {
            self.advance();
        }

        match Expr::lambda_type(args, ret) {
            Ok(e) => e,
            Err(e) => {
                self.error(e.to_string());
                Expr::builtin(BuiltinType::Undefined)
            }
        }
    }

    /// Dispatcher for expressions.
    fn parse_expression(&mut self) -> Expr {
        match self.cur() {
            Tok::LParen => {
                self.advance();
                match self.cur() {
                    Tok::Word(w) => match w {
                        "not" => self.parse_negation(),
                        "and" | "or" | "impl" | "equiv" => self.parse_connective(w),
                        "forall" | "exists" => self.parse_quantifier(w),
                        "lambda" => self.parse_lambda(),
                        _ => self.parse_call(w),
                    },
                    _ => {
                        self.expect(Tok::Word(""));
                        self.recover();
                        self.undefined_expr.clone()
                    }
                }
            }
            Tok::Word(w) => {
                self.advance();
                Expr::atom(self.get_node(w))
            }
            _ => {
                self.error("expected beginning of expression".to_string());
                self.undefined_expr.clone()
            }
        }
    }

    /// `( identifier expression* )`, a lambda call.
    fn parse_call(&mut self, head: &str) -> Expr {
        let f = self.get_node(head);
        self.advance();

        let mut args = Exprs::new();
        loop {
            match self.cur() {
                Tok::RParen | Tok::Eof => break,
                _ => args.push(self.parse_expression()),
            }
        }
        self.advance(); // skip ')'

        if f == self.undefined_node || args.iter().any(|a| *a == self.undefined_expr) {
            // the cause is already reported
            return self.undefined_expr.clone();
        }
        match Expr::call(f, args) {
            Ok(e) => e,
            Err(e) => {
                self.error(e.to_string());
                self.undefined_expr.clone()
            }
        }
    }

    /// `( not expression )`
    fn parse_negation(&mut self) -> Expr {
        self.advance(); // past 'not'
        let inner = self.parse_expression();

        if self.expect(Tok::RParen) {
            self.advance();
        } else {
            self.recover();
        }

        if inner == self.undefined_expr {
            return inner;
        }
        match Expr::not(inner) {
            Ok(e) => e,
            Err(e) => {
                self.error(e.to_string());
                self.undefined_expr.clone()
            }
        }
    }

    /// `( and|or|impl|equiv expression expression )`
    fn parse_connective(&mut self, head: &str) -> Expr {
        let variant = match head {
            "and" => Connective::And,
            "or" => Connective::Or,
            "impl" => Connective::Impl,
            _ => Connective::Equiv,
        };
        self.advance();

        let lhs = self.parse_expression();
        let rhs = self.parse_expression();

        if self.expect(Tok::RParen) {
            self.advance();
        } else {
            self.recover();
        }

        if lhs == self.undefined_expr || rhs == self.undefined_expr {
            return self.undefined_expr.clone();
        }
        match Expr::connective(variant, lhs, rhs) {
            Ok(e) => e,
            Err(e) => {
                self.error(e.to_string());
                self.undefined_expr.clone()
            }
        }
    }

    /// `( forall|exists expression )`
    fn parse_quantifier(&mut self, head: &str) -> Expr {
        let variant = if head == "forall" {
            Quantifier::Forall
        } else {
            Quantifier::Exists
        };
        self.advance();

        let pred = self.parse_expression();

        if self.expect(Tok::RParen) {
            self.advance();
        } else {
            self.recover();
        }

        if pred == self.undefined_expr {
            return pred;
        }
        match Expr::quantifier(variant, pred) {
            Ok(e) => e,
            Err(e) => {
                self.error(e.to_string());
                self.undefined_expr.clone()
            }
        }
    }

    /// `( lambda ( list declaration* ) expression )`
    fn parse_lambda(&mut self) -> Expr {
        self.advance(); // past 'lambda'

        if !self.expect(Tok::LParen) {
            return self.undefined_expr.clone();
        }
        self.advance();
        match self.cur() {
            Tok::Word("list") => self.advance(),
            _ => {
                self.error("expected 'list'".to_string());
                return self.undefined_expr.clone();
            }
        }

        let params = self.parse_theory_fragment(false);
        self.advance(); // skip ')'

        self.theories.push((params.clone(), None));
        let body = self.parse_expression();
        self.theories.pop();

        if self.expect(Tok::RParen) {
            self.advance();
        } else {
            self.recover();
        }

        Expr::lambda(params, body)
    }

    /// Parse `( list declaration* )` as a standalone parameter theory,
    /// for the rule forms. Returns `None` when the list shape is broken.
    fn parse_param_list(&mut self) -> Option<Theory> {
        if !self.expect(Tok::LParen) {
            return None;
        }
        self.advance();
        match self.cur() {
            Tok::Word("list") => self.advance(),
            _ => {
                self.error("expected 'list'".to_string());
                self.recover();
                return None;
            }
        }
        let params = self.parse_theory_fragment(true);
        self.advance(); // skip ')'
        Some(params)
    }

    /// `( tautology identifier var-list expression )`
    fn parse_tautology(&mut self) {
        self.advance(); // past 'tautology'

        let name = match self.cur() {
            Tok::Word(w) => {
                self.advance();
                w
            }
            _ => {
                self.expect(Tok::Word(""));
                self.recover();
                return;
            }
        };

        let params = match self.parse_param_list() {
            Some(p) => p,
            None => return,
        };

        self.theories.push((params.clone(), None));
        let statement = self.parse_expression();
        self.theories.pop();

        match Rule::tautology(params, statement) {
            Ok(r) => {
                self.add_node(Node::new_rule(name, r));
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    /// `( equivrule identifier var-list expression expression )`
    fn parse_equivalence_rule(&mut self) {
        self.advance(); // past 'equivrule'

        let name = match self.cur() {
            Tok::Word(w) => {
                self.advance();
                w
            }
            _ => {
                self.expect(Tok::Word(""));
                self.recover();
                return;
            }
        };

        let params = match self.parse_param_list() {
            Some(p) => p,
            None => return,
        };

        self.theories.push((params.clone(), None));
        let left = self.parse_expression();
        let right = self.parse_expression();
        self.theories.pop();

        match Rule::equivalence(params, left, right) {
            Ok(r) => {
                self.add_node(Node::new_rule(name, r));
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    /// `( deductionrule identifier var-list ( list expression* ) expression )`
    fn parse_deduction_rule(&mut self) {
        self.advance(); // past 'deductionrule'

        let name = match self.cur() {
            Tok::Word(w) => {
                self.advance();
                w
            }
            _ => {
                self.expect(Tok::Word(""));
                self.recover();
                return;
            }
        };

        let params = match self.parse_param_list() {
            Some(p) => p,
            None => return,
        };

        self.theories.push((params.clone(), None));

        let mut premises = Vec::new();
        if self.expect(Tok::LParen) {
            self.advance();
            if self.cur() == Tok::Word("list") {
                self.advance();
                loop {
                    match self.cur() {
                        Tok::RParen | Tok::Eof => break,
                        _ => premises.push(self.parse_expression()),
                    }
                }
                self.advance(); // skip ')'
            } else {
                self.error("expected 'list'".to_string());
                self.recover();
            }
        }

        let conclusion = self.parse_expression();
        self.theories.pop();

        match Rule::deduction(params, premises, conclusion) {
            Ok(r) => {
                self.add_node(Node::new_rule(name, r));
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    /// `( axiom [identifier] expression )` or
    /// `( lemma [identifier] expression proof )`
    fn parse_statement(&mut self, is_lemma: bool) {
        self.advance(); // past 'axiom' / 'lemma'

        let name = match self.cur() {
            Tok::Word(w) => {
                self.advance();
                w
            }
            _ => "",
        };

        let expr = self.parse_expression();
        let stmt = match Node::new_statement(name, expr.clone()) {
            Ok(s) => Some(s),
            Err(e) => {
                if expr != self.undefined_expr {
                    self.error(e.to_string());
                }
                None
            }
        };

        if let Some(s) = &stmt {
            self.add_node(s.clone());
        }

        if is_lemma {
            let proof = self.parse_proof();
            if let (Some(s), Some(p)) = (stmt, proof) {
                if let Err(e) = s.attach_proof(p) {
                    self.error(e.to_string());
                }
            }
        }
    }

    /// A proof: either a single rule application or `( proof theory )`.
    fn parse_proof(&mut self) -> Option<Proof> {
        if !self.expect(Tok::LParen) {
            return None;
        }
        self.advance();

        if self.cur() == Tok::Word("proof") {
            self.advance();
            let at = self.cursor().unwrap_or(0);
            let long = LongProof::new(&self.cur_theory(), at);

            self.theories.push((long.theory().clone(), None));
            loop {
                match self.cur() {
                    Tok::RParen | Tok::Eof => break,
                    _ => self.parse_node(),
                }
            }
            self.theories.pop();

            if self.expect(Tok::RParen) {
                self.advance();
            } else {
                self.recover();
            }
            return Some(Proof::Long(long));
        }

        let rule_name = match self.cur() {
            Tok::Word(w) => {
                self.advance();
                w
            }
            _ => {
                self.expect(Tok::Word(""));
                return None;
            }
        };

        // substitute expressions for the rule's parameters
        let mut args = Vec::new();
        if self.expect(Tok::LParen) {
            self.advance();
            if self.cur() == Tok::Word("list") {
                self.advance();
                loop {
                    match self.cur() {
                        Tok::RParen | Tok::Eof => break,
                        _ => args.push(self.parse_expression()),
                    }
                }
                self.advance(); // skip ')'
            } else {
                self.error("expected 'list'".to_string());
                self.recover();
            }
        }

        // referenced statements
        let mut refs = Vec::new();
        if self.expect(Tok::LParen) {
            self.advance();
            if self.cur() == Tok::Word("list") {
                self.advance();
                loop {
                    match self.cur() {
                        Tok::RParen | Tok::Eof => break,
                        _ => {
                            if let Some(r) = self.parse_reference() {
                                refs.push(r);
                            }
                        }
                    }
                }
                self.advance(); // skip ')'
            } else {
                self.error("expected 'list'".to_string());
                self.recover();
            }
        }

        if self.expect(Tok::RParen) {
            self.advance();
        } else {
            self.recover();
        }

        let rules = self.rules.clone();
        let rules = match rules {
            Some(r) => r,
            None => {
                self.error(format!(
                    "no rules theory loaded, cannot resolve {}",
                    rule_name
                ));
                return None;
            }
        };
        match ProofStep::new(&rules, rule_name, args, refs) {
            Ok(step) => Some(Proof::Step(step)),
            Err(e) => {
                self.error(e.to_string());
                None
            }
        }
    }

    /// One reference descriptor.
    fn parse_reference(&mut self) -> Option<Reference> {
        let word = match self.cur() {
            Tok::Word(w) => {
                self.advance();
                w
            }
            _ => {
                self.expect(Tok::Word(""));
                self.advance();
                return None;
            }
        };
        let pos = match self.cursor() {
            Some(p) => p,
            None => {
                self.error(format!("reference {} before any statement", word));
                return None;
            }
        };
        match Reference::parse(word, &self.cur_theory(), pos) {
            Ok(r) => Some(r),
            Err(e) => {
                self.error(e.to_string());
                None
            }
        }
    }
}
