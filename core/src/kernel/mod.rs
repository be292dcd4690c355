//! The semantic core: expressions, nodes, theories, rules and proofs.

pub type Ref<T> = std::rc::Rc<T>;
pub type WeakRef<T> = std::rc::Weak<T>;

pub use crate::error::{Error, Result};

pub mod expr;
pub mod node;
pub mod proof;
pub mod rule;
pub mod subst;
pub mod symbol;
pub mod theory;
pub mod typecheck;
pub mod visit;

pub use expr::{BuiltinType, Connective, Expr, ExprView, Exprs, Quantifier, Type};
pub use node::Node;
pub use proof::{LongProof, Proof, ProofStep};
pub use rule::{Rule, RuleKind};
pub use subst::Substitution;
pub use symbol::Symbol;
pub use theory::{Reference, Theory};
pub use typecheck::{Context, TypeComparator};
pub use visit::Visitor;
