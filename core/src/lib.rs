//! # Theoria core library.
//!
//! This library contains the proof-checking kernel for a small,
//! statically-typed, S-expression based theory language: the expression
//! model and its typing rules, theories with their named and positional
//! references, the substitution engine that drives rule application, and
//! the verifier that walks a theory and checks every lemma's proof.
//!
//! It also contains the textual surface (in `syntax`): a lexer, a
//! recovering parser, and a line-wrapping writer for the same grammar.

#![deny(unsafe_code)]

pub mod error;
mod fnv;
pub mod kernel;
pub mod syntax;

pub use fnv::{new_set, new_table, FnvHashMap, FnvHashSet};

pub use error::{Error, ErrorKind, Result};
pub use kernel::{
    BuiltinType, Connective, Context, Expr, ExprView, LongProof, Node, Proof, ProofStep,
    Quantifier, Reference, Rule, RuleKind, Substitution, Symbol, Theory, Type, TypeComparator,
    Visitor,
};
pub use syntax::{Lexer, Parser, Position, Writer};

pub(crate) mod macros {
    #[allow(unused_macros)]
    #[macro_export]
    macro_rules! ignore{
        () => { () };
        ($t :expr) => {{
            #[allow(unused_value)]
            let _ = $t;
        } };
        ($t0: expr, $($t:expr),*) => {{
            #[allow(unused_value)]
            let _ = $t0;
            crate::ignore!($($t),*)
        }}
    }

    #[macro_export]
    macro_rules! logtrace{
        ($($t:expr),*) => {{
            {
                #[cfg(feature="logging")]
                log::trace!($($t),*)
            }

            {
                #[cfg(not(feature="logging"))]
                crate::ignore!($($t),*)
            }
        }}
    }

    #[macro_export]
    macro_rules! logdebug{
        ($($t:expr),*) => {{
            {
                #[cfg(feature="logging")]
                log::debug!($($t),*)
            }

            {
                #[cfg(not(feature="logging"))]
                crate::ignore!($($t),*)
            }
        }}
    }

    #[macro_export]
    macro_rules! logerr{
        ($($t:expr),*) => {{
            {
                #[cfg(feature="logging")]
                log::error!($($t),*);
            }

            {
                #[cfg(not(feature="logging"))]
                crate::ignore!($($t),*);
            }
        }}
    }
}
