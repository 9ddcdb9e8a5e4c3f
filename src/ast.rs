//! # Query Expression Syntax Tree
//!
//! Data structures produced by the tokenizer and the expression builder.
//!
//! ## Overview
//!
//! - **[tokens]** - Lexical tokens (value runs and single-character symbols)
//! - **[clause]** - The slot-filling clause builder and the finished [`Expr`] tree
//! - **[operators]** - Comparison operators and the `and`/`or` connectives
//! - **[keys]** - Column lists for `GROUP BY` and `ORDER BY`
//!
//! ## Expression Grammar
//!
//! ```text
//! expression := condition (("and" | "or") condition)*
//! condition  := "(" expression ")" | column operator literal
//! operator   := = | == | != | <> | > | < | >= | <=
//! ```
//!
//! `and` and `or` share a single binding rank. A chain such as
//!
//! ```text
//! a=1 or b=2 and c=3
//! ```
//!
//! groups left to right as `((a=1 or b=2) and c=3)`; parentheses are the only
//! way to group differently.
pub mod clause;
pub mod keys;
pub mod operators;
pub mod tokens;

pub use clause::{ClauseBuilder, Expr, Operand};
pub use keys::{Direction, GroupKey, OrderKey};
pub use operators::{CompareOp, Connective};
pub use tokens::Token;
