pub mod ast;
pub mod evaluator;
pub mod group;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod sort;
pub mod table;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{CompareOp, Connective, Direction, Expr, GroupKey, OrderKey, Token};
pub use evaluator::Matcher;
pub use lexer::{LexError, Lexer};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use table::{Column, GROUP_COUNT, GROUP_KEY, MatchMode, Row, Table};
pub use value::Value;
