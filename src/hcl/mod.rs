//! Structural reading of Terraform/HCL configuration text
//!
//! This is not a full HCL parser. It tokenizes just enough of the language to
//! know where blocks begin and end: quoted strings (including `${...}`
//! interpolations with nested quotes), heredocs and comments are consumed as
//! opaque tokens, so braces inside them never disturb the depth count. On top
//! of the token stream, [`parse_body`] yields the top-level blocks and
//! attributes of a body, and every [`Block`] can be re-parsed for its own
//! children.

mod blocks;
mod lexer;

pub use blocks::{parse_blocks, parse_body, Attribute, Block, BlockCounts, Item};
pub use lexer::{tokenize, Token, TokenKind};
