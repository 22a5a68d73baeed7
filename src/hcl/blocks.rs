use super::lexer::{tokenize, Token, TokenKind};
use std::collections::BTreeMap;

/// A block such as `module "s3" { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block type, e.g. `module`, `resource`, `terraform`
    pub kind: String,
    pub labels: Vec<String>,
    /// Exact text between the braces
    pub body: String,
    /// False when the input ended before the matching `}`
    pub closed: bool,
}

impl Block {
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Top-level items of this block's body
    pub fn items(&self) -> Vec<Item> {
        parse_body(&self.body)
    }

    /// Top-level attribute of this block's body (nested blocks are not searched)
    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        self.items().into_iter().find_map(|item| match item {
            Item::Attribute(attr) if attr.name == name => Some(attr),
            _ => None,
        })
    }
}

/// An attribute assignment such as `source = "./modules/s3"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Raw expression text after the `=`
    pub expr: String,
    /// Set when the expression is exactly one quoted string
    pub string_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Block(Block),
    Attribute(Attribute),
}

/// Parses the top-level items of an HCL body (a whole file or a block body).
///
/// Malformed statements are skipped up to the next newline at depth zero; a
/// block whose closing brace is missing swallows the rest of the input and is
/// reported with `closed == false`.
pub fn parse_body(src: &str) -> Vec<Item> {
    let tokens = tokenize(src);
    let mut items = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        if token.kind == TokenKind::Newline {
            i += 1;
            continue;
        }

        if token.kind == TokenKind::Ident {
            if let Some((block, next)) = read_block(src, &tokens, i) {
                items.push(Item::Block(block));
                i = next;
                continue;
            }
            if let Some((attr, next)) = read_attribute(src, &tokens, i) {
                items.push(Item::Attribute(attr));
                i = next;
                continue;
            }
        }

        i = statement_end(&tokens, i);
    }

    items
}

/// Top-level blocks only
pub fn parse_blocks(src: &str) -> Vec<Block> {
    parse_body(src)
        .into_iter()
        .filter_map(|item| match item {
            Item::Block(block) => Some(block),
            Item::Attribute(_) => None,
        })
        .collect()
}

fn read_block(src: &str, tokens: &[Token], start: usize) -> Option<(Block, usize)> {
    let mut labels = Vec::new();
    let mut j = start + 1;
    while let Some(token) = tokens.get(j) {
        match token.kind {
            TokenKind::Str => labels.push(token.string_value(src).unwrap_or_default()),
            TokenKind::Ident => labels.push(token.text(src).to_string()),
            _ => break,
        }
        j += 1;
    }

    let open = tokens.get(j).filter(|t| t.kind == TokenKind::OpenBrace)?;
    let (body, closed, next) = match matching_close(tokens, j) {
        Some(close) => (&src[open.end..tokens[close].start], true, close + 1),
        None => (&src[open.end..], false, tokens.len()),
    };

    Some((
        Block {
            kind: tokens[start].text(src).to_string(),
            labels,
            body: body.to_string(),
            closed,
        },
        next,
    ))
}

fn read_attribute(src: &str, tokens: &[Token], start: usize) -> Option<(Attribute, usize)> {
    tokens.get(start + 1).filter(|t| t.kind == TokenKind::Assign)?;
    let end = statement_end(tokens, start);

    let expr_tokens = &tokens[start + 2..end];
    let expr = match (expr_tokens.first(), expr_tokens.last()) {
        (Some(first), Some(last)) => src[first.start..last.end].to_string(),
        _ => String::new(),
    };
    let string_value = match expr_tokens {
        [only] => only.string_value(src),
        _ => None,
    };

    Some((
        Attribute {
            name: tokens[start].text(src).to_string(),
            expr,
            string_value,
        },
        end,
    ))
}

fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (k, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the newline ending the statement that starts at `start`, skipping
/// over newlines nested inside braces, brackets or parentheses. Returns
/// `tokens.len()` at end of input.
fn statement_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    for (k, token) in tokens.iter().enumerate().skip(start) {
        match token.kind {
            TokenKind::OpenBrace | TokenKind::OpenGroup => depth += 1,
            TokenKind::CloseBrace | TokenKind::CloseGroup => depth = depth.saturating_sub(1),
            TokenKind::Newline if depth == 0 && k > start => return k,
            _ => {}
        }
    }
    tokens.len()
}

/// Number of top-level blocks per block type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockCounts {
    counts: BTreeMap<String, usize>,
}

impl BlockCounts {
    pub fn of(src: &str) -> Self {
        let mut counts = BTreeMap::new();
        for block in parse_blocks(src) {
            *counts.entry(block.kind).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    pub fn has(&self, kind: &str) -> bool {
        self.count(kind) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = r#"
terraform {
  backend "s3" {
    bucket = "state"
  }
}

provider "aws" {
  region = var.region
}

module "s3" {
  source = "${path.module}/modules/s3/v1"
  buckets = [
    { name = "logs", encrypted = false },
    { name = "assets", tags = { team = "web" } },
  ]
}

module "kms" {
  source  = "./modules/kms"
  enabled = true
}

variable "region" {}
output "bucket_ids" { value = module.s3.ids }
"#;

    #[test]
    fn test_top_level_blocks() {
        let blocks = parse_blocks(ROOT);
        let kinds: Vec<&str> = blocks.iter().map(|b| b.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["terraform", "provider", "module", "module", "variable", "output"]
        );
        assert!(blocks.iter().all(|b| b.closed));
    }

    #[test]
    fn test_nested_braces_do_not_truncate_body() {
        let blocks = parse_blocks(ROOT);
        let s3 = blocks
            .iter()
            .find(|b| b.kind == "module" && b.label(0) == Some("s3"))
            .unwrap();
        assert!(s3.body.contains("assets"));
        assert!(s3.body.contains("team = \"web\""));
        assert_eq!(
            s3.attribute("source").and_then(|a| a.string_value).as_deref(),
            Some("${path.module}/modules/s3/v1")
        );
    }

    #[test]
    fn test_source_after_nested_block_is_found() {
        let src = r#"
module "net" {
  tags = {
    source = "decoy"
  }
  source = "./modules/net"
}
"#;
        let block = &parse_blocks(src)[0];
        assert_eq!(
            block.attribute("source").and_then(|a| a.string_value).as_deref(),
            Some("./modules/net")
        );
    }

    #[test]
    fn test_single_line_block_attribute() {
        let block = &parse_blocks(r#"module "a" { source = "./a" }"#)[0];
        assert_eq!(block.label(0), Some("a"));
        assert_eq!(
            block.attribute("source").and_then(|a| a.string_value).as_deref(),
            Some("./a")
        );
    }

    #[test]
    fn test_list_attribute_spans_lines() {
        let blocks = parse_blocks(ROOT);
        let buckets = blocks[2].attribute("buckets").unwrap();
        assert!(buckets.expr.starts_with('['));
        assert!(buckets.expr.ends_with(']'));
        assert!(buckets.expr.contains("assets"));
    }

    #[test]
    fn test_non_string_attribute_has_no_string_value() {
        let block = &parse_blocks("module \"a\" {\n  source = var.src\n}")[0];
        let attr = block.attribute("source").unwrap();
        assert_eq!(attr.expr, "var.src");
        assert!(attr.string_value.is_none());
    }

    #[test]
    fn test_multiline_attribute_is_not_a_block() {
        let src = "locals_map = {\n  module = 1\n}\nresource \"a\" \"b\" {}\n";
        let blocks = parse_blocks(src);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, "resource");
        assert_eq!(blocks[0].labels, vec!["a", "b"]);
    }

    #[test]
    fn test_unterminated_block_still_counted() {
        let src = "module \"a\" {\n  source = \"./a\"\n";
        let blocks = parse_blocks(src);
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].closed);
    }

    #[test]
    fn test_commented_out_block_ignored() {
        let src = "# module \"old\" {}\n/* module \"older\" { } */\nmodule \"new\" {}\n";
        let counts = BlockCounts::of(src);
        assert_eq!(counts.count("module"), 1);
    }

    #[test]
    fn test_block_counts() {
        let counts = BlockCounts::of(ROOT);
        assert_eq!(counts.count("module"), 2);
        assert!(counts.has("terraform"));
        assert!(counts.has("provider"));
        assert!(counts.has("variable"));
        assert!(counts.has("output"));
        assert!(!counts.has("resource"));
    }

    #[test]
    fn test_nested_block_items() {
        let blocks = parse_blocks(ROOT);
        let backend = blocks[0]
            .items()
            .into_iter()
            .find_map(|item| match item {
                Item::Block(b) => Some(b),
                _ => None,
            })
            .unwrap();
        assert_eq!(backend.kind, "backend");
        assert_eq!(
            backend.attribute("bucket").and_then(|a| a.string_value).as_deref(),
            Some("state")
        );
    }
}
