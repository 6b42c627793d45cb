//! Source parsing: token stream to lossless [`SyntaxTree`].
//!
//! The parser models import declarations structurally and folds every other
//! run of top-level tokens into opaque [`NodeKind::Raw`] segments. Trivia
//! between statements is recorded as each node's lead gap, so the tree plus
//! gaps reconstruct the original text exactly.
//!
//! Parsing behavior is pure per call; the only configuration is an
//! enumerated set of [`SyntaxExtension`] toggles fixed at startup.

use crate::nodes::{NodeId, NodeKind, SyntaxTree};
use crate::span::{offset_to_position, Span};
use crate::tokenizer::{tokenize, TokKind, Token};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Parser Options
// ============================================================================

/// Optional language extensions accepted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyntaxExtension {
    /// TypeScript type-only imports (`import type`, `{ type A }`).
    TypeScript,
    /// Statement-level decorators (`@name`).
    Decorators,
    /// Numeric separators in literals (`1_000`).
    NumericSeparators,
    /// The pipeline operator (`|>`).
    PipelineOperator,
    /// Import attributes (`with { ... }` / `assert { ... }`).
    ImportAttributes,
}

impl fmt::Display for SyntaxExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyntaxExtension::TypeScript => "typescript",
            SyntaxExtension::Decorators => "decorators",
            SyntaxExtension::NumericSeparators => "numeric-separators",
            SyntaxExtension::PipelineOperator => "pipeline-operator",
            SyntaxExtension::ImportAttributes => "import-attributes",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SyntaxExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "typescript" | "ts" => Ok(SyntaxExtension::TypeScript),
            "decorators" => Ok(SyntaxExtension::Decorators),
            "numeric-separators" => Ok(SyntaxExtension::NumericSeparators),
            "pipeline-operator" | "pipeline" => Ok(SyntaxExtension::PipelineOperator),
            "import-attributes" => Ok(SyntaxExtension::ImportAttributes),
            _ => Err(format!(
                "unknown syntax extension '{}' (expected one of: typescript, decorators, \
                 numeric-separators, pipeline-operator, import-attributes)",
                s
            )),
        }
    }
}

/// Parser configuration, established once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserOptions {
    extensions: BTreeSet<SyntaxExtension>,
}

impl ParserOptions {
    /// Options with no extensions enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable an extension.
    pub fn with(mut self, extension: SyntaxExtension) -> Self {
        self.extensions.insert(extension);
        self
    }

    /// Whether an extension is enabled.
    pub fn has(&self, extension: SyntaxExtension) -> bool {
        self.extensions.contains(&extension)
    }

    /// Iterate over the enabled extensions in stable order.
    pub fn extensions(&self) -> impl Iterator<Item = SyntaxExtension> + '_ {
        self.extensions.iter().copied()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Source violates the accepted grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{path}:{line}:{col}: {message}")]
pub struct ParseError {
    /// Path of the offending file.
    pub path: String,
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed column (counting chars).
    pub col: u32,
    /// Human-readable detail.
    pub message: String,
}

impl ParseError {
    fn at(path: &str, source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, col) = offset_to_position(source, offset);
        ParseError {
            path: path.to_string(),
            line,
            col,
            message: message.into(),
        }
    }
}

// ============================================================================
// Parse Entry Point
// ============================================================================

/// Parse `source` into a lossless [`SyntaxTree`].
pub fn parse(source: &str, path: &str, options: &ParserOptions) -> Result<SyntaxTree, ParseError> {
    let tokens =
        tokenize(source, options).map_err(|e| ParseError::at(path, source, e.offset(), e.to_string()))?;

    let mut tree = SyntaxTree::build(source.to_string(), path.to_string());
    if let Some(tok) = tokens.iter().find(|t| matches!(t.kind, TokKind::Str { .. })) {
        if let TokKind::Str { quote } = tok.kind {
            tree.set_preferred_quote(quote);
        }
    }

    let mut parser = Parser {
        source,
        path,
        tokens: &tokens,
        pos: 0,
        options,
    };
    parser.parse_program(&mut tree)?;
    Ok(tree)
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    source: &'a str,
    path: &'a str,
    tokens: &'a [Token],
    pos: usize,
    options: &'a ParserOptions,
}

impl<'a> Parser<'a> {
    fn parse_program(&mut self, tree: &mut SyntaxTree) -> Result<(), ParseError> {
        let mut children: Vec<NodeId> = Vec::new();
        let mut depth = 0usize;
        let mut prev_end = 0usize;

        while self.pos < self.tokens.len() {
            if depth == 0 && self.at_import_statement() {
                let decl = self.parse_import(tree, prev_end)?;
                prev_end = tree.node(decl).span().expect("parsed decl has span").end;
                children.push(decl);
            } else {
                let raw_start = self.pos;
                while self.pos < self.tokens.len() {
                    if depth == 0 && self.at_import_statement() {
                        break;
                    }
                    depth = update_depth(depth, self.token_text(self.pos));
                    self.pos += 1;
                }
                let span = Span::new(
                    self.tokens[raw_start].span.start,
                    self.tokens[self.pos - 1].span.end,
                );
                let lead = Span::new(prev_end, span.start);
                let text = span.slice(self.source).to_string();
                children.push(tree.alloc_parsed(NodeKind::Raw { text }, span, lead));
                prev_end = span.end;
            }
        }

        let root = tree.root();
        tree.set_children(root, children);
        tree.set_tail(root, Span::new(prev_end, self.source.len()));
        Ok(())
    }

    /// Whether the current token begins an import declaration.
    ///
    /// Requires statement position (start of input, after `;` or `}`, or
    /// first on its line) and excludes `import(...)` calls, `import.meta`,
    /// and property accesses.
    fn at_import_statement(&self) -> bool {
        let tok = &self.tokens[self.pos];
        if tok.kind != TokKind::Ident || tok.text(self.source) != "import" {
            return false;
        }
        let at_stmt_position = self.pos == 0
            || tok.first_on_line
            || matches!(self.token_text(self.pos - 1), ";" | "}");
        if !at_stmt_position || (self.pos > 0 && self.token_text(self.pos - 1) == ".") {
            return false;
        }
        !matches!(self.token_text(self.pos + 1), "(" | ".")
    }

    /// Text of the token at `index`, or `""` past the end.
    fn token_text(&self, index: usize) -> &'a str {
        self.tokens
            .get(index)
            .map(|t| t.text(self.source))
            .unwrap_or("")
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn err_here(&self, message: impl Into<String>) -> ParseError {
        let offset = self
            .current()
            .map(|t| t.span.start)
            .unwrap_or(self.source.len());
        ParseError::at(self.path, self.source, offset, message)
    }

    fn expect_ident(&mut self, word: &str) -> Result<Token, ParseError> {
        match self.current() {
            Some(tok) if tok.kind == TokKind::Ident && tok.text(self.source) == word => {
                let tok = *tok;
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => Err(self.err_here(format!(
                "expected '{}' in import declaration, found '{}'",
                word,
                tok.text(self.source)
            ))),
            None => Err(self.err_here(format!(
                "unexpected end of input: expected '{}' in import declaration",
                word
            ))),
        }
    }

    fn expect_any_ident(&mut self, what: &str) -> Result<Token, ParseError> {
        match self.current() {
            Some(tok) if tok.kind == TokKind::Ident => {
                let tok = *tok;
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => Err(self.err_here(format!(
                "expected {}, found '{}'",
                what,
                tok.text(self.source)
            ))),
            None => Err(self.err_here(format!("unexpected end of input: expected {}", what))),
        }
    }

    fn eat_punct(&mut self, text: &str) -> bool {
        if self.token_text(self.pos) == text {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn alloc_ident(&self, tree: &mut SyntaxTree, tok: Token, lead_from: usize) -> NodeId {
        let name = tok.text(self.source).to_string();
        tree.alloc_parsed(
            NodeKind::Identifier { name },
            tok.span,
            Span::new(lead_from, tok.span.start),
        )
    }

    fn parse_import(&mut self, tree: &mut SyntaxTree, stmt_prev_end: usize) -> Result<NodeId, ParseError> {
        let import_tok = self.tokens[self.pos];
        let decl_start = import_tok.span.start;
        self.pos += 1;

        let typescript = self.options.has(SyntaxExtension::TypeScript);
        let mut type_only = false;
        if typescript && self.token_text(self.pos) == "type" {
            let next = self.token_text(self.pos + 1);
            let next_is_binding = matches!(next, "{" | "*")
                || (self
                    .tokens
                    .get(self.pos + 1)
                    .map(|t| t.kind == TokKind::Ident)
                    .unwrap_or(false)
                    && next != "from");
            if next_is_binding {
                type_only = true;
                self.pos += 1;
            }
        }

        let mut children: Vec<NodeId> = Vec::new();
        // End offset of the previous child span; the next child's lead gap
        // starts here. The first gap starts at the declaration itself.
        let mut prev_end = decl_start;

        let has_specifiers = !matches!(self.current().map(|t| t.kind), Some(TokKind::Str { .. }));
        if has_specifiers {
            // Default specifier.
            if self
                .current()
                .map(|t| t.kind == TokKind::Ident && t.text(self.source) != "from")
                .unwrap_or(false)
            {
                let tok = self.expect_any_ident("an imported name")?;
                let ident = self.alloc_ident(tree, tok, tok.span.start);
                let spec = tree.alloc_parsed(
                    NodeKind::ImportDefaultSpecifier,
                    tok.span,
                    Span::new(prev_end, tok.span.start),
                );
                tree.set_children(spec, vec![ident]);
                prev_end = tok.span.end;
                children.push(spec);

                if !self.eat_punct(",") && !matches!(self.token_text(self.pos), "from") {
                    return Err(self.err_here(format!(
                        "expected ',' or 'from' in import declaration, found '{}'",
                        self.token_text(self.pos)
                    )));
                }
            }

            match self.token_text(self.pos) {
                "*" => {
                    let star = self.tokens[self.pos];
                    self.pos += 1;
                    self.expect_ident("as")?;
                    let local = self.expect_any_ident("a namespace binding")?;
                    let span = Span::new(star.span.start, local.span.end);
                    let ident = self.alloc_ident(tree, local, star.span.start);
                    let spec = tree.alloc_parsed(
                        NodeKind::ImportNamespaceSpecifier,
                        span,
                        Span::new(prev_end, span.start),
                    );
                    tree.set_children(spec, vec![ident]);
                    prev_end = span.end;
                    children.push(spec);
                }
                "{" => {
                    self.pos += 1;
                    loop {
                        if self.eat_punct("}") {
                            break;
                        }
                        let spec = self.parse_named_specifier(tree, prev_end, typescript)?;
                        prev_end = tree.node(spec).span().expect("parsed spec has span").end;
                        children.push(spec);
                        if !self.eat_punct(",") {
                            if self.eat_punct("}") {
                                break;
                            }
                            return Err(self.err_here(format!(
                                "expected ',' or '}}' in named imports, found '{}'",
                                self.token_text(self.pos)
                            )));
                        }
                    }
                }
                _ if !children.is_empty() => {}
                other => {
                    return Err(self.err_here(format!(
                        "expected import specifiers, found '{}'",
                        other
                    )));
                }
            }

            self.expect_ident("from")?;
        }

        let source_tok = match self.current() {
            Some(tok) if matches!(tok.kind, TokKind::Str { .. }) => {
                let tok = *tok;
                self.pos += 1;
                tok
            }
            _ => {
                return Err(self.err_here(format!(
                    "expected a module source string, found '{}'",
                    self.token_text(self.pos)
                )));
            }
        };
        let inner = &self.source[source_tok.span.start + 1..source_tok.span.end - 1];
        let lit = tree.alloc_parsed(
            NodeKind::StringLiteral {
                value: inner.to_string(),
            },
            source_tok.span,
            Span::new(prev_end, source_tok.span.start),
        );
        prev_end = source_tok.span.end;
        children.push(lit);

        // Import attributes clause, kept as an opaque child.
        if self.options.has(SyntaxExtension::ImportAttributes)
            && matches!(self.token_text(self.pos), "with" | "assert")
            && self.token_text(self.pos + 1) == "{"
        {
            let clause_start = self.tokens[self.pos].span.start;
            self.pos += 2;
            let mut depth = 1usize;
            while depth > 0 {
                match self.token_text(self.pos) {
                    "" => return Err(self.err_here("unexpected end of input in import attributes")),
                    "{" => depth += 1,
                    "}" => depth -= 1,
                    _ => {}
                }
                self.pos += 1;
            }
            let span = Span::new(clause_start, self.tokens[self.pos - 1].span.end);
            let text = span.slice(self.source).to_string();
            let raw = tree.alloc_parsed(
                NodeKind::Raw { text },
                span,
                Span::new(prev_end, span.start),
            );
            prev_end = span.end;
            children.push(raw);
        }

        let decl_end = if self.token_text(self.pos) == ";" {
            let end = self.tokens[self.pos].span.end;
            self.pos += 1;
            end
        } else {
            prev_end
        };

        let decl = tree.alloc_parsed(
            NodeKind::ImportDeclaration { type_only },
            Span::new(decl_start, decl_end),
            Span::new(stmt_prev_end, decl_start),
        );
        tree.set_children(decl, children);
        tree.set_tail(decl, Span::new(prev_end, decl_end));
        Ok(decl)
    }

    fn parse_named_specifier(
        &mut self,
        tree: &mut SyntaxTree,
        prev_end: usize,
        typescript: bool,
    ) -> Result<NodeId, ParseError> {
        let start_tok = match self.current() {
            Some(tok) if tok.kind == TokKind::Ident => *tok,
            _ => {
                return Err(self.err_here(format!(
                    "expected an imported name, found '{}'",
                    self.token_text(self.pos)
                )));
            }
        };

        let mut type_only = false;
        if typescript
            && start_tok.text(self.source) == "type"
            && self
                .tokens
                .get(self.pos + 1)
                .map(|t| t.kind == TokKind::Ident && t.text(self.source) != "as")
                .unwrap_or(false)
        {
            type_only = true;
            self.pos += 1;
        }

        let imported_tok = self.expect_any_ident("an imported name")?;
        let spec_start = start_tok.span.start;
        let imported = self.alloc_ident(tree, imported_tok, spec_start);

        let mut spec_children = vec![imported];
        let mut spec_end = imported_tok.span.end;
        if self.token_text(self.pos) == "as" {
            self.pos += 1;
            let local_tok = self.expect_any_ident("a local binding")?;
            let local = self.alloc_ident(tree, local_tok, imported_tok.span.end);
            spec_children.push(local);
            spec_end = local_tok.span.end;
        }

        let spec = tree.alloc_parsed(
            NodeKind::ImportNamedSpecifier { type_only },
            Span::new(spec_start, spec_end),
            Span::new(prev_end, spec_start),
        );
        tree.set_children(spec, spec_children);
        Ok(spec)
    }
}

/// Track round/square/curly bracket depth across raw token runs.
fn update_depth(depth: usize, text: &str) -> usize {
    match text {
        "(" | "[" | "{" => depth + 1,
        ")" | "]" | "}" => depth.saturating_sub(1),
        _ => depth,
    }
}

// ============================================================================
// Tests
// ============================================================================
