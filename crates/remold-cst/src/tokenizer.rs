//! Hand-written scanner for JavaScript-family source.
//!
//! The tokenizer produces a flat token stream with byte spans. It does not
//! classify keywords; the parser inspects identifier text where it matters.
//! Trivia (whitespace and comments) is skipped but statement-boundary
//! information survives through the `first_on_line` flag on each token.
//!
//! The scanner handles the lexical constructs that make naive statement
//! splitting unsafe: string and template literals, comments, and the
//! regex-versus-division ambiguity after `/`.

use crate::parser::{ParserOptions, SyntaxExtension};
use crate::span::Span;
use memchr::memchr;
use thiserror::Error;

// ============================================================================
// Tokens
// ============================================================================

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// Identifier or keyword.
    Ident,
    /// String literal, including its quotes.
    Str {
        /// The quote character (`'` or `"`).
        quote: char,
    },
    /// Numeric literal.
    Num,
    /// Template literal, including interpolations.
    Template,
    /// Regular expression literal, including flags.
    Regex,
    /// Punctuation or operator.
    Punct,
}

/// A single token with its source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokKind,
    pub span: Span,
    /// True when this token is the first on its line (or the first overall).
    pub first_on_line: bool,
}

impl Token {
    /// The token's text within `source`.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Lexical error, carrying the byte offset where scanning failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokError {
    #[error("unterminated string literal")]
    UnterminatedString { offset: usize },

    #[error("unterminated template literal")]
    UnterminatedTemplate { offset: usize },

    #[error("unterminated block comment")]
    UnterminatedComment { offset: usize },

    #[error("unterminated regular expression literal")]
    UnterminatedRegex { offset: usize },

    #[error("unmatched '{found}'")]
    UnmatchedBracket { found: char, offset: usize },

    #[error("unexpected end of input: unclosed '{open}'")]
    UnclosedBracket { open: char, offset: usize },

    #[error("numeric separators require the numeric-separators extension")]
    NumericSeparator { offset: usize },

    #[error("the pipeline operator requires the pipeline-operator extension")]
    PipelineOperator { offset: usize },

    #[error("decorators require the decorators extension")]
    Decorator { offset: usize },

    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, offset: usize },
}

impl TokError {
    /// Byte offset where the error occurred.
    pub fn offset(&self) -> usize {
        match self {
            TokError::UnterminatedString { offset }
            | TokError::UnterminatedTemplate { offset }
            | TokError::UnterminatedComment { offset }
            | TokError::UnterminatedRegex { offset }
            | TokError::UnmatchedBracket { offset, .. }
            | TokError::UnclosedBracket { offset, .. }
            | TokError::NumericSeparator { offset }
            | TokError::PipelineOperator { offset }
            | TokError::Decorator { offset }
            | TokError::UnexpectedChar { offset, .. } => *offset,
        }
    }
}

// ============================================================================
// Lexer
// ============================================================================

/// Keywords after which a `/` starts a regex literal rather than division.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Multi-character operators, longest first within each starting byte.
const MULTI_PUNCTS: &[&str] = &[
    ">>>=", "===", "!==", "**=", "<<=", ">>=", "...", "&&=", "||=", "??=", ">>>", "=>", "==", "!=",
    "<=", ">=", "+=", "-=", "*=", "%=", "&=", "|=", "^=", "&&", "||", "??", "?.", "++", "--",
    "**", "<<", ">>",
];

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    pending_newline: bool,
    tokens: Vec<Token>,
    brackets: Vec<(char, usize)>,
    numeric_separators: bool,
    pipeline: bool,
    decorators: bool,
}

/// Tokenize `source` under the given options.
pub fn tokenize(source: &str, options: &ParserOptions) -> Result<Vec<Token>, TokError> {
    let mut lexer = Lexer {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
        pending_newline: true,
        tokens: Vec::new(),
        brackets: Vec::new(),
        numeric_separators: options.has(SyntaxExtension::NumericSeparators),
        pipeline: options.has(SyntaxExtension::PipelineOperator),
        decorators: options.has(SyntaxExtension::Decorators),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<(), TokError> {
        // A shebang line is trivia.
        if self.bytes.starts_with(b"#!") {
            self.skip_line();
        }

        loop {
            self.skip_trivia()?;
            if self.pos >= self.bytes.len() {
                break;
            }
            self.next_token()?;
        }

        if let Some(&(open, offset)) = self.brackets.last() {
            return Err(TokError::UnclosedBracket { open, offset });
        }
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn char_at(&self, pos: usize) -> char {
        self.src[pos..].chars().next().unwrap_or('\0')
    }

    /// Advance past the char at `self.pos`.
    fn bump_char(&mut self) {
        let ch = self.char_at(self.pos);
        self.pos += ch.len_utf8();
    }

    fn skip_line(&mut self) {
        match memchr(b'\n', &self.bytes[self.pos..]) {
            Some(rel) => self.pos += rel,
            None => self.pos = self.bytes.len(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), TokError> {
        loop {
            match self.peek() {
                Some(b'\n') => {
                    self.pending_newline = true;
                    self.pos += 1;
                }
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line(),
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    let mut scan = self.pos + 2;
                    loop {
                        match memchr(b'*', &self.bytes[scan..]) {
                            Some(rel) if self.bytes.get(scan + rel + 1) == Some(&b'/') => {
                                // Newlines inside the comment still separate lines.
                                if memchr(b'\n', &self.bytes[start..scan + rel]).is_some() {
                                    self.pending_newline = true;
                                }
                                self.pos = scan + rel + 2;
                                break;
                            }
                            Some(rel) => scan += rel + 1,
                            None => {
                                return Err(TokError::UnterminatedComment { offset: start });
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn push(&mut self, kind: TokKind, start: usize) -> Result<(), TokError> {
        let span = Span::new(start, self.pos);
        let token = Token {
            kind,
            span,
            first_on_line: self.pending_newline,
        };
        self.pending_newline = false;

        if kind == TokKind::Punct {
            self.track_bracket(token.text(self.src), start)?;
        }
        self.tokens.push(token);
        Ok(())
    }

    fn track_bracket(&mut self, text: &str, offset: usize) -> Result<(), TokError> {
        let expected_open = match text {
            "(" | "[" | "{" => {
                self.brackets.push((text.chars().next().unwrap(), offset));
                return Ok(());
            }
            ")" => '(',
            "]" => '[',
            "}" => '{',
            _ => return Ok(()),
        };
        let found = text.chars().next().unwrap();
        match self.brackets.pop() {
            Some((open, _)) if open == expected_open => Ok(()),
            _ => Err(TokError::UnmatchedBracket { found, offset }),
        }
    }

    fn next_token(&mut self) -> Result<(), TokError> {
        let start = self.pos;
        let ch = self.char_at(self.pos);

        if is_ident_start(ch) {
            self.bump_char();
            while self.pos < self.bytes.len() && is_ident_continue(self.char_at(self.pos)) {
                self.bump_char();
            }
            return self.push(TokKind::Ident, start);
        }

        if ch.is_ascii_digit()
            || (ch == '.' && self.peek_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false))
        {
            self.scan_number()?;
            return self.push(TokKind::Num, start);
        }

        match ch {
            '"' | '\'' => {
                self.scan_string(ch)?;
                self.push(TokKind::Str { quote: ch }, start)
            }
            '`' => {
                self.scan_template()?;
                self.push(TokKind::Template, start)
            }
            '/' => {
                if self.regex_allowed() {
                    self.scan_regex()?;
                    self.push(TokKind::Regex, start)
                } else {
                    self.pos += 1;
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                    }
                    self.push(TokKind::Punct, start)
                }
            }
            '@' => {
                if !self.decorators {
                    return Err(TokError::Decorator { offset: start });
                }
                self.pos += 1;
                self.push(TokKind::Punct, start)
            }
            '|' if self.peek_at(1) == Some(b'>') => {
                if !self.pipeline {
                    return Err(TokError::PipelineOperator { offset: start });
                }
                self.pos += 2;
                self.push(TokKind::Punct, start)
            }
            _ => {
                for punct in MULTI_PUNCTS {
                    if self.src[self.pos..].starts_with(punct) {
                        self.pos += punct.len();
                        return self.push(TokKind::Punct, start);
                    }
                }
                if "(){}[];,.<>+-*%&|^!~?:=#".contains(ch) {
                    self.pos += 1;
                    return self.push(TokKind::Punct, start);
                }
                Err(TokError::UnexpectedChar { ch, offset: start })
            }
        }
    }

    /// Whether a `/` at the current position begins a regex literal.
    ///
    /// Standard heuristic: a regex may follow the start of input, most
    /// punctuation, or a keyword; division follows a value-producing token.
    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(tok) => match tok.kind {
                TokKind::Punct => !matches!(tok.text(self.src), ")" | "]" | "++" | "--"),
                TokKind::Ident => REGEX_PRECEDING_KEYWORDS.contains(&tok.text(self.src)),
                TokKind::Num | TokKind::Str { .. } | TokKind::Template | TokKind::Regex => false,
            },
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<(), TokError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.pos += 1;
                    if self.pos < self.bytes.len() {
                        self.bump_char();
                    }
                }
                b'\n' | b'\r' => break,
                _ if b == quote as u8 => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.bump_char(),
            }
        }
        Err(TokError::UnterminatedString { offset: start })
    }

    fn scan_template(&mut self) -> Result<(), TokError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.pos += 1;
                    if self.pos < self.bytes.len() {
                        self.bump_char();
                    }
                }
                b'`' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'$' if self.peek_at(1) == Some(b'{') => {
                    self.pos += 2;
                    self.scan_interpolation(start)?;
                }
                _ => self.bump_char(),
            }
        }
        Err(TokError::UnterminatedTemplate { offset: start })
    }

    /// Skip a `${ ... }` interpolation body, balancing nested braces and
    /// passing over nested strings, templates, and comments.
    fn scan_interpolation(&mut self, template_start: usize) -> Result<(), TokError> {
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                b'"' | b'\'' => self.scan_string(b as char)?,
                b'`' => self.scan_template()?,
                b'/' if self.peek_at(1) == Some(b'/') => self.skip_line(),
                b'/' if self.peek_at(1) == Some(b'*') => {
                    let offset = self.pos;
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.bump_char(),
                            None => return Err(TokError::UnterminatedComment { offset }),
                        }
                    }
                }
                _ => self.bump_char(),
            }
        }
        Err(TokError::UnterminatedTemplate {
            offset: template_start,
        })
    }

    fn scan_regex(&mut self) -> Result<(), TokError> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek() {
                Some(b'\\') => {
                    self.pos += 1;
                    if self.pos < self.bytes.len() {
                        self.bump_char();
                    }
                }
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(b'\n') | None => return Err(TokError::UnterminatedRegex { offset: start }),
                Some(_) => self.bump_char(),
            }
        }
        // Flags.
        while self.pos < self.bytes.len() && is_ident_continue(self.char_at(self.pos)) {
            self.bump_char();
        }
        Ok(())
    }

    fn scan_number(&mut self) -> Result<(), TokError> {
        let radix_prefix = matches!(
            (self.peek(), self.peek_at(1)),
            (Some(b'0'), Some(b'x' | b'X' | b'b' | b'B' | b'o' | b'O'))
        );
        if radix_prefix {
            self.pos += 2;
        }
        while let Some(b) = self.peek() {
            match b {
                b'_' => {
                    if !self.numeric_separators {
                        return Err(TokError::NumericSeparator { offset: self.pos });
                    }
                    self.pos += 1;
                }
                b'.' if !radix_prefix => self.pos += 1,
                b'e' | b'E' if !radix_prefix => {
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'+' | b'-')) {
                        self.pos += 1;
                    }
                }
                _ if b.is_ascii_alphanumeric() => self.pos += 1,
                _ => break,
            }
        }
        Ok(())
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserOptions;

    fn toks(source: &str) -> Vec<Token> {
        tokenize(source, &ParserOptions::default()).expect("tokenize failed")
    }

    fn texts<'a>(source: &'a str, tokens: &[Token]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.text(source)).collect()
    }

    mod basic_tokens {
        use super::*;

        #[test]
        fn idents_and_puncts() {
            let src = "import x from \"y\";";
            let tokens = toks(src);
            assert_eq!(texts(src, &tokens), vec!["import", "x", "from", "\"y\"", ";"]);
        }

        #[test]
        fn string_kind_records_quote() {
            let src = "'a' \"b\"";
            let tokens = toks(src);
            assert_eq!(tokens[0].kind, TokKind::Str { quote: '\'' });
            assert_eq!(tokens[1].kind, TokKind::Str { quote: '"' });
        }

        #[test]
        fn multi_char_operators_scan_as_one_token() {
            let src = "a === b && c ??= d";
            let tokens = toks(src);
            assert_eq!(texts(src, &tokens), vec!["a", "===", "b", "&&", "c", "??=", "d"]);
        }

        #[test]
        fn first_on_line_tracks_newlines() {
            let src = "a b\nc";
            let tokens = toks(src);
            assert!(tokens[0].first_on_line);
            assert!(!tokens[1].first_on_line);
            assert!(tokens[2].first_on_line);
        }

        #[test]
        fn comments_are_trivia_but_preserve_line_breaks() {
            let src = "a // trailing\nb /* block\nspan */ c";
            let tokens = toks(src);
            assert_eq!(texts(src, &tokens), vec!["a", "b", "c"]);
            assert!(tokens[1].first_on_line);
            assert!(tokens[2].first_on_line);
        }

        #[test]
        fn shebang_is_skipped() {
            let src = "#!/usr/bin/env node\nlet x";
            let tokens = toks(src);
            assert_eq!(texts(src, &tokens), vec!["let", "x"]);
        }
    }

    mod strings_and_templates {
        use super::*;

        #[test]
        fn escaped_quote_does_not_terminate() {
            let src = r#""a\"b""#;
            let tokens = toks(src);
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].text(src), src);
        }

        #[test]
        fn unterminated_string_is_an_error() {
            let err = tokenize("const x = \"oops", &ParserOptions::default()).unwrap_err();
            assert!(matches!(err, TokError::UnterminatedString { offset: 10 }));
        }

        #[test]
        fn template_with_interpolation_is_one_token() {
            let src = "`a ${ {b: '}'} } c`";
            let tokens = toks(src);
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].kind, TokKind::Template);
        }

        #[test]
        fn unterminated_template_is_an_error() {
            let err = tokenize("`abc ${x}", &ParserOptions::default()).unwrap_err();
            assert!(matches!(err, TokError::UnterminatedTemplate { .. }));
        }
    }

    mod regex_handling {
        use super::*;

        #[test]
        fn regex_after_operator() {
            let src = "x = /a[/]b/g;";
            let tokens = toks(src);
            assert_eq!(texts(src, &tokens), vec!["x", "=", "/a[/]b/g", ";"]);
            assert_eq!(tokens[2].kind, TokKind::Regex);
        }

        #[test]
        fn division_after_value() {
            let src = "a / b";
            let tokens = toks(src);
            assert_eq!(tokens[1].kind, TokKind::Punct);
        }

        #[test]
        fn regex_after_return_keyword() {
            let src = "return /x/.test(s)";
            let tokens = toks(src);
            assert_eq!(tokens[1].kind, TokKind::Regex);
        }
    }

    mod brackets {
        use super::*;

        #[test]
        fn unclosed_bracket_is_an_error() {
            let err = tokenize("function f() {", &ParserOptions::default()).unwrap_err();
            assert!(matches!(err, TokError::UnclosedBracket { open: '{', .. }));
        }

        #[test]
        fn unmatched_closer_is_an_error() {
            let err = tokenize("a)", &ParserOptions::default()).unwrap_err();
            assert!(matches!(err, TokError::UnmatchedBracket { found: ')', .. }));
        }

        #[test]
        fn braces_inside_template_do_not_count() {
            assert!(tokenize("`${ { } }`", &ParserOptions::default()).is_ok());
        }
    }

    mod extension_gating {
        use super::*;
        use crate::parser::SyntaxExtension;

        #[test]
        fn numeric_separator_rejected_by_default() {
            let err = tokenize("const n = 1_000", &ParserOptions::default()).unwrap_err();
            assert!(matches!(err, TokError::NumericSeparator { .. }));
        }

        #[test]
        fn numeric_separator_accepted_with_extension() {
            let options = ParserOptions::default().with(SyntaxExtension::NumericSeparators);
            assert!(tokenize("const n = 1_000", &options).is_ok());
        }

        #[test]
        fn pipeline_operator_gated() {
            let err = tokenize("a |> b", &ParserOptions::default()).unwrap_err();
            assert!(matches!(err, TokError::PipelineOperator { .. }));

            let options = ParserOptions::default().with(SyntaxExtension::PipelineOperator);
            let src = "a |> b";
            let tokens = tokenize(src, &options).unwrap();
            assert_eq!(texts(src, &tokens), vec!["a", "|>", "b"]);
        }

        #[test]
        fn decorator_gated() {
            let err = tokenize("@decorate class C {}", &ParserOptions::default()).unwrap_err();
            assert!(matches!(err, TokError::Decorator { .. }));

            let options = ParserOptions::default().with(SyntaxExtension::Decorators);
            assert!(tokenize("@decorate class C {}", &options).is_ok());
        }
    }
}
