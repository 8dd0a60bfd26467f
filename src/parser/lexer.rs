//! Lexer (tokenizer) for Fux source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Scanning never stops at malformed input: problems are reported to the
//! [`DiagnosticEngine`] and the lexer carries on with the next character.
//! The stream always ends with exactly one [`TokenKind::EndOfFile`].

use rustc_hash::FxHashMap;

use super::ast::Position;
use super::token::{Token, TokenKind};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticEngine, ErrorKind};

/// Lexer for Fux source code
pub struct Lexer<'d> {
    source: Vec<char>,
    idx: usize,
    line: usize,
    col: usize,

    // token in progress
    kind: Option<TokenKind>,
    text: String,
    start: usize,
    start_line: usize,

    tokens: Vec<Token>,
    keywords: FxHashMap<&'static str, TokenKind>,
    diagnostics: &'d mut DiagnosticEngine,
}

impl<'d> Lexer<'d> {
    /// Create a new lexer for the given source string.
    pub fn new(source: &str, diagnostics: &'d mut DiagnosticEngine) -> Self {
        let keywords = TokenKind::KEYWORDS
            .iter()
            .map(|&kind| (kind.lexeme(), kind))
            .collect();

        Lexer {
            source: source.chars().collect(),
            idx: 0,
            line: 1,
            col: 1,
            kind: None,
            text: String::new(),
            start: 1,
            start_line: 1,
            tokens: Vec::new(),
            keywords,
            diagnostics,
        }
    }

    /// Tokenize the entire input
    pub fn lex(mut self) -> Vec<Token> {
        while self.in_bounds() {
            self.start = self.col;
            self.start_line = self.line;
            self.scan_token();
            self.end_token();
        }

        self.tokens.push(Token::new(
            TokenKind::EndOfFile,
            TokenKind::EndOfFile.lexeme(),
            self.line,
            self.col,
            self.col + 1,
        ));

        tracing::debug!(
            file = %self.diagnostics.file(),
            tokens = self.tokens.len(),
            "lexed source"
        );
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.current();

        match c {
            '(' => self.op(TokenKind::LParen),
            ')' => self.op(TokenKind::RParen),
            '{' => self.op(TokenKind::LBrace),
            '}' => self.op(TokenKind::RBrace),
            ']' => self.op(TokenKind::RBracket),
            ';' => self.op(TokenKind::Semicolon),
            ',' => self.op(TokenKind::Comma),
            '@' => self.op(TokenKind::At),
            '?' => self.op(TokenKind::Question),
            '~' => self.op(TokenKind::BitNot),

            '[' => match self.peek(1) {
                ']' => self.op(TokenKind::ArrayBracket),
                _ => self.op(TokenKind::LBracket),
            },
            ':' => match self.peek(1) {
                ':' => self.op(TokenKind::ColonColon),
                _ => self.op(TokenKind::Colon),
            },
            '.' => {
                if self.peek(1).is_ascii_digit() {
                    self.kind = Some(TokenKind::Float);
                    self.scan_decimal();
                } else if self.peek(1) == '.' && self.peek(2) == '.' {
                    self.op(TokenKind::TripleDot);
                } else if self.peek(1) == '.' {
                    self.op(TokenKind::DoubleDot);
                } else {
                    self.op(TokenKind::Dot);
                }
            }
            '=' => match (self.peek(1), self.peek(2)) {
                ('=', '=') => self.op(TokenKind::TripleEquals),
                ('=', _) => self.op(TokenKind::EqualsEquals),
                _ => self.op(TokenKind::Equals),
            },
            '<' => match (self.peek(1), self.peek(2)) {
                ('<', _) => self.op(TokenKind::LShift),
                ('=', _) => self.op(TokenKind::LtEquals),
                ('>', _) => self.op(TokenKind::Swap),
                ('|', '=') => self.op(TokenKind::LshEquals),
                ('|', _) => self.op(TokenKind::BitLShift),
                _ => self.op(TokenKind::LessThan),
            },
            '>' => match self.peek(1) {
                '>' => self.op(TokenKind::RShift),
                '=' => self.op(TokenKind::GtEquals),
                '<' => self.op(TokenKind::BitXor),
                _ => self.op(TokenKind::GreaterThan),
            },
            '!' => match self.peek(1) {
                '=' => self.op(TokenKind::NotEquals),
                _ => self.op(TokenKind::Exclamation),
            },
            '+' => match self.peek(1) {
                '+' => self.op(TokenKind::PlusPlus),
                '=' => self.op(TokenKind::PlusEquals),
                _ => self.op(TokenKind::Plus),
            },
            '-' => match self.peek(1) {
                '-' => self.op(TokenKind::MinusMinus),
                '=' => self.op(TokenKind::MinusEquals),
                '>' => self.op(TokenKind::Pointer),
                _ => self.op(TokenKind::Minus),
            },
            '*' => match self.peek(1) {
                '=' => self.op(TokenKind::AsteriskEquals),
                _ => self.op(TokenKind::Asterisk),
            },
            '/' => match self.peek(1) {
                '/' => self.skip_line_comment(),
                '*' => self.skip_block_comment(),
                '=' => self.op(TokenKind::SlashEquals),
                _ => self.op(TokenKind::Slash),
            },
            '^' => match self.peek(1) {
                '=' => self.op(TokenKind::CaretEquals),
                _ => self.op(TokenKind::Caret),
            },
            '%' => match self.peek(1) {
                '=' => self.op(TokenKind::PercentEquals),
                _ => self.op(TokenKind::Percent),
            },
            '|' => match (self.peek(1), self.peek(2)) {
                ('|', _) => self.op(TokenKind::Or),
                ('=', _) => self.op(TokenKind::OrEquals),
                ('>', '=') => self.op(TokenKind::RshEquals),
                ('>', _) => self.op(TokenKind::BitRShift),
                _ => self.op(TokenKind::BitOr),
            },
            '&' => match self.peek(1) {
                '&' => self.op(TokenKind::And),
                '=' => self.op(TokenKind::AndEquals),
                _ => self.op(TokenKind::BitAnd),
            },
            '#' => match self.peek(1) {
                '!' => self.skip_line_comment(),
                _ => self.op(TokenKind::Hash),
            },

            ' ' | '\t' | '\x0B' | '\r' => self.advance(1),
            '\n' => {
                self.advance(1);
                self.reset_pos();
            }

            '0'..='9' => {
                self.kind = Some(TokenKind::Number);
                self.text.push(c);
                self.advance(1);
                self.scan_number();
            }
            '\'' => self.scan_char(),
            '"' => self.scan_string(),
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),

            _ => {
                self.report(
                    DiagnosticBuilder::new(
                        ErrorKind::UnknownCharacter,
                        "Encountered an Unknown Character",
                        Position::line(self.line, self.col, self.col),
                        format!("The character '{}' is unknown to the lexer", c),
                    ),
                );
                self.advance(1);
            }
        }
    }

    /// Emit an operator or punctuation token spelled exactly like its kind.
    fn op(&mut self, kind: TokenKind) {
        let lexeme = kind.lexeme();
        self.kind = Some(kind);
        self.text.push_str(lexeme);
        self.advance(lexeme.chars().count());
    }

    fn end_token(&mut self) {
        let text = std::mem::take(&mut self.text);
        if let Some(kind) = self.kind.take() {
            let end = self.col.saturating_sub(1);
            self.tokens
                .push(Token::new(kind, text, self.start_line, self.start, end));
        }
    }

    /// Whole token so far, from its first column up to the cursor.
    fn token_span(&self) -> Position {
        Position::line(self.start_line, self.start, self.col)
    }

    fn report(&mut self, builder: DiagnosticBuilder) {
        self.diagnostics.emit(builder);
    }

    // ===== Literals =====

    fn scan_number(&mut self) {
        if self.text == "0" {
            match self.current() {
                'x' => {
                    return self.scan_radix(
                        TokenKind::Hexadecimal,
                        "Hexadecimal",
                        "0-9, a-f, A-F",
                        |c| c.is_ascii_hexdigit(),
                    )
                }
                'o' => {
                    return self.scan_radix(TokenKind::Octal, "Octal", "0-7", |c| {
                        ('0'..='7').contains(&c)
                    })
                }
                'b' => {
                    return self.scan_radix(TokenKind::Binary, "Binary", "0-1", |c| {
                        c == '0' || c == '1'
                    })
                }
                _ => {}
            }
        }

        self.scan_decimal();
    }

    /// `0x`, `0o` and `0b` literals; the cursor rests on the base letter.
    fn scan_radix(
        &mut self,
        kind: TokenKind,
        base: &str,
        digits: &str,
        is_digit: fn(char) -> bool,
    ) {
        self.kind = Some(kind);
        self.text.push(self.current());
        self.advance(1);

        if self.in_bounds() && is_digit(self.current()) {
            self.text.push(self.current());
            self.advance(1);
        } else {
            let prefix = self.text.clone();
            self.report(
                DiagnosticBuilder::new(
                    ErrorKind::IllegalNumberFormat,
                    format!("Expected at least one Digit in {} Number", base),
                    self.token_span(),
                    format!("Expected at least one digit after '{}'", prefix),
                )
                .pointer(
                    self.col,
                    format!("Expected at least one digit ({}) here", digits),
                ),
            );
        }

        while self.in_bounds() && (is_digit(self.current()) || self.current() == '_') {
            if self.current() != '_' {
                self.text.push(self.current());
            }
            self.advance(1);
        }
    }

    /// Decimal integers and floats with an optional exponent.
    ///
    /// Entered with the cursor on the character after the first digit, or on
    /// the `.` of a float like `.5`.
    fn scan_decimal(&mut self) {
        let mut exponent = false;

        while self.in_bounds() {
            let c = self.current();
            match c {
                '_' => {
                    self.advance(1);
                    continue;
                }
                'e' | 'E' => {
                    if exponent {
                        return self.unexpected_in_number(c);
                    }
                    exponent = true;
                }
                // a sign belongs to the literal only right after `e`; `1e5-3` is a subtraction
                '+' | '-' => {
                    if !exponent || !self.text.ends_with(['e', 'E']) {
                        break;
                    }
                }
                '.' if !exponent
                    && self.kind != Some(TokenKind::Float)
                    && self.peek(1).is_ascii_digit() =>
                {
                    self.kind = Some(TokenKind::Float);
                }
                '.' if self.text.is_empty() => self.kind = Some(TokenKind::Float),
                c if c.is_ascii_digit() => {}
                _ => break,
            }

            self.text.push(c);
            self.advance(1);
        }

        if let Some(last) = self.text.chars().last() {
            if exponent && matches!(last, 'e' | 'E' | '+' | '-') {
                self.report(
                    DiagnosticBuilder::new(
                        ErrorKind::IllegalNumberFormat,
                        format!("Unexpected Character in {}", self.number_class()),
                        self.token_span(),
                        format!("Expected at least one digit (0-9) after '{}'", last),
                    )
                    .pointer(self.col - 1, format!("'{}' was found here", last)),
                );
            }
        }
    }

    /// A second exponent marker; consumed and the literal ends.
    fn unexpected_in_number(&mut self, c: char) {
        let what = if self.kind == Some(TokenKind::Float) {
            "float"
        } else {
            "decimal integer"
        };
        self.report(
            DiagnosticBuilder::new(
                ErrorKind::IllegalNumberFormat,
                format!("Unexpected Character in {}", self.number_class()),
                self.token_span(),
                format!("Unexpected '{}' in {}", c, what),
            )
            .pointer(self.col, format!("'{}' was found here", c)),
        );
        self.advance(1);
    }

    fn number_class(&self) -> &'static str {
        if self.kind == Some(TokenKind::Float) {
            "Floating Point Number"
        } else {
            "Decimal Integer"
        }
    }

    fn scan_char(&mut self) {
        self.kind = Some(TokenKind::Char);
        self.advance(1);

        if self.in_bounds() && self.current() != '\n' {
            self.text.push(self.current());
            if self.current() == '\\' && self.peek(1) != '\n' && self.idx + 1 < self.source.len() {
                self.advance(1);
                self.text.push(self.current());
            }
            self.advance(1);
        }

        if self.current() != '\'' {
            self.report(
                DiagnosticBuilder::new(
                    ErrorKind::IllegalCharLiteralFormat,
                    "Expected Ending Quote After Char Literal",
                    self.token_span(),
                    "",
                )
                .pointer(self.col, "Expected a single quote \"'\" here"),
            );
            return;
        }
        self.advance(1);
    }

    /// String literal; escape pairs stay raw in the token text.
    fn scan_string(&mut self) {
        self.kind = Some(TokenKind::String);
        self.advance(1);

        loop {
            if !self.in_bounds() {
                return self.unterminated_string("end of file");
            }

            match self.current() {
                '"' => {
                    self.advance(1);
                    return;
                }
                '\n' => return self.unterminated_string("end of line"),
                '\\' => {
                    let escaped = self.peek(1);
                    if escaped == '\\' || escaped.is_ascii_alphabetic() {
                        self.text.push('\\');
                        self.text.push(escaped);
                        self.advance(2);
                    } else if escaped == '\0' && self.idx + 1 >= self.source.len() {
                        self.text.push('\\');
                        self.advance(1);
                    } else {
                        self.report(
                            DiagnosticBuilder::new(
                                ErrorKind::IllegalStringLiteralFormat,
                                "Invalid Escape Sequence found in String Literal",
                                self.token_span(),
                                "",
                            )
                            .pointer(self.col, "Invalid escape sequence found here"),
                        );
                        if escaped == '\n' {
                            self.advance(1);
                        } else {
                            self.advance(2);
                        }
                    }
                }
                c => {
                    self.text.push(c);
                    self.advance(1);
                }
            }
        }
    }

    fn unterminated_string(&mut self, at: &str) {
        self.report(
            DiagnosticBuilder::new(
                ErrorKind::IllegalStringLiteralFormat,
                "Unterminated String",
                self.token_span(),
                format!("Literal was not terminated before {}", at),
            )
            .pointer(self.col, "Expected a double quote '\"' here"),
        );
    }

    fn scan_identifier(&mut self) {
        while self.in_bounds() && (self.current().is_ascii_alphanumeric() || self.current() == '_') {
            self.text.push(self.current());
            self.advance(1);
        }

        if self.text.chars().all(|c| c == '_') {
            self.report(DiagnosticBuilder::new(
                ErrorKind::Generic,
                "Invalid Identifier Format",
                self.token_span(),
                "Expected at least one alphabetic character in identifier",
            ));
        }

        let kind = self
            .keywords
            .get(self.text.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.kind = Some(kind);
    }

    // ===== Comments =====

    /// `//` and `#!` comments, up to and including the newline.
    fn skip_line_comment(&mut self) {
        while self.in_bounds() {
            let c = self.current();
            self.advance(1);
            if c == '\n' {
                self.reset_pos();
                return;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let opener = Position::line(self.line, self.col, self.col + 1);
        self.advance(2);

        while self.in_bounds() && !(self.current() == '*' && self.peek(1) == '/') {
            let c = self.current();
            self.advance(1);
            if c == '\n' {
                self.reset_pos();
            }
        }

        if !self.in_bounds() {
            let col = self.col.saturating_sub(1).max(1);
            self.report(
                DiagnosticBuilder::new(
                    ErrorKind::UnexpectedEof,
                    "Expected Multi-Line Comment to end",
                    Position::line(self.line, col, self.col),
                    "Expected '*/' before end of file",
                )
                .reference(opener, "Comment starts here"),
            );
        } else {
            self.advance(2);
        }
    }

    // ===== Cursor =====

    fn in_bounds(&self) -> bool {
        self.idx < self.source.len()
    }

    fn current(&self) -> char {
        self.peek(0)
    }

    /// Character `offset` ahead of the cursor, `'\0'` past the end.
    fn peek(&self, offset: usize) -> char {
        self.source.get(self.idx + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self, steps: usize) {
        self.idx += steps;
        self.col += steps;
    }

    fn reset_pos(&mut self) {
        self.col = 1;
        self.line += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> (Vec<Token>, DiagnosticEngine) {
        let mut diagnostics = DiagnosticEngine::new("test.fux", src);
        let tokens = Lexer::new(src, &mut diagnostics).lex();
        (tokens, diagnostics)
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let (tokens, diagnostics) = lex("main(): i32 { return 0; }");

        assert!(diagnostics.is_empty());
        assert!(matches!(tokens[0].kind, TokenKind::Identifier) && tokens[0].text == "main");
        assert!(matches!(tokens[1].kind, TokenKind::LParen));
        assert!(matches!(tokens[2].kind, TokenKind::RParen));
        assert!(matches!(tokens[3].kind, TokenKind::Colon));
        assert!(matches!(tokens[4].kind, TokenKind::KeyI32));
        assert!(matches!(tokens[5].kind, TokenKind::LBrace));
        assert!(matches!(tokens[6].kind, TokenKind::KeyReturn));
        assert!(matches!(tokens[7].kind, TokenKind::Number) && tokens[7].text == "0");
        assert!(matches!(tokens[8].kind, TokenKind::Semicolon));
        assert!(matches!(tokens[9].kind, TokenKind::RBrace));
        assert!(matches!(tokens[10].kind, TokenKind::EndOfFile));
        assert_eq!(tokens.len(), 11);
    }

    #[test]
    fn test_columns() {
        let (tokens, _) = lex("ab := 12;\n  x");
        assert_eq!((tokens[0].line, tokens[0].start, tokens[0].end), (1, 1, 2));
        assert_eq!((tokens[3].start, tokens[3].end), (7, 8));
        assert_eq!((tokens[5].line, tokens[5].start, tokens[5].end), (2, 3, 3));

        let eof = tokens.last().unwrap();
        assert_eq!((eof.line, eof.start, eof.end), (2, 4, 5));
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            kinds("<|= <| << <= <> < |>= |> || |= |"),
            vec![
                TokenKind::LshEquals,
                TokenKind::BitLShift,
                TokenKind::LShift,
                TokenKind::LtEquals,
                TokenKind::Swap,
                TokenKind::LessThan,
                TokenKind::RshEquals,
                TokenKind::BitRShift,
                TokenKind::Or,
                TokenKind::OrEquals,
                TokenKind::BitOr,
                TokenKind::EndOfFile,
            ]
        );
        assert_eq!(
            kinds("=== == = >< -> :: [] ..."),
            vec![
                TokenKind::TripleEquals,
                TokenKind::EqualsEquals,
                TokenKind::Equals,
                TokenKind::BitXor,
                TokenKind::Pointer,
                TokenKind::ColonColon,
                TokenKind::ArrayBracket,
                TokenKind::TripleDot,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let (tokens, diagnostics) = lex("#!/usr/bin/fux\nx // note\n/* a\nb */ y");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens.len(), 3);
        assert_eq!((tokens[0].text.as_str(), tokens[0].line), ("x", 2));
        assert_eq!((tokens[1].text.as_str(), tokens[1].line, tokens[1].start), ("y", 4, 6));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (tokens, diagnostics) = lex("x /* never closed");
        assert_eq!(tokens.len(), 2);
        let diag = diagnostics.iter().next().expect("diagnostic");
        assert_eq!(diag.kind, ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_numbers() {
        let (tokens, diagnostics) = lex("0x1F 0o17 0b101 1_000 3.14 .5 2e10 1e-3");
        assert!(diagnostics.is_empty());

        let got: Vec<(TokenKind, &str)> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (TokenKind::Hexadecimal, "0x1F"),
                (TokenKind::Octal, "0o17"),
                (TokenKind::Binary, "0b101"),
                (TokenKind::Number, "1000"),
                (TokenKind::Float, "3.14"),
                (TokenKind::Float, ".5"),
                (TokenKind::Number, "2e10"),
                (TokenKind::Number, "1e-3"),
                (TokenKind::EndOfFile, "EOF"),
            ]
        );
    }

    #[test]
    fn test_sign_without_exponent_ends_number() {
        assert_eq!(
            kinds("1+2"),
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::EndOfFile
            ]
        );
    }

    #[test]
    fn test_sign_after_exponent_digits_ends_number() {
        let (tokens, diagnostics) = lex("1e5-3 2.5E+2+1");
        assert!(diagnostics.is_empty());

        let texts: Vec<(TokenKind, &str)> =
            tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            texts,
            vec![
                (TokenKind::Number, "1e5"),
                (TokenKind::Minus, "-"),
                (TokenKind::Number, "3"),
                (TokenKind::Float, "2.5E+2"),
                (TokenKind::Plus, "+"),
                (TokenKind::Number, "1"),
                (TokenKind::EndOfFile, "EOF"),
            ]
        );
    }

    #[test]
    fn test_range_between_numbers() {
        assert_eq!(
            kinds("3..5"),
            vec![
                TokenKind::Number,
                TokenKind::DoubleDot,
                TokenKind::Number,
                TokenKind::EndOfFile
            ]
        );
    }

    #[test]
    fn test_malformed_numbers() {
        for src in ["0x", "0b", "0o;", "1e", "1e+", "1ee2", "1e+-2"] {
            let (tokens, diagnostics) = lex(src);
            assert_eq!(
                diagnostics.iter().next().map(|d| d.kind),
                Some(ErrorKind::IllegalNumberFormat),
                "no diagnostic for {:?}",
                src
            );
            assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfFile));
        }
    }

    #[test]
    fn test_strings_keep_escapes_raw() {
        let (tokens, diagnostics) = lex(r#""hello\nworld\\""#);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, r"hello\nworld\\");
    }

    #[test]
    fn test_string_errors() {
        let (_, diagnostics) = lex("\"abc\nx");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics
            .iter()
            .all(|d| d.kind == ErrorKind::IllegalStringLiteralFormat));

        let (tokens, diagnostics) = lex(r#""a\1b" x"#);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(tokens[0].text, "ab");
        assert_eq!(tokens[1].text, "x");
    }

    #[test]
    fn test_char_literals() {
        let (tokens, diagnostics) = lex(r"'a' '\n'");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].text, "a");
        assert_eq!(tokens[1].text, r"\n");

        let (_, diagnostics) = lex("'ab'");
        assert_eq!(
            diagnostics.iter().next().map(|d| d.kind),
            Some(ErrorKind::IllegalCharLiteralFormat)
        );
    }

    #[test]
    fn test_identifiers() {
        let (tokens, diagnostics) = lex("_x");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Identifier);

        let (_, diagnostics) = lex("__");
        assert_eq!(diagnostics.iter().next().map(|d| d.kind), Some(ErrorKind::Generic));
    }

    #[test]
    fn test_unknown_character_is_skipped() {
        let (tokens, diagnostics) = lex("a $ b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            diagnostics.iter().next().map(|d| d.kind),
            Some(ErrorKind::UnknownCharacter)
        );
    }
}
