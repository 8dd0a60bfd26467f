//! Property-based tests for the lexer and parser.
//!
//! 1. **Lexer never panics** and always ends the stream with exactly one EOF
//! 2. **Token columns are well formed**: `start <= end`, lines never decrease
//! 3. **Lexer is deterministic**
//! 4. **Parser is total**: any token stream yields a tree, and every
//!    diagnostic renders

use proptest::prelude::*;

use fuxc::diagnostics::{DiagnosticEngine, ReportFilter};
use fuxc::parser::{Lexer, Parser, Token, TokenKind};

/// Fragments of valid and broken Fux glued together by the generators.
const FRAGMENTS: &[&str] = &[
    "main(): i32 {", "}", "{", "(", ")", "[", "]", "[]", ";", ",", "x", "y1", "_",
    ": i32", "-> *u8", ":=", "===", "<|=", "<>", "><", "0x", "0x1F", "0b2", "1e",
    "3..5", "1...", ".5", "'a'", "'", "\"s\\n\"", "\"open", "/*", "*/", "//",
    "if", "else", "for", "in", "while", "do", "async", "return", "puts", "\n",
    " ", "+", "++", "?", "&", "*", "(i32)", "18446744073709551616",
];

fn lex(source: &str) -> (Vec<Token>, DiagnosticEngine) {
    let mut diagnostics = DiagnosticEngine::new("prop.fux", source);
    let tokens = Lexer::new(source, &mut diagnostics).lex();
    (tokens, diagnostics)
}

fn fux_like() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40)
        .prop_map(|parts| parts.join(" "))
}

proptest! {
    #[test]
    fn lexer_ends_with_single_eof(input in "\\PC{0,300}") {
        let (tokens, _) = lex(&input);
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::EndOfFile).count();
        prop_assert_eq!(eofs, 1);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfFile));
    }

    #[test]
    fn token_columns_well_formed(input in "[ -~\\n\\t]{0,300}") {
        let (tokens, _) = lex(&input);
        for token in &tokens {
            prop_assert!(token.start <= token.end, "{:?}", token);
            prop_assert!(token.line >= 1);
        }
        for window in tokens.windows(2) {
            prop_assert!(window[0].line <= window[1].line, "{:?}", window);
        }
    }

    #[test]
    fn lexer_is_deterministic(input in fux_like()) {
        let (first, _) = lex(&input);
        let (second, _) = lex(&input);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn parser_is_total(input in fux_like()) {
        let (tokens, mut diagnostics) = lex(&input);
        let _root = Parser::new(tokens, &mut diagnostics).parse();

        let mut out = Vec::new();
        let written = diagnostics
            .report_all(&mut out, ReportFilter::default(), true)
            .unwrap();
        prop_assert_eq!(written, diagnostics.len());
    }

    #[test]
    fn parser_survives_arbitrary_text(input in "\\PC{0,200}") {
        let (tokens, mut diagnostics) = lex(&input);
        let _root = Parser::new(tokens, &mut diagnostics).parse();
    }
}
