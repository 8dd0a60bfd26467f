//! Tokens produced by the [`Lexer`](super::lexer::Lexer)
//!
//! A [`Token`] keeps the exact text it was scanned from (minus `_` digit
//! separators and string quotes) together with its line and column range, so
//! every diagnostic and AST node can be traced back to the source.

use std::fmt;

use super::ast::{Access, Inbuilt, Position, TypeKind};

/// Every kind of token the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    LParen,       // (
    RParen,       // )
    LBrace,       // {
    RBrace,       // }
    LBracket,     // [
    RBracket,     // ]
    ArrayBracket, // []
    Colon,        // :
    ColonColon,   // ::
    Semicolon,    // ;
    Dot,          // .
    DoubleDot,    // ..
    TripleDot,    // ...
    Comma,        // ,
    At,           // @
    Hash,         // #
    Question,     // ?
    Exclamation,  // !

    // Operators
    Equals,         // =
    EqualsEquals,   // ==
    TripleEquals,   // ===
    NotEquals,      // !=
    LessThan,       // <
    LtEquals,       // <=
    GreaterThan,    // >
    GtEquals,       // >=
    LShift,         // <<
    RShift,         // >>
    Swap,           // <>
    BitLShift,      // <|
    BitRShift,      // |>
    LshEquals,      // <|=
    RshEquals,      // |>=
    BitXor,         // ><
    Plus,           // +
    PlusPlus,       // ++
    PlusEquals,     // +=
    Minus,          // -
    MinusMinus,     // --
    MinusEquals,    // -=
    Pointer,        // ->
    Asterisk,       // *
    AsteriskEquals, // *=
    Slash,          // /
    SlashEquals,    // /=
    Caret,          // ^
    CaretEquals,    // ^=
    Percent,        // %
    PercentEquals,  // %=
    BitNot,         // ~
    BitOr,          // |
    Or,             // ||
    OrEquals,       // |=
    BitAnd,         // &
    And,            // &&
    AndEquals,      // &=

    // Literals
    Number,
    Hexadecimal,
    Octal,
    Binary,
    Float,
    Char,
    String,
    Identifier,

    // Keywords
    KeyIf,
    KeyElse,
    KeyFor,
    KeyIn,
    KeyWhile,
    KeyDo,
    KeyAsync,
    KeyTrue,
    KeyFalse,
    KeyNull,

    // Inbuilt calls
    KeyReturn,
    KeyExit,
    KeyBreak,
    KeyContinue,
    KeyDelete,
    KeyPuts,
    KeyPutch,
    KeyRead,
    KeyReadln,
    KeyThrow,

    // Modifiers
    KeyFixed,
    KeyFinal,
    KeyConst,
    KeySafe,
    KeyIntern,
    KeyPublic,

    // Types
    KeyVoid,
    KeyBool,
    KeyI8,
    KeyU8,
    KeyC8,
    KeyI16,
    KeyU16,
    KeyC16,
    KeyI32,
    KeyU32,
    KeyF32,
    KeyI64,
    KeyU64,
    KeyF64,
    KeyStr,
    KeyVar,

    EndOfFile,
}

impl TokenKind {
    /// Words reclassified from `Identifier` by the lexer.
    pub const KEYWORDS: [TokenKind; 42] = [
        TokenKind::KeyIf,
        TokenKind::KeyElse,
        TokenKind::KeyFor,
        TokenKind::KeyIn,
        TokenKind::KeyWhile,
        TokenKind::KeyDo,
        TokenKind::KeyAsync,
        TokenKind::KeyTrue,
        TokenKind::KeyFalse,
        TokenKind::KeyNull,
        TokenKind::KeyReturn,
        TokenKind::KeyExit,
        TokenKind::KeyBreak,
        TokenKind::KeyContinue,
        TokenKind::KeyDelete,
        TokenKind::KeyPuts,
        TokenKind::KeyPutch,
        TokenKind::KeyRead,
        TokenKind::KeyReadln,
        TokenKind::KeyThrow,
        TokenKind::KeyFixed,
        TokenKind::KeyFinal,
        TokenKind::KeyConst,
        TokenKind::KeySafe,
        TokenKind::KeyIntern,
        TokenKind::KeyPublic,
        TokenKind::KeyVoid,
        TokenKind::KeyBool,
        TokenKind::KeyI8,
        TokenKind::KeyU8,
        TokenKind::KeyC8,
        TokenKind::KeyI16,
        TokenKind::KeyU16,
        TokenKind::KeyC16,
        TokenKind::KeyI32,
        TokenKind::KeyU32,
        TokenKind::KeyF32,
        TokenKind::KeyI64,
        TokenKind::KeyU64,
        TokenKind::KeyF64,
        TokenKind::KeyStr,
        TokenKind::KeyVar,
    ];

    /// Upper-case name used in diagnostics (`LPAREN`, `KEY_I32`, ...).
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::ArrayBracket => "ARRAY_BRACKET",
            TokenKind::Colon => "COLON",
            TokenKind::ColonColon => "COLON_COLON",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Dot => "DOT",
            TokenKind::DoubleDot => "DOUBLE_DOT",
            TokenKind::TripleDot => "TRIPLE_DOT",
            TokenKind::Comma => "COMMA",
            TokenKind::At => "AT",
            TokenKind::Hash => "HASH",
            TokenKind::Question => "QUESTION",
            TokenKind::Exclamation => "EXCLAMATION",
            TokenKind::Equals => "EQUALS",
            TokenKind::EqualsEquals => "EQUALS_EQUALS",
            TokenKind::TripleEquals => "TRIPLE_EQUALS",
            TokenKind::NotEquals => "NOT_EQUALS",
            TokenKind::LessThan => "LESSTHAN",
            TokenKind::LtEquals => "LTEQUALS",
            TokenKind::GreaterThan => "GREATERTHAN",
            TokenKind::GtEquals => "GTEQUALS",
            TokenKind::LShift => "LSHIFT",
            TokenKind::RShift => "RSHIFT",
            TokenKind::Swap => "SWAP",
            TokenKind::BitLShift => "BIT_LSHIFT",
            TokenKind::BitRShift => "BIT_RSHIFT",
            TokenKind::LshEquals => "LSH_EQUALS",
            TokenKind::RshEquals => "RSH_EQUALS",
            TokenKind::BitXor => "BIT_XOR",
            TokenKind::Plus => "PLUS",
            TokenKind::PlusPlus => "PLUS_PLUS",
            TokenKind::PlusEquals => "PLUS_EQUALS",
            TokenKind::Minus => "MINUS",
            TokenKind::MinusMinus => "MINUS_MINUS",
            TokenKind::MinusEquals => "MINUS_EQUALS",
            TokenKind::Pointer => "POINTER",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::AsteriskEquals => "ASTERISK_EQUALS",
            TokenKind::Slash => "SLASH",
            TokenKind::SlashEquals => "SLASH_EQUALS",
            TokenKind::Caret => "CARET",
            TokenKind::CaretEquals => "CARET_EQUALS",
            TokenKind::Percent => "PERCENT",
            TokenKind::PercentEquals => "PERCENT_EQUALS",
            TokenKind::BitNot => "BIT_NOT",
            TokenKind::BitOr => "BIT_OR",
            TokenKind::Or => "OR",
            TokenKind::OrEquals => "OR_EQUALS",
            TokenKind::BitAnd => "BIT_AND",
            TokenKind::And => "AND",
            TokenKind::AndEquals => "AND_EQUALS",
            TokenKind::Number => "NUMBER",
            TokenKind::Hexadecimal => "HEXADECIMAL",
            TokenKind::Octal => "OCTAL",
            TokenKind::Binary => "BINARY",
            TokenKind::Float => "FLOAT",
            TokenKind::Char => "CHAR",
            TokenKind::String => "STRING",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::KeyIf => "KEY_IF",
            TokenKind::KeyElse => "KEY_ELSE",
            TokenKind::KeyFor => "KEY_FOR",
            TokenKind::KeyIn => "KEY_IN",
            TokenKind::KeyWhile => "KEY_WHILE",
            TokenKind::KeyDo => "KEY_DO",
            TokenKind::KeyAsync => "KEY_ASYNC",
            TokenKind::KeyTrue => "KEY_TRUE",
            TokenKind::KeyFalse => "KEY_FALSE",
            TokenKind::KeyNull => "KEY_NULL",
            TokenKind::KeyReturn => "KEY_RETURN",
            TokenKind::KeyExit => "KEY_EXIT",
            TokenKind::KeyBreak => "KEY_BREAK",
            TokenKind::KeyContinue => "KEY_CONTINUE",
            TokenKind::KeyDelete => "KEY_DELETE",
            TokenKind::KeyPuts => "KEY_PUTS",
            TokenKind::KeyPutch => "KEY_PUTCH",
            TokenKind::KeyRead => "KEY_READ",
            TokenKind::KeyReadln => "KEY_READLN",
            TokenKind::KeyThrow => "KEY_THROW",
            TokenKind::KeyFixed => "KEY_FIXED",
            TokenKind::KeyFinal => "KEY_FINAL",
            TokenKind::KeyConst => "KEY_CONST",
            TokenKind::KeySafe => "KEY_SAFE",
            TokenKind::KeyIntern => "KEY_INTERN",
            TokenKind::KeyPublic => "KEY_PUBLIC",
            TokenKind::KeyVoid => "KEY_VOID",
            TokenKind::KeyBool => "KEY_BOOL",
            TokenKind::KeyI8 => "KEY_I8",
            TokenKind::KeyU8 => "KEY_U8",
            TokenKind::KeyC8 => "KEY_C8",
            TokenKind::KeyI16 => "KEY_I16",
            TokenKind::KeyU16 => "KEY_U16",
            TokenKind::KeyC16 => "KEY_C16",
            TokenKind::KeyI32 => "KEY_I32",
            TokenKind::KeyU32 => "KEY_U32",
            TokenKind::KeyF32 => "KEY_F32",
            TokenKind::KeyI64 => "KEY_I64",
            TokenKind::KeyU64 => "KEY_U64",
            TokenKind::KeyF64 => "KEY_F64",
            TokenKind::KeyStr => "KEY_STR",
            TokenKind::KeyVar => "KEY_VAR",
            TokenKind::EndOfFile => "EOF",
        }
    }

    /// Canonical source text; empty for literals and identifiers.
    pub fn lexeme(self) -> &'static str {
        match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::ArrayBracket => "[]",
            TokenKind::Colon => ":",
            TokenKind::ColonColon => "::",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::DoubleDot => "..",
            TokenKind::TripleDot => "...",
            TokenKind::Comma => ",",
            TokenKind::At => "@",
            TokenKind::Hash => "#",
            TokenKind::Question => "?",
            TokenKind::Exclamation => "!",
            TokenKind::Equals => "=",
            TokenKind::EqualsEquals => "==",
            TokenKind::TripleEquals => "===",
            TokenKind::NotEquals => "!=",
            TokenKind::LessThan => "<",
            TokenKind::LtEquals => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GtEquals => ">=",
            TokenKind::LShift => "<<",
            TokenKind::RShift => ">>",
            TokenKind::Swap => "<>",
            TokenKind::BitLShift => "<|",
            TokenKind::BitRShift => "|>",
            TokenKind::LshEquals => "<|=",
            TokenKind::RshEquals => "|>=",
            TokenKind::BitXor => "><",
            TokenKind::Plus => "+",
            TokenKind::PlusPlus => "++",
            TokenKind::PlusEquals => "+=",
            TokenKind::Minus => "-",
            TokenKind::MinusMinus => "--",
            TokenKind::MinusEquals => "-=",
            TokenKind::Pointer => "->",
            TokenKind::Asterisk => "*",
            TokenKind::AsteriskEquals => "*=",
            TokenKind::Slash => "/",
            TokenKind::SlashEquals => "/=",
            TokenKind::Caret => "^",
            TokenKind::CaretEquals => "^=",
            TokenKind::Percent => "%",
            TokenKind::PercentEquals => "%=",
            TokenKind::BitNot => "~",
            TokenKind::BitOr => "|",
            TokenKind::Or => "||",
            TokenKind::OrEquals => "|=",
            TokenKind::BitAnd => "&",
            TokenKind::And => "&&",
            TokenKind::AndEquals => "&=",
            TokenKind::Number
            | TokenKind::Hexadecimal
            | TokenKind::Octal
            | TokenKind::Binary
            | TokenKind::Float
            | TokenKind::Char
            | TokenKind::String
            | TokenKind::Identifier => "",
            TokenKind::KeyIf => "if",
            TokenKind::KeyElse => "else",
            TokenKind::KeyFor => "for",
            TokenKind::KeyIn => "in",
            TokenKind::KeyWhile => "while",
            TokenKind::KeyDo => "do",
            TokenKind::KeyAsync => "async",
            TokenKind::KeyTrue => "true",
            TokenKind::KeyFalse => "false",
            TokenKind::KeyNull => "null",
            TokenKind::KeyReturn => "return",
            TokenKind::KeyExit => "exit",
            TokenKind::KeyBreak => "break",
            TokenKind::KeyContinue => "continue",
            TokenKind::KeyDelete => "delete",
            TokenKind::KeyPuts => "puts",
            TokenKind::KeyPutch => "putch",
            TokenKind::KeyRead => "read",
            TokenKind::KeyReadln => "readln",
            TokenKind::KeyThrow => "throw",
            TokenKind::KeyFixed => "fixed",
            TokenKind::KeyFinal => "final",
            TokenKind::KeyConst => "const",
            TokenKind::KeySafe => "safe",
            TokenKind::KeyIntern => "intern",
            TokenKind::KeyPublic => "public",
            TokenKind::KeyVoid => "void",
            TokenKind::KeyBool => "bool",
            TokenKind::KeyI8 => "i8",
            TokenKind::KeyU8 => "u8",
            TokenKind::KeyC8 => "c8",
            TokenKind::KeyI16 => "i16",
            TokenKind::KeyU16 => "u16",
            TokenKind::KeyC16 => "c16",
            TokenKind::KeyI32 => "i32",
            TokenKind::KeyU32 => "u32",
            TokenKind::KeyF32 => "f32",
            TokenKind::KeyI64 => "i64",
            TokenKind::KeyU64 => "u64",
            TokenKind::KeyF64 => "f64",
            TokenKind::KeyStr => "str",
            TokenKind::KeyVar => "var",
            TokenKind::EndOfFile => "EOF",
        }
    }

    /// Integer literal of any base.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TokenKind::Number | TokenKind::Hexadecimal | TokenKind::Octal | TokenKind::Binary
        )
    }

    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Equals
                | TokenKind::PlusEquals
                | TokenKind::MinusEquals
                | TokenKind::AsteriskEquals
                | TokenKind::SlashEquals
                | TokenKind::PercentEquals
                | TokenKind::CaretEquals
                | TokenKind::OrEquals
                | TokenKind::AndEquals
                | TokenKind::LshEquals
                | TokenKind::RshEquals
                | TokenKind::Swap
                | TokenKind::TripleEquals
        )
    }

    /// Builtin type keyword.
    pub fn type_kind(self) -> Option<TypeKind> {
        let kind = match self {
            TokenKind::KeyVoid => TypeKind::Void,
            TokenKind::KeyBool => TypeKind::Bool,
            TokenKind::KeyI8 => TypeKind::I8,
            TokenKind::KeyU8 => TypeKind::U8,
            TokenKind::KeyC8 => TypeKind::C8,
            TokenKind::KeyI16 => TypeKind::I16,
            TokenKind::KeyU16 => TypeKind::U16,
            TokenKind::KeyC16 => TypeKind::C16,
            TokenKind::KeyI32 => TypeKind::I32,
            TokenKind::KeyU32 => TypeKind::U32,
            TokenKind::KeyF32 => TypeKind::F32,
            TokenKind::KeyI64 => TypeKind::I64,
            TokenKind::KeyU64 => TypeKind::U64,
            TokenKind::KeyF64 => TypeKind::F64,
            TokenKind::KeyStr => TypeKind::Str,
            TokenKind::KeyVar => TypeKind::Var,
            _ => return None,
        };
        Some(kind)
    }

    pub fn modifier(self) -> Option<Access> {
        let access = match self {
            TokenKind::KeyFixed => Access::Fixed,
            TokenKind::KeyFinal => Access::Final,
            TokenKind::KeyConst => Access::Constant,
            TokenKind::KeySafe => Access::Safe,
            TokenKind::KeyIntern => Access::Intern,
            TokenKind::KeyPublic => Access::Public,
            _ => return None,
        };
        Some(access)
    }

    pub fn inbuilt(self) -> Option<Inbuilt> {
        let inbuilt = match self {
            TokenKind::KeyReturn => Inbuilt::Return,
            TokenKind::KeyExit => Inbuilt::Exit,
            TokenKind::KeyBreak => Inbuilt::Break,
            TokenKind::KeyContinue => Inbuilt::Continue,
            TokenKind::KeyDelete => Inbuilt::Delete,
            TokenKind::KeyPuts => Inbuilt::Puts,
            TokenKind::KeyPutch => Inbuilt::Putch,
            TokenKind::KeyRead => Inbuilt::Read,
            TokenKind::KeyReadln => Inbuilt::Readln,
            TokenKind::KeyThrow => Inbuilt::Throw,
            _ => return None,
        };
        Some(inbuilt)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scanned lexeme with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    /// First column (1-based).
    pub start: usize,
    /// Last column, inclusive; never below `start`.
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, start: usize, end: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            start,
            end: end.max(start),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn position(&self) -> Position {
        Position::line(self.line, self.start, self.end)
    }

    /// Digits of an integer literal without its base prefix.
    pub fn digits(&self) -> &str {
        match self.kind {
            TokenKind::Hexadecimal | TokenKind::Octal | TokenKind::Binary => {
                self.text.get(2..).unwrap_or("")
            }
            _ => &self.text,
        }
    }

    /// Value of an integer literal in any base.
    ///
    /// `None` for non-integer tokens, decimal literals with an exponent,
    /// literals without digits, and values that do not fit into 64 bits.
    pub fn numeric_value(&self) -> Option<u64> {
        let radix = match self.kind {
            TokenKind::Number => 10,
            TokenKind::Hexadecimal => 16,
            TokenKind::Octal => 8,
            TokenKind::Binary => 2,
            _ => return None,
        };

        let digits: String = self.digits().chars().filter(|&c| c != '_').collect();
        u64::from_str_radix(&digits, radix).ok()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}\t{:<16}'{}'",
            self.line,
            self.start,
            self.end,
            self.kind.name(),
            self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, 1, 1, text.len())
    }

    #[test]
    fn test_numeric_value_by_base() {
        assert_eq!(token(TokenKind::Hexadecimal, "0x1F").numeric_value(), Some(31));
        assert_eq!(token(TokenKind::Octal, "0o17").numeric_value(), Some(15));
        assert_eq!(token(TokenKind::Binary, "0b101").numeric_value(), Some(5));
        assert_eq!(token(TokenKind::Number, "1_000").numeric_value(), Some(1000));
    }

    #[test]
    fn test_numeric_value_rejects_non_integers() {
        assert_eq!(token(TokenKind::Number, "1e5").numeric_value(), None);
        assert_eq!(token(TokenKind::Hexadecimal, "0x").numeric_value(), None);
        assert_eq!(token(TokenKind::Float, "3.14").numeric_value(), None);
        assert_eq!(
            token(TokenKind::Number, "18446744073709551616").numeric_value(),
            None
        );
    }

    #[test]
    fn test_keyword_classification() {
        assert_eq!(TokenKind::KeyConst.modifier(), Some(Access::Constant));
        assert_eq!(TokenKind::KeyReadln.inbuilt(), Some(Inbuilt::Readln));
        assert_eq!(TokenKind::KeyStr.type_kind(), Some(TypeKind::Str));
        assert!(TokenKind::Swap.is_assignment());
    }

    #[test]
    fn test_end_never_precedes_start() {
        let eof = Token::new(TokenKind::EndOfFile, "EOF", 3, 5, 2);
        assert_eq!(eof.position(), Position::line(3, 5, 5));
    }
}
