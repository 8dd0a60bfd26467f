//! Diagnostic taxonomy
//!
//! [`ErrorKind`] names every class of problem the lexer and parser can report.
//! The numeric code printed in a diagnostic head (`[E5]`) is the variant's
//! discriminant, so new kinds must only ever be appended.

use std::fmt;

/// Every class of problem the front end can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownError = 0,
    Generic,
    UnknownCharacter,
    IllegalCharLiteralFormat,
    IllegalStringLiteralFormat,
    IllegalNumberFormat,
    UnexpectedEof,
    UnexpectedToken,
    MissingParen,
    IllegalType,
    IllegalOperands,
}

impl ErrorKind {
    /// Numeric code shown as `E<code>` in the rendered head line.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human readable name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::UnknownError => "Unknown Error",
            ErrorKind::Generic => "Generic Error",
            ErrorKind::UnknownCharacter => "Unknown Character",
            ErrorKind::IllegalCharLiteralFormat => "Illegal Char Literal Format",
            ErrorKind::IllegalStringLiteralFormat => "Illegal String Literal Format",
            ErrorKind::IllegalNumberFormat => "Illegal Number Format",
            ErrorKind::UnexpectedEof => "Unexpected End Of File",
            ErrorKind::UnexpectedToken => "Unexpected Token",
            ErrorKind::MissingParen => "Missing Paren",
            ErrorKind::IllegalType => "Illegal Type",
            ErrorKind::IllegalOperands => "Illegal Operands",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State and severity markers attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// The diagnostic has been rendered; it will not be rendered again.
    Reported,
    /// Rendered as `[warning]`; does not fail the file.
    Warning,
    /// Only meaningful under a stricter mode; filtering is the caller's concern.
    Aggressive,
    /// A reference span is attached and rendered after the subject.
    HasReference,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_declaration_order() {
        assert_eq!(ErrorKind::UnknownError.code(), 0);
        assert_eq!(ErrorKind::Generic.code(), 1);
        assert_eq!(ErrorKind::IllegalNumberFormat.code(), 5);
        assert_eq!(ErrorKind::MissingParen.code(), 8);
        assert_eq!(ErrorKind::IllegalOperands.code(), 10);
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(ErrorKind::MissingParen.to_string(), "Missing Paren");
    }
}
