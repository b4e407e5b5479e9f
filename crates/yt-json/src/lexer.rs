use logos::Logos;

/// Raw JSON lexeme. Borrows from the source; strings and numbers are decoded
/// by the cursor only when it hands them out.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum Lexeme {
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    #[regex(r#""([^"\\\x00-\x1F]|\\["\\/bfnrt]|\\u[0-9a-fA-F]{4})*""#)]
    Str,

    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
}

impl Lexeme {
    /// Short human-readable name used in error messages.
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Lexeme::LBrace => "'{'",
            Lexeme::RBrace => "'}'",
            Lexeme::LBracket => "'['",
            Lexeme::RBracket => "']'",
            Lexeme::Colon => "':'",
            Lexeme::Comma => "','",
            Lexeme::True | Lexeme::False => "boolean",
            Lexeme::Null => "null",
            Lexeme::Str => "string",
            Lexeme::Number => "number",
        }
    }
}
