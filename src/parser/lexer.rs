//! Lexer for the visual format language using logos

use std::fmt;

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Orientation prefixes
    #[token("H:")]
    Horizontal,
    #[token("V:")]
    Vertical,

    /// Superview edge
    #[token("|")]
    Pipe,
    #[token("-")]
    Dash,

    // Delimiters
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token("@")]
    At,

    // Relations
    #[token("==")]
    Equal,
    #[token(">=")]
    GreaterOrEqual,
    #[token("<=")]
    LessOrEqual,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Horizontal => write!(f, "'H:'"),
            Token::Vertical => write!(f, "'V:'"),
            Token::Pipe => write!(f, "'|'"),
            Token::Dash => write!(f, "'-'"),
            Token::BracketOpen => write!(f, "'['"),
            Token::BracketClose => write!(f, "']'"),
            Token::ParenOpen => write!(f, "'('"),
            Token::ParenClose => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::At => write!(f, "'@'"),
            Token::Equal => write!(f, "'=='"),
            Token::GreaterOrEqual => write!(f, "'>='"),
            Token::LessOrEqual => write!(f, "'<='"),
            Token::Ident(s) => write!(f, "name '{}'", s),
            Token::Number(n) => write!(f, "number {}", n),
        }
    }
}

/// Lex a format string into tokens with spans
///
/// Fails with the span of the first character no token starts with.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(t) => Ok((t, span)),
            Err(()) => Err(span),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_orientation_and_edges() {
        assert_eq!(
            tokens("H:|-[a]-|"),
            vec![
                Token::Horizontal,
                Token::Pipe,
                Token::Dash,
                Token::BracketOpen,
                Token::Ident("a".to_string()),
                Token::BracketClose,
                Token::Dash,
                Token::Pipe,
            ]
        );
    }

    #[test]
    fn test_view_named_like_orientation() {
        assert_eq!(
            tokens("[H]"),
            vec![
                Token::BracketOpen,
                Token::Ident("H".to_string()),
                Token::BracketClose
            ]
        );
    }

    #[test]
    fn test_predicate_tokens() {
        assert_eq!(
            tokens("(>=40@750, <=l1)"),
            vec![
                Token::ParenOpen,
                Token::GreaterOrEqual,
                Token::Number(40.0),
                Token::At,
                Token::Number(750.0),
                Token::Comma,
                Token::LessOrEqual,
                Token::Ident("l1".to_string()),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("30 2.5"),
            vec![Token::Number(30.0), Token::Number(2.5)]
        );
    }

    #[test]
    fn test_whitespace_skipped() {
        assert_eq!(tokens(" V: | [a] "), tokens("V:|[a]"));
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(lex("H:|-[a]+|"), Err(7..8));
    }

    #[test]
    fn test_single_equals_is_an_error() {
        assert!(lex("[a(=10)]").is_err());
    }
}
