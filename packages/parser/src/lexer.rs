//! Line lexer using logos
//!
//! Lexes the content of a single source line. Whitespace is kept as a token
//! so that the pieces concatenate back to the original line.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token<'src> {
    #[regex(r"[ \t]+")]
    Whitespace,

    // Keywords that open a control block
    #[token("if")]
    #[token("elif")]
    #[token("else")]
    #[token("while")]
    #[token("for")]
    #[token("def")]
    #[token("class")]
    Control,

    #[token("return")]
    Return,

    // Keywords that stay plain text
    #[token("and")]
    #[token("or")]
    #[token("not")]
    #[token("in")]
    #[token("is")]
    #[token("pass")]
    #[token("break")]
    #[token("continue")]
    #[token("lambda")]
    #[token("import")]
    #[token("from")]
    Keyword,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    /// Placeholder for an intentionally empty socket
    #[token("``")]
    EmptySocket,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[token("=")]
    Assign,

    #[regex(r"==|!=|<=|>=|\*\*|//|->|[+\-*/%]=|[+\-*/%<>!&|^~.,:;\[\]{}@]")]
    Operator,

    #[regex(r"#[^\n]*")]
    Comment,
}

impl Token<'_> {
    /// Literal tokens become sockets
    pub fn is_literal(&self) -> bool {
        matches!(self, Token::Ident(_) | Token::Number(_) | Token::String(_))
    }
}

/// A token with its byte range in the line
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub text: &'src str,
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// Byte offset in the line
    pub start: usize,
    pub text: String,
}

/// Lex one line, stopping at the first character no rule accepts
pub fn lex_line(line: &str) -> Result<Vec<SpannedToken<'_>>, LexError> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push(SpannedToken {
                token,
                text: lexer.slice(),
                start: span.start,
            }),
            Err(_) => {
                return Err(LexError {
                    start: span.start,
                    text: lexer.slice().to_string(),
                })
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<Token<'_>> {
        lex_line(line).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_lex_assignment() {
        assert_eq!(
            kinds("x = 1"),
            vec![
                Token::Ident("x"),
                Token::Whitespace,
                Token::Assign,
                Token::Whitespace,
                Token::Number("1"),
            ]
        );
    }

    #[test]
    fn test_keywords_beat_identifiers() {
        assert_eq!(kinds("if")[0], Token::Control);
        assert_eq!(kinds("iffy")[0], Token::Ident("iffy"));
        assert_eq!(kinds("return")[0], Token::Return);
    }

    #[test]
    fn test_equality_is_not_assignment() {
        assert_eq!(kinds("==")[0], Token::Operator);
        assert_eq!(kinds("+=")[0], Token::Operator);
    }

    #[test]
    fn test_strings_and_placeholders() {
        assert_eq!(kinds(r#""a b""#), vec![Token::String(r#""a b""#)]);
        assert_eq!(kinds("``"), vec![Token::EmptySocket]);
    }

    #[test]
    fn test_lex_error_reports_offset() {
        let err = lex_line("x = $").unwrap_err();
        assert_eq!(err.start, 4);
        assert_eq!(err.text, "$");
    }
}
