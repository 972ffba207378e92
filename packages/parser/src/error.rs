use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Lines and columns are 1-based
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unbalanced parenthesis at {line}:{column}")]
    UnbalancedParen { line: usize, column: usize },

    #[error("Inconsistent indentation on line {line}")]
    InconsistentIndent { line: usize },

    #[error("Unexpected input at {line}:{column}: {text:?}")]
    Lex {
        line: usize,
        column: usize,
        text: String,
    },
}

impl ParseError {
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn unbalanced_paren(line: usize, column: usize) -> Self {
        Self::UnbalancedParen { line, column }
    }

    pub fn inconsistent_indent(line: usize) -> Self {
        Self::InconsistentIndent { line }
    }

    pub fn lex(line: usize, column: usize, text: impl Into<String>) -> Self {
        Self::Lex {
            line,
            column,
            text: text.into(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. }
            | Self::UnbalancedParen { line, .. }
            | Self::InconsistentIndent { line }
            | Self::Lex { line, .. } => *line,
        }
    }

    /// Column, when the error points inside a line
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Syntax { column, .. } | Self::UnbalancedParen { column, .. } | Self::Lex { column, .. } => {
                Some(*column)
            }
            Self::InconsistentIndent { .. } => None,
        }
    }
}
