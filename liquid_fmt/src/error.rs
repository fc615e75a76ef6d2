use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, Error)]
#[error("syntax error '{reason}' at position {pos}")]
/// The grammar couldn't derive a parse for the whole input.
///
/// `pos` is the rightmost position the matcher could reach.
pub struct GrammarError {
    pub reason: String,
    pub pos: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A node that was still open when a structural error was raised.
pub struct OpenNode {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructuralErrorKind {
    /// A closer whose name or kind doesn't match the innermost open node.
    Mismatched { closer: String },
    /// A closer was found while nothing was open.
    ClosedBeforeOpened { closer: String },
    /// Input ended while a node was still open.
    Unterminated,
}

#[derive(Clone, Debug, Error)]
/// Grammar succeeded but tags are not nested properly.
pub struct StructuralError {
    pub kind: StructuralErrorKind,
    /// Range of the offending construct.
    pub start: usize,
    pub end: usize,
    pub open: Option<OpenNode>,
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.open) {
            (StructuralErrorKind::Mismatched { closer }, Some(open)) => write!(
                f,
                "attempting to close '{closer}' before '{}' was closed",
                open.name
            ),
            (StructuralErrorKind::Mismatched { closer }, None)
            | (StructuralErrorKind::ClosedBeforeOpened { closer }, _) => {
                write!(f, "attempting to close '{closer}' before it was opened")
            }
            (StructuralErrorKind::Unterminated, Some(open)) => write!(
                f,
                "attempting to end parsing before '{}' was closed",
                open.name
            ),
            (StructuralErrorKind::Unterminated, None) => f.write_str("unexpected end of input"),
        }
    }
}

#[derive(Clone, Debug, Error)]
/// Any failure of the parsing stages.
pub enum ParseError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl ParseError {
    /// Byte range that the error points at.
    pub fn range(&self) -> (usize, usize) {
        match self {
            ParseError::Grammar(error) => (error.pos, error.pos),
            ParseError::Structural(error) => (error.start, error.end),
        }
    }

    /// Build a diagnostic with line/column positions and a source excerpt.
    pub fn diagnostic(&self, source: &str) -> Diagnostic {
        let (start, end) = self.range();
        let start_pos = LineCol::from_offset(source, start);
        let end_pos = LineCol::from_offset(source, end.max(start));
        let line_start = source[..start.min(source.len())]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let line_end = source[start.min(source.len())..]
            .find('\n')
            .map_or(source.len(), |i| start + i);
        Diagnostic {
            message: self.to_string(),
            excerpt: source[line_start..line_end].trim_end_matches('\r').to_owned(),
            start: start_pos,
            end: end_pos,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// 1-based line and column. Columns count characters, not bytes.
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

impl LineCol {
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut col = 1;
        for (i, ch) in source.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        LineCol { line, col }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub excerpt: String,
    pub start: LineCol,
    pub end: LineCol,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = " ".repeat(self.start.col.saturating_sub(1))
            + &"^".repeat(if self.end.line == self.start.line {
                self.end.col.saturating_sub(self.start.col).max(1)
            } else {
                1
            });
        write!(
            f,
            "{}\n --> {}:{}\n  |\n  | {}\n  | {pointer}",
            self.message, self.start.line, self.start.col, self.excerpt
        )
    }
}

#[derive(Debug, Error)]
/// The error type for liquid_fmt.
pub enum FormatError<E> {
    /// Grammar or structural error when parsing the document.
    #[error(transparent)]
    Syntax(#[from] ParseError),
    /// Error from external formatter, for example,
    /// there're errors when formatting the `<script>` or `<style>` tag.
    #[error("failed to format code with external formatter:\n{0}")]
    External(E),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_chars() {
        let source = "ab\nçd\n";
        assert_eq!(LineCol::from_offset(source, 0), LineCol { line: 1, col: 1 });
        assert_eq!(LineCol::from_offset(source, 3), LineCol { line: 2, col: 1 });
        // `ç` is two bytes
        assert_eq!(LineCol::from_offset(source, 5), LineCol { line: 2, col: 2 });
    }

    #[test]
    fn diagnostic_excerpt_is_the_offending_line() {
        let source = "<p>\n  <a><div></a>\n</p>";
        let error = ParseError::Structural(StructuralError {
            kind: StructuralErrorKind::Mismatched {
                closer: "a".into(),
            },
            start: 14,
            end: 18,
            open: Some(OpenNode {
                name: "div".into(),
                start: 9,
                end: 14,
            }),
        });
        let diagnostic = error.diagnostic(source);
        assert_eq!(diagnostic.excerpt, "  <a><div></a>");
        assert_eq!(diagnostic.start, LineCol { line: 2, col: 11 });
        assert_eq!(diagnostic.end, LineCol { line: 2, col: 15 });
        assert_eq!(
            diagnostic.message,
            "attempting to close 'a' before 'div' was closed"
        );
    }
}
