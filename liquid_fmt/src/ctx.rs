use crate::{
    ast::{Document, RawKind},
    config::LanguageOptions,
};
use std::borrow::Cow;
use tiny_pretty::Doc;

/// Information handed to the external formatter together with the code.
#[derive(Clone, Copy, Debug)]
pub struct Hints {
    /// Language of the embedded code.
    pub kind: RawKind,
    /// Width left for the embedded code once the surrounding indentation is taken.
    pub print_width: usize,
    pub indent_width: usize,
}

pub(crate) struct Ctx<'b, 's, E, F>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    pub(crate) document: &'b Document<'s>,
    pub(crate) options: &'b LanguageOptions,
    pub(crate) indent_width: usize,
    pub(crate) print_width: usize,
    pub(crate) indent_level: usize,
    /// Quote of the attribute value being printed, if any.
    pub(crate) attr_quote: Option<char>,
    pub(crate) external_formatter: F,
    pub(crate) external_formatter_error: Option<E>,
}

impl<'s, E, F> Ctx<'_, 's, E, F>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    /// Build a doc one indentation level deeper and nest it.
    pub(crate) fn indented(&mut self, build: impl FnOnce(&mut Self) -> Doc<'s>) -> Doc<'s> {
        self.indent_level += self.indent_width;
        let doc = build(self);
        self.indent_level -= self.indent_width;
        doc.nest(self.indent_width)
    }

    /// Format embedded code, keeping it unchanged when the formatter fails.
    pub(crate) fn format_raw<'a>(&mut self, code: &'a str, kind: RawKind, indent: bool) -> Cow<'a, str> {
        let hints = Hints {
            kind,
            print_width: self
                .print_width
                .saturating_sub(self.indent_level)
                .saturating_sub(if indent { self.indent_width } else { 0 }),
            indent_width: self.indent_width,
        };
        match (self.external_formatter)(code, hints) {
            Ok(code) => code,
            Err(e) => {
                log::warn!("external formatter failed on {} code", kind.extension());
                self.external_formatter_error = Some(e);
                code.into()
            }
        }
    }

    pub(crate) fn is_ignore_directive(&self, text: &str) -> bool {
        text.trim() == self.options.ignore_comment_directive
    }
}
