#![doc = include_str!("../README.md")]

pub mod ast;
pub mod augment;
pub mod config;
mod ctx;
mod error;
mod helpers;
mod parser;
mod printer;

use crate::{
    ast::{Document, LiquidMarkup, LiquidTag, NodeKind},
    config::FormatOptions,
    ctx::Ctx,
    printer::DocGen,
};
pub use crate::{
    ctx::Hints,
    error::*,
    parser::{ParseMode, parse},
};
use std::{borrow::Cow, path::Path};
use tiny_pretty::{IndentKind, PrintOptions};

/// Format the given Liquid template.
///
/// An external formatter is required for formatting code inside `<script>`,
/// `<style>`, `{% javascript %}`, `{% stylesheet %}` or `{% schema %}`.
/// If you don't need to format them or you don't have available formatters,
/// you can pass a closure that returns the original code. (see example below)
///
/// ```
/// use liquid_fmt::format_text;
///
/// let code = r#"
/// <ul>
///   {%for product in collection.products%}<li>{{product.title|upcase}}</li>{%endfor%}
/// </ul>"#;
///
/// let formatted = format_text(
///     code,
///     &Default::default(),
///     |code, _| Ok::<_, std::convert::Infallible>(code.into()),
/// ).unwrap();
/// assert!(formatted.contains("{{ product.title | upcase }}"));
/// ```
///
/// For the external formatter closure,
///
/// - The first argument is code that needs formatting.
/// - The second argument is hints which contains useful information for external formatters,
///   such as the language of the code and print width.
pub fn format_text<E, F>(
    code: &str,
    options: &FormatOptions,
    external_formatter: F,
) -> Result<String, FormatError<E>>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let mut document = parse(code, ParseMode::Strict)?;

    if document
        .children()
        .first()
        .is_some_and(|child| starts_with_ignore_file_directive(&document, *child, options))
    {
        return Ok(code.into());
    }

    augment::augment(&mut document, options.language.whitespace_sensitivity);

    let mut ctx = Ctx {
        document: &document,
        options: &options.language,
        indent_width: options.layout.indent_width,
        print_width: options.layout.print_width,
        indent_level: 0,
        attr_quote: None,
        external_formatter,
        external_formatter_error: None,
    };

    let doc = Document::ROOT.doc(&mut ctx);
    if let Some(error) = ctx.external_formatter_error {
        return Err(FormatError::External(error));
    }

    Ok(tiny_pretty::print(
        &doc,
        &PrintOptions {
            indent_kind: if options.layout.use_tabs {
                IndentKind::Tab
            } else {
                IndentKind::Space
            },
            line_break: options.layout.line_break.clone().into(),
            width: options.layout.print_width,
            tab_size: options.layout.indent_width,
        },
    ))
}

fn starts_with_ignore_file_directive(
    document: &Document<'_>,
    id: ast::NodeId,
    options: &FormatOptions,
) -> bool {
    let text = match &document.node(id).kind {
        NodeKind::HtmlComment { body } => *body,
        NodeKind::LiquidRawTag {
            name: "comment",
            body,
            ..
        } => body.value,
        NodeKind::LiquidTag(LiquidTag {
            name: "#",
            markup: LiquidMarkup::Base(markup),
            ..
        }) => *markup,
        _ => return false,
    };
    text.trim_start()
        .strip_prefix(&options.language.ignore_file_comment_directive)
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_whitespace()) || rest.is_empty())
}

/// Check whether the file is a Liquid template by its extension.
pub fn is_liquid_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case("liquid"))
}
