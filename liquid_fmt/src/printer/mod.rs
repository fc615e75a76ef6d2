mod children;
mod element;
mod liquid;
mod markup;

use crate::{
    ast::*,
    ctx::{Ctx, Hints},
    helpers,
};
use std::borrow::Cow;
use tiny_pretty::Doc;

pub(super) trait DocGen<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>;
}

impl<'s> DocGen<'s> for NodeId {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let document = ctx.document;
        let node = document.node(*self);
        if is_ignored(ctx, node) {
            return Doc::list(reflow_raw(document.text(*self)).collect());
        }

        match &node.kind {
            NodeKind::Document { children } => {
                if children.is_empty() {
                    Doc::nil()
                } else {
                    children::children_list(*self, children, ctx)
                        .group()
                        .append(Doc::hard_line())
                }
            }
            NodeKind::Text { value } => text(*value),
            NodeKind::YamlFrontmatter { body } => Doc::text("---")
                .concat(reflow_raw(*body))
                .append(Doc::text("---")),
            NodeKind::HtmlComment { body } => Doc::text("<!--")
                .concat(reflow_raw(*body))
                .append(Doc::text("-->")),
            NodeKind::HtmlDoctype { legacy } => {
                let legacy = legacy.trim();
                if legacy.eq_ignore_ascii_case("html") {
                    Doc::text("<!DOCTYPE html>")
                } else {
                    Doc::text(format!("<!DOCTYPE {legacy}>"))
                }
            }
            NodeKind::HtmlElement { .. } => element::element(*self, ctx),
            NodeKind::HtmlVoidElement { .. } | NodeKind::HtmlSelfClosingElement { .. } => {
                element::childless_element(*self, ctx)
            }
            NodeKind::HtmlRawNode { .. } => element::raw_node(*self, ctx),
            NodeKind::LiquidTag(tag) => liquid::tag(*self, tag, ctx),
            // branches are laid out by their tag
            NodeKind::LiquidBranch(..) => Doc::list(reflow_raw(document.text(*self)).collect()),
            NodeKind::LiquidRawTag { .. } => liquid::raw_tag(*self, ctx),
            NodeKind::LiquidDrop { markup, delimiter } => liquid::drop(markup, *delimiter, ctx),
            NodeKind::AttrSingleQuoted { .. }
            | NodeKind::AttrDoubleQuoted { .. }
            | NodeKind::AttrUnquoted { .. }
            | NodeKind::AttrEmpty { .. } => {
                Doc::list(reflow_owned(&element::attribute(*self, ctx)).collect())
            }
        }
    }
}

/// Nodes right after an ignore comment keep their source.
fn is_ignored<E, F>(ctx: &Ctx<'_, '_, E, F>, node: &Node<'_>) -> bool
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    node.facts
        .prev
        .is_some_and(|prev| match &ctx.document.node(prev).kind {
            NodeKind::HtmlComment { body } => ctx.is_ignore_directive(body),
            NodeKind::LiquidTag(LiquidTag {
                name: "#",
                markup: LiquidMarkup::Base(markup),
                ..
            }) => ctx.is_ignore_directive(markup),
            _ => false,
        })
}

/// Words filled up to the print width. Blank lines between paragraphs survive.
fn text(value: &str) -> Doc<'_> {
    let mut docs = Vec::new();
    let mut rest = value;
    loop {
        let word_end = rest
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        docs.push(Doc::text(&rest[..word_end]));
        let after = &rest[word_end..];
        let next = after.trim_start_matches(|c: char| c.is_ascii_whitespace());
        if next.is_empty() {
            break;
        }
        let whitespace = &after[..after.len() - next.len()];
        docs.push(if helpers::count_line_breaks(whitespace) > 1 {
            blank_line()
        } else {
            Doc::soft_line()
        });
        rest = next;
    }
    Doc::list(docs)
}

fn has_blank_line(value: &str) -> bool {
    value
        .split(|c: char| !c.is_ascii_whitespace())
        .any(|whitespace| helpers::count_line_breaks(whitespace) > 1)
}

fn blank_line() -> Doc<'static> {
    Doc::empty_line().append(Doc::hard_line())
}

fn reflow_raw(s: &str) -> impl Iterator<Item = Doc<'_>> {
    itertools::intersperse(
        s.split('\n')
            .map(|s| Doc::text(s.strip_suffix('\r').unwrap_or(s))),
        Doc::empty_line(),
    )
}

fn reflow_owned(s: &str) -> impl Iterator<Item = Doc<'static>> + '_ {
    itertools::intersperse(
        s.split('\n')
            .map(|s| Doc::text(s.strip_suffix('\r').unwrap_or(s).to_owned())),
        Doc::empty_line(),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Trim marker added where the printer may introduce whitespace that
/// wasn't in the source.
enum Synth {
    None,
    /// Only when the enclosing group breaks.
    OnBreak,
    Always,
}

fn trim_marker(original: bool, synth: Synth) -> Doc<'static> {
    if original {
        return Doc::text("-");
    }
    match synth {
        Synth::None => Doc::nil(),
        Synth::OnBreak => Doc::flat_or_break(Doc::nil(), Doc::text("-")),
        Synth::Always => Doc::text("-"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print(doc: &Doc<'_>, width: usize) -> String {
        tiny_pretty::print(
            doc,
            &tiny_pretty::PrintOptions {
                width,
                ..Default::default()
            },
        )
    }

    #[test]
    fn text_fills_width() {
        assert_eq!(print(&text("aa  bb\ncc"), 80), "aa bb cc");
        assert_eq!(print(&text("aa bb cc").group(), 5), "aa bb\ncc");
    }

    #[test]
    fn text_keeps_paragraphs() {
        assert_eq!(print(&text("a\n\n\nb"), 80), "a\n\nb");
        assert!(has_blank_line("a\n \n b"));
        assert!(!has_blank_line("a\n b"));
    }

    #[test]
    fn synthesized_trim_marker_follows_group() {
        let doc = Doc::text("{% if a ")
            .append(trim_marker(false, Synth::OnBreak))
            .append(Doc::text("%}"))
            .append(Doc::line_or_nil())
            .append(Doc::text("b"));
        assert_eq!(print(&doc.clone().group(), 80), "{% if a %}b");
        assert_eq!(print(&doc.group(), 5), "{% if a -%}\nb");
    }
}
