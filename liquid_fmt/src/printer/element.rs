use super::{
    DocGen,
    children::{self, boundary, is_verbatim},
    liquid, reflow_raw,
};
use crate::{
    ast::*,
    config::Quotes,
    ctx::{Ctx, Hints},
    helpers::{self, UNESCAPING_AC},
};
use std::borrow::Cow;
use tiny_pretty::Doc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttrLayout {
    Fill,
    OnePerLine,
    /// `<link>` tags kept on one line.
    SingleLine,
}

impl AttrLayout {
    fn separator(self) -> Doc<'static> {
        match self {
            AttrLayout::Fill => Doc::line_or_space(),
            AttrLayout::OnePerLine => Doc::hard_line(),
            AttrLayout::SingleLine => Doc::text(" "),
        }
    }

    fn before_close(self, self_closing: bool) -> Doc<'static> {
        match (self, self_closing) {
            (AttrLayout::Fill, false) => Doc::line_or_nil(),
            (AttrLayout::Fill, true) => Doc::line_or_space(),
            (AttrLayout::OnePerLine, _) => Doc::hard_line(),
            (AttrLayout::SingleLine, false) => Doc::nil(),
            (AttrLayout::SingleLine, true) => Doc::text(" "),
        }
    }
}

fn line(forced: bool) -> Doc<'static> {
    if forced {
        Doc::hard_line()
    } else {
        Doc::line_or_nil()
    }
}

pub(super) fn element<'s, E, F>(id: NodeId, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let node = document.node(id);
    let NodeKind::HtmlElement {
        name,
        attributes,
        children,
        block_start,
        block_end,
    } = &node.kind
    else {
        unreachable!("element printer called on another kind of node")
    };
    let name = element_name(name, ctx);
    let (attrs, layout) = attributes_doc(&name, attributes, ctx);
    let open = Doc::text("<").append(Doc::text(name.clone())).append(attrs);
    let close = format!("</{name}");

    if node.facts.is_indentation_sensitive {
        return open
            .append(layout.before_close(false))
            .append(Doc::text(">"))
            .group()
            .concat(reflow_raw(&document.source[block_start.1..block_end.0]))
            .append(Doc::text(close))
            .append(Doc::text(">"));
    }

    let (Some(first), Some(last)) = (children.first(), children.last()) else {
        let facts = &node.facts;
        let dangling = if facts.has_dangling_whitespace && facts.is_dangling_whitespace_sensitive {
            Doc::line_or_space()
        } else {
            Doc::nil()
        };
        return open
            .append(layout.before_close(false))
            .append(Doc::text(">"))
            .group()
            .append(dangling)
            .append(Doc::text(close))
            .append(Doc::text(">"))
            .group();
    };

    let forced = children::is_forced(document, id);
    let first = &document.node(*first).facts;
    let last = &document.node(*last).facts;
    // `>` and `</name` stick to content that can't be separated from them
    let borrow_open = first.is_leading_whitespace_sensitive && !first.has_leading_whitespace;
    let borrow_close = last.is_trailing_whitespace_sensitive && !last.has_trailing_whitespace;

    let body = ctx.indented(|ctx| {
        let before = if borrow_open {
            line(forced).append(Doc::text(">"))
        } else {
            boundary(
                first.is_leading_whitespace_sensitive,
                first.has_leading_whitespace,
                forced,
            )
            .0
        };
        let doc = before.append(children::children_list(id, children, ctx));
        if borrow_close {
            doc.append(Doc::text(close.clone()))
        } else {
            doc
        }
    });
    let head = if borrow_open {
        open
    } else {
        open.append(layout.before_close(false)).append(Doc::text(">"))
    };
    let tail = if borrow_close {
        line(forced).append(Doc::text(">"))
    } else {
        boundary(
            last.is_trailing_whitespace_sensitive,
            last.has_trailing_whitespace,
            forced,
        )
        .0
        .append(Doc::text(close))
        .append(Doc::text(">"))
    };
    head.group().append(body).append(tail).group()
}

pub(super) fn childless_element<'s, E, F>(id: NodeId, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let (name, attributes, self_closing) = match &document.node(id).kind {
        NodeKind::HtmlVoidElement { name, attributes } => {
            (name.to_ascii_lowercase(), attributes, false)
        }
        NodeKind::HtmlSelfClosingElement { name, attributes } => {
            (element_name(name, ctx), attributes, true)
        }
        _ => unreachable!("childless element printer called on another kind of node"),
    };
    let (attrs, layout) = attributes_doc(&name, attributes, ctx);
    Doc::text("<")
        .append(Doc::text(name))
        .append(attrs)
        .append(layout.before_close(self_closing))
        .append(Doc::text(if self_closing { "/>" } else { ">" }))
        .group()
}

pub(super) fn raw_node<'s, E, F>(id: NodeId, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let NodeKind::HtmlRawNode {
        name,
        attributes,
        body,
        ..
    } = &document.node(id).kind
    else {
        unreachable!("raw node printer called on another kind of node")
    };
    let name = name.to_ascii_lowercase();
    let (attrs, layout) = attributes_doc(&name, attributes, ctx);
    let indent = match name.as_str() {
        "script" => ctx.options.script_indent,
        "style" => ctx.options.style_indent,
        _ => true,
    };
    Doc::text("<")
        .append(Doc::text(name.clone()))
        .append(attrs)
        .append(layout.before_close(false))
        .append(Doc::text(">"))
        .group()
        .append(embedded(body, indent, ctx))
        .append(Doc::text(format!("</{name}>")))
}

/// Body of `<script>`, `<style>` or a Liquid raw tag, handed to the external
/// formatter and re-indented.
pub(super) fn embedded<'s, E, F>(body: &RawBody<'s>, indent: bool, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    if body.value.trim().is_empty() {
        return Doc::nil();
    }
    if is_verbatim(body) {
        return Doc::list(reflow_raw(body.value).collect());
    }
    let formatted = ctx.format_raw(body.value, body.kind, indent);
    let doc = Doc::list(
        dedent(&formatted)
            .into_iter()
            .map(|line| {
                if line.is_empty() {
                    Doc::empty_line()
                } else {
                    Doc::hard_line().append(Doc::text(line))
                }
            })
            .collect(),
    );
    if indent {
        doc.nest(ctx.indent_width)
    } else {
        doc
    }
    .append(Doc::hard_line())
}

/// Lines without trailing whitespace, blank edge lines and common indentation.
fn dedent(code: &str) -> Vec<String> {
    let lines = code.lines().map(str::trim_end).collect::<Vec<_>>();
    let start = lines
        .iter()
        .position(|line| !line.is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(start, |i| i + 1);
    let lines = &lines[start..end];
    let indent = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or_default();
    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or_default().to_owned())
        .collect()
}

fn element_name<E, F>(fragments: &[NodeId], ctx: &mut Ctx<'_, '_, E, F>) -> String
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let name = liquid::inline_list(fragments, ctx);
    if helpers::is_html_tag(&name) {
        name.to_ascii_lowercase()
    } else {
        name
    }
}

fn attributes_doc<'s, E, F>(
    name: &str,
    attributes: &[NodeId],
    ctx: &mut Ctx<'_, 's, E, F>,
) -> (Doc<'s>, AttrLayout)
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let layout = if name.eq_ignore_ascii_case("link") && ctx.options.single_line_link_tags {
        AttrLayout::SingleLine
    } else if ctx.options.single_attribute_per_line && attributes.len() > 1 {
        AttrLayout::OnePerLine
    } else {
        AttrLayout::Fill
    };
    let document = ctx.document;
    let doc = ctx.indented(|ctx| {
        let mut docs = Vec::with_capacity(attributes.len() * 2);
        for attr in attributes {
            docs.push(layout.separator());
            docs.push(match document.node(*attr).kind {
                NodeKind::AttrSingleQuoted { .. }
                | NodeKind::AttrDoubleQuoted { .. }
                | NodeKind::AttrUnquoted { .. }
                | NodeKind::AttrEmpty { .. } => attr.doc(ctx),
                // Liquid between attributes, such as `{% if a %}checked{% endif %}`
                _ => Doc::text(liquid::inline_list(std::slice::from_ref(attr), ctx)),
            });
        }
        Doc::list(docs)
    });
    (doc, layout)
}

pub(super) fn attribute<E, F>(id: NodeId, ctx: &mut Ctx<'_, '_, E, F>) -> String
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let node = document.node(id);
    let name = liquid::inline_list(node.name_fragments().unwrap_or_default(), ctx);
    let original_quote = match &node.kind {
        NodeKind::AttrSingleQuoted { .. } => Some('\''),
        NodeKind::AttrDoubleQuoted { .. } => Some('"'),
        NodeKind::AttrUnquoted { .. } => None,
        _ => return name,
    };
    let fragments = node.value_fragments().unwrap_or_default();

    if fragments.iter().any(|id| !document.node(*id).is_text()) {
        let quote = original_quote.unwrap_or('"');
        let outer = ctx.attr_quote.replace(quote);
        let value = liquid::inline_list(fragments, ctx);
        ctx.attr_quote = outer;
        return format!("{name}={quote}{value}{quote}");
    }

    let value = fragments
        .iter()
        .map(|id| document.text(*id))
        .collect::<String>();
    let quote = if value.contains('"') {
        '\''
    } else if value.contains('\'') {
        '"'
    } else {
        match ctx.options.html_quotes {
            Quotes::Double => '"',
            Quotes::Single => '\'',
        }
    };
    let value = if quote == '\'' {
        UNESCAPING_AC.replace_all(&value, &["\"", "\"", "&#x27;"])
    } else {
        UNESCAPING_AC.replace_all(&value, &["&quot;", "&#x22;", "'"])
    };
    format!("{name}={quote}{value}{quote}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedent_strips_common_indentation() {
        assert_eq!(
            dedent("\n\n    a {\n      b;\n\n    }   \n  \n"),
            ["a {", "  b;", "", "}"]
        );
        assert_eq!(dedent("x"), ["x"]);
        assert!(dedent(" \n\t\n").is_empty());
    }
}
