use super::{
    Synth,
    children::{self, boundary},
    element, markup, reflow_owned, reflow_raw, trim_marker,
};
use crate::{
    ast::*,
    config::Quotes,
    ctx::{Ctx, Hints},
};
use std::borrow::Cow;
use tiny_pretty::Doc;

/// Preferred quote of string literals. Inside an attribute value, the one
/// that doesn't close the attribute.
fn string_quote<E, F>(ctx: &Ctx<'_, '_, E, F>) -> char
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    match ctx.attr_quote {
        Some('"') => '\'',
        Some(_) => '"',
        None => match ctx.options.liquid_quotes {
            Quotes::Double => '"',
            Quotes::Single => '\'',
        },
    }
}

pub(super) fn drop<'s, E, F>(
    markup: &DropMarkup<'s>,
    delimiter: Delimiter,
    ctx: &mut Ctx<'_, 's, E, F>,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let quote = string_quote(ctx);
    let body = match markup {
        DropMarkup::Base("") => Doc::text(" "),
        DropMarkup::Base(markup) => Doc::text(" ")
            .concat(reflow_raw(*markup))
            .append(Doc::text(" ")),
        DropMarkup::Variable(variable) => Doc::line_or_space()
            .append(Doc::text(markup::expression(&variable.expression, quote)))
            .concat(variable.filters.iter().map(|filter| {
                Doc::line_or_space().append(Doc::text(markup::filter(filter, quote)))
            }))
            .nest(ctx.indent_width)
            .append(Doc::line_or_space())
            .group(),
    };
    Doc::text(if delimiter.trim_left { "{{-" } else { "{{" })
        .append(body)
        .append(Doc::text(if delimiter.trim_right { "-}}" } else { "}}" }))
}

/// Layout of the children between two delimiters of a block tag.
struct Body<'s> {
    /// Leading boundary and children, nested.
    doc: Doc<'s>,
    after: Doc<'s>,
    open_synth: Synth,
    close_synth: Synth,
}

fn body<'s, E, F>(
    container: NodeId,
    children: &[NodeId],
    forced: bool,
    ctx: &mut Ctx<'_, 's, E, F>,
) -> Body<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let (Some(first), Some(last)) = (children.first(), children.last()) else {
        let facts = &document.node(container).facts;
        return Body {
            doc: if facts.has_dangling_whitespace && facts.is_dangling_whitespace_sensitive {
                Doc::line_or_space()
            } else {
                Doc::nil()
            },
            after: Doc::nil(),
            open_synth: Synth::None,
            close_synth: Synth::None,
        };
    };
    let first = &document.node(*first).facts;
    let last = &document.node(*last).facts;
    let (before, open_synth) = boundary(
        first.is_leading_whitespace_sensitive,
        first.has_leading_whitespace,
        forced,
    );
    let (after, close_synth) = boundary(
        last.is_trailing_whitespace_sensitive,
        last.has_trailing_whitespace,
        forced,
    );
    Body {
        doc: ctx.indented(|ctx| before.append(children::children_list(container, children, ctx))),
        after,
        open_synth,
        close_synth,
    }
}

pub(super) fn tag<'s, E, F>(id: NodeId, tag: &LiquidTag<'s>, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let node = document.node(id);
    let quote = string_quote(ctx);
    let block_start = tag.block_start;
    let open = Doc::text("{%").append(trim_marker(block_start.trim_left, Synth::None));

    if let LiquidMarkup::Liquid(lines) = &tag.markup {
        return open
            .append(liquid_lines(lines, ctx.indent_width))
            .append(trim_marker(block_start.trim_right, Synth::None))
            .append(Doc::text("%}"));
    }

    let head = Doc::text(" ")
        .concat(reflow_owned(&markup::tag_head(tag.name, &tag.markup, quote)))
        .append(Doc::text(" "));
    let Some(children) = &tag.children else {
        return open
            .append(head)
            .append(trim_marker(block_start.trim_right, Synth::None))
            .append(Doc::text("%}"));
    };

    if node.facts.is_indentation_sensitive {
        let inner_end = tag.block_end.map_or(node.end, |block_end| block_end.start);
        let mut docs = vec![
            open,
            head,
            trim_marker(block_start.trim_right, Synth::None),
            Doc::text("%}"),
        ];
        docs.extend(reflow_raw(&document.source[block_start.end..inner_end]));
        if let Some(block_end) = tag.block_end {
            docs.push(end_tag(tag.name, block_end));
        }
        return Doc::list(docs);
    }

    let forced = children::is_forced(document, id);
    let mut bodies = Vec::with_capacity(children.len().max(1));
    if node.is_branched_tag() {
        for (i, branch_id) in children.iter().enumerate() {
            let NodeKind::LiquidBranch(branch) = &document.node(*branch_id).kind else {
                continue;
            };
            let body = if i == 0 && tag.name == "case" && children.len() > 1 && branch.children.is_empty() {
                // whatever precedes the first `when` is never rendered
                Body {
                    doc: Doc::nil(),
                    after: Doc::hard_line(),
                    open_synth: Synth::None,
                    close_synth: Synth::None,
                }
            } else {
                body(*branch_id, &branch.children, forced, ctx)
            };
            let delimiter = branch.name.map(|name| {
                (
                    markup::tag_head(name, &branch.markup, quote),
                    branch.block_start,
                )
            });
            bodies.push((delimiter, body));
        }
    } else {
        bodies.push((None, body(id, children, forced, ctx)));
    }

    let mut docs = vec![
        head,
        trim_marker(
            block_start.trim_right,
            bodies.first().map_or(Synth::None, |(_, body)| body.open_synth),
        ),
        Doc::text("%}"),
    ];
    let mut close_synth = Synth::None;
    for (delimiter, body) in bodies {
        if let Some((head, delimiter)) = delimiter {
            docs.push(Doc::text("{%"));
            docs.push(trim_marker(delimiter.trim_left, close_synth));
            docs.push(
                Doc::text(" ")
                    .concat(reflow_owned(&head))
                    .append(Doc::text(" ")),
            );
            docs.push(trim_marker(delimiter.trim_right, body.open_synth));
            docs.push(Doc::text("%}"));
        }
        docs.push(body.doc);
        docs.push(body.after);
        close_synth = body.close_synth;
    }

    match tag.block_end {
        Some(block_end) => {
            docs.push(Doc::text("{%"));
            docs.push(trim_marker(block_end.trim_left, close_synth));
            docs.push(Doc::text(format!(" end{} ", tag.name)));
            open.append(Doc::list(docs).group())
                .append(trim_marker(block_end.trim_right, Synth::None))
                .append(Doc::text("%}"))
        }
        None => open.append(Doc::list(docs).group()),
    }
}

fn end_tag(name: &str, delimiter: Delimiter) -> Doc<'static> {
    Doc::text("{%")
        .append(trim_marker(delimiter.trim_left, Synth::None))
        .append(Doc::text(format!(" end{name} ")))
        .append(trim_marker(delimiter.trim_right, Synth::None))
        .append(Doc::text("%}"))
}

fn is_liquid_block(name: &str) -> bool {
    matches!(
        name,
        "if" | "unless" | "for" | "case" | "capture" | "tablerow" | "paginate" | "form" | "comment"
    )
}

/// Body of `{% liquid %}`: one statement per line, indented by block depth.
fn liquid_lines<'s>(lines: &[&'s str], indent_width: usize) -> Doc<'s> {
    let mut docs = vec![Doc::text(" liquid")];
    let mut depth = 0usize;
    for line in lines {
        let word = line.split_ascii_whitespace().next().unwrap_or_default();
        let level = match word {
            "else" | "elsif" | "when" => depth.saturating_sub(1),
            _ if word.strip_prefix("end").is_some_and(is_liquid_block) => {
                depth = depth.saturating_sub(1);
                depth
            }
            _ => depth,
        };
        docs.push(
            Doc::hard_line()
                .append(Doc::text(*line))
                .nest(indent_width * (level + 1)),
        );
        if is_liquid_block(word) {
            depth += 1;
        }
    }
    docs.push(Doc::hard_line());
    Doc::list(docs)
}

pub(super) fn raw_tag<'s, E, F>(id: NodeId, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let NodeKind::LiquidRawTag {
        name,
        markup,
        body,
        block_start,
        block_end,
    } = &document.node(id).kind
    else {
        unreachable!("raw tag printer called on another kind of node")
    };
    let head = if markup.is_empty() {
        (*name).to_owned()
    } else {
        format!("{name} {markup}")
    };
    let open = Doc::text("{%")
        .append(trim_marker(block_start.trim_left, Synth::None))
        .append(Doc::text(format!(" {head} ")))
        .append(trim_marker(block_start.trim_right, Synth::None))
        .append(Doc::text("%}"));
    let content = match body.kind {
        RawKind::Text => Doc::list(reflow_raw(body.value).collect()),
        _ => {
            let indent = match *name {
                "javascript" => ctx.options.script_indent,
                "style" | "stylesheet" => ctx.options.style_indent,
                _ => true,
            };
            element::embedded(body, indent, ctx)
        }
    };
    open.append(content).append(end_tag(name, *block_end))
}

/// Flat rendering of attribute names, attribute lists and values,
/// where layout must not add line breaks.
pub(super) fn inline<E, F>(id: NodeId, ctx: &mut Ctx<'_, '_, E, F>, out: &mut String)
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let node = document.node(id);
    match &node.kind {
        NodeKind::Text { value } => out.push_str(value),
        NodeKind::LiquidDrop { markup, delimiter } => {
            let body = match markup {
                DropMarkup::Base(markup) => (*markup).to_owned(),
                DropMarkup::Variable(variable) => markup::variable(variable, string_quote(ctx)),
            };
            out.push_str(if delimiter.trim_left { "{{-" } else { "{{" });
            out.push(' ');
            if !body.is_empty() {
                out.push_str(&body);
                out.push(' ');
            }
            out.push_str(if delimiter.trim_right { "-}}" } else { "}}" });
        }
        NodeKind::LiquidTag(tag) => {
            let quote = string_quote(ctx);
            push_delimited(out, tag.block_start, &markup::tag_head(tag.name, &tag.markup, quote));
            let Some(children) = &tag.children else {
                return;
            };
            let mut prev_end = tag.block_start.end;
            for child in children {
                match &document.node(*child).kind {
                    NodeKind::LiquidBranch(branch) => {
                        if let Some(name) = branch.name {
                            if prev_end < branch.block_start.start {
                                out.push(' ');
                            }
                            push_delimited(
                                out,
                                branch.block_start,
                                &markup::tag_head(name, &branch.markup, quote),
                            );
                            prev_end = branch.block_start.end;
                        }
                        prev_end = inline_children(&branch.children, prev_end, ctx, out);
                    }
                    _ => prev_end = inline_children(std::slice::from_ref(child), prev_end, ctx, out),
                }
            }
            if let Some(block_end) = tag.block_end {
                if prev_end < block_end.start {
                    out.push(' ');
                }
                push_delimited(out, block_end, &format!("end{}", tag.name));
            }
        }
        NodeKind::AttrSingleQuoted { .. }
        | NodeKind::AttrDoubleQuoted { .. }
        | NodeKind::AttrUnquoted { .. }
        | NodeKind::AttrEmpty { .. } => out.push_str(&element::attribute(id, ctx)),
        _ => out.push_str(document.text(id)),
    }
}

/// Items separated by a single space where the source has whitespace.
fn inline_children<E, F>(
    children: &[NodeId],
    mut prev_end: usize,
    ctx: &mut Ctx<'_, '_, E, F>,
    out: &mut String,
) -> usize
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    for child in children {
        let node = ctx.document.node(*child);
        if prev_end < node.start {
            out.push(' ');
        }
        inline(*child, ctx, out);
        prev_end = node.end;
    }
    prev_end
}

pub(super) fn inline_list<E, F>(ids: &[NodeId], ctx: &mut Ctx<'_, '_, E, F>) -> String
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let mut out = String::new();
    if let Some(first) = ids.first() {
        let start = ctx.document.node(*first).start;
        inline_children(ids, start, ctx, &mut out);
    }
    out
}

fn push_delimited(out: &mut String, delimiter: Delimiter, head: &str) {
    out.push_str(if delimiter.trim_left { "{%-" } else { "{%" });
    out.push(' ');
    out.push_str(head);
    out.push(' ');
    out.push_str(if delimiter.trim_right { "-%}" } else { "%}" });
}
