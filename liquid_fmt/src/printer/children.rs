//! Layout of sibling lists and of the boundaries around them.

use super::{DocGen, Synth, blank_line, has_blank_line};
use crate::{
    ast::*,
    augment::CssDisplay,
    ctx::{Ctx, Hints},
    helpers,
};
use std::borrow::Cow;
use tiny_pretty::Doc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What goes between two siblings.
pub(super) enum Gap {
    /// Nothing, and no break either: whitespace would change the output.
    Glue,
    /// Nothing, or a line break when the group breaks.
    Nil,
    /// A space, or a line break when the rest doesn't fit.
    Space,
    Hard,
    Blank,
}

impl Gap {
    fn doc(self) -> Doc<'static> {
        match self {
            Gap::Glue => Doc::nil(),
            Gap::Nil => Doc::line_or_nil(),
            Gap::Space => Doc::soft_line(),
            Gap::Hard => Doc::hard_line(),
            Gap::Blank => blank_line(),
        }
    }

    fn is_hard(self) -> bool {
        matches!(self, Gap::Hard | Gap::Blank)
    }
}

pub(super) fn gap(document: &Document<'_>, parent: NodeId, prev: NodeId, next: NodeId) -> Gap {
    let prev = document.node(prev);
    let next = document.node(next);
    let whitespace = document.source.get(prev.end..next.start).unwrap_or_default();
    let line_breaks = helpers::count_line_breaks(whitespace);
    let gap = if line_breaks > 1 {
        Gap::Blank
    } else if prev.facts.css_display.is_block_like()
        || next.facts.css_display.is_block_like()
        || line_breaks == 1
    {
        Gap::Hard
    } else if !whitespace.is_empty() {
        Gap::Space
    } else if prev.facts.is_trailing_whitespace_sensitive && next.facts.is_leading_whitespace_sensitive
    {
        Gap::Glue
    } else {
        Gap::Nil
    };
    match gap {
        Gap::Nil | Gap::Space if forces_break_between_children(document, parent) => Gap::Hard,
        gap => gap,
    }
}

/// Children separated by their gaps.
pub(super) fn children_list<'s, E, F>(
    parent: NodeId,
    children: &[NodeId],
    ctx: &mut Ctx<'_, 's, E, F>,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let document = ctx.document;
    let mut docs = Vec::with_capacity(children.len() * 2);
    for (i, child) in children.iter().enumerate() {
        if let Some(prev) = i.checked_sub(1).map(|i| children[i]) {
            docs.push(gap(document, parent, prev, *child).doc());
        }
        docs.push(child.doc(ctx));
    }
    Doc::list(docs)
}

/// Elements whose children always go on their own lines.
fn forces_break_between_children(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    match &node.kind {
        NodeKind::HtmlElement { name, .. } => {
            matches!(
                document.resolved_name(name).to_ascii_lowercase().as_str(),
                "html" | "head" | "ul" | "ol" | "select"
            ) || node.facts.css_display.is_table() && node.facts.css_display != CssDisplay::TableCell
        }
        _ => false,
    }
}

/// Whether the boundaries of a container must be hard line breaks.
pub(super) fn is_forced(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    match &node.kind {
        NodeKind::LiquidTag(tag) if node.is_branched_tag() => {
            let branches = tag.children.as_deref().unwrap_or_default();
            tag.name == "case" && branches.len() > 1
                || branches.iter().any(|branch| is_forced(document, *branch))
        }
        NodeKind::HtmlElement { name, .. }
            if document.resolved_name(name).eq_ignore_ascii_case("body") =>
        {
            !node.children().unwrap_or_default().is_empty()
        }
        _ => {
            let children = node.children().unwrap_or_default();
            forces_break_between_children(document, id) && !children.is_empty()
                || children
                    .windows(2)
                    .any(|pair| gap(document, id, pair[0], pair[1]).is_hard())
                || children.iter().any(|child| breaks(document, *child))
                || keeps_line_breaks_around_only_child(document, children)
        }
    }
}

/// A lone non-text child written on its own line stays there.
fn keeps_line_breaks_around_only_child(document: &Document<'_>, children: &[NodeId]) -> bool {
    let [child] = children else {
        return false;
    };
    let node = document.node(*child);
    !node.is_text()
        && line_break_before(document.source, node.start)
        && (!node.facts.is_trailing_whitespace_sensitive
            || line_break_after(document.source, node.end))
}

fn line_break_before(source: &str, index: usize) -> bool {
    source.as_bytes()[..index]
        .iter()
        .rev()
        .take_while(|byte| byte.is_ascii_whitespace())
        .any(|byte| *byte == b'\n')
}

fn line_break_after(source: &str, index: usize) -> bool {
    source.as_bytes()[index..]
        .iter()
        .take_while(|byte| byte.is_ascii_whitespace())
        .any(|byte| *byte == b'\n')
}

/// Whether a node always spans more than one line once printed.
pub(super) fn breaks(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    match &node.kind {
        NodeKind::Text { value } => has_blank_line(value),
        NodeKind::HtmlComment { body } => body.contains('\n'),
        NodeKind::YamlFrontmatter { .. } => true,
        NodeKind::HtmlDoctype { .. } => false,
        NodeKind::HtmlRawNode { body, .. } => {
            !body.value.trim().is_empty() && (!is_verbatim(body) || body.value.contains('\n'))
        }
        NodeKind::LiquidRawTag { body, .. } => match body.kind {
            RawKind::Text => body.value.contains('\n'),
            _ => !body.value.trim().is_empty(),
        },
        NodeKind::HtmlElement { block_start, block_end, .. } if node.facts.is_indentation_sensitive => {
            document.source[block_start.1..block_end.0].contains('\n')
        }
        NodeKind::HtmlElement { .. } | NodeKind::LiquidBranch(..) => is_forced(document, id),
        NodeKind::LiquidTag(tag) => match &tag.markup {
            LiquidMarkup::Liquid(..) => true,
            LiquidMarkup::Base(markup) if markup.contains('\n') => true,
            _ if node.facts.is_indentation_sensitive => document.text(id).contains('\n'),
            _ => tag.children.is_some() && is_forced(document, id),
        },
        NodeKind::LiquidDrop { markup, .. } => {
            matches!(markup, DropMarkup::Base(markup) if markup.contains('\n'))
        }
        NodeKind::HtmlVoidElement { .. }
        | NodeKind::HtmlSelfClosingElement { .. }
        | NodeKind::AttrSingleQuoted { .. }
        | NodeKind::AttrDoubleQuoted { .. }
        | NodeKind::AttrUnquoted { .. }
        | NodeKind::AttrEmpty { .. } => false,
        NodeKind::Document { .. } => true,
    }
}

/// Embedded code that must keep its exact whitespace.
pub(super) fn is_verbatim(body: &RawBody<'_>) -> bool {
    matches!(body.kind, RawKind::Markdown | RawKind::Text) || body.value.contains('`')
}

/// Boundary between a container's opening or closing delimiter and its
/// first or last child, with the trim marker it needs.
pub(super) fn boundary(sensitive: bool, has_whitespace: bool, forced: bool) -> (Doc<'static>, Synth) {
    match (sensitive, has_whitespace, forced) {
        (true, false, true) => (Doc::hard_line(), Synth::Always),
        (true, false, false) => (Doc::line_or_nil(), Synth::OnBreak),
        (true, true, false) => (Doc::line_or_space(), Synth::None),
        (false, _, false) => (Doc::line_or_nil(), Synth::None),
        (_, _, true) => (Doc::hard_line(), Synth::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        augment::augment,
        config::WhitespaceSensitivity,
        parser::{ParseMode, parse},
    };

    fn gaps(source: &str) -> Vec<Gap> {
        let mut document = parse(source, ParseMode::Strict).unwrap();
        augment(&mut document, WhitespaceSensitivity::Css);
        document
            .children()
            .windows(2)
            .map(|pair| gap(&document, Document::ROOT, pair[0], pair[1]))
            .collect()
    }

    #[test]
    fn gaps_between_siblings() {
        assert_eq!(gaps("a{{ b }} c"), [Gap::Glue, Gap::Space]);
        assert_eq!(gaps("<div></div><div></div>"), [Gap::Hard]);
        assert_eq!(gaps("<i></i>\n<i></i>\n\n\n<i></i>"), [Gap::Hard, Gap::Blank]);
        assert_eq!(gaps("{{ a -}}{{ b }}"), [Gap::Nil]);
    }

    #[test]
    fn forced_containers() {
        let forced = |source: &str| {
            let mut document = parse(source, ParseMode::Strict).unwrap();
            augment(&mut document, WhitespaceSensitivity::Css);
            is_forced(&document, document.children()[0])
        };
        assert!(forced("<div><p>a</p><p>b</p></div>"));
        assert!(forced("<ul><li>a</li></ul>"));
        assert!(forced("<div>\n  <p>a</p>\n</div>"));
        assert!(!forced("<div><p>a</p></div>"));
        assert!(!forced("<span>a <b>b</b></span>"));
        assert!(forced("{% case a %}{% when 1 %}b{% endcase %}"));
        assert!(!forced("{% if a %}b{% else %}c{% endif %}"));
    }
}
