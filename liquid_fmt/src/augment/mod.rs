//! Facts derived from the finished tree.
//!
//! Augmentation runs once per document, after parsing and before printing.
//! It never changes the tree structure, it only fills [`Facts`] of every
//! node. Passes run in order because later facts read earlier ones:
//! links first, then CSS facts, then whitespace facts, then sensitivity.

mod css;

use crate::{
    ast::*,
    config::WhitespaceSensitivity,
    helpers::is_whitespace_at,
};
pub use css::{CssDisplay, CssWhitespace};

/// Attach derived facts to every node of the document.
pub fn augment(document: &mut Document<'_>, sensitivity: WhitespaceSensitivity) {
    let ids = (0..document.len()).map(NodeId).collect::<Vec<_>>();

    for id in &ids {
        link(document, *id);
    }
    for id in &ids {
        let display = css_display(document, *id, sensitivity);
        document.node_mut(*id).facts.css_display = display;
    }
    for id in &ids {
        let whitespace = css_whitespace(document, *id);
        let facts = &mut document.node_mut(*id).facts;
        facts.css_whitespace = whitespace;
        facts.is_indentation_sensitive = whitespace.is_pre_like();
    }
    for id in &ids {
        let leading = has_leading_whitespace(document, *id);
        let trailing = has_trailing_whitespace(document, *id);
        let dangling = has_dangling_whitespace(document, *id);
        let facts = &mut document.node_mut(*id).facts;
        facts.has_leading_whitespace = leading;
        facts.has_trailing_whitespace = trailing;
        facts.has_dangling_whitespace = dangling;
    }
    for id in &ids {
        let leading = is_leading_whitespace_sensitive(document, *id);
        let trailing = is_trailing_whitespace_sensitive(document, *id);
        let dangling = is_dangling_whitespace_sensitive(document, *id);
        let facts = &mut document.node_mut(*id).facts;
        facts.is_leading_whitespace_sensitive = leading;
        facts.is_trailing_whitespace_sensitive = trailing;
        facts.is_dangling_whitespace_sensitive = dangling;
    }
    log::debug!("augmented {} nodes", ids.len());
}

fn link(document: &mut Document<'_>, id: NodeId) {
    let node = document.node(id);
    let collections = [
        node.name_fragments().unwrap_or_default().to_vec(),
        node.attributes().unwrap_or_default().to_vec(),
        node.value_fragments().unwrap_or_default().to_vec(),
        node.children().unwrap_or_default().to_vec(),
    ];
    for collection in &collections {
        for (i, child) in collection.iter().enumerate() {
            let facts = &mut document.node_mut(*child).facts;
            facts.parent = Some(id);
            facts.prev = i.checked_sub(1).map(|i| collection[i]);
            facts.next = collection.get(i + 1).copied();
        }
    }
    let [.., children] = collections;
    let facts = &mut document.node_mut(id).facts;
    facts.first_child = children.first().copied();
    facts.last_child = children.last().copied();
}

fn css_display(
    document: &Document<'_>,
    id: NodeId,
    sensitivity: WhitespaceSensitivity,
) -> CssDisplay {
    let node = document.node(id);
    if let Some(display) = node.facts.prev.and_then(|prev| display_override(document, prev)) {
        return display;
    }
    let by_sensitivity = |default: CssDisplay| match sensitivity {
        WhitespaceSensitivity::Css => default,
        WhitespaceSensitivity::Strict => CssDisplay::Inline,
        WhitespaceSensitivity::Ignore => CssDisplay::Block,
    };
    match &node.kind {
        NodeKind::Document { .. } | NodeKind::HtmlDoctype { .. } | NodeKind::YamlFrontmatter { .. } => {
            CssDisplay::Block
        }
        NodeKind::HtmlElement { name, .. } | NodeKind::HtmlSelfClosingElement { name, .. } => {
            by_sensitivity(css::element_display(&document.resolved_name(name)))
        }
        NodeKind::HtmlVoidElement { name, .. } | NodeKind::HtmlRawNode { name, .. } => {
            by_sensitivity(css::element_display(name))
        }
        NodeKind::LiquidTag(LiquidTag { name, .. }) | NodeKind::LiquidRawTag { name, .. } => {
            by_sensitivity(css::liquid_tag_display(name))
        }
        NodeKind::LiquidBranch(..)
        | NodeKind::Text { .. }
        | NodeKind::HtmlComment { .. }
        | NodeKind::LiquidDrop { .. }
        | NodeKind::AttrSingleQuoted { .. }
        | NodeKind::AttrDoubleQuoted { .. }
        | NodeKind::AttrUnquoted { .. }
        | NodeKind::AttrEmpty { .. } => CssDisplay::Inline,
    }
}

/// `<!-- display: block -->` or `{% # display: block %}` right before a node.
fn display_override(document: &Document<'_>, prev: NodeId) -> Option<CssDisplay> {
    match &document.node(prev).kind {
        NodeKind::HtmlComment { body } => css::display_directive(body),
        NodeKind::LiquidTag(LiquidTag {
            name: "#",
            markup: LiquidMarkup::Base(markup),
            ..
        }) => css::display_directive(markup),
        _ => None,
    }
}

fn css_whitespace(document: &Document<'_>, id: NodeId) -> CssWhitespace {
    match &document.node(id).kind {
        NodeKind::HtmlElement { name, .. } => css::element_whitespace(&document.resolved_name(name)),
        NodeKind::LiquidRawTag { .. } | NodeKind::YamlFrontmatter { .. } => CssWhitespace::Pre,
        NodeKind::LiquidTag(LiquidTag {
            name: "capture", ..
        }) => CssWhitespace::Pre,
        _ => CssWhitespace::Normal,
    }
}

fn has_leading_whitespace(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    match &node.kind {
        // children of a branch start after its delimiter
        NodeKind::LiquidBranch(LiquidBranch { block_start, .. }) => {
            is_whitespace_at(document.source, block_start.end)
        }
        _ => node.start > 0 && is_whitespace_at(document.source, node.start - 1),
    }
}

fn has_trailing_whitespace(document: &Document<'_>, id: NodeId) -> bool {
    is_whitespace_at(document.source, document.node(id).end)
}

fn has_dangling_whitespace(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    if !node.children().is_some_and(<[NodeId]>::is_empty) {
        return false;
    }
    match &node.kind {
        NodeKind::HtmlElement {
            block_start,
            block_end,
            ..
        } => block_start.1 < block_end.0 && is_whitespace_at(document.source, block_start.1),
        NodeKind::LiquidTag(LiquidTag {
            block_start,
            block_end: Some(block_end),
            ..
        }) => {
            block_start.end < block_end.start && is_whitespace_at(document.source, block_start.end)
        }
        NodeKind::LiquidBranch(..) => is_whitespace_at(document.source, node.end),
        _ => false,
    }
}

/// `{%-` or `{{-` on the node's own left edge.
pub(crate) fn outer_trim_left(document: &Document<'_>, id: NodeId) -> bool {
    match &document.node(id).kind {
        NodeKind::LiquidTag(LiquidTag { block_start, .. })
        | NodeKind::LiquidBranch(LiquidBranch { block_start, .. })
        | NodeKind::LiquidRawTag { block_start, .. } => block_start.trim_left,
        NodeKind::LiquidDrop { delimiter, .. } => delimiter.trim_left,
        _ => false,
    }
}

/// `-%}` or `-}}` on the node's own right edge.
pub(crate) fn outer_trim_right(document: &Document<'_>, id: NodeId) -> bool {
    match &document.node(id).kind {
        NodeKind::LiquidTag(LiquidTag {
            block_start,
            block_end,
            ..
        }) => block_end.unwrap_or(*block_start).trim_right,
        NodeKind::LiquidRawTag { block_end, .. } => block_end.trim_right,
        NodeKind::LiquidDrop { delimiter, .. } => delimiter.trim_right,
        _ => false,
    }
}

/// Trim marker facing the first child.
pub(crate) fn inner_trim_left(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    match &node.kind {
        NodeKind::LiquidTag(LiquidTag {
            block_start,
            children: Some(..),
            ..
        })
        | NodeKind::LiquidRawTag { block_start, .. } => block_start.trim_right,
        NodeKind::LiquidBranch(LiquidBranch {
            name: None,
            ..
        }) => node
            .facts
            .parent
            .is_some_and(|parent| inner_trim_left(document, parent)),
        NodeKind::LiquidBranch(LiquidBranch { block_start, .. }) => block_start.trim_right,
        _ => false,
    }
}

/// Trim marker facing the last child.
pub(crate) fn inner_trim_right(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    match &node.kind {
        NodeKind::LiquidTag(LiquidTag {
            block_end: Some(block_end),
            ..
        })
        | NodeKind::LiquidRawTag { block_end, .. } => block_end.trim_left,
        NodeKind::LiquidBranch(..) => match node.facts.next {
            Some(next) => outer_trim_left(document, next),
            None => node
                .facts
                .parent
                .is_some_and(|parent| inner_trim_right(document, parent)),
        },
        _ => false,
    }
}

fn is_leading_whitespace_sensitive(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    let facts = &node.facts;
    if outer_trim_left(document, id)
        || facts
            .prev
            .is_some_and(|prev| outer_trim_right(document, prev))
    {
        return false;
    }
    if facts.css_display == CssDisplay::None || node.is_script_like() {
        return false;
    }
    let Some(parent_id) = facts.parent else {
        return false;
    };
    let parent = document.node(parent_id);
    if facts.prev.is_none() && parent.facts.css_display == CssDisplay::None {
        return false;
    }
    if parent.facts.is_indentation_sensitive {
        return true;
    }
    if facts.css_display.is_block_like() {
        return false;
    }
    match facts.prev {
        None => {
            parent_id != Document::ROOT
                && !inner_trim_left(document, parent_id)
                && parent.facts.css_display.is_inner_sensitive()
        }
        Some(prev) => {
            let display = document.node(prev).facts.css_display;
            !display.is_block_like() && display != CssDisplay::None
        }
    }
}

fn is_trailing_whitespace_sensitive(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    let facts = &node.facts;
    if outer_trim_right(document, id)
        || facts
            .next
            .is_some_and(|next| outer_trim_left(document, next))
    {
        return false;
    }
    if facts.css_display == CssDisplay::None || node.is_script_like() {
        return false;
    }
    if matches!(node.kind, NodeKind::HtmlVoidElement { name, .. } if name.eq_ignore_ascii_case("br"))
    {
        return false;
    }
    let Some(parent_id) = facts.parent else {
        return false;
    };
    let parent = document.node(parent_id);
    if facts.next.is_none() && parent.facts.css_display == CssDisplay::None {
        return false;
    }
    if parent.facts.is_indentation_sensitive {
        return true;
    }
    if facts.css_display.is_block_like() {
        return false;
    }
    match facts.next {
        None => {
            parent_id != Document::ROOT
                && !inner_trim_right(document, parent_id)
                && parent.facts.css_display.is_inner_sensitive()
        }
        Some(next) => {
            let display = document.node(next).facts.css_display;
            !display.is_block_like() && display != CssDisplay::None
        }
    }
}

fn is_dangling_whitespace_sensitive(document: &Document<'_>, id: NodeId) -> bool {
    let node = document.node(id);
    node.facts.css_display.is_inner_sensitive()
        && !node.is_script_like()
        && !inner_trim_left(document, id)
        && !inner_trim_right(document, id)
}
