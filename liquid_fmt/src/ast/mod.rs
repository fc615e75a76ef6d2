//! Document tree.
//!
//! Nodes live in an arena owned by [`Document`] and refer to each other by
//! [`NodeId`]. Parent and sibling links filled in by augmentation are plain
//! indices into the same arena.

pub mod expr;

use crate::augment::{CssDisplay, CssWhitespace};
pub use expr::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// A Liquid delimiter such as `{%- if a %}` with its trim markers.
pub struct Delimiter {
    pub start: usize,
    pub end: usize,
    /// `-` right after the opening `{%` or `{{`.
    pub trim_left: bool,
    /// `-` right before the closing `%}` or `}}`.
    pub trim_right: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawKind {
    Css,
    Javascript,
    Typescript,
    Json,
    Markdown,
    Html,
    Text,
}

impl RawKind {
    /// File extension handed to external formatters.
    pub fn extension(self) -> &'static str {
        match self {
            RawKind::Css => "css",
            RawKind::Javascript => "js",
            RawKind::Typescript => "ts",
            RawKind::Json => "json",
            RawKind::Markdown => "md",
            RawKind::Html => "html",
            RawKind::Text => "txt",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawBody<'s> {
    pub value: &'s str,
    pub start: usize,
    pub end: usize,
    pub kind: RawKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LiquidTag<'s> {
    pub name: &'s str,
    pub markup: LiquidMarkup<'s>,
    /// `None` for tags without a closer, such as `assign`.
    pub children: Option<Vec<NodeId>>,
    pub block_start: Delimiter,
    pub block_end: Option<Delimiter>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LiquidBranch<'s> {
    /// `None` for the branch synthesized when the parent tag opens.
    pub name: Option<&'s str>,
    pub markup: LiquidMarkup<'s>,
    pub children: Vec<NodeId>,
    /// The `elsif`/`else`/`when` tag; empty at the parent opener for the
    /// synthesized branch.
    pub block_start: Delimiter,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind<'s> {
    Document {
        children: Vec<NodeId>,
    },
    Text {
        value: &'s str,
    },
    YamlFrontmatter {
        body: &'s str,
    },
    HtmlElement {
        name: Vec<NodeId>,
        attributes: Vec<NodeId>,
        children: Vec<NodeId>,
        /// Range of the open tag.
        block_start: (usize, usize),
        /// Range of the close tag.
        block_end: (usize, usize),
    },
    HtmlVoidElement {
        name: &'s str,
        attributes: Vec<NodeId>,
    },
    HtmlSelfClosingElement {
        name: Vec<NodeId>,
        attributes: Vec<NodeId>,
    },
    HtmlRawNode {
        name: &'s str,
        attributes: Vec<NodeId>,
        body: RawBody<'s>,
        block_start: (usize, usize),
        block_end: (usize, usize),
    },
    HtmlComment {
        body: &'s str,
    },
    HtmlDoctype {
        legacy: &'s str,
    },
    LiquidTag(LiquidTag<'s>),
    LiquidBranch(LiquidBranch<'s>),
    LiquidRawTag {
        name: &'s str,
        markup: &'s str,
        body: RawBody<'s>,
        block_start: Delimiter,
        block_end: Delimiter,
    },
    LiquidDrop {
        markup: DropMarkup<'s>,
        delimiter: Delimiter,
    },
    AttrSingleQuoted {
        name: Vec<NodeId>,
        value: Vec<NodeId>,
    },
    AttrDoubleQuoted {
        name: Vec<NodeId>,
        value: Vec<NodeId>,
    },
    AttrUnquoted {
        name: Vec<NodeId>,
        value: Vec<NodeId>,
    },
    AttrEmpty {
        name: Vec<NodeId>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DropMarkup<'s> {
    Variable(Variable<'s>),
    /// Markup the expression grammar couldn't make sense of, trimmed.
    Base(&'s str),
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Facts attached by the augmentation pass.
pub struct Facts {
    pub parent: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub css_display: CssDisplay,
    pub css_whitespace: CssWhitespace,
    pub has_leading_whitespace: bool,
    pub has_trailing_whitespace: bool,
    pub has_dangling_whitespace: bool,
    pub is_leading_whitespace_sensitive: bool,
    pub is_trailing_whitespace_sensitive: bool,
    pub is_dangling_whitespace_sensitive: bool,
    pub is_indentation_sensitive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node<'s> {
    pub kind: NodeKind<'s>,
    pub start: usize,
    pub end: usize,
    pub facts: Facts,
}

impl<'s> Node<'s> {
    pub fn new(kind: NodeKind<'s>, start: usize, end: usize) -> Self {
        Node {
            kind,
            start,
            end,
            facts: Facts::default(),
        }
    }

    /// Ordered children, for nodes that can hold them.
    pub fn children(&self) -> Option<&[NodeId]> {
        match &self.kind {
            NodeKind::Document { children }
            | NodeKind::HtmlElement { children, .. }
            | NodeKind::LiquidBranch(LiquidBranch { children, .. }) => Some(children),
            NodeKind::LiquidTag(tag) => tag.children.as_deref(),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&[NodeId]> {
        match &self.kind {
            NodeKind::HtmlElement { attributes, .. }
            | NodeKind::HtmlVoidElement { attributes, .. }
            | NodeKind::HtmlSelfClosingElement { attributes, .. }
            | NodeKind::HtmlRawNode { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Name fragments of elements and attributes.
    pub fn name_fragments(&self) -> Option<&[NodeId]> {
        match &self.kind {
            NodeKind::HtmlElement { name, .. }
            | NodeKind::HtmlSelfClosingElement { name, .. }
            | NodeKind::AttrSingleQuoted { name, .. }
            | NodeKind::AttrDoubleQuoted { name, .. }
            | NodeKind::AttrUnquoted { name, .. }
            | NodeKind::AttrEmpty { name } => Some(name),
            _ => None,
        }
    }

    pub fn value_fragments(&self) -> Option<&[NodeId]> {
        match &self.kind {
            NodeKind::AttrSingleQuoted { value, .. }
            | NodeKind::AttrDoubleQuoted { value, .. }
            | NodeKind::AttrUnquoted { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// `<script>`, `<style>` and front matter. Whitespace around them is
    /// never significant.
    pub fn is_script_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::HtmlRawNode { .. } | NodeKind::YamlFrontmatter { .. }
        )
    }

    pub fn is_branched_tag(&self) -> bool {
        matches!(&self.kind, NodeKind::LiquidTag(tag) if is_branched_tag_name(tag.name))
    }
}

pub(crate) fn is_branched_tag_name(name: &str) -> bool {
    matches!(name, "if" | "unless" | "for" | "tablerow" | "case")
}

#[derive(Clone, Debug)]
/// Root of a parsed template. Owns every node.
pub struct Document<'s> {
    pub source: &'s str,
    pub(crate) nodes: Vec<Node<'s>>,
}

impl<'s> Document<'s> {
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(source: &'s str) -> Self {
        Document {
            source,
            nodes: vec![Node::new(
                NodeKind::Document {
                    children: Vec::new(),
                },
                0,
                source.len(),
            )],
        }
    }

    pub fn node(&self, id: NodeId) -> &Node<'s> {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<'s> {
        &mut self.nodes[id.0]
    }

    pub(crate) fn alloc(&mut self, node: Node<'s>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn root(&self) -> &Node<'s> {
        self.node(Self::ROOT)
    }

    pub fn children(&self) -> &[NodeId] {
        self.root().children().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    pub fn text(&self, id: NodeId) -> &'s str {
        let node = self.node(id);
        &self.source[node.start..node.end]
    }

    /// Resolved name used to match open and close constructs.
    ///
    /// Literal fragments are kept as is, drops contribute their trimmed source.
    pub fn resolved_name(&self, fragments: &[NodeId]) -> String {
        fragments
            .iter()
            .map(|id| match &self.node(*id).kind {
                NodeKind::Text { value } => *value,
                _ => self.text(*id).trim(),
            })
            .collect()
    }

    /// Name of an HTML element or Liquid tag, for diagnostics and lookups.
    pub fn node_name(&self, id: NodeId) -> Option<String> {
        let node = self.node(id);
        match &node.kind {
            NodeKind::HtmlElement { name, .. } | NodeKind::HtmlSelfClosingElement { name, .. } => {
                Some(self.resolved_name(name))
            }
            NodeKind::HtmlVoidElement { name, .. } | NodeKind::HtmlRawNode { name, .. } => {
                Some((*name).to_owned())
            }
            NodeKind::LiquidTag(tag) => Some(tag.name.to_owned()),
            NodeKind::LiquidRawTag { name, .. } => Some((*name).to_owned()),
            NodeKind::LiquidBranch(branch) => branch.name.map(str::to_owned),
            _ => None,
        }
    }
}
