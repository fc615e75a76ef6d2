//! Stage 2: nest the flat concrete sequence into a [`Document`].

use super::{
    concrete::{ConcreteKind, ConcreteNode},
    markup,
};
use crate::{
    ast::*,
    error::{OpenNode, StructuralError, StructuralErrorKind},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Every opened node must be closed.
    #[default]
    Strict,
    /// Accept nodes left open at end of input, for partial documents.
    Tolerant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Collection {
    Children,
    Attributes,
    Name,
    Value,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    node: NodeId,
    collection: Collection,
}

struct TreeBuilder<'s> {
    source: &'s str,
    document: Document<'s>,
    cursor: Vec<Frame>,
    /// Depth of the frame owning the collection being built.
    base: usize,
}

pub(crate) fn build_tree<'s>(
    source: &'s str,
    concrete: Vec<ConcreteNode<'s>>,
    mode: ParseMode,
) -> Result<Document<'s>, StructuralError> {
    let mut builder = TreeBuilder {
        source,
        document: Document::new(source),
        cursor: Vec::new(),
        base: 0,
    };
    builder.push(Document::ROOT, Collection::Children);
    builder.base = 1;
    for node in concrete {
        builder.build(node)?;
    }

    if builder.cursor.len() > 1 {
        if mode == ParseMode::Strict {
            return Err(builder.unterminated());
        }
        while builder.cursor.len() > 1 {
            builder.finish_open_node();
        }
    }
    Ok(builder.document)
}

impl<'s> TreeBuilder<'s> {
    fn push(&mut self, node: NodeId, collection: Collection) {
        log::trace!("push {collection:?} of node {}", node.index());
        self.cursor.push(Frame { node, collection });
    }

    fn pop(&mut self) {
        if let Some(frame) = self.cursor.pop() {
            log::trace!("pop {:?} of node {}", frame.collection, frame.node.index());
        }
    }

    fn current(&self) -> Frame {
        self.cursor
            .last()
            .copied()
            .unwrap_or_else(|| unreachable!("cursor always holds the root frame"))
    }

    fn collection_mut(&mut self, frame: Frame) -> &mut Vec<NodeId> {
        let node = self.document.node_mut(frame.node);
        match (frame.collection, &mut node.kind) {
            (
                Collection::Children,
                NodeKind::Document { children }
                | NodeKind::HtmlElement { children, .. }
                | NodeKind::LiquidBranch(LiquidBranch { children, .. })
                | NodeKind::LiquidTag(LiquidTag {
                    children: Some(children),
                    ..
                }),
            ) => children,
            (
                Collection::Attributes,
                NodeKind::HtmlElement { attributes, .. }
                | NodeKind::HtmlVoidElement { attributes, .. }
                | NodeKind::HtmlSelfClosingElement { attributes, .. }
                | NodeKind::HtmlRawNode { attributes, .. },
            ) => attributes,
            (
                Collection::Name,
                NodeKind::HtmlElement { name, .. }
                | NodeKind::HtmlSelfClosingElement { name, .. }
                | NodeKind::AttrSingleQuoted { name, .. }
                | NodeKind::AttrDoubleQuoted { name, .. }
                | NodeKind::AttrUnquoted { name, .. }
                | NodeKind::AttrEmpty { name },
            ) => name,
            (
                Collection::Value,
                NodeKind::AttrSingleQuoted { value, .. }
                | NodeKind::AttrDoubleQuoted { value, .. }
                | NodeKind::AttrUnquoted { value, .. },
            ) => value,
            (collection, kind) => unreachable!("{kind:?} has no {collection:?} collection"),
        }
    }

    /// Append a node to the collection under the cursor.
    fn append(&mut self, id: NodeId) {
        let frame = self.current();
        self.collection_mut(frame).push(id);
        let end = self.document.node(id).end;
        let parent = self.document.node_mut(frame.node);
        if matches!(parent.kind, NodeKind::LiquidBranch(..)) && parent.end < end {
            parent.end = end;
        }
    }

    fn build(&mut self, node: ConcreteNode<'s>) -> Result<(), StructuralError> {
        let ConcreteNode { kind, start, end } = node;
        match kind {
            ConcreteKind::Text => {
                let source = self.source;
                let id = self.alloc(
                    NodeKind::Text {
                        value: &source[start..end],
                    },
                    start,
                    end,
                );
                self.append(id);
            }
            ConcreteKind::YamlFrontmatter { body } => {
                let id = self.alloc(NodeKind::YamlFrontmatter { body }, start, end);
                self.append(id);
            }
            ConcreteKind::HtmlComment { body } => {
                let id = self.alloc(NodeKind::HtmlComment { body }, start, end);
                self.append(id);
            }
            ConcreteKind::HtmlDoctype { legacy } => {
                let id = self.alloc(NodeKind::HtmlDoctype { legacy }, start, end);
                self.append(id);
            }
            ConcreteKind::HtmlTagOpen { name, attrs } => {
                let id = self.alloc(
                    NodeKind::HtmlElement {
                        name: Vec::new(),
                        attributes: Vec::new(),
                        children: Vec::new(),
                        block_start: (start, end),
                        block_end: (end, end),
                    },
                    start,
                    end,
                );
                self.build_collection(id, Collection::Name, name)?;
                self.build_collection(id, Collection::Attributes, attrs)?;
                self.append(id);
                self.push(id, Collection::Children);
            }
            ConcreteKind::HtmlTagClose { name } => {
                let closer = self.concrete_name(&name);
                self.close_html(closer, start, end)?;
            }
            ConcreteKind::HtmlVoidElement { name, attrs } => {
                let id = self.alloc(
                    NodeKind::HtmlVoidElement {
                        name,
                        attributes: Vec::new(),
                    },
                    start,
                    end,
                );
                self.build_collection(id, Collection::Attributes, attrs)?;
                self.append(id);
            }
            ConcreteKind::HtmlSelfClosingElement { name, attrs } => {
                let id = self.alloc(
                    NodeKind::HtmlSelfClosingElement {
                        name: Vec::new(),
                        attributes: Vec::new(),
                    },
                    start,
                    end,
                );
                self.build_collection(id, Collection::Name, name)?;
                self.build_collection(id, Collection::Attributes, attrs)?;
                self.append(id);
            }
            ConcreteKind::HtmlRawTag {
                name,
                attrs,
                body,
                block_start,
                block_end,
            } => {
                let kind = self.detect_raw_kind(name, &attrs);
                let id = self.alloc(
                    NodeKind::HtmlRawNode {
                        name,
                        attributes: Vec::new(),
                        body: RawBody {
                            value: body.value,
                            start: body.start,
                            end: body.end,
                            kind,
                        },
                        block_start,
                        block_end,
                    },
                    start,
                    end,
                );
                self.build_collection(id, Collection::Attributes, attrs)?;
                self.append(id);
            }
            ConcreteKind::LiquidDrop { markup, delimiter } => {
                let id = self.alloc(
                    NodeKind::LiquidDrop {
                        markup: markup::drop_markup(markup),
                        delimiter,
                    },
                    start,
                    end,
                );
                self.append(id);
            }
            ConcreteKind::LiquidRawTag {
                name,
                markup,
                body,
                block_start,
                block_end,
            } => {
                let id = self.alloc(
                    NodeKind::LiquidRawTag {
                        name,
                        markup: markup.trim(),
                        body: RawBody {
                            value: body.value,
                            start: body.start,
                            end: body.end,
                            kind: raw_tag_kind(name),
                        },
                        block_start,
                        block_end,
                    },
                    start,
                    end,
                );
                self.append(id);
            }
            ConcreteKind::LiquidTagOpen {
                name,
                markup,
                delimiter,
            } => {
                let id = self.alloc(
                    NodeKind::LiquidTag(LiquidTag {
                        name,
                        markup: markup::tag_markup(markup),
                        children: Some(Vec::new()),
                        block_start: delimiter,
                        block_end: None,
                    }),
                    start,
                    end,
                );
                self.append(id);
                self.push(id, Collection::Children);
                if is_branched_tag_name(name) {
                    self.open_branch(
                        None,
                        LiquidMarkup::Base(""),
                        Delimiter {
                            start: end,
                            end,
                            trim_left: false,
                            trim_right: false,
                        },
                    );
                }
            }
            ConcreteKind::LiquidTagClose { name, delimiter } => {
                self.close_liquid(name, delimiter)?;
            }
            ConcreteKind::LiquidTag {
                name,
                markup,
                delimiter,
            } => {
                if matches!(name, "elsif" | "else" | "when") {
                    if self.cursor.len() <= self.base {
                        return Err(StructuralError {
                            kind: StructuralErrorKind::ClosedBeforeOpened {
                                closer: name.to_owned(),
                            },
                            start,
                            end,
                            open: None,
                        });
                    }
                    // a branch must switch inside its own tag, not inside an element
                    if !self.in_branch() {
                        return Err(self.mismatched(name.to_owned(), start, end));
                    }
                    self.close_branch(start);
                    self.pop();
                    self.open_branch(Some(name), markup::tag_markup(markup), delimiter);
                } else {
                    let id = self.alloc(
                        NodeKind::LiquidTag(LiquidTag {
                            name,
                            markup: markup::tag_markup(markup),
                            children: None,
                            block_start: delimiter,
                            block_end: None,
                        }),
                        start,
                        end,
                    );
                    self.append(id);
                }
            }
            ConcreteKind::AttrSingleQuoted { name, value } => {
                let kind = NodeKind::AttrSingleQuoted {
                    name: Vec::new(),
                    value: Vec::new(),
                };
                self.build_attr(kind, start, end, name, value)?;
            }
            ConcreteKind::AttrDoubleQuoted { name, value } => {
                let kind = NodeKind::AttrDoubleQuoted {
                    name: Vec::new(),
                    value: Vec::new(),
                };
                self.build_attr(kind, start, end, name, value)?;
            }
            ConcreteKind::AttrUnquoted { name, value } => {
                let kind = NodeKind::AttrUnquoted {
                    name: Vec::new(),
                    value: Vec::new(),
                };
                self.build_attr(kind, start, end, name, value)?;
            }
            ConcreteKind::AttrEmpty { name } => {
                let kind = NodeKind::AttrEmpty { name: Vec::new() };
                self.build_attr(kind, start, end, name, Vec::new())?;
            }
        }
        Ok(())
    }

    fn alloc(&mut self, kind: NodeKind<'s>, start: usize, end: usize) -> NodeId {
        self.document.alloc(Node::new(kind, start, end))
    }

    fn build_attr(
        &mut self,
        kind: NodeKind<'s>,
        start: usize,
        end: usize,
        name: Vec<ConcreteNode<'s>>,
        value: Vec<ConcreteNode<'s>>,
    ) -> Result<(), StructuralError> {
        let has_value = !matches!(kind, NodeKind::AttrEmpty { .. });
        let id = self.alloc(kind, start, end);
        self.build_collection(id, Collection::Name, name)?;
        if has_value {
            self.build_collection(id, Collection::Value, value)?;
        }
        self.append(id);
        Ok(())
    }

    /// Build a nested collection such as attributes with its own cursor base,
    /// so closers can't escape it.
    fn build_collection(
        &mut self,
        id: NodeId,
        collection: Collection,
        nodes: Vec<ConcreteNode<'s>>,
    ) -> Result<(), StructuralError> {
        self.push(id, collection);
        let base = self.base;
        self.base = self.cursor.len();
        for node in nodes {
            self.build(node)?;
        }
        if self.cursor.len() > self.base {
            return Err(self.unterminated());
        }
        self.base = base;
        self.pop();
        Ok(())
    }

    fn in_branch(&self) -> bool {
        self.cursor.len() > self.base
            && matches!(
                self.document.node(self.current().node).kind,
                NodeKind::LiquidBranch(..)
            )
    }

    fn open_branch(&mut self, name: Option<&'s str>, markup: LiquidMarkup<'s>, delimiter: Delimiter) {
        let id = self.alloc(
            NodeKind::LiquidBranch(LiquidBranch {
                name,
                markup,
                children: Vec::new(),
                block_start: delimiter,
            }),
            delimiter.start,
            delimiter.end,
        );
        self.append(id);
        self.push(id, Collection::Children);
    }

    /// Finalize the branch under the cursor. `next_start` is where the next
    /// branch or the closer begins.
    fn close_branch(&mut self, next_start: usize) {
        let id = self.current().node;
        let node = self.document.node_mut(id);
        node.end = node.end.min(next_start).max(node.start);
    }

    fn close_html(&mut self, closer: String, start: usize, end: usize) -> Result<(), StructuralError> {
        if self.cursor.len() <= self.base {
            return Err(StructuralError {
                kind: StructuralErrorKind::ClosedBeforeOpened { closer },
                start,
                end,
                open: None,
            });
        }
        let id = self.current().node;
        let matched = match &self.document.node(id).kind {
            NodeKind::HtmlElement { name, .. } => {
                self.document.resolved_name(name).eq_ignore_ascii_case(&closer)
            }
            _ => false,
        };
        if !matched {
            return Err(self.mismatched(closer, start, end));
        }

        let node = self.document.node_mut(id);
        node.end = end;
        if let NodeKind::HtmlElement { block_end, .. } = &mut node.kind {
            *block_end = (start, end);
        }
        self.pop();
        Ok(())
    }

    fn close_liquid(&mut self, closer: &'s str, delimiter: Delimiter) -> Result<(), StructuralError> {
        let closer_name = format!("end{closer}");
        if self.cursor.len() <= self.base {
            return Err(StructuralError {
                kind: StructuralErrorKind::ClosedBeforeOpened {
                    closer: closer_name,
                },
                start: delimiter.start,
                end: delimiter.end,
                open: None,
            });
        }
        if self.in_branch() {
            self.close_branch(delimiter.start);
            self.pop();
        }

        let id = self.current().node;
        let matched = self.cursor.len() > self.base
            && matches!(&self.document.node(id).kind, NodeKind::LiquidTag(tag) if tag.name == closer);
        if !matched {
            return Err(self.mismatched(closer_name, delimiter.start, delimiter.end));
        }

        let node = self.document.node_mut(id);
        node.end = delimiter.end;
        if let NodeKind::LiquidTag(tag) = &mut node.kind {
            tag.block_end = Some(delimiter);
        }
        self.pop();
        Ok(())
    }

    /// Innermost open node that isn't a synthetic branch.
    fn open_node(&self) -> Option<OpenNode> {
        self.cursor[self.base.min(self.cursor.len())..]
            .iter()
            .rev()
            .map(|frame| frame.node)
            .find(|id| !matches!(self.document.node(*id).kind, NodeKind::LiquidBranch(..)))
            .map(|id| {
                let node = self.document.node(id);
                let (start, end) = match &node.kind {
                    NodeKind::HtmlElement { block_start, .. } => *block_start,
                    NodeKind::LiquidTag(tag) => (tag.block_start.start, tag.block_start.end),
                    _ => (node.start, node.end),
                };
                OpenNode {
                    name: self.document.node_name(id).unwrap_or_default(),
                    start,
                    end,
                }
            })
    }

    fn mismatched(&self, closer: String, start: usize, end: usize) -> StructuralError {
        StructuralError {
            kind: StructuralErrorKind::Mismatched { closer },
            start,
            end,
            open: self.open_node(),
        }
    }

    fn unterminated(&self) -> StructuralError {
        let open = self.open_node();
        let (start, end) = open
            .as_ref()
            .map_or((self.source.len(), self.source.len()), |open| (open.start, open.end));
        StructuralError {
            kind: StructuralErrorKind::Unterminated,
            start,
            end,
            open,
        }
    }

    /// Close the innermost open node at end of input, in tolerant mode.
    fn finish_open_node(&mut self) {
        let id = self.current().node;
        let last_end = self
            .document
            .node(id)
            .children()
            .and_then(|children| children.last())
            .map(|child| self.document.node(*child).end);
        if let Some(last_end) = last_end {
            let node = self.document.node_mut(id);
            node.end = node.end.max(last_end);
        }
        self.pop();
        if let Some(frame) = self.cursor.last() {
            let end = self.document.node(id).end;
            let parent = self.document.node_mut(frame.node);
            if !matches!(parent.kind, NodeKind::Document { .. }) {
                parent.end = parent.end.max(end);
            }
        }
    }

    fn concrete_name(&self, fragments: &[ConcreteNode<'s>]) -> String {
        fragments
            .iter()
            .map(|fragment| {
                let text = &self.source[fragment.start..fragment.end];
                match fragment.kind {
                    ConcreteKind::Text => text,
                    _ => text.trim(),
                }
            })
            .collect()
    }

    fn detect_raw_kind(&self, name: &str, attrs: &[ConcreteNode<'s>]) -> RawKind {
        if name.eq_ignore_ascii_case("style") {
            return RawKind::Css;
        }
        let attr_value = |attr_name: &str| {
            attrs.iter().find_map(|attr| match &attr.kind {
                ConcreteKind::AttrDoubleQuoted { name, value }
                | ConcreteKind::AttrSingleQuoted { name, value }
                | ConcreteKind::AttrUnquoted { name, value }
                    if self.concrete_name(name).eq_ignore_ascii_case(attr_name) =>
                {
                    match &value[..] {
                        [] => Some(""),
                        [fragment] if matches!(fragment.kind, ConcreteKind::Text) => {
                            Some(&self.source[fragment.start..fragment.end])
                        }
                        _ => None,
                    }
                }
                _ => None,
            })
        };
        if let Some(lang) = attr_value("lang") {
            match lang.trim() {
                "ts" | "typescript" => return RawKind::Typescript,
                "json" => return RawKind::Json,
                _ => {}
            }
        }
        match attr_value("type").map(|value| value.trim().to_ascii_lowercase()) {
            None => RawKind::Javascript,
            Some(value) => match value.as_str() {
                "" | "module" | "text/javascript" | "text/babel" | "application/javascript"
                | "jsx" => RawKind::Javascript,
                "application/x-typescript" | "text/typescript" | "ts" => RawKind::Typescript,
                "application/json" | "application/ld+json" | "importmap" | "speculationrules" => {
                    RawKind::Json
                }
                "text/markdown" => RawKind::Markdown,
                "text/html" | "text/template" | "text/x-template" | "text/x-handlebars-template" => {
                    RawKind::Html
                }
                _ => RawKind::Text,
            },
        }
    }
}

fn raw_tag_kind(name: &str) -> RawKind {
    match name {
        "javascript" => RawKind::Javascript,
        "schema" => RawKind::Json,
        "style" | "stylesheet" => RawKind::Css,
        _ => RawKind::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ParseError, parser::parse};

    fn branch_names<'s>(document: &Document<'s>, tag: NodeId) -> Vec<Option<&'s str>> {
        document
            .node(tag)
            .children()
            .unwrap()
            .iter()
            .map(|id| match &document.node(*id).kind {
                NodeKind::LiquidBranch(branch) => branch.name,
                kind => panic!("expected branch, found {kind:?}"),
            })
            .collect()
    }

    fn structural(source: &str) -> StructuralError {
        match parse(source, ParseMode::Strict).unwrap_err() {
            ParseError::Structural(error) => error,
            error => panic!("expected structural error, found {error:?}"),
        }
    }

    #[test]
    fn drop_with_number() {
        let document = parse("{{ 1 }}", ParseMode::Strict).unwrap();
        let [drop] = document.children() else {
            panic!("expected one child");
        };
        match &document.node(*drop).kind {
            NodeKind::LiquidDrop {
                markup: DropMarkup::Variable(variable),
                ..
            } => {
                assert_eq!(variable.expression, Expression::Number("1"));
                assert!(variable.filters.is_empty());
            }
            kind => panic!("unexpected {kind:?}"),
        }
    }

    #[test]
    fn void_element_attributes() {
        let document = parse(
            r#"<img src="a" loading='lazy' disabled checked="">"#,
            ParseMode::Strict,
        )
        .unwrap();
        let [img] = document.children() else {
            panic!("expected one child");
        };
        let NodeKind::HtmlVoidElement { name, attributes } = &document.node(*img).kind else {
            panic!("expected void element");
        };
        assert_eq!(*name, "img");
        assert_eq!(attributes.len(), 4);
        assert!(matches!(
            document.node(attributes[0]).kind,
            NodeKind::AttrDoubleQuoted { .. }
        ));
        assert!(matches!(
            document.node(attributes[1]).kind,
            NodeKind::AttrSingleQuoted { .. }
        ));
        assert!(matches!(
            document.node(attributes[2]).kind,
            NodeKind::AttrEmpty { .. }
        ));
        let checked = document.node(attributes[3]);
        assert_eq!(document.resolved_name(checked.name_fragments().unwrap()), "checked");
        assert_eq!(checked.value_fragments(), Some(&[][..]));
    }

    #[test]
    fn if_branches() {
        let document = parse(
            "{% if A %}A{% elsif B %}B{% else %}C{% endif %}",
            ParseMode::Strict,
        )
        .unwrap();
        let [tag] = document.children() else {
            panic!("expected one child");
        };
        assert_eq!(
            branch_names(&document, *tag),
            [None, Some("elsif"), Some("else")]
        );
        let node = document.node(*tag);
        assert_eq!((node.start, node.end), (0, 47));
    }

    #[test]
    fn case_branches() {
        let document = parse(
            "{% case x %} {% when 1 %}a{% when 2, 3 %}b{% else %}c{% endcase %}",
            ParseMode::Strict,
        )
        .unwrap();
        let tag = document.children()[0];
        assert_eq!(
            branch_names(&document, tag),
            [None, Some("when"), Some("when"), Some("else")]
        );
    }

    #[test]
    fn unless_for_tablerow_branches() {
        let document = parse(
            "{% unless a %}x{% else %}y{% endunless %}",
            ParseMode::Strict,
        )
        .unwrap();
        assert_eq!(
            branch_names(&document, document.children()[0]),
            [None, Some("else")]
        );

        let document = parse(
            "{% for i in list %}{{ i }}{% else %}none{% endfor %}",
            ParseMode::Strict,
        )
        .unwrap();
        let tag = document.children()[0];
        assert_eq!(branch_names(&document, tag), [None, Some("else")]);
        let first = document.node(tag).children().unwrap()[0];
        assert!(matches!(
            document.node(document.node(first).children().unwrap()[0]).kind,
            NodeKind::LiquidDrop { .. }
        ));

        let document = parse(
            "{% tablerow i in list cols: 2 %}{{ i }}{% endtablerow %}",
            ParseMode::Strict,
        )
        .unwrap();
        assert_eq!(branch_names(&document, document.children()[0]), [None]);
    }

    #[test]
    fn branch_inside_element_is_mismatched() {
        let error = structural("{% if a %}<div>{% else %}</div>{% endif %}");
        assert_eq!(
            error.kind,
            StructuralErrorKind::Mismatched {
                closer: "else".into()
            }
        );
        assert_eq!(error.open.unwrap().name, "div");
        assert_eq!((error.start, error.end), (15, 25));

        let error = structural("{% case a %}<p>{% when 1 %}</p>{% endcase %}");
        assert_eq!(
            error.kind,
            StructuralErrorKind::Mismatched {
                closer: "when".into()
            }
        );
    }

    #[test]
    fn branch_without_tag() {
        let error = structural("a{% else %}b");
        assert_eq!(
            error.kind,
            StructuralErrorKind::ClosedBeforeOpened {
                closer: "else".into()
            }
        );
        assert_eq!((error.start, error.end), (1, 11));
        assert!(error.open.is_none());
    }

    #[test]
    fn grammar_error_position() {
        let source = "<p>x</p>\n{{ a";
        let error = parse(source, ParseMode::Strict).unwrap_err();
        assert!(matches!(error, ParseError::Grammar(..)));
        let diagnostic = error.diagnostic(source);
        assert_eq!(diagnostic.start.line, 2);
        assert_eq!(diagnostic.start.col, 5);
        assert_eq!(diagnostic.excerpt, "{{ a");
    }

    #[test]
    fn branch_positions() {
        let source = "{% if a %} x {% else %} y {% endif %}";
        let document = parse(source, ParseMode::Strict).unwrap();
        let tag = document.children()[0];
        let branches = document.node(tag).children().unwrap();
        let first = document.node(branches[0]);
        assert_eq!(&source[first.start..first.end], " x");
        let second = document.node(branches[1]);
        assert_eq!(&source[second.start..second.end], "{% else %} y");
    }

    #[test]
    fn script_is_raw_javascript() {
        let document = parse("<script>1</script>", ParseMode::Strict).unwrap();
        match &document.node(document.children()[0]).kind {
            NodeKind::HtmlRawNode { name, body, .. } => {
                assert_eq!(*name, "script");
                assert_eq!(body.value, "1");
                assert_eq!(body.kind, RawKind::Javascript);
            }
            kind => panic!("unexpected {kind:?}"),
        }
    }

    #[test]
    fn script_kind_from_type() {
        let document = parse(
            r#"<script type="application/ld+json">{}</script>"#,
            ParseMode::Strict,
        )
        .unwrap();
        assert!(matches!(
            &document.node(document.children()[0]).kind,
            NodeKind::HtmlRawNode { body: RawBody { kind: RawKind::Json, .. }, .. }
        ));
    }

    #[test]
    fn mismatched_close() {
        let error = structural("<a><div></a>");
        assert_eq!(
            error.kind,
            StructuralErrorKind::Mismatched {
                closer: "a".into()
            }
        );
        let open = error.open.unwrap();
        assert_eq!(open.name, "div");
        assert_eq!((open.start, open.end), (3, 8));
        assert_eq!((error.start, error.end), (8, 12));
    }

    #[test]
    fn unterminated_if() {
        let error = structural("{% if a %}");
        assert_eq!(error.kind, StructuralErrorKind::Unterminated);
        assert_eq!(error.open.unwrap().name, "if");
    }

    #[test]
    fn tolerant_mode_accepts_open_nodes() {
        let document = parse("<div>{% if a %}<p>hi", ParseMode::Tolerant).unwrap();
        let div = document.node(document.children()[0]);
        assert_eq!(div.end, 20);
    }

    #[test]
    fn close_before_open() {
        let error = structural("</p>");
        assert_eq!(
            error.kind,
            StructuralErrorKind::ClosedBeforeOpened {
                closer: "p".into()
            }
        );
        let error = structural("{% endif %}");
        assert_eq!(
            error.kind,
            StructuralErrorKind::ClosedBeforeOpened {
                closer: "endif".into()
            }
        );
    }

    #[test]
    fn close_tag_case_insensitive() {
        assert!(parse("<DIV>x</div>", ParseMode::Strict).is_ok());
    }

    #[test]
    fn liquid_in_attributes() {
        let document = parse(
            r#"<div {% if a %}hidden{% endif %} class="a {{ b }}"></div>"#,
            ParseMode::Strict,
        )
        .unwrap();
        let div = document.node(document.children()[0]);
        let attributes = div.attributes().unwrap();
        assert_eq!(attributes.len(), 2);
        assert!(document.node(attributes[0]).is_branched_tag());
        let values = document.node(attributes[1]).value_fragments().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(document.text(values[0]), "a ");
    }

    #[test]
    fn unclosed_tag_in_attributes() {
        let error = structural(r#"<div {% if a %}></div>"#);
        assert_eq!(error.kind, StructuralErrorKind::Unterminated);
        assert_eq!(error.open.unwrap().name, "if");
    }

    #[test]
    fn dynamic_tag_name() {
        let document = parse("<{{ kind }}-header>x</{{ kind }}-header>", ParseMode::Strict).unwrap();
        let element = document.children()[0];
        assert_eq!(document.node_name(element).unwrap(), "{{ kind }}-header");
    }
}
