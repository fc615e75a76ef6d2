//! Stage 1: drive the grammar and map each matched rule to a flat node.
//!
//! Open and close constructs stay separate here; nesting is resolved by the
//! tree builder.

use super::{LiquidHtmlParser, Rule};
use crate::{ast::Delimiter, error::GrammarError, helpers};
use pest::{
    Parser,
    error::InputLocation,
    iterators::{Pair, Pairs},
};

#[derive(Clone, Debug)]
pub(crate) struct ConcreteNode<'s> {
    pub(crate) kind: ConcreteKind<'s>,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct RawSlice<'s> {
    pub(crate) value: &'s str,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Clone, Debug)]
/// Markup captured by the grammar, converted to typed markup in stage 2.
pub(crate) enum ConcreteMarkup<'s> {
    Base(&'s str),
    Parsed(Pair<'s, Rule>),
}

#[derive(Clone, Debug)]
pub(crate) enum ConcreteKind<'s> {
    Text,
    YamlFrontmatter {
        body: &'s str,
    },
    HtmlTagOpen {
        name: Vec<ConcreteNode<'s>>,
        attrs: Vec<ConcreteNode<'s>>,
    },
    HtmlTagClose {
        name: Vec<ConcreteNode<'s>>,
    },
    HtmlVoidElement {
        name: &'s str,
        attrs: Vec<ConcreteNode<'s>>,
    },
    HtmlSelfClosingElement {
        name: Vec<ConcreteNode<'s>>,
        attrs: Vec<ConcreteNode<'s>>,
    },
    HtmlRawTag {
        name: &'s str,
        attrs: Vec<ConcreteNode<'s>>,
        body: RawSlice<'s>,
        block_start: (usize, usize),
        block_end: (usize, usize),
    },
    HtmlComment {
        body: &'s str,
    },
    HtmlDoctype {
        legacy: &'s str,
    },
    LiquidTagOpen {
        name: &'s str,
        markup: ConcreteMarkup<'s>,
        delimiter: Delimiter,
    },
    LiquidTagClose {
        name: &'s str,
        delimiter: Delimiter,
    },
    LiquidTag {
        name: &'s str,
        markup: ConcreteMarkup<'s>,
        delimiter: Delimiter,
    },
    LiquidRawTag {
        name: &'s str,
        markup: &'s str,
        body: RawSlice<'s>,
        block_start: Delimiter,
        block_end: Delimiter,
    },
    LiquidDrop {
        markup: ConcreteMarkup<'s>,
        delimiter: Delimiter,
    },
    AttrSingleQuoted {
        name: Vec<ConcreteNode<'s>>,
        value: Vec<ConcreteNode<'s>>,
    },
    AttrDoubleQuoted {
        name: Vec<ConcreteNode<'s>>,
        value: Vec<ConcreteNode<'s>>,
    },
    AttrUnquoted {
        name: Vec<ConcreteNode<'s>>,
        value: Vec<ConcreteNode<'s>>,
    },
    AttrEmpty {
        name: Vec<ConcreteNode<'s>>,
    },
}

/// Parse source text into a flat sequence of concrete nodes.
pub(crate) fn parse_concrete(source: &str) -> Result<Vec<ConcreteNode<'_>>, GrammarError> {
    let pairs = LiquidHtmlParser::parse(Rule::document, source).map_err(|error| {
        let pos = match error.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((_, end)) => end,
        };
        GrammarError {
            reason: error.variant.message().into_owned(),
            pos,
        }
    })?;

    Ok(pairs
        .flat_map(Pair::into_inner)
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(build_node)
        .collect())
}

pub(super) fn next_pair<'s>(pairs: &mut Pairs<'s, Rule>) -> Pair<'s, Rule> {
    pairs
        .next()
        .unwrap_or_else(|| unreachable!("grammar guarantees the inner pair exists"))
}

fn build_node(pair: Pair<'_, Rule>) -> ConcreteNode<'_> {
    let span = pair.as_span();
    let (start, end) = (span.start(), span.end());
    let kind = match pair.as_rule() {
        Rule::text_node => ConcreteKind::Text,
        Rule::yaml_frontmatter => ConcreteKind::YamlFrontmatter {
            body: next_pair(&mut pair.into_inner()).as_str(),
        },
        Rule::html_comment => ConcreteKind::HtmlComment {
            body: next_pair(&mut pair.into_inner()).as_str(),
        },
        Rule::html_doctype => ConcreteKind::HtmlDoctype {
            legacy: next_pair(&mut pair.into_inner()).as_str().trim(),
        },
        Rule::html_raw_tag => build_html_raw_tag(pair),
        Rule::html_tag_open => build_html_tag_open(pair),
        Rule::html_tag_close => ConcreteKind::HtmlTagClose {
            name: build_name(next_pair(&mut pair.into_inner())),
        },
        Rule::liquid_drop => {
            let (delimiter, _, markup) = liquid_delimiter_parts(pair);
            ConcreteKind::LiquidDrop { markup, delimiter }
        }
        Rule::liquid_raw_tag => build_liquid_raw_tag(pair),
        Rule::liquid_tag_close => {
            let (delimiter, name, _) = liquid_delimiter_parts(pair);
            ConcreteKind::LiquidTagClose { name, delimiter }
        }
        Rule::liquid_tag_open => {
            let (delimiter, name, markup) = liquid_delimiter_parts(pair);
            ConcreteKind::LiquidTagOpen {
                name,
                markup,
                delimiter,
            }
        }
        Rule::liquid_tag => {
            let (delimiter, name, markup) = liquid_delimiter_parts(pair);
            ConcreteKind::LiquidTag {
                name,
                markup,
                delimiter,
            }
        }
        Rule::attr_double_quoted => {
            let (name, value) = build_attr_parts(pair);
            ConcreteKind::AttrDoubleQuoted { name, value }
        }
        Rule::attr_single_quoted => {
            let (name, value) = build_attr_parts(pair);
            ConcreteKind::AttrSingleQuoted { name, value }
        }
        Rule::attr_unquoted => {
            let (name, value) = build_attr_parts(pair);
            ConcreteKind::AttrUnquoted { name, value }
        }
        Rule::attr_empty => ConcreteKind::AttrEmpty {
            name: build_name(next_pair(&mut pair.into_inner())),
        },
        // name and value fragments
        Rule::tag_name_text
        | Rule::attr_name_text
        | Rule::attr_text_double
        | Rule::attr_text_single
        | Rule::attr_text_unquoted => ConcreteKind::Text,
        rule => unreachable!("unexpected rule {rule:?} at node position"),
    };
    ConcreteNode { kind, start, end }
}

fn build_name(pair: Pair<'_, Rule>) -> Vec<ConcreteNode<'_>> {
    pair.into_inner().map(build_node).collect()
}

fn build_attr_parts(pair: Pair<'_, Rule>) -> (Vec<ConcreteNode<'_>>, Vec<ConcreteNode<'_>>) {
    let mut inner = pair.into_inner();
    let name = build_name(next_pair(&mut inner));
    let value = inner
        .next()
        .map(|value| value.into_inner().map(build_node).collect())
        .unwrap_or_default();
    (name, value)
}

fn build_html_tag_open(pair: Pair<'_, Rule>) -> ConcreteKind<'_> {
    let mut inner = pair.into_inner();
    let name_pair = next_pair(&mut inner);
    let mut attrs = Vec::new();
    let mut self_closing = false;
    for pair in inner {
        if pair.as_rule() == Rule::html_tag_end {
            self_closing = pair.as_str() == "/>";
        } else {
            attrs.push(build_node(pair));
        }
    }

    let literal_name = {
        let mut fragments = name_pair.clone().into_inner();
        match (fragments.next(), fragments.next()) {
            (Some(fragment), None) if fragment.as_rule() == Rule::tag_name_text => {
                Some(fragment.as_str())
            }
            _ => None,
        }
    };
    match literal_name {
        Some(name) if !self_closing && helpers::is_void_element(name) => {
            ConcreteKind::HtmlVoidElement { name, attrs }
        }
        _ if self_closing => ConcreteKind::HtmlSelfClosingElement {
            name: build_name(name_pair),
            attrs,
        },
        _ => ConcreteKind::HtmlTagOpen {
            name: build_name(name_pair),
            attrs,
        },
    }
}

fn build_html_raw_tag(pair: Pair<'_, Rule>) -> ConcreteKind<'_> {
    let mut inner = pair.into_inner();
    let open = next_pair(&mut inner);
    let body = next_pair(&mut inner);
    let close = next_pair(&mut inner);

    let block_start = (open.as_span().start(), open.as_span().end());
    let mut open_inner = open.into_inner();
    let name = next_pair(&mut open_inner).as_str();
    let attrs = open_inner.map(build_node).collect();

    ConcreteKind::HtmlRawTag {
        name,
        attrs,
        body: RawSlice {
            value: body.as_str(),
            start: body.as_span().start(),
            end: body.as_span().end(),
        },
        block_start,
        block_end: (close.as_span().start(), close.as_span().end()),
    }
}

fn build_liquid_raw_tag(pair: Pair<'_, Rule>) -> ConcreteKind<'_> {
    let mut inner = pair.into_inner();
    let open = next_pair(&mut inner);
    let body = next_pair(&mut inner);
    let close = next_pair(&mut inner);

    let (block_start, name, markup) = liquid_delimiter_parts(open);
    let (block_end, _, _) = liquid_delimiter_parts(close);
    ConcreteKind::LiquidRawTag {
        name,
        markup: match markup {
            ConcreteMarkup::Base(markup) => markup,
            ConcreteMarkup::Parsed(pair) => pair.as_str(),
        },
        body: RawSlice {
            value: body.as_str(),
            start: body.as_span().start(),
            end: body.as_span().end(),
        },
        block_start,
        block_end,
    }
}

/// Split a `{% … %}` or `{{ … }}` pair into its delimiter, tag name and markup.
fn liquid_delimiter_parts(pair: Pair<'_, Rule>) -> (Delimiter, &str, ConcreteMarkup<'_>) {
    let span = pair.as_span();
    let mut delimiter = Delimiter {
        start: span.start(),
        end: span.end(),
        trim_left: false,
        trim_right: false,
    };
    let mut name = "";
    let mut markup = ConcreteMarkup::Base("");
    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::trim_start => delimiter.trim_left = true,
            Rule::trim_end => delimiter.trim_right = true,
            Rule::block_name | Rule::tag_name | Rule::raw_tag_name => name = pair.as_str(),
            Rule::markup_base | Rule::markup_base_drop => markup = ConcreteMarkup::Base(pair.as_str()),
            _ => {
                if name.is_empty() && pair.as_rule() != Rule::drop_markup {
                    name = leading_word(pair.as_str());
                }
                markup = ConcreteMarkup::Parsed(pair);
            }
        }
    }
    (delimiter, name, markup)
}

fn leading_word(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<ConcreteKind<'_>> {
        parse_concrete(source)
            .unwrap()
            .into_iter()
            .map(|node| node.kind)
            .collect()
    }

    #[test]
    fn text_excludes_surrounding_whitespace() {
        let nodes = parse_concrete("  hello   world \n<p>").unwrap();
        assert_eq!((nodes[0].start, nodes[0].end), (2, 15));
        assert!(matches!(nodes[1].kind, ConcreteKind::HtmlTagOpen { .. }));
    }

    #[test]
    fn open_and_close_stay_flat() {
        let kinds = kinds("{% if a %}<b>x</b>{% endif %}");
        assert_eq!(kinds.len(), 5);
        assert!(matches!(kinds[0], ConcreteKind::LiquidTagOpen { name: "if", .. }));
        assert!(matches!(kinds[4], ConcreteKind::LiquidTagClose { name: "if", .. }));
    }

    #[test]
    fn trim_markers() {
        let nodes = kinds("{%- assign x = 1 -%}{{- x }}");
        match &nodes[0] {
            ConcreteKind::LiquidTag {
                name, delimiter, ..
            } => {
                assert_eq!(*name, "assign");
                assert!(delimiter.trim_left && delimiter.trim_right);
            }
            kind => panic!("unexpected {kind:?}"),
        }
        match &nodes[1] {
            ConcreteKind::LiquidDrop { delimiter, .. } => {
                assert!(delimiter.trim_left && !delimiter.trim_right);
            }
            kind => panic!("unexpected {kind:?}"),
        }
    }

    #[test]
    fn unknown_tags_keep_base_markup() {
        match &kinds("{% form 'product', product %}{% endform %}")[0] {
            ConcreteKind::LiquidTagOpen {
                name,
                markup: ConcreteMarkup::Base(markup),
                ..
            } => {
                assert_eq!(*name, "form");
                assert_eq!(*markup, "'product', product");
            }
            kind => panic!("unexpected {kind:?}"),
        }
    }

    #[test]
    fn raw_tag_body_is_not_parsed() {
        match &kinds("{% raw %}{{ x }}{% if %}{% endraw %}")[0] {
            ConcreteKind::LiquidRawTag { name, body, .. } => {
                assert_eq!(*name, "raw");
                assert_eq!(body.value, "{{ x }}{% if %}");
            }
            kind => panic!("unexpected {kind:?}"),
        }
    }

    #[test]
    fn html_raw_tag() {
        match &kinds("<script type=\"module\">if (a < b) {}</script>")[0] {
            ConcreteKind::HtmlRawTag {
                name, attrs, body, ..
            } => {
                assert_eq!(*name, "script");
                assert_eq!(attrs.len(), 1);
                assert_eq!(body.value, "if (a < b) {}");
            }
            kind => panic!("unexpected {kind:?}"),
        }
    }

    #[test]
    fn void_and_self_closing() {
        let kinds = kinds("<br><img/><my-el />");
        assert!(matches!(kinds[0], ConcreteKind::HtmlVoidElement { name: "br", .. }));
        assert!(matches!(kinds[1], ConcreteKind::HtmlSelfClosingElement { .. }));
        assert!(matches!(kinds[2], ConcreteKind::HtmlSelfClosingElement { .. }));
    }

    #[test]
    fn grammar_error_position() {
        let error = parse_concrete("<p>{{ a </p>").unwrap_err();
        assert!(error.pos >= 3);
    }
}
