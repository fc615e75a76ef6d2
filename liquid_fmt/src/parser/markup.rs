//! Conversion of grammar-captured tag markup into typed markup.

use super::{
    Rule,
    concrete::{ConcreteMarkup, next_pair},
};
use crate::ast::*;
use pest::iterators::Pair;

pub(super) fn drop_markup(markup: ConcreteMarkup<'_>) -> DropMarkup<'_> {
    match markup {
        ConcreteMarkup::Base(markup) => DropMarkup::Base(markup.trim()),
        ConcreteMarkup::Parsed(pair) => {
            // `drop_markup` wraps a single `liquid_variable`
            DropMarkup::Variable(variable(next_pair(&mut pair.into_inner())))
        }
    }
}

pub(super) fn tag_markup(markup: ConcreteMarkup<'_>) -> LiquidMarkup<'_> {
    let pair = match markup {
        ConcreteMarkup::Base(markup) => return LiquidMarkup::Base(markup.trim()),
        ConcreteMarkup::Parsed(pair) => pair,
    };
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    match rule {
        Rule::markup_if | Rule::markup_elsif => {
            LiquidMarkup::Conditional(condition_chain(next_pair(&mut inner)))
        }
        Rule::markup_case => LiquidMarkup::Case(expression(next_pair(&mut inner))),
        Rule::markup_when => LiquidMarkup::When(inner.map(expression).collect()),
        Rule::markup_for => {
            let variable = next_pair(&mut inner).as_str();
            let collection = expression(next_pair(&mut inner));
            let mut reversed = false;
            let mut args = Vec::new();
            for pair in inner {
                match pair.as_rule() {
                    Rule::reversed => reversed = true,
                    _ => args.push(named_argument(pair)),
                }
            }
            LiquidMarkup::For(ForMarkup {
                variable,
                collection,
                reversed,
                args,
            })
        }
        Rule::markup_capture | Rule::markup_counter => {
            LiquidMarkup::Name(next_pair(&mut inner).as_str())
        }
        Rule::markup_paginate => LiquidMarkup::Paginate(PaginateMarkup {
            collection: expression(next_pair(&mut inner)),
            page_size: expression(next_pair(&mut inner)),
            args: inner.map(named_argument).collect(),
        }),
        Rule::markup_assign => LiquidMarkup::Assign(AssignMarkup {
            name: next_pair(&mut inner).as_str(),
            value: variable(next_pair(&mut inner)),
        }),
        Rule::markup_echo => LiquidMarkup::Echo(variable(next_pair(&mut inner))),
        Rule::markup_cycle => {
            let mut group = None;
            let mut args = Vec::new();
            for pair in inner {
                match pair.as_rule() {
                    Rule::cycle_group => group = Some(expression(next_pair(&mut pair.into_inner()))),
                    _ => args.push(expression(pair)),
                }
            }
            LiquidMarkup::Cycle(CycleMarkup { group, args })
        }
        Rule::markup_render => {
            let snippet = expression(next_pair(&mut inner));
            let mut markup = RenderMarkup {
                snippet,
                alias: None,
                variable: None,
                args: Vec::new(),
            };
            for pair in inner {
                match pair.as_rule() {
                    Rule::render_variable => {
                        let mut inner = pair.into_inner();
                        let kind = match next_pair(&mut inner).as_str() {
                            "for" => RenderVariableKind::For,
                            _ => RenderVariableKind::With,
                        };
                        markup.variable = Some(RenderVariableExpression {
                            kind,
                            name: expression(next_pair(&mut inner)),
                        });
                    }
                    Rule::render_alias => {
                        markup.alias = Some(next_pair(&mut pair.into_inner()).as_str());
                    }
                    _ => markup.args.push(named_argument(pair)),
                }
            }
            LiquidMarkup::Render(markup)
        }
        Rule::markup_layout => LiquidMarkup::Layout(expression(next_pair(&mut inner))),
        Rule::markup_section => match expression(next_pair(&mut inner)) {
            Expression::String(string) => LiquidMarkup::Section(string),
            expr => unreachable!("section markup must be a string, found {expr:?}"),
        },
        Rule::markup_liquid => LiquidMarkup::Liquid(
            next_pair(&mut inner)
                .as_str()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect(),
        ),
        rule => unreachable!("unexpected markup rule {rule:?}"),
    }
}

pub(super) fn variable(pair: Pair<'_, Rule>) -> Variable<'_> {
    let mut inner = pair.into_inner();
    let expression = expression(next_pair(&mut inner));
    let filters = inner.map(filter).collect();
    Variable {
        expression,
        filters,
    }
}

fn filter(pair: Pair<'_, Rule>) -> Filter<'_> {
    let mut inner = pair.into_inner();
    let name = next_pair(&mut inner).as_str();
    let args = inner
        .map(|pair| match pair.as_rule() {
            Rule::named_argument => Argument::Named(named_argument(pair)),
            _ => Argument::Positional(expression(pair)),
        })
        .collect();
    Filter { name, args }
}

fn named_argument(pair: Pair<'_, Rule>) -> NamedArgument<'_> {
    let mut inner = pair.into_inner();
    NamedArgument {
        name: next_pair(&mut inner).as_str(),
        value: expression(next_pair(&mut inner)),
    }
}

pub(super) fn expression(pair: Pair<'_, Rule>) -> Expression<'_> {
    match pair.as_rule() {
        Rule::liquid_string => Expression::String(string(pair.as_str())),
        Rule::liquid_number => Expression::Number(pair.as_str()),
        Rule::liquid_literal => match LiteralKind::from_keyword(pair.as_str()) {
            Some(kind) => Expression::Literal(kind),
            None => unreachable!("unknown literal {}", pair.as_str()),
        },
        Rule::liquid_range => {
            let mut inner = pair.into_inner();
            let start = expression(next_pair(&mut inner));
            let end = expression(next_pair(&mut inner));
            Expression::Range(Box::new(start), Box::new(end))
        }
        Rule::liquid_variable_lookup => {
            let mut name = None;
            let mut lookups = Vec::new();
            for (i, pair) in pair.into_inner().enumerate() {
                match pair.as_rule() {
                    Rule::variable_name if i == 0 => name = Some(pair.as_str()),
                    Rule::lookup_dot => {
                        lookups.push(Lookup::Dot(next_pair(&mut pair.into_inner()).as_str()))
                    }
                    _ => {
                        let key = expression(next_pair(&mut pair.into_inner()));
                        lookups.push(Lookup::Bracket(key))
                    }
                }
            }
            Expression::VariableLookup(VariableLookup { name, lookups })
        }
        rule => unreachable!("unexpected expression rule {rule:?}"),
    }
}

fn string(quoted: &str) -> StringLit<'_> {
    let quote = if quoted.starts_with('\'') {
        QuoteKind::Single
    } else {
        QuoteKind::Double
    };
    StringLit {
        value: &quoted[1..quoted.len() - 1],
        quote,
    }
}

/// Fold `condition (and|or condition)*` from the right, so
/// `a and b or c` becomes `a and (b or c)`.
fn condition_chain(pair: Pair<'_, Rule>) -> Condition<'_> {
    let mut conditions = Vec::new();
    let mut relations = Vec::new();
    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::logical_operator => relations.push(if pair.as_str() == "and" {
                Relation::And
            } else {
                Relation::Or
            }),
            _ => conditions.push(condition(pair)),
        }
    }

    let mut folded = conditions
        .pop()
        .unwrap_or_else(|| unreachable!("grammar guarantees one condition"));
    while let (Some(left), Some(relation)) = (conditions.pop(), relations.pop()) {
        folded = Condition::Logical(LogicalExpression {
            relation,
            left: Box::new(left),
            right: Box::new(folded),
        });
    }
    folded
}

fn condition(pair: Pair<'_, Rule>) -> Condition<'_> {
    let inner = next_pair(&mut pair.into_inner());
    match inner.as_rule() {
        Rule::comparison => {
            let mut parts = inner.into_inner();
            let left = expression(next_pair(&mut parts));
            let comparator = next_pair(&mut parts);
            let right = expression(next_pair(&mut parts));
            Condition::Comparison(Comparison {
                comparator: Comparator::parse(comparator.as_str())
                    .unwrap_or_else(|| unreachable!("unknown comparator")),
                left,
                right,
            })
        }
        _ => Condition::Expression(expression(inner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseMode, parse};

    fn tag_markup_of(source: &str) -> LiquidMarkup<'_> {
        let document = parse(source, ParseMode::Strict).unwrap();
        match &document.node(document.children()[0]).kind {
            NodeKind::LiquidTag(tag) => tag.markup.clone(),
            kind => panic!("unexpected {kind:?}"),
        }
    }

    fn lookup(name: &str) -> Expression<'_> {
        Expression::VariableLookup(VariableLookup {
            name: Some(name),
            lookups: vec![],
        })
    }

    #[test]
    fn logical_chain_leans_right() {
        let markup = tag_markup_of("{% if a and b or c %}{% endif %}");
        assert_eq!(
            markup,
            LiquidMarkup::Conditional(Condition::Logical(LogicalExpression {
                relation: Relation::And,
                left: Box::new(Condition::Expression(lookup("a"))),
                right: Box::new(Condition::Logical(LogicalExpression {
                    relation: Relation::Or,
                    left: Box::new(Condition::Expression(lookup("b"))),
                    right: Box::new(Condition::Expression(lookup("c"))),
                })),
            }))
        );
    }

    #[test]
    fn keyword_literals() {
        fn right(source: &str) -> Expression<'_> {
            match tag_markup_of(source) {
                LiquidMarkup::Conditional(Condition::Comparison(comparison)) => comparison.right,
                markup => panic!("unexpected {markup:?}"),
            }
        }
        let Expression::Literal(null) = right("{% if a == null %}{% endif %}") else {
            panic!("expected literal");
        };
        assert_eq!(null, LiteralKind::Null);
        assert_eq!(null.value(), LiteralKind::Nil.value());
        let Expression::Literal(blank) = right("{% if a != blank %}{% endif %}") else {
            panic!("expected literal");
        };
        assert_eq!(blank.value(), LiteralValue::EmptyLike);
        assert_eq!(LiteralKind::False.value(), LiteralValue::Bool(false));
    }

    #[test]
    fn comparison() {
        let markup = tag_markup_of("{% if product.price >= 10 %}{% endif %}");
        let LiquidMarkup::Conditional(Condition::Comparison(comparison)) = markup else {
            panic!("expected comparison");
        };
        assert_eq!(comparison.comparator, Comparator::GreaterThanOrEqual);
        assert_eq!(comparison.right, Expression::Number("10"));
        assert_eq!(
            comparison.left,
            Expression::VariableLookup(VariableLookup {
                name: Some("product"),
                lookups: vec![Lookup::Dot("price")],
            })
        );
    }

    #[test]
    fn nested_lookup() {
        let markup = tag_markup_of("{% echo x[y.z] %}");
        let LiquidMarkup::Echo(variable) = markup else {
            panic!("expected echo");
        };
        assert_eq!(
            variable.expression,
            Expression::VariableLookup(VariableLookup {
                name: Some("x"),
                lookups: vec![Lookup::Bracket(Expression::VariableLookup(VariableLookup {
                    name: Some("y"),
                    lookups: vec![Lookup::Dot("z")],
                }))],
            })
        );
    }

    #[test]
    fn assign_with_filters() {
        let markup = tag_markup_of("{% assign x = 'a' | append: b, sep: '-' | upcase %}");
        let LiquidMarkup::Assign(assign) = markup else {
            panic!("expected assign");
        };
        assert_eq!(assign.name, "x");
        assert_eq!(
            assign.value.expression,
            Expression::String(StringLit {
                value: "a",
                quote: QuoteKind::Single,
            })
        );
        assert_eq!(assign.value.filters.len(), 2);
        assert_eq!(assign.value.filters[0].name, "append");
        assert_eq!(
            assign.value.filters[0].args,
            vec![
                Argument::Positional(lookup("b")),
                Argument::Named(NamedArgument {
                    name: "sep",
                    value: Expression::String(StringLit {
                        value: "-",
                        quote: QuoteKind::Single,
                    }),
                }),
            ]
        );
        assert!(assign.value.filters[1].args.is_empty());
    }

    #[test]
    fn for_markup() {
        let document = parse(
            "{% for i in (1..max) reversed limit: 2 %}{% endfor %}",
            ParseMode::Strict,
        )
        .unwrap();
        let NodeKind::LiquidTag(tag) = &document.node(document.children()[0]).kind else {
            panic!("expected tag");
        };
        let LiquidMarkup::For(markup) = &tag.markup else {
            panic!("expected for markup");
        };
        assert_eq!(markup.variable, "i");
        assert_eq!(
            markup.collection,
            Expression::Range(Box::new(Expression::Number("1")), Box::new(lookup("max")))
        );
        assert!(markup.reversed);
        assert_eq!(markup.args[0].name, "limit");
    }

    #[test]
    fn render_markup() {
        let markup = tag_markup_of("{% render 'card' with product as item, show: true %}");
        let LiquidMarkup::Render(render) = markup else {
            panic!("expected render");
        };
        assert_eq!(
            render.snippet,
            Expression::String(StringLit {
                value: "card",
                quote: QuoteKind::Single,
            })
        );
        assert_eq!(render.alias, Some("item"));
        let variable = render.variable.unwrap();
        assert_eq!(variable.kind, RenderVariableKind::With);
        assert_eq!(variable.name, lookup("product"));
        assert_eq!(render.args[0].name, "show");
        assert_eq!(render.args[0].value, Expression::Literal(LiteralKind::True));
    }

    #[test]
    fn cycle_with_group() {
        let markup = tag_markup_of("{% cycle 'g': 'a', 'b' %}");
        let LiquidMarkup::Cycle(cycle) = markup else {
            panic!("expected cycle");
        };
        assert!(cycle.group.is_some());
        assert_eq!(cycle.args.len(), 2);
    }

    #[test]
    fn paginate_markup() {
        let document = parse(
            "{% paginate collection.products by 12 %}{% endpaginate %}",
            ParseMode::Strict,
        )
        .unwrap();
        let NodeKind::LiquidTag(tag) = &document.node(document.children()[0]).kind else {
            panic!("expected tag");
        };
        let LiquidMarkup::Paginate(paginate) = &tag.markup else {
            panic!("expected paginate markup");
        };
        assert_eq!(paginate.page_size, Expression::Number("12"));
    }

    #[test]
    fn invalid_markup_falls_back_to_base() {
        assert_eq!(
            tag_markup_of("{% assign = %}"),
            LiquidMarkup::Base("=")
        );
        assert_eq!(
            tag_markup_of("{% include  'a' with %}"),
            LiquidMarkup::Base("'a' with")
        );
    }

    #[test]
    fn liquid_tag_lines() {
        let markup = tag_markup_of("{% liquid\n  assign a = 1\n\n  echo a\n%}");
        assert_eq!(markup, LiquidMarkup::Liquid(vec!["assign a = 1", "echo a"]));
    }
}
