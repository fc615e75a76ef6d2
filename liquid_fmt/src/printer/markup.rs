//! Canonical one-line rendering of typed markup.

use crate::{ast::*, helpers};
use itertools::Itertools;

pub(super) fn expression(expr: &Expression<'_>, quote: char) -> String {
    match expr {
        Expression::String(string) => string_lit(string, quote),
        Expression::Number(number) => (*number).to_owned(),
        Expression::Literal(kind) => kind.keyword().to_owned(),
        Expression::Range(start, end) => format!(
            "({}..{})",
            expression(start, quote),
            expression(end, quote)
        ),
        Expression::VariableLookup(lookup) => variable_lookup(lookup, quote),
    }
}

fn string_lit(string: &StringLit<'_>, quote: char) -> String {
    let quote = if string.value.contains(quote) {
        match string.quote {
            QuoteKind::Single => '\'',
            QuoteKind::Double => '"',
        }
    } else {
        quote
    };
    format!("{quote}{}{quote}", string.value)
}

fn variable_lookup(lookup: &VariableLookup<'_>, quote: char) -> String {
    let mut printed = lookup.name.unwrap_or_default().to_owned();
    for key in &lookup.lookups {
        match key {
            Lookup::Dot(name) => {
                printed.push('.');
                printed.push_str(name);
            }
            Lookup::Bracket(Expression::String(StringLit { value, .. }))
                if !printed.is_empty() && helpers::is_identifier(value) =>
            {
                printed.push('.');
                printed.push_str(value);
            }
            Lookup::Bracket(key) => {
                printed.push('[');
                printed.push_str(&expression(key, quote));
                printed.push(']');
            }
        }
    }
    printed
}

pub(super) fn filter(filter: &Filter<'_>, quote: char) -> String {
    if filter.args.is_empty() {
        format!("| {}", filter.name)
    } else {
        format!(
            "| {}: {}",
            filter.name,
            filter
                .args
                .iter()
                .map(|arg| match arg {
                    Argument::Positional(expr) => expression(expr, quote),
                    Argument::Named(arg) => named_argument(arg, quote),
                })
                .join(", ")
        )
    }
}

fn named_argument(arg: &NamedArgument<'_>, quote: char) -> String {
    format!("{}: {}", arg.name, expression(&arg.value, quote))
}

pub(super) fn variable(variable: &Variable<'_>, quote: char) -> String {
    std::iter::once(expression(&variable.expression, quote))
        .chain(variable.filters.iter().map(|f| filter(f, quote)))
        .join(" ")
}

fn condition(cond: &Condition<'_>, quote: char) -> String {
    match cond {
        Condition::Expression(expr) => expression(expr, quote),
        Condition::Comparison(comparison) => format!(
            "{} {} {}",
            expression(&comparison.left, quote),
            comparison.comparator.as_str(),
            expression(&comparison.right, quote)
        ),
        Condition::Logical(logical) => format!(
            "{} {} {}",
            condition(&logical.left, quote),
            logical.relation.as_str(),
            condition(&logical.right, quote)
        ),
    }
}

/// Tag name followed by its markup, as printed between the delimiters.
pub(super) fn tag_head(name: &str, markup: &LiquidMarkup<'_>, quote: char) -> String {
    let markup = match markup {
        LiquidMarkup::Base(markup) => (*markup).to_owned(),
        LiquidMarkup::Conditional(cond) => condition(cond, quote),
        LiquidMarkup::Case(expr) | LiquidMarkup::Layout(expr) => expression(expr, quote),
        LiquidMarkup::When(exprs) => exprs.iter().map(|expr| expression(expr, quote)).join(", "),
        LiquidMarkup::For(markup) => {
            let mut printed = format!(
                "{} in {}",
                markup.variable,
                expression(&markup.collection, quote)
            );
            if markup.reversed {
                printed.push_str(" reversed");
            }
            for arg in &markup.args {
                printed.push(' ');
                printed.push_str(&named_argument(arg, quote));
            }
            printed
        }
        LiquidMarkup::Assign(assign) => {
            format!("{} = {}", assign.name, variable(&assign.value, quote))
        }
        LiquidMarkup::Echo(value) => variable(value, quote),
        LiquidMarkup::Cycle(cycle) => {
            let args = cycle.args.iter().map(|arg| expression(arg, quote)).join(", ");
            match &cycle.group {
                Some(group) => format!("{}: {args}", expression(group, quote)),
                None => args,
            }
        }
        LiquidMarkup::Paginate(paginate) => std::iter::once(format!(
            "{} by {}",
            expression(&paginate.collection, quote),
            expression(&paginate.page_size, quote)
        ))
        .chain(paginate.args.iter().map(|arg| named_argument(arg, quote)))
        .join(", "),
        LiquidMarkup::Render(render) => {
            let mut printed = expression(&render.snippet, quote);
            if let Some(variable) = &render.variable {
                printed.push_str(match variable.kind {
                    RenderVariableKind::With => " with ",
                    RenderVariableKind::For => " for ",
                });
                printed.push_str(&expression(&variable.name, quote));
            }
            if let Some(alias) = render.alias {
                printed.push_str(" as ");
                printed.push_str(alias);
            }
            for arg in &render.args {
                printed.push_str(", ");
                printed.push_str(&named_argument(arg, quote));
            }
            printed
        }
        LiquidMarkup::Name(name) => (*name).to_owned(),
        LiquidMarkup::Section(string) => string_lit(string, quote),
        LiquidMarkup::Liquid(lines) => lines.join("\n"),
    };
    if markup.is_empty() {
        name.to_owned()
    } else {
        format!("{name} {markup}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseMode, parse};

    fn head(source: &str) -> String {
        let document = parse(source, ParseMode::Strict).unwrap();
        match &document.node(document.children()[0]).kind {
            NodeKind::LiquidTag(tag) => tag_head(tag.name, &tag.markup, '"'),
            kind => panic!("unexpected {kind:?}"),
        }
    }

    #[test]
    fn canonical_spacing() {
        assert_eq!(head("{%if a==1 and b%}{%endif%}"), "if a == 1 and b");
        assert_eq!(
            head("{% assign x='a'|append : b,sep:'-' %}"),
            r#"assign x = "a" | append: b, sep: "-""#
        );
        assert_eq!(
            head("{% for i in (1..5) reversed limit:2 %}{% endfor %}"),
            "for i in (1..5) reversed limit: 2"
        );
        assert_eq!(
            head("{% render 'card' with p as item, a: 1 %}"),
            r#"render "card" with p as item, a: 1"#
        );
        assert_eq!(head("{% cycle 'g': 'a','b' %}"), r#"cycle "g": "a", "b""#);
        assert_eq!(
            head("{% paginate c.products by 5 %}{% endpaginate %}"),
            "paginate c.products by 5"
        );
        assert_eq!(head("{% custom  a  b %}"), "custom a  b");
    }

    #[test]
    fn strings_keep_quotes_they_contain() {
        assert_eq!(head(r#"{% echo 'say "hi"' %}"#), r#"echo 'say "hi"'"#);
    }

    #[test]
    fn lookups() {
        assert_eq!(head("{% echo a['b'][0][c] %}"), "echo a.b[0][c]");
        assert_eq!(head("{% echo a['b c'] %}"), r#"echo a["b c"]"#);
        assert_eq!(head("{% echo ['a'].b %}"), r#"echo ["a"].b"#);
        assert_eq!(head("{% echo a['first-name'] %}"), r#"echo a["first-name"]"#);
        assert_eq!(head("{% echo a.first-name %}"), "echo a.first-name");
        assert_eq!(head("{% echo a['empty?'] %}"), "echo a.empty?");
    }
}
