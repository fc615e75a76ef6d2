//! Typed markup of Liquid tags and drops.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteKind {
    Single,
    Double,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLit<'s> {
    /// Content without quotes.
    pub value: &'s str,
    pub quote: QuoteKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Concrete value of a keyword literal.
pub enum LiteralValue {
    Nil,
    Bool(bool),
    /// `blank` and `empty` only compare equal to empty things.
    EmptyLike,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Nil,
    Null,
    True,
    False,
    Blank,
    Empty,
}

impl LiteralKind {
    pub fn keyword(self) -> &'static str {
        match self {
            LiteralKind::Nil => "nil",
            LiteralKind::Null => "null",
            LiteralKind::True => "true",
            LiteralKind::False => "false",
            LiteralKind::Blank => "blank",
            LiteralKind::Empty => "empty",
        }
    }

    pub fn value(self) -> LiteralValue {
        match self {
            LiteralKind::Nil | LiteralKind::Null => LiteralValue::Nil,
            LiteralKind::True => LiteralValue::Bool(true),
            LiteralKind::False => LiteralValue::Bool(false),
            LiteralKind::Blank | LiteralKind::Empty => LiteralValue::EmptyLike,
        }
    }

    pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "nil" => Some(LiteralKind::Nil),
            "null" => Some(LiteralKind::Null),
            "true" => Some(LiteralKind::True),
            "false" => Some(LiteralKind::False),
            "blank" => Some(LiteralKind::Blank),
            "empty" => Some(LiteralKind::Empty),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression<'s> {
    String(StringLit<'s>),
    /// Number as written, so `1.50` stays `1.50`.
    Number(&'s str),
    Literal(LiteralKind),
    Range(Box<Expression<'s>>, Box<Expression<'s>>),
    VariableLookup(VariableLookup<'s>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableLookup<'s> {
    /// `None` for lookups starting with a bracket, like `['key']`.
    pub name: Option<&'s str>,
    pub lookups: Vec<Lookup<'s>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Lookup<'s> {
    /// `.name`, which may contain `-` or end with `?`.
    Dot(&'s str),
    /// `[expression]`
    Bracket(Expression<'s>),
}

#[derive(Clone, Debug, PartialEq)]
/// An expression followed by filters, as found in drops and `assign`.
pub struct Variable<'s> {
    pub expression: Expression<'s>,
    pub filters: Vec<Filter<'s>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filter<'s> {
    pub name: &'s str,
    pub args: Vec<Argument<'s>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Argument<'s> {
    Positional(Expression<'s>),
    Named(NamedArgument<'s>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamedArgument<'s> {
    pub name: &'s str,
    pub value: Expression<'s>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    Equal,
    NotEqual,
    /// `<>`, an alias of `!=`
    LessGreater,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
}

impl Comparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::LessGreater => "<>",
            Comparator::GreaterThan => ">",
            Comparator::LessThan => "<",
            Comparator::GreaterThanOrEqual => ">=",
            Comparator::LessThanOrEqual => "<=",
            Comparator::Contains => "contains",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(Comparator::Equal),
            "!=" => Some(Comparator::NotEqual),
            "<>" => Some(Comparator::LessGreater),
            ">" => Some(Comparator::GreaterThan),
            "<" => Some(Comparator::LessThan),
            ">=" => Some(Comparator::GreaterThanOrEqual),
            "<=" => Some(Comparator::LessThanOrEqual),
            "contains" => Some(Comparator::Contains),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    And,
    Or,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::And => "and",
            Relation::Or => "or",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comparison<'s> {
    pub comparator: Comparator,
    pub left: Expression<'s>,
    pub right: Expression<'s>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogicalExpression<'s> {
    pub relation: Relation,
    pub left: Box<Condition<'s>>,
    pub right: Box<Condition<'s>>,
}

#[derive(Clone, Debug, PartialEq)]
/// Condition of `if`, `unless` and `elsif`.
///
/// Chains lean right: `a and b or c` is `a and (b or c)`.
pub enum Condition<'s> {
    Expression(Expression<'s>),
    Comparison(Comparison<'s>),
    Logical(LogicalExpression<'s>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignMarkup<'s> {
    pub name: &'s str,
    pub value: Variable<'s>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForMarkup<'s> {
    pub variable: &'s str,
    pub collection: Expression<'s>,
    pub reversed: bool,
    pub args: Vec<NamedArgument<'s>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CycleMarkup<'s> {
    pub group: Option<Expression<'s>>,
    pub args: Vec<Expression<'s>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaginateMarkup<'s> {
    pub collection: Expression<'s>,
    pub page_size: Expression<'s>,
    pub args: Vec<NamedArgument<'s>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderVariableKind {
    For,
    With,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderVariableExpression<'s> {
    pub kind: RenderVariableKind,
    pub name: Expression<'s>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderMarkup<'s> {
    pub snippet: Expression<'s>,
    pub alias: Option<&'s str>,
    pub variable: Option<RenderVariableExpression<'s>>,
    pub args: Vec<NamedArgument<'s>>,
}

#[derive(Clone, Debug, PartialEq)]
/// Markup of a Liquid tag or branch.
pub enum LiquidMarkup<'s> {
    /// Unparsed markup, trimmed. Used for every tag without a markup grammar
    /// and as fallback when the grammar doesn't match.
    Base(&'s str),
    Conditional(Condition<'s>),
    Case(Expression<'s>),
    When(Vec<Expression<'s>>),
    For(ForMarkup<'s>),
    Assign(AssignMarkup<'s>),
    Echo(Variable<'s>),
    Cycle(CycleMarkup<'s>),
    Paginate(PaginateMarkup<'s>),
    Render(RenderMarkup<'s>),
    /// `capture`, `increment` and `decrement` take a single name.
    Name(&'s str),
    Layout(Expression<'s>),
    Section(StringLit<'s>),
    /// Non-empty trimmed lines of `{% liquid %}`.
    Liquid(Vec<&'s str>),
}
