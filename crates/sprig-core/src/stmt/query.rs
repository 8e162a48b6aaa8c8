use super::{Expr, Statement, Terminal};
use crate::ident::Direction;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub select: Select,

    /// Computed projections, emitted after the selected columns.
    pub aggregates: Vec<Aggregate>,

    pub filter: Option<Expr>,
    pub group_by: Vec<String>,

    /// Conditions over groups. A column name equal to an aggregate alias
    /// refers to that aggregate.
    pub having: Option<Expr>,

    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub terminal: Terminal,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub enum Select {
    /// `*`, or only the grouping columns when the query aggregates.
    #[default]
    All,
    Columns(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub func: AggregateFunc,

    /// `None` means `*`, which only `COUNT` accepts.
    pub column: Option<String>,

    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl AggregateFunc {
    pub fn parse(name: &str) -> Option<AggregateFunc> {
        Some(match name.to_ascii_lowercase().as_str() {
            "count" => AggregateFunc::Count,
            "sum" => AggregateFunc::Sum,
            "avg" => AggregateFunc::Avg,
            "min" => AggregateFunc::Min,
            "max" => AggregateFunc::Max,
            _ => return None,
        })
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

impl Aggregate {
    pub fn new(func: AggregateFunc, column: Option<&str>, alias: impl Into<String>) -> Aggregate {
        Aggregate {
            func,
            column: column.map(str::to_string),
            alias: alias.into(),
        }
    }
}

impl OrderBy {
    pub fn new(column: impl Into<String>, direction: Direction) -> OrderBy {
        OrderBy {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> OrderBy {
        OrderBy::new(column, Direction::Asc)
    }

    pub fn desc(column: impl Into<String>) -> OrderBy {
        OrderBy::new(column, Direction::Desc)
    }

    pub fn reverse(&self) -> OrderBy {
        OrderBy::new(self.column.clone(), self.direction.reverse())
    }
}

impl Query {
    pub fn new(table: impl Into<String>) -> Query {
        Query {
            table: table.into(),
            select: Select::All,
            aggregates: vec![],
            filter: None,
            group_by: vec![],
            having: None,
            order_by: vec![],
            limit: None,
            offset: None,
            terminal: Terminal::Many,
        }
    }

    pub fn select<I, S>(mut self, columns: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Select::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a condition, `AND`-ed with any existing filter.
    pub fn filter(mut self, expr: Expr) -> Query {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Query {
        self.order_by.push(order_by);
        self
    }

    pub fn limit(mut self, limit: u64) -> Query {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Query {
        self.offset = Some(offset);
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Query {
        self.aggregates.push(aggregate);
        self
    }

    pub fn having(mut self, expr: Expr) -> Query {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    pub fn terminal(mut self, terminal: Terminal) -> Query {
        self.terminal = terminal;
        self
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty() || !self.aggregates.is_empty()
    }
}

impl From<Query> for Statement {
    fn from(value: Query) -> Self {
        Statement::Query(value)
    }
}
