use super::Expr;

/// Which rows an update or delete touches.
///
/// Table-wide mutations must be spelled [`Filter::All`]; an empty
/// [`Filter::Expr`] is refused by the serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Expr(Expr),
    All,
}

impl Filter {
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Filter::Expr(expr) => Some(expr),
            Filter::All => None,
        }
    }
}

impl From<Expr> for Filter {
    fn from(expr: Expr) -> Self {
        Filter::Expr(expr)
    }
}
