use crate::lexer::Span;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Objective(Objective),
    Constraint(ConstraintDecl),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub span: Span,
    pub expr: LinearExpr,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    pub span: Span,
    pub label: Option<String>,
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le, // <=, ≤
    Ge, // >=, ≥
    Eq, // =, ==
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpr {
    pub terms: Vec<Term>,
}

/// A signed coefficient, optionally multiplying a variable. A term without
/// a variable is a constant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub coefficient: f64,
    pub variable: Option<String>,
}

impl Program {
    pub fn objectives(&self) -> impl Iterator<Item = &Objective> {
        self.items.iter().filter_map(|item| match item {
            Item::Objective(o) => Some(o),
            Item::Constraint(_) => None,
        })
    }

    pub fn constraints(&self) -> impl Iterator<Item = &ConstraintDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Constraint(c) => Some(c),
            Item::Objective(_) => None,
        })
    }
}
