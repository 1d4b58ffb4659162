use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Shared tolerance for feasibility checks, vertex deduplication and binding detection
pub const EPSILON: f64 = 1e-6;

/// Determinant magnitude below which two boundary lines count as parallel
pub const DET_EPSILON: f64 = 1e-10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Degenerate constraint: both coefficients are zero")]
    DegenerateConstraint,
    #[error("Non-finite value in {0}")]
    NonFiniteValue(&'static str),
    #[error("Price of {name} must be positive, got {value}")]
    NonPositivePrice { name: &'static str, value: f64 },
}

/// Comparison operator of a constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown operator: {0} (expected <=, >= or =)")]
pub struct UnknownOperator(pub String);

impl FromStr for ConstraintOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<=" | "≤" => Ok(ConstraintOp::Le),
            ">=" | "≥" => Ok(ConstraintOp::Ge),
            "=" | "==" => Ok(ConstraintOp::Eq),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// A point `(x1, x2)` in the decision plane
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Number of tables
    pub x1: f64,
    /// Number of chairs
    pub x2: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x1: 0.0, x2: 0.0 };

    pub fn new(x1: f64, x2: f64) -> Self {
        Self { x1, x2 }
    }

    /// Both coordinates differ by less than `EPSILON`.
    pub fn approx_eq(&self, other: &Point) -> bool {
        (self.x1 - other.x1).abs() < EPSILON && (self.x2 - other.x2).abs() < EPSILON
    }

    /// Snap coordinates within `EPSILON` below zero back onto the axis.
    pub fn clamp_noise(self) -> Point {
        let snap = |v: f64| if v < 0.0 && v > -EPSILON { 0.0 } else { v };
        Point {
            x1: snap(self.x1),
            x2: snap(self.x2),
        }
    }

    pub fn is_non_negative(&self) -> bool {
        self.x1 >= -EPSILON && self.x2 >= -EPSILON
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.x2.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x1, self.x2)
    }
}

/// Linear constraint `a·x1 + b·x2 op c`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    /// Coefficient of x1
    pub a: f64,
    /// Coefficient of x2
    pub b: f64,
    /// Right-hand side value
    pub c: f64,
    /// Comparison operator
    pub op: ConstraintOp,
}

impl Constraint {
    pub fn new(a: f64, b: f64, c: f64, op: ConstraintOp) -> Result<Self, SolverError> {
        if !a.is_finite() {
            return Err(SolverError::NonFiniteValue("coefficient of x1"));
        }
        if !b.is_finite() {
            return Err(SolverError::NonFiniteValue("coefficient of x2"));
        }
        if !c.is_finite() {
            return Err(SolverError::NonFiniteValue("right-hand side"));
        }
        if a == 0.0 && b == 0.0 {
            return Err(SolverError::DegenerateConstraint);
        }
        Ok(Self { a, b, c, op })
    }

    pub fn le(a: f64, b: f64, c: f64) -> Result<Self, SolverError> {
        Self::new(a, b, c, ConstraintOp::Le)
    }

    pub fn ge(a: f64, b: f64, c: f64) -> Result<Self, SolverError> {
        Self::new(a, b, c, ConstraintOp::Ge)
    }

    pub fn equal(a: f64, b: f64, c: f64) -> Result<Self, SolverError> {
        Self::new(a, b, c, ConstraintOp::Eq)
    }

    pub fn lhs(&self, p: Point) -> f64 {
        self.a * p.x1 + self.b * p.x2
    }

    /// Distance from the bound in the direction the operator allows.
    /// Negative when violated; for `Eq` this is `-|lhs - c|`.
    pub fn slack(&self, p: Point) -> f64 {
        let lhs = self.lhs(p);
        match self.op {
            ConstraintOp::Le => self.c - lhs,
            ConstraintOp::Ge => lhs - self.c,
            ConstraintOp::Eq => -(lhs - self.c).abs(),
        }
    }

    pub fn is_satisfied_by(&self, p: Point) -> bool {
        let lhs = self.lhs(p);
        match self.op {
            ConstraintOp::Le => lhs <= self.c + EPSILON,
            ConstraintOp::Ge => lhs >= self.c - EPSILON,
            ConstraintOp::Eq => (lhs - self.c).abs() <= EPSILON,
        }
    }

    /// Plain `x1 >= 0` or `x2 >= 0`
    pub fn is_non_negativity(&self) -> bool {
        self.op == ConstraintOp::Ge
            && self.c == 0.0
            && ((self.a == 1.0 && self.b == 0.0) || (self.a == 0.0 && self.b == 1.0))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a != 0.0 {
            write!(f, "{:.2}x₁", self.a)?;
        }
        if self.b != 0.0 {
            if self.a != 0.0 {
                let sign = if self.b > 0.0 { "+" } else { "-" };
                write!(f, " {} {:.2}x₂", sign, self.b.abs())?;
            } else {
                write!(f, "{:.2}x₂", self.b)?;
            }
        }
        write!(f, " {} {:.2}", self.op, self.c)
    }
}

/// Selling prices, i.e. the objective `Z = table·x1 + chair·x2`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prices {
    /// Price per table (x1)
    pub table: f64,
    /// Price per chair (x2)
    pub chair: f64,
}

impl Prices {
    pub fn new(table: f64, chair: f64) -> Result<Self, SolverError> {
        for (name, value) in [("tables", table), ("chairs", chair)] {
            if !value.is_finite() {
                return Err(SolverError::NonFiniteValue(name));
            }
            if value <= 0.0 {
                return Err(SolverError::NonPositivePrice { name, value });
            }
        }
        Ok(Self { table, chair })
    }

    pub fn objective(&self, p: Point) -> f64 {
        self.table * p.x1 + self.chair * p.x2
    }
}

impl fmt::Display for Prices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z = {:.2}x₁ + {:.2}x₂", self.table, self.chair)
    }
}

/// A two-variable maximization problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub prices: Prices,
    pub constraints: Vec<Constraint>,
}

impl Problem {
    pub fn new(prices: Prices) -> Self {
        Self {
            prices,
            constraints: Vec::new(),
        }
    }

    /// The Flair Furniture case: carpentry, painting, chair cap and non-negativity.
    pub fn flair_furniture(prices: Prices) -> Self {
        Self {
            prices,
            constraints: flair_furniture_constraints(),
        }
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

pub fn flair_furniture_constraints() -> Vec<Constraint> {
    [
        (4.0, 3.0, 240.0, ConstraintOp::Le), // carpentry hours
        (2.0, 1.0, 100.0, ConstraintOp::Le), // painting hours
        (0.0, 1.0, 60.0, ConstraintOp::Le),  // chair cap
        (1.0, 0.0, 0.0, ConstraintOp::Ge),
        (0.0, 1.0, 0.0, ConstraintOp::Ge),
    ]
    .into_iter()
    .map(|(a, b, c, op)| Constraint { a, b, c, op })
    .collect()
}
