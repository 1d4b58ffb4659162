use std::collections::HashSet;
use std::path::Path;

use flair_solver::{Constraint, ConstraintOp, Prices, Problem, SolverError};
use thiserror::Error;

use crate::ast::*;
use crate::Parser;

/// Upper limit on the number of constraints accepted by default
pub const MAX_CONSTRAINTS: usize = 20;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Missing objective: add a line such as `maximize 7 x1 + 5 x2`")]
    MissingObjective,
    #[error("Objective declared more than once (second at position {0:?})")]
    DuplicateObjective(crate::lexer::Span),
    #[error("Constant term in objective; only x1 and x2 may appear")]
    ConstantInObjective,
    #[error("Unknown variable: {0} (expected x1/tables or x2/chairs)")]
    UnknownVariable(String),
    #[error("Duplicate constraint label: {0}")]
    DuplicateLabel(String),
    #[error("No constraints given")]
    NoConstraints,
    #[error("Too many constraints: {0} (at most {1})")]
    TooManyConstraints(usize, usize),
    #[error("Invalid prices: {0}")]
    InvalidPrices(#[source] SolverError),
    #[error("Invalid constraint {label}: {source}")]
    InvalidConstraint {
        label: String,
        #[source]
        source: SolverError,
    },
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error in {0}: {1}")]
    ParseError(String, String),
}

/// A problem ready for solving, with a display label per constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProblem {
    pub problem: Problem,
    pub labels: Vec<String>,
}

impl CompiledProblem {
    pub fn labelled(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(&self.problem.constraints)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variable {
    Tables,
    Chairs,
}

fn resolve_variable(name: &str) -> Result<Variable, CompileError> {
    match name {
        "x1" | "x₁" | "table" | "tables" => Ok(Variable::Tables),
        "x2" | "x₂" | "chair" | "chairs" => Ok(Variable::Chairs),
        _ => Err(CompileError::UnknownVariable(name.to_string())),
    }
}

/// Coefficients of x1 and x2 plus the folded constant of an expression
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Folded {
    x1: f64,
    x2: f64,
    constant: f64,
}

fn fold(expr: &LinearExpr) -> Result<Folded, CompileError> {
    let mut folded = Folded::default();
    for term in &expr.terms {
        match term.variable.as_deref().map(resolve_variable).transpose()? {
            Some(Variable::Tables) => folded.x1 += term.coefficient,
            Some(Variable::Chairs) => folded.x2 += term.coefficient,
            None => folded.constant += term.coefficient,
        }
    }
    Ok(folded)
}

fn relation_op(relation: Relation) -> ConstraintOp {
    match relation {
        Relation::Le => ConstraintOp::Le,
        Relation::Ge => ConstraintOp::Ge,
        Relation::Eq => ConstraintOp::Eq,
    }
}

/// Compiler for turning `.flair` programs into solvable problems
#[derive(Debug, Clone)]
pub struct Compiler {
    max_constraints: usize,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            max_constraints: MAX_CONSTRAINTS,
        }
    }

    pub fn with_max_constraints(mut self, max: usize) -> Self {
        self.max_constraints = max;
        self
    }

    /// Read, parse and compile a problem file
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<CompiledProblem, CompileError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            CompileError::IoError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let program = Parser::parse(&source)
            .map_err(|e| CompileError::ParseError(path.display().to_string(), e.to_string()))?;
        self.compile(&program)
    }

    pub fn compile_source(&self, source: &str) -> Result<CompiledProblem, CompileError> {
        let program = Parser::parse(source)
            .map_err(|e| CompileError::ParseError("<input>".to_string(), e.to_string()))?;
        self.compile(&program)
    }

    pub fn compile(&self, program: &Program) -> Result<CompiledProblem, CompileError> {
        let mut objectives = program.objectives();
        let objective = objectives.next().ok_or(CompileError::MissingObjective)?;
        if let Some(second) = objectives.next() {
            return Err(CompileError::DuplicateObjective(second.span));
        }
        let prices = self.compile_objective(objective)?;

        let decls: Vec<_> = program.constraints().collect();
        if decls.is_empty() {
            return Err(CompileError::NoConstraints);
        }
        if decls.len() > self.max_constraints {
            return Err(CompileError::TooManyConstraints(
                decls.len(),
                self.max_constraints,
            ));
        }

        let mut problem = Problem::new(prices);
        let mut labels = Vec::with_capacity(decls.len());
        let mut seen = HashSet::new();
        for (i, decl) in decls.iter().enumerate() {
            let label = decl
                .label
                .clone()
                .unwrap_or_else(|| format!("c{}", i + 1));
            if !seen.insert(label.clone()) {
                return Err(CompileError::DuplicateLabel(label));
            }
            problem.add_constraint(self.compile_decl(decl, &label)?);
            labels.push(label);
        }

        Ok(CompiledProblem { problem, labels })
    }

    /// Compile one constraint line, e.g. `painting: 2x1 + x2 <= 100`.
    /// Returns the label if one was written.
    pub fn compile_constraint(
        &self,
        line: &str,
    ) -> Result<(Option<String>, Constraint), CompileError> {
        let decl = Parser::parse_constraint(line)
            .map_err(|e| CompileError::ParseError(line.to_string(), e.to_string()))?;
        let label = decl.label.clone().unwrap_or_else(|| line.trim().to_string());
        let constraint = self.compile_decl(&decl, &label)?;
        Ok((decl.label, constraint))
    }

    fn compile_objective(&self, objective: &Objective) -> Result<Prices, CompileError> {
        let folded = fold(&objective.expr)?;
        if folded.constant != 0.0 {
            return Err(CompileError::ConstantInObjective);
        }
        Prices::new(folded.x1, folded.x2).map_err(CompileError::InvalidPrices)
    }

    /// Constants on the left-hand side move to the right: `x1 + 10 <= 40`
    /// becomes `x1 <= 30`.
    fn compile_decl(&self, decl: &ConstraintDecl, label: &str) -> Result<Constraint, CompileError> {
        let folded = fold(&decl.lhs)?;
        Constraint::new(
            folded.x1,
            folded.x2,
            decl.rhs - folded.constant,
            relation_op(decl.relation),
        )
        .map_err(|source| CompileError::InvalidConstraint {
            label: label.to_string(),
            source,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAIR: &str = r#"
        maximize 7 x1 + 5 x2
        carpentry: 4x1 + 3x2 <= 240
        painting:  2x1 + x2 <= 100
        x2 <= 60
        x1 >= 0
        x2 >= 0
    "#;

    #[test]
    fn test_compile_flair_case() {
        let compiled = Compiler::new().compile_source(FLAIR).unwrap();
        let expected = Problem::flair_furniture(Prices::new(7.0, 5.0).unwrap());
        assert_eq!(compiled.problem, expected);
        assert_eq!(
            compiled.labels,
            vec!["carpentry", "painting", "c3", "c4", "c5"]
        );
    }

    #[test]
    fn test_compile_and_solve() {
        let compiled = Compiler::new().compile_source(FLAIR).unwrap();
        let solution = flair_solver::Solver::new().solve(&compiled.problem).unwrap();
        assert!((solution.x1() - 30.0).abs() < 1e-6);
        assert!((solution.x2() - 40.0).abs() < 1e-6);
        assert!((solution.objective_value - 410.0).abs() < 1e-6);
    }

    #[test]
    fn test_aliases_and_repeated_terms() {
        let source = "max 3 tables + chairs\n2 tables + x1 + chairs - x2 + 5 <= 35\n";
        let compiled = Compiler::new().compile_source(source).unwrap();
        assert_eq!(compiled.problem.prices, Prices::new(3.0, 1.0).unwrap());
        let (_, c) = compiled.labelled().next().unwrap();
        assert_eq!((c.a, c.c, c.op), (3.0, 30.0, ConstraintOp::Le));
        // chairs - x2 cancels
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_missing_objective() {
        let err = Compiler::new().compile_source("x1 <= 4").unwrap_err();
        assert!(matches!(err, CompileError::MissingObjective));
    }

    #[test]
    fn test_duplicate_objective() {
        let err = Compiler::new()
            .compile_source("max x1 + x2\nmax x1\nx1 <= 4")
            .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateObjective(_)));
    }

    #[test]
    fn test_constant_in_objective() {
        let err = Compiler::new()
            .compile_source("max x1 + 3\nx1 <= 4")
            .unwrap_err();
        assert!(matches!(err, CompileError::ConstantInObjective));
    }

    #[test]
    fn test_non_positive_price() {
        let err = Compiler::new()
            .compile_source("max x1 - x2\nx1 <= 4")
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::InvalidPrices(SolverError::NonPositivePrice { name: "chairs", .. })
        ));
    }

    #[test]
    fn test_unknown_variable() {
        let err = Compiler::new()
            .compile_source("max x1 + x2\nx3 <= 4")
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownVariable(v) if v == "x3"));
    }

    #[test]
    fn test_degenerate_constraint_is_labelled() {
        let err = Compiler::new()
            .compile_source("max x1 + x2\nbroken: x1 - x1 <= 4")
            .unwrap_err();
        match err {
            CompileError::InvalidConstraint { label, source } => {
                assert_eq!(label, "broken");
                assert_eq!(source, SolverError::DegenerateConstraint);
            }
            other => panic!("Expected invalid constraint, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_label() {
        let err = Compiler::new()
            .compile_source("max x1 + x2\ncap: x1 <= 4\ncap: x2 <= 4")
            .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateLabel(l) if l == "cap"));
    }

    #[test]
    fn test_constraint_count_limits() {
        let err = Compiler::new().compile_source("max x1 + x2").unwrap_err();
        assert!(matches!(err, CompileError::NoConstraints));

        let mut source = String::from("max x1 + x2\n");
        for i in 0..=MAX_CONSTRAINTS {
            source.push_str(&format!("x1 + x2 <= {}\n", i + 1));
        }
        let err = Compiler::new().compile_source(&source).unwrap_err();
        assert!(matches!(err, CompileError::TooManyConstraints(21, 20)));

        let compiled = Compiler::new()
            .with_max_constraints(25)
            .compile_source(&source)
            .unwrap();
        assert_eq!(compiled.problem.num_constraints(), 21);
    }

    #[test]
    fn test_compile_constraint_line() {
        let compiler = Compiler::new();
        let (label, c) = compiler.compile_constraint("painting: 2x1 + x2 <= 100").unwrap();
        assert_eq!(label.as_deref(), Some("painting"));
        assert_eq!(c, Constraint::le(2.0, 1.0, 100.0).unwrap());

        let (label, c) = compiler.compile_constraint("x1 >= 0").unwrap();
        assert_eq!(label, None);
        assert!(c.is_non_negativity());

        assert!(compiler.compile_constraint("x1 < 3").is_err());
    }

    #[test]
    fn test_compile_file() {
        let path = std::env::temp_dir().join(format!("flair-compile-{}.flair", std::process::id()));
        std::fs::write(&path, FLAIR).unwrap();
        let compiled = Compiler::new().compile_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(compiled.unwrap().problem.num_constraints(), 5);

        let err = Compiler::new()
            .compile_file("/nonexistent/problem.flair")
            .unwrap_err();
        assert!(matches!(err, CompileError::IoError(_)));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = Compiler::new().compile_source("max x1 +\n").unwrap_err();
        match err {
            CompileError::ParseError(origin, _) => assert_eq!(origin, "<input>"),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }
}
