use thiserror::Error;
use tracing::{debug, info};

use crate::problem::{Constraint, EPSILON, Prices, Problem};
use crate::region::{BoundingBox, candidate_vertices, is_unbounded};
use crate::solution::{EvaluatedVertex, Solution};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    #[error("No feasible points found; check the constraints")]
    NoFeasibleRegion,
    #[error("The feasible region is unbounded; profit can grow without limit")]
    Unbounded,
}

/// Vertex-enumeration solver for two-variable maximization problems
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    /// Tolerance for binding-constraint detection and tie reporting
    tolerance: f64,
    /// Box limiting axis intercepts; derived from the constraints when unset
    bounds: Option<BoundingBox>,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            tolerance: EPSILON,
            bounds: None,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Maximize the objective by evaluating it at every feasible vertex.
    ///
    /// Ties keep the first maximizer in `(x1, x2)` order, so repeated calls
    /// on the same input return identical results.
    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        let constraints = &problem.constraints;
        let bounds = self
            .bounds
            .unwrap_or_else(|| BoundingBox::derive(constraints, None));

        let vertices = candidate_vertices(constraints, &bounds);
        if vertices.is_empty() {
            info!(constraints = constraints.len(), "no feasible region");
            return Err(SolveError::NoFeasibleRegion);
        }
        if is_unbounded(constraints, &problem.prices) {
            info!(constraints = constraints.len(), "unbounded region");
            return Err(SolveError::Unbounded);
        }

        let mut evaluated = Vec::with_capacity(vertices.len());
        let mut best: Option<EvaluatedVertex> = None;
        for point in vertices {
            let objective_value = problem.prices.objective(point);
            debug!(x1 = point.x1, x2 = point.x2, z = objective_value, "vertex");
            let vertex = EvaluatedVertex {
                point,
                objective_value,
            };
            if best.is_none_or(|b| objective_value > b.objective_value) {
                best = Some(vertex);
            }
            evaluated.push(vertex);
        }
        let Some(best) = best else {
            return Err(SolveError::NoFeasibleRegion);
        };

        let binding = constraints
            .iter()
            .enumerate()
            .filter(|(_, r)| (r.lhs(best.point) - r.c).abs() <= self.tolerance)
            .map(|(i, _)| i)
            .collect();

        info!(
            x1 = best.point.x1,
            x2 = best.point.x2,
            z = best.objective_value,
            "optimum"
        );
        Ok(Solution {
            point: best.point,
            objective_value: best.objective_value,
            evaluated,
            binding,
        })
    }
}

/// Solve with the default configuration.
pub fn solve(constraints: &[Constraint], prices: Prices) -> Result<Solution, SolveError> {
    let problem = Problem {
        prices,
        constraints: constraints.to_vec(),
    };
    Solver::new().solve(&problem)
}
