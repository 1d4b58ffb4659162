use crate::problem::{EPSILON, Point};

/// The result of a successful optimization
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Optimal production mix
    pub point: Point,
    /// Objective value at the optimum
    pub objective_value: f64,
    /// Every feasible vertex with its objective value, in `(x1, x2)` order
    pub evaluated: Vec<EvaluatedVertex>,
    /// Indices of the constraints that are tight at the optimum
    pub binding: Vec<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatedVertex {
    pub point: Point,
    pub objective_value: f64,
}

impl Solution {
    pub fn x1(&self) -> f64 {
        self.point.x1
    }

    pub fn x2(&self) -> f64 {
        self.point.x2
    }

    /// Vertices sharing the optimal objective value, i.e. alternative optima.
    pub fn alternative_optima(&self) -> impl Iterator<Item = &EvaluatedVertex> + '_ {
        let best = self.objective_value;
        let point = self.point;
        self.evaluated.iter().filter(move |v| {
            (v.objective_value - best).abs() <= EPSILON && !v.point.approx_eq(&point)
        })
    }
}
