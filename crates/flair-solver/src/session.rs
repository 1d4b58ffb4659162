//! Interactive session state: which inputs have been entered and whether
//! the current solution is still valid.

use thiserror::Error;

use crate::optimizer::{SolveError, Solver};
use crate::problem::{Constraint, Prices, Problem};
use crate::solution::Solution;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Enter the selling prices first")]
    MissingPrices,
    #[error("Enter the production constraints first")]
    MissingConstraints,
    #[error("Compute the optimal solution first")]
    NotSolved,
    #[error(transparent)]
    Solve(#[from] SolveError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Empty,
    PricesSet(Prices),
    ConstraintsSet(Vec<Constraint>),
    Ready {
        prices: Prices,
        constraints: Vec<Constraint>,
    },
    Solved {
        prices: Prices,
        constraints: Vec<Constraint>,
        solution: Solution,
    },
}

/// Snapshot of what the session holds, for status banners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub prices: bool,
    pub constraints: Option<usize>,
    pub solved: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    solver: Solver,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(solver: Solver) -> Self {
        Self {
            state: SessionState::Empty,
            solver,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Replace the prices, discarding any computed solution.
    pub fn set_prices(&mut self, prices: Prices) {
        self.state = match std::mem::take(&mut self.state) {
            SessionState::Empty | SessionState::PricesSet(_) => SessionState::PricesSet(prices),
            SessionState::ConstraintsSet(constraints)
            | SessionState::Ready { constraints, .. }
            | SessionState::Solved { constraints, .. } => SessionState::Ready {
                prices,
                constraints,
            },
        };
    }

    /// Replace the constraint set, discarding any computed solution.
    /// An empty set leaves the session without constraints.
    pub fn set_constraints(&mut self, constraints: Vec<Constraint>) {
        let prices = self.prices();
        self.state = match (prices, constraints.is_empty()) {
            (None, true) => SessionState::Empty,
            (None, false) => SessionState::ConstraintsSet(constraints),
            (Some(prices), true) => SessionState::PricesSet(prices),
            (Some(prices), false) => SessionState::Ready {
                prices,
                constraints,
            },
        };
    }

    /// Solve the current problem and keep the result. On failure the session
    /// stays unsolved.
    pub fn solve(&mut self) -> Result<&Solution, SessionError> {
        let (prices, constraints) = match std::mem::take(&mut self.state) {
            SessionState::Empty => {
                return Err(SessionError::MissingPrices);
            }
            SessionState::ConstraintsSet(constraints) => {
                self.state = SessionState::ConstraintsSet(constraints);
                return Err(SessionError::MissingPrices);
            }
            SessionState::PricesSet(prices) => {
                self.state = SessionState::PricesSet(prices);
                return Err(SessionError::MissingConstraints);
            }
            SessionState::Ready {
                prices,
                constraints,
            }
            | SessionState::Solved {
                prices,
                constraints,
                ..
            } => (prices, constraints),
        };

        let problem = Problem {
            prices,
            constraints,
        };
        match self.solver.solve(&problem) {
            Ok(solution) => {
                self.state = SessionState::Solved {
                    prices: problem.prices,
                    constraints: problem.constraints,
                    solution,
                };
                self.solution().ok_or(SessionError::NotSolved)
            }
            Err(e) => {
                self.state = SessionState::Ready {
                    prices: problem.prices,
                    constraints: problem.constraints,
                };
                Err(e.into())
            }
        }
    }

    pub fn prices(&self) -> Option<Prices> {
        match &self.state {
            SessionState::PricesSet(prices)
            | SessionState::Ready { prices, .. }
            | SessionState::Solved { prices, .. } => Some(*prices),
            _ => None,
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        match &self.state {
            SessionState::ConstraintsSet(constraints)
            | SessionState::Ready { constraints, .. }
            | SessionState::Solved { constraints, .. } => constraints,
            _ => &[],
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match &self.state {
            SessionState::Solved { solution, .. } => Some(solution),
            _ => None,
        }
    }

    /// Current problem, when both prices and constraints are known.
    pub fn problem(&self) -> Option<Problem> {
        let prices = self.prices()?;
        if self.constraints().is_empty() {
            return None;
        }
        Some(Problem {
            prices,
            constraints: self.constraints().to_vec(),
        })
    }

    pub fn status(&self) -> SessionStatus {
        let constraints = self.constraints();
        SessionStatus {
            prices: self.prices().is_some(),
            constraints: (!constraints.is_empty()).then_some(constraints.len()),
            solved: self.solution().is_some(),
        }
    }
}
