pub mod geometry;
mod optimizer;
mod problem;
pub mod region;
pub mod render;
mod session;
mod solution;

pub use geometry::{axis_intercepts, clip_to_bounds, intersect, is_feasible};
pub use optimizer::{SolveError, Solver, solve};
pub use problem::{
    Constraint, ConstraintOp, DET_EPSILON, EPSILON, Point, Prices, Problem, SolverError,
    UnknownOperator, flair_furniture_constraints,
};
pub use region::{BoundingBox, candidate_vertices, is_unbounded, ordered_boundary};
pub use render::{RenderPlan, Viewport};
pub use session::{Session, SessionError, SessionState, SessionStatus};
pub use solution::{EvaluatedVertex, Solution};
