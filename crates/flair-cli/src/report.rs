//! Plain-text and JSON reports shared by the subcommands and the menu.

use std::io::{self, Write};

use flair_lang::CompiledProblem;
use flair_solver::{Constraint, Prices, SolveError, Solution};
use serde_json::{Value, json};

/// Fixed-point formatting that never prints `-0.00`.
pub fn format_number(value: f64, decimals: usize) -> String {
    let half_ulp = 0.5 * 10f64.powi(-(decimals as i32));
    let value = if value.abs() < half_ulp { 0.0 } else { value };
    format!("{:.*}", decimals, value)
}

/// Labels `c1..cn` for constraints entered without names
pub fn default_labels(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("c{}", i)).collect()
}

pub fn write_objective(out: &mut impl Write, prices: &Prices) -> io::Result<()> {
    writeln!(out, "Maximize {}", prices)?;
    writeln!(out, "  x₁ = tables to produce")?;
    writeln!(out, "  x₂ = chairs to produce")?;
    writeln!(out, "  Z  = total profit (USD)")
}

pub fn write_constraints(
    out: &mut impl Write,
    labels: &[String],
    constraints: &[Constraint],
) -> io::Result<()> {
    if constraints.is_empty() {
        return writeln!(out, "No constraints entered.");
    }
    writeln!(out, "Constraints:")?;
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    for (i, (label, r)) in labels.iter().zip(constraints).enumerate() {
        writeln!(out, "  {:>2}. {:<width$}  {}", i + 1, label, r, width = width)?;
    }
    Ok(())
}

/// One line per evaluated vertex, the optimum marked with `*`.
pub fn write_vertex_table(out: &mut impl Write, solution: &Solution) -> io::Result<()> {
    writeln!(out, "Evaluated vertices:")?;
    writeln!(out, "{}", "-".repeat(40))?;
    for v in &solution.evaluated {
        let mark = if v.point.approx_eq(&solution.point) { '*' } else { ' ' };
        writeln!(
            out,
            "{} ({:>8}, {:>8})  Z = ${:>10}",
            mark,
            format_number(v.point.x1, 2),
            format_number(v.point.x2, 2),
            format_number(v.objective_value, 2)
        )?;
    }
    Ok(())
}

pub fn write_solution(
    out: &mut impl Write,
    solution: &Solution,
    labels: &[String],
) -> io::Result<()> {
    writeln!(out, "Status: OPTIMAL")?;
    writeln!(out, "  Tables (x₁): {} units", format_number(solution.x1(), 0))?;
    writeln!(out, "  Chairs (x₂): {} units", format_number(solution.x2(), 0))?;
    writeln!(out, "  Maximum profit: ${} USD", format_number(solution.objective_value, 2))?;

    if !solution.binding.is_empty() {
        let names: Vec<&str> = solution
            .binding
            .iter()
            .filter_map(|&i| labels.get(i).map(String::as_str))
            .collect();
        writeln!(out, "  Binding constraints: {}", names.join(", "))?;
    }

    let alternatives: Vec<String> = solution
        .alternative_optima()
        .map(|v| v.point.to_string())
        .collect();
    if !alternatives.is_empty() {
        writeln!(out, "  Alternative optima: {}", alternatives.join(", "))?;
    }
    Ok(())
}

pub fn write_solve_error(out: &mut impl Write, err: SolveError) -> io::Result<()> {
    match err {
        SolveError::NoFeasibleRegion => {
            writeln!(out, "Status: INFEASIBLE")?;
            writeln!(out, "No production mix satisfies all constraints.")
        }
        SolveError::Unbounded => {
            writeln!(out, "Status: UNBOUNDED")?;
            writeln!(out, "Profit can grow without limit; add an upper bound.")
        }
    }
}

fn status_name(result: Result<&Solution, SolveError>) -> &'static str {
    match result {
        Ok(_) => "optimal",
        Err(SolveError::NoFeasibleRegion) => "infeasible",
        Err(SolveError::Unbounded) => "unbounded",
    }
}

pub fn solution_json(compiled: &CompiledProblem, result: Result<&Solution, SolveError>) -> Value {
    let constraints: Vec<Value> = compiled
        .labelled()
        .map(|(label, r)| json!({ "label": label, "constraint": r, "display": r.to_string() }))
        .collect();

    let mut report = json!({
        "status": status_name(result),
        "prices": compiled.problem.prices,
        "constraints": constraints,
    });

    if let Ok(solution) = result {
        let binding: Vec<&str> = solution
            .binding
            .iter()
            .filter_map(|&i| compiled.labels.get(i).map(String::as_str))
            .collect();
        report["solution"] = json!({
            "tables": solution.x1(),
            "chairs": solution.x2(),
            "profit": solution.objective_value,
            "binding": binding,
            "vertices": solution.evaluated,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use flair_lang::Compiler;
    use flair_solver::Problem;

    fn flair() -> (CompiledProblem, Solution) {
        let problem = Problem::flair_furniture(Prices::new(7.0, 5.0).unwrap());
        let labels = default_labels(problem.num_constraints());
        let solution = flair_solver::Solver::new().solve(&problem).unwrap();
        (CompiledProblem { problem, labels }, solution)
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(410.0, 2), "410.00");
        assert_eq!(format_number(29.6, 0), "30");
        assert_eq!(format_number(-0.000_001, 2), "0.00");
        assert_eq!(format_number(-1.5, 1), "-1.5");
    }

    #[test]
    fn test_constraint_listing() {
        let (compiled, _) = flair();
        let text = render(|out| {
            write_constraints(out, &compiled.labels, &compiled.problem.constraints)
        });
        assert!(text.starts_with("Constraints:\n"));
        assert!(text.contains(" 1. c1  4.00x₁ + 3.00x₂ <= 240.00"));
        assert_eq!(text.lines().count(), 6);

        let empty = render(|out| write_constraints(out, &[], &[]));
        assert_eq!(empty, "No constraints entered.\n");
    }

    #[test]
    fn test_vertex_table_marks_optimum() {
        let (_, solution) = flair();
        let text = render(|out| write_vertex_table(out, &solution));
        let marked: Vec<_> = text.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("30.00"));
        assert!(marked[0].contains("410.00"));
        // header, rule, five vertices
        assert_eq!(text.lines().count(), 7);
    }

    #[test]
    fn test_solution_summary() {
        let (compiled, solution) = flair();
        let text = render(|out| write_solution(out, &solution, &compiled.labels));
        assert!(text.contains("Tables (x₁): 30 units"));
        assert!(text.contains("Chairs (x₂): 40 units"));
        assert!(text.contains("Maximum profit: $410.00 USD"));
        assert!(text.contains("Binding constraints: c1, c2"));
        assert!(!text.contains("Alternative optima"));
    }

    #[test]
    fn test_error_statuses() {
        let text = render(|out| write_solve_error(out, SolveError::Unbounded));
        assert!(text.starts_with("Status: UNBOUNDED"));
        let text = render(|out| write_solve_error(out, SolveError::NoFeasibleRegion));
        assert!(text.starts_with("Status: INFEASIBLE"));
    }

    #[test]
    fn test_json_report() {
        let compiled = Compiler::new()
            .compile_source(
                "max 7x1 + 5x2\n\
                 carpentry: 4x1 + 3x2 <= 240\n\
                 painting: 2x1 + x2 <= 100\n\
                 x2 <= 60\nx1 >= 0\nx2 >= 0",
            )
            .unwrap();
        let solution = flair_solver::Solver::new().solve(&compiled.problem).unwrap();
        let report = solution_json(&compiled, Ok(&solution));

        assert_eq!(report["status"], "optimal");
        assert_eq!(report["prices"]["table"], 7.0);
        assert_eq!(report["constraints"][0]["label"], "carpentry");
        assert_eq!(report["solution"]["profit"], 410.0);
        assert_eq!(report["solution"]["binding"], json!(["carpentry", "painting"]));
        assert_eq!(report["solution"]["vertices"].as_array().unwrap().len(), 5);

        let failed = solution_json(&compiled, Err(SolveError::Unbounded));
        assert_eq!(failed["status"], "unbounded");
        assert!(failed.get("solution").is_none());
    }
}
