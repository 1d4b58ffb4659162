//! Six-option console menu over a `Session`.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use flair_lang::MAX_CONSTRAINTS;
use flair_solver::{
    Constraint, ConstraintOp, Prices, RenderPlan, Session, SessionError, Viewport,
    flair_furniture_constraints,
};
use tracing::debug;

use crate::report;
use crate::svg;

const RULE_WIDTH: usize = 60;

pub struct Menu<R, W> {
    input: R,
    output: W,
    session: Session,
    plot_path: PathBuf,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, plot_path: PathBuf) -> Self {
        Self {
            input,
            output,
            session: Session::new(),
            plot_path,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs until option 6 or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.show_menu()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            match line.trim().parse::<u32>() {
                Ok(6) => break,
                Ok(1) => self.enter_prices()?,
                Ok(2) => self.enter_constraints()?,
                Ok(3) => self.show_objective()?,
                Ok(4) => self.solve()?,
                Ok(5) => self.plot()?,
                _ => self.error("Invalid option. Choose a number from 1 to 6.")?,
            }
        }
        writeln!(self.output)?;
        writeln!(self.output, "Thank you for using the production optimizer.")
    }

    fn show_menu(&mut self) -> io::Result<()> {
        let status = self.session.status();
        let out = &mut self.output;
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "  FLAIR FURNITURE: PRODUCTION OPTIMIZER")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "1. Enter selling prices")?;
        writeln!(out, "2. Enter production constraints")?;
        writeln!(out, "3. Show profit function")?;
        writeln!(out, "4. Compute optimal solution")?;
        writeln!(out, "5. Plot solution")?;
        writeln!(out, "6. Exit")?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        let tick = |set: bool| if set { "✓" } else { "✗" };
        let prices = if status.prices { "set" } else { "not set" };
        writeln!(out, "  Prices:      {} {}", tick(status.prices), prices)?;
        match status.constraints {
            Some(n) => writeln!(out, "  Constraints: ✓ set ({})", n)?,
            None => writeln!(out, "  Constraints: ✗ not set")?,
        }
        let solved = if status.solved { "computed" } else { "not computed" };
        writeln!(out, "  Solution:    {} {}", tick(status.solved), solved)?;
        write!(out, "Choose an option (1-6): ")?;
        out.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;
        self.read_line()
    }

    fn error(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "[ERROR] {}", message)
    }

    /// Re-prompts until a finite number is entered; `None` on end of input.
    fn prompt_number(&mut self, message: &str) -> io::Result<Option<f64>> {
        loop {
            let Some(line) = self.prompt(message)? else {
                return Ok(None);
            };
            let text: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            if text.is_empty() {
                self.error("Empty input. Please enter a number.")?;
                continue;
            }
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => return Ok(Some(value)),
                _ => self.error("Invalid input. Enter a number (e.g. 7.5, 123, -4.2).")?,
            }
        }
    }

    fn prompt_count(&mut self, message: &str) -> io::Result<Option<i64>> {
        loop {
            let Some(line) = self.prompt(message)? else {
                return Ok(None);
            };
            match line.trim().parse::<i64>() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => self.error("Invalid input. Enter a whole number (e.g. 5).")?,
            }
        }
    }

    /// Blank input means `<=`.
    fn prompt_operator(&mut self) -> io::Result<Option<ConstraintOp>> {
        loop {
            let Some(line) = self.prompt("Operator (<=, >=, =) [default <=]: ")? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                return Ok(Some(ConstraintOp::Le));
            }
            match line.parse::<ConstraintOp>() {
                Ok(op) => return Ok(Some(op)),
                Err(e) => self.error(e)?,
            }
        }
    }

    fn prompt_yes_no(&mut self, message: &str) -> io::Result<Option<bool>> {
        loop {
            let Some(line) = self.prompt(&format!("{} (y/n): ", message))? else {
                return Ok(None);
            };
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.error("Invalid answer. Enter 'y' for yes or 'n' for no.")?,
            }
        }
    }

    fn enter_prices(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nEnter the selling prices:")?;
        let Some(table) = self.prompt_number("Price per table (USD): $")? else {
            return Ok(());
        };
        let Some(chair) = self.prompt_number("Price per chair (USD): $")? else {
            return Ok(());
        };
        match Prices::new(table, chair) {
            Ok(prices) => {
                self.session.set_prices(prices);
                debug!(table, chair, "prices set");
                writeln!(self.output, "[OK] Prices recorded:")?;
                writeln!(self.output, "  Tables: ${} USD", report::format_number(table, 2))?;
                writeln!(self.output, "  Chairs: ${} USD", report::format_number(chair, 2))
            }
            Err(e) => self.error(e),
        }
    }

    fn enter_constraints(&mut self) -> io::Result<()> {
        let Some(preset) = self.prompt_yes_no("\nUse the Flair Furniture constraints?")? else {
            return Ok(());
        };

        let constraints = if preset {
            writeln!(self.output, "[OK] Flair Furniture constraints loaded.")?;
            flair_furniture_constraints()
        } else {
            let Some(count) = self.prompt_count("Number of constraints: ")? else {
                return Ok(());
            };
            if !(1..=MAX_CONSTRAINTS as i64).contains(&count) {
                return self.error(format!(
                    "The number of constraints must be between 1 and {}.",
                    MAX_CONSTRAINTS
                ));
            }
            let mut constraints = Vec::with_capacity(count as usize);
            while constraints.len() < count as usize {
                let Some(constraint) = self.enter_constraint(constraints.len() + 1)? else {
                    return Ok(());
                };
                constraints.push(constraint);
            }
            constraints
        };

        self.session.set_constraints(constraints);
        let constraints = self.session.constraints();
        let labels = report::default_labels(constraints.len());
        writeln!(self.output)?;
        report::write_constraints(&mut self.output, &labels, constraints)
    }

    /// One constraint, field by field; invalid rows are entered again.
    fn enter_constraint(&mut self, index: usize) -> io::Result<Option<Constraint>> {
        loop {
            writeln!(self.output, "\n--- Constraint {} ---", index)?;
            writeln!(self.output, "Form: a·x₁ + b·x₂ <= c")?;
            let Some(a) = self.prompt_number("Coefficient of x₁ (tables): ")? else {
                return Ok(None);
            };
            let Some(b) = self.prompt_number("Coefficient of x₂ (chairs): ")? else {
                return Ok(None);
            };
            let Some(c) = self.prompt_number("Right-hand side: ")? else {
                return Ok(None);
            };
            let Some(op) = self.prompt_operator()? else {
                return Ok(None);
            };
            match Constraint::new(a, b, c, op) {
                Ok(constraint) => return Ok(Some(constraint)),
                Err(e) => self.error(format!("{}; enter it again.", e))?,
            }
        }
    }

    fn show_objective(&mut self) -> io::Result<()> {
        let Some(prices) = self.session.prices() else {
            return self.error(SessionError::MissingPrices);
        };
        writeln!(self.output)?;
        report::write_objective(&mut self.output, &prices)?;
        let constraints = self.session.constraints();
        if !constraints.is_empty() {
            let labels = report::default_labels(constraints.len());
            writeln!(self.output)?;
            report::write_constraints(&mut self.output, &labels, constraints)?;
        }
        Ok(())
    }

    fn solve(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nComputing the optimal solution (vertex evaluation)...")?;
        let labels = report::default_labels(self.session.constraints().len());
        match self.session.solve() {
            Ok(solution) => {
                report::write_vertex_table(&mut self.output, solution)?;
                writeln!(self.output, "{}", "=".repeat(RULE_WIDTH))?;
                report::write_solution(&mut self.output, solution, &labels)
            }
            Err(SessionError::Solve(e)) => report::write_solve_error(&mut self.output, e),
            Err(e) => writeln!(self.output, "[ERROR] {}", e),
        }
    }

    fn plot(&mut self) -> io::Result<()> {
        let (Some(problem), Some(solution)) = (self.session.problem(), self.session.solution())
        else {
            return writeln!(self.output, "[ERROR] {}", SessionError::NotSolved);
        };
        let plan = RenderPlan::build(&problem, Some(solution), Viewport::default());

        let written = File::create(&self.plot_path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            svg::write_svg(&mut writer, &plan)?;
            writer.flush()
        });
        match written {
            Ok(()) => writeln!(
                self.output,
                "[OK] Chart written to {}",
                self.plot_path.display()
            ),
            Err(e) => self.error(format!("Cannot write {}: {}", self.plot_path.display(), e)),
        }
    }
}
