//! Maps a problem and its solution onto screen-space drawing primitives.
//!
//! Nothing here draws; a back end (SVG in the CLI) walks the `RenderPlan`.

use crate::geometry::clip_to_bounds;
use crate::problem::{Constraint, ConstraintOp, Point, Problem};
use crate::region::{BoundingBox, candidate_vertices, ordered_boundary};
use crate::solution::Solution;

/// Drawing surface size in pixels, with the plot inset by `margin` on each side
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 80.0,
        }
    }
}

impl Viewport {
    /// Pixels per unit along x1 and x2
    pub fn scale(&self, bounds: &BoundingBox) -> (f64, f64) {
        (
            (self.width - 2.0 * self.margin) / bounds.max_x,
            (self.height - 2.0 * self.margin) / bounds.max_y,
        )
    }

    /// Screen position of `p`; the origin sits at the bottom-left margin.
    pub fn to_screen(&self, p: Point, bounds: &BoundingBox) -> ScreenPoint {
        let (sx, sy) = self.scale(bounds);
        ScreenPoint {
            x: self.margin + p.x1 * sx,
            y: self.height - self.margin - p.x2 * sy,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    fn offset(self, dx: f64, dy: f64) -> ScreenPoint {
        ScreenPoint {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    fn midpoint(self, other: ScreenPoint) -> ScreenPoint {
        ScreenPoint {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Blue,
    Green,
    Magenta,
    Cyan,
    RegionFill,
    RegionOutline,
    LegendBackground,
}

/// Colours cycled over the constraint lines
pub const CONSTRAINT_PALETTE: [Color; 5] = [
    Color::Red,
    Color::Blue,
    Color::Green,
    Color::Magenta,
    Color::Cyan,
];

impl Color {
    pub fn rgba(self) -> (u8, u8, u8, u8) {
        match self {
            Color::Black => (0, 0, 0, 255),
            Color::Red => (255, 0, 0, 255),
            Color::Blue => (0, 0, 255, 255),
            Color::Green => (0, 255, 0, 255),
            Color::Magenta => (255, 0, 255, 255),
            Color::Cyan => (0, 255, 255, 255),
            Color::RegionFill => (100, 200, 100, 80),
            Color::RegionOutline => (50, 150, 50, 255),
            Color::LegendBackground => (255, 255, 255, 200),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: ScreenPoint,
    pub to: ScreenPoint,
    pub color: Color,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub at: ScreenPoint,
    pub text: String,
    pub size: u32,
    pub color: Color,
    pub bold: bool,
}

impl Label {
    fn new(at: ScreenPoint, text: impl Into<String>, size: u32, color: Color) -> Self {
        Self {
            at,
            text: text.into(),
            size,
            color,
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// A segment with its caption
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledLine {
    pub segment: Segment,
    pub label: Label,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<ScreenPoint>,
    pub fill: Color,
    pub outline: Color,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub center: ScreenPoint,
    pub radius: f64,
    pub fill: Color,
    pub outline: Color,
    pub label: Label,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub mark: Segment,
    pub label: Label,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub origin: ScreenPoint,
    pub width: f64,
    pub height: f64,
    pub title: Label,
    pub lines: Vec<String>,
}

/// Everything needed to draw one chart, in back-to-front order of the fields
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub viewport: Viewport,
    pub bounds: BoundingBox,
    pub axes: Vec<LabelledLine>,
    pub ticks: Vec<Tick>,
    pub region: Option<Polygon>,
    pub constraint_lines: Vec<LabelledLine>,
    pub iso_profit: Option<LabelledLine>,
    pub optimum: Option<Marker>,
    pub legend: Legend,
    pub footer: Label,
}

const TICKS_PER_AXIS: u32 = 10;

impl RenderPlan {
    pub fn build(problem: &Problem, solution: Option<&Solution>, viewport: Viewport) -> Self {
        let bounds = BoundingBox::derive(&problem.constraints, solution.map(|s| s.point));
        let to_screen = |p: Point| viewport.to_screen(p, &bounds);

        let origin = to_screen(Point::ORIGIN);
        let x_end = to_screen(Point::new(bounds.max_x, 0.0));
        let y_end = to_screen(Point::new(0.0, bounds.max_y));
        let axes = vec![
            LabelledLine {
                segment: Segment {
                    from: origin,
                    to: x_end,
                    color: Color::Black,
                },
                label: Label::new(
                    origin.midpoint(x_end).offset(0.0, 20.0),
                    "x₁ (Tables)",
                    14,
                    Color::Black,
                ),
            },
            LabelledLine {
                segment: Segment {
                    from: origin,
                    to: y_end,
                    color: Color::Black,
                },
                label: Label::new(
                    ScreenPoint {
                        x: 10.0,
                        y: origin.midpoint(y_end).y,
                    },
                    "x₂ (Chairs)",
                    14,
                    Color::Black,
                ),
            },
        ];

        let ticks = axis_ticks(&bounds, &viewport);

        let vertices = candidate_vertices(&problem.constraints, &bounds);
        let boundary = ordered_boundary(&vertices);
        let region = (boundary.len() >= 3).then(|| Polygon {
            points: boundary.into_iter().map(to_screen).collect(),
            fill: Color::RegionFill,
            outline: Color::RegionOutline,
        });

        let constraint_lines = problem
            .constraints
            .iter()
            .filter(|r| !r.is_non_negativity())
            .filter_map(|r| {
                clip_to_bounds(r, &bounds).map(|(p, q)| (r, to_screen(p), to_screen(q)))
            })
            .enumerate()
            .map(|(i, (r, from, to))| {
                let color = CONSTRAINT_PALETTE[i % CONSTRAINT_PALETTE.len()];
                LabelledLine {
                    segment: Segment { from, to, color },
                    label: Label::new(
                        from.midpoint(to).offset(0.0, -15.0),
                        r.to_string(),
                        10,
                        color,
                    ),
                }
            })
            .collect();

        let iso_profit = solution.and_then(|s| {
            let line = Constraint {
                a: problem.prices.table,
                b: problem.prices.chair,
                c: s.objective_value,
                op: ConstraintOp::Eq,
            };
            let (p, q) = clip_to_bounds(&line, &bounds)?;
            let (from, to) = (to_screen(p), to_screen(q));
            Some(LabelledLine {
                segment: Segment {
                    from,
                    to,
                    color: Color::Black,
                },
                label: Label::new(
                    from.midpoint(to).offset(0.0, 15.0),
                    problem.prices.to_string(),
                    12,
                    Color::Black,
                )
                .bold(),
            })
        });

        let optimum = solution.map(|s| {
            let center = to_screen(s.point);
            Marker {
                center,
                radius: 8.0,
                fill: Color::Red,
                outline: Color::Black,
                label: Label::new(
                    center.offset(15.0, -20.0),
                    format!(
                        "Optimum ({:.0}, {:.0})\nZ = ${:.2}",
                        s.x1(),
                        s.x2(),
                        s.objective_value
                    ),
                    12,
                    Color::Red,
                )
                .bold(),
            }
        });

        let legend_origin = ScreenPoint {
            x: viewport.width - 270.0,
            y: 20.0,
        };
        let mut lines = Vec::new();
        if let Some(s) = solution {
            lines.push("Optimal solution:".to_string());
            lines.push(format!("Tables: {:.0}", s.x1()));
            lines.push(format!("Chairs: {:.0}", s.x2()));
            lines.push(format!("Profit: ${:.2}", s.objective_value));
            lines.push(String::new());
        }
        lines.push("Green area: feasible region".to_string());
        if solution.is_some() {
            lines.push("Red point: optimal solution".to_string());
        }
        lines.push("Coloured lines: constraints".to_string());
        let legend = Legend {
            origin: legend_origin,
            width: 250.0,
            height: 200.0,
            title: Label::new(legend_origin.offset(20.0, 10.0), "INFORMATION", 14, Color::Black)
                .bold(),
            lines,
        };

        let footer = Label::new(
            ScreenPoint {
                x: 10.0,
                y: viewport.height - 25.0,
            },
            "Flair Furniture production mix",
            12,
            Color::Black,
        );

        Self {
            viewport,
            bounds,
            axes,
            ticks,
            region,
            constraint_lines,
            iso_profit,
            optimum,
            legend,
            footer,
        }
    }
}

fn axis_ticks(bounds: &BoundingBox, viewport: &Viewport) -> Vec<Tick> {
    let mut ticks = Vec::with_capacity(2 * TICKS_PER_AXIS as usize);
    let step_x = bounds.max_x / f64::from(TICKS_PER_AXIS);
    let step_y = bounds.max_y / f64::from(TICKS_PER_AXIS);

    for k in 1..=TICKS_PER_AXIS {
        let value = step_x * f64::from(k);
        let at = viewport.to_screen(Point::new(value, 0.0), bounds);
        ticks.push(Tick {
            mark: Segment {
                from: at.offset(0.0, -3.0),
                to: at.offset(0.0, 3.0),
                color: Color::Black,
            },
            label: Label::new(at.offset(-8.0, 8.0), format!("{:.0}", value), 10, Color::Black),
        });
    }
    for k in 1..=TICKS_PER_AXIS {
        let value = step_y * f64::from(k);
        let at = viewport.to_screen(Point::new(0.0, value), bounds);
        ticks.push(Tick {
            mark: Segment {
                from: at.offset(-3.0, 0.0),
                to: at.offset(3.0, 0.0),
                color: Color::Black,
            },
            label: Label::new(at.offset(-25.0, -8.0), format!("{:.0}", value), 10, Color::Black),
        });
    }
    ticks
}
