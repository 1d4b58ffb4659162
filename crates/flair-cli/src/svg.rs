//! SVG back end for `RenderPlan`.

use std::io::{self, Write};

use flair_solver::render::{Color, Label, LabelledLine, RenderPlan, Segment};

fn paint(color: Color) -> String {
    let (r, g, b, _) = color.rgba();
    format!("rgb({},{},{})", r, g, b)
}

fn opacity(color: Color) -> f64 {
    f64::from(color.rgba().3) / 255.0
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn write_segment(out: &mut impl Write, s: &Segment, extra: &str) -> io::Result<()> {
    writeln!(
        out,
        r#"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="2"{}/>"#,
        s.from.x,
        s.from.y,
        s.to.x,
        s.to.y,
        paint(s.color),
        extra
    )
}

/// Multi-line labels become one `tspan` per line.
fn write_label(out: &mut impl Write, label: &Label) -> io::Result<()> {
    let weight = if label.bold { " font-weight=\"bold\"" } else { "" };
    write!(
        out,
        r#"  <text x="{:.1}" y="{:.1}" font-size="{}" fill="{}"{}>"#,
        label.at.x,
        label.at.y,
        label.size,
        paint(label.color),
        weight
    )?;
    for (i, line) in label.text.lines().enumerate() {
        let dy = if i == 0 { 0 } else { label.size + 2 };
        write!(
            out,
            r#"<tspan x="{:.1}" dy="{}">{}</tspan>"#,
            label.at.x,
            dy,
            escape(line)
        )?;
    }
    writeln!(out, "</text>")
}

fn write_labelled_line(out: &mut impl Write, line: &LabelledLine, extra: &str) -> io::Result<()> {
    write_segment(out, &line.segment, extra)?;
    write_label(out, &line.label)
}

pub fn write_svg(out: &mut impl Write, plan: &RenderPlan) -> io::Result<()> {
    let v = &plan.viewport;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{1}" viewBox="0 0 {0} {1}" font-family="sans-serif">"#,
        v.width, v.height
    )?;
    writeln!(out, r#"  <rect width="100%" height="100%" fill="white"/>"#)?;

    if let Some(region) = &plan.region {
        let points: Vec<String> = region
            .points
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect();
        writeln!(
            out,
            r#"  <polygon points="{}" fill="{}" fill-opacity="{:.2}" stroke="{}" stroke-width="2"/>"#,
            points.join(" "),
            paint(region.fill),
            opacity(region.fill),
            paint(region.outline)
        )?;
    }

    for axis in &plan.axes {
        write_labelled_line(out, axis, "")?;
    }
    for tick in &plan.ticks {
        write_segment(out, &tick.mark, "")?;
        write_label(out, &tick.label)?;
    }
    for line in &plan.constraint_lines {
        write_labelled_line(out, line, "")?;
    }
    if let Some(iso) = &plan.iso_profit {
        write_labelled_line(out, iso, r#" stroke-dasharray="8 4""#)?;
    }

    if let Some(marker) = &plan.optimum {
        writeln!(
            out,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" stroke="{}" stroke-width="2"/>"#,
            marker.center.x,
            marker.center.y,
            marker.radius,
            paint(marker.fill),
            paint(marker.outline)
        )?;
        write_label(out, &marker.label)?;
    }

    let legend = &plan.legend;
    let background = Color::LegendBackground;
    writeln!(
        out,
        r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="{:.2}" stroke="black"/>"#,
        legend.origin.x,
        legend.origin.y,
        legend.width,
        legend.height,
        paint(background),
        opacity(background)
    )?;
    write_label(out, &legend.title)?;
    let mut y = legend.title.at.y + 30.0;
    for line in &legend.lines {
        if !line.is_empty() {
            writeln!(
                out,
                r#"  <text x="{:.1}" y="{:.1}" font-size="11">{}</text>"#,
                legend.origin.x + 20.0,
                y,
                escape(line)
            )?;
        }
        y += 16.0;
    }

    write_label(out, &plan.footer)?;
    writeln!(out, "</svg>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flair_solver::{Prices, Problem, Solver, Viewport};

    fn svg_for(problem: &Problem, solved: bool) -> String {
        let solution = solved.then(|| Solver::new().solve(problem).unwrap());
        let plan = RenderPlan::build(problem, solution.as_ref(), Viewport::default());
        let mut out = Vec::new();
        write_svg(&mut out, &plan).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("x <= 5 & y"), "x &lt;= 5 &amp; y");
    }

    #[test]
    fn test_flair_chart() {
        let problem = Problem::flair_furniture(Prices::new(7.0, 5.0).unwrap());
        let svg = svg_for(&problem, true);

        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 1);
        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
        // axes, ticks, constraint lines, iso-profit
        assert_eq!(svg.matches("<line ").count(), 2 + 20 + 3 + 1);
        assert!(svg.contains("4.00x₁ + 3.00x₂ &lt;= 240.00"));
        assert!(svg.contains("Z = $410.00"));
    }

    #[test]
    fn test_chart_before_solving() {
        let problem = Problem::flair_furniture(Prices::new(7.0, 5.0).unwrap());
        let svg = svg_for(&problem, false);
        assert_eq!(svg.matches("<circle").count(), 0);
        assert_eq!(svg.matches("stroke-dasharray").count(), 0);
    }
}
