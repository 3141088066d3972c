//! SVG rendering of a [`ChartSpec`].

use std::fmt::Write;

use crate::domain::chart::{Annotation, Axis, ChartSpec, Line, CLOSE_COLOR, YIELD_COLOR};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 540.0;
const PAD_LEFT: f64 = 70.0;
const PAD_RIGHT: f64 = 80.0;
const PAD_TOP: f64 = 110.0;
const PAD_BOTTOM: f64 = 50.0;
const Y_TICKS: usize = 5;
const X_LABELS: usize = 6;

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Linear map from a value range onto the plot's vertical extent.
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    /// Widen a zero-width range so a flat series still has somewhere to sit.
    fn new(min: f64, max: f64) -> Self {
        if max - min > f64::EPSILON {
            Self { min, max }
        } else if min > 0.5 {
            Self { min: min - 0.5, max: max + 0.5 }
        } else {
            Self { min: 0.0, max: max + 1.0 }
        }
    }

    fn y(&self, value: f64) -> f64 {
        let bottom = HEIGHT - PAD_BOTTOM;
        let plot_height = HEIGHT - PAD_TOP - PAD_BOTTOM;
        let clamped = value.clamp(self.min, self.max);
        bottom - (clamped - self.min) / (self.max - self.min) * plot_height
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        let step = (self.max - self.min) / (Y_TICKS - 1) as f64;
        (0..Y_TICKS).map(move |i| self.min + step * i as f64)
    }
}

struct Frame {
    count: usize,
    price: Scale,
    yield_: Scale,
}

impl Frame {
    fn x(&self, index: usize) -> f64 {
        let plot_width = WIDTH - PAD_LEFT - PAD_RIGHT;
        if self.count <= 1 {
            return PAD_LEFT + plot_width / 2.0;
        }
        PAD_LEFT + index as f64 * plot_width / (self.count - 1) as f64
    }

    fn scale(&self, axis: Axis) -> Scale {
        match axis {
            Axis::Price => self.price,
            Axis::Yield => self.yield_,
        }
    }

    fn points(&self, values: &[f64], scale: Scale) -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| format!("{:.1},{:.1}", self.x(i), scale.y(v)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn empty_svg(message: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="120" viewBox="0 0 {WIDTH} 120"><text x="{x}" y="60" text-anchor="middle" font-family="sans-serif" font-size="16">{msg}</text></svg>"#,
        x = WIDTH / 2.0,
        msg = escape_xml(message),
    )
}

fn write_axes(svg: &mut String, spec: &ChartSpec, frame: &Frame) {
    let bottom = HEIGHT - PAD_BOTTOM;
    let right = WIDTH - PAD_RIGHT;

    for (price, yld) in frame.price.ticks().zip(frame.yield_.ticks()) {
        let y = frame.price.y(price);
        let _ = write!(
            svg,
            r#"<line x1="{PAD_LEFT}" y1="{y:.1}" x2="{right}" y2="{y:.1}" stroke="rgba(128,128,128,0.2)"/>"#
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{ty:.1}" text-anchor="end" font-size="11" fill="{CLOSE_COLOR}">{price:.2}</text>"#,
            x = PAD_LEFT - 6.0,
            ty = y + 4.0,
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{ty:.1}" font-size="11" fill="{YIELD_COLOR}">{yld:.2}%</text>"#,
            x = right + 6.0,
            ty = frame.yield_.y(yld) + 4.0,
        );
    }

    let stride = frame.count.div_ceil(X_LABELS).max(1);
    for (i, date) in spec.dates.iter().enumerate().step_by(stride) {
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" font-size="11">{date}</text>"#,
            x = frame.x(i),
            y = bottom + 18.0,
        );
    }

    let _ = write!(
        svg,
        r#"<line x1="{PAD_LEFT}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="black"/><text x="{cx}" y="{ly}" text-anchor="middle" font-size="14">Date</text>"#,
        cx = PAD_LEFT + (right - PAD_LEFT) / 2.0,
        ly = HEIGHT - 8.0,
    );
    let _ = write!(
        svg,
        r#"<text transform="translate(16,{cy}) rotate(-90)" text-anchor="middle" font-size="14" fill="{CLOSE_COLOR}">{label}</text>"#,
        cy = PAD_TOP + (bottom - PAD_TOP) / 2.0,
        label = escape_xml(&spec.price_label),
    );
    let _ = write!(
        svg,
        r#"<text transform="translate({x},{cy}) rotate(90)" text-anchor="middle" font-size="14" fill="{YIELD_COLOR}">{label}</text>"#,
        x = WIDTH - 14.0,
        cy = PAD_TOP + (bottom - PAD_TOP) / 2.0,
        label = escape_xml(&spec.yield_label),
    );
}

fn write_line(svg: &mut String, line: &Line, frame: &Frame) {
    if line.values.is_empty() {
        return;
    }
    let scale = frame.scale(line.axis);

    if let Some(fill) = line.fill {
        let base = scale.y(scale.min);
        let last = line.values.len() - 1;
        let _ = write!(
            svg,
            r#"<polygon points="{x0:.1},{base:.1} {pts} {xn:.1},{base:.1}" fill="{fill}" stroke="none"/>"#,
            x0 = frame.x(0),
            pts = frame.points(&line.values, scale),
            xn = frame.x(last),
        );
    }

    let dash = line
        .dash
        .map(|d| format!(r#" stroke-dasharray="{d}""#))
        .unwrap_or_default();
    let _ = write!(
        svg,
        r#"<polyline points="{pts}" fill="none" stroke="{color}" stroke-width="{width}"{dash}><title>{label}</title></polyline>"#,
        pts = frame.points(&line.values, scale),
        color = line.color,
        width = line.width,
        label = escape_xml(&line.label),
    );
}

fn write_annotation(svg: &mut String, note: &Annotation, frame: &Frame) {
    let x = frame.x(note.index);
    let y = frame.price.y(note.value);
    let (lx, ly) = (x + 40.0, if note.below { y + 40.0 } else { y - 40.0 });
    let _ = write!(
        svg,
        r#"<g class="annotation"><line x1="{x:.1}" y1="{y:.1}" x2="{lx:.1}" y2="{ly:.1}" stroke="{CLOSE_COLOR}"/><circle cx="{x:.1}" cy="{y:.1}" r="4" fill="{CLOSE_COLOR}"/><rect x="{rx:.1}" y="{ry:.1}" width="90" height="20" fill="{bg}" opacity="0.8" stroke="{CLOSE_COLOR}" stroke-width="2"/><text x="{tx:.1}" y="{ty:.1}" text-anchor="middle" font-size="11">{text}</text></g>"#,
        rx = lx - 45.0,
        ry = ly - 10.0,
        bg = note.background,
        tx = lx,
        ty = ly + 4.0,
        text = escape_xml(&note.text),
    );
}

fn write_legend(svg: &mut String, spec: &ChartSpec) {
    let mut x = PAD_LEFT;
    let y = 78.0;
    let _ = write!(
        svg,
        r#"<rect x="{x}" y="{ry}" width="18" height="10" fill="{fill}"/><text x="{tx}" y="{y}" font-size="12">{label}</text>"#,
        ry = y - 9.0,
        fill = spec.band.fill,
        tx = x + 24.0,
        label = escape_xml(&spec.band.label),
    );
    x += 24.0 + spec.band.label.len() as f64 * 7.0 + 20.0;

    for line in &spec.lines {
        let dash = line
            .dash
            .map(|d| format!(r#" stroke-dasharray="{d}""#))
            .unwrap_or_default();
        let _ = write!(
            svg,
            r#"<line x1="{x}" y1="{ly}" x2="{x2}" y2="{ly}" stroke="{color}" stroke-width="3"{dash}/><text x="{tx}" y="{y}" font-size="12">{label}</text>"#,
            ly = y - 4.0,
            x2 = x + 18.0,
            color = line.color,
            tx = x + 24.0,
            label = escape_xml(&line.label),
        );
        x += 24.0 + line.label.len() as f64 * 7.0 + 20.0;
    }
}

/// Standalone SVG document for `spec`.
pub fn render_chart_svg(spec: &ChartSpec) -> String {
    let Some((price_min, price_max)) = spec.price_extent() else {
        return empty_svg("No price data available.");
    };

    let frame = Frame {
        count: spec.dates.len(),
        price: Scale::new(price_min, price_max),
        yield_: Scale::new(spec.yield_axis.min, spec.yield_axis.max),
    };

    let mut svg = String::with_capacity(16 * 1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif"><rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#
    );
    let _ = write!(
        svg,
        r#"<text x="{cx}" y="28" text-anchor="middle" font-size="18">{title}</text><text x="{cx}" y="50" text-anchor="middle" font-size="14">{subtitle}</text>"#,
        cx = WIDTH / 2.0,
        title = escape_xml(&spec.title),
        subtitle = escape_xml(&spec.subtitle),
    );
    write_legend(&mut svg, spec);
    write_axes(&mut svg, spec, &frame);

    let upper = frame.points(&spec.band.upper, frame.price);
    let lower_rev: Vec<f64> = spec.band.lower.iter().rev().copied().collect();
    let lower = lower_rev
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let index = lower_rev.len() - 1 - i;
            format!("{:.1},{:.1}", frame.x(index), frame.price.y(v))
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        svg,
        r#"<polygon class="band" points="{upper} {lower}" fill="{fill}" stroke="none"/>"#,
        fill = spec.band.fill,
    );

    // yield lines first so the close line is drawn on top
    for line in spec.lines_on(Axis::Yield).chain(spec.lines_on(Axis::Price)) {
        write_line(&mut svg, line, &frame);
    }
    for note in &spec.annotations {
        write_annotation(&mut svg, note, &frame);
    }

    svg.push_str("</svg>");
    svg
}
