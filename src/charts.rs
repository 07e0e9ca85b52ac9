//! SVG chart rendering for the report views.
//!
//! Every chart renders into an in-memory string; nothing here touches the
//! filesystem. The dashboard binary decides whether to write artifacts out.

use crate::error::{MindError, Result};
use crate::stats::Bin;
use plotters::prelude::*;
use serde::Serialize;
use std::f64::consts::PI;

const WIDTH: u32 = 900;
const HEIGHT: u32 = 500;
const SKYBLUE: RGBColor = RGBColor(135, 206, 235);
const SALMON: RGBColor = RGBColor(250, 128, 114);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const TEAL: RGBColor = RGBColor(0, 128, 128);

#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    /// File-name friendly identifier, unique within a view
    pub name: String,
    pub title: String,
    #[serde(skip)]
    pub svg: String,
}

fn render_err<E: std::fmt::Display>(err: E) -> MindError {
    MindError::computation(format!("chart rendering failed: {}", err))
}

/// Which palette a bar chart uses.
#[derive(Debug, Clone, Copy)]
pub enum Tint {
    Sky,
    Salmon,
}

impl Tint {
    fn color(self) -> RGBColor {
        match self {
            Tint::Sky => SKYBLUE,
            Tint::Salmon => SALMON,
        }
    }
}

/// Vertical bars with one category label per bar.
pub fn bar_chart(name: &str, title: &str, y_desc: &str, bars: &[(String, f64)], tint: Tint) -> Result<Artifact> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let n = bars.len().max(1) as u32;
        let y_max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max).max(1.0) * 1.1;
        let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
        let formatter = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(110)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n as usize)
            .x_label_formatter(&formatter)
            .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(tint.color().filled())
                    .margin(2)
                    .data(bars.iter().enumerate().map(|(i, (_, v))| (i as u32, *v))),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(Artifact {
        name: name.to_string(),
        title: title.to_string(),
        svg,
    })
}

/// Histogram of precomputed bins, labelled by the lower edge of each bin.
pub fn histogram_chart(name: &str, title: &str, bins: &[Bin]) -> Result<Artifact> {
    let bars: Vec<(String, f64)> = bins
        .iter()
        .map(|b| (format!("{:.3}", b.lo), b.count as f64))
        .collect();
    bar_chart(name, title, "Frequency", &bars, Tint::Sky)
}

/// Donut chart: slices proportional to counts, legend on the right.
pub fn donut_chart(name: &str, title: &str, slices: &[(String, f64)]) -> Result<Artifact> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        root.draw(&Text::new(
            title.to_string(),
            (20, 20),
            ("sans-serif", 22).into_font().color(&BLACK),
        ))
        .map_err(render_err)?;

        let total: f64 = slices.iter().map(|(_, v)| v.max(0.0)).sum();
        let (cx, cy) = (260.0, 270.0);
        let (outer, inner) = (200.0, 80.0);
        let mut start = -PI / 2.0;

        for (i, (label, value)) in slices.iter().enumerate() {
            if total <= 0.0 {
                break;
            }
            let share = value.max(0.0) / total;
            let sweep = share * 2.0 * PI;
            let steps = ((sweep / (2.0 * PI)) * 120.0).ceil().max(2.0) as usize;
            let mut ring: Vec<(i32, i32)> = Vec::with_capacity(steps * 2 + 2);
            for s in 0..=steps {
                let a = start + sweep * s as f64 / steps as f64;
                ring.push(((cx + outer * a.cos()) as i32, (cy + outer * a.sin()) as i32));
            }
            for s in (0..=steps).rev() {
                let a = start + sweep * s as f64 / steps as f64;
                ring.push(((cx + inner * a.cos()) as i32, (cy + inner * a.sin()) as i32));
            }
            root.draw(&Polygon::new(ring, Palette99::pick(i).filled()))
                .map_err(render_err)?;

            let legend_y = 60 + 22 * i as i32;
            if legend_y < HEIGHT as i32 - 10 {
                root.draw(&Rectangle::new(
                    [(500, legend_y), (514, legend_y + 14)],
                    Palette99::pick(i).filled(),
                ))
                .map_err(render_err)?;
                root.draw(&Text::new(
                    format!("{} ({:.1}%)", label, share * 100.0),
                    (522, legend_y),
                    ("sans-serif", 14).into_font().color(&BLACK),
                ))
                .map_err(render_err)?;
            }
            start += sweep;
        }
        root.present().map_err(render_err)?;
    }
    Ok(Artifact {
        name: name.to_string(),
        title: title.to_string(),
        svg,
    })
}

pub fn line_chart(name: &str, title: &str, x_desc: &str, y_desc: &str, points: &[(f64, f64)]) -> Result<Artifact> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let (x_lo, x_hi) = padded_range(points.iter().map(|p| p.0), 0.0);
        let (_, y_hi) = padded_range(points.iter().map(|p| p.1), 0.05);
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
            .map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(Artifact {
        name: name.to_string(),
        title: title.to_string(),
        svg,
    })
}

/// Min and max of `values`, widened by `pad` of the span. Degenerate or
/// empty inputs get a unit-wide range so the chart can still be built.
fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let span = hi - lo;
    (lo - span * pad, hi + span * pad)
}

/// Y range for the box plot: 10% of |min| below and 10% of |max| above.
pub fn boxplot_y_range(columns: &[(String, Vec<f64>)]) -> (f64, f64) {
    let all = columns.iter().flat_map(|(_, v)| v.iter().copied()).filter(|v| v.is_finite());
    let (lo, hi) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let (lo, hi) = (lo - 0.1 * lo.abs(), hi + 0.1 * hi.abs());
    if hi - lo < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

/// One box per column.
pub fn boxplot_chart(name: &str, title: &str, columns: &[(String, Vec<f64>)]) -> Result<Artifact> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let n = columns.len().max(1) as u32;
        let (y_lo, y_hi) = boxplot_y_range(columns);
        let labels: Vec<String> = columns.iter().map(|(l, _)| l.clone()).collect();
        let formatter = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), (y_lo as f32)..(y_hi as f32))
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n as usize)
            .x_label_formatter(&formatter)
            .y_labels(10)
            .x_desc("Dimensions")
            .y_desc("Values")
            .draw()
            .map_err(render_err)?;

        let boxes: Vec<_> = columns
            .iter()
            .enumerate()
            .filter(|(_, (_, values))| !values.is_empty())
            .map(|(i, (_, values))| {
                let quartiles = Quartiles::new(values);
                Boxplot::new_vertical(SegmentValue::CenterOf(i as u32), &quartiles)
                    .width(30)
                    .style(&BLUE)
            })
            .collect();
        chart.draw_series(boxes).map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(Artifact {
        name: name.to_string(),
        title: title.to_string(),
        svg,
    })
}

/// 2D scatter. `groups`, when given, picks a palette color per point.
pub fn scatter_2d(name: &str, title: &str, points: &[(f64, f64)], groups: Option<&[usize]>) -> Result<Artifact> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let (x_lo, x_hi) = padded_range(points.iter().map(|p| p.0), 0.05);
        let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.1), 0.05);
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .x_desc("PCA Component 1")
            .y_desc("PCA Component 2")
            .draw()
            .map_err(render_err)?;
        chart
            .draw_series(points.iter().enumerate().map(|(i, &(x, y))| {
                let style = match groups.and_then(|g| g.get(i)) {
                    Some(&c) => Palette99::pick(c).mix(0.7).filled(),
                    None => PURPLE.mix(0.6).filled(),
                };
                Circle::new((x, y), 3, style)
            }))
            .map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(Artifact {
        name: name.to_string(),
        title: title.to_string(),
        svg,
    })
}

pub fn scatter_3d(name: &str, title: &str, points: &[(f64, f64, f64)]) -> Result<Artifact> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, 700)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let (x_lo, x_hi) = padded_range(points.iter().map(|p| p.0), 0.05);
        let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.1), 0.05);
        let (z_lo, z_hi) = padded_range(points.iter().map(|p| p.2), 0.05);
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .build_cartesian_3d(x_lo..x_hi, y_lo..y_hi, z_lo..z_hi)
            .map_err(render_err)?;
        chart.with_projection(|mut pb| {
            pb.yaw = 0.6;
            pb.pitch = 0.35;
            pb.scale = 0.85;
            pb.into_matrix()
        });
        chart.configure_axes().draw().map_err(render_err)?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y, z)| Circle::new((x, y, z), 2, TEAL.mix(0.6).filled())),
            )
            .map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(Artifact {
        name: name.to_string(),
        title: title.to_string(),
        svg,
    })
}

/// Words sized by frequency, packed left to right in rows.
pub fn word_cloud(name: &str, title: &str, words: &[(String, usize)]) -> Result<Artifact> {
    const MIN_SIZE: f64 = 12.0;
    const MAX_SIZE: f64 = 56.0;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let top = words.first().map(|(_, c)| *c).unwrap_or(1).max(1) as f64;
        let (mut x, mut y) = (10.0f64, 10.0f64);
        let mut row_height = 0.0f64;
        for (i, (word, count)) in words.iter().enumerate() {
            let size = MIN_SIZE + (MAX_SIZE - MIN_SIZE) * (*count as f64 / top).sqrt();
            let est_width = word.chars().count() as f64 * size * 0.6 + 12.0;
            if x + est_width > WIDTH as f64 - 10.0 {
                x = 10.0;
                y += row_height * 1.15;
                row_height = 0.0;
            }
            if y + size > HEIGHT as f64 - 10.0 {
                break;
            }
            root.draw(&Text::new(
                word.clone(),
                (x as i32, y as i32),
                ("sans-serif", size as i32).into_font().color(&Palette99::pick(i)),
            ))
            .map_err(render_err)?;
            x += est_width;
            row_height = row_height.max(size);
        }
        root.present().map_err(render_err)?;
    }
    Ok(Artifact {
        name: name.to_string(),
        title: title.to_string(),
        svg,
    })
}
