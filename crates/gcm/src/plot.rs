//! PNG rendering of causal graphs and attribution percentages.

use std::collections::HashMap;
use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::error::GcmError;
use crate::graph::CausalGraph;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 600;
const NODE_RADIUS: i32 = 24;

fn render_error(path: &Path, reason: impl std::fmt::Display) -> GcmError {
    GcmError::Render {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Draw the graph as a left-to-right layered diagram.
///
/// Nodes are placed by their longest distance from a root, edges are drawn
/// as arrows trimmed to the node circles.
pub fn render_graph(graph: &CausalGraph, path: &Path) -> Result<(), GcmError> {
    let order = graph.topological_order();
    let mut depth: HashMap<&str, usize> = HashMap::new();
    for &node in &order {
        let d = graph
            .parents(node)?
            .iter()
            .filter_map(|p| depth.get(p).map(|d| d + 1))
            .max()
            .unwrap_or(0);
        depth.insert(node, d);
    }
    let max_depth = depth.values().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<&str>> = vec![Vec::new(); max_depth + 1];
    for &node in &order {
        layers[depth[node]].push(node);
    }
    let mut position: HashMap<&str, (i32, i32)> = HashMap::new();
    for (d, layer) in layers.iter().enumerate() {
        let x = if max_depth == 0 {
            WIDTH as i32 / 2
        } else {
            90 + (d as i32) * (WIDTH as i32 - 180) / max_depth as i32
        };
        for (i, &node) in layer.iter().enumerate() {
            let y = ((i + 1) as i32) * HEIGHT as i32 / (layer.len() as i32 + 1);
            position.insert(node, (x, y));
        }
    }

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_error(path, e))?;

    for arrow in graph.arrows() {
        let (x1, y1) = position[arrow.source.as_str()];
        let (x2, y2) = position[arrow.target.as_str()];
        let (dx, dy) = ((x2 - x1) as f64, (y2 - y1) as f64);
        let length = dx.hypot(dy).max(1.0);
        let (ux, uy) = (dx / length, dy / length);
        let start = shift((x1, y1), ux, uy, NODE_RADIUS as f64 + 2.0);
        let tip = shift((x2, y2), ux, uy, -(NODE_RADIUS as f64 + 4.0));
        root.draw(&PathElement::new(vec![start, tip], BLACK.stroke_width(2)))
            .map_err(|e| render_error(path, e))?;
        let base = shift(tip, ux, uy, -10.0);
        let left = shift(base, -uy, ux, 5.0);
        let right = shift(base, -uy, ux, -5.0);
        root.draw(&Polygon::new(vec![tip, left, right], BLACK.filled()))
            .map_err(|e| render_error(path, e))?;
    }

    for &node in &order {
        let center = position[node];
        root.draw(&Circle::new(center, NODE_RADIUS, BLUE.mix(0.18).filled()))
            .map_err(|e| render_error(path, e))?;
        root.draw(&Circle::new(center, NODE_RADIUS, BLUE.stroke_width(2)))
            .map_err(|e| render_error(path, e))?;
        let label_x = center.0 - 4 * node.len() as i32;
        let label_y = center.1 + NODE_RADIUS + 6;
        root.draw(&Text::new(
            node.to_string(),
            (label_x, label_y),
            ("sans-serif", 15),
        ))
        .map_err(|e| render_error(path, e))?;
    }

    root.present().map_err(|e| render_error(path, e))?;
    debug!(path = %path.display(), nodes = order.len(), "Rendered causal graph");
    Ok(())
}

/// Bar chart of labelled percentage values.
pub fn render_influence_bars(
    title: &str,
    entries: &[(String, f64)],
    path: &Path,
) -> Result<(), GcmError> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_error(path, e))?;

    let y_max = entries
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.15;
    let x_max = entries.len() as f64 - 0.4;
    let mut chart = ChartBuilder::on(&root)
        .margin(24)
        .caption(title, ("sans-serif", 24.0))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 46)
        .build_cartesian_2d(-0.6_f64..x_max, 0.0_f64..y_max)
        .map_err(|e| render_error(path, e))?;

    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(entries.len().max(1))
        .x_label_formatter(&|v| {
            let index = v.round();
            if (v - index).abs() < 1e-6 && index >= 0.0 && (index as usize) < names.len() {
                names[index as usize].to_string()
            } else {
                String::new()
            }
        })
        .y_desc("percent")
        .draw()
        .map_err(|e| render_error(path, e))?;

    chart
        .draw_series(entries.iter().enumerate().map(|(i, (_, value))| {
            Rectangle::new(
                [(i as f64 - 0.32, 0.0), (i as f64 + 0.32, *value)],
                BLUE.mix(0.6).filled(),
            )
        }))
        .map_err(|e| render_error(path, e))?;

    root.present().map_err(|e| render_error(path, e))?;
    debug!(path = %path.display(), bars = entries.len(), "Rendered influence chart");
    Ok(())
}

/// Move a point `distance` pixels along the unit vector `(ux, uy)`.
/// A negative distance moves against it.
fn shift(point: (i32, i32), ux: f64, uy: f64, distance: f64) -> (i32, i32) {
    (
        (point.0 as f64 + ux * distance).round() as i32,
        (point.1 as f64 + uy * distance).round() as i32,
    )
}
