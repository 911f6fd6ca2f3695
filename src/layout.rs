use crate::graph::CitationGraph;

/// A node position in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Canvas size and padding kept free around the drawing.
#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin: 60.0,
        }
    }
}

const ITERATIONS: usize = 300;

/// Fruchterman–Reingold spring layout. Nodes start on a circle in index
/// order, so the result is deterministic for a given graph. Returns one
/// point per node, indexed by `NodeIndex::index()`, scaled into the canvas
/// minus its margin.
pub fn force_directed(graph: &CitationGraph, canvas: &Canvas) -> Vec<Point> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![Point {
            x: canvas.width / 2.0,
            y: canvas.height / 2.0,
        }];
    }

    // Work in the unit square, then scale.
    let k = (1.0 / n as f32).sqrt();
    let mut pos: Vec<(f32, f32)> = (0..n)
        .map(|i| {
            let angle = i as f32 / n as f32 * std::f32::consts::TAU;
            (0.5 + 0.5 * angle.cos(), 0.5 + 0.5 * angle.sin())
        })
        .collect();

    let mut temperature = 0.1_f32;
    let cooling = temperature / (ITERATIONS as f32 + 1.0);

    for _ in 0..ITERATIONS {
        let mut disp = vec![(0.0_f32, 0.0_f32); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy) = delta(pos[i], pos[j]);
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let force = k * k / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                disp[i].0 += fx;
                disp[i].1 += fy;
                disp[j].0 -= fx;
                disp[j].1 -= fy;
            }
        }

        for (source, target) in graph.edges() {
            let (s, t) = (source.index(), target.index());
            if s == t {
                continue;
            }
            let (dx, dy) = delta(pos[s], pos[t]);
            let dist = (dx * dx + dy * dy).sqrt().max(0.01);
            let force = dist * dist / k;
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            disp[s].0 -= fx;
            disp[s].1 -= fy;
            disp[t].0 += fx;
            disp[t].1 += fy;
        }

        for (p, d) in pos.iter_mut().zip(&disp) {
            let len = (d.0 * d.0 + d.1 * d.1).sqrt();
            if len > 0.0 {
                let step = len.min(temperature);
                p.0 += d.0 / len * step;
                p.1 += d.1 / len * step;
            }
        }
        temperature -= cooling;
    }

    fit(&pos, canvas)
}

fn delta(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    // Coincident nodes: nudge apart along a fixed direction.
    if dx == 0.0 && dy == 0.0 { (0.001, 0.001) } else { (dx, dy) }
}

/// Scale raw positions to fill the drawable area.
fn fit(pos: &[(f32, f32)], canvas: &Canvas) -> Vec<Point> {
    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for &(x, y) in pos {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let span_x = (max_x - min_x).max(f32::EPSILON);
    let span_y = (max_y - min_y).max(f32::EPSILON);
    let w = canvas.width - 2.0 * canvas.margin;
    let h = canvas.height - 2.0 * canvas.margin;
    pos.iter()
        .map(|&(x, y)| Point {
            x: canvas.margin + (x - min_x) / span_x * w,
            y: canvas.margin + (y - min_y) / span_y * h,
        })
        .collect()
}
