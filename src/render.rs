//! Standalone HTML view of a citation graph.
//!
//! The page holds a single SVG: edges with arrowheads, bibliography papers in
//! red, neighborhood papers in blue. Hovering a node shows its id and every
//! attribute the provider reported.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::graph::{CitationGraph, Node};
use crate::layout::{self, Canvas, Point};
use crate::types::NodeOrigin;

const NODE_RADIUS: f32 = 7.0;
const PRIMARY_COLOR: &str = "#d62728";
const NEIGHBORHOOD_COLOR: &str = "#1f77b4";

/// Lay out `graph` and produce the complete HTML document.
pub fn to_html(graph: &CitationGraph, title: &str) -> String {
    let canvas = Canvas::default();
    let positions = layout::force_directed(graph, &canvas);
    render_page(graph, &positions, &canvas, title)
}

/// Tooltip text: `node: <id>` then one `name: value` line per attribute.
pub fn tooltip(node: &Node) -> String {
    let mut lines = vec![format!("node: {}", node.id)];
    for (name, value) in node.attributes.present() {
        lines.push(format!("{name}: {value}"));
    }
    lines.join("\n")
}

fn render_page(graph: &CitationGraph, positions: &[Point], canvas: &Canvas, title: &str) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
"#,
        w = canvas.width,
        h = canvas.height
    );
    svg.push_str(
        r##"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="#888"/></marker></defs>
"##,
    );

    svg.push_str("<g class=\"edges\">\n");
    for (source, target) in graph.edges() {
        let (a, b) = (positions[source.index()], positions[target.index()]);
        if source == target {
            svg.push_str(&format!(
                "<circle class=\"loop\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\"/>\n",
                a.x,
                a.y - NODE_RADIUS * 1.6,
                NODE_RADIUS
            ));
            continue;
        }
        let (x2, y2) = shorten(a, b, NODE_RADIUS + 1.0);
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" marker-end=\"url(#arrow)\"/>\n",
            a.x, a.y, x2, y2
        ));
    }
    svg.push_str("</g>\n<g class=\"nodes\">\n");

    for (idx, node) in graph.nodes() {
        let p = positions[idx.index()];
        let (class, color) = match node.origin {
            NodeOrigin::Primary => ("primary", PRIMARY_COLOR),
            NodeOrigin::Neighborhood => ("neighborhood", NEIGHBORHOOD_COLOR),
        };
        let tip = escape_html(&tooltip(node));
        svg.push_str(&format!(
            "<circle class=\"node {class}\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"{NODE_RADIUS}\" fill=\"{color}\" data-tip=\"{tip}\"><title>{tip}</title></circle>\n",
            p.x, p.y
        ));
    }
    svg.push_str("</g>\n</svg>\n");

    let legend = legend(graph);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 0; background: #fafafa; }}
header {{ padding: 0.5rem 1rem; border-bottom: 1px solid #ddd; }}
.legend span {{ margin-right: 1.2rem; }}
.swatch {{ display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 0.3rem; }}
.edges line, .edges .loop {{ stroke: #888; stroke-opacity: 0.6; fill: none; }}
.node {{ stroke: #555; stroke-width: 1px; opacity: 0.9; cursor: pointer; }}
.node:hover {{ stroke: #000; stroke-width: 2.5px; }}
#tooltip {{ position: absolute; display: none; white-space: pre; pointer-events: none;
  background: #fff; border: 1px solid #999; border-radius: 6px; padding: 0.4rem 0.6rem;
  font-size: 0.8rem; box-shadow: 0 4px 16px rgba(0,0,0,0.15); max-width: 420px; }}
</style>
</head>
<body>
<header><strong>{title}</strong> <span class="legend">{legend}</span></header>
{svg}<div id="tooltip"></div>
<script>
const tip = document.getElementById('tooltip');
document.querySelectorAll('.node').forEach(n => {{
  const t = n.querySelector('title');
  if (t) t.remove();
  n.addEventListener('mousemove', e => {{
    tip.textContent = n.dataset.tip;
    tip.style.left = (e.pageX + 20) + 'px';
    tip.style.top = (e.pageY + 20) + 'px';
    tip.style.display = 'block';
  }});
  n.addEventListener('mouseleave', () => {{ tip.style.display = 'none'; }});
}});
</script>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn legend(graph: &CitationGraph) -> String {
    let mut parts = vec![format!(
        r#"<span><i class="swatch" style="background:{PRIMARY_COLOR}"></i>bibliography ({})</span>"#,
        graph.count(NodeOrigin::Primary)
    )];
    let neighbors = graph.count(NodeOrigin::Neighborhood);
    if neighbors > 0 {
        parts.push(format!(
            r#"<span><i class="swatch" style="background:{NEIGHBORHOOD_COLOR}"></i>referenced ({neighbors})</span>"#
        ));
    }
    parts.push(format!("<span>{} citations</span>", graph.edge_count()));
    parts.concat()
}

/// End point of the segment a→b pulled back by `by`, so arrowheads stop at
/// the target's rim.
fn shorten(a: Point, b: Point, by: f32) -> (f32, f32) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= by {
        return (b.x, b.y);
    }
    (b.x - dx / len * by, b.y - dy / len * by)
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Write the page to the temp directory and hand it to the system viewer.
pub fn show(html: &str) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("citegraph-{}.html", std::process::id()));
    std::fs::write(&path, html)
        .with_context(|| format!("Could not write graph view to {}", path.display()))?;
    match open::that(&path) {
        Ok(()) => info!(path = %path.display(), "opened graph view"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not open a viewer; open the file manually"),
    }
    Ok(path)
}
