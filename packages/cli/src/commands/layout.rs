use super::read_source;
use crate::config::Config;
use crate::svg::SvgSurface;
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use droplet_geometry::{Point, Rectangle};
use droplet_model::{ContainerId, NodeRef, TokenKind, Tree};
use droplet_parser::parse;
use droplet_view::{DrawStyle, View, ViewKind};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Svg,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Source file to lay out
    pub input: PathBuf,

    #[arg(short, long, value_enum, default_value = "json")]
    pub format: Format,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Render block colors in grayscale (svg only)
    #[arg(long)]
    pub grayscale: bool,

    /// Leave text out of the rendering (svg only)
    #[arg(long)]
    pub no_text: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReport {
    pub kind: &'static str,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub bounds: Vec<Rectangle>,
    pub total_bounds: Rectangle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_point: Option<Point>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    pub nodes_recomputed: usize,
    pub bounds: Rectangle,
    pub nodes: Vec<NodeReport>,
}

pub fn layout(args: LayoutArgs, config: &Config) -> Result<()> {
    let source = read_source(&args.input)?;
    let (tree, root) = parse(&source, config.parse_options())?;

    let mut view = View::new(config.view.clone());
    let stats = view.layout(&tree, root, Point::ORIGIN);
    debug!(nodes_recomputed = stats.nodes_recomputed, "laid out {}", args.input.display());
    let report = build_report(&view, &tree, root, stats.nodes_recomputed);

    let output = match args.format {
        Format::Json => serde_json::to_string_pretty(&report)?,
        Format::Svg => {
            let mut surface = SvgSurface::new(config.view.text_height);
            let style = DrawStyle {
                grayscale: args.grayscale,
                no_text: args.no_text,
                ..DrawStyle::default()
            };
            view.draw(&tree, root, &mut surface, style);
            surface.finish(report.bounds, config.view.padding)
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, output)?;
            println!(
                "{} {} → {} ({} nodes)",
                "✓".green(),
                args.input.display(),
                path.display(),
                report.nodes.len()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// Geometry of every laid-out container and text token, in document order
pub fn build_report(view: &View, tree: &Tree, root: ContainerId, nodes_recomputed: usize) -> LayoutReport {
    let mut nodes = Vec::new();

    for token in tree.tokens_of(root) {
        let node = match tree.kind(token) {
            TokenKind::Start(c) => NodeRef::Container(*c),
            TokenKind::Text(_) => NodeRef::Token(token),
            _ => continue,
        };
        let Some(view_node) = view.get_view_node_for(node) else {
            continue;
        };
        nodes.push(NodeReport {
            kind: kind_name(view_node.kind),
            depth: tree.ancestors(node).count(),
            text: tree.text(token).map(str::to_owned),
            bounds: view_node.bounds.clone(),
            total_bounds: view_node.total_bounds,
            drop_point: view_node.drop_point,
        });
    }

    let bounds = view
        .get_view_node_for(root)
        .map(|node| node.total_bounds)
        .unwrap_or(Rectangle::EMPTY);

    LayoutReport {
        nodes_recomputed,
        bounds,
        nodes,
    }
}

fn kind_name(kind: ViewKind) -> &'static str {
    match kind {
        ViewKind::Block => "block",
        ViewKind::Socket => "socket",
        ViewKind::Indent => "indent",
        ViewKind::Segment => "segment",
        ViewKind::Text => "text",
        ViewKind::Cursor => "cursor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droplet_parser::ParseOptions;

    #[test]
    fn test_report_lists_nodes_in_order() {
        let (tree, root) = parse("x = 1", ParseOptions::default()).unwrap();
        let mut view = View::new(Default::default());
        let stats = view.layout(&tree, root, Point::ORIGIN);
        let report = build_report(&view, &tree, root, stats.nodes_recomputed);

        let kinds: Vec<&str> = report.nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec!["segment", "block", "socket", "text", "text", "socket", "text"]
        );
        assert_eq!(report.nodes[0].depth, 0);
        assert_eq!(report.nodes[3].text.as_deref(), Some("x"));
        assert_eq!(report.bounds, report.nodes[0].total_bounds);
        assert!(report.nodes_recomputed > 0);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["nodes"][1]["dropPoint"].is_object());
        assert!(json["nodes"][0].get("text").is_none());
    }
}
