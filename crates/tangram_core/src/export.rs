//! SVG snapshot export.
//!
//! # Responsibility
//! - Render a scene's pieces as a standalone `<svg>` document with one
//!   `<path>` per piece in paint order.
//!
//! # Invariants
//! - The viewBox tightly bounds all transformed outlines plus a fixed
//!   padding; board offsets do not shift the drawing.
//! - An empty scene exports as an empty string, never an empty document.

use crate::model::scene::Scene;
use std::fmt::Write as _;

const PADDING: f64 = 20.0;
const STROKE_WIDTH: f64 = 2.0;

/// Renders the scene as an SVG document string, scaled by `scale`.
pub fn scene_to_svg(scene: &Scene, scale: f64) -> String {
    if scene.pieces.is_empty() {
        return String::new();
    }

    let mut outlines: Vec<(Vec<(f64, f64)>, String)> = Vec::with_capacity(scene.pieces.len());
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for piece in &scene.pieces {
        let angle = piece.rotation.to_radians();
        let (sin, cos) = angle.sin_cos();

        let points: Vec<(f64, f64)> = piece
            .kind
            .outline()
            .iter()
            .map(|&(px, py)| {
                let x = piece.x + px * cos - py * sin;
                let y = piece.y + px * sin + py * cos;
                (x, y)
            })
            .collect();

        for &(x, y) in &points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let fill = if piece.color.is_empty() {
            piece.kind.default_color().to_string()
        } else {
            piece.color.clone()
        };
        outlines.push((points, fill));
    }

    let view_x = min_x - PADDING;
    let view_y = min_y - PADDING;
    let view_w = (max_x - min_x) + 2.0 * PADDING;
    let view_h = (max_y - min_y) + 2.0 * PADDING;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"{view_x} {view_y} {view_w} {view_h}\">",
        view_w * scale,
        view_h * scale
    );

    for (points, fill) in &outlines {
        let mut d = String::new();
        for (index, (x, y)) in points.iter().enumerate() {
            let command = if index == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{command}{x:.3} {y:.3} ");
        }
        d.push('Z');
        let _ = write!(
            svg,
            "<path d=\"{d}\" fill=\"{fill}\" stroke=\"#000\" stroke-width=\"{STROKE_WIDTH}\"/>"
        );
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::scene_to_svg;
    use crate::model::piece::{Piece, ShapeKind};
    use crate::model::scene::Scene;

    #[test]
    fn empty_scene_exports_as_empty_string() {
        assert_eq!(scene_to_svg(&Scene::default(), 1.0), "");
    }

    #[test]
    fn one_path_per_piece_in_paint_order() {
        let mut scene = Scene::default();
        scene.pieces.push(Piece::new(ShapeKind::SquareSm, 0.0, 0.0));
        scene
            .pieces
            .push(Piece::new(ShapeKind::Trapezoid, 100.0, 100.0));

        let svg = scene_to_svg(&scene, 1.0);
        assert_eq!(svg.matches("<path ").count(), 2);
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn view_box_bounds_the_outline_with_padding() {
        let mut scene = Scene::default();
        let mut piece = Piece::new(ShapeKind::SquareSm, 10.0, 30.0);
        piece.rotation = 0.0;
        scene.pieces.push(piece);

        // Unrotated 50x50 square at (10, 30): bbox 10..60 x 30..80.
        let svg = scene_to_svg(&scene, 1.0);
        assert!(svg.contains("viewBox=\"-10 10 90 90\""));
        assert!(svg.contains("width=\"90\" height=\"90\""));
    }

    #[test]
    fn blank_color_falls_back_to_the_kind_default() {
        let mut scene = Scene::default();
        let mut piece = Piece::new(ShapeKind::SquareSm, 0.0, 0.0);
        piece.color = String::new();
        scene.pieces.push(piece);

        let svg = scene_to_svg(&scene, 1.0);
        assert!(svg.contains(&format!("fill=\"{}\"", ShapeKind::SquareSm.default_color())));
    }

    #[test]
    fn scale_multiplies_the_document_size_only() {
        let mut scene = Scene::default();
        scene.pieces.push(Piece::new(ShapeKind::SquareSm, 0.0, 0.0));

        let svg = scene_to_svg(&scene, 2.0);
        assert!(svg.contains("width=\"180\" height=\"180\""));
        assert!(svg.contains("viewBox=\"-20 -20 90 90\""));
    }
}
