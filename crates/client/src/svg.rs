use crate::view::{CellStyle, DrawCommand, Frame};

const GRID_STROKE: &str = "#888888";
const VISITED_FILL: &str = "#00ff00";
const PATH_FILL: &str = "#ff0000";
const MARKER_FILL: &str = "#0000ff";
const LABEL_FILL: &str = "#ffffff";

/// Serialise a frame as a standalone SVG document.
pub fn render(frame: &Frame) -> String {
    let mut svg = String::with_capacity(64 * frame.commands.len() + 256);
    let (w, h) = (frame.width, frame.height);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    ));
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{w}" height="{h}" fill="black"/>"#
    ));
    let sw = 2.0 * frame.scale;
    for command in &frame.commands {
        match command {
            DrawCommand::Rect { rect, style } => {
                let (x, y, s) = (rect.left, rect.top, rect.size);
                let paint = match style {
                    CellStyle::Grid => {
                        format!(r#"fill="none" stroke="{GRID_STROKE}" stroke-width="{sw}""#)
                    }
                    CellStyle::Visited => format!(r#"fill="{VISITED_FILL}""#),
                    CellStyle::Path => format!(r#"fill="{PATH_FILL}""#),
                };
                svg.push_str(&format!(
                    r#"<rect x="{x}" y="{y}" width="{s}" height="{s}" {paint}/>"#
                ));
            }
            DrawCommand::Label { x, y, text, size } => {
                svg.push_str(&format!(
                    r#"<text x="{x}" y="{y}" fill="{LABEL_FILL}" font-size="{size}" font-family="sans-serif">{}</text>"#,
                    escape(text)
                ));
            }
            DrawCommand::Marker { cx, cy, radius } => {
                svg.push_str(&format!(
                    r#"<circle cx="{cx}" cy="{cy}" r="{radius}" fill="{MARKER_FILL}"/>"#
                ));
            }
        }
    }
    svg.push_str("</svg>");
    svg
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
