//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write;

use icicle_protocol::RenderCommand;

/// Approximate advance of one 11px system-ui glyph.
const CHAR_WIDTH: f64 = 7.0;
const MIN_LABEL_HEIGHT: f64 = 12.0;

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64) -> String {
    let mut svg = String::with_capacity(commands.len() * 200);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:11px">"#,
    );

    for cmd in commands {
        match cmd {
            RenderCommand::Clear { color } => {
                let _ = write!(
                    svg,
                    r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
                    color.to_hex(),
                );
            }
            RenderCommand::DrawRect {
                rect,
                fill,
                border,
                label,
                ..
            } => {
                // Strokes sit on pixel centres so a 1px outline covers
                // exactly the edge pixels x..=x+w.
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                    rect.x + 0.5,
                    rect.y + 0.5,
                    rect.w,
                    rect.h,
                    fill.to_hex(),
                );
                if let Some(border) = border {
                    let _ = write!(svg, r#" stroke="{}" stroke-width="1""#, border.to_hex());
                }
                svg.push('>');
                if let Some(label) = label {
                    let _ = write!(svg, "<title>{}</title>", escape_xml(label));
                }
                svg.push_str("</rect>");

                // Render text label if rect is wide enough
                if let Some(label) = label
                    && rect.w > 30.0
                    && rect.h >= MIN_LABEL_HEIGHT
                {
                    let tx = rect.x + 3.0;
                    let ty = rect.y + rect.h / 2.0 + 4.0;
                    let max_chars = (rect.w / CHAR_WIDTH) as usize;
                    let text = if label.chars().count() > max_chars && max_chars > 2 {
                        let truncated: String = label.chars().take(max_chars - 1).collect();
                        format!("{truncated}…")
                    } else {
                        label.to_string()
                    };
                    let _ = write!(
                        svg,
                        r##"<text x="{tx}" y="{ty}" fill="#000000" style="pointer-events:none">{}</text>"##,
                        escape_xml(&text),
                    );
                }
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
