use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use icicle_protocol::{Color, Rect, RenderCommand};

use crate::layout::Layout;
use crate::model::Profile;
use crate::surface::DrawSurface;
use crate::transform::Transform;

/// Draw every call (non-exclusive) cell of `layout` through `transform`.
///
/// Self-time segments reserve their space but are left unpainted.
pub fn render_partition<S: DrawSurface + ?Sized>(
    surface: &mut S,
    transform: &Transform,
    layout: &Layout,
    profile: &Profile,
    outline: Color,
) {
    let window = surface.window_rect();

    for (col, _, item) in layout.items() {
        if item.exclusive {
            continue;
        }
        let Some(node) = profile.node(item.node_key) else {
            continue;
        };

        let win_rect = transform.map_rect(&layout.cell_rect(col, item));
        let Some(rect) = pixel_rect(&win_rect) else {
            continue;
        };

        // Cull off-screen
        if rect.right() < window.left()
            || rect.left() >= window.right()
            || rect.bottom() < window.top()
            || rect.top() >= window.bottom()
        {
            continue;
        }

        surface.submit(RenderCommand::DrawRect {
            rect,
            fill: color_for_name(&node.name),
            border: Some(outline),
            label: Some(node.name.clone()),
            node_key: Some(item.node_key),
        });
    }
}

/// Snap a window rect to whole pixels, then pull the right and bottom
/// edges in by one so neighbouring cells share no outline pixels.
/// `None` when nothing is left.
pub fn pixel_rect(r: &Rect) -> Option<Rect> {
    let left = r.left().round();
    let top = r.top().round();
    let w = r.right().round() - left - 1.0;
    let h = r.bottom().round() - top - 1.0;
    (w >= 0.0 && h >= 0.0).then(|| Rect::new(left, top, w, h))
}

/// Stable color for a node name: the hash is split into hue, saturation
/// and value, the latter two kept in `[55, 255)` out of 255.
pub fn color_for_name(name: &str) -> Color {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    let hash = hasher.finish();

    let hue = (hash % 360) as f64;
    let saturation = ((hash >> 8) % 200 + 55) as f64 / 255.0;
    let value = ((hash >> 16) % 200 + 55) as f64 / 255.0;
    Color::from_hsv(hue, saturation, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::try_build;
    use crate::model::{NodeSample, ROOT_NODE_KEY};
    use crate::surface::CommandBuffer;

    fn sample(inclusive: u64, exclusive: u64) -> NodeSample {
        NodeSample {
            timestamp_ns: 0,
            cumulative_call_count: 1,
            cumulative_inclusive_duration_ns: inclusive,
            cumulative_exclusive_duration_ns: exclusive,
        }
    }

    fn profile() -> Profile {
        let mut profile = Profile::new("root");
        let child = profile.ensure_path(["child"]);
        profile.push_sample(ROOT_NODE_KEY, sample(100, 20)).unwrap();
        profile.push_sample(child, sample(80, 80)).unwrap();
        profile
    }

    fn draw_rects(buf: &CommandBuffer) -> Vec<(Rect, Option<i32>)> {
        buf.commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect { rect, node_key, .. } => Some((*rect, *node_key)),
                RenderCommand::Clear { .. } => None,
            })
            .collect()
    }

    #[test]
    fn draws_call_cells_only() {
        let profile = profile();
        let layout = try_build(&profile).unwrap();
        let mut buf = CommandBuffer::new(100.0, 100.0);
        let t = Transform::affine_map(&buf.window_rect(), &layout.full_extent());
        render_partition(&mut buf, &t, &layout, &profile, Color::BLACK);

        assert_eq!(
            draw_rects(&buf),
            vec![
                (Rect::new(0.0, 0.0, 99.0, 99.0), Some(0)),
                (Rect::new(50.0, 20.0, 49.0, 79.0), Some(1)),
            ]
        );
    }

    #[test]
    fn commands_carry_name_color_and_outline() {
        let profile = profile();
        let layout = try_build(&profile).unwrap();
        let mut buf = CommandBuffer::new(100.0, 100.0);
        let t = Transform::affine_map(&buf.window_rect(), &layout.full_extent());
        render_partition(&mut buf, &t, &layout, &profile, Color::BLACK);

        let Some(RenderCommand::DrawRect {
            fill,
            border,
            label,
            ..
        }) = buf.commands().get(1)
        else {
            panic!("expected a rect");
        };
        assert_eq!(*fill, color_for_name("child"));
        assert_eq!(*border, Some(Color::BLACK));
        assert_eq!(label.as_deref(), Some("child"));
    }

    #[test]
    fn zoomed_view_culls_cells_outside_window() {
        let profile = profile();
        let layout = try_build(&profile).unwrap();
        let mut buf = CommandBuffer::new(100.0, 100.0);
        // Only the lower half of column 1 and beyond.
        let data = Rect::from_corners(1.0, 0.5, 2.0, 1.0);
        let t = Transform::affine_map(&buf.window_rect(), &data);
        render_partition(&mut buf, &t, &layout, &profile, Color::BLACK);

        // The root cell starts off-screen but still covers the window.
        let rects = draw_rects(&buf);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[1].0, Rect::new(0.0, -60.0, 99.0, 159.0));
    }

    #[test]
    fn pixel_rect_rounds_and_shrinks() {
        assert_eq!(
            pixel_rect(&Rect::from_corners(0.4, 9.6, 20.5, 30.2)),
            Some(Rect::new(0.0, 10.0, 20.0, 19.0))
        );
        assert_eq!(pixel_rect(&Rect::from_corners(3.2, 0.0, 3.4, 10.0)), None);
        assert_eq!(pixel_rect(&Rect::new(f64::NAN, 0.0, 1.0, 1.0)), None);
    }

    #[test]
    fn name_colors_are_stable_and_vivid() {
        for name in ["main", "plan", "control_loop", "", "ω"] {
            let c = color_for_name(name);
            assert_eq!(c, color_for_name(name));
            // value >= 55/255, so the brightest channel never goes near black
            let max = c.to_rgb8().into_iter().max().unwrap_or(0);
            assert!(max >= 54, "{name}: {max}");
            assert!(max < 255, "{name}: {max}");
        }
    }
}
