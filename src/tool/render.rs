// src/tool/render.rs - Draws stored measurements onto the surface canvas

use crate::geometry::{find_closest_point, perpendicular_unit, Point};
use crate::host::canvas::{Canvas, StrokeStyle, TextBoxOptions};
use crate::host::viewport::{ImageInfo, Viewport};
use crate::tool::config::ToolConfiguration;
use crate::tool::measurement::MeasurementData;

/// Horizontal gap between the label anchor and the drawn label (canvas units)
pub const TEXT_OFFSET_X: f64 = 10.0;
pub const MIDPOINT_TICK_HALF_LENGTH: f64 = 6.0;
pub const THIRD_TICK_HALF_LENGTH: f64 = 3.0;
pub const START_MARKER_RADIUS: f64 = 2.0;
pub const LEADER_DASH: [f64; 2] = [2.0, 3.0];

/// Physical length of the segment, or pixel length for uncalibrated images
pub fn measured_length(image: &ImageInfo, data: &MeasurementData) -> f64 {
    let (column_spacing, row_spacing) = image.effective_spacing();
    let (dx, dy) = data.start().delta_to(data.end());
    let dx = dx * column_spacing;
    let dy = dy * row_spacing;
    (dx * dx + dy * dy).sqrt()
}

pub fn length_suffix(image: &ImageInfo) -> &'static str {
    if image.has_pixel_spacing() {
        " mm"
    } else {
        " pixels"
    }
}

/// `"12.34 mm"` or `"12.34 pixels"`
pub fn format_length_text(length: f64, image: &ImageInfo) -> String {
    format!("{:.2}{}", length, length_suffix(image))
}

/// Label anchor for a label the user never moved: the endpoint furthest right
pub fn default_label_anchor(data: &MeasurementData) -> Point {
    let start = data.start();
    let end = data.end();
    let x = start.x.max(end.x);

    if x == start.x {
        Point::new(x, start.y)
    } else {
        Point::new(x, end.y)
    }
}

/// Draw every record in store order
pub fn render_measurements<V, C>(
    viewport: &V,
    canvas: &mut C,
    config: &ToolConfiguration,
    records: &mut [MeasurementData],
) where
    V: Viewport + ?Sized,
    C: Canvas + ?Sized,
{
    for data in records.iter_mut() {
        render_measurement(viewport, canvas, config, data);
    }
}

/// Draw one record and refresh its derived fields (length, label anchor, bounding box)
pub fn render_measurement<V, C>(
    viewport: &V,
    canvas: &mut C,
    config: &ToolConfiguration,
    data: &mut MeasurementData,
) where
    V: Viewport + ?Sized,
    C: Canvas + ?Sized,
{
    let color = config.style.color_if_active(data.active).to_string();
    let stroke = StrokeStyle::solid(color.as_str(), config.style.line_width)
        .with_shadow(config.shadow.to_shadow());

    let start = viewport.pixel_to_canvas(data.start());
    let end = viewport.pixel_to_canvas(data.end());

    canvas.stroke_line(start, end, &stroke);

    if config.draw_guide_lines || data.active {
        draw_guide_ticks(canvas, start, end, &stroke);

        if data.active {
            canvas.stroke_circle(start, START_MARKER_RADIUS, &stroke);
        }
    }

    let image = viewport.image();
    let length = measured_length(image, data);
    data.length = Some(length);
    let text = format_length_text(length, image);

    if !data.handles.text_box.has_moved {
        let anchor = default_label_anchor(data);
        data.handles.text_box.set_position(anchor);
    }

    let text_anchor = viewport.pixel_to_canvas(data.handles.text_box.position());
    let label_position = text_anchor.offset(TEXT_OFFSET_X, 0.0);
    let options = TextBoxOptions::new(config.text.font_size, config.text.padding).centered_y();
    let bounding_box = canvas.draw_text_box(&text, label_position, &color, options);
    data.handles.text_box.bounding_box = Some(bounding_box);

    if data.handles.text_box.has_moved {
        let candidates = [start, end, start.midpoint(end)];
        let link_start = find_closest_point(&candidates, label_position).unwrap_or(start);
        let link_end = find_closest_point(&bounding_box.edge_midpoints(), link_start)
            .unwrap_or(label_position);

        let leader = stroke.clone().dashed(LEADER_DASH[0], LEADER_DASH[1]);
        canvas.stroke_line(link_start, link_end, &leader);
    }
}

/// Perpendicular ticks at the midpoint and the 1/3 and 2/3 points
fn draw_guide_ticks<C: Canvas + ?Sized>(canvas: &mut C, start: Point, end: Point, stroke: &StrokeStyle) {
    let Some((px, py)) = perpendicular_unit(start, end) else {
        return;
    };

    let ticks = [
        (start.midpoint(end), MIDPOINT_TICK_HALF_LENGTH),
        (start.lerp(end, 1.0 / 3.0), THIRD_TICK_HALF_LENGTH),
        (start.lerp(end, 2.0 / 3.0), THIRD_TICK_HALF_LENGTH),
    ];

    for (center, half_length) in ticks {
        canvas.stroke_line(
            center.offset(px * half_length, py * half_length),
            center.offset(-px * half_length, -py * half_length),
            stroke,
        );
    }
}
