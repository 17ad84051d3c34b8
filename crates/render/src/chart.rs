//! Line chart rendering for time series widgets

use anyhow::Result;
use cairo::{Context, LineCap, LineJoin};
use epaper_types::{Color, FontSpec};

use crate::canvas::set_source_color;
use crate::pango_text::{show_text_at, text_extents, FontCache};

/// A series plotted against a fixed value range.
///
/// `x` values are arbitrary (usually unix seconds); the chart spans from the
/// first to the last point.
#[derive(Debug, Clone, Default)]
pub struct LineChart {
    pub points: Vec<(f64, f64)>,
    pub min_value: f64,
    pub max_value: f64,
    /// Labels placed under the plot at the given x values
    pub x_labels: Vec<(f64, String)>,
    /// Number of horizontal grid intervals
    pub y_divisions: u32,
}

/// Margins reserved for the axis labels
struct Margin {
    left: f64,
    bottom: f64,
    top: f64,
    right: f64,
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Render a line chart filling `width` x `height` at the origin
pub fn render_line_chart(
    cr: &Context,
    fonts: &FontCache,
    chart: &LineChart,
    width: f64,
    height: f64,
    color: Color,
    font: &FontSpec,
) -> Result<()> {
    let divisions = chart.y_divisions.max(1);
    let (min_val, max_val) = if (chart.max_value - chart.min_value).abs() < 1e-9 {
        (chart.min_value - 0.5, chart.min_value + 0.5)
    } else {
        (chart.min_value, chart.max_value)
    };
    let value_range = max_val - min_val;

    // Size the left margin for the widest tick label
    let label_width = (0..=divisions)
        .map(|i| {
            let v = min_val + value_range * i as f64 / divisions as f64;
            text_extents(cr, fonts, &format_tick(v), font).width
        })
        .fold(0.0, f64::max);
    let label_height = text_extents(cr, fonts, "0", font).height;
    let margin = Margin {
        left: label_width + 6.0,
        bottom: label_height + 4.0,
        top: label_height / 2.0,
        right: 4.0,
    };

    let plot_x = margin.left;
    let plot_y = margin.top;
    let plot_width = width - margin.left - margin.right;
    let plot_height = height - margin.top - margin.bottom;
    if plot_width <= 0.0 || plot_height <= 0.0 {
        return Ok(());
    }

    cr.save()?;
    set_source_color(cr, color);
    cr.set_line_width(1.0);

    // Frame and horizontal grid with value labels
    cr.rectangle(plot_x + 0.5, plot_y + 0.5, plot_width - 1.0, plot_height - 1.0);
    cr.stroke()?;
    for i in 0..=divisions {
        let y = (plot_y + plot_height - (i as f64 / divisions as f64) * plot_height).floor() + 0.5;
        cr.set_dash(&[1.0, 3.0], 0.0);
        cr.move_to(plot_x, y);
        cr.line_to(plot_x + plot_width, y);
        cr.stroke()?;
        cr.set_dash(&[], 0.0);

        let value = min_val + value_range * i as f64 / divisions as f64;
        let text = format_tick(value);
        let ext = text_extents(cr, fonts, &text, font);
        show_text_at(
            cr,
            fonts,
            &text,
            font,
            plot_x - ext.width - 3.0,
            y - ext.height / 2.0,
        );
    }

    let (x_min, x_max) = match (chart.points.first(), chart.points.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => {
            cr.restore()?;
            return Ok(());
        }
    };
    let x_range = if x_max > x_min { x_max - x_min } else { 1.0 };
    let map_x = |x: f64| plot_x + (x - x_min) / x_range * plot_width;

    // Vertical grid with ticks inside the frame and labels below
    for (x, text) in &chart.x_labels {
        if *x < x_min || *x > x_max {
            continue;
        }
        let px = map_x(*x).floor() + 0.5;
        cr.set_dash(&[1.0, 3.0], 0.0);
        cr.move_to(px, plot_y);
        cr.line_to(px, plot_y + plot_height);
        cr.stroke()?;
        cr.set_dash(&[], 0.0);

        let ext = text_extents(cr, fonts, text, font);
        let lx = (px - ext.width / 2.0).clamp(0.0, (width - ext.width).max(0.0));
        show_text_at(cr, fonts, text, font, lx, plot_y + plot_height + 2.0);
    }

    // Data, clipped to the plot area
    cr.rectangle(plot_x, plot_y, plot_width, plot_height);
    cr.clip();
    cr.set_line_width(2.0);
    cr.set_line_cap(LineCap::Round);
    cr.set_line_join(LineJoin::Round);
    for (i, &(x, value)) in chart.points.iter().enumerate() {
        let normalized = ((value - min_val) / value_range).clamp(0.0, 1.0);
        let px = map_x(x);
        let py = plot_y + plot_height - normalized * plot_height;
        if i == 0 {
            cr.move_to(px, py);
        } else {
            cr.line_to(px, py);
        }
    }
    cr.stroke()?;
    cr.restore()?;
    Ok(())
}
