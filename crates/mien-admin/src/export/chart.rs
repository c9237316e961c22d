//! Chart export: rasterizes metric time series straight to a PNG.
//!
//! Axes, gridlines and polyline series drawn pixel-by-pixel into an RGB
//! buffer, with a tiny built-in 3x5 glyph set for tick and legend
//! labels. The metric domain is always 0-100.

use crate::export::ExportError;
use image::{Rgb, RgbImage};
use mien_core::{MetricKind, SessionDetail};
use std::path::Path;

pub const CHART_WIDTH: u32 = 900;
pub const CHART_HEIGHT: u32 = 480;

const MARGIN_LEFT: u32 = 48;
const MARGIN_RIGHT: u32 = 16;
const MARGIN_TOP: u32 = 40;
const MARGIN_BOTTOM: u32 = 36;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([226, 232, 240]);
const AXIS: Rgb<u8> = Rgb([148, 163, 184]);
const TEXT: Rgb<u8> = Rgb([71, 85, 105]);

/// Series palette, cycled for comparison overlays: green, blue, orange,
/// purple — the colours the dashboards chart with.
const PALETTE: [[u8; 3]; 4] = [
    [34, 197, 94],
    [59, 130, 246],
    [249, 115, 22],
    [168, 85, 247],
];

/// One polyline: metric value over session time.
pub struct Series {
    pub label: String,
    pub color: [u8; 3],
    /// (seconds, value 0-100) pairs in time order.
    pub points: Vec<(f64, f64)>,
}

/// Engagement and satisfaction series for a single session.
pub fn session_series(detail: &SessionDetail) -> Vec<Series> {
    let series_of = |kind: MetricKind, color: [u8; 3]| Series {
        label: kind.name().to_string(),
        color,
        points: detail
            .data
            .iter()
            .map(|m| (m.session_time as f64, kind.value_of(m)))
            .collect(),
    };
    vec![
        series_of(MetricKind::Engagement, PALETTE[0]),
        series_of(MetricKind::Satisfaction, PALETTE[1]),
    ]
}

/// Engagement overlay across several sessions, one colour per session.
pub fn comparison_series(details: &[SessionDetail]) -> Vec<Series> {
    details
        .iter()
        .enumerate()
        .map(|(i, d)| Series {
            label: d.info.display_name(),
            color: PALETTE[i % PALETTE.len()],
            points: d
                .data
                .iter()
                .map(|m| (m.session_time as f64, m.engagement_val))
                .collect(),
        })
        .collect()
}

/// Draw the chart. Fails only when no series has any point.
pub fn render(title: &str, series: &[Series]) -> Result<RgbImage, ExportError> {
    if series.iter().all(|s| s.points.is_empty()) {
        return Err(ExportError::EmptySession);
    }

    let mut img = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);

    let plot_left = MARGIN_LEFT;
    let plot_right = CHART_WIDTH - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = CHART_HEIGHT - MARGIN_BOTTOM;

    let max_time = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(t, _)| *t))
        .fold(1.0_f64, f64::max);

    let x_of = |t: f64| {
        plot_left as f64 + (t / max_time) * (plot_right - plot_left) as f64
    };
    let y_of = |v: f64| {
        plot_bottom as f64 - (v.clamp(0.0, 100.0) / 100.0) * (plot_bottom - plot_top) as f64
    };

    // Horizontal gridlines with value labels every 25 points.
    for tick in [0.0, 25.0, 50.0, 75.0, 100.0] {
        let y = y_of(tick) as i64;
        draw_line(&mut img, plot_left as i64, y, plot_right as i64, y, GRID);
        draw_text(
            &mut img,
            6,
            y - 4,
            &format!("{tick:>3.0}"),
            TEXT,
        );
    }

    // Time ticks along the bottom.
    let step = tick_step(max_time);
    let mut t = 0.0;
    while t <= max_time {
        let x = x_of(t) as i64;
        draw_line(
            &mut img,
            x,
            plot_bottom as i64,
            x,
            plot_bottom as i64 + 4,
            AXIS,
        );
        draw_text(
            &mut img,
            x - 8,
            plot_bottom as i64 + 10,
            &format!("{t:.0}S"),
            TEXT,
        );
        t += step;
    }

    // Axis frame.
    draw_line(
        &mut img,
        plot_left as i64,
        plot_top as i64,
        plot_left as i64,
        plot_bottom as i64,
        AXIS,
    );
    draw_line(
        &mut img,
        plot_left as i64,
        plot_bottom as i64,
        plot_right as i64,
        plot_bottom as i64,
        AXIS,
    );

    // Series polylines.
    for s in series {
        let color = Rgb(s.color);
        let mut prev: Option<(i64, i64)> = None;
        for (t, v) in &s.points {
            let pt = (x_of(*t) as i64, y_of(*v) as i64);
            if let Some(p) = prev {
                draw_line(&mut img, p.0, p.1, pt.0, pt.1, color);
            }
            prev = Some(pt);
        }
    }

    // Title and legend across the top.
    draw_text(&mut img, MARGIN_LEFT as i64, 8, title, TEXT);
    let mut legend_x = MARGIN_LEFT as i64;
    for s in series {
        fill_rect(&mut img, legend_x, 24, 10, 10, Rgb(s.color));
        draw_text(&mut img, legend_x + 14, 25, &s.label, TEXT);
        legend_x += 14 + text_width(&s.label) + 18;
    }

    Ok(img)
}

/// Write the chart to disk as PNG.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<(), ExportError> {
    img.save(path)?;
    Ok(())
}

/// A readable tick spacing for the time axis: 1/2/5 * 10^k steps aiming
/// at roughly six ticks.
fn tick_step(max_time: f64) -> f64 {
    let raw = (max_time / 6.0).max(1.0);
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let factor = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * mag
}

fn put_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
    for dy in 0..h {
        for dx in 0..w {
            put_pixel(img, x + dx, y + dy, color);
        }
    }
}

/// Bresenham line, clipped at the image edge.
fn draw_line(img: &mut RgbImage, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgb<u8>) {
    let dx = (x2 - x1).abs();
    let dy = -(y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x1, y1);
    loop {
        put_pixel(img, x, y, color);
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

const GLYPH_SCALE: i64 = 2;
const GLYPH_ADVANCE: i64 = 4 * GLYPH_SCALE;

fn text_width(s: &str) -> i64 {
    s.chars().count() as i64 * GLYPH_ADVANCE
}

/// Draw upper-cased text in the built-in 3x5 font at 2x scale.
fn draw_text(img: &mut RgbImage, x: i64, y: i64, s: &str, color: Rgb<u8>) {
    let mut cx = x;
    for c in s.chars() {
        if let Some(rows) = glyph(c.to_ascii_uppercase()) {
            for (ry, row) in rows.iter().enumerate() {
                for rx in 0..3 {
                    if row & (0b100 >> rx) != 0 {
                        fill_rect(
                            img,
                            cx + rx as i64 * GLYPH_SCALE,
                            y + ry as i64 * GLYPH_SCALE,
                            GLYPH_SCALE,
                            GLYPH_SCALE,
                            color,
                        );
                    }
                }
            }
        }
        cx += GLYPH_ADVANCE;
    }
}

/// 3x5 glyph rows, MSB = left column. Unknown characters render blank.
fn glyph(c: char) -> Option<[u8; 5]> {
    let rows = match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b010, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => return None,
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mien_core::{Emotion, Measurement, Session};

    fn detail() -> SessionDetail {
        let data = (1..=10u64)
            .map(|t| Measurement {
                session_time: t,
                emotion: Emotion::Neutral,
                emotion_score: 90.0,
                engagement_val: 80.0,
                engagement_lbl: String::new(),
                satisfaction_val: 40.0,
                satisfaction_lbl: String::new(),
                trust_val: 50.0,
                trust_lbl: String::new(),
                loyalty_val: 50.0,
                loyalty_lbl: String::new(),
                opinion_val: 50.0,
                opinion_lbl: String::new(),
            })
            .collect();
        SessionDetail {
            info: Session {
                id: 1,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                client_id: String::new(),
                created_at: "2026-03-01T10:00:00Z".into(),
            },
            data,
        }
    }

    #[test]
    fn test_render_dimensions_and_background() {
        let img = render("ENGAGEMENT", &session_series(&detail())).unwrap();
        assert_eq!(img.dimensions(), (CHART_WIDTH, CHART_HEIGHT));
        // a corner outside every margin stays background
        assert_eq!(*img.get_pixel(CHART_WIDTH - 1, CHART_HEIGHT - 1), BACKGROUND);
    }

    #[test]
    fn test_series_pixels_plotted() {
        let img = render("ENGAGEMENT", &session_series(&detail())).unwrap();
        let engagement = Rgb(PALETTE[0]);
        let plotted = img.pixels().filter(|p| **p == engagement).count();
        assert!(plotted > 50, "expected a visible polyline, got {plotted} px");
    }

    #[test]
    fn test_empty_series_rejected() {
        let series = vec![Series {
            label: "ENGAGEMENT".into(),
            color: PALETTE[0],
            points: vec![],
        }];
        assert!(matches!(
            render("EMPTY", &series),
            Err(ExportError::EmptySession)
        ));
    }

    #[test]
    fn test_comparison_series_one_per_session() {
        let details = vec![detail(), detail()];
        let series = comparison_series(&details);
        assert_eq!(series.len(), 2);
        assert_ne!(series[0].color, series[1].color);
        assert_eq!(series[0].points.len(), 10);
    }

    #[test]
    fn test_tick_step_is_round() {
        assert_eq!(tick_step(10.0), 2.0);
        assert_eq!(tick_step(60.0), 10.0);
        assert_eq!(tick_step(300.0), 50.0);
        assert_eq!(tick_step(4.0), 1.0);
    }

    #[test]
    fn test_glyphs_cover_label_charset() {
        for c in "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ%-.:/()".chars() {
            assert!(glyph(c).is_some(), "missing glyph for {c:?}");
        }
        assert!(glyph('@').is_none());
    }
}
