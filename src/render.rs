//! Snapshot of what the viewport currently shows, drawn with cairo.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use cairo::{Context as CairoContext, Format, ImageSurface, LineCap, SvgSurface};
use pango::{Alignment, FontDescription};
use pangocairo::functions as pangocairo;
use tracing::debug;

use crate::geometry::{LatLng, Point};
use crate::nav::NavContext;
use crate::viewport::Viewport;

const DEFAULT_LINE_WIDTH: f64 = 1.5;
const FOCUS_LINE_WIDTH: f64 = 3.0;
const FONT_MAIN_PX: f64 = 14.0;
const FONT_FAMILY: &str = "Liberation Sans";
const TEXT_OUTLINE_WIDTH: f64 = 0.75;
const BORDER_COLOR: (f64, f64, f64) = (0x55 as f64 / 255.0, 0x55 as f64 / 255.0, 0x55 as f64 / 255.0);
const DEFAULT_FILL_COLOR: (f64, f64, f64) = (0xF6 as f64 / 255.0, 0xF6 as f64 / 255.0, 0xF6 as f64 / 255.0);
const FOCUS_FILL_COLOR: (f64, f64, f64) = (0xAD as f64 / 255.0, 0xD8 as f64 / 255.0, 0xE6 as f64 / 255.0);
const OVERLAY_LINE_COLOR: (f64, f64, f64) = (0x6A as f64 / 255.0, 0x6A as f64 / 255.0, 0x6A as f64 / 255.0);

/// SVG sibling of a PNG output path.
pub fn default_svg_output_path(output: &Path) -> PathBuf {
    let mut svg_path = output.to_path_buf();
    svg_path.set_extension("svg");
    svg_path
}

/// Write the current view to `output` (PNG) and `svg_output`.
pub fn draw_view(nav: &NavContext, output: &Path, svg_output: &Path) -> Result<()> {
    let size = nav.viewport().size();
    let (surface, ctx) = create_png_surface(size.x.ceil() as i32, size.y.ceil() as i32)?;
    render_view(&ctx, nav)?;

    let mut file = fs::File::create(output).context("Failed to create PNG file")?;
    surface
        .write_to_png(&mut file)
        .context("Failed to write PNG")?;

    render_svg(svg_output, size.x, size.y, |ctx| render_view(ctx, nav))?;
    debug!(png = ?output, svg = ?svg_output, "view written");
    Ok(())
}

fn setup_context(ctx: &CairoContext) -> Result<()> {
    ctx.set_source_rgb(1.0, 1.0, 1.0);
    ctx.paint()?;
    ctx.set_source_rgb(BORDER_COLOR.0, BORDER_COLOR.1, BORDER_COLOR.2);
    ctx.set_line_width(DEFAULT_LINE_WIDTH);
    ctx.set_line_cap(LineCap::Square);
    Ok(())
}

fn create_png_surface(width: i32, height: i32) -> Result<(ImageSurface, CairoContext)> {
    let surface = ImageSurface::create(Format::ARgb32, width, height)
        .context("Failed to create image surface")?;
    let ctx = CairoContext::new(&surface).context("Failed to create Cairo context")?;
    setup_context(&ctx)?;
    Ok((surface, ctx))
}

fn render_svg<F>(svg_path: &Path, width: f64, height: f64, render: F) -> Result<()>
where
    F: FnOnce(&CairoContext) -> Result<()>,
{
    let surface = SvgSurface::new(width, height, Some(svg_path))
        .context("Failed to create SVG surface")?;
    let ctx = CairoContext::new(&surface).context("Failed to create Cairo context")?;
    setup_context(&ctx)?;
    render(&ctx)?;
    surface.finish();
    Ok(())
}

/// Draw the overlay outline, then every node box with its label on top.
fn render_view(ctx: &CairoContext, nav: &NavContext) -> Result<()> {
    let viewport = nav.viewport();
    let overlay = nav.overlay_bounds();
    let outline = to_pixels(
        viewport,
        &[
            overlay.north_west(),
            overlay.north_east,
            overlay.south_east(),
            overlay.south_west,
        ],
    )?;
    path_polygon(ctx, &outline);
    ctx.set_source_rgb(OVERLAY_LINE_COLOR.0, OVERLAY_LINE_COLOR.1, OVERLAY_LINE_COLOR.2);
    ctx.set_line_width(1.0);
    ctx.stroke()?;

    let size = viewport.size();
    let focus = nav.focus();
    for (label, node) in nav.index().iter() {
        let corners: Vec<LatLng> = node.rect.iter().copied().map(LatLng::from).collect();
        let points = to_pixels(viewport, &corners)?;
        if !intersects_canvas(&points, size) {
            continue;
        }
        let is_focus = focus == Some(label);
        let fill = if is_focus {
            FOCUS_FILL_COLOR
        } else {
            DEFAULT_FILL_COLOR
        };
        path_polygon(ctx, &points);
        ctx.set_source_rgb(fill.0, fill.1, fill.2);
        ctx.fill_preserve()?;
        ctx.set_source_rgb(BORDER_COLOR.0, BORDER_COLOR.1, BORDER_COLOR.2);
        ctx.set_line_width(if is_focus {
            FOCUS_LINE_WIDTH
        } else {
            DEFAULT_LINE_WIDTH
        });
        ctx.stroke()?;
        draw_text_centered(ctx, centroid(&points), label, FONT_MAIN_PX)?;
    }
    Ok(())
}

fn to_pixels(viewport: &Viewport, corners: &[LatLng]) -> Result<Vec<Point>> {
    corners
        .iter()
        .map(|&corner| {
            viewport
                .pixel_of(corner)
                .ok_or_else(|| anyhow!("Viewport has no view to render"))
        })
        .collect()
}

fn intersects_canvas(points: &[Point], size: Point) -> bool {
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    max_x >= 0.0 && min_x <= size.x && max_y >= 0.0 && min_y <= size.y
}

fn centroid(points: &[Point]) -> Point {
    let n = points.len().max(1) as f64;
    Point::new(
        points.iter().map(|p| p.x).sum::<f64>() / n,
        points.iter().map(|p| p.y).sum::<f64>() / n,
    )
}

fn path_polygon(ctx: &CairoContext, points: &[Point]) {
    ctx.new_path();
    if let Some((first, rest)) = points.split_first() {
        ctx.move_to(first.x, first.y);
        for point in rest {
            ctx.line_to(point.x, point.y);
        }
        ctx.close_path();
    }
}

fn draw_text_centered(ctx: &CairoContext, center: Point, text: &str, font_px: f64) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let layout = pangocairo::create_layout(ctx);
    let mut font_desc = FontDescription::from_string(FONT_FAMILY);
    font_desc.set_absolute_size(font_px * pango::SCALE as f64);
    layout.set_font_description(Some(&font_desc));
    layout.set_alignment(Alignment::Center);
    layout.set_text(text);

    let (width, height) = layout.pixel_size();
    let x = center.x - width as f64 / 2.0;
    let y = center.y - height as f64 / 2.0;
    draw_text_at(ctx, x, y, &layout)
}

/// Draw text with an outline at the given top-left position.
fn draw_text_at(ctx: &CairoContext, x: f64, y: f64, layout: &pango::Layout) -> Result<()> {
    ctx.move_to(x, y);
    pangocairo::layout_path(ctx, layout);
    if TEXT_OUTLINE_WIDTH > 0.0 {
        ctx.set_source_rgb(1.0, 1.0, 1.0);
        ctx.set_line_width(TEXT_OUTLINE_WIDTH);
        ctx.stroke_preserve()?;
    }
    ctx.set_source_rgb(BORDER_COLOR.0, BORDER_COLOR.1, BORDER_COLOR.2);
    ctx.fill()?;
    ctx.set_line_width(DEFAULT_LINE_WIDTH);
    Ok(())
}
