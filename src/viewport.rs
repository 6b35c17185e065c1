//! Planar map viewport with fit and fly camera moves.
//!
//! The coordinate system is flat: `lat` maps to negative pixel y and `lng` to
//! pixel x, scaled by `2^zoom`. Fit and fly targets follow the usual web-map
//! rules, and flights use van Wijk & Nuij smooth zoom/pan interpolation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NavError, Result};
use crate::geometry::{LatLng, LatLngBounds, Point};

const DEFAULT_WIDTH_PX: f64 = 1024.0;
const DEFAULT_HEIGHT_PX: f64 = 768.0;
const DEFAULT_MIN_ZOOM: f64 = -3.0;
const DEFAULT_MAX_ZOOM: f64 = 8.0;
const DEFAULT_ZOOM_SNAP: f64 = 1.0;
const FLIGHT_RHO: f64 = 1.42;
const FLIGHT_SPEED: f64 = 0.8;
const FRAMES_PER_SECOND: f64 = 60.0;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportOptions {
    pub width: f64,
    pub height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_snap: f64,
    pub bounce_at_zoom_limits: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH_PX,
            height: DEFAULT_HEIGHT_PX,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_snap: DEFAULT_ZOOM_SNAP,
            bounce_at_zoom_limits: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct View {
    pub center: LatLng,
    pub zoom: f64,
}

/// Frames of one fly animation at 60 Hz, ending on the target view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Flight {
    duration_secs: f64,
    frames: Vec<View>,
    target: View,
}

impl Flight {
    /// A flight that lands on `target` at once.
    pub fn arrive(target: View) -> Self {
        Self {
            duration_secs: 0.0,
            frames: vec![target],
            target,
        }
    }

    fn through(duration_secs: f64, mut frames: Vec<View>, target: View) -> Self {
        frames.push(target);
        Self {
            duration_secs,
            frames,
            target,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Every frame, the target included as the last one.
    pub fn frames(&self) -> &[View] {
        &self.frames
    }

    pub fn target(&self) -> View {
        self.target
    }
}

/// Something that can be pointed at map bounds.
pub trait Camera {
    /// Jump straight to `bounds`.
    fn fit_bounds(&mut self, bounds: &LatLngBounds);

    /// Animate to `bounds`. The animation is not awaited.
    fn fly_to_bounds(&mut self, bounds: &LatLngBounds) -> Flight;
}

pub fn project(latlng: LatLng, zoom: f64) -> Point {
    let scale = zoom.exp2();
    Point::new(latlng.lng * scale, -latlng.lat * scale)
}

pub fn unproject(point: Point, zoom: f64) -> LatLng {
    let scale = zoom.exp2();
    LatLng::new(-point.y / scale, point.x / scale)
}

#[derive(Clone, Debug)]
pub struct Viewport {
    options: ViewportOptions,
    view: Option<View>,
}

impl Viewport {
    pub fn new(options: ViewportOptions) -> Result<Self> {
        let valid_size = |v: f64| v.is_finite() && v > 0.0;
        if !valid_size(options.width) || !valid_size(options.height) {
            return Err(NavError::InvalidViewportSize {
                width: options.width,
                height: options.height,
            });
        }
        Ok(Self {
            options,
            view: None,
        })
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn view(&self) -> Option<View> {
        self.view
    }

    pub fn size(&self) -> Point {
        Point::new(self.options.width, self.options.height)
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.options.min_zoom).min(self.options.max_zoom)
    }

    /// Largest snapped zoom at which `bounds` fits the viewport.
    pub fn bounds_zoom(&self, bounds: &LatLngBounds) -> f64 {
        let size = self.size();
        let nw = project(bounds.north_west(), 0.0);
        let se = project(bounds.south_east(), 0.0);
        let scale_x = size.x / (se.x - nw.x).abs();
        let scale_y = size.y / (se.y - nw.y).abs();
        let mut zoom = scale_x.min(scale_y).log2();
        let snap = self.options.zoom_snap;
        if snap > 0.0 && zoom.is_finite() {
            let fine = snap / 100.0;
            zoom = (zoom / fine).round() * fine;
            zoom = (zoom / snap).floor() * snap;
        }
        self.clamp_zoom(zoom)
    }

    /// Center and zoom that frame `bounds`.
    pub fn bounds_view(&self, bounds: &LatLngBounds) -> View {
        let zoom = self.bounds_zoom(bounds);
        let sw = project(bounds.south_west, zoom);
        let ne = project(bounds.north_east, zoom);
        let mid = Point::new((sw.x + ne.x) / 2.0, (sw.y + ne.y) / 2.0);
        View {
            center: unproject(mid, zoom),
            zoom,
        }
    }

    /// Request a zoom level. Out-of-range requests bounce back to the nearest
    /// limit, or are ignored when bouncing is off. Returns whether the view
    /// changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let Some(view) = self.view else {
            return false;
        };
        let clamped = self.clamp_zoom(zoom);
        if clamped != zoom && !self.options.bounce_at_zoom_limits {
            debug!(zoom, "zoom outside limits ignored");
            return false;
        }
        self.view = Some(View {
            center: view.center,
            zoom: clamped,
        });
        clamped != view.zoom
    }

    pub fn zoom_by(&mut self, delta: f64) -> bool {
        match self.view {
            Some(view) => self.set_zoom(view.zoom + delta),
            None => false,
        }
    }

    /// Move the center by a pixel offset at the current zoom.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if let Some(view) = self.view.as_mut() {
            let p = project(view.center, view.zoom);
            view.center = unproject(Point::new(p.x + dx, p.y + dy), view.zoom);
        }
    }

    /// Pixel position of `latlng` in the current view.
    pub fn pixel_of(&self, latlng: LatLng) -> Option<Point> {
        let view = self.view?;
        let size = self.size();
        let p = project(latlng, view.zoom);
        let c = project(view.center, view.zoom);
        Some(Point::new(p.x - c.x + size.x / 2.0, p.y - c.y + size.y / 2.0))
    }

    fn plan_flight(&self, start: View, target: View) -> Flight {
        let size = self.size();
        let from = project(start.center, start.zoom);
        let to = project(target.center, start.zoom);
        let w0 = size.x.max(size.y);
        let w1 = w0 * (start.zoom - target.zoom).exp2();
        let u1 = match from.distance_to(to) {
            d if d > 0.0 => d,
            _ => 1.0,
        };
        let rho2 = FLIGHT_RHO * FLIGHT_RHO;

        let r = |end: bool| {
            let (sign, w) = if end { (-1.0, w1) } else { (1.0, w0) };
            let t = w1 * w1 - w0 * w0 + sign * rho2 * rho2 * u1 * u1;
            let b = t / (2.0 * w * rho2 * u1);
            let sq = (b * b + 1.0).sqrt() - b;
            if sq < 1e-9 {
                -18.0
            } else {
                sq.ln()
            }
        };
        let r0 = r(false);
        let width_at = |s: f64| w0 * (r0.cosh() / (r0 + FLIGHT_RHO * s).cosh());
        let travel_at =
            |s: f64| w0 * (r0.cosh() * (r0 + FLIGHT_RHO * s).tanh() - r0.sinh()) / rho2;
        let path_len = (r(true) - r0) / FLIGHT_RHO;
        let duration_secs = (path_len * FLIGHT_SPEED).max(0.0);

        let count = (duration_secs * FRAMES_PER_SECOND).ceil().max(1.0) as usize;
        let mut frames = Vec::with_capacity(count);
        for k in 1..count {
            let t = k as f64 / count as f64;
            let s = ease_out(t) * path_len;
            let f = travel_at(s) / u1;
            let p = Point::new(from.x + (to.x - from.x) * f, from.y + (to.y - from.y) * f);
            frames.push(View {
                center: unproject(p, start.zoom),
                zoom: start.zoom + (w0 / width_at(s)).log2(),
            });
        }
        Flight::through(duration_secs, frames, target)
    }
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powf(1.5)
}

impl Camera for Viewport {
    fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        let target = self.bounds_view(bounds);
        debug!(lat = target.center.lat, lng = target.center.lng, zoom = target.zoom, "fit bounds");
        self.view = Some(target);
    }

    fn fly_to_bounds(&mut self, bounds: &LatLngBounds) -> Flight {
        let target = self.bounds_view(bounds);
        let flight = match self.view {
            Some(start) => self.plan_flight(start, target),
            None => Flight::arrive(target),
        };
        debug!(
            lat = target.center.lat,
            lng = target.center.lng,
            zoom = target.zoom,
            frames = flight.frames().len(),
            "fly to bounds"
        );
        self.view = Some(target);
        flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn viewport(options: ViewportOptions) -> Viewport {
        Viewport::new(options).unwrap()
    }

    fn small() -> ViewportOptions {
        ViewportOptions {
            width: 800.0,
            height: 600.0,
            ..ViewportOptions::default()
        }
    }

    fn bounds(corners: [[f64; 2]; 2]) -> LatLngBounds {
        LatLngBounds::from_corners(corners).unwrap()
    }

    #[test]
    fn fit_bounds_frames_the_box() {
        let mut vp = viewport(small());
        vp.fit_bounds(&bounds([[0.0, 0.0], [100.0, 200.0]]));
        let view = vp.view().unwrap();
        assert_eq!(view.zoom, 2.0);
        assert_eq!(view.center, LatLng::new(50.0, 100.0));
    }

    #[rstest]
    #[case::snapped_down([[0.0, 0.0], [10.0, 300.0]], 1.0)]
    #[case::clamped_to_min([[0.0, 0.0], [1.0e6, 1.0e6]], -3.0)]
    #[case::clamped_to_max([[5.0, 5.0], [5.0, 5.0]], 8.0)]
    fn bounds_zoom_snaps_and_clamps(#[case] corners: [[f64; 2]; 2], #[case] expected: f64) {
        let vp = viewport(small());
        assert_eq!(vp.bounds_zoom(&bounds(corners)), expected);
    }

    #[test]
    fn zero_snap_keeps_fractional_zoom() {
        let vp = viewport(ViewportOptions {
            zoom_snap: 0.0,
            ..small()
        });
        let zoom = vp.bounds_zoom(&bounds([[0.0, 0.0], [10.0, 300.0]]));
        assert!((zoom - (800.0f64 / 300.0).log2()).abs() < 1e-12);
    }

    #[test]
    fn invalid_size_is_rejected() {
        let err = Viewport::new(ViewportOptions {
            width: 0.0,
            ..ViewportOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, NavError::InvalidViewportSize { .. }));
    }

    #[test]
    fn zoom_bounces_back_at_limits() {
        let mut vp = viewport(small());
        vp.fit_bounds(&bounds([[0.0, 0.0], [100.0, 200.0]]));
        assert!(vp.set_zoom(20.0));
        assert_eq!(vp.view().unwrap().zoom, 8.0);
        assert!(vp.zoom_by(-50.0));
        assert_eq!(vp.view().unwrap().zoom, -3.0);
    }

    #[test]
    fn zoom_beyond_limits_ignored_without_bounce() {
        let mut vp = viewport(ViewportOptions {
            bounce_at_zoom_limits: false,
            ..small()
        });
        vp.fit_bounds(&bounds([[0.0, 0.0], [100.0, 200.0]]));
        assert!(!vp.set_zoom(20.0));
        assert_eq!(vp.view().unwrap().zoom, 2.0);
        assert!(vp.zoom_by(1.0));
        assert_eq!(vp.view().unwrap().zoom, 3.0);
    }

    #[test]
    fn zoom_needs_a_view() {
        let mut vp = viewport(small());
        assert!(!vp.set_zoom(1.0));
        assert!(vp.view().is_none());
    }

    #[test]
    fn pan_moves_center_in_pixels() {
        let mut vp = viewport(small());
        vp.fit_bounds(&bounds([[0.0, 0.0], [300.0, 400.0]]));
        assert_eq!(vp.view().unwrap().zoom, 1.0);
        vp.pan_by(10.0, 10.0);
        assert_eq!(vp.view().unwrap().center, LatLng::new(145.0, 205.0));
    }

    #[test]
    fn center_projects_to_middle_pixel() {
        let mut vp = viewport(small());
        vp.fit_bounds(&bounds([[0.0, 0.0], [100.0, 200.0]]));
        let center = vp.view().unwrap().center;
        assert_eq!(vp.pixel_of(center), Some(Point::new(400.0, 300.0)));
        assert_eq!(vp.pixel_of(LatLng::new(100.0, 0.0)), Some(Point::new(0.0, 100.0)));
    }

    #[test]
    fn arrival_has_the_target_as_its_only_frame() {
        let target = View {
            center: LatLng::new(1.0, 2.0),
            zoom: 3.0,
        };
        let flight = Flight::arrive(target);
        assert_eq!(flight.target(), target);
        assert_eq!(flight.frames(), [target]);
        assert_eq!(flight.duration_secs(), 0.0);
    }

    #[test]
    fn planned_flight_ends_on_its_target() {
        let mut vp = viewport(small());
        vp.fit_bounds(&bounds([[0.0, 0.0], [100.0, 200.0]]));
        let flight = vp.fly_to_bounds(&bounds([[0.0, 900.0], [50.0, 1000.0]]));
        assert_eq!(flight.frames().last(), Some(&flight.target()));
    }

    #[test]
    fn first_flight_arrives_immediately() {
        let mut vp = viewport(small());
        let flight = vp.fly_to_bounds(&bounds([[0.0, 0.0], [100.0, 200.0]]));
        assert_eq!(flight.frames().len(), 1);
        assert_eq!(flight.duration_secs(), 0.0);
        assert_eq!(Some(flight.target()), vp.view());
    }

    #[test]
    fn long_flight_zooms_out_midway_and_lands_on_target() {
        let mut vp = viewport(small());
        vp.fit_bounds(&bounds([[0.0, 0.0], [100.0, 200.0]]));
        let start = vp.view().unwrap();
        let flight = vp.fly_to_bounds(&bounds([[0.0, 5000.0], [100.0, 5200.0]]));

        assert!(flight.frames().len() > 1);
        assert!(flight.duration_secs() > 0.0);
        assert_eq!(flight.target().zoom, 2.0);
        assert_eq!(flight.target().center, LatLng::new(50.0, 5100.0));
        assert_eq!(vp.view(), Some(flight.target()));

        let lowest = flight
            .frames()
            .iter()
            .map(|frame| frame.zoom)
            .fold(f64::INFINITY, f64::min);
        assert!(lowest < start.zoom);
        let first = flight.frames()[0];
        assert!(first.center.lng > start.center.lng);
        assert!(first.center.lng < 5100.0);
    }

    #[test]
    fn flight_to_current_view_is_a_single_frame() {
        let mut vp = viewport(small());
        let target = bounds([[0.0, 0.0], [100.0, 200.0]]);
        vp.fit_bounds(&target);
        let flight = vp.fly_to_bounds(&target);
        assert_eq!(flight.frames().len(), 1);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ViewportOptions = serde_yaml::from_str("width: 640\nzoom_snap: 0.5\n").unwrap();
        assert_eq!(options.width, 640.0);
        assert_eq!(options.zoom_snap, 0.5);
        assert_eq!(options.min_zoom, -3.0);
        assert!(options.bounce_at_zoom_limits);
    }
}
