use serde::Serialize;

use crate::error::{NavError, Result};

/// Running min/max box in SVG user space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BBox {
    pub fn from_point(x: f64, y: f64) -> Self {
        Self {
            xmin: x,
            xmax: x,
            ymin: y,
            ymax: y,
        }
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.xmin = self.xmin.min(x);
        self.xmax = self.xmax.max(x);
        self.ymin = self.ymin.min(y);
        self.ymax = self.ymax.max(y);
    }

    pub fn x(&self) -> f64 {
        self.xmin
    }

    pub fn y(&self) -> f64 {
        self.ymin
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Fold an optional accumulator with one more point.
pub fn accumulate(acc: Option<BBox>, x: f64, y: f64) -> Option<BBox> {
    match acc {
        Some(mut bbox) => {
            bbox.include(x, y);
            Some(bbox)
        }
        None => Some(BBox::from_point(x, y)),
    }
}

/// A map coordinate in the flat CRS: `lat` is vertical, `lng` horizontal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from(pair: [f64; 2]) -> Self {
        LatLng::new(pair[0], pair[1])
    }
}

/// Normalized map box, built from any two opposite corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn from_corners(corners: [[f64; 2]; 2]) -> Result<Self> {
        if corners.iter().flatten().any(|value| !value.is_finite()) {
            return Err(NavError::InvalidBounds(corners));
        }
        let [a, b] = corners;
        Ok(Self {
            south_west: LatLng::new(a[0].min(b[0]), a[1].min(b[1])),
            north_east: LatLng::new(a[0].max(b[0]), a[1].max(b[1])),
        })
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }
}

/// Pixel-space point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Map-space bounds of one graph node.
///
/// `bounds` holds two `[lat, lng]` corners and `rect` the four corners of the
/// same box, starting top-left and going clockwise. SVG y grows downwards, so
/// it is flipped against the graph origin `origin_y`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeBounds {
    pub bounds: [[f64; 2]; 2],
    pub rect: [[f64; 2]; 4],
}

impl NodeBounds {
    pub fn from_bbox(bbox: &BBox, origin_y: f64) -> Self {
        let top = origin_y - bbox.y();
        let bottom = origin_y - bbox.y() - bbox.height();
        let left = bbox.x();
        let right = bbox.x() + bbox.width();
        Self {
            bounds: [[top, left], [bottom, right]],
            rect: [[top, left], [top, right], [bottom, right], [bottom, left]],
        }
    }

    pub fn lat_lng_bounds(&self) -> Result<LatLngBounds> {
        LatLngBounds::from_corners(self.bounds)
    }
}

/// Map bounds covering the whole graph overlay.
pub fn overlay_bounds(extent: &BBox) -> [[f64; 2]; 2] {
    [
        [extent.y(), extent.width() + extent.x()],
        [extent.height() + extent.y(), extent.x()],
    ]
}
