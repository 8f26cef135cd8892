//! Space-tagged coordinates and conversions between them.
//!
//! Three coordinate spaces are in play while viewing a page:
//!
//! - [`ContainerSpace`]: CSS pixels relative to the scrollable viewport element.
//!   Pointer input arrives here.
//! - [`CanvasSpace`]: pixels of the raster surface. The surface may be displayed
//!   at a different CSS size than its intrinsic size.
//! - [`PageSpace`]: page-native units at scale 1.0.
//!
//! Points and rects carry their space as a type parameter so that values from
//! different spaces cannot be mixed without going through a conversion.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;

/// CSS pixels relative to the viewport container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContainerSpace;

/// Intrinsic pixels of the raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CanvasSpace;

/// Page-native units at scale 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PageSpace;

/// A point tagged with its coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SpacePoint<S> {
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    _space: PhantomData<S>,
}

impl<S> SpacePoint<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// Drop the space tag.
    pub fn to_kurbo(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn from_kurbo(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

/// An axis-aligned rectangle tagged with its coordinate space.
///
/// Width and height are never negative; use [`SpaceRect::from_corners`] to
/// build one from two arbitrary points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SpaceRect<S> {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    _space: PhantomData<S>,
}

impl<S> SpaceRect<S> {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width: width.max(0.0),
            height: height.max(0.0),
            _space: PhantomData,
        }
    }

    /// Normalized bounding box of two corners, in any drag direction.
    pub fn from_corners(a: SpacePoint<S>, b: SpacePoint<S>) -> Self {
        Self::from_kurbo(Rect::from_points(a.to_kurbo(), b.to_kurbo()))
    }

    pub fn from_kurbo(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    pub fn to_kurbo(self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }

    pub fn origin(self) -> SpacePoint<S> {
        SpacePoint::new(self.left, self.top)
    }

    pub fn far_corner(self) -> SpacePoint<S> {
        SpacePoint::new(self.left + self.width, self.top + self.height)
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

pub type ContainerPoint = SpacePoint<ContainerSpace>;
pub type CanvasPoint = SpacePoint<CanvasSpace>;
pub type PagePoint = SpacePoint<PageSpace>;

pub type ContainerRect = SpaceRect<ContainerSpace>;
pub type CanvasRect = SpaceRect<CanvasSpace>;
pub type PageRect = SpaceRect<PageSpace>;

/// A committed drag selection, in container coordinates.
pub type SelectionRect = ContainerRect;

/// Mapping errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MappingError {
    #[error("Canvas is not displayed (display size {0}x{1})")]
    ZeroDisplay(f64, f64),
    #[error("Invalid scale: {0}")]
    InvalidScale(f64),
}

/// Where the raster surface sits inside the container and at what size.
///
/// This is read fresh from the viewport every time a conversion is made: the
/// container can be resized between drag start and drag end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// Top-left corner of the displayed canvas, in container pixels.
    pub origin: ContainerPoint,
    /// Displayed (CSS) size of the canvas.
    pub display_size: Size,
    /// Intrinsic pixel size of the raster surface.
    pub intrinsic_size: Size,
}

impl CanvasGeometry {
    /// Geometry of a canvas displayed 1:1 at the container origin.
    pub fn unscaled(intrinsic_size: Size) -> Self {
        Self {
            origin: ContainerPoint::new(0.0, 0.0),
            display_size: intrinsic_size,
            intrinsic_size,
        }
    }

    /// Intrinsic pixels per displayed pixel, per axis.
    pub fn ratio(&self) -> Result<(f64, f64), MappingError> {
        let display = self.display_size;
        if !(display.width > 0.0 && display.height > 0.0) {
            return Err(MappingError::ZeroDisplay(display.width, display.height));
        }
        Ok((
            self.intrinsic_size.width / display.width,
            self.intrinsic_size.height / display.height,
        ))
    }
}

/// Convert a container point into canvas-intrinsic pixels.
pub fn to_canvas_intrinsic(
    point: ContainerPoint,
    geometry: &CanvasGeometry,
) -> Result<CanvasPoint, MappingError> {
    let (sx, sy) = geometry.ratio()?;
    Ok(CanvasPoint::new(
        (point.x - geometry.origin.x) * sx,
        (point.y - geometry.origin.y) * sy,
    ))
}

/// Convert a canvas-intrinsic point back into container pixels.
pub fn to_container(
    point: CanvasPoint,
    geometry: &CanvasGeometry,
) -> Result<ContainerPoint, MappingError> {
    let (sx, sy) = geometry.ratio()?;
    if sx == 0.0 || sy == 0.0 {
        return Err(MappingError::InvalidScale(sx.min(sy)));
    }
    Ok(ContainerPoint::new(
        point.x / sx + geometry.origin.x,
        point.y / sy + geometry.origin.y,
    ))
}

pub fn rect_to_canvas_intrinsic(
    rect: ContainerRect,
    geometry: &CanvasGeometry,
) -> Result<CanvasRect, MappingError> {
    let a = to_canvas_intrinsic(rect.origin(), geometry)?;
    let b = to_canvas_intrinsic(rect.far_corner(), geometry)?;
    Ok(CanvasRect::from_corners(a, b))
}

pub fn rect_to_container(
    rect: CanvasRect,
    geometry: &CanvasGeometry,
) -> Result<ContainerRect, MappingError> {
    let a = to_container(rect.origin(), geometry)?;
    let b = to_container(rect.far_corner(), geometry)?;
    Ok(ContainerRect::from_corners(a, b))
}

fn check_scale(scale: f64) -> Result<f64, MappingError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(MappingError::InvalidScale(scale))
    }
}

/// Canvas pixels rendered at `scale` to page-native units.
pub fn canvas_to_page(point: CanvasPoint, scale: f64) -> Result<PagePoint, MappingError> {
    let scale = check_scale(scale)?;
    Ok(PagePoint::new(point.x / scale, point.y / scale))
}

pub fn page_to_canvas(point: PagePoint, scale: f64) -> Result<CanvasPoint, MappingError> {
    let scale = check_scale(scale)?;
    Ok(CanvasPoint::new(point.x * scale, point.y * scale))
}

pub fn canvas_rect_to_page(rect: CanvasRect, scale: f64) -> Result<PageRect, MappingError> {
    let scale = check_scale(scale)?;
    Ok(PageRect::new(
        rect.left / scale,
        rect.top / scale,
        rect.width / scale,
        rect.height / scale,
    ))
}

pub fn page_rect_to_canvas(rect: PageRect, scale: f64) -> Result<CanvasRect, MappingError> {
    let scale = check_scale(scale)?;
    Ok(CanvasRect::new(
        rect.left * scale,
        rect.top * scale,
        rect.width * scale,
        rect.height * scale,
    ))
}
