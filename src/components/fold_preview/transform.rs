//! View transform math: the automatic fit plus the user's pan and zoom on top.

/// A point or vector in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Midpoint between `self` and `other`.
	pub fn midpoint(self, other: Self) -> Self {
		Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

pub const MIN_ZOOM: f64 = 1e-6;
pub const MAX_ZOOM: f64 = 1e6;

/// User pan/zoom applied on top of the base fit.
///
/// Screen position of a fitted point `p` is `pan + p * zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub zoom: f64,
	pub pan: Point,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: Self = Self {
		zoom: 1.0,
		pan: Point::new(0.0, 0.0),
	};

	pub fn reset(&mut self) {
		*self = Self::IDENTITY;
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.pan.x += dx;
		self.pan.y += dy;
	}

	/// Scales zoom by `factor`, keeping the point under `anchor` fixed on screen.
	///
	/// Factors that are not finite and positive are ignored. The result is
	/// clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`] so pan stays finite.
	pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
		if !(factor.is_finite() && factor > 0.0) {
			return;
		}
		let before = self.screen_to_fitted(anchor);
		self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		self.pan = Point::new(
			anchor.x - before.x * self.zoom,
			anchor.y - before.y * self.zoom,
		);
	}

	pub fn fitted_to_screen(&self, p: Point) -> Point {
		Point::new(self.pan.x + p.x * self.zoom, self.pan.y + p.y * self.zoom)
	}

	pub fn screen_to_fitted(&self, s: Point) -> Point {
		Point::new((s.x - self.pan.x) / self.zoom, (s.y - self.pan.y) / self.zoom)
	}
}

/// Axis-aligned bounding box over document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	/// Bounding box of `points`, `None` when empty.
	pub fn of(points: &[[f64; 2]]) -> Option<Self> {
		let (first, rest) = points.split_first()?;
		let mut b = Self {
			min_x: first[0],
			min_y: first[1],
			max_x: first[0],
			max_y: first[1],
		};
		for &[x, y] in rest {
			b.min_x = b.min_x.min(x);
			b.min_y = b.min_y.min(y);
			b.max_x = b.max_x.max(x);
			b.max_y = b.max_y.max(y);
		}
		Some(b)
	}

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}
}

/// Maps document coordinates into the padded, centered canvas area.
///
/// Recomputed every render from the current canvas size and document extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseFit {
	pub scale: f64,
	pub offset: Point,
	origin: Point,
}

impl BaseFit {
	pub fn new(bounds: Bounds, width: f64, height: f64, padding: f64) -> Self {
		let (bw, bh) = (bounds.width(), bounds.height());
		let avail_w = (width - 2.0 * padding).max(1.0);
		let avail_h = (height - 2.0 * padding).max(1.0);

		// A flat axis contributes no stretch; fall back to the other one.
		let sx = (bw > 0.0).then(|| avail_w / bw);
		let sy = (bh > 0.0).then(|| avail_h / bh);
		let scale = match (sx, sy) {
			(Some(sx), Some(sy)) => sx.min(sy),
			(Some(s), None) | (None, Some(s)) => s,
			(None, None) => 1.0,
		};

		Self {
			scale,
			offset: Point::new((width - bw * scale) / 2.0, (height - bh * scale) / 2.0),
			origin: Point::new(bounds.min_x, bounds.min_y),
		}
	}

	pub fn map(&self, [x, y]: [f64; 2]) -> Point {
		Point::new(
			(x - self.origin.x) * self.scale + self.offset.x,
			(y - self.origin.y) * self.scale + self.offset.y,
		)
	}
}
