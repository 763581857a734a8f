//! Viewport bounds and the clamp that keeps nodes inside them.

/// Axis-aligned region nodes must stay within.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	/// Viewport of `width` x `height`, with the top `top_offset` pixels reserved.
	pub fn viewport(width: f64, height: f64, top_offset: f64) -> Self {
		Self {
			min_x: 0.0,
			min_y: top_offset,
			max_x: width,
			max_y: height,
		}
	}

	pub fn center(&self) -> (f64, f64) {
		(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}

	/// Whether a circle of `radius` at `(x, y)` lies fully inside.
	pub fn contains(&self, x: f64, y: f64, radius: f64) -> bool {
		clamp_axis(x, radius, self.min_x, self.max_x) == x
			&& clamp_axis(y, radius, self.min_y, self.max_y) == y
	}
}

/// Result of clamping a single axis.
fn clamp_axis(value: f64, radius: f64, min: f64, max: f64) -> f64 {
	let (lo, hi) = (min + radius, max - radius);
	if lo > hi {
		// Not enough room for the circle: sit on the centre line.
		return (min + max) / 2.0;
	}
	value.clamp(lo, hi)
}

/// Bounds `(x, y)` so a circle of `radius` fits inside `bounds`.
///
/// Each axis is handled independently. Points already inside are returned
/// unchanged.
pub fn clamp(x: f64, y: f64, radius: f64, bounds: &Bounds) -> (f64, f64) {
	(
		clamp_axis(x, radius, bounds.min_x, bounds.max_x),
		clamp_axis(y, radius, bounds.min_y, bounds.max_y),
	)
}

/// Clamps a moving point in place, zeroing velocity on every axis that hit a wall.
///
/// Returns whether any axis was clamped.
pub fn clamp_body(
	x: &mut f64,
	y: &mut f64,
	vx: &mut f64,
	vy: &mut f64,
	radius: f64,
	bounds: &Bounds,
) -> bool {
	let (cx, cy) = clamp(*x, *y, radius, bounds);
	let mut hit = false;
	if cx != *x {
		*x = cx;
		*vx = 0.0;
		hit = true;
	}
	if cy != *y {
		*y = cy;
		*vy = 0.0;
		hit = true;
	}
	hit
}
