//! Visual theming for the graph canvas.
//!
//! Node and link colors come from the configured callbacks; the theme only
//! covers what surrounds them: background, node outline and label text.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Scales each channel by `factor`, like a CSS `brightness()` filter.
	pub fn brightness(self, factor: f64) -> Self {
		let scale = |c: u8| (c as f64 * factor.max(0.0)).round().min(255.0) as u8;
		Self {
			r: scale(self.r),
			g: scale(self.g),
			b: scale(self.b),
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Named colors accepted besides hex and `rgb()` notation.
const NAMED: &[(&str, Color)] = &[
	("black", Color::rgb(0, 0, 0)),
	("white", Color::rgb(255, 255, 255)),
	("gray", Color::rgb(128, 128, 128)),
	("grey", Color::rgb(128, 128, 128)),
	("silver", Color::rgb(192, 192, 192)),
	("red", Color::rgb(255, 0, 0)),
	("tomato", Color::rgb(255, 99, 71)),
	("orange", Color::rgb(255, 165, 0)),
	("gold", Color::rgb(255, 215, 0)),
	("yellow", Color::rgb(255, 255, 0)),
	("green", Color::rgb(0, 128, 0)),
	("lime", Color::rgb(0, 255, 0)),
	("teal", Color::rgb(0, 128, 128)),
	("skyblue", Color::rgb(135, 206, 235)),
	("steelblue", Color::rgb(70, 130, 180)),
	("blue", Color::rgb(0, 0, 255)),
	("navy", Color::rgb(0, 0, 128)),
	("purple", Color::rgb(128, 0, 128)),
	("magenta", Color::rgb(255, 0, 255)),
	("pink", Color::rgb(255, 192, 203)),
	("brown", Color::rgb(165, 42, 42)),
];

/// Parses a CSS color string into a [`Color`].
///
/// Supports hex (`#RGB`, `#RRGGBB`), `rgb()`/`rgba()` functional notation and
/// a handful of named colors. Returns `None` for anything else.
pub fn parse_color(color_str: &str) -> Option<Color> {
	let s = color_str.trim();
	if let Some(hex) = s.strip_prefix('#') {
		if !hex.is_ascii() {
			return None;
		}
		let channel = |h: &str| u8::from_str_radix(h, 16).ok();
		return match hex.len() {
			6 => Some(Color::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
			3 => {
				let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
				Some(Color::rgb(short(0)?, short(1)?, short(2)?))
			}
			_ => None,
		};
	}
	if s.starts_with("rgb") {
		let nums: Vec<&str> = s
			.trim_start_matches("rgba(")
			.trim_start_matches("rgb(")
			.trim_end_matches(')')
			.split(',')
			.map(str::trim)
			.collect();
		let r = nums.first()?.parse().ok()?;
		let g = nums.get(1)?.parse().ok()?;
		let b = nums.get(2)?.parse().ok()?;
		let a = nums.get(3).and_then(|s| s.parse().ok()).unwrap_or(1.0);
		return Some(Color::rgba(r, g, b, a));
	}
	let lower = s.to_ascii_lowercase();
	NAMED
		.iter()
		.find(|(name, _)| *name == lower)
		.map(|&(_, color)| color)
}

/// CSS fill for `color_str` at `brightness`; unparsable colors pass through.
pub fn dimmed_css(color_str: &str, brightness: f64) -> String {
	if (brightness - 1.0).abs() < f64::EPSILON {
		return color_str.to_string();
	}
	match parse_color(color_str) {
		Some(color) => color.brightness(brightness).to_css(),
		None => color_str.to_string(),
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Centre color of the radial gradient
	pub color_secondary: Color,
	pub use_gradient: bool,
}

/// Node outline and label styling.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Outline width of focused nodes (0 = none)
	pub focus_ring_width: f64,
	pub focus_ring_color: Color,
	pub label_color: Color,
	pub label_font: &'static str,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub node: NodeStyle,
}

impl Theme {
	/// Dark canvas with a soft radial gradient (default).
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
			},
			node: NodeStyle {
				focus_ring_width: 1.0,
				focus_ring_color: Color::rgba(255, 255, 255, 0.6),
				label_color: Color::rgb(230, 235, 240),
				label_font: "sans-serif",
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_css_notations() {
		assert_eq!(parse_color("#87ceeb"), Some(Color::rgb(135, 206, 235)));
		assert_eq!(parse_color("#fff"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(parse_color("rgba(10, 20, 30, 0.5)"), Some(Color::rgba(10, 20, 30, 0.5)));
		assert_eq!(parse_color("rgb(1,2,3)"), Some(Color::rgb(1, 2, 3)));
		assert_eq!(parse_color("SkyBlue"), parse_color("#87ceeb"));
		assert_eq!(parse_color("#12"), None);
		assert_eq!(parse_color("hsl(0, 0%, 0%)"), None);
	}

	#[test]
	fn brightness_scales_channels() {
		let c = Color::rgb(200, 100, 50).brightness(0.5);
		assert_eq!((c.r, c.g, c.b), (100, 50, 25));
		assert_eq!(Color::rgb(200, 200, 200).brightness(2.0).r, 255);
	}

	#[test]
	fn dimmed_css_passes_through_unknown_colors() {
		assert_eq!(dimmed_css("white", 1.0), "white");
		assert_eq!(dimmed_css("white", 0.5), "#808080");
		assert_eq!(dimmed_css("hsl(0, 0%, 0%)", 0.5), "hsl(0, 0%, 0%)");
	}
}
