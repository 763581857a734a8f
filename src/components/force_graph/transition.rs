//! Wall-clock transitions and the simulation energy ramp.
//!
//! Nothing here schedules callbacks. Every transition records when it began and
//! is sampled by the frame loop with the current time in milliseconds.

/// A fixed-length interpolation between two values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
	pub from: f64,
	pub to: f64,
	pub start_ms: f64,
	pub duration_ms: f64,
}

impl Transition {
	pub fn new(from: f64, to: f64, start_ms: f64, duration_ms: f64) -> Self {
		Self {
			from,
			to,
			start_ms,
			duration_ms,
		}
	}

	/// Fraction elapsed at `now_ms`, in `[0, 1]`.
	pub fn progress(&self, now_ms: f64) -> f64 {
		if self.duration_ms <= 0.0 {
			return 1.0;
		}
		((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
	}

	/// Interpolated value at `now_ms` with cubic ease-in-out.
	pub fn value(&self, now_ms: f64) -> f64 {
		let p = self.progress(now_ms);
		if p >= 1.0 {
			return self.to;
		}
		let t = ease_cubic(p);
		self.from + (self.to - self.from) * t
	}

	pub fn is_finished(&self, now_ms: f64) -> bool {
		self.progress(now_ms) >= 1.0
	}

	/// A transition from the value currently shown toward `to`.
	///
	/// Retargeting mid-flight starts from where the old one had got to, so the
	/// value never jumps.
	pub fn retarget(&self, to: f64, now_ms: f64, duration_ms: f64) -> Self {
		Self::new(self.value(now_ms), to, now_ms, duration_ms)
	}
}

fn ease_cubic(t: f64) -> f64 {
	let t = t * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// Identifies one energy ramp so a superseded ramp can't be stopped twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RampHandle(u64);

/// Linear alpha ramp over wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyRamp {
	pub handle: RampHandle,
	pub from: f64,
	pub to: f64,
	pub start_ms: f64,
	pub duration_ms: f64,
}

impl EnergyRamp {
	pub fn new(id: u64, from: f64, to: f64, start_ms: f64, duration_ms: f64) -> Self {
		Self {
			handle: RampHandle(id),
			from,
			to,
			start_ms,
			duration_ms,
		}
	}

	pub fn fraction(&self, now_ms: f64) -> f64 {
		if self.duration_ms <= 0.0 {
			return 1.0;
		}
		((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
	}

	/// Alpha at `now_ms`.
	pub fn alpha(&self, now_ms: f64) -> f64 {
		let f = self.fraction(now_ms);
		if f >= 1.0 {
			return self.to;
		}
		self.from + (self.to - self.from) * f
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transition_hits_both_ends() {
		let t = Transition::new(0.0, 10.0, 100.0, 500.0);
		assert_eq!(t.value(0.0), 0.0);
		assert_eq!(t.value(100.0), 0.0);
		assert_eq!(t.value(350.0), 5.0);
		assert_eq!(t.value(600.0), 10.0);
		assert_eq!(t.value(10_000.0), 10.0);
		assert!(!t.is_finished(599.0));
		assert!(t.is_finished(600.0));
	}

	#[test]
	fn zero_length_transition_is_done_immediately() {
		let t = Transition::new(1.0, 0.0, 50.0, 0.0);
		assert!(t.is_finished(50.0));
		assert_eq!(t.value(50.0), 0.0);
	}

	#[test]
	fn retarget_continues_from_current_value() {
		let t = Transition::new(0.0, 1.0, 0.0, 200.0);
		let back = t.retarget(0.0, 100.0, 200.0);
		assert_eq!(back.from, 0.5);
		assert_eq!(back.value(300.0), 0.0);
	}

	#[test]
	fn ramp_is_linear() {
		let ramp = EnergyRamp::new(1, 0.0, 0.4, 1000.0, 2000.0);
		assert_eq!(ramp.alpha(1000.0), 0.0);
		assert!((ramp.alpha(2000.0) - 0.2).abs() < 1e-12);
		assert_eq!(ramp.alpha(5000.0), 0.4);
	}
}
