#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const TWOPI: f64 = 6.283185307179586476925287;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

/// Degrees from the celestial equator to either pole.
pub const POLE_DECLINATION_DEG: f64 = 90.0;

/// Slack used when counting how many fixed angular steps fit into a span,
/// so that `2π / (π/6)` floors to 12 rather than 11.
pub const STEP_COUNT_EPSILON: f64 = 1e-9;
