/// RGBA colour for one pixel's iteration outcome.
///
/// Escaped points get a log-scaled purple ramp so detail near the set stays
/// visible at high iteration caps; interior points are white. Alpha is
/// always opaque.
#[must_use]
pub fn iteration_colour(iterations: Option<u32>, max_iterations: u32) -> [u8; 4] {
    match iterations {
        Some(iters) => {
            let ramp = (f64::log2(iters as f64 * 1.2) / f64::log2(max_iterations as f64) * 255.0)
                .clamp(0.0, 255.0) as u8;

            [ramp / 2, 0, ramp / 3, 255]
        }
        None => [255, 255, 255, 255],
    }
}
