use crate::core::data::complex::Complex;
use crate::core::data::view_parameters::ViewParameters;

/// Escape-time iteration for one point.
///
/// Returns `None` when the point stays bounded for `max_iterations` steps
/// (treated as inside the set), otherwise the iteration count at which the
/// orbit left the radius-2 disc. Uses the incremental square update so each
/// step costs three multiplications.
#[must_use]
pub fn escape_time(c: Complex, max_iterations: u32) -> Option<u32> {
    let mut x = 0.0f64;
    let mut y = 0.0f64;
    let mut x_sq = 0.0f64;
    let mut y_sq = 0.0f64;
    let mut iterations = 0u32;

    while x_sq + y_sq <= 4.0 && iterations < max_iterations {
        y = (x + x) * y + c.imag;
        x = x_sq - y_sq + c.real;
        x_sq = x * x;
        y_sq = y * y;
        iterations += 1;
    }

    if iterations >= max_iterations {
        None
    } else {
        Some(iterations)
    }
}

/// Maps a linear pixel index to the complex point it samples.
///
/// The imaginary axis is flipped: raster y grows downward while the
/// imaginary axis grows upward, so row 0 samples `end.imag`.
#[must_use]
pub fn index_to_complex(index: usize, params: &ViewParameters) -> Complex {
    let x = (index % params.width() as usize) as f64;
    let y = (index / params.width() as usize) as f64;

    let start = params.start();
    let end = params.end();

    let real = (x / params.width() as f64) * (end.real - start.real) + start.real;
    let imag = (y / params.height() as f64) * (start.imag - end.imag) + end.imag;

    Complex { real, imag }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_ITERATIONS: u32 = 100_000;

    fn test_params() -> ViewParameters {
        ViewParameters::new(
            Complex::new(-2.0, -2.0),
            Complex::new(2.0, 2.0),
            4,
            4,
            MAX_ITERATIONS,
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_member_points_never_escape() {
        for (real, imag) in [(0.0, 0.0), (0.0, -1.0)] {
            assert_eq!(
                escape_time(Complex::new(real, imag), MAX_ITERATIONS),
                None,
                "({} + {}i) should be in the set",
                real,
                imag
            );
        }
    }

    #[test]
    fn test_non_member_points_escape() {
        for (real, imag) in [(-2.1, 0.0), (0.26, 0.0)] {
            assert!(
                escape_time(Complex::new(real, imag), MAX_ITERATIONS).is_some(),
                "({} + {}i) should not be in the set",
                real,
                imag
            );
        }
    }

    #[test]
    fn test_escape_count_is_at_least_one() {
        // even a far-outside point pays one iteration before the check
        assert_eq!(escape_time(Complex::new(100.0, 100.0), MAX_ITERATIONS), Some(1));
    }

    #[test]
    fn test_index_zero_maps_to_top_left() {
        let c = index_to_complex(0, &test_params());

        assert_eq!(c.real, -2.0);
        assert_eq!(c.imag, 2.0); // top row samples the highest imaginary value
    }

    #[test]
    fn test_index_advances_along_row_then_down() {
        let params = test_params();
        let right_of_origin = index_to_complex(1, &params);
        let below_origin = index_to_complex(4, &params);

        assert_eq!(right_of_origin.real, -1.0);
        assert_eq!(right_of_origin.imag, 2.0);
        assert_eq!(below_origin.real, -2.0);
        assert_eq!(below_origin.imag, 1.0);
    }
}
