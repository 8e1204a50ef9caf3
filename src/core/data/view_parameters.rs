use crate::core::data::complex::Complex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewParametersError {
    DegenerateRegion { real_extent: f64, imag_extent: f64 },
    EmptyRaster { width: u32, height: u32 },
    ZeroMaxIterations,
}

impl fmt::Display for ViewParametersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateRegion {
                real_extent,
                imag_extent,
            } => {
                write!(
                    f,
                    "complex region extents must be positive: {}x{}",
                    real_extent, imag_extent
                )
            }
            Self::EmptyRaster { width, height } => {
                write!(f, "raster size must be positive: {}x{}", width, height)
            }
            Self::ZeroMaxIterations => write!(f, "max iterations must be positive"),
        }
    }
}

impl Error for ViewParametersError {}

/// Immutable input to one render: the complex-plane rectangle to sample,
/// the raster it maps onto, and the iteration cap.
///
/// `keep_ratio` is a UI concern carried through unchanged; the render
/// pipeline never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewParameters {
    start: Complex,
    end: Complex,
    width: u32,
    height: u32,
    max_iterations: u32,
    keep_ratio: bool,
}

impl ViewParameters {
    pub fn new(
        start: Complex,
        end: Complex,
        width: u32,
        height: u32,
        max_iterations: u32,
        keep_ratio: bool,
    ) -> Result<Self, ViewParametersError> {
        let real_extent = end.real - start.real;
        let imag_extent = end.imag - start.imag;

        // NaN and infinite corners must fail here too, so only `>` on a
        // finite extent may pass
        if !(real_extent.is_finite() && real_extent > 0.0)
            || !(imag_extent.is_finite() && imag_extent > 0.0)
        {
            return Err(ViewParametersError::DegenerateRegion {
                real_extent,
                imag_extent,
            });
        }

        if width == 0 || height == 0 {
            return Err(ViewParametersError::EmptyRaster { width, height });
        }

        if max_iterations == 0 {
            return Err(ViewParametersError::ZeroMaxIterations);
        }

        Ok(Self {
            start,
            end,
            width,
            height,
            max_iterations,
            keep_ratio,
        })
    }

    #[must_use]
    pub fn start(&self) -> Complex {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Complex {
        self.end
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    #[must_use]
    pub fn keep_ratio(&self) -> bool {
        self.keep_ratio
    }

    #[must_use]
    pub fn total_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_view(width: u32, height: u32) -> Result<ViewParameters, ViewParametersError> {
        ViewParameters::new(
            Complex::new(-2.0, -2.0),
            Complex::new(2.0, 2.0),
            width,
            height,
            200,
            true,
        )
    }

    #[test]
    fn test_new_valid() {
        let params = square_view(500, 500).unwrap();

        assert_eq!(params.width(), 500);
        assert_eq!(params.height(), 500);
        assert_eq!(params.max_iterations(), 200);
        assert_eq!(params.total_pixels(), 250_000);
        assert!(params.keep_ratio());
    }

    #[test]
    fn test_new_rejects_end_not_greater_than_start() {
        let reversed_real = ViewParameters::new(
            Complex::new(2.0, -2.0),
            Complex::new(-2.0, 2.0),
            100,
            100,
            50,
            false,
        );
        let flat_imag = ViewParameters::new(
            Complex::new(-2.0, 1.0),
            Complex::new(2.0, 1.0),
            100,
            100,
            50,
            false,
        );

        assert_eq!(
            reversed_real,
            Err(ViewParametersError::DegenerateRegion {
                real_extent: -4.0,
                imag_extent: 4.0
            })
        );
        assert_eq!(
            flat_imag,
            Err(ViewParametersError::DegenerateRegion {
                real_extent: 4.0,
                imag_extent: 0.0
            })
        );
    }

    #[test]
    fn test_new_rejects_non_finite_corners() {
        let nan_start = ViewParameters::new(
            Complex::new(f64::NAN, -2.0),
            Complex::new(2.0, 2.0),
            100,
            100,
            50,
            false,
        );
        let nan_end_imag = ViewParameters::new(
            Complex::new(-2.0, -2.0),
            Complex::new(2.0, f64::NAN),
            100,
            100,
            50,
            false,
        );
        let infinite_end = ViewParameters::new(
            Complex::new(-2.0, -2.0),
            Complex::new(f64::INFINITY, 2.0),
            100,
            100,
            50,
            false,
        );

        assert!(matches!(
            nan_start,
            Err(ViewParametersError::DegenerateRegion { .. })
        ));
        assert!(matches!(
            nan_end_imag,
            Err(ViewParametersError::DegenerateRegion { .. })
        ));
        assert!(matches!(
            infinite_end,
            Err(ViewParametersError::DegenerateRegion { .. })
        ));
    }

    #[test]
    fn test_new_rejects_empty_raster() {
        assert_eq!(
            square_view(0, 100),
            Err(ViewParametersError::EmptyRaster {
                width: 0,
                height: 100
            })
        );
        assert_eq!(
            square_view(100, 0),
            Err(ViewParametersError::EmptyRaster {
                width: 100,
                height: 0
            })
        );
    }

    #[test]
    fn test_new_rejects_zero_max_iterations() {
        let result = ViewParameters::new(
            Complex::new(-2.0, -2.0),
            Complex::new(2.0, 2.0),
            100,
            100,
            0,
            false,
        );

        assert_eq!(result, Err(ViewParametersError::ZeroMaxIterations));
    }

    #[test]
    fn test_json_round_trip_preserves_all_fields() {
        let params = square_view(640, 480).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        let back: ViewParameters = serde_json::from_str(&json).unwrap();

        assert_eq!(back, params);
    }
}
