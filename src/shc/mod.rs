// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spherical-harmonic-coefficient (SHC) magnetic models.
//!
//! An [`ShcModel`] is made of one or more [`ShcSegment`]s. A segment is the
//! content of a single SHC file: time nodes, a validity period and the Gauss
//! coefficients at every time node. Coefficients between time nodes are
//! linearly interpolated. Multiple segments come from composed model files,
//! where consecutive products are merged into one model.

mod error;
mod read;

pub use error::ShcError;
pub use read::{parse_shc, parse_shc_header, read_shc_file, read_shc_header, ShcHeader};

use serde::{Deserialize, Serialize};
use vec1::Vec1;

use crate::time::mjd2000_to_decimal_year;

/// The time series of a single Gauss coefficient. A negative order denotes an
/// `h` coefficient, a non-negative order a `g` coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShcCoefficient {
    pub degree: u16,
    pub order: i16,
    pub values: Vec<f64>,
}

/// A coefficient evaluated at a particular time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientValue {
    pub degree: u16,
    pub order: i16,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShcSegment {
    pub degree_min: u16,
    pub degree_max: u16,
    pub spline_order: u8,
    /// Time nodes [MJD2000].
    pub times: Vec<f64>,
    /// Validity period [MJD2000].
    pub validity: (f64, f64),
    pub coefficients: Vec<ShcCoefficient>,
}

impl ShcSegment {
    /// Check the consistency of a segment that didn't come straight from the
    /// SHC parser (e.g. one decoded from a composed model file).
    pub fn validate(&self) -> Result<(), ShcError> {
        if self.times.is_empty() {
            return Err(ShcError::NoTimes);
        }
        if self.times.iter().any(|t| !t.is_finite()) || self.times.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(ShcError::SegmentTimes);
        }
        let (start, end) = self.validity;
        if start.is_nan() || end.is_nan() || start > end {
            return Err(ShcError::SegmentValidity { start, end });
        }
        if self.coefficients.is_empty() {
            return Err(ShcError::NoCoefficients);
        }
        for c in &self.coefficients {
            if c.degree < self.degree_min
                || c.degree > self.degree_max
                || c.order.unsigned_abs() > c.degree
            {
                return Err(ShcError::SegmentCoefficientDegree {
                    degree: c.degree,
                    order: c.order,
                    min: self.degree_min,
                    max: self.degree_max,
                });
            }
            if c.values.len() != self.times.len() {
                return Err(ShcError::SegmentCoefficientCount {
                    degree: c.degree,
                    order: c.order,
                    expected: self.times.len(),
                    got: c.values.len(),
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, mjd2000: f64) -> bool {
        self.validity.0 <= mjd2000 && mjd2000 <= self.validity.1
    }

    /// Get the interpolation nodes bracketing `time` and the weight of the
    /// later node. Times outside the nodes are linearly extrapolated.
    fn interpolation_weights(&self, mjd2000: f64, in_decimal_years: bool) -> (usize, usize, f64) {
        if self.times.len() < 2 {
            return (0, 0, 0.0);
        }
        let convert = |t: f64| {
            if in_decimal_years {
                mjd2000_to_decimal_year(t)
            } else {
                t
            }
        };
        let time = convert(mjd2000);
        let i = self
            .times
            .partition_point(|&t| convert(t) <= time)
            .clamp(1, self.times.len() - 1);
        let (t0, t1) = (convert(self.times[i - 1]), convert(self.times[i]));
        (i - 1, i, (time - t0) / (t1 - t0))
    }

    /// Evaluate all coefficients at `mjd2000`. The validity period is not
    /// checked here.
    pub fn coefficients_at(&self, mjd2000: f64, in_decimal_years: bool) -> Vec<CoefficientValue> {
        let (i0, i1, weight) = self.interpolation_weights(mjd2000, in_decimal_years);
        self.coefficients
            .iter()
            .map(|c| CoefficientValue {
                degree: c.degree,
                order: c.order,
                value: c.values[i0] + weight * (c.values[i1] - c.values[i0]),
            })
            .collect()
    }
}

/// An in-memory SHC magnetic model.
#[derive(Debug, Clone, PartialEq)]
pub struct ShcModel {
    segments: Vec1<ShcSegment>,
    interpolate_in_decimal_years: bool,
}

impl ShcModel {
    /// Create a new model from its segments. Every segment is validated. The
    /// segments are sorted by time; they must not overlap (touching is
    /// allowed).
    pub fn new(mut segments: Vec1<ShcSegment>) -> Result<ShcModel, ShcError> {
        for segment in segments.iter() {
            segment.validate()?;
        }
        segments.sort_by(|a, b| a.validity.0.total_cmp(&b.validity.0));
        for pair in segments.windows(2) {
            if pair[0].validity.1 > pair[1].validity.0 {
                return Err(ShcError::OverlappingSegments {
                    first_end: pair[0].validity.1,
                    second_start: pair[1].validity.0,
                });
            }
        }

        Ok(ShcModel {
            segments,
            interpolate_in_decimal_years: false,
        })
    }

    /// Interpolate coefficients in decimal years rather than in MJD2000 (the
    /// IGRF convention).
    pub fn with_decimal_year_interpolation(mut self, interpolate_in_decimal_years: bool) -> Self {
        self.interpolate_in_decimal_years = interpolate_in_decimal_years;
        self
    }

    pub fn segments(&self) -> &[ShcSegment] {
        &self.segments
    }

    /// The validity period of the model [MJD2000].
    pub fn validity(&self) -> (f64, f64) {
        let segments = self.segments();
        (segments[0].validity.0, segments[segments.len() - 1].validity.1)
    }

    pub fn degree_max(&self) -> u16 {
        self.segments
            .iter()
            .map(|s| s.degree_max)
            .max()
            .unwrap_or_default()
    }

    /// Evaluate the model coefficients at `mjd2000`. `None` is returned if
    /// the time is outside of every segment's validity. At the boundary of two
    /// touching segments, the later segment is used.
    pub fn coefficients_at(&self, mjd2000: f64) -> Option<Vec<CoefficientValue>> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.contains(mjd2000))
            .map(|s| s.coefficients_at(mjd2000, self.interpolate_in_decimal_years))
    }
}
