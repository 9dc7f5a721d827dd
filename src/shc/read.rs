// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parsing of SHC model files.
//!
//! An SHC file is a text file. Lines starting with '#' are comments. The first
//! other line is the header:
//!
//! `degree_min degree_max num_times spline_order num_steps [validity_start validity_end]`
//!
//! It is followed by a line holding the time nodes (decimal years) and then by
//! one line per coefficient: `degree order value_1 .. value_num_times`.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use log::trace;

use super::{ShcCoefficient, ShcError, ShcSegment};
use crate::time::decimal_year_to_mjd2000;

/// The header of an SHC file. Times are in decimal years.
#[derive(Debug, Clone, PartialEq)]
pub struct ShcHeader {
    pub degree_min: u16,
    pub degree_max: u16,
    pub num_times: usize,
    pub spline_order: u8,
    pub num_steps: u32,
    pub times: Vec<f64>,
    pub validity: (f64, f64),
}

impl ShcHeader {
    /// The validity period of the model [MJD2000].
    pub fn validity_mjd2000(&self) -> (f64, f64) {
        (
            decimal_year_to_mjd2000(self.validity.0),
            decimal_year_to_mjd2000(self.validity.1),
        )
    }
}

/// Read the next line that isn't a comment or blank. Returns `false` at the
/// end of the buffer.
fn next_data_line<T: BufRead>(
    buf: &mut T,
    line: &mut String,
    line_num: &mut u32,
) -> Result<bool, ShcError> {
    loop {
        line.clear();
        if buf.read_line(line)? == 0 {
            return Ok(false);
        }
        *line_num += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        return Ok(true);
    }
}

fn parse_item<N: FromStr>(string: &str, line_num: u32) -> Result<N, ShcError> {
    string.parse().map_err(|_| ShcError::ParseNumber {
        line_num,
        string: string.to_string(),
    })
}

/// Check that a decimal year converts to a finite MJD2000. Infinite values
/// are only accepted when `allow_infinite` is set (open validity bounds).
fn check_time(value: f64, allow_infinite: bool, line_num: u32) -> Result<(), ShcError> {
    let converted = decimal_year_to_mjd2000(value);
    if converted.is_finite() || (allow_infinite && value.is_infinite()) {
        Ok(())
    } else {
        Err(ShcError::TimeOutOfRange { line_num, value })
    }
}

fn parse_header_inner<T: BufRead>(
    buf: &mut T,
    line: &mut String,
    line_num: &mut u32,
) -> Result<ShcHeader, ShcError> {
    if !next_data_line(buf, line, line_num)? {
        return Err(ShcError::NoHeader);
    }
    let items: Vec<&str> = line.split_ascii_whitespace().collect();
    if items.len() < 5 {
        return Err(ShcError::ShortHeader {
            line_num: *line_num,
            got: items.len(),
        });
    }
    let degree_min: u16 = parse_item(items[0], *line_num)?;
    let degree_max: u16 = parse_item(items[1], *line_num)?;
    let num_times: usize = parse_item(items[2], *line_num)?;
    let spline_order: u8 = parse_item(items[3], *line_num)?;
    let num_steps: u32 = parse_item(items[4], *line_num)?;
    let explicit_validity: Option<(f64, f64)> = match items.get(5..) {
        Some([]) | None => None,
        Some([_]) => {
            return Err(ShcError::IncompleteValidity {
                line_num: *line_num,
            })
        }
        Some([start, end, ..]) => {
            let (start, end) = (parse_item(start, *line_num)?, parse_item(end, *line_num)?);
            check_time(start, true, *line_num)?;
            check_time(end, true, *line_num)?;
            Some((start, end))
        }
    };
    if num_times == 0 {
        return Err(ShcError::NoTimes);
    }

    if !next_data_line(buf, line, line_num)? {
        return Err(ShcError::NoTimes);
    }
    let times = line
        .split_ascii_whitespace()
        .map(|s| parse_item(s, *line_num))
        .collect::<Result<Vec<f64>, _>>()?;
    if times.len() != num_times {
        return Err(ShcError::TimeCount {
            line_num: *line_num,
            expected: num_times,
            got: times.len(),
        });
    }
    for &t in &times {
        check_time(t, false, *line_num)?;
    }
    if times.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ShcError::NonIncreasingTimes {
            line_num: *line_num,
        });
    }

    let validity = explicit_validity.unwrap_or((times[0], times[times.len() - 1]));
    Ok(ShcHeader {
        degree_min,
        degree_max,
        num_times,
        spline_order,
        num_steps,
        times,
        validity,
    })
}

/// Parse only the header (and time nodes) of an SHC file.
pub fn parse_shc_header<T: BufRead>(buf: &mut T) -> Result<ShcHeader, ShcError> {
    let mut line = String::new();
    let mut line_num = 0;
    parse_header_inner(buf, &mut line, &mut line_num)
}

/// Parse a whole SHC file into a segment. Times are converted to MJD2000.
pub fn parse_shc<T: BufRead>(buf: &mut T) -> Result<ShcSegment, ShcError> {
    let mut line = String::new();
    let mut line_num = 0;
    let header = parse_header_inner(buf, &mut line, &mut line_num)?;

    let mut coefficients = vec![];
    while next_data_line(buf, &mut line, &mut line_num)? {
        let mut items = line.split_ascii_whitespace();
        let (degree, order) = match (items.next(), items.next()) {
            (Some(n), Some(m)) => (
                parse_item::<u16>(n, line_num)?,
                parse_item::<i16>(m, line_num)?,
            ),
            _ => {
                return Err(ShcError::CoefficientCount {
                    line_num,
                    expected: header.num_times,
                    got: 0,
                })
            }
        };
        if degree < header.degree_min || degree > header.degree_max {
            return Err(ShcError::DegreeOutOfRange {
                line_num,
                degree,
                min: header.degree_min,
                max: header.degree_max,
            });
        }
        if order.unsigned_abs() > degree {
            return Err(ShcError::InvalidOrder {
                line_num,
                degree,
                order,
            });
        }
        let values = items
            .map(|s| parse_item(s, line_num))
            .collect::<Result<Vec<f64>, _>>()?;
        if values.len() != header.num_times {
            return Err(ShcError::CoefficientCount {
                line_num,
                expected: header.num_times,
                got: values.len(),
            });
        }
        coefficients.push(ShcCoefficient {
            degree,
            order,
            values,
        });
    }
    if coefficients.is_empty() {
        return Err(ShcError::NoCoefficients);
    }
    trace!(
        "Parsed {} SHC coefficients (degrees {}..={})",
        coefficients.len(),
        header.degree_min,
        header.degree_max
    );

    Ok(ShcSegment {
        degree_min: header.degree_min,
        degree_max: header.degree_max,
        spline_order: header.spline_order,
        times: header
            .times
            .iter()
            .copied()
            .map(decimal_year_to_mjd2000)
            .collect(),
        validity: header.validity_mjd2000(),
        coefficients,
    })
}

fn open(path: &Path) -> Result<BufReader<File>, ShcError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|err| ShcError::File {
            path: path.to_path_buf(),
            err,
        })
}

/// Read the header of the SHC file at `path`.
pub fn read_shc_header(path: &Path) -> Result<ShcHeader, ShcError> {
    parse_shc_header(&mut open(path)?)
}

/// Read the SHC file at `path`.
pub fn read_shc_file(path: &Path) -> Result<ShcSegment, ShcError> {
    parse_shc(&mut open(path)?)
}
