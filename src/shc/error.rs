// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with SHC model files.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShcError {
    #[error("SHC file line {line_num}: Could not parse '{string}' as a number")]
    ParseNumber { line_num: u32, string: String },

    #[error("SHC file line {line_num}: Expected at least 5 header items, got {got}")]
    ShortHeader { line_num: u32, got: usize },

    #[error("SHC file line {line_num}: The validity period needs both a start and an end")]
    IncompleteValidity { line_num: u32 },

    #[error("SHC file line {line_num}: Time {value} is outside the supported calendar range")]
    TimeOutOfRange { line_num: u32, value: f64 },

    #[error("SHC file line {line_num}: Expected {expected} time nodes, got {got}")]
    TimeCount {
        line_num: u32,
        expected: usize,
        got: usize,
    },

    #[error("SHC file line {line_num}: The time nodes are not strictly increasing")]
    NonIncreasingTimes { line_num: u32 },

    #[error("SHC file line {line_num}: Expected {expected} coefficient values, got {got}")]
    CoefficientCount {
        line_num: u32,
        expected: usize,
        got: usize,
    },

    #[error("SHC file line {line_num}: Degree {degree} is outside the range {min}..={max}")]
    DegreeOutOfRange {
        line_num: u32,
        degree: u16,
        min: u16,
        max: u16,
    },

    #[error("SHC file line {line_num}: Order {order} is not valid for degree {degree}")]
    InvalidOrder {
        line_num: u32,
        degree: u16,
        order: i16,
    },

    #[error("SHC file has no header")]
    NoHeader,

    #[error("SHC file has no time nodes")]
    NoTimes,

    #[error("SHC file has no coefficients")]
    NoCoefficients,

    #[error("The model segment time nodes are not finite and strictly increasing")]
    SegmentTimes,

    #[error("The model segment validity ({start}, {end}) is not a valid time range")]
    SegmentValidity { start: f64, end: f64 },

    #[error("Model segment coefficient ({degree}, {order}) has {got} values; expected {expected}")]
    SegmentCoefficientCount {
        degree: u16,
        order: i16,
        expected: usize,
        got: usize,
    },

    #[error("Model segment coefficient ({degree}, {order}) is outside degrees {min}..={max}")]
    SegmentCoefficientDegree {
        degree: u16,
        order: i16,
        min: u16,
        max: u16,
    },

    #[error("The model segments overlap in time ({first_end} > {second_start})")]
    OverlappingSegments { first_end: f64, second_start: f64 },

    #[error("Could not read SHC file {}: {err}", path.display())]
    File { path: PathBuf, err: std::io::Error },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
