/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use chrono::{DateTime, Offset, TimeZone};

use crate::LineProtocolError;

/// Get the nanoseconds since the unix epoch of a UTC datetime.
///
/// Datetimes carrying a non-zero UTC offset are rejected.
pub fn unix_nanos<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Result<i64, LineProtocolError> {
    if datetime.offset().fix().local_minus_utc() != 0 {
        return Err(LineProtocolError::invalid_argument(
            "timestamps must be specified as UTC",
        ));
    }
    datetime.timestamp_nanos_opt().ok_or_else(|| {
        LineProtocolError::out_of_range(format!(
            "timestamp {} can not be represented in nanoseconds",
            datetime.naive_utc()
        ))
    })
}

/// The time unit a timestamp is expressed in on the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Precision {
    #[default]
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl Precision {
    /// Nanoseconds per unit
    pub const fn divisor(self) -> i64 {
        match self {
            Precision::Nanoseconds => 1,
            Precision::Microseconds => 1_000,
            Precision::Milliseconds => 1_000_000,
            Precision::Seconds => 1_000_000_000,
        }
    }

    /// The value for the `precision` query parameter of the write API
    pub fn query_value(self) -> &'static str {
        match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "us",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
        }
    }

    /// Convert nanoseconds since the unix epoch to a count of this unit.
    ///
    /// Timestamps that are not an exact multiple of the unit are handled by `strategy`.
    /// Floor and ceiling follow the number line, so pre-epoch values floor towards
    /// negative infinity.
    pub fn resolve(
        self,
        nanoseconds: i64,
        strategy: PrecisionResolutionStrategy,
    ) -> Result<i64, LineProtocolError> {
        let divisor = self.divisor();
        let remainder = nanoseconds.rem_euclid(divisor);
        if remainder == 0 {
            return Ok(nanoseconds / divisor);
        }

        match strategy {
            PrecisionResolutionStrategy::Error => Err(LineProtocolError::out_of_range(format!(
                "timestamp {nanoseconds}ns is not a multiple of {divisor}ns"
            ))),
            PrecisionResolutionStrategy::Floor => Ok(nanoseconds.div_euclid(divisor)),
            PrecisionResolutionStrategy::Ceiling => Ok(nanoseconds.div_euclid(divisor) + 1),
            PrecisionResolutionStrategy::Round => {
                if remainder < divisor / 2 {
                    self.resolve(nanoseconds, PrecisionResolutionStrategy::Floor)
                } else {
                    self.resolve(nanoseconds, PrecisionResolutionStrategy::Ceiling)
                }
            }
        }
    }
}

impl TryFrom<i64> for Precision {
    type Error = LineProtocolError;

    fn try_from(divisor: i64) -> Result<Self, Self::Error> {
        match divisor {
            1 => Ok(Precision::Nanoseconds),
            1_000 => Ok(Precision::Microseconds),
            1_000_000 => Ok(Precision::Milliseconds),
            1_000_000_000 => Ok(Precision::Seconds),
            _ => Err(LineProtocolError::out_of_range(format!(
                "no timestamp precision has divisor {divisor}"
            ))),
        }
    }
}

impl FromStr for Precision {
    type Err = LineProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ns" | "nanosecond" | "nanoseconds" => Ok(Precision::Nanoseconds),
            "us" | "µs" | "microsecond" | "microseconds" => Ok(Precision::Microseconds),
            "ms" | "millisecond" | "milliseconds" => Ok(Precision::Milliseconds),
            "s" | "second" | "seconds" => Ok(Precision::Seconds),
            _ => Err(LineProtocolError::out_of_range(format!(
                "invalid timestamp precision: {s}"
            ))),
        }
    }
}

/// What to do with a timestamp that doesn't divide evenly into the precision unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrecisionResolutionStrategy {
    #[default]
    Error,
    Floor,
    Ceiling,
    /// Half up to the nearest unit
    Round,
}

impl FromStr for PrecisionResolutionStrategy {
    type Err = LineProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" | "reject" => Ok(PrecisionResolutionStrategy::Error),
            "floor" => Ok(PrecisionResolutionStrategy::Floor),
            "ceiling" | "ceil" => Ok(PrecisionResolutionStrategy::Ceiling),
            "round" => Ok(PrecisionResolutionStrategy::Round),
            _ => Err(LineProtocolError::out_of_range(format!(
                "invalid precision resolution strategy: {s}"
            ))),
        }
    }
}
