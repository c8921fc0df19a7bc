/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod error;
pub use error::LineProtocolError;

mod escape;
pub use escape::{escape_name, escape_string_value};

mod precision;
pub use precision::{Precision, PrecisionResolutionStrategy, unix_nanos};

mod value;
pub use value::{AsString, DynValue, FormatFn, LineValue, lookup};

mod writer;
pub use writer::{LinePosition, LineWriter};

mod point;
pub use point::{
    FieldSet, LinePoint, Measure, MeasurePoint, Point, PointBuilder, TypedMeasure, TypedPoint,
};

mod payload;
pub use payload::Payload;

mod config;
pub use config::WriterConfig;
