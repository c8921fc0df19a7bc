/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use crate::{LineProtocolError, LineWriter};

mod dynamic;
pub use dynamic::{Point, PointBuilder};

mod measure;
pub use measure::{Measure, MeasurePoint};

mod typed;
pub use typed::{FieldSet, TypedMeasure, TypedPoint};

/// Something that can be written as a single line
pub trait LinePoint {
    /// Write the measurement, tags, fields and timestamp of this point.
    ///
    /// The line terminator is not written.
    fn format_line(&self, writer: &mut LineWriter<&mut Vec<u8>>) -> Result<(), LineProtocolError>;
}

impl<P: LinePoint + ?Sized> LinePoint for &P {
    fn format_line(&self, writer: &mut LineWriter<&mut Vec<u8>>) -> Result<(), LineProtocolError> {
        (**self).format_line(writer)
    }
}

impl<P: LinePoint + ?Sized> LinePoint for Box<P> {
    fn format_line(&self, writer: &mut LineWriter<&mut Vec<u8>>) -> Result<(), LineProtocolError> {
        (**self).format_line(writer)
    }
}

impl<P: LinePoint + ?Sized> LinePoint for Arc<P> {
    fn format_line(&self, writer: &mut LineWriter<&mut Vec<u8>>) -> Result<(), LineProtocolError> {
        (**self).format_line(writer)
    }
}
