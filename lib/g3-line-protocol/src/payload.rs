/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use crate::{LinePoint, LineProtocolError, LineWriter, WriterConfig};

/// An ordered batch of points, each formatted as one line.
///
/// Every line, the last one included, is terminated with `\n`.
#[derive(Default)]
pub struct Payload {
    points: Vec<Box<dyn LinePoint + Send>>,
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("points", &self.points.len())
            .finish()
    }
}

impl Payload {
    pub fn new() -> Self {
        Payload::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Payload {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn add<P: LinePoint + Send + 'static>(&mut self, point: P) -> &mut Self {
        self.points.push(Box::new(point));
        self
    }

    pub fn add_boxed(&mut self, point: Box<dyn LinePoint + Send>) -> &mut Self {
        self.points.push(point);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn LinePoint + Send)> {
        self.points.iter().map(|p| p.as_ref())
    }

    /// Append all lines to `buf`, timestamps in nanoseconds.
    ///
    /// On error, the lines of the points before the failing one and the partial
    /// line of the failing point are left in `buf`.
    pub fn format(&self, buf: &mut Vec<u8>) -> Result<(), LineProtocolError> {
        self.format_with(buf, &WriterConfig::default())
    }

    pub fn format_with(
        &self,
        buf: &mut Vec<u8>,
        config: &WriterConfig,
    ) -> Result<(), LineProtocolError> {
        for point in &self.points {
            let mut writer = LineWriter::with_buffer(&mut *buf, config);
            point.format_line(&mut writer)?;
            buf.push(b'\n');
        }
        Ok(())
    }

    /// Format all lines into a new buffer, nothing is returned on error
    pub fn to_bytes(&self, config: &WriterConfig) -> Result<Vec<u8>, LineProtocolError> {
        let mut buf = Vec::with_capacity(self.points.len() * 64);
        self.format_with(&mut buf, config)?;
        Ok(buf)
    }
}

impl<P: LinePoint + Send + 'static> Extend<P> for Payload {
    fn extend<T: IntoIterator<Item = P>>(&mut self, iter: T) {
        for p in iter {
            self.add(p);
        }
    }
}

impl<P: LinePoint + Send + 'static> FromIterator<P> for Payload {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        let mut payload = Payload::new();
        payload.extend(iter);
        payload
    }
}
