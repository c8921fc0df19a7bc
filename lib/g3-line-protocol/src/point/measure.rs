/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use smallvec::SmallVec;

use super::LinePoint;
use crate::escape::escape_name;
use crate::{DynValue, LineProtocolError, LineWriter};

pub(super) type TagValues = SmallVec<[String; 4]>;

/// Metadata shared by all points of the same series shape.
///
/// Field and tag keys are checked and escaped once here, and tag keys are kept
/// sorted, so points bound to a measure only carry their values.
#[derive(Debug)]
pub struct Measure {
    measurement: String,
    field_keys: Box<[String]>,
    /// sorted by the raw name
    tag_names: Box<[String]>,
    tag_keys: Box<[String]>,
}

impl Measure {
    pub fn new<I, S>(measurement: &str, field_names: I) -> Result<Arc<Self>, LineProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Measure::with_tags(measurement, field_names, std::iter::empty::<&str>())
    }

    /// Declare the tag names of this measure.
    ///
    /// Tag names are sorted, and tag values of points are matched by position to
    /// the sorted names, see [`tag_names`](Self::tag_names).
    pub fn with_tags<I, S, T, N>(
        measurement: &str,
        field_names: I,
        tag_names: T,
    ) -> Result<Arc<Self>, LineProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        T: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        if measurement.is_empty() {
            return Err(LineProtocolError::invalid_argument(
                "measurement name required",
            ));
        }

        let mut field_keys = Vec::new();
        for name in field_names {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(LineProtocolError::invalid_argument(
                    "fields must have non-empty names",
                ));
            }
            field_keys.push(escape_name(name).into_owned());
        }
        if field_keys.is_empty() {
            return Err(LineProtocolError::invalid_argument(
                "at least one field must be specified",
            ));
        }

        let mut tag_names = tag_names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect::<Vec<_>>();
        if tag_names.iter().any(|name| name.is_empty()) {
            return Err(LineProtocolError::invalid_argument(
                "tags must have non-empty names",
            ));
        }
        tag_names.sort();
        let tag_keys = tag_names
            .iter()
            .map(|name| escape_name(name).into_owned())
            .collect();

        Ok(Arc::new(Measure {
            measurement: measurement.to_string(),
            field_keys: field_keys.into_boxed_slice(),
            tag_names: tag_names.into_boxed_slice(),
            tag_keys,
        }))
    }

    #[inline]
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.field_keys.len()
    }

    #[inline]
    pub fn tag_count(&self) -> usize {
        self.tag_keys.len()
    }

    /// The tag names in the order tag values of points are matched to
    #[inline]
    pub fn tag_names(&self) -> &[String] {
        &self.tag_names
    }

    #[inline]
    pub(super) fn field_keys(&self) -> &[String] {
        &self.field_keys
    }

    /// Create a point of a measure declared without tags
    pub fn point<I>(self: &Arc<Self>, field_values: I) -> Result<MeasurePoint, LineProtocolError>
    where
        I: IntoIterator,
        I::Item: Into<DynValue>,
    {
        self.point_with_tags(field_values, std::iter::empty::<&str>())
    }

    /// Create a point, both field values and tag values are positional.
    ///
    /// Field values follow the declared field names, tag values follow the sorted
    /// tag names. An empty tag value means the tag is absent for this point.
    pub fn point_with_tags<I, T, S>(
        self: &Arc<Self>,
        field_values: I,
        tag_values: T,
    ) -> Result<MeasurePoint, LineProtocolError>
    where
        I: IntoIterator,
        I::Item: Into<DynValue>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field_values = field_values
            .into_iter()
            .map(Into::into)
            .collect::<SmallVec<[DynValue; 4]>>();
        if field_values.len() != self.field_keys.len() {
            return Err(LineProtocolError::invalid_argument(format!(
                "the number of field values specified ({}) is different from the number of fields declared in the measure ({})",
                field_values.len(),
                self.field_keys.len()
            )));
        }
        let tag_values = self.collect_tag_values(tag_values)?;

        Ok(MeasurePoint {
            measure: Arc::clone(self),
            field_values,
            tag_values,
            timestamp: None,
        })
    }

    pub(super) fn collect_tag_values<T, S>(
        &self,
        tag_values: T,
    ) -> Result<TagValues, LineProtocolError>
    where
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tag_values = tag_values
            .into_iter()
            .map(Into::into)
            .collect::<TagValues>();
        if tag_values.len() != self.tag_keys.len() {
            return Err(LineProtocolError::invalid_argument(format!(
                "the number of tag values specified ({}) is different from the number of tags declared in the measure ({})",
                tag_values.len(),
                self.tag_keys.len()
            )));
        }
        Ok(tag_values)
    }

    /// Write the measurement name and the tags
    pub(super) fn format_head(
        &self,
        writer: &mut LineWriter<&mut Vec<u8>>,
        tag_values: &[String],
    ) -> Result<(), LineProtocolError> {
        writer.measurement(&self.measurement)?;
        for (key, value) in self.tag_keys.iter().zip(tag_values) {
            writer.tag_escaped_key(key, value)?;
        }
        Ok(())
    }
}

/// A point bound to a [`Measure`], holding only its values
#[derive(Clone, Debug)]
pub struct MeasurePoint {
    measure: Arc<Measure>,
    field_values: SmallVec<[DynValue; 4]>,
    tag_values: TagValues,
    timestamp: Option<i64>,
}

impl MeasurePoint {
    /// Set the timestamp, which must be in UTC
    pub fn with_timestamp<Tz: TimeZone>(
        mut self,
        datetime: &DateTime<Tz>,
    ) -> Result<Self, LineProtocolError> {
        self.timestamp = Some(crate::unix_nanos(datetime)?);
        Ok(self)
    }

    /// Set the timestamp as nanoseconds since the unix epoch
    pub fn with_timestamp_nanos(mut self, nanoseconds: i64) -> Self {
        self.timestamp = Some(nanoseconds);
        self
    }

    #[inline]
    pub fn measure(&self) -> &Arc<Measure> {
        &self.measure
    }

    #[inline]
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

impl LinePoint for MeasurePoint {
    fn format_line(&self, writer: &mut LineWriter<&mut Vec<u8>>) -> Result<(), LineProtocolError> {
        self.measure.format_head(writer, &self.tag_values)?;
        for (key, value) in self.measure.field_keys().iter().zip(&self.field_values) {
            writer.field_escaped_key(key, value)?;
        }
        if let Some(ns) = self.timestamp {
            writer.timestamp(ns)?;
        }
        Ok(())
    }
}
