/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, TimeZone};

use super::LinePoint;
use crate::{DynValue, LineProtocolError, LineWriter};

/// A point carrying its own measurement name, tag keys and field keys.
///
/// This is the most flexible point type, but every key is stored and escaped per
/// point. Use [`Measure`](crate::Measure) to share them between points.
#[derive(Clone, Debug)]
pub struct Point {
    measurement: String,
    /// sorted by key
    tags: Vec<(String, String)>,
    fields: Vec<(String, DynValue)>,
    timestamp: Option<i64>,
}

impl Point {
    pub fn builder<S: Into<String>>(measurement: S) -> PointBuilder {
        PointBuilder {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: Ok(None),
        }
    }

    #[inline]
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &DynValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Nanoseconds since the unix epoch
    #[inline]
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

impl LinePoint for Point {
    fn format_line(&self, writer: &mut LineWriter<&mut Vec<u8>>) -> Result<(), LineProtocolError> {
        writer.measurement(&self.measurement)?;
        for (key, value) in &self.tags {
            writer.tag(key, value)?;
        }
        for (key, value) in &self.fields {
            writer.field(key, value)?;
        }
        if let Some(ns) = self.timestamp {
            writer.timestamp(ns)?;
        }
        Ok(())
    }
}

/// Collects the parts of a [`Point`], all checks are done in [`build`](Self::build)
pub struct PointBuilder {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, DynValue)>,
    timestamp: Result<Option<i64>, LineProtocolError>,
}

impl PointBuilder {
    /// Add a tag, tags with empty values are not written
    pub fn tag<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Add a tag that may be absent
    pub fn tag_opt<K: Into<String>, V: Into<String>>(self, key: K, value: Option<V>) -> Self {
        match value {
            Some(v) => self.tag(key, v),
            None => self.tag(key, String::new()),
        }
    }

    pub fn tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn field<K: Into<String>, V: Into<DynValue>>(mut self, key: K, value: V) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DynValue>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the timestamp, which must be in UTC
    pub fn timestamp<Tz: TimeZone>(mut self, datetime: &DateTime<Tz>) -> Self {
        self.timestamp = crate::unix_nanos(datetime).map(Some);
        self
    }

    /// Set the timestamp as nanoseconds since the unix epoch
    pub fn timestamp_nanos(mut self, nanoseconds: i64) -> Self {
        self.timestamp = Ok(Some(nanoseconds));
        self
    }

    pub fn build(self) -> Result<Point, LineProtocolError> {
        if self.measurement.is_empty() {
            return Err(LineProtocolError::invalid_argument(
                "measurement name required",
            ));
        }
        if self.fields.is_empty() {
            return Err(LineProtocolError::invalid_argument(
                "at least one field must be specified",
            ));
        }
        if self.fields.iter().any(|(k, _)| k.is_empty()) {
            return Err(LineProtocolError::invalid_argument(
                "fields must have non-empty names",
            ));
        }
        if self.tags.iter().any(|(k, _)| k.is_empty()) {
            return Err(LineProtocolError::invalid_argument(
                "tags must have non-empty names",
            ));
        }
        let timestamp = self.timestamp?;

        let mut tags = self.tags;
        tags.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Point {
            measurement: self.measurement,
            tags,
            fields: self.fields,
            timestamp,
        })
    }
}
