/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::borrow::BorrowMut;
use std::time::Duration;

use chrono::{DateTime, TimeZone};

use crate::escape::write_escaped_name;
use crate::{
    LinePoint, LineProtocolError, LineValue, Precision, PrecisionResolutionStrategy, WriterConfig,
};

/// Where the writer is in the current line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinePosition {
    Start,
    MeasurementWritten,
    TagWritten,
    FieldWritten,
    TimestampWritten,
}

/// A line protocol encoder enforcing the token order of each line:
///
/// measurement, zero or more tags, one or more fields, an optional timestamp.
///
/// Starting a new measurement after a complete line writes the line terminator first.
/// No terminator is written after the last line.
///
/// Calling the methods out of order returns [`LineProtocolError::InvalidState`],
/// which should be treated as a bug in the caller.
#[derive(Debug)]
pub struct LineWriter<B = Vec<u8>> {
    buf: B,
    precision: Precision,
    resolution_strategy: PrecisionResolutionStrategy,
    position: LinePosition,
}

impl LineWriter<Vec<u8>> {
    pub fn new() -> Self {
        LineWriter::with_config(&WriterConfig::default())
    }

    pub fn with_config(config: &WriterConfig) -> Self {
        LineWriter::with_buffer(Vec::new(), config)
    }
}

impl Default for LineWriter<Vec<u8>> {
    fn default() -> Self {
        LineWriter::new()
    }
}

impl<B: BorrowMut<Vec<u8>>> LineWriter<B> {
    /// Append to `buf`, which may be a `Vec<u8>` or a `&mut Vec<u8>`
    pub fn with_buffer(buf: B, config: &WriterConfig) -> Self {
        LineWriter {
            buf,
            precision: config.precision,
            resolution_strategy: config.resolution_strategy,
            position: LinePosition::Start,
        }
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    #[inline]
    pub fn resolution_strategy(&self) -> PrecisionResolutionStrategy {
        self.resolution_strategy
    }

    #[inline]
    pub fn position(&self) -> LinePosition {
        self.position
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        let buf: &Vec<u8> = self.buf.borrow();
        buf.as_slice()
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    #[inline]
    fn buf_mut(&mut self) -> &mut Vec<u8> {
        self.buf.borrow_mut()
    }

    pub fn measurement(&mut self, name: &str) -> Result<&mut Self, LineProtocolError> {
        if name.is_empty() {
            return Err(LineProtocolError::invalid_argument(
                "measurement name required",
            ));
        }
        match self.position {
            LinePosition::Start => {}
            LinePosition::FieldWritten | LinePosition::TimestampWritten => {
                self.buf_mut().push(b'\n')
            }
            p => {
                return Err(LineProtocolError::invalid_state(
                    p,
                    format!(
                        "cannot write measurement {name} as no field written for current line"
                    ),
                ));
            }
        }

        write_escaped_name(self.buf_mut(), name);
        self.position = LinePosition::MeasurementWritten;
        Ok(self)
    }

    /// Write a tag, an empty value means the tag is absent and nothing is written
    pub fn tag(&mut self, key: &str, value: &str) -> Result<&mut Self, LineProtocolError> {
        self.check_tag(key)?;
        if !value.is_empty() {
            let buf = self.buf_mut();
            buf.push(b',');
            write_escaped_name(buf, key);
            buf.push(b'=');
            write_escaped_name(buf, value);
            self.position = LinePosition::TagWritten;
        }
        Ok(self)
    }

    pub(crate) fn tag_escaped_key(
        &mut self,
        escaped_key: &str,
        value: &str,
    ) -> Result<&mut Self, LineProtocolError> {
        self.check_tag(escaped_key)?;
        if !value.is_empty() {
            let buf = self.buf_mut();
            buf.push(b',');
            buf.extend_from_slice(escaped_key.as_bytes());
            buf.push(b'=');
            write_escaped_name(buf, value);
            self.position = LinePosition::TagWritten;
        }
        Ok(self)
    }

    fn check_tag(&self, key: &str) -> Result<(), LineProtocolError> {
        if key.is_empty() {
            return Err(LineProtocolError::invalid_argument("tag key required"));
        }
        match self.position {
            LinePosition::MeasurementWritten | LinePosition::TagWritten => Ok(()),
            LinePosition::Start => Err(LineProtocolError::invalid_state(
                self.position,
                format!("cannot write tag {key} as no measurement name written"),
            )),
            p => Err(LineProtocolError::invalid_state(
                p,
                format!("cannot write tag {key} as field(s) already written for current line"),
            )),
        }
    }

    pub fn field<V: LineValue + ?Sized>(
        &mut self,
        key: &str,
        value: &V,
    ) -> Result<&mut Self, LineProtocolError> {
        let delimiter = self.field_delimiter(key)?;
        let buf = self.buf_mut();
        buf.push(delimiter);
        write_escaped_name(buf, key);
        buf.push(b'=');
        value.write_value(buf);
        self.position = LinePosition::FieldWritten;
        Ok(self)
    }

    pub(crate) fn field_escaped_key<V: LineValue + ?Sized>(
        &mut self,
        escaped_key: &str,
        value: &V,
    ) -> Result<&mut Self, LineProtocolError> {
        let delimiter = self.field_delimiter(escaped_key)?;
        let buf = self.buf_mut();
        buf.push(delimiter);
        buf.extend_from_slice(escaped_key.as_bytes());
        buf.push(b'=');
        value.write_value(buf);
        self.position = LinePosition::FieldWritten;
        Ok(self)
    }

    fn field_delimiter(&self, key: &str) -> Result<u8, LineProtocolError> {
        if key.is_empty() {
            return Err(LineProtocolError::invalid_argument("field key required"));
        }
        match self.position {
            LinePosition::MeasurementWritten | LinePosition::TagWritten => Ok(b' '),
            LinePosition::FieldWritten => Ok(b','),
            LinePosition::Start => Err(LineProtocolError::invalid_state(
                self.position,
                format!("cannot write field {key} as no measurement name written"),
            )),
            LinePosition::TimestampWritten => Err(LineProtocolError::invalid_state(
                self.position,
                format!("cannot write field {key} as timestamp already written"),
            )),
        }
    }

    /// Write the timestamp, with the default resolution strategy of this writer
    pub fn timestamp(&mut self, nanoseconds: i64) -> Result<&mut Self, LineProtocolError> {
        self.timestamp_with(nanoseconds, self.resolution_strategy)
    }

    pub fn timestamp_with(
        &mut self,
        nanoseconds: i64,
        strategy: PrecisionResolutionStrategy,
    ) -> Result<&mut Self, LineProtocolError> {
        match self.position {
            LinePosition::FieldWritten => {}
            LinePosition::Start => {
                return Err(LineProtocolError::invalid_state(
                    self.position,
                    "cannot write timestamp as no measurement name written",
                ));
            }
            p => {
                return Err(LineProtocolError::invalid_state(
                    p,
                    "cannot write timestamp as no field written for current line",
                ));
            }
        }

        let timestamp = self.precision.resolve(nanoseconds, strategy)?;
        let buf = self.buf_mut();
        buf.push(b' ');
        let mut b = itoa::Buffer::new();
        buf.extend_from_slice(b.format(timestamp).as_bytes());
        self.position = LinePosition::TimestampWritten;
        Ok(self)
    }

    /// Write the timestamp given as the time elapsed since the unix epoch
    pub fn timestamp_duration(
        &mut self,
        since_epoch: Duration,
    ) -> Result<&mut Self, LineProtocolError> {
        let nanoseconds = i64::try_from(since_epoch.as_nanos()).map_err(|_| {
            LineProtocolError::out_of_range(format!(
                "timestamp {}s can not be represented in nanoseconds",
                since_epoch.as_secs()
            ))
        })?;
        self.timestamp(nanoseconds)
    }

    /// Write the timestamp of a UTC datetime, other offsets are rejected
    pub fn timestamp_datetime<Tz: TimeZone>(
        &mut self,
        datetime: &DateTime<Tz>,
    ) -> Result<&mut Self, LineProtocolError> {
        let nanoseconds = crate::unix_nanos(datetime)?;
        self.timestamp(nanoseconds)
    }

    /// Write a whole point, as the next line if this is not the first one
    pub fn point<P: LinePoint + ?Sized>(
        &mut self,
        point: &P,
    ) -> Result<&mut Self, LineProtocolError> {
        let mut line_writer = LineWriter {
            buf: BorrowMut::<Vec<u8>>::borrow_mut(&mut self.buf),
            precision: self.precision,
            resolution_strategy: self.resolution_strategy,
            position: self.position,
        };
        let r = point.format_line(&mut line_writer);
        let position = line_writer.position;
        self.position = position;
        r?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn single_line() {
        let mut w = LineWriter::new();
        w.measurement("example")
            .unwrap()
            .tag("colour", "red")
            .unwrap()
            .field("value", &1.5)
            .unwrap();
        assert_eq!(w.as_str(), Some("example,colour=red value=1.5"));
        assert_eq!(w.position(), LinePosition::FieldWritten);
    }

    #[test]
    fn fields_and_timestamp() {
        let mut w = LineWriter::new();
        w.measurement("cpu")
            .unwrap()
            .field("count", &42i64)
            .unwrap()
            .field("busy", &true)
            .unwrap()
            .field("host name", "a \"b\"")
            .unwrap()
            .timestamp(1_000_000_000)
            .unwrap();
        assert_eq!(
            w.as_str(),
            Some("cpu count=42i,busy=t,host\\ name=\"a \\\"b\\\"\" 1000000000")
        );
    }

    #[test]
    fn multiple_lines() {
        let mut w = LineWriter::new();
        w.measurement("a").unwrap().field("v", &1u8).unwrap();
        w.measurement("b")
            .unwrap()
            .field("v", &2u8)
            .unwrap()
            .timestamp(5)
            .unwrap();
        w.measurement("c").unwrap().field("v", &3u8).unwrap();
        assert_eq!(w.as_str(), Some("a v=1i\nb v=2i 5\nc v=3i"));
    }

    #[test]
    fn escaping() {
        let mut w = LineWriter::new();
        w.measurement("my measure,x")
            .unwrap()
            .tag("a=b", "c d")
            .unwrap()
            .field("e,f", "g=h")
            .unwrap();
        assert_eq!(w.as_str(), Some("my\\ measure\\,x,a\\=b=c\\ d e\\,f=\"g=h\""));
    }

    #[test]
    fn empty_tag_value() {
        let mut w = LineWriter::new();
        w.measurement("m").unwrap().tag("t", "").unwrap();
        assert_eq!(w.position(), LinePosition::MeasurementWritten);
        w.field("v", &1i32).unwrap();
        assert_eq!(w.as_str(), Some("m v=1i"));
    }

    #[test]
    fn field_without_tag() {
        let mut w = LineWriter::new();
        w.measurement("m").unwrap();
        assert!(w.field("v", &1i32).is_ok());
    }

    #[test]
    fn tag_after_field() {
        let mut w = LineWriter::new();
        w.measurement("m").unwrap().field("v", &1i32).unwrap();
        let e = w.tag("t", "x").unwrap_err();
        assert!(matches!(
            e,
            LineProtocolError::InvalidState {
                position: LinePosition::FieldWritten,
                ..
            }
        ));
        assert_eq!(w.as_str(), Some("m v=1i"));
    }

    #[test]
    fn invalid_order() {
        let mut w = LineWriter::new();
        assert!(w.tag("t", "x").unwrap_err().is_invalid_state());
        assert!(w.field("v", &1i32).unwrap_err().is_invalid_state());
        assert!(w.timestamp(0).unwrap_err().is_invalid_state());

        w.measurement("m").unwrap();
        assert!(w.measurement("n").unwrap_err().is_invalid_state());
        assert!(w.timestamp(0).unwrap_err().is_invalid_state());

        w.tag("t", "x").unwrap();
        assert!(w.measurement("n").unwrap_err().is_invalid_state());
        assert!(w.timestamp(0).unwrap_err().is_invalid_state());

        w.field("v", &1i32).unwrap().timestamp(0).unwrap();
        assert!(w.field("v", &1i32).unwrap_err().is_invalid_state());
        assert!(w.tag("t", "x").unwrap_err().is_invalid_state());
        assert!(w.timestamp(0).unwrap_err().is_invalid_state());
        assert_eq!(w.as_str(), Some("m,t=x v=1i 0"));
    }

    #[test]
    fn empty_names() {
        let mut w = LineWriter::new();
        assert!(w.measurement("").unwrap_err().is_invalid_argument());
        w.measurement("m").unwrap();
        assert!(w.tag("", "x").unwrap_err().is_invalid_argument());
        assert!(w.field("", &1i32).unwrap_err().is_invalid_argument());
        assert_eq!(w.as_str(), Some("m"));
    }

    #[test]
    fn precision() {
        let config = WriterConfig::new(Precision::Seconds, PrecisionResolutionStrategy::Error);
        let mut w = LineWriter::with_config(&config);
        w.measurement("m").unwrap().field("v", &1i32).unwrap();
        let e = w.timestamp(1_500_000_000).unwrap_err();
        assert!(e.is_out_of_range());
        assert_eq!(w.position(), LinePosition::FieldWritten);

        w.timestamp_with(1_500_000_000, PrecisionResolutionStrategy::Round)
            .unwrap();
        assert_eq!(w.as_str(), Some("m v=1i 2"));
    }

    #[test]
    fn default_strategy() {
        let config =
            WriterConfig::new(Precision::Milliseconds, PrecisionResolutionStrategy::Floor);
        let mut w = LineWriter::with_config(&config);
        w.measurement("m")
            .unwrap()
            .field("v", &1i32)
            .unwrap()
            .timestamp(1_999_999)
            .unwrap();
        assert_eq!(w.as_str(), Some("m v=1i 1"));
    }

    #[test]
    fn timestamp_forms() {
        let config = WriterConfig::new(Precision::Seconds, PrecisionResolutionStrategy::Error);
        let mut w = LineWriter::with_config(&config);
        w.measurement("m")
            .unwrap()
            .field("v", &1i32)
            .unwrap()
            .timestamp_duration(Duration::from_secs(10))
            .unwrap();
        let dt = Utc.with_ymd_and_hms(1970, 1, 1, 0, 1, 0).unwrap();
        w.measurement("m")
            .unwrap()
            .field("v", &2i32)
            .unwrap()
            .timestamp_datetime(&dt)
            .unwrap();
        assert_eq!(w.as_str(), Some("m v=1i 10\nm v=2i 60"));

        let dt = FixedOffset::west_opt(3600)
            .unwrap()
            .with_ymd_and_hms(1970, 1, 1, 0, 0, 0)
            .unwrap();
        w.measurement("m").unwrap().field("v", &3i32).unwrap();
        assert!(w.timestamp_datetime(&dt).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn debug_format() {
        let mut w = LineWriter::new();
        let e = w.field("v", &1i32).unwrap_err();
        assert!(e.is_invalid_state());
        w.measurement("m").unwrap().field("v", &1i32).unwrap();
        let s = format!("{w:?}");
        assert!(s.contains("FieldWritten"), "{s}");
        assert!(s.contains("Nanoseconds"), "{s}");
    }

    #[test]
    fn borrowed_buffer() {
        let mut buf = b"prefix\n".to_vec();
        let mut w = LineWriter::with_buffer(&mut buf, &WriterConfig::default());
        w.measurement("m").unwrap().field("v", &1i32).unwrap();
        assert_eq!(buf.as_slice(), b"prefix\nm v=1i");
    }
}
