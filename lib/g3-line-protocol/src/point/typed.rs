/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, TimeZone};

use super::measure::TagValues;
use super::{LinePoint, Measure};
use crate::{LineProtocolError, LineValue, LineWriter};

/// A fixed set of field values, written in declaration order
pub trait FieldSet {
    const LEN: usize;

    fn write_fields(
        &self,
        escaped_keys: &[String],
        writer: &mut LineWriter<&mut Vec<u8>>,
    ) -> Result<(), LineProtocolError>;
}

macro_rules! impl_field_set {
    ($len:literal; $($t:ident $i:tt),+) => {
        impl<$($t: LineValue),+> FieldSet for ($($t,)+) {
            const LEN: usize = $len;

            fn write_fields(
                &self,
                escaped_keys: &[String],
                writer: &mut LineWriter<&mut Vec<u8>>,
            ) -> Result<(), LineProtocolError> {
                $(writer.field_escaped_key(&escaped_keys[$i], &self.$i)?;)+
                Ok(())
            }
        }
    };
}

impl_field_set!(1; A 0);
impl_field_set!(2; A 0, B 1);
impl_field_set!(3; A 0, B 1, C 2);
impl_field_set!(4; A 0, B 1, C 2, D 3);
impl_field_set!(5; A 0, B 1, C 2, D 3, E 4);
impl_field_set!(6; A 0, B 1, C 2, D 3, E 4, G 5);

/// A [`Measure`] whose field value types are fixed at compile time.
///
/// Values are formatted with static dispatch, no type lookup happens when writing.
pub struct TypedMeasure<F> {
    measure: Arc<Measure>,
    _fields: PhantomData<fn() -> F>,
}

impl<F> Clone for TypedMeasure<F> {
    fn clone(&self) -> Self {
        TypedMeasure {
            measure: Arc::clone(&self.measure),
            _fields: PhantomData,
        }
    }
}

impl<F: FieldSet> TypedMeasure<F> {
    pub fn new<I, S>(measurement: &str, field_names: I) -> Result<Self, LineProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TypedMeasure::from_measure(Measure::new(measurement, field_names)?)
    }

    pub fn with_tags<I, S, T, N>(
        measurement: &str,
        field_names: I,
        tag_names: T,
    ) -> Result<Self, LineProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        T: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        TypedMeasure::from_measure(Measure::with_tags(measurement, field_names, tag_names)?)
    }

    fn from_measure(measure: Arc<Measure>) -> Result<Self, LineProtocolError> {
        if measure.field_count() != F::LEN {
            return Err(LineProtocolError::invalid_argument(format!(
                "{} field names declared for a measure of {} field values",
                measure.field_count(),
                F::LEN
            )));
        }
        Ok(TypedMeasure {
            measure,
            _fields: PhantomData,
        })
    }

    #[inline]
    pub fn measure(&self) -> &Arc<Measure> {
        &self.measure
    }

    pub fn point(&self, fields: F) -> Result<TypedPoint<F>, LineProtocolError> {
        self.point_with_tags(fields, std::iter::empty::<&str>())
    }

    pub fn point_with_tags<T, S>(
        &self,
        fields: F,
        tag_values: T,
    ) -> Result<TypedPoint<F>, LineProtocolError>
    where
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tag_values = self.measure.collect_tag_values(tag_values)?;
        Ok(TypedPoint {
            measure: Arc::clone(&self.measure),
            fields,
            tag_values,
            timestamp: None,
        })
    }
}

/// A point of a [`TypedMeasure`]
#[derive(Clone, Debug)]
pub struct TypedPoint<F> {
    measure: Arc<Measure>,
    fields: F,
    tag_values: TagValues,
    timestamp: Option<i64>,
}

impl<F> TypedPoint<F> {
    pub fn with_timestamp<Tz: TimeZone>(
        mut self,
        datetime: &DateTime<Tz>,
    ) -> Result<Self, LineProtocolError> {
        self.timestamp = Some(crate::unix_nanos(datetime)?);
        Ok(self)
    }

    pub fn with_timestamp_nanos(mut self, nanoseconds: i64) -> Self {
        self.timestamp = Some(nanoseconds);
        self
    }

    #[inline]
    pub fn fields(&self) -> &F {
        &self.fields
    }

    #[inline]
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

impl<F: FieldSet> LinePoint for TypedPoint<F> {
    fn format_line(&self, writer: &mut LineWriter<&mut Vec<u8>>) -> Result<(), LineProtocolError> {
        self.measure.format_head(writer, &self.tag_values)?;
        self.fields.write_fields(self.measure.field_keys(), writer)?;
        if let Some(ns) = self.timestamp {
            writer.timestamp(ns)?;
        }
        Ok(())
    }
}
