/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::borrow::Cow;
use std::fmt::{self, Display, Write};
use std::io;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::escape::{write_escaped_string, write_quoted_string};

mod registry;
pub use registry::{DynValue, FormatFn, lookup};

/// A value that can be written as a line protocol field value.
///
/// Integers get a trailing `i`, floats and decimals are written as is, booleans
/// as `t` / `f`, and strings are quoted.
pub trait LineValue {
    fn write_value(&self, buf: &mut Vec<u8>);
}

macro_rules! impl_integer {
    ($($t:ty),+) => {
        $(
            impl LineValue for $t {
                fn write_value(&self, buf: &mut Vec<u8>) {
                    let mut b = itoa::Buffer::new();
                    buf.extend_from_slice(b.format(*self).as_bytes());
                    buf.push(b'i');
                }
            }
        )+
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

fn write_float<F: ryu::Float>(buf: &mut Vec<u8>, v: F) {
    let mut b = ryu::Buffer::new();
    let s = b.format(v);
    // integral values are written without the fraction part
    let s = s.strip_suffix(".0").unwrap_or(s);
    buf.extend_from_slice(s.as_bytes());
}

impl LineValue for f32 {
    fn write_value(&self, buf: &mut Vec<u8>) {
        write_float(buf, *self);
    }
}

impl LineValue for f64 {
    fn write_value(&self, buf: &mut Vec<u8>) {
        write_float(buf, *self);
    }
}

impl LineValue for Decimal {
    fn write_value(&self, buf: &mut Vec<u8>) {
        let _ = io::Write::write_fmt(buf, format_args!("{self}"));
    }
}

impl LineValue for bool {
    fn write_value(&self, buf: &mut Vec<u8>) {
        buf.push(if *self { b't' } else { b'f' });
    }
}

impl LineValue for str {
    fn write_value(&self, buf: &mut Vec<u8>) {
        write_quoted_string(buf, self);
    }
}

impl LineValue for String {
    fn write_value(&self, buf: &mut Vec<u8>) {
        write_quoted_string(buf, self);
    }
}

impl LineValue for Cow<'_, str> {
    fn write_value(&self, buf: &mut Vec<u8>) {
        write_quoted_string(buf, self);
    }
}

/// Written as total milliseconds, with neither a suffix nor quotes.
///
/// This doesn't match the integer / float distinction used elsewhere, but it is
/// what existing consumers of the data expect to see.
impl LineValue for Duration {
    fn write_value(&self, buf: &mut Vec<u8>) {
        let mut b = itoa::Buffer::new();
        buf.extend_from_slice(b.format(self.as_millis()).as_bytes());

        let sub_millis = self.subsec_nanos() % 1_000_000;
        if sub_millis == 0 {
            return;
        }
        let mut digits = [b'0'; 6];
        let mut v = sub_millis;
        for d in digits.iter_mut().rev() {
            *d = b'0' + (v % 10) as u8;
            v /= 10;
        }
        let len = digits.iter().rposition(|d| *d != b'0').unwrap_or(0) + 1;
        buf.push(b'.');
        buf.extend_from_slice(&digits[..len]);
    }
}

/// An absent value is written as an empty string
impl<T: LineValue> LineValue for Option<T> {
    fn write_value(&self, buf: &mut Vec<u8>) {
        match self {
            Some(v) => v.write_value(buf),
            None => buf.extend_from_slice(b"\"\""),
        }
    }
}

impl<T: LineValue + ?Sized> LineValue for &T {
    fn write_value(&self, buf: &mut Vec<u8>) {
        (**self).write_value(buf)
    }
}

/// Write any [`Display`] type as a string field value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsString<T>(pub T);

impl<T: Display> LineValue for AsString<T> {
    fn write_value(&self, buf: &mut Vec<u8>) {
        write_display_quoted(buf, &self.0);
    }
}

struct EscapedStringWriter<'a>(&'a mut Vec<u8>);

impl Write for EscapedStringWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_escaped_string(self.0, s);
        Ok(())
    }
}

pub(crate) fn write_display_quoted<T: Display + ?Sized>(buf: &mut Vec<u8>, v: &T) {
    buf.push(b'"');
    let _ = write!(EscapedStringWriter(&mut *buf), "{v}");
    buf.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn fmt<V: LineValue + ?Sized>(v: &V) -> String {
        let mut buf = Vec::new();
        v.write_value(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn integer() {
        assert_eq!(fmt(&0i32), "0i");
        assert_eq!(fmt(&48567i32), "48567i");
        assert_eq!(fmt(&-451i32), "-451i");
        assert_eq!(fmt(&45u8), "45i");
        assert_eq!(fmt(&255u8), "255i");
        assert_eq!(fmt(&18013i16), "18013i");
        assert_eq!(fmt(&-2487i16), "-2487i");
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(fmt(&i8::MIN), "-128i");
        assert_eq!(fmt(&i8::MAX), "127i");
        assert_eq!(fmt(&u16::MAX), "65535i");
        assert_eq!(fmt(&u32::MAX), "4294967295i");
        assert_eq!(fmt(&i64::MIN), "-9223372036854775808i");
        assert_eq!(fmt(&i64::MAX), "9223372036854775807i");
        assert_eq!(fmt(&u64::MIN), "0i");
        assert_eq!(fmt(&u64::MAX), "18446744073709551615i");
    }

    #[test]
    fn float() {
        assert_eq!(fmt(&1.5f64), "1.5");
        assert_eq!(fmt(&1.0f64), "1");
        assert_eq!(fmt(&0.0f32), "0");
        assert_eq!(fmt(&-4194.6f64), "-4194.6");
        assert_eq!(fmt(&0.1f32), "0.1");
        assert!(!fmt(&f32::MAX).ends_with('i'));
        assert!(!fmt(&f64::MIN).ends_with('i'));
    }

    #[test]
    fn decimal() {
        assert_eq!(fmt(&Decimal::from(45)), "45");
        assert_eq!(fmt(&Decimal::from_str("-4194.6").unwrap()), "-4194.6");
    }

    #[test]
    fn boolean() {
        let mut buf = Vec::new();
        true.write_value(&mut buf);
        false.write_value(&mut buf);
        assert_eq!(buf.as_slice(), b"tf");
    }

    #[test]
    fn string() {
        assert_eq!(fmt("Hello World!"), "\"Hello World!\"");
        assert_eq!(fmt("Hello \"World\"!"), "\"Hello \\\"World\\\"!\"");
        assert_eq!(fmt(&String::from("a=b, c")), "\"a=b, c\"");
        assert_eq!(fmt(&None::<String>), "\"\"");
        assert_eq!(fmt(&Some("x")), "\"x\"");
    }

    #[test]
    fn duration() {
        assert_eq!(fmt(&Duration::from_secs(10)), "10000");
        assert_eq!(fmt(&Duration::from_micros(1500)), "1.5");
        assert_eq!(fmt(&Duration::from_nanos(1)), "0.000001");
        assert_eq!(fmt(&Duration::ZERO), "0");
    }

    #[test]
    fn display() {
        struct Custom(&'static str);

        impl Display for Custom {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "MyValue {}", self.0)
            }
        }

        assert_eq!(fmt(&AsString(Custom("Hello"))), "\"MyValue Hello\"");
        assert_eq!(fmt(&AsString(Custom("\"q\""))), "\"MyValue \\\"q\\\"\"");
        assert_eq!(fmt(&AsString('c')), "\"c\"");
    }
}
