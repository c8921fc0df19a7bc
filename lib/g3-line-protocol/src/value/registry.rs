/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use std::time::Duration;

use foldhash::fast::FixedState;
use log::debug;
use rust_decimal::Decimal;

use super::{LineValue, write_display_quoted};

/// A type erased value formatter
pub type FormatFn = fn(&dyn Any, &mut Vec<u8>);

type FormatterMap = HashMap<TypeId, FormatFn, FixedState>;

fn format_builtin<T: LineValue + Any>(v: &dyn Any, buf: &mut Vec<u8>) {
    match v.downcast_ref::<T>() {
        Some(v) => v.write_value(buf),
        None => buf.extend_from_slice(b"\"\""),
    }
}

fn format_display<T: Display + Any>(v: &dyn Any, buf: &mut Vec<u8>) {
    match v.downcast_ref::<T>() {
        Some(v) => write_display_quoted(buf, v),
        None => buf.extend_from_slice(b"\"\""),
    }
}

static BUILTIN_FORMATTERS: LazyLock<FormatterMap> = LazyLock::new(|| {
    let mut map = FormatterMap::with_hasher(FixedState::with_seed(0));

    macro_rules! register {
        ($($t:ty),+) => {
            $(
                map.insert(TypeId::of::<$t>(), format_builtin::<$t> as FormatFn);
            )+
        };
    }

    register!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
    register!(f32, f64, Decimal, bool, Duration);
    register!(String, &'static str, Cow<'static, str>);
    map
});

static FALLBACK_FORMATTERS: RwLock<FormatterMap> =
    RwLock::new(HashMap::with_hasher(FixedState::with_seed(0)));

/// Get the formatter for a type only known to be [`Display`].
///
/// Registered types are written with their line protocol representation, anything
/// else is written as a string field via its `Display` output. Formatters for the
/// latter are built on first use and cached.
pub fn lookup<T: Display + Any>() -> FormatFn {
    let id = TypeId::of::<T>();
    if let Some(f) = BUILTIN_FORMATTERS.get(&id) {
        return *f;
    }

    {
        let map = FALLBACK_FORMATTERS
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(f) = map.get(&id) {
            return *f;
        }
    }

    let mut map = FALLBACK_FORMATTERS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *map.entry(id).or_insert_with(|| {
        debug!("build string formatter for line value type {}", type_name::<T>());
        format_display::<T> as FormatFn
    })
}

/// Check if a fallback formatter has been built for this type
#[cfg(test)]
fn is_fallback_cached<T: Any>() -> bool {
    FALLBACK_FORMATTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&TypeId::of::<T>())
}

/// A field value whose type is only known at runtime
#[derive(Clone)]
pub struct DynValue {
    value: Option<Arc<dyn Any + Send + Sync>>,
    format: FormatFn,
    type_name: &'static str,
}

impl DynValue {
    /// Wrap a value whose line protocol representation is known statically
    pub fn new<T: LineValue + Any + Send + Sync>(value: T) -> Self {
        DynValue {
            value: Some(Arc::new(value)),
            format: format_builtin::<T>,
            type_name: type_name::<T>(),
        }
    }

    /// Wrap a value of any [`Display`] type, see [`lookup`]
    pub fn display<T: Display + Any + Send + Sync>(value: T) -> Self {
        DynValue {
            value: Some(Arc::new(value)),
            format: lookup::<T>(),
            type_name: type_name::<T>(),
        }
    }

    pub fn from_option<T: LineValue + Any + Send + Sync>(value: Option<T>) -> Self {
        match value {
            Some(v) => DynValue::new(v),
            None => DynValue::null(),
        }
    }

    /// An absent value, written as an empty string
    pub fn null() -> Self {
        DynValue {
            value: None,
            format: format_builtin::<String>,
            type_name: "null",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_ref().and_then(|v| v.downcast_ref::<T>())
    }
}

impl LineValue for DynValue {
    fn write_value(&self, buf: &mut Vec<u8>) {
        match &self.value {
            Some(v) => (self.format)(&**v, buf),
            None => buf.extend_from_slice(b"\"\""),
        }
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_value(&mut buf);
        f.debug_struct("DynValue")
            .field("type", &self.type_name)
            .field("value", &String::from_utf8_lossy(&buf))
            .finish()
    }
}

macro_rules! impl_from {
    ($($t:ty),+) => {
        $(
            impl From<$t> for DynValue {
                fn from(value: $t) -> Self {
                    DynValue::new(value)
                }
            }
        )+
    };
}

impl_from!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_from!(f32, f64, Decimal, bool, Duration, String, &'static str);

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::thread;

    fn fmt_dyn(v: &DynValue) -> String {
        let mut buf = Vec::new();
        v.write_value(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn builtin() {
        assert_eq!(fmt_dyn(&DynValue::from(42i64)), "42i");
        assert_eq!(fmt_dyn(&DynValue::from(1.5f64)), "1.5");
        assert_eq!(fmt_dyn(&DynValue::from(true)), "t");
        assert_eq!(fmt_dyn(&DynValue::from("a\"b")), "\"a\\\"b\"");
        assert_eq!(fmt_dyn(&DynValue::from(Duration::from_secs(1))), "1000");
    }

    #[test]
    fn display_registered() {
        assert_eq!(fmt_dyn(&DynValue::display(7u16)), "7i");
        assert_eq!(fmt_dyn(&DynValue::display(String::from("s"))), "\"s\"");
        assert!(!is_fallback_cached::<u16>());
    }

    #[test]
    fn display_fallback() {
        let v = DynValue::display(Ipv4Addr::LOCALHOST);
        assert_eq!(fmt_dyn(&v), "\"127.0.0.1\"");
        assert!(is_fallback_cached::<Ipv4Addr>());
        assert_eq!(v.downcast_ref::<Ipv4Addr>(), Some(&Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn null() {
        let v = DynValue::null();
        assert!(v.is_null());
        assert_eq!(fmt_dyn(&v), "\"\"");
        assert_eq!(fmt_dyn(&DynValue::from_option(None::<i64>)), "\"\"");
        assert_eq!(fmt_dyn(&DynValue::from_option(Some(3i64))), "3i");
    }

    #[test]
    fn concurrent_fallback() {
        struct Shared(u32);

        impl Display for Shared {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "shared-{}", self.0)
            }
        }

        assert!(!is_fallback_cached::<Shared>());
        thread::scope(|s| {
            for i in 0..8 {
                s.spawn(move || {
                    let v = DynValue::display(Shared(i));
                    assert_eq!(fmt_dyn(&v), format!("\"shared-{i}\""));
                });
            }
        });
        assert!(is_fallback_cached::<Shared>());
    }
}
