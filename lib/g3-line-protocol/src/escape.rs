/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::borrow::Cow;

/// Escape a measurement name, tag key, tag value or field key.
///
/// `=`, `,` and space get a leading backslash, nothing else is touched.
pub fn escape_name(s: &str) -> Cow<'_, str> {
    if memchr::memchr3(b'=', b',', b' ', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    let mut escaped = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, '=' | ',' | ' ') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Escape the content of a string field value, without the surrounding quotes.
pub fn escape_string_value(s: &str) -> Cow<'_, str> {
    if memchr::memchr(b'"', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace('"', "\\\""))
}

pub(crate) fn write_escaped_name(buf: &mut Vec<u8>, s: &str) {
    let data = s.as_bytes();
    let mut offset = 0;
    while let Some(p) = memchr::memchr3(b'=', b',', b' ', &data[offset..]) {
        buf.extend_from_slice(&data[offset..offset + p]);
        buf.push(b'\\');
        buf.push(data[offset + p]);
        offset += p + 1;
    }
    buf.extend_from_slice(&data[offset..]);
}

pub(crate) fn write_escaped_string(buf: &mut Vec<u8>, s: &str) {
    let data = s.as_bytes();
    let mut offset = 0;
    while let Some(p) = memchr::memchr(b'"', &data[offset..]) {
        buf.extend_from_slice(&data[offset..offset + p]);
        buf.extend_from_slice(b"\\\"");
        offset += p + 1;
    }
    buf.extend_from_slice(&data[offset..]);
}

/// Write a quoted string field value
pub(crate) fn write_quoted_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    write_escaped_string(buf, s);
    buf.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape_name(s: &str) -> String {
        s.replace("\\=", "=")
            .replace("\\,", ",")
            .replace("\\ ", " ")
    }

    #[test]
    fn name() {
        assert_eq!(escape_name("my tag name"), "my\\ tag\\ name");
        assert_eq!(escape_name("my,tag,name"), "my\\,tag\\,name");
        assert_eq!(escape_name("my=tag=name"), "my\\=tag\\=name");
        assert!(matches!(escape_name("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn name_reversible() {
        for s in [
            "a b",
            "=,= ",
            " leading",
            "trailing,",
            "x=1,y=2 z",
            "ünïcode name=ok",
        ] {
            let escaped = escape_name(s);
            assert_eq!(unescape_name(&escaped), s);
        }
    }

    #[test]
    fn name_no_other_escape() {
        assert_eq!(escape_name("a\"b\\c\td"), "a\"b\\c\td");
    }

    #[test]
    fn string_value() {
        assert_eq!(escape_string_value("Hello \"World\"!"), "Hello \\\"World\\\"!");
        assert_eq!(escape_string_value("a, b=c"), "a, b=c");
        assert!(matches!(escape_string_value("x"), Cow::Borrowed("x")));
    }

    #[test]
    fn quoted() {
        let mut buf = Vec::new();
        write_quoted_string(&mut buf, "Hello \"World\"!");
        assert_eq!(buf.as_slice(), b"\"Hello \\\"World\\\"!\"");

        buf.clear();
        write_quoted_string(&mut buf, "");
        assert_eq!(buf.as_slice(), b"\"\"");
    }
}
