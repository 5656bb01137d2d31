//! Body parsing for the 200 route.

use std::io::{self, Read};

use encoding_rs::{Encoding, UTF_8};
use tracing::warn;

use crate::error::BodyError;
use crate::types::{ResponseExpectation, ResultValue};

/// Size of each read when draining a body.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Interpret a successful body according to `expectation`.
///
/// `content_type` is the response's `Content-Type` value; only plain text
/// looks at it, to pick the declared charset. Every read or decode failure
/// becomes `TransportError`; nothing is propagated.
pub fn parse_success(
    body: Option<&mut dyn Read>,
    content_type: Option<&str>,
    expectation: ResponseExpectation,
) -> ResultValue {
    let parsed = match expectation {
        ResponseExpectation::StructuredData => read_text(body).map(ResultValue::ok_text),
        ResponseExpectation::RawBytes => body
            .ok_or(BodyError::Missing)
            .and_then(|reader| drain(reader, READ_CHUNK_SIZE))
            .map(ResultValue::ok_bytes),
        ResponseExpectation::PlainText => match body {
            Some(reader) => drain(reader, READ_CHUNK_SIZE)
                .map(|bytes| ResultValue::ok_text(decode_text(&bytes, content_type))),
            None => Ok(ResultValue::ok()),
        },
        ResponseExpectation::Ignore => Ok(ResultValue::ok()),
        ResponseExpectation::Token => Err(BodyError::Unsupported("token")),
    };

    parsed.unwrap_or_else(|err| {
        warn!(?expectation, error = %err, "failed to parse response body");
        ResultValue::transport_error()
    })
}

fn read_text(body: Option<&mut dyn Read>) -> Result<String, BodyError> {
    let reader = body.ok_or(BodyError::Missing)?;
    let bytes = drain(reader, READ_CHUNK_SIZE)?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode with the charset named in `content_type`, falling back to UTF-8.
/// A byte-order mark overrides both. Malformed sequences become U+FFFD.
fn decode_text(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// The `charset` parameter of a media type, unquoted.
fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Read `reader` to end-of-stream in `chunk_size` pieces.
pub(crate) fn drain(reader: &mut dyn Read, chunk_size: usize) -> Result<Vec<u8>, BodyError> {
    let mut buffer = Vec::new();
    let mut chunk = vec![0u8; chunk_size];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(buffer),
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Payload, ResultCode};
    use std::io::Cursor;

    /// Yields its data one byte per read, interrupting before every read.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        interrupt_next: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.interrupt_next = true;
            if self.pos == self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    /// Returns some bytes, then fails.
    struct Broken {
        sent: bool,
    }

    impl Read for Broken {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            self.sent = true;
            buf[0] = b'{';
            Ok(1)
        }
    }

    fn parse(data: &[u8], expectation: ResponseExpectation) -> ResultValue {
        let mut cursor = Cursor::new(data.to_vec());
        parse_success(Some(&mut cursor), None, expectation)
    }

    #[test]
    fn structured_data_returns_raw_text() {
        let value = parse(br#"{"items":[1,2]}"#, ResponseExpectation::StructuredData);
        assert_eq!(value.code(), ResultCode::Ok);
        assert_eq!(value.text(), Some(r#"{"items":[1,2]}"#));
    }

    #[test]
    fn structured_data_is_not_validated() {
        let value = parse(b"not json", ResponseExpectation::StructuredData);
        assert_eq!(value.text(), Some("not json"));
    }

    #[test]
    fn structured_data_rejects_invalid_utf8() {
        let value = parse(&[0xff, 0xfe], ResponseExpectation::StructuredData);
        assert_eq!(value, ResultValue::transport_error());
    }

    #[test]
    fn structured_data_without_body_is_transport_error() {
        let value = parse_success(None, None, ResponseExpectation::StructuredData);
        assert_eq!(value.code(), ResultCode::TransportError);
    }

    #[test]
    fn raw_bytes_are_returned_exactly() {
        let value = parse(&[0x01, 0x02, 0x03], ResponseExpectation::RawBytes);
        assert_eq!(value, ResultValue::ok_bytes(vec![0x01, 0x02, 0x03]));
    }

    #[test]
    fn raw_bytes_span_many_chunks() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let value = parse(&data, ResponseExpectation::RawBytes);
        assert_eq!(value.bytes(), Some(&data[..]));
    }

    #[test]
    fn raw_bytes_without_body_is_transport_error() {
        let value = parse_success(None, None, ResponseExpectation::RawBytes);
        assert_eq!(value, ResultValue::transport_error());
    }

    #[test]
    fn drain_is_independent_of_chunk_size() {
        for chunk_size in [1, 2, 3, 1024] {
            let mut cursor = Cursor::new(vec![1u8, 2, 3]);
            assert_eq!(drain(&mut cursor, chunk_size).unwrap(), vec![1, 2, 3]);
        }
    }

    #[test]
    fn drain_retries_interrupted_reads() {
        let mut reader = Trickle {
            data: b"abc".to_vec(),
            pos: 0,
            interrupt_next: true,
        };
        assert_eq!(drain(&mut reader, 8).unwrap(), b"abc".to_vec());
    }

    #[test]
    fn io_failure_is_transport_error() {
        for expectation in [
            ResponseExpectation::StructuredData,
            ResponseExpectation::RawBytes,
            ResponseExpectation::PlainText,
        ] {
            let mut reader = Broken { sent: false };
            let value = parse_success(Some(&mut reader), None, expectation);
            assert_eq!(value, ResultValue::transport_error(), "{expectation:?}");
        }
    }

    fn plain_text(data: &[u8], content_type: &str) -> ResultValue {
        let mut cursor = Cursor::new(data.to_vec());
        parse_success(Some(&mut cursor), Some(content_type), ResponseExpectation::PlainText)
    }

    #[test]
    fn plain_text_without_charset_decodes_utf8_lossily() {
        let value = parse(b"caf\xe9", ResponseExpectation::PlainText);
        assert_eq!(value.text(), Some("caf\u{fffd}"));
    }

    #[test]
    fn plain_text_uses_declared_charset() {
        let value = plain_text(b"caf\xe9", "text/plain; charset=iso-8859-1");
        assert_eq!(value.text(), Some("café"));

        let value = plain_text(b"caf\xe9", "text/plain;Charset=\"windows-1252\"");
        assert_eq!(value.text(), Some("café"));
    }

    #[test]
    fn plain_text_unknown_charset_falls_back_to_utf8() {
        let value = plain_text("café".as_bytes(), "text/plain; charset=no-such-charset");
        assert_eq!(value.text(), Some("café"));
    }

    #[test]
    fn charset_parameter_is_extracted() {
        assert_eq!(charset("text/plain; charset=utf-8"), Some("utf-8"));
        assert_eq!(charset("text/plain; format=flowed; CHARSET=\"UTF-16LE\""), Some("UTF-16LE"));
        assert_eq!(charset("text/plain"), None);
        assert_eq!(charset("charset=utf-8"), None);
    }

    #[test]
    fn structured_data_ignores_declared_charset() {
        let mut cursor = Cursor::new(b"caf\xe9".to_vec());
        let value = parse_success(
            Some(&mut cursor),
            Some("application/json; charset=iso-8859-1"),
            ResponseExpectation::StructuredData,
        );
        assert_eq!(value, ResultValue::transport_error());
    }

    #[test]
    fn plain_text_without_body_is_ok_without_payload() {
        let value = parse_success(None, None, ResponseExpectation::PlainText);
        assert_eq!(value, ResultValue::ok());
    }

    #[test]
    fn ignore_never_reads_body() {
        let mut reader = Broken { sent: true };
        let value = parse_success(Some(&mut reader), None, ResponseExpectation::Ignore);
        assert_eq!(value.code(), ResultCode::Ok);
        assert_eq!(value.payload(), &Payload::None);
    }

    #[test]
    fn token_is_unsupported() {
        let value = parse(b"eyJ.payload.sig", ResponseExpectation::Token);
        assert_eq!(value, ResultValue::transport_error());
    }
}
