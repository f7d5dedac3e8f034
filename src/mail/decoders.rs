use mailparse::{MailHeader, MailHeaderMap, ParsedMail};

use crate::domain::email::NewEmail;
use crate::error::{Error, Result};

/// Parse a raw RFC 822 message and pull out the From/Subject/Date triple.
/// Missing headers come back as empty strings.
pub fn decode_headers(raw: &[u8]) -> Result<NewEmail> {
    let parsed = mailparse::parse_mail(raw)
        .map_err(|e| Error::Processing(format!("unparsable message: {e}")))?;
    let charset = declared_charset(&parsed);

    let value = |key: &str| {
        parsed
            .headers
            .get_first_header(key)
            .map(|h| decode_header_value(h, charset.as_deref()))
            .unwrap_or_default()
    };

    Ok(NewEmail {
        sender: value("From"),
        subject: value("Subject"),
        timestamp: parsed
            .headers
            .get_first_header("Date")
            .map(|h| String::from_utf8_lossy(h.get_value_raw()).trim().to_string())
            .unwrap_or_default(),
    })
}

/// Decode a single header value to text.
///
/// ASCII values go through `mailparse`, which handles RFC 2047
/// encoded-words. Raw 8-bit values are read as UTF-8 when valid, otherwise
/// with the message's declared charset, otherwise lossily.
pub fn decode_header_value(header: &MailHeader, charset: Option<&str>) -> String {
    let raw = header.get_value_raw();

    let decoded = if raw.is_ascii() {
        header.get_value()
    } else if std::str::from_utf8(raw).is_ok() {
        header
            .get_value_utf8()
            .unwrap_or_else(|_| String::from_utf8_lossy(raw).into_owned())
    } else {
        match charset {
            Some(cs) => decode_with_charset(raw, cs),
            None => String::from_utf8_lossy(raw).into_owned(),
        }
    };

    decoded.trim().to_string()
}

fn declared_charset(parsed: &ParsedMail) -> Option<String> {
    // mailparse reports us-ascii when no charset parameter is present, which
    // is a default rather than a declaration.
    let ctype = mailparse::parse_content_type(&parsed.headers.get_first_value("Content-Type")?);
    ctype.params.get("charset").cloned()
}

fn decode_with_charset(raw: &[u8], charset: &str) -> String {
    // Let mailparse run the charset conversion by presenting the bytes as a
    // single-part text body.
    let mut msg = format!("Content-Type: text/plain; charset=\"{charset}\"\r\n\r\n").into_bytes();
    msg.extend_from_slice(raw);

    mailparse::parse_mail(&msg)
        .and_then(|m| m.get_body())
        .unwrap_or_else(|_| String::from_utf8_lossy(raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(headers: &[u8]) -> Vec<u8> {
        let mut m = headers.to_vec();
        m.extend_from_slice(b"\r\nbody\r\n");
        m
    }

    #[test]
    fn test_plain_ascii_unchanged() {
        let raw = msg(b"From: alice@example.com\r\nSubject: Hello\r\nDate: Mon, 2 Jan 2006 15:04:05 -0700\r\n");
        let e = decode_headers(&raw).unwrap();
        assert_eq!(e.sender, "alice@example.com");
        assert_eq!(e.subject, "Hello");
        assert_eq!(e.timestamp, "Mon, 2 Jan 2006 15:04:05 -0700");
    }

    #[test]
    fn test_utf8_encoded_word() {
        let raw = msg(b"From: =?UTF-8?B?SsO2cmc=?= <jorg@example.com>\r\nSubject: =?UTF-8?Q?Gr=C3=BC=C3=9Fe?=\r\nDate: x\r\n");
        let e = decode_headers(&raw).unwrap();
        assert_eq!(e.sender, "Jörg <jorg@example.com>");
        assert_eq!(e.subject, "Grüße");
    }

    #[test]
    fn test_latin1_encoded_word() {
        let raw = msg(b"Subject: =?ISO-8859-1?Q?caf=E9?=\r\n");
        assert_eq!(decode_headers(&raw).unwrap().subject, "café");
    }

    #[test]
    fn test_raw_utf8_header() {
        let raw = msg("Subject: naïve résumé\r\n".as_bytes());
        assert_eq!(decode_headers(&raw).unwrap().subject, "naïve résumé");
    }

    #[test]
    fn test_raw_8bit_uses_declared_charset() {
        let raw = msg(b"Content-Type: text/plain; charset=iso-8859-1\r\nSubject: caf\xe9\r\n");
        assert_eq!(decode_headers(&raw).unwrap().subject, "café");
    }

    #[test]
    fn test_raw_8bit_multipart_without_charset_is_lossy() {
        let raw = b"Content-Type: multipart/mixed; boundary=xyz\r\n\
Subject: caf\xe9\r\n\
\r\n\
--xyz\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
body\r\n\
--xyz--\r\n";
        let subject = decode_headers(raw).unwrap().subject;
        assert_eq!(subject, "caf\u{FFFD}");
    }

    #[test]
    fn test_raw_8bit_without_charset_is_lossy() {
        let raw = msg(b"Subject: caf\xe9\r\n");
        let subject = decode_headers(&raw).unwrap().subject;
        assert!(subject.starts_with("caf"));
        assert!(subject.contains('\u{FFFD}'));
    }

    #[test]
    fn test_missing_headers_are_empty() {
        let e = decode_headers(&msg(b"X-Other: 1\r\n")).unwrap();
        assert_eq!(
            e,
            NewEmail {
                sender: String::new(),
                subject: String::new(),
                timestamp: String::new(),
            }
        );
    }
}
