//! Character encoding detection and transcoding.
//!
//! Byte input is decoded to UTF-8 before parsing, using the BOM when
//! present, otherwise the charset declared in the document head, and
//! UTF-8 as the default. Undecodable bytes become replacement
//! characters rather than errors.

use encoding_rs::{Encoding, UTF_8};

/// How far into the document to look for a charset declaration.
const SNIFF_WINDOW: usize = 4096;

/// Pull the charset label out of `<meta charset="...">` or a
/// `Content-Type` declaration in the first bytes of the document.
fn declared_charset(bytes: &[u8]) -> Option<String> {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let head = String::from_utf8_lossy(window).to_lowercase();
    let pos = head.find("charset=")?;
    let rest = &head[pos + "charset=".len()..];
    let rest = rest.trim_start_matches(['"', '\'']);
    let label: String = rest
        .chars()
        .take_while(|c| !matches!(c, '"' | '\'' | ' ' | ';' | '>' | '/'))
        .collect();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Decode HTML bytes to a UTF-8 string.
#[must_use]
pub fn transcode_to_utf8(bytes: &[u8]) -> String {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _, _) = encoding.decode(bytes);
        return decoded.into_owned();
    }
    let encoding = declared_charset(bytes)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8_passthrough() {
        let html = "<html><body><p>héllo</p></body></html>";
        assert_eq!(transcode_to_utf8(html.as_bytes()), html);
    }

    #[test]
    fn test_declared_latin1() {
        let bytes =
            b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xe9</body></html>";
        let decoded = transcode_to_utf8(bytes);
        assert!(decoded.contains("Café"));
    }

    #[test]
    fn test_content_type_declaration() {
        let bytes = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"></head><body>\x93quoted\x94</body></html>";
        let decoded = transcode_to_utf8(bytes);
        assert!(decoded.contains('\u{201c}'));
    }

    #[test]
    fn test_invalid_bytes_replaced() {
        let bytes = b"<html><body>\xff\xfe\xfd after</body></html>";
        let decoded = transcode_to_utf8(bytes);
        assert!(decoded.contains("after"));
    }

    #[test]
    fn test_charset_sniffing() {
        assert_eq!(
            declared_charset(b"<meta charset='utf-8'>"),
            Some("utf-8".to_string())
        );
        assert_eq!(declared_charset(b"<html><body>x</body></html>"), None);
    }
}
