use encoding_rs::Encoding;

use crate::error::MirrorError;

/// Pick the encoding for a stored page: the Content-Type header's
/// charset when the response declared one, else the job's configured
/// fallback, else UTF-8.
pub fn select_encoding(content_type: Option<&str>, fallback: &str) -> &'static Encoding {
    if let Some(label) = content_type.and_then(extract_charset)
        && let Some(encoding) = Encoding::for_label(label.as_bytes())
    {
        return encoding;
    }
    Encoding::for_label(fallback.as_bytes()).unwrap_or(encoding_rs::UTF_8)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let part = part.trim();
            part.strip_prefix("charset=")
                .or_else(|| part.strip_prefix("Charset="))
                .or_else(|| part.strip_prefix("CHARSET="))
                .map(|v| v.trim_matches([' ', '"', '\''].as_ref()))
        })
        .next()
        .map(|s| s.to_string())
}

/// Decode stored page bytes. A malformed byte sequence is a parse
/// failure for the whole page; the caller abandons its subtree.
pub fn decode_page(
    bytes: &[u8],
    encoding: &'static Encoding,
    path: &str,
) -> Result<String, MirrorError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(MirrorError::Decode {
            path: path.to_string(),
            message: format!("invalid {} byte sequence", encoding.name()),
        });
    }
    Ok(text.into_owned())
}

/// Encode the rewritten document with the encoding it was decoded with,
/// so the saved file keeps the charset the server declared.
pub fn encode_page(html: &str, encoding: &'static Encoding) -> Vec<u8> {
    let (bytes, _, _) = encoding.encode(html);
    bytes.into_owned()
}
