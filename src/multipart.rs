//! Decoding of form-data response bodies.
//!
//! Accepts `multipart/form-data` (with a `boundary` parameter) and
//! `application/x-www-form-urlencoded`. Any other content type is a decode error.

use bytes::Bytes;

use crate::{DeserializationError, FetchError, FetchResult, FormData, FormDataEntry};

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";

pub(crate) fn decode_form_data(content_type: Option<&str>, raw_body: &Bytes) -> FetchResult<FormData> {
    let content_type = content_type.unwrap_or_default();
    let essence = mime_essence(content_type);

    match essence.as_str() {
        "application/x-www-form-urlencoded" => {
            let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(raw_body).map_err(
                |e| FetchError::DeserializationError(DeserializationError::UrlEncoded(e)),
            )?;
            Ok(pairs.into_iter().collect())
        }
        "multipart/form-data" => {
            let boundary = mime_param(content_type, "boundary")
                .filter(|b| !b.is_empty())
                .ok_or_else(|| form_error("multipart body without a boundary"))?;
            parse_multipart(raw_body, &boundary)
        }
        _ => Err(form_error(format!(
            "content type `{content_type}` is not form data"
        ))),
    }
}

/// The `type/subtype` part of a content type, lower-cased.
pub(crate) fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn mime_param(header: &str, name: &str) -> Option<String> {
    header.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case(name) {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

fn parse_multipart(body: &[u8], boundary: &str) -> FetchResult<FormData> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut form = FormData::new();

    let mut cursor = find(body, &delimiter)
        .ok_or_else(|| form_error("multipart boundary not found"))?
        + delimiter.len();

    loop {
        let rest = &body[cursor..];
        if rest.starts_with(b"--") {
            return Ok(form);
        }
        // Skip transport padding up to the end of the delimiter line.
        let line_end = find(rest, CRLF).ok_or_else(|| form_error("truncated multipart body"))?;
        cursor += line_end + CRLF.len();

        let part = &body[cursor..];
        // A part without headers starts with the blank line itself.
        let (headers, content_offset) = if part.starts_with(CRLF) {
            ("", CRLF.len())
        } else {
            let headers_end = find(part, HEADER_END)
                .ok_or_else(|| form_error("multipart part headers are not terminated"))?;
            let headers = std::str::from_utf8(&part[..headers_end])
                .map_err(|_| form_error("multipart headers are not valid utf-8"))?;
            (headers, headers_end + HEADER_END.len())
        };
        let part_headers = PartHeaders::parse(headers)?;

        let content_start = cursor + content_offset;
        let mut next_delimiter = CRLF.to_vec();
        next_delimiter.extend_from_slice(&delimiter);
        let content_len = find(&body[content_start..], &next_delimiter)
            .ok_or_else(|| form_error("multipart part is not terminated"))?;
        let content = &body[content_start..content_start + content_len];

        let entry = part_headers.entry(content);
        form.append(part_headers.name, entry);

        cursor = content_start + content_len + next_delimiter.len();
    }
}

struct PartHeaders {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
}

impl PartHeaders {
    fn parse(headers: &str) -> FetchResult<Self> {
        let mut disposition = None;
        let mut content_type = None;

        for line in headers.split("\r\n") {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.eq_ignore_ascii_case("content-disposition") {
                disposition = Some(value.trim());
            } else if key.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.trim().to_ascii_lowercase());
            }
        }

        let disposition =
            disposition.ok_or_else(|| form_error("multipart part without content-disposition"))?;
        let name = mime_param(disposition, "name")
            .ok_or_else(|| form_error("multipart part without a name"))?;

        Ok(Self {
            name,
            filename: mime_param(disposition, "filename"),
            content_type,
        })
    }

    fn entry(&self, content: &[u8]) -> FormDataEntry {
        match &self.filename {
            Some(filename) => FormDataEntry::File {
                filename: filename.clone(),
                content_type: self
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "text/plain".to_string()),
                data: Bytes::copy_from_slice(content),
            },
            None => FormDataEntry::Text(String::from_utf8_lossy(content).into_owned()),
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn form_error(message: impl Into<String>) -> FetchError {
    FetchError::DeserializationError(DeserializationError::FormData(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTIPART: &str = "--XyZ\r\n\
        Content-Disposition: form-data; name=\"title\"\r\n\
        \r\n\
        pen\r\n\
        --XyZ\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
        Content-Type: Text/Plain\r\n\
        \r\n\
        hello\r\nworld\r\n\
        --XyZ--\r\n";

    #[test]
    fn decodes_multipart_fields_and_files() {
        let form = decode_form_data(
            Some("multipart/form-data; boundary=\"XyZ\""),
            &Bytes::from_static(MULTIPART.as_bytes()),
        )
        .unwrap();

        assert_eq!(2, form.len());
        assert_eq!(Some(&FormDataEntry::Text("pen".into())), form.get("title"));
        assert_eq!(
            Some(&FormDataEntry::File {
                filename: "a.txt".into(),
                content_type: "text/plain".into(),
                data: Bytes::from_static(b"hello\r\nworld"),
            }),
            form.get("file")
        );
    }

    #[test]
    fn decodes_urlencoded_bodies() {
        let form = decode_form_data(
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            &Bytes::from_static(b"q=red+shoes&limit=5"),
        )
        .unwrap();

        assert_eq!(Some(&FormDataEntry::Text("red shoes".into())), form.get("q"));
        assert_eq!(Some(&FormDataEntry::Text("5".into())), form.get("limit"));
    }

    #[test]
    fn rejects_other_content_types() {
        let err = decode_form_data(Some("application/json"), &Bytes::from_static(b"{}"))
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::DeserializationError(DeserializationError::FormData(_))
        ));

        assert!(decode_form_data(None, &Bytes::new()).is_err());
    }

    #[test]
    fn rejects_multipart_without_boundary() {
        let err = decode_form_data(
            Some("multipart/form-data"),
            &Bytes::from_static(MULTIPART.as_bytes()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("boundary"));
    }

    #[test]
    fn rejects_unterminated_parts() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\nvalue";
        assert!(decode_form_data(
            Some("multipart/form-data; boundary=b"),
            &Bytes::from_static(body.as_bytes())
        )
        .is_err());
    }

    #[test]
    fn rejects_parts_without_headers() {
        let err = decode_form_data(
            Some("multipart/form-data; boundary=b"),
            &Bytes::from_static(b"--b\r\n\r\nvalue\r\n--b--\r\n"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("content-disposition"));

        let err = decode_form_data(
            Some("multipart/form-data; boundary=b"),
            &Bytes::from_static(b"--b\r\n\r\nvalue"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("content-disposition"));
    }

    #[test]
    fn essence_ignores_parameters_and_case() {
        assert_eq!("image/png", mime_essence("Image/PNG; q=1"));
    }
}
