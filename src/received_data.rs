use std::fmt::Display;

use bytes::Bytes;
use serde_json::Value;

/// Opaque binary response body together with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Lower-cased `Content-Type` of the response, empty if none was sent.
    pub content_type: String,
    pub data: Bytes,
}

impl Blob {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormDataEntry {
    Text(String),
    File {
        filename: String,
        content_type: String,
        data: Bytes,
    },
}

/// Ordered form fields. A name may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormDataEntry)>,
}

impl FormData {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn append(&mut self, name: impl Into<String>, entry: FormDataEntry) {
        self.entries.push((name.into(), entry));
    }

    /// The first entry stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FormDataEntry> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormDataEntry> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    pub fn entries(&self) -> &[(String, FormDataEntry)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name, FormDataEntry::Text(value)))
                .collect(),
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceivedData {
    Json(Value),
    Text(String),
    FormData(FormData),
    Blob(Blob),
    ArrayBuffer(Bytes),
    /// A decoded value that has no keys of its own, paired with the echoed request body.
    WithBody {
        value: Box<ReceivedData>,
        body: Value,
    },
}

impl ReceivedData {
    /// Attaches the outgoing request body under `body`.
    ///
    /// JSON objects receive a `body` key. Every other value is wrapped in
    /// [`ReceivedData::WithBody`]. A missing request body is echoed as `null`.
    pub(crate) fn with_body(self, body: Option<&Value>) -> Self {
        let body = body.cloned().unwrap_or(Value::Null);
        match self {
            ReceivedData::Json(Value::Object(mut map)) => {
                map.insert("body".to_string(), body);
                ReceivedData::Json(Value::Object(map))
            }
            value => ReceivedData::WithBody {
                value: Box::new(value),
                body,
            },
        }
    }

    /// The decoded value without any echoed body wrapper.
    pub fn value(&self) -> &ReceivedData {
        match self {
            ReceivedData::WithBody { value, .. } => value.value(),
            other => other,
        }
    }

    /// The request body echoed into this value, if any.
    pub fn echoed_body(&self) -> Option<&Value> {
        match self {
            ReceivedData::Json(Value::Object(map)) => map.get("body"),
            ReceivedData::WithBody { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self.value() {
            ReceivedData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self.value() {
            ReceivedData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_form_data(&self) -> Option<&FormData> {
        match self.value() {
            ReceivedData::FormData(form) => Some(form),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self.value() {
            ReceivedData::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self.value() {
            ReceivedData::ArrayBuffer(bytes) => Some(bytes),
            ReceivedData::Blob(blob) => Some(&blob.data),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ReceivedData::Json(value) => Some(value),
            ReceivedData::WithBody { value, .. } => value.into_json(),
            _ => None,
        }
    }
}

impl Display for ReceivedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceivedData::Json(value) => write!(f, "{value}"),
            ReceivedData::Text(text) => f.write_str(text),
            ReceivedData::FormData(form) => {
                f.write_str("FormData {")?;
                for (index, (name, entry)) in form.entries().iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    match entry {
                        FormDataEntry::Text(value) => write!(f, " {name}: {value:?}")?,
                        FormDataEntry::File { filename, data, .. } => {
                            write!(f, " {name}: File({filename:?}, {} bytes)", data.len())?
                        }
                    }
                }
                f.write_str(" }")
            }
            ReceivedData::Blob(blob) => write!(
                f,
                "Blob {{ size: {}, type: {:?} }}",
                blob.size(),
                blob.content_type
            ),
            ReceivedData::ArrayBuffer(bytes) => {
                write!(f, "ArrayBuffer {{ byteLength: {} }}", bytes.len())
            }
            ReceivedData::WithBody { value, body } => {
                write!(f, "{{ value: {value}, body: {body} }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn with_body_inserts_into_json_objects() {
        let data = ReceivedData::Json(json!({"id": 1})).with_body(Some(&json!({"name": "pen"})));

        assert_eq!(
            ReceivedData::Json(json!({"id": 1, "body": {"name": "pen"}})),
            data
        );
        assert_eq!(Some(&json!({"name": "pen"})), data.echoed_body());
    }

    #[test]
    fn with_body_wraps_non_keyed_values() {
        let data = ReceivedData::Text("ok".to_string()).with_body(Some(&json!({"a": 1})));

        assert_eq!(Some("ok"), data.as_text());
        assert_eq!(Some(&json!({"a": 1})), data.echoed_body());
        assert_eq!(r#"{ value: ok, body: {"a":1} }"#, data.to_string());
    }

    #[test]
    fn with_body_wraps_json_arrays_and_echoes_null() {
        let data = ReceivedData::Json(json!([1, 2])).with_body(None);

        assert_eq!(Some(&json!([1, 2])), data.as_json());
        assert_eq!(Some(&Value::Null), data.echoed_body());
    }

    #[test]
    fn form_data_keeps_repeated_names_in_order() {
        let form: FormData = vec![
            ("tag".to_string(), "a".to_string()),
            ("other".to_string(), "x".to_string()),
            ("tag".to_string(), "b".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(3, form.len());
        assert_eq!(Some(&FormDataEntry::Text("a".into())), form.get("tag"));
        assert_eq!(2, form.get_all("tag").count());
    }
}
