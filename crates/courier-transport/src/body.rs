//! Request body construction.
//!
//! A request is sent either as JSON (the request's `Serialize` output) or as
//! `multipart/form-data` (its [`Params`] fields plus supplementary files).
//!
//! Multipart assembly has two steps:
//!
//! 1. [`BodyBuilder::resolve_parts`] turns the form fields into ordered
//!    [`ResolvedPart`]s, reading every local file fully. Files are opened and
//!    closed inside this call; none stays open afterwards.
//! 2. The parts become a `reqwest::multipart::Form` whose boundary makes up
//!    the content-type descriptor.

use std::collections::HashMap;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::{debug, trace};

use courier_core::{EncodingError, EncodingResult, FieldValue, FormFields, InputFile, Params};

/// Content type of JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyMode {
    /// `application/json`; uploads are rejected.
    Json,
    /// `multipart/form-data`.
    Multipart,
}

/// A file supplied next to the request's own fields.
///
/// If `field` names one of the request's fields, the file materializes that
/// field instead of adding a second entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Form field name.
    pub field: String,
    /// The file.
    pub file: InputFile,
    /// File name reported to the service; defaults to the file's own name.
    pub file_name: Option<String>,
}

impl Attachment {
    /// Creates an attachment using the file's own name.
    pub fn new(field: impl Into<String>, file: InputFile) -> Self {
        Self {
            field: field.into(),
            file,
            file_name: None,
        }
    }

    /// Overrides the reported file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// One resolved multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPart {
    /// A plain form field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A binary file part.
    File {
        /// Field name.
        name: String,
        /// File name reported to the service.
        file_name: String,
        /// File content.
        data: Bytes,
    },
}

impl ResolvedPart {
    /// Field name of the part.
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Encoded request payload.
#[derive(Debug)]
pub enum Payload {
    /// Serialized JSON.
    Json(Bytes),
    /// A multipart form.
    Multipart(Form),
}

/// A request payload together with its content-type descriptor.
#[derive(Debug)]
pub struct Body {
    payload: Payload,
    content_type: String,
}

impl Body {
    /// The content-type descriptor.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The encoded payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the JSON bytes, if this is a JSON body.
    pub fn as_json(&self) -> Option<&Bytes> {
        match &self.payload {
            Payload::Json(bytes) => Some(bytes),
            Payload::Multipart(_) => None,
        }
    }

    /// Splits the body into payload and content type.
    pub fn into_parts(self) -> (Payload, String) {
        (self.payload, self.content_type)
    }
}

/// Builds request bodies.
pub struct BodyBuilder;

impl BodyBuilder {
    /// Builds a body in the given mode.
    pub async fn build<P: Params + ?Sized>(
        mode: BodyMode,
        params: &P,
        extra: Vec<Attachment>,
    ) -> EncodingResult<Body> {
        match mode {
            BodyMode::Json => Self::json(params, extra),
            BodyMode::Multipart => Self::multipart(params, extra).await,
        }
    }

    /// Builds a multipart body when anything must be uploaded, JSON otherwise.
    pub async fn auto<P: Params + ?Sized>(params: &P, extra: Vec<Attachment>) -> EncodingResult<Body> {
        let uploads = extra.iter().any(|a| a.file.is_upload()) || params.form_fields()?.has_uploads();
        let mode = if uploads {
            BodyMode::Multipart
        } else {
            BodyMode::Json
        };
        Self::build(mode, params, extra).await
    }

    /// Builds a JSON body.
    ///
    /// Supplementary attachments must be remote references; they are inserted
    /// into the top-level object.
    pub fn json<P: Params + ?Sized>(params: &P, extra: Vec<Attachment>) -> EncodingResult<Body> {
        if let Some((name, _)) = params.form_fields()?.iter().find(|(_, v)| v.is_upload()) {
            return Err(EncodingError::UploadInJson {
                field: name.to_string(),
            });
        }

        let bytes = if extra.is_empty() {
            serde_json::to_vec(params)
        } else {
            let mut value = serde_json::to_value(params)
                .map_err(|err| EncodingError::Body(err.to_string()))?;
            let Some(object) = value.as_object_mut() else {
                return Err(EncodingError::Body(
                    "attachments require an object body".to_string(),
                ));
            };
            for attachment in extra {
                match attachment.file.as_reference() {
                    Some(reference) => {
                        object.insert(attachment.field, reference.into());
                    }
                    None => {
                        return Err(EncodingError::UploadInJson {
                            field: attachment.field,
                        });
                    }
                }
            }
            serde_json::to_vec(&value)
        }
        .map_err(|err| EncodingError::Body(err.to_string()))?;

        Ok(Body {
            payload: Payload::Json(Bytes::from(bytes)),
            content_type: JSON_CONTENT_TYPE.to_string(),
        })
    }

    /// Builds a multipart body.
    pub async fn multipart<P: Params + ?Sized>(
        params: &P,
        extra: Vec<Attachment>,
    ) -> EncodingResult<Body> {
        let parts = Self::resolve_parts(params, extra).await?;
        let form = Self::into_form(parts)?;
        let content_type = format!("multipart/form-data; boundary={}", form.boundary());

        Ok(Body {
            payload: Payload::Multipart(form),
            content_type,
        })
    }

    /// Resolves the request fields and attachments into ordered parts.
    ///
    /// Fails on the first file that cannot be read; no partial result is
    /// returned.
    pub async fn resolve_parts<P: Params + ?Sized>(
        params: &P,
        extra: Vec<Attachment>,
    ) -> EncodingResult<Vec<ResolvedPart>> {
        let mut form: FormFields = params.form_fields()?;
        let mut file_names = HashMap::new();

        for attachment in extra {
            if let Some(file_name) = attachment.file_name {
                file_names.insert(attachment.field.clone(), file_name);
            }
            match attachment.file.as_reference() {
                Some(_) if form.get(&attachment.field).is_some_and(FieldValue::is_upload) => {
                    debug!(field = %attachment.field, "Reference attachment collides with an upload");
                    return Err(EncodingError::AttachmentConflict {
                        field: attachment.field,
                    });
                }
                Some(reference) => form.push_text(&attachment.field, reference),
                None => form.push_file(&attachment.field, attachment.file),
            }
        }

        let mut parts = Vec::with_capacity(form.len());
        for (name, value) in form {
            let part = match value {
                FieldValue::Text(value) => ResolvedPart::Text { name, value },
                FieldValue::File(file) => match file.as_reference() {
                    Some(reference) => ResolvedPart::Text {
                        value: reference.to_string(),
                        name,
                    },
                    None => {
                        let file_name = file_names
                            .remove(&name)
                            .or_else(|| file.file_name())
                            .unwrap_or_else(|| name.clone());
                        let data = read_file(file).await?;
                        trace!(field = %name, file_name = %file_name, len = data.len(), "Resolved file part");
                        ResolvedPart::File {
                            name,
                            file_name,
                            data,
                        }
                    }
                },
            };
            parts.push(part);
        }

        Ok(parts)
    }

    /// Converts resolved parts into a multipart form.
    pub fn into_form(parts: Vec<ResolvedPart>) -> EncodingResult<Form> {
        let mut form = Form::new();
        for part in parts {
            form = match part {
                ResolvedPart::Text { name, value } => form.text(name, value),
                ResolvedPart::File {
                    name,
                    file_name,
                    data,
                } => {
                    let part = Part::bytes(data.to_vec())
                        .file_name(file_name)
                        .mime_str("application/octet-stream")
                        .map_err(|err| EncodingError::Body(err.to_string()))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

async fn read_file(file: InputFile) -> EncodingResult<Bytes> {
    match file {
        InputFile::Path(path) => match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) => Err(EncodingError::FileRead {
                path,
                reason: err.to_string(),
            }),
        },
        InputFile::Memory { data, .. } => Ok(data),
        InputFile::Id(_) | InputFile::Url(_) => Err(EncodingError::Body(
            "remote file references are not uploads".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Serialize;
    use serde_json::json;

    use super::*;

    #[derive(Serialize, courier_core::Params)]
    struct SendDoc {
        chat_id: i64,
        document: InputFile,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    }

    fn names(parts: &[ResolvedPart]) -> Vec<&str> {
        parts.iter().map(ResolvedPart::name).collect()
    }

    #[tokio::test]
    async fn json_body_is_the_serialized_request() {
        let request = SendDoc {
            chat_id: 3,
            document: InputFile::id("BQAC"),
            caption: None,
        };
        let body = BodyBuilder::build(BodyMode::Json, &request, Vec::new()).await.unwrap();

        assert_eq!(body.content_type(), JSON_CONTENT_TYPE);
        let value: serde_json::Value = serde_json::from_slice(body.as_json().unwrap()).unwrap();
        assert_eq!(value, json!({"chat_id": 3, "document": "BQAC"}));
    }

    #[tokio::test]
    async fn json_body_rejects_uploads() {
        let request = SendDoc {
            chat_id: 3,
            document: InputFile::memory("a.txt", &b"abc"[..]),
            caption: None,
        };
        let err = BodyBuilder::build(BodyMode::Json, &request, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EncodingError::UploadInJson { field } if field == "document"));
    }

    #[tokio::test]
    async fn local_file_is_read_with_base_name() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"quarterly numbers").unwrap();
        let request = SendDoc {
            chat_id: 3,
            document: InputFile::path(file.path()),
            caption: Some("report".into()),
        };

        let parts = BodyBuilder::resolve_parts(&request, Vec::new()).await.unwrap();
        assert_eq!(names(&parts), ["chat_id", "document", "caption"]);

        let expected_name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        match &parts[1] {
            ResolvedPart::File { file_name, data, .. } => {
                assert_eq!(file_name, &expected_name);
                assert_eq!(&data[..], b"quarterly numbers");
            }
            other => panic!("expected a file part, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_file_aborts_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let request = SendDoc {
            chat_id: 3,
            document: InputFile::path(dir.path().join("missing.bin")),
            caption: None,
        };

        let err = BodyBuilder::build(BodyMode::Multipart, &request, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EncodingError::FileRead { path, .. } if path.ends_with("missing.bin")));
    }

    #[tokio::test]
    async fn attachment_replaces_plain_field() {
        let params = json!({"chat_id": 1, "document": "placeholder", "caption": "c"});
        let extra = vec![
            Attachment::new("document", InputFile::memory("raw.bin", &b"xyz"[..]))
                .with_file_name("report.txt"),
        ];

        let parts = BodyBuilder::resolve_parts(&params, extra).await.unwrap();
        let documents: Vec<_> = parts.iter().filter(|p| p.name() == "document").collect();
        assert_eq!(documents.len(), 1);
        assert_eq!(
            documents[0],
            &ResolvedPart::File {
                name: "document".into(),
                file_name: "report.txt".into(),
                data: Bytes::from_static(b"xyz"),
            }
        );
    }

    #[tokio::test]
    async fn auto_picks_mode_from_uploads() {
        let remote = SendDoc {
            chat_id: 1,
            document: InputFile::url("https://example.com/a.pdf"),
            caption: None,
        };
        let body = BodyBuilder::auto(&remote, Vec::new()).await.unwrap();
        assert_eq!(body.content_type(), JSON_CONTENT_TYPE);

        let upload = SendDoc {
            chat_id: 1,
            document: InputFile::memory("a.pdf", &b"%PDF"[..]),
            caption: None,
        };
        let body = BodyBuilder::auto(&upload, Vec::new()).await.unwrap();
        assert!(body.content_type().starts_with("multipart/form-data; boundary="));
        assert!(matches!(body.payload(), Payload::Multipart(_)));
    }

    #[tokio::test]
    async fn reference_attachment_over_upload_is_rejected() {
        let request = SendDoc {
            chat_id: 1,
            document: InputFile::memory("a.txt", &b"abc"[..]),
            caption: None,
        };
        let extra = vec![Attachment::new("document", InputFile::id("BQAC"))];

        let err = BodyBuilder::resolve_parts(&request, extra).await.unwrap_err();
        assert!(matches!(err, EncodingError::AttachmentConflict { field } if field == "document"));
    }

    #[tokio::test]
    async fn reference_attachment_over_text_replaces_value() {
        let params = json!({"chat_id": 1, "document": "old"});
        let extra = vec![Attachment::new("document", InputFile::id("BQAC"))];

        let parts = BodyBuilder::resolve_parts(&params, extra).await.unwrap();
        assert_eq!(
            parts[1],
            ResolvedPart::Text {
                name: "document".into(),
                value: "BQAC".into(),
            }
        );
    }

    #[tokio::test]
    async fn json_body_inserts_reference_attachments() {
        let params = json!({"chat_id": 1});
        let extra = vec![Attachment::new("photo", InputFile::id("AgAC"))];
        let body = BodyBuilder::json(&params, extra).unwrap();
        let value: serde_json::Value = serde_json::from_slice(body.as_json().unwrap()).unwrap();
        assert_eq!(value, json!({"chat_id": 1, "photo": "AgAC"}));
    }
}
