//! Request parameter encoding.
//!
//! Every request type serializes two ways. The JSON body comes from its
//! `Serialize` impl; the multipart body comes from [`Params::write_fields`],
//! which `#[derive(Params)]` generates from the same serde attributes.
//!
//! Field values are converted by [`FormValue`]:
//!
//! | Rust type | Form entry |
//! |-----------|------------|
//! | `String`, `&str`, numbers, `bool` | text |
//! | [`InputFile`] upload | file part |
//! | [`InputFile`] id / URL | text |
//! | `Option<T>` | the inner value, or nothing |
//! | `Vec<T>`, entity types | text holding the JSON encoding |

use serde::Serialize;

use crate::error::{EncodingError, EncodingResult};
use crate::input_file::InputFile;

// =============================================================================
// Form Fields
// =============================================================================

/// One form entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A plain value.
    Text(String),
    /// A file reference. Uploads become binary parts.
    File(InputFile),
}

impl FieldValue {
    /// Returns `true` if this entry must be sent as a binary part.
    pub fn is_upload(&self) -> bool {
        matches!(self, Self::File(file) if file.is_upload())
    }
}

/// Ordered `(name, value)` pairs of a multipart body.
///
/// A file entry always wins over a text entry with the same name: pushing a
/// file replaces the text in place, pushing text over a file is ignored.
/// No name ever appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    entries: Vec<(String, FieldValue)>,
}

impl FormFields {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text entry unless the name is already taken by a file.
    ///
    /// A repeated text entry keeps the first position and takes the new value.
    pub fn push_text(&mut self, name: &str, value: impl Into<String>) {
        match self.position(name) {
            Some(idx) => {
                if let FieldValue::Text(existing) = &mut self.entries[idx].1 {
                    *existing = value.into();
                }
            }
            None => self
                .entries
                .push((name.to_string(), FieldValue::Text(value.into()))),
        }
    }

    /// Adds a file entry, replacing any entry of the same name in place.
    pub fn push_file(&mut self, name: &str, file: InputFile) {
        match self.position(name) {
            Some(idx) => self.entries[idx].1 = FieldValue::File(file),
            None => self.entries.push((name.to_string(), FieldValue::File(file))),
        }
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.position(name).map(|idx| &self.entries[idx].1)
    }

    /// Returns `true` if the form contains the named entry.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns `true` if any entry is an upload.
    pub fn has_uploads(&self) -> bool {
        self.entries.iter().any(|(_, value)| value.is_upload())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the form has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

impl IntoIterator for FormFields {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// Params
// =============================================================================

/// A request type that can be encoded as form fields.
///
/// Usually derived:
///
/// ```rust
/// use courier_core::{FieldValue, Params};
/// use serde::Serialize;
///
/// #[derive(Serialize, Params)]
/// struct Ping {
///     #[serde(rename = "chat_id")]
///     chat: i64,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     note: Option<String>,
/// }
///
/// let form = Ping { chat: 7, note: None }.form_fields().unwrap();
/// assert_eq!(form.get("chat_id"), Some(&FieldValue::Text("7".into())));
/// assert!(!form.contains("note"));
/// ```
pub trait Params: Serialize {
    /// Appends this value's fields to `form` in declaration order.
    fn write_fields(&self, form: &mut FormFields) -> EncodingResult<()>;

    /// Encodes this value into a fresh form.
    fn form_fields(&self) -> EncodingResult<FormFields> {
        let mut form = FormFields::new();
        self.write_fields(&mut form)?;
        Ok(form)
    }
}

impl<P: Params + ?Sized> Params for &P {
    fn write_fields(&self, form: &mut FormFields) -> EncodingResult<()> {
        (**self).write_fields(form)
    }
}

/// A JSON object used as request parameters.
///
/// Top-level strings are sent verbatim, everything else as JSON text.
impl Params for serde_json::Value {
    fn write_fields(&self, form: &mut FormFields) -> EncodingResult<()> {
        match self {
            serde_json::Value::Object(map) => {
                for (name, value) in map {
                    FormValue::write_to(value, name, form)?;
                }
                Ok(())
            }
            serde_json::Value::Null => Ok(()),
            _ => Err(EncodingError::Body(
                "request parameters must be a JSON object".to_string(),
            )),
        }
    }
}

// =============================================================================
// Form Values
// =============================================================================

/// Converts one field value into form entries.
pub trait FormValue {
    /// Writes this value under `name`.
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()>;
}

impl<T: FormValue + ?Sized> FormValue for &T {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        (**self).write_to(name, form)
    }
}

impl<T: FormValue + ?Sized> FormValue for Box<T> {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        (**self).write_to(name, form)
    }
}

impl FormValue for str {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        form.push_text(name, self);
        Ok(())
    }
}

impl FormValue for String {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        form.push_text(name, self.as_str());
        Ok(())
    }
}

macro_rules! display_form_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FormValue for $ty {
                fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
                    form.push_text(name, self.to_string());
                    Ok(())
                }
            }
        )*
    };
}

display_form_value!(bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

impl<T: FormValue> FormValue for Option<T> {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        match self {
            Some(value) => value.write_to(name, form),
            None => Ok(()),
        }
    }
}

impl<T: Serialize> FormValue for Vec<T> {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        write_json(self, name, form)
    }
}

/// An empty reference writes nothing.
impl FormValue for InputFile {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        match self.as_reference() {
            Some(reference) => form.push_text(name, reference),
            None => form.push_file(name, self.clone()),
        }
        Ok(())
    }
}

impl FormValue for serde_json::Value {
    fn write_to(&self, name: &str, form: &mut FormFields) -> EncodingResult<()> {
        match self {
            serde_json::Value::Null => Ok(()),
            serde_json::Value::String(s) => {
                form.push_text(name, s.as_str());
                Ok(())
            }
            other => write_json(other, name, form),
        }
    }
}

/// Writes `value` as a single text entry holding its JSON encoding.
pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    name: &str,
    form: &mut FormFields,
) -> EncodingResult<()> {
    let json = serde_json::to_string(value).map_err(|err| EncodingError::json(name, &err))?;
    form.push_text(name, json);
    Ok(())
}

/// Writes `value` through its serde encoding: a string is sent verbatim,
/// anything else as JSON text.
pub fn write_serialized<T: Serialize + ?Sized>(
    value: &T,
    name: &str,
    form: &mut FormFields,
) -> EncodingResult<()> {
    let value = serde_json::to_value(value).map_err(|err| EncodingError::json(name, &err))?;
    FormValue::write_to(&value, name, form)
}

/// Implements [`FormValue`] for unit enums through their serde names.
#[macro_export]
macro_rules! serde_form_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::FormValue for $ty {
                fn write_to(
                    &self,
                    name: &str,
                    form: &mut $crate::FormFields,
                ) -> $crate::EncodingResult<()> {
                    $crate::params::write_serialized(self, name, form)
                }
            }
        )*
    };
}

/// Implements [`FormValue`] for entity types that travel as JSON text.
#[macro_export]
macro_rules! json_form_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::FormValue for $ty {
                fn write_to(
                    &self,
                    name: &str,
                    form: &mut $crate::FormFields,
                ) -> $crate::EncodingResult<()> {
                    $crate::params::write_json(self, name, form)
                }
            }
        )*
    };
}

// =============================================================================
// Omission Helpers
// =============================================================================

/// Returns `true` for the type's zero value. Use with `skip_serializing_if`.
pub fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// Returns `true` for `false`. Use with `skip_serializing_if`.
pub fn is_false(value: &bool) -> bool {
    !*value
}
