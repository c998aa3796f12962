use std::collections::HashMap;
use std::convert::Infallible;
use std::io::{Seek, SeekFrom, Write};

use async_graphql::UploadValue;
use bytes::Bytes;
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use thiserror::Error;

// Mapping of multipart field name to the operation paths its file replaces
pub type FilesMap = IndexMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum FileUploadError {
    #[error("invalid multipart request: {0}")]
    InvalidMultipartRequest(#[from] multer::Error),

    #[error("Missing file for multipart field '{0}'")]
    MissingFile(String),

    #[error("Path '{0}' does not point to a value inside 'operations'")]
    InvalidPath(String),
}

// A file part received in a multipart request
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub field_name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl UploadedFile {
    // Spools the content into an anonymous temp file, the form the executor consumes
    pub fn to_upload_value(&self) -> std::io::Result<UploadValue> {
        let mut file = tempfile::tempfile()?;
        file.write_all(&self.content)?;
        file.seek(SeekFrom::Start(0))?;
        Ok(UploadValue {
            filename: self.filename.clone().unwrap_or_else(|| self.field_name.clone()),
            content_type: self.content_type.clone(),
            content: file,
        })
    }
}

// A file substituted at a path inside the operations document, e.g. "variables.file"
#[derive(Debug, Clone, PartialEq)]
pub struct FileBinding {
    pub path: String,
    pub file: UploadedFile,
}

// Text fields and file parts of a multipart/form-data body
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

pub async fn read_multipart(content_type: &str, body: Bytes) -> Result<MultipartForm, FileUploadError> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = MultipartForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(|m| m.to_string());
                let content = field.bytes().await?;
                debug!("Received file part '{}' ({} bytes)", name, content.len());
                form.files.insert(
                    name.clone(),
                    UploadedFile {
                        field_name: name,
                        filename: Some(filename),
                        content_type,
                        content,
                    },
                );
            }
            None => {
                let text = field.text().await?;
                form.fields.insert(name, text);
            }
        }
    }
    Ok(form)
}

// Nulls every mapped placeholder in `operations` and records which file belongs there.
// Fails when the map names a field that was not uploaded or a path that does not resolve.
pub fn replace_placeholders_with_files(
    mut operations: Value,
    files_map: &FilesMap,
    files: &HashMap<String, UploadedFile>,
) -> Result<(Value, Vec<FileBinding>), FileUploadError> {
    let mut bindings = Vec::new();
    for (field_name, paths) in files_map {
        let file = files
            .get(field_name)
            .ok_or_else(|| FileUploadError::MissingFile(field_name.clone()))?;

        for path in paths {
            let slot = placeholder_slot(&mut operations, path)
                .ok_or_else(|| FileUploadError::InvalidPath(path.clone()))?;
            *slot = Value::Null;
            bindings.push(FileBinding {
                path: path.clone(),
                file: file.clone(),
            });
        }
    }
    Ok((operations, bindings))
}

// Intermediate segments must exist; the last one may add a new key to an object
fn placeholder_slot<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut keys: Vec<&str> = path.split('.').collect();
    let last = keys.pop()?;

    let mut target = root;
    for key in keys {
        target = match target {
            Value::Object(map) => map.get_mut(key)?,
            Value::Array(items) => items.get_mut(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    match target {
        Value::Object(map) => Some(map.entry(last).or_insert(Value::Null)),
        Value::Array(items) => items.get_mut(last.parse::<usize>().ok()?),
        _ => None,
    }
}
