//! Route handlers, one module per area of the registry.

pub mod assets;
pub mod finance;
pub mod leaders;
pub mod members;
pub mod notifications;
pub mod reports;
pub mod sacraments;
pub mod settings;

use std::collections::HashMap;

use axum::extract::Multipart;
use mkwawa_core::collab::Upload;

use crate::error::ApiError;

/// A decoded `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
  pub fields: HashMap<String, String>,
  pub files:  HashMap<String, Upload>,
}

impl MultipartForm {
  pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
    let mut form = Self::default();
    while let Some(field) = multipart
      .next_field()
      .await
      .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
      let name = field.name().unwrap_or_default().to_owned();
      match field.file_name().map(str::to_owned) {
        Some(file_name) => {
          let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
          form.files.insert(name, Upload { file_name, bytes: bytes.to_vec() });
        }
        None => {
          let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
          form.fields.insert(name, text);
        }
      }
    }
    Ok(form)
  }

  /// The file sent under `name`; a validation error names the field when
  /// it is missing.
  pub fn file(&mut self, name: &'static str) -> Result<Upload, ApiError> {
    self
      .files
      .remove(name)
      .ok_or_else(|| mkwawa_core::Error::validation(name, "a file is required").into())
  }
}
