use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::Args;

#[derive(Debug, Error)]
pub(crate) enum FieldsError {
    #[error("fields list is empty (file: {path:?})")]
    EmptyFromFile { path: PathBuf },

    #[error("fields list is empty (--fields value: {raw:?})")]
    EmptyFromArg { raw: String },

    #[error("failed to read fields file: {path:?}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) type Result<T> = std::result::Result<T, FieldsError>;

/// Загружает поля подписки из источника, выбранного в CLI:
/// - `--fields-file` -> tvquote_core::fields::read_fields_from_path
/// - `--fields`      -> tvquote_core::fields::parse_fields_csv
/// - ничего          -> полный набор по умолчанию
pub(crate) fn load_fields(args: &Args) -> Result<Vec<String>> {
    if let Some(path) = &args.fields_file {
        load_from_file(path)
    } else if let Some(raw) = &args.fields {
        load_from_arg(raw)
    } else {
        Ok(tvquote_core::fields::default_fields())
    }
}

fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref().to_path_buf();

    let fields = tvquote_core::fields::read_fields_from_path(&path).map_err(|e| {
        FieldsError::ReadFile {
            path: path.clone(),
            source: e,
        }
    })?;

    if fields.is_empty() {
        return Err(FieldsError::EmptyFromFile { path });
    }

    Ok(fields)
}

fn load_from_arg(raw: &str) -> Result<Vec<String>> {
    let fields = tvquote_core::fields::parse_fields_csv(raw);

    if fields.is_empty() {
        return Err(FieldsError::EmptyFromArg {
            raw: raw.to_string(),
        });
    }

    Ok(fields)
}
