use std::path::Path;

use mime::Mime;

use crate::error::{AppError, AppResult};

struct AllowedType {
    extensions: &'static [&'static str],
    content_types: &'static [&'static str],
}

const ALLOWED_TYPES: &[AllowedType] = &[
    AllowedType {
        extensions: &["pdf"],
        content_types: &["application/pdf"],
    },
    AllowedType {
        extensions: &["doc"],
        content_types: &["application/msword"],
    },
    AllowedType {
        extensions: &["docx"],
        content_types: &[
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ],
    },
    AllowedType {
        extensions: &["txt"],
        content_types: &["text/plain"],
    },
    AllowedType {
        extensions: &["png"],
        content_types: &["image/png"],
    },
    AllowedType {
        extensions: &["jpg", "jpeg"],
        content_types: &["image/jpeg", "image/pjpeg"],
    },
    AllowedType {
        extensions: &["xls"],
        content_types: &["application/vnd.ms-excel"],
    },
    AllowedType {
        extensions: &["xlsx"],
        content_types: &["application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"],
    },
    AllowedType {
        extensions: &["ppt"],
        content_types: &["application/vnd.ms-powerpoint"],
    },
    AllowedType {
        extensions: &["pptx"],
        content_types: &[
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ],
    },
];

const REJECTION: &str =
    "Invalid file type. Allowed: PDF, DOC, DOCX, TXT, PNG, JPG, XLS, XLSX, PPT, PPTX";

pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Checks the name and declared type against the allow-list and returns the content type to
/// store. Generic or missing declared types fall back to the canonical type of the extension.
pub fn resolve_content_type(file_name: &str, declared: Option<&str>) -> AppResult<&'static str> {
    let extension =
        extension_of(file_name).ok_or_else(|| AppError::InvalidFileType(REJECTION.to_string()))?;

    let allowed = ALLOWED_TYPES
        .iter()
        .find(|entry| entry.extensions.contains(&extension.as_str()))
        .ok_or_else(|| AppError::InvalidFileType(REJECTION.to_string()))?;

    let declared = declared
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<Mime>().ok());

    match declared {
        None => Ok(allowed.content_types[0]),
        Some(mime) if mime == mime::APPLICATION_OCTET_STREAM => Ok(allowed.content_types[0]),
        Some(mime) => allowed
            .content_types
            .iter()
            .find(|candidate| mime.essence_str().eq_ignore_ascii_case(candidate))
            .copied()
            .ok_or_else(|| AppError::InvalidFileType(REJECTION.to_string())),
    }
}
