//! Route tables, one module per resource group.
//!
//! Creates answer `201` with the stored entity, deletes answer `204`.

pub mod audit;
pub mod comments;
pub mod estimates;
pub mod notifications;
pub mod personnel;
pub mod projects;
pub mod reports;
pub mod warehouse;

use axum::extract::Multipart;
use brig_db::import::SheetRow;

use crate::error::ApiError;
use crate::sheet::parse_workbook;

/// Read the uploaded workbook from a multipart form. The part named `file`
/// wins; otherwise the first part carrying a file name is used.
async fn uploaded_rows(mut form: Multipart) -> Result<Vec<SheetRow>, ApiError> {
    let mut upload = None;
    while let Some(field) = form.next_field().await.map_err(ApiError::import_failed)? {
        let is_file_part = field.name() == Some("file");
        if is_file_part || (upload.is_none() && field.file_name().is_some()) {
            upload = Some(field.bytes().await.map_err(ApiError::import_failed)?);
            if is_file_part {
                break;
            }
        }
    }
    let bytes = upload.ok_or_else(|| ApiError::BadRequest("no file uploaded".to_string()))?;
    parse_workbook(bytes.to_vec()).map_err(ApiError::import_failed)
}
