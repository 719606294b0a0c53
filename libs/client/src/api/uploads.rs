use crewdesk_core::UploadResult;

use crate::error::ApiError;
use crate::http::ApiClient;

/// Uploads one file as multipart form data and returns where it landed.
pub async fn upload_file(
    client: &ApiClient,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<UploadResult, ApiError> {
    client.upload("/uploads", filename, bytes).await
}
