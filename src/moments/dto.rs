use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub points: i64,
}
