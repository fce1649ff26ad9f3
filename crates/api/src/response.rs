//! The `{"data": ...}` envelope every board endpoint answers with.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `200 OK` with `value` wrapped in the envelope.
pub fn data<T: Serialize>(value: T) -> Json<DataResponse<T>> {
    Json(DataResponse { data: value })
}

/// `201 Created` with the new resource wrapped in the envelope.
pub fn created<T: Serialize>(value: T) -> (StatusCode, Json<DataResponse<T>>) {
    (StatusCode::CREATED, data(value))
}
