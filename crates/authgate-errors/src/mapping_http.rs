use crate::model::ErrorObj;
use http::StatusCode;

pub fn to_http_status(err: &ErrorObj) -> StatusCode {
    StatusCode::from_u16(err.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
