use actix_web::web::Json;
use serde::Serialize;

use crate::errors::ApiError;

pub fn respond_json<T: Serialize>(data: T) -> Result<Json<T>, ApiError> {
    Ok(Json(data))
}
