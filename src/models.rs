use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = 7)]
    pub employee_id: i64,
    #[schema(example = "1234")]
    pub pin: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub employee_id: i64,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Employee display name
    pub sub: String,
    pub employee_id: i64,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
