use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{config::APP_CONFIG, errors::Error as AppError, models::accounts::Account};

use super::types::TokenClaims;

/// JWT decode function
pub fn decode_jwt(token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let secret_key = &APP_CONFIG.jwt_secret_key;
    let decoding_key = DecodingKey::from_secret(secret_key.as_ref());
    let validation = Validation::new(Algorithm::HS256);

    decode::<TokenClaims>(token, &decoding_key, &validation).map(|data| data.claims)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtAuth(pub TokenClaims);

impl<S> FromRequestParts<S> for JwtAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, _state)
                .await
                .map_err(|_| AppError::unauthorized("Authorization header missing"))?;

        let token_data =
            decode_jwt(bearer.token()).map_err(|_| AppError::unauthorized("Invalid jwt token"))?;

        let user_info = Account::get_by_user_id(&token_data.user_id).await?;

        let _ = user_info.ok_or_else(|| {
            AppError::unauthorized("The user belonging to this token no longer exists")
        })?;

        Ok(JwtAuth(token_data))
    }
}
