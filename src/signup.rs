use actix_web::web::{Data, Json};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use log::{debug, error};

use crate::errors::ApiError;
use crate::helpers::respond_json;
use crate::models::{NewUser, PublicUser};
use crate::server::AppState;
use crate::validation::validate_new_user;

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(1024, 2, 1, Some(32)).unwrap();
    let argon2 = Argon2::new(Algorithm::Argon2i, Version::V0x13, params);
    let hashed_password = argon2.hash_password(password.as_bytes(), &salt)?.to_string();
    Ok(hashed_password)
}

/// `POST /sign-up`: re-validate the candidate, hash its password, insert it
/// if the email is unused, and respond with the full registry. Credentials
/// never appear in any response body.
pub async fn sign_up(
    state: Data<AppState>,
    body: Json<NewUser>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let candidate = body.into_inner();

    // The client validates too, but its word is not trusted.
    if let Some((field, message)) = validate_new_user(&candidate).into_iter().next() {
        debug!("rejected sign-up: invalid {}: {}", field, message);
        return Err(ApiError::Validation { field, message });
    }

    let password_hash = hash_password(&candidate.password).map_err(|e| {
        error!("password hashing failed: {}", e);
        ApiError::InternalServerError
    })?;

    let email = candidate.email.clone();
    let record = state
        .registry
        .insert(candidate, password_hash)
        .await
        .map_err(|err| {
            debug!("rejected sign-up: email {} is already registered", email);
            ApiError::from(err)
        })?;
    debug!("registered user id={} email={}", record.id, record.email);

    let users = state
        .registry
        .all()
        .await
        .iter()
        .map(PublicUser::from)
        .collect();
    respond_json(users)
}
