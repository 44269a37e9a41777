//! Auth handlers. Identity, token issuance and password-reset flows are
//! delegated to the user pool; the only local side effect is the
//! insert-if-absent of the `users` row on sign-up and login.

use axum::{extract::State, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::decode_id_claims;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthContext};
use crate::state::AppState;

const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmSignUpBody {
    pub email: String,
    #[serde(rename = "confirmationCode")]
    pub confirmation_code: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestConfirmationCodeBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetBody {
    pub email: String,
    #[serde(rename = "confirmationCode")]
    pub confirmation_code: String,
    pub password: String,
}

/// Access and id tokens returned in the body; the refresh token travels
/// only in the cookie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub id_token: String,
}

/// Cross-site cookie carrying the refresh token for 30 days.
fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(time::Duration::days(30))
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .build()
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignUpBody>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to sign up new user";

    let subject = state
        .idp
        .sign_up(&body.email, &body.password, &body.given_name, &body.family_name)
        .await
        .map_err(|e| ApiError::internal(MESSAGE, e))?;

    let subject_id: uuid::Uuid = subject
        .parse()
        .map_err(|_| ApiError::internal(MESSAGE, "identity provider returned a non-uuid subject"))?;

    sqlx::query(
        "INSERT INTO users (id, email, given_name, family_name, created_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(subject_id)
    .bind(&body.email)
    .bind(&body.given_name)
    .bind(&body.family_name)
    .bind(Utc::now())
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    Ok(ApiResponse::created_message("Successfully signed up new user"))
}

/// POST /auth/confirm-signup
pub async fn confirm_signup(
    State(state): State<AppState>,
    Json(body): Json<ConfirmSignUpBody>,
) -> Result<ApiResponse, ApiError> {
    state
        .idp
        .confirm_sign_up(&body.email, &body.confirmation_code)
        .await
        .map_err(|e| ApiError::internal("Failed to confirm sign up", e))?;

    Ok(ApiResponse::message("Successfully confirmed sign up"))
}

/// POST /auth/signup/resend
pub async fn resend_signup(
    State(state): State<AppState>,
    Json(body): Json<RequestConfirmationCodeBody>,
) -> Result<ApiResponse, ApiError> {
    state
        .idp
        .resend_confirmation(&body.email)
        .await
        .map_err(|e| ApiError::internal("Failed to resend sign up confirmation code", e))?;

    Ok(ApiResponse::message(
        "Successfully resent sign up confirmation code",
    ))
}

/// POST /auth/login - password grant. Upserts the local user row from
/// the id token's profile claims, sets the refresh cookie and returns
/// access/id tokens in the body.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, ApiResponse<SessionTokens>), ApiError> {
    const MESSAGE: &str = "Failed to login returning user";

    let tokens = state
        .idp
        .login(&body.email, &body.password)
        .await
        .map_err(|e| ApiError::internal(MESSAGE, e))?;

    let refresh_token = tokens
        .refresh_token
        .clone()
        .ok_or_else(|| ApiError::internal(MESSAGE, "user pool tokens were not generated"))?;

    let claims = decode_id_claims(&tokens.id_token)
        .map_err(|e| ApiError::internal(MESSAGE, e))?;

    sqlx::query(
        "INSERT INTO users (id, email, given_name, family_name, created_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(claims.sub)
    .bind(&claims.email)
    .bind(&claims.given_name)
    .bind(&claims.family_name)
    .bind(Utc::now())
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    let jar = jar.add(refresh_cookie(refresh_token));

    Ok((
        jar,
        ApiResponse::ok(
            "Successfully logged in returning user",
            SessionTokens {
                access_token: tokens.access_token,
                id_token: tokens.id_token,
            },
        ),
    ))
}

/// GET /auth/me - exchanges the refresh cookie for fresh tokens. Any
/// failure is 401 so the client falls back to a full login.
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<SessionTokens>), ApiError> {
    const MESSAGE: &str = "Failed to get user";

    let refresh_token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::unauthorized(MESSAGE, "Refresh token not found in cookies"))?;

    let tokens = state
        .idp
        .refresh(&refresh_token)
        .await
        .map_err(|e| ApiError::unauthorized(MESSAGE, e))?;

    // Re-set the cookie with the rotated token when the pool returns one.
    let rotated = tokens.refresh_token.clone().unwrap_or(refresh_token);
    let jar = jar.add(refresh_cookie(rotated));

    Ok((
        jar,
        ApiResponse::ok(
            "Successfully regenerated tokens",
            SessionTokens {
                access_token: tokens.access_token,
                id_token: tokens.id_token,
            },
        ),
    ))
}

/// POST /auth/logout - global sign-out and cookie removal.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse), ApiError> {
    state
        .idp
        .global_sign_out(&auth.subject_id.to_string())
        .await
        .map_err(|e| ApiError::internal("Failed to logout user", e))?;

    let jar = jar.remove(removal_cookie());

    Ok((jar, ApiResponse::message("Successfully logged out user")))
}

/// POST /auth/reset-password - request a reset code by email.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<RequestConfirmationCodeBody>,
) -> Result<ApiResponse, ApiError> {
    state
        .idp
        .request_password_reset(&body.email)
        .await
        .map_err(|e| ApiError::internal("Failed to request password reset", e))?;

    Ok(ApiResponse::message("Successfully requested password reset"))
}

/// PUT /auth/reset-password - confirm with code and new password.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetBody>,
) -> Result<ApiResponse, ApiError> {
    state
        .idp
        .confirm_password_reset(&body.email, &body.confirmation_code, &body.password)
        .await
        .map_err(|e| ApiError::internal("Failed to reset password", e))?;

    Ok(ApiResponse::message("Successfully reset password"))
}

/// DELETE /auth/me - deletes the identity-provider user and clears the
/// refresh cookie. The local row is kept (boards may reference it).
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse), ApiError> {
    state
        .idp
        .delete_user(&auth.subject_id.to_string())
        .await
        .map_err(|e| ApiError::internal("Failed to delete user", e))?;

    let jar = jar.remove(removal_cookie());

    Ok((jar, ApiResponse::message("Successfully deleted user")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_is_cross_site_and_http_only() {
        let cookie = refresh_cookie("token-value".to_string());
        assert_eq!(cookie.name(), "refreshToken");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn session_tokens_serialize_camel_case() {
        let json = serde_json::to_value(SessionTokens {
            access_token: "a".to_string(),
            id_token: "b".to_string(),
        })
        .unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["idToken"], "b");
    }
}
