use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    accounts::{self, User, UserProfile},
    error::{AppError, AppResult},
    sessions::{self, Session},
    web::{AppState, responses::Success},
};

pub const SESSION_COOKIE: &str = "edushare_session";

const MIN_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub remember_me: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ValidSignup<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub grade: Option<&'a str>,
}

/// Checks the signup payload in order and reports the first problem found.
pub(crate) fn validate_signup(request: &SignupRequest) -> AppResult<ValidSignup<'_>> {
    let name = request.name.as_deref().map(str::trim).unwrap_or_default();
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::validation(
            "Name, email, and password are required",
        ));
    }

    if name.chars().count() < MIN_NAME_CHARS {
        return Err(AppError::validation("Name must be at least 2 characters"));
    }

    if !is_valid_email(email) {
        return Err(AppError::validation("Invalid email format"));
    }

    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::validation(
            "Password must be at least 6 characters",
        ));
    }

    if let Some(confirm) = request.confirm_password.as_deref() {
        if confirm != password {
            return Err(AppError::validation("Passwords do not match"));
        }
    }

    Ok(ValidSignup {
        name,
        email,
        password,
        grade: request
            .grade
            .as_deref()
            .map(str::trim)
            .filter(|grade| !grade.is_empty()),
    })
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(idx, ch)| ch == '.' && idx > 0 && idx + 1 < domain.len())
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let Json(request) = payload.map_err(|_| AppError::validation("Malformed request body"))?;
    let signup = validate_signup(&request)?;

    let password_hash = accounts::hash_password(signup.password).map_err(|err| {
        error!(?err, "failed to hash password during signup");
        AppError::Internal("password hashing failed".to_string())
    })?;

    let user = accounts::create_user(
        state.pool_ref(),
        signup.name,
        signup.email,
        &password_hash,
        signup.grade,
    )
    .await?;

    let session = sessions::create(state.pool_ref(), user.id, false).await?;
    let jar = jar.add(session_cookie(&session));

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: user.profile(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let Json(request) = payload.map_err(|_| AppError::validation("Malformed request body"))?;

    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let user = accounts::find_by_email(state.pool_ref(), email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !accounts::verify_password(password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let remember_me = request.remember_me.unwrap_or(false);
    let session = sessions::create(state.pool_ref(), user.id, remember_me).await?;
    info!(user_id = %user.id, remember_me, "user logged in");

    let jar = jar.add(session_cookie(&session));
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: user.profile(),
        }),
    ))
}

/// Always succeeds; an unknown or missing session simply has nothing to destroy.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Success>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(err) = sessions::destroy(state.pool_ref(), cookie.value()).await {
            error!(?err, "failed to remove session during logout");
        }
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));

    (jar.remove(removal), Success::ok())
}

pub async fn me(State(state): State<AppState>, jar: CookieJar) -> AppResult<Json<MeResponse>> {
    let user = current_user(&state, &jar).await?;
    Ok(Json(MeResponse {
        user: user.profile(),
    }))
}

/// Resolves the session cookie to a user, failing with `Unauthenticated` before any other work.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> AppResult<User> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());
    let user_id = sessions::validate(state.pool_ref(), token).await?;

    accounts::find_by_id(state.pool_ref(), user_id)
        .await?
        .ok_or(AppError::Unauthenticated)
}

fn session_cookie(session: &Session) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::seconds(session.ttl().num_seconds()));
    cookie
}
