//! Registration and login orchestration.
//!
//! Each operation is one check-then-act sequence ending either in a signed
//! token or an [`AuthError`]. Nothing is written unless a token can follow.
//!
//! "User not found" and "Invalid password" are distinct on purpose, which
//! means a caller can tell whether an email is registered.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::Passwords,
    repo::{StoreError, UserStore},
    repo_types::NewUser,
};
use crate::error::AuthError;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    users: &dyn UserStore,
    passwords: &Passwords,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> Result<String, AuthError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AuthError::InvalidInput("Invalid email".into()));
    }
    if req.password.is_empty() {
        return Err(AuthError::InvalidInput("Password is required".into()));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AuthError::Conflict);
    }

    let password_hash = passwords.hash(&req.password)?;
    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let user = match users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        // lost a race with a concurrent register for the same email
        Err(StoreError::Duplicate) => return Err(AuthError::Conflict),
        Err(StoreError::Other(e)) => return Err(AuthError::Internal(e)),
    };

    let token = keys.sign(&user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(token)
}

pub async fn login(
    users: &dyn UserStore,
    passwords: &Passwords,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<String, AuthError> {
    let email = normalize_email(&req.email);

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AuthError::NotFound);
    };

    if !passwords.verify(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredential);
    }

    let token = keys.sign(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
