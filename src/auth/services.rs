use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser},
        jwt::JwtKeys,
        repo_types::User,
    },
    error::AppResult,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Issues an access/refresh pair for `user`.
pub(crate) fn issue_tokens(keys: &JwtKeys, user: User) -> AppResult<AuthResponse> {
    let access_token = keys.sign_access(&user)?;
    let refresh_token = keys.sign_refresh(&user)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("coach@fitcoach.vn"));
        assert!(!is_valid_email("coach"));
        assert!(!is_valid_email("coach@local"));
    }

    #[test]
    fn username_shape() {
        assert!(is_valid_username("lan.nguyen_92"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("lan@x"));
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Coach@FitCoach.VN "), "coach@fitcoach.vn");
    }
}
