use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use crate::error::AppError;

/// `Json` body extractor whose rejections go through [`AppError`], so a body
/// that does not match the request type is a 400 with the usual error shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Pulls the offending field path out of a serde body error, e.g.
/// `days[0].dayName` from `days[0]: missing field `dayName``.
pub(crate) fn body_error_field(message: &str) -> Option<String> {
    let detail = message
        .split_once("target type: ")
        .map_or(message, |(_, rest)| rest);

    let (path, reason) = match detail.split_once(": ") {
        Some((path, reason)) if !path.contains(' ') => (Some(path), reason),
        _ => (None, detail),
    };

    let missing = reason
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field);

    match (path, missing) {
        (Some(path), Some(field)) if path != "." => Some(format!("{path}.{field}")),
        (_, Some(field)) => Some(field.to_owned()),
        (Some(path), None) if path != "." => Some(path.to_owned()),
        _ => None,
    }
}
