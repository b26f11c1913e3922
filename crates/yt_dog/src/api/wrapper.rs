use std::borrow::Cow;

use anyhow::Error;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::IntoResponse;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

use crate::api::error::InnerApiError;
use crate::youtube::YouTubeError;

/// 成功时直接返回数据本身，失败时返回 { "error": message }
pub struct ApiResponse<T: Serialize> {
    status_code: StatusCode,
    data: Option<T>,
    message: Option<Cow<'static, str>>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status_code: StatusCode::OK,
            data: Some(data),
            message: None,
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::error(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_server_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn error(status_code: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        match self.data {
            Some(data) => (self.status_code, Json(data)).into_response(),
            None => (
                self.status_code,
                Json(json!({ "error": self.message.unwrap_or_default() })),
            )
                .into_response(),
        }
    }
}

pub struct ApiError(Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(value: E) -> Self {
        Self(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let Some(InnerApiError::BadRequest(_)) = self.0.downcast_ref::<InnerApiError>() {
            return ApiResponse::<()>::bad_request(self.0.to_string()).into_response();
        }
        if let Some(youtube_error) = self.0.downcast_ref::<YouTubeError>() {
            if youtube_error.is_not_found() {
                return ApiResponse::<()>::not_found(youtube_error.to_string()).into_response();
            }
            if matches!(youtube_error, YouTubeError::MissingApiKey) {
                return ApiResponse::<()>::internal_server_error(youtube_error.to_string()).into_response();
            }
        }
        error!("请求 YouTube 接口失败：{:#}", self.0);
        ApiResponse::<()>::internal_server_error(format!("{:#}", self.0)).into_response()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::from(InnerApiError::BadRequest(e.body_text())))?;
        value
            .validate()
            .map_err(|e| ApiError::from(InnerApiError::BadRequest(e.to_string())))?;
        Ok(ValidatedJson(value))
    }
}
