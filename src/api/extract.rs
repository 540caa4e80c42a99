use crate::application::ErrorBody;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;

/// 当前登录用户。会话管理属于外部协作方：上游认证网关校验会话后
/// 以x-user-id头标识用户透传进来，本服务只消费该身份。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .map(|id| CurrentUser { id })
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Login required")),
            ))
    }
}
