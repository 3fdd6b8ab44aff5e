//! # ヘッダーステータス
//!
//! エンベロープで頻繁に使う HTTP ステータスコードの列挙。

use http::StatusCode;

/// よく使う HTTP ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum HeaderStatus {
    Success   = 200,
    Invalid   = 400,
    Authorize = 401,
    Forbidden = 403,
    NotFound  = 404,
    Internal  = 500,
}

impl HeaderStatus {
    /// 数値のステータスコード
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl From<HeaderStatus> for u16 {
    fn from(status: HeaderStatus) -> Self {
        status.as_u16()
    }
}

impl From<HeaderStatus> for StatusCode {
    fn from(status: HeaderStatus) -> Self {
        match status {
            HeaderStatus::Success => StatusCode::OK,
            HeaderStatus::Invalid => StatusCode::BAD_REQUEST,
            HeaderStatus::Authorize => StatusCode::UNAUTHORIZED,
            HeaderStatus::Forbidden => StatusCode::FORBIDDEN,
            HeaderStatus::NotFound => StatusCode::NOT_FOUND,
            HeaderStatus::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
