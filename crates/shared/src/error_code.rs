//! # エラーコードと固定メッセージ
//!
//! クライアントが機械的に判定する `code` 文字列と、
//! 便利レスポンスが使う固定メッセージを定義する。
//! コード文字列は外部契約のため変更しないこと。

use serde::Serialize;
use strum::{AsRefStr, Display, IntoStaticStr};

/// 機械判定用エラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, IntoStaticStr)]
pub enum ErrorCode {
    #[serde(rename = "ERR_DATA_NOT_EXIST")]
    #[strum(serialize = "ERR_DATA_NOT_EXIST")]
    NotExist,
    #[serde(rename = "ERR_DATA_EXISTED")]
    #[strum(serialize = "ERR_DATA_EXISTED")]
    Existed,
    #[serde(rename = "ERR_DATA_INVALID")]
    #[strum(serialize = "ERR_DATA_INVALID")]
    Invalid,
    #[serde(rename = "ERR_AUTH_FAILURE")]
    #[strum(serialize = "ERR_AUTH_FAILURE")]
    AuthFailure,
    #[serde(rename = "ERR_INTERNAL_SERVER")]
    #[strum(serialize = "ERR_INTERNAL_SERVER")]
    Internal,
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_ref().to_string()
    }
}

/// 固定メッセージ
///
/// 内部情報を漏らさないよう、認証失敗と内部エラーは常に同じ文言を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, IntoStaticStr)]
pub enum Message {
    #[strum(serialize = "Authorization failure")]
    Authorize,
    #[strum(serialize = "Forbidden")]
    Forbidden,
    #[strum(serialize = "Resource not found")]
    NotFound,
    #[strum(serialize = "Internal server error")]
    Internal,
}

impl From<Message> for String {
    fn from(message: Message) -> Self {
        message.as_ref().to_string()
    }
}
