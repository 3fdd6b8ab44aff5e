//! # レスポンスエンベロープビルダー
//!
//! ハンドラごとに 1 つ作成し、ステータスやエラーコードをチェーンで設定して
//! 最後に [`send`](HttpResponse::send) で `{ data, error }` を返す。
//!
//! ```rust,ignore
//! async fn show(res: HttpResponse, Path(id): Path<u64>) -> Response {
//!     match find(id).await {
//!         Some(user) => res.send(user),
//!         None => res.not_exist("ユーザーが見つかりません", ()),
//!     }
//! }
//! ```
//!
//! ## `error` が出力される条件
//!
//! ステータスが 200 を超える場合（201 や 3xx を含む）は常に `error` オブジェクトを出力する。
//! 200 以下では `error` は `null`。コードやメッセージを設定していても 200 では出力されない。

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use pavilion_shared::{ContentType, Envelope, ErrorBody, ErrorCode, HeaderStatus, Message, Trace};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    cookie::{CookieDirective, DEFAULT_COOKIE_TIMEOUT_MS},
    environment::Environment,
};

/// ハンドラに注入されるレスポンス設定
///
/// サーバーが request extensions に格納し、[`HttpResponse`] の抽出時に読み取る。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSettings {
    /// 本番環境では Cookie に `Secure` を付与する
    pub environment:       Environment,
    /// ディレクティブにタイムアウトがない Cookie の有効期限（ミリ秒）
    pub cookie_timeout_ms: i64,
}

impl Default for ResponseSettings {
    fn default() -> Self {
        Self {
            environment:       Environment::default(),
            cookie_timeout_ms: DEFAULT_COOKIE_TIMEOUT_MS,
        }
    }
}

impl ResponseSettings {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    pub fn cookie_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.cookie_timeout_ms = timeout_ms;
        self
    }

    /// `APP_ENV` と `COOKIE_TIMEOUT_MS` から読み取る
    pub fn from_env() -> Self {
        let cookie_timeout_ms = std::env::var("COOKIE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COOKIE_TIMEOUT_MS);
        Self::new(Environment::from_env()).cookie_timeout_ms(cookie_timeout_ms)
    }
}

/// レスポンスエンベロープビルダー
///
/// 1 リクエストにつき 1 つ。`send` で消費されるため再利用できない。
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status:       StatusCode,
    content_type: ContentType,
    message:      Option<String>,
    code:         Option<String>,
    traces:       Vec<Trace>,
    cookies:      CookieJar,
    settings:     ResponseSettings,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::with_settings(ResponseSettings::default())
    }
}

impl HttpResponse {
    /// ステータス 200、`application/json` で作成する
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ResponseSettings) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: ContentType::Json,
            message: None,
            code: None,
            traces: Vec::new(),
            cookies: CookieJar::new(),
            settings,
        }
    }

    pub fn status(mut self, status: impl Into<StatusCode>) -> Self {
        self.status = status.into();
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// トレースを置き換える
    pub fn traces<I, T>(mut self, traces: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Trace>,
    {
        self.traces = traces.into_iter().map(Into::into).collect();
        self
    }

    /// Cookie ディレクティブを追加する
    ///
    /// ディレクティブ 1 件につき Set-Cookie 1 件。正規化規則は [`crate::cookie`] を参照。
    /// `Secure` は本番環境のときのみ付与する。
    pub fn cookie<K, I>(mut self, directives: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CookieDirective)>,
    {
        let secure = self.settings.environment.is_production();
        let now = OffsetDateTime::now_utc();

        for (name, directive) in directives {
            let cookie = directive
                .normalize(self.settings.cookie_timeout_ms)
                .into_cookie(name, secure, now);
            self.cookies = self.cookies.add(cookie);
        }
        self
    }

    /// エンベロープ本体を計算する
    pub fn get<T>(&self, data: T) -> Envelope<T> {
        if self.has_error_status() {
            Envelope::failure(
                data,
                ErrorBody {
                    message: self.message.clone(),
                    code:    self.code.clone(),
                    traces:  self.traces.clone(),
                },
            )
        } else {
            Envelope::success(data)
        }
    }

    // 400 以上も含め、200 を超えるステータスはすべてエラー扱い
    fn has_error_status(&self) -> bool {
        self.status.as_u16() > HeaderStatus::Success.as_u16()
    }

    /// ステータス・Content-Type・Cookie・JSON 本体をまとめて返す
    ///
    /// `data` に `()` を渡すと `"data": null` になる。
    pub fn send<T: Serialize>(self, data: T) -> Response {
        let body = match serde_json::to_vec(&self.get(data)) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    error.category = "serialization",
                    "レスポンスのシリアライズに失敗しました: {}",
                    e
                );
                return internal_fallback();
            }
        };

        (
            self.status,
            self.cookies,
            [(header::CONTENT_TYPE, self.content_type.header_value())],
            body,
        )
            .into_response()
    }

    /// 400 / `ERR_DATA_NOT_EXIST`
    pub fn not_exist<T: Serialize>(self, message: impl Into<String>, data: T) -> Response {
        self.status(HeaderStatus::Invalid)
            .code(ErrorCode::NotExist)
            .message(message)
            .send(data)
    }

    /// 400 / `ERR_DATA_EXISTED`
    pub fn existed<T: Serialize>(self, message: impl Into<String>, data: T) -> Response {
        self.status(HeaderStatus::Invalid)
            .code(ErrorCode::Existed)
            .message(message)
            .send(data)
    }

    /// 400 / `ERR_DATA_INVALID`
    pub fn invalid<T: Serialize>(self, message: impl Into<String>, data: T) -> Response {
        self.status(HeaderStatus::Invalid)
            .code(ErrorCode::Invalid)
            .message(message)
            .send(data)
    }

    /// 401 / `ERR_AUTH_FAILURE`
    pub fn authorize(self) -> Response {
        self.status(HeaderStatus::Authorize)
            .code(ErrorCode::AuthFailure)
            .message(Message::Authorize)
            .send(())
    }

    /// 500 / `ERR_INTERNAL_SERVER`
    ///
    /// メッセージは固定値（内部情報を漏らさないため）。
    pub fn internal(self) -> Response {
        self.status(HeaderStatus::Internal)
            .code(ErrorCode::Internal)
            .message(Message::Internal)
            .send(())
    }
}

/// シリアライズできなかった場合の 500 レスポンス
fn internal_fallback() -> Response {
    let envelope = Envelope::failure(
        (),
        ErrorBody {
            message: Some(Message::Internal.into()),
            code:    Some(ErrorCode::Internal.into()),
            traces:  Vec::new(),
        },
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, ContentType::Json.header_value())],
        serde_json::to_vec(&envelope).unwrap_or_default(),
    )
        .into_response()
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        self.send(())
    }
}

impl<S> FromRequestParts<S> for HttpResponse
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let settings = parts
            .extensions
            .get::<ResponseSettings>()
            .copied()
            .unwrap_or_default();
        Ok(Self::with_settings(settings))
    }
}
