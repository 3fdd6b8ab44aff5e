//! # Cookie ディレクティブ
//!
//! `名前 → ディレクティブ` の並びを、Set-Cookie 1 件ずつに正規化する。
//!
//! ## ディレクティブの形
//!
//! | 形 | 値 | 有効期限 | HttpOnly |
//! |----|----|----------|----------|
//! | `"x"` | `x` | デフォルト | `false` |
//! | `("x", 5000)` | `x` | 5000 ms | `true` |
//! | `("x", 5000, true)` | `x` | 5000 ms | `false` |
//! | `("x", 0, false)` | `x` | デフォルト | `true` |
//! | `("x", false)` | `x` | デフォルト | `true` |
//! | `("x", true)` | `x` | デフォルト | `false` |
//!
//! タプルの HttpOnly 指定は反転して適用される（`true` を渡すと HttpOnly なし）。
//! 既存クライアントがこの挙動に依存しているため、反転はそのまま維持する。

use std::fmt;

use axum_extra::extract::cookie::Cookie;
use time::{Duration, OffsetDateTime};

/// ディレクティブに有効期限がないときのタイムアウト（ミリ秒、1 日）
pub const DEFAULT_COOKIE_TIMEOUT_MS: i64 = 86_400_000;

/// `Expires` に設定できる最大の日時（9999-12-31T23:59:59Z）
pub const MAX_EXPIRES_UNIX: i64 = 253_402_300_799;

/// `名前 → ディレクティブ` の並び（順序を保持する）
pub type CookieParameters = Vec<(String, CookieDirective)>;

/// Cookie の値（文字列または整数）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieValue {
    Text(String),
    Integer(i64),
}

impl fmt::Display for CookieValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for CookieValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CookieValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CookieValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for CookieValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for CookieValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// タプル 2 番目の要素: 数値ならタイムアウト、真偽値なら HttpOnly 指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutOrHttpOnly {
    Timeout(i64),
    HttpOnly(bool),
}

impl From<i64> for TimeoutOrHttpOnly {
    fn from(ms: i64) -> Self {
        Self::Timeout(ms)
    }
}

impl From<i32> for TimeoutOrHttpOnly {
    fn from(ms: i32) -> Self {
        Self::Timeout(i64::from(ms))
    }
}

impl From<bool> for TimeoutOrHttpOnly {
    fn from(flag: bool) -> Self {
        Self::HttpOnly(flag)
    }
}

/// Cookie 1 件分の指示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieDirective {
    /// 値のみ
    Value(CookieValue),
    /// `(値, タイムアウトまたは HttpOnly, HttpOnly)`
    Options(CookieValue, Option<TimeoutOrHttpOnly>, Option<bool>),
}

impl CookieDirective {
    /// 有効期限と HttpOnly を確定させる
    pub fn normalize(&self, default_timeout_ms: i64) -> NormalizedCookie {
        match self {
            Self::Value(value) => NormalizedCookie {
                value:      value.to_string(),
                timeout_ms: default_timeout_ms,
                http_only:  false,
            },
            Self::Options(value, second, third) => {
                let (timeout_ms, http_only) = match second {
                    Some(TimeoutOrHttpOnly::Timeout(ms)) => {
                        let timeout = if *ms > 0 { *ms } else { default_timeout_ms };
                        (timeout, !third.unwrap_or(false))
                    }
                    Some(TimeoutOrHttpOnly::HttpOnly(flag)) => (default_timeout_ms, !flag),
                    None => (default_timeout_ms, true),
                };
                NormalizedCookie {
                    value: value.to_string(),
                    timeout_ms,
                    http_only,
                }
            }
        }
    }
}

impl From<&str> for CookieDirective {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for CookieDirective {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<i64> for CookieDirective {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<i32> for CookieDirective {
    fn from(value: i32) -> Self {
        Self::Value(value.into())
    }
}

impl<V: Into<CookieValue>> From<(V,)> for CookieDirective {
    fn from((value,): (V,)) -> Self {
        Self::Options(value.into(), None, None)
    }
}

impl<V, T> From<(V, T)> for CookieDirective
where
    V: Into<CookieValue>,
    T: Into<TimeoutOrHttpOnly>,
{
    fn from((value, second): (V, T)) -> Self {
        Self::Options(value.into(), Some(second.into()), None)
    }
}

impl<V, T> From<(V, T, bool)> for CookieDirective
where
    V: Into<CookieValue>,
    T: Into<TimeoutOrHttpOnly>,
{
    fn from((value, second, third): (V, T, bool)) -> Self {
        Self::Options(value.into(), Some(second.into()), Some(third))
    }
}

/// 正規化済みの Cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCookie {
    pub value:      String,
    pub timeout_ms: i64,
    pub http_only:  bool,
}

impl NormalizedCookie {
    /// Set-Cookie 用の Cookie を構築する
    ///
    /// `expires` は `now + timeout`（[`MAX_EXPIRES_UNIX`] で頭打ち）、パスは `/` 固定。
    pub fn into_cookie(
        self,
        name: impl Into<String>,
        secure: bool,
        now: OffsetDateTime,
    ) -> Cookie<'static> {
        Cookie::build((name.into(), self.value))
            .path("/")
            .http_only(self.http_only)
            .secure(secure)
            .expires(expires_at(now, self.timeout_ms))
            .build()
    }
}

/// `now + timeout_ms`。表現できない日時は `Expires` の上限に丸める
fn expires_at(now: OffsetDateTime, timeout_ms: i64) -> OffsetDateTime {
    let max = OffsetDateTime::from_unix_timestamp(MAX_EXPIRES_UNIX).unwrap_or(now);
    match now.checked_add(Duration::milliseconds(timeout_ms)) {
        Some(expires) if expires <= max => expires,
        _ => max,
    }
}
