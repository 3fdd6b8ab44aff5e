//! # ミドルウェア
//!
//! ミドルウェアは `Router -> Router` の関数（[`MiddlewareFactory`]）として扱う。
//! 設定ファイルや環境変数からは名前で指定し、[`MiddlewareRegistry`] で
//! 静的に登録された関数に解決する。未登録の名前は設定ミスとしてエラーにする。
//!
//! ## 組み込みミドルウェア
//!
//! | 名前 | 内容 |
//! |------|------|
//! | `no-cache` | `Cache-Control: no-store` を付与 |
//! | `request-id` | `X-Request-Id` の生成・伝播とリクエストスパン |
//! | `cors` | すべてのオリジンを許可する CORS |
//! | `compression` | gzip 圧縮 |

pub mod cache_control;
pub mod request_id;

use std::sync::Arc;

use axum::Router;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

pub use cache_control::no_cache;

use crate::error::ServerError;

/// ルーターにレイヤーを追加する関数
///
/// サーバーはルーター組み立てのたびに呼び出すため `Fn` である。
pub type MiddlewareFactory = Arc<dyn Fn(Router) -> Router + Send + Sync>;

/// 任意の関数を [`MiddlewareFactory`] に変換する
pub fn factory<F>(f: F) -> MiddlewareFactory
where
    F: Fn(Router) -> Router + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 名前付きミドルウェアの一覧
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: Vec<(String, MiddlewareFactory)>,
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl MiddlewareRegistry {
    /// 空のレジストリ
    pub fn new() -> Self {
        Self::default()
    }

    /// 組み込みミドルウェアを登録済みのレジストリ
    pub fn with_builtins() -> Self {
        Self::new()
            .register("no-cache", cache_control::apply)
            .register("request-id", request_id::apply)
            .register("cors", |router: Router| router.layer(CorsLayer::permissive()))
            .register("compression", |router: Router| {
                router.layer(CompressionLayer::new())
            })
    }

    /// 名前を登録する（同名は後から登録したものが優先される）
    pub fn register<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Router) -> Router + Send + Sync + 'static,
    {
        let name = name.into().to_ascii_lowercase();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, factory(f)));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<MiddlewareFactory> {
        let name = name.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, f)| Arc::clone(f))
    }

    /// 名前の並びを指定順のファクトリに解決する
    ///
    /// 空の名前は無視する。1 つでも未登録の名前があればエラー。
    pub fn resolve<I, S>(&self, names: I) -> Result<Vec<MiddlewareFactory>, ServerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .map(|name| match self.get(&name) {
                Some(f) => Ok(f),
                None => Err(ServerError::UnknownMiddleware(name)),
            })
            .collect()
    }

    /// カンマ区切りの名前リストを解決する（例: `"request-id,no-cache"`）
    pub fn resolve_list(&self, list: &str) -> Result<Vec<MiddlewareFactory>, ServerError> {
        self.resolve(list.split(','))
    }
}
