//! # Showcase 設定
//!
//! 環境変数から Showcase サーバーの設定を読み込む。
//! リスナー関連（`SERVER_*`）は [`pavilion_web::StartOptions::from_env`] が担当する。

use std::env;

use anyhow::Context as _;

/// Showcase サーバーの設定
#[derive(Debug, Clone)]
pub struct ShowcaseConfig {
    /// PostgreSQL 接続 URL
    pub database_url: String,
    /// 適用するミドルウェア名（カンマ区切り）
    pub middleware:   String,
}

impl ShowcaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL が設定されていません")?,
            middleware:   env::var("SERVER_MIDDLEWARE")
                .unwrap_or_else(|_| "request-id,no-cache".to_string()),
        })
    }
}
