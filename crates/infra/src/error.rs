//! # インフラ層エラー定義
//!
//! データベース接続で発生するエラーを表現する。
//! サーバー層はこのエラーを `ServerError::Database` に包んで呼び出し元へ伝播する。

use thiserror::Error;

/// インフラ層で発生するエラー
#[derive(Debug, Error)]
pub enum InfraError {
    /// データベースエラー
    ///
    /// 接続失敗、認証エラー、接続取得のタイムアウトなど。
    #[error("データベースエラー: {0}")]
    Database(#[from] sqlx::Error),

    /// `connect()` 前にプールを参照した
    #[error("データベースに接続されていません")]
    NotConnected,

    /// 接続先が利用できない
    ///
    /// sqlx 以外の実装（モック等）が接続失敗を表すために使う。
    #[error("データベースが利用できません: {0}")]
    Unavailable(String),
}
