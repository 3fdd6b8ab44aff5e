//! # サーバーエラー
//!
//! サーバーの構築・起動で発生するエラーを定義する。
//! ルート単位のエラーは呼び出し側の責務であり、ここには含めない
//! （ハンドラは [`HttpResponse`](crate::HttpResponse) の便利メソッドで返す）。

use std::{io, net::SocketAddr, path::PathBuf};

use pavilion_infra::InfraError;
use thiserror::Error;

/// サーバー層で発生するエラー
#[derive(Debug, Error)]
pub enum ServerError {
    /// `start()` 時のデータベース接続失敗
    ///
    /// 内部でリトライはしない。リスナーは起動されない。
    #[error("データベース接続に失敗しました: {0}")]
    Database(#[from] InfraError),

    /// ポートのバインド失敗
    #[error("{addr} へのバインドに失敗しました: {source}")]
    Bind {
        addr:   SocketAddr,
        #[source]
        source: io::Error,
    },

    /// 存在する鍵・証明書ファイルの読み込み失敗
    #[error("TLS ファイルを読み込めません ({}): {source}", path.display())]
    TlsRead {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    /// 鍵・証明書の内容が空、または PEM として解釈できない
    #[error("TLS 設定が不正です: {0}")]
    Tls(String),

    /// rustls による設定構築の失敗（鍵と証明書の不一致など）
    #[error("TLS 設定の構築に失敗しました: {0}")]
    Rustls(#[from] rustls::Error),

    /// レジストリに存在しないミドルウェア名
    #[error("未登録のミドルウェアです: {0}")]
    UnknownMiddleware(String),

    /// 環境変数などからの設定読み込み失敗
    #[error("設定の読み込みに失敗しました: {0}")]
    Config(#[from] config::ConfigError),
}
