//! # Showcase サーバー
//!
//! `pavilion-web` の使用例となるアプリケーション。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `APP_ENV` | No | `development` / `staging` / `production`（本番では Cookie に `Secure`） |
//! | `COOKIE_TIMEOUT_MS` | No | Cookie のデフォルト有効期限（ミリ秒） |
//! | `SERVER_MIDDLEWARE` | No | 適用するミドルウェア名（デフォルト: `request-id,no-cache`） |
//! | `SERVER_*` | No | リスナー設定（[`pavilion_web::StartOptions`] を参照） |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! DATABASE_URL=postgres://... SERVER_HTTP_PORT=4000 cargo run -p pavilion-showcase
//! ```

mod config;
mod handler;

use config::ShowcaseConfig;
use handler::{UserStore, status_routes, user_routes};
use pavilion_infra::PgDatabase;
use pavilion_shared::observability::{TracingConfig, init_tracing};
use pavilion_web::{MiddlewareRegistry, ResponseSettings, Server, ServerOptions, StartOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let _tracing_guard = init_tracing(&TracingConfig::from_env("showcase")).entered();

    let config = ShowcaseConfig::from_env()?;
    let start = StartOptions::from_env()?;
    let middleware = MiddlewareRegistry::with_builtins().resolve_list(&config.middleware)?;
    let response = ResponseSettings::from_env();

    tracing::info!(
        environment = ?response.environment,
        middleware = %config.middleware,
        "Showcase サーバーを起動します"
    );

    let options = ServerOptions::new(PgDatabase::new(config.database_url))
        .start(start)
        .middlewares(middleware)
        .response(response);
    let mut server = Server::new(options);
    server
        .route(status_routes)
        .route(|_db| user_routes(UserStore::default()));

    server.start(StartOptions::default()).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("停止シグナルを受信しました");
    server.stop();

    Ok(())
}
