//! # Pavilion Web
//!
//! axum の上に載る薄い便利レイヤー。
//!
//! ## モジュール構成
//!
//! - [`response`]: `{ data, error }` エンベロープを組み立てる [`HttpResponse`]
//! - [`cookie`]: Cookie ディレクティブの正規化
//! - [`server`]: リスナーのライフサイクルとルート登録を持つ [`Server`]
//! - [`options`]: 起動オプションのマージと解決
//! - [`middleware`]: 名前で登録するミドルウェア
//! - [`tls`]: HTTPS リスナー
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use pavilion_web::{HttpResponse, Server, ServerOptions, StartOptions};
//!
//! let mut server = Server::new(ServerOptions::new(db).start(StartOptions::new().http_port(8080)));
//! server.route(|db| {
//!     Router::new().route("/users", get(|res: HttpResponse| async move { res.send(vec!["alice"]) }))
//! });
//! server.start(StartOptions::default()).await?;
//! ```

pub mod cookie;
pub mod environment;
pub mod error;
pub mod middleware;
pub mod options;
pub mod response;
pub mod server;
pub mod tls;

pub use cookie::{CookieDirective, CookieParameters, CookieValue, TimeoutOrHttpOnly};
pub use environment::Environment;
pub use error::ServerError;
pub use middleware::{MiddlewareFactory, MiddlewareRegistry};
pub use options::{HttpSettings, HttpsSettings, ServerOptions, StartOptions};
pub use response::{HttpResponse, ResponseSettings};
pub use server::Server;
