//! # Pavilion インフラ層
//!
//! サーバー起動時に接続する外部システムとの境界を提供する。
//!
//! ## 責務
//!
//! - **データベース接続**: [`Database`] トレイトと PostgreSQL 実装
//! - **エラー定義**: [`InfraError`]
//!
//! サーバーはこのクレートのトレイトにのみ依存し、具体的な接続先を知らない。
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use pavilion_infra::{Database, db::PgDatabase};
//!
//! let db = PgDatabase::new("postgres://localhost/pavilion");
//! db.connect().await?;
//! let pool = db.pool()?;
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use db::{Database, PgDatabase};
pub use error::InfraError;
