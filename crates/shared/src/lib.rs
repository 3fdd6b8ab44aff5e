//! # Pavilion 共有型
//!
//! レスポンスエンベロープのワイヤ形式と、それを構成する列挙型を提供する。
//!
//! ## 設計方針
//!
//! - `web` / `infra` / アプリケーションのすべてから依存される
//! - axum には依存しない（`IntoResponse` 変換は `pavilion-web` の責務）
//! - 外部クレートへの依存は最小限に抑える

pub mod content_type;
pub mod envelope;
pub mod error_code;
pub mod observability;
pub mod status;

pub use content_type::ContentType;
pub use envelope::{Envelope, ErrorBody, Trace};
pub use error_code::{ErrorCode, Message};
pub use status::HeaderStatus;
