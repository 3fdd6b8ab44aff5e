//! # Request ID ミドルウェア
//!
//! すべてのリクエストに `X-Request-Id` を付与し、トレーススパンに含める。
//!
//! レイヤー順序（下に書いたものが外側）:
//!
//! 1. `SetRequestIdLayer`（最外）: UUID v7 を生成（またはクライアント提供値を使用）
//! 2. `TraceLayer`: `request_id` を含むスパンを作成し、全ログに自動注入
//! 3. `PropagateRequestIdLayer`: レスポンスヘッダーに `X-Request-Id` をコピー

use axum::{Router, body::Body};
use pavilion_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub fn apply(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
