//! # Showcase ハンドラ
//!
//! [`HttpResponse`] エクストラクタの使い方を示すサンプルルート。
//!
//! | メソッド | パス | 内容 |
//! |----------|------|------|
//! | GET | `/health` | ヘルスチェック |
//! | GET | `/health/db` | データベースへの疎通確認 |
//! | GET | `/users/{id}` | ユーザー取得（存在しなければ `ERR_DATA_NOT_EXIST`） |
//! | POST | `/users` | ユーザー作成（重複・不正値はエラー） |
//! | POST | `/sessions` | セッション Cookie の発行 |
//! | DELETE | `/sessions` | 認証ヘッダーがなければ 401 |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    Router,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::Response,
    routing::{get, post},
};
use pavilion_infra::PgDatabase;
use pavilion_shared::Trace;
use pavilion_web::{CookieDirective, HttpResponse, TimeoutOrHttpOnly};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id:   u64,
    pub name: String,
}

/// インメモリのユーザーストア
#[derive(Debug, Default, Clone)]
pub struct UserStore {
    users: Arc<RwLock<BTreeMap<u64, User>>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub id:   u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status:  &'static str,
    pub version: &'static str,
}

/// ヘルスチェック
pub async fn health_check(res: HttpResponse) -> Response {
    res.send(Health {
        status:  "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// データベースの疎通確認ルート
pub fn status_routes(db: Arc<PgDatabase>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_check))
        .with_state(db)
}

async fn db_check(State(db): State<Arc<PgDatabase>>, res: HttpResponse) -> Response {
    let pool = match db.pool() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("データベースが未接続です: {}", e);
            return res.internal();
        }
    };

    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await {
        Ok(_) => res.send(Health {
            status:  "healthy",
            version: env!("CARGO_PKG_VERSION"),
        }),
        Err(e) => {
            tracing::error!("データベースの疎通確認に失敗しました: {}", e);
            res.internal()
        }
    }
}

/// ユーザー・セッションのサンプルルート
pub fn user_routes(store: UserStore) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/sessions", post(create_session).delete(delete_session))
        .with_state(store)
}

async fn get_user(
    State(store): State<UserStore>,
    Path(id): Path<u64>,
    res: HttpResponse,
) -> Response {
    match store.users.read().await.get(&id) {
        Some(user) => res.send(user),
        None => res.not_exist(format!("ユーザーが見つかりません: {id}"), ()),
    }
}

async fn create_user(
    State(store): State<UserStore>,
    res: HttpResponse,
    Json(input): Json<CreateUser>,
) -> Response {
    let name = input.name.trim();
    if name.is_empty() {
        return res
            .traces(["name"])
            .invalid("名前は必須です", ());
    }

    let mut users = store.users.write().await;
    if users.contains_key(&input.id) {
        return res
            .traces([id_trace(input.id)])
            .existed("ユーザーは既に存在します", ());
    }

    let user = User {
        id:   input.id,
        name: name.to_string(),
    };
    users.insert(user.id, user.clone());
    tracing::info!(user_id = user.id, "ユーザーを作成しました");

    res.send(user)
}

/// ID をトレースに変換する（i64 に収まらない ID は文字列にする）
fn id_trace(id: u64) -> Trace {
    i64::try_from(id).map_or_else(|_| Trace::from(id.to_string()), Trace::from)
}

/// セッション Cookie（httpOnly）と表示用 Cookie（JavaScript から読める）を発行する
async fn create_session(res: HttpResponse) -> Response {
    res.cookie([
        ("session", CookieDirective::from("showcase-session")),
        (
            "theme",
            CookieDirective::Options(
                "light".into(),
                Some(TimeoutOrHttpOnly::Timeout(3_600_000)),
                Some(true),
            ),
        ),
    ])
    .send(())
}

async fn delete_session(headers: HeaderMap, res: HttpResponse) -> Response {
    if !headers.contains_key(header::AUTHORIZATION) {
        return res.authorize();
    }
    res.send(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use pavilion_infra::mock::MockDatabase;
    use pavilion_web::{Server, ServerOptions};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let mut server = Server::new(ServerOptions::new(MockDatabase::new()));
        server.route(|_db| user_routes(UserStore::default()));
        server.router()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_user(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_作成したユーザーを取得できる() {
        let app = app();

        let created = app
            .clone()
            .oneshot(post_user(json!({ "id": 1, "name": " alice " })))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::OK);

        let fetched = app
            .oneshot(Request::builder().uri("/users/1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            body_json(fetched).await,
            json!({ "data": { "id": 1, "name": "alice" }, "error": null })
        );
    }

    #[tokio::test]
    async fn test_重複したユーザーはerr_data_existedを返す() {
        let app = app();
        app.clone()
            .oneshot(post_user(json!({ "id": 1, "name": "alice" })))
            .await
            .unwrap();

        let response = app
            .oneshot(post_user(json!({ "id": 1, "name": "bob" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "ERR_DATA_EXISTED");
        assert_eq!(body["error"]["traces"], json!([1]));
    }

    #[tokio::test]
    async fn test_i64に収まらないidは文字列のトレースになる() {
        let app = app();
        let id = u64::MAX;
        app.clone()
            .oneshot(post_user(json!({ "id": id, "name": "alice" })))
            .await
            .unwrap();

        let response = app
            .oneshot(post_user(json!({ "id": id, "name": "bob" })))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "ERR_DATA_EXISTED");
        assert_eq!(body["error"]["traces"], json!(["18446744073709551615"]));
    }

    #[tokio::test]
    async fn test_空の名前はerr_data_invalidを返す() {
        let response = app()
            .oneshot(post_user(json!({ "id": 2, "name": "  " })))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "ERR_DATA_INVALID");
        assert_eq!(body["error"]["traces"], json!(["name"]));
    }

    #[tokio::test]
    async fn test_存在しないユーザーはerr_data_not_existを返す() {
        let response = app()
            .oneshot(Request::builder().uri("/users/9").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "ERR_DATA_NOT_EXIST");
    }

    #[tokio::test]
    async fn test_セッション作成で2つのcookieが発行される() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let cookies: Vec<&str> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();

        assert_eq!(cookies.len(), 2);
        let session = cookies.iter().find(|c| c.starts_with("session=")).unwrap();
        let theme = cookies.iter().find(|c| c.starts_with("theme=")).unwrap();
        // 値のみのディレクティブは httpOnly にならない
        assert!(!session.contains("HttpOnly"));
        // 第 3 要素 true は httpOnly を無効にする
        assert!(!theme.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_認証ヘッダーがなければ401() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "ERR_AUTH_FAILURE");
        assert_eq!(body["error"]["message"], "Authorization failure");
    }
}
