//! # サーバーブートストラップ
//!
//! ルートとミドルウェアの登録、データベース接続の待機、
//! HTTP / HTTPS リスナーの起動と停止を担当する。
//!
//! ## 起動の流れ
//!
//! ```text
//! Server::new(options)
//!   → route(|db| Router) / middleware(|app| app.layer(..))
//!   → start(overrides)
//!       1. db.connect() を await（失敗したらリスナーは起動しない）
//!       2. オプションをマージ
//!       3. HTTP（デフォルト有効）/ HTTPS（明示的に有効化した場合のみ）を起動
//!   → stop()
//! ```
//!
//! ## ミドルウェアの適用順
//!
//! axum の `Router::layer` は登録済みのルートにしか適用されないため、
//! ミドルウェアはリスナー起動時のルーター組み立てでまとめて適用する。
//! 先に登録したミドルウェアほど外側（リクエストを先に処理する）になる。

use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, serve::Listener};
use pavilion_infra::Database;
use tokio::{net::TcpListener, sync::oneshot};

use crate::{
    error::ServerError,
    middleware::{self, MiddlewareFactory},
    options::{ServerOptions, StartOptions},
    response::ResponseSettings,
    tls::{TlsListener, TlsMaterial},
};

/// 起動中のリスナー
struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown:   oneshot::Sender<()>,
}

impl ListenerHandle {
    /// 停止を通知する（処理中のリクエストの完了は待たない）
    fn close(self) {
        // 受信側が既に終了していれば何もしない
        let _ = self.shutdown.send(());
    }
}

/// サーバー
///
/// `Server` をドロップすると起動中のリスナーにも停止が通知される。
pub struct Server<D> {
    routes:     Router,
    middleware: Vec<MiddlewareFactory>,
    db:         Arc<D>,
    options:    StartOptions,
    response:   ResponseSettings,
    http:       Option<ListenerHandle>,
    https:      Option<ListenerHandle>,
}

impl<D> Server<D>
where
    D: Database + 'static,
{
    pub fn new(options: ServerOptions<D>) -> Self {
        Self {
            routes:     Router::new(),
            middleware: options.middleware,
            db:         options.db,
            options:    options.start,
            response:   options.response,
            http:       None,
            https:      None,
        }
    }

    /// ミドルウェアを登録する
    ///
    /// `handler` はルーター組み立て時にアプリケーション全体の `Router` を受け取る。
    pub fn middleware<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Router) -> Router + Send + Sync + 'static,
    {
        self.middleware.push(middleware::factory(handler));
        self
    }

    /// ルートを登録する
    ///
    /// `handler` はデータベースハンドルを受け取り、アプリケーションにマージする `Router` を返す。
    pub fn route<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnOnce(Arc<D>) -> Router,
    {
        let routes = handler(Arc::clone(&self.db));
        self.routes = std::mem::take(&mut self.routes).merge(routes);
        self
    }

    pub fn db(&self) -> &Arc<D> {
        &self.db
    }

    /// 組み立て済みのアプリケーション
    ///
    /// ルート → ミドルウェア（登録の逆順に `layer`）→ レスポンス設定の順に包む。
    pub fn router(&self) -> Router {
        let app = self
            .middleware
            .iter()
            .rev()
            .fold(self.routes.clone(), |app, factory| factory(app));
        app.layer(Extension(self.response))
    }

    /// 起動中の HTTP リスナーのアドレス
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http.as_ref().map(|handle| handle.local_addr)
    }

    /// 起動中の HTTPS リスナーのアドレス
    pub fn https_addr(&self) -> Option<SocketAddr> {
        self.https.as_ref().map(|handle| handle.local_addr)
    }

    /// データベースに接続し、有効なリスナーを起動する
    ///
    /// エラーを返した場合、この呼び出しで起動したリスナーは残らない。
    #[tracing::instrument(skip_all)]
    pub async fn start(&mut self, overrides: StartOptions) -> Result<(), ServerError> {
        self.db.connect().await?;
        tracing::info!("[ SERVER ] データベースに接続しました");

        let config = self.options.merge(&overrides);
        // HTTPS の鍵・証明書はリスナーを起動する前に検証する
        let https = if config.https_enabled() {
            let settings = config.https();
            let tls_config = TlsMaterial::load(&settings)?.server_config()?;
            Some((settings.addr, tls_config))
        } else {
            None
        };

        if config.http_enabled() {
            self.start_http(config).await?;
        }
        if let Some((addr, tls_config)) = https {
            let result = self.listen_https(addr, tls_config).await;
            if let Err(e) = result {
                if let Some(handle) = self.http.take() {
                    handle.close();
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// HTTP リスナーを起動する
    ///
    /// ポート 0 を指定した場合は OS が割り当てたアドレスを返す。
    pub async fn start_http(&mut self, overrides: StartOptions) -> Result<SocketAddr, ServerError> {
        let settings = self.options.merge(&overrides).http();
        let listener = bind(settings.addr).await?;
        let local_addr = local_addr(&listener, settings.addr)?;

        if let Some(previous) = self.http.take() {
            previous.close();
        }
        let shutdown = spawn_listener(listener, self.router(), "http");
        self.http = Some(ListenerHandle {
            local_addr,
            shutdown,
        });

        tracing::info!(
            port = local_addr.port(),
            "[ SERVER ] HTTP サーバーが起動しました: {}",
            local_addr
        );
        Ok(local_addr)
    }

    /// HTTPS リスナーを起動する
    ///
    /// 鍵・証明書がない、または不正な場合はバインド前にエラーを返す。
    pub async fn start_https(
        &mut self,
        overrides: StartOptions,
    ) -> Result<SocketAddr, ServerError> {
        let settings = self.options.merge(&overrides).https();
        let tls_config = TlsMaterial::load(&settings)?.server_config()?;
        self.listen_https(settings.addr, tls_config).await
    }

    async fn listen_https(
        &mut self,
        addr: SocketAddr,
        tls_config: rustls::ServerConfig,
    ) -> Result<SocketAddr, ServerError> {
        let tcp = bind(addr).await?;
        let local_addr = local_addr(&tcp, addr)?;

        if let Some(previous) = self.https.take() {
            previous.close();
        }
        let shutdown = spawn_listener(TlsListener::new(tcp, tls_config), self.router(), "https");
        self.https = Some(ListenerHandle {
            local_addr,
            shutdown,
        });

        tracing::info!(
            port = local_addr.port(),
            "[ SERVER ] HTTPS サーバーが起動しました: {}",
            local_addr
        );
        Ok(local_addr)
    }

    /// 起動中のリスナーに停止を通知する
    ///
    /// 起動していないリスナーは無視する。何度呼んでもよい。
    pub fn stop(&mut self) {
        if let Some(handle) = self.http.take() {
            handle.close();
        }
        if let Some(handle) = self.https.take() {
            handle.close();
        }
        tracing::info!("[ SERVER ] サーバーを停止しました");
    }
}

async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

fn local_addr(listener: &TcpListener, addr: SocketAddr) -> Result<SocketAddr, ServerError> {
    listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })
}

/// リスナーをタスクとして起動し、停止通知用の送信側を返す
fn spawn_listener<L>(listener: L, app: Router, scheme: &'static str) -> oneshot::Sender<()>
where
    L: Listener<Addr = SocketAddr>,
{
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                // 送信側のドロップも停止として扱う
                rx.await.ok();
            })
            .await;

        match result {
            Ok(()) => tracing::debug!(scheme, "リスナーを終了しました"),
            Err(e) => tracing::error!(scheme, "リスナーが異常終了しました: {}", e),
        }
    });

    tx
}
