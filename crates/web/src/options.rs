//! # サーバーオプション
//!
//! コンストラクタ時のオプションと、`start` 系メソッド呼び出し時の上書きを扱う。
//!
//! ## 優先順位
//!
//! 呼び出し時の値 > コンストラクタ時の値 > デフォルト値。
//! マージはフィールド単位で行い、`None` のフィールドは下位の値を使う。
//!
//! ## 環境変数一覧（[`StartOptions::from_env`]）
//!
//! | 変数名 | デフォルト | 説明 |
//! |--------|------------|------|
//! | `SERVER_HOST` | `0.0.0.0` | バインドアドレス |
//! | `SERVER_HTTP_ENABLE` | `true` | HTTP リスナーの有効化 |
//! | `SERVER_HTTP_PORT` | `4000` | HTTP ポート |
//! | `SERVER_HTTPS_ENABLE` | `false` | HTTPS リスナーの有効化 |
//! | `SERVER_HTTPS_PORT` | `443` | HTTPS ポート |
//! | `SERVER_HTTPS_SSL_KEY` | `""` | 秘密鍵 PEM のパス（作業ディレクトリ基準） |
//! | `SERVER_HTTPS_SSL_CERT` | `""` | 証明書 PEM のパス（作業ディレクトリ基準） |

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;

use crate::{error::ServerError, middleware::MiddlewareFactory, response::ResponseSettings};

pub const DEFAULT_HTTP_PORT: u16 = 4000;
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// リスナー起動オプション
///
/// すべて省略可能。解決は [`http`](Self::http) / [`https`](Self::https) で行う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StartOptions {
    pub host:           Option<IpAddr>,
    pub http_enable:    Option<bool>,
    pub http_port:      Option<u16>,
    pub https_enable:   Option<bool>,
    pub https_port:     Option<u16>,
    pub https_ssl_key:  Option<PathBuf>,
    pub https_ssl_cert: Option<PathBuf>,
}

impl StartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: IpAddr) -> Self {
        self.host = Some(host);
        self
    }

    pub fn http_enable(mut self, enable: bool) -> Self {
        self.http_enable = Some(enable);
        self
    }

    pub fn http_port(mut self, port: u16) -> Self {
        self.http_port = Some(port);
        self
    }

    pub fn https_enable(mut self, enable: bool) -> Self {
        self.https_enable = Some(enable);
        self
    }

    pub fn https_port(mut self, port: u16) -> Self {
        self.https_port = Some(port);
        self
    }

    pub fn https_ssl_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.https_ssl_key = Some(path.into());
        self
    }

    pub fn https_ssl_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.https_ssl_cert = Some(path.into());
        self
    }

    /// `overrides` で設定されたフィールドを優先してマージする
    pub fn merge(&self, overrides: &StartOptions) -> StartOptions {
        StartOptions {
            host:           overrides.host.or(self.host),
            http_enable:    overrides.http_enable.or(self.http_enable),
            http_port:      overrides.http_port.or(self.http_port),
            https_enable:   overrides.https_enable.or(self.https_enable),
            https_port:     overrides.https_port.or(self.https_port),
            https_ssl_key:  overrides
                .https_ssl_key
                .clone()
                .or_else(|| self.https_ssl_key.clone()),
            https_ssl_cert: overrides
                .https_ssl_cert
                .clone()
                .or_else(|| self.https_ssl_cert.clone()),
        }
    }

    /// HTTP は明示的に無効化されない限り起動する
    pub fn http_enabled(&self) -> bool {
        self.http_enable.unwrap_or(true)
    }

    /// HTTPS は明示的に有効化された場合のみ起動する
    pub fn https_enabled(&self) -> bool {
        self.https_enable.unwrap_or(false)
    }

    fn host_or_default(&self) -> IpAddr {
        self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    /// HTTP リスナー設定を解決する
    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            addr: SocketAddr::new(
                self.host_or_default(),
                self.http_port.unwrap_or(DEFAULT_HTTP_PORT),
            ),
        }
    }

    /// HTTPS リスナー設定を解決する
    ///
    /// 鍵・証明書のパスは作業ディレクトリ基準で絶対パスに解決する。
    pub fn https(&self) -> HttpsSettings {
        let empty = PathBuf::new();
        HttpsSettings {
            addr:      SocketAddr::new(
                self.host_or_default(),
                self.https_port.unwrap_or(DEFAULT_HTTPS_PORT),
            ),
            key_path:  resolve_path(self.https_ssl_key.as_ref().unwrap_or(&empty)),
            cert_path: resolve_path(self.https_ssl_cert.as_ref().unwrap_or(&empty)),
        }
    }

    /// 環境変数 `SERVER_*` から読み込む
    pub fn from_env() -> Result<Self, ServerError> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix("SERVER").try_parsing(true))
            .build()?;
        Self::from_config(source)
    }

    /// 構築済みの [`config::Config`] から読み込む
    pub fn from_config(source: config::Config) -> Result<Self, ServerError> {
        Ok(source.try_deserialize()?)
    }
}

fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// 解決済みの HTTP リスナー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub addr: SocketAddr,
}

/// 解決済みの HTTPS リスナー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpsSettings {
    pub addr:      SocketAddr,
    pub key_path:  PathBuf,
    pub cert_path: PathBuf,
}

/// サーバー構築時のオプション
///
/// データベースハンドルは必須。それ以外は省略時のデフォルトを使う。
pub struct ServerOptions<D> {
    pub db:         Arc<D>,
    pub start:      StartOptions,
    pub middleware: Vec<MiddlewareFactory>,
    pub response:   ResponseSettings,
}

impl<D> ServerOptions<D> {
    pub fn new(db: D) -> Self {
        Self::with_shared(Arc::new(db))
    }

    /// 呼び出し側とハンドルを共有する場合に使う
    pub fn with_shared(db: Arc<D>) -> Self {
        Self {
            db,
            start: StartOptions::default(),
            middleware: Vec::new(),
            response: ResponseSettings::default(),
        }
    }

    pub fn start(mut self, start: StartOptions) -> Self {
        self.start = start;
        self
    }

    /// ミドルウェアを追加する（先に追加したものが外側）
    pub fn middleware(mut self, factory: MiddlewareFactory) -> Self {
        self.middleware.push(factory);
        self
    }

    pub fn middlewares(mut self, factories: impl IntoIterator<Item = MiddlewareFactory>) -> Self {
        self.middleware.extend(factories);
        self
    }

    pub fn response(mut self, response: ResponseSettings) -> Self {
        self.response = response;
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_http_設定がなければポート4000で全インターフェース() {
        let settings = StartOptions::default().http();

        assert_eq!(settings.addr, "0.0.0.0:4000".parse().unwrap());
    }

    #[test]
    fn test_https_設定がなければポート443で作業ディレクトリ() {
        let settings = StartOptions::default().https();
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(settings.addr.port(), 443);
        assert_eq!(settings.key_path, cwd);
        assert_eq!(settings.cert_path, cwd);
    }

    #[test]
    fn test_https_相対パスは作業ディレクトリ基準で解決する() {
        let settings = StartOptions::new()
            .https_ssl_key("certs/key.pem")
            .https_ssl_cert("/etc/ssl/cert.pem")
            .https();
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(settings.key_path, cwd.join("certs/key.pem"));
        assert_eq!(settings.cert_path, PathBuf::from("/etc/ssl/cert.pem"));
    }

    #[test]
    fn test_merge_呼び出し時の値が優先される() {
        let base = StartOptions::new()
            .http_port(8080)
            .https_port(8443)
            .https_ssl_key("base.key");
        let overrides = StartOptions::new().http_port(9090).https_enable(true);

        let merged = base.merge(&overrides);

        assert_eq!(merged.http_port, Some(9090));
        assert_eq!(merged.https_port, Some(8443));
        assert_eq!(merged.https_enable, Some(true));
        assert_eq!(merged.https_ssl_key, Some(PathBuf::from("base.key")));
        assert_eq!(merged.http_enable, None);
    }

    #[test]
    fn test_enabled_デフォルトはhttpのみ有効() {
        let options = StartOptions::default();

        assert!(options.http_enabled());
        assert!(!options.https_enabled());
    }

    #[test]
    fn test_from_config_で設定を読み込む() {
        let source = config::Config::builder()
            .set_override("http_port", 8080)
            .unwrap()
            .set_override("https_enable", true)
            .unwrap()
            .set_override("host", "127.0.0.1")
            .unwrap()
            .set_override("https_ssl_key", "certs/key.pem")
            .unwrap()
            .build()
            .unwrap();

        let options = StartOptions::from_config(source).unwrap();

        assert_eq!(
            options,
            StartOptions::new()
                .http_port(8080)
                .https_enable(true)
                .host("127.0.0.1".parse().unwrap())
                .https_ssl_key("certs/key.pem")
        );
    }

    #[test]
    fn test_from_config_不正なポートはエラー() {
        let source = config::Config::builder()
            .set_override("http_port", "not-a-port")
            .unwrap()
            .build()
            .unwrap();

        let result = StartOptions::from_config(source);

        assert!(matches!(result, Err(ServerError::Config(_))));
    }
}
