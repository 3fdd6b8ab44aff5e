//! # HTTPS リスナー
//!
//! PEM 形式の鍵・証明書から rustls の設定を作り、axum の
//! [`Listener`](axum::serve::Listener) として TLS 接続を受け付ける。
//!
//! 鍵・証明書ファイルが存在しない場合は空文字列として読み込むが、
//! 空の素材では設定を構築できないため [`ServerError::Tls`] になる
//! （空の証明書でリスナーが起動することはない）。

use std::{io, net::SocketAddr, path::Path, sync::Arc};

use axum::serve::Listener;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::{TlsAcceptor, server::TlsStream};

use crate::{error::ServerError, options::HttpsSettings};

/// 読み込んだ鍵・証明書（PEM テキスト）
#[derive(Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub key:  String,
    pub cert: String,
}

impl std::fmt::Debug for TlsMaterial {
    // 秘密鍵は出力しない
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("key_len", &self.key.len())
            .field("cert_len", &self.cert.len())
            .finish()
    }
}

impl TlsMaterial {
    /// 設定されたパスから読み込む
    ///
    /// ファイルが存在しない場合は空文字列。存在するが読めない場合はエラー。
    pub fn load(settings: &HttpsSettings) -> Result<Self, ServerError> {
        Ok(Self {
            key:  read_if_exists(&settings.key_path)?,
            cert: read_if_exists(&settings.cert_path)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.key.trim().is_empty() || self.cert.trim().is_empty()
    }

    /// rustls のサーバー設定を構築する
    pub fn server_config(&self) -> Result<rustls::ServerConfig, ServerError> {
        if self.is_empty() {
            return Err(ServerError::Tls(
                "鍵または証明書が空です（ファイルが存在しない可能性があります）".to_string(),
            ));
        }

        let mut cert_reader = self.cert.as_bytes();
        let certs = rustls_pemfile::certs(&mut cert_reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ServerError::Tls(format!("証明書を解析できません: {e}")))?;
        if certs.is_empty() {
            return Err(ServerError::Tls(
                "証明書に CERTIFICATE ブロックがありません".to_string(),
            ));
        }

        let mut key_reader = self.key.as_bytes();
        let key = rustls_pemfile::private_key(&mut key_reader)
            .map_err(|e| ServerError::Tls(format!("秘密鍵を解析できません: {e}")))?
            .ok_or_else(|| ServerError::Tls("秘密鍵が見つかりません".to_string()))?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut config = rustls::ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(certs, key)?;
        config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(config)
    }
}

fn read_if_exists(path: &Path) -> Result<String, ServerError> {
    if !path.is_file() {
        return Ok(String::new());
    }
    std::fs::read_to_string(path).map_err(|source| ServerError::TlsRead {
        path: path.to_path_buf(),
        source,
    })
}

/// TLS ハンドシェイク済みの接続を返すリスナー
pub struct TlsListener {
    tcp:      TcpListener,
    acceptor: TlsAcceptor,
}

impl TlsListener {
    pub fn new(tcp: TcpListener, config: rustls::ServerConfig) -> Self {
        Self {
            tcp,
            acceptor: TlsAcceptor::from(Arc::new(config)),
        }
    }
}

impl Listener for TlsListener {
    type Io = TlsStream<TcpStream>;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        loop {
            // TcpListener の accept は一時的なエラーを内部でリトライする
            let (stream, addr) = Listener::accept(&mut self.tcp).await;
            match self.acceptor.accept(stream).await {
                Ok(tls) => return (tls, addr),
                Err(e) => {
                    tracing::debug!(peer = %addr, "TLS ハンドシェイクに失敗しました: {}", e);
                }
            }
        }
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        self.tcp.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ファイルがなければ空文字列() {
        let dir = tempfile::tempdir().unwrap();
        let settings = HttpsSettings {
            addr:      "127.0.0.1:0".parse().unwrap(),
            key_path:  dir.path().join("missing.key"),
            cert_path: dir.path().join("missing.crt"),
        };

        let material = TlsMaterial::load(&settings).unwrap();

        assert_eq!(material.key, "");
        assert_eq!(material.cert, "");
        assert!(material.is_empty());
    }

    #[test]
    fn test_load_ディレクトリは存在しないものとして扱う() {
        let dir = tempfile::tempdir().unwrap();
        let settings = HttpsSettings {
            addr:      "127.0.0.1:0".parse().unwrap(),
            key_path:  dir.path().to_path_buf(),
            cert_path: dir.path().to_path_buf(),
        };

        let material = TlsMaterial::load(&settings).unwrap();

        assert!(material.is_empty());
    }

    #[test]
    fn test_server_config_空の素材はエラー() {
        let material = TlsMaterial {
            key:  String::new(),
            cert: String::new(),
        };

        assert!(matches!(material.server_config(), Err(ServerError::Tls(_))));
    }

    #[test]
    fn test_server_config_pemでない素材はエラー() {
        let material = TlsMaterial {
            key:  "not a key".to_string(),
            cert: "not a cert".to_string(),
        };

        assert!(matches!(material.server_config(), Err(ServerError::Tls(_))));
    }

    #[test]
    fn test_server_config_自己署名証明書で構築できる() {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let material = TlsMaterial {
            key:  certified.key_pair.serialize_pem(),
            cert: certified.cert.pem(),
        };

        let config = material.server_config().unwrap();

        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }

    #[test]
    fn test_debug出力に秘密鍵を含めない() {
        let material = TlsMaterial {
            key:  "SECRET".to_string(),
            cert: "CERT".to_string(),
        };

        assert!(!format!("{material:?}").contains("SECRET"));
    }
}
