//! # テスト用モックデータベース
//!
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! pavilion-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{db::Database, error::InfraError};

/// 成功・失敗を切り替えられるインメモリのデータベース
#[derive(Debug, Default)]
pub struct MockDatabase {
    fail:          bool,
    connect_calls: AtomicUsize,
}

impl MockDatabase {
    /// 常に接続に成功する
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に接続に失敗する
    pub fn failing() -> Self {
        Self {
            fail:          true,
            connect_calls: AtomicUsize::new(0),
        }
    }

    /// `connect()` が呼ばれた回数
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Database for MockDatabase {
    async fn connect(&self) -> Result<(), InfraError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(InfraError::Unavailable("mock".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failingは接続に失敗し呼び出し回数を数える() {
        let db = MockDatabase::failing();

        assert!(db.connect().await.is_err());
        assert!(db.connect().await.is_err());
        assert_eq!(db.connect_calls(), 2);
    }

    #[test]
    fn test_newは接続に成功する() {
        let db = MockDatabase::new();

        let result = tokio_test::block_on(db.connect());

        assert!(result.is_ok());
        assert_eq!(db.connect_calls(), 1);
    }
}
