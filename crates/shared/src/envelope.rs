//! # レスポンスエンベロープ
//!
//! すべてのレスポンスが共有する `{ "data": T, "error": ... }` 形式を定義する。
//!
//! ```json
//! { "data": null, "error": { "message": "...", "code": "ERR_DATA_INVALID", "traces": [] } }
//! ```
//!
//! 成功時の `error` は必ず `null` として出力される（フィールド自体は省略しない）。

use serde::{Deserialize, Serialize};

/// 統一レスポンス型
///
/// ## 使用例
///
/// ```
/// use pavilion_shared::Envelope;
///
/// let envelope = Envelope::success("hello");
/// assert_eq!(envelope.data, "hello");
/// assert!(envelope.error.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data:  T,
    pub error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    /// エラーなしのエンベロープを作成する
    pub fn success(data: T) -> Self {
        Self { data, error: None }
    }

    /// エラー付きのエンベロープを作成する
    pub fn failure(data: T, error: ErrorBody) -> Self {
        Self {
            data,
            error: Some(error),
        }
    }
}

/// エンベロープの `error` 部分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// 人間向けのメッセージ
    pub message: Option<String>,
    /// 機械判定用のエラーコード（例: `ERR_DATA_INVALID`）
    pub code:    Option<String>,
    /// 診断用トレース（順序を保持する）
    pub traces:  Vec<Trace>,
}

/// トレース 1 件
///
/// 文字列または数値。JSON ではタグなしでそのまま出力される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Trace {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for Trace {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Trace {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Trace {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Trace {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Trace {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Trace {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_successはerrorをnullとして出力する() {
        let envelope = Envelope::success("hello");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json, json!({ "data": "hello", "error": null }));
    }

    #[test]
    fn test_failureはerrorオブジェクトを出力する() {
        let envelope = Envelope::failure(
            (),
            ErrorBody {
                message: Some("見つかりません".to_string()),
                code:    Some("ERR_DATA_NOT_EXIST".to_string()),
                traces:  vec![Trace::from("users"), Trace::from(42)],
            },
        );
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            json,
            json!({
                "data": null,
                "error": {
                    "message": "見つかりません",
                    "code": "ERR_DATA_NOT_EXIST",
                    "traces": ["users", 42]
                }
            })
        );
    }

    #[test]
    fn test_未設定のmessageとcodeはnullになる() {
        let json = serde_json::to_value(ErrorBody::default()).unwrap();

        assert_eq!(json, json!({ "message": null, "code": null, "traces": [] }));
    }

    #[test]
    fn test_クライアント側でエンベロープをデシリアライズできる() {
        let body = r#"{"data": [1, 2], "error": {"message": null, "code": "ERR_DATA_INVALID", "traces": ["name", 3, 1.5]}}"#;
        let envelope: Envelope<Vec<i32>> = serde_json::from_str(body).unwrap();

        assert_eq!(envelope.data, vec![1, 2]);
        let error = envelope.error.unwrap();
        assert_eq!(error.code.as_deref(), Some("ERR_DATA_INVALID"));
        assert_eq!(
            error.traces,
            vec![Trace::from("name"), Trace::from(3), Trace::from(1.5)]
        );
    }
}
