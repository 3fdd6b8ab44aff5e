//! # 実行環境
//!
//! Cookie の `Secure` 属性など、本番環境かどうかで変わる振る舞いの判定に使う。
//! 判定結果は [`ResponseSettings`](crate::ResponseSettings) 経由でハンドラに注入され、
//! ハンドラ内で環境変数を直接参照しない。

use std::str::FromStr;

use serde::Deserialize;
use strum::{Display, EnumString};

/// 実行環境の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    /// 文字列からパースする
    ///
    /// 不正な値の場合は [`Development`](Environment::Development) にフォールバックする。
    pub fn parse(s: &str) -> Self {
        Self::from_str(s.trim()).unwrap_or_else(|_| {
            tracing::warn!(value = s, "不明な APP_ENV です。development として扱います");
            Self::Development
        })
    }

    /// 環境変数 `APP_ENV` から読み取る
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV") {
            Ok(val) => Self::parse(&val),
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("production", Environment::Production)]
    #[case("Production", Environment::Production)]
    #[case("staging", Environment::Staging)]
    #[case("development", Environment::Development)]
    #[case("unknown", Environment::Development)]
    #[case("", Environment::Development)]
    fn test_parseで環境を判定する(#[case] input: &str, #[case] expected: Environment) {
        assert_eq!(Environment::parse(input), expected);
    }

    #[test]
    fn test_productionのみis_productionがtrue() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(!Environment::Development.is_production());
    }
}
