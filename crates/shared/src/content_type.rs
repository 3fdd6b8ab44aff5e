//! # Content-Type

use http::HeaderValue;

/// レスポンスの Content-Type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Json,
    Text,
    Html,
}

impl ContentType {
    /// MIME 文字列
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
        }
    }

    pub fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_デフォルトはjson() {
        assert_eq!(ContentType::default(), ContentType::Json);
        assert_eq!(ContentType::default().header_value(), "application/json");
    }
}
