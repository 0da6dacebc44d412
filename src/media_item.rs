use chrono::{DateTime, Utc};
use serde::Serialize;

/// メディアの種別。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// 種別の文字列表現からパースする。未知の種別は`None`を返す。
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Self::Image),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    pub name: String,
    pub kind: MediaKind,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
}
