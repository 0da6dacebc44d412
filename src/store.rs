use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};

use crate::calendar_event::CalendarEvent;
use crate::config::StoreConfig;
use crate::love_note::LoveNote;
use crate::media_item::{MediaItem, MediaKind};

/// ストアAPIのメディアレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMediaItem {
    id: String,
    url: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    uploaded_at: String,
    uploaded_by: String,
}

/// ストアAPIの予定レスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCalendarEvent {
    id: String,
    title: String,
    date: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    is_special: bool,
    created_by: String,
}

/// ストアAPIのノートレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLoveNote {
    id: String,
    content: String,
    sender_id: String,
    sender_name: String,
    created_at: String,
}

/// 新規作成するメディアのリクエストボディ。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaItem {
    pub url: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
    pub uploader_name: String,
}

/// 新規作成する予定のリクエストボディ。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEvent {
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub is_special: bool,
    pub created_by: String,
}

/// 新規作成するノートのリクエストボディ。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoveNote {
    pub content: String,
    pub sender_id: String,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
}

/// ドキュメントストアと通信するためのリポジトリ。
#[cfg_attr(test, mockall::automock)]
pub trait StoreRepository {
    /// 全てのメディアを取得する。
    async fn read_media_items(&self) -> Result<Vec<MediaItem>>;

    /// メディアを新規作成する。
    async fn create_media_item(&self, draft: NewMediaItem) -> Result<()>;

    /// メディアを削除する。
    async fn delete_media_item(&self, id: &str) -> Result<()>;

    /// 全ての予定を取得する。
    async fn read_calendar_events(&self) -> Result<Vec<CalendarEvent>>;

    /// 予定を新規作成する。
    async fn create_calendar_event(&self, draft: NewCalendarEvent) -> Result<()>;

    /// 予定を削除する。
    async fn delete_calendar_event(&self, id: &str) -> Result<()>;

    /// 全てのノートを取得する。
    async fn read_love_notes(&self) -> Result<Vec<LoveNote>>;

    /// ノートを新規作成する。
    async fn create_love_note(&self, draft: NewLoveNote) -> Result<()>;

    /// ノートを削除する。
    async fn delete_love_note(&self, id: &str) -> Result<()>;
}

/// ストアAPIと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = HttpStoreClient::new().unwrap();
/// let items = client.read_media_items().await.unwrap();
/// ```
pub struct HttpStoreClient {
    client: Client,
    api_url: String,
    api_token: String,
}

impl HttpStoreClient {
    /// 環境変数の設定から新しい`HttpStoreClient`を返す。
    pub fn new() -> Result<Self> {
        let config = StoreConfig::from_env().context("Failed to load the store config")?;

        Ok(Self::with_config(config))
    }

    /// 指定した設定から新しい`HttpStoreClient`を返す。
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url,
            api_token: config.api_token,
        }
    }

    /// コレクションの一覧をGETして生のレスポンスを返す。
    async fn read_collection<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>> {
        let records = self
            .client
            .get(format!("{}/{}", self.api_url, collection))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to the store API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Vec<T>>()
            .await
            .context("Failed to deserialize response")?;

        Ok(records)
    }

    /// コレクションにレコードをPOSTする。
    async fn create_record<T: Serialize + Sync>(&self, collection: &str, draft: &T) -> Result<()> {
        self.client
            .post(format!("{}/{}", self.api_url, collection))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .json(draft)
            .send()
            .await
            .with_context(|| format!("Failed to send request to the store API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?;

        Ok(())
    }

    /// コレクションのレコードをDELETEする。
    async fn delete_record(&self, collection: &str, id: &str) -> Result<()> {
        self.client
            .delete(format!("{}/{}/{}", self.api_url, collection, id))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to the store API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?;

        Ok(())
    }
}

impl StoreRepository for HttpStoreClient {
    async fn read_media_items(&self) -> Result<Vec<MediaItem>> {
        let records = self.read_collection::<StoredMediaItem>("media").await?;
        info!("length of media records: {}", records.len());

        Ok(records.into_iter().filter_map(decode_media_item).collect())
    }

    async fn create_media_item(&self, draft: NewMediaItem) -> Result<()> {
        self.create_record("media", &draft).await
    }

    async fn delete_media_item(&self, id: &str) -> Result<()> {
        self.delete_record("media", id).await
    }

    async fn read_calendar_events(&self) -> Result<Vec<CalendarEvent>> {
        let records = self.read_collection::<StoredCalendarEvent>("events").await?;
        info!("length of event records: {}", records.len());

        Ok(records
            .into_iter()
            .filter_map(decode_calendar_event)
            .collect())
    }

    async fn create_calendar_event(&self, draft: NewCalendarEvent) -> Result<()> {
        self.create_record("events", &draft).await
    }

    async fn delete_calendar_event(&self, id: &str) -> Result<()> {
        self.delete_record("events", id).await
    }

    async fn read_love_notes(&self) -> Result<Vec<LoveNote>> {
        let records = self.read_collection::<StoredLoveNote>("notes").await?;
        info!("length of note records: {}", records.len());

        Ok(records.into_iter().filter_map(decode_love_note).collect())
    }

    async fn create_love_note(&self, draft: NewLoveNote) -> Result<()> {
        self.create_record("notes", &draft).await
    }

    async fn delete_love_note(&self, id: &str) -> Result<()> {
        self.delete_record("notes", id).await
    }
}

/// 生のメディアレコードを検証してエンティティに変換する。
///
/// 不正なレコードは警告を出して読み飛ばし、一覧全体の失敗にはしない。
fn decode_media_item(record: StoredMediaItem) -> Option<MediaItem> {
    let uploaded_at = match DateTime::parse_from_rfc3339(&record.uploaded_at) {
        Ok(instant) => instant.to_utc(),
        Err(err) => {
            warn!(
                "Skipping media record {}: invalid uploadedAt ({})",
                record.id, err
            );
            return None;
        }
    };
    let kind = match MediaKind::parse(&record.kind) {
        Some(kind) => kind,
        None => {
            warn!(
                "Skipping media record {}: unknown type {}",
                record.id, record.kind
            );
            return None;
        }
    };

    Some(MediaItem {
        id: record.id,
        url: record.url,
        name: record.name,
        kind,
        uploaded_at,
        uploaded_by: record.uploaded_by,
    })
}

/// 生の予定レコードを検証してエンティティに変換する。
fn decode_calendar_event(record: StoredCalendarEvent) -> Option<CalendarEvent> {
    let date = match NaiveDate::parse_from_str(&record.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(err) => {
            warn!("Skipping event record {}: invalid date ({})", record.id, err);
            return None;
        }
    };

    Some(CalendarEvent {
        id: record.id,
        title: record.title,
        date,
        description: record.description,
        is_special: record.is_special,
        created_by: record.created_by,
    })
}

/// 生のノートレコードを検証してエンティティに変換する。
fn decode_love_note(record: StoredLoveNote) -> Option<LoveNote> {
    let created_at = match DateTime::parse_from_rfc3339(&record.created_at) {
        Ok(instant) => instant.to_utc(),
        Err(err) => {
            warn!(
                "Skipping note record {}: invalid createdAt ({})",
                record.id, err
            );
            return None;
        }
    };

    Some(LoveNote {
        id: record.id,
        content: record.content,
        sender_id: record.sender_id,
        sender_name: record.sender_name,
        created_at,
    })
}
