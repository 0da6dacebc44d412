use std::env;
use std::fs;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};

/// 記念日の開始日時。+05:30のタイムゾーンに固定する。
const RELATIONSHIP_START: &str = "2022-11-05T00:00:00+05:30";

/// 記念日の開始日時を取得する。
pub fn relationship_start() -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(RELATIONSHIP_START)
        .context("Failed to parse the relationship start date")
}

/// ストアAPIへの接続設定。
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub api_url: String,
    pub api_token: String,
}

impl StoreConfig {
    /// 環境変数から接続設定を読み込む。
    ///
    /// 環境変数`MEMORIS_API_URL`が設定されていない場合はエラーを返す。
    /// トークンは環境変数`MEMORIS_API_TOKEN`を優先し、設定されていない場合は
    /// 設定ディレクトリのトークンファイルを読む。
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("MEMORIS_API_URL").context("MEMORIS_API_URL must be set")?;
        let api_token = match env::var("MEMORIS_API_TOKEN") {
            Ok(token) => token,
            Err(_) => read_token_file()
                .context("MEMORIS_API_TOKEN must be set or a token file must exist")?,
        };

        Ok(Self { api_url, api_token })
    }
}

/// 設定ディレクトリのトークンファイルを読み込む。
fn read_token_file() -> Result<String> {
    let path = dirs::config_dir()
        .context("Failed to resolve the config directory")?
        .join("memoris")
        .join("token");
    let token = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read the token file: {}", path.display()))?;

    Ok(token.trim().to_string())
}

/// 操作を行うユーザーの識別情報。
#[derive(Clone, Debug)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
}

impl UserIdentity {
    /// 環境変数からユーザーの識別情報を読み込む。
    ///
    /// 表示名が設定されていない場合は`You`を利用する。
    pub fn from_env() -> Result<Self> {
        let id = env::var("MEMORIS_USER_ID").context("MEMORIS_USER_ID must be set")?;
        let name = env::var("MEMORIS_USER_NAME").unwrap_or_else(|_| "You".to_string());

        Ok(Self { id, name })
    }
}
