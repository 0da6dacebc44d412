use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::info;

use crate::config::UserIdentity;
use crate::datetime;
use crate::datetime::YearMonth;
use crate::media_group::{group_by_month, MonthRange, YearGroup};
use crate::media_item::MediaKind;
use crate::store::{NewMediaItem, StoreRepository};

/// アップロードできるファイルサイズの上限。
const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// メディアの一覧と登録を行うためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct GalleryArgs {
    #[clap(
        short = 'u',
        long = "upload",
        help = "Upload an image or audio file",
        parse(from_os_str)
    )]
    upload: Option<PathBuf>,

    #[clap(long = "delete", help = "Delete a media item by id", value_name = "ID")]
    delete: Option<String>,

    #[clap(
        long = "from",
        help = "Start of the month range in the format YYYY-MM",
        requires = "to",
        parse(try_from_str = datetime::parse_year_month),
    )]
    from: Option<YearMonth>,

    #[clap(
        long = "to",
        help = "End of the month range in the format YYYY-MM",
        requires = "from",
        parse(try_from_str = datetime::parse_year_month),
    )]
    to: Option<YearMonth>,
}

pub struct GalleryCommand<'a, T: StoreRepository> {
    store: &'a T,
}

impl<'a, T: StoreRepository> GalleryCommand<'a, T> {
    /// 新しい`GalleryCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - ストアAPIと通信するためのリポジトリ
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `gallery`サブコマンドの処理を行う。
    ///
    /// アップロードと削除を行なった後に一覧を取得し、新しい順に並べ替えて
    /// 年月でグルーピングした結果を返す。範囲が指定された場合は両端を含む
    /// 年月のみを残す。
    ///
    /// # Arguments
    ///
    /// * `gallery` - `gallery`サブコマンドの引数
    /// * `identity` - 操作を行うユーザー
    pub async fn run(&self, gallery: GalleryArgs, identity: &UserIdentity) -> Result<Vec<YearGroup>> {
        if let Some(path) = &gallery.upload {
            self.upload(path, identity).await?;
        }
        if let Some(id) = &gallery.delete {
            self.store
                .delete_media_item(id)
                .await
                .with_context(|| format!("Failed to delete media item: {}", id))?;
            info!("Media item deleted: {}", id);
        }

        let mut items = self
            .store
            .read_media_items()
            .await
            .context("Failed to retrieve media items")?;
        items.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        let range = match (gallery.from, gallery.to) {
            (Some(from), Some(to)) => Some(MonthRange { from, to }),
            _ => None,
        };

        Ok(group_by_month(&items, range.as_ref()))
    }

    /// ファイルをbase64のデータURLに変換してストアに登録する。
    ///
    /// 対応していない拡張子、または1MBを超えるファイルはエラーにする。
    async fn upload(&self, path: &Path, identity: &UserIdentity) -> Result<()> {
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .with_context(|| format!("Failed to resolve file name: {}", path.display()))?
            .to_string();
        let (kind, mime) = media_kind_of(path)
            .with_context(|| format!("Unsupported file type: {}", name))?;
        let content =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        if content.len() > MAX_UPLOAD_BYTES {
            bail!("File \"{}\" is too large. Max size is 1MB.", name);
        }

        let draft = NewMediaItem {
            url: format!("data:{};base64,{}", mime, STANDARD.encode(&content)),
            name,
            kind,
            uploaded_at: datetime::now(),
            uploaded_by: identity.id.clone(),
            uploader_name: identity.name.clone(),
        };
        self.store
            .create_media_item(draft)
            .await
            .context("Failed to upload media item")?;
        info!("Media item uploaded successfully.");

        Ok(())
    }
}

/// 拡張子からメディアの種別とMIMEタイプを判定する。
fn media_kind_of(path: &Path) -> Option<(MediaKind, &'static str)> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => Some((MediaKind::Image, "image/png")),
        Some("jpg") | Some("jpeg") => Some((MediaKind::Image, "image/jpeg")),
        Some("gif") => Some((MediaKind::Image, "image/gif")),
        Some("webp") => Some((MediaKind::Image, "image/webp")),
        Some("mp3") => Some((MediaKind::Audio, "audio/mpeg")),
        Some("wav") => Some((MediaKind::Audio, "audio/wav")),
        Some("m4a") => Some((MediaKind::Audio, "audio/mp4")),
        Some("ogg") => Some((MediaKind::Audio, "audio/ogg")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};
    use mockall::predicate::{eq, function};

    use super::GalleryArgs;
    use super::GalleryCommand;
    use crate::config::UserIdentity;
    use crate::datetime::mock_datetime;
    use crate::media_item::{MediaItem, MediaKind};
    use crate::store::{MockStoreRepository, NewMediaItem};

    fn identity() -> UserIdentity {
        UserIdentity {
            id: "user1".to_string(),
            name: "Alice".to_string(),
        }
    }

    fn no_action_args() -> GalleryArgs {
        GalleryArgs {
            upload: None,
            delete: None,
            from: None,
            to: None,
        }
    }

    /// テスト用にダミーのMediaItemを作成する。
    fn dummy_item(id: &str, y: i32, mo: u32, d: u32) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            url: "data:image/png;base64,".to_string(),
            name: format!("{}.png", id),
            kind: MediaKind::Image,
            uploaded_at: Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap(),
            uploaded_by: "user1".to_string(),
        }
    }

    /// 一時ファイルを作成し、テスト終了時に削除する。
    struct TempFile {
        path: PathBuf,
    }

    impl TempFile {
        fn create(name: &str, content: &[u8]) -> Self {
            let path = std::env::temp_dir().join(name);
            fs::write(&path, content).unwrap();
            Self { path }
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    /// 引数なしの場合は一覧のみが行われ、新しい順にグルーピングされることを確認する。
    #[tokio::test]
    async fn test_gallery_command_lists_grouped() {
        let mut store = MockStoreRepository::new();
        store
            .expect_read_media_items()
            .times(1)
            .returning(|| Ok(vec![dummy_item("old", 2023, 12, 25), dummy_item("new", 2024, 1, 15)]));

        let command = GalleryCommand::new(&store);
        let groups = command.run(no_action_args(), &identity()).await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].year, 2024);
        assert_eq!(groups[0].months[0].items[0].id, "new");
        assert_eq!(groups[1].year, 2023);
    }

    /// 削除指定でリポジトリの削除が呼ばれることを確認する。
    #[tokio::test]
    async fn test_gallery_command_deletes_by_id() {
        let mut store = MockStoreRepository::new();
        store
            .expect_delete_media_item()
            .with(eq("m1"))
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_read_media_items()
            .times(1)
            .returning(|| Ok(vec![]));

        let command = GalleryCommand::new(&store);
        let args = GalleryArgs {
            delete: Some("m1".to_string()),
            ..no_action_args()
        };

        assert!(command.run(args, &identity()).await.is_ok());
    }

    /// アップロードで種別と内容が正しく登録されることを確認する。
    #[tokio::test]
    async fn test_gallery_command_uploads_file() {
        let file = TempFile::create("memoris_test_upload.png", b"pngdata");
        let uploaded_at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        mock_datetime::set_mock_time(uploaded_at);

        let mut store = MockStoreRepository::new();
        store
            .expect_create_media_item()
            .with(function(move |draft: &NewMediaItem| {
                draft.name == "memoris_test_upload.png"
                    && draft.kind == MediaKind::Image
                    && draft.url == format!("data:image/png;base64,{}", "cG5nZGF0YQ==")
                    && draft.uploaded_at == uploaded_at
                    && draft.uploaded_by == "user1"
                    && draft.uploader_name == "Alice"
            }))
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_read_media_items()
            .times(1)
            .returning(|| Ok(vec![]));

        let command = GalleryCommand::new(&store);
        let args = GalleryArgs {
            upload: Some(file.path.clone()),
            ..no_action_args()
        };

        assert!(command.run(args, &identity()).await.is_ok());

        mock_datetime::clear_mock_time();
    }

    /// 対応していない拡張子はエラーになり、登録が行われないことを確認する。
    #[tokio::test]
    async fn test_gallery_command_rejects_unsupported_file() {
        let file = TempFile::create("memoris_test_upload.txt", b"text");
        let store = MockStoreRepository::new();

        let command = GalleryCommand::new(&store);
        let args = GalleryArgs {
            upload: Some(file.path.clone()),
            ..no_action_args()
        };

        assert!(command.run(args, &identity()).await.is_err());
    }

    /// 1MBを超えるファイルはエラーになることを確認する。
    #[tokio::test]
    async fn test_gallery_command_rejects_large_file() {
        let file = TempFile::create(
            "memoris_test_upload_large.png",
            &vec![0u8; 1024 * 1024 + 1],
        );
        let store = MockStoreRepository::new();

        let command = GalleryCommand::new(&store);
        let args = GalleryArgs {
            upload: Some(file.path.clone()),
            ..no_action_args()
        };

        assert!(command.run(args, &identity()).await.is_err());
    }

    /// 範囲指定が一覧に適用されることを確認する。
    #[tokio::test]
    async fn test_gallery_command_applies_month_range() {
        let mut store = MockStoreRepository::new();
        store
            .expect_read_media_items()
            .times(1)
            .returning(|| Ok(vec![dummy_item("old", 2023, 12, 25), dummy_item("new", 2024, 1, 15)]));

        let command = GalleryCommand::new(&store);
        let args = GalleryArgs {
            from: Some(crate::datetime::parse_year_month("2024-01").unwrap()),
            to: Some(crate::datetime::parse_year_month("2024-01").unwrap()),
            ..no_action_args()
        };
        let groups = command.run(args, &identity()).await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].year, 2024);
    }
}
