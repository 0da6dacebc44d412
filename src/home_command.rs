use anyhow::{Context, Result};

use crate::config;
use crate::datetime;
use crate::duration::{compute_duration, RelationshipDuration};
use crate::love_note::LoveNote;
use crate::media_item::{MediaItem, MediaKind};
use crate::store::StoreRepository;

/// ホームに表示する直近のノート数。
const RECENT_NOTES_LIMIT: usize = 2;

/// ホームに表示する直近の写真数。
const RECENT_PHOTOS_LIMIT: usize = 4;

/// ホーム画面に表示するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct HomeArgs {}

/// ホーム表示に必要な情報。
pub struct HomeSummary {
    pub duration: RelationshipDuration,
    pub recent_notes: Vec<LoveNote>,
    pub recent_photos: Vec<MediaItem>,
}

pub struct HomeCommand<'a, T: StoreRepository> {
    store: &'a T,
}

impl<'a, T: StoreRepository> HomeCommand<'a, T> {
    /// 新しい`HomeCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - ストアAPIと通信するためのリポジトリ
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `home`サブコマンドの処理を行う。
    ///
    /// 記念日からの経過期間と、直近のノートと写真を取得する。
    pub async fn run(&self, _home: HomeArgs) -> Result<HomeSummary> {
        let start = config::relationship_start()?;
        let duration = compute_duration(&start, &datetime::now());

        let mut recent_notes = self
            .store
            .read_love_notes()
            .await
            .context("Failed to retrieve notes")?;
        recent_notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_notes.truncate(RECENT_NOTES_LIMIT);

        let mut recent_photos = self
            .store
            .read_media_items()
            .await
            .context("Failed to retrieve media items")?
            .into_iter()
            .filter(|item| item.kind == MediaKind::Image)
            .collect::<Vec<_>>();
        recent_photos.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        recent_photos.truncate(RECENT_PHOTOS_LIMIT);

        Ok(HomeSummary {
            duration,
            recent_notes,
            recent_photos,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::HomeArgs;
    use super::HomeCommand;
    use crate::datetime::mock_datetime;
    use crate::duration::RelationshipDuration;
    use crate::love_note::LoveNote;
    use crate::media_item::{MediaItem, MediaKind};
    use crate::store::MockStoreRepository;

    /// テスト用にダミーのLoveNoteを作成する。
    fn dummy_note(id: &str, day: u32) -> LoveNote {
        LoveNote {
            id: id.to_string(),
            content: format!("note {}", id),
            sender_id: "user1".to_string(),
            sender_name: "Alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
        }
    }

    /// テスト用にダミーのMediaItemを作成する。
    fn dummy_media(id: &str, day: u32, kind: MediaKind) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            url: "data:image/png;base64,".to_string(),
            name: format!("{}.png", id),
            kind,
            uploaded_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            uploaded_by: "user1".to_string(),
        }
    }

    /// 記念日からの経過期間が計算されることを確認する。
    ///
    /// 記念日は+05:30の2022-11-05に固定のため、モック時間から期待値が決まる。
    #[tokio::test]
    async fn test_home_command_computes_duration() {
        mock_datetime::set_mock_time(
            Utc.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap(),
        );

        let mut store = MockStoreRepository::new();
        store
            .expect_read_love_notes()
            .times(1)
            .returning(|| Ok(vec![]));
        store
            .expect_read_media_items()
            .times(1)
            .returning(|| Ok(vec![]));

        let command = HomeCommand::new(&store);
        let summary = command.run(HomeArgs {}).await.unwrap();

        assert_eq!(
            summary.duration,
            RelationshipDuration {
                years: 1,
                months: 2,
                days: 1,
                total_days: 427,
            }
        );

        mock_datetime::clear_mock_time();
    }

    /// ノートと写真が新しい順に件数制限されることを確認する。
    #[tokio::test]
    async fn test_home_command_limits_recent_content() {
        let mut store = MockStoreRepository::new();
        store.expect_read_love_notes().times(1).returning(|| {
            Ok(vec![dummy_note("n1", 1), dummy_note("n3", 6), dummy_note("n2", 3)])
        });
        store.expect_read_media_items().times(1).returning(|| {
            Ok(vec![
                dummy_media("m1", 1, MediaKind::Image),
                dummy_media("m2", 2, MediaKind::Image),
                dummy_media("s1", 9, MediaKind::Audio),
                dummy_media("m3", 3, MediaKind::Image),
                dummy_media("m4", 4, MediaKind::Image),
                dummy_media("m5", 5, MediaKind::Image),
            ])
        });

        let command = HomeCommand::new(&store);
        let summary = command.run(HomeArgs {}).await.unwrap();

        assert_eq!(
            summary
                .recent_notes
                .iter()
                .map(|note| note.id.as_str())
                .collect::<Vec<_>>(),
            vec!["n3", "n2"]
        );
        assert_eq!(
            summary
                .recent_photos
                .iter()
                .map(|item| item.id.as_str())
                .collect::<Vec<_>>(),
            vec!["m5", "m4", "m3", "m2"]
        );
    }
}
