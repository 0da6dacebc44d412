use anyhow::{bail, Context, Result};
use log::info;

use crate::config::UserIdentity;
use crate::datetime;
use crate::love_note::LoveNote;
use crate::store::{NewLoveNote, StoreRepository};

/// ノート本文の最大文字数。
const MAX_NOTE_CHARS: usize = 500;

/// ノートの一覧と送信を行うためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct NotesArgs {
    #[clap(
        short = 's',
        long = "send",
        help = "Send a note with the given text",
        value_name = "TEXT"
    )]
    send: Option<String>,

    #[clap(long = "delete", help = "Delete a note by id", value_name = "ID")]
    delete: Option<String>,
}

pub struct NotesCommand<'a, T: StoreRepository> {
    store: &'a T,
}

impl<'a, T: StoreRepository> NotesCommand<'a, T> {
    /// 新しい`NotesCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - ストアAPIと通信するためのリポジトリ
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `notes`サブコマンドの処理を行う。
    ///
    /// 送信と削除を行なった後に一覧を取得し、新しい順に並べ替えて返す。
    ///
    /// # Arguments
    ///
    /// * `notes` - `notes`サブコマンドの引数
    /// * `identity` - 操作を行うユーザー
    pub async fn run(&self, notes: NotesArgs, identity: &UserIdentity) -> Result<Vec<LoveNote>> {
        if let Some(text) = &notes.send {
            self.send(text, identity).await?;
        }
        if let Some(id) = &notes.delete {
            self.store
                .delete_love_note(id)
                .await
                .with_context(|| format!("Failed to delete note: {}", id))?;
            info!("Note deleted: {}", id);
        }

        let mut all_notes = self
            .store
            .read_love_notes()
            .await
            .context("Failed to retrieve notes")?;
        all_notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(all_notes)
    }

    /// ノートを送信する。
    ///
    /// 本文は前後の空白を除去し、空または500文字を超える場合はエラーにする。
    async fn send(&self, text: &str, identity: &UserIdentity) -> Result<()> {
        let content = text.trim();
        if content.is_empty() {
            bail!("Cannot send an empty note");
        }
        if content.chars().count() > MAX_NOTE_CHARS {
            bail!("Note is too long. Max length is {} characters.", MAX_NOTE_CHARS);
        }

        let draft = NewLoveNote {
            content: content.to_string(),
            sender_id: identity.id.clone(),
            sender_name: identity.name.clone(),
            created_at: datetime::now(),
        };
        self.store
            .create_love_note(draft)
            .await
            .context("Failed to send note")?;
        info!("Note sent successfully.");

        Ok(())
    }
}
