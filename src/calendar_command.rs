use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::calendar_event::CalendarEvent;
use crate::config::UserIdentity;
use crate::datetime;
use crate::datetime::YearMonth;
use crate::event_index::{index_by_day, EventIndex};
use crate::store::{NewCalendarEvent, StoreRepository};

/// カレンダーの表示と予定の登録を行うためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct CalendarArgs {
    #[clap(
        short = 'm',
        long = "month",
        help = "Sets a custom month in the format YYYY-MM",
        parse(try_from_str = datetime::parse_year_month),
    )]
    month: Option<YearMonth>,

    #[clap(
        long = "add",
        help = "Add an event with the given title",
        value_name = "TITLE",
        requires = "date"
    )]
    add: Option<String>,

    #[clap(
        short = 'd',
        long = "date",
        help = "Sets the event day in the format YYYY-MM-DD",
        parse(try_from_str = datetime::parse_day),
    )]
    date: Option<NaiveDate>,

    #[clap(long = "desc", help = "Free-text description for the added event")]
    desc: Option<String>,

    #[clap(long = "special", help = "Mark the added event as special")]
    special: bool,

    #[clap(long = "delete", help = "Delete an event by id", value_name = "ID")]
    delete: Option<String>,
}

/// 1ヶ月分のカレンダー表示に必要な情報。
pub struct MonthOverview {
    pub month: YearMonth,
    pub today: NaiveDate,
    pub index: EventIndex,
    pub month_events: Vec<CalendarEvent>,
    pub special_events: Vec<CalendarEvent>,
}

pub struct CalendarCommand<'a, T: StoreRepository> {
    store: &'a T,
}

impl<'a, T: StoreRepository> CalendarCommand<'a, T> {
    /// 新しい`CalendarCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - ストアAPIと通信するためのリポジトリ
    pub fn new(store: &'a T) -> Self {
        Self { store }
    }

    /// `calendar`サブコマンドの処理を行う。
    ///
    /// 予定の登録と削除を行なった後に一覧を取得し、表示対象の月の情報を返す。
    /// 月が指定されていない場合は、Localタイムゾーンで現在の月を利用する。
    ///
    /// # Arguments
    ///
    /// * `calendar` - `calendar`サブコマンドの引数
    /// * `identity` - 操作を行うユーザー
    pub async fn run(&self, calendar: CalendarArgs, identity: &UserIdentity) -> Result<MonthOverview> {
        if let Some(title) = &calendar.add {
            let date = calendar
                .date
                .context("--date is required when adding an event")?;
            let draft = NewCalendarEvent {
                title: title.clone(),
                date,
                description: calendar.desc.clone(),
                is_special: calendar.special,
                created_by: identity.id.clone(),
            };
            self.store
                .create_calendar_event(draft)
                .await
                .context("Failed to create calendar event")?;
            info!("Calendar event created: {} on {}", title, date);
        }
        if let Some(id) = &calendar.delete {
            self.store
                .delete_calendar_event(id)
                .await
                .with_context(|| format!("Failed to delete calendar event: {}", id))?;
            info!("Calendar event deleted: {}", id);
        }

        let events = self
            .store
            .read_calendar_events()
            .await
            .context("Failed to retrieve calendar events")?;

        let today = datetime::today_local();
        let month = calendar
            .month
            .unwrap_or_else(|| YearMonth::of_day(&today));
        let mut month_events = events
            .iter()
            .filter(|event| YearMonth::of_day(&event.date) == month)
            .cloned()
            .collect::<Vec<_>>();
        month_events.sort_by_key(|event| event.date);
        let special_events = events
            .iter()
            .filter(|event| event.is_special)
            .cloned()
            .collect::<Vec<_>>();

        Ok(MonthOverview {
            month,
            today,
            index: index_by_day(&events),
            month_events,
            special_events,
        })
    }
}
