use chrono::NaiveDate;

/// カレンダー上の1日に属する予定。
///
/// 予定は必ず1つの日付に属する。編集は削除と再作成で表現する。
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub is_special: bool,
    pub created_by: String,
}
