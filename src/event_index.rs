use std::collections::HashMap;

use chrono::NaiveDate;

use crate::calendar_event::CalendarEvent;

/// 日付ごとに予定を引くためのインデックス。
///
/// カレンダーの1ヶ月表示で日ごとの予定をO(1)で参照するために使う。
/// 同じ日付の予定は入力順を維持する。
#[derive(Clone, Debug, Default)]
pub struct EventIndex {
    by_day: HashMap<NaiveDate, Vec<CalendarEvent>>,
}

/// 予定の一覧から日付インデックスを作成する。
pub fn index_by_day(events: &[CalendarEvent]) -> EventIndex {
    let by_day = events
        .iter()
        .fold(HashMap::new(), |mut accumurate: HashMap<NaiveDate, Vec<CalendarEvent>>, event| {
            accumurate.entry(event.date).or_default().push(event.clone());
            accumurate
        });

    EventIndex { by_day }
}

impl EventIndex {
    /// 指定した日付の予定を取得する。予定がない日は空のスライスを返す。
    pub fn lookup(&self, day: &NaiveDate) -> &[CalendarEvent] {
        self.by_day.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 指定した日付に予定があるか判定する。
    pub fn has_any(&self, day: &NaiveDate) -> bool {
        !self.lookup(day).is_empty()
    }

    /// 指定した日付に特別な予定があるか判定する。
    pub fn has_special(&self, day: &NaiveDate) -> bool {
        self.lookup(day).iter().any(|event| event.is_special)
    }
}
