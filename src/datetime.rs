use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

#[cfg(not(test))]
/// 現在のUTC時間を取得する。
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Localタイムゾーンで今日の日付を取得する。
pub fn today_local() -> NaiveDate {
    now().with_timezone(&Local).date_naive()
}

/// 年月を表す構造体。
///
/// 日付を持たないカレンダー上の1ヶ月を識別する。
/// 比較は年、月の順で行う。
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// UTC時刻からLocalタイムゾーンの年月を取得する。
    pub fn of_local(instant: &DateTime<Utc>) -> Self {
        let local = instant.with_timezone(&Local);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    /// 日付から年月を取得する。
    pub fn of_day(day: &NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    /// 月の初日を取得する。
    ///
    /// 年月は正しい値しか構築されないため、通常失敗しない。
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// 翌月を取得する。
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// 月の日数を取得する。
    pub fn day_count(&self) -> u32 {
        match (self.first_day(), self.succ().first_day()) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 0,
        }
    }

    /// 月名の英語表記を取得する。
    pub fn label(&self) -> String {
        self.first_day()
            .map(|day| day.format("%B").to_string())
            .unwrap_or_default()
    }
}

/// `YYYY-MM`形式の文字列を年月にパースする。
pub fn parse_year_month(s: &str) -> Result<YearMonth> {
    let target_date = s.to_string() + "-01";
    let naive_date = NaiveDate::parse_from_str(&target_date, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse month: {}", s))?;
    Ok(YearMonth::of_day(&naive_date))
}

/// `YYYY-MM-DD`形式の文字列を日付にパースする。
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

/// テスト時に利用するモック時間を取得する。
#[cfg(test)]
pub mod mock_datetime {
    use std::cell::RefCell;

    use super::DateTime;
    use super::Utc;

    thread_local! {
        static MOCK_TIME: RefCell<Option<DateTime<Utc>>> = RefCell::new(None);
    }

    /// モック時間を取得する。
    pub fn now() -> DateTime<Utc> {
        MOCK_TIME.with(|cell| cell.borrow().as_ref().cloned().unwrap_or_else(Utc::now))
    }

    /// モック時間を設定する。
    pub fn set_mock_time(time: DateTime<Utc>) {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = Some(time));
    }

    // 設定したモック時間をクリアする。
    pub fn clear_mock_time() {
        MOCK_TIME.with(|cell| *cell.borrow_mut() = None);
    }
}

#[cfg(test)]
pub use mock_datetime::now;
