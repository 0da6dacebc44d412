use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDateTime, Utc};

/// 記念日からの経過期間。
///
/// 表示用に「X年Yヶ月Z日」へ分解した値と、通算日数を保持する。
/// 毎回計算で求める値であり、保存はしない。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RelationshipDuration {
    pub years: u32,
    pub months: u32,
    pub days: i64,
    pub total_days: i64,
}

/// 記念日から現在までの経過期間を計算する。
///
/// 経過期間は記念日のタイムゾーンの暦で計算する。
/// 分解は年、月、日の順で確定するため、記念日に`years`年、`months`ヶ月、
/// `days`日を順に加算すると、日精度で現在に一致する。
///
/// - `now`が`start`より前の場合は全て0を返す。
/// - 年月の加算で対象月に存在しない日になる場合は、月末日に丸める。
///
/// # Arguments
///
/// * `start` - 記念日の開始日時
/// * `now` - 現在日時
pub fn compute_duration(start: &DateTime<FixedOffset>, now: &DateTime<Utc>) -> RelationshipDuration {
    let start_civil = start.naive_local();
    let now_civil = now.with_timezone(&start.timezone()).naive_local();
    if now_civil < start_civil {
        return RelationshipDuration::default();
    }

    let total_days = civil_day_difference(&now_civil, &start_civil);

    // 周年が丸ごと経過した回数
    let mut years = now_civil.year() - start_civil.year();
    if years > 0 && add_months_clamped(&start_civil, (years * 12) as u32) > now_civil {
        years -= 1;
    }

    // 暦上の月が丸ごと経過した回数
    let mut months_raw =
        (now_civil.year() - start_civil.year()) * 12 + now_civil.month() as i32
            - start_civil.month() as i32;
    if months_raw > 0 && add_months_clamped(&start_civil, months_raw as u32) > now_civil {
        months_raw -= 1;
    }
    let months = (months_raw % 12) as u32;

    // 年を先に進めてから月を進める
    let anchor = add_months_clamped(
        &add_months_clamped(&start_civil, (years * 12) as u32),
        months,
    );
    let days = civil_day_difference(&now_civil, &anchor);

    RelationshipDuration {
        years: years as u32,
        months,
        days,
        total_days,
    }
}

/// 暦上の丸1日が経過した回数を計算する。
///
/// 時刻が開始時刻に達していない日は数えない。
fn civil_day_difference(later: &NaiveDateTime, earlier: &NaiveDateTime) -> i64 {
    let mut days = (later.date() - earlier.date()).num_days();
    if later.time() < earlier.time() {
        days -= 1;
    }
    days
}

/// 月数を加算する。存在しない日になる場合は月末日に丸める。
///
/// 対応範囲の日付では加算が失敗することはない。
fn add_months_clamped(datetime: &NaiveDateTime, months: u32) -> NaiveDateTime {
    datetime
        .checked_add_months(Months::new(months))
        .unwrap_or(*datetime)
}
