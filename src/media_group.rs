use std::collections::HashMap;

use crate::datetime::YearMonth;
use crate::media_item::MediaItem;

/// `YYYY-MM`の両端を含む年月の範囲。
///
/// `from`が`to`より後の場合、範囲に含まれる月は存在しない。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MonthRange {
    pub from: YearMonth,
    pub to: YearMonth,
}

impl MonthRange {
    /// 年月が範囲に含まれるか判定する。
    pub fn contains(&self, month: &YearMonth) -> bool {
        self.from <= *month && *month <= self.to
    }
}

/// 1ヶ月分のメディア。アイテムは入力順を維持する。
#[derive(Clone, Debug, PartialEq)]
pub struct MonthGroup {
    pub month: YearMonth,
    pub label: String,
    pub items: Vec<MediaItem>,
}

/// 1年分のメディア。月は新しい順に並ぶ。
#[derive(Clone, Debug, PartialEq)]
pub struct YearGroup {
    pub year: i32,
    pub months: Vec<MonthGroup>,
}

/// メディアを年月でグルーピングする。
///
/// Localタイムゾーンのアップロード年月をキーとして、年、月ともに新しい順に
/// 並べる。月内のアイテムは入力順を維持し、並べ替えは行わない。
/// 範囲が指定された場合は両端を含む年月のみを残す。
///
/// # Arguments
///
/// * `items` - グルーピングするメディア
/// * `range` - 省略可能な年月の範囲
pub fn group_by_month(items: &[MediaItem], range: Option<&MonthRange>) -> Vec<YearGroup> {
    let mut grouped: HashMap<YearMonth, Vec<MediaItem>> = items
        .iter()
        .filter(|item| match range {
            Some(range) => range.contains(&YearMonth::of_local(&item.uploaded_at)),
            None => true,
        })
        .fold(HashMap::new(), |mut accumurate, item| {
            accumurate
                .entry(YearMonth::of_local(&item.uploaded_at))
                .or_default()
                .push(item.clone());
            accumurate
        });

    let mut keys = grouped.keys().copied().collect::<Vec<_>>();
    keys.sort_unstable_by(|a, b| b.cmp(a));

    keys.into_iter().fold(Vec::new(), |mut year_groups, key| {
        let month_group = MonthGroup {
            month: key,
            label: key.label(),
            items: grouped.remove(&key).unwrap_or_default(),
        };
        match year_groups.last_mut() {
            Some(YearGroup { year, months }) if *year == key.year => months.push(month_group),
            _ => year_groups.push(YearGroup {
                year: key.year,
                months: vec![month_group],
            }),
        }
        year_groups
    })
}
