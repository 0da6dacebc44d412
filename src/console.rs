use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};

use crate::calendar_command::MonthOverview;
use crate::calendar_event::CalendarEvent;
use crate::duration::RelationshipDuration;
use crate::home_command::HomeSummary;
use crate::love_note::LoveNote;
use crate::media_group::YearGroup;

/// 曜日の列見出し。日曜始まり。
const WEEKDAY_LABELS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Consoleに各画面の情報を表示するためのtrait。
pub trait ConsolePresenter {
    /// ホームのサマリーを表示する。
    fn show_home(&mut self, summary: &HomeSummary) -> Result<()>;

    /// 年月でグルーピングしたメディアの一覧を表示する。
    fn show_gallery(&mut self, groups: &[YearGroup]) -> Result<()>;

    /// 1ヶ月分のカレンダーを表示する。
    fn show_calendar(&mut self, overview: &MonthOverview) -> Result<()>;

    /// ノートの一覧を表示する。
    fn show_notes(&mut self, notes: &[LoveNote]) -> Result<()>;
}

/// 各画面をMarkdownのlist形式で表示する。
pub struct ConsoleMarkdown<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdown<'a, W> {
    /// 新しい`ConsoleMarkdown`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdown<'a, W> {
    fn show_home(&mut self, summary: &HomeSummary) -> Result<()> {
        writeln!(self.writer, "## Together for").context("Failed to write header")?;
        writeln!(self.writer, "- {}", duration_phrase(&summary.duration))
            .context("Failed to write duration")?;
        writeln!(
            self.writer,
            "- {} beautiful days together",
            summary.duration.total_days
        )
        .context("Failed to write total days")?;

        writeln!(self.writer, "\n## Recent notes").context("Failed to write header")?;
        if summary.recent_notes.is_empty() {
            writeln!(self.writer, "No notes yet. Send the first one!")
                .context("Failed to write empty state")?;
        } else {
            for note in &summary.recent_notes {
                writeln!(self.writer, "{}", note_line(note))
                    .with_context(|| format!("Failed to write note: {:?}", note))?;
            }
        }

        writeln!(self.writer, "\n## Recent photos").context("Failed to write header")?;
        if summary.recent_photos.is_empty() {
            writeln!(self.writer, "No photos yet. Upload a memory!")
                .context("Failed to write empty state")?;
        } else {
            for item in &summary.recent_photos {
                writeln!(
                    self.writer,
                    "- {} uploaded by {} (id: {})",
                    item.name, item.uploaded_by, item.id
                )
                .with_context(|| format!("Failed to write media item: {:?}", item))?;
            }
        }

        Ok(())
    }

    fn show_gallery(&mut self, groups: &[YearGroup]) -> Result<()> {
        if groups.is_empty() {
            writeln!(self.writer, "No media yet. Upload your first memory!")
                .context("Failed to write empty state")?;
            return Ok(());
        }

        for group in groups {
            writeln!(self.writer, "## {}", group.year).context("Failed to write year")?;
            for month in &group.months {
                writeln!(self.writer, "\n### {}", month.label).context("Failed to write month")?;
                for item in &month.items {
                    writeln!(
                        self.writer,
                        "- {} [{}] uploaded by {} (id: {})",
                        item.name,
                        item.kind.as_str(),
                        item.uploaded_by,
                        item.id
                    )
                    .with_context(|| format!("Failed to write media item: {:?}", item))?;
                }
            }
            writeln!(self.writer).context("Failed to write separator")?;
        }

        Ok(())
    }

    fn show_calendar(&mut self, overview: &MonthOverview) -> Result<()> {
        writeln!(
            self.writer,
            "## {} {}",
            overview.month.label(),
            overview.month.year
        )
        .context("Failed to write month header")?;

        for line in month_grid_lines(overview) {
            writeln!(self.writer, "{}", line).context("Failed to write grid line")?;
        }

        if !overview.month_events.is_empty() {
            writeln!(self.writer, "\n### Events").context("Failed to write header")?;
            for event in &overview.month_events {
                writeln!(self.writer, "{}", event_line(event))
                    .with_context(|| format!("Failed to write event: {:?}", event))?;
            }
        }

        if !overview.special_events.is_empty() {
            writeln!(self.writer, "\n### Special").context("Failed to write header")?;
            for event in &overview.special_events {
                writeln!(
                    self.writer,
                    "- {}: {} (id: {})",
                    event.date.format("%b %d"),
                    event.title,
                    event.id
                )
                .with_context(|| format!("Failed to write event: {:?}", event))?;
            }
        }

        Ok(())
    }

    fn show_notes(&mut self, notes: &[LoveNote]) -> Result<()> {
        if notes.is_empty() {
            writeln!(self.writer, "No notes yet").context("Failed to write empty state")?;
            return Ok(());
        }

        for note in notes {
            writeln!(self.writer, "{}", note_line(note))
                .with_context(|| format!("Failed to write note: {:?}", note))?;
        }

        Ok(())
    }
}

/// 経過期間を読みやすい文にする。
///
/// 0年の場合は年を、0年0ヶ月の場合は月も省略する。
fn duration_phrase(duration: &RelationshipDuration) -> String {
    let mut parts = Vec::new();
    if duration.years > 0 {
        parts.push(pluralized(duration.years as i64, "year"));
    }
    if duration.years > 0 || duration.months > 0 {
        parts.push(pluralized(duration.months as i64, "month"));
    }
    parts.push(pluralized(duration.days, "day"));

    parts.join(", ")
}

/// 数量と単位をまとめ、1以外の場合は複数形にする。
fn pluralized(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// 1ヶ月分のカレンダーの行を組み立てる。
///
/// 1マス4文字の固定幅で、予定のある日は`.`、特別な予定のある日は`+`を
/// 付け、今日は`[ ]`で囲む。
fn month_grid_lines(overview: &MonthOverview) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(
        WEEKDAY_LABELS
            .iter()
            .map(|label| format!(" {} ", label))
            .collect::<String>()
            .trim_end()
            .to_string(),
    );

    let first_day = match overview.month.first_day() {
        Some(first_day) => first_day,
        None => return lines,
    };
    let offset = first_day.weekday().num_days_from_sunday();

    let mut cells = vec!["    ".to_string(); offset as usize];
    for day_number in 1..=overview.month.day_count() {
        let day = match first_day.with_day(day_number) {
            Some(day) => day,
            None => continue,
        };
        let cell = if day == overview.today {
            format!("[{:>2}]", day_number)
        } else {
            let marker = if overview.index.has_special(&day) {
                '+'
            } else if overview.index.has_any(&day) {
                '.'
            } else {
                ' '
            };
            format!(" {:>2}{}", day_number, marker)
        };
        cells.push(cell);

        if cells.len() == 7 {
            lines.push(cells.concat().trim_end().to_string());
            cells.clear();
        }
    }
    if !cells.is_empty() {
        lines.push(cells.concat().trim_end().to_string());
    }

    lines
}

/// 予定1件分の行を作成する。
fn event_line(event: &CalendarEvent) -> String {
    let special_mark = if event.is_special { " +" } else { "" };
    let description = event
        .description
        .as_deref()
        .map(|description| format!(" - {}", description))
        .unwrap_or_default();

    format!(
        "- {}: {}{}{} (id: {})",
        event.date, event.title, special_mark, description, event.id
    )
}

/// ノート1件分の行を作成する。
fn note_line(note: &LoveNote) -> String {
    format!(
        "- {} {}: {} (id: {})",
        note.created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M"),
        note.sender_name,
        note.content,
        note.id
    )
}
