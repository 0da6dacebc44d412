use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fern::colors::{Color, ColoredLevelConfig};

mod calendar_command;
mod calendar_event;
mod config;
mod console;
mod datetime;
mod duration;
mod event_index;
mod gallery_command;
mod home_command;
mod love_note;
mod media_group;
mod media_item;
mod notes_command;
mod store;

use calendar_command::{CalendarArgs, CalendarCommand};
use config::UserIdentity;
use console::{ConsoleMarkdown, ConsolePresenter};
use gallery_command::{GalleryArgs, GalleryCommand};
use home_command::{HomeArgs, HomeCommand};
use notes_command::{NotesArgs, NotesCommand};
use store::HttpStoreClient;

/// ふたりの思い出を共有するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- home
/// $ cargo run -- gallery --from 2024-01 --to 2024-03
/// $ cargo run -- calendar --add "Anniversary" --date 2023-11-05 --special
/// $ cargo run -- notes --send "I miss you"
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    Home(HomeArgs),
    Gallery(GalleryArgs),
    Calendar(CalendarArgs),
    Notes(NotesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger().context("Failed to initialize logger")?;
    let args = Args::parse();

    let store = HttpStoreClient::new().context("Failed to new store client")?;
    let identity = UserIdentity::from_env().context("Failed to resolve user identity")?;
    let mut stdout = io::stdout();
    let mut presenter = ConsoleMarkdown::new(&mut stdout);

    match args.subcommand {
        SubCommands::Home(home) => {
            let summary = HomeCommand::new(&store).run(home).await?;
            presenter.show_home(&summary)?;
        }
        SubCommands::Gallery(gallery) => {
            let groups = GalleryCommand::new(&store).run(gallery, &identity).await?;
            presenter.show_gallery(&groups)?;
        }
        SubCommands::Calendar(calendar) => {
            let overview = CalendarCommand::new(&store).run(calendar, &identity).await?;
            presenter.show_calendar(&overview)?;
        }
        SubCommands::Notes(notes) => {
            let all_notes = NotesCommand::new(&store).run(notes, &identity).await?;
            presenter.show_notes(&all_notes)?;
        }
    }

    Ok(())
}

/// ロガーを初期化する。ログはstderrに出力する。
fn setup_logger() -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(io::stderr())
        .apply()
        .context("Failed to apply logger configuration")?;

    Ok(())
}
