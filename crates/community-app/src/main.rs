use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use community_app::appearance::Appearance;
use community_app::board::Board;
use community_app::chat::Chat;
use community_app::commands::{Flow, HELP, Shell};
use community_app::config::Config;
use community_app::page::{Page, PageHandle};
use community_app::poller::VisibilityWatch;
use community_app::state_file::StateFile;
use community_types::packet::Message;
use community_view::Notification;
use community_view::chat::{TYPING_INTERVAL, TypingReveal};
use community_view::time::format_clock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "community=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    let client = config.api_client()?;
    info!(base_url = %config.base_url, "Starting community client");

    let mut page = PageHandle::new(Page::default());
    if let Some(path) = &config.snapshot_path {
        info!("Writing page snapshots to {}", path.display());
        page = page.with_snapshot(path.clone());
    }
    let appearance = Appearance::restore(StateFile::in_dir(&config.state_dir), page.clone());

    let board = Board::new(client.clone(), page.clone(), config.viewer());
    let chat = Chat::new(client, page.clone(), config.user_email.clone(), config.ask_ai);

    tokio::spawn(print_notifications(page.subscribe_notifications()));
    tokio::spawn(echo_messages(chat.subscribe()));

    let chat_poller = chat.start_polling(config.history_poll);
    let mut triggers = vec![chat_poller.trigger()];
    let board_poller = match config.board_poll {
        Some(every) => {
            let poller = board.start_polling(every);
            triggers.push(poller.trigger());
            Some(poller)
        }
        None => {
            board.load().await;
            None
        }
    };

    println!("{HELP}");
    let mut shell = Shell::new(board, chat, appearance, VisibilityWatch::new(triggers));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if shell.handle(&line).await == Flow::Quit {
                    break;
                }
            }
        }
    }

    chat_poller.shutdown().await;
    if let Some(poller) = board_poller {
        poller.shutdown().await;
    }
    info!("Community client stopped");
    Ok(())
}

async fn print_notifications(mut rx: broadcast::Receiver<Notification>) {
    loop {
        match rx.recv().await {
            Ok(notification) => println!("» {}", notification.message),
            Err(RecvError::Lagged(n)) => warn!("Skipped {n} notifications"),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Echo new chat messages; AI replies are typed out.
async fn echo_messages(mut rx: broadcast::Receiver<Message>) {
    loop {
        let message = match rx.recv().await {
            Ok(message) => message,
            Err(RecvError::Lagged(n)) => {
                warn!("Skipped {n} chat messages");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        println!("{} • {}", message.sender, format_clock(message.timestamp));
        if !message.is_ai() {
            println!("{}", message.body);
            continue;
        }

        let mut shown = 0;
        for prefix in TypingReveal::new(&message.body) {
            print!("{}", &prefix[shown..]);
            let _ = std::io::stdout().flush();
            shown = prefix.len();
            tokio::time::sleep(TYPING_INTERVAL).await;
        }
        println!();
    }
}
