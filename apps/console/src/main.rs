//! Terminal client for the crewdesk backend: login, a few read views, and an
//! interactive assistant chat over the realtime transport.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crewdesk_chat::{ChatConfig, connect};
use crewdesk_client::api;
use crewdesk_client::store::SharedCredentialStore;
use crewdesk_client::{ApiClient, AuthSession, FileCredentialStore};
use crewdesk_core::{ChatRole, Role, ThemeMode};

#[derive(Parser)]
#[command(name = "crewdesk", about = "Console client for the crewdesk dashboard")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "CREWDESK_API", default_value = "http://127.0.0.1:8990")]
    api: String,
    /// Realtime endpoint base; derived from --api when omitted.
    #[arg(long, env = "CREWDESK_WS")]
    ws: Option<String>,
    /// Credential file; defaults to .crewdesk/state.json in the home
    /// directory (or the working directory without one).
    #[arg(long, env = "CREWDESK_STATE")]
    state_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Drop the stored session.
    Logout,
    /// Show the signed-in profile.
    Me,
    /// List staff accounts.
    Staff {
        #[arg(long)]
        role: Option<String>,
    },
    /// List tasks, optionally for one assignee.
    Tasks {
        #[arg(long)]
        assigned_to: Option<i64>,
    },
    /// List notifications for the signed-in user.
    Notifications,
    /// Persist the UI theme preference.
    Theme { mode: String },
    /// Interactive chat with the assistant. `/quit` exits.
    Chat,
}

fn state_path(cli: &Cli) -> PathBuf {
    if let Some(path) = &cli.state_file {
        return path.clone();
    }
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".crewdesk")
        .join("state.json")
}

fn ws_base(cli: &Cli) -> String {
    cli.ws.clone().unwrap_or_else(|| {
        cli.api
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1)
    })
}

fn parse_role(value: &str) -> Result<Role> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .with_context(|| format!("unknown role {value:?}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store: SharedCredentialStore = Arc::new(FileCredentialStore::open(state_path(&cli))?);
    let client = ApiClient::new(&cli.api, Arc::clone(&store));
    client.events().on_session_expired(|| {
        eprintln!("session expired; run `crewdesk login` again");
    });
    let session = AuthSession::new(client.clone());

    match &cli.command {
        Command::Login { email, password } => {
            let user = session.login(email, password).await?;
            println!("signed in as {} ({})", user.full_name, user.role.as_str());
        }
        Command::Logout => {
            session.logout().await?;
            println!("signed out");
        }
        Command::Me => match session.load_user().await? {
            Some(user) => println!("{} <{}> — {}", user.full_name, user.email, user.role.as_str()),
            None => println!("not signed in"),
        },
        Command::Staff { role } => {
            let role = role.as_deref().map(parse_role).transpose()?;
            for user in api::users::list(&client, role).await? {
                let mut flags = String::new();
                if user.role.is_management() {
                    flags.push_str(" [mgmt]");
                }
                if !user.is_active {
                    flags.push_str(" (inactive)");
                }
                println!("#{:<4} {:<24} {}{}", user.id, user.full_name, user.role.as_str(), flags);
            }
        }
        Command::Tasks { assigned_to } => {
            let tasks = api::tasks::list(
                &client,
                &api::tasks::TaskQuery {
                    assigned_to: *assigned_to,
                    ..Default::default()
                },
            )
            .await?;
            for task in tasks {
                println!(
                    "#{:<4} [{:?}/{:?}] {}",
                    task.id, task.priority, task.status, task.title
                );
            }
        }
        Command::Notifications => {
            for item in api::notifications::list(&client, None).await? {
                let marker = if item.is_read { " " } else { "*" };
                println!("{marker} {} — {}", item.title, item.message);
            }
        }
        Command::Theme { mode } => {
            let theme = match mode.as_str() {
                "light" => ThemeMode::Light,
                "dark" => ThemeMode::Dark,
                other => anyhow::bail!("unknown theme {other:?} (expected light or dark)"),
            };
            store.set_theme(theme).await?;
            println!("theme set to {mode}");
        }
        Command::Chat => run_chat(&cli, store).await?,
    }
    Ok(())
}

async fn run_chat(cli: &Cli, store: SharedCredentialStore) -> Result<()> {
    let handle = connect(ChatConfig::new(ws_base(cli)), store);
    let mut status = handle.watch_status();
    let mut revision = handle.watch_revision();
    let mut printed = 0usize;

    println!("chat ready; type a message, /clear to reset, /quit to exit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == "/quit" => break,
                Some(line) if line.trim() == "/clear" => {
                    handle.clear().await;
                    printed = 0;
                }
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if !handle.is_connected() {
                        eprintln!("(disconnected, message not sent)");
                    }
                    handle.send(line);
                }
                None => break,
            },
            changed = revision.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = handle.snapshot().await;
                for message in &snapshot.messages()[printed.min(snapshot.messages().len())..] {
                    let who = match message.role {
                        ChatRole::User => "you",
                        ChatRole::Assistant => "assistant",
                    };
                    println!("{who}> {}", message.content);
                }
                printed = snapshot.messages().len();
                if snapshot.is_typing() {
                    println!("assistant is typing...");
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                if *status.borrow_and_update() {
                    println!("(connected)");
                } else {
                    println!("(disconnected, retrying)");
                }
            }
        }
    }

    handle.close();
    handle.join().await;
    Ok(())
}
