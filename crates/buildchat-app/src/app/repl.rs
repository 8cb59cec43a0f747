use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;

use buildchat_client::{ChatProxyClient, ClientError, Session, TurnState, BUILDER_SYSTEM_PROMPT};

use crate::cli::ChatArgs;

/// Run interactive chat against a proxy server
pub async fn run_chat_repl(args: &ChatArgs) -> Result<()> {
    let client = ChatProxyClient::new(&args.url);
    let mut session = if args.no_system_prompt {
        Session::new()
    } else {
        Session::new().with_system_prompt(BUILDER_SYSTEM_PROMPT)
    };

    println!("{}", "🛠️  buildchat - describe the app you want to build".bright_cyan().bold());
    println!("{}", format!("Proxy: {}", client.endpoint()).bright_black());
    println!("{}", "Type '/files' to show generated files, '/quit' to exit. Ctrl-C stops a reply.\n".bright_black());

    let mut rl = DefaultEditor::new()?;

    loop {
        let line = match rl.readline(&format!("{} ", "you>".bright_green().bold())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        match input {
            "/quit" | "/exit" | "exit" | "quit" => break,
            "/files" => {
                print_files(&session);
                continue;
            }
            _ => {}
        }

        run_turn(&client, &mut session, input).await;
    }

    println!("{}", "Goodbye!".bright_black());
    Ok(())
}

async fn run_turn(client: &ChatProxyClient, session: &mut Session, input: &str) {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    println!("{}", "assistant>".bright_blue().bold());
    let result = client
        .send(session, input, &cancel, |delta| {
            print!("{}", delta);
            let _ = io::stdout().flush();
        })
        .await;
    watcher.abort();
    println!();

    match result {
        Ok(summary) => match summary.state {
            TurnState::Failed(reason) => {
                eprintln!("{}", format!("⚠️  Reply stopped early ({}); partial text kept", reason).yellow());
            }
            _ if summary.updated_files.is_empty() => {}
            _ => {
                println!(
                    "{}",
                    format!("📄 Updated {}", summary.updated_files.join(", ")).green()
                );
            }
        },
        Err(ClientError::Rejected { status, body }) => {
            let details = body.details.map(|d| format!(": {}", d)).unwrap_or_default();
            eprintln!("{} {} ({}){}", "Error:".red(), body.error, status, details);
        }
        Err(e) => {
            tracing::debug!(error = ?e, "proxy request failed");
            eprintln!("{} {}", "Error:".red(), e);
        }
    }
}

fn print_files(session: &Session) {
    for (name, file) in session.files().iter() {
        let revision = if file.revision == 0 {
            "placeholder".to_string()
        } else {
            format!("rev {}", file.revision)
        };
        println!("{}", format!("── {} [{}] ({})", name, file.language, revision).bright_cyan());
        println!("{}\n", file.content);
    }
}
