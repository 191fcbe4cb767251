//! Interactive chat over one document.

use crate::commands::DocumentSession;
use crate::config::glean_dir;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use glean_domain::{DocumentId, LlmProvider};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fmt::Display;
use std::path::PathBuf;

/// One line of chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Leave the chat
    Exit,
    /// Show available commands
    Help,
    /// Show questions asked so far
    History,
    /// Run taxonomy extraction
    Extract,
    /// Show the document preview
    Show,
    /// Ask a question
    Ask(String),
}

/// Parse a chat line. Anything that is not a command is a question.
pub fn parse_repl_command(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let command = match line {
        "exit" | "quit" | "q" | ":exit" | ":quit" | ":q" => ReplCommand::Exit,
        "help" | "?" | ":help" => ReplCommand::Help,
        ":history" => ReplCommand::History,
        ":extract" => ReplCommand::Extract,
        ":show" => ReplCommand::Show,
        question => ReplCommand::Ask(question.to_string()),
    };
    Some(command)
}

/// Run the chat loop until `exit` or end of input.
pub async fn run_chat<L>(
    service: &DocumentSession<L>,
    id: &DocumentId,
    history_size: usize,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let view = service.view(id).await?;
    println!(
        "{}",
        formatter.info(&format!(
            "Chatting about '{}' ({} chunks). Type 'help' for commands, 'exit' to quit",
            view.filename, view.total_chunks
        ))
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(history_size)
        .map_err(|e| CliError::Editor(e.to_string()))?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)
        .map_err(|e| CliError::Editor(format!("Failed to initialize editor: {}", e)))?;

    let history_path = history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        match editor.readline("glean> ") {
            Ok(line) => {
                let Some(command) = parse_repl_command(&line) else {
                    continue;
                };
                editor.add_history_entry(line.trim()).ok();

                if command == ReplCommand::Exit {
                    println!("{}", formatter.info("Goodbye!"));
                    break;
                }
                if let Err(e) = execute_repl_command(command, service, id, formatter).await {
                    eprintln!("{}", formatter.error(&e.to_string()));
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();
    Ok(())
}

/// Execute one chat command.
async fn execute_repl_command<L>(
    command: ReplCommand,
    service: &DocumentSession<L>,
    id: &DocumentId,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    match command {
        ReplCommand::Exit => {}
        ReplCommand::Help => print_help(formatter),
        ReplCommand::History => {
            let history = service.chat_history(id).await?;
            println!("{}", formatter.format_history(&history)?);
        }
        ReplCommand::Extract => {
            let payload = service.extract(id).await?;
            println!("{}", formatter.format_extraction(&payload)?);
        }
        ReplCommand::Show => {
            let view = service.view(id).await?;
            for (i, text) in view.preview.iter().enumerate() {
                println!("{}", formatter.info(&format!("chunk {}", i)));
                println!("{}\n", text);
            }
            println!("{}", formatter.info(&format!("{} chunk(s) in total", view.total_chunks)));
        }
        ReplCommand::Ask(question) => {
            let answer = service.ask(id, &question).await?;
            println!("{}", formatter.format_answer(&answer)?);
        }
    }
    Ok(())
}

fn history_path() -> Result<PathBuf> {
    let dir = glean_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  <question>              - Ask about the document");
    println!("  :history                - Show questions asked so far");
    println!("  :extract                - Extract the contract taxonomy");
    println!("  :show                   - Show the first chunks");
    println!("  help, ?                 - Show this help");
    println!("  exit, quit, q           - Leave the chat");
    println!();
}
