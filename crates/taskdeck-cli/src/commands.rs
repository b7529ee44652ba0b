//! Command execution against a connected client.

use std::io::Write;

use anyhow::Context;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use taskdeck_client::{dispatch, Client};
use taskdeck_protocol::types::Content;

use crate::cli::{Commands, PromptCommands, ToolCommands};

/// Execute one parsed command.
///
/// Single-shot commands propagate their error (non-zero exit); the repl
/// reports errors and keeps reading.
pub async fn execute(client: &Client, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Tools(ToolCommands::List) => {
            let result = client.list_tools().await?;
            for tool in result.tools {
                match tool.description {
                    Some(description) => println!("{}  -  {description}", tool.name),
                    None => println!("{}", tool.name),
                }
            }
            Ok(())
        }
        Commands::Tools(ToolCommands::Call { name, args }) => {
            let arguments = parse_args(args)?;
            let result = client.call_tool(&name, arguments).await?;
            if result.is_error {
                anyhow::bail!("tool failed: {}", render_content(&result.content));
            }
            println!("{}", render_content(&result.content));
            Ok(())
        }
        Commands::Prompts(PromptCommands::List) => {
            let result = client.list_prompts().await?;
            for prompt in result.prompts {
                match prompt.description {
                    Some(description) => println!("{}  -  {description}", prompt.name),
                    None => println!("{}", prompt.name),
                }
            }
            Ok(())
        }
        Commands::Prompts(PromptCommands::Get { name, args }) => {
            let arguments = parse_args(args)?;
            let result = client.get_prompt(&name, arguments).await?;
            for message in result.messages {
                let Content::Text { text } = message.content;
                println!("[{}] {text}", message.role);
            }
            Ok(())
        }
        Commands::Intent { json } => {
            let result = dispatch(client, &json).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Repl => repl(client).await,
    }
}

/// Read one JSON intent per line; errors are printed, the loop continues.
async fn repl(client: &Client) -> anyhow::Result<()> {
    repl_loop(client, BufReader::new(tokio::io::stdin())).await
}

async fn repl_loop<R: AsyncBufRead + Unpin>(client: &Client, reader: R) -> anyhow::Result<()> {
    let mut lines = reader.lines();
    let mut stdout = std::io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match dispatch(client, line).await {
            Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
            Err(e) => eprintln!("error: {e}"),
        }
    }
}

fn parse_args(args: Option<String>) -> anyhow::Result<Option<Value>> {
    args.map(|raw| serde_json::from_str(&raw).context("arguments are not valid JSON"))
        .transpose()
}

fn render_content(content: &[Content]) -> String {
    content
        .iter()
        .map(|block| {
            let Content::Text { text } = block;
            text.as_str()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
