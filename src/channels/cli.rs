//! CLI front-end: progress on stderr and a stdin chat REPL.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::onboarding::{ChatAssistant, ProgressSink};

/// Prints progress lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn report(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Read lines from `input`, answer each on `output`, until EOF or a stop phrase.
pub async fn chat_loop<R, W>(
    assistant: &ChatAssistant,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }

        match assistant.respond(line).await {
            Ok(reply) => {
                output
                    .write_all(format!("\n{}\n\n", reply.text()).as_bytes())
                    .await?;
                output.flush().await?;
                if reply.is_farewell() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Chat reply failed: {e}");
                output
                    .write_all(format!("\nSorry, something went wrong: {e}\n\n").as_bytes())
                    .await?;
            }
        }
        eprint!("> ");
    }
    Ok(())
}

/// Interactive chat on stdin/stdout.
pub async fn run_chat_repl(assistant: &ChatAssistant) -> std::io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    chat_loop(assistant, stdin, tokio::io::stdout()).await
}
