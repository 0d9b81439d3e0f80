//! CLI channel — stdin/stdout REPL over one dialogue session.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::dialogue::{Author, Input, Message, RevealPacer};
use crate::error::InputError;
use crate::session::DialogueSession;

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(Input),
    Restart,
    Quit,
    Empty,
}

/// `3` picks the third choice, `=12.5` enters a measured value, `/restart`
/// and `/quit` control the session, anything else is free text.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" => Command::Empty,
        "/quit" | "/exit" => Command::Quit,
        "/restart" => Command::Restart,
        _ => {
            if let Some(value) = line.strip_prefix('=') {
                return Command::Input(Input::Text(value.trim().to_string()));
            }
            match line.parse::<usize>() {
                Ok(n) if n > 0 => Command::Input(Input::Choice(n - 1)),
                _ => Command::Input(Input::Text(line.to_string())),
            }
        }
    }
}

pub struct CliChannel {
    session: Arc<DialogueSession>,
    pacer: RevealPacer,
}

impl CliChannel {
    pub fn new(session: Arc<DialogueSession>, pacer: RevealPacer) -> Self {
        Self { session, pacer }
    }

    /// Run against the process's stdin and stdout until EOF or `/quit`.
    pub async fn run(&self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        self.run_with(stdin, &mut stdout).await
    }

    pub async fn run_with<R, W>(&self, reader: R, out: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.render(out).await?;
        let mut lines = reader.lines();

        loop {
            let Some(line) = lines.next_line().await? else {
                break; // EOF
            };

            match parse_line(&line) {
                Command::Empty => {}
                Command::Quit => break,
                Command::Restart => {
                    self.session.restart().await;
                    writeln!(out)?;
                }
                Command::Input(input) => match self.session.begin(input).await {
                    Ok(Some(ticket)) => {
                        self.render(out).await?;
                        eprintln!("⏳ Classifying...");
                        self.session.classify(ticket).await;
                    }
                    Ok(None) => {}
                    Err(InputError::InvalidChoice { available, .. }) => {
                        writeln!(out, "Please pick a number between 1 and {available}.")?;
                    }
                    Err(InputError::NotAcceptingInput { .. }) => {
                        writeln!(out, "The conversation is over. Type /restart to begin again or /quit to leave.")?;
                    }
                    Err(e) => tracing::debug!(error = %e, "Input rejected"),
                },
            }
            self.render(out).await?;
        }
        Ok(())
    }

    /// Reveal queued messages, then list the current choices.
    ///
    /// The session lock is released before pacing starts.
    async fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let (fresh, choices, accepts_value) = {
            let mut controller = self.session.lock().await;
            (
                controller.timeline_mut().reveal_all().to_vec(),
                controller.choices(),
                controller.accepts_value(),
            )
        };

        let mut result = Ok(());
        self.pacer
            .play(&fresh, |message| {
                if result.is_ok() {
                    result = write_message(out, message).and_then(|()| out.flush());
                }
            })
            .await;
        result?;

        if choices.is_empty() {
            return out.flush();
        }
        for (i, choice) in choices.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, choice)?;
        }
        if accepts_value {
            writeln!(out, "  (or type =<value> to enter a measurement)")?;
        }
        write!(out, "> ")?;
        out.flush()
    }
}

fn write_message<W: Write>(out: &mut W, message: &Message) -> std::io::Result<()> {
    match message.author {
        Author::Bot => writeln!(out, "\n{}", message.text),
        Author::User => writeln!(out, "  → {}", message.text),
    }
}
