//! Request loop driving one playground
//!
//! Single actor: requests are handled one at a time, each regeneration runs to
//! completion before the next line is read. Between requests the loop also
//! waits on the next highlight deadline and reports expiries unsolicited.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::playground::Playground;
use crate::protocol::{decode_request, encode_line, Request, Response};

/// Outcome of handling one request
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Reply(Response),
    Stop,
}

enum Event {
    Line(Option<String>),
    Expired(Vec<usize>),
}

pub struct Session {
    playground: Playground,
}

impl Session {
    pub fn new(playground: Playground) -> Self {
        Self { playground }
    }

    pub fn playground(&self) -> &Playground {
        &self.playground
    }

    /// Apply one request to the playground
    pub fn handle(&mut self, request: Request) -> Flow {
        match request {
            Request::SetValue { name, value } => {
                if !self.playground.set_value(&name, value) {
                    debug!(option = %name, "Ignoring value for unknown option");
                }
                Flow::Reply(Response::Snapshot(self.playground.snapshot()))
            }

            Request::Reset => {
                self.playground.reset();
                Flow::Reply(Response::Snapshot(self.playground.snapshot()))
            }

            Request::LoadSchema(definitions) => {
                info!(count = definitions.len(), "Received new option schema");
                self.playground.initialize(&definitions);
                Flow::Reply(Response::Snapshot(self.playground.snapshot()))
            }

            Request::SetSources(sources) => {
                self.playground.set_sources(sources);
                Flow::Reply(Response::Snapshot(self.playground.snapshot()))
            }

            Request::Snapshot => Flow::Reply(Response::Snapshot(self.playground.snapshot())),

            Request::Ping => Flow::Reply(Response::Pong),

            Request::Shutdown => {
                info!("Received shutdown request");
                Flow::Stop
            }
        }
    }

    /// Decode and apply one input line; malformed lines produce an `Error` reply
    pub fn handle_line(&mut self, line: &str) -> Option<Flow> {
        if line.trim().is_empty() {
            return None;
        }
        Some(match decode_request(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!(error = %e, "Rejected malformed request");
                Flow::Reply(Response::Error(format!("{e:#}")))
            }
        })
    }

    /// Serve requests from `reader` until EOF or `Shutdown`
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Session started");
        let mut lines = reader.lines();

        loop {
            // Both branches are cancel-safe: next_line buffers partial input,
            // wait_for_expiry mutates only after its sleep completes
            let event = tokio::select! {
                line = lines.next_line() => {
                    Event::Line(line.context("Failed to read request line")?)
                }
                expired = self.playground.wait_for_expiry() => Event::Expired(expired),
            };

            match event {
                Event::Line(None) => {
                    info!("Input closed, ending session");
                    break;
                }
                Event::Line(Some(line)) => match self.handle_line(&line) {
                    Some(Flow::Reply(response)) => write_response(&mut writer, &response).await?,
                    Some(Flow::Stop) => break,
                    None => {}
                },
                Event::Expired(lines) if lines.is_empty() => {}
                Event::Expired(lines) => {
                    let response = Response::HighlightsExpired {
                        lines,
                        remaining: self.playground.highlighted_lines(),
                    };
                    write_response(&mut writer, &response).await?;
                }
            }
        }

        writer.flush().await.context("Failed to flush output")?;
        Ok(())
    }
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
    let mut line = encode_line(response)?;
    line.push('\n');
    writer
        .write_all(line.as_bytes())
        .await
        .context("Failed to write response")?;
    writer.flush().await.context("Failed to flush response")?;
    Ok(())
}
