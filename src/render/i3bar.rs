//! # i3bar / swaybar JSON protocol.
//!
//! [`I3bar`] writes composite lines to the bar host (usually stdout);
//! [`read_clicks`] reads click events from it (usually stdin) and hands them
//! to a [`ClickRouter`].
//!
//! ```text
//! {"version":1,"click_events":true}
//! [
//! [{"full_text":"LastPass","color":"#00ff00","separator":false,"separator_block_width":25,"name":"lastpass","instance":"0"}, ...],
//! [...],
//! ```
//!
//! ## Rules
//! - The header and the opening `[` are written before the first line.
//! - `instance` is the position of the block in the line; clicks carry it
//!   back and are resolved against the line the router currently holds.
//! - Padding > 0 becomes `separator_block_width` with the separator hidden.
//! - Unparseable click lines are logged and skipped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::Render;
use crate::config::Palette;
use crate::core::ClickRouter;
use crate::error::RenderError;
use crate::output::{Button, ClickEvent, CompositeLine};

#[derive(Serialize)]
struct Header {
    version: u32,
    click_events: bool,
}

#[derive(Serialize)]
struct Block<'a> {
    full_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    separator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    separator_block_width: Option<u32>,
    name: &'a str,
    instance: String,
}

/// Renderer speaking the i3bar protocol over any async writer.
pub struct I3bar<W> {
    out: W,
    palette: Palette,
    started: bool,
}

impl<W> I3bar<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(out: W, palette: Palette) -> Self {
        Self {
            out,
            palette,
            started: false,
        }
    }

    /// Consumes the renderer and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn encode(&self, line: &CompositeLine) -> Result<Vec<u8>, serde_json::Error> {
        let blocks: Vec<Block<'_>> = line
            .entries()
            .iter()
            .enumerate()
            .map(|(pos, e)| {
                let padding = e.segment.padding();
                Block {
                    full_text: e.segment.text(),
                    color: e.segment.color().map(|c| self.palette.resolve(c)),
                    separator: (padding > 0).then_some(false),
                    separator_block_width: (padding > 0).then_some(padding),
                    name: &e.name,
                    instance: pos.to_string(),
                }
            })
            .collect();
        let mut buf = serde_json::to_vec(&blocks)?;
        buf.extend_from_slice(b",\n");
        Ok(buf)
    }
}

#[async_trait]
impl<W> Render for I3bar<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn render(&mut self, line: &CompositeLine) -> Result<(), RenderError> {
        if !self.started {
            let mut header = serde_json::to_vec(&Header {
                version: 1,
                click_events: true,
            })?;
            header.extend_from_slice(b"\n[\n");
            self.out.write_all(&header).await?;
            self.started = true;
        }
        let buf = self.encode(line)?;
        self.out.write_all(&buf).await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[derive(Deserialize, Debug)]
struct ClickJson {
    #[serde(default)]
    instance: Option<String>,
    button: u32,
}

/// Parses one line of the click stream.
///
/// Returns `None` for the opening `[`, blank lines and unusable events.
fn parse_click(raw: &str) -> Option<ClickEvent> {
    let trimmed = raw
        .trim()
        .trim_start_matches(|c: char| c == '[' || c == ',')
        .trim_end_matches(',');
    let trimmed = trimmed.trim();
    if trimmed.is_empty() {
        return None;
    }
    let click: ClickJson = match serde_json::from_str(trimmed) {
        Ok(c) => c,
        Err(err) => {
            warn!(line = raw, error = %err, "unparseable click event");
            return None;
        }
    };
    let Some(button) = Button::from_code(click.button) else {
        debug!(button = click.button, "unknown mouse button");
        return None;
    };
    let position = click.instance.as_deref()?.parse::<usize>().ok()?;
    Some(ClickEvent::at(position, button))
}

/// Reads click events until EOF and dispatches them to `router`.
pub async fn read_clicks<R>(reader: R, router: ClickRouter) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(raw) = lines.next_line().await? {
        if let Some(event) = parse_click(&raw) {
            debug!(?event, "click");
            router.dispatch(event);
        }
    }
    Ok(())
}
