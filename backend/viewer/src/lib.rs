//! `linelog-viewer` — turns linelog JSON lines back into readable, colorized
//! terminal output.
//!
//! [`render_line`] is the pure transform; [`run`] drives it over a stream.

pub mod palette;
pub mod render;

pub use render::{channel_for, render_line, Channel, Rendered, RESERVED_FIELDS};

use std::io::{self, Write};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// Render every line of `input`, writing each result to `out` or `err`.
///
/// Returns once `input` is exhausted. Lines that aren't valid UTF-8 are
/// copied to `err` byte for byte. A closed output pipe ends the run quietly;
/// other write failures are returned.
pub async fn run<R, O, E>(mut input: R, mut out: O, mut err: E) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    O: Write,
    E: Write,
{
    let mut buf = Vec::new();
    let mut rendered_count = 0usize;

    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read input")?;
        if read == 0 {
            break;
        }

        let line = trim_line_end(&buf);
        let written = match std::str::from_utf8(line) {
            Ok(text) => {
                let rendered = render_line(text);
                match rendered.channel {
                    Channel::Stdout => writeln!(out, "{}", rendered.text),
                    Channel::Stderr => writeln!(err, "{}", rendered.text),
                }
            }
            Err(_) => err.write_all(line).and_then(|()| err.write_all(b"\n")),
        };

        match written {
            Ok(()) => rendered_count += 1,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Output closed; stopping");
                break;
            }
            Err(e) => return Err(e).context("Failed to write rendered line"),
        }
    }

    out.flush().context("Failed to flush stdout")?;
    err.flush().context("Failed to flush stderr")?;
    debug!(lines = rendered_count, "Input exhausted");
    Ok(())
}

/// Drop a trailing `\n` or `\r\n`.
fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
