//! Rendering projects to preview images.
//!
//! The pipeline only sees the [`Renderer`] capability; how an image is
//! produced (and which command lines are tried) is up to the implementation.

pub mod blockbench;

pub use blockbench::{BlockbenchConfig, BlockbenchRenderer};

use crate::error::{PreviewError, Result};
use crate::export::Project;
use crate::report::Reporter;
use crate::types::Side;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Renders a project document to PNG bytes.
pub trait Renderer {
    /// Get ready to render. Called once per run, and only when there is
    /// something to render.
    fn prepare(&self, _reporter: &dyn Reporter) -> Result<()> {
        Ok(())
    }

    /// Render `project`. `name` is a file-system-safe stem for any files the
    /// renderer writes.
    fn render(&self, project: &Project, name: &str, reporter: &dyn Reporter) -> Result<Vec<u8>>;
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// "minecraft:creeper" -> "minecraft_creeper"
pub fn safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Stem used for an entity's render on one side, e.g. "minecraft_creeper.head".
pub fn render_stem(identifier: &str, side: Side) -> String {
    format!("{}.{}", safe_file_name(identifier), side)
}

/// Image file name for an entity's render on one side.
pub fn image_file_name(identifier: &str, side: Side) -> String {
    format!("{}.png", render_stem(identifier, side))
}

/// Check that `bytes` decode as a PNG and return its dimensions.
pub fn validate_png(bytes: &[u8]) -> Result<(u32, u32)> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
    Ok((image.width(), image.height()))
}

/// Run a command, killing it if it outlives `timeout`.
///
/// Output is discarded. Returns the exit status, or `RenderFailed` on timeout.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<ExitStatus> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    wait_with_timeout(&mut child, timeout)
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let started = Instant::now();
    let poll = Duration::from_millis(100);

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            // the child may exit between try_wait and kill
            let _ = child.kill();
            let _ = child.wait();
            return Err(PreviewError::RenderFailed(format!(
                "timed out after {}s",
                timeout.as_secs()
            )));
        }
        thread::sleep(poll.min(timeout.saturating_sub(started.elapsed())));
    }
}
