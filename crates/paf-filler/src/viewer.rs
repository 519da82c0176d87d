use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use tracing::debug;

/// Hands a saved form to something that can display it.
pub trait DocumentViewer {
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// The platform's default application for `.docx` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl SystemViewer {
    fn command(path: &Path) -> Command {
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            // Empty title argument, otherwise `start` treats a quoted path as one
            cmd.arg("/C").arg("start").arg("").arg(path);
            cmd
        }
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl DocumentViewer for SystemViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        let mut cmd = Self::command(path);
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        debug!("Launching viewer: {:?}", cmd);
        spawn_detached(&mut cmd).map(drop)
    }
}

/// Start `cmd` and wait for it on a background thread, so the prompt is not
/// held up by openers that block until the viewer closes and the child is
/// still reaped when it exits.
fn spawn_detached(cmd: &mut Command) -> io::Result<JoinHandle<Option<ExitStatus>>> {
    let mut child = cmd.spawn()?;
    Ok(thread::spawn(move || match child.wait() {
        Ok(status) => {
            debug!("Viewer exited with {}", status);
            Some(status)
        }
        Err(e) => {
            debug!("Failed to wait for viewer: {}", e);
            None
        }
    }))
}
