//! Terminal control: alternate screen, redraws, and the exit signal.

use std::io::{self, Write};

use tokio::sync::watch;
use tracing::debug;

const ENTER_ALT_SCREEN: &str = "\x1b[?1049h\x1b[2J\x1b[H";
const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";
const CLEAR: &str = "\x1b[H\x1b[2J";

/// The alternate screen, left again on drop.
pub struct Screen {
    out: io::Stdout,
    active: bool,
}

impl Screen {
    pub fn enter() -> io::Result<Self> {
        let mut out = io::stdout();
        out.write_all(ENTER_ALT_SCREEN.as_bytes())?;
        out.flush()?;
        Ok(Self { out, active: true })
    }

    /// Clear and draw a full frame.
    pub fn draw(&mut self, frame: &str) -> io::Result<()> {
        let mut lock = self.out.lock();
        lock.write_all(CLEAR.as_bytes())?;
        lock.write_all(frame.as_bytes())?;
        lock.flush()
    }

    /// Back to the normal screen.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.out.write_all(LEAVE_ALT_SCREEN.as_bytes())?;
        self.out.flush()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// Flip `exit` once a line arrives on stdin.
///
/// Plain thread: a blocking read must not hold up runtime shutdown.
pub fn exit_on_enter(exit: watch::Sender<bool>) {
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = io::stdin().read_line(&mut line);
        debug!("enter pressed");
        let _ = exit.send(true);
    });
}

/// Flip `exit` on Ctrl-C.
pub fn exit_on_ctrl_c(exit: watch::Sender<bool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("ctrl-c received");
            let _ = exit.send(true);
        }
    });
}
