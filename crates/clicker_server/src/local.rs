//! Local play: one anonymous session on the process's own terminal.
//!
//! Progress goes to a single save file guarded by a pid lock file. Stdin is
//! read on a plain thread; `SIGWINCH` becomes a resize event. The hub exits
//! once the session ends.

use std::future::Future;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use clicker_core::identity::Identity;
use clicker_core::persistence::PersistenceAdapter;
use clicker_game::terminal::TtySink;
use clicker_game::SessionId;
use crossterm::{cursor, execute, terminal};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::hub::{Hub, HubConfig, HubHandle};
use crate::store::LocalStore;

const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Restores the terminal if the process unwinds past the session.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = execute!(out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = out.flush();
    }
}

/// Current terminal size, or 80x24 when it cannot be read.
fn terminal_size() -> (u16, u16) {
    match terminal::size() {
        Ok((w, h)) if w > 0 && h > 0 => (w, h),
        _ => FALLBACK_SIZE,
    }
}

fn spawn_stdin_reader(hub: HubHandle, id: SessionId) {
    let spawned = thread::Builder::new().name("stdin".into()).spawn(move || {
        let mut stdin = io::stdin().lock();
        let mut buf = [0u8; 1024];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => {
                    debug!("stdin closed");
                    hub.disconnect(id);
                    break;
                }
                Ok(n) => {
                    if hub.input(id, buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    hub.disconnect(id);
                    break;
                }
            }
        }
    });
    if let Err(e) = spawned {
        warn!(error = %e, "Could not start stdin reader");
    }
}

#[cfg(unix)]
fn spawn_resize_watcher(hub: HubHandle, id: SessionId) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut winch = match signal(SignalKind::window_change()) {
        Ok(winch) => winch,
        Err(e) => {
            warn!(error = %e, "Could not watch for terminal resizes");
            return;
        }
    };
    tokio::spawn(async move {
        while winch.recv().await.is_some() {
            let (width, height) = terminal_size();
            if hub.resize(id, width, height).is_err() {
                break;
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_resize_watcher(_hub: HubHandle, _id: SessionId) {}

/// Play in this terminal until the session ends or `shutdown` resolves.
///
/// Fails without touching the terminal state further when the save is held
/// by another live process.
pub async fn play(config: &ServerConfig, save_file: &Path, debug: bool, shutdown: impl Future<Output = ()>) -> Result<()> {
    let store: Arc<dyn PersistenceAdapter> = Arc::new(LocalStore::new(save_file));
    let mut hub = Hub::new(HubConfig::local(config, debug), store);
    let (handle, events) = Hub::channel();

    let _guard = TerminalGuard;
    let id = hub.connect(Identity::Anonymous, Box::new(TtySink::new(io::stdout())), terminal_size())?;
    info!(session = %id, save = %save_file.display(), "Local session started");

    spawn_stdin_reader(handle.clone(), id);
    spawn_resize_watcher(handle.clone(), id);

    hub.run(events, shutdown).await;
    info!("Local session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_size_is_never_zero() {
        let (w, h) = terminal_size();
        assert!(w > 0 && h > 0);
    }
}
