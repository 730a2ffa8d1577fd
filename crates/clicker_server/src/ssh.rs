//! SSH transport.
//!
//! Each accepted connection gets an [`SshHandler`]. Public-key
//! authentication is the only method accepted; the key's SHA-256
//! fingerprint is the player's identity. A shell request starts a session
//! on the hub, and from then on channel data and window changes are
//! forwarded as hub events.
//!
//! Session output never blocks the hub: a [`ChannelSink`] queues bytes on an
//! unbounded channel and a writer task pushes them into the SSH channel.

use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clicker_core::identity::Identity;
use clicker_game::terminal::{clamp_size, Sink};
use clicker_game::SessionId;
use russh::keys::{HashAlg, PrivateKey, PublicKey};
use russh::server::{self, Auth, Handle, Msg, Server as _, Session as SshSession};
use russh::{Channel, ChannelId, CryptoVec, Pty};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::hub::HubHandle;

/// Reply to `ssh host command`.
const EXEC_REFUSAL: &str = "This server does not support direct command execution for this user.\r\n";

/// Size assumed until the client sends a pty request.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// What the writer task should do next.
#[derive(Debug, PartialEq, Eq)]
pub enum Outbound {
    /// Send bytes on the channel.
    Data(Vec<u8>),
    /// Send EOF and close the channel.
    Close,
}

/// Session sink feeding an SSH channel's writer task.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ChannelSink {
    /// Sink plus the receiving end for the writer task.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Sink for ChannelSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.tx
            .send(Outbound::Data(bytes.to_vec()))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "ssh channel closed"))
    }

    fn close(&mut self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

async fn pump(handle: Handle, channel: ChannelId, mut rx: mpsc::UnboundedReceiver<Outbound>) {
    while let Some(out) = rx.recv().await {
        match out {
            Outbound::Data(bytes) => {
                if handle.data(channel, CryptoVec::from(bytes)).await.is_err() {
                    debug!(?channel, "Channel gone, dropping output");
                    break;
                }
            }
            Outbound::Close => {
                let _ = handle.eof(channel).await;
                let _ = handle.close(channel).await;
                break;
            }
        }
    }
}

/// Identity for a key-authenticated user.
#[must_use]
pub fn identity_for(user: &str, key: &PublicKey) -> Identity {
    Identity::key(key.fingerprint(HashAlg::Sha256).to_string(), user)
}

/// Read the host key. A missing file is an error with the command that
/// creates one.
pub fn load_host_key(path: &Path) -> Result<PrivateKey> {
    if !path.exists() {
        return Err(ServerError::HostKey {
            path: path.to_path_buf(),
            reason: format!(
                "file not found; create one with: ssh-keygen -t ed25519 -f {} -N \"\"",
                path.display()
            ),
        });
    }
    russh::keys::load_secret_key(path, None).map_err(|e| ServerError::HostKey {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Creates one [`SshHandler`] per connection.
#[derive(Debug, Clone)]
pub struct SshServer {
    hub: HubHandle,
}

impl SshServer {
    /// Server forwarding to `hub`.
    #[must_use]
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }
}

impl server::Server for SshServer {
    type Handler = SshHandler;

    fn new_client(&mut self, peer: Option<SocketAddr>) -> SshHandler {
        debug!(?peer, "Connection accepted");
        SshHandler::new(self.hub.clone(), peer)
    }

    fn handle_session_error(&mut self, error: ServerError) {
        warn!(error = %error, "SSH session ended with an error");
    }
}

/// One SSH connection.
#[derive(Debug)]
pub struct SshHandler {
    hub: HubHandle,
    peer: Option<SocketAddr>,
    identity: Option<Identity>,
    size: (u16, u16),
    channel: Option<ChannelId>,
    session: Option<SessionId>,
}

impl SshHandler {
    /// Handler for a fresh connection.
    #[must_use]
    pub fn new(hub: HubHandle, peer: Option<SocketAddr>) -> Self {
        Self {
            hub,
            peer,
            identity: None,
            size: DEFAULT_SIZE,
            channel: None,
            session: None,
        }
    }

    fn is_ours(&self, channel: ChannelId) -> bool {
        self.channel == Some(channel)
    }

    fn hang_up(&mut self) {
        if let Some(id) = self.session.take() {
            self.hub.disconnect(id);
        }
    }
}

fn reject() -> Auth {
    Auth::Reject {
        proceed_with_methods: None,
    }
}

/// Client-reported size, clamped to what a surface will allocate.
fn reported_size(cols: u32, rows: u32) -> (u16, u16) {
    let narrow = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
    clamp_size(narrow(cols), narrow(rows))
}

impl server::Handler for SshHandler {
    type Error = ServerError;

    async fn auth_publickey(&mut self, user: &str, key: &PublicKey) -> std::result::Result<Auth, Self::Error> {
        let identity = identity_for(user, key);
        info!(peer = ?self.peer, identity = %identity, "Public key accepted");
        self.identity = Some(identity);
        Ok(Auth::Accept)
    }

    async fn auth_password(&mut self, user: &str, _password: &str) -> std::result::Result<Auth, Self::Error> {
        warn!(peer = ?self.peer, user, "Password login refused");
        Ok(reject())
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut SshSession,
    ) -> std::result::Result<bool, Self::Error> {
        if self.channel.is_some() {
            debug!(peer = ?self.peer, "Extra session channel refused");
            return Ok(false);
        }
        self.channel = Some(channel.id());
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut SshSession,
    ) -> std::result::Result<(), Self::Error> {
        if self.is_ours(channel) {
            self.size = reported_size(col_width, row_height);
            debug!(term, width = self.size.0, height = self.size.1, "Pty requested");
        }
        let _ = session.channel_success(channel);
        Ok(())
    }

    async fn shell_request(&mut self, channel: ChannelId, session: &mut SshSession) -> std::result::Result<(), Self::Error> {
        let Some(identity) = self.identity.clone() else {
            let _ = session.channel_failure(channel);
            return Ok(());
        };
        if !self.is_ours(channel) || self.session.is_some() {
            let _ = session.channel_failure(channel);
            return Ok(());
        }
        let _ = session.channel_success(channel);

        let (sink, rx) = ChannelSink::channel();
        tokio::spawn(pump(session.handle(), channel, rx));

        // A refused session has already been sent its notice and closed.
        match self.hub.connect(identity, Box::new(sink), self.size).await {
            Ok(id) => self.session = Some(id),
            Err(e) => info!(peer = ?self.peer, error = %e, "Session not started"),
        }
        Ok(())
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut SshSession,
    ) -> std::result::Result<(), Self::Error> {
        debug!(peer = ?self.peer, command = %String::from_utf8_lossy(data), "Exec refused");
        let _ = session.channel_success(channel);
        let _ = session.data(channel, CryptoVec::from(EXEC_REFUSAL.as_bytes()));
        let _ = session.exit_status_request(channel, 1);
        let _ = session.eof(channel);
        let _ = session.close(channel);
        Ok(())
    }

    async fn data(&mut self, channel: ChannelId, data: &[u8], _session: &mut SshSession) -> std::result::Result<(), Self::Error> {
        if !self.is_ours(channel) {
            return Ok(());
        }
        if let Some(id) = self.session {
            if self.hub.input(id, data.to_vec()).is_err() {
                self.session = None;
            }
        }
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut SshSession,
    ) -> std::result::Result<(), Self::Error> {
        if !self.is_ours(channel) {
            return Ok(());
        }
        self.size = reported_size(col_width, row_height);
        if let Some(id) = self.session {
            let _ = self.hub.resize(id, self.size.0, self.size.1);
        }
        Ok(())
    }

    async fn channel_eof(&mut self, channel: ChannelId, _session: &mut SshSession) -> std::result::Result<(), Self::Error> {
        if self.is_ours(channel) {
            self.hang_up();
        }
        Ok(())
    }

    async fn channel_close(&mut self, channel: ChannelId, _session: &mut SshSession) -> std::result::Result<(), Self::Error> {
        if self.is_ours(channel) {
            self.hang_up();
            self.channel = None;
        }
        Ok(())
    }
}

impl Drop for SshHandler {
    fn drop(&mut self) {
        self.hang_up();
    }
}

/// russh settings derived from the server config.
#[must_use]
pub fn russh_config(config: &ServerConfig, key: PrivateKey) -> server::Config {
    server::Config {
        inactivity_timeout: Some(Duration::from_secs(3600)),
        auth_rejection_time: Duration::from_secs(1),
        auth_rejection_time_initial: Some(Duration::from_secs(0)),
        keepalive_interval: config.keepalive_interval(),
        keepalive_max: config.keepalive_max,
        keys: vec![key],
        ..Default::default()
    }
}

/// Accept SSH connections until the listener fails.
pub async fn serve(config: &ServerConfig, hub: HubHandle) -> Result<()> {
    let key = load_host_key(&config.host_key_path)?;
    let ssh_config = Arc::new(russh_config(config, key));
    let addr = format!("{}:{}", config.host, config.port);
    info!(%addr, "Listening for SSH connections");

    let mut server = SshServer::new(hub);
    server
        .run_on_address(ssh_config, (config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}
