//! JSON-lines gateway bridge.
//!
//! The platform session (connection, authentication, event subscription) is
//! owned by a separate bridge process. The agent exchanges newline-delimited
//! JSON frames with it:
//!
//! - inbound events are routed to the [`Dispatcher`], except `ACK` frames
//!   (which complete pending commands) and `AUDIT_LOG_ENTRY_CREATE` frames
//!   (which feed the local audit buffer);
//! - outbound commands carry a nonce and wait for the matching `ACK`.
//!
//! Audit lookups are answered from the buffer. Entries may arrive after the
//! update they explain, which is exactly the lag the attribution retries
//! absorb.

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, warn};
use warden_proto::{
    Ack, AuditEntry, AuditEvent, ChannelEdit, FrameCodec, Inbound, Outbound, PermissionOverwrite,
    ProtocolError, RoleState, Snowflake,
};

use super::{AuditSource, DirectMessenger, EntityWriter, PlatformError};
use crate::config::BridgeConfig;
use crate::dispatch::Dispatcher;

type Codec = FrameCodec<Inbound, Outbound>;

pub struct Bridge {
    outbound: mpsc::Sender<Outbound>,
    pending: DashMap<u64, oneshot::Sender<Ack>>,
    next_nonce: AtomicU64,
    /// Arrival order, oldest first.
    audit: Mutex<VecDeque<AuditEntry>>,
    audit_capacity: usize,
    write_timeout: Duration,
}

impl Bridge {
    /// Create the bridge and the receiving end of its outbound command queue.
    pub fn new(config: &BridgeConfig) -> (Arc<Self>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(config.outbound_capacity);
        let bridge = Self {
            outbound: tx,
            pending: DashMap::new(),
            next_nonce: AtomicU64::new(1),
            audit: Mutex::new(VecDeque::with_capacity(config.audit_buffer)),
            audit_capacity: config.audit_buffer,
            write_timeout: config.write_timeout(),
        };
        (Arc::new(bridge), rx)
    }

    /// Hand the bot credential to the bridge.
    pub async fn identify(&self, token: &str) -> Result<(), PlatformError> {
        self.call(|nonce| Outbound::Identify {
            nonce,
            token: token.to_owned(),
        })
        .await
    }

    /// Append an audit entry, evicting the oldest beyond capacity.
    pub fn record_audit(&self, entry: AuditEntry) {
        let mut audit = self.audit.lock();
        audit.push_back(entry);
        while audit.len() > self.audit_capacity {
            audit.pop_front();
        }
    }

    /// Complete the command waiting on `ack.nonce`.
    pub fn complete(&self, ack: Ack) {
        match self.pending.remove(&ack.nonce) {
            Some((_, waiter)) => {
                // The waiter may have timed out already.
                let _ = waiter.send(ack);
            }
            None => debug!(nonce = ack.nonce, "ACK for unknown or expired command"),
        }
    }

    /// Number of commands awaiting an ACK.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    async fn call<F>(&self, build: F) -> Result<(), PlatformError>
    where
        F: FnOnce(u64) -> Outbound + Send,
    {
        let nonce = self.next_nonce.fetch_add(1, Ordering::Relaxed);
        let command = build(nonce);
        let op = command.name();

        let (tx, rx) = oneshot::channel();
        self.pending.insert(nonce, tx);

        if self.outbound.send(command).await.is_err() {
            self.pending.remove(&nonce);
            return Err(PlatformError::Closed);
        }
        crate::metrics::record_bridge_frame("out", op);

        match tokio::time::timeout(self.write_timeout, rx).await {
            Ok(Ok(Ack { error: None, .. })) => Ok(()),
            Ok(Ok(Ack {
                error: Some(reason),
                ..
            })) => Err(PlatformError::Rejected(reason)),
            Ok(Err(_)) => Err(PlatformError::Closed),
            Err(_) => {
                self.pending.remove(&nonce);
                warn!(op, nonce, timeout_ms = self.write_timeout.as_millis() as u64, "Bridge command timed out");
                Err(PlatformError::Timeout)
            }
        }
    }

    /// Read frames until EOF.
    ///
    /// Malformed frames are logged and skipped; a framing error (oversized or
    /// non-UTF-8 line) ends the stream.
    pub async fn pump<R>(&self, reader: R, dispatcher: &Dispatcher) -> Result<(), ProtocolError>
    where
        R: AsyncRead + Unpin,
    {
        let mut frames = FramedRead::new(reader, Codec::new());
        while let Some(item) = frames.next().await {
            let frame = match item? {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Discarding malformed bridge frame");
                    continue;
                }
            };
            crate::metrics::record_bridge_frame("in", frame.name());

            match frame {
                Inbound::Ack(ack) => self.complete(ack),
                Inbound::AuditLogEntryCreate(entry) => self.record_audit(entry),
                other => {
                    dispatcher.dispatch(other);
                }
            }
        }
        Ok(())
    }
}

/// Drain the outbound queue into `writer`, one frame per line.
pub fn spawn_writer<W>(mut rx: mpsc::Receiver<Outbound>, writer: W) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut sink = FramedWrite::new(writer, Codec::new());
        while let Some(command) = rx.recv().await {
            let op = command.name();
            if let Err(e) = sink.send(command).await {
                error!(op, error = %e, "Failed to write bridge frame; stopping writer");
                break;
            }
        }
        debug!("Bridge writer finished");
    })
}

#[async_trait]
impl AuditSource for Bridge {
    async fn fetch_audit_log(
        &self,
        guild: Snowflake,
        event: AuditEvent,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, PlatformError> {
        let mut entries: Vec<AuditEntry> = self
            .audit
            .lock()
            .iter()
            .filter(|e| e.guild_id == guild && e.action_type == event)
            .cloned()
            .collect();
        // Delivery order is not creation order.
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[async_trait]
impl EntityWriter for Bridge {
    async fn edit_channel(
        &self,
        channel: Snowflake,
        fields: &ChannelEdit,
    ) -> Result<(), PlatformError> {
        self.call(|nonce| Outbound::EditChannel {
            nonce,
            channel_id: channel,
            fields: fields.clone(),
        })
        .await
    }

    async fn replace_overwrites(
        &self,
        channel: Snowflake,
        overwrites: &[PermissionOverwrite],
    ) -> Result<(), PlatformError> {
        self.call(|nonce| Outbound::SetOverwrites {
            nonce,
            channel_id: channel,
            overwrites: overwrites.to_vec(),
        })
        .await
    }

    async fn edit_role(&self, role: Snowflake, fields: &RoleState) -> Result<(), PlatformError> {
        self.call(|nonce| Outbound::EditRole {
            nonce,
            role_id: role,
            fields: fields.clone(),
        })
        .await
    }
}

#[async_trait]
impl DirectMessenger for Bridge {
    async fn send_direct_message(&self, user: Snowflake, text: &str) -> Result<(), PlatformError> {
        self.call(|nonce| Outbound::SendDm {
            nonce,
            user_id: user,
            content: text.to_owned(),
        })
        .await
    }
}
