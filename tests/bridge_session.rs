//! Integration tests driving the agent through the JSON-lines bridge.
//!
//! The test plays the gateway: it writes inbound frames into the agent's
//! stdin pipe, reads the commands the agent writes back and acknowledges them.

mod common;

use chrono::Utc;
use common::*;
use futures_util::{SinkExt, StreamExt};
use guildwarden::platform::bridge::{Bridge, spawn_writer};
use guildwarden::{Config, Dispatcher, Warden};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use warden_proto::{
    Ack, AuditEntry, AuditEvent, FrameCodec, Guild, Inbound, Outbound, ProtocolError, Ready,
    Snowflake,
};

type GatewayCodec = FrameCodec<Outbound, Inbound>;

struct Gateway {
    tx: FramedWrite<DuplexStream, GatewayCodec>,
    rx: FramedRead<DuplexStream, GatewayCodec>,
}

impl Gateway {
    async fn send(&mut self, event: Inbound) {
        self.tx.send(event).await.expect("agent stdin open");
    }

    async fn recv(&mut self) -> Outbound {
        tokio::time::timeout(Duration::from_secs(5), self.rx.next())
            .await
            .expect("agent sent nothing")
            .expect("agent stdout open")
            .expect("valid framing")
            .expect("valid command")
    }

    async fn ack(&mut self, command: &Outbound, error: Option<&str>) {
        self.send(Inbound::Ack(Ack {
            nonce: command.nonce(),
            error: error.map(str::to_owned),
        }))
        .await;
    }

    async fn ready(&mut self) {
        self.send(Inbound::Ready(Ready {
            user_id: AGENT,
            guilds: vec![Guild {
                id: GUILD,
                channels: vec![general()],
                roles: vec![mods()],
            }],
        }))
        .await;
    }
}

fn spawn_agent(config: Config) -> (Gateway, Arc<Warden>, JoinHandle<Result<(), ProtocolError>>) {
    let (bridge, outbound) = Bridge::new(&config.bridge);
    let (agent_stdout, gateway_in) = tokio::io::duplex(64 * 1024);
    let (gateway_out, agent_stdin) = tokio::io::duplex(64 * 1024);
    spawn_writer(outbound, agent_stdout);

    let warden = Arc::new(Warden::new(Arc::clone(&bridge), &config));
    let dispatcher = Dispatcher::new(Arc::clone(&warden));
    let pump = tokio::spawn(async move { bridge.pump(agent_stdin, &dispatcher).await });

    let gateway = Gateway {
        tx: FramedWrite::new(gateway_out, GatewayCodec::new()),
        rx: FramedRead::new(gateway_in, GatewayCodec::new()),
    };
    (gateway, warden, pump)
}

fn quiet_config() -> Config {
    toml::from_str(&format!(
        r#"
        [bot]
        token = "test-token"

        [policy]
        whitelist = ["{OWNER}"]
        "#
    ))
    .unwrap()
}

fn intruder_entry() -> AuditEntry {
    AuditEntry {
        id: Snowflake(9001),
        guild_id: GUILD,
        executor_id: INTRUDER,
        target_id: Some(GENERAL),
        action_type: AuditEvent::ChannelUpdate,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn unauthorized_change_is_reverted_over_the_bridge() {
    let (mut gateway, _warden, pump) = spawn_agent(quiet_config());
    gateway.ready().await;

    let mut hacked = general();
    hacked.state.name = "hacked".into();
    hacked.state.permission_overwrites.clear();
    gateway.send(Inbound::AuditLogEntryCreate(intruder_entry())).await;
    gateway.send(Inbound::ChannelUpdate(hacked)).await;

    let edit = gateway.recv().await;
    match &edit {
        Outbound::EditChannel {
            channel_id, fields, ..
        } => {
            assert_eq!(*channel_id, GENERAL);
            assert_eq!(fields.name, "general");
            assert_eq!(fields.topic.as_deref(), Some("Say hi"));
        }
        other => panic!("expected EDIT_CHANNEL, got {other:?}"),
    }
    gateway.ack(&edit, None).await;

    let overwrites = gateway.recv().await;
    match &overwrites {
        Outbound::SetOverwrites {
            channel_id,
            overwrites,
            ..
        } => {
            assert_eq!(*channel_id, GENERAL);
            assert_eq!(*overwrites, general().state.permission_overwrites);
        }
        other => panic!("expected SET_OVERWRITES, got {other:?}"),
    }
    gateway.ack(&overwrites, None).await;

    drop(gateway);
    assert!(pump.await.unwrap().is_ok());
}

#[tokio::test]
async fn rejected_write_is_reported_to_log_user() {
    let (mut gateway, _warden, _pump) = spawn_agent(config());
    gateway.ready().await;

    let mut hacked = general();
    hacked.state.name = "hacked".into();
    gateway.send(Inbound::AuditLogEntryCreate(intruder_entry())).await;
    gateway.send(Inbound::ChannelUpdate(hacked)).await;

    let warning = gateway.recv().await;
    assert!(matches!(
        &warning,
        Outbound::SendDm { user_id, content, .. }
            if *user_id == LOG_USER && content.ends_with("Reverting...")
    ));
    gateway.ack(&warning, None).await;

    let edit = gateway.recv().await;
    assert_eq!(edit.name(), "EDIT_CHANNEL");
    gateway.ack(&edit, Some("Missing Permissions")).await;

    let failure = gateway.recv().await;
    match &failure {
        Outbound::SendDm { content, .. } => assert_eq!(
            content,
            "Failed to restore channel hacked: channel edit failed: \
             rejected by platform: Missing Permissions"
        ),
        other => panic!("expected SEND_DM, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_frames_are_skipped() {
    let (mut gateway, warden, pump) = spawn_agent(quiet_config());

    gateway
        .tx
        .get_mut()
        .write_all(b"this is not json\n{\"t\":\"NO_SUCH_EVENT\",\"d\":{}}\n")
        .await
        .unwrap();
    gateway.ready().await;

    drop(gateway);
    assert!(pump.await.unwrap().is_ok());
    assert_eq!(warden.self_id(), Some(AGENT));
    assert_eq!(warden.snapshots().channel(GENERAL).unwrap().name, "general");
    assert_eq!(warden.snapshots().role(MODS).unwrap().name, "mods");
}
