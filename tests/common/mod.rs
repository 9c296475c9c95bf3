//! Integration test common infrastructure.
//!
//! A [`Harness`] wires a [`Warden`] to an in-memory platform holding one guild
//! with a `#general` channel and a `mods` role, and dispatches READY so both
//! are seeded. Tests run on a paused clock; attribution retries and cool-downs
//! advance it automatically.

#![allow(dead_code)]

use guildwarden::platform::memory::MemoryPlatform;
use guildwarden::{Config, Dispatcher, Outcome, Warden};
use std::sync::Arc;
use tokio::sync::mpsc;
use warden_proto::{
    Channel, ChannelState, Inbound, OverwriteKind, PermissionOverwrite, Permissions, Role,
    RoleState, Snowflake,
};

pub const GUILD: Snowflake = Snowflake(1);
pub const AGENT: Snowflake = Snowflake(99);
/// Whitelisted.
pub const OWNER: Snowflake = Snowflake(10);
/// Not whitelisted.
pub const INTRUDER: Snowflake = Snowflake(20);
pub const LOG_USER: Snowflake = Snowflake(500);

pub const GENERAL: Snowflake = Snowflake(100);
pub const MODS: Snowflake = Snowflake(200);

/// Config with the test whitelist and short but distinct timings.
///
/// `extra_policy` is appended to the `[policy]` table.
pub fn config_with(extra_policy: &str) -> Config {
    let text = format!(
        r#"
        [bot]
        token = "test-token"
        log_user_id = "{LOG_USER}"

        [policy]
        whitelist = ["{OWNER}"]
        {extra_policy}

        [timing]
        rate_limit_delay_ms = 1000
        debounce_time_ms = 2000
        retry_attempts = 3
        retry_delay_ms = 1000
        "#
    );
    toml::from_str(&text).expect("test config parses")
}

pub fn config() -> Config {
    config_with("")
}

pub fn general() -> Channel {
    Channel {
        id: GENERAL,
        guild_id: GUILD,
        state: ChannelState {
            name: "general".into(),
            permission_overwrites: vec![PermissionOverwrite {
                id: GUILD,
                kind: OverwriteKind::Role,
                allow: Permissions::VIEW_CHANNEL,
                deny: Permissions::SEND_MESSAGES,
            }],
            position: 0,
            parent_id: None,
            topic: Some("Say hi".into()),
            bitrate: None,
            user_limit: None,
            nsfw: false,
        },
    }
}

pub fn mods() -> Role {
    Role {
        id: MODS,
        guild_id: GUILD,
        state: RoleState {
            name: "mods".into(),
            permissions: Permissions::MANAGE_CHANNELS | Permissions::SEND_MESSAGES,
            color: 0x3498db,
            hoist: true,
            mentionable: true,
            position: 5,
        },
    }
}

pub struct Harness {
    pub platform: Arc<MemoryPlatform>,
    pub dispatcher: Dispatcher,
    echo: mpsc::UnboundedReceiver<Inbound>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: Config) -> Self {
        let platform = Arc::new(MemoryPlatform::new(GUILD, AGENT));
        platform.insert_channel(general());
        platform.insert_role(mods());
        let (tx, echo) = mpsc::unbounded_channel();
        platform.attach_echo(tx);

        let warden = Arc::new(Warden::new(Arc::clone(&platform), &config));
        let dispatcher = Dispatcher::new(warden);
        dispatcher.dispatch(Inbound::Ready(platform.ready()));

        Self {
            platform,
            dispatcher,
            echo,
        }
    }

    pub fn warden(&self) -> &Warden {
        self.dispatcher.warden()
    }

    /// Dispatch an update event and wait for its reconciliation.
    pub async fn update(&self, event: Inbound) -> Outcome {
        self.dispatcher
            .dispatch(event)
            .expect("update events spawn a reconciliation")
            .await
            .expect("reconciliation task panicked")
    }

    /// `actor` changes `#general` on the platform; returns the resulting event.
    pub fn change_channel(&self, actor: Snowflake, edit: impl FnOnce(&mut ChannelState)) -> Inbound {
        let mut channel = self.platform.channel(GENERAL).expect("general exists");
        edit(&mut channel.state);
        self.platform.apply_channel_change(actor, channel)
    }

    /// `actor` changes the `mods` role on the platform; returns the resulting event.
    pub fn change_role(&self, actor: Snowflake, edit: impl FnOnce(&mut RoleState)) -> Inbound {
        let mut role = self.platform.role(MODS).expect("mods exists");
        edit(&mut role.state);
        self.platform.apply_role_change(actor, role)
    }

    /// Update events the platform emitted for the agent's own writes.
    pub fn take_echoes(&mut self) -> Vec<Inbound> {
        let mut events = Vec::new();
        while let Ok(event) = self.echo.try_recv() {
            events.push(event);
        }
        events
    }

    /// Texts delivered to the log user.
    pub fn reports(&self) -> Vec<String> {
        self.platform
            .messages()
            .into_iter()
            .filter(|(user, _)| *user == LOG_USER)
            .map(|(_, text)| text)
            .collect()
    }
}

pub fn rename(name: &'static str) -> impl FnOnce(&mut ChannelState) {
    move |state| state.name = name.into()
}
