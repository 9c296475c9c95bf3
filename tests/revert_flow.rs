//! Integration tests for unauthorized changes and their reversion.

mod common;

use common::*;
use guildwarden::Outcome;
use guildwarden::error::{PlatformError, RevertError};
use guildwarden::platform::memory::Write;
use guildwarden::reconcile::SuppressReason;
use std::time::Duration;
use tokio::time::Instant;
use warden_proto::{EntityKind, Inbound, Permissions, Snapshot};

#[tokio::test(start_paused = true)]
async fn intruder_rename_is_reverted() {
    let h = Harness::new();
    let event = h.change_channel(INTRUDER, rename("hacked"));

    let outcome = h.update(event).await;

    assert_eq!(outcome, Outcome::Reverted { actor: INTRUDER });
    assert_eq!(h.platform.channel(GENERAL).unwrap().state.name, "general");
    assert_eq!(h.warden().snapshots().channel(GENERAL).unwrap().name, "general");

    let reports = h.reports();
    assert_eq!(
        reports,
        vec![
            format!("Non-whitelisted user {INTRUDER} updated channel hacked. Reverting..."),
            "Restored channel: general".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn revert_restores_every_snapshotted_field() {
    let h = Harness::new();
    let before = h.warden().snapshots().get(EntityKind::Channel, GENERAL).unwrap();

    let event = h.change_channel(INTRUDER, |state| {
        state.name = "free-for-all".into();
        state.topic = None;
        state.nsfw = true;
        state.position = 9;
        state.permission_overwrites.clear();
    });
    h.update(event).await;

    let after = Snapshot::Channel(h.platform.channel(GENERAL).unwrap().state);
    assert_eq!(after, before);

    let writes = h.platform.writes();
    assert_eq!(writes.len(), 2);
    assert!(matches!(writes[0], Write::EditChannel(id, _) if id == GENERAL));
    assert_eq!(
        writes[1],
        Write::ReplaceOverwrites(GENERAL, general().state.permission_overwrites)
    );
}

#[tokio::test(start_paused = true)]
async fn role_revert_is_a_single_write() {
    let h = Harness::new();
    let event = h.change_role(INTRUDER, |state| {
        state.permissions = Permissions::ADMINISTRATOR;
    });

    assert_eq!(h.update(event).await, Outcome::Reverted { actor: INTRUDER });
    assert_eq!(h.platform.writes(), vec![Write::EditRole(MODS, mods().state)]);
    assert_eq!(h.platform.role(MODS).unwrap().state, mods().state);
}

#[tokio::test(start_paused = true)]
async fn own_corrective_writes_are_not_judged_again() {
    let mut h = Harness::new();
    let event = h.change_channel(INTRUDER, rename("hacked"));

    let task = h.dispatcher.dispatch(event).unwrap();
    // Writes land immediately; the cool-down keeps the restore gate raised.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let echoes = h.take_echoes();
    assert_eq!(echoes.len(), 2);
    for echo in echoes {
        assert_eq!(
            h.update(echo).await,
            Outcome::Suppressed(SuppressReason::Restoring)
        );
    }

    assert_eq!(task.await.unwrap(), Outcome::Reverted { actor: INTRUDER });
    assert_eq!(h.platform.writes().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn restore_gate_held_for_cool_down_then_released() {
    let h = Harness::new();
    let event = h.change_role(INTRUDER, |state| state.name = "owners".into());

    let start = Instant::now();
    h.update(event).await;

    assert_eq!(start.elapsed(), Duration::from_millis(1000));
    assert!(!h.warden().restore_gate().is_restoring(EntityKind::Role));
}

#[tokio::test(start_paused = true)]
async fn failed_write_keeps_baseline_and_releases_gate() {
    let h = Harness::new();
    h.platform.fail_writes(Some("Missing Permissions"));
    let event = h.change_channel(INTRUDER, rename("hacked"));

    let outcome = h.update(event).await;

    assert_eq!(
        outcome,
        Outcome::RevertFailed {
            actor: INTRUDER,
            error: RevertError::Edit {
                kind: EntityKind::Channel,
                source: PlatformError::Rejected("Missing Permissions".into()),
            },
        }
    );
    assert!(!h.warden().restore_gate().is_restoring(EntityKind::Channel));
    assert_eq!(h.platform.channel(GENERAL).unwrap().state.name, "hacked");
    assert_eq!(h.warden().snapshots().channel(GENERAL).unwrap().name, "general");

    let last = h.reports().pop().unwrap();
    assert!(last.starts_with("Failed to restore channel hacked:"), "{last}");
}

#[tokio::test(start_paused = true)]
async fn failed_overwrite_replacement_is_reported() {
    let h = Harness::new();
    h.platform.fail_overwrites(Some("Missing Access"));
    let event = h.change_channel(INTRUDER, |state| {
        state.name = "hacked".into();
        state.permission_overwrites.clear();
    });

    let outcome = h.update(event).await;

    assert!(matches!(
        outcome,
        Outcome::RevertFailed {
            error: RevertError::Overwrites(_),
            ..
        }
    ));
    // Metadata was restored before the second write failed.
    let live = h.platform.channel(GENERAL).unwrap().state;
    assert_eq!(live.name, "general");
    assert!(live.permission_overwrites.is_empty());
    assert!(!h.warden().restore_gate().is_restoring(EntityKind::Channel));
}

#[tokio::test(start_paused = true)]
async fn missing_baseline_adopts_current_state() {
    let h = Harness::new();
    h.warden().snapshots().delete(EntityKind::Channel, GENERAL);
    let event = h.change_channel(INTRUDER, rename("hacked"));

    assert_eq!(h.update(event).await, Outcome::NoBaseline { actor: INTRUDER });
    assert!(h.platform.writes().is_empty());
    assert_eq!(h.warden().snapshots().channel(GENERAL).unwrap().name, "hacked");
    assert_eq!(
        h.reports().last().unwrap(),
        "No previous state found for channel: hacked"
    );
}

#[tokio::test(start_paused = true)]
async fn notification_failures_do_not_change_outcome() {
    let h = Harness::new();
    h.platform.fail_messages(true);
    let event = h.change_channel(INTRUDER, rename("hacked"));

    assert_eq!(h.update(event).await, Outcome::Reverted { actor: INTRUDER });
    assert_eq!(h.platform.channel(GENERAL).unwrap().state.name, "general");
    assert!(h.reports().is_empty());
}

#[tokio::test(start_paused = true)]
async fn created_entities_are_protected_immediately() {
    let h = Harness::new();
    let mut news = general();
    news.id = warden_proto::Snowflake(101);
    news.state.name = "news".into();
    h.platform.insert_channel(news.clone());
    h.dispatcher.dispatch(Inbound::ChannelCreate(news.clone()));

    let mut changed = news;
    changed.state.name = "spam".into();
    let event = h.platform.apply_channel_change(INTRUDER, changed);

    assert_eq!(h.update(event).await, Outcome::Reverted { actor: INTRUDER });
    assert_eq!(
        h.platform.channel(warden_proto::Snowflake(101)).unwrap().state.name,
        "news"
    );
}

#[tokio::test(start_paused = true)]
async fn delete_during_attribution_is_not_undone() {
    let h = Harness::new();
    let mut channel = h.platform.channel(GENERAL).unwrap();
    channel.state.name = "hacked".into();
    let task = h.dispatcher.dispatch(Inbound::ChannelUpdate(channel)).unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    h.dispatcher.dispatch(Inbound::ChannelDelete(general()));

    assert_eq!(task.await.unwrap(), Outcome::Deleted);
    assert!(h.warden().snapshots().channel(GENERAL).is_none());
    assert!(h.warden().locks().is_empty());
    assert_eq!(
        h.reports().last().unwrap(),
        "Dropped channel update for: hacked (entity deleted)"
    );
}

#[tokio::test(start_paused = true)]
async fn deleted_entity_is_never_reverted() {
    let h = Harness::new();
    h.platform.fail_next_fetches(1);
    let event = h.change_channel(INTRUDER, rename("hacked"));
    let task = h.dispatcher.dispatch(event).unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    h.dispatcher.dispatch(Inbound::ChannelDelete(general()));

    assert_eq!(task.await.unwrap(), Outcome::Deleted);
    assert!(h.platform.writes().is_empty());
    assert!(h.warden().snapshots().channel(GENERAL).is_none());
    assert!(!h.warden().restore_gate().is_restoring(EntityKind::Channel));
}

#[tokio::test(start_paused = true)]
async fn update_after_delete_is_dropped_without_attribution() {
    let h = Harness::new();
    let event = h.change_channel(INTRUDER, rename("hacked"));
    h.dispatcher.dispatch(Inbound::ChannelDelete(general()));

    assert_eq!(h.update(event).await, Outcome::Deleted);
    assert_eq!(h.platform.audit_fetches(), 0);
    assert!(h.warden().snapshots().channel(GENERAL).is_none());
}
