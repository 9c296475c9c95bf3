//! Corrective writes.

use warden_proto::{ChannelEdit, Entity, EntityKind, Snapshot};

use crate::error::RevertError;
use crate::platform::EntityWriter;

/// Write `snapshot` back over `entity`.
///
/// Channels take two writes: metadata first, then a full replacement of the
/// permission overwrites. A failure in the second leaves the metadata
/// restored. Roles take a single write.
pub(super) async fn restore(
    writer: &dyn EntityWriter,
    entity: &Entity,
    snapshot: &Snapshot,
) -> Result<(), RevertError> {
    match (entity, snapshot) {
        (Entity::Channel(channel), Snapshot::Channel(state)) => {
            writer
                .edit_channel(channel.id, &ChannelEdit::from(state))
                .await
                .map_err(|source| RevertError::Edit {
                    kind: EntityKind::Channel,
                    source,
                })?;
            writer
                .replace_overwrites(channel.id, &state.permission_overwrites)
                .await
                .map_err(RevertError::Overwrites)
        }
        (Entity::Role(role), Snapshot::Role(state)) => writer
            .edit_role(role.id, state)
            .await
            .map_err(|source| RevertError::Edit {
                kind: EntityKind::Role,
                source,
            }),
        (entity, snapshot) => Err(RevertError::KindMismatch {
            snapshot: snapshot.kind(),
            entity: entity.kind(),
        }),
    }
}
