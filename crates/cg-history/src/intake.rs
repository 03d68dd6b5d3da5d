use cg_core::{Component, ComponentKind, EntityId};
use serde::{Deserialize, Serialize};

use crate::batch::Batch;
use crate::command::BoxedCommand;
use crate::error::{HistoryError, HistoryResult};
use crate::set::SetComponent;

/// A request to write one component, as sent by the UI or a plugin.
///
/// ```json
/// { "entityId": "…", "componentType": "Transform", "newValue": { … } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRequest {
    /// Target entity.
    pub entity_id: EntityId,
    /// Kind of `new_value`.
    pub component_type: ComponentKind,
    /// The full replacement value. Decoded against `component_type`.
    pub new_value: serde_json::Value,
}

impl SetRequest {
    /// Build a request from a typed value.
    pub fn new(entity_id: EntityId, component: &Component) -> HistoryResult<Self> {
        Ok(Self {
            entity_id,
            component_type: component.kind(),
            new_value: component.to_json()?,
        })
    }

    /// Decode `new_value` into a [`SetComponent`].
    pub fn into_command(self) -> HistoryResult<SetComponent> {
        let component = Component::from_json(self.component_type, self.new_value).map_err(
            |source| HistoryError::InvalidRequest {
                component_type: self.component_type,
                source,
            },
        )?;
        Ok(SetComponent::new(self.entity_id, component))
    }
}

/// One request or an ordered group of requests applied as a single
/// history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Intake {
    /// A single write.
    Single(SetRequest),
    /// Several writes, undone together.
    Batch(Vec<SetRequest>),
}

impl Intake {
    /// Parse a request body.
    pub fn from_json(body: &str) -> HistoryResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Decode every value. Fails as a whole if any request is invalid.
    pub fn into_command(self) -> HistoryResult<BoxedCommand> {
        match self {
            Self::Single(request) => Ok(Box::new(request.into_command()?)),
            Self::Batch(requests) => {
                if requests.is_empty() {
                    return Err(HistoryError::EmptyBatch);
                }
                let commands = requests
                    .into_iter()
                    .map(|request| Ok(Box::new(request.into_command()?) as BoxedCommand))
                    .collect::<HistoryResult<Vec<_>>>()?;
                Ok(Box::new(Batch::new(commands)))
            }
        }
    }
}
