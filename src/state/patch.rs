//! Collection Patches
//!
//! The create/update/delete/replace protocol applied to the `presets` and
//! `dl_fields` collections. String-addressed requests decode into a typed
//! `FeaturePatch`; combinations the protocol does not define decode to `None`
//! and are dropped without error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::constants::{DL_FIELDS_FIELD, PRESETS_FIELD};
use crate::domain::{ConfigState, DlField, DlFieldId, Preset};
use crate::error::{Error, Result};

/// Collections that accept patches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Presets,
    DlFields,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Presets => "presets",
            Feature::DlFields => "dl_fields",
        }
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "presets" => Ok(Feature::Presets),
            "dl_fields" => Ok(Feature::DlFields),
            other => Err(Error::Invalid {
                message: format!("unknown feature: {other}"),
            }),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed mutation vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchAction {
    Create,
    Update,
    Delete,
    Replace,
}

impl PatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchAction::Create => "create",
            PatchAction::Update => "update",
            PatchAction::Delete => "delete",
            PatchAction::Replace => "replace",
        }
    }
}

impl FromStr for PatchAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(PatchAction::Create),
            "update" => Ok(PatchAction::Update),
            "delete" => Ok(PatchAction::Delete),
            "replace" => Ok(PatchAction::Replace),
            other => Err(Error::Invalid {
                message: format!("unknown patch action: {other}"),
            }),
        }
    }
}

impl fmt::Display for PatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patches accepted by the presets collection
#[derive(Debug, Clone, PartialEq)]
pub enum PresetPatch {
    Replace(Vec<Preset>),
}

/// Patches accepted by the dl_fields collection
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPatch {
    /// Append a field; ids are not de-duplicated
    Create(DlField),
    /// Shallow-merge onto the first field with the same id
    Update(DlField),
    /// Remove the first field with this id
    Delete(DlFieldId),
    Replace(Vec<DlField>),
}

/// A typed patch against one collection
#[derive(Debug, Clone, PartialEq)]
pub enum FeaturePatch {
    Presets(PresetPatch),
    DlFields(FieldPatch),
}

/// Result of applying a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The collection was changed
    Applied,
    /// Update or delete found no field with the requested id
    NotFound,
    /// The feature/action pair is not part of the protocol
    Ignored,
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Delete payloads only need the id
#[derive(Deserialize)]
struct FieldRef {
    id: DlFieldId,
}

impl FeaturePatch {
    /// Decode a string-addressed patch request
    ///
    /// Returns `Ok(None)` for unknown features, unknown actions and any
    /// non-replace action on presets. A payload that does not fit a known
    /// request is an error.
    pub fn decode(feature: &str, action: &str, payload: Value) -> Result<Option<Self>> {
        let (Ok(feature), Ok(action)) = (feature.parse::<Feature>(), action.parse::<PatchAction>())
        else {
            return Ok(None);
        };

        let patch = match (feature, action) {
            (Feature::Presets, PatchAction::Replace) => {
                FeaturePatch::Presets(PresetPatch::Replace(serde_json::from_value(payload)?))
            }
            (Feature::Presets, _) => return Ok(None),
            (Feature::DlFields, PatchAction::Create) => {
                FeaturePatch::DlFields(FieldPatch::Create(serde_json::from_value(payload)?))
            }
            (Feature::DlFields, PatchAction::Update) => {
                FeaturePatch::DlFields(FieldPatch::Update(serde_json::from_value(payload)?))
            }
            (Feature::DlFields, PatchAction::Delete) => {
                let target: FieldRef = serde_json::from_value(payload)?;
                FeaturePatch::DlFields(FieldPatch::Delete(target.id))
            }
            (Feature::DlFields, PatchAction::Replace) => {
                FeaturePatch::DlFields(FieldPatch::Replace(serde_json::from_value(payload)?))
            }
        };

        Ok(Some(patch))
    }

    pub fn feature(&self) -> Feature {
        match self {
            FeaturePatch::Presets(_) => Feature::Presets,
            FeaturePatch::DlFields(_) => Feature::DlFields,
        }
    }

    pub fn action(&self) -> PatchAction {
        match self {
            FeaturePatch::Presets(PresetPatch::Replace(_)) => PatchAction::Replace,
            FeaturePatch::DlFields(FieldPatch::Create(_)) => PatchAction::Create,
            FeaturePatch::DlFields(FieldPatch::Update(_)) => PatchAction::Update,
            FeaturePatch::DlFields(FieldPatch::Delete(_)) => PatchAction::Delete,
            FeaturePatch::DlFields(FieldPatch::Replace(_)) => PatchAction::Replace,
        }
    }
}

/// Apply a typed patch to the state in place
pub fn apply(state: &mut ConfigState, patch: FeaturePatch) -> PatchOutcome {
    match patch {
        FeaturePatch::Presets(PresetPatch::Replace(presets)) => {
            let replacement = to_entries(&presets);
            state.update_collection(PRESETS_FIELD, |items| *items = replacement);
            PatchOutcome::Applied
        }
        FeaturePatch::DlFields(patch) => {
            state.update_collection(DL_FIELDS_FIELD, |items| apply_field_patch(items, patch))
        }
    }
}

fn to_entries<T: Serialize>(records: &[T]) -> Vec<Value> {
    records
        .iter()
        .filter_map(|record| serde_json::to_value(record).ok())
        .collect()
}

fn has_id(entry: &Value, id: &DlFieldId) -> bool {
    entry
        .get("id")
        .and_then(|raw| DlFieldId::deserialize(raw).ok())
        .is_some_and(|found| &found == id)
}

fn apply_field_patch(fields: &mut Vec<Value>, patch: FieldPatch) -> PatchOutcome {
    match patch {
        FieldPatch::Create(field) => {
            fields.extend(to_entries(&[field]));
            PatchOutcome::Applied
        }
        FieldPatch::Update(DlField { id, attributes }) => match fields.iter_mut().find(|f| has_id(f, &id)) {
            Some(Value::Object(entry)) => {
                entry.extend(attributes);
                PatchOutcome::Applied
            }
            _ => PatchOutcome::NotFound,
        },
        FieldPatch::Delete(id) => match fields.iter().position(|f| has_id(f, &id)) {
            Some(index) => {
                fields.remove(index);
                PatchOutcome::Applied
            }
            None => PatchOutcome::NotFound,
        },
        FieldPatch::Replace(replacement) => {
            *fields = to_entries(&replacement);
            PatchOutcome::Applied
        }
    }
}
