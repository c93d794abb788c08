//! Patch validation and application.
//!
//! A [`Patch`] is validated into a [`PatchOp`], which carries only the parts
//! its type needs, with every field path parsed and the policy resolved.
//! Applying an op reads from one document and writes to the other:
//!
//! | type                     | reads from | writes to |
//! |--------------------------|------------|-----------|
//! | `FromCompositeFieldPath` | composite  | composed  |
//! | `ToCompositeFieldPath`   | composed   | composite |
//! | `CombineFromComposite`   | composite  | composed  |
//! | `CombineToComposite`     | composed   | composite |

use crate::combine::{combine, CombineStrategyConfig};
use crate::error::{PatchError, PatchResult};
use crate::model::{Patch, PatchType};
use crate::policy::FromFieldPathPolicy;
use crate::transform::{resolve_transforms, Transform};
use crate::value::Value;
use patchform_paved::{MergeOptions, Paved, Path};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

/// Which way a patch moves data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Composite to composed.
    FromComposite,
    /// Composed to composite.
    ToComposite,
}

/// A validated patch.
#[derive(Clone, Debug, PartialEq)]
pub enum PatchOp<'a> {
    FromComposite(FieldPathPatch<'a>),
    ToComposite(FieldPathPatch<'a>),
    CombineFromComposite(CombinePatch<'a>),
    CombineToComposite(CombinePatch<'a>),
}

/// A single-source patch.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPathPatch<'a> {
    pub from: Path,
    pub to: Path,
    pub policy: FromFieldPathPolicy,
    pub merge: Option<&'a MergeOptions>,
    pub transforms: &'a [Transform],
}

/// A multi-source patch.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinePatch<'a> {
    pub variables: Vec<Path>,
    pub strategy: CombineStrategyConfig<'a>,
    pub to: Path,
    pub policy: FromFieldPathPolicy,
    pub merge: Option<&'a MergeOptions>,
    pub transforms: &'a [Transform],
}

impl PatchOp<'_> {
    pub fn direction(&self) -> Direction {
        match self {
            PatchOp::FromComposite(_) | PatchOp::CombineFromComposite(_) => {
                Direction::FromComposite
            }
            PatchOp::ToComposite(_) | PatchOp::CombineToComposite(_) => Direction::ToComposite,
        }
    }
}

impl Patch {
    /// Check that the fields this patch's type requires are present and
    /// well-formed.
    ///
    /// # Errors
    ///
    /// - [`PatchError::RequiredFieldMissing`] if `fromFieldPath`, `combine`
    ///   or `toFieldPath` is absent where the type requires it.
    /// - [`PatchError::CombineRequiresVariables`] for a combine without
    ///   variables.
    /// - [`PatchError::CombineConfigMissing`] for a combine strategy without
    ///   its configuration.
    /// - [`PatchError::InvalidPatchType`] for `PatchSet` and unknown types.
    /// - [`PatchError::FieldPath`] for malformed field paths.
    pub fn validate(&self) -> PatchResult<PatchOp<'_>> {
        match &self.patch_type {
            PatchType::FromCompositeFieldPath => {
                self.validate_field_path().map(PatchOp::FromComposite)
            }
            PatchType::ToCompositeFieldPath => self.validate_field_path().map(PatchOp::ToComposite),
            PatchType::CombineFromComposite => {
                self.validate_combine().map(PatchOp::CombineFromComposite)
            }
            PatchType::CombineToComposite => {
                self.validate_combine().map(PatchOp::CombineToComposite)
            }
            other @ (PatchType::PatchSet | PatchType::Unrecognized(_)) => {
                Err(PatchError::InvalidPatchType(other.to_string()))
            }
        }
    }

    fn validate_field_path(&self) -> PatchResult<FieldPathPatch<'_>> {
        let from = self
            .from_field_path
            .as_deref()
            .ok_or_else(|| PatchError::required_field("FromFieldPath", self.patch_type.clone()))?;
        let to = self.to_field_path.as_deref().unwrap_or(from);
        Ok(FieldPathPatch {
            from: Path::parse(from)?,
            to: Path::parse(to)?,
            policy: FromFieldPathPolicy::resolve(self.policy.as_ref()),
            merge: self.merge_options(),
            transforms: &self.transforms,
        })
    }

    fn validate_combine(&self) -> PatchResult<CombinePatch<'_>> {
        let combine = self
            .combine
            .as_ref()
            .ok_or_else(|| PatchError::required_field("Combine", self.patch_type.clone()))?;
        if combine.variables.is_empty() {
            return Err(PatchError::CombineRequiresVariables);
        }
        let strategy = combine.strategy_config()?;
        let to = self
            .to_field_path
            .as_deref()
            .ok_or_else(|| PatchError::required_field("ToFieldPath", self.patch_type.clone()))?;
        let variables = combine
            .variables
            .iter()
            .map(|v| Path::parse(&v.from_field_path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CombinePatch {
            variables,
            strategy,
            to: Path::parse(to)?,
            policy: FromFieldPathPolicy::resolve(self.policy.as_ref()),
            merge: self.merge_options(),
            transforms: &self.transforms,
        })
    }

    fn merge_options(&self) -> Option<&MergeOptions> {
        self.policy.as_ref().and_then(|p| p.merge_options.as_ref())
    }
}

/// Apply `patch` between `composite` and `composed`.
///
/// If `only` is non-empty and does not contain the patch's type, nothing
/// happens. A missing source field is a no-op unless the patch's policy
/// makes it required. On error the written document is left unchanged.
pub fn apply(
    patch: &Patch,
    composite: &mut JsonValue,
    composed: &mut JsonValue,
    only: &[PatchType],
) -> PatchResult<()> {
    if !only.is_empty() && !only.contains(&patch.patch_type) {
        trace!(patch_type = %patch.patch_type, "patch filtered out");
        return Ok(());
    }

    let op = patch.validate()?;
    let (from, to) = match op.direction() {
        Direction::FromComposite => (&*composite, composed),
        Direction::ToComposite => (&*composed, composite),
    };
    match &op {
        PatchOp::FromComposite(p) | PatchOp::ToComposite(p) => apply_field_path(p, from, to),
        PatchOp::CombineFromComposite(p) | PatchOp::CombineToComposite(p) => {
            apply_combine(p, from, to)
        }
    }
}

/// Apply `patches` in order, stopping at the first failure.
///
/// The error names the index of the failing patch.
pub fn apply_all(
    patches: &[Patch],
    composite: &mut JsonValue,
    composed: &mut JsonValue,
    only: &[PatchType],
) -> PatchResult<()> {
    for (index, patch) in patches.iter().enumerate() {
        apply(patch, composite, composed, only).map_err(|err| PatchError::at_index(index, err))?;
    }
    Ok(())
}

fn apply_field_path(
    patch: &FieldPathPatch<'_>,
    from: &JsonValue,
    to: &mut JsonValue,
) -> PatchResult<()> {
    let Some(input) = read_source(from, &patch.from, patch.policy)? else {
        return Ok(());
    };
    let output = resolve_transforms(patch.transforms, input)?;
    write(to, &patch.to, output.into(), patch.merge)
}

fn apply_combine(patch: &CombinePatch<'_>, from: &JsonValue, to: &mut JsonValue) -> PatchResult<()> {
    let mut values = Vec::with_capacity(patch.variables.len());
    for path in &patch.variables {
        match read_source(from, path, patch.policy)? {
            Some(value) => values.push(value),
            None => return Ok(()),
        }
    }
    let combined = combine(&patch.strategy, &values)?;
    let output = resolve_transforms(patch.transforms, combined)?;
    write(to, &patch.to, output.into(), patch.merge)
}

/// Read a source value. `None` means the field is missing and the policy
/// makes that a no-op.
fn read_source(
    doc: &JsonValue,
    path: &Path,
    policy: FromFieldPathPolicy,
) -> PatchResult<Option<Value>> {
    match doc.get_value(path) {
        Ok(value) => Ok(Some(Value::from(value.clone()))),
        Err(err) => {
            let err = PatchError::from(err);
            if policy.skips(&err) {
                debug!(path = %path, "optional source field not found, skipping patch");
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

/// Write `value` at `path`, expanding wildcards against `doc` first.
///
/// Wildcard writes go to a copy that replaces `doc` once every write has
/// succeeded.
fn write(
    doc: &mut JsonValue,
    path: &Path,
    value: JsonValue,
    merge: Option<&MergeOptions>,
) -> PatchResult<()> {
    if !path.has_wildcards() {
        return write_one(doc, path, value, merge);
    }

    let paths = doc
        .expand_wildcards(path)
        .map_err(|err| PatchError::array_expansion(path, Some(err)))?;
    if paths.is_empty() {
        return Err(PatchError::array_expansion(path, None));
    }
    trace!(path = %path, expanded = paths.len(), "expanded wildcard destination");

    let mut staged = doc.clone();
    for concrete in &paths {
        write_one(&mut staged, concrete, value.clone(), merge)?;
    }
    *doc = staged;
    Ok(())
}

fn write_one(
    doc: &mut JsonValue,
    path: &Path,
    value: JsonValue,
    merge: Option<&MergeOptions>,
) -> PatchResult<()> {
    match merge {
        Some(options) => doc.merge_value(path, value, options)?,
        None => doc.set_value(path, value)?,
    }
    Ok(())
}
