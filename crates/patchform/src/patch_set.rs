//! Expansion of `PatchSet` references into concrete patches.

use crate::error::{PatchError, PatchResult};
use crate::model::{ComposedTemplate, Patch, PatchSet, PatchType};
use std::collections::HashMap;
use tracing::trace;

/// Replace every `PatchSet` patch in `templates` with the patches of the set
/// it names.
///
/// Template order, patch order and every other template field are kept.
/// Fails without returning partial output if a reference names no set, lacks
/// a `patchSetName`, or points at a set that itself contains a `PatchSet`.
pub fn composed_templates(
    patch_sets: &[PatchSet],
    templates: &[ComposedTemplate],
) -> PatchResult<Vec<ComposedTemplate>> {
    let by_name: HashMap<&str, &PatchSet> = patch_sets
        .iter()
        .map(|set| (set.name.as_str(), set))
        .collect();

    templates
        .iter()
        .map(|template| {
            let patches = expand(&by_name, &template.patches)?;
            Ok(ComposedTemplate {
                patches,
                ..template.clone()
            })
        })
        .collect()
}

fn expand(by_name: &HashMap<&str, &PatchSet>, patches: &[Patch]) -> PatchResult<Vec<Patch>> {
    let mut expanded = Vec::with_capacity(patches.len());
    for patch in patches {
        if patch.patch_type != PatchType::PatchSet {
            expanded.push(patch.clone());
            continue;
        }
        let name = patch
            .patch_set_name
            .as_deref()
            .ok_or_else(|| PatchError::required_field("PatchSetName", PatchType::PatchSet))?;
        let set = by_name
            .get(name)
            .ok_or_else(|| PatchError::UndefinedPatchSet(name.to_owned()))?;
        if set
            .patches
            .iter()
            .any(|p| p.patch_type == PatchType::PatchSet)
        {
            return Err(PatchError::NestedPatchSet(name.to_owned()));
        }
        trace!(patch_set = name, patches = set.patches.len(), "expanded patch set");
        expanded.extend(set.patches.iter().cloned());
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_patch_sets() {
        let templates = vec![ComposedTemplate::new(
            "a",
            vec![
                Patch::from_composite("metadata.name"),
                Patch::from_composite("metadata.namespace"),
            ],
        )];
        assert_eq!(composed_templates(&[], &templates).unwrap(), templates);
    }

    #[test]
    fn test_keeps_template_fields() {
        let sets = vec![PatchSet::new("s", vec![Patch::from_composite("a")])];
        let templates = vec![ComposedTemplate::new("bucket", vec![Patch::patch_set("s")])
            .with_base(json!({"kind": "Bucket"}))];

        let out = composed_templates(&sets, &templates).unwrap();
        assert_eq!(out[0].name.as_deref(), Some("bucket"));
        assert_eq!(out[0].base, json!({"kind": "Bucket"}));
        assert_eq!(out[0].patches, vec![Patch::from_composite("a")]);
    }

    #[test]
    fn test_missing_patch_set_name() {
        let templates = vec![ComposedTemplate::new(
            "a",
            vec![Patch::new(PatchType::PatchSet)],
        )];
        assert_eq!(
            composed_templates(&[], &templates).unwrap_err(),
            PatchError::required_field("PatchSetName", PatchType::PatchSet)
        );
    }

    #[test]
    fn test_nested_patch_set() {
        let sets = vec![
            PatchSet::new("outer", vec![Patch::patch_set("inner")]),
            PatchSet::new("inner", vec![Patch::from_composite("a")]),
        ];
        let templates = vec![ComposedTemplate::new("a", vec![Patch::patch_set("outer")])];
        assert_eq!(
            composed_templates(&sets, &templates).unwrap_err(),
            PatchError::NestedPatchSet("outer".into())
        );
    }
}
