//! Pipeline files: a composite, patch sets and the resources composed from it.

use anyhow::{Context, Result};
use patchform::{apply, composed_templates, ComposedTemplate, Patch, PatchSet, PatchType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, info_span};

/// A pipeline file as read from disk.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    #[serde(default)]
    pub composite: Value,
    #[serde(default)]
    pub patch_sets: Vec<PatchSet>,
    #[serde(default)]
    pub resources: Vec<ComposedTemplate>,
    /// Observed composed documents by resource name.
    #[serde(default)]
    pub observed: BTreeMap<String, Value>,
}

/// The result of running a pipeline.
#[derive(Debug, Serialize)]
pub struct Rendered {
    pub composite: Value,
    pub resources: BTreeMap<String, Value>,
}

impl Pipeline {
    /// Read a pipeline file. `.json` files are parsed as JSON, anything else
    /// as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read pipeline file {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let pipeline = if is_json {
            serde_json::from_str(&text).context("cannot parse pipeline JSON")?
        } else {
            serde_yaml::from_str(&text).context("cannot parse pipeline YAML")?
        };
        Ok(pipeline)
    }

    /// Render every resource from the composite, then patch observed
    /// resources back into the composite.
    pub fn run(self) -> Result<Rendered> {
        let templates = composed_templates(&self.patch_sets, &self.resources)
            .context("cannot expand patch sets")?;
        let from_composite = [
            PatchType::FromCompositeFieldPath,
            PatchType::CombineFromComposite,
        ];
        let to_composite = [
            PatchType::ToCompositeFieldPath,
            PatchType::CombineToComposite,
        ];

        let mut composite = self.composite;
        let mut resources = BTreeMap::new();
        for (index, template) in templates.into_iter().enumerate() {
            let name = template
                .name
                .clone()
                .unwrap_or_else(|| format!("resource-{index}"));
            let span = info_span!("resource", resource = %name);
            let _enter = span.enter();

            let mut desired = template.base.clone();
            apply_patches(&template.patches, &mut composite, &mut desired, &from_composite)
                .with_context(|| format!("cannot render resource {name}"))?;

            if let Some(observed) = self.observed.get(&name) {
                let mut observed = observed.clone();
                apply_patches(&template.patches, &mut composite, &mut observed, &to_composite)
                    .with_context(|| format!("cannot patch composite from resource {name}"))?;
            }

            info!(patches = template.patches.len(), "rendered resource");
            resources.insert(name, desired);
        }

        Ok(Rendered {
            composite,
            resources,
        })
    }
}

fn apply_patches(
    patches: &[Patch],
    composite: &mut Value,
    composed: &mut Value,
    only: &[PatchType],
) -> Result<()> {
    for (index, patch) in patches.iter().enumerate() {
        if !only.contains(&patch.patch_type) {
            continue;
        }
        apply(patch, composite, composed, only)
            .with_context(|| format!("patch {index} ({}) failed", patch.patch_type))?;
        debug!(index, patch_type = %patch.patch_type, "applied patch");
    }
    Ok(())
}
