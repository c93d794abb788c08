//! Integration tests for patch set expansion.

use patchform::{
    composed_templates, ComposedTemplate, MapTransform, Patch, PatchError, PatchSet, Transform,
};
use serde_json::json;

fn unnamed(patches: Vec<Patch>) -> ComposedTemplate {
    ComposedTemplate {
        name: None,
        base: json!({}),
        patches,
    }
}

#[test]
fn test_no_composition_patch_sets() {
    let templates = vec![unnamed(vec![
        Patch::from_composite("metadata.name"),
        Patch::from_composite("metadata.namespace"),
    ])];
    let out = composed_templates(&[], &templates).unwrap();
    assert_eq!(out, templates);
}

#[test]
fn test_undefined_patch_set() {
    let templates = vec![unnamed(vec![Patch::patch_set("patch-set-1")])];
    let err = composed_templates(&[], &templates).unwrap_err();
    assert_eq!(err, PatchError::UndefinedPatchSet("patch-set-1".into()));
    assert_eq!(err.to_string(), "cannot find PatchSet by name patch-set-1");
}

#[test]
fn test_defined_patch_sets() {
    let map = Transform::Map(MapTransform::new([("k-1", json!("v-1")), ("k-2", json!("v-2"))]));
    let sets = vec![
        PatchSet::new(
            "patch-set-1",
            vec![
                Patch::from_composite("metadata.namespace"),
                Patch::from_composite("spec.parameters.test"),
            ],
        ),
        PatchSet::new(
            "patch-set-2",
            vec![
                Patch::from_composite("metadata.annotations.patch-test-1"),
                Patch::from_composite("metadata.annotations.patch-test-2")
                    .with_transform(map.clone()),
            ],
        ),
    ];
    let templates = vec![
        unnamed(vec![
            Patch::patch_set("patch-set-2"),
            Patch::from_composite("metadata.name"),
            Patch::patch_set("patch-set-1"),
        ]),
        unnamed(vec![Patch::patch_set("patch-set-1")]),
    ];

    let out = composed_templates(&sets, &templates).unwrap();
    assert_eq!(
        out,
        vec![
            unnamed(vec![
                Patch::from_composite("metadata.annotations.patch-test-1"),
                Patch::from_composite("metadata.annotations.patch-test-2").with_transform(map),
                Patch::from_composite("metadata.name"),
                Patch::from_composite("metadata.namespace"),
                Patch::from_composite("spec.parameters.test"),
            ]),
            unnamed(vec![
                Patch::from_composite("metadata.namespace"),
                Patch::from_composite("spec.parameters.test"),
            ]),
        ]
    );
}

#[test]
fn test_error_in_later_template_returns_no_output() {
    let sets = vec![PatchSet::new("ok", vec![Patch::from_composite("a")])];
    let templates = vec![
        unnamed(vec![Patch::patch_set("ok")]),
        unnamed(vec![Patch::patch_set("missing")]),
    ];
    assert!(composed_templates(&sets, &templates).is_err());
}

#[test]
fn test_patch_sets_from_yaml() {
    let sets: Vec<PatchSet> = serde_yaml::from_str(
        r#"
- name: common
  patches:
    - type: FromCompositeFieldPath
      fromFieldPath: spec.region
      toFieldPath: spec.forProvider.region
      transforms:
        - type: map
          map:
            pairs:
              eu: eu-west-1
"#,
    )
    .unwrap();
    let templates: Vec<ComposedTemplate> = serde_yaml::from_str(
        r#"
- name: bucket
  base:
    kind: Bucket
  patches:
    - type: PatchSet
      patchSetName: common
"#,
    )
    .unwrap();

    let out = composed_templates(&sets, &templates).unwrap();
    assert_eq!(out[0].base, json!({"kind": "Bucket"}));
    assert_eq!(out[0].patches, sets[0].patches);
}
