//! End-to-end tests of the `patchform` binary.

use serde_json::{json, Value};
use std::io::Write;
use std::process::Command;

const PIPELINE: &str = r#"
composite:
  metadata:
    name: app
  spec:
    parameters:
      storageGB: 20
      region: eu
patchSets:
  - name: common
    patches:
      - type: FromCompositeFieldPath
        fromFieldPath: metadata.name
        toFieldPath: metadata.labels[app.kubernetes.io/name]
resources:
  - name: db
    base:
      kind: Instance
      metadata:
        ownerReferences:
          - name: ""
          - name: ""
    patches:
      - type: PatchSet
        patchSetName: common
      - type: FromCompositeFieldPath
        fromFieldPath: spec.parameters.storageGB
        toFieldPath: spec.forProvider.storageMB
        transforms:
          - type: math
            math:
              multiply: 1024
      - type: FromCompositeFieldPath
        fromFieldPath: metadata.name
        toFieldPath: metadata.ownerReferences[*].name
      - type: CombineFromComposite
        combine:
          variables:
            - fromFieldPath: metadata.name
            - fromFieldPath: spec.parameters.region
          strategy: string
          string:
            fmt: "%s-%s"
        toFieldPath: spec.forProvider.identifier
      - type: ToCompositeFieldPath
        fromFieldPath: status.endpoint
        toFieldPath: status.dbEndpoint
observed:
  db:
    status:
      endpoint: db.internal
"#;

fn run(args: &[&str], input: &str, suffix: &str) -> std::process::Output {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(input.as_bytes()).unwrap();
    Command::new(env!("CARGO_BIN_EXE_patchform"))
        .arg("--input")
        .arg(file.path())
        .args(args)
        .env_remove("PATCHFORM_OUTPUT")
        .env_remove("PATCHFORM_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_pipeline_to_json() {
    let output = run(&["--output", "json"], PIPELINE, ".yaml");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let rendered: Value = serde_json::from_slice(&output.stdout).unwrap();
    let db = &rendered["resources"]["db"];
    assert_eq!(db["metadata"]["labels"]["app.kubernetes.io/name"], "app");
    assert_eq!(db["spec"]["forProvider"]["storageMB"], 20480);
    assert_eq!(db["spec"]["forProvider"]["identifier"], "app-eu");
    assert_eq!(
        db["metadata"]["ownerReferences"],
        json!([{"name": "app"}, {"name": "app"}])
    );
    assert_eq!(rendered["composite"]["status"]["dbEndpoint"], "db.internal");
}

#[test]
fn test_pipeline_to_yaml_by_default() {
    let output = run(&[], PIPELINE, ".yml");
    assert!(output.status.success());

    let rendered: Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(rendered["resources"]["db"]["kind"], "Instance");
}

#[test]
fn test_json_input() {
    let input = json!({
        "composite": {"spec": {"size": "small"}},
        "resources": [{
            "name": "vm",
            "patches": [{
                "type": "FromCompositeFieldPath",
                "fromFieldPath": "spec.size",
                "toFieldPath": "spec.cpus",
                "transforms": [{"type": "map", "map": {"pairs": {"small": 2}}}],
            }],
        }],
    });
    let output = run(&["--output", "json"], &input.to_string(), ".json");
    assert!(output.status.success());

    let rendered: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rendered["resources"]["vm"]["spec"]["cpus"], 2);
}

#[test]
fn test_undefined_patch_set_fails() {
    let input = r#"
resources:
  - name: db
    patches:
      - type: PatchSet
        patchSetName: missing
"#;
    let output = run(&[], input, ".yaml");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot find PatchSet by name missing"), "{stderr}");
}
