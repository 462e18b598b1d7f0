use rpgs::{
    encode_canonical, format_files, instance_files, load_registry, read_document, validate_files,
    ErrorKind, SystemLayout,
};
use serde_json::json;
use std::{fs, path::Path};

fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn seed_repository(root: &Path) -> SystemLayout {
    let layout = SystemLayout::new(root, "5e");
    let resources = layout.resources_dir();
    write(
        &resources.join("creatures/monster/stats.rpgs"),
        b"base string name(\"\")\nbase integer hp(1)\nbase resource<weapon>[] attacks([])\n",
    );
    write(&resources.join("items/weapon/stats.rpgs"), b"base string name(\"\")\nbase integer damage(1)\n");

    let instances = layout.instances_dir();
    let goblin = json!({
        "resource_id": "monster",
        "stats": {
            "id": { "value": "goblin" },
            "name": { "value": "Goblin" },
            "hp": { "value": 7 },
            "attacks": { "value": [
                { "resource_id": "weapon", "stats": { "name": { "value": "Scimitar" }, "damage": { "value": 6 } } }
            ] }
        }
    });
    write(&instances.join("monsters/goblin.json"), goblin.to_string().as_bytes());
    write(&instances.join("monsters/goblin-boss.rpg"), &encode_canonical(&goblin, true).unwrap());
    write(
        &instances.join("monsters/kobold.json"),
        br#"{"resource_id": "monster", "stats": {"hp": {"value": "7"}, "speed": {"value": 30}}}"#,
    );
    write(&instances.join("monsters/.draft.json"), b"{");
    layout
}

#[test]
fn test_validate_repository() {
    let dir = tempfile::tempdir().unwrap();
    let layout = seed_repository(dir.path());

    let (registry, failures) = load_registry(&layout.resources_dir());
    assert!(failures.is_empty());
    assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["monster", "weapon"]);

    let files = instance_files(&layout.instances_dir());
    assert_eq!(files.len(), 3);

    let report = validate_files(&files, &registry, dir.path());
    assert_eq!(report.files_checked, 3);

    let lines: Vec<String> = report.errors.iter().map(|e| e.to_string().replace('\\', "/")).collect();
    assert_eq!(lines, vec![
        "systems/5e/resource_instances/monsters/kobold.json: resource_id='monster' -> stats.hp.value: Expected number, got string",
        "systems/5e/resource_instances/monsters/kobold.json: resource_id='monster' -> stats.speed: Unknown stat for this resource",
    ]);
    assert_eq!(report.errors[1].error.kind, ErrorKind::UnknownIdentifier);
}

#[test]
fn test_format_repository_converges() {
    let dir = tempfile::tempdir().unwrap();
    let layout = seed_repository(dir.path());
    let files = instance_files(&layout.instances_dir());

    let before: Vec<_> = files.iter().map(|f| read_document(f).unwrap()).collect();

    let first = format_files(&files, dir.path());
    assert!(first.errors.is_empty());
    // goblin-boss.rpg was written canonically already
    assert_eq!(first.changed, 2);

    let second = format_files(&files, dir.path());
    assert_eq!(second.changed, 0);

    let after: Vec<_> = files.iter().map(|f| read_document(f).unwrap()).collect();
    assert_eq!(before, after);
}
