//! Where schema sources and instance files live in a repository.
//!
//! ```text
//! systems/<system>/system/resources/**/<resource_kind>/stats.rpgs
//! systems/<system>/resource_instances/**/*.{json,rpg}
//! ```

use rpgs_compiler::{build_registry, RpgsError};
use rpgs_schema::SchemaRegistry;
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

pub const SYSTEMS_DIR:        &str = "systems";
pub const STATS_FILE:         &str = "stats.rpgs";
pub const INSTANCE_EXTENSIONS: [&str; 2] = ["json", "rpg"];

/// The folders of one system under `systems/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLayout {
    name: String,
    root: PathBuf,
}

impl SystemLayout {
    pub fn new(repo_root: &Path, system: &str) -> SystemLayout {
        SystemLayout {
            name: system.to_owned(),
            root: repo_root.join(SYSTEMS_DIR).join(system),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parent of the per-kind folders holding `stats.rpgs`.
    pub fn resources_dir(&self) -> PathBuf {
        self.root.join("system").join("resources")
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.root.join("resource_instances")
    }
}

/// Finds every `stats.rpgs` below `resources_dir`, keyed by the name of the
/// directory containing it. Read errors are returned per kind.
pub fn discover_schema_sources(resources_dir: &Path) -> Vec<(String, io::Result<Vec<u8>>)> {
    let mut sources: Vec<(String, io::Result<Vec<u8>>)> = walk_files(resources_dir)
        .filter(|entry| entry.file_name() == STATS_FILE)
        .filter_map(|entry| {
            let kind = entry.path().parent()?.file_name()?.to_string_lossy().into_owned();
            Some((kind, fs::read(entry.path())))
        })
        .collect();
    sources.sort_by(|a, b| a.0.cmp(&b.0));
    sources
}

/// Discovers and compiles every schema below `resources_dir`.
pub fn load_registry(resources_dir: &Path) -> (SchemaRegistry, Vec<RpgsError>) {
    let mut readable = Vec::new();
    let mut failures = Vec::new();

    for (kind, source) in discover_schema_sources(resources_dir) {
        match source {
            Ok(bytes) => readable.push((kind, bytes)),
            Err(e) => failures.push(RpgsError::SchemaUnreadable { kind, reason: e.to_string() }),
        }
    }

    let (registry, compile_failures) = build_registry(readable);
    failures.extend(compile_failures);
    tracing::info!(
        resources_dir = %resources_dir.display(),
        resource_kinds = registry.len(),
        failures = failures.len(),
        "loaded schema registry"
    );
    (registry, failures)
}

/// Every instance file below `dir`, sorted. Dotfiles and files without a
/// `.json` or `.rpg` extension are skipped.
pub fn instance_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walk_files(dir)
        .map(DirEntry::into_path)
        .filter(|path| is_instance_file(path))
        .collect();
    files.sort();
    files
}

pub fn is_instance_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    if name.starts_with('.') {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| INSTANCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Every system under `repo_root/systems`, sorted by name, optionally
/// narrowed to one system.
pub fn systems(repo_root: &Path, filter: Option<&str>) -> io::Result<Vec<SystemLayout>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(repo_root.join(SYSTEMS_DIR))? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_owned(),
            None => continue,
        };
        if filter.map_or(true, |f| f == name) {
            found.push(SystemLayout::new(repo_root, &name));
        }
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

/// The system a file belongs to: the path segment right after `systems/`.
pub fn infer_system(path: &Path, repo_root: &Path) -> Option<String> {
    let absolute = path.canonicalize().ok()?;
    let root = repo_root.canonicalize().ok()?;
    let relative = absolute.strip_prefix(&root).ok()?;

    let mut parts = relative.components().filter_map(|c| match c {
        Component::Normal(part) => part.to_str(),
        _ => None,
    });
    while let Some(part) = parts.next() {
        if part == SYSTEMS_DIR {
            return parts.next().map(str::to_owned);
        }
    }
    None
}

/// `path` relative to `repo_root` when it lies inside it, otherwise as given.
pub fn display_path(path: &Path, repo_root: &Path) -> String {
    let relative = path
        .canonicalize()
        .ok()
        .zip(repo_root.canonicalize().ok())
        .and_then(|(abs, root)| abs.strip_prefix(&root).ok().map(Path::to_path_buf));
    match relative {
        Some(rel) => rel.display().to_string(),
        None      => path.display().to_string(),
    }
}

/// Every file below `dir`. Symlinked directories are not descended into;
/// symlinks to files are kept.
fn walk_files(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read directory during walk");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpgs_schema::StatKind;

    fn write(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_layout_paths() {
        let layout = SystemLayout::new(Path::new("/repo"), "5e");
        assert_eq!(layout.name(), "5e");
        assert_eq!(layout.resources_dir(), Path::new("/repo/systems/5e/system/resources"));
        assert_eq!(layout.instances_dir(), Path::new("/repo/systems/5e/resource_instances"));
    }

    #[test]
    fn test_discover_schema_sources_nested() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("items/weapon/stats.rpgs"), b"base integer damage(1)");
        write(&dir.path().join("monster/stats.rpgs"), b"base integer hp(1)");
        write(&dir.path().join("monster/notes.txt"), b"ignored");
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let sources = discover_schema_sources(dir.path());
        let kinds: Vec<_> = sources.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(kinds, vec!["monster", "weapon"]);
        assert!(sources.iter().all(|(_, s)| s.is_ok()));
    }

    #[test]
    fn test_load_registry() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("monster/stats.rpgs"), b"base integer hp(1)\nbase resource<weapon> claw(null)\n");
        write(&dir.path().join("cursed/stats.rpgs"), b"base integer hp(\xff)");

        let (registry, failures) = load_registry(dir.path());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("monster").unwrap().get("hp").unwrap().kind(), StatKind::Integer);
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], RpgsError::SchemaUnreadable { ref kind, .. } if kind == "cursed"));
    }

    #[test]
    fn test_load_registry_missing_dir() {
        let (registry, failures) = load_registry(Path::new("/tmp/rpgs-test-nonexistent-dir-xyz"));
        assert!(registry.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_instance_files_filtering() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("b/orc.json"), b"{}");
        write(&dir.path().join("a/deep/sword.rpg"), b"{}");
        write(&dir.path().join("a/.hidden.json"), b"{}");
        write(&dir.path().join("a/readme.md"), b"");
        write(&dir.path().join("top.json"), b"{}");

        let files = instance_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a/deep/sword.rpg", "b/orc.json", "top.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_instance_files_ignores_symlink_loops() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a/orc.json"), b"{}");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("a/loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("a/orc.json"), dir.path().join("alias.json")).unwrap();

        let files = instance_files(dir.path());
        assert_eq!(files, vec![dir.path().join("a/orc.json"), dir.path().join("alias.json")]);
    }

    #[test]
    fn test_systems_with_filter() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("systems/5e")).unwrap();
        fs::create_dir_all(dir.path().join("systems/pf2")).unwrap();
        fs::write(dir.path().join("systems/README"), b"").unwrap();

        let all = systems(dir.path(), None).unwrap();
        assert_eq!(all.iter().map(|s| s.name()).collect::<Vec<_>>(), vec!["5e", "pf2"]);

        let only = systems(dir.path(), Some("pf2")).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].root(), dir.path().join("systems/pf2"));

        assert!(systems(dir.path(), Some("gurps")).unwrap().is_empty());
    }

    #[test]
    fn test_infer_system_and_display_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("systems/pf2/resource_instances/orc.json");
        write(&file, b"{}");

        assert_eq!(infer_system(&file, dir.path()).as_deref(), Some("pf2"));
        assert_eq!(
            display_path(&file, dir.path()).replace('\\', "/"),
            "systems/pf2/resource_instances/orc.json"
        );

        let outside = tempfile::tempdir().unwrap();
        let stray = outside.path().join("orc.json");
        write(&stray, b"{}");
        assert_eq!(infer_system(&stray, dir.path()), None);
    }
}
