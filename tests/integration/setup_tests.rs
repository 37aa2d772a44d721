//! Integration tests for manifest-driven project setup
//!
//! Build a fake download tree on disk, point two manifests at it and verify
//! the resolved project inputs and the collaborator call sequence.

use intermediarygen::setup::{
    MappingJob, MappingLoader, NamespaceHint, NamingField, ProjectAcceptor,
};
use intermediarygen::{setup_project, OsName, ProjectInputs, SetupError, Side};
use sha1::{Digest, Sha1};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn sha1_hex(contents: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(contents);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn download_entry(contents: &[u8]) -> String {
    format!(
        r#"{{"size": {}, "sha1": "{}"}}"#,
        contents.len(),
        sha1_hex(contents)
    )
}

struct Host {
    load: bool,
    created: Vec<ProjectInputs>,
    mapping_jobs: Vec<MappingJob>,
}

impl Host {
    fn new(load: bool) -> Self {
        Self {
            load,
            created: Vec::new(),
            mapping_jobs: Vec::new(),
        }
    }
}

impl ProjectAcceptor for Host {
    fn create_project(&mut self, inputs: &ProjectInputs) -> Result<bool, anyhow::Error> {
        self.created.push(inputs.clone());
        Ok(self.load)
    }
}

impl MappingLoader for Host {
    fn load(&mut self, job: &MappingJob) -> Result<(), anyhow::Error> {
        self.mapping_jobs.push(job.clone());
        Ok(())
    }
}

/// Two releases sharing one library, each with a client jar and a ProGuard
/// mapping file, plus a natives library that only applies on Linux.
struct Tree {
    dir: TempDir,
    manifest_a: PathBuf,
    manifest_b: PathBuf,
    files: PathBuf,
}

fn build_tree() -> Tree {
    let dir = TempDir::new().unwrap();
    let files = dir.path().join("downloads");
    fs::create_dir_all(files.join("nested")).unwrap();

    // Content-addressed artifacts stored under misleading names.
    fs::write(files.join("nested").join("old-client.jar"), b"side A client").unwrap();
    fs::write(files.join("renamed.jar"), b"side B client!").unwrap();
    fs::write(files.join("a.txt"), b"proguard map A").unwrap();
    fs::write(files.join("b.txt"), b"proguard map B.").unwrap();

    // Decoy with a colliding size but different contents.
    fs::write(files.join("decoy.jar"), b"side A clienX").unwrap();

    // Libraries found by derived filename.
    fs::write(files.join("guava-21.0.jar"), b"guava").unwrap();
    fs::write(files.join("gson-2.8.0.jar"), b"gson").unwrap();
    fs::write(files.join("lwjgl-3.2.1-natives-linux.jar"), b"lwjgl").unwrap();

    let manifest_a = dir.path().join("a.json");
    fs::write(
        &manifest_a,
        format!(
            r#"{{
                "downloads": {{
                    "client": {client},
                    "client_mappings": {mappings}
                }},
                "libraries": [
                    {{"name": "com.google.guava:guava:21.0"}},
                    {{
                        "name": "org.lwjgl:lwjgl:3.2.1",
                        "rules": [{{"action": "allow", "os": {{"name": "linux"}}}}],
                        "natives": {{"linux": "natives-linux"}}
                    }}
                ]
            }}"#,
            client = download_entry(b"side A client"),
            mappings = download_entry(b"proguard map A"),
        ),
    )
    .unwrap();

    let manifest_b = dir.path().join("b.json");
    fs::write(
        &manifest_b,
        format!(
            r#"{{
                "downloads": {{
                    "client": {client},
                    "client_mappings": {mappings}
                }},
                "libraries": [
                    {{"name": "com.google.guava:guava:21.0"}},
                    {{"name": "com.google.code.gson:gson:2.8.0"}}
                ]
            }}"#,
            client = download_entry(b"side B client!"),
            mappings = download_entry(b"proguard map B."),
        ),
    )
    .unwrap();

    Tree {
        manifest_a,
        manifest_b,
        files,
        dir,
    }
}

#[test]
fn test_setup_resolves_everything_on_linux() {
    let tree = build_tree();
    let mut acceptor = Host::new(true);
    let mut loader = Host::new(true);

    let inputs = setup_project(
        &tree.manifest_a,
        &tree.manifest_b,
        &[tree.dir.path().to_path_buf()],
        OsName::Linux,
        &mut acceptor,
        &mut loader,
    )
    .unwrap();

    // Digest resolution ignores filenames entirely.
    assert_eq!(
        inputs.inputs_a,
        vec![tree.files.join("nested").join("old-client.jar")]
    );
    assert_eq!(inputs.inputs_b, vec![tree.files.join("renamed.jar")]);
    assert_eq!(inputs.mappings_a, vec![tree.files.join("a.txt")]);
    assert_eq!(inputs.mappings_b, vec![tree.files.join("b.txt")]);

    // guava is shared; lwjgl (with its natives classifier) is A-only,
    // gson is B-only.
    assert_eq!(
        inputs.shared_classpath,
        vec![tree.files.join("guava-21.0.jar")]
    );
    assert_eq!(
        inputs.classpath_a,
        vec![tree.files.join("lwjgl-3.2.1-natives-linux.jar")]
    );
    assert_eq!(inputs.classpath_b, vec![tree.files.join("gson-2.8.0.jar")]);

    assert_eq!(acceptor.created.len(), 1);

    // Mappings load side A first, both in ProGuard format, with the full
    // read instructions a host needs: reversed namespaces and the
    // auxiliary slot as destination.
    assert_eq!(loader.mapping_jobs.len(), 2);
    assert_eq!(loader.mapping_jobs[0].side, Side::A);
    assert_eq!(loader.mapping_jobs[1].side, Side::B);
    for job in &loader.mapping_jobs {
        assert_eq!(job.source_namespace, NamespaceHint::TargetFallback);
        assert_eq!(job.target_namespace, NamespaceHint::SourceFallback);
        assert_eq!(job.source_field, NamingField::Plain);
        assert_eq!(job.target_field, NamingField::Auxiliary);
    }
}

#[test]
fn test_setup_on_windows_drops_the_linux_only_native() {
    let tree = build_tree();
    let mut acceptor = Host::new(true);
    let mut loader = Host::new(true);

    let inputs = setup_project(
        &tree.manifest_a,
        &tree.manifest_b,
        &[tree.dir.path().to_path_buf()],
        OsName::Windows,
        &mut acceptor,
        &mut loader,
    )
    .unwrap();

    // The lwjgl rule only allows linux, so side A has no exclusive libs.
    assert!(inputs.classpath_a.is_empty());
    assert_eq!(inputs.classpath_b, vec![tree.files.join("gson-2.8.0.jar")]);
}

#[test]
fn test_setup_fails_without_creating_project_when_artifact_missing() {
    let tree = build_tree();
    fs::remove_file(tree.files.join("renamed.jar")).unwrap();

    let mut acceptor = Host::new(true);
    let mut loader = Host::new(true);

    let err = setup_project(
        &tree.manifest_a,
        &tree.manifest_b,
        &[tree.dir.path().to_path_buf()],
        OsName::Linux,
        &mut acceptor,
        &mut loader,
    )
    .unwrap_err();

    assert!(matches!(err, SetupError::Resolve(_)));
    assert!(acceptor.created.is_empty());
    assert!(loader.mapping_jobs.is_empty());
}

#[test]
fn test_setup_fails_on_malformed_coordinate() {
    let tree = build_tree();
    let bad_manifest = tree.dir.path().join("bad.json");
    fs::write(
        &bad_manifest,
        r#"{"libraries": [{"name": "foo:bar"}]}"#,
    )
    .unwrap();

    let mut acceptor = Host::new(true);
    let mut loader = Host::new(true);

    let err = setup_project(
        &bad_manifest,
        &tree.manifest_b,
        &[tree.dir.path().to_path_buf()],
        OsName::Linux,
        &mut acceptor,
        &mut loader,
    )
    .unwrap_err();

    assert!(matches!(err, SetupError::Manifest(_)));
    assert!(acceptor.created.is_empty());
}

#[test]
fn test_declined_project_load_skips_mapping_import() {
    let tree = build_tree();
    let mut acceptor = Host::new(false);
    let mut loader = Host::new(false);

    setup_project(
        &tree.manifest_a,
        &tree.manifest_b,
        &[tree.dir.path().to_path_buf()],
        OsName::Linux,
        &mut acceptor,
        &mut loader,
    )
    .unwrap();

    assert_eq!(acceptor.created.len(), 1);
    assert!(loader.mapping_jobs.is_empty());
}

#[test]
fn test_candidate_directory_order_matters() {
    let tree = build_tree();

    // A second directory holding a copy of side A's client; the first
    // directory must win.
    let shadow = TempDir::new().unwrap();
    fs::write(shadow.path().join("copy.jar"), b"side A client").unwrap();

    let mut acceptor = Host::new(true);
    let mut loader = Host::new(true);

    let inputs = setup_project(
        &tree.manifest_a,
        &tree.manifest_b,
        &[tree.dir.path().to_path_buf(), shadow.path().to_path_buf()],
        OsName::Linux,
        &mut acceptor,
        &mut loader,
    )
    .unwrap();

    assert_eq!(
        inputs.inputs_a,
        vec![tree.files.join("nested").join("old-client.jar")]
    );
}
