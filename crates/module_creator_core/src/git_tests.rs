//! Tests for git module

use super::*;
use git2::{Repository, RepositoryInitOptions};
use std::fs;
use temp_dir::TempDir;

fn test_credentials() -> RepoCredentials {
    RepoCredentials::from_token(SecretString::from("ghs_test_token".to_string()))
}

/// Creates a bare repository whose `main` branch holds a single commit with `module.yaml`.
fn create_remote(remote_dir: &TempDir, seed_dir: &TempDir) -> String {
    let mut bare_opts = RepositoryInitOptions::new();
    bare_opts.bare(true).initial_head("refs/heads/main");
    Repository::init_opts(remote_dir.path(), &bare_opts).unwrap();

    let mut seed_opts = RepositoryInitOptions::new();
    seed_opts.initial_head("refs/heads/main");
    let seed = Repository::init_opts(seed_dir.path(), &seed_opts).unwrap();
    fs::write(seed_dir.path().join("module.yaml"), "name: template\n").unwrap();
    fs::write(seed_dir.path().join("README.md"), "# Template\n").unwrap();

    let mut index = seed.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = seed.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Template", "template@example.com").unwrap();
    seed.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])
        .unwrap();

    let remote_url = remote_dir.path().to_str().unwrap().to_string();
    let mut remote = seed.remote("origin", &remote_url).unwrap();
    remote
        .push(&["refs/heads/main:refs/heads/main"], None)
        .unwrap();

    remote_url
}

#[test]
fn test_credentials_default_to_token_username() {
    let credentials = test_credentials();

    assert_eq!(credentials.username(), "x-access-token");
    assert_eq!(credentials.password().expose_secret(), "ghs_test_token");
}

#[test]
fn test_credentials_keep_explicit_username() {
    let credentials = RepoCredentials::new("octocat", SecretString::from("pw".to_string()));

    assert_eq!(credentials.username(), "octocat");
    assert_eq!(credentials.clone().password().expose_secret(), "pw");
}

#[test]
fn test_clone_reports_current_branch() {
    let remote_dir = TempDir::new().unwrap();
    let seed_dir = TempDir::new().unwrap();
    let remote_url = create_remote(&remote_dir, &seed_dir);
    let work_dir = TempDir::new().unwrap();
    let clone_path = work_dir.path().join("aws-vpc");

    let working_copy = Git2VersionControl
        .clone_repository(&remote_url, &test_credentials(), &clone_path)
        .unwrap();

    assert_eq!(working_copy.path(), clone_path.as_path());
    assert_eq!(working_copy.current_branch().unwrap(), "main");
    assert!(clone_path.join("module.yaml").exists());
}

#[test]
fn test_clone_commit_push_round_trip() {
    let remote_dir = TempDir::new().unwrap();
    let seed_dir = TempDir::new().unwrap();
    let remote_url = create_remote(&remote_dir, &seed_dir);
    let work_dir = TempDir::new().unwrap();
    let clone_path = work_dir.path().join("aws-vpc");

    let working_copy = Git2VersionControl
        .clone_repository(&remote_url, &test_credentials(), &clone_path)
        .unwrap();
    fs::write(clone_path.join("module.yaml"), "name: aws-vpc\n").unwrap();
    fs::remove_file(clone_path.join("README.md")).unwrap();

    working_copy.add_all().unwrap();
    working_copy.commit("Updates module metadata").unwrap();
    working_copy.push("origin", "main").unwrap();

    let remote = Repository::open_bare(remote_dir.path()).unwrap();
    let commit = remote
        .find_reference("refs/heads/main")
        .unwrap()
        .peel_to_commit()
        .unwrap();
    assert_eq!(commit.message().unwrap(), "Updates module metadata");
    assert_eq!(commit.author().name().unwrap(), "module-creator");
    assert_eq!(commit.parent_count(), 1);

    let tree = commit.tree().unwrap();
    assert!(tree.get_name("README.md").is_none());
    let blob = tree
        .get_name("module.yaml")
        .unwrap()
        .to_object(&remote)
        .unwrap()
        .peel_to_blob()
        .unwrap();
    assert_eq!(blob.content(), b"name: aws-vpc\n");
}

#[test]
fn test_clone_of_missing_repository_fails() {
    let work_dir = TempDir::new().unwrap();
    let missing = work_dir.path().join("does-not-exist");

    let result = Git2VersionControl.clone_repository(
        missing.to_str().unwrap(),
        &test_credentials(),
        &work_dir.path().join("clone"),
    );

    assert!(matches!(result, Err(Error::GitOperation(_))));
}

#[test]
fn test_push_to_unknown_remote_fails() {
    let remote_dir = TempDir::new().unwrap();
    let seed_dir = TempDir::new().unwrap();
    let remote_url = create_remote(&remote_dir, &seed_dir);
    let work_dir = TempDir::new().unwrap();
    let clone_path = work_dir.path().join("vpc");

    let working_copy = Git2VersionControl
        .clone_repository(&remote_url, &test_credentials(), &clone_path)
        .unwrap();

    let result = working_copy.push("upstream", "main");

    assert!(matches!(result, Err(Error::GitOperation(_))));
}
