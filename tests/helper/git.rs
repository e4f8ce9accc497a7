//! Git repository fixture utilities

use std::path::Path;

use git2::{IndexAddOption, ObjectType, Oid, Repository, Signature};

pub fn init_repo(root: &Path) -> Repository {
    Repository::init(root).unwrap()
}

/// Stage every file in the working tree and commit it on HEAD
pub fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Test", "test@example.com").unwrap();
    let parent = repo.head().ok().map(|head| head.peel_to_commit().unwrap());
    let parents: Vec<_> = parent.iter().collect();

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
    .unwrap()
}

pub fn tag_lightweight(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel(ObjectType::Commit).unwrap();
    repo.tag_lightweight(name, &head, false).unwrap();
}

pub fn tag_annotated(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel(ObjectType::Commit).unwrap();
    let signature = Signature::now("Test", "test@example.com").unwrap();
    repo.tag(name, &head, &signature, &format!("Release {name}"), false)
        .unwrap();
}
