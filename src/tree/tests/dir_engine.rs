use crate::error::Error;
use crate::ops;
use crate::store::{CancelFlag, Store};
use crate::tree::{dir, lookup, Meta, Node, NodeKind};
use crate::wire;

use super::Fixture;

#[test]
fn children_materialise_from_the_committed_listing() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mknod("/a/one");
    fixture.mkdir("/a/two");

    let remounted = fixture.remount();
    let parent = lookup(&remounted.ctx, "/a").unwrap();
    assert!(!parent.is_cached());

    let children = dir::children(&remounted.ctx, &parent).expect("materialise /a");
    assert!(parent.is_cached());
    let names: Vec<&str> = children.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["one", "two"]);
    assert_eq!(children[0].1.kind(), NodeKind::File);
    assert_eq!(children[1].1.kind(), NodeKind::Dir);
}

#[test]
fn find_returns_referenced_children() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mknod("/a/f");
    let parent = lookup(&fixture.ctx, "/a").unwrap();

    let child = dir::find(&fixture.ctx, &parent, "f").expect("find runs");
    assert_eq!(child.expect("child found").path_get(), "/a/f");
    assert!(dir::find(&fixture.ctx, &parent, "nope").expect("find runs").is_none());
}

#[test]
fn find_on_a_file_resolves_nothing() {
    let fixture = Fixture::new();
    fixture.mknod("/f");
    let file = lookup(&fixture.ctx, "/f").unwrap();
    assert!(dir::find(&fixture.ctx, &file, "x").expect("find runs").is_none());
}

#[test]
fn insert_refuses_existing_basenames() {
    let fixture = Fixture::new();
    fixture.mknod("/f");
    let root = fixture.ctx.root().clone();

    let duplicate = Node::new_file("/f", Meta::new());
    let err = dir::insert(&fixture.ctx, &root, &duplicate).expect_err("insert must refuse");
    assert!(matches!(err, Error::Exists));
}

#[test]
fn insert_marks_the_whole_path_dirty() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.root_uri();
    assert!(!fixture.ctx.root().is_dirty());

    fixture.mknod("/a/f");
    for path in ["/", "/a"] {
        let node = lookup(&fixture.ctx, path).unwrap();
        assert!(node.is_dirty(), "{path} should be dirty");
        // dirty implies cached
        assert!(node.is_cached(), "{path} should be cached");
    }
}

#[test]
fn remove_detaches_and_leaves_the_path_dirty() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mknod("/a/f");
    fixture.root_uri();

    let parent = lookup(&fixture.ctx, "/a").unwrap();
    let child = lookup(&fixture.ctx, "/a/f").unwrap();
    dir::remove(&fixture.ctx, &parent, &child).expect("remove succeeds");

    assert!(matches!(lookup(&fixture.ctx, "/a/f"), Err(Error::NotFound)));
    assert!(parent.is_dirty());
    assert!(fixture.ctx.root().is_dirty());
}

#[test]
fn republish_commits_a_new_uri_and_cleans() {
    let fixture = Fixture::new();
    let before = fixture.root_uri();

    fixture.mkdir("/a");
    assert!(fixture.ctx.root().is_dirty());
    let after = fixture.root_uri();

    assert_ne!(before, after);
    assert!(!fixture.ctx.root().is_dirty());
    // Clean republish is a no-op: same URI, no new upload.
    assert_eq!(fixture.root_uri(), after);
}

#[test]
fn republish_descends_into_dirty_subdirectories() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mkdir("/a/b");
    fixture.root_uri();

    for path in ["/a", "/a/b"] {
        assert!(!lookup(&fixture.ctx, path).unwrap().is_dirty(), "{path} still dirty");
        assert!(lookup(&fixture.ctx, path).unwrap().uri().is_some(), "{path} has no uri");
    }
}

#[test]
fn entries_without_a_committed_uri_are_omitted() {
    let fixture = Fixture::new();
    fixture.mknod("/f");
    fixture.mknod("/g");
    // Strip /f's sentinel so it has nothing publishable.
    lookup(&fixture.ctx, "/f").unwrap().state().uri = None;

    let root_uri = fixture.root_uri();
    let blob = fixture
        .store
        .get_range(&root_uri, 0, root_uri.size() as usize, &CancelFlag::new())
        .expect("fetch root listing");
    let records = wire::parse_listing(&blob).expect("parse root listing");
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["g"]);
}

#[test]
fn dirty_files_contribute_their_last_committed_uri() {
    let fixture = Fixture::new();
    fixture.mknod("/f");
    fixture.write("/f", b"pending bytes");
    let file = lookup(&fixture.ctx, "/f").unwrap();
    assert!(file.is_dirty());
    let committed = file.uri().expect("sentinel uri");

    let root_uri = fixture.root_uri();
    let blob = fixture
        .store
        .get_range(&root_uri, 0, root_uri.size() as usize, &CancelFlag::new())
        .expect("fetch root listing");
    let records = wire::parse_listing(&blob).expect("parse root listing");
    assert_eq!(records[0].uri, committed);
    // The file itself is still dirty; a later release will re-dirty us.
    assert!(file.is_dirty());
}

#[test]
fn readdir_lists_basenames_with_kinds() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mknod("/a/f");
    fixture.mkdir("/a/sub");

    let entries = ops::readdir(&fixture.ctx, "/a").expect("readdir succeeds");
    assert!(entries.contains(&(".".to_owned(), NodeKind::Dir)));
    assert!(entries.contains(&("..".to_owned(), NodeKind::Dir)));
    assert!(entries.contains(&("f".to_owned(), NodeKind::File)));
    assert!(entries.contains(&("sub".to_owned(), NodeKind::Dir)));
    assert!(entries.contains(&(".uri.f".to_owned(), NodeKind::File)));
}
