use std::sync::Arc;

use crate::error::Error;
use crate::tree::{join, lookup, split, walk, Walk};

use super::Fixture;

#[test]
fn join_and_split_agree() {
    assert_eq!(join("/", "a"), "/a");
    assert_eq!(join("/a", "b"), "/a/b");
    assert_eq!(split("/a/b"), ("/a", "b"));
    assert_eq!(split("/a"), ("/", "a"));
    assert_eq!(split("/"), ("/", ""));
}

#[test]
fn concurrent_lookups_share_one_entry() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");

    let first = lookup(&fixture.ctx, "/a").expect("lookup /a");
    let second = lookup(&fixture.ctx, "/a").expect("lookup /a again");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn registered_entries_answer_to_their_path() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mknod("/a/f");

    for path in ["/", "/a", "/a/f"] {
        let node = fixture.ctx.registry().get(path).expect("entry registered");
        assert_eq!(node.path_get(), path);
    }
}

#[test]
fn walk_visits_root_and_every_component() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mkdir("/a/b");
    fixture.mknod("/a/b/f");

    let mut visited = Vec::new();
    walk(&fixture.ctx, "/a/b/f", |node| {
        visited.push(node.path_get());
        Walk::Continue
    })
    .expect("walk succeeds");
    assert_eq!(visited, ["/", "/a", "/a/b", "/a/b/f"]);
}

#[test]
fn walk_stops_when_the_visitor_says_so() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mkdir("/a/b");

    let mut visited = Vec::new();
    walk(&fixture.ctx, "/a/b", |node| {
        visited.push(node.path_get());
        if node.path_get() == "/a" {
            Walk::Stop
        } else {
            Walk::Continue
        }
    })
    .expect("walk succeeds");
    assert_eq!(visited, ["/", "/a"]);
}

#[test]
fn missing_components_fail_the_walk() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");

    assert!(matches!(lookup(&fixture.ctx, "/a/nope"), Err(Error::NotFound)));
    assert!(matches!(lookup(&fixture.ctx, "/nope/deeper"), Err(Error::NotFound)));
}

#[test]
fn walk_resolves_through_listings_after_remount() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mkdir("/a/b");
    fixture.mknod("/a/b/f");

    // A fresh mount has an empty registry, so every component comes from
    // a materialised parent listing.
    let remounted = fixture.remount();
    let node = lookup(&remounted.ctx, "/a/b/f").expect("resolve deep path");
    assert_eq!(node.path_get(), "/a/b/f");
    assert!(remounted.ctx.registry().get("/a/b").is_some());
}

#[test]
fn removed_entries_leave_the_registry() {
    let fixture = Fixture::new();
    fixture.mknod("/f");
    let node = lookup(&fixture.ctx, "/f").expect("lookup /f");

    crate::ops::unlink(&fixture.ctx, "/f").expect("unlink succeeds");
    assert!(fixture.ctx.registry().get("/f").is_none());
    // Our reference keeps the detached node alive.
    assert_eq!(node.path_get(), "/f");
}
