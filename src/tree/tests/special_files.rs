use crate::ops;
use crate::store::Uri;
use crate::tree::{lookup, NodeKind};

use super::Fixture;

#[test]
fn fresh_root_lists_only_the_synthetic_entry() {
    let fixture = Fixture::new();
    let entries = ops::readdir(&fixture.ctx, "/").expect("readdir /");
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, [".", "..", ".uri"]);
}

#[test]
fn root_uri_reads_are_idempotent() {
    let fixture = Fixture::new();
    let first = ops::read(&fixture.ctx, "/.uri", 0, 4096).expect("read /.uri");
    assert!(first.ends_with(b"\n"));

    let puts = fixture.store.put_count();
    let second = ops::read(&fixture.ctx, "/.uri", 0, 4096).expect("read /.uri again");
    assert_eq!(first, second);
    // A clean tree republishes nothing.
    assert_eq!(fixture.store.put_count(), puts);
    assert!(!fixture.ctx.root().is_dirty());
}

#[test]
fn uri_reads_slice_like_files() {
    let fixture = Fixture::new();
    let whole = ops::read(&fixture.ctx, "/.uri", 0, 4096).unwrap();

    let head = ops::read(&fixture.ctx, "/.uri", 0, 4).unwrap();
    assert_eq!(head, whole[..4]);
    let tail = ops::read(&fixture.ctx, "/.uri", 4, 4096).unwrap();
    assert_eq!(tail, whole[4..]);
    assert!(ops::read(&fixture.ctx, "/.uri", 100_000, 16).unwrap().is_empty());
}

#[test]
fn child_uri_entry_reports_the_child() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mknod("/a/f");

    let contents = ops::read(&fixture.ctx, "/a/.uri.f", 0, 4096).expect("read /a/.uri.f");
    let uri: Uri = String::from_utf8(contents).unwrap().trim().parse().unwrap();
    assert_eq!(&uri, Uri::empty_file());
}

#[test]
fn reading_a_dirty_directory_uri_forces_republish() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    let node = lookup(&fixture.ctx, "/a").unwrap();
    assert!(node.is_dirty());

    let contents = ops::read(&fixture.ctx, "/a/.uri", 0, 4096).expect("read /a/.uri");
    assert!(!node.is_dirty());
    let uri: Uri = String::from_utf8(contents).unwrap().trim().parse().unwrap();
    assert_eq!(node.uri().unwrap(), uri);
}

#[test]
fn reading_a_dirty_file_uri_republishes_and_dirties_ancestors() {
    let fixture = Fixture::new();
    fixture.mkdir("/a");
    fixture.mknod("/a/f");
    fixture.root_uri();
    fixture.write("/a/f", b"new bytes");

    let contents = ops::read(&fixture.ctx, "/a/.uri.f", 0, 4096).expect("read /a/.uri.f");
    let uri: Uri = String::from_utf8(contents).unwrap().trim().parse().unwrap();
    assert_ne!(&uri, Uri::empty_file());

    let node = lookup(&fixture.ctx, "/a/f").unwrap();
    assert!(!node.is_dirty());
    assert!(lookup(&fixture.ctx, "/a").unwrap().is_dirty());
    assert!(fixture.ctx.root().is_dirty());
}

#[test]
fn synthetic_attrs_are_fixed_and_read_only() {
    let fixture = Fixture::new();
    fixture.mknod("/f");

    for path in ["/.uri", "/.uri.f"] {
        let attr = ops::getattr(&fixture.ctx, path).expect("getattr succeeds");
        assert_eq!(attr.kind, NodeKind::File);
        assert_eq!(attr.size, 4096);
        assert_eq!(attr.perm, 0o555);
    }
}

#[test]
fn synthetic_paths_reject_mutation() {
    let fixture = Fixture::new();
    fixture.mknod("/f");

    assert_eq!(ops::mknod(&fixture.ctx, "/.uri", libc::S_IFREG | 0o644), Err(libc::EEXIST));
    assert_eq!(ops::mkdir(&fixture.ctx, "/.uri"), Err(libc::EEXIST));
    assert_eq!(ops::unlink(&fixture.ctx, "/.uri.f"), Err(libc::EPERM));
    assert_eq!(ops::rmdir(&fixture.ctx, "/.uri"), Err(libc::ENOTDIR));
    assert_eq!(ops::write(&fixture.ctx, "/.uri", 0, b"x"), Err(libc::EACCES));
    assert_eq!(ops::truncate(&fixture.ctx, "/.uri", 0), Err(libc::EACCES));
    assert_eq!(ops::utimens(&fixture.ctx, "/.uri", None, None), Err(libc::EACCES));
    assert_eq!(ops::rename(&fixture.ctx, "/.uri", "/elsewhere"), Err(libc::EACCES));
    assert_eq!(ops::rename(&fixture.ctx, "/f", "/.uri"), Err(libc::EACCES));
}

#[test]
fn synthetic_open_is_read_only() {
    let fixture = Fixture::new();
    assert_eq!(
        ops::open(&fixture.ctx, "/.uri", libc::O_WRONLY as u32),
        Err(libc::EACCES)
    );
    assert_eq!(
        ops::open(&fixture.ctx, "/.uri", (libc::O_CREAT | libc::O_EXCL) as u32),
        Err(libc::EEXIST)
    );
    ops::open(&fixture.ctx, "/.uri", libc::O_RDONLY as u32).expect("read-only open succeeds");
}

#[test]
fn uri_names_without_a_target_are_plain_missing_files() {
    let fixture = Fixture::new();
    assert_eq!(ops::getattr(&fixture.ctx, "/.uri.ghost").map(|_| ()), Err(libc::ENOENT));
    assert_eq!(ops::read(&fixture.ctx, "/.uri.ghost", 0, 16).map(|_| ()), Err(libc::ENOENT));
}
