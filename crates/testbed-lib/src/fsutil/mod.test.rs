use super::*;
use tempfile::TempDir;

fn populate(root: &Path) {
    fs::create_dir_all(root.join("a/b/c")).unwrap();
    fs::create_dir_all(root.join("d")).unwrap();
    fs::write(root.join("top.txt"), "top").unwrap();
    fs::write(root.join("a/one.txt"), "1").unwrap();
    fs::write(root.join("a/b/two.txt"), "2").unwrap();
    fs::write(root.join("a/b/c/three.txt"), "3").unwrap();
}

#[test]
fn test_delete_missing_path_is_noop() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("never-created");

    assert_eq!(
        delete_tree(&missing, RemoveMode::Tree).unwrap(),
        Deletion::NotFound
    );
    assert_eq!(
        delete_tree(&missing, RemoveMode::ChildrenOnly).unwrap(),
        Deletion::NotFound
    );
}

#[test]
fn test_delete_empty_path_is_noop() {
    assert_eq!(
        delete_tree(Path::new(""), RemoveMode::Tree).unwrap(),
        Deletion::NotFound
    );
}

#[test]
fn test_delete_single_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("lonely.txt");
    let sibling = temp.path().join("sibling.txt");
    fs::write(&file, "bye").unwrap();
    fs::write(&sibling, "stay").unwrap();

    assert_eq!(delete_tree(&file, RemoveMode::Tree).unwrap(), Deletion::Removed);
    assert!(!file.exists());
    assert!(sibling.exists());
}

#[test]
fn test_children_only_on_file_unlinks_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    assert_eq!(
        delete_tree(&file, RemoveMode::ChildrenOnly).unwrap(),
        Deletion::Removed
    );
    assert!(!file.exists());
}

#[test]
fn test_delete_whole_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    populate(&root);

    assert_eq!(delete_tree(&root, RemoveMode::Tree).unwrap(), Deletion::Removed);
    assert!(!root.exists());
    assert!(temp.path().exists());
}

#[test]
fn test_delete_children_only_keeps_empty_root() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    populate(&root);

    assert_eq!(
        delete_tree(&root, RemoveMode::ChildrenOnly).unwrap(),
        Deletion::Removed
    );
    assert!(root.is_dir());
    assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn test_delete_does_not_follow_directory_symlinks() {
    let temp = TempDir::new().unwrap();
    let outside = temp.path().join("outside");
    fs::create_dir_all(&outside).unwrap();
    fs::write(outside.join("precious.txt"), "keep me").unwrap();

    let root = temp.path().join("tree");
    populate(&root);
    std::os::unix::fs::symlink(&outside, root.join("a/link-to-outside")).unwrap();

    delete_tree(&root, RemoveMode::Tree).unwrap();

    assert!(!root.exists());
    assert!(outside.join("precious.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_delete_symlink_itself() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("file.txt"), "x").unwrap();
    let link = temp.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    assert_eq!(delete_tree(&link, RemoveMode::Tree).unwrap(), Deletion::Removed);
    assert!(fs::symlink_metadata(&link).is_err());
    assert!(target.join("file.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_delete_stops_at_first_failed_child() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    let locked = root.join("locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(locked.join("first.txt"), "1").unwrap();
    fs::write(locked.join("second.txt"), "2").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores directory permissions
    if fs::write(locked.join("root-check"), "").is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = delete_tree(&root, RemoveMode::Tree);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let err = result.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    assert!(locked.join("first.txt").exists());
    assert!(locked.join("second.txt").exists());
    assert!(root.is_dir());
}

#[test]
fn test_failed_creation_of_existing_directory_is_success() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("raced");
    fs::create_dir(&dir).unwrap();

    let lost_race = Err(io::Error::from(io::ErrorKind::AlreadyExists));

    assert!(settle_creation(&dir, lost_race).is_ok());
}

#[test]
fn test_failed_creation_without_directory_is_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("occupied");
    fs::write(&file, "not a dir").unwrap();

    let failure = Err(io::Error::from(io::ErrorKind::AlreadyExists));
    let err = settle_creation(&file, failure).unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
}

#[test]
fn test_mkdirs_creates_missing_ancestors() {
    let temp = TempDir::new().unwrap();
    let deep = temp.path().join("x/y/z/leaf");

    mkdirs(&deep, DEFAULT_DIR_MODE).unwrap();

    assert!(temp.path().join("x").is_dir());
    assert!(temp.path().join("x/y/z").is_dir());
    assert!(deep.is_dir());
}

#[test]
fn test_mkdirs_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let deep = temp.path().join("again/and/again");

    mkdirs(&deep, DEFAULT_DIR_MODE).unwrap();
    fs::write(deep.join("marker"), "").unwrap();
    mkdirs(&deep, DEFAULT_DIR_MODE).unwrap();

    assert!(deep.join("marker").exists());
}

#[test]
fn test_mkdirs_fails_when_ancestor_is_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "not a dir").unwrap();

    assert!(mkdirs(&blocker.join("child"), DEFAULT_DIR_MODE).is_err());
}

#[cfg(unix)]
#[test]
fn test_mkdirs_applies_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("private");
    mkdirs(&dir, 0o700).unwrap();

    let mode = fs::metadata(&dir).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700);
}
