use super::*;
use flate2::read::GzDecoder;

#[test]
fn test_creates_temp_dir_and_writes_file() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TempDirFixture::new()?;

    fixture.create_dir("tests")?;
    fixture.write_file("tests/typecho.sql", "-- dump")?;

    assert!(fixture.file_exists("tests/typecho.sql"));
    assert_eq!(fixture.read_file("tests/typecho.sql")?, "-- dump");
    assert!(fixture.path().join("tests").is_dir());

    Ok(())
}

#[test]
fn test_temp_dir_isolation() -> Result<(), Box<dyn std::error::Error>> {
    let fixture1 = TempDirFixture::new()?;
    let fixture2 = TempDirFixture::new()?;

    assert_ne!(fixture1.path(), fixture2.path());

    fixture1.write_file("test1.txt", "content1")?;
    fixture2.write_file("test2.txt", "content2")?;

    assert!(fixture1.file_exists("test1.txt"));
    assert!(!fixture1.file_exists("test2.txt"));
    assert!(fixture2.file_exists("test2.txt"));

    Ok(())
}

#[test]
fn test_cleanup_on_drop() -> Result<(), Box<dyn std::error::Error>> {
    let path = {
        let fixture = TempDirFixture::new()?;
        fixture.write_file("x.txt", "x")?;
        fixture.path().to_path_buf()
    };

    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_plugin_sources_and_dump() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TempDirFixture::new()?;
    fixture.write_plugin_sources("src")?;
    fixture.write_schema_dump("tests/typecho.sql")?;

    assert!(fixture.read_file("src/Plugin.php")?.contains("class Restful_Plugin"));
    assert!(fixture.file_exists("src/Action.php"));
    assert!(fixture.read_file("tests/typecho.sql")?.contains("CREATE TABLE"));

    Ok(())
}

#[test]
fn test_platform_archive_entries_share_a_root() -> Result<(), Box<dyn std::error::Error>> {
    let bytes = platform_archive("typecho-master", &[("index.php", "<?php"), ("var/a.php", "a")]);

    let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
    let mut names = Vec::new();
    for entry in archive.entries()? {
        names.push(entry?.path()?.to_string_lossy().into_owned());
    }

    assert_eq!(names, vec!["typecho-master/index.php", "typecho-master/var/a.php"]);
    Ok(())
}
