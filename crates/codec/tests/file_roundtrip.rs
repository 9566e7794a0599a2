//! Round-trip through real files on disk.

use wander_codec::{read_path, write_path};
use wander_core::Decision;

#[test]
fn test_write_then_read_is_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run-000042.path");

    let toggles = vec![1, 4, 9];
    let prefix = vec![Decision::new(4, 1), Decision::new(3, 2), Decision::new(2, 0)];
    let random = vec![Decision::new(1000, 999)];

    write_path(&path, &toggles, &[&prefix, &random]).unwrap();
    let decoded = read_path(&path).unwrap();

    assert_eq!(decoded.toggles, toggles);
    assert_eq!(decoded.decisions.len(), 4);
    assert_eq!(&decoded.decisions[..3], &prefix[..]);
    assert_eq!(&decoded.decisions[3..], &random[..]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_path(&dir.path().join("absent.path")).unwrap_err();
    assert!(matches!(err, wander_codec::CodecError::Io(_)));
}
