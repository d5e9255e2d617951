//! Integration test: copy a file through a progress stream with the length
//! inferred from the source path.

use std::fs;
use std::sync::{Arc, Mutex};

use streamtap_core::io::DEFAULT_CHUNK_SIZE;
use streamtap_core::{FileSource, ProgressOptions, ProgressState, ProgressStream};
use tempfile::tempdir;

#[test]
fn file_copy_reports_inferred_length_and_completes() {
    let dir = tempdir().unwrap();
    let src_path = dir.path().join("source.bin");
    let dst_path = dir.path().join("dest.bin");
    let body: Vec<u8> = (0u8..255).cycle().take(1024 * 1024 + 17).collect();
    fs::write(&src_path, &body).unwrap();

    let mut stream = ProgressStream::new(ProgressOptions::default());
    let lengths = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&lengths);
    stream.on_length(move |n| seen.lock().unwrap().push(n));
    let snaps: Arc<Mutex<Vec<ProgressState>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&snaps);
    stream.on_progress(move |p| sink.lock().unwrap().push(*p));

    let source = FileSource::open(&src_path).unwrap();
    stream.connect(&source);
    let dst = fs::File::create(&dst_path).unwrap();
    let copied = stream.pump(source, dst, DEFAULT_CHUNK_SIZE).unwrap();

    assert_eq!(copied, body.len() as u64);
    assert_eq!(fs::read(&dst_path).unwrap(), body);
    assert_eq!(*lengths.lock().unwrap(), vec![body.len() as u64]);

    let snaps = snaps.lock().unwrap();
    assert_eq!(snaps[0].length, body.len() as u64);
    assert!(snaps.iter().any(|p| p.percentage > 0.0 && p.percentage < 100.0));
    assert!(snaps.iter().all(|p| (0.0..=100.0).contains(&p.percentage)));
    let last = snaps.last().unwrap();
    assert_eq!(last.percentage, 100.0);
    assert_eq!(last.remaining, 0);
}

#[test]
fn explicit_length_wins_over_file_size() {
    let dir = tempdir().unwrap();
    let src_path = dir.path().join("small.bin");
    fs::write(&src_path, [0u8; 10]).unwrap();

    let mut stream = ProgressStream::new(ProgressOptions::default().length(40));
    let source = FileSource::open(&src_path).unwrap();
    stream.connect(&source);
    assert_eq!(stream.state().length, 40);

    let copied = stream.drain_from(source, 4).unwrap();
    assert_eq!(copied, 10);
    let last = *stream.state();
    assert!(stream.is_ended());
    assert_eq!(last.transferred, 10);
    assert_eq!(last.remaining, 30);
    assert_eq!(last.percentage, 100.0);
}
