use filetally_scan::{NO_EXTENSION, ScanConfig, ScanProgress, Scanner};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;

fn write_sized(path: &Path, size: usize) {
    fs::write(path, vec![b'x'; size]).unwrap();
}

fn scanner_for(root: &Path) -> Scanner {
    Scanner::new(ScanConfig::new(root))
}

#[test]
fn test_three_file_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("a.txt"), 10);
    write_sized(&root.join("b.go"), 20);
    write_sized(&root.join("c.go"), 5);

    let result = scanner_for(root).scan();

    assert_eq!(result.total_files, 3);
    assert_eq!(result.total_dirs, 1);
    assert_eq!(result.total_size, 35);
    assert_eq!(result.total_errors, 0);

    assert_eq!(result.top_extensions.len(), 2);
    let go = &result.top_extensions[0];
    assert_eq!(go.extension, ".go");
    assert_eq!(go.count, 2);
    assert_eq!(go.total_size, 25);
    let txt = &result.top_extensions[1];
    assert_eq!(txt.extension, ".txt");
    assert_eq!(txt.count, 1);
    assert_eq!(txt.total_size, 10);

    assert_eq!(result.largest_file.unwrap().path, root.join("b.go"));
    assert_eq!(result.smallest_file.unwrap().path, root.join("c.go"));
    assert!((result.average_file_size - 35.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_directory_count_includes_root_and_visited_subdirs() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/bin")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::create_dir_all(root.join("build/out")).unwrap();
    write_sized(&root.join("src/bin/main.rs"), 3);
    write_sized(&root.join("build/out/app"), 100);

    let result = scanner_for(root).scan();

    // root + src + src/bin + docs; build/ is pruned with its subtree
    assert_eq!(result.total_dirs, 4);
    assert_eq!(result.total_files, 1);
}

#[test]
fn test_node_modules_never_counted() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("app/node_modules/left-pad/lib")).unwrap();
    write_sized(&root.join("app/index.js"), 7);
    write_sized(&root.join("app/node_modules/left-pad/index.js"), 5000);
    write_sized(&root.join("app/node_modules/left-pad/lib/pad.js"), 9000);

    let scanner = scanner_for(root);
    let result = scanner.scan();

    assert_eq!(result.total_files, 1);
    assert_eq!(result.total_size, 7);
    assert_eq!(result.total_dirs, 2);
    assert!(
        result
            .top_directories
            .iter()
            .all(|d| !d.path.to_string_lossy().contains("node_modules"))
    );
    assert_eq!(result.largest_file.unwrap().path, root.join("app/index.js"));
    assert_eq!(scanner.extension_table()[0].count, 1);
}

#[test]
fn test_extension_table_matches_totals() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let names = [
        "a.rs", "b.RS", "c.toml", "d.md", "Makefile", "e.json", "f.json", "g.png", "h.lock",
        "i.yml",
    ];
    for (i, name) in names.iter().enumerate() {
        write_sized(&root.join(name), i * 3 + 1);
    }

    let scanner = scanner_for(root);
    let result = scanner.scan();
    let table = scanner.extension_table();

    assert_eq!(result.top_extensions.len(), 5);
    assert!(table.len() > 5);
    assert_eq!(table.iter().map(|e| e.count).sum::<u64>(), result.total_files);
    assert_eq!(
        table.iter().map(|e| e.total_size).sum::<u64>(),
        result.total_size
    );
    assert!(table.iter().any(|e| e.extension == NO_EXTENSION));
    assert!(
        result
            .top_extensions
            .windows(2)
            .all(|w| w[0].count >= w[1].count)
    );
}

#[test]
fn test_only_empty_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_sized(&root.join("one"), 0);
    write_sized(&root.join("two"), 0);

    let result = scanner_for(root).scan();

    assert_eq!(result.total_files, 2);
    assert!(result.smallest_file.is_none());
    assert_eq!(result.largest_file.unwrap().size, 0);
}

#[test]
fn test_missing_root_counts_an_error() {
    let temp = TempDir::new().unwrap();
    let result = scanner_for(temp.path()).start(temp.path().join("does-not-exist"));

    assert_eq!(result.total_files, 0);
    assert_eq!(result.total_dirs, 0);
    assert_eq!(result.total_errors, 1);
    assert!(!result.cancelled);
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_counts_an_error() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let locked = root.join("locked");
    fs::create_dir(&locked).unwrap();
    write_sized(&locked.join("secret.txt"), 7);
    write_sized(&root.join("ok.txt"), 3);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the directory anyway.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let scanner = scanner_for(root);
    let mut rx = scanner.subscribe();
    let result = scanner.scan();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(result.total_files, 1);
    assert_eq!(result.total_dirs, 2);
    assert_eq!(result.total_size, 3);
    assert_eq!(result.total_errors, 1);
    assert!(result.has_errors());

    let mut last: Option<ScanProgress> = None;
    loop {
        match rx.try_recv() {
            Ok(progress) => last = Some(progress),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    let last = last.unwrap();
    assert!(last.done);
    assert_eq!(last.errors_count, 1);
    assert!(last.last_error.contains("locked"));
}

#[test]
fn test_stop_right_after_start() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let mut true_files = 0;
    for d in 0..20 {
        let dir = root.join(format!("d{d}"));
        fs::create_dir(&dir).unwrap();
        for f in 0..50 {
            write_sized(&dir.join(format!("f{f}.dat")), f);
            true_files += 1;
        }
    }

    let scanner = Arc::new(scanner_for(root));
    let handle = {
        let scanner = Arc::clone(&scanner);
        std::thread::spawn(move || scanner.scan())
    };
    scanner.stop();
    let result = handle.join().unwrap();

    assert!(result.total_files <= true_files);
    assert!(result.total_dirs <= 21);
    assert!(scanner.is_stopped());
}

#[test]
fn test_stop_handle_before_scan() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for d in 0..10 {
        let dir = root.join(format!("d{d}"));
        fs::create_dir(&dir).unwrap();
        for f in 0..20 {
            write_sized(&dir.join(format!("f{f}")), 1);
        }
    }

    let scanner = scanner_for(root);
    let stop = scanner.stop_handle();
    stop.stop();
    assert!(stop.is_stopped());

    let result = scanner.scan();
    assert!(result.cancelled);
    assert_eq!(result.total_files, 0);
}

#[test]
fn test_progress_final_snapshot_matches_result() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir(root.join("sub")).unwrap();
    write_sized(&root.join("sub/x.bin"), 128);
    write_sized(&root.join("y.bin"), 64);

    let scanner = scanner_for(root);
    let mut rx = scanner.subscribe();
    let result = scanner.scan();

    let mut last: Option<ScanProgress> = None;
    loop {
        match rx.try_recv() {
            Ok(progress) => last = Some(progress),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    let last = last.unwrap();
    assert!(last.done);
    assert_eq!(last.files_scanned, result.total_files);
    assert_eq!(last.dirs_scanned, result.total_dirs);
    assert_eq!(last.bytes_scanned, result.total_size);
    assert_eq!(last.errors_count, 0);
}

#[test]
fn test_depth_histogram() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("a/b")).unwrap();
    write_sized(&root.join("top"), 1);
    write_sized(&root.join("a/mid1"), 1);
    write_sized(&root.join("a/mid2"), 1);
    write_sized(&root.join("a/b/deep"), 1);

    let result = scanner_for(root).scan();

    assert_eq!(result.depth_histogram.get(&1), Some(&1));
    assert_eq!(result.depth_histogram.get(&2), Some(&2));
    assert_eq!(result.depth_histogram.get(&3), Some(&1));
    assert_eq!(result.max_depth(), Some(3));
    assert_eq!(
        result.depth_histogram.values().sum::<u64>(),
        result.total_files
    );
}
