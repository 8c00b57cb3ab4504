mod common;

use std::fs;

use common::{para, write_simple_docx};
use docx2org::batch::{run_batch, BatchOptions, ConflictPolicy, FileOutcome};
use docx2org::cleaner::CleanOptions;
use docx2org::progress::ConsoleProgress;

fn quiet() -> ConsoleProgress {
    ConsoleProgress::new(false)
}

#[test]
fn converts_directory_and_isolates_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir(root.join("sub")).expect("mkdir");
    write_simple_docx(&root.join("a.docx"), &para("alpha"));
    write_simple_docx(&root.join("b.docx"), &para("1. beta"));
    write_simple_docx(&root.join("sub").join("c.docx"), &para("gamma"));
    fs::write(root.join("broken.docx"), b"garbage").expect("write");
    fs::write(root.join("~$a.docx"), b"lock").expect("write");

    let opts = BatchOptions {
        workers: Some(2),
        ..Default::default()
    };
    let report = run_batch(&[root.to_path_buf()], &opts, &quiet()).expect("batch");
    assert_eq!(report.files.len(), 4);
    assert_eq!(report.summary(), "3 succeeded, 0 skipped, 1 failed");

    let failed = report
        .files
        .iter()
        .find(|f| matches!(f.outcome, FileOutcome::Failed { .. }))
        .expect("failed file");
    assert_eq!(failed.input, root.join("broken.docx"));

    assert_eq!(fs::read_to_string(root.join("a.org")).expect("a"), "alpha");
    assert_eq!(fs::read_to_string(root.join("b.org")).expect("b"), "1. beta");
    assert_eq!(
        fs::read_to_string(root.join("sub").join("c.org")).expect("c"),
        "gamma"
    );
}

#[test]
fn conflict_policies_on_rerun() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_simple_docx(&dir.path().join("doc.docx"), &para("text"));
    let inputs = [input];

    let first = run_batch(&inputs, &BatchOptions::default(), &quiet()).expect("first");
    assert_eq!(first.succeeded(), 1);

    let skip = BatchOptions {
        conflict: ConflictPolicy::Skip,
        ..Default::default()
    };
    let report = run_batch(&inputs, &skip, &quiet()).expect("skip");
    assert_eq!(report.skipped(), 1);

    let report = run_batch(&inputs, &BatchOptions::default(), &quiet()).expect("suffix");
    match &report.files[0].outcome {
        FileOutcome::Converted { output, .. } => {
            assert_eq!(output, &dir.path().join("doc_1.org"))
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    fs::write(dir.path().join("doc.org"), "stale").expect("write");
    let overwrite = BatchOptions {
        conflict: ConflictPolicy::Overwrite,
        ..Default::default()
    };
    run_batch(&inputs, &overwrite, &quiet()).expect("overwrite");
    assert_eq!(
        fs::read_to_string(dir.path().join("doc.org")).expect("read"),
        "text"
    );
}

#[test]
fn output_dir_extension_and_cleaning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let body = [para("- first"), para("- second")].concat();
    let input = write_simple_docx(&dir.path().join("list.docx"), &body);
    let out_dir = dir.path().join("converted");

    let opts = BatchOptions {
        output_dir: Some(out_dir.clone()),
        extension: "txt".to_string(),
        clean: Some(CleanOptions {
            remove_empty_paragraphs: true,
            remove_leading_dashes: true,
        }),
        ..Default::default()
    };
    let report = run_batch(&[input], &opts, &quiet()).expect("batch");
    assert_eq!(report.succeeded(), 1);
    assert_eq!(
        fs::read_to_string(out_dir.join("list.txt")).expect("read"),
        "first\nsecond"
    );
}

#[test]
fn explicit_output_needs_single_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_simple_docx(&dir.path().join("a.docx"), &para("a"));
    let b = write_simple_docx(&dir.path().join("b.docx"), &para("b"));
    let opts = BatchOptions {
        output: Some(dir.path().join("named.org")),
        ..Default::default()
    };
    assert!(run_batch(&[a.clone(), b], &opts, &quiet()).is_err());

    let report = run_batch(&[a], &opts, &quiet()).expect("single");
    assert_eq!(report.succeeded(), 1);
    assert!(dir.path().join("named.org").exists());
}

#[test]
fn overwrite_keeps_colliding_inputs_apart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir(root.join("a")).expect("mkdir");
    fs::create_dir(root.join("b")).expect("mkdir");
    let a = write_simple_docx(&root.join("a").join("x.docx"), &para("from a"));
    let b = write_simple_docx(&root.join("b").join("x.docx"), &para("from b"));
    let out = root.join("out");

    let opts = BatchOptions {
        output_dir: Some(out.clone()),
        conflict: ConflictPolicy::Overwrite,
        workers: Some(2),
        ..Default::default()
    };
    let report = run_batch(&[a, b], &opts, &quiet()).expect("batch");
    assert_eq!(report.summary(), "2 succeeded, 0 skipped, 0 failed");

    let mut contents = vec![
        fs::read_to_string(out.join("x.org")).expect("x"),
        fs::read_to_string(out.join("x_1.org")).expect("x_1"),
    ];
    contents.sort();
    assert_eq!(contents, vec!["from a", "from b"]);
}
