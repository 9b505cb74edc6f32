use std::{fs, path::Path};

use image::{ImageFormat, Rgb, RgbImage};
use libmarker::{MarkerHit, Mismatch, ScanOutcome, Scanner};
use markr::{
    find_in_file, load, run_batch, run_case, BatchOutcome, BatchSummary, CaseResult, Failure,
    FatalError, LoadError, TestCase,
};
use mktemp::Temp;

/// Writes a 24 bpp BMP with a thin marker of arm 3 at each corner
fn write_bmp(path: &Path, corners: &[(u32, u32)]) -> anyhow::Result<()> {
    let mut img = RgbImage::from_pixel(32, 24, Rgb([255, 255, 255]));
    for &(x, y) in corners {
        for i in 0..3 {
            img.put_pixel(x + i, y, Rgb([0, 0, 0]));
            img.put_pixel(x, y - i, Rgb([0, 0, 0]));
        }
    }
    img.save_with_format(path, ImageFormat::Bmp)?;
    Ok(())
}

fn run(dir: &Path) -> anyhow::Result<(BatchOutcome, Vec<(String, CaseResult)>)> {
    let mut results = Vec::new();
    let outcome = run_batch(&Scanner::default(), dir, |case, result| {
        results.push((case.name(), result.clone()));
    })?;
    Ok((outcome, results))
}

#[test]
fn load_reports_missing_file() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let dir: &Path = tmp.as_ref();
    let missing = dir.join("missing.bmp");
    assert!(matches!(load(&missing), Err(LoadError::NotFound(p)) if p == missing));

    fs::write(dir.join("data.bin"), b"abc")?;
    assert_eq!(load(&dir.join("data.bin"))?, b"abc");
    Ok(())
}

#[test]
fn find_in_file_outcomes() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let dir: &Path = tmp.as_ref();
    let scanner = Scanner::default();

    let (outcome, hits) = find_in_file(&scanner, &dir.join("missing.bmp"));
    assert_eq!(outcome, ScanOutcome::Unreadable);
    assert!(hits.is_empty());

    let text = dir.join("text.bmp");
    fs::write(&text, "hello")?;
    assert_eq!(find_in_file(&scanner, &text).0, ScanOutcome::NotABitmap);

    let image = dir.join("one.bmp");
    write_bmp(&image, &[(10, 20)])?;
    let (outcome, hits) = find_in_file(&scanner, &image);
    assert_eq!(outcome, ScanOutcome::Success(1));
    assert_eq!(hits.as_slice(), &[MarkerHit::new(10, 20)]);
    Ok(())
}

#[test]
fn missing_directory_is_created() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let base: &Path = tmp.as_ref();
    let dir = base.join("tests");
    let (outcome, results) = run(&dir)?;
    assert_eq!(outcome, BatchOutcome::DirectoryCreated);
    assert!(results.is_empty());
    assert!(dir.is_dir());

    let (outcome, _) = run(&dir)?;
    assert_eq!(outcome, BatchOutcome::Completed(BatchSummary::default()));
    Ok(())
}

#[test]
fn batch_counts_passed_failed_and_skipped() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let dir: &Path = tmp.as_ref();

    write_bmp(&dir.join("a_pass.bmp"), &[(10, 20), (3, 5)])?;
    fs::write(dir.join("a_pass.o"), "3, 5\r\n10, 20\r\n")?;

    write_bmp(&dir.join("b_fail.BMP"), &[(10, 20)])?;
    fs::write(dir.join("b_fail.o"), "10, 20\n5, 5\n")?;

    write_bmp(&dir.join("c_skip.bmp"), &[(10, 20)])?;

    fs::write(dir.join("d_text.bmp"), "not a bitmap")?;
    fs::write(dir.join("d_text.o"), "")?;

    // ignored: not a bitmap name
    fs::write(dir.join("notes.txt"), "10, 20")?;
    fs::write(dir.join("e.o"), "10, 20")?;

    let (outcome, results) = run(dir)?;
    assert_eq!(
        outcome,
        BatchOutcome::Completed(BatchSummary {
            found: 4,
            passed: 1,
            failed: 2,
            skipped: 1,
        })
    );
    assert_eq!(
        results,
        vec![
            ("a_pass.bmp".to_owned(), CaseResult::Passed),
            (
                "b_fail.BMP".to_owned(),
                CaseResult::Failed(Failure::Mismatch(Mismatch::TooManyLines { hits: 1 }))
            ),
            ("c_skip.bmp".to_owned(), CaseResult::Skipped),
            (
                "d_text.bmp".to_owned(),
                CaseResult::Failed(Failure::NotABitmap)
            ),
        ]
    );
    Ok(())
}

#[test]
fn malformed_expected_file_fails_the_case() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let dir: &Path = tmp.as_ref();
    write_bmp(&dir.join("m.bmp"), &[(10, 20)])?;
    fs::write(dir.join("m.o"), "10; 20\n")?;

    let (outcome, results) = run(dir)?;
    assert!(matches!(
        outcome,
        BatchOutcome::Completed(BatchSummary { failed: 1, .. })
    ));
    assert!(matches!(
        &results[0].1,
        CaseResult::Failed(Failure::Mismatch(Mismatch::MalformedLine { line: 1, .. }))
    ));
    Ok(())
}

#[test]
fn vanished_files_are_fatal() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let dir: &Path = tmp.as_ref();
    let scanner = Scanner::default();

    let case = TestCase::new(dir.join("gone.bmp"));
    assert!(matches!(
        run_case(&scanner, &case),
        Err(FatalError::ImageVanished { .. })
    ));

    write_bmp(&dir.join("half.bmp"), &[(10, 20)])?;
    let case = TestCase::new(dir.join("half.bmp"));
    assert!(matches!(
        run_case(&scanner, &case),
        Err(FatalError::ExpectedVanished { .. })
    ));

    fs::write(dir.join("half.o"), "10, 20\n")?;
    assert_eq!(run_case(&scanner, &case)?, CaseResult::Passed);
    Ok(())
}

#[test]
fn unusable_directory_is_fatal() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let base: &Path = tmp.as_ref();
    let file = base.join("plain");
    fs::write(&file, "not a directory")?;

    let result = run_batch(&Scanner::default(), &file, |_, _| {});
    assert!(matches!(result, Err(FatalError::Directory { path, .. }) if path == file));
    Ok(())
}
