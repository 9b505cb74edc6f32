use std::{
    fs, io,
    path::{Path, PathBuf},
};

use libmarker::{verify, MarkerHitList, Mismatch, ScanOutcome, Scanner, Verdict};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Extension of the files holding the expected output of a bitmap
pub const EXPECTED_EXTENSION: &str = "o";

#[derive(Error, Debug)]
#[non_exhaustive]
/// Errors returned when a file cannot be read into memory
pub enum LoadError {
    /// The file does not exist
    #[error("'{}' not found", .0.display())]
    NotFound(PathBuf),
    /// The file exists but could not be read
    #[error("unable to read '{}'", path.display())]
    Io {
        /// the file
        path: PathBuf,
        /// underlying error
        source: io::Error,
    },
}

#[derive(Error, Debug)]
#[non_exhaustive]
/// Errors that abort a batch run: the test directory changed while it was being read
pub enum FatalError {
    /// A bitmap listed in the directory could no longer be read
    #[error("file '{}' deleted during execution", path.display())]
    ImageVanished {
        /// the bitmap
        path: PathBuf,
        /// underlying error
        source: LoadError,
    },
    /// An expected output file found in the directory could no longer be read
    #[error("file '{}' deleted during execution", path.display())]
    ExpectedVanished {
        /// the expected output file
        path: PathBuf,
        /// underlying error
        source: io::Error,
    },
    /// The test directory could not be listed or created
    #[error("unable to access directory '{}'", path.display())]
    Directory {
        /// the directory
        path: PathBuf,
        /// underlying error
        source: io::Error,
    },
}

/// Reads the whole file at `path` into memory
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if the file does not exist and [`LoadError::Io`] for any
/// other read failure
pub fn load(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_owned()),
        _ => LoadError::Io {
            path: path.to_owned(),
            source,
        },
    })
}

/// Loads the file at `path` and scans it for markers
///
/// Files that cannot be read are reported as [`ScanOutcome::Unreadable`] with an empty list.
/// The file contents are dropped as soon as the scan returns.
#[instrument(skip(scanner))]
pub fn find_in_file(scanner: &Scanner, path: &Path) -> (ScanOutcome, MarkerHitList) {
    match load(path) {
        Ok(buffer) => scanner.scan(&buffer),
        Err(e) => {
            debug!("{e}");
            (
                ScanOutcome::Unreadable,
                MarkerHitList::new(scanner.capacity()),
            )
        }
    }
}

/// A bitmap and the file holding its expected output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// the bitmap
    pub image: PathBuf,
    /// the expected output, `<stem>.o` next to the bitmap
    pub expected: PathBuf,
}

impl TestCase {
    /// Pairs `image` with its expected output file
    #[must_use]
    pub fn new(image: PathBuf) -> Self {
        let expected = image.with_extension(EXPECTED_EXTENSION);
        Self { image, expected }
    }

    /// Returns the file name of the bitmap
    #[must_use]
    pub fn name(&self) -> String {
        self.image
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }
}

/// Why a test case failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The bitmap could not be parsed
    NotABitmap,
    /// The markers found do not match the expected output
    Mismatch(Mismatch),
}

/// The result of a single test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseResult {
    /// The markers found match the expected output
    Passed,
    /// See [`Failure`]
    Failed(Failure),
    /// No expected output file exists for the bitmap
    Skipped,
}

/// Counts of a batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// number of bitmaps found
    pub found: usize,
    /// number of passed test cases
    pub passed: usize,
    /// number of failed test cases
    pub failed: usize,
    /// number of bitmaps without an expected output file
    pub skipped: usize,
}

impl BatchSummary {
    fn record(&mut self, result: &CaseResult) {
        self.found += 1;
        match result {
            CaseResult::Passed => self.passed += 1,
            CaseResult::Failed(_) => self.failed += 1,
            CaseResult::Skipped => self.skipped += 1,
        }
    }
}

/// What a batch run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The test directory did not exist and was created
    DirectoryCreated,
    /// Every bitmap in the directory was processed
    Completed(BatchSummary),
}

// `name.bmp`, extension matched case-insensitively, non-empty stem
fn is_bitmap_name(path: &Path) -> bool {
    let has_stem = path.file_stem().is_some_and(|s| !s.is_empty());
    let is_bmp = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("bmp"));
    has_stem && is_bmp
}

/// Lists the bitmaps in `dir`, sorted by file name
///
/// # Errors
///
/// This function errors if the directory cannot be read
pub fn discover(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_bitmap_name(&path) && path.is_file() {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Scans the bitmap of `case` and compares the markers found with its expected output
///
/// # Errors
///
/// Returns a [`FatalError`] if either file cannot be read. [`run_batch`] only runs cases whose
/// expected output file exists, so for it this means the file vanished mid-run.
#[instrument(skip(scanner))]
pub fn run_case(scanner: &Scanner, case: &TestCase) -> Result<CaseResult, FatalError> {
    let buffer = load(&case.image).map_err(|source| FatalError::ImageVanished {
        path: case.image.clone(),
        source,
    })?;
    let (outcome, hits) = scanner.scan(&buffer);
    drop(buffer);
    debug!("{}: {}", case.image.display(), outcome.as_str());
    if outcome == ScanOutcome::NotABitmap {
        return Ok(CaseResult::Failed(Failure::NotABitmap));
    }
    if hits.is_truncated() {
        warn!("'{}' holds more markers than reported", case.image.display());
    }

    let expected = fs::read(&case.expected).map_err(|source| FatalError::ExpectedVanished {
        path: case.expected.clone(),
        source,
    })?;
    let expected = String::from_utf8_lossy(&expected);
    match verify(hits.as_slice(), &expected) {
        Verdict::Pass => Ok(CaseResult::Passed),
        Verdict::Fail(mismatch) => {
            info!("'{}': {mismatch}", case.image.display());
            Ok(CaseResult::Failed(Failure::Mismatch(mismatch)))
        }
    }
}

/// Runs every bitmap in `dir` against its expected output file
///
/// `on_case` is called after each bitmap with its test case and result. If `dir` does not
/// exist it is created and nothing is run.
///
/// # Errors
///
/// Returns a [`FatalError`] if the directory cannot be listed or created, or if a file
/// disappears while the batch runs. Results reported before the error stand.
pub fn run_batch(
    scanner: &Scanner,
    dir: &Path,
    mut on_case: impl FnMut(&TestCase, &CaseResult),
) -> Result<BatchOutcome, FatalError> {
    let directory_error = |source| FatalError::Directory {
        path: dir.to_owned(),
        source,
    };
    if !dir.is_dir() {
        info!("creating test directory {}", dir.display());
        fs::create_dir_all(dir).map_err(directory_error)?;
        return Ok(BatchOutcome::DirectoryCreated);
    }

    let mut summary = BatchSummary::default();
    for image in discover(dir).map_err(directory_error)? {
        let case = TestCase::new(image);
        let result = if case.expected.is_file() {
            run_case(scanner, &case)?
        } else {
            debug!("no expected output at {}", case.expected.display());
            CaseResult::Skipped
        };
        summary.record(&result);
        on_case(&case, &result);
    }
    info!("{summary:?}");
    Ok(BatchOutcome::Completed(summary))
}
