#![allow(dead_code)]

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Component, Path, PathBuf};

use upa_core::{Confirm, MediaFileService, ServiceError};

#[derive(Debug, Clone)]
pub struct FakeFile {
    pub content: String,
    pub created: DateTime<Local>,
}

/// In-memory media service that records every mutating call.
pub struct FakeService {
    files: RefCell<BTreeMap<PathBuf, FakeFile>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    supported: Vec<String>,
    pub mutations: RefCell<Vec<String>>,
    /// Paths whose removal fails.
    pub locked: RefCell<BTreeSet<PathBuf>>,
    /// Sources whose copy/move fails.
    pub broken: RefCell<BTreeSet<PathBuf>>,
    /// Files whose creation time cannot be read.
    pub broken_times: RefCell<BTreeSet<PathBuf>>,
}

/// Resolve `.` and `..` without touching any filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Local> {
    let naive = NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    Local.from_local_datetime(&naive).single().unwrap()
}

impl FakeService {
    pub fn new(supported: &[&str]) -> Self {
        Self {
            files: RefCell::new(BTreeMap::new()),
            dirs: RefCell::new(BTreeSet::new()),
            supported: supported.iter().map(|s| s.to_string()).collect(),
            mutations: RefCell::new(Vec::new()),
            locked: RefCell::new(BTreeSet::new()),
            broken: RefCell::new(BTreeSet::new()),
            broken_times: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn with_dir(self, dir: &str) -> Self {
        self.dirs.borrow_mut().insert(PathBuf::from(dir));
        self
    }

    pub fn with_file(self, path: &str, content: &str, created: DateTime<Local>) -> Self {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            self.dirs.borrow_mut().insert(parent.to_path_buf());
        }
        self.files.borrow_mut().insert(
            path,
            FakeFile {
                content: content.to_string(),
                created,
            },
        );
        self
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files
            .borrow()
            .get(Path::new(path))
            .map(|f| f.content.clone())
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.borrow().len()
    }

    fn log(&self, entry: String) {
        self.mutations.borrow_mut().push(entry);
    }

    fn get(&self, path: &Path) -> Result<FakeFile, ServiceError> {
        self.files
            .borrow()
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(path.to_path_buf()))
    }

    fn fail_if_broken(&self, source: &Path) -> Result<(), ServiceError> {
        if self.broken.borrow().contains(source) {
            return Err(ServiceError::Io {
                path: source.to_path_buf(),
                message: "device error".to_string(),
            });
        }
        Ok(())
    }
}

impl MediaFileService for FakeService {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(&normalize(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(&normalize(path))
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        normalize(a) == normalize(b)
    }

    fn list_files(
        &self,
        dir: &Path,
        recursive: bool,
        pattern: &Regex,
    ) -> Result<Vec<PathBuf>, ServiceError> {
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|p| {
                if recursive {
                    p.starts_with(dir)
                } else {
                    p.parent() == Some(dir)
                }
            })
            .filter(|p| {
                let name = p.file_name().unwrap().to_string_lossy();
                pattern.is_match(&name)
            })
            .cloned()
            .collect())
    }

    fn supported_extensions(&self) -> &[String] {
        &self.supported
    }

    fn extension_of(&self, path: &Path) -> Result<String, ServiceError> {
        self.get(path)?;
        Ok(path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default())
    }

    fn creation_time(&self, path: &Path) -> Result<DateTime<Local>, ServiceError> {
        if self.broken_times.borrow().contains(path) {
            return Err(ServiceError::Io {
                path: path.to_path_buf(),
                message: "metadata unavailable".to_string(),
            });
        }
        Ok(self.get(path)?.created)
    }

    fn copy(&self, source: &Path, target: &Path) -> Result<(), ServiceError> {
        self.log(format!("copy {} {}", source.display(), target.display()));
        self.fail_if_broken(source)?;
        let file = self.get(source)?;
        self.files.borrow_mut().insert(normalize(target), file);
        Ok(())
    }

    fn move_file(&self, source: &Path, target: &Path) -> Result<(), ServiceError> {
        self.log(format!("move {} {}", source.display(), target.display()));
        self.fail_if_broken(source)?;
        let file = self.get(source)?;
        let mut files = self.files.borrow_mut();
        files.remove(&normalize(source));
        files.insert(normalize(target), file);
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), ServiceError> {
        self.log(format!("remove {}", path.display()));
        if self.locked.borrow().contains(path) {
            return Err(ServiceError::Io {
                path: path.to_path_buf(),
                message: "permission denied".to_string(),
            });
        }
        self.files.borrow_mut().remove(&normalize(path));
        Ok(())
    }

    fn make_directories(&self, path: &Path) -> Result<(), ServiceError> {
        self.log(format!("mkdir {}", path.display()));
        self.dirs.borrow_mut().insert(path.to_path_buf());
        Ok(())
    }
}

/// Confirmer that answers from a script and counts the questions asked.
pub struct ScriptedConfirm {
    answers: RefCell<VecDeque<bool>>,
    pub asked: Cell<usize>,
}

impl ScriptedConfirm {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            asked: Cell::new(0),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, _message: &str) -> bool {
        self.asked.set(self.asked.get() + 1);
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }
}
