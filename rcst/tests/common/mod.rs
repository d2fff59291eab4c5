use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temporary directory holding requirements files for one test
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        Self { dir }
    }

    /// Write `content` to `name` inside the directory
    pub fn create_file(&self, name: &str, content: &str) {
        fs::write(self.file_path(name), content).expect("Failed to write file");
    }

    /// Absolute path of `name` inside the directory
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// One line of every kind, with comments and indentation
pub fn sample_requirements_txt() -> &'static str {
    r#"# Sample requirements.txt
--index-url https://pypi.org/simple
-r requirements-dev.txt

requests[security]>=2.28.0,<3.0.0  # http
  numpy==1.24.* ; python_version >= "3.9"
./vendor/local-pkg
git+https://github.com/org/repo.git@v1.0#egg=repo
"#
}

/// CRLF terminators, last line unterminated
pub fn sample_crlf_requirements_txt() -> &'static str {
    "# windows\r\nflask==2.0\r\n\r\nclick"
}

/// A bare value that is not a dependency specifier on line 2
pub fn sample_invalid_requirements_txt() -> &'static str {
    "requests==2.0\nthis is not valid\n"
}

pub fn create_temp_project_with(name: &str, content: &str) -> TempProject {
    let project = TempProject::new();
    project.create_file(name, content);
    project
}

pub fn create_temp_project_with_requirements() -> TempProject {
    create_temp_project_with("requirements.txt", sample_requirements_txt())
}
