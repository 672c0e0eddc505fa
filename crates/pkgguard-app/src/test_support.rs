use camino::{Utf8Path, Utf8PathBuf};
use pkgguard_domain::ReportSink;
use tempfile::TempDir;

/// A throwaway package directory.
pub struct TempPackage {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl TempPackage {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        Self { _tmp: tmp, root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, contents).expect("write file");
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root.join(rel)).expect("read file")
    }
}

pub fn titles(sink: &ReportSink) -> Vec<&str> {
    sink.violations().iter().map(|v| v.title.as_str()).collect()
}
