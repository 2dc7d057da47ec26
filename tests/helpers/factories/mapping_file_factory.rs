use crate::engine::types::VersionKey;
use crate::shared::path::mapping_path;
use std::path::{Path, PathBuf};

/// Builds ProGuard-style mapping text line by line.
pub struct MappingFileFactory {
    lines: Vec<String>,
}

impl MappingFileFactory {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn with_comment(mut self, text: &str) -> Self {
        self.lines.push(format!("# {}", text));
        self
    }

    pub fn with_blank_line(mut self) -> Self {
        self.lines.push(String::new());
        self
    }

    pub fn with_class(mut self, original: &str, obfuscated: &str) -> Self {
        self.lines.push(format!("{} -> {}:", original, obfuscated));
        self
    }

    /// Adds an indented member line to the most recent class.
    pub fn with_member(mut self, line: &str) -> Self {
        self.lines.push(format!("    {}", line));
        self
    }

    pub fn text(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    pub fn write_to(&self, path: &Path) -> PathBuf {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, self.text()).unwrap();
        path.to_path_buf()
    }

    /// Writes `mapping.txt` into the version layout under `root`.
    pub fn write_version(&self, root: &Path, key: &VersionKey) -> PathBuf {
        self.write_to(&mapping_path(root, key))
    }

    /// A small app with nested classes, an inlined frame and a preamble.
    pub fn sample() -> Self {
        Self::new()
            .with_comment("compiler: R8")
            .with_comment("compiler_version: 8.1.56")
            .with_blank_line()
            .with_class("com.example.app.MainActivity", "a.b.C")
            .with_member("android.widget.TextView label -> a")
            .with_member("1:1:void onCreate(android.os.Bundle):42:42 -> onCreate")
            .with_member("2:2:void crash():50:50 -> b")
            .with_member("2:2:void onCreate(android.os.Bundle):43 -> b")
            .with_class("com.example.app.Outer", "a.b.Outer")
            .with_member("1:1:void run():10:10 -> a")
            .with_comment("inner classes follow")
            .with_blank_line()
            .with_class("com.example.app.Outer$Inner", "a.b.Outer$Inner")
            .with_member("1:1:void call():20:20 -> a")
            .with_class("com.example.app.BadThingException", "x.y.Z")
            .with_member("java.lang.String detail -> a")
            .with_class("com.example.app.Unused", "q.r.S")
            .with_member("1:1:void idle():5:5 -> a")
    }
}

impl Default for MappingFileFactory {
    fn default() -> Self {
        Self::new()
    }
}
