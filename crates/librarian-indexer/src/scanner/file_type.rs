//! File type classification by suffix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical file type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Python,
    JavaScript,
    TypeScript,
    Kotlin,
    Java,
    Go,
    Rust,
    Cpp,
    C,
    CSharp,
    Ruby,
    Php,
    Swift,
    Markdown,
    Json,
    Yaml,
    Xml,
    Html,
    Css,
    Unknown,
}

/// Suffix table. Lookups pick the longest matching suffix.
const REGISTRY: &[(&str, FileType)] = &[
    (".py", FileType::Python),
    (".pyi", FileType::Python),
    (".pyx", FileType::Python),
    (".pxd", FileType::Python),
    (".js", FileType::JavaScript),
    (".mjs", FileType::JavaScript),
    (".cjs", FileType::JavaScript),
    (".jsx", FileType::JavaScript),
    (".ts", FileType::TypeScript),
    (".tsx", FileType::TypeScript),
    (".d.ts", FileType::TypeScript),
    (".kt", FileType::Kotlin),
    (".kts", FileType::Kotlin),
    (".java", FileType::Java),
    (".go", FileType::Go),
    (".rs", FileType::Rust),
    (".cpp", FileType::Cpp),
    (".cxx", FileType::Cpp),
    (".cc", FileType::Cpp),
    (".hpp", FileType::Cpp),
    (".hxx", FileType::Cpp),
    (".h++", FileType::Cpp),
    (".c", FileType::C),
    (".h", FileType::C),
    (".cs", FileType::CSharp),
    (".rb", FileType::Ruby),
    (".php", FileType::Php),
    (".swift", FileType::Swift),
    (".md", FileType::Markdown),
    (".markdown", FileType::Markdown),
    (".json", FileType::Json),
    (".yml", FileType::Yaml),
    (".yaml", FileType::Yaml),
    (".xml", FileType::Xml),
    (".html", FileType::Html),
    (".htm", FileType::Html),
    (".css", FileType::Css),
    (".scss", FileType::Css),
    (".sass", FileType::Css),
    (".less", FileType::Css),
];

impl FileType {
    /// Every registered tag, excluding `Unknown`.
    pub const ALL: [FileType; 19] = [
        FileType::Python,
        FileType::JavaScript,
        FileType::TypeScript,
        FileType::Kotlin,
        FileType::Java,
        FileType::Go,
        FileType::Rust,
        FileType::Cpp,
        FileType::C,
        FileType::CSharp,
        FileType::Ruby,
        FileType::Php,
        FileType::Swift,
        FileType::Markdown,
        FileType::Json,
        FileType::Yaml,
        FileType::Xml,
        FileType::Html,
        FileType::Css,
    ];

    /// The tag as it appears on the wire and on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Python => "python",
            FileType::JavaScript => "javascript",
            FileType::TypeScript => "typescript",
            FileType::Kotlin => "kotlin",
            FileType::Java => "java",
            FileType::Go => "go",
            FileType::Rust => "rust",
            FileType::Cpp => "cpp",
            FileType::C => "c",
            FileType::CSharp => "csharp",
            FileType::Ruby => "ruby",
            FileType::Php => "php",
            FileType::Swift => "swift",
            FileType::Markdown => "markdown",
            FileType::Json => "json",
            FileType::Yaml => "yaml",
            FileType::Xml => "xml",
            FileType::Html => "html",
            FileType::Css => "css",
            FileType::Unknown => "unknown",
        }
    }

    /// Parse a tag, ignoring case. Returns `None` for unrecognized tags.
    pub fn parse(tag: &str) -> Option<FileType> {
        let tag = tag.trim().to_lowercase();
        if tag == "unknown" {
            return Some(FileType::Unknown);
        }
        Self::ALL.iter().copied().find(|t| t.as_str() == tag)
    }

    /// Suffixes registered for this type.
    pub fn suffixes(&self) -> Vec<&'static str> {
        REGISTRY
            .iter()
            .filter(|(_, t)| t == self)
            .map(|(suffix, _)| *suffix)
            .collect()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a file by name.
///
/// Accepts a bare name or a path; only the final segment is considered.
pub fn classify(file_name: &str) -> FileType {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .to_lowercase();

    REGISTRY
        .iter()
        .filter(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
        .max_by_key(|(suffix, _)| suffix.len())
        .map(|(_, file_type)| *file_type)
        .unwrap_or(FileType::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_python() {
        assert_eq!(classify("main.py"), FileType::Python);
        assert_eq!(classify("types.pyi"), FileType::Python);
        assert_eq!(classify("fast.pyx"), FileType::Python);
    }

    #[test]
    fn test_classify_typescript() {
        assert_eq!(classify("index.ts"), FileType::TypeScript);
        assert_eq!(classify("App.tsx"), FileType::TypeScript);
        assert_eq!(classify("globals.d.ts"), FileType::TypeScript);
    }

    #[test]
    fn test_classify_javascript() {
        assert_eq!(classify("index.js"), FileType::JavaScript);
        assert_eq!(classify("App.jsx"), FileType::JavaScript);
        assert_eq!(classify("module.mjs"), FileType::JavaScript);
        assert_eq!(classify("common.cjs"), FileType::JavaScript);
    }

    #[test]
    fn test_classify_config_files() {
        assert_eq!(classify("package.json"), FileType::Json);
        assert_eq!(classify("config.yaml"), FileType::Yaml);
        assert_eq!(classify("config.yml"), FileType::Yaml);
        assert_eq!(classify("pom.xml"), FileType::Xml);
    }

    #[test]
    fn test_classify_c_family() {
        assert_eq!(classify("main.c"), FileType::C);
        assert_eq!(classify("main.h"), FileType::C);
        assert_eq!(classify("main.cc"), FileType::Cpp);
        assert_eq!(classify("vector.h++"), FileType::Cpp);
        assert_eq!(classify("Program.cs"), FileType::CSharp);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify("file.xyz"), FileType::Unknown);
        assert_eq!(classify("noextension"), FileType::Unknown);
        assert_eq!(classify("Cargo.toml"), FileType::Unknown);
    }

    #[test]
    fn test_bare_suffix_is_not_typed() {
        assert_eq!(classify(".py"), FileType::Unknown);
        assert_eq!(classify(".d.ts"), FileType::TypeScript);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("main.PY"), FileType::Python);
        assert_eq!(classify("INDEX.D.TS"), FileType::TypeScript);
        assert_eq!(classify("README.MD"), FileType::Markdown);
    }

    #[test]
    fn test_classify_uses_final_segment() {
        assert_eq!(classify("src/app.py"), FileType::Python);
        assert_eq!(classify("src.py/README"), FileType::Unknown);
    }

    #[test]
    fn test_every_registered_suffix() {
        for (suffix, expected) in REGISTRY {
            let name = format!("file{}", suffix);
            assert_eq!(classify(&name), *expected, "suffix {}", suffix);
        }
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(FileType::parse("python"), Some(FileType::Python));
        assert_eq!(FileType::parse("TypeScript"), Some(FileType::TypeScript));
        assert_eq!(FileType::parse("unknown"), Some(FileType::Unknown));
        assert_eq!(FileType::parse("cobol"), None);
        for t in FileType::ALL {
            assert_eq!(FileType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_serde_tag_matches_as_str() {
        let yaml = serde_yaml::to_string(&FileType::CSharp).unwrap();
        assert_eq!(yaml.trim(), "csharp");
        let parsed: FileType = serde_yaml::from_str("javascript").unwrap();
        assert_eq!(parsed, FileType::JavaScript);
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(FileType::TypeScript.suffixes(), vec![".ts", ".tsx", ".d.ts"]);
        assert!(FileType::Unknown.suffixes().is_empty());
    }
}
