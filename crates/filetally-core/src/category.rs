//! Static extension to category lookup used by report rendering.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Broad file category shown next to extensions in reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize,
)]
pub enum Category {
    Document,
    Image,
    Video,
    Audio,
    Code,
    Markup,
    Web,
    Data,
    Lockfile,
    Archive,
    Executable,
    Nix,
    Other,
}

static EXTENSIONS: LazyLock<HashMap<&'static str, Category>> = LazyLock::new(|| {
    use Category::*;

    let groups: &[(Category, &[&str])] = &[
        (Document, &[".txt", ".pdf", ".doc", ".docx"]),
        (
            Image,
            &[
                ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".bmp", ".tiff", ".tif",
                ".heic", ".heif", ".ico", ".psd", ".xcf",
            ],
        ),
        (
            Video,
            &[
                ".mp4", ".avi", ".mov", ".mkv", ".webm", ".wmv", ".flv", ".mpeg", ".mpg", ".m4v",
            ],
        ),
        (Audio, &[".mp3", ".wav", ".flac"]),
        (
            Code,
            &[
                ".go", ".js", ".ts", ".py", ".java", ".cpp", ".c", ".h", ".rs", ".rb", ".php",
                ".pl", ".asm", ".hs", ".swift", ".kt", ".kts", ".cs", ".m", ".mm", ".scala",
                ".dart", ".sh", ".bash", ".zsh", ".fish", ".ps1", ".lua", ".r", ".jl", ".s", ".v",
                ".vh", ".sv", ".svh", ".vhdl", ".tcl", ".awk", ".sed", ".nim", ".cr", ".ex",
                ".exs", ".erl", ".clj", ".cljs", ".cljc", ".jsx", ".tsx", ".vue", ".svelte",
                ".ejs", ".erb", ".ipynb", ".rmd", ".ml", ".mli", ".fsi", ".fs", ".fsx", ".f90",
                ".f95", ".f03", ".f08", ".make", ".mk", ".cmake", ".gradle", ".groovy", ".nut",
                ".wat",
            ],
        ),
        (
            Markup,
            &[".md", ".tex", ".bib", ".adoc", ".rst", ".mdx", ".html", ".xhtml"],
        ),
        (Web, &[".css"]),
        (Data, &[".json", ".xml", ".yaml", ".yml", ".csv", ".sql"]),
        (Lockfile, &[".lock"]),
        (
            Archive,
            &[
                ".zip", ".tar", ".gz", ".tar.gz", ".tar.bz2", ".tar.xz", ".rar", ".7z",
            ],
        ),
        (Executable, &[".exe", ".dmg", ".pkg", ".deb", ".rpm"]),
    ];

    groups
        .iter()
        .flat_map(|(category, exts)| exts.iter().map(move |ext| (*ext, *category)))
        .collect()
});

static SPECIAL_FILES: LazyLock<HashMap<&'static str, Category>> = LazyLock::new(|| {
    HashMap::from([
        ("package-lock.json", Category::Data),
        ("pnpm-lock.yaml", Category::Data),
        ("yarn.lock", Category::Lockfile),
        ("Cargo.lock", Category::Lockfile),
        ("flake.lock", Category::Lockfile),
        ("Pipfile.lock", Category::Lockfile),
        ("go.sum", Category::Lockfile),
        ("composer.lock", Category::Lockfile),
        ("Gemfile.lock", Category::Lockfile),
        ("bun.lock", Category::Lockfile),
        ("bun.lockb", Category::Lockfile),
    ])
});

/// Category for an extension such as `".rs"`. Case-insensitive.
pub fn extension_category(ext: &str) -> Category {
    EXTENSIONS
        .get(ext.to_lowercase().as_str())
        .copied()
        .unwrap_or(Category::Other)
}

/// Category for a bare file name, honoring well-known lockfile names.
pub fn file_category(name: &str) -> Category {
    if let Some(category) = SPECIAL_FILES.get(name) {
        return *category;
    }
    if name.starts_with("flake.") || name.ends_with(".nix") {
        return Category::Nix;
    }
    match name.rfind('.') {
        Some(idx) => extension_category(&name[idx..]),
        None => Category::Other,
    }
}
