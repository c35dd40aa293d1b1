//! Archive directory layout.
//!
//! The archive is a fixed two-level category/subcategory tree. The tree is
//! bootstrapped once per run, before any manifest record is processed, so
//! that placements into listed categories never race directory creation.

use std::fs;
use std::io;
use std::path::Path;

/// The static category table: top-level category paired with its
/// subcategories.
pub const CATEGORY_TREE: &[(&str, &[&str])] = &[
    (
        "AI-and-Technology",
        &[
            "AI-Limitations",
            "Tech-Competition",
            "Privacy-Surveillance",
            "Open-Source-AI",
        ],
    ),
    (
        "Media-and-Communication",
        &[
            "Media-Transformation",
            "Social-Platforms",
            "Communication-Frameworks",
        ],
    ),
    (
        "Business-and-Finance",
        &["Luxury-Markets", "Corporate-Ethics", "Marketing-Strategy"],
    ),
    (
        "Society-and-Human-Understanding",
        &[
            "Dehumanization-Propaganda",
            "Impact-vs-Intent",
            "Religion-Narratives",
        ],
    ),
    (
        "Personal-Development",
        &["Generalist-Resources", "Neurodiversity-Tools"],
    ),
];

/// Creates every category/subcategory directory under the archive root.
///
/// Idempotent: existing directories are left alone.
pub fn bootstrap_archive(archive_root: &Path) -> io::Result<()> {
    for (category, subcategories) in CATEGORY_TREE {
        for subcategory in *subcategories {
            fs::create_dir_all(archive_root.join(category).join(subcategory))?;
        }
    }
    Ok(())
}
