// ─── Diff Export ───
// Packages classified assets into downloadable zip bundles.

use std::io::{Cursor, Write};
use std::sync::Arc;

use tracing::warn;
use zip::write::SimpleFileOptions;

use crate::catalog::model::Edition;
use crate::diff::render::{self, DiffColors};
use crate::diff::VersionDiff;
use crate::error::ToolsResult;

/// One downloadable grouping of classified paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleKind {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl BundleKind {
    pub fn label(&self) -> &'static str {
        match self {
            BundleKind::Added => "Added",
            BundleKind::Removed => "Removed",
            BundleKind::Changed => "Changed",
            BundleKind::Unchanged => "Unchanged",
        }
    }
}

/// Suggested download name, e.g. `Added-1.20.4-to-1.21.1-Java.zip`.
pub fn bundle_file_name(kind: BundleKind, diff: &VersionDiff, edition: Edition) -> String {
    let edition = match edition {
        Edition::Java => "Java",
        Edition::Bedrock => "Bedrock",
    };
    format!(
        "{}-{}-to-{}-{}.zip",
        kind.label(),
        diff.from_id,
        diff.to_id,
        edition
    )
}

/// Zip up one classification bucket. Removed assets only exist in the
/// source version, so their bytes come from the `from` side; everything
/// else ships the `to` side.
pub async fn export_bundle(diff: &Arc<VersionDiff>, kind: BundleKind) -> ToolsResult<Vec<u8>> {
    let diff = Arc::clone(diff);
    tokio::task::spawn_blocking(move || {
        let paths = match kind {
            BundleKind::Added => &diff.classification.added,
            BundleKind::Removed => &diff.classification.removed,
            BundleKind::Changed => &diff.classification.different,
            BundleKind::Unchanged => &diff.classification.same,
        };
        let source = match kind {
            BundleKind::Removed => &diff.from_files,
            _ => &diff.to_files,
        };

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for path in paths {
            let Some(bytes) = source.get(path) else {
                warn!("Asset {} missing from the exported side, skipping", path);
                continue;
            };
            writer.start_file(path.as_str(), SimpleFileOptions::default())?;
            writer.write_all(bytes).map_err(|source| {
                crate::error::ToolsError::Io {
                    path: path.clone().into(),
                    source,
                }
            })?;
        }
        Ok(writer.finish()?.into_inner())
    })
    .await?
}

/// Zip up highlight renderings of every changed asset, plus a README
/// explaining the color legend and listing per-asset warnings. Assets that
/// cannot be rendered (non-image bytes) become warnings, not failures.
pub async fn export_changed_highlighted(
    diff: &Arc<VersionDiff>,
    colors: DiffColors,
) -> ToolsResult<Vec<u8>> {
    let diff = Arc::clone(diff);
    tokio::task::spawn_blocking(move || {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let mut warnings: Vec<String> = Vec::new();

        for path in &diff.classification.different {
            match diff.render_diff_image(path, &colors) {
                Ok(rendered) => {
                    if let Some(warning) = rendered.warning {
                        warnings.push(warning);
                    }
                    writer.start_file(path.as_str(), SimpleFileOptions::default())?;
                    writer.write_all(&rendered.png).map_err(|source| {
                        crate::error::ToolsError::Io {
                            path: path.clone().into(),
                            source,
                        }
                    })?;
                }
                Err(e) => {
                    warn!("Unable to render differences for {}: {}", path, e);
                    warnings.push(format!("Unable to render differences for {path}"));
                }
            }
        }

        let readme = readme_text(&colors, &warnings);
        writer.start_file("README.txt", SimpleFileOptions::default())?;
        writer
            .write_all(readme.as_bytes())
            .map_err(|source| crate::error::ToolsError::Io {
                path: "README.txt".into(),
                source,
            })?;

        Ok(writer.finish()?.into_inner())
    })
    .await?
}

fn readme_text(colors: &DiffColors, warnings: &[String]) -> String {
    let mut text = String::new();
    text.push_str("This archive contains the differences between the two selected versions.\n");
    text.push_str("Pixel Colour Key:\n");
    text.push_str(&format!(
        "- {}: Pixels that are unchanged between From and To.\n",
        render::hex_no_alpha(colors.same)
    ));
    text.push_str(&format!(
        "- {}: Pixels that are different. The opacity shows the magnitude of the difference.\n",
        render::hex_no_alpha(colors.diff)
    ));

    if !warnings.is_empty() {
        text.push_str("\nWarning! Unable to show differences for some assets!\n\n");
        for warning in warnings {
            text.push_str(&format!("- {warning}\n"));
        }
    }

    text
}
