//! Destination paths for exported pixel files.
//!
//! Exported images are laid out on disk by the server-side hierarchy they
//! came from:
//!
//! ```text
//! pixel_images/<name>-<image>.tiff
//! pixel_images/Dataset-<d>/<name>-<image>.tiff
//! pixel_images/Project-<p>/Dataset-<d>/<name>-<image>.tiff
//! pixel_images/Plate-<p>/<well>-<image>.tiff
//! pixel_images/Screen-<s>/Plate-<p>/<well>-<image>.tiff
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TranscodeError;
use crate::ids::SourceId;

/// Top-level directory of the layout.
pub const PIXEL_ROOT: &str = "pixel_images";

const PIXEL_EXTENSION: &str = "tiff";

/// Container levels of the server hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HierarchyKind {
    Screen,
    Plate,
    Dataset,
    Project,
    Image,
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HierarchyKind::Screen => "Screen",
            HierarchyKind::Plate => "Plate",
            HierarchyKind::Dataset => "Dataset",
            HierarchyKind::Project => "Project",
            HierarchyKind::Image => "Image",
        };
        f.write_str(name)
    }
}

impl FromStr for HierarchyKind {
    type Err = TranscodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "screen" => Ok(HierarchyKind::Screen),
            "plate" => Ok(HierarchyKind::Plate),
            "dataset" => Ok(HierarchyKind::Dataset),
            "project" => Ok(HierarchyKind::Project),
            "image" => Ok(HierarchyKind::Image),
            _ => Err(TranscodeError::invalid("hierarchy kind", s)),
        }
    }
}

/// Where one image sits in the server hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ImagePlacement {
    Image {
        image: SourceId,
        name: String,
    },
    Dataset {
        dataset: u64,
        image: SourceId,
        name: String,
    },
    Project {
        project: u64,
        dataset: u64,
        image: SourceId,
        name: String,
    },
    Plate {
        plate: u64,
        well: String,
        image: SourceId,
    },
    Screen {
        screen: u64,
        plate: u64,
        well: String,
        image: SourceId,
    },
}

impl ImagePlacement {
    pub fn kind(&self) -> HierarchyKind {
        match self {
            ImagePlacement::Image { .. } => HierarchyKind::Image,
            ImagePlacement::Dataset { .. } => HierarchyKind::Dataset,
            ImagePlacement::Project { .. } => HierarchyKind::Project,
            ImagePlacement::Plate { .. } => HierarchyKind::Plate,
            ImagePlacement::Screen { .. } => HierarchyKind::Screen,
        }
    }

    pub fn image(&self) -> SourceId {
        match self {
            ImagePlacement::Image { image, .. }
            | ImagePlacement::Dataset { image, .. }
            | ImagePlacement::Project { image, .. }
            | ImagePlacement::Plate { image, .. }
            | ImagePlacement::Screen { image, .. } => *image,
        }
    }

    /// Destination of the image's pixel file, relative to the output folder.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(PIXEL_ROOT);
        match self {
            ImagePlacement::Image { image, name } => {
                path.push(named_file(name, *image));
            }
            ImagePlacement::Dataset {
                dataset,
                image,
                name,
            } => {
                path.push(format!("Dataset-{dataset}"));
                path.push(named_file(name, *image));
            }
            ImagePlacement::Project {
                project,
                dataset,
                image,
                name,
            } => {
                path.push(format!("Project-{project}"));
                path.push(format!("Dataset-{dataset}"));
                path.push(named_file(name, *image));
            }
            ImagePlacement::Plate { plate, well, image } => {
                path.push(format!("Plate-{plate}"));
                path.push(named_file(well, *image));
            }
            ImagePlacement::Screen {
                screen,
                plate,
                well,
                image,
            } => {
                path.push(format!("Screen-{screen}"));
                path.push(format!("Plate-{plate}"));
                path.push(named_file(well, *image));
            }
        }
        path
    }
}

/// Keeps only characters that are safe in a file name on every platform:
/// ASCII letters and digits, space, and `-_.()`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')' | ' '))
        .collect()
}

fn named_file(label: &str, image: SourceId) -> String {
    format!("{}-{}.{PIXEL_EXTENSION}", sanitize_name(label), image)
}

/// The pixel file an export writes for one image, before it is placed.
pub fn staged_file_name(image: SourceId) -> String {
    format!("{image}.{PIXEL_EXTENSION}")
}

/// Destination paths for all placements, ordered by image identifier.
pub fn destination_paths(placements: &[ImagePlacement]) -> Vec<(SourceId, PathBuf)> {
    let mut paths: Vec<_> = placements
        .iter()
        .map(|p| (p.image(), p.relative_path()))
        .collect();
    paths.sort_by_key(|(image, _)| *image);
    paths
}

/// Moves staged pixel files (`<staging>/<image>.tiff`) to their place
/// under `dest_root`, creating directories as needed.
///
/// Returns the relative destination paths in image identifier order.
pub fn move_into_layout(
    placements: &[ImagePlacement],
    staging: &Path,
    dest_root: &Path,
) -> Result<Vec<PathBuf>, TranscodeError> {
    let mut moved = Vec::with_capacity(placements.len());
    for (image, relative) in destination_paths(placements) {
        let from = staging.join(staged_file_name(image));
        let to = dest_root.join(&relative);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)?;
        log::debug!("moved {} to {}", from.display(), to.display());
        moved.push(relative);
    }
    Ok(moved)
}
