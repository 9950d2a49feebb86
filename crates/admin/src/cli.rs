use std::path::PathBuf;

use clap::Parser;
use polyseg_core::importer::MAX_FOLDER_DEPTH;

/// Register every image in a folder as a picture.
#[derive(Debug, Clone, Parser)]
#[command(name = "add-picture-folder", version, about)]
pub struct AddPictureFolderArgs {
    /// Folder to scan for images (recursively).
    pub directory: PathBuf,

    /// Root of all image directories. Pictures are named by their path
    /// relative to this root. Defaults to `directory`.
    #[arg(long = "root-directory", env = "IMAGE_ROOT")]
    pub root_directory: Option<PathBuf>,

    /// Report what would be imported without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum folder nesting depth to descend into.
    #[arg(long, default_value_t = MAX_FOLDER_DEPTH)]
    pub max_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_directory() {
        let args = AddPictureFolderArgs::try_parse_from(["add-picture-folder", "/data/batch1"])
            .unwrap();
        assert_eq!(args.directory, PathBuf::from("/data/batch1"));
        assert!(!args.dry_run);
        assert_eq!(args.max_depth, MAX_FOLDER_DEPTH);
    }

    #[test]
    fn parses_root_and_flags() {
        let args = AddPictureFolderArgs::try_parse_from([
            "add-picture-folder",
            "/data/batch1",
            "--root-directory",
            "/data",
            "--dry-run",
            "--max-depth",
            "2",
        ])
        .unwrap();
        assert_eq!(args.root_directory, Some(PathBuf::from("/data")));
        assert!(args.dry_run);
        assert_eq!(args.max_depth, 2);
    }

    #[test]
    fn directory_is_required() {
        assert!(AddPictureFolderArgs::try_parse_from(["add-picture-folder"]).is_err());
    }
}
