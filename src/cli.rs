use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::FileType;

/// Command-line arguments for cres.
///
/// Global options select which files are collected and where their
/// dependencies go; the subcommand decides the destination.
#[derive(Parser, Debug)]
#[clap(
    name = "cres",
    version,
    about = "Collect resources such as markdown documents together with the files they reference"
)]
pub struct Args {
    /// Types of file to collect
    #[clap(short = 't', long = "type", value_enum, global = true, default_values_t = vec![FileType::Markdown])]
    pub types: Vec<FileType>,

    /// Collect every eligible file under the source directory and its sub-directories
    #[clap(short, long, global = true)]
    pub recursive: bool,

    /// Path of the config file (default: ~/.cresrc.yml)
    #[clap(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Types of dependency files to put in object storage
    #[clap(long = "dep2obs", visible_alias = "d2o", value_enum, global = true)]
    pub dep2obs: Vec<FileType>,

    /// Collect even when the destination is up to date
    #[clap(short, long, global = true)]
    pub force: bool,

    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy resources to the specified place
    Copy {
        /// Source file, or directory with --recursive
        source: PathBuf,

        /// Destination file, or directory with --recursive
        destination: PathBuf,
    },

    /// Collect resources into the configured repository
    Collect {
        /// Source file, or directory with --recursive
        source: PathBuf,

        /// Key (relative path) inside the repository
        key: String,

        /// Delete source documents after they were collected
        #[clap(short = 'm', long = "move")]
        move_sources: bool,
    },

    /// Move resources to the specified place
    Move {
        /// Source file, or directory with --recursive
        source: PathBuf,

        /// Destination file, or directory with --recursive
        destination: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_copy_defaults() {
        let args = Args::try_parse_from(["cres", "copy", "a.md", "out/b.md"]).unwrap();
        assert_eq!(args.types, vec![FileType::Markdown]);
        assert!(!args.recursive);
        assert!(args.dep2obs.is_empty());
        match args.command {
            Commands::Copy { source, destination } => {
                assert_eq!(source, PathBuf::from("a.md"));
                assert_eq!(destination, PathBuf::from("out/b.md"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let args = Args::try_parse_from([
            "cres", "-r", "-t", "markdown", "-t", "standalone", "--d2o", "standalone", "-c",
            "/etc/cres.yml", "collect", "notes", "blog", "-m",
        ])
        .unwrap();

        assert!(args.recursive);
        assert_eq!(args.types, vec![FileType::Markdown, FileType::Standalone]);
        assert_eq!(args.dep2obs, vec![FileType::Standalone]);
        assert_eq!(args.config, Some(PathBuf::from("/etc/cres.yml")));
        assert!(matches!(args.command, Commands::Collect { move_sources: true, .. }));
    }

    #[test]
    fn test_missing_arguments_rejected() {
        assert!(Args::try_parse_from(["cres", "copy", "a.md"]).is_err());
        assert!(Args::try_parse_from(["cres", "collect", "a.md"]).is_err());
        assert!(Args::try_parse_from(["cres", "-t", "pdf", "copy", "a", "b"]).is_err());
    }
}
