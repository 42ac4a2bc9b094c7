use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pdfedit::RotationDirection;

/// Rotate, delete, reorder, split, merge, stamp, and password-protect PDF pages.
#[derive(Debug, Parser)]
#[command(name = "pdfedit", about, version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG applies otherwise
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show page count, rotation, and size of each page
    Info {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,

        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
    },

    /// Apply page edits (rotate, delete, reorder) and write a new PDF
    Edit {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Rotate a page a quarter-turn, e.g. '3:right'. Repeatable
        #[arg(long = "rotate", value_name = "PAGE:DIR")]
        rotate: Vec<RotateSpec>,

        /// Delete a page. Repeatable
        #[arg(long = "delete", value_name = "PAGE")]
        delete: Vec<usize>,

        /// New page order, listing every original page once (e.g. '1,4,2,3')
        #[arg(long, value_delimiter = ',', value_name = "PAGES")]
        order: Option<Vec<usize>>,

        /// Write rotations wrapped into 0..360
        #[arg(long)]
        normalize_rotation: bool,

        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
    },

    /// Rotate pages by a fixed angle
    Rotate {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Clockwise angle: 90, 180, or 270
        #[arg(long, default_value_t = 90)]
        angle: i32,

        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
    },

    /// Extract pages into a new PDF
    Split {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Page range to extract (e.g. '1,3-5')
        #[arg(long)]
        pages: String,

        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
    },

    /// Concatenate PDFs in the given order
    Merge {
        /// PDF files to merge
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,
    },

    /// Place a PNG or JPEG image at the center of a page
    InsertImage {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Target page (1-based)
        #[arg(long)]
        page: usize,

        /// PNG or JPEG file
        #[arg(long, value_name = "IMG")]
        image: PathBuf,

        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
    },

    /// Write a copy of the PDF that needs a password to open
    Protect {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Password for the new PDF (opens it and grants full permissions)
        #[arg(long, value_name = "PASSWORD")]
        new_password: String,

        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
    },

    /// Place a PNG signature at the center of a page
    Sign {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        /// Target page (1-based)
        #[arg(long)]
        page: usize,

        /// PNG file with the signature
        #[arg(long, value_name = "PNG")]
        signature: PathBuf,

        /// Password for encrypted PDFs
        #[arg(long)]
        password: Option<String>,
    },
}

/// Output format for `info`.
#[derive(Debug, Clone, ValueEnum)]
pub enum TextFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// A `PAGE:DIR` rotation argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotateSpec {
    pub page: usize,
    pub direction: RotationDirection,
}

impl FromStr for RotateSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (page, direction) = s
            .split_once(':')
            .ok_or_else(|| format!("expected PAGE:DIR (e.g. '3:right'), got '{s}'"))?;
        let page = page
            .trim()
            .parse()
            .map_err(|_| format!("invalid page number: '{page}'"))?;
        let direction = direction.parse().map_err(|e: pdfedit::EditError| e.to_string())?;
        Ok(Self { page, direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rotate_spec_parses() {
        let spec: RotateSpec = "3:right".parse().unwrap();
        assert_eq!(spec.page, 3);
        assert_eq!(spec.direction, RotationDirection::Right);

        let spec: RotateSpec = " 2 : L".parse().unwrap();
        assert_eq!(spec.page, 2);
        assert_eq!(spec.direction, RotationDirection::Left);
    }

    #[test]
    fn rotate_spec_rejects_garbage() {
        assert!("3".parse::<RotateSpec>().is_err());
        assert!("x:left".parse::<RotateSpec>().is_err());
        assert!("3:up".parse::<RotateSpec>().is_err());
    }

    #[test]
    fn edit_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "pdfedit", "edit", "in.pdf", "-o", "out.pdf", "--rotate", "3:right", "--rotate",
            "3:right", "--delete", "5", "--order", "1,4,2,3,5",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit {
                rotate,
                delete,
                order,
                ..
            } => {
                assert_eq!(rotate.len(), 2);
                assert_eq!(delete, vec![5]);
                assert_eq!(order, Some(vec![1, 4, 2, 3, 5]));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["pdfedit", "info", "a.pdf", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
