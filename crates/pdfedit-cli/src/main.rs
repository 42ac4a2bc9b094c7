mod cli;
mod edit_cmd;
mod image_cmd;
mod info_cmd;
mod merge_cmd;
mod protect_cmd;
mod shared;
mod split_cmd;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Info {
            ref file,
            ref format,
            ref password,
        } => info_cmd::run(file, format, password.as_deref()),
        Commands::Edit {
            ref file,
            ref output,
            ref rotate,
            ref delete,
            ref order,
            normalize_rotation,
            ref password,
        } => {
            let args = edit_cmd::EditArgs {
                rotate,
                delete,
                order: order.as_deref(),
                normalize_rotation,
            };
            edit_cmd::run(file, output, &args, password.as_deref())
        }
        Commands::Rotate {
            ref file,
            ref output,
            ref pages,
            angle,
            ref password,
        } => edit_cmd::run_rotate(file, output, pages.as_deref(), angle, password.as_deref()),
        Commands::Split {
            ref file,
            ref output,
            ref pages,
            ref password,
        } => split_cmd::run(file, output, pages, password.as_deref()),
        Commands::Merge {
            ref files,
            ref output,
        } => merge_cmd::run(files, output),
        Commands::InsertImage {
            ref file,
            ref output,
            page,
            ref image,
            ref password,
        } => image_cmd::run(
            file,
            output,
            page,
            image,
            image_cmd::Stamp::Image,
            password.as_deref(),
        ),
        Commands::Protect {
            ref file,
            ref output,
            ref new_password,
            ref password,
        } => protect_cmd::run(file, output, new_password, password.as_deref()),
        Commands::Sign {
            ref file,
            ref output,
            page,
            ref signature,
            ref password,
        } => image_cmd::run(
            file,
            output,
            page,
            signature,
            image_cmd::Stamp::Signature,
            password.as_deref(),
        ),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
