use std::path::Path;

use crate::cli::TextFormat;
use crate::shared::{fail, open_session, options_from_env};

pub fn run(file: &Path, format: &TextFormat, password: Option<&str>) -> Result<(), i32> {
    let session = open_session(file, password, options_from_env()?)?;
    let info = session.info().map_err(fail)?;

    match format {
        TextFormat::Text => {
            println!("File: {}", info.filename);
            println!("Pages: {}", info.page_count);
            for page in &info.pages {
                println!("Page {}:", page.number);
                println!("  Dimensions: {:.2} x {:.2}", page.width, page.height);
                println!("  Rotation: {}", page.rotation);
            }
        }
        TextFormat::Json => {
            let json = serde_json::to_string_pretty(&info).map_err(fail)?;
            println!("{json}");
        }
    }
    Ok(())
}
