use std::path::Path;

use crate::shared::{fail, open_session, options_from_env, read_file, select_single_page, write_result};

/// Which stamp to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// PNG or JPEG.
    Image,
    /// PNG only.
    Signature,
}

pub fn run(
    file: &Path,
    output: &Path,
    page: usize,
    image: &Path,
    stamp: Stamp,
    password: Option<&str>,
) -> Result<(), i32> {
    let image = read_file(image)?;
    let mut session = open_session(file, password, options_from_env()?)?;
    select_single_page(&mut session, page)?;

    let id = match stamp {
        Stamp::Image => session.insert_image(&image),
        Stamp::Signature => session.sign(&image),
    }
    .map_err(fail)?;
    write_result(&session, id, output)
}
