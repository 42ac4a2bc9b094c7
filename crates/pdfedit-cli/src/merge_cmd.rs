use std::path::{Path, PathBuf};

use pdfedit::EditSession;

use crate::shared::{fail, options_from_env, read_file, write_result};

pub fn run(files: &[PathBuf], output: &Path) -> Result<(), i32> {
    let inputs = files
        .iter()
        .map(|f| read_file(f))
        .collect::<Result<Vec<_>, i32>>()?;
    let slices: Vec<&[u8]> = inputs.iter().map(Vec::as_slice).collect();

    let mut session = EditSession::new(options_from_env()?);
    let id = session.merge(&slices).map_err(fail)?;
    write_result(&session, id, output)
}
