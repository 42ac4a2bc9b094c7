use std::path::Path;

use crate::shared::{fail, open_session, options_from_env, write_result};

pub fn run(file: &Path, output: &Path, pages: &str, password: Option<&str>) -> Result<(), i32> {
    let mut session = open_session(file, password, options_from_env()?)?;
    let id = session.split_range(pages).map_err(fail)?;
    write_result(&session, id, output)
}
