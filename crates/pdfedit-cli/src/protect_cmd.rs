use std::path::Path;

use crate::shared::{fail, open_session, options_from_env, write_result};

pub fn run(
    file: &Path,
    output: &Path,
    new_password: &str,
    password: Option<&str>,
) -> Result<(), i32> {
    let mut session = open_session(file, password, options_from_env()?)?;
    let id = session.protect(new_password).map_err(fail)?;
    write_result(&session, id, output)
}
