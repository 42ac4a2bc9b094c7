use std::path::Path;

use pdfedit::{EditError, EditOptions, EditSession, ResultId};

/// Print an error to stderr and return the process exit code.
pub fn fail(err: impl std::fmt::Display) -> i32 {
    eprintln!("Error: {err}");
    1
}

/// Read a file with user-friendly error messages.
pub fn read_file(file: &Path) -> Result<Vec<u8>, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    std::fs::read(file).map_err(|e| fail(format!("cannot read {}: {e}", file.display())))
}

/// Build [`EditOptions`] from `PDFEDIT_MAX_INPUT_BYTES` / `PDFEDIT_MAX_PAGES`.
pub fn options_from_env() -> Result<EditOptions, i32> {
    options_from_lookup(|name| std::env::var(name).ok()).map_err(fail)
}

fn options_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<EditOptions, String> {
    let limit = |name: &str| -> Result<Option<usize>, String> {
        lookup(name)
            .map(|v| {
                v.trim()
                    .parse()
                    .map_err(|_| format!("{name} must be a positive integer, got '{v}'"))
            })
            .transpose()
    };
    Ok(EditOptions {
        normalize_rotation: false,
        max_input_bytes: limit("PDFEDIT_MAX_INPUT_BYTES")?,
        max_pages: limit("PDFEDIT_MAX_PAGES")?,
    })
}

/// Open a PDF file into a fresh session.
pub fn open_session(
    file: &Path,
    password: Option<&str>,
    options: EditOptions,
) -> Result<EditSession, i32> {
    let bytes = read_file(file)?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    let mut session = EditSession::new(options);
    let loaded = match password {
        Some(pw) => session.load_with_password(&bytes, pw, &filename),
        None => session.load(&bytes, &filename),
    };
    loaded.map_err(|e| match e {
        EditError::PasswordRequired => fail(format!("{e} (use --password)")),
        other => fail(format!("failed to open PDF: {other}")),
    })?;
    Ok(session)
}

/// Select exactly `page`, checking it exists.
pub fn select_single_page(session: &mut EditSession, page: usize) -> Result<(), i32> {
    let page_count = session.page_count().unwrap_or(0);
    if page == 0 || page > page_count {
        return Err(fail(EditError::IndexOutOfRange {
            index: page,
            page_count,
        }));
    }
    session.clear_selection();
    session.toggle_page(page);
    Ok(())
}

/// Write a committed result to `out`.
pub fn write_result(session: &EditSession, id: ResultId, out: &Path) -> Result<(), i32> {
    let result = session
        .results()
        .get(id)
        .ok_or_else(|| fail("result disappeared before it could be written"))?;
    std::fs::write(out, result.data())
        .map_err(|e| fail(format!("cannot write {}: {e}", out.display())))?;
    tracing::info!(
        operation = %result.operation(),
        path = %out.display(),
        bytes = result.data().len(),
        "wrote result"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn options_default_to_no_limits() {
        let options = options_from_lookup(lookup(&[])).unwrap();
        assert_eq!(options, EditOptions::default());
    }

    #[test]
    fn options_read_limits() {
        let options = options_from_lookup(lookup(&[
            ("PDFEDIT_MAX_INPUT_BYTES", "1024"),
            ("PDFEDIT_MAX_PAGES", " 50 "),
        ]))
        .unwrap();
        assert_eq!(options.max_input_bytes, Some(1024));
        assert_eq!(options.max_pages, Some(50));
    }

    #[test]
    fn options_reject_garbage() {
        let err = options_from_lookup(lookup(&[("PDFEDIT_MAX_PAGES", "lots")])).unwrap_err();
        assert!(err.contains("PDFEDIT_MAX_PAGES"));
    }

    #[test]
    fn read_file_not_found() {
        assert_eq!(read_file(Path::new("/nonexistent/file.pdf")), Err(1));
    }

    #[test]
    fn fail_returns_exit_code_one() {
        assert_eq!(fail("boom"), 1);
    }
}
