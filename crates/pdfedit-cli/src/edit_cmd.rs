use std::path::Path;

use crate::cli::RotateSpec;
use crate::shared::{fail, open_session, options_from_env, write_result};

pub struct EditArgs<'a> {
    pub rotate: &'a [RotateSpec],
    pub delete: &'a [usize],
    pub order: Option<&'a [usize]>,
    pub normalize_rotation: bool,
}

/// Apply the edits in the fixed order rotate, delete, reorder, then commit.
pub fn run(
    file: &Path,
    output: &Path,
    args: &EditArgs<'_>,
    password: Option<&str>,
) -> Result<(), i32> {
    let mut options = options_from_env()?;
    options.normalize_rotation = args.normalize_rotation;
    let mut session = open_session(file, password, options)?;
    let page_count = session.page_count().unwrap_or(0);

    for spec in args.rotate {
        check_page(spec.page, page_count)?;
        session.rotate(spec.page, spec.direction);
    }
    for &page in args.delete {
        check_page(page, page_count)?;
        session.delete(page);
    }
    if let Some(order) = args.order {
        session.reorder_pages(order).map_err(fail)?;
    }

    tracing::debug!(
        order = ?session.state().map(|s| s.output_order()),
        "edits applied"
    );

    let id = session.commit_edits().map_err(fail)?;
    write_result(&session, id, output)
}

/// Mutators ignore unknown pages; on the command line that is a typo.
fn check_page(page: usize, page_count: usize) -> Result<(), i32> {
    if page == 0 || page > page_count {
        return Err(fail(pdfedit::EditError::IndexOutOfRange {
            index: page,
            page_count,
        }));
    }
    Ok(())
}

pub fn run_rotate(
    file: &Path,
    output: &Path,
    pages: Option<&str>,
    angle: i32,
    password: Option<&str>,
) -> Result<(), i32> {
    let mut session = open_session(file, password, options_from_env()?)?;
    if let Some(range) = pages {
        let page_count = session.page_count().unwrap_or(0);
        let targets = pdfedit::parse_page_range(range, page_count).map_err(fail)?;
        for page in targets {
            session.toggle_page(page);
        }
    }
    let id = session.rotate_pages(angle).map_err(fail)?;
    write_result(&session, id, output)
}
