//! Page range expressions such as `"1-3, 5, 8-10"`.

use crate::error::EditError;

/// Parse a page range string into sorted, de-duplicated 1-based page numbers.
///
/// Every number is validated against `page_count`.
///
/// # Errors
///
/// Returns [`EditError::InvalidInput`] for malformed numbers, page 0, or
/// reversed ranges, and [`EditError::IndexOutOfRange`] for pages past the
/// end of the document.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>, EditError> {
    let mut pages = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (parse_page(start)?, parse_page(end)?),
            None => {
                let page = parse_page(part)?;
                (page, page)
            }
        };

        if start > end {
            return Err(EditError::InvalidInput(format!(
                "reversed range '{part}'"
            )));
        }
        for page in [start, end] {
            if page > page_count {
                return Err(EditError::IndexOutOfRange {
                    index: page,
                    page_count,
                });
            }
        }
        pages.extend(start..=end);
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

fn parse_page(text: &str) -> Result<usize, EditError> {
    let text = text.trim();
    let page: usize = text
        .parse()
        .map_err(|_| EditError::InvalidInput(format!("invalid page number: '{text}'")))?;
    if page == 0 {
        return Err(EditError::InvalidInput(
            "page 0 is invalid (pages start at 1)".to_string(),
        ));
    }
    Ok(page)
}
