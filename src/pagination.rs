pub const QUESTIONS_PER_PAGE: usize = 10;

/// Returns the 1-based `page` of `records`, at most [`QUESTIONS_PER_PAGE`]
/// long. Pages past the end and page 0 are empty; callers decide whether
/// that means "not found".
pub fn paginate<T>(records: &[T], page: usize) -> &[T] {
    let Some(start) = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE))
    else {
        return &[];
    };
    if start >= records.len() {
        return &[];
    }
    let end = records.len().min(start + QUESTIONS_PER_PAGE);
    &records[start..end]
}
