use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub page: usize,
    pub num_pages: usize,
    pub results: Vec<T>,
}

/// Slices `items` into the requested 1-based page.
///
/// A page that is not an integer selects the first page; one out of range
/// selects the last. An empty listing still has one (empty) page.
pub fn paginate<T>(items: Vec<T>, requested: Option<&str>, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let count = items.len();
    let num_pages = count.div_ceil(page_size).max(1);

    let page = match requested.map(|raw| raw.trim().parse::<i64>()) {
        None | Some(Err(_)) => 1,
        Some(Ok(n)) if n >= 1 && (n as u64) <= num_pages as u64 => n as usize,
        Some(Ok(_)) => num_pages,
    };

    let results = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        count,
        page,
        num_pages,
        results,
    }
}
