use std::future::Future;

use crate::error::CatalogError;

/// One page of a paginated provider listing. The cursor is whatever token
/// the provider threads between requests: a pageToken for YouTube, a full
/// `next` URL for Spotify, a continuation token for YouTube Music. It lives
/// only for the duration of one retrieval operation.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Drive a pagination loop: request pages while a continuation cursor is
/// present, stopping on the first page without one. The first request is
/// made with no cursor.
///
/// A page failure aborts the loop and hands back everything accumulated so
/// far together with the error, so callers can keep partial results instead
/// of discarding owners wholesale.
pub async fn collect_paged<T, F, Fut>(mut fetch_page: F) -> (Vec<T>, Option<CatalogError>)
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, CatalogError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        match fetch_page(cursor.take()).await {
            Ok(page) => {
                items.extend(page.items);
                match page.next_cursor {
                    Some(next) => cursor = Some(next),
                    None => return (items, None),
                }
            }
            Err(e) => return (items, Some(e)),
        }
    }
}
