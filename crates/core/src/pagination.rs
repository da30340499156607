use crate::domain::ListContact;
use crate::ports::ListPageSource;
use tracing::{debug, error};

/// Contacts requested per list-membership page.
pub const PAGE_SIZE: u32 = 100;

/// Pages through a CRM list until the source stops offering a cursor.
///
/// A page failure ends the walk: the error is logged and whatever was
/// collected before it is returned.
pub fn fetch_all_contacts<S>(source: &S, page_size: u32) -> Vec<ListContact>
where
    S: ListPageSource + ?Sized,
{
    let mut contacts = Vec::new();
    let mut vid_offset = None;

    loop {
        let page = match source.fetch_page(page_size, vid_offset) {
            Ok(page) => page,
            Err(e) => {
                error!(
                    error = %e,
                    collected = contacts.len(),
                    "list page fetch failed, returning partial results"
                );
                break;
            }
        };

        debug!(
            page_len = page.contacts.len(),
            has_more = page.has_more,
            "fetched list page"
        );
        contacts.extend(page.contacts);

        match page.vid_offset {
            Some(next) if page.has_more => vid_offset = Some(next),
            _ => break,
        }
    }

    contacts
}
