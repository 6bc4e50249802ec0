//! Cursor-driven iteration over paged results.

use tracing::{debug, warn};

use crate::client::Client;
use crate::error::Result;
use crate::request::PagedEndpoint;
use crate::response::{Page, Response};

/// What a page iterator does when a page fails or comes back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Stop quietly on an error or an empty page.
    #[default]
    Stop,
    /// Yield the error once and stop; empty pages are yielded.
    Propagate,
}

/// Iterator over the pages of a paged request.
///
/// Each item is one round trip. Iteration ends after the page whose
/// `next_key` is absent.
pub struct Pages<'c, E> {
    client: &'c Client,
    request: E,
    mode: ErrorMode,
    cursor: Option<String>,
    done: bool,
}

impl<'c, E: PagedEndpoint> Pages<'c, E> {
    pub(crate) fn new(client: &'c Client, mut request: E, mode: ErrorMode) -> Self {
        request.set_start_key(None);
        Self {
            client,
            request,
            mode,
            cursor: None,
            done: false,
        }
    }

    /// Flattens the pages into rows.
    pub fn items<T>(self) -> Items<'c, E, T>
    where
        E: PagedEndpoint<Output = Page<T>>,
    {
        Items {
            pages: self,
            buffered: Vec::new().into_iter(),
        }
    }
}

impl<E, T> Iterator for Pages<'_, E>
where
    E: PagedEndpoint<Output = Page<T>>,
{
    type Item = Result<Response<Page<T>>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let response = match self.client.execute(&self.request) {
            Ok(response) => response,
            Err(err) => {
                self.done = true;
                return match self.mode {
                    ErrorMode::Stop => {
                        debug!(operation = E::NAME, error = %err, "page iteration stopped on error");
                        None
                    }
                    ErrorMode::Propagate => Some(Err(err)),
                };
            }
        };

        if response.data.is_empty() && self.mode == ErrorMode::Stop {
            debug!(operation = E::NAME, "page iteration stopped on empty page");
            self.done = true;
            return None;
        }

        match response.data.next_key.clone() {
            None => self.done = true,
            Some(key) if self.cursor.as_deref() == Some(key.as_str()) => {
                warn!(operation = E::NAME, next_key = %key, "server repeated cursor, stopping");
                self.done = true;
            }
            Some(key) => {
                self.cursor = Some(key.clone());
                self.request.set_start_key(Some(key));
            }
        }
        Some(Ok(response))
    }
}

/// Row-at-a-time view over [`Pages`]. Aggregate-only pages contribute no rows.
pub struct Items<'c, E, T> {
    pages: Pages<'c, E>,
    buffered: std::vec::IntoIter<T>,
}

impl<E, T> Iterator for Items<'_, E, T>
where
    E: PagedEndpoint<Output = Page<T>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffered.next() {
                return Some(Ok(row));
            }
            match self.pages.next()? {
                Ok(response) => self.buffered = response.data.rows.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
