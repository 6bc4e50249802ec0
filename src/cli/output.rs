use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use locomatix::{Page, PagedEndpoint, Pages, Response};
use serde::Serialize;

/// Where command results go: human lines, or raw bodies with `--raw`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    raw: bool,
}

impl Output {
    pub fn new(raw: bool) -> Self {
        Self { raw }
    }

    /// Prints `message`, or the raw body.
    pub fn status<T>(&self, response: &Response<T>, message: impl Display) {
        if self.raw {
            println!("{}", response.body);
        } else {
            println!("{message}");
        }
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Prints the raw body in `--raw` mode only.
    pub fn body<T>(&self, response: &Response<T>) {
        if self.raw {
            println!("{}", response.body);
        }
    }

    /// Prints a single decoded value as one JSON line.
    pub fn value<T: Serialize>(&self, response: &Response<T>) -> Result<()> {
        if self.raw {
            println!("{}", response.body);
            return Ok(());
        }
        json_line(&response.data)
    }

    /// One JSON line per row, then the aggregate if the page carries one.
    pub fn page<T: Serialize>(&self, response: &Response<Page<T>>) -> Result<()> {
        if self.raw {
            println!("{}", response.body);
            return Ok(());
        }
        for row in &response.data.rows {
            json_line(row)?;
        }
        if let Some(aggregate) = &response.data.aggregate {
            json_line(aggregate)?;
        }
        Ok(())
    }

    /// Prints every page in turn; stops at the first failed page.
    pub fn pages<E, T>(&self, pages: Pages<'_, E>) -> Result<()>
    where
        E: PagedEndpoint<Output = Page<T>>,
        T: Serialize,
    {
        for response in pages {
            self.page(&response?)?;
        }
        Ok(())
    }

    /// Runs `delete` for each item behind a spinner, stopping at the first
    /// failure. Returns how many were deleted.
    pub fn delete_each<I, F>(&self, what: &str, items: &[I], mut delete: F) -> Result<usize>
    where
        I: Display,
        F: FnMut(&I) -> Result<Response<()>>,
    {
        let spinner = spinner(format!("deleting {} {what}", items.len()));
        for (done, item) in items.iter().enumerate() {
            spinner.set_message(format!("deleting {what} {item} ({}/{})", done + 1, items.len()));
            let response = match delete(item) {
                Ok(response) => response,
                Err(err) => {
                    spinner.abandon_with_message(format!("stopped after {done} {what}"));
                    return Err(err);
                }
            };
            if self.raw {
                spinner.suspend(|| println!("{}", response.body));
            }
            spinner.inc(1);
        }
        spinner.finish_and_clear();
        Ok(items.len())
    }
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn json_line<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
