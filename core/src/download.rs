// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::Result;

/// Fetches a remote model file to a local path.
///
/// A seam so the conversion procedures can be tested without touching
/// the network.
pub trait Fetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Downloads over HTTP with a blocking GET.
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("GET {} -> {:?}", url, dest);
        let response = reqwest::blocking::get(url)?.error_for_status()?;
        let body = response.bytes()?;
        // Buffer the whole body first so a dropped connection can't
        // leave a truncated file behind.
        fs::write(dest, &body)?;
        Ok(())
    }
}
