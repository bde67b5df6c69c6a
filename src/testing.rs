//! In-memory transport for tests

use crate::fetcher::{FetchError, RemoteBody, Transport};
use std::cell::Cell;
use std::collections::HashMap;
use std::io::{self, Read};
use std::rc::Rc;
use url::Url;

struct FakeFile {
    body: Vec<u8>,
    content_length: Option<u64>,
}

/// Serves fixture pages and files keyed by absolute URL; anything else is a 404
pub(crate) struct FakeTransport {
    pages: HashMap<String, String>,
    files: HashMap<String, FakeFile>,
    page_requests: Rc<Cell<usize>>,
    body_reads: Rc<Cell<usize>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            files: HashMap::new(),
            page_requests: Rc::new(Cell::new(0)),
            body_reads: Rc::new(Cell::new(0)),
        }
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Registers a download whose `Content-Length` matches the body
    pub fn file(self, url: &str, body: &[u8]) -> Self {
        let length = body.len() as u64;
        self.file_with_length(url, body, Some(length))
    }

    pub fn file_with_length(mut self, url: &str, body: &[u8], content_length: Option<u64>) -> Self {
        self.files.insert(
            url.to_string(),
            FakeFile {
                body: body.to_vec(),
                content_length,
            },
        );
        self
    }

    /// Counter of `get_text` calls, shared with the transport
    pub fn page_requests(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.page_requests)
    }

    /// Counter of non-empty reads from download bodies
    pub fn body_reads(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.body_reads)
    }
}

impl Transport for FakeTransport {
    fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        self.page_requests.set(self.page_requests.get() + 1);
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }

    fn open(&self, url: &Url) -> Result<RemoteBody, FetchError> {
        let file = self.files.get(url.as_str()).ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        Ok(RemoteBody {
            content_length: file.content_length,
            reader: Box::new(CountingReader {
                inner: io::Cursor::new(file.body.clone()),
                reads: Rc::clone(&self.body_reads),
            }),
        })
    }
}

struct CountingReader {
    inner: io::Cursor<Vec<u8>>,
    reads: Rc<Cell<usize>>,
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.reads.set(self.reads.get() + 1);
        }
        Ok(n)
    }
}

/// Site fixture: two seasons, season 1 with two episodes
pub(crate) const BASE: &str = "http://example.test/";

pub(crate) const INDEX_HTML: &str = r#"<html><body>
<ul class="seriesPick">
  <li><a href="season1.html">Season One</a></li>
  <li><a href="season2.html">Season Two</a></li>
</ul>
<a href="about.html">About</a>
</body></html>"#;

pub(crate) const SEASON1_HTML: &str = r#"<html><body>
<a href="index.html">Home</a>
<ul>
  <li><a href="season1/ep1.html"><span class="episode">1</span> <span class="title">Introductions</span></a></li>
  <li><a href="season1/ep2.html"><span class="episode">2</span> <span class="title">Greetings</span></a></li>
</ul>
</body></html>"#;

pub(crate) const SEASON2_HTML: &str = r#"<html><body>
<a href="season2/ep1.html"><span class="episode">1</span> Whānau</a>
</body></html>"#;

pub(crate) const EPISODE1_HTML: &str = r#"<html><body>
<div class="maincol">
  <p>Learn to introduce yourself &amp; others.</p>
  <p>Second paragraph.</p>
  <span class="date">- 3 June 2020 -</span>
</div>
<div class="streaming"><a class="download" href="/media/ep1.mp4">Download</a></div>
</body></html>"#;

pub(crate) const EPISODE2_HTML: &str = r#"<html><body>
<div class="maincol">
  <p>Everyday greetings.</p>
  <span class="date">- 10 June 2020 -</span>
</div>
<div class="streaming"><a class="download" href="http://example.test/media/stream">Download</a></div>
</body></html>"#;

/// Transport serving the full fixture site, without any download bodies
pub(crate) fn fixture_site() -> FakeTransport {
    FakeTransport::new()
        .page("http://example.test/index.html", INDEX_HTML)
        .page("http://example.test/season1.html", SEASON1_HTML)
        .page("http://example.test/season2.html", SEASON2_HTML)
        .page("http://example.test/season1/ep1.html", EPISODE1_HTML)
        .page("http://example.test/season1/ep2.html", EPISODE2_HTML)
}
