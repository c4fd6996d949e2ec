use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::{GrError, GrResult};
use crate::handle::auto_ref::AsHandle;
use crate::native::string::string_value;
use crate::native::table::{Object, with_table};
use crate::native::types::{StringRef, UrlRef, require};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Locator {
    File(PathBuf),
    Http(url::Url),
    /// Parsed but not fetchable by this layer (https, ftp, ...).
    Other(url::Url),
}

impl Locator {
    pub(crate) fn parse(s: &str) -> GrResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GrError::validation("empty URL"));
        }
        let url = match url::Url::parse(s) {
            Ok(url) => url,
            // No scheme: a plain file path.
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Ok(Self::File(PathBuf::from(s)));
            }
            Err(e) => return Err(GrError::validation(format!("bad URL '{s}': {e}"))),
        };
        match url.scheme() {
            "file" => {
                if url.path() == "/" {
                    return Err(GrError::validation(format!("file URL without a path: {s}")));
                }
                // Percent-decodes; `file://localhost/x` and `file:///x` both name `/x`.
                let path = url
                    .to_file_path()
                    .map_err(|()| GrError::validation(format!("not a local file URL: {s}")))?;
                Ok(Self::File(path))
            }
            "http" => {
                if url.host().is_none() {
                    return Err(GrError::validation(format!("URL without a host: {s}")));
                }
                Ok(Self::Http(url))
            }
            _ => Ok(Self::Other(url)),
        }
    }

    pub(crate) fn to_url_string(&self) -> String {
        match self {
            Self::File(p) if p.is_absolute() => url::Url::from_file_path(p)
                .map(String::from)
                .unwrap_or_else(|()| p.display().to_string()),
            Self::File(p) => p.display().to_string(),
            Self::Http(url) | Self::Other(url) => url.to_string(),
        }
    }

    pub(crate) fn file_path(&self) -> GrResult<&Path> {
        match self {
            Self::File(p) => Ok(p),
            other => Err(GrError::unsupported(format!(
                "not a file URL: {}",
                other.to_url_string()
            ))),
        }
    }

    /// Read the whole resource.
    pub(crate) fn fetch(&self) -> GrResult<Vec<u8>> {
        match self {
            Self::File(p) => {
                let bytes =
                    std::fs::read(p).with_context(|| format!("read '{}'", p.display()))?;
                Ok(bytes)
            }
            Self::Http(url) => http_get(url),
            Self::Other(url) => Err(GrError::unsupported(format!("cannot fetch URL: {url}"))),
        }
    }
}

/// Plain HTTP/1.0 GET; the response body is everything after the header block.
fn http_get(url: &url::Url) -> GrResult<Vec<u8>> {
    let host = url
        .host()
        .ok_or_else(|| GrError::validation(format!("URL without a host: {url}")))?;
    let port = url.port_or_known_default().unwrap_or(80);
    // Bare address for connecting; `Host` keeps IPv6 brackets and any explicit port.
    let connect_host = match &host {
        url::Host::Domain(d) => (*d).to_owned(),
        url::Host::Ipv4(a) => a.to_string(),
        url::Host::Ipv6(a) => a.to_string(),
    };
    let host_header = match url.port() {
        Some(p) => format!("{host}:{p}"),
        None => host.to_string(),
    };
    let target = match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_owned(),
    };

    let mut stream = TcpStream::connect((connect_host.as_str(), port))
        .with_context(|| format!("connect to {host_header}"))?;
    stream
        .set_read_timeout(Some(HTTP_TIMEOUT))
        .context("set read timeout")?;
    write!(
        stream,
        "GET {target} HTTP/1.0\r\nHost: {host_header}\r\nUser-Agent: grhandle\r\nConnection: close\r\n\r\n"
    )
    .context("send HTTP request")?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .context("read HTTP response")?;

    let head_end = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or_else(|| GrError::decode("malformed HTTP response: no header terminator"))?;
    let head = String::from_utf8_lossy(&response[..head_end]);
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| GrError::decode("malformed HTTP status line"))?;
    if status != 200 {
        return Err(anyhow::anyhow!("GET {url}: HTTP status {status}").into());
    }
    Ok(response.split_off(head_end + 4))
}

/// Create a URL from a string object. Strings without a scheme are file paths.
pub fn url_create_with_string(s: impl AsHandle<StringRef>) -> GrResult<UrlRef> {
    let text = string_value(s)?;
    let locator = Locator::parse(&text)?;
    Ok(with_table(|t| t.insert(Object::Url(locator))))
}

pub fn url_create_from_file_path(path: impl AsRef<Path>) -> UrlRef {
    let locator = Locator::File(path.as_ref().to_path_buf());
    with_table(|t| t.insert(Object::Url(locator)))
}

pub fn url_string(url: impl AsHandle<UrlRef>) -> GrResult<String> {
    locator_of(url).map(|l| l.to_url_string())
}

pub(crate) fn locator_of(url: impl AsHandle<UrlRef>) -> GrResult<Locator> {
    let url = require(url)?;
    with_table(|t| match t.get(url)? {
        Object::Url(l) => Ok(l.clone()),
        _ => Err(GrError::invalid_handle("expected a URL")),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/native/url.rs"]
mod tests;
