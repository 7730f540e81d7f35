#![allow(dead_code)]

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use csv_charts::aggregate::RankedList;
use csv_charts::dataset::Row;
use csv_charts::render::{ChartStyle, Renderer};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Builds a row from `(field, value)` pairs.
pub fn row(pairs: &[(&str, &str)]) -> Row {
    pairs.iter().copied().collect()
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Clear(String),
    Render {
        target: String,
        entries: Vec<(String, f64)>,
    },
}

/// Renderer that records every call instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    pub fn render_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, RenderEvent::Render { .. }))
            .count()
    }

    pub fn last_render(&self, target: &str) -> Option<&[(String, f64)]> {
        self.events.iter().rev().find_map(|event| match event {
            RenderEvent::Render { target: t, entries } if t == target => Some(entries.as_slice()),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, target: &str) {
        self.events.push(RenderEvent::Clear(target.to_string()));
    }

    fn render(&mut self, target: &str, ranked: &RankedList, _style: &ChartStyle) {
        self.events.push(RenderEvent::Render {
            target: target.to_string(),
            entries: ranked
                .iter()
                .map(|entry| (entry.label.clone(), entry.value))
                .collect(),
        });
    }
}

/// Serves `responses.len()` HTTP requests on a loopback port, one canned
/// `(status line, body)` per connection, then stops. Returns the base URL.
pub fn serve(responses: Vec<(&'static str, String)>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            loop {
                line.clear();
                let read = reader.read_line(&mut line).expect("read request");
                if read == 0 || line == "\r\n" {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            stream.flush().expect("flush response");
        }
    });
    (format!("http://{addr}"), handle)
}
