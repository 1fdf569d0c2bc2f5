//! End-to-end display dispatch: magic line -> document -> preview or served frame.

use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::path::Path;
use std::time::{Duration, Instant};

use p5magic_core::config::SketchConfig;
use p5magic_core::MagicError;
use p5magic_serve::{ColabHost, DisplayMode, Dispatcher, FrameSize, LocalHost, NotebookDisplay, PortRange};
use p5magic_sketch::{build_document, OptionParser};

const CELL: &str = "def setup():\n    createCanvas(300, 200)\n\ndef draw():\n    background(30)\n";

#[derive(Default)]
struct RecordingDisplay {
    texts: Vec<String>,
    frames: Vec<(String, FrameSize)>,
}

impl NotebookDisplay for RecordingDisplay {
    fn show_text(&mut self, text: &str) -> p5magic_core::Result<()> {
        self.texts.push(text.to_string());
        Ok(())
    }

    fn show_frame(&mut self, url: &str, size: FrameSize) -> p5magic_core::Result<()> {
        self.frames.push((url.to_string(), size));
        Ok(())
    }
}

fn free_port() -> u16 {
    let l = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    l.local_addr().unwrap().port()
}

fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

fn http_get(port: u16, path: &str) -> String {
    let mut stream = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
    write!(
        stream,
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    )
    .unwrap();
    let mut buf = String::new();
    stream.read_to_string(&mut buf).unwrap();
    buf
}

fn document(line: &str) -> (FrameSize, p5magic_sketch::GeneratedDocument) {
    let parser = OptionParser::new(SketchConfig::default());
    let (opts, doc) = build_document(&parser, line, CELL).unwrap();
    (FrameSize::from(&opts), doc)
}

#[test]
fn test_preview_mode_shows_markup_only() {
    let tmp = tempfile::tempdir().unwrap();
    let dispatcher = Dispatcher::new(
        Box::new(LocalHost::new(Some(tmp.path().to_path_buf()))),
        PortRange::new(8000, 8099).unwrap(),
        Duration::from_secs(30),
    );
    let (size, doc) = document("300 200");
    let mut display = RecordingDisplay::default();

    let lease = dispatcher
        .dispatch(&doc, size, DisplayMode::Preview, &mut display)
        .unwrap();

    assert!(lease.is_none());
    assert_eq!(display.texts, vec![doc.as_str().to_string()]);
    assert!(display.frames.is_empty());
    assert_eq!(dir_entries(tmp.path()), 0);
}

#[test]
fn test_frame_mode_serves_then_removes_file() {
    let tmp = tempfile::tempdir().unwrap();
    let port = free_port();
    let dispatcher = Dispatcher::new(
        Box::new(LocalHost::new(Some(tmp.path().to_path_buf()))),
        PortRange::new(port, port).unwrap(),
        Duration::from_millis(600),
    );
    let (size, doc) = document("320 240 black true p5 true");
    let mut display = RecordingDisplay::default();

    let lease = dispatcher
        .dispatch(&doc, size, DisplayMode::Frame, &mut display)
        .unwrap()
        .expect("frame mode returns a lease");

    let path = lease.file_path().to_path_buf();
    assert!(path.exists());
    assert!(path.starts_with(tmp.path()));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), doc.as_str());

    assert_eq!(display.frames.len(), 1);
    let (url, frame_size) = &display.frames[0];
    assert_eq!(
        url,
        &format!("http://localhost:{}/{}", port, lease.file_name())
    );
    assert_eq!(
        *frame_size,
        FrameSize {
            width: 320,
            height: 240
        }
    );

    let response = http_get(port, &format!("/{}", lease.file_name()));
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("<script type=\"mpy\">"));

    let started = Instant::now();
    lease.wait();
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!path.exists());
    assert_eq!(dir_entries(tmp.path()), 0);
}

#[test]
fn test_dropped_lease_keeps_serving_until_expiry() {
    let tmp = tempfile::tempdir().unwrap();
    let port = free_port();
    let dispatcher = Dispatcher::new(
        Box::new(LocalHost::new(Some(tmp.path().to_path_buf()))),
        PortRange::new(port, port).unwrap(),
        Duration::from_millis(800),
    );
    let (size, doc) = document("");
    let mut display = RecordingDisplay::default();

    let lease = dispatcher
        .dispatch(&doc, size, DisplayMode::Frame, &mut display)
        .unwrap()
        .unwrap();
    let path = lease.file_path().to_path_buf();
    drop(lease);

    std::thread::sleep(Duration::from_millis(100));
    assert!(path.exists());

    let deadline = Instant::now() + Duration::from_secs(10);
    while path.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(!path.exists());
}

#[test]
fn test_exhausted_ports_leave_nothing_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let holder = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = holder.local_addr().unwrap().port();
    let dispatcher = Dispatcher::new(
        Box::new(LocalHost::new(Some(tmp.path().to_path_buf()))),
        PortRange::new(port, port).unwrap(),
        Duration::from_secs(30),
    );
    let (size, doc) = document("");
    let mut display = RecordingDisplay::default();

    let err = dispatcher
        .dispatch(&doc, size, DisplayMode::Frame, &mut display)
        .unwrap_err();

    assert!(matches!(err, MagicError::ResourceExhausted { .. }));
    assert_eq!(dir_entries(tmp.path()), 0);
    assert!(display.frames.is_empty());
}

#[test]
fn test_host_bridge_error_propagates_before_write() {
    let tmp = tempfile::tempdir().unwrap();
    let port = free_port();
    let dispatcher = Dispatcher::new(
        Box::new(ColabHost::new(Some(tmp.path().to_path_buf()), None)),
        PortRange::new(port, port).unwrap(),
        Duration::from_secs(30),
    );
    let (size, doc) = document("");
    let mut display = RecordingDisplay::default();

    let err = dispatcher
        .dispatch(&doc, size, DisplayMode::Frame, &mut display)
        .unwrap_err();

    assert!(matches!(err, MagicError::Host(_)));
    assert_eq!(dir_entries(tmp.path()), 0);
}

#[test]
fn test_colab_frame_uses_proxy_url() {
    let tmp = tempfile::tempdir().unwrap();
    let port = free_port();
    let dispatcher = Dispatcher::new(
        Box::new(ColabHost::new(
            Some(tmp.path().to_path_buf()),
            Some("https://{port}-kernel.colab.test".to_string()),
        )),
        PortRange::new(port, port).unwrap(),
        Duration::from_millis(300),
    );
    let (size, doc) = document("");
    let mut display = RecordingDisplay::default();

    let mut lease = dispatcher
        .dispatch(&doc, size, DisplayMode::Frame, &mut display)
        .unwrap()
        .unwrap();

    assert_eq!(
        display.frames[0].0,
        format!("https://{}-kernel.colab.test/{}", port, lease.file_name())
    );
    lease.cancel();
    lease.wait();
}
