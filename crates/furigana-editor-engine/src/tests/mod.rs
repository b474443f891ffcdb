use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use crate::convert::{ConvertError, ConvertOptions, Converter, DictionaryConverter};

/// A small dictionary covering the words used across the unit tests
pub fn sample_converter() -> DictionaryConverter {
    DictionaryConverter::from_entries([
        ("漢字", "かんじ"),
        ("書く", "かく"),
        ("今日", "きょう"),
        ("食べる", "たべる"),
        ("日本", "にほん"),
        ("日本語", "にほんご"),
        ("取り扱い", "とりあつかい"),
        ("お茶", "おちゃ"),
    ])
    .unwrap()
}

/// Converter whose every call fails
pub struct FailingConverter;

impl Converter for FailingConverter {
    fn convert(&self, _text: &str, _options: &ConvertOptions) -> Result<String, ConvertError> {
        Err(ConvertError::Failed("analyzer unavailable".to_string()))
    }
}

/// Converter that ignores its input and returns fixed output
pub struct ScriptedConverter {
    output: String,
}

impl ScriptedConverter {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl Converter for ScriptedConverter {
    fn convert(&self, _text: &str, _options: &ConvertOptions) -> Result<String, ConvertError> {
        Ok(self.output.clone())
    }
}

/// Answers a single HTTP request on a local port and returns its URL.
pub fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/basic.tsv", listener.local_addr().unwrap());
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
            line.clear();
        }
        write!(stream, "HTTP/1.1 {status}\r\n").unwrap();
        write!(stream, "Content-Type: text/plain; charset=utf-8\r\n").unwrap();
        write!(stream, "Content-Length: {}\r\n", body.len()).unwrap();
        write!(stream, "Connection: close\r\n\r\n{body}").unwrap();
    });
    url
}
