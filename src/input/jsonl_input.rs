// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/input/jsonl_input.rs - 按行读取的关键点流输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::input::{HeaderError, LandmarkSource, RawFrame, StreamHeader, fallback_video_name};
use crate::landmark::LandmarkFrame;
use crate::utils::url_path;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum JsonlInputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("路径解码失败: {0}")]
  InvalidPath(#[from] std::string::FromUtf8Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("第 {line} 行解析错误: {source}")]
  LineError {
    line: usize,
    #[source]
    source: serde_json::Error,
  },
  #[error("输入流为空，缺少头部信息")]
  MissingHeader,
  #[error("头部信息错误: {0}")]
  HeaderError(#[from] HeaderError),
}

/// 第一行是头部，之后每行一帧；路径为 `-` 时读取标准输入
pub struct JsonlLandmarkInput {
  video_name: String,
  header: StreamHeader,
  lines: Lines<Box<dyn BufRead + Send>>,
  line_number: usize,
  next_index: u64,
  failed: bool,
}

impl FromUrlWithScheme for JsonlLandmarkInput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonlLandmarkInput {
  type Error = JsonlInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(JsonlInputError::SchemeMismatch(url.scheme().to_string()));
    }

    let reader: Box<dyn BufRead + Send> = if url.path() == "-" {
      info!("从标准输入读取关键点流");
      Box::new(BufReader::new(std::io::stdin()))
    } else {
      let path = url_path(url)?;
      info!("读取关键点流文件: {}", path.display());
      Box::new(BufReader::new(File::open(path)?))
    };

    Self::from_reader(reader, fallback_video_name(url))
  }
}

impl JsonlLandmarkInput {
  pub fn from_reader(
    reader: Box<dyn BufRead + Send>,
    default_name: String,
  ) -> Result<Self, JsonlInputError> {
    let mut input = JsonlLandmarkInput {
      video_name: default_name,
      header: StreamHeader::default(),
      lines: reader.lines(),
      line_number: 0,
      next_index: 0,
      failed: false,
    };

    let line = input
      .next_line()
      .transpose()?
      .ok_or(JsonlInputError::MissingHeader)?;
    let header: StreamHeader =
      serde_json::from_str(&line).map_err(|source| JsonlInputError::LineError {
        line: input.line_number,
        source,
      })?;
    header.validate()?;

    if let Some(name) = &header.video_name {
      input.video_name = name.clone();
    }
    input.header = header;
    Ok(input)
  }

  /// 下一个非空行
  fn next_line(&mut self) -> Option<Result<String, std::io::Error>> {
    loop {
      let line = self.lines.next()?;
      self.line_number += 1;
      match line {
        Ok(line) if line.trim().is_empty() => continue,
        other => return Some(other),
      }
    }
  }

  fn parse_frame(&mut self, line: &str) -> Result<LandmarkFrame, JsonlInputError> {
    let raw: RawFrame = serde_json::from_str(line).map_err(|source| JsonlInputError::LineError {
      line: self.line_number,
      source,
    })?;
    let frame = self.header.to_frame(self.next_index, raw);
    self.next_index += 1;
    Ok(frame)
  }
}

impl LandmarkSource for JsonlLandmarkInput {
  fn fps(&self) -> Option<f64> {
    self.header.fps
  }

  fn video_name(&self) -> &str {
    &self.video_name
  }
}

impl Iterator for JsonlLandmarkInput {
  type Item = Result<LandmarkFrame, JsonlInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    // 出错之后不再继续读取
    if self.failed {
      return None;
    }

    let result = match self.next_line()? {
      Ok(line) => self.parse_frame(&line),
      Err(error) => Err(JsonlInputError::from(error)),
    };
    if let Err(error) = &result {
      error!("读取关键点流失败: {}", error);
      self.failed = true;
    } else {
      debug!("读取第 {} 帧关键点", self.next_index);
    }
    Some(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  fn input(content: &str) -> Result<JsonlLandmarkInput, JsonlInputError> {
    JsonlLandmarkInput::from_reader(
      Box::new(Cursor::new(content.as_bytes().to_vec())),
      "stream".to_string(),
    )
  }

  #[test]
  fn header_then_frames() {
    let source = input(
      "{\"video_name\": \"cam.mp4\", \"fps\": 15}\n\
       {\"face\": {\"1\": [1, 2]}}\n\
       \n\
       {\"face\": null, \"pose\": {\"11\": [0, 0], \"12\": [50, 0]}}\n",
    )
    .unwrap();
    assert_eq!(source.video_name(), "cam.mp4");
    assert_eq!(source.fps(), Some(15.0));

    let frames: Vec<LandmarkFrame> = source.map(|frame| frame.unwrap()).collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].index, 0);
    assert_eq!(frames[1].index, 1);
    assert!(frames[0].face_detected());
    assert!(frames[1].shoulders().is_some());
  }

  #[test]
  fn normalized_stream_is_scaled() {
    let source = input(
      "{\"fps\": 30, \"normalized\": true, \"width\": 100, \"height\": 200}\n\
       {\"pose\": {\"11\": [0.1, 0.5], \"12\": [0.6, 0.5]}}\n",
    )
    .unwrap();
    assert_eq!(source.video_name(), "stream");
    let frames: Vec<LandmarkFrame> = source.map(|frame| frame.unwrap()).collect();
    let (left, right) = frames[0].shoulders().unwrap();
    assert!((left.distance(&right) - 50.0).abs() < 1e-9);
    assert!((left.y - 100.0).abs() < 1e-9);
  }

  #[test]
  fn huge_fps_is_rejected() {
    assert!(matches!(
      input("{\"fps\": 1e12}\n{}\n"),
      Err(JsonlInputError::HeaderError(HeaderError::InvalidFps(_)))
    ));
  }

  #[test]
  fn empty_stream_has_no_header() {
    assert!(matches!(input(""), Err(JsonlInputError::MissingHeader)));
    assert!(matches!(input("\n\n"), Err(JsonlInputError::MissingHeader)));
  }

  #[test]
  fn bad_line_stops_the_stream() {
    let mut source = input("{\"fps\": 30}\n{}\nnot json\n{}\n").unwrap();
    assert!(source.next().unwrap().is_ok());
    match source.next() {
      Some(Err(JsonlInputError::LineError { line, .. })) => assert_eq!(line, 3),
      _ => panic!("期望第 3 行解析错误"),
    }
    assert!(source.next().is_none());
  }
}
