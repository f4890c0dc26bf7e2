// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/output/jsonl_output.rs - 逐帧 JSONL 输出
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
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::annotate::{AnnotationResponse, AnnotationStats, FrameLabel};
use crate::output::Render;
use crate::utils::url_path;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum JsonlOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("路径解码失败: {0}")]
  InvalidPath(#[from] std::string::FromUtf8Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("写入器锁已损坏")]
  LockPoisoned,
}

/// 处理完成后的汇总行
#[derive(Serialize)]
struct SummaryLine<'a> {
  video_name: &'a str,
  total_frames: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  eye_f1: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  posture_f1: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  stats: Option<&'a AnnotationStats>,
}

/// 处理失败时代替汇总行写出
#[derive(Serialize)]
struct FailureLine<'a> {
  error: &'a str,
}

/// 每帧产生标签时立即写出一行，最后写出一行汇总
pub struct JsonlOutput {
  path: PathBuf,
  writer: Mutex<BufWriter<File>>,
}

impl FromUrlWithScheme for JsonlOutput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonlOutput {
  type Error = JsonlOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(JsonlOutputError::SchemeMismatch(format!(
        "期望输出方式 '{}', 实际输出方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }
    Self::create(url_path(uri)?)
  }
}

impl JsonlOutput {
  pub fn create(path: impl Into<PathBuf>) -> Result<Self, JsonlOutputError> {
    let path = path.into();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)?;
    info!("逐帧标签写入: {}", path.display());

    Ok(JsonlOutput {
      path,
      writer: Mutex::new(BufWriter::new(file)),
    })
  }

  fn write_line<T: Serialize>(&self, value: &T) -> Result<(), JsonlOutputError> {
    let mut writer = self
      .writer
      .lock()
      .map_err(|_| JsonlOutputError::LockPoisoned)?;
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
  }

  fn flush(&self) -> Result<(), JsonlOutputError> {
    let mut writer = self
      .writer
      .lock()
      .map_err(|_| JsonlOutputError::LockPoisoned)?;
    writer.flush()?;
    Ok(())
  }
}

impl Render for JsonlOutput {
  type Error = JsonlOutputError;

  fn render_frame(&self, label: &FrameLabel) -> Result<(), Self::Error> {
    self.write_line(label)
  }

  fn render_result(&self, response: &AnnotationResponse) -> Result<(), Self::Error> {
    self.write_line(&SummaryLine {
      video_name: &response.video_name,
      total_frames: response.total_frames,
      eye_f1: response.eye_f1,
      posture_f1: response.posture_f1,
      stats: response.stats.as_ref(),
    })?;
    self.flush()?;
    info!("逐帧标签写入完成: {}", self.path.display());
    Ok(())
  }

  fn render_failure(&self, message: &str) -> Result<(), Self::Error> {
    self.write_line(&FailureLine { error: message })?;
    self.flush()?;
    warn!("标注失败，已在 {} 末尾记录错误", self.path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::eye::EyeState;
  use crate::posture::PostureLabel;

  #[test]
  fn one_line_per_frame_then_summary() {
    let path = std::env::temp_dir().join(format!("duanzuo-jsonl-output-{}.jsonl", std::process::id()));
    let output = JsonlOutput::create(&path).unwrap();
    for index in 0..2 {
      output
        .render_frame(&FrameLabel {
          frame_index: index,
          eye_state: EyeState::Open,
          posture: PostureLabel::Calibrating,
        })
        .unwrap();
    }
    let response = AnnotationResponse {
      video_name: "clip".to_string(),
      total_frames: 2,
      labels_per_frame: Default::default(),
      eye_f1: Some(0.5),
      posture_f1: None,
      stats: None,
    };
    output.render_result(&response).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
      .lines()
      .map(|line| serde_json::from_str(line).unwrap())
      .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1]["frame_index"], 1);
    assert_eq!(lines[1]["eye_state"], "Open");
    assert_eq!(lines[2]["total_frames"], 2);
    assert_eq!(lines[2]["eye_f1"], 0.5);
    assert!(lines[2].get("posture_f1").is_none());
    let _ = std::fs::remove_file(&path);
  }

  #[test]
  fn failure_is_marked_after_frames() {
    let path = std::env::temp_dir().join(format!("duanzuo-jsonl-failure-{}.jsonl", std::process::id()));
    let output = JsonlOutput::create(&path).unwrap();
    output
      .render_frame(&FrameLabel {
        frame_index: 0,
        eye_state: EyeState::Open,
        posture: PostureLabel::Calibrating,
      })
      .unwrap();
    output.render_failure("坐姿标定失败").unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
      .lines()
      .map(|line| serde_json::from_str(line).unwrap())
      .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["frame_index"], 0);
    assert_eq!(lines[1]["error"], "坐姿标定失败");
    assert!(lines[1].get("total_frames").is_none());
    let _ = std::fs::remove_file(&path);
  }
}
