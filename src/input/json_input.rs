// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/input/json_input.rs - JSON 关键点文件输入
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

use std::iter::Enumerate;
use std::vec::IntoIter;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::input::{HeaderError, LandmarkSource, RawFrame, StreamHeader, fallback_video_name};
use crate::landmark::LandmarkFrame;
use crate::utils::url_path;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum JsonInputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("路径解码失败: {0}")]
  InvalidPath(#[from] std::string::FromUtf8Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("头部信息错误: {0}")]
  HeaderError(#[from] HeaderError),
}

#[derive(Debug, Deserialize)]
struct LandmarkDocument {
  #[serde(flatten)]
  header: StreamHeader,
  #[serde(default)]
  frames: Vec<RawFrame>,
}

/// 整个视频的关键点保存在一个 JSON 文档中
pub struct JsonLandmarkInput {
  video_name: String,
  header: StreamHeader,
  frames: Enumerate<IntoIter<RawFrame>>,
}

impl FromUrlWithScheme for JsonLandmarkInput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonLandmarkInput {
  type Error = JsonInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(JsonInputError::SchemeMismatch(url.scheme().to_string()));
    }

    let path = url_path(url)?;
    let content = std::fs::read_to_string(&path)?;
    let input = Self::from_json(&content, fallback_video_name(url))?;
    info!(
      "读取关键点文件: {} ({} 帧)",
      path.display(),
      input.frames.len()
    );
    Ok(input)
  }
}

impl JsonLandmarkInput {
  /// 从 JSON 文本构建，文档中没有视频名称时使用 `default_name`
  pub fn from_json(content: &str, default_name: String) -> Result<Self, JsonInputError> {
    let document: LandmarkDocument = serde_json::from_str(content)?;
    document.header.validate()?;

    Ok(JsonLandmarkInput {
      video_name: document.header.video_name.clone().unwrap_or(default_name),
      header: document.header,
      frames: document.frames.into_iter().enumerate(),
    })
  }
}

impl LandmarkSource for JsonLandmarkInput {
  fn fps(&self) -> Option<f64> {
    self.header.fps
  }

  fn video_name(&self) -> &str {
    &self.video_name
  }
}

impl Iterator for JsonLandmarkInput {
  type Item = Result<LandmarkFrame, JsonInputError>;

  fn next(&mut self) -> Option<Self::Item> {
    let (index, raw) = self.frames.next()?;
    Some(Ok(self.header.to_frame(index as u64, raw)))
  }
}
