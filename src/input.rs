// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/input.rs - 关键点流输入
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

use std::collections::VecDeque;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FromUrl;
use crate::config::MAX_FPS;
use crate::landmark::{LandmarkFrame, Landmarks};

/// 按帧序产出关键点的数据源
pub trait LandmarkSource {
  /// 源视频帧率，未知时为 None
  fn fps(&self) -> Option<f64>;
  fn video_name(&self) -> &str;
}

#[cfg(feature = "json_input")]
mod json_input;
#[cfg(feature = "json_input")]
pub use self::json_input::{JsonInputError, JsonLandmarkInput};

#[cfg(feature = "jsonl_input")]
mod jsonl_input;
#[cfg(feature = "jsonl_input")]
pub use self::jsonl_input::{JsonlInputError, JsonlLandmarkInput};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeaderError {
  #[error("归一化坐标需要同时给出画面宽度和高度")]
  MissingDimensions,
  #[error("画面尺寸无效: {width}x{height}")]
  InvalidDimensions { width: f64, height: f64 },
  #[error("帧率无效: {0}")]
  InvalidFps(f64),
}

/// 关键点流的头部信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamHeader {
  #[serde(default)]
  pub video_name: Option<String>,
  #[serde(default)]
  pub fps: Option<f64>,
  #[serde(default)]
  pub width: Option<f64>,
  #[serde(default)]
  pub height: Option<f64>,
  /// 坐标是否为 [0, 1] 的归一化值
  #[serde(default)]
  pub normalized: bool,
}

impl StreamHeader {
  /// 不为正的帧率之后退回默认值，这里只拒绝非有限或过大的帧率
  pub fn validate(&self) -> Result<(), HeaderError> {
    if let Some(fps) = self.fps
      && !(fps.is_finite() && fps <= MAX_FPS)
    {
      return Err(HeaderError::InvalidFps(fps));
    }
    match (self.width, self.height) {
      (Some(width), Some(height)) => {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
          Ok(())
        } else {
          Err(HeaderError::InvalidDimensions { width, height })
        }
      }
      _ if self.normalized => Err(HeaderError::MissingDimensions),
      _ => Ok(()),
    }
  }

  /// 把原始帧转换成像素坐标下的关键点帧，调用前需通过 `validate`
  pub fn to_frame(&self, index: u64, raw: RawFrame) -> LandmarkFrame {
    let scale = |landmarks: Landmarks| match (self.normalized, self.width, self.height) {
      (true, Some(width), Some(height)) => landmarks.scaled(width, height),
      _ => landmarks,
    };
    LandmarkFrame::new(index, raw.face.map(scale), raw.pose.map(scale))
  }
}

/// 输入文件中的单帧记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
  #[serde(default)]
  pub face: Option<Landmarks>,
  #[serde(default)]
  pub pose: Option<Landmarks>,
}

/// 头部没有给出视频名称时，用文件名代替
fn fallback_video_name(url: &url::Url) -> String {
  url
    .path_segments()
    .and_then(|mut segments| segments.next_back())
    .filter(|name| !name.is_empty() && *name != "-")
    .map(|name| {
      urlencoding::decode(name)
        .map(|name| name.into_owned())
        .unwrap_or_else(|_| name.to_string())
    })
    .unwrap_or_else(|| "stdin".to_string())
}

/// 内存中的关键点序列，便于在代码中直接驱动标注流程
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
  video_name: String,
  fps: Option<f64>,
  frames: VecDeque<LandmarkFrame>,
}

impl MemoryInput {
  pub fn new(video_name: impl Into<String>, fps: Option<f64>) -> Self {
    Self {
      video_name: video_name.into(),
      fps,
      frames: VecDeque::new(),
    }
  }

  /// 追加一帧，帧号按追加顺序自动编号
  pub fn push(&mut self, face: Option<Landmarks>, pose: Option<Landmarks>) {
    let index = self.frames.len() as u64;
    self.frames.push_back(LandmarkFrame::new(index, face, pose));
  }

  pub fn len(&self) -> usize {
    self.frames.len()
  }

  pub fn is_empty(&self) -> bool {
    self.frames.is_empty()
  }
}

impl Extend<LandmarkFrame> for MemoryInput {
  fn extend<T: IntoIterator<Item = LandmarkFrame>>(&mut self, iter: T) {
    self.frames.extend(iter);
  }
}

impl LandmarkSource for MemoryInput {
  fn fps(&self) -> Option<f64> {
    self.fps
  }

  fn video_name(&self) -> &str {
    &self.video_name
  }
}

impl Iterator for MemoryInput {
  type Item = Result<LandmarkFrame, Infallible>;

  fn next(&mut self) -> Option<Self::Item> {
    self.frames.pop_front().map(Ok)
  }
}

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "json_input")]
  #[error("JSON 输入错误: {0}")]
  JsonInputError(#[from] JsonInputError),
  #[cfg(feature = "jsonl_input")]
  #[error("JSONL 输入错误: {0}")]
  JsonlInputError(#[from] JsonlInputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum InputWrapper {
  #[cfg(feature = "json_input")]
  Json(JsonLandmarkInput),
  #[cfg(feature = "jsonl_input")]
  Jsonl(JsonlLandmarkInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "json_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == JsonLandmarkInput::SCHEME {
        let input = JsonLandmarkInput::from_url(url)?;
        return Ok(InputWrapper::Json(input));
      }
    }
    #[cfg(feature = "jsonl_input")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == JsonlLandmarkInput::SCHEME {
        let input = JsonlLandmarkInput::from_url(url)?;
        return Ok(InputWrapper::Jsonl(input));
      }
    }
    Err(InputError::SchemeMismatch)
  }
}

impl LandmarkSource for InputWrapper {
  fn fps(&self) -> Option<f64> {
    match self {
      #[cfg(feature = "json_input")]
      InputWrapper::Json(input) => input.fps(),
      #[cfg(feature = "jsonl_input")]
      InputWrapper::Jsonl(input) => input.fps(),
    }
  }

  fn video_name(&self) -> &str {
    match self {
      #[cfg(feature = "json_input")]
      InputWrapper::Json(input) => input.video_name(),
      #[cfg(feature = "jsonl_input")]
      InputWrapper::Jsonl(input) => input.video_name(),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = Result<LandmarkFrame, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "json_input")]
      InputWrapper::Json(input) => input.next().map(|frame| frame.map_err(InputError::from)),
      #[cfg(feature = "jsonl_input")]
      InputWrapper::Jsonl(input) => input.next().map(|frame| frame.map_err(InputError::from)),
    }
  }
}
