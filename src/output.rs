// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/output.rs - 输出定义
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

use thiserror::Error;
use url::Url;

use crate::FromUrl;
#[cfg(any(feature = "json_output", feature = "jsonl_output", feature = "directory_record"))]
use crate::FromUrlWithScheme;
use crate::annotate::{AnnotationResponse, FrameLabel};

pub trait Render: Sized {
  type Error;

  /// 每处理完一帧调用一次
  fn render_frame(&self, _label: &FrameLabel) -> Result<(), Self::Error> {
    Ok(())
  }

  /// 整个视频处理完成后调用一次
  fn render_result(&self, response: &AnnotationResponse) -> Result<(), Self::Error>;

  /// 处理中途失败时调用，替代 `render_result`
  fn render_failure(&self, _message: &str) -> Result<(), Self::Error> {
    Ok(())
  }
}

#[cfg(feature = "json_output")]
mod json_output;
#[cfg(feature = "json_output")]
pub use self::json_output::{JsonFileOutput, JsonOutputError, StdoutOutput};

#[cfg(feature = "jsonl_output")]
mod jsonl_output;
#[cfg(feature = "jsonl_output")]
pub use self::jsonl_output::{JsonlOutput, JsonlOutputError};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "json_output")]
  #[error("JSON 输出错误: {0}")]
  JsonOutputError(#[from] JsonOutputError),
  #[cfg(feature = "jsonl_output")]
  #[error("JSONL 输出错误: {0}")]
  JsonlOutputError(#[from] JsonlOutputError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  #[cfg(feature = "json_output")]
  JsonFileOutput(JsonFileOutput),
  #[cfg(feature = "json_output")]
  StdoutOutput(StdoutOutput),
  #[cfg(feature = "jsonl_output")]
  JsonlOutput(JsonlOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecordOutput(DirectoryRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "json_output")]
      JsonFileOutput::SCHEME => {
        let output = JsonFileOutput::from_url(url)?;
        Ok(OutputWrapper::JsonFileOutput(output))
      }
      #[cfg(feature = "json_output")]
      StdoutOutput::SCHEME => {
        let output = StdoutOutput::from_url(url)?;
        Ok(OutputWrapper::StdoutOutput(output))
      }
      #[cfg(feature = "jsonl_output")]
      JsonlOutput::SCHEME => {
        let output = JsonlOutput::from_url(url)?;
        Ok(OutputWrapper::JsonlOutput(output))
      }
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecordOutput(output))
      }
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl Render for OutputWrapper {
  type Error = OutputError;

  fn render_frame(&self, label: &FrameLabel) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "json_output")]
      OutputWrapper::JsonFileOutput(output) => output.render_frame(label).map_err(OutputError::from),
      #[cfg(feature = "json_output")]
      OutputWrapper::StdoutOutput(output) => output.render_frame(label).map_err(OutputError::from),
      #[cfg(feature = "jsonl_output")]
      OutputWrapper::JsonlOutput(output) => output.render_frame(label).map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => {
        output.render_frame(label).map_err(OutputError::from)
      }
    }
  }

  fn render_result(&self, response: &AnnotationResponse) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "json_output")]
      OutputWrapper::JsonFileOutput(output) => output
        .render_result(response)
        .map_err(OutputError::from),
      #[cfg(feature = "json_output")]
      OutputWrapper::StdoutOutput(output) => output
        .render_result(response)
        .map_err(OutputError::from),
      #[cfg(feature = "jsonl_output")]
      OutputWrapper::JsonlOutput(output) => output
        .render_result(response)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_result(response)
        .map_err(OutputError::from),
    }
  }

  fn render_failure(&self, message: &str) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "json_output")]
      OutputWrapper::JsonFileOutput(output) => output
        .render_failure(message)
        .map_err(OutputError::from),
      #[cfg(feature = "json_output")]
      OutputWrapper::StdoutOutput(output) => output
        .render_failure(message)
        .map_err(OutputError::from),
      #[cfg(feature = "jsonl_output")]
      OutputWrapper::JsonlOutput(output) => output
        .render_failure(message)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_failure(message)
        .map_err(OutputError::from),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  #[cfg(feature = "json_output")]
  fn scheme_selects_output() {
    let url = Url::parse("stdout:").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Ok(OutputWrapper::StdoutOutput(_))
    ));

    let url = Url::parse("json:///tmp/duanzuo/result.json").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Ok(OutputWrapper::JsonFileOutput(_))
    ));

    let url = Url::parse("rtsp://127.0.0.1/live").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Err(OutputError::SchemeMismatch)
    ));
  }
}
