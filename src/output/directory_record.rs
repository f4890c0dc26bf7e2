// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use chrono::{DateTime, Datelike, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::annotate::AnnotationResponse;
use crate::utils::{sanitize_name, url_path};
use crate::{FromUrl, FromUrlWithScheme, output::Render};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("路径解码失败: {0}")]
  InvalidPath(#[from] std::string::FromUtf8Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 按日期分目录保存每次标注的结果
/// `folder:///records?compact` 写出单行 JSON
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  compact: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let compact = uri.query_pairs().any(|(k, _)| k == "compact");

    Ok(DirectoryRecordOutput {
      directory: url_path(uri)?,
      compact,
    })
  }
}

impl DirectoryRecordOutput {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      compact: false,
    }
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  /// 在 `YYYY/MM/DD/` 下新建记录文件；同一秒内重名时依次追加 `-1`、`-2` 后缀
  fn create_record(
    &self,
    now: DateTime<Utc>,
    video_name: &str,
  ) -> Result<(PathBuf, File), io::Error> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    let stem = format!("{}-{}", now.format("%H-%M-%S"), sanitize_name(video_name));
    for counter in 0..=u16::MAX {
      let name = match counter {
        0 => format!("{}.json", stem),
        n => format!("{}-{}.json", stem, n),
      };
      let path = directory.join(name);
      match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => return Ok((path, file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
        Err(e) => return Err(e),
      }
    }
    Err(io::Error::new(
      io::ErrorKind::AlreadyExists,
      format!("同名记录过多: {}", stem),
    ))
  }
}

impl Render for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, response: &AnnotationResponse) -> Result<(), Self::Error> {
    let (path, file) = self.create_record(Utc::now(), &response.video_name)?;
    let mut writer = BufWriter::new(file);
    if self.compact {
      serde_json::to_writer(&mut writer, response)?;
    } else {
      serde_json::to_writer_pretty(&mut writer, response)?;
    }
    writer.flush()?;
    info!("标注记录已保存: {}", path.display());
    Ok(())
  }
}
