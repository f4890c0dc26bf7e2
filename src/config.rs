// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/config.rs - 分类参数配置
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

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::eye::EyeConfig;
use crate::posture::PostureConfig;

pub const DEFAULT_FPS: f64 = 30.0;
/// 高于该值的帧率视为元数据错误
pub const MAX_FPS: f64 = 1000.0;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("配置文件解析错误: {0}")]
  ParseError(#[from] toml::de::Error),
  #[error("配置序列化错误: {0}")]
  SerializeError(#[from] toml::ser::Error),
}

/// 一次标注任务使用的全部参数，缺省字段取默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
  /// 输入源没有给出有效帧率时使用
  pub default_fps: f64,
  pub eye: EyeConfig,
  pub posture: PostureConfig,
}

impl Default for AnnotatorConfig {
  fn default() -> Self {
    Self {
      default_fps: DEFAULT_FPS,
      eye: EyeConfig::default(),
      posture: PostureConfig::default(),
    }
  }
}

impl AnnotatorConfig {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    debug!("读取配置文件: {}", path.display());
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
  }

  pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(self)?;
    fs::write(path, content)?;
    Ok(())
  }

  /// 帧率无效（非有限、不为正或超过 `MAX_FPS`）时退回默认帧率
  pub fn effective_fps(&self, fps: Option<f64>) -> f64 {
    match fps {
      Some(fps) if fps.is_finite() && fps > 0.0 && fps <= MAX_FPS => fps,
      Some(fps) if fps > MAX_FPS => {
        warn!("帧率 {} 超过上限 {}，使用默认帧率 {}", fps, MAX_FPS, self.default_fps);
        self.default_fps
      }
      _ => self.default_fps,
    }
  }
}
