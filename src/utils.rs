// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/utils.rs - 通用工具函数
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

use std::path::PathBuf;

/// 中位数，忽略非有限值；没有有效样本时返回 None
pub fn median(values: &[f64]) -> Option<f64> {
  let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
  if sorted.is_empty() {
    return None;
  }
  sorted.sort_by(f64::total_cmp);

  let mid = sorted.len() / 2;
  if sorted.len() % 2 == 0 {
    Some((sorted[mid - 1] + sorted[mid]) / 2.0)
  } else {
    Some(sorted[mid])
  }
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, digits: i32) -> f64 {
  let factor = 10f64.powi(digits);
  (value * factor).round() / factor
}

/// 从 URL 中取出经过百分号解码的文件路径
pub fn url_path(url: &url::Url) -> Result<PathBuf, std::string::FromUtf8Error> {
  let decoded = urlencoding::decode(url.path())?;
  Ok(PathBuf::from(decoded.into_owned()))
}

/// 把视频名称转换成可以安全用作文件名的形式（去掉扩展名）
pub fn sanitize_name(name: &str) -> String {
  let stem = match name.rsplit_once('.') {
    Some((stem, _)) if !stem.is_empty() => stem,
    _ => name,
  };
  stem
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
        c
      } else {
        '_'
      }
    })
    .collect()
}
