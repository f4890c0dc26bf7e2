// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use url::Url;

/// Duanzuo 眨眼与坐姿标注工具
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 关键点输入来源
  /// 支持格式:
  /// - json:///path/landmarks.json
  /// - jsonl:///path/landmarks.jsonl 或 jsonl:- （标准输入）
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 标注结果输出
  /// 支持格式:
  /// - stdout:
  /// - json:///path/result.json
  /// - jsonl:///path/labels.jsonl
  /// - folder:///path/records[?compact]
  #[arg(long, value_name = "OUTPUT", default_value = "stdout:")]
  pub output: Url,

  /// TOML 参数配置文件，缺省时使用内置参数
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// 标注真值文件，给出时在结果中附带 F1 分数
  #[arg(long, value_name = "FILE")]
  pub ground_truth: Option<PathBuf>,

  /// 最大处理帧数（0 表示无限制）
  #[arg(long, value_name = "FRAME_NUMBER", default_value_t = 0)]
  pub frame_number: u64,

  /// 处理超时秒数
  #[arg(long, value_name = "SECONDS")]
  pub timeout: Option<f64>,
}
