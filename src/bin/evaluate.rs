// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/bin/evaluate.rs - 对比生成标签与标注真值
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

use anyhow::Result;
use clap::Parser;
use tracing::info;

use duanzuo::evaluation::{GroundTruth, compute_f1_scores};

/// 计算眼睛状态与坐姿标签的宏平均 F1
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 标注真值文件
  #[arg(long, value_name = "FILE")]
  pub ground_truth: PathBuf,
  /// 生成的标注结果文件（json 输出）
  #[arg(long, value_name = "FILE")]
  pub generated: PathBuf,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("标注真值: {}", args.ground_truth.display());
  info!("生成结果: {}", args.generated.display());

  let ground_truth = GroundTruth::load(&args.ground_truth)?;
  let generated = GroundTruth::load(&args.generated)?;
  let scores = compute_f1_scores(&ground_truth.labels_per_frame, &generated.labels_per_frame)?;

  println!("{}", serde_json::to_string_pretty(&scores)?);
  Ok(())
}
