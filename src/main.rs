// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::info;

use duanzuo::{
  FromUrl,
  config::AnnotatorConfig,
  evaluation::GroundTruth,
  input::InputWrapper,
  output::OutputWrapper,
  task::{AnnotateTask, Task, interrupt_on_ctrlc},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let config = match &args.config {
    Some(path) => {
      info!("参数配置文件: {}", path.display());
      AnnotatorConfig::load(path)?
    }
    None => AnnotatorConfig::default(),
  };

  let timeout = match args.timeout {
    Some(seconds) if !seconds.is_finite() || seconds <= 0.0 => {
      bail!("超时时间必须为正数: {}", seconds)
    }
    Some(seconds) => Some(Duration::from_secs_f64(seconds)),
    None => None,
  };

  let mut task = AnnotateTask::default()
    .with_config(config)
    .with_frame_number((args.frame_number > 0).then_some(args.frame_number))
    .with_timeout(timeout)
    .with_interrupt(interrupt_on_ctrlc()?);
  if let Some(path) = &args.ground_truth {
    info!("标注真值文件: {}", path.display());
    task = task.with_ground_truth(GroundTruth::load(path)?.labels_per_frame);
  }

  let input = InputWrapper::from_url(&args.input)?;
  let output = OutputWrapper::from_url(&args.output)?;

  let response = task.run_task(input, output)?;
  info!(
    "{}: 共 {} 帧",
    response.video_name, response.total_frames
  );

  Ok(())
}
