// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/task.rs - 标注任务
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

use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use std::{fmt, thread};

use tracing::{info, warn};

use crate::annotate::{AnnotationResponse, Annotator, LabelMap};
use crate::config::AnnotatorConfig;
use crate::evaluation::compute_f1_scores;
use crate::input::LandmarkSource;
use crate::landmark::LandmarkFrame;
use crate::output::Render;

pub trait Task<I, O>: Sized {
  type Error;
  fn run_task(self, input: I, output: O) -> Result<AnnotationResponse, Self::Error>;
}

/// 提前结束任务循环的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
  FrameLimit,
  Timeout,
  Interrupted,
}

impl fmt::Display for StopReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StopReason::FrameLimit => write!(f, "达到指定帧数"),
      StopReason::Timeout => write!(f, "处理超时"),
      StopReason::Interrupted => write!(f, "收到中断信号"),
    }
  }
}

/// 逐帧驱动标注器，提前结束时返回已经产生的标签
#[derive(Default, Debug)]
pub struct AnnotateTask {
  config: AnnotatorConfig,
  frame_number: Option<u64>,
  timeout: Option<Duration>,
  interrupt: Option<Receiver<()>>,
  ground_truth: Option<LabelMap>,
}

impl AnnotateTask {
  pub fn with_config(mut self, config: AnnotatorConfig) -> Self {
    self.config = config;
    self
  }

  pub fn with_frame_number(mut self, frame_number: Option<u64>) -> Self {
    self.frame_number = frame_number;
    self
  }

  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_interrupt(mut self, interrupt: Receiver<()>) -> Self {
    self.interrupt = Some(interrupt);
    self
  }

  /// 给出标注真值时，在结果中附带 F1 分数
  pub fn with_ground_truth(mut self, ground_truth: LabelMap) -> Self {
    self.ground_truth = Some(ground_truth);
    self
  }

  fn stop_reason(&self, frames: u64, started: Instant) -> Option<StopReason> {
    if self.frame_number.is_some_and(|n| frames >= n) {
      return Some(StopReason::FrameLimit);
    }
    if self.timeout.is_some_and(|timeout| started.elapsed() >= timeout) {
      return Some(StopReason::Timeout);
    }
    if self
      .interrupt
      .as_ref()
      .is_some_and(|rx| rx.try_recv().is_ok())
    {
      return Some(StopReason::Interrupted);
    }
    None
  }
}

impl AnnotateTask {
  fn annotate<E, I, O>(&self, input: I, output: &O) -> anyhow::Result<AnnotationResponse>
  where
    E: std::error::Error + Sync + Send + 'static,
    O::Error: std::error::Error + Sync + Send + 'static,
    I: LandmarkSource + Iterator<Item = Result<LandmarkFrame, E>>,
    O: Render,
  {
    let started = Instant::now();
    let mut annotator = Annotator::new(input.video_name(), input.fps(), &self.config);

    for frame in input {
      let frame = frame?;
      let now = Instant::now();
      let label = annotator.push(&frame)?;
      output.render_frame(&label)?;
      if frame.index % 100 == 0 {
        info!("处理第 {} 帧，耗时: {:.2?}", frame.index, now.elapsed());
      }

      if let Some(reason) = self.stop_reason(annotator.frames_processed(), started) {
        match reason {
          StopReason::FrameLimit => info!("{} {}, 退出任务循环", reason, annotator.frames_processed()),
          _ => warn!(
            "{}, 退出任务循环，仅输出前 {} 帧的标签",
            reason,
            annotator.frames_processed()
          ),
        }
        break;
      }
    }

    let result = annotator.finish()?;
    let mut response = result.to_response();
    if let Some(ground_truth) = &self.ground_truth {
      match compute_f1_scores(ground_truth, &response.labels_per_frame) {
        Ok(scores) => {
          info!(
            "F1 分数: 眼睛 {:?}, 坐姿 {:?}",
            scores.eye_f1, scores.posture_f1
          );
          response = response.with_scores(scores);
        }
        Err(e) => warn!("无法计算 F1 分数: {}", e),
      }
    }
    Ok(response)
  }
}

impl<E, RE, I, O> Task<I, O> for AnnotateTask
where
  E: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: LandmarkSource + Iterator<Item = Result<LandmarkFrame, E>>,
  O: Render<Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, output: O) -> Result<AnnotationResponse, Self::Error> {
    info!("开始任务...");
    let started = Instant::now();

    let response = match self.annotate(input, &output) {
      Ok(response) => response,
      Err(error) => {
        // 已经写出的逐帧标签之后补一条失败记录
        if let Err(e) = output.render_failure(&format!("{:#}", error)) {
          warn!("无法写出失败记录: {}", e);
        }
        return Err(error);
      }
    };

    output.render_result(&response)?;
    info!("任务完成，耗时: {:.2?}", started.elapsed());
    Ok(response)
  }
}

/// 注册 Ctrl-C 处理函数，返回中断信号的接收端
pub fn interrupt_on_ctrlc() -> Result<Receiver<()>, ctrlc::Error> {
  let (tx, rx) = mpsc::channel();

  ctrlc::set_handler(move || {
    info!("收到中断信号，准备退出...");
    let _ = tx.send(());
    thread::spawn(|| {
      thread::sleep(Duration::from_secs(30));
      warn!("强制退出程序");
      std::process::exit(1);
    });
  })?;

  Ok(rx)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::annotate::FrameLabel;
  use crate::input::MemoryInput;
  use crate::posture::PostureConfig;
  use std::cell::RefCell;
  use std::convert::Infallible;

  #[derive(Default)]
  struct Collect {
    frames: RefCell<Vec<FrameLabel>>,
    results: RefCell<Vec<AnnotationResponse>>,
    failures: RefCell<Vec<String>>,
  }

  impl Render for &Collect {
    type Error = Infallible;

    fn render_frame(&self, label: &FrameLabel) -> Result<(), Self::Error> {
      self.frames.borrow_mut().push(*label);
      Ok(())
    }

    fn render_result(&self, response: &AnnotationResponse) -> Result<(), Self::Error> {
      self.results.borrow_mut().push(response.clone());
      Ok(())
    }

    fn render_failure(&self, message: &str) -> Result<(), Self::Error> {
      self.failures.borrow_mut().push(message.to_string());
      Ok(())
    }
  }

  fn short_config() -> AnnotatorConfig {
    AnnotatorConfig {
      posture: PostureConfig {
        calibration_frames: 2,
        ..PostureConfig::default()
      },
      ..AnnotatorConfig::default()
    }
  }

  fn missing_frames(count: usize) -> MemoryInput {
    let mut input = MemoryInput::new("memory", Some(30.0));
    for _ in 0..count {
      input.push(None, None);
    }
    input
  }

  #[test]
  fn empty_input_fails_calibration() {
    let output = Collect::default();
    let result = AnnotateTask::default().run_task(MemoryInput::new("empty", None), &output);
    assert!(result.is_err());
    assert!(output.results.borrow().is_empty());
    assert_eq!(output.failures.borrow().len(), 1);
  }

  #[test]
  fn frame_limit_stops_early() {
    let output = Collect::default();
    let result = AnnotateTask::default()
      .with_config(short_config())
      .with_frame_number(Some(1))
      .run_task(missing_frames(5), &output);
    // 一帧之内没有可用样本，提前结束时标定失败
    assert!(result.is_err());
    assert_eq!(output.frames.borrow().len(), 1);
    let failures = output.failures.borrow();
    assert_eq!(failures.len(), 1);
    assert!(!failures[0].is_empty());
  }

  #[test]
  fn run_ends_with_one_terminal_record() {
    let output = Collect::default();
    let _ = AnnotateTask::default()
      .with_config(short_config())
      .run_task(missing_frames(3), &output);
    assert_eq!(
      output.results.borrow().len() + output.failures.borrow().len(),
      1
    );
  }

  #[test]
  fn interrupt_is_checked_after_each_frame() {
    let (tx, rx) = mpsc::channel();
    tx.send(()).unwrap();
    let output = Collect::default();
    let _ = AnnotateTask::default()
      .with_interrupt(rx)
      .run_task(missing_frames(10), &output);
    assert_eq!(output.frames.borrow().len(), 1);
  }

  #[test]
  fn stop_reason_order() {
    let task = AnnotateTask::default().with_frame_number(Some(3));
    let started = Instant::now();
    assert_eq!(task.stop_reason(2, started), None);
    assert_eq!(task.stop_reason(3, started), Some(StopReason::FrameLimit));

    let task = AnnotateTask::default().with_timeout(Some(Duration::ZERO));
    assert_eq!(task.stop_reason(0, started), Some(StopReason::Timeout));

    // 发送端关闭不算中断
    let (tx, rx) = mpsc::channel::<()>();
    drop(tx);
    let task = AnnotateTask::default().with_interrupt(rx);
    assert_eq!(task.stop_reason(0, started), None);
  }
}
