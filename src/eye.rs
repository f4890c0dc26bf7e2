// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/eye.rs - 睁闭眼状态分类
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

//! 基于 EAR（眼睛纵横比）的睁闭眼判定。
//!
//! 标定阶段收集睁眼时的 EAR 样本，取中位数作为基准，
//! 再按比例得到闭眼/睁眼两个阈值（滞回）。状态切换还要求
//! 阈值条件连续满足若干帧（去抖），每次由闭到睁计一次眨眼。

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::landmark::{Landmarks, Point, face_mesh};
use crate::utils::median;

/// 眼睛状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EyeState {
  Open,
  Closed,
}

impl EyeState {
  pub fn as_str(&self) -> &'static str {
    match self {
      EyeState::Open => "Open",
      EyeState::Closed => "Closed",
    }
  }
}

impl fmt::Display for EyeState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// 睁眼基准的更新方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineMode {
  /// 标定完成后阈值固定
  #[default]
  Fixed,
  /// 标定后继续用睁眼样本滚动更新中位数
  Rolling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeConfig {
  pub close_thresh_ratio: f64,
  pub open_thresh_ratio: f64,
  /// 判定闭眼所需的持续时间（秒）
  pub close_time_sec: f64,
  /// 判定睁眼所需的持续时间（秒）
  pub open_time_sec: f64,
  /// 标定窗口时长（秒）
  pub min_history_sec: f64,
  /// 标定窗口最少样本数
  pub min_history_frames: usize,
  /// 滚动基准保留的时长（秒）
  pub history_sec: f64,
  pub baseline: BaselineMode,
}

impl Default for EyeConfig {
  fn default() -> Self {
    Self {
      close_thresh_ratio: 0.65,
      open_thresh_ratio: 0.75,
      close_time_sec: 0.07,
      open_time_sec: 0.10,
      min_history_sec: 0.5,
      min_history_frames: 10,
      history_sec: 2.0,
      baseline: BaselineMode::Fixed,
    }
  }
}

impl EyeConfig {
  pub fn debounce(&self, fps: f64) -> Debounce {
    Debounce::from_fps(fps, self.close_time_sec, self.open_time_sec)
  }

  /// 标定所需的样本数
  pub fn warmup_frames(&self, fps: f64) -> usize {
    self
      .min_history_frames
      .max(frames_for(fps, self.min_history_sec))
  }

  /// 滚动基准的容量，不小于标定样本数
  pub fn history_frames(&self, fps: f64) -> usize {
    frames_for(fps, self.history_sec).max(self.warmup_frames(fps))
  }
}

fn frames_for(fps: f64, seconds: f64) -> usize {
  let frames = (fps.max(1.0) * seconds).floor();
  if frames.is_finite() && frames >= 1.0 {
    frames as usize
  } else {
    1
  }
}

/// 去抖所需的连续帧数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
  pub close_frames: u32,
  pub open_frames: u32,
}

impl Debounce {
  pub fn from_fps(fps: f64, close_time_sec: f64, open_time_sec: f64) -> Self {
    Self {
      close_frames: frames_for(fps, close_time_sec) as u32,
      open_frames: frames_for(fps, open_time_sec) as u32,
    }
  }
}

/// 由睁眼基准导出的滞回阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeThresholds {
  pub open_median: f64,
  pub close: f64,
  pub open: f64,
}

impl EyeThresholds {
  /// 基准必须为正，否则阈值没有意义
  pub fn from_median(open_median: f64, close_ratio: f64, open_ratio: f64) -> Option<Self> {
    if !(open_median.is_finite() && open_median > 0.0) {
      return None;
    }
    Some(Self {
      open_median,
      close: close_ratio * open_median,
      open: open_ratio * open_median,
    })
  }

  pub fn from_samples(samples: &[f64], close_ratio: f64, open_ratio: f64) -> Option<Self> {
    Self::from_median(median(samples)?, close_ratio, open_ratio)
  }
}

/// 单眼 EAR = (‖p2−p6‖ + ‖p3−p5‖) / (2·‖p1−p4‖)
pub fn eye_aspect_ratio(points: &[Point; 6]) -> Option<f64> {
  let [p1, p2, p3, p4, p5, p6] = points;
  let horizontal = p1.distance(p4);
  if !(horizontal.is_finite() && horizontal > 0.0) {
    return None;
  }
  let ear = (p2.distance(p6) + p3.distance(p5)) / (2.0 * horizontal);
  ear.is_finite().then_some(ear)
}

/// 双眼 EAR 的平均值，任一只眼无法计算时视为检测失败
pub fn ear_average(face: &Landmarks) -> Option<f64> {
  let left = eye_aspect_ratio(&face.select(face_mesh::LEFT_EYE)?)?;
  let right = eye_aspect_ratio(&face.select(face_mesh::RIGHT_EYE)?)?;
  Some((left + right) / 2.0)
}

/// 每一帧的判定结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeObservation {
  pub ear: Option<f64>,
  pub state: EyeState,
  pub blink: bool,
  pub calibrated: bool,
}

/// 睁闭眼状态机
#[derive(Debug, Clone)]
pub struct EyeClassifier {
  config: EyeConfig,
  debounce: Debounce,
  warmup_frames: usize,
  history_frames: usize,
  history: VecDeque<f64>,
  thresholds: Option<EyeThresholds>,
  state: EyeState,
  closed_run: u32,
  open_run: u32,
  blink_count: u32,
}

impl EyeClassifier {
  pub fn new(config: EyeConfig, fps: f64) -> Self {
    let debounce = config.debounce(fps);
    let warmup_frames = config.warmup_frames(fps);
    let history_frames = config.history_frames(fps);
    debug!(
      "眼睛分类器: 闭眼去抖 {} 帧, 睁眼去抖 {} 帧, 标定 {} 帧",
      debounce.close_frames, debounce.open_frames, warmup_frames
    );

    Self {
      config,
      debounce,
      warmup_frames,
      history_frames,
      history: VecDeque::new(),
      thresholds: None,
      state: EyeState::Open,
      closed_run: 0,
      open_run: 0,
      blink_count: 0,
    }
  }

  /// 跳过标定，直接使用给定阈值；`fps` 决定滚动基准的容量
  pub fn with_thresholds(
    config: EyeConfig,
    fps: f64,
    debounce: Debounce,
    thresholds: EyeThresholds,
  ) -> Self {
    let history_frames = config.history_frames(fps);
    Self {
      config,
      debounce,
      warmup_frames: 0,
      history_frames,
      history: VecDeque::new(),
      thresholds: Some(thresholds),
      state: EyeState::Open,
      closed_run: 0,
      open_run: 0,
      blink_count: 0,
    }
  }

  pub fn state(&self) -> EyeState {
    self.state
  }

  pub fn blink_count(&self) -> u32 {
    self.blink_count
  }

  pub fn thresholds(&self) -> Option<EyeThresholds> {
    self.thresholds
  }

  pub fn debounce(&self) -> Debounce {
    self.debounce
  }

  pub fn is_calibrated(&self) -> bool {
    self.thresholds.is_some()
  }

  /// 处理一帧面部关键点，`None` 表示未检测到人脸
  pub fn update(&mut self, face: Option<&Landmarks>) -> EyeObservation {
    match face.and_then(ear_average) {
      Some(ear) => self.update_ear(ear),
      None => self.detection_failed(),
    }
  }

  /// 检测失败只清空连续计数，不改变当前状态
  pub fn detection_failed(&mut self) -> EyeObservation {
    self.closed_run = 0;
    self.open_run = 0;
    self.observation(None, false)
  }

  pub fn update_ear(&mut self, ear: f64) -> EyeObservation {
    if !ear.is_finite() {
      return self.detection_failed();
    }

    let Some(thresholds) = self.thresholds else {
      self.warm_up(ear);
      return self.observation(Some(ear), false);
    };

    let mut blink = false;
    match self.state {
      EyeState::Open => {
        if ear < thresholds.close {
          self.closed_run += 1;
          self.open_run = 0;
          if self.closed_run >= self.debounce.close_frames {
            debug!("EAR {:.4} 连续 {} 帧低于闭眼阈值", ear, self.closed_run);
            self.state = EyeState::Closed;
            self.closed_run = 0;
          }
        } else {
          self.closed_run = 0;
          if ear > thresholds.open {
            self.observe_open(ear);
          }
        }
      }
      EyeState::Closed => {
        if ear > thresholds.open {
          self.open_run += 1;
          self.closed_run = 0;
          if self.open_run >= self.debounce.open_frames {
            self.state = EyeState::Open;
            self.open_run = 0;
            self.blink_count += 1;
            blink = true;
            debug!("检测到第 {} 次眨眼", self.blink_count);
            self.observe_open(ear);
          }
        } else {
          self.open_run = 0;
        }
      }
    }

    self.observation(Some(ear), blink)
  }

  fn warm_up(&mut self, ear: f64) {
    self.push_history(ear);
    if self.history.len() < self.warmup_frames {
      return;
    }

    let samples: Vec<f64> = self.history.iter().copied().collect();
    match EyeThresholds::from_samples(
      &samples,
      self.config.close_thresh_ratio,
      self.config.open_thresh_ratio,
    ) {
      Some(thresholds) => {
        info!(
          "眼睛标定完成: 睁眼基准 {:.4}, 闭眼阈值 {:.4}, 睁眼阈值 {:.4}",
          thresholds.open_median, thresholds.close, thresholds.open
        );
        self.thresholds = Some(thresholds);
      }
      None => {
        warn!("睁眼基准无效，重新开始眼睛标定");
        self.history.clear();
      }
    }
  }

  fn observe_open(&mut self, ear: f64) {
    if self.config.baseline != BaselineMode::Rolling {
      return;
    }
    self.push_history(ear);

    let samples: Vec<f64> = self.history.iter().copied().collect();
    if let Some(thresholds) = EyeThresholds::from_samples(
      &samples,
      self.config.close_thresh_ratio,
      self.config.open_thresh_ratio,
    ) {
      self.thresholds = Some(thresholds);
    }
  }

  fn push_history(&mut self, ear: f64) {
    if self.history.len() >= self.history_frames {
      self.history.pop_front();
    }
    self.history.push_back(ear);
  }

  fn observation(&self, ear: Option<f64>, blink: bool) -> EyeObservation {
    EyeObservation {
      ear,
      state: self.state,
      blink,
      calibrated: self.thresholds.is_some(),
    }
  }
}
