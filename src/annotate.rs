// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/annotate.rs - 逐帧标签汇总
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

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AnnotatorConfig;
use crate::evaluation::F1Scores;
use crate::eye::{EyeClassifier, EyeState};
use crate::landmark::LandmarkFrame;
use crate::posture::{PostureClassifier, PostureError, PostureLabel};
use crate::utils::round_to;

#[derive(Error, Debug)]
pub enum AnnotateError {
  #[error("帧顺序错误: 期望第 {expected} 帧, 实际收到第 {found} 帧")]
  OutOfOrder { expected: u64, found: u64 },
  #[error("坐姿分类错误: {0}")]
  PostureError(#[from] PostureError),
}

/// 单帧的最终标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLabel {
  pub frame_index: u64,
  pub eye_state: EyeState,
  pub posture: PostureLabel,
}

/// 响应中 `labels_per_frame` 的条目；标注真值也使用这个格式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelEntry {
  pub eye_state: String,
  pub posture: String,
}

impl From<&FrameLabel> for LabelEntry {
  fn from(label: &FrameLabel) -> Self {
    Self {
      eye_state: label.eye_state.to_string(),
      posture: label.posture.to_string(),
    }
  }
}

pub type LabelMap = BTreeMap<u64, LabelEntry>;

/// 坐姿平滑分数的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
  pub count: usize,
  pub avg: Option<f64>,
  pub min: Option<f64>,
  pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
struct ScoreAccumulator {
  count: usize,
  sum: f64,
  min: f64,
  max: f64,
}

impl ScoreAccumulator {
  fn push(&mut self, score: f64) {
    if self.count == 0 {
      self.min = score;
      self.max = score;
    } else {
      self.min = self.min.min(score);
      self.max = self.max.max(score);
    }
    self.count += 1;
    self.sum += score;
  }

  fn summary(&self) -> ScoreSummary {
    if self.count == 0 {
      return ScoreSummary::default();
    }
    ScoreSummary {
      count: self.count,
      avg: Some(round_to(self.sum / self.count as f64, 3)),
      min: Some(round_to(self.min, 3)),
      max: Some(round_to(self.max, 3)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStats {
  pub blink_count: u32,
  pub posture_scores: ScoreSummary,
  pub start_time: DateTime<Utc>,
  pub end_time: DateTime<Utc>,
}

/// 一个视频的完整标注结果
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationResult {
  pub video_name: String,
  pub total_frames: u64,
  pub labels: BTreeMap<u64, FrameLabel>,
  pub stats: AnnotationStats,
}

/// 对外输出的 JSON 结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResponse {
  pub video_name: String,
  pub total_frames: u64,
  pub labels_per_frame: LabelMap,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub eye_f1: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub posture_f1: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stats: Option<AnnotationStats>,
}

impl AnnotationResult {
  pub fn to_response(&self) -> AnnotationResponse {
    AnnotationResponse {
      video_name: self.video_name.clone(),
      total_frames: self.total_frames,
      labels_per_frame: self
        .labels
        .iter()
        .map(|(index, label)| (*index, LabelEntry::from(label)))
        .collect(),
      eye_f1: None,
      posture_f1: None,
      stats: Some(self.stats.clone()),
    }
  }
}

impl AnnotationResponse {
  pub fn with_scores(mut self, scores: F1Scores) -> Self {
    self.eye_f1 = scores.eye_f1;
    self.posture_f1 = scores.posture_f1;
    self
  }
}

/// 按帧序驱动两个分类器并汇总标签，每个视频使用独立实例
#[derive(Debug)]
pub struct Annotator {
  video_name: String,
  eye: EyeClassifier,
  posture: PostureClassifier,
  labels: BTreeMap<u64, FrameLabel>,
  next_index: u64,
  scores: ScoreAccumulator,
  start_time: DateTime<Utc>,
}

impl Annotator {
  pub fn new(video_name: impl Into<String>, fps: Option<f64>, config: &AnnotatorConfig) -> Self {
    let video_name = video_name.into();
    let fps = config.effective_fps(fps);
    info!("开始标注视频: {} ({:.2} fps)", video_name, fps);

    Self {
      video_name,
      eye: EyeClassifier::new(config.eye.clone(), fps),
      posture: PostureClassifier::new(config.posture.clone()),
      labels: BTreeMap::new(),
      next_index: 0,
      scores: ScoreAccumulator::default(),
      start_time: Utc::now(),
    }
  }

  pub fn video_name(&self) -> &str {
    &self.video_name
  }

  pub fn frames_processed(&self) -> u64 {
    self.next_index
  }

  pub fn blink_count(&self) -> u32 {
    self.eye.blink_count()
  }

  /// 处理下一帧；帧号必须严格连续
  pub fn push(&mut self, frame: &LandmarkFrame) -> Result<FrameLabel, AnnotateError> {
    if frame.index != self.next_index {
      return Err(AnnotateError::OutOfOrder {
        expected: self.next_index,
        found: frame.index,
      });
    }

    let eye = self.eye.update(frame.face.as_ref());
    if eye.blink {
      debug!("第 {} 帧眨眼结束", frame.index);
    }
    let posture = self.posture.update(frame)?;
    if let Some(score) = posture.smooth_score {
      self.scores.push(score);
    }

    let label = FrameLabel {
      frame_index: frame.index,
      eye_state: eye.state,
      posture: posture.label,
    };
    debug!(
      "第 {} 帧: 眼睛 {} (EAR {:?}), 坐姿 {} (分数 {:?})",
      label.frame_index, label.eye_state, eye.ear, label.posture, posture.smooth_score
    );

    self.labels.insert(label.frame_index, label);
    self.next_index += 1;
    Ok(label)
  }

  pub fn finish(mut self) -> Result<AnnotationResult, AnnotateError> {
    self.posture.finish()?;

    let stats = AnnotationStats {
      blink_count: self.eye.blink_count(),
      posture_scores: self.scores.summary(),
      start_time: self.start_time,
      end_time: Utc::now(),
    };
    info!(
      "标注完成: {} 共 {} 帧, 眨眼 {} 次",
      self.video_name, self.next_index, stats.blink_count
    );

    Ok(AnnotationResult {
      video_name: self.video_name,
      total_frames: self.next_index,
      labels: self.labels,
      stats,
    })
  }
}
