// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/evaluation.rs - 与标注真值对比
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

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::annotate::LabelMap;
use crate::utils::round_to;

#[derive(Error, Debug)]
pub enum EvaluationError {
  #[error("帧数不一致: 真值 {ground_truth} 帧, 生成 {generated} 帧")]
  FrameCountMismatch { ground_truth: usize, generated: usize },
  #[error("缺少第 {0} 帧的生成标签")]
  MissingFrame(u64),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct F1Scores {
  pub eye_f1: Option<f64>,
  pub posture_f1: Option<f64>,
}

/// 标注真值文件，与输出使用相同的 `labels_per_frame` 结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
  #[serde(default)]
  pub labels_per_frame: LabelMap,
}

impl GroundTruth {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EvaluationError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
  }
}

/// 宏平均 F1，类别取真值与预测的并集，分母为零的类别记 0
pub fn macro_f1<S: AsRef<str>>(truth: &[S], predicted: &[S]) -> f64 {
  let truth: Vec<&str> = truth.iter().map(|s| s.as_ref()).collect();
  let predicted: Vec<&str> = predicted.iter().map(|s| s.as_ref()).collect();
  let classes: BTreeSet<&str> = truth.iter().chain(predicted.iter()).copied().collect();
  if classes.is_empty() {
    return 0.0;
  }

  let total: f64 = classes
    .iter()
    .map(|&class| {
      let mut tp = 0usize;
      let mut fp = 0usize;
      let mut fn_ = 0usize;
      for (&t, &p) in truth.iter().zip(&predicted) {
        match (t == class, p == class) {
          (true, true) => tp += 1,
          (false, true) => fp += 1,
          (true, false) => fn_ += 1,
          (false, false) => {}
        }
      }
      let denominator = 2 * tp + fp + fn_;
      if denominator == 0 {
        0.0
      } else {
        (2 * tp) as f64 / denominator as f64
      }
    })
    .sum();

  total / classes.len() as f64
}

/// 逐帧对比眼睛与坐姿标签，返回保留四位小数的宏平均 F1
pub fn compute_f1_scores(
  ground_truth: &LabelMap,
  generated: &LabelMap,
) -> Result<F1Scores, EvaluationError> {
  if ground_truth.is_empty() {
    return Ok(F1Scores::default());
  }
  if ground_truth.len() != generated.len() {
    return Err(EvaluationError::FrameCountMismatch {
      ground_truth: ground_truth.len(),
      generated: generated.len(),
    });
  }

  let mut eye_truth = Vec::with_capacity(ground_truth.len());
  let mut eye_predicted = Vec::with_capacity(ground_truth.len());
  let mut posture_truth = Vec::with_capacity(ground_truth.len());
  let mut posture_predicted = Vec::with_capacity(ground_truth.len());

  for (frame, truth) in ground_truth {
    let predicted = generated
      .get(frame)
      .ok_or(EvaluationError::MissingFrame(*frame))?;
    eye_truth.push(truth.eye_state.as_str());
    eye_predicted.push(predicted.eye_state.as_str());
    posture_truth.push(truth.posture.as_str());
    posture_predicted.push(predicted.posture.as_str());
  }

  let scores = F1Scores {
    eye_f1: Some(round_to(macro_f1(&eye_truth, &eye_predicted), 4)),
    posture_f1: Some(round_to(macro_f1(&posture_truth, &posture_predicted), 4)),
  };
  debug!("F1 评估结果: {:?}", scores);
  Ok(scores)
}
