// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/posture.rs - 坐姿分类
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

//! 坐姿判定。
//!
//! 前若干帧用于标定，记录脸高与肩宽（或外眼角间距）的中位数；
//! 之后每帧按标定值做尺度归一化，计算鼻尖相对肩部中点的高度比，
//! 经指数映射与 EMA 平滑得到分数，分数不低于阈值即判为坐直。

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::landmark::{LandmarkFrame, face_mesh};
use crate::utils::median;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostureError {
  #[error("坐姿标定失败: {frames} 帧内没有可用样本（脸高样本 {face_samples}, 尺度样本 {scale_samples}）")]
  NoCalibrationSamples {
    frames: usize,
    face_samples: usize,
    scale_samples: usize,
  },
}

/// 坐姿标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostureLabel {
  Straight,
  Hunched,
  /// 标定窗口内，尚无基准
  Calibrating,
  /// 标定完成后还没有得到过任何分数
  Unknown,
}

impl PostureLabel {
  pub fn as_str(&self) -> &'static str {
    match self {
      PostureLabel::Straight => "Straight",
      PostureLabel::Hunched => "Hunched",
      PostureLabel::Calibrating => "Calibrating",
      PostureLabel::Unknown => "Unknown",
    }
  }
}

impl fmt::Display for PostureLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
  /// 标定窗口帧数
  pub calibration_frames: usize,
  pub min_face_px: f64,
  pub max_face_px: f64,
  pub min_shoulder_px: f64,
  pub min_eye_width_px: f64,
  pub good_center_rel: f64,
  pub sensitivity: f64,
  pub scale_factor: f64,
  pub face_weight: f64,
  pub shoulder_weight: f64,
  pub ema_alpha: f64,
  pub straight_threshold: f64,
  /// 缺少肩部关键点时，按外眼角间距估计距离
  pub distance_fallback: bool,
  pub real_face_width_cm: f64,
  pub face_width_at_50cm_px: f64,
  pub straight_min_distance_cm: f64,
}

impl Default for PostureConfig {
  fn default() -> Self {
    Self {
      calibration_frames: 60,
      min_face_px: 60.0,
      max_face_px: 800.0,
      min_shoulder_px: 40.0,
      min_eye_width_px: 20.0,
      good_center_rel: -0.85,
      sensitivity: 5.0,
      scale_factor: 2.5,
      face_weight: 0.7,
      shoulder_weight: 0.3,
      ema_alpha: 0.3,
      straight_threshold: 1.30,
      distance_fallback: true,
      real_face_width_cm: 14.0,
      face_width_at_50cm_px: 120.0,
      straight_min_distance_cm: 50.0,
    }
  }
}

const DISTANCE_STRAIGHT_SCORE: f64 = 2.0;
const DISTANCE_HUNCHED_SCORE: f64 = 0.5;

impl PostureConfig {
  /// 阈值本身判为坐直
  pub fn classify(&self, smooth_score: f64) -> PostureLabel {
    if smooth_score >= self.straight_threshold {
      PostureLabel::Straight
    } else {
      PostureLabel::Hunched
    }
  }

  pub fn face_in_range(&self, face_h: f64) -> bool {
    face_h > 0.0 && self.min_face_px <= face_h && face_h <= self.max_face_px
  }

  fn focal_length_px(&self) -> f64 {
    self.face_width_at_50cm_px * 50.0 / self.real_face_width_cm
  }

  /// 由外眼角间距估计相机距离（厘米）
  pub fn estimate_distance_cm(&self, eye_width_px: f64) -> Option<f64> {
    if eye_width_px < self.min_eye_width_px {
      return None;
    }
    let distance = self.real_face_width_cm * self.focal_length_px() / eye_width_px;
    distance.is_finite().then_some(distance)
  }

  /// 原始分数 = clip(SCALE_FACTOR · exp(−SENSITIVITY · shifted), 0, SCALE_FACTOR)
  pub fn raw_score(&self, shifted: f64) -> f64 {
    (self.scale_factor * (-self.sensitivity * shifted).exp()).clamp(0.0, self.scale_factor)
  }
}

/// 标定使用的水平尺度来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleSource {
  Shoulders,
  /// 肩部缺失时用外眼角间距代替
  EyeCorners,
}

/// 冻结后的标定基准
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
  pub face_ref: f64,
  pub shoulder_ref: f64,
  pub source: ScaleSource,
}

/// 标定窗口内收集的样本
#[derive(Debug, Clone, Default)]
pub struct CalibrationSamples {
  pub face: Vec<f64>,
  pub shoulder: Vec<f64>,
  pub proxy: Vec<f64>,
}

impl CalibrationSamples {
  pub fn collect(&mut self, frame: &LandmarkFrame, config: &PostureConfig) {
    let Some(face_h) = face_height(frame) else {
      return;
    };
    if !config.face_in_range(face_h) {
      return;
    }

    let shoulder = frame
      .shoulders()
      .map(|(left, right)| (left.x - right.x).abs())
      .filter(|w| *w >= config.min_shoulder_px);
    let proxy = frame
      .eye_outer_width()
      .filter(|w| *w >= config.min_eye_width_px);

    if shoulder.is_none() && proxy.is_none() {
      return;
    }
    self.face.push(face_h);
    if let Some(width) = shoulder {
      self.shoulder.push(width);
    }
    if let Some(width) = proxy {
      self.proxy.push(width);
    }
  }

  pub fn is_empty(&self) -> bool {
    self.face.is_empty()
  }
}

impl CalibrationProfile {
  /// 肩部样本优先，没有肩部样本时退回外眼角间距
  pub fn from_samples(samples: &CalibrationSamples, frames: usize) -> Result<Self, PostureError> {
    let (scale_samples, source) = if samples.shoulder.is_empty() {
      (&samples.proxy, ScaleSource::EyeCorners)
    } else {
      (&samples.shoulder, ScaleSource::Shoulders)
    };

    match (median(&samples.face), median(scale_samples)) {
      (Some(face_ref), Some(shoulder_ref)) if face_ref > 0.0 && shoulder_ref > 0.0 => Ok(Self {
        face_ref,
        shoulder_ref,
        source,
      }),
      _ => Err(PostureError::NoCalibrationSamples {
        frames,
        face_samples: samples.face.len(),
        scale_samples: scale_samples.len(),
      }),
    }
  }
}

/// 单帧的中间量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureMeasurement {
  pub face_h: f64,
  pub sh_w: f64,
  pub scale_ratio: f64,
  pub ratio: f64,
  pub shifted: f64,
  pub raw_score: f64,
  pub smooth_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureObservation {
  pub label: PostureLabel,
  pub smooth_score: Option<f64>,
  pub measurement: Option<PostureMeasurement>,
  pub distance_cm: Option<f64>,
}

impl PostureObservation {
  fn calibrating() -> Self {
    Self {
      label: PostureLabel::Calibrating,
      smooth_score: None,
      measurement: None,
      distance_cm: None,
    }
  }
}

#[derive(Debug, Clone)]
enum Phase {
  Calibrating(CalibrationSamples),
  Calibrated(CalibrationProfile),
}

/// 坐姿分类器
#[derive(Debug, Clone)]
pub struct PostureClassifier {
  config: PostureConfig,
  phase: Phase,
  frames_seen: usize,
  prev_smooth_score: Option<f64>,
}

fn face_height(frame: &LandmarkFrame) -> Option<f64> {
  let face = frame.face.as_ref()?;
  let [chin, forehead] = face.select([face_mesh::CHIN, face_mesh::FOREHEAD])?;
  let face_h = (chin.y - forehead.y).abs();
  face_h.is_finite().then_some(face_h)
}

impl PostureClassifier {
  pub fn new(config: PostureConfig) -> Self {
    Self {
      config,
      phase: Phase::Calibrating(CalibrationSamples::default()),
      frames_seen: 0,
      prev_smooth_score: None,
    }
  }

  /// 使用现成的标定基准
  pub fn with_profile(config: PostureConfig, profile: CalibrationProfile) -> Self {
    Self {
      config,
      phase: Phase::Calibrated(profile),
      frames_seen: 0,
      prev_smooth_score: None,
    }
  }

  pub fn config(&self) -> &PostureConfig {
    &self.config
  }

  pub fn profile(&self) -> Option<&CalibrationProfile> {
    match &self.phase {
      Phase::Calibrated(profile) => Some(profile),
      Phase::Calibrating(_) => None,
    }
  }

  pub fn prev_smooth_score(&self) -> Option<f64> {
    self.prev_smooth_score
  }

  pub fn update(&mut self, frame: &LandmarkFrame) -> Result<PostureObservation, PostureError> {
    self.frames_seen += 1;

    let profile = match &mut self.phase {
      Phase::Calibrating(samples) => {
        samples.collect(frame, &self.config);
        if self.frames_seen >= self.config.calibration_frames {
          self.finalize()?;
        }
        return Ok(PostureObservation::calibrating());
      }
      Phase::Calibrated(profile) => *profile,
    };

    Ok(self.score(frame, &profile))
  }

  /// 视频结束时若仍在标定，用已有样本完成标定
  pub fn finish(&mut self) -> Result<(), PostureError> {
    self.finalize()
  }

  fn finalize(&mut self) -> Result<(), PostureError> {
    let Phase::Calibrating(samples) = &self.phase else {
      return Ok(());
    };

    if samples.face.len() < self.config.calibration_frames {
      warn!(
        "坐姿标定样本不足: {} / {} 帧可用",
        samples.face.len(),
        self.config.calibration_frames
      );
    }
    let profile = CalibrationProfile::from_samples(samples, self.frames_seen)?;
    info!(
      "坐姿标定完成: 脸高基准 {:.1}px, 宽度基准 {:.1}px ({:?})",
      profile.face_ref, profile.shoulder_ref, profile.source
    );
    self.phase = Phase::Calibrated(profile);
    Ok(())
  }

  fn score(&mut self, frame: &LandmarkFrame, profile: &CalibrationProfile) -> PostureObservation {
    let Some(face) = frame.face.as_ref() else {
      return self.carry_forward();
    };
    let Some(face_h) = face_height(frame) else {
      return self.carry_forward();
    };
    let Some(nose) = face.get(face_mesh::NOSE_TIP) else {
      return self.carry_forward();
    };
    if !self.config.face_in_range(face_h) {
      debug!("第 {} 帧脸高 {:.1}px 超出范围", frame.index, face_h);
      return self.carry_forward();
    }

    let eye_width = frame.eye_outer_width();
    let shoulders = frame.shoulders();
    let width = match (profile.source, shoulders) {
      (ScaleSource::Shoulders, Some((left, right))) => {
        Some((left.x - right.x).abs()).filter(|w| *w >= self.config.min_shoulder_px)
      }
      (ScaleSource::EyeCorners, Some(_)) => eye_width.filter(|w| *w >= self.config.min_eye_width_px),
      (_, None) => None,
    };

    match (shoulders, width) {
      (Some((left, right)), Some(sh_w)) => {
        let mid_shoulder = left.midpoint(&right);
        let reference = self.config.face_weight * profile.face_ref
          + self.config.shoulder_weight * profile.shoulder_ref;
        let current = self.config.face_weight * face_h + self.config.shoulder_weight * sh_w;
        let scale_ratio = if current > 0.0 { reference / current } else { 1.0 };
        let ratio = (nose.y - mid_shoulder.y) / face_h * scale_ratio;
        let shifted = ratio - self.config.good_center_rel;
        let raw_score = self.config.raw_score(shifted);
        if !raw_score.is_finite() {
          return self.carry_forward();
        }

        let smooth_score = self.smooth(raw_score);
        PostureObservation {
          label: self.config.classify(smooth_score),
          smooth_score: Some(smooth_score),
          measurement: Some(PostureMeasurement {
            face_h,
            sh_w,
            scale_ratio,
            ratio,
            shifted,
            raw_score,
            smooth_score,
          }),
          distance_cm: None,
        }
      }
      _ => self.distance_fallback(eye_width),
    }
  }

  fn distance_fallback(&mut self, eye_width: Option<f64>) -> PostureObservation {
    if !self.config.distance_fallback {
      return self.carry_forward();
    }
    let Some(distance) = eye_width.and_then(|w| self.config.estimate_distance_cm(w)) else {
      return self.carry_forward();
    };

    let band_score = if distance >= self.config.straight_min_distance_cm {
      DISTANCE_STRAIGHT_SCORE
    } else {
      DISTANCE_HUNCHED_SCORE
    };
    let raw_score = band_score.min(self.config.scale_factor);
    let smooth_score = self.smooth(raw_score);
    PostureObservation {
      label: self.config.classify(smooth_score),
      smooth_score: Some(smooth_score),
      measurement: None,
      distance_cm: Some(distance),
    }
  }

  /// 第一个分数直接作为 EMA 的初值
  fn smooth(&mut self, raw_score: f64) -> f64 {
    let alpha = self.config.ema_alpha;
    let smooth_score = match self.prev_smooth_score {
      Some(prev) => alpha * raw_score + (1.0 - alpha) * prev,
      None => raw_score,
    };
    self.prev_smooth_score = Some(smooth_score);
    smooth_score
  }

  fn carry_forward(&self) -> PostureObservation {
    PostureObservation {
      label: self
        .prev_smooth_score
        .map(|s| self.config.classify(s))
        .unwrap_or(PostureLabel::Unknown),
      smooth_score: self.prev_smooth_score,
      measurement: None,
      distance_cm: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::landmark::{Landmarks, Point, pose};

  const FACE_H: f64 = 200.0;
  const SHOULDER_W: f64 = 300.0;
  const SHOULDER_Y: f64 = 500.0;

  /// 鼻尖位于肩线上方 `lift` 个脸高的帧
  fn frame(index: u64, lift: f64, with_shoulders: bool) -> LandmarkFrame {
    let nose_y = SHOULDER_Y - lift * FACE_H;
    let forehead_y = nose_y - FACE_H / 2.0;
    let face: Landmarks = [
      (face_mesh::FOREHEAD, Point::new(320.0, forehead_y)),
      (face_mesh::CHIN, Point::new(320.0, forehead_y + FACE_H)),
      (face_mesh::NOSE_TIP, Point::new(320.0, nose_y)),
      (face_mesh::LEFT_EYE_OUTER, Point::new(255.0, nose_y - 40.0)),
      (face_mesh::RIGHT_EYE_OUTER, Point::new(385.0, nose_y - 40.0)),
    ]
    .into_iter()
    .collect();
    let body = with_shoulders.then(|| {
      [
        (pose::LEFT_SHOULDER, Point::new(320.0 - SHOULDER_W / 2.0, SHOULDER_Y)),
        (pose::RIGHT_SHOULDER, Point::new(320.0 + SHOULDER_W / 2.0, SHOULDER_Y)),
      ]
      .into_iter()
      .collect()
    });
    LandmarkFrame::new(index, Some(face), body)
  }

  fn calibrated() -> PostureClassifier {
    PostureClassifier::with_profile(
      PostureConfig::default(),
      CalibrationProfile {
        face_ref: FACE_H,
        shoulder_ref: SHOULDER_W,
        source: ScaleSource::Shoulders,
      },
    )
  }

  #[test]
  fn threshold_is_inclusive() {
    let config = PostureConfig::default();
    assert_eq!(config.classify(1.30), PostureLabel::Straight);
    assert_eq!(config.classify(1.2999), PostureLabel::Hunched);
  }

  #[test]
  fn raw_score_is_clipped() {
    let config = PostureConfig::default();
    assert_eq!(config.raw_score(-10.0), config.scale_factor);
    assert_eq!(config.raw_score(f64::NEG_INFINITY), config.scale_factor);
    assert_eq!(config.raw_score(f64::INFINITY), 0.0);
    assert!((config.raw_score(0.0) - 2.5).abs() < 1e-12);
  }

  #[test]
  fn calibration_window_reports_calibrating() {
    let mut classifier = PostureClassifier::new(PostureConfig::default());
    for i in 0..59 {
      let observation = classifier.update(&frame(i, 1.0, true)).unwrap();
      assert_eq!(observation.label, PostureLabel::Calibrating);
    }
    assert!(classifier.profile().is_none());
    classifier.update(&frame(59, 1.0, true)).unwrap();

    let profile = classifier.profile().unwrap();
    assert_eq!(profile.source, ScaleSource::Shoulders);
    assert!((profile.face_ref - FACE_H).abs() < 1e-9);
    assert!((profile.shoulder_ref - SHOULDER_W).abs() < 1e-9);

    let observation = classifier.update(&frame(60, 1.0, true)).unwrap();
    assert_eq!(observation.label, PostureLabel::Straight);
  }

  #[test]
  fn upright_and_slouched_frames() {
    let mut classifier = calibrated();
    let upright = classifier.update(&frame(0, 1.0, true)).unwrap();
    let measurement = upright.measurement.unwrap();
    assert!((measurement.scale_ratio - 1.0).abs() < 1e-12);
    assert!((measurement.ratio + 1.0).abs() < 1e-12);
    assert_eq!(measurement.raw_score, 2.5);
    // 第一帧的平滑分数等于原始分数
    assert_eq!(measurement.smooth_score, measurement.raw_score);
    assert_eq!(upright.label, PostureLabel::Straight);

    let mut classifier = calibrated();
    let slouched = classifier.update(&frame(0, 0.4, true)).unwrap();
    assert_eq!(slouched.label, PostureLabel::Hunched);
    let expected = 2.5 * (-5.0f64 * 0.45).exp();
    assert!((slouched.smooth_score.unwrap() - expected).abs() < 1e-9);
  }

  #[test]
  fn ema_blends_with_previous_score() {
    let mut classifier = calibrated();
    classifier.update(&frame(0, 1.0, true)).unwrap();
    let slouched = classifier.update(&frame(1, 0.4, true)).unwrap();
    let raw = slouched.measurement.unwrap().raw_score;
    let expected = 0.3 * raw + 0.7 * 2.5;
    assert!((slouched.smooth_score.unwrap() - expected).abs() < 1e-9);
    assert_eq!(slouched.label, PostureLabel::Straight);
  }

  #[test]
  fn scale_ratio_compensates_distance() {
    let mut classifier = calibrated();
    let mut near = frame(0, 0.5, true);
    // 把整张脸放大一倍，模拟靠近相机
    if let Some(face) = near.face.take() {
      let (cx, cy) = (320.0, SHOULDER_Y);
      let scaled: Landmarks = [face_mesh::FOREHEAD, face_mesh::CHIN, face_mesh::NOSE_TIP]
        .into_iter()
        .filter_map(|i| face.get(i).map(|p| (i, p)))
        .map(|(i, p)| (i, Point::new(cx + (p.x - cx) * 2.0, cy + (p.y - cy) * 2.0)))
        .collect();
      near.face = Some(scaled);
    }
    let observation = classifier.update(&near).unwrap();
    let measurement = observation.measurement.unwrap();
    assert!((measurement.face_h - 400.0).abs() < 1e-9);
    let expected_scale = (0.7 * 200.0 + 0.3 * 300.0) / (0.7 * 400.0 + 0.3 * 300.0);
    assert!((measurement.scale_ratio - expected_scale).abs() < 1e-12);
  }

  #[test]
  fn detection_failure_carries_score_forward() {
    let mut classifier = calibrated();
    assert_eq!(
      classifier.update(&LandmarkFrame::missing(0)).unwrap().label,
      PostureLabel::Unknown
    );

    let first = classifier.update(&frame(1, 0.4, true)).unwrap();
    let carried = classifier.update(&LandmarkFrame::missing(2)).unwrap();
    assert_eq!(carried.label, first.label);
    assert_eq!(carried.smooth_score, first.smooth_score);
    assert_eq!(classifier.prev_smooth_score(), first.smooth_score);
  }

  #[test]
  fn zero_face_height_is_a_detection_failure() {
    let mut classifier = calibrated();
    classifier.update(&frame(0, 1.0, true)).unwrap();
    let mut flat = frame(1, 0.4, true);
    if let Some(face) = flat.face.as_mut() {
      let forehead = face.get(face_mesh::FOREHEAD).unwrap();
      face.insert(face_mesh::CHIN, forehead);
    }
    let observation = classifier.update(&flat).unwrap();
    assert_eq!(observation.smooth_score, Some(2.5));
    assert!(observation.measurement.is_none());
  }

  #[test]
  fn missing_shoulders_fall_back_to_distance() {
    let mut classifier = calibrated();
    // 外眼角间距 130px，约 46cm，属于过近
    let observation = classifier.update(&frame(0, 1.0, false)).unwrap();
    let distance = observation.distance_cm.unwrap();
    assert!((distance - 6000.0 / 130.0).abs() < 1e-9);
    assert_eq!(observation.smooth_score, Some(0.5));
    assert_eq!(observation.label, PostureLabel::Hunched);

    let config = PostureConfig {
      distance_fallback: false,
      ..PostureConfig::default()
    };
    let mut classifier = PostureClassifier::with_profile(config, *calibrated().profile().unwrap());
    let observation = classifier.update(&frame(0, 1.0, false)).unwrap();
    assert_eq!(observation.label, PostureLabel::Unknown);
  }

  #[test]
  fn proxy_calibration_without_shoulders() {
    let mut classifier = PostureClassifier::new(PostureConfig::default());
    for i in 0..60 {
      classifier.update(&frame(i, 1.0, false)).unwrap();
    }
    let profile = *classifier.profile().unwrap();
    assert_eq!(profile.source, ScaleSource::EyeCorners);
    assert!((profile.shoulder_ref - 130.0).abs() < 1e-9);

    let observation = classifier.update(&frame(60, 1.0, true)).unwrap();
    let measurement = observation.measurement.unwrap();
    assert!((measurement.sh_w - 130.0).abs() < 1e-9);
    assert!((measurement.scale_ratio - 1.0).abs() < 1e-12);
    assert_eq!(observation.label, PostureLabel::Straight);
  }

  #[test]
  fn calibration_without_samples_fails() {
    let config = PostureConfig {
      calibration_frames: 5,
      ..PostureConfig::default()
    };
    let mut classifier = PostureClassifier::new(config);
    for i in 0..4 {
      classifier.update(&LandmarkFrame::missing(i)).unwrap();
    }
    let error = classifier.update(&LandmarkFrame::missing(4)).unwrap_err();
    assert_eq!(
      error,
      PostureError::NoCalibrationSamples {
        frames: 5,
        face_samples: 0,
        scale_samples: 0,
      }
    );
  }

  #[test]
  fn short_video_calibrates_with_collected_samples() {
    let mut classifier = PostureClassifier::new(PostureConfig::default());
    for i in 0..10 {
      classifier.update(&frame(i, 1.0, true)).unwrap();
    }
    assert!(classifier.profile().is_none());
    classifier.finish().unwrap();
    assert!(classifier.profile().is_some());

    let mut empty = PostureClassifier::new(PostureConfig::default());
    empty.update(&LandmarkFrame::missing(0)).unwrap();
    assert!(empty.finish().is_err());
  }

  #[test]
  fn calibration_median_resists_outlier() {
    let mut samples = CalibrationSamples::default();
    let config = PostureConfig::default();
    for i in 0..9 {
      samples.collect(&frame(i, 1.0, true), &config);
    }
    samples.face.push(790.0);
    samples.shoulder.push(2000.0);
    let profile = CalibrationProfile::from_samples(&samples, 10).unwrap();
    assert!((profile.face_ref - FACE_H).abs() < 1e-9);
    assert!((profile.shoulder_ref - SHOULDER_W).abs() < 1e-9);
  }

  #[test]
  fn out_of_range_face_is_not_sampled() {
    let mut samples = CalibrationSamples::default();
    let mut tiny = frame(0, 1.0, true);
    if let Some(face) = tiny.face.as_mut() {
      let forehead = face.get(face_mesh::FOREHEAD).unwrap();
      face.insert(face_mesh::CHIN, Point::new(forehead.x, forehead.y + 30.0));
    }
    samples.collect(&tiny, &PostureConfig::default());
    assert!(samples.is_empty());
  }
}
