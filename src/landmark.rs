// 该文件是 Duanzuo （端坐） 项目的一部分。
// src/landmark.rs - 关键点帧定义
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

use serde::{Deserialize, Serialize};

/// 面部网格（MediaPipe Face Mesh）关键点索引
pub mod face_mesh {
  /// 左眼轮廓 p1..p6
  pub const LEFT_EYE: [u32; 6] = [33, 160, 158, 133, 153, 144];
  /// 右眼轮廓 p1..p6
  pub const RIGHT_EYE: [u32; 6] = [362, 385, 387, 263, 373, 380];

  pub const NOSE_TIP: u32 = 1;
  pub const FOREHEAD: u32 = 10;
  pub const CHIN: u32 = 152;
  pub const LEFT_EYE_OUTER: u32 = 33;
  pub const RIGHT_EYE_OUTER: u32 = 263;
}

/// 人体姿态（MediaPipe Pose）关键点索引
pub mod pose {
  pub const LEFT_SHOULDER: u32 = 11;
  pub const RIGHT_SHOULDER: u32 = 12;
}

/// 像素坐标系下的二维点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn distance(&self, other: &Point) -> f64 {
    (self.x - other.x).hypot(self.y - other.y)
  }

  pub fn midpoint(&self, other: &Point) -> Point {
    Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
  }

  pub fn is_finite(&self) -> bool {
    self.x.is_finite() && self.y.is_finite()
  }
}

impl From<[f64; 2]> for Point {
  fn from([x, y]: [f64; 2]) -> Self {
    Point::new(x, y)
  }
}

impl From<Point> for [f64; 2] {
  fn from(point: Point) -> Self {
    [point.x, point.y]
  }
}

/// 命名关键点集合，索引到坐标的映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks {
  points: BTreeMap<u32, Point>,
}

impl Landmarks {
  /// 坐标不是有限值的点按缺失处理
  pub fn get(&self, index: u32) -> Option<Point> {
    self.points.get(&index).copied().filter(Point::is_finite)
  }

  pub fn insert(&mut self, index: u32, point: Point) {
    self.points.insert(index, point);
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// 按固定顺序取出一组关键点，任意一个缺失则返回 None
  pub fn select<const N: usize>(&self, indices: [u32; N]) -> Option<[Point; N]> {
    let mut points = [Point::new(0.0, 0.0); N];
    for (slot, index) in points.iter_mut().zip(indices) {
      *slot = self.get(index)?;
    }
    Some(points)
  }

  /// 把归一化坐标缩放到像素坐标
  pub fn scaled(mut self, width: f64, height: f64) -> Self {
    for point in self.points.values_mut() {
      point.x *= width;
      point.y *= height;
    }
    self
  }
}

impl FromIterator<(u32, Point)> for Landmarks {
  fn from_iter<T: IntoIterator<Item = (u32, Point)>>(iter: T) -> Self {
    Self {
      points: iter.into_iter().collect(),
    }
  }
}

/// 单帧关键点，`None` 表示该模型在这一帧没有检测到目标
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkFrame {
  pub index: u64,
  pub face: Option<Landmarks>,
  pub pose: Option<Landmarks>,
}

impl LandmarkFrame {
  pub fn new(index: u64, face: Option<Landmarks>, pose: Option<Landmarks>) -> Self {
    Self { index, face, pose }
  }

  /// 没有任何检测结果的帧
  pub fn missing(index: u64) -> Self {
    Self {
      index,
      face: None,
      pose: None,
    }
  }

  pub fn face_detected(&self) -> bool {
    self.face.is_some()
  }

  /// 左右肩关键点
  pub fn shoulders(&self) -> Option<(Point, Point)> {
    let body = self.pose.as_ref()?;
    let [left, right] = body.select([pose::LEFT_SHOULDER, pose::RIGHT_SHOULDER])?;
    Some((left, right))
  }

  /// 两眼外眼角的水平距离，作为相机距离的代理量
  pub fn eye_outer_width(&self) -> Option<f64> {
    let face = self.face.as_ref()?;
    let [left, right] = face.select([face_mesh::LEFT_EYE_OUTER, face_mesh::RIGHT_EYE_OUTER])?;
    let width = (left.x - right.x).abs();
    width.is_finite().then_some(width)
  }
}
