// 该文件是 Duanzuo （端坐） 项目的一部分。
// tests/common/mod.rs - 合成关键点
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

#![allow(dead_code)]

use duanzuo::landmark::{Landmarks, Point, face_mesh, pose};

pub const FOREHEAD_Y: f64 = 20.0;
pub const CHIN_Y: f64 = 220.0;
pub const SHOULDER_Y: f64 = 300.0;

/// 坐直时鼻尖远高于肩线
pub const STRAIGHT_NOSE_Y: f64 = 100.0;
/// 含胸时鼻尖接近肩线
pub const HUNCHED_NOSE_Y: f64 = 250.0;

fn eye(indices: [u32; 6], x0: f64, y: f64, ear: f64) -> Vec<(u32, Point)> {
  // 眼宽 30px，EAR = 4h / 60
  let h = 15.0 * ear;
  let points = [
    Point::new(x0, y),
    Point::new(x0 + 10.0, y - h),
    Point::new(x0 + 20.0, y - h),
    Point::new(x0 + 30.0, y),
    Point::new(x0 + 20.0, y + h),
    Point::new(x0 + 10.0, y + h),
  ];
  indices.into_iter().zip(points).collect()
}

/// 双眼 EAR 均为 `ear` 的人脸，外眼角间距 100px，脸高 200px
pub fn face(ear: f64, nose_y: f64) -> Landmarks {
  let mut points = eye(face_mesh::LEFT_EYE, 100.0, 80.0, ear);
  points.extend(eye(face_mesh::RIGHT_EYE, 170.0, 80.0, ear));
  points.push((face_mesh::NOSE_TIP, Point::new(150.0, nose_y)));
  points.push((face_mesh::FOREHEAD, Point::new(150.0, FOREHEAD_Y)));
  points.push((face_mesh::CHIN, Point::new(150.0, CHIN_Y)));
  points.into_iter().collect()
}

/// 肩宽 200px
pub fn shoulders() -> Landmarks {
  [
    (pose::LEFT_SHOULDER, Point::new(50.0, SHOULDER_Y)),
    (pose::RIGHT_SHOULDER, Point::new(250.0, SHOULDER_Y)),
  ]
  .into_iter()
  .collect()
}

/// 输入文件中的一帧
pub fn frame_json(ear: f64, nose_y: f64) -> serde_json::Value {
  serde_json::json!({
    "face": face(ear, nose_y),
    "pose": shoulders(),
  })
}
