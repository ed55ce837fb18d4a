// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pointy-top hexagonal grid over Web Mercator world space.
//!
//! Cells use axial coordinates `(q, r)`. A point belongs to the cell whose
//! center is nearest, found by cube rounding the fractional axial position.

use std::f64::consts::PI;

use crate::geo::WorldPoint;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Axial coordinate of one hexagon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexCell {
    pub q: i32,
    pub r: i32,
}

impl HexCell {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }
}

/// Hexagon tiling with a fixed center-to-corner radius in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexGrid {
    radius: f64,
}

impl HexGrid {
    pub fn new(radius: f64) -> Self {
        debug_assert!(radius > 0.0, "hexagon radius must be positive");
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Cell containing `point`.
    pub fn cell_of(&self, point: WorldPoint) -> HexCell {
        let q = (SQRT_3 / 3.0 * point.x - point.y / 3.0) / self.radius;
        let r = (2.0 / 3.0 * point.y) / self.radius;
        cube_round(q, r)
    }

    /// Center of `cell` in world space.
    pub fn center(&self, cell: HexCell) -> WorldPoint {
        let q = f64::from(cell.q);
        let r = f64::from(cell.r);
        WorldPoint::new(
            self.radius * SQRT_3 * (q + r / 2.0),
            self.radius * 1.5 * r,
        )
    }

    /// Corners of `cell` shrunk toward its center by `coverage`.
    ///
    /// Corners run clockwise on screen (y grows south), starting with the
    /// lower-right corner.
    pub fn corners(&self, cell: HexCell, coverage: f64) -> [WorldPoint; 6] {
        let center = self.center(cell);
        let size = self.radius * coverage;
        std::array::from_fn(|i| {
            let angle = PI / 6.0 + PI / 3.0 * i as f64;
            WorldPoint::new(center.x + size * angle.cos(), center.y + size * angle.sin())
        })
    }
}

fn cube_round(q: f64, r: f64) -> HexCell {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }

    HexCell::new(rq as i32, rr as i32)
}
