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

//! Hexagon density layers.
//!
//! A [`HexLayer`] bins either the takeoff or the landing position of every
//! flight in a table and keeps one [`HexBin`] per non-empty hexagon. The
//! bin count drives both the extrusion height and the fill colour:
//!
//! - elevation is linear from the `[min, max]` count domain onto
//!   [`LayerStyle::elevation_range`], then multiplied by
//!   [`LayerStyle::elevation_scale`]
//! - colour is the count quantized over the same domain into
//!   [`LayerStyle::color_range`]

mod grid;

pub use grid::{HexCell, HexGrid};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::geo::{WebMercator, WorldPoint};
use crate::table::{TrackPoint, TrackTable};
use crate::Error;

/// Which end of the flight a layer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    Takeoff,
    Landing,
}

impl MapMode {
    pub const ALL: [MapMode; 2] = [MapMode::Takeoff, MapMode::Landing];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapMode::Takeoff => "takeoff",
            MapMode::Landing => "landing",
        }
    }

    /// Panel heading
    pub fn display_name(&self) -> &'static str {
        match self {
            MapMode::Takeoff => "Takeoff",
            MapMode::Landing => "Landing",
        }
    }

    /// `(lon, lat)` this mode bins on.
    pub fn position(&self, point: &TrackPoint) -> (f64, f64) {
        match self {
            MapMode::Takeoff => point.origin(),
            MapMode::Landing => point.destination(),
        }
    }
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "takeoff" => Ok(MapMode::Takeoff),
            "landing" => Ok(MapMode::Landing),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

/// Fixed rendering parameters of a density layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    /// Hexagon radius in meters on the ground
    pub radius_m: f64,
    pub elevation_scale: f64,
    /// Elevation in meters before scaling, for the smallest and largest count
    pub elevation_range: (f64, f64),
    pub extruded: bool,
    /// Fraction of the radius actually drawn (0.0 - 1.0)
    pub coverage: f64,
    /// Six-step ramp from sparse to dense
    pub color_range: [[u8; 3]; 6],
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            radius_m: 1000.0,
            elevation_scale: 4.0,
            elevation_range: (0.0, 10.0),
            extruded: true,
            coverage: 0.6,
            color_range: [
                [255, 255, 178],
                [254, 217, 118],
                [254, 178, 76],
                [253, 141, 60],
                [240, 59, 32],
                [189, 0, 38],
            ],
        }
    }
}

/// One non-empty hexagon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexBin {
    pub cell: HexCell,
    pub center: WorldPoint,
    pub count: u32,
}

/// Binned takeoff or landing density for one filtered view.
#[derive(Debug, Clone)]
pub struct HexLayer {
    mode: MapMode,
    style: LayerStyle,
    grid: HexGrid,
    bins: Vec<HexBin>,
    index: HashMap<HexCell, usize>,
    domain: (u32, u32),
    total: usize,
}

impl HexLayer {
    /// Bin `table` on the positions selected by `mode`.
    ///
    /// The hexagon radius is converted to world units at `reference_lat`,
    /// normally the latitude the map is centered on.
    pub fn build(table: &TrackTable, mode: MapMode, reference_lat: f64, style: LayerStyle) -> Self {
        let grid = HexGrid::new(WebMercator::meters_to_units(style.radius_m, reference_lat));

        let mut counts: HashMap<HexCell, u32> = HashMap::new();
        let mut unplaced = 0usize;
        for point in table {
            let (lon, lat) = mode.position(point);
            if !(lon.is_finite() && lat.is_finite()) {
                unplaced += 1;
                continue;
            }
            *counts.entry(grid.cell_of(WebMercator::project(lon, lat))).or_default() += 1;
        }

        let mut bins: Vec<HexBin> = counts
            .into_iter()
            .map(|(cell, count)| HexBin {
                cell,
                center: grid.center(cell),
                count,
            })
            .collect();
        // Back to front when drawn with a northward pitch
        bins.sort_unstable_by_key(|bin| (bin.cell.r, bin.cell.q));

        let index = bins.iter().enumerate().map(|(i, bin)| (bin.cell, i)).collect();
        let domain = bins
            .iter()
            .map(|bin| bin.count)
            .fold(None, |acc: Option<(u32, u32)>, count| match acc {
                Some((lo, hi)) => Some((lo.min(count), hi.max(count))),
                None => Some((count, count)),
            })
            .unwrap_or((0, 0));

        if unplaced > 0 {
            debug!("{mode} layer: {unplaced} flights without a position left out");
        }
        debug!(
            "Built {} layer: {} flights in {} hexagons, counts {}..={}",
            mode,
            table.len(),
            bins.len(),
            domain.0,
            domain.1
        );

        Self {
            mode,
            style,
            grid,
            bins,
            index,
            domain,
            total: table.len() - unplaced,
        }
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn style(&self) -> &LayerStyle {
        &self.style
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn bins(&self) -> &[HexBin] {
        &self.bins
    }

    /// Number of flights binned
    pub fn total(&self) -> usize {
        self.total
    }

    /// Smallest and largest bin count, `(0, 0)` when empty.
    pub fn count_domain(&self) -> (u32, u32) {
        self.domain
    }

    /// Bin under `point`, if that hexagon has any flights.
    pub fn bin_at(&self, point: WorldPoint) -> Option<&HexBin> {
        self.index
            .get(&self.grid.cell_of(point))
            .map(|&i| &self.bins[i])
    }

    /// Extrusion height of `bin` in meters.
    pub fn elevation_m(&self, bin: &HexBin) -> f64 {
        if !self.style.extruded {
            return 0.0;
        }
        let (low, high) = self.style.elevation_range;
        (low + (high - low) * self.normalized(bin.count)) * self.style.elevation_scale
    }

    /// Fill colour of `bin` as RGB.
    pub fn color(&self, bin: &HexBin) -> [u8; 3] {
        let steps = self.style.color_range.len();
        let (lo, hi) = self.domain;
        let step = if hi > lo {
            ((self.normalized(bin.count) * steps as f64).floor() as usize).min(steps - 1)
        } else {
            steps - 1
        };
        self.style.color_range[step]
    }

    /// Hover text for `bin`, e.g. `Takeoffs: 12`.
    pub fn tooltip(&self, bin: &HexBin) -> String {
        format!("{}s: {}", self.mode.display_name(), bin.count)
    }

    fn normalized(&self, count: u32) -> f64 {
        let (lo, hi) = self.domain;
        if hi > lo {
            f64::from(count.saturating_sub(lo)) / f64::from(hi - lo)
        } else {
            0.5
        }
    }
}
