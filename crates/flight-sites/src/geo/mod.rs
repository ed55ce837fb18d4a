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

//! Web Mercator projection utilities.
//!
//! World coordinates are normalized to the unit square: `x` grows east from
//! the antimeridian, `y` grows south from the northern clip latitude. A slippy
//! map tile coordinate at zoom `z` is the world coordinate times `2^z`.

use std::f64::consts::PI;

/// Equatorial circumference of the WGS84 ellipsoid, in meters.
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Latitude at which the projection becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// A position in normalized Web Mercator space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug)]
pub struct WebMercator;

impl WebMercator {
    /// Project a longitude/latitude pair to the unit square.
    pub fn project(lon: f64, lat: f64) -> WorldPoint {
        WorldPoint::new(Self::lon_to_x(lon, 0.0), Self::lat_to_y(lat, 0.0))
    }

    /// Inverse of [`WebMercator::project`], returning `(lon, lat)`.
    pub fn unproject(point: WorldPoint) -> (f64, f64) {
        (Self::tile_to_lon(point.x, 0.0), Self::tile_to_lat(point.y, 0.0))
    }

    /// Convert longitude to a tile X coordinate at `zoom`
    pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
        ((lon + 180.0) / 360.0) * zoom.exp2()
    }

    /// Convert latitude to a tile Y coordinate at `zoom`
    pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
        let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
        y * zoom.exp2()
    }

    /// Convert a tile Y coordinate back to latitude
    pub fn tile_to_lat(y: f64, zoom: f64) -> f64 {
        let n = zoom.exp2();
        (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees()
    }

    /// Convert a tile X coordinate back to longitude
    pub fn tile_to_lon(x: f64, zoom: f64) -> f64 {
        x / zoom.exp2() * 360.0 - 180.0
    }

    /// Ground distance covered by one world unit at `lat`.
    pub fn meters_per_unit(lat: f64) -> f64 {
        EARTH_CIRCUMFERENCE_M * lat.to_radians().cos()
    }

    /// Length of `meters` on the ground at `lat`, in world units.
    pub fn meters_to_units(meters: f64, lat: f64) -> f64 {
        meters / Self::meters_per_unit(lat)
    }
}
