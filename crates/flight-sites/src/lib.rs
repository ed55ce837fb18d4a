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

//! Data layer for the paragliding takeoff and landing site viewer.
//!
//! The crate turns a pre-extracted table of flight endpoints into hexagon
//! density layers. It is split into small layers that can be used on their own:
//!
//! - **Table layer**: loading the compressed CSV extract and applying the
//!   regional bounding box
//! - **Filter layer**: narrowing the table by minimum flight duration, with a
//!   per-threshold cache
//! - **Hexbin layer**: binning takeoff or landing positions into a hexagonal
//!   grid and scaling counts to elevation and colour
//!
//! # Quick Start
//!
//! ```no_run
//! use flight_sites::{load, DurationFilter, HexLayer, LayerStyle, MapMode};
//! use std::sync::Arc;
//!
//! let table = Arc::new(load("data_all.csv.gz")?);
//! let mut filter = DurationFilter::new(Arc::clone(&table));
//!
//! let view = filter.apply(30);
//! let takeoffs = HexLayer::build(&view, MapMode::Takeoff, 45.3068009, LayerStyle::default());
//! println!("{} flights over 30 minutes in {} hexagons", view.len(), takeoffs.bins().len());
//! # Ok::<(), flight_sites::Error>(())
//! ```
//!
//! Modes can also be parsed from their names, which rejects anything that is
//! not a known mode:
//!
//! ```
//! use flight_sites::MapMode;
//!
//! assert_eq!("landing".parse::<MapMode>().unwrap(), MapMode::Landing);
//! assert!("approach".parse::<MapMode>().is_err());
//! ```

pub mod error;
pub mod filter;
pub mod geo;
pub mod hexbin;
pub mod table;

pub use error::Error;
pub use filter::{filter, DurationFilter, MAX_DURATION_MINUTES};
pub use geo::{WebMercator, WorldPoint};
pub use hexbin::{HexBin, HexCell, HexGrid, HexLayer, LayerStyle, MapMode};
pub use table::{load, load_from_reader, BoundingBox, TrackPoint, TrackTable, DEFAULT_DATA_PATH};
