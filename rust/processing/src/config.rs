// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables.

use shp_terrain_core::RecordSelection;
use shp_terrain_geometry::{ChunkConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Record collection fed to the triangulator.
    pub selection: RecordSelection,
    /// Chunk builder options.
    pub chunk: ChunkConfig,
    /// Elevation used for points without a stored z.
    pub fallback_elevation: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            selection: RecordSelection::default(),
            chunk: ChunkConfig::default(),
            fallback_elevation: 0.0,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// - `SHP_TERRAIN_CHUNK_SIZE`: triangles per chunk (default 20000, at most
    ///   [`MAX_CHUNK_SIZE`])
    /// - `SHP_TERRAIN_PARALLEL`: build chunks on the rayon pool (default true)
    /// - `SHP_TERRAIN_SELECTION`: `split` or `original` (default split)
    /// - `SHP_TERRAIN_FALLBACK_ELEVATION`: elevation for planar points (default 0)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parallel = match lookup("SHP_TERRAIN_PARALLEL")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("0" | "false" | "no" | "off") => false,
            _ => true,
        };

        let chunk = ChunkConfig::default()
            .with_chunk_size(
                lookup("SHP_TERRAIN_CHUNK_SIZE")
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .filter(|size| (1..=MAX_CHUNK_SIZE).contains(size))
                    .unwrap_or(DEFAULT_CHUNK_SIZE),
            )
            .with_parallel(parallel);

        Self {
            selection: lookup("SHP_TERRAIN_SELECTION")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            chunk,
            fallback_elevation: lookup("SHP_TERRAIN_FALLBACK_ELEVATION")
                .and_then(|v| v.trim().parse().ok())
                .filter(|v: &f64| v.is_finite())
                .unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[]));
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.chunk.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.chunk.parallel);
        assert_eq!(config.selection, RecordSelection::Split);
        assert_eq!(config.fallback_elevation, 0.0);
    }

    #[test]
    fn test_values_are_read() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("SHP_TERRAIN_CHUNK_SIZE", "512"),
            ("SHP_TERRAIN_PARALLEL", "false"),
            ("SHP_TERRAIN_SELECTION", "original"),
            ("SHP_TERRAIN_FALLBACK_ELEVATION", "-12.5"),
        ]));
        assert_eq!(config.chunk.chunk_size, 512);
        assert!(!config.chunk.parallel);
        assert_eq!(config.selection, RecordSelection::Original);
        assert_eq!(config.fallback_elevation, -12.5);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("SHP_TERRAIN_CHUNK_SIZE", "0"),
            ("SHP_TERRAIN_PARALLEL", "maybe"),
            ("SHP_TERRAIN_SELECTION", "everything"),
            ("SHP_TERRAIN_FALLBACK_ELEVATION", "NaN"),
        ]));
        assert_eq!(config, PipelineConfig::default());

        for size in ["lots", "18446744073709551615"] {
            let config = PipelineConfig::from_lookup(lookup(&[("SHP_TERRAIN_CHUNK_SIZE", size)]));
            assert_eq!(config.chunk.chunk_size, DEFAULT_CHUNK_SIZE);
        }
    }
}
