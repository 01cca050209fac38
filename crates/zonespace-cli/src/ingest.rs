//! The per-jurisdiction ingest pipeline.
//!
//! For every discovered jurisdiction: parse its ruleset, load its spatial
//! layer, run the `before` hook, resolve and join zoning attributes, run the
//! `after` hook, and hand the batch to the collater. One collater serves the
//! whole run, producing a single canonical output layer.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;
use zonespace_config::IngestConfig;
use zonespace_hooks::{run_after, run_before, HookContext};
use zonespace_io::{read_features, Collater};
use zonespace_overlay::OverlayOptions;
use zonespace_ruleset::{spatial_join, Ruleset};

pub struct Ingester {
    config: IngestConfig,
}

impl Ingester {
    pub fn new(config: IngestConfig) -> Self {
        Ingester { config }
    }

    /// Ingests every selected jurisdiction into `outfile`.
    pub fn run(&self, outfile: &Path) -> Result<()> {
        let slugs = self.discover()?;
        if slugs.is_empty() {
            bail!(
                "no ruleset specs selected in {}",
                self.config.specs_dir.display()
            );
        }
        info!(event = "ingest_run", jurisdictions = slugs.len());

        // every spec needs a matching spatial layer before any work starts
        let missing: Vec<&String> = slugs
            .iter()
            .filter(|slug| !self.data_path(slug).exists())
            .collect();
        if !missing.is_empty() {
            bail!(
                "missing spatial layers for: {}",
                missing
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let mut collater = Collater::create(outfile)
            .with_context(|| format!("cannot create output file {}", outfile.display()))?;
        for slug in &slugs {
            self.ingest(slug, &mut collater)
                .with_context(|| format!("ingesting {slug}"))?;
        }
        collater.finish()?;
        Ok(())
    }

    /// Finds the selected jurisdiction slugs: every `<slug>.csv` under the
    /// specs directory, filtered by the configured include/exclude lists.
    pub fn discover(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.config.specs_dir).with_context(|| {
            format!("cannot read specs dir {}", self.config.specs_dir.display())
        })?;

        let mut slugs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if self.config.selects(stem) {
                        slugs.push(stem.to_string());
                    }
                }
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    fn ingest<W: Write>(&self, slug: &str, collater: &mut Collater<W>) -> Result<()> {
        info!(event = "ingest_start", slug);

        let spec_path = self.config.specs_dir.join(format!("{slug}.csv"));
        let ruleset = Ruleset::from_reader(File::open(&spec_path)?)
            .with_context(|| format!("parsing ruleset {}", spec_path.display()))?;

        let features = read_features(self.data_path(slug))?;
        let loaded = features.len();

        let context = HookContext {
            data_dir: self.config.data_dir.clone(),
            overlay: OverlayOptions::default()
                .with_min_area(self.config.overlay.min_area_sq_meters)
                .with_sliver_buffer(self.config.overlay.sliver_buffer_meters),
        };

        let features = run_before(slug, features, &context)?;
        let features = spatial_join(features, &ruleset);
        let features = run_after(slug, features, &context)?;

        collater.collate(&features)?;
        info!(
            event = "ingest_done",
            slug,
            loaded,
            collated = features.len(),
        );
        Ok(())
    }

    fn data_path(&self, slug: &str) -> PathBuf {
        self.config.data_dir.join(format!("{slug}.geojson"))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SPEC: &str = "\
jurisdiction,Springfield
column,code

code,maxHeightFeet,multiFamily
R-1,35,no
R-2,45,yes
";

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"code": "R-1"},
             "geometry": {"type": "Polygon",
              "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
            {"type": "Feature", "properties": {"code": "X-9"},
             "geometry": {"type": "Polygon",
              "coordinates": [[[20,0],[30,0],[30,10],[20,10],[20,0]]]}}
        ]
    }"#;

    fn workspace() -> (tempfile::TempDir, IngestConfig) {
        let dir = tempfile::tempdir().unwrap();
        let specs = dir.path().join("specs");
        let data = dir.path().join("data");
        fs::create_dir_all(&specs).unwrap();
        fs::create_dir_all(&data).unwrap();
        fs::write(specs.join("springfield.csv"), SPEC).unwrap();
        fs::write(data.join("springfield.geojson"), LAYER).unwrap();

        let config = IngestConfig::new().with_specs_dir(&specs).with_data_dir(&data);
        (dir, config)
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let (dir, config) = workspace();
        let specs = config.specs_dir.clone();
        fs::write(specs.join("aardvark.csv"), SPEC).unwrap();
        fs::write(specs.join("notes.txt"), "not a spec").unwrap();

        let ingester = Ingester::new(config.clone().with_exclude(["aardvark"]));
        assert_eq!(ingester.discover().unwrap(), vec!["springfield"]);

        let ingester = Ingester::new(config);
        assert_eq!(ingester.discover().unwrap(), vec!["aardvark", "springfield"]);
        drop(dir);
    }

    #[test]
    fn test_run_requires_spatial_layers() {
        let (dir, config) = workspace();
        fs::write(config.specs_dir.join("ghost.csv"), SPEC).unwrap();

        let outfile = dir.path().join("out.geojson");
        let err = Ingester::new(config).run(&outfile).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_full_pipeline_produces_canonical_layer() {
        let (dir, config) = workspace();
        let outfile = dir.path().join("out.geojson");
        Ingester::new(config).run(&outfile).unwrap();

        let out: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&outfile).unwrap()).unwrap();
        let features = out["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let by_zone = |zone: &str| {
            features
                .iter()
                .find(|f| f["properties"]["zone"] == zone)
                .unwrap_or_else(|| panic!("no feature for zone {zone}"))
        };

        let resolved = &by_zone("R-1")["properties"];
        assert_eq!(resolved["jurisdiction"], "Springfield");
        assert_eq!(resolved["multiFamily"], "no");
        let height = resolved["loMaxHeightMeters"].as_f64().unwrap();
        assert!((height - 35.0 * 0.3048).abs() < 1e-9);

        // unmatched zones keep their geometry with null attributes
        let unmatched = &by_zone("X-9")["properties"];
        assert_eq!(unmatched["jurisdiction"], "Springfield");
        assert_eq!(unmatched["multiFamily"], serde_json::Value::Null);
    }
}
