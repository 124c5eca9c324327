//! Built-in data for running without input files.

use genoview_core::views::{Annotation, Snp};
use genoview_core::{CoordSys, Extras, FeatureRecord};

/// GRCh37 positions of a few well-known association loci.
const LOCI: [(&str, u64, u64, &str); 6] = [
    ("1", 196_621_008, 95_665, "CFH"),
    ("10", 112_950_247, 215_863, "TCF7L2"),
    ("16", 53_737_875, 410_507, "FTO"),
    ("17", 7_571_720, 19_149, "TP53"),
    ("17", 41_196_312, 81_189, "BRCA1"),
    ("19", 45_409_011, 3_612, "APOE"),
];

const SNPS_PER_SEGMENT: u64 = 400;

/// Background noise on every segment plus a peak at each locus.
pub fn snps(coords: &CoordSys) -> Vec<FeatureRecord<Snp>> {
    let mut out = Vec::new();
    let mut id = 0u64;
    for (s, segment) in coords.segments().iter().enumerate() {
        let spacing = (segment.size / SNPS_PER_SEGMENT).max(1);
        for i in 0..SNPS_PER_SEGMENT.min(segment.size) {
            id += 1;
            // cheap deterministic scatter in [0, 5)
            let noise = ((i * 7919 + s as u64 * 104_729) % 1000) as f64 / 200.0;
            out.push(record(&segment.id, i * spacing, id, noise, None));
        }
    }
    for (n, &(segment, start, length, gene)) in LOCI.iter().enumerate() {
        for k in 0..5u64 {
            id += 1;
            let score = 7.0 + n as f64 * 0.8 - k.abs_diff(2) as f64 * 0.6;
            out.push(record(segment, start + k * length / 4, id, score, Some(gene)));
        }
    }
    out
}

pub fn genes() -> Vec<FeatureRecord<Annotation>> {
    LOCI.iter()
        .map(|&(segment, start, length, gene)| FeatureRecord {
            segment: segment.into(),
            offset: start,
            payload: Annotation {
                name: gene.to_string(),
                length,
            },
            extra: Extras::new(),
        })
        .collect()
}

fn record(segment: &str, offset: u64, id: u64, score: f64, gene: Option<&str>) -> FeatureRecord<Snp> {
    let mut extra = Extras::new();
    if let Some(gene) = gene {
        // a string always serializes
        let _ = extra.insert("gene", gene);
    }
    FeatureRecord {
        segment: segment.into(),
        offset,
        payload: Snp {
            rsid: format!("rs{id}"),
            score,
        },
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genoview_core::FeatureSet;

    #[test]
    fn demo_data_fits_the_default_build() {
        let coords = CoordSys::build(
            genoview_core::config::GenomeBuild::Grch37
                .segments()
                .into_iter()
                .map(|s| (s.id, s.size)),
            0,
        )
        .unwrap();
        let (set, dropped) = FeatureSet::build(&coords, snps(&coords));
        assert_eq!(dropped, 0);
        assert_eq!(set.len() as u64, 24 * SNPS_PER_SEGMENT + 30);
        let (genes, dropped) = FeatureSet::build(&coords, genes());
        assert_eq!((genes.len(), dropped), (6, 0));
    }

    #[test]
    fn loci_peak_above_genome_wide_significance() {
        let coords = CoordSys::build([("19", 59_128_983)], 0).unwrap();
        let peak = snps(&coords)
            .into_iter()
            .filter(|r| r.extra.get::<String>("gene").as_deref() == Some("APOE"))
            .map(|r| r.payload.score)
            .fold(f64::MIN, f64::max);
        assert!(peak > 7.3);
    }
}
