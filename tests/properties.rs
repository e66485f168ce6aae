//! Property-based tests for the sequence formats and statistics helpers.
//!
//! Uses proptest to check the invariants that hold for any input: FastA
//! wrapping round-trips, histogram counts sum to the sample size, the
//! allele-entropy statistic stays bounded.

use enveomics::fasta::{FastaReader, FastaRecord, FastaWriter};
use enveomics::range::SeqRange;
use enveomics::stats::Sample;
use enveomics::vcf::VcfVariant;
use proptest::prelude::*;

/// Sequences over the nucleotide alphabet, including ambiguity codes.
fn arb_seq() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            Just('A'),
            Just('C'),
            Just('G'),
            Just('T'),
            Just('N'),
            Just('a'),
            Just('t'),
        ],
        1..400,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn arb_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.]{1,24}"
}

mod fasta_properties {
    use super::*;

    proptest! {
        /// Writing at any wrap width and reading back preserves the record.
        #[test]
        fn wrap_round_trip(id in arb_id(), seq in arb_seq(), wrap in 0usize..120) {
            let record = FastaRecord::new(id, seq);
            let mut writer = FastaWriter::new(Vec::new(), wrap);
            writer.write_record(&record).unwrap();
            let bytes = writer.into_inner();

            let parsed: Vec<_> = FastaReader::new(bytes.as_slice())
                .collect::<enveomics::Result<_>>()
                .unwrap();
            prop_assert_eq!(parsed.len(), 1);
            prop_assert_eq!(&parsed[0], &record);
        }

        /// No wrapped line of sequence exceeds the requested width.
        #[test]
        fn wrap_width_respected(seq in arb_seq(), wrap in 1usize..80) {
            let record = FastaRecord::new("s", seq);
            let mut writer = FastaWriter::new(Vec::new(), wrap);
            writer.write_record(&record).unwrap();
            let text = String::from_utf8(writer.into_inner()).unwrap();
            for line in text.lines().filter(|l| !l.starts_with('>')) {
                prop_assert!(line.len() <= wrap);
            }
        }

        /// Reverse complement is an involution on unambiguous sequences.
        #[test]
        fn revcomp_involution(seq in "[ACGT]{1,200}") {
            use enveomics::fasta::reverse_complement;
            prop_assert_eq!(reverse_complement(&reverse_complement(&seq)), seq);
        }
    }
}

mod range_properties {
    use super::*;

    proptest! {
        /// Display and FromStr agree, including for ids with colons.
        #[test]
        fn display_parse_round_trip(
            id in "[A-Za-z0-9_.:]{1,24}",
            from in 1usize..10_000,
            span in 0usize..500,
            complement in any::<bool>(),
        ) {
            let range = SeqRange::new(id, from, from + span, complement).unwrap();
            let reparsed: SeqRange = range.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, range);
        }
    }
}

mod stats_properties {
    use super::*;

    proptest! {
        /// Histogram bin counts always sum to the sample size.
        #[test]
        fn histogram_counts_sum(
            values in proptest::collection::vec(-1e4f64..1e4, 1..200),
            bin_width in 0.5f64..100.0,
        ) {
            let n = values.len();
            let sample = Sample::new(values).unwrap();
            let bins = sample.histo_counts(bin_width).unwrap();
            let total: usize = bins.iter().map(|(_, c)| c).sum();
            prop_assert_eq!(total, n);
        }

        /// Quantiles are monotone and stay inside the observed range.
        #[test]
        fn quantiles_monotone(
            values in proptest::collection::vec(-1e4f64..1e4, 2..200),
            q in 0.0f64..=1.0,
        ) {
            let sample = Sample::new(values).unwrap();
            let v = sample.quantile(q).unwrap();
            prop_assert!(v >= sample.min().unwrap());
            prop_assert!(v <= sample.max().unwrap());
        }
    }
}

mod vcf_properties {
    use super::*;

    proptest! {
        /// Allele entropy is in (0, 1] whenever both depths are positive.
        #[test]
        fn shannon_bounded(ref_depth in 1u64..10_000, alt_depth in 1u64..10_000) {
            let row = format!(
                "chr1\t100\t.\tA\tG\t60.0\tPASS\tDP4={},0,{},0",
                ref_depth, alt_depth
            );
            let variant = VcfVariant::parse(&row, 1).unwrap();
            let h = variant.shannon.unwrap();
            prop_assert!(h > 0.0 && h <= 1.0 + 1e-12);
            if ref_depth == alt_depth {
                prop_assert!((h - 1.0).abs() < 1e-9);
            }
        }
    }
}
