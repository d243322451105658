//! Tests for chunk name formatting and recovery.

use rstest::rstest;

use crate::chunk::{ChunkIndex, ChunkName};

#[test]
fn format_matches_upload_pattern() {
    let name = ChunkName::new(ChunkIndex::new(0), ChunkIndex::new(2), "name.ext");
    assert_eq!(name.to_string(), "0-2_name.ext.dlfc");
}

#[rstest]
#[case("0-2_report.pdf.dlfc", 0, 2, "report.pdf")]
#[case("12-200_my_file-v2.tar.gz.dlfc", 12, 200, "my_file-v2.tar.gz")]
#[case("5-3_odd.dlfc", 5, 3, "odd")]
#[case("0-0_noext.dlfc", 0, 0, "noext")]
fn parse_recovers_fields(
    #[case] file_name: &str,
    #[case] index: u8,
    #[case] count: u8,
    #[case] original: &str,
) {
    let name = ChunkName::parse(file_name).expect("chunk name");
    assert_eq!(name.index(), ChunkIndex::new(index));
    assert_eq!(name.count(), ChunkIndex::new(count));
    assert_eq!(name.original(), original);
    assert_eq!(name.to_string(), file_name);
}

#[rstest]
#[case::plain_file("report.pdf")]
#[case::wrong_extension("0-2_report.pdf")]
#[case::extension_without_dot("0-2_reportdlfc")]
#[case::non_numeric_index("a-2_report.pdf.dlfc")]
#[case::signed_index("+1-2_report.pdf.dlfc")]
#[case::legacy_without_count("3_report.pdf.dlfc")]
#[case::missing_original("0-2_.dlfc")]
#[case::index_overflow("256-300_report.pdf.dlfc")]
#[case::count_overflow("0-256_report.pdf.dlfc")]
#[case::empty_count("0-_report.pdf.dlfc")]
fn parse_rejects_non_chunk_names(#[case] file_name: &str) {
    assert_eq!(ChunkName::parse(file_name), None);
}
