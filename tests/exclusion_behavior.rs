//! Behavior tests for the sector, keyword and denylist filter.

use std::io::Write;

use spikewire_core::config::ExclusionConfig;
use spikewire_core::{
    ConfigError, Denylist, ExclusionFilter, ExclusionReason, FeedItem, ReleaseEvent,
    ReleaseSource, Ticker, TickerMetadata, UtcDateTime,
};

fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).expect("valid ticker")
}

fn release(symbol: &str, headline: &str) -> ReleaseEvent {
    let item = FeedItem::new(
        headline,
        UtcDateTime::parse("2026-03-10T11:00:00Z").expect("valid timestamp"),
    );
    ReleaseEvent::from_item(ticker(symbol), item, ReleaseSource::Primary, "wire")
}

// =============================================================================
// Exclusion: Precedence
// =============================================================================

#[test]
fn denylist_takes_precedence_over_sector_and_keyword() {
    // Given: a denylisted Health Care ticker with a clinical headline
    let filter = ExclusionFilter::default();
    let denylist: Denylist = [ticker("ABC")].into_iter().collect();
    let metadata = TickerMetadata::new("Health Care", "Biotechnology");

    // When: the ticker is classified
    let verdict = filter.classify(
        &ticker("ABC"),
        Some(&metadata),
        Some(&release("ABC", "Phase 3 clinical trial results")),
        &denylist,
    );

    // Then: the denylist is reported
    assert!(verdict.excluded);
    assert_eq!(verdict.reason, ExclusionReason::Denylist);
}

#[test]
fn sector_takes_precedence_over_keyword() {
    let verdict = ExclusionFilter::default().classify(
        &ticker("ABC"),
        Some(&TickerMetadata::new("healthcare", "Biotechnology")),
        None,
        &Denylist::empty(),
    );

    assert_eq!(verdict.reason, ExclusionReason::Sector);
    assert_eq!(verdict.detail.as_deref(), Some("healthcare"));
}

// =============================================================================
// Exclusion: Keywords
// =============================================================================

#[test]
fn headline_keywords_match_case_insensitively() {
    // Given: an industrial company announcing clinical results
    let metadata = TickerMetadata::new("Industrials", "Specialty Machinery");

    // When: the headline is screened
    let verdict = ExclusionFilter::default().classify(
        &ticker("MACH"),
        Some(&metadata),
        Some(&release("MACH", "New CLINICAL Results")),
        &Denylist::empty(),
    );

    // Then: the keyword hit is explained
    assert_eq!(verdict.reason, ExclusionReason::Keyword);
    assert_eq!(verdict.detail.as_deref(), Some("headline contains 'clinical'"));
}

#[test]
fn industry_keywords_exclude_outside_excluded_sectors() {
    let verdict = ExclusionFilter::default().classify(
        &ticker("LAB"),
        Some(&TickerMetadata::new("Technology", "Biotech Instruments")),
        None,
        &Denylist::empty(),
    );

    assert_eq!(verdict.reason, ExclusionReason::Keyword);
    assert_eq!(
        verdict.detail.as_deref(),
        Some("industry 'Biotech Instruments' contains 'biotech'")
    );
}

#[test]
fn sector_names_are_not_keyword_screened() {
    // Given: "Industrials" contains the substring "trial"
    let metadata = TickerMetadata::new("Industrials", "Aerospace & Defense");

    // When: the ticker is classified with a neutral headline
    let verdict = ExclusionFilter::default().classify(
        &ticker("XYZ"),
        Some(&metadata),
        Some(&release("XYZ", "XYZ Wins $50M Defense Contract")),
        &Denylist::empty(),
    );

    // Then: it is kept
    assert!(!verdict.excluded);
    assert_eq!(verdict.reason, ExclusionReason::None);
    assert!(verdict.detail.is_none());
}

#[test]
fn missing_metadata_still_screens_the_headline() {
    let filter = ExclusionFilter::default();

    let clean = filter.classify(
        &ticker("XYZ"),
        None,
        Some(&release("XYZ", "XYZ Reports Record Quarter")),
        &Denylist::empty(),
    );
    let flagged = filter.classify(
        &ticker("XYZ"),
        None,
        Some(&release("XYZ", "XYZ Starts Biotech Partnership")),
        &Denylist::empty(),
    );

    assert!(!clean.excluded);
    assert_eq!(flagged.reason, ExclusionReason::Keyword);
}

#[test]
fn custom_lists_replace_the_defaults() {
    let config = ExclusionConfig {
        sectors: vec![String::from("Energy")],
        keywords: vec![String::from("Mining")],
        tickers_denylist_path: None,
    };
    let filter = ExclusionFilter::from_config(&config);

    let energy = filter.classify(&ticker("OIL"), Some(&TickerMetadata::new("Energy", "Oil & Gas")), None, &Denylist::empty());
    let health = filter.classify(&ticker("MED"), Some(&TickerMetadata::new("Health Care", "Hospitals")), None, &Denylist::empty());
    let mining = filter.classify(&ticker("ORE"), Some(&TickerMetadata::new("Materials", "Gold mining")), None, &Denylist::empty());

    assert_eq!(energy.reason, ExclusionReason::Sector);
    assert!(!health.excluded);
    assert_eq!(mining.reason, ExclusionReason::Keyword);
}

// =============================================================================
// Exclusion: Denylist Files
// =============================================================================

#[test]
fn denylist_files_skip_comments_and_blank_lines() {
    // Given: a denylist file with comments, blanks and mixed case
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "# noisy tickers\nabc\n\nDEF  # always halted\nabc").expect("write");

    // When: it is loaded
    let denylist = Denylist::load(file.path()).expect("valid denylist");

    // Then: each ticker appears once, normalized
    assert_eq!(denylist.len(), 2);
    assert!(denylist.contains(&ticker("ABC")));
    assert!(denylist.contains(&ticker("DEF")));
}

#[test]
fn a_missing_denylist_file_is_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let denylist = Denylist::load(dir.path().join("absent.txt")).expect("missing is not fatal");
    assert!(denylist.is_empty());
}

#[test]
fn a_malformed_denylist_entry_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "ABC\nnot a ticker!").expect("write");

    let error = Denylist::load(file.path()).expect_err("must fail");
    assert!(matches!(error, ConfigError::Ticker { .. }));
}
