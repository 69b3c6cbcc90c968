//! Lookup tables from Alpha Vantage's free-text venue names to ISO codes.

/// Default MIC for a `SYMBOL_SEARCH` region. A region spans several venues,
/// so this is the main exchange for it.
pub(super) fn region_to_mic(region: &str) -> Option<&'static str> {
    match region.trim().to_uppercase().as_str() {
        "UNITED STATES" => Some("XNAS"),
        "UNITED KINGDOM" => Some("XLON"),
        "CANADA" => Some("XTSE"),
        _ => None,
    }
}

/// ISO 3166-1 alpha-2 country for a `SYMBOL_SEARCH` region.
pub(super) fn region_to_country(region: &str) -> Option<&'static str> {
    match region.trim().to_uppercase().as_str() {
        "UNITED STATES" => Some("US"),
        "UNITED KINGDOM" => Some("GB"),
        "CANADA" => Some("CA"),
        _ => None,
    }
}

/// MIC for the `Exchange` field of an `OVERVIEW` payload.
pub(super) fn exchange_to_mic(exchange: &str) -> Option<&'static str> {
    match exchange.trim().to_uppercase().as_str() {
        "NASDAQ" => Some("XNAS"),
        "NYSE" => Some("XNYS"),
        "NYSE ARCA" => Some("ARCX"),
        "NYSE MKT" | "NYSE AMERICAN" | "AMEX" => Some("XASE"),
        "BATS" => Some("BATS"),
        "LSE" | "LONDON" => Some("XLON"),
        "TSX" | "TORONTO" => Some("XTSE"),
        _ => None,
    }
}
