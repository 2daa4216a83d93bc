/// Sector classification for the default NSE large-cap universe.
/// Unlisted symbols fall back to "Diversified".
pub fn sector_for(symbol: &str) -> &'static str {
    match symbol {
        "RELIANCE" | "ONGC" | "BPCL" => "Oil & Gas",
        "TCS" | "INFY" | "HCLTECH" | "WIPRO" | "TECHM" | "LTIM" => "IT Services",
        "HDFCBANK" | "ICICIBANK" | "KOTAKBANK" | "SBIN" | "AXISBANK" | "INDUSINDBK" => "Banking",
        "HINDUNILVR" | "ITC" | "NESTLEIND" | "BRITANNIA" | "TATACONSUM" => "FMCG",
        "BHARTIARTL" => "Telecom",
        "LT" => "Engineering",
        "ASIANPAINT" => "Paints",
        "MARUTI" | "TATAMOTORS" | "EICHERMOT" | "HEROMOTOCO" | "BAJAJ-AUTO" => "Auto",
        "BAJFINANCE" | "SHRIRAMFIN" => "NBFC",
        "TITAN" => "Jewellery",
        "ULTRACEMCO" | "GRASIM" => "Cement",
        "SUNPHARMA" | "DRREDDY" | "CIPLA" | "DIVISLAB" => "Pharma",
        "NTPC" | "POWERGRID" => "Power",
        "BAJAJFINSV" => "Financial Services",
        "JSWSTEEL" | "TATASTEEL" => "Steel",
        "COALINDIA" => "Mining",
        "HINDALCO" => "Metals",
        "UPL" => "Chemicals",
        "APOLLOHOSP" => "Healthcare",
        "ADANIPORTS" => "Infrastructure",
        "HDFCLIFE" | "SBILIFE" => "Insurance",
        _ => "Diversified",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbols_map_to_sectors() {
        assert_eq!(sector_for("TCS"), "IT Services");
        assert_eq!(sector_for("SBIN"), "Banking");
        assert_eq!(sector_for("SUNPHARMA"), "Pharma");
    }

    #[test]
    fn unknown_symbols_fall_back() {
        assert_eq!(sector_for("NOSUCH"), "Diversified");
    }
}
