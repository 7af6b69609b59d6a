//! Static country-id to ISO 3166-1 alpha-2 mapping.

/// Country id (index) to its two-letter ISO 3166-1 alpha-2 code, as
/// shipped with SxGeo v2.2 databases. Index 0 is unused; 255 is the
/// reserved "Unknown" entry. A handful of ids were reassigned over the
/// format's lifetime (CW, SX, TL, RS, ME replaced AN, FX, TP, YU and a
/// YU split respectively).
const ID_TO_ISO: [&str; 256] = [
    "", "AP", "EU", "AD", "AE", "AF", "AG", "AI", "AL", "AM", "CW", //  10
    "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AZ", "BA", "BB", "BD", //  21
    "BE", "BF", "BG", "BH", "BI", "BJ", "BM", "BN", "BO", "BR", "BS", //  32
    "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", //  43
    "CI", "CK", "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CX", "CY", //  54
    "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE", "EG", "EH", //  65
    "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR", "SX", "GA", //  76
    "GB", "GD", "GE", "GF", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", //  87
    "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", //  98
    "HU", "ID", "IE", "IL", "IN", "IO", "IQ", "IR", "IS", "IT", "JM", // 109
    "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", // 120
    "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", // 131
    "LV", "LY", "MA", "MC", "MD", "MG", "MH", "MK", "ML", "MM", "MN", // 142
    "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", // 153
    "MZ", "NA", "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR", // 164
    "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM", // 175
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RU", "RW", // 186
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", // 197
    "SM", "SN", "SO", "SR", "ST", "SV", "SY", "SZ", "TC", "TD", "TF", // 208
    "TG", "TH", "TJ", "TK", "TM", "TN", "TO", "TL", "TR", "TT", "TV", // 219
    "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", // 230
    "VG", "VI", "VN", "VU", "WF", "WS", "YE", "YT", "RS", "ZA", "ZM", // 241
    "ME", "ZW", "A1", "A2", "O1", "AX", "GG", "IM", "JE", "BL", "MF", // 252
    "BQ", "SS", "Unknown",
];

/// Returns the ISO code for a country id.
///
/// Id 0 and ids beyond the table map to the empty string.
pub fn country_iso(id: u32) -> &'static str {
    ID_TO_ISO.get(id as usize).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve() {
        assert_eq!(country_iso(1), "AP");
        assert_eq!(country_iso(185), "RU");
        assert_eq!(country_iso(225), "US");
        assert_eq!(country_iso(255), "Unknown");
    }

    #[test]
    fn zero_and_out_of_range_are_empty() {
        assert_eq!(country_iso(0), "");
        assert_eq!(country_iso(256), "");
        assert_eq!(country_iso(u32::MAX), "");
    }

    #[test]
    fn table_holds_two_letter_ascii_codes() {
        for (id, iso) in ID_TO_ISO.iter().enumerate() {
            if id == 0 || id == 255 {
                continue;
            }
            assert_eq!(iso.len(), 2, "entry {id} is {iso:?}");
            assert!(iso.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
    }
}
