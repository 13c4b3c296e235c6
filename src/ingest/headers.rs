use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Schema-recognised TradeRecord field names.
pub const CANONICAL_FIELDS: &[&str] = &[
    "HS CODE",
    "Product Name",
    "Product Category",
    "Item Description",
    "Grade",
    "Grade Category",
    "Origin",
    "Origin2",
    "Actual LC Date",
    "LC Date",
    "No. of Days - Shipment",
    "Importer Category",
    "Actual Importer Name",
    "Importer Name",
    "Imp Group",
    "Importer Address",
    "Agent Name",
    "Actual Consignor Name",
    "Consignor Name",
    "Consignor Group",
    "Consignor Group 12 Words",
    "Assessed Value",
    "Assessed Unit",
    "DCL Unit",
    "DCL Val",
    "Qty (Kg)",
    "Price/Kg",
    "QTY (Mts)",
    "Price/Mt",
    "PT DUTY",
    "PT STAX",
    "PTSTAX",
    "ITAXAT",
    "Machine No.",
    "Cash No",
    "Cash Date",
    "Month",
    "Year",
    "BE Type",
    "Port",
    "Port Name",
];

/// Variants seen in real uploads that neither the lower-case nor the
/// squashed form of the canonical name covers.
const ALIASES: &[(&str, &str)] = &[
    ("hs_code", "HS CODE"),
    ("hs-code", "HS CODE"),
    ("noofdays-shipment", "No. of Days - Shipment"),
    ("no of days - shipment", "No. of Days - Shipment"),
    ("pts tax", "PTSTAX"),
    ("qty kg", "Qty (Kg)"),
    ("qty mts", "QTY (Mts)"),
    ("price per kg", "Price/Kg"),
    ("price per mt", "Price/Mt"),
    ("machine no", "Machine No."),
    ("cash no.", "Cash No"),
];

/// Lower-case lookup key -> canonical name.
///
/// Built in three passes so later passes override earlier ones: squashed
/// forms, explicit aliases, then each canonical name's own lower-case form.
/// The last pass is what makes `normalize` idempotent.
static HEADER_TABLE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::with_capacity(CANONICAL_FIELDS.len() * 3 + ALIASES.len());

    for &field in CANONICAL_FIELDS {
        table.insert(squash(field), field);
    }
    for &(alias, field) in ALIASES {
        table.insert(alias.to_string(), field);
    }
    for &field in CANONICAL_FIELDS {
        table.insert(field.to_lowercase(), field);
    }

    table
});

/// Map a raw CSV header to its canonical field name.
///
/// Unknown headers come back unchanged, so unmapped columns are kept rather
/// than dropped.
pub fn normalize(raw: &str) -> String {
    lookup(raw).map(str::to_string).unwrap_or_else(|| raw.to_string())
}

/// Canonical name for `raw`, if the table knows it.
pub fn lookup(raw: &str) -> Option<&'static str> {
    let key = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
    HEADER_TABLE.get(&key).copied()
}

pub fn is_canonical(field: &str) -> bool {
    CANONICAL_FIELDS.contains(&field)
}

fn squash(field: &str) -> String {
    field
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hs_code_variants_collapse() {
        for raw in ["  HSCode ", "hs code", "HS Code", "HS CODE", "hscode", "hs_code"] {
            assert_eq!(normalize(raw), "HS CODE", "{:?}", raw);
        }
    }

    #[test]
    fn unknown_headers_pass_through_verbatim() {
        assert_eq!(normalize("Totally Unknown Column"), "Totally Unknown Column");
        assert_eq!(normalize("  padded unknown "), "  padded unknown ");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn every_canonical_field_maps_to_itself() {
        for &field in CANONICAL_FIELDS {
            assert_eq!(normalize(field), field);
            assert_eq!(normalize(&field.to_uppercase()), field);
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut samples: Vec<String> = CANONICAL_FIELDS
            .iter()
            .flat_map(|f| [f.to_lowercase(), squash(f), format!(" {} ", f.to_uppercase())])
            .collect();
        samples.extend(ALIASES.iter().map(|(a, _)| a.to_string()));
        samples.extend(["Unknown", "pts tax", "PT STAX", "ptstax", "\u{feff}Grade"].map(String::from));

        for s in samples {
            let once = normalize(&s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn colliding_squashed_forms_prefer_the_exact_field() {
        // "PT STAX" squashes to "ptstax", which is PTSTAX's own lower-case form
        assert_eq!(normalize("ptstax"), "PTSTAX");
        assert_eq!(normalize("pt stax"), "PT STAX");
        assert_eq!(normalize("pts tax"), "PTSTAX");
    }

    #[test]
    fn punctuated_fields_accept_squashed_headers() {
        assert_eq!(normalize("QtyKg"), "Qty (Kg)");
        assert_eq!(normalize("price/mt"), "Price/Mt");
        assert_eq!(normalize("NoOfDaysShipment"), "No. of Days - Shipment");
        assert_eq!(normalize("consignorgroup12words"), "Consignor Group 12 Words");
        assert_eq!(normalize("MachineNo"), "Machine No.");
    }

    #[test]
    fn byte_order_mark_is_ignored_for_lookup() {
        assert_eq!(normalize("\u{feff}Grade"), "Grade");
    }

    #[test]
    fn canonical_list_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for &field in CANONICAL_FIELDS {
            assert!(seen.insert(field.to_lowercase()), "duplicate {}", field);
            assert!(is_canonical(field));
        }
        assert!(!is_canonical("hs code"));
    }
}
