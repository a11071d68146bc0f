use super::{Brand, Division};

fn brand(name: &str, full_name: &str, aliases: &[&str], category: &str) -> Brand {
    Brand {
        name: name.to_string(),
        full_name: Some(full_name.to_string()),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        category: Some(category.to_string()),
    }
}

/// Built-in divisions, restored on every start.
pub(super) fn divisions() -> Vec<Division> {
    vec![
        Division {
            id: "derma".into(),
            name: "Derma Division".into(),
            description: Some("Acne, skin and hair care".into()),
            brands: vec![
                brand(
                    "ACKNOTIN",
                    "Acknotin (Isotretinoin)",
                    &["ACKNOTIN-5", "ACKNOTIN-10", "ACKNOTIN-20", "ACNOTIN"],
                    "Retinoid",
                ),
                brand("ZEDOX", "Zedox Gel", &["ZEDOX GEL", "ZDX"], "Topical antibiotic"),
                brand("KZ", "KZ Lotion", &["KZ SOAP", "KZ LOTION"], "Antifungal"),
            ],
        },
        Division {
            id: "neuro".into(),
            name: "Neuro Division".into(),
            description: Some("Psychiatry and neurology".into()),
            brands: vec![
                brand(
                    "ESCNX",
                    "Escnx (Escitalopram)",
                    &["ESCNX PLUS", "ESCNX-5", "ESCNX-10", "ESC PLUS"],
                    "SSRI",
                ),
                brand(
                    "NUROKIND",
                    "Nurokind (Methylcobalamin)",
                    &["NUROKIND-LC", "NUROKIND GOLD", "NRK"],
                    "Vitamin B12",
                ),
                brand("CLONAFIT", "Clonafit (Clonazepam)", &["CLONAFIT BETA", "CLZ"], "Anxiolytic"),
            ],
        },
        Division {
            id: "gynae".into(),
            name: "Gynae Division".into(),
            description: Some("Women's health".into()),
            brands: vec![
                brand(
                    "FOLITRAX",
                    "Folitrax (Folic acid)",
                    &["FOLITRAX D3", "FOLITRAX-5"],
                    "Supplement",
                ),
                brand("DYDROBOON", "Dydroboon (Dydrogesterone)", &["DYDRO"], "Progestin"),
                brand("GYNOKIND", "Gynokind Syrup", &["GYNO SYP"], "Uterine tonic"),
            ],
        },
        Division {
            id: "general".into(),
            name: "General Division".into(),
            description: None,
            brands: vec![
                brand("VOMIKIND", "Vomikind (Ondansetron)", &["VOMIKIND-MD", "VMK"], "Antiemetic"),
                brand("GASKIND", "Gaskind", &["GASKIND PLUS", "GSK DROPS"], "Antacid"),
                brand(
                    "CALCIKIND",
                    "Calcikind (Calcium + D3)",
                    &["CALCIKIND-D3", "CKD"],
                    "Supplement",
                ),
            ],
        },
    ]
}
