use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Static disease label -> ordered remedy list. Loaded once at startup,
/// read-only afterwards. Labels are matched after the plant prefix has
/// been stripped from the classifier output.
static DISEASE_CURES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    table.insert(
        "Anthracnose",
        &[
            "Apply fungicides like chlorothalonil or mancozeb.",
            "Remove and destroy infected plant debris.",
            "Ensure good air circulation and avoid overhead irrigation.",
        ],
    );
    table.insert(
        "Bacterial blight",
        &[
            "Spray copper-based bactericides.",
            "Avoid overhead irrigation to reduce moisture on leaves.",
            "Use disease-free seeds and resistant varieties.",
        ],
    );
    table.insert(
        "Brown spot",
        &[
            "Use fungicides like tricyclazole or carbendazim.",
            "Maintain proper field drainage.",
            "Apply balanced fertilizers (avoid excess nitrogen).",
        ],
    );
    table.insert(
        "Fall armyworm",
        &[
            "Handpick and destroy egg masses and larvae.",
            "Use biological control like Trichogramma wasps.",
            "Apply insecticides such as spinosad or emamectin benzoate.",
        ],
    );
    table.insert(
        "Green mite",
        &[
            "Spray acaricides (abamectin or dicofol).",
            "Encourage natural predators like lady beetles.",
            "Keep plants well-watered to reduce mite stress.",
        ],
    );
    table.insert(
        "Gumosis",
        &[
            "Scrape affected bark and apply fungicidal paste.",
            "Improve field drainage to reduce root stress.",
            "Avoid injuries to tree bark during pruning.",
        ],
    );
    table.insert(
        "Healthy",
        &[
            "No cure needed – crop is healthy.",
            "Maintain good irrigation and fertilization practices.",
            "Regularly monitor crops to detect early disease signs.",
        ],
    );
    table.insert(
        "Leaf blight",
        &[
            "Use resistant crop varieties when available.",
            "Spray copper-based fungicides or mancozeb.",
            "Rotate crops and avoid overcrowding.",
        ],
    );
    table.insert(
        "Leaf curl",
        &[
            "Control vector insects (like whiteflies or aphids).",
            "Apply neem oil or systemic insecticides.",
            "Remove and destroy infected leaves.",
        ],
    );
    table.insert(
        "Leaf miner",
        &[
            "Remove and destroy mined leaves.",
            "Use neem-based sprays or spinosad.",
            "Introduce parasitoid wasps for biological control.",
        ],
    );
    table.insert(
        "Leaf spot",
        &[
            "Apply fungicides like mancozeb or chlorothalonil.",
            "Avoid overhead watering to reduce leaf wetness.",
            "Remove and destroy infected leaves.",
        ],
    );
    table.insert(
        "Mosaic",
        &[
            "Control insect vectors such as aphids or whiteflies.",
            "Use virus-free planting material.",
            "Remove and destroy infected plants immediately.",
        ],
    );
    table.insert(
        "Red rust",
        &[
            "Spray sulfur-based fungicides at early stages.",
            "Prune and destroy infected leaves.",
            "Maintain field hygiene to reduce spread.",
        ],
    );
    table.insert(
        "Septoria leaf spot",
        &[
            "Apply fungicides containing chlorothalonil or copper.",
            "Space plants properly to reduce humidity.",
            "Remove and destroy infected leaves.",
        ],
    );
    table.insert(
        "Streak virus",
        &[
            "Use resistant or tolerant crop varieties.",
            "Control insect vectors (mainly aphids).",
            "Remove infected plants to reduce spread.",
        ],
    );
    table.insert(
        "Verticulium wilt",
        &[
            "Rotate crops with non-host species.",
            "Apply soil solarization before planting.",
            "Use resistant plant varieties if available.",
        ],
    );
    table
});

/// Remedies for a disease label. Unrecognized labels get an empty list,
/// never an error.
pub fn recommendations_for(label: &str) -> Vec<String> {
    DISEASE_CURES
        .get(label)
        .map(|cures| cures.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_label_returns_ordered_remedies() {
        let recs = recommendations_for("Leaf blight");
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0], "Use resistant crop varieties when available.");
    }

    #[test]
    fn unknown_label_returns_empty_list() {
        assert!(recommendations_for("Moon blight").is_empty());
    }

    #[test]
    fn table_has_all_entries() {
        assert_eq!(DISEASE_CURES.len(), 16);
    }
}
